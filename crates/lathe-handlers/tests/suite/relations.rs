use lathe_config::{RelationNaming, TransformConfig};
use lathe_core::{NodeId, LATHE_USAGE};
use lathe_framework::NoResolver;
use lathe_handlers::contract::{link_many, OneToManyRelation, OneToOneRelation, ReferencedBy};
use lathe_tree::{
    render, AnnotationDecl, Ast, AstBuilder, FieldDecl, MethodDecl, Modifiers, TypeDecl, TypeRef,
    Visibility,
};
use pretty_assertions::assert_eq;

use crate::suite::support::evaluator::{Accessor, Value};
use crate::suite::support::{field, list_of, transform, transformer_with};

/// `class Customer { long customerId; @OneToMany(field="customerId") List<Order> orders; }`
fn customer_with_orders(unique: bool) -> (Ast, NodeId) {
    let mut b = AstBuilder::new();
    let customer_id = b.field(field("customerId", "long"));
    let mut relation = AnnotationDecl::new("OneToMany").arg("field", "customerId");
    let related = if unique {
        relation = relation.arg("unique", true);
        let ann = b.annotation(relation);
        b.field(field("primaryOrder", "Order").annotated(vec![ann]))
    } else {
        let ann = b.annotation(relation);
        b.field(FieldDecl::new("orders", list_of("Order")).annotated(vec![ann]))
    };
    let ty = b.class(TypeDecl::class("Customer"), vec![], vec![customer_id, related]);
    b.compilation_unit(None, vec![ty]);
    (b.finish(), ty)
}

fn order(id: i64) -> Value {
    Value::object(&[("orderId", Value::Long(id)), ("customerId", Value::Null)])
}

#[test]
fn one_to_many_generates_accessor_singleton() {
    let (mut ast, ty) = customer_with_orders(false);
    let diagnostics = transform(&mut ast);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");

    let expected = r#"class Customer {
    @java.lang.SuppressWarnings("all")
    private static final lathe.runtime.data.OneToManyRelation<Customer, Order> ORDERS = new lathe.runtime.data.OneToManyRelation<Customer, Order>() {
        @java.lang.Override
        public java.lang.Long getReferencedKey(final Order item) {
            return item.getCustomerId();
        }
        @java.lang.Override
        public void setReferencedObject(final Customer item, final java.util.List<Order> ref) {
            item.orders = ref;
        }
        @java.lang.Override
        public void setRelatedId(final Order item, final java.lang.Long id) {
            item.setCustomerId(id);
        }
    };
    private long customerId;
    @OneToMany(field = "customerId")
    private java.util.List<Order> orders;
}"#;
    assert_eq!(render(&ast, ty), expected);
}

#[test]
fn one_to_many_links_every_item_to_its_owner() {
    let (mut ast, ty) = customer_with_orders(false);
    transform(&mut ast);
    let accessor = Accessor::find(&ast, ty, "ORDERS");

    let customer = Value::object(&[("customerId", Value::Long(7))]);
    let mut base = customer.clone();
    link_many(&accessor, &mut base, Some(7), vec![order(1), order(2)]);

    let Value::List(orders) = customer.get("orders") else {
        panic!("orders not assigned");
    };
    assert_eq!(orders.len(), 2);
    for item in &orders {
        assert_eq!(OneToManyRelation::referenced_key(&accessor, item), Some(7));
    }
}

#[test]
fn unique_one_to_many_keeps_only_the_first_item() {
    let (mut ast, ty) = customer_with_orders(true);
    assert!(transform(&mut ast).is_empty());
    let accessor = Accessor::find(&ast, ty, "PRIMARY_ORDER");

    let previous = order(0);
    let customer = Value::object(&[("primaryOrder", previous.clone())]);
    let mut base = customer.clone();

    OneToManyRelation::set_referenced_object(&accessor, &mut base, Vec::new());
    assert_eq!(customer.get("primaryOrder"), previous);

    OneToManyRelation::set_referenced_object(&accessor, &mut base, vec![order(1), order(2)]);
    assert_eq!(customer.get("primaryOrder"), order(1));

    let accessor_field = ast
        .fields_of(ty)
        .into_iter()
        .find_map(|f| ast.as_field(f).filter(|f| f.name == "PRIMARY_ORDER").cloned())
        .unwrap();
    assert_eq!(
        accessor_field.ty,
        TypeRef::generic(
            "lathe.runtime.data.OneToManyRelation",
            [TypeRef::named("Customer"), TypeRef::named("Order")]
        )
    );
}

#[test]
fn one_to_one_reads_and_writes_the_key_on_the_base() {
    let mut b = AstBuilder::new();
    let order_id = b.field(field("orderId", "long"));
    let ann = b.annotation(AnnotationDecl::new("lathe.OneToOne").arg("field", "orderId"));
    let primary = b.field(field("primaryOrder", "Order").annotated(vec![ann]));
    let ty = b.class(TypeDecl::class("Customer"), vec![], vec![order_id, primary]);
    b.compilation_unit(None, vec![ty]);
    let mut ast = b.finish();

    let config = TransformConfig {
        relations: lathe_config::RelationsConfig {
            naming: RelationNaming::Capitalized,
            ..Default::default()
        },
        ..Default::default()
    };
    let diagnostics = transformer_with(config, NoResolver).run(&mut ast);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");

    let accessor = Accessor::find(&ast, ty, "PrimaryOrder");
    let customer = Value::object(&[("orderId", Value::Long(3))]);
    let mut base = customer.clone();

    assert_eq!(OneToOneRelation::referenced_key(&accessor, &base), Some(3));
    accessor.set_related_id(&mut base, Some(11));
    assert_eq!(customer.get("orderId"), Value::Long(11));
    OneToOneRelation::set_referenced_object(&accessor, &mut base, order(11));
    assert_eq!(customer.get("primaryOrder"), order(11));
}

#[test]
fn existing_accessor_field_is_left_alone() {
    let mut b = AstBuilder::new();
    let existing = b.field(field("ORDERS", "Object"));
    let ann = b.annotation(AnnotationDecl::new("OneToMany").arg("field", "customerId"));
    let orders = b.field(FieldDecl::new("orders", list_of("Order")).annotated(vec![ann]));
    let ty = b.class(TypeDecl::class("Customer"), vec![], vec![existing, orders]);
    b.compilation_unit(None, vec![ty]);
    let mut ast = b.finish();

    let diagnostics = transform(&mut ast);
    assert!(diagnostics.is_empty());
    assert_eq!(ast.type_decl(ty).unwrap().members, vec![existing, orders]);
}

#[test]
fn misplaced_relations_are_usage_errors() {
    let mut b = AstBuilder::new();
    let on_static = b.annotation(AnnotationDecl::new("OneToOne").arg("field", "id"));
    let constant = b.field(
        field("DEFAULT", "Order")
            .with_modifiers(Modifiers::new(Visibility::Public).with_static())
            .annotated(vec![on_static]),
    );
    let on_method = b.annotation(AnnotationDecl::new("OneToMany").arg("field", "id"));
    let mut getter = MethodDecl::method("orders", list_of("Order"));
    getter.annotations = vec![on_method];
    let getter = b.method(getter, vec![], vec![]);
    let without_key = b.annotation(AnnotationDecl::new("OneToOne"));
    let order = b.field(field("order", "Order").annotated(vec![without_key]));
    let ty = b.class(TypeDecl::class("Customer"), vec![], vec![constant, getter, order]);
    b.compilation_unit(None, vec![ty]);
    let mut ast = b.finish();

    let diagnostics = transform(&mut ast);
    let errors: Vec<(&str, &str, Option<NodeId>)> = diagnostics
        .errors()
        .map(|d| (d.code, d.message.as_str(), d.node))
        .collect();
    assert_eq!(
        errors,
        vec![
            (LATHE_USAGE, "@OneToOne is not legal on static fields.", Some(on_static)),
            (
                LATHE_USAGE,
                "@OneToOne needs the name of the key field in `field`.",
                Some(without_key)
            ),
            (LATHE_USAGE, "@OneToMany is legal only on fields.", Some(on_method)),
        ]
    );
    assert_eq!(ast.type_decl(ty).unwrap().members.len(), 3);
}
