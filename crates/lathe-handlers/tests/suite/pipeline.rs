use lathe_config::LatheConfig;
use lathe_core::NodeId;
use lathe_framework::{AnnotationHandler, NoResolver, Phase};
use lathe_handlers::builtin_handlers;
use lathe_tree::{
    render, AnnotationDecl, Ast, AstBuilder, Expr, FieldDecl, LocalDecl, MethodDecl, TypeDecl,
    TypeRef,
};
use pretty_assertions::assert_eq;

use crate::suite::support::{field, list_of, transform, transformer_with};

/// One type exercising every built-in handler.
fn shop() -> (Ast, NodeId) {
    let mut b = AstBuilder::new();
    let ctor = b.annotation(AnnotationDecl::new("AllArgsConstructor"));
    let customer_id = b.field(field("customerId", "long"));
    let relation = b.annotation(AnnotationDecl::new("OneToMany").arg("field", "customerId"));
    let orders = b.field(FieldDecl::new("orders", list_of("Order")).annotated(vec![relation]));

    let cleanup = b.annotation(AnnotationDecl::new("Cleanup"));
    let writer = b.local(
        LocalDecl::new("out", TypeRef::named("Writer"))
            .annotated(vec![cleanup])
            .with_init(Expr::bare_call("open", vec![])),
    );
    let write = b.expr_stmt(Expr::bare_call("write", vec![Expr::name("out")]));
    let save = b.method(
        MethodDecl::method("save", TypeRef::named("void")),
        vec![],
        vec![writer, write],
    );

    let ty = b.class(
        TypeDecl::class("Customer"),
        vec![ctor],
        vec![customer_id, orders, save],
    );
    let cu = b.compilation_unit(Some("shop"), vec![ty]);
    (b.finish(), cu)
}

#[test]
fn builtin_registry_covers_every_annotation() {
    let registry = builtin_handlers();
    assert_eq!(registry.len(), 7);

    let mut b = AstBuilder::new();
    let names = [
        ("lathe.NoArgsConstructor", Phase::Members),
        ("RequiredArgsConstructor", Phase::Members),
        ("AllArgsConstructor", Phase::Members),
        ("CustomArgsConstructor", Phase::Members),
        ("OneToOne", Phase::Parse),
        ("lathe.OneToMany", Phase::Members),
        ("Cleanup", Phase::Bodies),
    ];
    let nodes: Vec<_> = names
        .iter()
        .map(|(name, _)| b.annotation(AnnotationDecl::new(*name)))
        .collect();
    let other = b.annotation(AnnotationDecl::new("other.Cleanup"));
    let ast = b.finish();

    for (&node, &(name, phase)) in nodes.iter().zip(&names) {
        let found = registry.handlers_for(&ast, node, phase);
        assert_eq!(found.len(), 1, "{name}");
        assert_eq!(found[0].phase(), phase);
    }
    assert!(registry.handlers_for(&ast, other, Phase::Bodies).is_empty());
}

#[test]
fn running_the_pipeline_twice_changes_nothing() {
    let (mut ast, cu) = shop();

    let first = transform(&mut ast);
    assert!(first.is_empty(), "{first:?}");
    let once = render(&ast, cu);

    let second = transform(&mut ast);
    assert!(second.is_empty(), "{second:?}");
    assert_eq!(render(&ast, cu), once);

    assert!(once.contains(
        "private static final lathe.runtime.data.OneToManyRelation<Customer, Order> ORDERS"
    ));
    assert!(once.contains(
        "public Customer(final long customerId, final java.util.List<Order> orders) {"
    ));
    assert!(once.contains("} finally {"));
}

#[test]
fn configuration_flows_into_generated_code() {
    let (config, diagnostics) = LatheConfig::load_from_str_with_diagnostics(
        r#"
[constructor]
add_constructor_properties = false

[relations]
naming = "capitalized"
runtime_package = "com.acme.data"
"#,
    )
    .unwrap();
    assert!(diagnostics.unknown_keys.is_empty());

    let (mut ast, cu) = shop();
    let result = transformer_with(config.transform(), NoResolver).run(&mut ast);
    assert!(result.is_empty(), "{result:?}");

    let rendered = render(&ast, cu);
    assert!(rendered.starts_with("package shop;\n\n"));
    assert!(rendered
        .contains("private static final com.acme.data.OneToManyRelation<Customer, Order> Orders"));
    assert!(!rendered.contains("ConstructorProperties"));
}
