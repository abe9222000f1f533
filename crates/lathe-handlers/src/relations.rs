//! Relation accessors for `@OneToOne` and `@OneToMany` fields.
//!
//! For an annotated field the base type gains a static singleton implementing
//! the runtime relation contract (see [`crate::contract`]). Its three methods
//! delegate to the getter and setter of the configured key field.

use lathe_config::{RelationNaming, RelationsConfig};
use lathe_core::naming::{capitalize, getter_name, screaming_snake, setter_name};
use lathe_core::{Name, NodeId};
use lathe_framework::{AnnotationHandler, AnnotationValues, HandlerContext, HandlerError, Phase};
use lathe_tree::{
    render, AnnotationDecl, Ast, BinaryOp, Expr, FieldDecl, MethodDecl, Modifiers, NodeKind,
    TreeMaker, TypeDecl, TypeRef, Visibility,
};

use crate::util::inject_member;
use crate::{ONE_TO_MANY, ONE_TO_ONE};

const KEY_TYPE: &str = "java.lang.Long";
const LIST_TYPE: &str = "java.util.List";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelationKind {
    OneToOne,
    OneToMany,
}

impl RelationKind {
    fn runtime_type(self) -> &'static str {
        match self {
            RelationKind::OneToOne => "OneToOneRelation",
            RelationKind::OneToMany => "OneToManyRelation",
        }
    }
}

/// Name of the accessor field generated for `field`.
pub fn accessor_name(naming: RelationNaming, field: &str) -> String {
    match naming {
        RelationNaming::ScreamingSnake => screaming_snake(field),
        RelationNaming::Capitalized => capitalize(field),
    }
}

/// Everything the accessor is built from.
struct Relation {
    kind: RelationKind,
    /// The annotated field.
    field: Name,
    field_ty: TypeRef,
    base: TypeRef,
    /// The element type for one-to-many, the field type for one-to-one.
    related: TypeRef,
    /// Name of the key field read and written through its accessors.
    key: String,
    unique: bool,
}

impl Relation {
    /// Type of the `item` parameter of `getReferencedKey` and `setRelatedId`:
    /// the side of the relation that holds the key.
    fn key_holder(&self) -> TypeRef {
        match self.kind {
            RelationKind::OneToOne => self.base.clone(),
            RelationKind::OneToMany => self.related.clone(),
        }
    }

    fn contract_type(&self, relations: &RelationsConfig) -> TypeRef {
        TypeRef::generic(
            relations.runtime_type(self.kind.runtime_type()),
            [self.base.clone(), self.related.clone()],
        )
    }

    fn get_referenced_key(&self, maker: &mut TreeMaker<'_>) -> NodeId {
        let item = maker.param("item", self.key_holder(), Vec::new());
        let ret = maker.ret(Expr::call(Expr::name("item"), getter_name(&self.key), vec![]));
        override_method(
            maker,
            "getReferencedKey",
            TypeRef::named(KEY_TYPE),
            vec![item],
            vec![ret],
        )
    }

    fn set_referenced_object(&self, maker: &mut TreeMaker<'_>) -> NodeId {
        let ref_ty = if self.unique {
            TypeRef::generic(LIST_TYPE, [self.field_ty.clone()])
        } else {
            self.field_ty.clone()
        };
        let item = maker.param("item", self.base.clone(), Vec::new());
        let reference = maker.param("ref", ref_ty, Vec::new());

        let target = Expr::field(Expr::name("item"), self.field.clone());
        let stmt = if self.unique {
            let first = Expr::call(Expr::name("ref"), "get", vec![Expr::int(0)]);
            let assign = maker.expr_stmt(Expr::assign(target, first));
            let non_empty = Expr::binary(
                BinaryOp::Gt,
                Expr::call(Expr::name("ref"), "size", vec![]),
                Expr::int(0),
            );
            maker.if_then(non_empty, assign)
        } else {
            maker.expr_stmt(Expr::assign(target, Expr::name("ref")))
        };
        override_method(
            maker,
            "setReferencedObject",
            TypeRef::named("void"),
            vec![item, reference],
            vec![stmt],
        )
    }

    fn set_related_id(&self, maker: &mut TreeMaker<'_>) -> NodeId {
        let item = maker.param("item", self.key_holder(), Vec::new());
        let id = maker.param("id", TypeRef::named(KEY_TYPE), Vec::new());
        let call = maker.expr_stmt(Expr::call(
            Expr::name("item"),
            setter_name(&self.key),
            vec![Expr::name("id")],
        ));
        override_method(
            maker,
            "setRelatedId",
            TypeRef::named("void"),
            vec![item, id],
            vec![call],
        )
    }

    /// `private static final Contract<Base, Related> NAME = new Contract<..>() {...};`
    fn create_accessor(
        &self,
        ast: &mut Ast,
        source: NodeId,
        name: &str,
        relations: &RelationsConfig,
    ) -> NodeId {
        let contract = self.contract_type(relations);
        let mut maker = TreeMaker::new(ast, source);

        let methods = vec![
            self.get_referenced_key(&mut maker),
            self.set_referenced_object(&mut maker),
            self.set_related_id(&mut maker),
        ];
        let mut body = TypeDecl::class("");
        body.members = methods;
        let body = maker.type_decl(body);

        let suppress =
            maker.annotation(AnnotationDecl::new("java.lang.SuppressWarnings").arg("value", "all"));
        let init = Expr::New {
            ty: contract.clone(),
            args: Vec::new(),
            body: Some(body),
        };
        maker.field(
            FieldDecl::new(name, contract)
                .with_modifiers(Modifiers::new(Visibility::Private).with_static().with_final())
                .annotated(vec![suppress])
                .with_init(init),
        )
    }
}

fn override_method(
    maker: &mut TreeMaker<'_>,
    name: &str,
    return_type: TypeRef,
    params: Vec<NodeId>,
    body: Vec<NodeId>,
) -> NodeId {
    let marker = maker.marker("java.lang.Override");
    let mut decl = MethodDecl::method(name, return_type);
    decl.annotations = vec![marker];
    decl.params = params;
    decl.body = Some(body);
    maker.method(decl)
}

pub struct RelationHandler {
    kind: RelationKind,
}

impl RelationHandler {
    pub fn new(kind: RelationKind) -> Self {
        Self { kind }
    }
}

impl AnnotationHandler for RelationHandler {
    fn annotation_names(&self) -> &'static [&'static str] {
        match self.kind {
            RelationKind::OneToOne => &[ONE_TO_ONE],
            RelationKind::OneToMany => &[ONE_TO_MANY],
        }
    }

    fn phase(&self) -> Phase {
        match self.kind {
            RelationKind::OneToOne => Phase::Parse,
            RelationKind::OneToMany => Phase::Members,
        }
    }

    fn handle(
        &self,
        ctx: &mut HandlerContext<'_>,
        values: &AnnotationValues,
    ) -> Result<(), HandlerError> {
        let annotation = ctx.annotation();
        let simple = values.simple_name();

        let Some(field_node) = ctx
            .target()
            .filter(|&t| ctx.ast.kind(t) == Some(NodeKind::Field))
        else {
            return Err(HandlerError::usage(format!("@{simple} is legal only on fields.")));
        };
        let field = ctx
            .ast
            .as_field(field_node)
            .cloned()
            .ok_or_else(|| HandlerError::internal("field node without a field"))?;
        if field.modifiers.is_static {
            return Err(HandlerError::usage(format!(
                "@{simple} is not legal on static fields."
            )));
        }
        let key = values.string("field", "");
        if key.is_empty() {
            return Err(HandlerError::usage(format!(
                "@{simple} needs the name of the key field in `field`."
            )));
        }
        let base = ctx
            .ast
            .up(field_node)
            .filter(|&t| ctx.ast.kind(t) == Some(NodeKind::Type))
            .ok_or_else(|| HandlerError::internal("field outside of a type"))?;
        let base_name = ctx.ast.type_decl(base)?.name.clone();

        let relations = &ctx.config().relations;
        let name = accessor_name(relations.naming, &field.name);
        if ctx.ast.field_exists(base, &name) {
            tracing::debug!(%name, "relation accessor already present");
            return Ok(());
        }

        let related = match self.kind {
            RelationKind::OneToOne => field.ty.clone(),
            RelationKind::OneToMany => field.ty.args.first().unwrap_or(&field.ty).clone(),
        };
        let relation = Relation {
            kind: self.kind,
            field: field.name.clone(),
            field_ty: field.ty.clone(),
            base: TypeRef::named(base_name),
            related,
            key,
            unique: self.kind == RelationKind::OneToMany && values.bool("unique", false),
        };

        let accessor = relation.create_accessor(ctx.ast, annotation, &name, relations);
        inject_member(ctx.ast, base, accessor, true)?;
        ctx.ast.rebuild(base)?;

        tracing::debug!(%name, ?base, "generated relation accessor");
        tracing::trace!(source = %render(ctx.ast, accessor), "generated member");
        Ok(())
    }
}
