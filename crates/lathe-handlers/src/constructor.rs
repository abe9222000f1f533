//! Constructor synthesis and the `@*ArgsConstructor` handlers.

use lathe_core::{Name, NodeId};
use lathe_framework::{
    AccessLevel, AnnotationHandler, AnnotationValues, HandlerContext, HandlerError, Phase,
};
use lathe_tree::{
    render, AnnotationDecl, AnnotationValue, Ast, BinaryOp, Expr, Literal, MethodDecl, Modifiers,
    NodeKind, TreeMaker, TypeFlavor, TypeRef, Visibility,
};

use crate::fields::{nonexistent_fields, FieldSelection};
use crate::super_ctor::{discover, SuperTarget};
use crate::util::{
    copy_annotations, generated_by, inject_member, non_null_annotations, nullable_annotations,
};
use crate::{
    ALL_ARGS_CONSTRUCTOR, CONSTRUCTOR_ANNOTATIONS, CUSTOM_ARGS_CONSTRUCTOR, NO_ARGS_CONSTRUCTOR,
    REQUIRED_ARGS_CONSTRUCTOR,
};

const CONSTRUCTOR_PROPERTIES: &str = "java.beans.ConstructorProperties";
const NULL_POINTER_EXCEPTION: &str = "java.lang.NullPointerException";

/// What to generate for one constructor annotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstructorData {
    pub fields: FieldSelection,
    pub access: AccessLevel,
    /// Name of a companion static factory; empty for none.
    pub static_name: String,
    pub call_super: bool,
    pub suppress_constructor_properties: bool,
}

impl ConstructorData {
    pub fn new(fields: FieldSelection) -> Self {
        Self {
            fields,
            access: AccessLevel::Public,
            static_name: String::new(),
            call_super: false,
            suppress_constructor_properties: false,
        }
    }

    pub fn static_constructor_required(&self) -> bool {
        !self.static_name.is_empty()
    }
}

/// Whether `ty` already has a user-written constructor or carries any of the
/// constructor annotations.
///
/// For host handlers that add a constructor as a side effect: they check
/// this before calling [`generate_constructor`], so an explicit constructor
/// or annotation takes precedence. The built-in handlers never do.
pub fn constructor_or_constructor_annotation_exists(ast: &Ast, ty: NodeId) -> bool {
    let Some(decl) = ast.as_type(ty) else {
        return false;
    };
    let user_constructor = decl.members.iter().any(|&m| {
        !ast.is_generated(m) && ast.as_method(m).is_some_and(MethodDecl::is_constructor)
    });
    user_constructor
        || decl.annotations.iter().any(|&a| {
            ast.as_annotation(a)
                .is_some_and(|ann| CONSTRUCTOR_ANNOTATIONS.iter().any(|name| ann.matches(name)))
        })
}

/// A selected field as seen by the generated parameter list.
struct FieldParam {
    name: Name,
    ty: TypeRef,
    non_null: Vec<NodeId>,
    nullable: Vec<NodeId>,
}

impl FieldParam {
    fn collect(ast: &Ast, fields: &[NodeId]) -> Vec<FieldParam> {
        fields
            .iter()
            .filter_map(|&node| {
                let field = ast.as_field(node)?;
                Some(FieldParam {
                    name: field.name.clone(),
                    ty: field.ty.clone(),
                    non_null: non_null_annotations(ast, node),
                    nullable: nullable_annotations(ast, node),
                })
            })
            .collect()
    }

    fn param(&self, maker: &mut TreeMaker<'_>) -> NodeId {
        let mut markers = self.non_null.clone();
        markers.extend(&self.nullable);
        let annotations = copy_annotations(maker, &markers);
        maker.param(&self.name, self.ty.clone(), annotations)
    }
}

/// Generates one constructor per superclass-constructor target (one
/// implicit target unless `call_super` is set), plus a static factory per
/// target when requested, and commits them into `ty`.
///
/// Returns the generated members. Nothing is generated for
/// [`AccessLevel::None`], or when `source` already generated members of
/// `ty` in an earlier run.
pub fn generate_constructor(
    ctx: &mut HandlerContext<'_>,
    ty: NodeId,
    source: NodeId,
    data: &ConstructorData,
) -> Result<Vec<NodeId>, HandlerError> {
    let Some(access) = data.access.visibility() else {
        return Ok(Vec::new());
    };
    if generated_by(ctx.ast, ty, source) {
        tracing::debug!(?ty, "constructor already generated");
        return Ok(Vec::new());
    }

    let targets = if data.call_super {
        discover(ctx, ty)
    } else {
        vec![SuperTarget::Implicit]
    };
    let add_properties = ctx.config().constructor.add_constructor_properties
        && !data.suppress_constructor_properties;
    let fields = data.fields.select(ctx.ast, ty);

    let mut generated = Vec::new();
    for target in &targets {
        let ctor = create_constructor(
            ctx.ast,
            ty,
            source,
            data,
            access,
            add_properties,
            &fields,
            target,
        )?;
        inject_member(ctx.ast, ty, ctor, false)?;
        generated.push(ctor);
        if data.static_constructor_required() {
            let factory =
                create_static_constructor(ctx.ast, ty, source, data, access, &fields, target)?;
            inject_member(ctx.ast, ty, factory, false)?;
            generated.push(factory);
        }
        ctx.ast.rebuild(ty)?;
    }

    for &member in &generated {
        tracing::debug!(?ty, ?member, "generated constructor");
        tracing::trace!(source = %render(ctx.ast, member), "generated member");
    }
    Ok(generated)
}

#[allow(clippy::too_many_arguments)]
fn create_constructor(
    ast: &mut Ast,
    ty: NodeId,
    source: NodeId,
    data: &ConstructorData,
    access: Visibility,
    add_properties: bool,
    fields: &[NodeId],
    target: &SuperTarget,
) -> Result<NodeId, HandlerError> {
    let decl = ast.type_decl(ty)?;
    let type_name = decl.name.clone();
    let is_enum = decl.flavor == TypeFlavor::Enum;
    let is_local = ast.is_local_type(ty);
    let level = if is_enum || data.static_constructor_required() {
        Visibility::Private
    } else {
        access
    };
    let fields = FieldParam::collect(ast, fields);

    let mut maker = TreeMaker::new(ast, source);
    let mut params = Vec::new();
    let mut statements = Vec::new();
    let mut assigns = Vec::new();
    let mut names = Vec::new();

    if let SuperTarget::Explicit(types) = target {
        for (name, param_ty) in target.arg_names().into_iter().zip(types) {
            params.push(maker.param(&name, param_ty.clone(), Vec::new()));
            names.push(name);
        }
        statements.push(maker.expr_stmt(Expr::bare_call("super", target.args())));
    }

    for field in &fields {
        params.push(field.param(&mut maker));
        names.push(field.name.to_string());
        if !field.non_null.is_empty() && !field.ty.is_primitive() {
            let throw = maker.throw(Expr::new_instance(
                TypeRef::named(NULL_POINTER_EXCEPTION),
                vec![Expr::str(field.name.as_str())],
            ));
            let check = maker.if_then(
                Expr::binary(BinaryOp::Eq, Expr::name(field.name.clone()), Expr::null()),
                throw,
            );
            statements.push(check);
        }
        assigns.push(maker.expr_stmt(Expr::assign(
            Expr::this_field(field.name.clone()),
            Expr::name(field.name.clone()),
        )));
    }
    statements.extend(assigns);

    let mut annotations = Vec::new();
    if add_properties && level != Visibility::Private && !is_local && !names.is_empty() {
        let values = names
            .iter()
            .map(|n| AnnotationValue::Literal(Literal::Str(n.clone())))
            .collect();
        let properties = AnnotationDecl::new(CONSTRUCTOR_PROPERTIES)
            .arg("value", AnnotationValue::Array(values));
        annotations.push(maker.annotation(properties));
    }

    let mut ctor = MethodDecl::constructor(type_name).with_modifiers(Modifiers::new(level));
    ctor.annotations = annotations;
    ctor.params = params;
    ctor.body = Some(statements);
    Ok(maker.method(ctor))
}

fn create_static_constructor(
    ast: &mut Ast,
    ty: NodeId,
    source: NodeId,
    data: &ConstructorData,
    access: Visibility,
    fields: &[NodeId],
    target: &SuperTarget,
) -> Result<NodeId, HandlerError> {
    let decl = ast.type_decl(ty)?;
    let self_type = decl.self_type();
    let type_params = decl.type_params.clone();
    let fields = FieldParam::collect(ast, fields);

    let mut maker = TreeMaker::new(ast, source);
    let mut params = Vec::new();
    let mut args = target.args();
    if let SuperTarget::Explicit(types) = target {
        for (name, param_ty) in target.arg_names().into_iter().zip(types) {
            params.push(maker.param(&name, param_ty.clone(), Vec::new()));
        }
    }
    for field in &fields {
        params.push(field.param(&mut maker));
        args.push(Expr::name(field.name.clone()));
    }
    let ret = maker.ret(Expr::new_instance(self_type.clone(), args));

    let mut factory = MethodDecl::method(data.static_name.as_str(), self_type)
        .with_modifiers(Modifiers::new(access).with_static());
    factory.type_params = type_params;
    factory.params = params;
    factory.body = Some(vec![ret]);
    Ok(maker.method(factory))
}

/// Which of the four constructor annotations a [`ConstructorHandler`] serves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstructorKind {
    NoArgs,
    RequiredArgs,
    AllArgs,
    CustomArgs,
}

pub struct ConstructorHandler {
    kind: ConstructorKind,
}

impl ConstructorHandler {
    pub fn new(kind: ConstructorKind) -> Self {
        Self { kind }
    }

    /// Reads `of`/`exclude`, warning about unknown names and about both
    /// being given.
    fn custom_selection(
        ctx: &mut HandlerContext<'_>,
        ty: NodeId,
        values: &AnnotationValues,
    ) -> FieldSelection {
        let mut exclude = values
            .is_explicit("exclude")
            .then(|| values.string_list("exclude"));
        let of = values.is_explicit("of").then(|| values.string_list("of"));

        if let Some(names) = &exclude {
            for i in nonexistent_fields(ctx.ast, ty, names, true) {
                ctx.set_warning(
                    "exclude",
                    "This field does not exist, or would have been excluded anyway.",
                    Some(i),
                );
            }
        }
        if let Some(names) = &of {
            let missing = nonexistent_fields(ctx.ast, ty, names, false);
            for i in nonexistent_fields(ctx.ast, ty, names, true) {
                let message = if missing.contains(&i) {
                    "This field does not exist."
                } else {
                    "This field is static or reserved and will not be a parameter."
                };
                ctx.set_warning("of", message, Some(i));
            }
        }
        if exclude.is_some() && of.is_some() {
            exclude = None;
            ctx.set_warning(
                "exclude",
                "exclude and of are mutually exclusive; the 'exclude' parameter will be ignored.",
                None,
            );
        }
        FieldSelection::Custom { of, exclude }
    }
}

impl AnnotationHandler for ConstructorHandler {
    fn annotation_names(&self) -> &'static [&'static str] {
        match self.kind {
            ConstructorKind::NoArgs => &[NO_ARGS_CONSTRUCTOR],
            ConstructorKind::RequiredArgs => &[REQUIRED_ARGS_CONSTRUCTOR],
            ConstructorKind::AllArgs => &[ALL_ARGS_CONSTRUCTOR],
            ConstructorKind::CustomArgs => &[CUSTOM_ARGS_CONSTRUCTOR],
        }
    }

    fn phase(&self) -> Phase {
        Phase::Members
    }

    fn handle(
        &self,
        ctx: &mut HandlerContext<'_>,
        values: &AnnotationValues,
    ) -> Result<(), HandlerError> {
        let annotation = ctx.annotation();
        let ty = ctx
            .target()
            .filter(|&t| ctx.ast.kind(t) == Some(NodeKind::Type))
            .filter(|&t| {
                ctx.ast
                    .as_type(t)
                    .is_some_and(|d| matches!(d.flavor, TypeFlavor::Class | TypeFlavor::Enum))
            })
            .ok_or_else(|| {
                HandlerError::usage(format!(
                    "@{} is only supported on a class or an enum.",
                    values.simple_name()
                ))
            })?;

        // Bogus `of`/`exclude` names are reported even when nothing is
        // generated.
        let fields = match self.kind {
            ConstructorKind::NoArgs => FieldSelection::None,
            ConstructorKind::RequiredArgs => FieldSelection::Required,
            ConstructorKind::AllArgs => FieldSelection::All,
            ConstructorKind::CustomArgs => Self::custom_selection(ctx, ty, values),
        };

        let data = ConstructorData {
            fields,
            access: values.access_level("access", AccessLevel::Public),
            static_name: values.string("staticName", ""),
            call_super: values.bool("callSuper", false),
            suppress_constructor_properties: values.bool("suppressConstructorProperties", false),
        };
        if data.access == AccessLevel::None {
            return Ok(());
        }
        generate_constructor(ctx, ty, annotation, &data)?;
        Ok(())
    }
}
