//! Superclass-constructor discovery.

use lathe_core::{NodeId, LATHE_RESOLUTION};
use lathe_framework::{HandlerContext, ParamType};
use lathe_tree::{Expr, TypeRef, Visibility};

/// One parameter-list shape under which a generated constructor calls its
/// superclass constructor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SuperTarget {
    /// No explicit `super(...)` call.
    Implicit,
    Explicit(Vec<TypeRef>),
}

impl SuperTarget {
    pub fn params(&self) -> &[TypeRef] {
        match self {
            SuperTarget::Implicit => &[],
            SuperTarget::Explicit(params) => params,
        }
    }

    /// Placeholder parameter names: `arg0`, `arg1`, ...
    pub fn arg_names(&self) -> Vec<String> {
        (0..self.params().len()).map(|i| format!("arg{i}")).collect()
    }

    pub fn args(&self) -> Vec<Expr> {
        self.arg_names().into_iter().map(Expr::name).collect()
    }
}

/// One target per visible (public or protected) superclass constructor.
///
/// Falls back to a single [`SuperTarget::Implicit`] when `ty` has no
/// supertype, the supertype cannot be resolved, or none of its constructors
/// are usable. Overloads come out sorted by parameter count, then by their
/// rendered parameter types, whatever order the resolver reports them in.
pub fn discover(ctx: &mut HandlerContext<'_>, ty: NodeId) -> Vec<SuperTarget> {
    let Some(extends) = ctx.ast.as_type(ty).and_then(|decl| decl.extends.clone()) else {
        return vec![SuperTarget::Implicit];
    };
    let Some(resolved) = ctx.resolver().resolve(ctx.ast, ty, &extends) else {
        tracing::warn!(
            supertype = %extends,
            "supertype not resolved; falling back to the implicit constructor"
        );
        return vec![SuperTarget::Implicit];
    };

    let mut targets = Vec::new();
    for ctor in &resolved.constructors {
        if ctor.is_synthetic
            || !matches!(ctor.visibility, Visibility::Public | Visibility::Protected)
        {
            continue;
        }
        let mut params = Vec::with_capacity(ctor.params.len());
        let mut convertible = true;
        for param in &ctor.params {
            match param {
                ParamType::Denotable(param_ty) => params.push(param_ty.clone()),
                ParamType::NonDenotable { description } => {
                    ctx.error_at(
                        ty,
                        LATHE_RESOLUTION,
                        format!("Can't create super constructor call: {description}"),
                    );
                    convertible = false;
                    break;
                }
            }
        }
        if convertible {
            targets.push(params);
        }
    }

    if targets.is_empty() {
        return vec![SuperTarget::Implicit];
    }
    targets.sort_by_cached_key(|params| {
        let rendered: Vec<String> = params.iter().map(ToString::to_string).collect();
        (params.len(), rendered)
    });
    targets.into_iter().map(SuperTarget::Explicit).collect()
}
