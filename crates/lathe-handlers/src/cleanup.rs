//! `@Cleanup`: releases a local resource on every exit from its scope.
//!
//! ```text
//! @Cleanup InputStream in = open();      InputStream in = open();
//! read(in);                        =>    try {
//! more(in);                                  read(in);
//!                                            more(in);
//!                                        } finally {
//!                                            if (in instanceof java.io.Closeable) {
//!                                                ((java.io.Closeable) in).close();
//!                                            }
//!                                        }
//! ```

use lathe_core::{NodeId, Span, LATHE_SUSPICIOUS_ASSIGNMENT};
use lathe_framework::{AnnotationHandler, AnnotationValues, HandlerContext, HandlerError, Phase};
use lathe_tree::{
    render, Ast, BinaryOp, CatchClause, Element, Expr, NodeKind, Origin, Stmt, TreeMaker, TypeRef,
};

use crate::CLEANUP;

const DEFAULT_CLEANUP: &str = "close";
const CLOSEABLE: &str = "java.io.Closeable";
const IO_EXCEPTION: &str = "java.io.IOException";

const ALIASED: &str =
    "You're assigning an auto-cleanup variable to something else. This is a bad idea.";
const REASSIGNED: &str = "You're reassigning an auto-cleanup variable. \
    The value it was initialized with will not be cleaned up.";

/// How the resource is released.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Release {
    pub method: String,
    /// The method was named by the user rather than defaulted.
    pub explicit: bool,
    /// Swallow `IOException` thrown by the release call.
    pub quietly: bool,
}

impl Release {
    /// The default `close()` is guarded by a `Closeable` check instead of a
    /// null check.
    pub fn is_default_close(&self) -> bool {
        self.method == DEFAULT_CLEANUP && !self.explicit
    }

    /// Builds the statements of the `finally` block.
    fn statements(&self, maker: &mut TreeMaker<'_>, var: &str) -> Vec<NodeId> {
        let (guard, call) = if self.is_default_close() {
            let closeable = TypeRef::named(CLOSEABLE);
            (
                Expr::instance_of(Expr::name(var), closeable.clone()),
                Expr::call(Expr::cast(closeable, Expr::name(var)), DEFAULT_CLEANUP, vec![]),
            )
        } else {
            // Opaque to the host's null-flow analysis.
            let opaque = Expr::call(
                Expr::call(
                    Expr::name("java.util.Collections"),
                    "singletonList",
                    vec![Expr::name(var)],
                ),
                "get",
                vec![Expr::int(0)],
            );
            (
                Expr::binary(BinaryOp::Ne, opaque, Expr::null()),
                Expr::call(Expr::name(var), self.method.as_str(), vec![]),
            )
        };

        let mut release = maker.expr_stmt(call);
        if self.quietly {
            let body = maker.block(vec![release]);
            let param = maker.param("$ex", TypeRef::named(IO_EXCEPTION), Vec::new());
            let handler = maker.block(Vec::new());
            release = maker.try_stmt(
                body,
                vec![CatchClause {
                    param,
                    body: handler,
                }],
                None,
            );
        }
        let then = maker.block(vec![release]);
        vec![maker.if_then(guard, then)]
    }
}

/// Where the resource's scope ends within its container: the end of the
/// sequence, or for a switch body the next case label.
fn scope_end(ast: &Ast, seq: &[NodeId], start: usize, is_switch: bool) -> usize {
    if !is_switch {
        return seq.len();
    }
    seq[start..]
        .iter()
        .position(|&n| matches!(ast.as_stmt(n), Some(Stmt::Case(_))))
        .map_or(seq.len(), |i| start + i)
}

fn strip_casts(mut expr: &Expr) -> &Expr {
    while let Expr::Cast { expr: inner, .. } = expr {
        expr = inner;
    }
    expr
}

fn is_var(expr: &Expr, var: &str) -> bool {
    matches!(strip_casts(expr), Expr::Name(name) if name == var)
}

/// Pre-order walk of `roots` that does not enter nested type bodies, where
/// the resource name may be shadowed.
fn scope_nodes(ast: &Ast, roots: &[NodeId]) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack: Vec<NodeId> = roots.iter().rev().copied().collect();
    while let Some(node) = stack.pop() {
        if ast.kind(node) == Some(NodeKind::Type) {
            continue;
        }
        out.push(node);
        stack.extend(ast.down(node).into_iter().rev());
    }
    out
}

/// Statements in `tail` (at any depth) that alias or reassign `var`.
fn suspicious_assignments(ast: &Ast, tail: &[NodeId], var: &str) -> Vec<(NodeId, &'static str)> {
    let mut found = Vec::new();
    for node in scope_nodes(ast, tail) {
        match ast.element(node) {
            Some(Element::Statement(Stmt::Expr(Expr::Assign { target, value }))) => {
                if is_var(value, var) {
                    found.push((node, ALIASED));
                } else if matches!(&**target, Expr::Name(name) if name == var) {
                    found.push((node, REASSIGNED));
                }
            }
            Some(Element::Local(local)) => {
                if local.init.as_ref().is_some_and(|init| is_var(init, var)) {
                    found.push((node, ALIASED));
                }
            }
            _ => {}
        }
    }
    found
}

pub struct CleanupHandler;

impl AnnotationHandler for CleanupHandler {
    fn annotation_names(&self) -> &'static [&'static str] {
        &[CLEANUP]
    }

    fn phase(&self) -> Phase {
        Phase::Bodies
    }

    fn handle(
        &self,
        ctx: &mut HandlerContext<'_>,
        values: &AnnotationValues,
    ) -> Result<(), HandlerError> {
        let annotation = ctx.annotation();
        let release = Release {
            method: values.string("value", DEFAULT_CLEANUP),
            explicit: values.is_explicit("value"),
            quietly: values.bool("quietly", false),
        };
        if release.method.is_empty() {
            return Err(HandlerError::usage("cleanupName cannot be the empty string."));
        }

        let decl = ctx
            .target()
            .filter(|&t| ctx.ast.kind(t) == Some(NodeKind::LocalVariable))
            .ok_or_else(|| {
                HandlerError::usage("@Cleanup is legal only on local variable declarations.")
            })?;
        let local = ctx
            .ast
            .as_local(decl)
            .cloned()
            .ok_or_else(|| HandlerError::internal("local variable node without a declaration"))?;
        if local.init.is_none() {
            return Err(HandlerError::usage(
                "@Cleanup variable declarations need to be initialized.",
            ));
        }

        let container = ctx
            .ast
            .direct_up(decl)
            .filter(|&p| {
                matches!(
                    ctx.ast.element(p),
                    Some(Element::Method(_))
                        | Some(Element::Statement(Stmt::Block(_) | Stmt::Switch { .. }))
                )
            })
            .ok_or_else(|| {
                HandlerError::usage(
                    "@Cleanup is legal only on a local variable declaration inside a block.",
                )
            })?;
        let is_switch = matches!(ctx.ast.as_stmt(container), Some(Stmt::Switch { .. }));

        let seq = ctx.ast.sequence(container)?.to_vec();
        if seq.is_empty() {
            return Err(HandlerError::internal("Parent block does not contain any statements."));
        }
        let position = seq.iter().position(|&n| n == decl).ok_or_else(|| {
            HandlerError::internal("Can't find this local variable declaration inside its parent.")
        })?;

        let start = position + 1;
        if seq.get(start).is_some_and(|&next| {
            ctx.ast.origin(next) == Some(Origin::Generated { by: annotation })
        }) {
            tracing::debug!(var = %local.name, "cleanup already applied");
            return Ok(());
        }
        let end = scope_end(ctx.ast, &seq, start, is_switch);
        let tail = seq[start..end].to_vec();

        for (node, message) in suspicious_assignments(ctx.ast, &tail, &local.name) {
            ctx.warning_at(node, LATHE_SUSPICIOUS_ASSIGNMENT, message);
        }

        let decl_end = ctx.ast.span(decl).end;
        let tail_end = tail.last().map_or(decl_end, |&n| ctx.ast.span(n).end);
        let try_span = Span::new(decl_end, tail_end.max(decl_end));
        let container_end = ctx.ast.span(container).end;

        let mut maker = TreeMaker::new(ctx.ast, annotation);
        let release_stmts = release.statements(&mut maker, &local.name);
        if !is_switch {
            maker.at(Span::point(container_end));
        }
        let finally = maker.block(release_stmts);
        let body = maker.at(try_span).block(tail);
        let try_stmt = maker.try_stmt(body, Vec::new(), Some(finally));

        let mut rewritten = seq[..start].to_vec();
        rewritten.push(try_stmt);
        rewritten.extend_from_slice(&seq[end..]);
        ctx.ast.replace_children(container, rewritten)?;
        ctx.ast.rebuild(container)?;

        tracing::debug!(
            var = %local.name,
            statements = end - start,
            "wrapped scope in try/finally"
        );
        tracing::trace!(source = %render(ctx.ast, try_stmt), "generated statement");
        Ok(())
    }
}
