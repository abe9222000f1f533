use std::collections::{HashMap, HashSet};

use lathe_config::TransformConfig;
use lathe_core::{Diagnostic, NodeId};
use lathe_tree::{Ast, NodeKind};

use crate::context::HandlerContext;
use crate::handler::AnnotationHandler;
use crate::phase::Phase;
use crate::resolve::TypeResolver;
use crate::sink::DiagnosticSink;
use crate::values::AnnotationValues;

/// Shared inputs of one dispatch pass.
pub struct DispatchEnv<'a> {
    pub config: &'a TransformConfig,
    pub resolver: &'a dyn TypeResolver,
    pub sink: &'a mut dyn DiagnosticSink,
}

#[derive(Default)]
pub struct HandlerRegistry {
    handlers: Vec<Box<dyn AnnotationHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Box<dyn AnnotationHandler>) {
        self.handlers.push(handler);
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Handlers registered for `annotation` in `phase`, in registration order.
    pub fn handlers_for<'r>(
        &'r self,
        ast: &Ast,
        annotation: NodeId,
        phase: Phase,
    ) -> Vec<&'r dyn AnnotationHandler> {
        let Some(decl) = ast.as_annotation(annotation) else {
            return Vec::new();
        };
        self.handlers
            .iter()
            .filter(|h| h.phase() == phase)
            .filter(|h| h.annotation_names().iter().any(|name| decl.matches(name)))
            .map(|h| h.as_ref())
            .collect()
    }

    /// Runs every handler of `phase` over the user-written annotations of the
    /// whole tree, in source order. Returns the number of handler invocations.
    ///
    /// Occurrences are collected before any handler runs, so annotations a
    /// handler generates are never dispatched in the same pass. Occurrences
    /// inside a supertype declared in the tree run before those inside its
    /// subtypes, wherever the two are declared.
    pub fn dispatch(&self, ast: &mut Ast, phase: Phase, env: &mut DispatchEnv<'_>) -> usize {
        let mut occurrences: Vec<NodeId> = ast
            .roots()
            .iter()
            .flat_map(|&root| ast.descendants(root))
            .filter(|&node| ast.kind(node) == Some(NodeKind::Annotation) && !ast.is_generated(node))
            .collect();
        supertypes_first(ast, &mut occurrences);

        let mut invocations = 0;
        for annotation in occurrences {
            let handlers = self.handlers_for(ast, annotation, phase);
            if handlers.is_empty() {
                continue;
            }
            let Some(values) = AnnotationValues::new(ast, annotation) else {
                continue;
            };
            for handler in handlers {
                let span = tracing::debug_span!(
                    "handle",
                    %phase,
                    annotation = values.name(),
                    node = ?annotation
                );
                let _guard = span.enter();
                invocations += 1;

                let result = {
                    let mut ctx = HandlerContext::new(
                        ast,
                        annotation,
                        env.config,
                        env.resolver,
                        &mut *env.sink,
                    );
                    handler.handle(&mut ctx, &values)
                };
                if let Err(err) = result {
                    tracing::debug!(error = %err, "handler aborted");
                    let location = ast.span(annotation);
                    env.sink.report(
                        Diagnostic::error(err.code(), err.to_string(), Some(location))
                            .on_node(annotation),
                    );
                }
            }
        }
        invocations
    }
}

/// Stable sort of `occurrences` by how many in-tree supertypes their
/// enclosing type has. Supertypes are looked up by simple name, first
/// declaration wins.
fn supertypes_first(ast: &Ast, occurrences: &mut [NodeId]) {
    let mut by_name: HashMap<&str, NodeId> = HashMap::new();
    for node in ast.roots().iter().flat_map(|&root| ast.descendants(root)) {
        if let Some(decl) = ast.as_type(node).filter(|decl| !decl.is_anonymous()) {
            by_name.entry(decl.name.as_str()).or_insert(node);
        }
    }

    let depth = |ty: NodeId| {
        let mut seen = HashSet::from([ty]);
        let mut current = ty;
        while let Some(parent) = ast
            .as_type(current)
            .and_then(|decl| decl.extends.as_ref())
            .and_then(|extends| by_name.get(extends.simple_name()).copied())
        {
            // Cyclic hierarchies stop at the first repeat.
            if !seen.insert(parent) {
                break;
            }
            current = parent;
        }
        seen.len() - 1
    };
    occurrences.sort_by_cached_key(|&annotation| ast.enclosing_type(annotation).map_or(0, &depth));
}
