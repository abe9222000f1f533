use lathe_config::TransformConfig;
use lathe_tree::Ast;

use crate::phase::Phase;
use crate::registry::{DispatchEnv, HandlerRegistry};
use crate::resolve::{SourceResolver, TypeResolver};
use crate::sink::{DiagnosticSink, Diagnostics};

/// Runs a handler registry over a tree, one phase after another.
pub struct Transformer {
    registry: HandlerRegistry,
    config: TransformConfig,
    resolver: Box<dyn TypeResolver>,
}

impl Transformer {
    /// Resolves supertypes against the tree being transformed.
    pub fn new(registry: HandlerRegistry, config: TransformConfig) -> Self {
        Self {
            registry,
            config,
            resolver: Box::new(SourceResolver),
        }
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: impl TypeResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Runs a single phase, reporting into `sink`.
    pub fn run_phase(&self, ast: &mut Ast, phase: Phase, sink: &mut dyn DiagnosticSink) -> usize {
        let mut env = DispatchEnv {
            config: &self.config,
            resolver: self.resolver.as_ref(),
            sink,
        };
        self.registry.dispatch(ast, phase, &mut env)
    }

    /// Runs every phase in order.
    pub fn run(&self, ast: &mut Ast) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        for phase in Phase::ALL {
            let invocations = self.run_phase(ast, phase, &mut diagnostics);
            tracing::debug!(%phase, invocations, "phase complete");
        }
        tracing::debug!(
            diagnostics = diagnostics.len(),
            errors = diagnostics.errors().count(),
            "transformation finished"
        );
        diagnostics
    }
}
