use lathe_config::TransformConfig;
use lathe_core::{Diagnostic, NodeId, LATHE_CONFIG};
use lathe_tree::Ast;

use crate::resolve::TypeResolver;
use crate::sink::DiagnosticSink;

/// Everything a handler may touch while processing one annotation occurrence.
pub struct HandlerContext<'a> {
    pub ast: &'a mut Ast,
    annotation: NodeId,
    config: &'a TransformConfig,
    resolver: &'a dyn TypeResolver,
    sink: &'a mut dyn DiagnosticSink,
}

impl<'a> HandlerContext<'a> {
    pub fn new(
        ast: &'a mut Ast,
        annotation: NodeId,
        config: &'a TransformConfig,
        resolver: &'a dyn TypeResolver,
        sink: &'a mut dyn DiagnosticSink,
    ) -> Self {
        Self {
            ast,
            annotation,
            config,
            resolver,
            sink,
        }
    }

    /// The annotation node being handled.
    pub fn annotation(&self) -> NodeId {
        self.annotation
    }

    /// The declaration the annotation is attached to.
    pub fn target(&self) -> Option<NodeId> {
        self.ast.up(self.annotation)
    }

    pub fn config(&self) -> &'a TransformConfig {
        self.config
    }

    pub fn resolver(&self) -> &'a dyn TypeResolver {
        self.resolver
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.sink.report(diagnostic);
    }

    /// Error attributed to the annotation.
    pub fn add_error(&mut self, code: &'static str, message: impl Into<String>) {
        let node = self.annotation;
        self.error_at(node, code, message);
    }

    /// Warning attributed to the annotation.
    pub fn add_warning(&mut self, code: &'static str, message: impl Into<String>) {
        let node = self.annotation;
        self.warning_at(node, code, message);
    }

    pub fn error_at(&mut self, node: NodeId, code: &'static str, message: impl Into<String>) {
        let span = self.ast.span(node);
        self.sink
            .report(Diagnostic::error(code, message, Some(span)).on_node(node));
    }

    pub fn warning_at(&mut self, node: NodeId, code: &'static str, message: impl Into<String>) {
        let span = self.ast.span(node);
        self.sink
            .report(Diagnostic::warning(code, message, Some(span)).on_node(node));
    }

    /// Warning about one annotation parameter, or one element of an
    /// array-valued parameter when `index` is given.
    pub fn set_warning(&mut self, param: &str, message: impl Into<String>, index: Option<usize>) {
        let node = self.annotation;
        let span = self.ast.span(node);
        self.sink.report(
            Diagnostic::warning(LATHE_CONFIG, message, Some(span))
                .on_node(node)
                .on_param(param, index),
        );
    }
}
