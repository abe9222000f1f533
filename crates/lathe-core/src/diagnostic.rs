use crate::{NodeId, Span};

/// Annotation placed on an element kind it does not support, or a required
/// precondition is unmet.
pub const LATHE_USAGE: &str = "LATHE_USAGE";
/// Annotation parameters that are inconsistent or name things that do not exist.
pub const LATHE_CONFIG: &str = "LATHE_CONFIG";
/// The tree is not in the shape a handler expects.
pub const LATHE_INTERNAL: &str = "LATHE_INTERNAL";
/// A type could not be resolved or converted while generating code.
pub const LATHE_RESOLUTION: &str = "LATHE_RESOLUTION";
/// A scoped resource is assigned to, or aliased by, another variable.
pub const LATHE_SUSPICIOUS_ASSIGNMENT: &str = "LATHE_SUSPICIOUS_ASSIGNMENT";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

/// Points a diagnostic at one parameter of an annotation, optionally at one
/// element of an array-valued parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamLocation {
    pub name: String,
    pub index: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    pub span: Option<Span>,
    pub node: Option<NodeId>,
    pub param: Option<ParamLocation>,
}

impl Diagnostic {
    pub fn error(code: &'static str, message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            span,
            node: None,
            param: None,
        }
    }

    pub fn warning(code: &'static str, message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            span,
            node: None,
            param: None,
        }
    }

    #[must_use]
    pub fn on_node(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }

    #[must_use]
    pub fn on_param(mut self, name: impl Into<String>, index: Option<usize>) -> Self {
        self.param = Some(ParamLocation {
            name: name.into(),
            index,
        });
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
