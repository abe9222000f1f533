//! Core shared types for Lathe.
//!
//! Position spans, node identifiers, diagnostics and the identifier naming
//! conventions shared by the tree, the dispatcher and the handlers.

mod diagnostic;
mod id;
pub mod naming;
mod span;

pub use diagnostic::{
    Diagnostic, ParamLocation, Severity, LATHE_CONFIG, LATHE_INTERNAL, LATHE_RESOLUTION,
    LATHE_SUSPICIOUS_ASSIGNMENT, LATHE_USAGE,
};
pub use id::NodeId;
pub use span::Span;

pub use smol_str::SmolStr as Name;
pub use text_size::{TextRange, TextSize};
