//! Annotation handler abstraction.
//!
//! Handlers (constructors, relations, cleanup, ...) are registered with a
//! [`HandlerRegistry`]. The registry matches annotation occurrences in a tree
//! to handlers and runs them in the phase they declare; a [`Transformer`]
//! drives all phases in order.

mod context;
mod error;
mod handler;
mod phase;
mod registry;
pub mod resolve;
mod sink;
mod transformer;
mod values;

pub use context::HandlerContext;
pub use error::HandlerError;
pub use handler::AnnotationHandler;
pub use phase::Phase;
pub use registry::{DispatchEnv, HandlerRegistry};
pub use resolve::{
    MemoryResolver, NoResolver, ParamType, ResolvedConstructor, ResolvedType, SourceResolver,
    TypeResolver,
};
pub use sink::{DiagnosticSink, Diagnostics};
pub use transformer::Transformer;
pub use values::{AccessLevel, AnnotationValues};
