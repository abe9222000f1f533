//! Built-in annotation handlers.
//!
//! - `@NoArgsConstructor`, `@RequiredArgsConstructor`, `@AllArgsConstructor`
//!   and `@CustomArgsConstructor` synthesize constructors (and optional
//!   static factories) from a [`FieldSelection`].
//! - `@OneToOne` and `@OneToMany` synthesize relation accessors.
//! - `@Cleanup` wraps the rest of a scope in `try`/`finally`.
//!
//! [`builtin_handlers`] registers all of them.

mod cleanup;
mod constructor;
pub mod contract;
mod fields;
mod relations;
mod super_ctor;
mod util;

use lathe_framework::HandlerRegistry;

pub use cleanup::{CleanupHandler, Release};
pub use constructor::{
    constructor_or_constructor_annotation_exists, generate_constructor, ConstructorData,
    ConstructorHandler, ConstructorKind,
};
pub use fields::{nonexistent_fields, FieldSelection};
pub use relations::{accessor_name, RelationHandler, RelationKind};
pub use super_ctor::{discover, SuperTarget};
pub use util::{is_non_null, is_reserved, non_null_annotations, nullable_annotations};

pub const NO_ARGS_CONSTRUCTOR: &str = "lathe.NoArgsConstructor";
pub const REQUIRED_ARGS_CONSTRUCTOR: &str = "lathe.RequiredArgsConstructor";
pub const ALL_ARGS_CONSTRUCTOR: &str = "lathe.AllArgsConstructor";
pub const CUSTOM_ARGS_CONSTRUCTOR: &str = "lathe.CustomArgsConstructor";
pub const ONE_TO_ONE: &str = "lathe.OneToOne";
pub const ONE_TO_MANY: &str = "lathe.OneToMany";
pub const CLEANUP: &str = "lathe.Cleanup";

/// Annotations that make a type get a constructor.
pub const CONSTRUCTOR_ANNOTATIONS: [&str; 4] = [
    NO_ARGS_CONSTRUCTOR,
    REQUIRED_ARGS_CONSTRUCTOR,
    ALL_ARGS_CONSTRUCTOR,
    CUSTOM_ARGS_CONSTRUCTOR,
];

/// A registry with every built-in handler.
pub fn builtin_handlers() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    for kind in [
        ConstructorKind::NoArgs,
        ConstructorKind::RequiredArgs,
        ConstructorKind::AllArgs,
        ConstructorKind::CustomArgs,
    ] {
        registry.register(Box::new(ConstructorHandler::new(kind)));
    }
    registry.register(Box::new(RelationHandler::new(RelationKind::OneToOne)));
    registry.register(Box::new(RelationHandler::new(RelationKind::OneToMany)));
    registry.register(Box::new(CleanupHandler));
    registry
}
