use lathe_core::{LATHE_INTERNAL, LATHE_USAGE};
use lathe_tree::TreeError;

/// Why a handler stopped generating code for one annotation occurrence.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// The annotation is misplaced or a precondition the user controls is unmet.
    #[error("{0}")]
    Usage(String),
    /// The tree is not in the shape the handler relies on.
    #[error("internal bug: {0}")]
    Internal(String),
    #[error("internal bug: {0}")]
    Tree(#[from] TreeError),
}

impl HandlerError {
    pub fn usage(message: impl Into<String>) -> Self {
        HandlerError::Usage(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        HandlerError::Internal(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            HandlerError::Usage(_) => LATHE_USAGE,
            HandlerError::Internal(_) | HandlerError::Tree(_) => LATHE_INTERNAL,
        }
    }
}
