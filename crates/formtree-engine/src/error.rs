#![forbid(unsafe_code)]

//! Engine lifecycle errors.
//!
//! Export and validation themselves never fail. Only the attach / detach
//! lifecycle has caller-visible failure modes.

/// Errors from the attach / detach lifecycle.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// `attach` was called while a root is already attached.
    #[error("engine is already attached")]
    AlreadyAttached,
    /// An attached-root operation was called with no root attached.
    #[error("engine is not attached")]
    NotAttached,
}
