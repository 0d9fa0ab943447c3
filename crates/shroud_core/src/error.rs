//! Error types for the obfuscation engine.

use thiserror::Error;

/// All errors that can be produced by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// An operation was invoked on the wrong node kind, or configuration was
    /// malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The ancestor chain is inconsistent with the claimed relationship.
    #[error("broken ancestor chain: {0}")]
    BrokenChain(String),

    /// Attribution was requested on an occurrence that defines nothing.
    #[error("not a defining occurrence: {0}")]
    NotDefined(String),

    /// A transform declined a syntactic shape it cannot handle.
    #[error("unsupported construct: {0}")]
    UnsupportedConstruct(String),

    /// A transform broke the match/transform contract.
    #[error("engine invariant violated: {0}")]
    EngineInvariant(String),
}

impl EngineError {
    /// `true` when the error must abort the whole run.
    ///
    /// Only [`EngineError::UnsupportedConstruct`] is local: the affected
    /// subtree stays untransformed and the pipeline proceeds.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, EngineError::UnsupportedConstruct(_))
    }
}

/// Convenient `Result` alias for fallible engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
