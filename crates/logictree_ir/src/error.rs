//! Errors raised by IR construction and evaluation.

/// Result alias for IR operations.
pub type IrResult<T> = Result<T, IrError>;

/// A failed constructor check or an evaluation that cannot complete.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IrError {
    /// A node was built in violation of its width or shape rules.
    #[error("invariant violated in {node}: {detail}")]
    InvariantViolation {
        /// Kind of the offending node, e.g. `"BitSelect"`.
        node: &'static str,
        /// What was wrong.
        detail: String,
    },
    /// Evaluation read a signal missing from the environment.
    #[error("signal `{0}` has no value in the environment")]
    Unbound(String),
}

impl IrError {
    pub(crate) fn invariant(node: &'static str, detail: impl Into<String>) -> Self {
        IrError::InvariantViolation {
            node,
            detail: detail.into(),
        }
    }
}
