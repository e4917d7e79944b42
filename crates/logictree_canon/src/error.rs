//! Errors raised while building diagrams or handling golden files.

/// Why an expression could not be canonicalized or a golden record handled.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    /// Operand widths disagree, or a select falls outside its base.
    #[error("width mismatch in {node}: {detail}")]
    WidthMismatch {
        /// Kind of the offending node.
        node: &'static str,
        /// What disagreed.
        detail: String,
    },

    /// A bit variable is missing from an explicit variable order.
    #[error("variable `{0}` is not in the variable order")]
    UnknownVariable(String),

    /// A golden record could not be encoded or decoded.
    #[error("invalid golden record: {0}")]
    Golden(#[from] serde_json::Error),

    /// A golden file could not be read or written.
    #[error("golden file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for hashing.
pub type HashResult<T> = Result<T, HashError>;
