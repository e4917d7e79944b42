//! Export errors.

use thiserror::Error;

/// Failure while writing or rendering an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The Graphviz `dot` binary could not be started.
    #[error("Graphviz `dot` not found; install Graphviz to render {format} output")]
    GraphvizMissing {
        /// Requested image format.
        format: String,
    },

    /// `dot` ran but reported a failure.
    #[error("Graphviz `dot` failed ({status}): {stderr}")]
    Graphviz {
        /// Exit status as reported by the OS.
        status: String,
        /// Captured standard error.
        stderr: String,
    },
}

/// Result alias for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_graphviz_names_the_format() {
        let err = ExportError::GraphvizMissing {
            format: "png".into(),
        };
        assert!(err.to_string().contains("png"));
    }

    #[test]
    fn io_converts() {
        let err: ExportError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, ExportError::Io(_)));
    }
}
