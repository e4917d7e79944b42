//! Error types for configuration loading and validation.

/// Errors that can occur when loading or validating a `logictree.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML content could not be parsed, or names an unknown field.
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    /// A field holds a value outside its allowed set.
    #[error("invalid configuration value: {0}")]
    InvalidValue(String),

    /// The values parsed but are inconsistent.
    #[error("validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_parse_error() {
        let err = ConfigError::Parse("expected '=' at line 3".to_string());
        assert_eq!(
            format!("{err}"),
            "failed to parse configuration: expected '=' at line 3"
        );
    }

    #[test]
    fn display_invalid_value() {
        let err = ConfigError::InvalidValue("case_mode = \"tree\"".to_string());
        assert_eq!(
            format!("{err}"),
            "invalid configuration value: case_mode = \"tree\""
        );
    }

    #[test]
    fn display_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = ConfigError::Io(io_err);
        assert!(format!("{err}").starts_with("failed to read configuration:"));
    }
}
