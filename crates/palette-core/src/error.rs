use thiserror::Error;

/// Top-level error type for the command palette workspace.
///
/// Subsystem crates define their own error enums and convert into
/// `PaletteError` where a failure crosses a crate boundary.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PaletteError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Classification error: {0}")]
    Classification(String),
}

impl From<toml::de::Error> for PaletteError {
    fn from(err: toml::de::Error) -> Self {
        PaletteError::Config(err.to_string())
    }
}

/// A specialized `Result` type for palette operations.
pub type Result<T> = std::result::Result<T, PaletteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_all_variants() {
        let cases: Vec<(PaletteError, &str)> = vec![
            (
                PaletteError::Config("bad key".to_string()),
                "Configuration error: bad key",
            ),
            (
                PaletteError::Classification("upstream down".to_string()),
                "Classification error: upstream down",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: PaletteError = io_err.into();
        assert!(matches!(err, PaletteError::Io(_)));
        assert!(err.to_string().contains("access denied"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let bad_toml = "invalid = [[[";
        let err: std::result::Result<toml::Value, _> = toml::from_str(bad_toml);
        let err: PaletteError = err.unwrap_err().into();
        assert!(matches!(err, PaletteError::Config(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let value = io_result?;
            Ok(value.to_string())
        }

        assert_eq!(inner().unwrap(), "42");
    }
}
