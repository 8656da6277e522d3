//! Crate-wide error type
//!
//! Tree operations themselves are total; errors only come out of
//! construction and configuration validation

use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Invalid user or API parameter.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// A coordinate that had to lie inside the arena did not.
    #[error("out of bounds: {0}")]
    OutOfBounds(String),

    /// Scenario file could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Scenario file is not valid YAML for `ScenarioConfig`.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_is_informative() {
        let e = Error::InvalidParam("radius must be > 0".to_string());
        let msg = format!("{e}");
        assert!(msg.contains("invalid parameter"));
        assert!(msg.contains("radius"));
    }

    #[test]
    fn yaml_errors_convert() {
        let parsed: std::result::Result<u32, _> = serde_yaml::from_str("[not, a, number]");
        let err: Error = parsed.unwrap_err().into();
        assert!(matches!(err, Error::Yaml(_)));
    }
}
