use std::{fmt, io};

use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum CrumbsError {
    #[error("Hierarchy configuration error: {0}")]
    Config(String),
    #[error("Custom error: {0}")]
    Custom(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("You do not have permission to access this resource")]
    PermissionDenied,
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
}

impl CrumbsError {
    /// True for errors caused by the hierarchy/settings configuration rather than the runtime
    /// environment.
    pub fn is_config(&self) -> bool {
        matches!(self, CrumbsError::Config(_))
    }
}

impl From<toml::de::Error> for CrumbsError {
    fn from(src: toml::de::Error) -> CrumbsError {
        CrumbsError::Serialization(format!("Toml deserialization error: {src}"))
    }
}

impl From<toml::ser::Error> for CrumbsError {
    fn from(src: toml::ser::Error) -> CrumbsError {
        CrumbsError::Serialization(format!("Toml serialization error: {src}"))
    }
}

impl From<serde_yaml::Error> for CrumbsError {
    fn from(src: serde_yaml::Error) -> CrumbsError {
        CrumbsError::Serialization(format!("YAML serialization error: {src}"))
    }
}

impl From<JsonError> for CrumbsError {
    fn from(src: JsonError) -> CrumbsError {
        CrumbsError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<io::Error> for CrumbsError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => CrumbsError::NotFound(format!("{x}")),
            io::ErrorKind::PermissionDenied => CrumbsError::PermissionDenied,
            _ => CrumbsError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<fmt::Error> for CrumbsError {
    fn from(x: fmt::Error) -> Self {
        CrumbsError::Custom(format!("{x}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_not_found_maps_to_not_found() {
        let err = CrumbsError::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(matches!(err, CrumbsError::NotFound(_)));
        assert!(!err.is_config());
    }

    #[test]
    fn toml_errors_are_serialization_errors() {
        let parsed: Result<toml::Value, _> = toml::from_str("not = [valid");
        let err = CrumbsError::from(parsed.unwrap_err());
        assert!(matches!(err, CrumbsError::Serialization(_)));
    }
}
