//! Error types for questlog.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuestError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl QuestError {
    pub fn code(&self) -> i32 {
        match self {
            QuestError::Validation(_) => 2,
            QuestError::Config(_) => 3,
            QuestError::Io(_) => 4,
            QuestError::Json(_) => 5,
            QuestError::Toml(_) => 6,
        }
    }
}

pub type Result<T> = std::result::Result<T, QuestError>;

/// Trim a user-supplied name and reject it when nothing is left.
pub(crate) fn require_name(field: &str, raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(QuestError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_name_trims() {
        assert_eq!(require_name("Quest name", "  slay dragon ").unwrap(), "slay dragon");
    }

    #[test]
    fn test_require_name_rejects_blank() {
        let err = require_name("Quest name", "   ").unwrap_err();
        assert!(matches!(err, QuestError::Validation(_)));
        assert_eq!(err.to_string(), "Validation failed: Quest name is required");
        assert_eq!(err.code(), 2);
    }
}
