//! Error codes and exit status for questctl

use quest_common::QuestError;
use thiserror::Error;

/// Exit code for success
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for general errors
pub const EXIT_GENERAL_ERROR: i32 = 1;

/// Exit code when an id or prefix matches nothing
pub const EXIT_NOT_FOUND: i32 = 66;

/// Exit code when a prefix matches more than one entity
pub const EXIT_AMBIGUOUS: i32 = 65;

/// Failure to turn a user-supplied id into exactly one entity
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LookupError {
    #[error("No {kind} matches '{id}'")]
    NotFound { kind: &'static str, id: String },

    #[error("'{prefix}' matches {count} {kind}s, use a longer prefix")]
    Ambiguous {
        kind: &'static str,
        prefix: String,
        count: usize,
    },
}

impl LookupError {
    pub fn not_found(kind: &'static str, id: &str) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => EXIT_NOT_FOUND,
            Self::Ambiguous { .. } => EXIT_AMBIGUOUS,
        }
    }
}

/// Map a command failure to a process exit code
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(lookup) = err.downcast_ref::<LookupError>() {
        return lookup.code();
    }
    if let Some(quest) = err.downcast_ref::<QuestError>() {
        return quest.code();
    }
    EXIT_GENERAL_ERROR
}
