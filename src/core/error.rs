//! Error taxonomy for note lifecycle operations

use thiserror::Error;

/// Errors raised by the create and delete flows
#[derive(Debug, Error)]
pub enum LinkNoteError {
    /// Selection is empty or whitespace only
    #[error("selection is empty")]
    InvalidSelection,

    /// No document is active in the editor
    #[error("no current document")]
    NoCurrentDocument,

    #[error("failed to create folder {path}: {reason}")]
    FolderCreationFailed { path: String, reason: String },

    #[error("failed to create note {path}: {reason}")]
    FileCreationFailed { path: String, reason: String },

    #[error("failed to delete note {path}: {reason}")]
    FileDeletionFailed { path: String, reason: String },

    /// No resolvable link under the cursor
    #[error("no link to an existing note under the cursor")]
    UnresolvableLink,

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl LinkNoteError {
    pub fn folder_creation(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::FolderCreationFailed {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    pub fn file_creation(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::FileCreationFailed {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    pub fn file_deletion(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::FileDeletionFailed {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    /// Whether the user should see a notice. Preconditions that simply mean
    /// "operation not offered" stay silent.
    pub fn is_user_visible(&self) -> bool {
        !matches!(
            self,
            Self::InvalidSelection | Self::NoCurrentDocument | Self::UnresolvableLink
        )
    }
}

pub type Result<T> = std::result::Result<T, LinkNoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility() {
        assert!(!LinkNoteError::InvalidSelection.is_user_visible());
        assert!(!LinkNoteError::UnresolvableLink.is_user_visible());
        let err = LinkNoteError::file_deletion("a.md", "permission denied");
        assert!(err.is_user_visible());
        assert_eq!(err.to_string(), "failed to delete note a.md: permission denied");
    }
}
