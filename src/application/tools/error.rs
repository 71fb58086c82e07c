//! Tool store errors.

use thiserror::Error;

use crate::domain::foundation::{ErrorCode, ToolId, ValidationErrors};
use crate::ports::RepositoryError;

/// Failure of a tool store mutation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolError {
    /// Input rejected before any remote call.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// The id is not in the local collection.
    #[error("Tool not found: {0}")]
    NotFound(ToolId),

    /// The persistence endpoint failed or refused.
    #[error(transparent)]
    Remote(#[from] RepositoryError),
}

impl ToolError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ToolError::Validation(_))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, ToolError::Remote(_))
    }

    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            ToolError::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ToolError::Validation(_) => ErrorCode::ValidationFailed,
            ToolError::NotFound(_) => ErrorCode::ToolNotFound,
            ToolError::Remote(e) => e.code(),
        }
    }
}

impl From<ValidationErrors> for ToolError {
    fn from(errors: ValidationErrors) -> Self {
        ToolError::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ValidationError;

    #[test]
    fn codes_follow_the_cause() {
        let validation = ToolError::from(ValidationErrors::new(vec![ValidationError::empty_field("name")]));
        assert_eq!(validation.code(), ErrorCode::ValidationFailed);
        assert!(validation.validation_errors().unwrap().has_field("name"));

        let missing = ToolError::NotFound(ToolId::new("t-1").unwrap());
        assert_eq!(missing.code(), ErrorCode::ToolNotFound);

        let remote = ToolError::from(RepositoryError::rejected(403, "denied"));
        assert!(remote.is_remote());
        assert_eq!(remote.code(), ErrorCode::Forbidden);
    }

    #[test]
    fn remote_message_is_passed_through() {
        let err = ToolError::from(RepositoryError::unavailable("timeout"));
        assert_eq!(err.to_string(), "Persistence endpoint unavailable: timeout");
    }
}
