//! Error types for the lifecycle layer.

use std::fmt;

/// Errors raised while driving an instance through its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// A bulk settings update carried a value of the wrong kind for a field.
    MalformedUpdate {
        /// Field that was being updated.
        field: String,
        /// Kind of value the field accepts.
        expected: &'static str,
        /// Kind of value that was supplied.
        found: &'static str,
    },

    /// The parent lacks a capability the instance kind needs to attach.
    UnsupportedParent {
        /// Parent's debug name.
        parent: String,
        /// Missing capability.
        capability: &'static str,
    },

    /// The instance is still attached to another parent.
    AlreadyAttached {
        /// Debug name of the parent that was offered.
        parent: String,
    },

    /// Teardown was asked to drop an instance a parent still holds.
    StillAttached {
        /// Debug name of the instance.
        instance: String,
    },
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleError::MalformedUpdate {
                field,
                expected,
                found,
            } => write!(
                f,
                "Malformed update for field '{}': expected {} but found {}",
                field, expected, found
            ),
            LifecycleError::UnsupportedParent { parent, capability } => {
                write!(f, "Parent '{}' does not support {}", parent, capability)
            }
            LifecycleError::AlreadyAttached { parent } => write!(
                f,
                "Instance is attached to another parent; detach it before attaching to '{}'",
                parent
            ),
            LifecycleError::StillAttached { instance } => write!(
                f,
                "Instance '{}' is still attached; tear it down with the parent that holds it",
                instance
            ),
        }
    }
}

impl std::error::Error for LifecycleError {}

/// Result type for lifecycle operations.
pub type Result<T> = std::result::Result<T, LifecycleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_update_message() {
        let err = LifecycleError::MalformedUpdate {
            field: "data".into(),
            expected: "table",
            found: "text",
        };
        assert_eq!(
            err.to_string(),
            "Malformed update for field 'data': expected table but found text"
        );
    }

    #[test]
    fn test_unsupported_parent_message() {
        let err = LifecycleError::UnsupportedParent {
            parent: "LayerGroup".into(),
            capability: "content binding",
        };
        assert!(err.to_string().contains("LayerGroup"));
        assert!(err.to_string().contains("content binding"));
    }

    #[test]
    fn test_still_attached_message() {
        let err = LifecycleError::StillAttached {
            instance: "InfoPopup".into(),
        };
        assert!(err.to_string().contains("InfoPopup"));
        assert!(err.to_string().contains("still attached"));
    }
}
