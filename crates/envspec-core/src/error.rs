//! # Contract Violations
//!
//! Errors that abort a validation call instead of being logged. They
//! signal that the caller handed over something that is not a
//! specification at all, or that the built-in schema is itself broken.

use thiserror::Error;

use crate::kind::ValueKind;

/// Misuse of the validation API. Never appears in a [`ValidationReport`].
///
/// [`ValidationReport`]: crate::ValidationReport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    /// The document root must be a keyed mapping.
    #[error("specification root must be a mapping, found {found}")]
    RootNotMapping {
        /// Kind of the value that was supplied as the root.
        found: ValueKind,
    },

    /// A schema registry entry is internally inconsistent.
    #[error("schema registry entry \"{section}\" is malformed: {reason}")]
    MalformedRegistryEntry {
        /// Section whose definition is broken.
        section: String,
        /// What is wrong with it.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_not_mapping_names_found_kind() {
        let err = ContractViolation::RootNotMapping {
            found: ValueKind::Sequence,
        };
        assert_eq!(
            err.to_string(),
            "specification root must be a mapping, found list"
        );
    }

    #[test]
    fn malformed_entry_display() {
        let err = ContractViolation::MalformedRegistryEntry {
            section: "cmd".to_string(),
            reason: "scalar section declares required keys".to_string(),
        };
        assert!(err.to_string().contains("\"cmd\""));
        assert!(err.to_string().contains("required keys"));
    }
}
