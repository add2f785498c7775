//! # Validation Report
//!
//! The per-run result of validating one specification document: an
//! ordered error log plus an ordered warning log.
//!
//! ## Ordering
//!
//! Errors appear in schema traversal order (registry section order, then
//! required-key order, then source order within a file descriptor). Two
//! runs over the same document and the same remote content produce equal
//! reports.

use serde::{Deserialize, Serialize};

/// Classification of a logged validation problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A required top-level section is absent.
    RequiredSectionMissing,
    /// A top-level section has the wrong value type.
    WrongSectionType,
    /// A required key inside a section is absent or unusable.
    RequiredAttributeMissing,
    /// A key inside a section has the wrong value type.
    WrongAttributeType,
    /// The streamed byte count differs from the declared size.
    WrongFileSize,
    /// The streamed MD5 digest differs from the declared checksum.
    WrongMd5,
    /// A source could not be opened or streamed.
    BadUrl,
}

impl ErrorCode {
    /// Returns the canonical code string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequiredSectionMissing => "REQUIRED_SECTION_MISSING",
            Self::WrongSectionType => "WRONG_SECTION_TYPE",
            Self::RequiredAttributeMissing => "REQUIRED_ATTRIBUTE_MISSING",
            Self::WrongAttributeType => "WRONG_ATTRIBUTE_TYPE",
            Self::WrongFileSize => "WRONG_FILE_SIZE",
            Self::WrongMd5 => "WRONG_MD5",
            Self::BadUrl => "BAD_URL",
        }
    }

    /// Returns the abbreviated code used by existing umbrella tooling.
    pub fn short_code(&self) -> &'static str {
        match self {
            Self::RequiredSectionMissing => "REQ_SECT_MISS",
            Self::WrongSectionType => "WRONG_SECT_TYPE",
            Self::RequiredAttributeMissing => "REQ_ATTR_MISS",
            Self::WrongAttributeType => "WRONG_ATTR_TYPE",
            Self::WrongFileSize => "WRONG_FILE_SIZE",
            Self::WrongMd5 => "WRONG_MD5",
            Self::BadUrl => "BAD_URL",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logged validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// What kind of problem this is.
    #[serde(rename = "error_code")]
    pub code: ErrorCode,
    /// Human-readable description.
    pub description: String,
    /// Whether retrying the same validation might succeed.
    pub may_be_temporary: bool,
    /// Top-level section the problem was found in.
    pub component_name: String,
    /// Named artifact the problem concerns, for integrity and transport errors.
    pub file_name: Option<String>,
    /// Source the problem was observed on, for integrity and transport errors.
    pub url: Option<String>,
}

impl ValidationError {
    /// A permanent error attached to a section only.
    pub fn new(
        code: ErrorCode,
        component_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            code,
            description: description.into(),
            may_be_temporary: false,
            component_name: component_name.into(),
            file_name: None,
            url: None,
        }
    }

    /// Attach the artifact and source this error was observed on.
    pub fn for_source(mut self, file_name: impl Into<String>, url: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self.url = Some(url.into());
        self
    }

    /// Mark the error as possibly transient.
    pub fn temporary(mut self, may_be_temporary: bool) -> Self {
        self.may_be_temporary = may_be_temporary;
        self
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.component_name, self.description)?;
        if let Some(file_name) = &self.file_name {
            write!(f, " (file \"{file_name}\"")?;
            if let Some(url) = &self.url {
                write!(f, ", source {url}")?;
            }
            f.write_str(")")?;
        }
        if self.may_be_temporary {
            f.write_str(" [may be temporary]")?;
        }
        Ok(())
    }
}

/// Outcome of one validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Errors in traversal order.
    pub errors: Vec<ValidationError>,
    /// Free-text warnings. Warnings never affect validity.
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// A specification is valid when no error was logged.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Append an error.
    pub fn push_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Append a warning.
    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Number of logged errors carrying `code`.
    pub fn count(&self, code: ErrorCode) -> usize {
        self.errors.iter().filter(|e| e.code == code).count()
    }

    /// Errors logged against one section, in order.
    pub fn errors_for<'a>(
        &'a self,
        component_name: &'a str,
    ) -> impl Iterator<Item = &'a ValidationError> + 'a {
        self.errors
            .iter()
            .filter(move |e| e.component_name == component_name)
    }

    /// Whether any logged error may clear up on retry.
    pub fn has_temporary_errors(&self) -> bool {
        self.errors.iter().any(|e| e.may_be_temporary)
    }
}
