//! # Specification Facade
//!
//! One call validates one document: structural walk first, then content
//! checks for every descriptor that came through clean, merged into a
//! fresh [`ValidationReport`].
//!
//! The validator holds no per-run state. Every call builds its own report,
//! so one instance can serve concurrent callers and repeated calls over an
//! unchanged document and unchanged content return equal reports.
//!
//! ## Ordering
//!
//! Integrity results are spliced back at each descriptor's position in the
//! structural walk. With `max_workers > 1` descriptors are checked
//! concurrently, but the report is the one a sequential run produces.

use envspec_core::{ContractViolation, FileDescriptor, ValidationReport};
use envspec_integrity::{
    ContentResolver, DefaultResolver, IntegrityChecker, IntegrityOutcome, NoProgress,
    ProgressObserver, ResolveError,
};
use envspec_schema::{validate_structure, Finding};
use serde_json::Value;
use thiserror::Error;

use crate::config::{ConfigError, ValidatorConfig};
use crate::pool;

/// Errors raised while constructing a validator.
#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("resolver error: {0}")]
    Resolver(#[from] ResolveError),
}

/// Validates specification documents against the schema registry and
/// the content they reference.
#[derive(Debug, Clone)]
pub struct SpecificationValidator<R = DefaultResolver> {
    config: ValidatorConfig,
    resolver: R,
}

impl SpecificationValidator<DefaultResolver> {
    /// Create a validator that fetches local files and HTTP(S) URLs.
    ///
    /// # Errors
    ///
    /// Returns [`ValidatorError::Config`] for an unusable configuration and
    /// [`ValidatorError::Resolver`] when the HTTP client cannot be built.
    pub fn new(config: ValidatorConfig) -> Result<Self, ValidatorError> {
        let resolver = DefaultResolver::new(config.http_timeout(), &config.user_agent)?;
        Self::with_resolver(config, resolver)
    }
}

impl<R: ContentResolver> SpecificationValidator<R> {
    /// Create a validator that opens sources through `resolver`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidatorError::Config`] for an unusable configuration.
    pub fn with_resolver(config: ValidatorConfig, resolver: R) -> Result<Self, ValidatorError> {
        config.validate()?;
        Ok(Self { config, resolver })
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Validate `document` without progress reporting.
    ///
    /// # Errors
    ///
    /// Returns a [`ContractViolation`] when the document root is not a
    /// mapping or the schema registry is inconsistent. Every other problem
    /// is recorded in the report.
    pub fn validate(&self, document: &Value) -> Result<ValidationReport, ContractViolation> {
        self.validate_with_progress(document, &NoProgress)
    }

    /// Validate `document`, reporting streaming progress for every source
    /// to `observer`.
    ///
    /// # Errors
    ///
    /// Same as [`SpecificationValidator::validate`].
    pub fn validate_with_progress(
        &self,
        document: &Value,
        observer: &dyn ProgressObserver,
    ) -> Result<ValidationReport, ContractViolation> {
        let structure = validate_structure(document)?;

        let descriptors: Vec<&FileDescriptor> = structure.descriptors().collect();
        tracing::debug!(
            descriptors = descriptors.len(),
            workers = self.config.max_workers,
            "structural walk finished"
        );

        let checker = IntegrityChecker::new(&self.resolver);
        let checked: Vec<IntegrityOutcome> =
            pool::map_bounded(&descriptors, self.config.max_workers, |descriptor| {
                checker.check(descriptor, observer)
            });
        let mut checked = checked.into_iter();

        let mut report = ValidationReport::new();
        for finding in structure.findings {
            match finding {
                Finding::Error(error) => report.push_error(error),
                Finding::Warning(warning) => report.push_warning(warning),
                Finding::Integrity(_) => {
                    let Some(outcome) = checked.next() else {
                        continue;
                    };
                    report.errors.extend(outcome.errors);
                    report.warnings.extend(outcome.warnings);
                }
            }
        }

        tracing::info!(
            valid = report.is_valid(),
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "specification validated"
        );
        Ok(report)
    }
}
