//! # envspec-validator -- Specification Facade
//!
//! Entry point for validating one environment specification:
//!
//! ```no_run
//! use envspec_validator::{SpecificationValidator, ValidatorConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let document = envspec_schema::load_document("openmalaria.umbrella".as_ref())?;
//! let validator = SpecificationValidator::new(ValidatorConfig::from_env()?)?;
//! let report = validator.validate(&document)?;
//! for error in &report.errors {
//!     eprintln!("{error}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Policy
//!
//! - The facade owns no log state. Each call returns a new
//!   [`ValidationReport`].
//! - Contract violations are the only `Err` a validation call returns.

pub mod config;
mod pool;
pub mod validator;

pub use config::{ConfigError, ValidatorConfig};
pub use validator::{SpecificationValidator, ValidatorError};

pub use envspec_core::{ContractViolation, ErrorCode, ValidationError, ValidationReport};
pub use envspec_integrity::{NoProgress, ProgressEvent, ProgressObserver};
