//! # envspec-core -- Foundational Types for Specification Validation
//!
//! Leaf crate of the workspace. Defines the vocabulary shared by the
//! schema walker, the integrity checker and the validation facade.
//!
//! ## Key Design Principles
//!
//! 1. **Errors are data.** A malformed specification never produces an
//!    `Err`. Every structural, integrity and transport problem becomes a
//!    [`ValidationError`] appended to a [`ValidationReport`].
//!
//! 2. **Contract violations are not data.** A document whose root is not a
//!    mapping, or a broken registry entry, is caller or programmer misuse
//!    and surfaces as [`ContractViolation`].
//!
//! 3. **One error code enum.** [`ErrorCode`] is exhaustive; adding a code
//!    forces every consumer to handle it.
//!
//! 4. **Fresh reports.** A [`ValidationReport`] is built per run and owned
//!    by the caller. Nothing about a previous run survives into the next.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `envspec-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod descriptor;
pub mod digest;
pub mod error;
pub mod kind;
pub mod report;

pub use descriptor::FileDescriptor;
pub use digest::{Md5Digest, Md5Hasher};
pub use error::ContractViolation;
pub use kind::ValueKind;
pub use report::{ErrorCode, ValidationError, ValidationReport};
