//! # envspec-cli -- Command-line front end
//!
//! Subcommand handlers for the `envspec` binary. Each handler returns a
//! process exit code: 0 for a valid specification, 1 for an invalid one.
//! Operational failures (unreadable file, bad configuration) surface as
//! `Err` and are mapped to exit code 2 by the binary.

pub mod validate;
