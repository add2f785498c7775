//! # envspec-schema -- Schema Registry & Structural Validation
//!
//! Decides whether a specification document has the right sections, keys
//! and value types. Content integrity is out of scope here: the walker
//! only queues file descriptors for the integrity checker.
//!
//! ## Registry (`registry`)
//!
//! A static table of [`ComponentDefinition`]s, one per recognized section,
//! each carrying a [`FieldConstraint`] tree (`Scalar`, `Sequence`,
//! `Mapping`, `Opaque`). Lookups of unknown section names return `None`.
//!
//! ## Walker (`structural`)
//!
//! [`validate_structure`] visits sections in registry order and yields
//! [`Finding`]s: errors, warnings, and descriptors awaiting an integrity
//! check, all in traversal order.
//!
//! ## Loading (`document`)
//!
//! [`load_document`] and [`parse_document`] turn JSON or YAML text into the
//! value model the walker consumes.
//!
//! ## Crate Policy
//!
//! - Depends only on `envspec-core` internally.
//! - Never performs I/O during validation.

pub mod document;
pub mod registry;
pub mod structural;

pub use document::{
    load_document, parse_document, parse_json_document, parse_yaml_document, DocumentError,
};
pub use registry::{
    checked, lookup, section_names, ComponentDefinition, FieldConstraint, FieldSpec,
    ScalarType, SectionLayout, SectionType, SECTIONS,
};
pub use structural::{validate_structure, Finding, StructuralOutcome};
