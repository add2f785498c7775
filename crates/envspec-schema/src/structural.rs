//! # Structural Validation
//!
//! Walks a parsed specification against the [`registry`](crate::registry)
//! and records every shape or type problem it finds. Nothing short of a
//! contract violation stops the walk.
//!
//! ## Traversal
//!
//! 1. Sections are visited in registry order. A missing required section
//!    is logged, a missing optional one is skipped.
//! 2. A section of the wrong top-level type is logged once and none of
//!    its children are inspected.
//! 3. Required keys are checked in declaration order, then each value is
//!    checked against its [`FieldConstraint`] recursively. Mapping entries
//!    are reported under their own key, sequence elements under the key of
//!    the enclosing list. A mistyped value is not descended into.
//! 4. File-bearing sections yield a [`Finding::Integrity`] placeholder for
//!    each descriptor that came through structurally clean.
//! 5. Top-level keys unknown to the registry yield a warning.
//!
//! The walk never fetches content. Integrity placeholders are resolved by
//! the caller and spliced back in place, which keeps the final report in
//! traversal order however the checks are scheduled.

use envspec_core::{
    ContractViolation, ErrorCode, FileDescriptor, ValidationError, ValueKind,
};
use serde_json::{Map, Value};

use crate::registry::{
    self, keys, ComponentDefinition, FieldConstraint, FieldSpec, SectionLayout,
    FILE_DESCRIPTOR_KEYS,
};

/// One entry of the structural walk, in traversal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// A logged structural error.
    Error(ValidationError),
    /// A free-text warning.
    Warning(String),
    /// A structurally valid descriptor whose content still has to be checked.
    Integrity(FileDescriptor),
}

/// Result of walking one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuralOutcome {
    /// Findings in traversal order.
    pub findings: Vec<Finding>,
}

impl StructuralOutcome {
    /// Structural errors only.
    pub fn errors(&self) -> impl Iterator<Item = &ValidationError> {
        self.findings.iter().filter_map(|f| match f {
            Finding::Error(e) => Some(e),
            _ => None,
        })
    }

    /// Warnings only.
    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.findings.iter().filter_map(|f| match f {
            Finding::Warning(w) => Some(w.as_str()),
            _ => None,
        })
    }

    /// Descriptors awaiting an integrity check.
    pub fn descriptors(&self) -> impl Iterator<Item = &FileDescriptor> {
        self.findings.iter().filter_map(|f| match f {
            Finding::Integrity(d) => Some(d),
            _ => None,
        })
    }

    /// Whether the document is structurally valid.
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }
}

/// Walk `document` against the schema registry.
///
/// # Errors
///
/// Returns [`ContractViolation::RootNotMapping`] when `document` is not a
/// mapping, and [`ContractViolation::MalformedRegistryEntry`] when a
/// registry entry fails its consistency check. Nothing is logged in
/// either case.
pub fn validate_structure(document: &Value) -> Result<StructuralOutcome, ContractViolation> {
    let root = document
        .as_object()
        .ok_or_else(|| ContractViolation::RootNotMapping {
            found: ValueKind::of(document),
        })?;

    let mut walker = Walker::default();

    for def in registry::checked()? {
        match root.get(def.name) {
            Some(value) => {
                tracing::debug!(section = def.name, "checking section");
                walker.section(def, value);
            }
            None if def.is_required => {
                tracing::debug!(section = def.name, "required section missing");
                walker.error(ValidationError::new(
                    ErrorCode::RequiredSectionMissing,
                    def.name,
                    "Missing section",
                ));
            }
            None => {}
        }
    }

    for key in root.keys() {
        if registry::lookup(key).is_none() {
            tracing::debug!(key = %key, "unknown top-level key");
            walker.findings.push(Finding::Warning(format!(
                "Specification component \"{key}\" is an unknown component. Please check the spelling"
            )));
        }
    }

    Ok(StructuralOutcome {
        findings: walker.findings,
    })
}

#[derive(Default)]
struct Walker {
    findings: Vec<Finding>,
}

impl Walker {
    fn error(&mut self, error: ValidationError) {
        self.findings.push(Finding::Error(error));
    }

    fn has_errors_since(&self, mark: usize) -> bool {
        self.findings[mark..]
            .iter()
            .any(|f| matches!(f, Finding::Error(_)))
    }

    fn section(&mut self, def: &ComponentDefinition, value: &Value) {
        if !def.expected_type.matches(value) {
            self.error(ValidationError::new(
                ErrorCode::WrongSectionType,
                def.name,
                format!(
                    "Wrong section type of \"{}\". Should be type \"{}\"",
                    ValueKind::of(value),
                    def.expected_type.kind()
                ),
            ));
            return;
        }

        let Some(map) = value.as_object() else {
            return;
        };

        let mark = self.findings.len();
        self.required_keys(def.name, map, def.required_keys);

        match def.layout {
            SectionLayout::Plain => {}
            SectionLayout::StringValues => self.string_values(def.name, map),
            SectionLayout::ImplicitFile => {
                if !self.has_errors_since(mark) {
                    let file_name = map
                        .get(keys::NAME)
                        .and_then(Value::as_str)
                        .unwrap_or(def.name);
                    self.descriptor(def.name, file_name, map, false);
                }
            }
            SectionLayout::FileEntries => {
                for (entry_name, entry) in map {
                    self.file_entry(def.name, entry_name, entry);
                }
            }
            SectionLayout::NestedFileEntries { key } => {
                // Non-mapping entries were already reported by the
                // required-key check on `key`.
                if let Some(entries) = map.get(key).and_then(Value::as_object) {
                    for (entry_name, entry) in entries {
                        if entry.is_object() {
                            self.file_entry(def.name, entry_name, entry);
                        }
                    }
                }
            }
        }
    }

    fn required_keys(&mut self, component: &str, map: &Map<String, Value>, specs: &[FieldSpec]) {
        for spec in specs {
            match map.get(spec.key) {
                None => self.error(ValidationError::new(
                    ErrorCode::RequiredAttributeMissing,
                    component,
                    format!("Attribute \"{}\" is required", spec.key),
                )),
                Some(value) => self.field(component, spec.key, value, &spec.constraint),
            }
        }
    }

    fn field(&mut self, component: &str, key_name: &str, value: &Value, constraint: &FieldConstraint) {
        let Some(expected) = constraint.expected_kind() else {
            return;
        };

        if !constraint.matches(value) {
            self.error(wrong_attribute_type(component, key_name, value, expected));
            return;
        }

        match constraint {
            FieldConstraint::Sequence(inner) => {
                for item in value.as_array().into_iter().flatten() {
                    self.field(component, key_name, item, inner);
                }
            }
            FieldConstraint::Mapping(inner) => {
                for (entry_key, entry) in value.as_object().into_iter().flatten() {
                    self.field(component, entry_key, entry, inner);
                }
            }
            FieldConstraint::Scalar(_) | FieldConstraint::Opaque => {}
        }
    }

    fn string_values(&mut self, component: &str, map: &Map<String, Value>) {
        for (name, value) in map {
            if !value.is_string() {
                self.error(wrong_attribute_type(component, name, value, ValueKind::String));
            }
        }
    }

    fn file_entry(&mut self, component: &str, entry_name: &str, entry: &Value) {
        let Some(map) = entry.as_object() else {
            self.error(wrong_attribute_type(component, entry_name, entry, ValueKind::Mapping));
            return;
        };

        let mark = self.findings.len();
        self.required_keys(component, map, FILE_DESCRIPTOR_KEYS);
        if !self.has_errors_since(mark) {
            self.descriptor(component, entry_name, map, true);
        }
    }

    /// Build a descriptor from a structurally clean entry and queue it.
    fn descriptor(&mut self, component: &str, file_name: &str, map: &Map<String, Value>, with_mount: bool) {
        match build_descriptor(component, file_name, map, with_mount) {
            Ok(descriptor) => self.findings.push(Finding::Integrity(descriptor)),
            Err(error) => self.error(error),
        }
    }
}

fn wrong_attribute_type(
    component: &str,
    key_name: &str,
    value: &Value,
    expected: ValueKind,
) -> ValidationError {
    ValidationError::new(
        ErrorCode::WrongAttributeType,
        component,
        format!(
            "Attribute \"{key_name}\" is of type \"{}\" but should be of type \"{expected}\"",
            ValueKind::of(value)
        ),
    )
}

/// Extract a [`FileDescriptor`] from an entry whose keys already passed
/// the type checks. Enforces the value rules types alone cannot express:
/// a non-empty source list and a decimal size.
fn build_descriptor(
    component: &str,
    file_name: &str,
    map: &Map<String, Value>,
    with_mount: bool,
) -> Result<FileDescriptor, ValidationError> {
    let text = |key: &str| -> Result<String, ValidationError> {
        map.get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                ValidationError::new(
                    ErrorCode::RequiredAttributeMissing,
                    component,
                    format!("Attribute \"{key}\" is required"),
                )
            })
    };

    let sources: Vec<String> = map
        .get(keys::SOURCE)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    if sources.is_empty() {
        return Err(ValidationError::new(
            ErrorCode::RequiredAttributeMissing,
            component,
            format!("Attribute \"{}\" must list at least one source", keys::SOURCE),
        ));
    }

    let size_text = text(keys::SIZE)?;
    let declared_size = size_text.trim().parse::<u64>().map_err(|_| {
        ValidationError::new(
            ErrorCode::WrongAttributeType,
            component,
            format!(
                "Attribute \"{}\" is \"{size_text}\" but should be a non-negative integer",
                keys::SIZE
            ),
        )
    })?;

    let mount_point = if with_mount {
        Some(text(keys::MOUNT_POINT)?)
    } else {
        None
    };

    Ok(FileDescriptor {
        component_name: component.to_string(),
        file_name: file_name.to_string(),
        id: text(keys::ID)?,
        sources,
        format: text(keys::FORMAT)?,
        checksum: text(keys::CHECKSUM)?,
        declared_size,
        mount_point,
    })
}
