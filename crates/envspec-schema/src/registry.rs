//! # Schema Registry
//!
//! The fixed, process-wide description of what a valid specification
//! looks like. Every recognized top-level section has one
//! [`ComponentDefinition`]; nested structure is described by a
//! [`FieldConstraint`] tree.
//!
//! The registry is a `static` table. It is never built at runtime, never
//! mutated, and lookups of unknown names return `None` rather than
//! failing. Its consistency is checked once per process by [`checked`].
//!
//! ## Section order
//!
//! [`SECTIONS`] is listed in the order sections are validated. Error
//! ordering in reports follows this order, not document order.

use std::sync::OnceLock;

use envspec_core::{ContractViolation, ValueKind};
use serde_json::Value;

/// Key names shared by several sections.
pub mod keys {
    pub const NAME: &str = "name";
    pub const VERSION: &str = "version";

    pub const ARCHITECTURE: &str = "arch";
    pub const CORES: &str = "cores";
    pub const MEMORY: &str = "memory";
    pub const DISK: &str = "disk";

    pub const PACKAGES: &str = "list";
    pub const REPOSITORIES: &str = "config";

    pub const FILES: &str = "files";
    pub const DIRECTORIES: &str = "dirs";

    pub const ID: &str = "id";
    pub const SOURCE: &str = "source";
    pub const FORMAT: &str = "format";
    pub const CHECKSUM: &str = "checksum";
    pub const SIZE: &str = "size";
    pub const MOUNT_POINT: &str = "mountpoint";
}

/// Section names.
pub mod sections {
    pub const COMMENT: &str = "comment";
    pub const NOTE: &str = "note";
    pub const HARDWARE: &str = "hardware";
    pub const KERNEL: &str = "kernel";
    pub const OS: &str = "os";
    pub const PACKAGE_MANAGER: &str = "package_manager";
    pub const SOFTWARE: &str = "software";
    pub const DATA: &str = "data";
    pub const ENVIRON: &str = "environ";
    pub const CMD: &str = "cmd";
    pub const OUTPUT: &str = "output";
}

/// Leaf value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    String,
}

impl ScalarType {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Self::String => ValueKind::String,
        }
    }
}

/// Recursive constraint on a value found under a required key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldConstraint {
    /// A leaf value of the given type.
    Scalar(ScalarType),
    /// A list whose every element satisfies the inner constraint.
    Sequence(&'static FieldConstraint),
    /// A mapping whose every value satisfies the inner constraint.
    Mapping(&'static FieldConstraint),
    /// Anything. Descent stops here.
    Opaque,
}

impl FieldConstraint {
    /// The value kind this constraint requires, or `None` for [`Opaque`].
    ///
    /// [`Opaque`]: FieldConstraint::Opaque
    pub fn expected_kind(&self) -> Option<ValueKind> {
        match self {
            Self::Scalar(scalar) => Some(scalar.kind()),
            Self::Sequence(_) => Some(ValueKind::Sequence),
            Self::Mapping(_) => Some(ValueKind::Mapping),
            Self::Opaque => None,
        }
    }

    /// Whether the top level of `value` has the required kind. Children
    /// are not inspected.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Scalar(scalar) => scalar.matches(value),
            Self::Sequence(_) => value.is_array(),
            Self::Mapping(_) => value.is_object(),
            Self::Opaque => true,
        }
    }
}

/// Required type of a section's top-level value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionType {
    Scalar(ScalarType),
    Mapping,
}

impl SectionType {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Scalar(scalar) => scalar.matches(value),
            Self::Mapping => value.is_object(),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Scalar(scalar) => scalar.kind(),
            Self::Mapping => ValueKind::Mapping,
        }
    }
}

/// One required key and the constraint on its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub constraint: FieldConstraint,
}

/// How a section's entries beyond its required keys are validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionLayout {
    /// Required keys only.
    Plain,
    /// Every value of the mapping must be a string (`environ`).
    StringValues,
    /// The section itself is one file descriptor without a mount point (`os`).
    ImplicitFile,
    /// Every entry is a named file descriptor (`software`, `data`).
    FileEntries,
    /// The mapping under `key` holds named file descriptors (`package_manager`).
    NestedFileEntries { key: &'static str },
}

/// Schema of one top-level section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentDefinition {
    pub name: &'static str,
    pub is_required: bool,
    pub expected_type: SectionType,
    pub required_keys: &'static [FieldSpec],
    pub layout: SectionLayout,
}

impl ComponentDefinition {
    /// Whether this section references artifacts that must be fetched.
    pub fn has_files(&self) -> bool {
        matches!(
            self.layout,
            SectionLayout::ImplicitFile
                | SectionLayout::FileEntries
                | SectionLayout::NestedFileEntries { .. }
        )
    }

    /// Verify the definition is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns [`ContractViolation::MalformedRegistryEntry`] when a scalar
    /// section declares keys or a layout, or when a nested file layout
    /// points at a key that is not a required mapping of mappings.
    pub fn check(&self) -> Result<(), ContractViolation> {
        let malformed = |reason: &str| ContractViolation::MalformedRegistryEntry {
            section: self.name.to_string(),
            reason: reason.to_string(),
        };

        if let SectionType::Scalar(_) = self.expected_type {
            if !self.required_keys.is_empty() {
                return Err(malformed("scalar section declares required keys"));
            }
            if self.layout != SectionLayout::Plain {
                return Err(malformed("scalar section declares an entry layout"));
            }
        }

        if let SectionLayout::NestedFileEntries { key } = self.layout {
            let spec = self
                .required_keys
                .iter()
                .find(|spec| spec.key == key)
                .ok_or_else(|| malformed("nested file key is not a required key"))?;
            if !matches!(spec.constraint, FieldConstraint::Mapping(FieldConstraint::Mapping(_))) {
                return Err(malformed("nested file key must be a mapping of mappings"));
            }
        }

        Ok(())
    }
}

const STRING: FieldConstraint = FieldConstraint::Scalar(ScalarType::String);
const STRING_LIST: FieldConstraint = FieldConstraint::Sequence(&STRING);
// Repository blocks are validated separately as file descriptors.
const REPOSITORY_CONFIG: FieldConstraint =
    FieldConstraint::Mapping(&FieldConstraint::Mapping(&FieldConstraint::Opaque));

const fn field(key: &'static str, constraint: FieldConstraint) -> FieldSpec {
    FieldSpec { key, constraint }
}

/// Keys every named file descriptor must carry.
pub const FILE_DESCRIPTOR_KEYS: &[FieldSpec] = &[
    field(keys::ID, STRING),
    field(keys::SOURCE, STRING_LIST),
    field(keys::FORMAT, STRING),
    field(keys::CHECKSUM, STRING),
    field(keys::SIZE, STRING),
    field(keys::MOUNT_POINT, STRING),
];

const OS_KEYS: &[FieldSpec] = &[
    field(keys::NAME, STRING),
    field(keys::VERSION, STRING),
    field(keys::ID, STRING),
    field(keys::SOURCE, STRING_LIST),
    field(keys::FORMAT, STRING),
    field(keys::CHECKSUM, STRING),
    field(keys::SIZE, STRING),
];

const fn scalar_section(name: &'static str) -> ComponentDefinition {
    ComponentDefinition {
        name,
        is_required: false,
        expected_type: SectionType::Scalar(ScalarType::String),
        required_keys: &[],
        layout: SectionLayout::Plain,
    }
}

/// Every recognized section, in validation order.
pub static SECTIONS: &[ComponentDefinition] = &[
    scalar_section(sections::COMMENT),
    scalar_section(sections::NOTE),
    ComponentDefinition {
        name: sections::HARDWARE,
        is_required: true,
        expected_type: SectionType::Mapping,
        required_keys: &[
            field(keys::ARCHITECTURE, STRING),
            field(keys::CORES, STRING),
            field(keys::MEMORY, STRING),
            field(keys::DISK, STRING),
        ],
        layout: SectionLayout::Plain,
    },
    ComponentDefinition {
        name: sections::KERNEL,
        is_required: true,
        expected_type: SectionType::Mapping,
        required_keys: &[field(keys::NAME, STRING), field(keys::VERSION, STRING)],
        layout: SectionLayout::Plain,
    },
    ComponentDefinition {
        name: sections::OS,
        is_required: true,
        expected_type: SectionType::Mapping,
        required_keys: OS_KEYS,
        layout: SectionLayout::ImplicitFile,
    },
    ComponentDefinition {
        name: sections::PACKAGE_MANAGER,
        is_required: false,
        expected_type: SectionType::Mapping,
        required_keys: &[
            field(keys::NAME, STRING),
            field(keys::PACKAGES, STRING),
            field(keys::REPOSITORIES, REPOSITORY_CONFIG),
        ],
        layout: SectionLayout::NestedFileEntries {
            key: keys::REPOSITORIES,
        },
    },
    ComponentDefinition {
        name: sections::SOFTWARE,
        is_required: false,
        expected_type: SectionType::Mapping,
        required_keys: &[],
        layout: SectionLayout::FileEntries,
    },
    ComponentDefinition {
        name: sections::DATA,
        is_required: false,
        expected_type: SectionType::Mapping,
        required_keys: &[],
        layout: SectionLayout::FileEntries,
    },
    ComponentDefinition {
        name: sections::ENVIRON,
        is_required: false,
        expected_type: SectionType::Mapping,
        required_keys: &[],
        layout: SectionLayout::StringValues,
    },
    scalar_section(sections::CMD),
    ComponentDefinition {
        name: sections::OUTPUT,
        is_required: true,
        expected_type: SectionType::Mapping,
        required_keys: &[
            field(keys::FILES, STRING_LIST),
            field(keys::DIRECTORIES, STRING_LIST),
        ],
        layout: SectionLayout::Plain,
    },
];

static CONSISTENCY: OnceLock<Result<(), ContractViolation>> = OnceLock::new();

/// The section table, after every entry has passed
/// [`ComponentDefinition::check`]. The check runs on the first call only.
///
/// # Errors
///
/// Returns the first [`ContractViolation::MalformedRegistryEntry`] found,
/// on this and every later call.
pub fn checked() -> Result<&'static [ComponentDefinition], ContractViolation> {
    CONSISTENCY
        .get_or_init(|| SECTIONS.iter().try_for_each(ComponentDefinition::check))
        .clone()
        .map(|()| SECTIONS)
}

/// Look up a section by name. Unknown names yield `None`.
pub fn lookup(name: &str) -> Option<&'static ComponentDefinition> {
    SECTIONS.iter().find(|def| def.name == name)
}

/// Names of every recognized section, in validation order.
pub fn section_names() -> impl Iterator<Item = &'static str> {
    SECTIONS.iter().map(|def| def.name)
}
