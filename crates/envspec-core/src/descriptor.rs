//! # File Descriptors
//!
//! A named artifact referenced by a specification: one or more retrieval
//! sources plus the checksum and size every source must reproduce.
//!
//! Descriptors are only built from entries that passed structural
//! validation, so every field here is already known to be well-typed.

use serde::{Deserialize, Serialize};

/// A file-bearing entry of the `os`, `package_manager`, `software` or
/// `data` sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Section the entry belongs to.
    pub component_name: String,
    /// Entry name (the mapping key, or the `name` field for `os`).
    pub file_name: String,
    /// Artifact identifier.
    pub id: String,
    /// Retrieval sources, checked in order. Never empty.
    pub sources: Vec<String>,
    /// Declared archive format.
    pub format: String,
    /// Declared MD5 checksum as a hex string.
    pub checksum: String,
    /// Declared size in bytes.
    pub declared_size: u64,
    /// Where the artifact is mounted. `None` for `os`.
    pub mount_point: Option<String>,
}

impl FileDescriptor {
    /// Human-readable label for log output, e.g. `software/bwa`.
    pub fn label(&self) -> String {
        format!("{}/{}", self.component_name, self.file_name)
    }
}
