//! # Integrity Checker
//!
//! Verifies every declared source of a [`FileDescriptor`], in order. Each
//! source is evaluated on its own: a dead mirror is logged and the next
//! source is still checked, and a size mismatch does not skip the
//! checksum comparison.
//!
//! | problem | code | temporary |
//! |---------|------|-----------|
//! | source cannot be opened or read | `BAD_URL` | per [`ResolveError::is_temporary`] |
//! | streamed bytes differ from declared size | `WRONG_FILE_SIZE` | no |
//! | streamed MD5 differs from declared checksum | `WRONG_MD5` | no |
//!
//! A content length announced by a remote server is only a hint. When it
//! disagrees with the declared size a warning is logged and the streamed
//! byte count still decides.

use envspec_core::{ErrorCode, FileDescriptor, ValidationError};

use crate::progress::{ProgressEvent, ProgressObserver};
use crate::resolver::{ContentResolver, ResolveError, StreamOrigin};
use crate::stream::digest_stream;

/// Everything logged while checking one descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityOutcome {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<String>,
}

impl IntegrityOutcome {
    /// A descriptor is intact only when every source matched.
    pub fn is_intact(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Streams descriptor sources through a [`ContentResolver`].
#[derive(Debug)]
pub struct IntegrityChecker<'r, R: ?Sized> {
    resolver: &'r R,
}

impl<'r, R: ContentResolver + ?Sized> IntegrityChecker<'r, R> {
    pub fn new(resolver: &'r R) -> Self {
        Self { resolver }
    }

    /// Check every source of `descriptor`, reporting progress to `observer`.
    pub fn check(
        &self,
        descriptor: &FileDescriptor,
        observer: &dyn ProgressObserver,
    ) -> IntegrityOutcome {
        let mut outcome = IntegrityOutcome::default();
        for source in &descriptor.sources {
            self.check_source(descriptor, source, observer, &mut outcome);
        }
        tracing::debug!(
            file = %descriptor.label(),
            sources = descriptor.sources.len(),
            errors = outcome.errors.len(),
            "integrity check finished"
        );
        outcome
    }

    fn check_source(
        &self,
        descriptor: &FileDescriptor,
        source: &str,
        observer: &dyn ProgressObserver,
        outcome: &mut IntegrityOutcome,
    ) {
        tracing::debug!(file = %descriptor.label(), %source, "checking source");

        let mut stream = match self.resolver.open(source) {
            Ok(stream) => stream,
            Err(e) => {
                outcome.errors.push(bad_url(descriptor, source, &e));
                return;
            }
        };

        let origin = stream.origin();
        let total_len = stream.total_len();
        if let (StreamOrigin::Remote, Some(announced)) = (origin, total_len) {
            if announced != descriptor.declared_size {
                outcome.warnings.push(format!(
                    "Url {source} for the file \"{}\" in \"{}\" reported a size of {announced} bytes but the specification says it should be {} bytes",
                    descriptor.file_name, descriptor.component_name, descriptor.declared_size
                ));
            }
        }

        let streamed = digest_stream(&mut stream, total_len, |percent| {
            observer.on_progress(&ProgressEvent {
                component_name: &descriptor.component_name,
                file_name: &descriptor.file_name,
                source,
                percent,
            });
        });

        let streamed = match streamed {
            Ok(streamed) => streamed,
            Err(e) => {
                let err = ResolveError::Read { origin, source: e };
                outcome.errors.push(bad_url(descriptor, source, &err));
                return;
            }
        };

        if streamed.byte_count != descriptor.declared_size {
            outcome.errors.push(
                ValidationError::new(
                    ErrorCode::WrongFileSize,
                    &descriptor.component_name,
                    format!(
                        "File size was {} bytes but the specification says it should be {} bytes",
                        streamed.byte_count, descriptor.declared_size
                    ),
                )
                .for_source(&descriptor.file_name, source),
            );
        }

        if !streamed.digest.matches_hex(&descriptor.checksum) {
            outcome.errors.push(
                ValidationError::new(
                    ErrorCode::WrongMd5,
                    &descriptor.component_name,
                    format!(
                        "Checksum was \"{}\" but the specification says it should be {}",
                        streamed.digest, descriptor.checksum
                    ),
                )
                .for_source(&descriptor.file_name, source),
            );
        }
    }
}

fn bad_url(descriptor: &FileDescriptor, source: &str, err: &ResolveError) -> ValidationError {
    tracing::warn!(file = %descriptor.label(), %source, error = %err, "source failed");
    let description = if err.is_http_status() {
        format!("Http error \"{err}\"")
    } else {
        format!("Url error \"{err}\"")
    };
    ValidationError::new(ErrorCode::BadUrl, &descriptor.component_name, description)
        .for_source(&descriptor.file_name, source)
        .temporary(err.is_temporary())
}
