//! # envspec-integrity -- Content Resolution & Integrity Checking
//!
//! Given a [`FileDescriptor`](envspec_core::FileDescriptor) that passed
//! structural validation, fetches each declared source and verifies the
//! streamed bytes against the declared size and MD5 checksum.
//!
//! ## Modules
//!
//! - `resolver`: [`ContentResolver`] seam and the [`DefaultResolver`] for
//!   `local:` paths, `file://` URLs and HTTP(S) URLs.
//! - `stream`: fixed-buffer chunked hashing with progress thresholds.
//! - `progress`: [`ProgressObserver`] and the events it receives.
//! - `checker`: [`IntegrityChecker`], which turns mismatches and transport
//!   failures into logged validation errors.
//!
//! ## Crate Policy
//!
//! - Depends only on `envspec-core` internally.
//! - Fetching is blocking. Callers that want concurrency run checks on
//!   their own worker threads; resolvers and observers are `Send + Sync`.

pub mod checker;
pub mod progress;
pub mod resolver;
pub mod stream;

pub use checker::{IntegrityChecker, IntegrityOutcome};
pub use progress::{NoProgress, ProgressEvent, ProgressObserver, COMPLETE, UNKNOWN_LENGTH};
pub use resolver::{
    ByteStream, ContentResolver, DefaultResolver, ResolveError, SourceLocation, StreamOrigin,
    LOCAL_PREFIX,
};
pub use stream::{digest_stream, StreamDigest, CHUNK_SIZE};
