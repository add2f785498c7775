//! # Content Source Resolver
//!
//! Turns a declared source string into a [`ByteStream`] of possibly
//! unknown length. Two kinds of source are recognized:
//!
//! | form | kind |
//! |------|------|
//! | `local:<path>`, `file://<path>` | local file |
//! | `http://...`, `https://...` | remote, fetched with a blocking HTTP client |
//!
//! Anything else is [`ResolveError::Unsupported`].
//!
//! The resolver only opens streams. Hashing and size accounting happen in
//! [`crate::stream`], so the same code path serves both kinds of source.

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Prefix marking a source as a path on the local filesystem.
pub const LOCAL_PREFIX: &str = "local:";

/// Errors raised while opening or reading a source.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The source is neither a local marker nor an HTTP(S) URL.
    #[error("unsupported source \"{location}\": {reason}")]
    Unsupported { location: String, reason: String },

    /// A local file could not be opened.
    #[error("cannot open {}: {source}", .path.display())]
    Local {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The HTTP request failed before a response arrived.
    #[error("{source}")]
    Transport { url: String, source: reqwest::Error },

    /// The server answered with a non-success status.
    #[error("HTTP Error {code}: {reason}")]
    Status { url: String, code: u16, reason: String },

    /// The stream failed part way through.
    #[error("read failed: {source}")]
    Read {
        origin: StreamOrigin,
        source: std::io::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("HTTP client initialization failed: {0}")]
    ClientInit(#[source] reqwest::Error),
}

impl ResolveError {
    /// Whether retrying the same source might succeed.
    ///
    /// Network problems are temporary. Local files that cannot be opened
    /// and malformed sources are not.
    pub fn is_temporary(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Status { .. } => true,
            Self::Read { origin, .. } => *origin == StreamOrigin::Remote,
            Self::Unsupported { .. } | Self::Local { .. } | Self::ClientInit(_) => false,
        }
    }

    /// Whether the server itself answered with an error, as opposed to the
    /// source being unreachable or unreadable.
    pub fn is_http_status(&self) -> bool {
        matches!(self, Self::Status { .. })
    }
}

/// Where a byte stream comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOrigin {
    Local,
    Remote,
}

/// A parsed source string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Local(PathBuf),
    Remote(Url),
}

impl SourceLocation {
    /// Classify a declared source.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Unsupported`] for anything that is not a
    /// `local:` marker, a `file://` URL or an HTTP(S) URL.
    pub fn parse(source: &str) -> Result<Self, ResolveError> {
        let unsupported = |reason: String| ResolveError::Unsupported {
            location: source.to_string(),
            reason,
        };

        if let Some(path) = source.strip_prefix(LOCAL_PREFIX) {
            if path.is_empty() {
                return Err(unsupported("empty local path".to_string()));
            }
            return Ok(Self::Local(PathBuf::from(path)));
        }

        let url = Url::parse(source).map_err(|e| unsupported(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(Self::Remote(url)),
            "file" => url
                .to_file_path()
                .map(Self::Local)
                .map_err(|()| unsupported("file URL has no local path".to_string())),
            other => Err(unsupported(format!("scheme \"{other}\" is not supported"))),
        }
    }

    pub fn origin(&self) -> StreamOrigin {
        match self {
            Self::Local(_) => StreamOrigin::Local,
            Self::Remote(_) => StreamOrigin::Remote,
        }
    }
}

/// An open source, read to exhaustion by the integrity checker.
pub struct ByteStream {
    reader: Box<dyn Read + Send>,
    total_len: Option<u64>,
    origin: StreamOrigin,
}

impl ByteStream {
    pub fn new(reader: impl Read + Send + 'static, total_len: Option<u64>, origin: StreamOrigin) -> Self {
        Self {
            reader: Box::new(reader),
            total_len,
            origin,
        }
    }

    /// Length announced by the source before streaming, if any. For remote
    /// sources this is the server's content length, which is a hint only.
    pub fn total_len(&self) -> Option<u64> {
        self.total_len
    }

    pub fn origin(&self) -> StreamOrigin {
        self.origin
    }
}

impl Read for ByteStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

impl std::fmt::Debug for ByteStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteStream")
            .field("total_len", &self.total_len)
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

/// Opens declared sources as byte streams.
///
/// Implementations are shared across worker threads when descriptor
/// checks run concurrently.
pub trait ContentResolver: Send + Sync {
    /// Open `source` for reading.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] when the source cannot be opened. The
    /// error's [`ResolveError::is_temporary`] decides how it is reported.
    fn open(&self, source: &str) -> Result<ByteStream, ResolveError>;
}

impl<R: ContentResolver + ?Sized> ContentResolver for &R {
    fn open(&self, source: &str) -> Result<ByteStream, ResolveError> {
        (**self).open(source)
    }
}

/// Resolver for local files and HTTP(S) URLs.
#[derive(Debug, Clone)]
pub struct DefaultResolver {
    http: reqwest::blocking::Client,
}

impl DefaultResolver {
    /// Build a resolver whose HTTP client gives up connecting after
    /// `connect_timeout`. Once a response has started, the body is read
    /// until it ends or the transport fails.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::ClientInit`] when the HTTP client cannot be
    /// built (for example, no TLS backend is available).
    pub fn new(connect_timeout: Duration, user_agent: &str) -> Result<Self, ResolveError> {
        let http = reqwest::blocking::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(None::<Duration>)
            .user_agent(user_agent)
            .build()
            .map_err(ResolveError::ClientInit)?;
        Ok(Self { http })
    }

    fn open_local(&self, path: PathBuf) -> Result<ByteStream, ResolveError> {
        let file = File::open(&path).map_err(|source| ResolveError::Local {
            path: path.clone(),
            source,
        })?;
        let total_len = file.metadata().ok().map(|m| m.len());
        tracing::debug!(path = %path.display(), ?total_len, "opened local source");
        Ok(ByteStream::new(file, total_len, StreamOrigin::Local))
    }

    fn open_remote(&self, url: Url) -> Result<ByteStream, ResolveError> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .map_err(|source| ResolveError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Status {
                url: url.to_string(),
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let total_len = response.content_length();
        tracing::debug!(%url, status = status.as_u16(), ?total_len, "opened remote source");
        Ok(ByteStream::new(response, total_len, StreamOrigin::Remote))
    }
}

impl ContentResolver for DefaultResolver {
    fn open(&self, source: &str) -> Result<ByteStream, ResolveError> {
        match SourceLocation::parse(source)? {
            SourceLocation::Local(path) => self.open_local(path),
            SourceLocation::Remote(url) => self.open_remote(url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_marker_is_a_path() {
        assert_eq!(
            SourceLocation::parse("local:/tmp/x").unwrap(),
            SourceLocation::Local(PathBuf::from("/tmp/x"))
        );
        assert_eq!(
            SourceLocation::parse("local:relative/file.tgz").unwrap(),
            SourceLocation::Local(PathBuf::from("relative/file.tgz"))
        );
    }

    #[test]
    fn http_and_https_are_remote() {
        for source in ["http://example.org/a.tgz", "https://example.org/a.tgz"] {
            let location = SourceLocation::parse(source).unwrap();
            assert_eq!(location.origin(), StreamOrigin::Remote);
        }
    }

    #[cfg(unix)]
    #[test]
    fn file_url_is_local() {
        assert_eq!(
            SourceLocation::parse("file:///var/data/input.dat").unwrap(),
            SourceLocation::Local(PathBuf::from("/var/data/input.dat"))
        );
    }

    #[test]
    fn other_sources_are_unsupported() {
        for source in ["ftp://example.org/a.tgz", "not a url", "local:", ""] {
            let err = SourceLocation::parse(source).unwrap_err();
            assert!(
                matches!(err, ResolveError::Unsupported { .. }),
                "{source}: {err:?}"
            );
            assert!(!err.is_temporary());
        }
    }

    #[test]
    fn temporary_classification() {
        let status = ResolveError::Status {
            url: "http://example.org".into(),
            code: 404,
            reason: "Not Found".into(),
        };
        assert!(status.is_temporary());
        assert!(status.is_http_status());
        assert_eq!(status.to_string(), "HTTP Error 404: Not Found");

        let local = ResolveError::Local {
            path: PathBuf::from("/missing"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(!local.is_temporary());

        let remote_read = ResolveError::Read {
            origin: StreamOrigin::Remote,
            source: std::io::Error::from(std::io::ErrorKind::ConnectionReset),
        };
        assert!(remote_read.is_temporary());

        let local_read = ResolveError::Read {
            origin: StreamOrigin::Local,
            source: std::io::Error::from(std::io::ErrorKind::Other),
        };
        assert!(!local_read.is_temporary());
    }

    #[test]
    fn opens_local_file_with_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifact.bin");
        std::fs::write(&path, b"0123456789").unwrap();

        let resolver = DefaultResolver::new(Duration::from_secs(5), "envspec-test").unwrap();
        let mut stream = resolver
            .open(&format!("local:{}", path.display()))
            .unwrap();
        assert_eq!(stream.origin(), StreamOrigin::Local);
        assert_eq!(stream.total_len(), Some(10));

        let mut content = Vec::new();
        stream.read_to_end(&mut content).unwrap();
        assert_eq!(content, b"0123456789");
    }

    #[test]
    fn missing_local_file_is_permanent() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = DefaultResolver::new(Duration::from_secs(5), "envspec-test").unwrap();
        let err = resolver
            .open(&format!("local:{}", dir.path().join("absent").display()))
            .unwrap_err();
        assert!(matches!(err, ResolveError::Local { .. }));
        assert!(!err.is_temporary());
    }
}
