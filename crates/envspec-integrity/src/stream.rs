//! Chunked hashing of a byte stream.
//!
//! Memory use is one fixed buffer regardless of artifact size.

use std::io::{self, Read};

use envspec_core::{Md5Digest, Md5Hasher};

use crate::progress::{ProgressMeter, COMPLETE};

/// Bytes read per chunk.
pub const CHUNK_SIZE: usize = 10 * 1024;

/// Digest and length of a fully read stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamDigest {
    pub digest: Md5Digest,
    pub byte_count: u64,
}

/// Read `reader` to the end in [`CHUNK_SIZE`] chunks, hashing as it goes.
///
/// `report` receives `-1` first when `total_len` is unknown, each newly
/// crossed multiple of ten below 100 when it is known, and exactly one
/// `100` once the stream is exhausted.
///
/// # Errors
///
/// Returns the first non-interrupt read error. Nothing further is
/// reported for that stream, in particular no `100`.
pub fn digest_stream<R, F>(
    reader: &mut R,
    total_len: Option<u64>,
    mut report: F,
) -> io::Result<StreamDigest>
where
    R: Read + ?Sized,
    F: FnMut(i8),
{
    let mut meter = ProgressMeter::new(total_len);
    if let Some(percent) = meter.start() {
        report(percent);
    }

    let mut hasher = Md5Hasher::new();
    let mut byte_count = 0u64;
    let mut buf = vec![0u8; CHUNK_SIZE];

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
        byte_count += n as u64;
        if let Some(percent) = meter.advance(byte_count) {
            report(percent);
        }
    }

    report(COMPLETE);
    Ok(StreamDigest {
        digest: hasher.finish(),
        byte_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Yields `data` then fails.
    struct FailingReader {
        data: io::Cursor<Vec<u8>>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.read(buf)? {
                0 => Err(io::Error::new(io::ErrorKind::ConnectionReset, "peer went away")),
                n => Ok(n),
            }
        }
    }

    fn run(data: &[u8], total_len: Option<u64>) -> (StreamDigest, Vec<i8>) {
        let mut events = Vec::new();
        let result = digest_stream(&mut io::Cursor::new(data), total_len, |p| events.push(p)).unwrap();
        (result, events)
    }

    #[test]
    fn empty_stream() {
        let (result, events) = run(b"", Some(0));
        assert_eq!(result.byte_count, 0);
        assert_eq!(result.digest.to_hex(), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(events, [100]);
    }

    #[test]
    fn unknown_length_reports_sentinel_then_complete() {
        let data = vec![7u8; CHUNK_SIZE * 3];
        let (result, events) = run(&data, None);
        assert_eq!(result.byte_count, data.len() as u64);
        assert_eq!(events, [-1, 100]);
    }

    #[test]
    fn known_length_reports_thresholds() {
        let data = vec![1u8; CHUNK_SIZE * 10];
        let (result, events) = run(&data, Some(data.len() as u64));
        assert_eq!(result.digest, Md5Digest::of(&data));
        assert_eq!(events, [10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);
    }

    #[test]
    fn small_stream_jumps_to_cap() {
        let (result, events) = run(b"0123456789", Some(10));
        assert_eq!(result.byte_count, 10);
        assert_eq!(events, [90, 100]);
    }

    #[test]
    fn read_failure_stops_without_completion() {
        let mut reader = FailingReader {
            data: io::Cursor::new(vec![0u8; CHUNK_SIZE * 2]),
        };
        let mut events = Vec::new();
        let err = digest_stream(&mut reader, Some((CHUNK_SIZE * 4) as u64), |p| events.push(p))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
        assert!(!events.contains(&100));
        assert_eq!(events, [20, 50]);
    }

    proptest! {
        #[test]
        fn progress_is_monotonic_and_terminated_once(
            len in 0usize..(CHUNK_SIZE * 12),
            declared in proptest::option::of(0u64..200_000),
        ) {
            let data = vec![0xa5u8; len];
            let (result, events) = run(&data, declared);

            prop_assert_eq!(result.byte_count, len as u64);
            prop_assert_eq!(events.last().copied(), Some(100));
            prop_assert_eq!(events.iter().filter(|p| **p == 100).count(), 1);
            prop_assert!(events.windows(2).all(|w| w[0] <= w[1]));
            prop_assert!(events.iter().all(|p| (-1..=100).contains(p)));
            prop_assert_eq!(events.contains(&-1), declared.is_none());
        }
    }
}
