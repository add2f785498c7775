//! Progress reporting for streamed sources.
//!
//! Each source produces its own sequence of percentages: an optional `-1`
//! when the total length is unknown, then non-decreasing multiples of ten
//! below 100, then exactly one `100` when the stream is exhausted.

/// Reported once, before the first chunk, when the length is unknown.
pub const UNKNOWN_LENGTH: i8 = -1;

/// Reported once when a stream has been read to the end.
pub const COMPLETE: i8 = 100;

/// One progress report for one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent<'a> {
    pub component_name: &'a str,
    pub file_name: &'a str,
    pub source: &'a str,
    /// `-1` for unknown length, otherwise `0..=100`.
    pub percent: i8,
}

/// Receives progress events while artifacts stream.
///
/// Observers may be called from several worker threads at once; events
/// for a single source always arrive in order.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent<'_>);
}

impl<F> ProgressObserver for F
where
    F: Fn(&ProgressEvent<'_>) + Send + Sync,
{
    fn on_progress(&self, event: &ProgressEvent<'_>) {
        self(event)
    }
}

/// Observer that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&self, _event: &ProgressEvent<'_>) {}
}

/// Coalesces byte counts into threshold crossings.
#[derive(Debug, Clone)]
pub(crate) struct ProgressMeter {
    total: Option<u64>,
    last: i8,
}

impl ProgressMeter {
    pub(crate) fn new(total: Option<u64>) -> Self {
        Self { total, last: 0 }
    }

    /// The event to emit before the first chunk, if any.
    pub(crate) fn start(&self) -> Option<i8> {
        self.total.is_none().then_some(UNKNOWN_LENGTH)
    }

    /// The event to emit after `done` bytes, if a new threshold was crossed.
    /// Never returns 100; completion is reported separately.
    pub(crate) fn advance(&mut self, done: u64) -> Option<i8> {
        let total = self.total.filter(|t| *t > 0)?;
        let percent = (u128::from(done.min(total)) * 100 / u128::from(total)) as i8;
        let threshold = (percent / 10 * 10).min(90);
        if threshold > self.last {
            self.last = threshold;
            Some(threshold)
        } else {
            None
        }
    }
}
