use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::foundation::error::CaptionFxResult;

/// Export state machine states.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExportState {
    /// No export has run yet.
    Idle,
    /// Acquiring the source, encoder and audio route.
    Preparing,
    /// Per-frame composite and encode loop.
    Encoding,
    /// Flushing the encoder and saving the artifact.
    Finalizing,
    /// Artifact saved.
    Done,
    /// A step failed; nothing was saved.
    Failed,
    /// Cancelled by the caller; nothing was saved.
    Cancelled,
}

impl ExportState {
    /// `Done`, `Failed` and `Cancelled` end a run.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Preparing => "preparing",
            Self::Encoding => "encoding",
            Self::Finalizing => "finalizing",
            Self::Done => "done",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ExportState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Integer percent of the source played through the encoder.
///
/// Never decreases within a run; [`Self::reset`] starts the next one at 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProgressCounter {
    percent: u8,
}

impl ProgressCounter {
    /// Current percent.
    pub fn percent(&self) -> u8 {
        self.percent
    }

    /// Back to 0 for a new run.
    pub fn reset(&mut self) {
        self.percent = 0;
    }

    /// Advance to `floor(t / duration * 100)`. Returns the new percent when it increased.
    ///
    /// An unknown or non-positive duration leaves progress untouched until [`Self::finish`].
    pub fn update(&mut self, t: f64, duration_secs: Option<f64>) -> Option<u8> {
        let duration = duration_secs.filter(|d| d.is_finite() && *d > 0.0)?;
        if !t.is_finite() {
            return None;
        }
        let p = ((t / duration) * 100.0).floor().clamp(0.0, 100.0) as u8;
        self.raise(p)
    }

    /// Jump to 100. Returns `Some(100)` unless already there.
    pub fn finish(&mut self) -> Option<u8> {
        self.raise(100)
    }

    fn raise(&mut self, p: u8) -> Option<u8> {
        if p > self.percent {
            self.percent = p;
            Some(p)
        } else {
            None
        }
    }
}

/// Cooperative cancellation flag, checked once per encoded frame.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Where a finished export ended up.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportReport {
    /// Location the artifact was saved to.
    pub saved_to: std::path::PathBuf,
    /// Container and codec of the artifact.
    pub format: crate::encode::format::OutputFormat,
    /// Artifact size in bytes.
    pub bytes: usize,
    /// Frames pushed to the encoder.
    pub frames: u64,
}

/// Successful end of a run.
#[derive(Clone, Debug, PartialEq)]
pub enum ExportOutcome {
    /// The artifact was saved.
    Done(ExportReport),
    /// The caller cancelled after `frames` frames; nothing was saved.
    Cancelled { frames: u64 },
}

/// Receives export lifecycle events.
pub trait ExportObserver {
    /// The state machine entered `state`.
    fn state_changed(&mut self, _state: ExportState) {}
    /// Progress advanced to `percent`.
    fn progress(&mut self, _percent: u8) {}
    /// The run ended.
    fn finished(&mut self, _outcome: &CaptionFxResult<ExportOutcome>) {}
}

/// Observer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl ExportObserver for NoopObserver {}

#[cfg(test)]
#[path = "../../tests/unit/export/progress.rs"]
mod tests;
