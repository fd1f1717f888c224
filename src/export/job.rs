use std::path::PathBuf;

use crate::encode::format::OutputFormat;
use crate::encode::sink::FrameSink;
use crate::export::platform::{AudioGraph, FrameSource, SourceProperties};
use crate::export::progress::{ExportState, ProgressCounter};
use crate::foundation::core::Canvas;
use crate::model::segment::Segment;
use crate::model::style::{FilterSelection, FontSizeTier, StyleConfig};
use crate::render::backend::RasterBackend;

/// What the caller asks to export.
#[derive(Clone, Debug)]
pub struct ExportRequest {
    /// Source clip.
    pub source: PathBuf,
    /// Caption segments in provider order.
    pub segments: Vec<Segment>,
    /// Caption look.
    pub style: StyleConfig,
    /// Whole-frame colour filter.
    pub filter: FilterSelection,
    /// Caption size tier.
    pub font_size: FontSizeTier,
}

/// Transient state of one export run.
///
/// Owns every resource the run acquires. [`RenderJob::release`] drops them in reverse
/// acquisition order and also runs on drop, so an early return or panic cannot leak them.
pub struct RenderJob {
    pub(crate) request: ExportRequest,
    pub(crate) state: ExportState,
    pub(crate) progress: ProgressCounter,
    pub(crate) props: Option<SourceProperties>,
    pub(crate) format: Option<OutputFormat>,
    pub(crate) frames_pushed: u64,

    pub(crate) source: Option<Box<dyn FrameSource>>,
    pub(crate) backend: Option<Box<dyn RasterBackend>>,
    pub(crate) audio: Option<Box<dyn AudioGraph>>,
    pub(crate) sink: Option<Box<dyn FrameSink>>,
}

impl RenderJob {
    pub(crate) fn new(request: ExportRequest) -> Self {
        Self {
            request,
            state: ExportState::Idle,
            progress: ProgressCounter::default(),
            props: None,
            format: None,
            frames_pushed: 0,
            source: None,
            backend: None,
            audio: None,
            sink: None,
        }
    }

    /// The request this job was created for.
    pub fn request(&self) -> &ExportRequest {
        &self.request
    }

    /// Current state.
    pub fn state(&self) -> ExportState {
        self.state
    }

    /// Current progress percent.
    pub fn progress_percent(&self) -> u8 {
        self.progress.percent()
    }

    /// Output size, once the source is loaded.
    pub fn canvas(&self) -> Option<Canvas> {
        self.props.as_ref().map(|p| p.canvas)
    }

    /// Chosen output format, once probed.
    pub fn format(&self) -> Option<OutputFormat> {
        self.format
    }

    /// Frames pushed to the encoder so far.
    pub fn frames_pushed(&self) -> u64 {
        self.frames_pushed
    }

    /// Number of platform resources still held.
    pub fn held_resources(&self) -> usize {
        usize::from(self.source.is_some())
            + usize::from(self.backend.is_some())
            + usize::from(self.audio.is_some())
            + usize::from(self.sink.is_some())
    }

    /// Drop every held resource, newest first. Safe to call more than once.
    pub fn release(&mut self) {
        if self.sink.take().is_some() {
            tracing::debug!("released encoder");
        }
        if self.audio.take().is_some() {
            tracing::debug!("released audio route");
        }
        if self.backend.take().is_some() {
            tracing::debug!("released drawing surface");
        }
        if self.source.take().is_some() {
            tracing::debug!("released source decoder");
        }
    }
}

impl Drop for RenderJob {
    fn drop(&mut self) {
        self.release();
    }
}
