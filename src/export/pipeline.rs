//! Export state machine.
//!
//! `Idle -> Preparing -> Encoding -> Finalizing -> {Done, Failed, Cancelled}`. One call to
//! [`ExportPipeline::run`] is one run; every resource it acquires lives in a [`RenderJob`] that is
//! released before the terminal state is reported.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::assets::media::VideoFrame;
use crate::caption::layout::CaptionRenderer;
use crate::config::ExportConfig;
use crate::effects::filter::FilterBank;
use crate::encode::format::select_format;
use crate::encode::sink::SinkConfig;
use crate::export::job::{ExportRequest, RenderJob};
use crate::export::platform::{MediaPlatform, OutputArtifact, artifact_file_name};
use crate::export::progress::{
    CancelToken, ExportObserver, ExportOutcome, ExportReport, ExportState,
};
use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{CaptionFxError, CaptionFxResult};
use crate::render::backend::{FrameRGBA, RasterBackend};
use crate::render::compositor::{CompositorSettings, FramePlan, FrameCompositor};
use crate::timeline::index::SegmentIndex;

/// Runs exports, at most one at a time.
#[derive(Debug)]
pub struct ExportPipeline {
    config: ExportConfig,
    jitter_seed: Option<u64>,
    in_flight: AtomicBool,
    state: Mutex<ExportState>,
}

impl ExportPipeline {
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            jitter_seed: None,
            in_flight: AtomicBool::new(false),
            state: Mutex::new(ExportState::Idle),
        }
    }

    /// Seed shake, jitter and sparks for reproducible output.
    pub fn with_jitter_seed(mut self, seed: u64) -> Self {
        self.jitter_seed = Some(seed);
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// State of the most recent run.
    pub fn state(&self) -> ExportState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// `true` while a run is in flight.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Run one export.
    ///
    /// A second call while a run is in flight fails with `Busy` and leaves the first untouched.
    #[tracing::instrument(skip_all, fields(source = %request.source.display()))]
    pub fn run(
        &self,
        platform: &mut dyn MediaPlatform,
        request: ExportRequest,
        observer: &mut dyn ExportObserver,
        cancel: &CancelToken,
    ) -> CaptionFxResult<ExportOutcome> {
        let _slot = InFlightSlot::acquire(&self.in_flight)?;

        let mut job = RenderJob::new(request);
        let result = self.drive(&mut job, platform, observer, cancel);
        job.release();

        let terminal = match &result {
            Ok(ExportOutcome::Done(report)) => {
                tracing::info!(
                    path = %report.saved_to.display(),
                    format = %report.format,
                    bytes = report.bytes,
                    frames = report.frames,
                    "export saved"
                );
                ExportState::Done
            }
            Ok(ExportOutcome::Cancelled { frames }) => {
                tracing::info!(frames, "export cancelled");
                ExportState::Cancelled
            }
            Err(e) => {
                tracing::error!(error = %e, "export failed");
                ExportState::Failed
            }
        };
        self.enter(&mut job, observer, terminal);
        observer.finished(&result);
        result
    }

    fn drive(
        &self,
        job: &mut RenderJob,
        platform: &mut dyn MediaPlatform,
        observer: &mut dyn ExportObserver,
        cancel: &CancelToken,
    ) -> CaptionFxResult<ExportOutcome> {
        self.enter(job, observer, ExportState::Preparing);
        job.progress.reset();
        observer.progress(0);
        self.prepare(job, platform)?;

        let canvas = job
            .canvas()
            .ok_or_else(|| CaptionFxError::media_load("source dimensions unknown"))?;
        let mut compositor = self.compositor(job.request(), canvas);

        self.enter(job, observer, ExportState::Encoding);
        let cancelled = encode(job, &mut compositor, observer, cancel)?;

        self.enter(job, observer, ExportState::Finalizing);
        if cancelled {
            return Ok(ExportOutcome::Cancelled {
                frames: job.frames_pushed,
            });
        }
        self.finalize(job, platform).map(ExportOutcome::Done)
    }

    fn prepare(&self, job: &mut RenderJob, platform: &mut dyn MediaPlatform) -> CaptionFxResult<()> {
        let source = platform.open_source(&job.request.source)?;
        let props = source.properties().clone();
        job.source = Some(source);
        tracing::debug!(
            width = props.canvas.width,
            height = props.canvas.height,
            fps = props.fps.as_f64(),
            duration = ?props.duration_secs,
            has_audio = props.has_audio,
            "source loaded"
        );

        let supported = platform.supported_formats()?;
        let format = select_format(&self.config.format_preference, &supported)?;
        job.format = Some(format);

        job.backend = Some(platform.open_canvas(props.canvas)?);
        job.audio = platform.open_audio(&job.request.source, &props)?;

        let mut sink = platform.open_encoder(format)?;
        sink.begin(SinkConfig {
            width: props.canvas.width,
            height: props.canvas.height,
            fps: props.fps,
            video_bitrate_bps: self.config.video_bitrate_bps,
            audio: job.audio.as_ref().map(|a| a.input().clone()),
        })?;
        job.sink = Some(sink);
        job.props = Some(props);
        tracing::debug!(%format, audio = job.audio.is_some(), "encoder open");
        Ok(())
    }

    fn finalize(
        &self,
        job: &mut RenderJob,
        platform: &mut dyn MediaPlatform,
    ) -> CaptionFxResult<ExportReport> {
        let mut sink = job
            .sink
            .take()
            .ok_or_else(|| CaptionFxError::encoder("encoder missing at finalize"))?;
        let chunks = sink.end()?;
        drop(sink);

        let format = chunks
            .format
            .or(job.format)
            .ok_or_else(|| CaptionFxError::encoder("encoder did not report its format"))?;
        let bytes = chunks.concat();
        if bytes.is_empty() {
            return Err(CaptionFxError::encoder("encoder produced no output"));
        }

        let millis = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let artifact = OutputArtifact {
            format,
            file_name: artifact_file_name(&self.config.file_prefix, format, millis),
            bytes,
        };
        let saved_to = platform.save(&artifact)?;
        Ok(ExportReport {
            saved_to,
            format,
            bytes: artifact.bytes.len(),
            frames: job.frames_pushed,
        })
    }

    /// Composite the single frame `source` (at its presentation time) without encoding.
    pub fn preview(
        &self,
        request: &ExportRequest,
        backend: &mut dyn RasterBackend,
        canvas: Canvas,
        source: &VideoFrame,
    ) -> CaptionFxResult<(FramePlan, FrameRGBA)> {
        let index = SegmentIndex::new(request.segments.clone());
        let t = source.pts_secs;
        self.compositor(request, canvas)
            .composite(backend, source, index.active_at(t), t)
    }

    fn compositor(&self, request: &ExportRequest, canvas: Canvas) -> FrameCompositor {
        let settings = CompositorSettings {
            canvas,
            filter: FilterBank::resolve(request.filter),
            style: request.style.clone(),
            font_size: request.font_size,
            shake_intensity_px: self.config.shake_intensity_px,
        };
        let captions = CaptionRenderer::new(self.config.caption.clone());
        match self.jitter_seed {
            Some(seed) => FrameCompositor::with_rng(settings, captions, StdRng::seed_from_u64(seed)),
            None => FrameCompositor::new(settings, captions),
        }
    }

    fn enter(&self, job: &mut RenderJob, observer: &mut dyn ExportObserver, state: ExportState) {
        tracing::info!(from = %job.state, to = %state, "export state");
        job.state = state;
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
        observer.state_changed(state);
    }
}

/// Per-frame loop. Returns `true` when the run was cancelled.
fn encode(
    job: &mut RenderJob,
    compositor: &mut FrameCompositor,
    observer: &mut dyn ExportObserver,
    cancel: &CancelToken,
) -> CaptionFxResult<bool> {
    let index = SegmentIndex::new(job.request.segments.clone());
    let duration = job.props.as_ref().and_then(|p| p.duration_secs);
    let (Some(source), Some(backend), Some(sink)) =
        (job.source.as_mut(), job.backend.as_mut(), job.sink.as_mut())
    else {
        return Err(CaptionFxError::encoder("render job is missing a resource"));
    };

    source.seek_start()?;
    loop {
        if cancel.is_cancelled() {
            return Ok(true);
        }
        let Some(frame) = source.next_frame()? else {
            break;
        };
        let t = frame.pts_secs;
        let (_, rgba) = compositor.composite(&mut **backend, &frame, index.active_at(t), t)?;
        sink.push_frame(FrameIndex(job.frames_pushed), &rgba)?;
        job.frames_pushed += 1;
        if let Some(p) = job.progress.update(t, duration) {
            observer.progress(p);
        }
    }

    if job.frames_pushed == 0 {
        return Err(CaptionFxError::media_load("source produced no frames"));
    }
    if let Some(p) = job.progress.finish() {
        observer.progress(p);
    }
    Ok(false)
}

struct InFlightSlot<'a>(&'a AtomicBool);

impl<'a> InFlightSlot<'a> {
    fn acquire(flag: &'a AtomicBool) -> CaptionFxResult<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| CaptionFxError::busy("an export is already in flight"))?;
        Ok(Self(flag))
    }
}

impl Drop for InFlightSlot<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/pipeline.rs"]
mod tests;
