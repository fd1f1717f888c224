//! Resource seam between the export state machine and the media runtime.
//!
//! Every resource a run acquires comes from a [`MediaPlatform`] as an owned box, so the pipeline
//! releases it by dropping it and test doubles can count what is still alive.

use std::path::{Path, PathBuf};

use crate::assets::media::{self, VideoDecoder, VideoFrame};
use crate::audio::mix::AudioMixGraph;
use crate::encode::ffmpeg::{FfmpegSink, ensure_parent_dir, is_ffmpeg_on_path};
use crate::encode::format::{OutputFormat, probe_ffmpeg_formats};
use crate::encode::sink::{AudioInputConfig, FrameSink};
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{CaptionFxError, CaptionFxResult};
use crate::render::backend::{RasterBackend, surface_dims};
use crate::render::cpu::CpuRasterizer;

/// Properties the pipeline needs from an opened source.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceProperties {
    /// Output canvas (natural size, even dimensions).
    pub canvas: Canvas,
    /// Rate frames are delivered at.
    pub fps: Fps,
    /// Duration in seconds, when known.
    pub duration_secs: Option<f64>,
    /// Whether the source has an audio track.
    pub has_audio: bool,
}

/// Decode cursor over the source clip.
pub trait FrameSource: Send {
    fn properties(&self) -> &SourceProperties;
    /// Rewind to time zero and start playback.
    fn seek_start(&mut self) -> CaptionFxResult<()>;
    /// Next frame in presentation order, or `None` when playback has ended.
    fn next_frame(&mut self) -> CaptionFxResult<Option<VideoFrame>>;
}

/// Source audio routed into the encoder.
pub trait AudioGraph: Send {
    fn input(&self) -> &AudioInputConfig;
}

impl AudioGraph for AudioMixGraph {
    fn input(&self) -> &AudioInputConfig {
        AudioMixGraph::input(self)
    }
}

/// Encoded output ready to be saved.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputArtifact {
    /// Container and codec.
    pub format: OutputFormat,
    /// `<prefix>_<unix-millis>.<ext>`.
    pub file_name: String,
    /// Complete container bytes.
    pub bytes: Vec<u8>,
}

/// Artifact file name for `prefix`, `format` and a unix timestamp in milliseconds.
pub fn artifact_file_name(prefix: &str, format: OutputFormat, unix_millis: u128) -> String {
    format!("{prefix}_{unix_millis}.{}", format.extension())
}

/// Everything an export run acquires.
pub trait MediaPlatform {
    /// Load the source off-screen and wait until its dimensions are known.
    fn open_source(&mut self, path: &Path) -> CaptionFxResult<Box<dyn FrameSource>>;
    /// Output formats the runtime can encode.
    fn supported_formats(&mut self) -> CaptionFxResult<Vec<OutputFormat>>;
    /// Drawing surface for `canvas`.
    fn open_canvas(&mut self, canvas: Canvas) -> CaptionFxResult<Box<dyn RasterBackend>>;
    /// Route the source's audio into the output; `None` for silent sources.
    fn open_audio(
        &mut self,
        path: &Path,
        props: &SourceProperties,
    ) -> CaptionFxResult<Option<Box<dyn AudioGraph>>>;
    /// Streaming encoder for `format`.
    fn open_encoder(&mut self, format: OutputFormat) -> CaptionFxResult<Box<dyn FrameSink>>;
    /// Hand the artifact to the user. Returns where it went.
    fn save(&mut self, artifact: &OutputArtifact) -> CaptionFxResult<PathBuf>;
}

/// [`MediaPlatform`] over the system `ffmpeg`/`ffprobe` and the CPU rasterizer.
#[derive(Clone, Debug)]
pub struct FfmpegPlatform {
    output_dir: PathBuf,
    scratch_dir: PathBuf,
    output_fps: Option<Fps>,
    fallback_fps: Fps,
    font_dir: Option<PathBuf>,
}

impl FfmpegPlatform {
    /// Platform saving artifacts into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            scratch_dir: std::env::temp_dir(),
            output_fps: None,
            fallback_fps: Fps { num: 30, den: 1 },
            font_dir: None,
        }
    }

    /// Take output directory and frame rates from `cfg`.
    pub fn from_config(cfg: &crate::config::ExportConfig) -> Self {
        Self {
            output_fps: cfg.output_fps,
            fallback_fps: cfg.fallback_fps,
            ..Self::new(cfg.output_dir.clone())
        }
    }

    /// Directory for staged audio.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    /// Extra fonts (e.g. Press Start 2P, Russo One) loaded ahead of system fonts.
    pub fn with_font_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.font_dir = dir;
        self
    }
}

struct FfmpegSource {
    props: SourceProperties,
    decoder: VideoDecoder,
}

impl FrameSource for FfmpegSource {
    fn properties(&self) -> &SourceProperties {
        &self.props
    }

    fn seek_start(&mut self) -> CaptionFxResult<()> {
        self.decoder.seek_start()
    }

    fn next_frame(&mut self) -> CaptionFxResult<Option<VideoFrame>> {
        self.decoder.next_frame()
    }
}

impl MediaPlatform for FfmpegPlatform {
    fn open_source(&mut self, path: &Path) -> CaptionFxResult<Box<dyn FrameSource>> {
        let info = media::probe_video(path)?;
        let fps = match (self.output_fps, info.fps) {
            (Some(fps), _) => fps,
            (None, Some(fps)) => fps,
            (None, None) => {
                tracing::warn!(fallback = self.fallback_fps.as_f64(), "source frame rate unknown");
                self.fallback_fps
            }
        };
        let props = SourceProperties {
            canvas: info.natural_canvas()?,
            fps,
            duration_secs: info.duration_secs,
            has_audio: info.has_audio,
        };
        Ok(Box::new(FfmpegSource {
            props,
            decoder: VideoDecoder::new(info, fps),
        }))
    }

    fn supported_formats(&mut self) -> CaptionFxResult<Vec<OutputFormat>> {
        probe_ffmpeg_formats()
    }

    fn open_canvas(&mut self, canvas: Canvas) -> CaptionFxResult<Box<dyn RasterBackend>> {
        surface_dims(canvas)?;
        Ok(Box::new(CpuRasterizer::with_font_dir(
            self.font_dir.as_deref(),
        )))
    }

    fn open_audio(
        &mut self,
        path: &Path,
        props: &SourceProperties,
    ) -> CaptionFxResult<Option<Box<dyn AudioGraph>>> {
        if !props.has_audio {
            return Ok(None);
        }
        let pcm = media::decode_audio_f32_stereo(path, media::MIX_SAMPLE_RATE)?;
        let duration = props.duration_secs.unwrap_or_else(|| pcm.duration_secs());
        let graph = AudioMixGraph::build(pcm, duration, &self.scratch_dir)?;
        Ok(graph.map(|g| Box::new(g) as Box<dyn AudioGraph>))
    }

    fn open_encoder(&mut self, format: OutputFormat) -> CaptionFxResult<Box<dyn FrameSink>> {
        if !is_ffmpeg_on_path() {
            return Err(CaptionFxError::encoder(
                "ffmpeg is required for encoding, but was not found on PATH",
            ));
        }
        Ok(Box::new(FfmpegSink::new(format)))
    }

    fn save(&mut self, artifact: &OutputArtifact) -> CaptionFxResult<PathBuf> {
        let path = self.output_dir.join(&artifact.file_name);
        ensure_parent_dir(&path)?;
        std::fs::write(&path, &artifact.bytes).map_err(|e| {
            CaptionFxError::encoder(format!("failed to save '{}': {e}", path.display()))
        })?;
        Ok(path)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/platform.rs"]
mod tests;
