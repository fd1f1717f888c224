//! captionfx burns emotion-tagged, animated captions and procedural effects into a recorded clip.
//!
//! The export is one state machine:
//!
//! - Load the source, probe an output format and open the encoder ([`ExportPipeline`])
//! - Per decoded frame, look up the active [`Segment`], plan the frame ([`FrameCompositor`]) and
//!   rasterize it ([`CpuRasterizer`])
//! - Flush the encoder and save a timestamped `.webm`/`.mp4`
//!
//! Platform resources sit behind [`MediaPlatform`]; [`FfmpegPlatform`] is the production one.
#![forbid(unsafe_code)]

mod foundation;

pub mod assets;
pub mod audio;
pub mod caption;
pub mod config;
pub mod effects;
pub mod encode;
pub mod export;
pub mod model;
pub mod provider;
pub mod render;
pub mod timeline;

pub use crate::foundation::core::{
    Affine, BezPath, Canvas, Fps, FrameIndex, Line, Point, Rect, Rgba8, Rgba8Premul, Vec2,
};
pub use crate::foundation::error::{CaptionFxError, CaptionFxResult, ErrorKind};

pub use crate::assets::media::{VideoFrame, VideoSourceInfo};
pub use crate::caption::layout::{CaptionRenderer, GlyphRun};
pub use crate::config::{CaptionTuning, ExportConfig};
pub use crate::effects::filter::{FilterBank, PixelTransformSpec};
pub use crate::effects::vfx::{DrawOp, EffectEngine};
pub use crate::encode::ffmpeg::FfmpegSink;
pub use crate::encode::format::OutputFormat;
pub use crate::encode::sink::{AudioInputConfig, EncodedChunks, FrameSink, InMemorySink, SinkConfig};
pub use crate::export::job::{ExportRequest, RenderJob};
pub use crate::export::pipeline::ExportPipeline;
pub use crate::export::platform::{
    AudioGraph, FfmpegPlatform, FrameSource, MediaPlatform, OutputArtifact, SourceProperties,
};
pub use crate::export::progress::{
    CancelToken, ExportObserver, ExportOutcome, ExportReport, ExportState, NoopObserver,
};
pub use crate::model::segment::{Emotion, Segment};
pub use crate::model::style::{FilterSelection, FontSizeTier, StyleConfig, StyleId};
pub use crate::provider::{JsonFileProvider, SegmentProvider, resolve_segments};
pub use crate::render::backend::{FrameRGBA, RasterBackend};
pub use crate::render::compositor::{FrameCompositor, FramePlan};
pub use crate::render::cpu::CpuRasterizer;
pub use crate::timeline::index::SegmentIndex;
