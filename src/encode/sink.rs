use crate::encode::format::OutputFormat;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{CaptionFxError, CaptionFxResult};
use crate::render::backend::FrameRGBA;
use std::path::PathBuf;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Target video bitrate in bits per second.
    pub video_bitrate_bps: u64,
    /// Audio routed into the same output stream, if the source has any.
    pub audio: Option<AudioInputConfig>,
}

/// Raw PCM audio input for sinks that mux audio.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioInputConfig {
    /// Path to interleaved `f32le` PCM data starting at source time zero.
    pub path: PathBuf,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
}

/// Encoded container bytes as produced by the encoder, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct EncodedChunks {
    /// Container the chunks belong to.
    pub format: Option<OutputFormat>,
    /// Chunks in the order the encoder emitted them.
    pub chunks: Vec<Vec<u8>>,
}

impl EncodedChunks {
    /// Total byte count across all chunks.
    pub fn total_len(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    /// Concatenate into one contiguous buffer.
    pub fn concat(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.total_len());
        for c in self.chunks {
            out.extend_from_slice(&c);
        }
        out
    }
}

/// Streaming encoder contract.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order; each call
/// is an explicit "capture this frame" request, the sink never samples on its own clock.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> CaptionFxResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> CaptionFxResult<()>;
    /// Flush the encoder and hand back everything it produced.
    fn end(&mut self) -> CaptionFxResult<EncodedChunks>;
}

/// In-memory sink for tests and previews. Each pushed frame becomes one "chunk" of raw RGBA.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    format: Option<OutputFormat>,
    last_idx: Option<FrameIndex>,
    pub(crate) frames: Vec<(FrameIndex, FrameRGBA)>,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag the produced chunks with `format`.
    pub fn with_format(format: OutputFormat) -> Self {
        Self {
            format: Some(format),
            ..Self::default()
        }
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg.clone()
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> CaptionFxResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> CaptionFxResult<()> {
        if self.cfg.is_none() {
            return Err(CaptionFxError::encoder("in-memory sink not started"));
        }
        if let Some(last) = self.last_idx
            && idx <= last
        {
            return Err(CaptionFxError::encoder(
                "in-memory sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> CaptionFxResult<EncodedChunks> {
        if self.cfg.take().is_none() {
            return Err(CaptionFxError::encoder("in-memory sink not started"));
        }
        Ok(EncodedChunks {
            format: self.format,
            chunks: self.frames.iter().map(|(_, f)| f.data.clone()).collect(),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
