use std::path::{Path, PathBuf};

use crate::assets::media::AudioPcm;
use crate::encode::sink::AudioInputConfig;
use crate::foundation::error::{CaptionFxError, CaptionFxResult};

/// Trim or silence-pad `pcm` so it lasts exactly `duration_secs`.
///
/// Audio and video both start at source time zero; fitting the audio to the video duration keeps
/// the muxer from stretching either stream.
pub fn fit_to_duration(pcm: &mut AudioPcm, duration_secs: f64) {
    if pcm.channels == 0 || pcm.sample_rate == 0 {
        pcm.interleaved_f32.clear();
        return;
    }
    let frames = (duration_secs.max(0.0) * f64::from(pcm.sample_rate)).round() as usize;
    pcm.interleaved_f32
        .resize(frames * usize::from(pcm.channels), 0.0);
}

/// Write interleaved samples as raw little-endian `f32`, clamped to `[-1, 1]`.
pub fn write_f32le_file(samples_interleaved: &[f32], out_path: &Path) -> CaptionFxResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            CaptionFxError::encoder(format!(
                "failed to create audio mix directory '{}': {e}",
                parent.display()
            ))
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.clamp(-1.0, 1.0).to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        CaptionFxError::encoder(format!(
            "failed to write mixed audio file '{}': {e}",
            out_path.display()
        ))
    })
}

/// Removes its file on drop.
#[derive(Debug)]
pub struct TempFileGuard(Option<PathBuf>);

impl TempFileGuard {
    /// Take ownership of `path`.
    pub fn new(path: PathBuf) -> Self {
        Self(Some(path))
    }

    /// Guarded path, if still present.
    pub fn path(&self) -> Option<&Path> {
        self.0.as_deref()
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

/// The source's audio track, staged on disk for the encoder's second input.
///
/// Dropping the graph deletes the staged samples.
#[derive(Debug)]
pub struct AudioMixGraph {
    input: AudioInputConfig,
    duration_secs: f64,
    _file: TempFileGuard,
}

impl AudioMixGraph {
    /// Stage `pcm` (fitted to `duration_secs`) under `dir`.
    ///
    /// Returns `None` for silent sources so the encoder is opened without an audio input.
    pub fn build(
        mut pcm: AudioPcm,
        duration_secs: f64,
        dir: &Path,
    ) -> CaptionFxResult<Option<Self>> {
        if pcm.interleaved_f32.is_empty() {
            return Ok(None);
        }
        fit_to_duration(&mut pcm, duration_secs);
        if pcm.interleaved_f32.is_empty() {
            return Ok(None);
        }

        let path = dir.join(format!(
            "captionfx_audio_mix_{}_{}.f32le",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0)
        ));
        let guard = TempFileGuard::new(path.clone());
        write_f32le_file(&pcm.interleaved_f32, &path)?;
        tracing::debug!(path = %path.display(), duration_secs, "staged audio mix");

        Ok(Some(Self {
            input: AudioInputConfig {
                path,
                sample_rate: pcm.sample_rate,
                channels: pcm.channels,
            },
            duration_secs,
            _file: guard,
        }))
    }

    /// Encoder input describing the staged samples.
    pub fn input(&self) -> &AudioInputConfig {
        &self.input
    }

    /// Staged duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
