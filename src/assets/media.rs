use std::path::{Path, PathBuf};

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{CaptionFxError, CaptionFxResult};

/// Sample rate used for the audio mix routed into the encoder.
pub const MIX_SAMPLE_RATE: u32 = 48_000;

/// Frame rates above this are container timebases, not real capture rates.
const MAX_PLAUSIBLE_FPS: f64 = 240.0;

/// What ffprobe knows about a source clip.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoSourceInfo {
    /// Path the clip was probed from.
    pub source_path: PathBuf,
    /// Natural width in pixels.
    pub width: u32,
    /// Natural height in pixels.
    pub height: u32,
    /// Average frame rate, when the container reports a plausible one.
    pub fps: Option<Fps>,
    /// Duration in seconds, when known.
    pub duration_secs: Option<f64>,
    /// Whether the clip has an audio stream.
    pub has_audio: bool,
}

impl VideoSourceInfo {
    /// Output canvas for this source: natural size rounded down to even dimensions.
    pub fn natural_canvas(&self) -> CaptionFxResult<Canvas> {
        Canvas::even_from(self.width, self.height)
            .map_err(|e| CaptionFxError::media_load(format!("source dimensions unusable: {e}")))
    }
}

/// One decoded source frame, straight-alpha RGBA8 at the source's natural size.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoFrame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Tightly packed RGBA8.
    pub data: Vec<u8>,
    /// Presentation time in source seconds.
    pub pts_secs: f64,
}

/// Interleaved PCM audio.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AudioPcm {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Interleaved samples.
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    /// Number of sample frames (one sample per channel).
    pub fn frame_count(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.interleaved_f32.len() / usize::from(self.channels)
        }
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.frame_count() as f64 / f64::from(self.sample_rate)
        }
    }
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

/// Interpret `ffprobe -print_format json -show_streams -show_format` output.
pub fn parse_probe_json(source_path: &Path, json: &[u8]) -> CaptionFxResult<VideoSourceInfo> {
    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| CaptionFxError::media_load(format!("ffprobe json parse failed: {e}")))?;
    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| CaptionFxError::media_load("no video stream found"))?;
    let width = video
        .width
        .filter(|w| *w > 0)
        .ok_or_else(|| CaptionFxError::media_load("missing video width from ffprobe"))?;
    let height = video
        .height
        .filter(|h| *h > 0)
        .ok_or_else(|| CaptionFxError::media_load("missing video height from ffprobe"))?;

    let fps = [video.avg_frame_rate.as_deref(), video.r_frame_rate.as_deref()]
        .into_iter()
        .flatten()
        .filter_map(Fps::parse_ratio)
        .find(|f| f.as_f64() <= MAX_PLAUSIBLE_FPS);

    let parse_secs = |s: Option<&String>| {
        s.and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d > 0.0)
    };
    let duration_secs = parse_secs(parsed.format.as_ref().and_then(|f| f.duration.as_ref()))
        .or_else(|| parse_secs(video.duration.as_ref()));

    Ok(VideoSourceInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        fps,
        duration_secs,
        has_audio: parsed
            .streams
            .iter()
            .any(|s| s.codec_type.as_deref() == Some("audio")),
    })
}

/// Probe a clip with `ffprobe`.
#[cfg(feature = "media-ffmpeg")]
pub fn probe_video(source_path: &Path) -> CaptionFxResult<VideoSourceInfo> {
    if !source_path.is_file() {
        return Err(CaptionFxError::media_load(format!(
            "source clip '{}' does not exist",
            source_path.display()
        )));
    }
    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| CaptionFxError::media_load(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(CaptionFxError::media_load(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    parse_probe_json(source_path, &out.stdout)
}

#[cfg(not(feature = "media-ffmpeg"))]
pub fn probe_video(_source_path: &Path) -> CaptionFxResult<VideoSourceInfo> {
    Err(CaptionFxError::media_load(
        "video sources require the 'media-ffmpeg' feature",
    ))
}

/// Streaming constant-frame-rate decoder over an `ffmpeg` subprocess.
///
/// Frame `i` is presented at `i / fps` seconds; ffmpeg's `fps` filter duplicates or drops source
/// frames to hit that grid, so the output never drifts from the source clock.
pub struct VideoDecoder {
    info: VideoSourceInfo,
    fps: Fps,
    #[cfg(feature = "media-ffmpeg")]
    child: Option<std::process::Child>,
    #[cfg(feature = "media-ffmpeg")]
    stdout: Option<std::process::ChildStdout>,
    #[cfg(feature = "media-ffmpeg")]
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    #[cfg(feature = "media-ffmpeg")]
    program: PathBuf,
    next_index: u64,
}

impl VideoDecoder {
    /// Decoder for `info`, resampled to `fps`. Nothing is spawned until [`Self::seek_start`].
    pub fn new(info: VideoSourceInfo, fps: Fps) -> Self {
        Self {
            info,
            fps,
            #[cfg(feature = "media-ffmpeg")]
            child: None,
            #[cfg(feature = "media-ffmpeg")]
            stdout: None,
            #[cfg(feature = "media-ffmpeg")]
            stderr_drain: None,
            #[cfg(feature = "media-ffmpeg")]
            program: PathBuf::from("ffmpeg"),
            next_index: 0,
        }
    }

    /// Use `program` instead of the `ffmpeg` found on `PATH`.
    #[cfg(feature = "media-ffmpeg")]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Probed source properties.
    pub fn info(&self) -> &VideoSourceInfo {
        &self.info
    }

    /// Output frame rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    fn frame_len(&self) -> usize {
        (self.info.width as usize) * (self.info.height as usize) * 4
    }

    /// Restart decoding at time zero.
    #[cfg(feature = "media-ffmpeg")]
    pub fn seek_start(&mut self) -> CaptionFxResult<()> {
        use std::process::{Command, Stdio};

        self.stop();
        let mut child = Command::new(&self.program)
            .args(["-v", "error", "-i"])
            .arg(&self.info.source_path)
            .args([
                "-map",
                "0:v:0",
                "-vf",
                &format!("fps={}/{}", self.fps.num, self.fps.den),
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "pipe:1",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CaptionFxError::media_load(format!("failed to spawn ffmpeg decoder: {e}")))?;
        let (Some(stdout), Some(mut stderr)) = (child.stdout.take(), child.stderr.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(CaptionFxError::media_load(
                "failed to open ffmpeg decoder pipes (unexpected)",
            ));
        };
        self.stderr_drain = Some(std::thread::spawn(move || {
            use std::io::Read as _;
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        }));
        self.stdout = Some(stdout);
        self.child = Some(child);
        self.next_index = 0;
        Ok(())
    }

    #[cfg(not(feature = "media-ffmpeg"))]
    pub fn seek_start(&mut self) -> CaptionFxResult<()> {
        Err(CaptionFxError::media_load(
            "video sources require the 'media-ffmpeg' feature",
        ))
    }

    /// Next decoded frame, or `None` once playback has ended.
    #[cfg(feature = "media-ffmpeg")]
    pub fn next_frame(&mut self) -> CaptionFxResult<Option<VideoFrame>> {
        use std::io::Read as _;

        let len = self.frame_len();
        let Some(stdout) = self.stdout.as_mut() else {
            return Err(CaptionFxError::media_load("decoder not started"));
        };
        let mut data = vec![0u8; len];
        let mut filled = 0;
        while filled < len {
            let n = stdout
                .read(&mut data[filled..])
                .map_err(|e| CaptionFxError::media_load(format!("ffmpeg decode read failed: {e}")))?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        if filled == 0 {
            self.finish()?;
            return Ok(None);
        }
        if filled < len {
            tracing::warn!(filled, expected = len, "truncated trailing frame from decoder");
            self.finish()?;
            return Ok(None);
        }

        let pts_secs = self.fps.frames_to_secs(self.next_index);
        self.next_index += 1;
        Ok(Some(VideoFrame {
            width: self.info.width,
            height: self.info.height,
            data,
            pts_secs,
        }))
    }

    #[cfg(not(feature = "media-ffmpeg"))]
    pub fn next_frame(&mut self) -> CaptionFxResult<Option<VideoFrame>> {
        let _ = self.frame_len();
        Err(CaptionFxError::media_load(
            "video sources require the 'media-ffmpeg' feature",
        ))
    }

    #[cfg(feature = "media-ffmpeg")]
    fn finish(&mut self) -> CaptionFxResult<()> {
        self.stdout = None;
        if let Some(mut child) = self.child.take() {
            let status = child
                .wait()
                .map_err(|e| CaptionFxError::media_load(format!("ffmpeg decoder wait failed: {e}")))?;
            let stderr = match self.stderr_drain.take().map(|h| h.join()) {
                Some(Ok(Ok(bytes))) => String::from_utf8_lossy(&bytes).trim().to_owned(),
                _ => String::new(),
            };
            if !status.success() {
                return Err(CaptionFxError::media_load(format!(
                    "ffmpeg failed decoding '{}' after {} frame(s) ({status}): {stderr}",
                    self.info.source_path.display(),
                    self.next_index
                )));
            }
        }
        Ok(())
    }

    /// Stop any running decode process.
    pub fn stop(&mut self) {
        #[cfg(feature = "media-ffmpeg")]
        {
            self.stdout = None;
            if let Some(mut child) = self.child.take() {
                let _ = child.kill();
                let _ = child.wait();
            }
            self.stderr_drain.take();
        }
    }
}

impl Drop for VideoDecoder {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Decode the single frame shown at `t` seconds.
#[cfg(feature = "media-ffmpeg")]
pub fn decode_frame_at(info: &VideoSourceInfo, t: f64) -> CaptionFxResult<VideoFrame> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-ss", &format!("{:.9}", t.max(0.0))])
        .arg("-i")
        .arg(&info.source_path)
        .args([
            "-frames:v",
            "1",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "pipe:1",
        ])
        .output()
        .map_err(|e| CaptionFxError::media_load(format!("failed to run ffmpeg for frame decode: {e}")))?;
    if !out.status.success() {
        return Err(CaptionFxError::media_load(format!(
            "ffmpeg frame decode failed for '{}': {}",
            info.source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    let expected = (info.width as usize) * (info.height as usize) * 4;
    if out.stdout.len() < expected {
        return Err(CaptionFxError::media_load(format!(
            "no frame at {t:.3}s in '{}'",
            info.source_path.display()
        )));
    }
    let mut data = out.stdout;
    data.truncate(expected);
    Ok(VideoFrame {
        width: info.width,
        height: info.height,
        data,
        pts_secs: t,
    })
}

#[cfg(not(feature = "media-ffmpeg"))]
pub fn decode_frame_at(_info: &VideoSourceInfo, _t: f64) -> CaptionFxResult<VideoFrame> {
    Err(CaptionFxError::media_load(
        "video sources require the 'media-ffmpeg' feature",
    ))
}

/// Decode the audio track to interleaved stereo `f32` at `sample_rate`.
///
/// A clip without audio decodes to empty PCM.
#[cfg(feature = "media-ffmpeg")]
pub fn decode_audio_f32_stereo(path: &Path, sample_rate: u32) -> CaptionFxResult<AudioPcm> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "2",
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| {
            CaptionFxError::media_load(format!("failed to run ffmpeg for audio decode: {e}"))
        })?;

    if !out.status.success() {
        let msg = String::from_utf8_lossy(&out.stderr);
        if msg.contains("Stream specifier")
            || msg.contains("matches no streams")
            || msg.contains("does not contain any stream")
        {
            return Ok(AudioPcm {
                sample_rate,
                channels: 2,
                interleaved_f32: Vec::new(),
            });
        }
        return Err(CaptionFxError::media_load(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            msg.trim()
        )));
    }

    Ok(AudioPcm {
        sample_rate,
        channels: 2,
        interleaved_f32: f32le_to_samples(&out.stdout)?,
    })
}

#[cfg(not(feature = "media-ffmpeg"))]
pub fn decode_audio_f32_stereo(_path: &Path, _sample_rate: u32) -> CaptionFxResult<AudioPcm> {
    Err(CaptionFxError::media_load(
        "audio decoding requires the 'media-ffmpeg' feature",
    ))
}

pub(crate) fn f32le_to_samples(bytes: &[u8]) -> CaptionFxResult<Vec<f32>> {
    if !bytes.len().is_multiple_of(4) {
        return Err(CaptionFxError::media_load(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/media.rs"]
mod tests;
