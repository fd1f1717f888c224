use crate::encode::format::OutputFormat;
use crate::encode::sink::{EncodedChunks, FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{CaptionFxError, CaptionFxResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::backend::FrameRGBA;
use std::io::Read;
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

const STDOUT_CHUNK_BYTES: usize = 64 * 1024;

type Drain<T> = Option<JoinHandle<std::io::Result<T>>>;

/// Streaming encoder backed by the system `ffmpeg`.
///
/// Raw frames go in on stdin; the muxed container comes back on stdout and is buffered as
/// chunks until [`FrameSink::end`]. Nothing is written to disk by the sink itself.
pub struct FfmpegSink {
    format: OutputFormat,
    bg_rgba: [u8; 4],

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout_drain: Drain<Vec<Vec<u8>>>,
    stderr_drain: Drain<Vec<u8>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a sink that encodes to `format`.
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            bg_rgba: [0, 0, 0, 255],
            child: None,
            stdin: None,
            stdout_drain: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }

    /// Container this sink produces.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    fn build_command(&self, cfg: &SinkConfig) -> CaptionFxResult<Command> {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        cmd.args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0"]);

        if let Some(audio) = cfg.audio.as_ref() {
            if audio.sample_rate == 0 || audio.channels == 0 {
                return Err(CaptionFxError::validation(
                    "audio sample_rate and channels must be non-zero when audio is routed",
                ));
            }
            cmd.args([
                "-f",
                "f32le",
                "-ar",
                &audio.sample_rate.to_string(),
                "-ac",
                &audio.channels.to_string(),
                "-i",
            ])
            .arg(&audio.path)
            .args(["-map", "0:v:0", "-map", "1:a:0"])
            .args(["-c:a", self.format.audio_encoder(), "-shortest"]);
        } else {
            cmd.arg("-an");
        }

        cmd.args([
            "-c:v",
            self.format.video_encoder(),
            "-pix_fmt",
            "yuv420p",
            "-b:v",
            &cfg.video_bitrate_bps.to_string(),
        ]);
        match self.format {
            OutputFormat::WebmVp9 | OutputFormat::WebmVp8 => {
                cmd.args(["-deadline", "realtime", "-cpu-used", "8"]);
            }
            OutputFormat::Mp4H264 => {
                // A seekable moov atom is impossible on a pipe.
                cmd.args(["-movflags", "frag_keyframe+empty_moov+default_base_moof"]);
            }
        }
        cmd.args(["-f", self.format.muxer(), "pipe:1"]);
        Ok(cmd)
    }

    fn kill_child(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        self.stdout_drain.take();
        self.stderr_drain.take();
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> CaptionFxResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(CaptionFxError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(CaptionFxError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(CaptionFxError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p output)",
            ));
        }
        if cfg.video_bitrate_bps == 0 {
            return Err(CaptionFxError::validation("video bitrate must be non-zero"));
        }
        if !is_ffmpeg_on_path() {
            return Err(CaptionFxError::encoder(
                "ffmpeg is required for encoding, but was not found on PATH",
            ));
        }

        let mut cmd = self.build_command(&cfg)?;
        tracing::debug!(format = %self.format, width = cfg.width, height = cfg.height, "spawning ffmpeg encoder");
        let mut child = cmd.spawn().map_err(|e| {
            CaptionFxError::encoder(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| CaptionFxError::encoder("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| CaptionFxError::encoder("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| CaptionFxError::encoder("failed to open ffmpeg stderr (unexpected)"))?;

        let stdout_drain = std::thread::spawn(move || {
            let mut chunks = Vec::new();
            let mut buf = vec![0u8; STDOUT_CHUNK_BYTES];
            loop {
                let n = stdout.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                chunks.push(buf[..n].to_vec());
            }
            Ok(chunks)
        });
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stdout_drain = Some(stdout_drain);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> CaptionFxResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| CaptionFxError::encoder("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(CaptionFxError::encoder(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(CaptionFxError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(CaptionFxError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        if frame.premultiplied {
            flatten_premul_over_bg_to_opaque_rgba8(&mut self.scratch, &frame.data, self.bg_rgba)?;
        } else {
            self.scratch.copy_from_slice(&frame.data);
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(CaptionFxError::encoder("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            CaptionFxError::encoder(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> CaptionFxResult<EncodedChunks> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| CaptionFxError::encoder("ffmpeg sink not started"))?;

        let status = child.wait().map_err(|e| {
            CaptionFxError::encoder(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let chunks = join_drain(self.stdout_drain.take(), "stdout")?;
        let stderr_bytes = join_drain(self.stderr_drain.take(), "stderr")?;
        self.cfg = None;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(CaptionFxError::encoder(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        let out = EncodedChunks {
            format: Some(self.format),
            chunks,
        };
        tracing::debug!(bytes = out.total_len(), chunks = out.chunks.len(), "ffmpeg encoder finished");
        Ok(out)
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_some() {
            tracing::debug!("killing unfinished ffmpeg encoder");
            self.kill_child();
        }
    }
}

fn join_drain<T: Default>(handle: Drain<T>, what: &str) -> CaptionFxResult<T> {
    match handle {
        Some(h) => h
            .join()
            .map_err(|_| CaptionFxError::encoder(format!("ffmpeg {what} drain thread panicked")))?
            .map_err(|e| CaptionFxError::encoder(format!("ffmpeg {what} read failed: {e}"))),
        None => Ok(T::default()),
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // rawvideo input takes its rate from `-r` placed before `-i`.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

pub(crate) fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> CaptionFxResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(CaptionFxError::validation(
            "flatten_premul_over_bg_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];

    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            d[c] = (u16::from(s[c]) + mul_div255_u16(bg[c], inv)).min(255) as u8;
        }
        d[3] = 255;
    }

    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> CaptionFxResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    tool_on_path("ffmpeg")
}

/// Return `true` when `ffprobe` can be invoked from `PATH`.
pub fn is_ffprobe_on_path() -> bool {
    tool_on_path("ffprobe")
}

fn tool_on_path(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
