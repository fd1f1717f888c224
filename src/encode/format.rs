use crate::foundation::error::{CaptionFxError, CaptionFxResult};

/// Output container + codec pairing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// WebM with VP9 video and Opus audio.
    WebmVp9,
    /// WebM with VP8 video and Opus audio.
    WebmVp8,
    /// Fragmented MP4 with H.264 video and AAC audio.
    Mp4H264,
}

impl OutputFormat {
    /// Default preference: modern open codec, then legacy open codec, then MP4.
    pub const PREFERENCE: [OutputFormat; 3] = [
        OutputFormat::WebmVp9,
        OutputFormat::WebmVp8,
        OutputFormat::Mp4H264,
    ];

    /// MIME type with codec parameter.
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::WebmVp9 => "video/webm;codecs=vp9",
            OutputFormat::WebmVp8 => "video/webm;codecs=vp8",
            OutputFormat::Mp4H264 => "video/mp4;codecs=avc1",
        }
    }

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::WebmVp9 | OutputFormat::WebmVp8 => "webm",
            OutputFormat::Mp4H264 => "mp4",
        }
    }

    /// ffmpeg muxer name.
    pub fn muxer(self) -> &'static str {
        self.extension()
    }

    /// ffmpeg video encoder name.
    pub fn video_encoder(self) -> &'static str {
        match self {
            OutputFormat::WebmVp9 => "libvpx-vp9",
            OutputFormat::WebmVp8 => "libvpx",
            OutputFormat::Mp4H264 => "libx264",
        }
    }

    /// ffmpeg audio encoder name.
    pub fn audio_encoder(self) -> &'static str {
        match self {
            OutputFormat::WebmVp9 | OutputFormat::WebmVp8 => "libopus",
            OutputFormat::Mp4H264 => "aac",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Pick the first entry of `preference` that the runtime reports as supported.
pub fn select_format(
    preference: &[OutputFormat],
    supported: &[OutputFormat],
) -> CaptionFxResult<OutputFormat> {
    preference
        .iter()
        .copied()
        .find(|f| supported.contains(f))
        .ok_or_else(|| {
            CaptionFxError::unsupported_format(format!(
                "none of [{}] is supported by this runtime",
                preference
                    .iter()
                    .map(|f| f.mime_type())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })
}

/// Formats whose video and audio encoders both appear in `ffmpeg -encoders` output.
pub fn parse_ffmpeg_encoders(listing: &str) -> Vec<OutputFormat> {
    let mut names = Vec::<&str>::new();
    let mut in_table = false;
    for line in listing.lines() {
        let trimmed = line.trim();
        // The table starts after the " ------" separator line.
        if trimmed.starts_with("---") {
            in_table = true;
            continue;
        }
        if !in_table {
            continue;
        }
        let mut cols = trimmed.split_whitespace();
        let (Some(_flags), Some(name)) = (cols.next(), cols.next()) else {
            continue;
        };
        names.push(name);
    }

    OutputFormat::PREFERENCE
        .into_iter()
        .filter(|f| names.contains(&f.video_encoder()) && names.contains(&f.audio_encoder()))
        .collect()
}

/// Probe the local `ffmpeg` for supported output formats.
#[cfg(feature = "media-ffmpeg")]
pub fn probe_ffmpeg_formats() -> CaptionFxResult<Vec<OutputFormat>> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .output()
        .map_err(|e| {
            CaptionFxError::unsupported_format(format!(
                "failed to run ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
    if !out.status.success() {
        return Err(CaptionFxError::unsupported_format(format!(
            "ffmpeg -encoders failed: {}",
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    Ok(parse_ffmpeg_encoders(&String::from_utf8_lossy(&out.stdout)))
}

#[cfg(not(feature = "media-ffmpeg"))]
/// Probe the local `ffmpeg` for supported output formats.
///
/// Always empty when the `media-ffmpeg` feature is disabled.
pub fn probe_ffmpeg_formats() -> CaptionFxResult<Vec<OutputFormat>> {
    Ok(Vec::new())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/format.rs"]
mod tests;
