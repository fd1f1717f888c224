//! Output formats and streaming encoders.

pub mod ffmpeg;
pub mod format;
pub mod sink;
