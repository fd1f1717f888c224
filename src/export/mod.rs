//! Export orchestration: decode, composite, encode, save.

pub mod job;
pub mod pipeline;
pub mod platform;
pub mod progress;
