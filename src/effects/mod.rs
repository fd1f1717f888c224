//! Pixel filters for the source footage and procedural overlay effects.

pub mod filter;
pub mod vfx;
