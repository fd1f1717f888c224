//! Source media probing and decoding.

pub mod media;
