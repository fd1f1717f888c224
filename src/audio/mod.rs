//! Audio routed from the source clip into the encoder.

pub mod mix;
