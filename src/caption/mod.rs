//! Caption layout: text, typography and animation parameters for the active segment.

pub mod layout;
