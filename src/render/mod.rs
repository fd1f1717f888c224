//! Frame composition and rasterization.

pub mod backend;
pub(crate) mod blend;
pub(crate) mod blur;
pub mod compositor;
pub mod cpu;
pub(crate) mod text;
