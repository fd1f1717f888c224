//! Session data model: timed segments and the fixed style/filter/font-size catalogs.

pub mod segment;
pub mod style;
