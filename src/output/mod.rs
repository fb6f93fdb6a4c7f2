//! Output encoders for render descriptions.

mod svg;

pub use svg::SvgEncoder;
