//! SVG output encoder.
//!
//! Serializes a [`RenderDescription`] to vector SVG for headless consumers
//! (reports, snapshot tests). Hit regions are interaction-only and are not
//! serialized.

use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::color::Rgba;
use crate::data::Group;
use crate::error::Result;
use crate::render::{Mark, RenderDescription, Shape, TextAnchor};

/// SVG encoder for render descriptions.
#[derive(Debug, Clone)]
pub struct SvgEncoder {
    /// Background color (None for transparent)
    background: Option<Rgba>,
}

impl Default for SvgEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SvgEncoder {
    /// Create an encoder with a white background.
    #[must_use]
    pub fn new() -> Self {
        Self { background: Some(Rgba::WHITE) }
    }

    /// Set the background color (None for transparent).
    #[must_use]
    pub fn background(mut self, color: Option<Rgba>) -> Self {
        self.background = color;
        self
    }

    /// Render a description to an SVG string.
    #[must_use]
    pub fn encode(&self, desc: &RenderDescription) -> String {
        let mut svg = String::with_capacity(4096);

        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            desc.width, desc.height, desc.width, desc.height
        );

        if let Some(bg) = self.background {
            let _ = writeln!(
                svg,
                r#"  <rect width="100%" height="100%" fill="{}"/>"#,
                rgba_to_css(&bg)
            );
        }

        for mark in &desc.marks {
            let _ = writeln!(svg, "  {}", mark_to_svg(mark));
        }

        svg.push_str("</svg>\n");
        svg
    }

    /// Write a description to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if file writing fails.
    pub fn write_to_file<P: AsRef<Path>>(&self, desc: &RenderDescription, path: P) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(self.encode(desc).as_bytes())?;
        Ok(())
    }
}

/// Convert RGBA to CSS color string.
fn rgba_to_css(color: &Rgba) -> String {
    if color.a == 255 {
        format!("rgb({},{},{})", color.r, color.g, color.b)
    } else {
        format!("rgba({},{},{},{:.3})", color.r, color.g, color.b, f32::from(color.a) / 255.0)
    }
}

/// CSS classes mirroring the mark's group and highlight state.
fn class_attr(mark: &Mark) -> String {
    let mut classes = Vec::new();
    match mark.group {
        Some(Group::One) => classes.push("group1"),
        Some(Group::Two) => classes.push("group2"),
        None => {}
    }
    if mark.highlighted {
        classes.push("highlight");
    }
    if classes.is_empty() {
        String::new()
    } else {
        format!(r#" class="{}""#, classes.join(" "))
    }
}

fn dash_attr(mark: &Mark) -> String {
    mark.dash.map(|d| format!(r#" stroke-dasharray="{d}""#)).unwrap_or_default()
}

fn fill_attr(fill: Option<Rgba>) -> String {
    fill.map_or_else(|| "none".to_string(), |f| rgba_to_css(&f))
}

fn stroke_attr(stroke: Option<Rgba>, stroke_width: f32) -> String {
    stroke
        .map(|s| format!(r#" stroke="{}" stroke-width="{stroke_width}""#, rgba_to_css(&s)))
        .unwrap_or_default()
}

fn points_attr(points: &[crate::geometry::Point]) -> String {
    points.iter().map(|p| format!("{},{}", p.x, p.y)).collect::<Vec<_>>().join(" ")
}

/// Convert one mark to its SVG element.
fn mark_to_svg(mark: &Mark) -> String {
    let class = class_attr(mark);
    let dash = dash_attr(mark);

    match &mark.shape {
        Shape::Rect { x, y, width, height, fill, stroke, stroke_width, corner_radius } => {
            let stroke = stroke_attr(*stroke, *stroke_width);
            format!(
                r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" rx="{corner_radius}" fill="{}"{stroke}{dash}{class}/>"#,
                fill_attr(*fill)
            )
        }
        Shape::Line { x1, y1, x2, y2, stroke, stroke_width } => {
            format!(
                r#"<line x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}" stroke="{}" stroke-width="{stroke_width}"{dash}{class}/>"#,
                rgba_to_css(stroke)
            )
        }
        Shape::Polyline { points, stroke, stroke_width } => {
            format!(
                r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{stroke_width}"{dash}{class}/>"#,
                points_attr(points),
                rgba_to_css(stroke)
            )
        }
        Shape::Polygon { points, fill, stroke, stroke_width } => {
            let stroke = stroke_attr(*stroke, *stroke_width);
            format!(
                r#"<polygon points="{}" fill="{}"{stroke}{dash}{class}/>"#,
                points_attr(points),
                fill_attr(*fill)
            )
        }
        Shape::Area { upper, lower, fill } => {
            let mut d = String::new();
            for (i, p) in upper.iter().enumerate() {
                let cmd = if i == 0 { 'M' } else { 'L' };
                let _ = write!(d, "{cmd}{},{} ", p.x, p.y);
            }
            for p in lower.iter().rev() {
                let _ = write!(d, "L{},{} ", p.x, p.y);
            }
            d.push('Z');
            format!(r#"<path d="{d}" fill="{}" stroke="none"{class}/>"#, rgba_to_css(fill))
        }
        Shape::Circle { cx, cy, r, fill, stroke, stroke_width } => {
            let stroke = stroke_attr(*stroke, *stroke_width);
            format!(
                r#"<circle cx="{cx}" cy="{cy}" r="{r}" fill="{}"{stroke}{dash}{class}/>"#,
                fill_attr(*fill)
            )
        }
        Shape::Text { x, y, text, font_size, fill, anchor } => {
            let anchor_str = match anchor {
                TextAnchor::Start => "start",
                TextAnchor::Middle => "middle",
                TextAnchor::End => "end",
            };
            // Escape XML special characters
            let escaped_text = text
                .replace('&', "&amp;")
                .replace('<', "&lt;")
                .replace('>', "&gt;")
                .replace('"', "&quot;");
            format!(
                r#"<text x="{x}" y="{y}" font-size="{font_size}" fill="{}" text-anchor="{anchor_str}" font-family="Roboto, sans-serif"{class}>{escaped_text}</text>"#,
                rgba_to_css(fill)
            )
        }
    }
}
