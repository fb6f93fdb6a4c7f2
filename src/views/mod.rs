//! Chart views and their shared plumbing.
//!
//! Each view compiles `(dataset, selection, active flags, dimensions)` into a
//! [`RenderDescription`](crate::render::RenderDescription) — a pure function
//! of its declared inputs, re-invoked whenever any of them change.

mod boxplot;
mod line;
mod radar;

pub use boxplot::BoxPlotView;
pub use line::{Crosshair, CrosshairReadout, DisplayMode, LineChartView};
pub use radar::RadarView;

use batuta_common::display::WithDimensions;

use crate::color::Rgba;
use crate::data::Group;

/// Containers smaller than this on either side are ignored by resize
/// observation (transient layout states during grid reflow).
pub const MIN_DIMENSION: f32 = 10.0;

/// Per-family active-group flags: whether group 1 / group 2 geometry is drawn.
///
/// Independent of selection state; toggled by legend interaction.
pub type ActiveGroups = [bool; 2];

/// A view's container size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    /// Container width.
    pub width: f32,
    /// Container height.
    pub height: f32,
}

impl Dimensions {
    /// Create a dimension pair.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Margins around a view's plot area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    /// Top margin.
    pub top: f32,
    /// Right margin.
    pub right: f32,
    /// Bottom margin.
    pub bottom: f32,
    /// Left margin.
    pub left: f32,
}

impl Margins {
    /// Create a margin set.
    #[must_use]
    pub const fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self { top, right, bottom, left }
    }

    /// Plot-area width inside the margins.
    #[must_use]
    pub fn inner_width(&self, dims: Dimensions) -> f32 {
        dims.width - self.left - self.right
    }

    /// Plot-area height inside the margins.
    #[must_use]
    pub fn inner_height(&self, dims: Dimensions) -> f32 {
        dims.height - self.top - self.bottom
    }
}

/// Republishes a view's container box as part of its render inputs.
///
/// Wraps whatever container-measurement contract the host provides: the host
/// reports every observed box, the adapter filters out sub-minimum and
/// unchanged boxes so each accepted observation triggers exactly one
/// re-render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeAdapter {
    current: Dimensions,
}

impl ResizeAdapter {
    /// Create an adapter with the view's initial dimensions.
    #[must_use]
    pub fn new(initial: Dimensions) -> Self {
        Self { current: initial }
    }

    /// Currently accepted dimensions.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        self.current
    }

    /// Observe a container box; returns the new dimensions when accepted.
    pub fn observe(&mut self, width: f32, height: f32) -> Option<Dimensions> {
        if width <= MIN_DIMENSION || height <= MIN_DIMENSION {
            return None;
        }
        let next = Dimensions::new(width, height);
        if next == self.current {
            return None;
        }
        self.current = next;
        Some(next)
    }
}

impl WithDimensions for ResizeAdapter {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.current = Dimensions::new(width as f32, height as f32);
    }
}

/// Radar axes and box-plot attributes of the spatiotemporal parameter family.
pub const SPATIOTEMPORAL_ATTRIBUTES: [&str; 7] = [
    "timeLswing",
    "timeRswing",
    "LstepLength",
    "RstepLength",
    "GaitSpeed",
    "timeLgait",
    "timeRgait",
];

/// Human-readable name of a spatiotemporal attribute.
///
/// Unknown attributes fall back to their raw field name.
#[must_use]
pub fn display_name(attribute: &str) -> &str {
    match attribute {
        "RstepLength" => "Step Length (R)",
        "LstepLength" => "Step Length (L)",
        "timeRswing" => "Swing Time (R)",
        "timeLswing" => "Swing Time (L)",
        "timeRgait" => "Gait Time (R)",
        "timeLgait" => "Gait Time (L)",
        "GaitSpeed" => "Gait Speed",
        other => other,
    }
}

/// Format an axis tick value: two decimals, trailing zeros trimmed.
pub(crate) fn format_tick(value: f32) -> String {
    let mut s = format!("{value:.2}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    s
}

/// Fill color for a group's primary geometry.
#[must_use]
pub fn group_fill(group: Group) -> Rgba {
    match group {
        Group::One => Rgba::GROUP1_FILL,
        Group::Two => Rgba::GROUP2_FILL,
    }
}

/// Accent color for a group's text and radar strokes.
#[must_use]
pub fn group_accent(group: Group) -> Rgba {
    match group {
        Group::One => Rgba::GROUP1_ACCENT,
        Group::Two => Rgba::GROUP2_ACCENT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_adapter_accepts_change() {
        let mut adapter = ResizeAdapter::new(Dimensions::new(450.0, 400.0));
        let next = adapter.observe(900.0, 800.0);
        assert_eq!(next, Some(Dimensions::new(900.0, 800.0)));
        assert_eq!(ResizeAdapter::dimensions(&adapter), Dimensions::new(900.0, 800.0));
    }

    #[test]
    fn test_resize_adapter_ignores_unchanged() {
        let mut adapter = ResizeAdapter::new(Dimensions::new(450.0, 400.0));
        assert!(adapter.observe(450.0, 400.0).is_none());
    }

    #[test]
    fn test_resize_adapter_ignores_tiny_boxes() {
        let mut adapter = ResizeAdapter::new(Dimensions::new(450.0, 400.0));
        assert!(adapter.observe(5.0, 400.0).is_none());
        assert!(adapter.observe(450.0, 5.0).is_none());
        assert_eq!(ResizeAdapter::dimensions(&adapter), Dimensions::new(450.0, 400.0));
    }

    #[test]
    fn test_set_dimensions_forces_box() {
        let mut adapter = ResizeAdapter::new(Dimensions::new(450.0, 400.0));
        adapter.set_dimensions(200, 100);
        assert_eq!(ResizeAdapter::dimensions(&adapter), Dimensions::new(200.0, 100.0));
    }

    #[test]
    fn test_margins_inner_box() {
        let margins = Margins::new(20.0, 20.0, 60.0, 40.0);
        let dims = Dimensions::new(450.0, 400.0);
        assert!((margins.inner_width(dims) - 390.0).abs() < f32::EPSILON);
        assert!((margins.inner_height(dims) - 320.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_display_name_fallback() {
        assert_eq!(display_name("GaitSpeed"), "Gait Speed");
        assert_eq!(display_name("Cadence"), "Cadence");
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(10.0), "10");
        assert_eq!(format_tick(0.5), "0.5");
        assert_eq!(format_tick(1.25), "1.25");
    }
}
