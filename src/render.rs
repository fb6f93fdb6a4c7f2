//! Deterministic render descriptions.
//!
//! Every view compiles its current inputs into a [`RenderDescription`]: a
//! flat list of drawable marks plus the invisible hit regions that carry
//! hover tooltips and click targets. The description is rebuilt from scratch
//! on every input change — there is no incremental patching and therefore no
//! stale geometry from a previous render.

use std::collections::BTreeSet;

use crate::color::Rgba;
use crate::data::Group;
use crate::geometry::{Point, Rect};

/// Text anchor for text marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    /// Align text start at position.
    #[default]
    Start,
    /// Center text at position.
    Middle,
    /// Align text end at position.
    End,
}

/// A drawable shape in view-local pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Axis-aligned rectangle.
    Rect {
        /// Top-left x.
        x: f32,
        /// Top-left y.
        y: f32,
        /// Width in pixels.
        width: f32,
        /// Height in pixels.
        height: f32,
        /// Fill color, `None` for unfilled.
        fill: Option<Rgba>,
        /// Stroke color, `None` for no outline.
        stroke: Option<Rgba>,
        /// Stroke width.
        stroke_width: f32,
        /// Corner radius.
        corner_radius: f32,
    },
    /// Straight line segment.
    Line {
        /// Start x.
        x1: f32,
        /// Start y.
        y1: f32,
        /// End x.
        x2: f32,
        /// End y.
        y2: f32,
        /// Stroke color.
        stroke: Rgba,
        /// Stroke width.
        stroke_width: f32,
    },
    /// Open polyline (traces, mean curves).
    Polyline {
        /// Vertices in drawing order.
        points: Vec<Point>,
        /// Stroke color.
        stroke: Rgba,
        /// Stroke width.
        stroke_width: f32,
    },
    /// Closed polygon (radar series).
    Polygon {
        /// Vertices in drawing order; the closing edge is implicit.
        points: Vec<Point>,
        /// Fill color, `None` for outline-only.
        fill: Option<Rgba>,
        /// Stroke color, `None` for fill-only.
        stroke: Option<Rgba>,
        /// Stroke width.
        stroke_width: f32,
    },
    /// Filled band between two curves (spread display).
    Area {
        /// Upper boundary, left to right.
        upper: Vec<Point>,
        /// Lower boundary, left to right.
        lower: Vec<Point>,
        /// Fill color.
        fill: Rgba,
    },
    /// Circle (filled disc or outlined ring).
    Circle {
        /// Center x.
        cx: f32,
        /// Center y.
        cy: f32,
        /// Radius.
        r: f32,
        /// Fill color, `None` for a ring.
        fill: Option<Rgba>,
        /// Stroke color, `None` for fill-only.
        stroke: Option<Rgba>,
        /// Stroke width.
        stroke_width: f32,
    },
    /// Text label.
    Text {
        /// Anchor x.
        x: f32,
        /// Baseline y.
        y: f32,
        /// Content.
        text: String,
        /// Font size in pixels.
        font_size: f32,
        /// Fill color.
        fill: Rgba,
        /// Horizontal anchor.
        anchor: TextAnchor,
    },
}

/// A shape plus the identity metadata linked views key off.
#[derive(Debug, Clone, PartialEq)]
pub struct Mark {
    /// The geometry.
    pub shape: Shape,
    /// Owning group, when the mark belongs to one cohort.
    pub group: Option<Group>,
    /// Composite key, when the mark represents one trial.
    pub key: Option<String>,
    /// Whether the mark is drawn in its highlighted style.
    pub highlighted: bool,
    /// Uniform dash length (on == off), `None` for solid.
    pub dash: Option<f32>,
}

impl Mark {
    /// Wrap a shape with no metadata.
    #[must_use]
    pub fn new(shape: Shape) -> Self {
        Self { shape, group: None, key: None, highlighted: false, dash: None }
    }

    /// Tag the mark with its owning group.
    #[must_use]
    pub fn for_group(mut self, group: Group) -> Self {
        self.group = Some(group);
        self
    }

    /// Tag the mark with the trial it represents.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Mark as highlighted (selected or hovered).
    #[must_use]
    pub fn highlighted(mut self) -> Self {
        self.highlighted = true;
        self
    }

    /// Draw dashed with the given on/off length.
    #[must_use]
    pub fn dashed(mut self, length: f32) -> Self {
        self.dash = Some(length);
        self
    }
}

/// Invisible interaction target geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum HitGeometry {
    /// Rectangular target (box bodies, legend swatches).
    Rect(Rect),
    /// Widened strip along a polyline (trace hover/click targets).
    Strip {
        /// The backbone polyline.
        points: Vec<Point>,
        /// Total strip width in pixels.
        width: f32,
    },
    /// Pie-slice arc from the center outward (radar axis tooltips).
    Arc {
        /// Center x.
        cx: f32,
        /// Center y.
        cy: f32,
        /// Outer radius.
        radius: f32,
        /// Start angle in radians.
        start_angle: f32,
        /// End angle in radians.
        end_angle: f32,
    },
}

impl HitGeometry {
    /// Whether a point lands inside this target.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        match self {
            Self::Rect(rect) => rect.contains(point),
            Self::Strip { points, width } => points
                .windows(2)
                .any(|w| point.distance_to_segment(w[0], w[1]) <= width / 2.0),
            Self::Arc { cx, cy, radius, start_angle, end_angle } => {
                let center = Point::new(*cx, *cy);
                if center.distance(point) > *radius {
                    return false;
                }
                let angle = (point.y - cy).atan2(point.x - cx);
                let span = end_angle - start_angle;
                let offset = (angle - start_angle).rem_euclid(std::f32::consts::TAU);
                offset <= span
            }
        }
    }
}

/// One interaction target with its tooltip content.
#[derive(Debug, Clone, PartialEq)]
pub struct HitRegion {
    /// Target geometry.
    pub geometry: HitGeometry,
    /// Tooltip text shown on hover.
    pub tooltip: String,
    /// Owning group, if any.
    pub group: Option<Group>,
    /// Composite key of the trial this region toggles, if any.
    pub key: Option<String>,
}

/// The full output of one view render pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderDescription {
    /// Container width the layout was computed for.
    pub width: f32,
    /// Container height the layout was computed for.
    pub height: f32,
    /// Drawable marks, in painting order.
    pub marks: Vec<Mark>,
    /// Interaction targets, in hit-test priority order (last on top).
    pub hits: Vec<HitRegion>,
}

impl RenderDescription {
    /// An empty description for the given container size.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height, marks: Vec::new(), hits: Vec::new() }
    }

    /// Append a mark.
    pub fn push(&mut self, mark: Mark) {
        self.marks.push(mark);
    }

    /// Append a hit region.
    pub fn push_hit(&mut self, hit: HitRegion) {
        self.hits.push(hit);
    }

    /// Whether nothing would be drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Marks belonging to one group.
    pub fn marks_for_group(&self, group: Group) -> impl Iterator<Item = &Mark> {
        self.marks.iter().filter(move |m| m.group == Some(group))
    }

    /// Composite keys drawn highlighted for one group.
    #[must_use]
    pub fn highlighted_keys(&self, group: Group) -> BTreeSet<&str> {
        self.marks
            .iter()
            .filter(|m| m.group == Some(group) && m.highlighted)
            .filter_map(|m| m.key.as_deref())
            .collect()
    }

    /// Topmost hit region under a point, if any.
    #[must_use]
    pub fn hit_at(&self, point: Point) -> Option<&HitRegion> {
        self.hits.iter().rev().find(|h| h.geometry.contains(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_mark() -> Mark {
        Mark::new(Shape::Rect {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            fill: Some(Rgba::GROUP1_FILL),
            stroke: None,
            stroke_width: 1.0,
            corner_radius: 0.0,
        })
    }

    #[test]
    fn test_mark_builders() {
        let mark = rect_mark().for_group(Group::One).with_key("A_1").highlighted().dashed(10.0);
        assert_eq!(mark.group, Some(Group::One));
        assert_eq!(mark.key.as_deref(), Some("A_1"));
        assert!(mark.highlighted);
        assert_eq!(mark.dash, Some(10.0));
    }

    #[test]
    fn test_marks_for_group() {
        let mut desc = RenderDescription::new(100.0, 100.0);
        desc.push(rect_mark().for_group(Group::One));
        desc.push(rect_mark().for_group(Group::Two));
        desc.push(rect_mark());

        assert_eq!(desc.marks_for_group(Group::One).count(), 1);
        assert_eq!(desc.marks_for_group(Group::Two).count(), 1);
    }

    #[test]
    fn test_highlighted_keys() {
        let mut desc = RenderDescription::new(100.0, 100.0);
        desc.push(rect_mark().for_group(Group::One).with_key("A_1").highlighted());
        desc.push(rect_mark().for_group(Group::One).with_key("A_2"));

        let keys = desc.highlighted_keys(Group::One);
        assert!(keys.contains("A_1"));
        assert!(!keys.contains("A_2"));
    }

    #[test]
    fn test_hit_rect_contains() {
        let hit = HitGeometry::Rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(hit.contains(Point::new(5.0, 5.0)));
        assert!(!hit.contains(Point::new(15.0, 5.0)));
    }

    #[test]
    fn test_hit_strip_contains() {
        let hit = HitGeometry::Strip {
            points: vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
            width: 5.0,
        };
        assert!(hit.contains(Point::new(5.0, 2.0)));
        assert!(!hit.contains(Point::new(5.0, 4.0)));
    }

    #[test]
    fn test_hit_arc_contains() {
        let hit = HitGeometry::Arc {
            cx: 0.0,
            cy: 0.0,
            radius: 10.0,
            start_angle: -0.5,
            end_angle: 0.5,
        };
        // On the +x axis, inside the radius
        assert!(hit.contains(Point::new(5.0, 0.0)));
        // Outside the radius
        assert!(!hit.contains(Point::new(15.0, 0.0)));
        // Wrong direction
        assert!(!hit.contains(Point::new(-5.0, 0.0)));
    }

    #[test]
    fn test_hit_at_prefers_topmost() {
        let mut desc = RenderDescription::new(100.0, 100.0);
        desc.push_hit(HitRegion {
            geometry: HitGeometry::Rect(Rect::new(0.0, 0.0, 10.0, 10.0)),
            tooltip: "below".to_string(),
            group: None,
            key: None,
        });
        desc.push_hit(HitRegion {
            geometry: HitGeometry::Rect(Rect::new(0.0, 0.0, 10.0, 10.0)),
            tooltip: "above".to_string(),
            group: None,
            key: None,
        });

        assert_eq!(desc.hit_at(Point::new(5.0, 5.0)).map(|h| h.tooltip.as_str()), Some("above"));
        assert!(desc.hit_at(Point::new(50.0, 50.0)).is_none());
    }

    #[test]
    fn test_empty_description() {
        let desc = RenderDescription::new(450.0, 400.0);
        assert!(desc.is_empty());
        assert!((desc.width - 450.0).abs() < f32::EPSILON);
    }
}
