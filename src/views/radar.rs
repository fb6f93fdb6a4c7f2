//! Radar view: per-attribute mean polygons for the full population and the
//! currently selected subset of each group, on one shared radial scale.

use std::collections::BTreeMap;
use std::f32::consts::TAU;

use crate::color::Rgba;
use crate::data::{Dataset, Group, TrialRecord};
use crate::geometry::Point;
use crate::render::{HitGeometry, HitRegion, Mark, RenderDescription, Shape, TextAnchor};
use crate::scale::{LinearScale, Scale};
use crate::selection::SelectionStore;
use crate::stats;
use crate::views::{
    display_name, group_accent, ActiveGroups, Dimensions, SPATIOTEMPORAL_ATTRIBUTES,
};

/// Number of concentric guide rings.
const LEVELS: usize = 5;
/// Dash length of the selected-subset polygons.
const SUBSET_DASH: f32 = 10.0;
/// Radius of the selected-subset vertex dots.
const VERTEX_RADIUS: f32 = 5.0;

/// Radar chart over an ordered list of attribute axes.
#[derive(Debug, Clone)]
pub struct RadarView {
    axes: Vec<String>,
}

impl Default for RadarView {
    fn default() -> Self {
        Self::new()
    }
}

impl RadarView {
    /// Create a view over the spatiotemporal attribute set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            axes: SPATIOTEMPORAL_ATTRIBUTES.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Replace the axis list.
    #[must_use]
    pub fn with_axes(mut self, axes: Vec<String>) -> Self {
        self.axes = axes;
        self
    }

    /// The ordered axis list.
    #[must_use]
    pub fn axes(&self) -> &[String] {
        &self.axes
    }

    /// Compile the current inputs into a render description.
    pub fn render(
        &self,
        dataset: Option<&Dataset>,
        store: &SelectionStore,
        active: ActiveGroups,
        dims: Dimensions,
    ) -> RenderDescription {
        let mut desc = RenderDescription::new(dims.width, dims.height);
        let Some(ds) = dataset else {
            return desc;
        };
        let n = self.axes.len();
        if n == 0 {
            return desc;
        }

        let slots: Vec<Group> = if ds.group_exploration() {
            vec![Group::One, Group::Two]
        } else {
            vec![Group::One]
        };

        let mut full_means = Vec::new();
        let mut subset_means = Vec::new();
        for &group in &slots {
            let records = ds.records(group).unwrap_or(&[]);
            let selected: Vec<TrialRecord> = records
                .iter()
                .filter(|r| store.selection(group).contains(&r.key()))
                .cloned()
                .collect();
            full_means.push(stats::attribute_means(records));
            subset_means.push(stats::attribute_means(&selected));
        }

        // One radial scale for all four series keeps proportions comparable
        let max_value = full_means
            .iter()
            .chain(&subset_means)
            .flat_map(|means| self.series(means))
            .fold(0.0f64, f64::max) as f32;
        if max_value <= 0.0 || !max_value.is_finite() {
            return desc;
        }

        let radius = (dims.width / 2.0).min(dims.height / 2.0);
        let center = Point::new(dims.width / 2.0, dims.height / 2.0);
        let Ok(r_scale) = LinearScale::new((0.0, max_value), (0.0, radius)) else {
            return desc;
        };
        let slice = TAU / n as f32;

        self.push_frame(&mut desc, center, radius, &r_scale, max_value, slice);

        for (slot, &group) in slots.iter().enumerate() {
            if !active[group.index()] {
                continue;
            }
            let accent = group_accent(group);

            // Full-population polygon
            desc.push(
                Mark::new(Shape::Polygon {
                    points: self.polygon_points(&full_means[slot], center, &r_scale, slice),
                    fill: Some(accent.with_opacity(0.1)),
                    stroke: Some(accent.with_opacity(0.9)),
                    stroke_width: 1.0,
                })
                .for_group(group),
            );

            // Selected-subset polygon: an empty subset collapses to a flat
            // zero polygon at the center rather than disappearing
            let subset_points = self.polygon_points(&subset_means[slot], center, &r_scale, slice);
            desc.push(
                Mark::new(Shape::Polygon {
                    points: subset_points.clone(),
                    fill: None,
                    stroke: Some(accent),
                    stroke_width: 2.0,
                })
                .for_group(group)
                .highlighted()
                .dashed(SUBSET_DASH),
            );
            for point in subset_points {
                desc.push(
                    Mark::new(Shape::Circle {
                        cx: point.x,
                        cy: point.y,
                        r: VERTEX_RADIUS,
                        fill: Some(accent.with_opacity(0.7)),
                        stroke: None,
                        stroke_width: 1.0,
                    })
                    .for_group(group)
                    .highlighted(),
                );
            }
        }

        self.push_hit_arcs(&mut desc, ds, &slots, active, &full_means, &subset_means, center, radius, slice);
        desc
    }

    /// Series values along the axes; absent or non-finite means draw as zero.
    fn series(&self, means: &BTreeMap<String, f64>) -> Vec<f64> {
        self.axes
            .iter()
            .map(|axis| means.get(axis).copied().filter(|v| v.is_finite()).unwrap_or(0.0))
            .collect()
    }

    fn polygon_points(
        &self,
        means: &BTreeMap<String, f64>,
        center: Point,
        r_scale: &LinearScale,
        slice: f32,
    ) -> Vec<Point> {
        self.series(means)
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                let angle = slice * i as f32;
                let r = r_scale.scale(value as f32);
                Point::new(center.x + r * angle.cos(), center.y + r * angle.sin())
            })
            .collect()
    }

    fn push_frame(
        &self,
        desc: &mut RenderDescription,
        center: Point,
        radius: f32,
        r_scale: &LinearScale,
        max_value: f32,
        slice: f32,
    ) {
        // Spoke per axis
        for i in 0..self.axes.len() {
            let angle = slice * i as f32;
            desc.push(Mark::new(Shape::Line {
                x1: center.x,
                y1: center.y,
                x2: center.x + radius * angle.cos(),
                y2: center.y + radius * angle.sin(),
                stroke: Rgba::GREY,
                stroke_width: 1.0,
            }));
        }

        // Concentric level rings with their scale values
        for level in 0..=LEVELS {
            let value = max_value * level as f32 / LEVELS as f32;
            desc.push(Mark::new(Shape::Circle {
                cx: center.x,
                cy: center.y,
                r: r_scale.scale(value),
                fill: None,
                stroke: Some(Rgba::GREY.with_opacity(0.5)),
                stroke_width: 0.5,
            }));
            desc.push(Mark::new(Shape::Text {
                x: center.x,
                y: center.y - r_scale.scale(value * 0.88),
                text: format!("{value:.2}"),
                font_size: 12.0,
                fill: Rgba::BLACK,
                anchor: TextAnchor::End,
            }));
        }

        // Axis name labels, anchored away from the chart body
        for (i, axis) in self.axes.iter().enumerate() {
            let angle = slice * i as f32;
            let x = center.x + angle.cos() * radius;
            let y = center.y + angle.sin() * (radius - 5.0);
            let anchor = if angle.cos() > 1e-4 {
                TextAnchor::Start
            } else if angle.cos() < -1e-4 {
                TextAnchor::End
            } else {
                TextAnchor::Middle
            };
            desc.push(Mark::new(Shape::Text {
                x,
                y,
                text: display_name(axis).to_string(),
                font_size: 14.0,
                fill: Rgba::GREY,
                anchor,
            }));
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn push_hit_arcs(
        &self,
        desc: &mut RenderDescription,
        ds: &Dataset,
        slots: &[Group],
        active: ActiveGroups,
        full_means: &[BTreeMap<String, f64>],
        subset_means: &[BTreeMap<String, f64>],
        center: Point,
        radius: f32,
        slice: f32,
    ) {
        let arc_width = slice * 0.99;

        for (i, axis) in self.axes.iter().enumerate() {
            let angle = slice * i as f32;
            let mut tooltip = format!("Parameter: {}", display_name(axis));

            for (slot, &group) in slots.iter().enumerate() {
                if !active[group.index()] {
                    continue;
                }
                let label = ds.label(group);
                if let Some(mean) = full_means[slot].get(axis) {
                    tooltip.push_str(&format!("\n{label}: {mean:.2}"));
                }
                if !subset_means[slot].is_empty() {
                    if let Some(mean) = subset_means[slot].get(axis) {
                        tooltip.push_str(&format!("\n{label} (H): {mean:.2}"));
                    }
                }
            }

            desc.push_hit(HitRegion {
                geometry: HitGeometry::Arc {
                    cx: center.x,
                    cy: center.y,
                    radius,
                    start_angle: angle - arc_width / 2.0,
                    end_angle: angle + arc_width / 2.0,
                },
                tooltip,
                group: None,
                key: None,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap as Map;

    fn dataset() -> Dataset {
        Dataset::single_group(
            vec![
                TrialRecord::new("A", "1").with_value("GaitSpeed", 1.0).with_value("timeRgait", 0.8),
                TrialRecord::new("A", "2").with_value("GaitSpeed", 3.0).with_value("timeRgait", 1.2),
            ],
            Map::new(),
            "Stroke",
        )
        .with_group2(
            vec![
                TrialRecord::new("C", "1").with_value("GaitSpeed", 2.0).with_value("timeRgait", 1.0),
            ],
            Map::new(),
            "Control",
        )
    }

    fn dims() -> Dimensions {
        Dimensions::new(450.0, 400.0)
    }

    fn polygons(desc: &RenderDescription, group: Group) -> (usize, usize) {
        let full = desc
            .marks_for_group(group)
            .filter(|m| matches!(m.shape, Shape::Polygon { .. }) && m.dash.is_none())
            .count();
        let subset = desc
            .marks_for_group(group)
            .filter(|m| matches!(m.shape, Shape::Polygon { .. }) && m.dash.is_some())
            .count();
        (full, subset)
    }

    #[test]
    fn test_render_missing_dataset_is_empty() {
        let view = RadarView::new();
        let store = SelectionStore::new();
        assert!(view.render(None, &store, [true, true], dims()).is_empty());
    }

    #[test]
    fn test_two_polygons_per_active_group() {
        let ds = dataset();
        let view = RadarView::new();
        let store = SelectionStore::new();
        let desc = view.render(Some(&ds), &store, [true, true], dims());

        assert_eq!(polygons(&desc, Group::One), (1, 1));
        assert_eq!(polygons(&desc, Group::Two), (1, 1));
    }

    #[test]
    fn test_toggle_active_removes_polygons_only() {
        let ds = dataset();
        let view = RadarView::new();
        let store = SelectionStore::new();
        let desc = view.render(Some(&ds), &store, [false, true], dims());

        assert_eq!(polygons(&desc, Group::One), (0, 0));
        assert_eq!(polygons(&desc, Group::Two), (1, 1));
        // Hit arcs stay available for the remaining group
        assert_eq!(desc.hits.len(), 7);
    }

    #[test]
    fn test_empty_selection_draws_flat_polygon() {
        let ds = dataset();
        let view = RadarView::new();
        let store = SelectionStore::new();
        let desc = view.render(Some(&ds), &store, [true, true], dims());

        let center = Point::new(225.0, 200.0);
        let subset = desc
            .marks_for_group(Group::One)
            .find(|m| matches!(m.shape, Shape::Polygon { .. }) && m.dash.is_some())
            .expect("subset polygon present");
        let Shape::Polygon { points, .. } = &subset.shape else {
            panic!("expected polygon");
        };
        for p in points {
            assert!(p.distance(center) < 0.001);
        }
    }

    #[test]
    fn test_selected_subset_polygon_tracks_selection() {
        let ds = dataset();
        let view = RadarView::new();
        let mut store = SelectionStore::new();
        store.set_selection(Group::One, vec!["A_2".to_string()]);

        let desc = view.render(Some(&ds), &store, [true, true], dims());
        let subset = desc
            .marks_for_group(Group::One)
            .find(|m| matches!(m.shape, Shape::Polygon { .. }) && m.dash.is_some())
            .expect("subset polygon present");
        let Shape::Polygon { points, .. } = &subset.shape else {
            panic!("expected polygon");
        };
        let center = Point::new(225.0, 200.0);
        assert!(points.iter().any(|p| p.distance(center) > 1.0));
    }

    #[test]
    fn test_shared_scale_covers_selected_series() {
        // Selecting only the high trial pushes the subset mean (3.0) above
        // the full-population mean (2.0); the scale must cover it exactly
        let ds = dataset();
        let view = RadarView::new();
        let mut store = SelectionStore::new();
        store.set_selection(Group::One, vec!["A_2".to_string()]);

        let desc = view.render(Some(&ds), &store, [true, true], dims());
        let radius = 200.0;
        let center = Point::new(225.0, 200.0);

        // GaitSpeed is axis index 4; the subset vertex there must reach the rim
        let subset = desc
            .marks_for_group(Group::One)
            .find(|m| matches!(m.shape, Shape::Polygon { .. }) && m.dash.is_some())
            .expect("subset polygon present");
        let Shape::Polygon { points, .. } = &subset.shape else {
            panic!("expected polygon");
        };
        assert!((points[4].distance(center) - radius).abs() < 0.001);
    }

    #[test]
    fn test_vertex_dots_per_axis() {
        let ds = dataset();
        let view = RadarView::new();
        let store = SelectionStore::new();
        let desc = view.render(Some(&ds), &store, [true, true], dims());

        let dots = desc
            .marks_for_group(Group::One)
            .filter(|m| matches!(m.shape, Shape::Circle { .. }))
            .count();
        assert_eq!(dots, 7);
    }

    #[test]
    fn test_tooltip_joins_full_and_selected_means() {
        let ds = dataset();
        let view = RadarView::new();
        let mut store = SelectionStore::new();
        store.set_selection(Group::One, vec!["A_2".to_string()]);

        let desc = view.render(Some(&ds), &store, [true, true], dims());
        let gait_speed_arc = desc
            .hits
            .iter()
            .find(|h| h.tooltip.starts_with("Parameter: Gait Speed"))
            .expect("arc for GaitSpeed");

        assert!(gait_speed_arc.tooltip.contains("Stroke: 2.00"));
        assert!(gait_speed_arc.tooltip.contains("Stroke (H): 3.00"));
        assert!(gait_speed_arc.tooltip.contains("Control: 2.00"));
        assert!(!gait_speed_arc.tooltip.contains("Control (H)"));
    }

    #[test]
    fn test_tooltip_skips_inactive_group() {
        let ds = dataset();
        let view = RadarView::new();
        let store = SelectionStore::new();
        let desc = view.render(Some(&ds), &store, [true, false], dims());

        let arc = &desc.hits[0];
        assert!(arc.tooltip.contains("Stroke"));
        assert!(!arc.tooltip.contains("Control"));
    }

    #[test]
    fn test_non_finite_means_draw_as_zero() {
        let ds = Dataset::single_group(
            vec![TrialRecord::new("A", "1")
                .with_value("GaitSpeed", f64::NAN)
                .with_value("timeRgait", 1.0)],
            Map::new(),
            "Stroke",
        );
        let view = RadarView::new();
        let store = SelectionStore::new();
        let desc = view.render(Some(&ds), &store, [true, true], dims());

        let full = desc
            .marks_for_group(Group::One)
            .find(|m| matches!(m.shape, Shape::Polygon { .. }) && m.dash.is_none())
            .expect("full polygon present");
        let Shape::Polygon { points, .. } = &full.shape else {
            panic!("expected polygon");
        };
        // GaitSpeed (axis 4) collapses to the center; timeRgait (axis 6) does not
        let center = Point::new(225.0, 200.0);
        assert!(points[4].distance(center) < 0.001);
        assert!(points[6].distance(center) > 1.0);
    }

    #[test]
    fn test_all_zero_means_render_nothing() {
        let ds = Dataset::single_group(
            vec![TrialRecord::new("A", "1").with_value("GaitSpeed", 0.0)],
            Map::new(),
            "Stroke",
        );
        let view = RadarView::new();
        let store = SelectionStore::new();
        assert!(view.render(Some(&ds), &store, [true, true], dims()).is_empty());
    }
}
