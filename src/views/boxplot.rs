//! Box plot view: one five-number box per active group, with a selection
//! brush on each group's value axis.

use crate::brush::{BrushController, BrushEvent};
use crate::color::Rgba;
use crate::data::{Dataset, Group};
use crate::geometry::Rect;
use crate::render::{HitGeometry, HitRegion, Mark, RenderDescription, Shape, TextAnchor};
use crate::scale::{BandScale, LinearScale, Scale};
use crate::selection::SelectionStore;
use crate::stats;
use crate::views::{display_name, format_tick, group_fill, ActiveGroups, Dimensions, Margins};

/// Half-width of the brush overlay on a value axis.
const BRUSH_HALF_WIDTH: f32 = 5.0;

/// Fixed margins; the bottom leaves room for the attribute label.
const MARGINS: Margins = Margins::new(20.0, 20.0, 60.0, 40.0);

/// Box plot comparing the two groups' distribution of one attribute.
///
/// The displayed attribute is a prop: switching it re-renders but leaves the
/// selection (and therefore the brush position) alone.
#[derive(Debug, Clone)]
pub struct BoxPlotView {
    attribute: String,
    brushes: [BrushController; 2],
}

impl BoxPlotView {
    /// Create a view showing `attribute`.
    #[must_use]
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            brushes: [BrushController::new(Group::One), BrushController::new(Group::Two)],
        }
    }

    /// Currently displayed attribute.
    #[must_use]
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Switch the displayed attribute. Selection state is untouched.
    pub fn set_attribute(&mut self, attribute: impl Into<String>) {
        self.attribute = attribute.into();
    }

    /// The brush attached to one group's axis.
    #[must_use]
    pub fn brush(&self, group: Group) -> &BrushController {
        &self.brushes[group.index()]
    }

    /// Forward a completed brush move to the group's controller.
    pub fn drag_end(
        &mut self,
        group: Group,
        event: BrushEvent,
        dataset: &Dataset,
        store: &mut SelectionStore,
    ) {
        let Some(records) = dataset.records(group) else {
            return;
        };
        self.brushes[group.index()].drag_end(event, records, &self.attribute, store);
    }

    /// Compile the current inputs into a render description.
    ///
    /// Also repositions each attached brush to cover its group's current
    /// selection; those moves are programmatic and never write the store.
    pub fn render(
        &mut self,
        dataset: Option<&Dataset>,
        store: &mut SelectionStore,
        active: ActiveGroups,
        dims: Dimensions,
    ) -> RenderDescription {
        let mut desc = RenderDescription::new(dims.width, dims.height);
        let Some(ds) = dataset else {
            return desc;
        };

        let inner_w = MARGINS.inner_width(dims);
        let inner_h = MARGINS.inner_height(dims);
        if inner_w <= 0.0 || inner_h <= 0.0 {
            return desc;
        }

        let slots: Vec<Group> = if ds.group_exploration() {
            vec![Group::One, Group::Two]
        } else {
            vec![Group::One]
        };

        // Both groups feed the domain so toggling one's visibility does not
        // rescale the other
        let summaries: Vec<Option<stats::QuantileSummary>> = slots
            .iter()
            .map(|&g| ds.records(g).and_then(|r| stats::quantile_summary(r, &self.attribute)))
            .collect();
        let domain_max =
            1.1 * summaries.iter().flatten().map(|s| s.max).fold(0.0f64, f64::max) as f32;
        if domain_max <= 0.0 || !domain_max.is_finite() {
            return desc;
        }

        let Ok(y_scale) =
            LinearScale::new((0.0, domain_max), (MARGINS.top + inner_h, MARGINS.top))
        else {
            return desc;
        };
        let Ok(x_scale) =
            BandScale::new(slots.len(), (MARGINS.left, MARGINS.left + inner_w), 0.1)
        else {
            return desc;
        };

        self.push_axes(&mut desc, ds, &slots, &y_scale, &x_scale, inner_w, inner_h);

        for (slot, (&group, summary)) in slots.iter().zip(&summaries).enumerate() {
            if !active[group.index()] {
                continue;
            }
            // Insufficient data: skip this box, keep the rest of the chart
            let Some(summary) = summary else {
                continue;
            };
            self.push_box(&mut desc, group, *summary, slot, &x_scale, &y_scale);
        }

        for &group in &slots {
            if !active[group.index()] {
                // An inactive group's brush is detached from its axis
                continue;
            }
            let axis_x = match group {
                Group::One => MARGINS.left,
                Group::Two => MARGINS.left + inner_w,
            };
            let Some(records) = ds.records(group) else {
                continue;
            };

            let brush = &mut self.brushes[group.index()];
            brush.set_scale(y_scale);
            let selection = store.selection(group).clone();
            brush.reposition_to(records, &self.attribute, &selection, store);

            if let Some(handle) = brush.handle() {
                desc.push(
                    Mark::new(Shape::Rect {
                        x: axis_x - BRUSH_HALF_WIDTH,
                        y: handle.start,
                        width: BRUSH_HALF_WIDTH * 2.0,
                        height: handle.height(),
                        fill: Some(group_fill(group).with_opacity(0.3)),
                        stroke: Some(group_fill(group)),
                        stroke_width: 1.0,
                        corner_radius: 0.0,
                    })
                    .for_group(group),
                );
            }
        }

        desc
    }

    #[allow(clippy::too_many_arguments)]
    fn push_axes(
        &self,
        desc: &mut RenderDescription,
        ds: &Dataset,
        slots: &[Group],
        y_scale: &LinearScale,
        x_scale: &BandScale,
        inner_w: f32,
        inner_h: f32,
    ) {
        let axis_color = Rgba::BLACK.with_opacity(0.7);

        // Value axis with three ticks
        desc.push(Mark::new(Shape::Line {
            x1: MARGINS.left,
            y1: MARGINS.top,
            x2: MARGINS.left,
            y2: MARGINS.top + inner_h,
            stroke: axis_color,
            stroke_width: 1.0,
        }));
        for tick in y_scale.ticks(3) {
            let y = y_scale.scale(tick);
            desc.push(Mark::new(Shape::Line {
                x1: MARGINS.left - 4.0,
                y1: y,
                x2: MARGINS.left,
                y2: y,
                stroke: axis_color,
                stroke_width: 1.0,
            }));
            desc.push(Mark::new(Shape::Text {
                x: MARGINS.left - 6.0,
                y: y + 4.0,
                text: format_tick(tick),
                font_size: 12.0,
                fill: axis_color,
                anchor: TextAnchor::End,
            }));
        }

        // Category axis: baseline, one label per group, attribute title below
        let baseline = MARGINS.top + inner_h;
        desc.push(Mark::new(Shape::Line {
            x1: MARGINS.left,
            y1: baseline,
            x2: MARGINS.left + inner_w,
            y2: baseline,
            stroke: axis_color,
            stroke_width: 1.0,
        }));
        for (slot, &group) in slots.iter().enumerate() {
            if let Some(center) = x_scale.center(slot) {
                desc.push(
                    Mark::new(Shape::Text {
                        x: center,
                        y: baseline + 16.0,
                        text: ds.label(group).to_string(),
                        font_size: 12.0,
                        fill: axis_color,
                        anchor: TextAnchor::Middle,
                    })
                    .for_group(group),
                );
            }
        }
        desc.push(Mark::new(Shape::Text {
            x: MARGINS.left + inner_w / 2.0,
            y: baseline + MARGINS.bottom / 1.25,
            text: display_name(&self.attribute).to_string(),
            font_size: 15.0,
            fill: Rgba::BLACK,
            anchor: TextAnchor::Middle,
        }));
    }

    fn push_box(
        &self,
        desc: &mut RenderDescription,
        group: Group,
        summary: stats::QuantileSummary,
        slot: usize,
        x_scale: &BandScale,
        y_scale: &LinearScale,
    ) {
        let Some(band_start) = x_scale.position(slot) else {
            return;
        };
        let box_width = x_scale.bandwidth() / 1.4;
        let x_pos = band_start + (x_scale.bandwidth() - box_width) / 2.0;
        let center_x = x_pos + box_width / 2.0;
        let color = group_fill(group);

        let y = |v: f64| y_scale.scale(v as f32);

        // Interquartile box
        desc.push(
            Mark::new(Shape::Rect {
                x: x_pos,
                y: y(summary.q3),
                width: box_width,
                height: y(summary.q1) - y(summary.q3),
                fill: Some(color),
                stroke: Some(Rgba::BLACK),
                stroke_width: 1.0,
                corner_radius: 2.0,
            })
            .for_group(group),
        );

        // Median
        desc.push(
            Mark::new(Shape::Line {
                x1: x_pos,
                y1: y(summary.median),
                x2: x_pos + box_width,
                y2: y(summary.median),
                stroke: Rgba::BLACK,
                stroke_width: 1.0,
            })
            .for_group(group),
        );

        // Whiskers with caps
        for (from, to) in [(summary.min, summary.q1), (summary.max, summary.q3)] {
            desc.push(
                Mark::new(Shape::Line {
                    x1: center_x,
                    y1: y(from),
                    x2: center_x,
                    y2: y(to),
                    stroke: Rgba::BLACK,
                    stroke_width: 1.0,
                })
                .for_group(group),
            );
        }
        for cap in [summary.min, summary.max] {
            desc.push(
                Mark::new(Shape::Line {
                    x1: x_pos,
                    y1: y(cap),
                    x2: x_pos + box_width,
                    y2: y(cap),
                    stroke: Rgba::BLACK,
                    stroke_width: 1.0,
                })
                .for_group(group),
            );
        }

        // Hovering the box body shows the exact five-number summary
        desc.push_hit(HitRegion {
            geometry: HitGeometry::Rect(Rect::new(
                x_pos,
                y(summary.q3),
                box_width,
                y(summary.q1) - y(summary.q3),
            )),
            tooltip: summary.describe(),
            group: Some(group),
            key: None,
        });
    }
}
