//! Line chart view: per-group ensemble mean traces with a spread band or
//! per-trial spaghetti, a snapping crosshair readout, and legend toggles.

use crate::color::Rgba;
use crate::data::{Dataset, Group, SamplePoint};
use crate::geometry::{Point, Rect};
use crate::render::{HitGeometry, HitRegion, Mark, RenderDescription, Shape, TextAnchor};
use crate::scale::{LinearScale, Scale};
use crate::selection::SelectionStore;
use crate::stats::{self, MeanBand};
use crate::views::{format_tick, group_fill, ActiveGroups, Dimensions, Margins};

/// Dash length of spaghetti traces.
const TRACE_DASH: f32 = 10.0;
/// Width of the invisible hover/click strip along each trace.
const TRACE_HIT_WIDTH: f32 = 5.0;
/// Legend swatch side length.
const LEGEND_SWATCH: f32 = 18.0;
/// Vertical spacing between legend rows.
const LEGEND_SPACING: f32 = 20.0;
/// Vertical gap between a crosshair marker and its text block.
const CROSSHAIR_OFFSET: f32 = 27.0;
/// Line spacing inside a crosshair text block (three lines: U, M, L).
const CROSSHAIR_LINE_SPACING: f32 = 20.0;

/// What the chart draws besides the mean trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// Mean trace only (the form's "Default" option).
    #[default]
    MeanOnly,
    /// Mean trace plus the shaded one-sigma band.
    Spread,
    /// Mean trace plus every individual trial trace.
    AllData,
}

impl DisplayMode {
    /// Parse the form's spread-option label.
    #[must_use]
    pub fn from_option_label(label: &str) -> Option<Self> {
        match label {
            "Default" => Some(Self::MeanOnly),
            "Spread" => Some(Self::Spread),
            "All data" => Some(Self::AllData),
            _ => None,
        }
    }
}

/// Per-group crosshair values at the snapped timepoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrosshairReadout {
    /// Group the readout belongs to.
    pub group: Group,
    /// Marker x in pixels (snapped timepoint).
    pub x: f32,
    /// Marker y in pixels (mean value).
    pub y: f32,
    /// Upper bound at the timepoint.
    pub upper: f64,
    /// Mean at the timepoint.
    pub mean: f64,
    /// Lower bound at the timepoint.
    pub lower: f64,
    /// Top of the three-line text block, overlap-adjusted.
    pub text_y: f32,
}

/// Crosshair state for the current pointer x-position.
#[derive(Debug, Clone, PartialEq)]
pub struct Crosshair {
    /// One readout per visible group.
    pub readouts: Vec<CrosshairReadout>,
}

/// Line chart of one time-normalized gait parameter.
#[derive(Debug, Clone, Default)]
pub struct LineChartView {
    mode: DisplayMode,
    parameter: Option<String>,
}

struct Layout {
    margins: Margins,
    x: LinearScale,
    y: LinearScale,
}

impl LineChartView {
    /// Create a view in mean-only mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the displayed parameter name used as the chart title.
    #[must_use]
    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameter = Some(parameter.into());
        self
    }

    /// Current display mode.
    #[must_use]
    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Switch the display mode.
    pub fn set_mode(&mut self, mode: DisplayMode) {
        self.mode = mode;
    }

    /// Margins scale with the container so labels keep their share of space.
    fn margins(dims: Dimensions) -> Margins {
        Margins::new(
            dims.height * 0.10,
            dims.width * 0.05,
            dims.height * 0.15,
            dims.width * 0.10,
        )
    }

    /// The y domain spans every individual sample of every visible trace, so
    /// spaghetti never clips regardless of display mode.
    fn layout(ds: &Dataset, dims: Dimensions) -> Option<Layout> {
        let margins = Self::margins(dims);
        let inner_w = margins.inner_width(dims);
        let inner_h = margins.inner_height(dims);
        if inner_w <= 0.0 || inner_h <= 0.0 {
            return None;
        }

        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for group in Group::ALL {
            let Some(traces) = ds.traces(group) else {
                continue;
            };
            for sample in traces.values().flatten() {
                if sample.value.is_finite() {
                    lo = lo.min(sample.value);
                    hi = hi.max(sample.value);
                }
            }
        }
        if lo > hi {
            return None;
        }

        let x = LinearScale::new((0.0, 100.0), (margins.left, margins.left + inner_w)).ok()?;
        let y = LinearScale::new(
            ((lo - 0.005) as f32, (hi + 0.005) as f32),
            (margins.top + inner_h, margins.top),
        )
        .ok()?;
        Some(Layout { margins, x, y })
    }

    /// Compile the current inputs into a render description.
    pub fn render(
        &self,
        dataset: Option<&Dataset>,
        store: &SelectionStore,
        active: ActiveGroups,
        dims: Dimensions,
        hovered: Option<(Group, &str)>,
    ) -> RenderDescription {
        let mut desc = RenderDescription::new(dims.width, dims.height);
        let Some(ds) = dataset else {
            return desc;
        };
        let Some(layout) = Self::layout(ds, dims) else {
            return desc;
        };

        self.push_grid_and_axes(&mut desc, &layout, dims);

        for group in Group::ALL {
            if !active[group.index()] {
                continue;
            }
            let Some(traces) = ds.traces(group) else {
                continue;
            };

            let bands = stats::ensemble(traces);
            if !bands.is_empty() {
                desc.push(
                    Mark::new(Shape::Polyline {
                        points: bands
                            .iter()
                            .map(|b| band_point(&layout, b.time, b.mean))
                            .collect(),
                        stroke: group_fill(group),
                        stroke_width: 3.0,
                    })
                    .for_group(group),
                );
            }

            match self.mode {
                DisplayMode::Spread => {
                    if !bands.is_empty() {
                        let opacity = match group {
                            Group::One => 0.5,
                            Group::Two => 0.3,
                        };
                        desc.push(
                            Mark::new(Shape::Area {
                                upper: bands
                                    .iter()
                                    .map(|b| band_point(&layout, b.time, b.upper))
                                    .collect(),
                                lower: bands
                                    .iter()
                                    .map(|b| band_point(&layout, b.time, b.lower))
                                    .collect(),
                                fill: group_fill(group).with_opacity(opacity),
                            })
                            .for_group(group),
                        );
                    }
                    self.push_selected_traces(&mut desc, &layout, group, traces, store);
                }
                DisplayMode::MeanOnly => {
                    self.push_selected_traces(&mut desc, &layout, group, traces, store);
                }
                DisplayMode::AllData => {
                    self.push_all_traces(&mut desc, &layout, group, traces, store, hovered);
                }
            }
        }

        self.push_legend(&mut desc, ds, &layout, active);
        self.push_labels(&mut desc, &layout, dims);
        desc
    }

    /// Selected trials stay visible as dashed traces even outside the
    /// all-data mode.
    fn push_selected_traces(
        &self,
        desc: &mut RenderDescription,
        layout: &Layout,
        group: Group,
        traces: &std::collections::BTreeMap<String, Vec<SamplePoint>>,
        store: &SelectionStore,
    ) {
        for (key, samples) in traces {
            if !store.selection(group).contains(key) {
                continue;
            }
            desc.push(
                Mark::new(Shape::Polyline {
                    points: trace_points(layout, samples),
                    stroke: group_fill(group),
                    stroke_width: 1.0,
                })
                .for_group(group)
                .with_key(key.clone())
                .highlighted()
                .dashed(TRACE_DASH),
            );
        }
    }

    fn push_all_traces(
        &self,
        desc: &mut RenderDescription,
        layout: &Layout,
        group: Group,
        traces: &std::collections::BTreeMap<String, Vec<SamplePoint>>,
        store: &SelectionStore,
        hovered: Option<(Group, &str)>,
    ) {
        for (key, samples) in traces {
            let points = trace_points(layout, samples);
            let selected = store.selection(group).contains(key);
            let hover = hovered == Some((group, key.as_str()));

            let mut mark = Mark::new(Shape::Polyline {
                points: points.clone(),
                stroke: if selected || hover {
                    group_fill(group)
                } else {
                    group_fill(group).with_opacity(0.5)
                },
                stroke_width: 1.0,
            })
            .for_group(group)
            .with_key(key.clone())
            .dashed(TRACE_DASH);
            if selected || hover {
                mark = mark.highlighted();
            }
            desc.push(mark);

            // Invisible widened strip carries hover and click-to-toggle
            desc.push_hit(HitRegion {
                geometry: HitGeometry::Strip { points, width: TRACE_HIT_WIDTH },
                tooltip: key.clone(),
                group: Some(group),
                key: Some(key.clone()),
            });
        }
    }

    fn push_grid_and_axes(&self, desc: &mut RenderDescription, layout: &Layout, dims: Dimensions) {
        let axis_color = Rgba::BLACK.with_opacity(0.7);
        let grid_color = Rgba::GREY.with_opacity(0.2);
        let inner_h = layout.margins.inner_height(dims);
        let baseline = layout.margins.top + inner_h;

        for tick in layout.x.ticks(10) {
            let x = layout.x.scale(tick);
            desc.push(Mark::new(Shape::Line {
                x1: x,
                y1: layout.margins.top,
                x2: x,
                y2: baseline,
                stroke: grid_color,
                stroke_width: 1.0,
            }));
            desc.push(Mark::new(Shape::Text {
                x,
                y: baseline + 14.0,
                text: format_tick(tick),
                font_size: 12.0,
                fill: axis_color,
                anchor: TextAnchor::Middle,
            }));
        }

        for tick in layout.y.ticks(7) {
            let y = layout.y.scale(tick);
            desc.push(Mark::new(Shape::Line {
                x1: layout.margins.left,
                y1: y,
                x2: layout.margins.left + layout.margins.inner_width(dims),
                y2: y,
                stroke: grid_color,
                stroke_width: 1.0,
            }));
            desc.push(Mark::new(Shape::Text {
                x: layout.margins.left - 6.0,
                y: y + 4.0,
                text: format_tick(tick),
                font_size: 12.0,
                fill: axis_color,
                anchor: TextAnchor::End,
            }));
        }
    }

    fn push_legend(
        &self,
        desc: &mut RenderDescription,
        ds: &Dataset,
        layout: &Layout,
        active: ActiveGroups,
    ) {
        let x = layout.margins.left;
        let y_start = layout.margins.top / 6.0;

        for (row, group) in Group::ALL.into_iter().enumerate() {
            if group == Group::Two && !ds.group_exploration() {
                continue;
            }
            let y = y_start + row as f32 * LEGEND_SPACING;
            let fill = if active[group.index()] {
                group_fill(group)
            } else {
                group_fill(group).with_opacity(0.5)
            };

            desc.push(
                Mark::new(Shape::Rect {
                    x,
                    y,
                    width: LEGEND_SWATCH,
                    height: LEGEND_SWATCH,
                    fill: Some(fill),
                    stroke: None,
                    stroke_width: 1.0,
                    corner_radius: 3.0,
                })
                .for_group(group),
            );
            desc.push(
                Mark::new(Shape::Text {
                    x: x + LEGEND_SWATCH + 4.0,
                    y: y + 15.0,
                    text: ds.label(group).to_string(),
                    font_size: 12.0,
                    fill: Rgba::BLACK,
                    anchor: TextAnchor::Start,
                })
                .for_group(group),
            );
            // Clicking the swatch toggles the group's active flag
            desc.push_hit(HitRegion {
                geometry: HitGeometry::Rect(Rect::new(x, y, LEGEND_SWATCH, LEGEND_SWATCH)),
                tooltip: ds.label(group).to_string(),
                group: Some(group),
                key: None,
            });
        }
    }

    fn push_labels(&self, desc: &mut RenderDescription, layout: &Layout, dims: Dimensions) {
        let center_x = layout.margins.left + layout.margins.inner_width(dims) / 2.0;

        if let Some(parameter) = &self.parameter {
            desc.push(Mark::new(Shape::Text {
                x: center_x,
                y: layout.margins.top * 2.0 / 3.0,
                text: parameter.clone(),
                font_size: 18.0,
                fill: Rgba::BLACK.with_opacity(0.8),
                anchor: TextAnchor::Middle,
            }));
        }

        desc.push(Mark::new(Shape::Text {
            x: center_x,
            y: dims.height - Self::margins(dims).bottom / 1.25 + layout.margins.top,
            text: "Gait Cycle (%)".to_string(),
            font_size: 12.0,
            fill: Rgba::BLACK.with_opacity(0.7),
            anchor: TextAnchor::Middle,
        }));
    }

    /// Crosshair values for a pointer at `x_px`, snapped to the nearest
    /// sampled timepoint at or below the pointer.
    ///
    /// Available outside the all-data mode. The two groups' text blocks are
    /// pushed apart when their anchors come within twice the configured
    /// offset of each other.
    #[must_use]
    pub fn crosshair(
        &self,
        dataset: Option<&Dataset>,
        active: ActiveGroups,
        dims: Dimensions,
        x_px: f32,
    ) -> Option<Crosshair> {
        if self.mode == DisplayMode::AllData {
            return None;
        }
        let ds = dataset?;
        let layout = Self::layout(ds, dims)?;
        let t = f64::from(layout.x.invert(x_px));
        let text_height = 3.0 * CROSSHAIR_LINE_SPACING;

        let mut readouts = Vec::new();
        for group in Group::ALL {
            if !active[group.index()] {
                continue;
            }
            let Some(traces) = ds.traces(group) else {
                continue;
            };
            let bands = stats::ensemble(traces);
            let Some(band) = nearest_below(&bands, t) else {
                continue;
            };

            let x = layout.x.scale(band.time as f32);
            let y = layout.y.scale(band.mean as f32);
            let text_y = match group {
                Group::One => y - CROSSHAIR_OFFSET - text_height,
                Group::Two => y + CROSSHAIR_OFFSET,
            };
            readouts.push(CrosshairReadout {
                group,
                x,
                y,
                upper: band.upper,
                mean: band.mean,
                lower: band.lower,
                text_y,
            });
        }

        if let [one, two] = readouts.as_mut_slice() {
            if (one.text_y - two.text_y).abs() < 2.0 * CROSSHAIR_OFFSET {
                if one.y < two.y {
                    one.text_y = one.y - CROSSHAIR_OFFSET - text_height;
                    two.text_y = two.y + CROSSHAIR_OFFSET;
                } else {
                    one.text_y = one.y + CROSSHAIR_OFFSET;
                    two.text_y = two.y - CROSSHAIR_OFFSET - text_height;
                }
            }
        }

        if readouts.is_empty() {
            None
        } else {
            Some(Crosshair { readouts })
        }
    }
}

fn band_point(layout: &Layout, time: f64, value: f64) -> Point {
    Point::new(layout.x.scale(time as f32), layout.y.scale(value as f32))
}

fn trace_points(layout: &Layout, samples: &[SamplePoint]) -> Vec<Point> {
    samples
        .iter()
        .map(|s| Point::new(layout.x.scale(s.time as f32), layout.y.scale(s.value as f32)))
        .collect()
}

/// Index of the last band strictly below `t`, clamped to the first band.
fn nearest_below(bands: &[MeanBand], t: f64) -> Option<&MeanBand> {
    if bands.is_empty() {
        return None;
    }
    let i = bands.partition_point(|b| b.time < t).max(1);
    Some(&bands[i - 1])
}
