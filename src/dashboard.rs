//! One dashboard session: the dataset, the selection store, and the three
//! linked views behind a single facade.
//!
//! The session owns the only [`SelectionStore`] writer path. Brush drags,
//! trace clicks, and filter resets all funnel through here, and every view
//! reads the same store on its next render pass — which is how a selection
//! made in one chart shows up in the other two.

use std::collections::BTreeSet;

use crate::brush::BrushEvent;
use crate::data::{Dataset, Group};
use crate::error::Result;
use crate::render::RenderDescription;
use crate::selection::{SelectionStore, SubscriptionId};
use crate::views::{
    ActiveGroups, BoxPlotView, Crosshair, Dimensions, DisplayMode, LineChartView, RadarView,
    ResizeAdapter,
};

/// Attribute shown by the box plot until the host picks another.
const DEFAULT_ATTRIBUTE: &str = "GaitSpeed";

/// Which of the three linked views an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    /// The box plot family.
    BoxPlot,
    /// The line chart family.
    LineChart,
    /// The radar family.
    Radar,
}

impl ViewKind {
    const fn index(self) -> usize {
        match self {
            Self::BoxPlot => 0,
            Self::LineChart => 1,
            Self::Radar => 2,
        }
    }
}

/// Render descriptions of all three views from one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardFrame {
    /// Box plot output.
    pub box_plot: RenderDescription,
    /// Line chart output.
    pub line_chart: RenderDescription,
    /// Radar output.
    pub radar: RenderDescription,
}

/// A linked-view analysis session.
pub struct Dashboard {
    dataset: Option<Dataset>,
    store: SelectionStore,
    box_view: BoxPlotView,
    line_view: LineChartView,
    radar_view: RadarView,
    active: [ActiveGroups; 3],
    sizes: [ResizeAdapter; 3],
    hovered_trace: Option<(Group, String)>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    /// Create an empty session awaiting its first dataset.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dataset: None,
            store: SelectionStore::new(),
            box_view: BoxPlotView::new(DEFAULT_ATTRIBUTE),
            line_view: LineChartView::new(),
            radar_view: RadarView::new(),
            active: [[true, true]; 3],
            sizes: [
                ResizeAdapter::new(Dimensions::new(450.0, 400.0)),
                ResizeAdapter::new(Dimensions::new(450.0, 300.0)),
                ResizeAdapter::new(Dimensions::new(450.0, 400.0)),
            ],
            hovered_trace: None,
        }
    }

    /// Load a submitted form payload, replacing any previous dataset.
    ///
    /// Selection keys that do not exist in the new dataset are purged before
    /// the swap, so no view can ever observe a selection pointing at trials
    /// that are gone.
    pub fn load_dataset(&mut self, payload: &str) -> Result<()> {
        let dataset = Dataset::from_json(payload)?;
        for group in Group::ALL {
            self.store.retain_known(group, &dataset.key_set(group));
        }
        self.hovered_trace = None;
        self.dataset = Some(dataset);
        Ok(())
    }

    /// The currently loaded dataset, if any.
    #[must_use]
    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    /// Current selection set for one group.
    #[must_use]
    pub fn selection(&self, group: Group) -> &BTreeSet<String> {
        self.store.selection(group)
    }

    /// Replace one group's selection (for external consumers such as a
    /// summary panel).
    pub fn set_selection(&mut self, group: Group, keys: impl IntoIterator<Item = String>) {
        self.store.set_selection(group, keys);
    }

    /// Explicit "reset filters" action for one group.
    pub fn clear_selection(&mut self, group: Group) {
        self.store.clear(group);
    }

    /// Observe selection changes.
    pub fn subscribe(
        &mut self,
        callback: impl FnMut(Group, &BTreeSet<String>) + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(callback)
    }

    /// Stop observing selection changes.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Route a completed brush move to the box plot's controller.
    ///
    /// Ignored while the group is toggled off (its brush is detached) or
    /// while group 2 is addressed without dual-group exploration.
    pub fn brush(&mut self, group: Group, event: BrushEvent) {
        if !self.active[ViewKind::BoxPlot.index()][group.index()] {
            return;
        }
        let Some(dataset) = &self.dataset else {
            return;
        };
        if dataset.records(group).is_none() {
            return;
        }
        self.box_view.drag_end(group, event, dataset, &mut self.store);
    }

    /// Toggle one trial in or out of the selection (line-chart trace click).
    pub fn toggle_trace(&mut self, group: Group, key: &str) {
        let known = self
            .dataset
            .as_ref()
            .and_then(|ds| ds.traces(group))
            .is_some_and(|traces| traces.contains_key(key));
        if known {
            self.store.toggle(group, key);
        }
    }

    /// Record which trace the pointer is over (line-chart hover highlight).
    pub fn set_hovered_trace(&mut self, hovered: Option<(Group, String)>) {
        self.hovered_trace = hovered;
    }

    /// Toggle a group's visibility in one view family (legend click).
    pub fn toggle_group(&mut self, view: ViewKind, group: Group) {
        let flag = &mut self.active[view.index()][group.index()];
        *flag = !*flag;
    }

    /// Active-group flags of one view family.
    #[must_use]
    pub fn active_groups(&self, view: ViewKind) -> ActiveGroups {
        self.active[view.index()]
    }

    /// Attribute currently shown by the box plot.
    #[must_use]
    pub fn attribute(&self) -> &str {
        self.box_view.attribute()
    }

    /// Switch the box plot attribute; the selection persists.
    pub fn set_attribute(&mut self, attribute: impl Into<String>) {
        self.box_view.set_attribute(attribute);
    }

    /// Current line-chart display mode.
    #[must_use]
    pub fn display_mode(&self) -> DisplayMode {
        self.line_view.mode()
    }

    /// Switch the line-chart display mode.
    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.line_view.set_mode(mode);
    }

    /// Report a view's container box. Returns `true` when the observation
    /// was accepted and the view should re-render.
    pub fn resize(&mut self, view: ViewKind, width: f32, height: f32) -> bool {
        self.sizes[view.index()].observe(width, height).is_some()
    }

    /// Currently accepted dimensions of one view.
    #[must_use]
    pub fn dimensions(&self, view: ViewKind) -> Dimensions {
        self.sizes[view.index()].dimensions()
    }

    /// Render the box plot from the current state.
    pub fn render_box_plot(&mut self) -> RenderDescription {
        self.box_view.render(
            self.dataset.as_ref(),
            &mut self.store,
            self.active[ViewKind::BoxPlot.index()],
            self.sizes[ViewKind::BoxPlot.index()].dimensions(),
        )
    }

    /// Render the line chart from the current state.
    #[must_use]
    pub fn render_line_chart(&self) -> RenderDescription {
        self.line_view.render(
            self.dataset.as_ref(),
            &self.store,
            self.active[ViewKind::LineChart.index()],
            self.sizes[ViewKind::LineChart.index()].dimensions(),
            self.hovered_trace.as_ref().map(|(g, k)| (*g, k.as_str())),
        )
    }

    /// Render the radar from the current state.
    #[must_use]
    pub fn render_radar(&self) -> RenderDescription {
        self.radar_view.render(
            self.dataset.as_ref(),
            &self.store,
            self.active[ViewKind::Radar.index()],
            self.sizes[ViewKind::Radar.index()].dimensions(),
        )
    }

    /// Render all three views in one pass.
    pub fn render_all(&mut self) -> DashboardFrame {
        DashboardFrame {
            box_plot: self.render_box_plot(),
            line_chart: self.render_line_chart(),
            radar: self.render_radar(),
        }
    }

    /// Line-chart crosshair readout for a pointer x-position.
    #[must_use]
    pub fn crosshair(&self, x_px: f32) -> Option<Crosshair> {
        self.line_view.crosshair(
            self.dataset.as_ref(),
            self.active[ViewKind::LineChart.index()],
            self.sizes[ViewKind::LineChart.index()].dimensions(),
            x_px,
        )
    }
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("dataset", &self.dataset.is_some())
            .field("store", &self.store)
            .field("attribute", &self.box_view.attribute())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::PixelInterval;
    use crate::scale::{LinearScale, Scale};

    fn payload() -> &'static str {
        r#"{
            "df1": [
                {"sid": "A", "trial": "1", "GaitSpeed": 1.0},
                {"sid": "A", "trial": "2", "GaitSpeed": 2.0},
                {"sid": "B", "trial": "1", "GaitSpeed": 3.0}
            ],
            "df2": [{"sid": "C", "trial": "1", "GaitSpeed": 4.0}],
            "df1_data": {
                "A_1": [{"time": 0.0, "col": 1.0}, {"time": 100.0, "col": 1.5}],
                "A_2": [{"time": 0.0, "col": 2.0}, {"time": 100.0, "col": 2.5}],
                "B_1": [{"time": 0.0, "col": 3.0}, {"time": 100.0, "col": 3.5}]
            },
            "df2_data": {"C_1": [{"time": 0.0, "col": 4.0}, {"time": 100.0, "col": 4.5}]},
            "label1": "Stroke",
            "label2": "Control",
            "groupExploration": true
        }"#
    }

    fn loaded() -> Dashboard {
        let mut dash = Dashboard::new();
        dash.load_dataset(payload()).expect("payload parses");
        dash
    }

    // The value scale the box view installs at the default 450x400 box
    fn box_value_scale() -> LinearScale {
        LinearScale::new((0.0, 1.1 * 4.0), (340.0, 20.0)).expect("valid scale")
    }

    #[test]
    fn test_render_all_views_from_payload() {
        let mut dash = loaded();
        let frame = dash.render_all();
        assert!(!frame.box_plot.is_empty());
        assert!(!frame.line_chart.is_empty());
        assert!(!frame.radar.is_empty());
    }

    #[test]
    fn test_render_before_load_is_empty() {
        let mut dash = Dashboard::new();
        let frame = dash.render_all();
        assert!(frame.box_plot.is_empty());
        assert!(frame.line_chart.is_empty());
        assert!(frame.radar.is_empty());
    }

    #[test]
    fn test_brush_propagates_to_all_views() {
        let mut dash = loaded();
        dash.render_box_plot();

        let scale = box_value_scale();
        let interval = PixelInterval::new(scale.scale(3.1), scale.scale(1.4));
        dash.brush(Group::One, BrushEvent::user(interval));

        let selected: Vec<&str> = dash.selection(Group::One).iter().map(String::as_str).collect();
        assert_eq!(selected, vec!["A_2", "B_1"]);

        // Every view that renders group 1 highlights the same trials
        let line = dash.render_line_chart();
        assert!(line.highlighted_keys(Group::One).contains("A_2"));
        assert!(line.highlighted_keys(Group::One).contains("B_1"));
        assert!(line.highlighted_keys(Group::Two).is_empty());

        let radar = dash.render_radar();
        assert!(radar.marks_for_group(Group::One).any(|m| m.highlighted));
    }

    #[test]
    fn test_brush_ignored_for_inactive_group() {
        let mut dash = loaded();
        dash.render_box_plot();
        dash.toggle_group(ViewKind::BoxPlot, Group::One);

        let scale = box_value_scale();
        let interval = PixelInterval::new(scale.scale(3.1), scale.scale(1.4));
        dash.brush(Group::One, BrushEvent::user(interval));
        assert!(dash.selection(Group::One).is_empty());
    }

    #[test]
    fn test_dataset_swap_purges_stale_selection() {
        let mut dash = loaded();
        dash.set_selection(Group::One, vec!["A_2".to_string(), "B_1".to_string()]);

        let next = r#"{
            "df1": [{"sid": "A", "trial": "2", "GaitSpeed": 2.0}],
            "label1": "Stroke"
        }"#;
        dash.load_dataset(next).expect("payload parses");

        // A_2 survives, B_1 is gone with the old dataset
        let selected: Vec<&str> = dash.selection(Group::One).iter().map(String::as_str).collect();
        assert_eq!(selected, vec!["A_2"]);
    }

    #[test]
    fn test_toggle_trace_round_trip() {
        let mut dash = loaded();
        dash.toggle_trace(Group::One, "A_1");
        assert!(dash.selection(Group::One).contains("A_1"));
        dash.toggle_trace(Group::One, "A_1");
        assert!(dash.selection(Group::One).is_empty());
    }

    #[test]
    fn test_toggle_trace_unknown_key_is_noop() {
        let mut dash = loaded();
        dash.toggle_trace(Group::One, "Z_9");
        assert!(dash.selection(Group::One).is_empty());
    }

    #[test]
    fn test_toggle_group_is_per_view_family() {
        let mut dash = loaded();
        dash.set_selection(Group::One, vec!["A_2".to_string()]);
        dash.toggle_group(ViewKind::Radar, Group::One);

        assert_eq!(dash.active_groups(ViewKind::Radar), [false, true]);
        assert_eq!(dash.active_groups(ViewKind::BoxPlot), [true, true]);
        // Visibility toggles never touch the selection itself
        assert!(dash.selection(Group::One).contains("A_2"));

        let radar = dash.render_radar();
        assert_eq!(radar.marks_for_group(Group::One).count(), 0);
        let frame_box = dash.render_box_plot();
        assert!(frame_box.marks_for_group(Group::One).count() > 0);
    }

    #[test]
    fn test_resize_accepts_each_change_once() {
        let mut dash = loaded();
        assert!(dash.resize(ViewKind::BoxPlot, 900.0, 800.0));
        assert!(!dash.resize(ViewKind::BoxPlot, 900.0, 800.0));
        assert_eq!(dash.dimensions(ViewKind::BoxPlot), Dimensions::new(900.0, 800.0));
        // Sub-minimum boxes are ignored
        assert!(!dash.resize(ViewKind::BoxPlot, 4.0, 4.0));
    }

    #[test]
    fn test_subscribe_sees_brush_writes() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let mut dash = loaded();
        let count = Rc::new(RefCell::new(0usize));
        let count_in_cb = Rc::clone(&count);
        dash.subscribe(move |_, _| *count_in_cb.borrow_mut() += 1);

        dash.set_selection(Group::One, vec!["A_1".to_string()]);
        assert_eq!(*count.borrow(), 1);

        // A full render pass repositions brushes programmatically and must
        // not produce a second write
        dash.render_all();
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_crosshair_through_session() {
        let mut dash = loaded();
        dash.render_all();
        let crosshair = dash.crosshair(225.0).expect("crosshair available");
        assert_eq!(crosshair.readouts.len(), 2);
    }

    #[test]
    fn test_display_mode_and_attribute_props() {
        let mut dash = loaded();
        dash.set_display_mode(DisplayMode::Spread);
        assert_eq!(dash.display_mode(), DisplayMode::Spread);
        dash.set_attribute("timeRgait");
        assert_eq!(dash.attribute(), "timeRgait");
    }
}
