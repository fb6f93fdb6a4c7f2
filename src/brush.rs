//! Interactive range selection on a chart value axis.
//!
//! A [`BrushController`] translates a vertical pixel-space drag into a
//! selection-set update, and repositions its visual handle to match an
//! externally-changed selection without re-entering the update path. The
//! reentrancy guard is the explicit [`EventSource`] tag carried by every
//! [`BrushEvent`]: programmatic moves are dropped before any store write, so
//! selection → handle → selection feedback loops cannot form.

use std::collections::BTreeSet;

use crate::data::{Group, TrialRecord};
use crate::scale::{LinearScale, Scale};
use crate::selection::SelectionStore;

/// Default minimum handle height in pixels for degenerate ranges.
pub const MIN_HANDLE_HEIGHT: f32 = 1.0;

/// A vertical pixel interval, normalized so `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelInterval {
    /// Top edge in pixels.
    pub start: f32,
    /// Bottom edge in pixels.
    pub end: f32,
}

impl PixelInterval {
    /// Create an interval, swapping the endpoints if needed.
    #[must_use]
    pub fn new(a: f32, b: f32) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Height of the interval in pixels.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.end - self.start
    }
}

/// Who moved the brush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSource {
    /// A pointer drag by the analyst.
    User,
    /// An internally-triggered repositioning; must not write the selection.
    Programmatic,
}

/// One completed brush move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushEvent {
    /// The new pixel interval, or `None` when the brush was cleared.
    pub interval: Option<PixelInterval>,
    /// Origin of the move.
    pub source: EventSource,
}

impl BrushEvent {
    /// A user drag ending on the given interval.
    #[must_use]
    pub fn user(interval: PixelInterval) -> Self {
        Self { interval: Some(interval), source: EventSource::User }
    }

    /// A user gesture that cleared the brush.
    #[must_use]
    pub fn cleared() -> Self {
        Self { interval: None, source: EventSource::User }
    }
}

/// Per-group range selector attached to a box plot's value axis.
#[derive(Debug, Clone)]
pub struct BrushController {
    group: Group,
    scale: Option<LinearScale>,
    handle: Option<PixelInterval>,
    min_handle_height: f32,
}

impl BrushController {
    /// Create a brush writing into `group`'s selection set.
    #[must_use]
    pub fn new(group: Group) -> Self {
        Self {
            group,
            scale: None,
            handle: None,
            min_handle_height: MIN_HANDLE_HEIGHT,
        }
    }

    /// Override the minimum handle height for degenerate ranges.
    #[must_use]
    pub fn min_handle_height(mut self, height: f32) -> Self {
        self.min_handle_height = height.max(0.0);
        self
    }

    /// The group this brush filters.
    #[must_use]
    pub fn group(&self) -> Group {
        self.group
    }

    /// Current visual handle position, if any.
    #[must_use]
    pub fn handle(&self) -> Option<PixelInterval> {
        self.handle
    }

    /// Install the value scale of the hosting view's current layout.
    ///
    /// Must be refreshed whenever the view re-renders, since dimensions and
    /// domains move under the brush.
    pub fn set_scale(&mut self, scale: LinearScale) {
        self.scale = Some(scale);
    }

    /// Handle a completed brush move.
    ///
    /// Programmatic moves update the handle and stop there. A cleared brush
    /// is a no-op on the selection — it persists until explicitly reset.
    /// Otherwise the pixel interval is inverted through the value scale and
    /// every record whose attribute falls in the data range (inclusive)
    /// contributes its composite key to a full `set_selection` replacement.
    pub fn drag_end(
        &mut self,
        event: BrushEvent,
        records: &[TrialRecord],
        attribute: &str,
        store: &mut SelectionStore,
    ) {
        self.handle = event.interval;

        if event.source == EventSource::Programmatic {
            return;
        }
        let Some(interval) = event.interval else {
            return;
        };
        let Some(scale) = self.scale else {
            return;
        };

        // The y range runs top-down, so invert both edges and re-order
        let a = f64::from(scale.invert(interval.start));
        let b = f64::from(scale.invert(interval.end));
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

        let keys = records
            .iter()
            .filter(|r| r.value(attribute).is_some_and(|v| v >= lo && v <= hi))
            .map(TrialRecord::key);
        store.set_selection(self.group, keys);
    }

    /// Move the handle to cover the current selection, without writing it.
    ///
    /// The target interval spans `[min, max]` of the selected records'
    /// attribute values. A single-valued selection is padded to the minimum
    /// handle height so the handle stays visible and grabbable. An empty
    /// selection (or one with no finite values) clears the handle.
    pub fn reposition_to(
        &mut self,
        records: &[TrialRecord],
        attribute: &str,
        selection: &BTreeSet<String>,
        store: &mut SelectionStore,
    ) {
        let interval = self.selection_interval(records, attribute, selection);
        self.drag_end(
            BrushEvent { interval, source: EventSource::Programmatic },
            records,
            attribute,
            store,
        );
    }

    fn selection_interval(
        &self,
        records: &[TrialRecord],
        attribute: &str,
        selection: &BTreeSet<String>,
    ) -> Option<PixelInterval> {
        let scale = self.scale?;

        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for record in records {
            if !selection.contains(&record.key()) {
                continue;
            }
            if let Some(v) = record.value(attribute).filter(|v| v.is_finite()) {
                lo = lo.min(v);
                hi = hi.max(v);
            }
        }
        if lo > hi {
            return None;
        }

        let mut interval = PixelInterval::new(scale.scale(hi as f32), scale.scale(lo as f32));
        if (hi - lo).abs() < f64::EPSILON {
            interval.start -= self.min_handle_height / 2.0;
            interval.end += self.min_handle_height / 2.0;
        }
        Some(interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn records() -> Vec<TrialRecord> {
        vec![
            TrialRecord::new("A", "1").with_value("Gait", 1.0),
            TrialRecord::new("A", "2").with_value("Gait", 2.0),
            TrialRecord::new("B", "1").with_value("Gait", 3.0),
        ]
    }

    // Domain 0..10 mapped onto a 100px axis running top-down
    fn scale() -> LinearScale {
        LinearScale::new((0.0, 10.0), (100.0, 0.0)).expect("valid scale")
    }

    fn selected(store: &SelectionStore) -> Vec<&str> {
        store.selection(Group::One).iter().map(String::as_str).collect()
    }

    #[test]
    fn test_user_drag_selects_range() {
        let mut store = SelectionStore::new();
        let mut brush = BrushController::new(Group::One);
        brush.set_scale(scale());

        // Pixels for the data range [1.4, 3.1]
        let interval = PixelInterval::new(scale().scale(3.1), scale().scale(1.4));
        brush.drag_end(BrushEvent::user(interval), &records(), "Gait", &mut store);

        assert_eq!(selected(&store), vec!["A_2", "B_1"]);
    }

    #[test]
    fn test_range_is_inclusive() {
        let mut store = SelectionStore::new();
        let mut brush = BrushController::new(Group::One);
        brush.set_scale(scale());

        let interval = PixelInterval::new(scale().scale(3.0), scale().scale(1.0));
        brush.drag_end(BrushEvent::user(interval), &records(), "Gait", &mut store);

        assert_eq!(store.selection(Group::One).len(), 3);
    }

    #[test]
    fn test_cleared_brush_keeps_selection() {
        let mut store = SelectionStore::new();
        store.set_selection(Group::One, vec!["A_2".to_string()]);

        let mut brush = BrushController::new(Group::One);
        brush.set_scale(scale());
        brush.drag_end(BrushEvent::cleared(), &records(), "Gait", &mut store);

        assert_eq!(selected(&store), vec!["A_2"]);
        assert!(brush.handle().is_none());
    }

    #[test]
    fn test_programmatic_move_never_writes() {
        let writes = Rc::new(RefCell::new(0usize));
        let writes_in_cb = Rc::clone(&writes);

        let mut store = SelectionStore::new();
        store.set_selection(Group::One, vec!["A_1".to_string(), "B_1".to_string()]);
        store.subscribe(move |_, _| *writes_in_cb.borrow_mut() += 1);

        let mut brush = BrushController::new(Group::One);
        brush.set_scale(scale());
        let selection = store.selection(Group::One).clone();
        brush.reposition_to(&records(), "Gait", &selection, &mut store);

        assert_eq!(*writes.borrow(), 0);
        assert!(brush.handle().is_some());
    }

    #[test]
    fn test_reposition_covers_selection_extent() {
        let mut store = SelectionStore::new();
        let mut brush = BrushController::new(Group::One);
        brush.set_scale(scale());

        let selection: BTreeSet<String> =
            ["A_1", "B_1"].iter().map(|s| (*s).to_string()).collect();
        brush.reposition_to(&records(), "Gait", &selection, &mut store);

        let handle = brush.handle().expect("handle positioned");
        assert!((handle.start - scale().scale(3.0)).abs() < 0.001);
        assert!((handle.end - scale().scale(1.0)).abs() < 0.001);
    }

    #[test]
    fn test_degenerate_range_padded_to_minimum_height() {
        let mut store = SelectionStore::new();
        let mut brush = BrushController::new(Group::One);
        brush.set_scale(scale());

        let selection: BTreeSet<String> = std::iter::once("A_2".to_string()).collect();
        brush.reposition_to(&records(), "Gait", &selection, &mut store);

        let handle = brush.handle().expect("handle positioned");
        assert!(handle.height() >= MIN_HANDLE_HEIGHT);
    }

    #[test]
    fn test_reposition_empty_selection_clears_handle() {
        let mut store = SelectionStore::new();
        let mut brush = BrushController::new(Group::One);
        brush.set_scale(scale());

        brush.reposition_to(&records(), "Gait", &BTreeSet::new(), &mut store);
        assert!(brush.handle().is_none());
    }

    #[test]
    fn test_drag_without_scale_is_noop() {
        let mut store = SelectionStore::new();
        let mut brush = BrushController::new(Group::One);
        let interval = PixelInterval::new(10.0, 20.0);
        brush.drag_end(BrushEvent::user(interval), &records(), "Gait", &mut store);
        assert!(store.selection(Group::One).is_empty());
    }

    #[test]
    fn test_pixel_interval_normalizes() {
        let interval = PixelInterval::new(20.0, 10.0);
        assert!((interval.start - 10.0).abs() < f32::EPSILON);
        assert!((interval.height() - 10.0).abs() < f32::EPSILON);
    }
}
