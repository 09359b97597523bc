#![forbid(unsafe_code)]

//! Public façade over the windowing engine.

use std::fmt;
use std::ops::{Bound, RangeBounds};
use std::time::Duration;

use web_time::Instant;

use crate::config::{ConfigError, VirtualizerConfig};
use crate::engine::WindowEngine;
use crate::gesture::{WheelEvent, WheelOutcome};
use crate::host::ElementHost;
use crate::pool::{Slot, SlotPool};
use crate::viewport::{Resize, ScrollRegion, VisibleRange};

/// Renders a large ordered collection through a bounded pool of reusable
/// elements.
///
/// The host owns the elements (through [`ElementHost`]) and forwards platform
/// events: scroll, wheel, resize, pointer and frame/timer callbacks. The
/// virtualizer decides which logical index each element shows, where it sits
/// along the scroll axis, how large the scrollable content is and where the
/// region is scrolled.
///
/// Nothing here fails at runtime. Out-of-range input is clamped or ignored
/// and a region without rendered extent turns measurement-dependent calls
/// into no-ops until the next resize.
///
/// # Example
///
/// ```
/// use winseq::testing::SimHost;
/// use winseq::{Resize, Virtualizer, VirtualizerConfig};
///
/// let mut list = Virtualizer::new(SimHost::new(40.0), VirtualizerConfig::default()).unwrap();
/// list.set_size(1_000);
/// list.on_resize(Resize::ScrollTarget { width: 320.0, height: 400.0 });
/// list.flush();
///
/// list.scroll_to_index(500);
/// assert_eq!(list.first_visible_index(), Some(500));
/// ```
pub struct Virtualizer<H: ElementHost> {
    engine: WindowEngine<H>,
}

impl<H: ElementHost> Virtualizer<H> {
    /// Create a virtualizer for `host`. Fails only on an invalid config.
    pub fn new(host: H, config: VirtualizerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            engine: WindowEngine::new(host, config),
        })
    }

    /// Create a virtualizer with the default tuning.
    #[must_use]
    pub fn with_defaults(host: H) -> Self {
        Self {
            engine: WindowEngine::new(host, VirtualizerConfig::default()),
        }
    }

    // ------------------------------------------------------------------
    // Collection
    // ------------------------------------------------------------------

    /// Number of items in the collection.
    #[must_use]
    pub fn size(&self) -> usize {
        self.engine.size()
    }

    /// Change the number of items.
    ///
    /// The first visible item stays at the same place in the viewport when it
    /// still exists (clamped to the new last item otherwise). Slots beyond
    /// the new size are hidden, never dropped. Setting the current size is a
    /// no-op.
    pub fn set_size(&mut self, size: usize) {
        self.engine.set_size(size);
    }

    /// Scroll so that item `index` (clamped to the collection) is the first
    /// visible one, or the collection edge is pinned when `index` lies within
    /// a viewport of it.
    ///
    /// Ignored when the collection is empty or the region has no rendered
    /// extent.
    pub fn scroll_to_index(&mut self, index: usize) {
        self.engine.scroll_to_index(index);
    }

    /// [`scroll_to_index`](Self::scroll_to_index) for untyped input.
    ///
    /// NaN and infinities are ignored, negative values scroll to the start
    /// and fractions are truncated.
    pub fn scroll_to_raw_index(&mut self, index: f64) {
        if !index.is_finite() {
            return;
        }
        let index = if index <= 0.0 { 0 } else { index as usize };
        self.engine.scroll_to_index(index);
    }

    /// Force a content refresh for the rendered items in `range`, without
    /// moving the scroll position. `update(..)` refreshes everything rendered.
    pub fn update(&mut self, range: impl RangeBounds<usize>) {
        let size = self.size();
        if size == 0 {
            return;
        }
        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&e) => e.min(size - 1),
            Bound::Excluded(&0) => return,
            Bound::Excluded(&e) => (e - 1).min(size - 1),
            Bound::Unbounded => size - 1,
        };
        if start > end {
            return;
        }
        self.engine.update(start, end);
    }

    /// Run all pending deferred work now, in dependency order.
    ///
    /// Two consecutive flushes without input in between leave the same
    /// observable state.
    pub fn flush(&mut self) {
        self.engine.flush();
    }

    // ------------------------------------------------------------------
    // Visible range
    // ------------------------------------------------------------------

    /// First item intersecting the viewport, `None` when nothing is shown.
    #[must_use]
    pub fn first_visible_index(&self) -> Option<usize> {
        self.engine.first_visible_index()
    }

    /// Last item intersecting the viewport, `None` when nothing is shown.
    #[must_use]
    pub fn last_visible_index(&self) -> Option<usize> {
        self.engine.last_visible_index()
    }

    /// Both ends of the visible range.
    #[must_use]
    pub fn visible_range(&self) -> Option<VisibleRange> {
        Some(VisibleRange {
            first: self.first_visible_index()?,
            last: self.last_visible_index()?,
        })
    }

    // ------------------------------------------------------------------
    // Platform events
    // ------------------------------------------------------------------

    /// The user scrolled the region to `scroll_top`.
    pub fn on_scroll(&mut self, scroll_top: f64) {
        self.on_scroll_at(scroll_top, Instant::now());
    }

    /// [`on_scroll`](Self::on_scroll) with an explicit timestamp.
    pub fn on_scroll_at(&mut self, scroll_top: f64, now: Instant) {
        self.engine.on_scroll(scroll_top, now);
    }

    /// A wheel event reached the region. The outcome says whether the
    /// platform default must be prevented.
    pub fn on_wheel(&mut self, event: &WheelEvent) -> WheelOutcome {
        self.on_wheel_at(event, Instant::now())
    }

    /// [`on_wheel`](Self::on_wheel) with an explicit timestamp.
    pub fn on_wheel_at(&mut self, event: &WheelEvent, now: Instant) -> WheelOutcome {
        self.engine.on_wheel(event, now)
    }

    /// A touch drag moved by pixel deltas. Returns whether the region
    /// scrolled; `false` leaves the gesture to the platform.
    pub fn on_touch_move(&mut self, delta_x: f64, delta_y: f64) -> bool {
        self.on_touch_move_at(delta_x, delta_y, Instant::now())
    }

    /// [`on_touch_move`](Self::on_touch_move) with an explicit timestamp.
    pub fn on_touch_move_at(&mut self, delta_x: f64, delta_y: f64, now: Instant) -> bool {
        self.engine.on_touch_move(delta_x, delta_y, now)
    }

    /// The region, the elements container or an element changed size.
    /// Re-population runs on the next frame, or before the next scroll.
    pub fn on_resize(&mut self, resize: Resize) {
        self.engine.on_resize(resize);
    }

    /// Display refresh: run frame-debounced work.
    pub fn on_animation_frame(&mut self) {
        self.engine.on_animation_frame();
    }

    /// Run timer-debounced work whose delay has passed.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// [`tick`](Self::tick) with an explicit timestamp.
    pub fn tick_at(&mut self, now: Instant) {
        self.engine.tick(now);
    }

    /// A pointer button went down on the region (scrollbar drag). Element
    /// reordering waits until release.
    pub fn on_pointer_down(&mut self) {
        self.engine.pointer_down();
    }

    /// The pointer button was released; a deferred reorder runs now.
    pub fn on_pointer_up(&mut self) {
        self.engine.pointer_up();
    }

    /// Slot (by physical position) holding keyboard focus, kept in place
    /// when elements are reordered.
    pub fn set_focused_slot(&mut self, physical: Option<usize>) {
        self.engine.set_focused_slot(physical);
    }

    /// Horizontal content extent of the region.
    pub fn set_horizontal_extent(&mut self, scroll_width: f64) {
        self.engine.set_horizontal_extent(scroll_width);
    }

    // ------------------------------------------------------------------
    // Read-back
    // ------------------------------------------------------------------

    /// Scroll region state as decided by the virtualizer.
    #[must_use]
    pub fn region(&self) -> &ScrollRegion {
        self.engine.region()
    }

    /// Vertical scroll position to apply to the platform region.
    #[must_use]
    pub fn scroll_top(&self) -> f64 {
        self.engine.region().scroll_top()
    }

    /// Content extent to apply to the scroll container.
    #[must_use]
    pub fn content_extent(&self) -> f64 {
        self.engine.region().content_extent()
    }

    /// The slot pool.
    #[must_use]
    pub fn slots(&self) -> &SlotPool<H::Element> {
        self.engine.pool()
    }

    /// Slots currently showing an item, in document order.
    pub fn visible_slots(&self) -> impl Iterator<Item = &Slot<H::Element>> {
        self.engine.pool().visible_slots()
    }

    /// Every element in document order.
    pub fn elements_in_document_order(&self) -> impl Iterator<Item = &H::Element> {
        let pool = self.engine.pool();
        pool.document_order()
            .iter()
            .filter_map(move |&physical| pool.get(physical))
            .map(Slot::element)
    }

    /// Current index offset between virtual and logical indices.
    #[must_use]
    pub fn index_offset(&self) -> usize {
        self.engine.index_offset().offset()
    }

    /// Positions addressed by the windowing layer.
    #[must_use]
    pub fn virtual_count(&self) -> usize {
        self.engine.index_offset().virtual_count()
    }

    /// Extent used for elements that have not rendered yet.
    #[must_use]
    pub fn placeholder_extent(&self) -> f64 {
        self.engine.placeholder_extent()
    }

    /// Whether no deferred work is pending.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.engine.is_settled()
    }

    /// Time until the next timer-debounced task is due.
    #[must_use]
    pub fn time_until_next_tick(&self, now: Instant) -> Option<Duration> {
        self.engine.time_until_next_tick(now)
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &VirtualizerConfig {
        self.engine.config()
    }

    /// The host.
    #[must_use]
    pub fn host(&self) -> &H {
        self.engine.host()
    }

    /// The host, mutably. Changing what the host renders requires an
    /// [`update`](Self::update) afterwards.
    pub fn host_mut(&mut self) -> &mut H {
        self.engine.host_mut()
    }
}

impl<H: ElementHost> fmt::Debug for Virtualizer<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Virtualizer")
            .field("size", &self.size())
            .field("pool", &self.slots().len())
            .field("offset", &self.index_offset())
            .field("scroll_top", &self.scroll_top())
            .field("visible", &self.visible_range())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SimHost;
    use tracing_test::traced_test;

    fn rendered(size: usize, item: f64, viewport: f64) -> Virtualizer<SimHost> {
        let mut v = Virtualizer::with_defaults(SimHost::new(item));
        v.on_resize(Resize::ScrollTarget {
            width: 300.0,
            height: viewport,
        });
        v.set_size(size);
        v.flush();
        v
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = VirtualizerConfig::default().with_max_virtual_count(0);
        assert!(Virtualizer::new(SimHost::new(10.0), config).is_err());
    }

    #[test]
    fn same_size_is_noop() {
        let mut v = rendered(10, 50.0, 250.0);
        let updates = v.host().update_log().len();
        v.set_size(10);
        assert_eq!(v.host().update_log().len(), updates);
    }

    #[test]
    fn empty_collection_has_no_visible_range() {
        let mut v = rendered(10, 50.0, 250.0);
        v.set_size(0);
        assert_eq!(v.first_visible_index(), None);
        assert_eq!(v.last_visible_index(), None);
        assert_eq!(v.visible_slots().count(), 0);
        assert!(v.slots().len() > 0);
    }

    #[test]
    fn raw_index_edge_cases() {
        let mut v = rendered(100, 50.0, 250.0);
        v.scroll_to_index(40);
        let top = v.scroll_top();
        v.scroll_to_raw_index(f64::NAN);
        v.scroll_to_raw_index(f64::INFINITY);
        assert_eq!(v.scroll_top(), top);
        v.scroll_to_raw_index(-3.0);
        assert_eq!(v.first_visible_index(), Some(0));
        v.scroll_to_raw_index(20.7);
        assert_eq!(v.first_visible_index(), Some(20));
    }

    #[test]
    fn scroll_to_index_ignored_without_rendered_extent() {
        let mut v = Virtualizer::with_defaults(SimHost::new(50.0));
        v.set_size(100);
        v.scroll_to_index(50);
        v.flush();
        assert_eq!(v.scroll_top(), 0.0);
        assert_eq!(v.first_visible_index(), None);
    }

    #[test]
    fn update_refreshes_only_the_range() {
        let mut v = rendered(100, 50.0, 250.0);
        v.host_mut().clear_update_log();
        v.update(2..4);
        let indices: Vec<usize> = v.host().update_log().iter().map(|&(_, i)| i).collect();
        assert_eq!(indices, vec![2, 3]);
        v.host_mut().clear_update_log();
        v.update(..);
        assert_eq!(v.host().update_log().len(), v.visible_slots().count());
    }

    #[test]
    fn debug_is_compact() {
        let v = rendered(10, 50.0, 250.0);
        let text = format!("{v:?}");
        assert!(text.starts_with("Virtualizer"));
        assert!(text.contains("size: 10"));
    }

    #[traced_test]
    #[test]
    fn size_changes_and_pool_growth_are_logged() {
        let mut v = rendered(100, 50.0, 250.0);
        v.scroll_to_index(60);
        assert!(logs_contain("collection size changed"));
        assert!(logs_contain("slot pool grew"));
        assert!(logs_contain("scroll to index"));
    }
}
