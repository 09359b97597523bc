#![forbid(unsafe_code)]

//! Windowing engine.
//!
//! Two layers share one struct:
//!
//! - the **windowing layer** recycles the ring of slots over the bounded
//!   virtual index space ([`WindowState`] holds the arithmetic),
//! - the **offset layer** slides that bounded space across the logical
//!   collection ([`IndexOffset`]) and owns everything the host sees in
//!   logical indices: `scroll_to_index`, size changes, placeholders, the
//!   reorder pass and wheel handling.
//!
//! All work happens synchronously inside the host's calls. Deferred work is
//! named in the [`Scheduler`] and runs from `on_animation_frame`, `tick` or
//! `flush`.

use std::collections::VecDeque;
use std::time::Duration;

use smallvec::SmallVec;
use tracing::{debug, debug_span, trace};
use web_time::Instant;

use crate::config::VirtualizerConfig;
use crate::gesture::{WheelEvent, WheelFilter, WheelOutcome};
use crate::host::ElementHost;
use crate::offset::{IndexOffset, OffsetAdjustment, OffsetTuning, ScrollSample};
use crate::pool::{Slot, SlotPool};
use crate::schedule::{Scheduler, Task};
use crate::viewport::{Resize, ScrollRegion};
use crate::window::{MIN_POOL, SlotSet, WindowState};

/// Measurements averaged into the placeholder extent.
const EXTENT_SAMPLES: usize = 10;
/// Upper bound on growth steps in one pool-growth pass.
const MAX_GROWTH_ROUNDS: usize = 32;
/// Upper bound on task rounds in one flush.
const MAX_FLUSH_ROUNDS: usize = 8;
/// Share of the hidden content kept rendered while recycling.
const RECYCLE_RATIO: f64 = 0.5;

type ItemSet = SmallVec<[(usize, usize); 32]>;

pub(crate) struct WindowEngine<H: ElementHost> {
    host: H,
    config: VirtualizerConfig,
    pool: SlotPool<H::Element>,
    window: WindowState,
    offset: IndexOffset,
    region: ScrollRegion,
    scheduler: Scheduler,
    wheel: WheelFilter,
    now: Instant,
    ratio: f64,
    placeholder_extent: f64,
    extent_samples: VecDeque<f64>,
    prevent_updates: bool,
    pending_scroll_index: Option<usize>,
    previous_scroll_top: f64,
    pointer_down: bool,
    pending_reorder: bool,
    focused_slot: Option<usize>,
}

impl<H: ElementHost> WindowEngine<H> {
    pub(crate) fn new(host: H, config: VirtualizerConfig) -> Self {
        let window = WindowState::new(config.max_pages);
        let offset = IndexOffset::new(OffsetTuning::from(&config));
        let wheel = WheelFilter::new(config.scroll_line_height);
        Self {
            host,
            pool: SlotPool::new(),
            window,
            offset,
            region: ScrollRegion::new(),
            scheduler: Scheduler::new(),
            wheel,
            now: Instant::now(),
            ratio: RECYCLE_RATIO,
            placeholder_extent: config.initial_placeholder_extent,
            extent_samples: VecDeque::with_capacity(EXTENT_SAMPLES),
            prevent_updates: false,
            pending_scroll_index: None,
            previous_scroll_top: 0.0,
            pointer_down: false,
            pending_reorder: false,
            focused_slot: None,
            config,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub(crate) fn host(&self) -> &H {
        &self.host
    }

    pub(crate) fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub(crate) fn config(&self) -> &VirtualizerConfig {
        &self.config
    }

    pub(crate) fn pool(&self) -> &SlotPool<H::Element> {
        &self.pool
    }

    pub(crate) fn region(&self) -> &ScrollRegion {
        &self.region
    }

    pub(crate) fn index_offset(&self) -> &IndexOffset {
        &self.offset
    }

    pub(crate) fn size(&self) -> usize {
        self.offset.logical_size()
    }

    pub(crate) fn placeholder_extent(&self) -> f64 {
        self.placeholder_extent
    }

    pub(crate) fn is_settled(&self) -> bool {
        self.scheduler.is_idle()
    }

    pub(crate) fn time_until_next_tick(&self, now: Instant) -> Option<Duration> {
        self.scheduler.time_until_next(now)
    }

    pub(crate) fn first_visible_index(&self) -> Option<usize> {
        if self.size() == 0 {
            return None;
        }
        self.window
            .first_visible(|p| self.pool.extent(p))
            .map(|v| self.offset.to_logical(v))
    }

    pub(crate) fn last_visible_index(&self) -> Option<usize> {
        if self.size() == 0 {
            return None;
        }
        let viewport = self.region.viewport_extent();
        self.window
            .last_visible(|p| self.pool.extent(p), viewport)
            .map(|v| self.offset.to_logical(v))
    }

    /// Viewport-relative position of the slot showing `index`, if rendered.
    fn index_scroll_offset(&self, index: usize) -> Option<f64> {
        let scroll_top = self.region.scroll_top();
        self.pool
            .visible_slots()
            .find(|slot| slot.index() == Some(index))
            .map(|slot| slot.offset() - scroll_top)
    }

    fn advance_clock(&mut self, now: Instant) {
        if now > self.now {
            self.now = now;
        }
    }

    // ------------------------------------------------------------------
    // Slot refresh
    // ------------------------------------------------------------------

    fn assign(&mut self, physical: usize, virtual_index: usize, force: bool) {
        let logical = self.offset.to_logical(virtual_index);
        let Some(slot) = self.pool.get_mut(physical) else {
            return;
        };
        slot.hidden = false;
        slot.virtual_index = Some(virtual_index);
        slot.logical_index = Some(logical);
        if !self.prevent_updates && (force || slot.last_updated != Some(logical)) {
            self.host.update_element(slot.element_mut(), logical);
            slot.last_updated = Some(logical);
        }
    }

    fn hide(&mut self, physical: usize) {
        if let Some(slot) = self.pool.get_mut(physical) {
            slot.hidden = true;
            slot.virtual_index = None;
            slot.logical_index = None;
            slot.placeholder = false;
            slot.extent = 0.0;
        }
    }

    /// Measure a slot. An element that has not rendered yet is padded to
    /// the placeholder extent and re-measured on the next frame.
    fn measure(&mut self, physical: usize) -> f64 {
        let Some(slot) = self.pool.get_mut(physical) else {
            return 0.0;
        };
        let measured = self.host.measure(slot.element());
        let extent = if measured > 0.0 && measured.is_finite() {
            slot.placeholder = false;
            if self.extent_samples.len() == EXTENT_SAMPLES {
                self.extent_samples.pop_front();
            }
            self.extent_samples.push_back(measured);
            let sum: f64 = self.extent_samples.iter().sum();
            self.placeholder_extent = (sum / self.extent_samples.len() as f64).round();
            measured
        } else {
            slot.placeholder = true;
            self.scheduler.schedule_frame(Task::ClearPlaceholders);
            self.placeholder_extent
        };
        slot.extent = extent;
        extent
    }

    /// Assign, refresh and measure `items`, folding the extents into the
    /// window metrics.
    fn refresh_items(&mut self, items: &[(usize, usize)], force: bool) {
        let virtual_count = self.window.virtual_count();
        let mut old_total = 0.0;
        let mut new_total = 0.0;
        let mut measured = 0;
        for &(physical, virtual_index) in items {
            old_total += self.pool.extent(physical);
            if virtual_index < virtual_count {
                self.assign(physical, virtual_index, force);
                let extent = self.measure(physical);
                new_total += extent;
                if extent > 0.0 {
                    measured += 1;
                }
            } else {
                self.hide(physical);
            }
        }
        self.window.record_metrics(old_total, new_total, measured);
    }

    fn ring_items(&self) -> ItemSet {
        self.window.ring().collect()
    }

    /// Refresh `set` (or the whole ring), then lay the ring out again.
    /// `moving_up` slots were prepended and push `physical_top` up.
    fn update_items(&mut self, set: Option<&[usize]>, moving_up: bool) {
        let items: ItemSet = match set {
            Some(slots) => slots
                .iter()
                .map(|&physical| (physical, self.window.virtual_of(physical)))
                .collect(),
            None => self.ring_items(),
        };
        self.refresh_items(&items, false);
        if moving_up && let Some(slots) = set {
            let moved: f64 = slots.iter().map(|&p| self.pool.extent(p)).sum();
            self.window.set_physical_top(self.window.physical_top() - moved);
        }
        self.position_items();
        self.sync_scroller_size(false);
    }

    fn position_items(&mut self) {
        let correction = self.window.scroll_correction();
        if correction != 0.0 {
            let scroll_top = self.region.scroll_top();
            if scroll_top > 0.0 {
                self.reset_scroll_position(scroll_top - correction);
            }
        }
        let mut y = self.window.physical_top();
        for (physical, _) in self.window.ring() {
            if let Some(slot) = self.pool.get_mut(physical) {
                slot.offset = y;
                y += slot.extent;
            }
        }
    }

    fn sync_scroller_size(&mut self, force: bool) {
        let viewport = self.region.viewport_extent();
        if let Some(extent) = self.window.estimate_scroll_height(force, viewport) {
            self.region.set_content_extent(extent);
        }
    }

    /// Move the scroll position without treating it as user input.
    fn reset_scroll_position(&mut self, position: f64) {
        if position >= 0.0 {
            let applied = self.region.set_scroll_top(position);
            self.window.set_scroll_position(applied);
        }
    }

    // ------------------------------------------------------------------
    // Pool growth
    // ------------------------------------------------------------------

    fn grow_pool(&mut self, target: usize) -> usize {
        let host = &mut self.host;
        let added = self
            .pool
            .ensure_capacity(target, |missing| host.create_elements(missing));
        for physical in added.clone() {
            if let Some(slot) = self.pool.get(physical) {
                self.host.observe(slot.element());
            }
        }
        self.window.set_physical_count(self.pool.len());
        if !added.is_empty() {
            debug!(
                added = added.len(),
                pool = self.pool.len(),
                "slot pool grew"
            );
        }
        added.len()
    }

    /// Grow the pool until the rendered slots cover the optimal extent or
    /// every virtual index is rendered. Republishes the content extent when
    /// slots were added.
    fn increase_pool_if_needed(&mut self, count: usize) {
        if self.grow_until_covered(count) {
            self.sync_scroller_size(true);
        }
    }

    fn grow_until_covered(&mut self, count: usize) -> bool {
        let mut request = count;
        let mut grew = false;
        for _ in 0..MAX_GROWTH_ROUNDS {
            let viewport = self.region.viewport_extent();
            let optimal = self.window.opt_physical_size(viewport);
            let current = self.window.physical_count();
            let average = self.window.average();
            if current > 2 && request > 0 && average > 0.0 {
                let wanted = (optimal / average).ceil() as usize;
                let missing = wanted.saturating_sub(current);
                request = request.max(missing.min(self.config.max_pool_growth_step));
            }
            let limit = self
                .window
                .virtual_count()
                .saturating_sub(self.window.virtual_start());
            let next = (current + request).max(MIN_POOL).min(limit);
            if next < current {
                break;
            }
            if next > current {
                if self.grow_pool(next) == 0 {
                    break;
                }
                grew = true;
                self.update_items(None, false);
            }

            let current = self.window.physical_count();
            let next_increase = (current as f64 * 0.5).round() as usize;
            if self.window.virtual_end() + 1 >= self.window.virtual_count() || next_increase == 0 {
                break;
            }
            let size = self.window.physical_size();
            if size >= 2.0 * optimal {
                break;
            }
            if !self.window.is_client_full(viewport) || size < optimal {
                request = next_increase;
            } else {
                break;
            }
        }
        grew
    }

    // ------------------------------------------------------------------
    // Windowing layer
    // ------------------------------------------------------------------

    /// Full re-population pass.
    fn render(&mut self) {
        if !self.region.is_rendered() {
            return;
        }
        if self.window.physical_count() > 0 {
            let viewport = self.region.viewport_extent();
            let reusables = self
                .window
                .reusables(|p| self.pool.extent(p), true, self.ratio, viewport);
            self.window.set_physical_top(reusables.physical_top);
            self.window.shift(reusables.slots.len() as isize);
            self.update_items(Some(reusables.slots.as_slice()), false);
            self.update_items(None, false);
            self.increase_pool_if_needed(0);
        } else if self.window.virtual_count() > 0 {
            self.increase_pool_if_needed(MIN_POOL);
        }
    }

    /// Recycle slots for the current scroll position.
    fn window_scroll(&mut self) {
        let viewport = self.region.viewport_extent();
        let scroll_top = self.region.scroll_top();
        let delta = scroll_top - self.window.scroll_position();
        self.window.set_scroll_position(scroll_top);

        let physical_size = self.window.physical_size();
        if delta.abs() > physical_size && physical_size > 0.0 && self.window.average() > 0.0 {
            trace!(delta, "scroll jump, reassigning every slot");
            self.window.jump(delta);
            self.update_items(None, false);
        } else if self.window.physical_count() > 0 {
            let down = delta >= 0.0;
            let reusables = self
                .window
                .reusables(|p| self.pool.extent(p), down, self.ratio, viewport);
            let moved = reusables.slots.len() as isize;
            if down {
                self.window.set_physical_top(reusables.physical_top);
                self.window.shift(moved);
            } else {
                self.window.shift(-moved);
            }
            if moved > 0 {
                trace!(moved, down, "recycled slots");
            }
            self.update_items(Some(reusables.slots.as_slice()), !down);
            self.increase_pool_if_needed(0);
        }
    }

    /// Show virtual `index` as close to the top of the viewport as the
    /// rendered pool allows.
    fn scroll_to_virtual(&mut self, index: usize) {
        let count = self.window.physical_count();
        let virtual_count = self.window.virtual_count();
        if count == 0 || virtual_count == 0 {
            return;
        }
        let index = index.min(virtual_count - 1);
        if !self.window.is_index_rendered(index) || index >= self.window.max_virtual_start() {
            self.window.set_virtual_start(index.saturating_sub(1));
        }
        let items = self.ring_items();
        self.refresh_items(&items, false);
        self.window
            .set_physical_top(self.window.virtual_start() as f64 * self.window.average());

        let hidden = self
            .window
            .hidden_content_size(self.region.viewport_extent());
        let mut target_offset = 0.0;
        let mut physical = self.window.physical_start();
        let mut current = self.window.virtual_start();
        while current < index && target_offset <= hidden {
            target_offset += self.pool.extent(physical);
            physical = (physical + 1) % count;
            current += 1;
        }

        self.sync_scroller_size(true);
        self.position_items();
        self.reset_scroll_position(self.window.physical_top() + target_offset);
        self.increase_pool_if_needed(0);
    }

    // ------------------------------------------------------------------
    // Offset layer
    // ------------------------------------------------------------------

    fn process_scroll(&mut self) {
        if !self.region.is_rendered() {
            return;
        }
        let scroll_top = self.region.scroll_top();
        let sample = ScrollSample {
            delta: scroll_top - self.previous_scroll_top,
            scroll_top,
            max_scroll_top: self.region.max_scroll_top(),
            scroll_height: self.region.content_extent(),
            client_height: self.region.viewport_extent(),
            first_visible: self
                .window
                .first_visible(|p| self.pool.extent(p))
                .unwrap_or(0),
        };
        let adjustment = self.offset.adjust_for_scroll_delta(&sample);
        if let OffsetAdjustment::Reanchor(target) = adjustment {
            debug!(offset = self.offset.offset(), target, "index offset nudged");
            self.scroll_to_virtual(target);
        }

        let delta = self.region.scroll_top() - self.window.scroll_position();
        self.window_scroll();
        if adjustment == OffsetAdjustment::Rescaled {
            self.update_items(None, false);
        }

        if self.config.reorder_elements {
            self.scheduler
                .schedule_after(Task::Reorder, self.config.reorder_delay, self.now);
        }
        self.scheduler.schedule_after(
            Task::FixPositioning,
            self.config.fix_positioning_delay,
            self.now,
        );
        self.previous_scroll_top = self.region.scroll_top();

        if self.region.scroll_top() == 0.0
            && delta != 0.0
            && self.first_visible_index() != Some(0)
        {
            debug!("scrolled to the top with a stale window, re-anchoring at 0");
            self.scroll_to_index(0);
        }
    }

    /// Run the scroll handler if the region moved since the last pass.
    fn sync_scroll(&mut self) {
        if self.region.is_rendered() && self.region.scroll_top() != self.window.scroll_position() {
            self.process_scroll();
        }
    }

    pub(crate) fn scroll_to_index(&mut self, index: usize) {
        let size = self.size();
        if size == 0 || !self.region.is_rendered() {
            return;
        }
        self.pending_scroll_index = None;
        if self.window.physical_count() <= MIN_POOL {
            self.scheduler.cancel(Task::Resize);
            self.run_resize();
        }
        let index = index.min(size - 1);
        let visible = self.pool.visible_slots().count();
        let target = self.offset.plan_scroll_to(index, visible);
        debug!(index, target, offset = self.offset.offset(), "scroll to index");

        self.scroll_to_virtual(target);
        self.snap_to_exact_index(index);
        self.process_scroll();

        if self.pool.has_placeholders() {
            self.pending_scroll_index = Some(index);
        }
    }

    /// Correct the windowing layer's rounding: if `index` did not end up
    /// first in the viewport and the region can still scroll, bring its slot
    /// to the top. The following scroll pass applies the move.
    fn snap_to_exact_index(&mut self, index: usize) {
        if self.first_visible_index() == Some(index)
            || self.region.scroll_top() >= self.region.max_scroll_top()
        {
            return;
        }
        if let Some(relative) = self.index_scroll_offset(index) {
            let top = self.region.scroll_top() + relative;
            self.region.set_scroll_top(top);
        }
    }

    pub(crate) fn set_size(&mut self, size: usize) {
        let old = self.size();
        if size == old {
            return;
        }
        debug!(old, size, "collection size changed");
        self.scheduler.cancel(Task::FixPositioning);
        let anchor = if size > 0 {
            self.first_visible_index()
                .map(|index| (index, self.index_scroll_offset(index)))
        } else {
            None
        };

        self.prevent_updates = true;
        self.offset.set_logical_size(size);
        let virtual_count = self.offset.virtual_count();
        self.window.items_changed(virtual_count);
        self.pool.hide_slots_beyond(virtual_count);
        self.reset_scroll_position(0.0);
        self.render();

        if size > 0 {
            let (index, before) = anchor.map_or((0, None), |(index, before)| {
                (index.min(size - 1), before)
            });
            self.scroll_to_index(index);
            if let (Some(before), Some(after)) = (before, self.index_scroll_offset(index)) {
                let top = self.region.scroll_top() + after - before;
                self.region.set_scroll_top(top);
            }
        }
        self.prevent_updates = false;
        self.run_resize();
        self.sync_scroll();
    }

    pub(crate) fn update(&mut self, start: usize, end: usize) {
        let items: ItemSet = self
            .pool
            .visible_slots()
            .filter(|slot| slot.index().is_some_and(|i| start <= i && i <= end))
            .filter_map(|slot| Some((slot.physical_position(), slot.virtual_index?)))
            .collect();
        if items.is_empty() {
            return;
        }
        trace!(start, end, slots = items.len(), "forced slot refresh");
        self.refresh_items(&items, true);
        self.position_items();
        self.sync_scroller_size(false);
    }

    fn run_resize(&mut self) {
        if !self.region.is_rendered() {
            return;
        }
        self.wheel
            .set_viewport_extent(self.region.viewport_extent());
        self.window.reset_average();
        self.render();
        self.repair_bottom_gap();
        if let Some(index) = self.pending_scroll_index
            && !self.pool.has_placeholders()
        {
            self.scroll_to_index(index);
        }
    }

    /// Slots shrank while the last item was on screen: pull the window down
    /// so the viewport ends at the last item instead of empty space.
    fn repair_bottom_gap(&mut self) {
        let size = self.size();
        if size == 0 || self.last_visible_index() != Some(size - 1) {
            return;
        }
        let empty = self.window.physical_top() - self.window.scroll_position();
        let average = self.window.average();
        if empty <= 0.0 || average <= 0.0 {
            return;
        }
        debug!(empty, "closing gap above the last item");
        self.window.shift(-((empty / average).ceil() as isize));
        self.scroll_to_virtual(self.window.virtual_count() - 1);
        self.reset_scroll_position(self.region.max_scroll_top());
    }

    fn fix_invalid_item_positioning(&mut self) {
        let size = self.size();
        if size == 0 || !self.region.is_rendered() {
            return;
        }
        let scroll_top = self.region.scroll_top();
        let scroll_bottom = scroll_top + self.region.viewport_extent();
        let top_gap = self.window.physical_top() > scroll_top;
        let bottom_gap = self.window.physical_bottom() < scroll_bottom;
        let first_shown = self.first_visible_index() == Some(0);
        let last_shown = self.last_visible_index() == Some(size - 1);
        if (top_gap && !first_shown) || (bottom_gap && !last_shown) {
            debug!(top_gap, bottom_gap, "closing gap between slots and viewport");
            let nudge = if bottom_gap { -1.0 } else { 1.0 };
            let ratio = self.ratio;
            self.ratio = 0.0;
            self.window.set_scroll_position(scroll_top + nudge);
            self.window_scroll();
            self.ratio = ratio;
        }
    }

    /// Bring document order back in line with visual order, keeping the
    /// focused (or first visible) element where it is.
    fn reorder_elements(&mut self) {
        if self.pointer_down {
            self.pending_reorder = true;
            return;
        }
        self.pending_reorder = false;

        let visible: SlotSet = self
            .pool
            .visible_slots()
            .map(Slot::physical_position)
            .collect();
        let Some(&first) = visible.first() else {
            return;
        };
        let target = self
            .focused_slot
            .filter(|physical| visible.contains(physical))
            .unwrap_or(first);
        let Some(target_index) = self.pool.get(target).and_then(Slot::index) else {
            return;
        };
        let adjusted_start = self.offset.to_logical(self.window.virtual_start());
        let position = visible.iter().position(|&p| p == target).unwrap_or(0) as isize;
        let delta = position - (target_index as isize - adjusted_start as isize);

        if delta > 0 {
            let end = (delta as usize).min(visible.len());
            for &physical in &visible[..end] {
                self.pool.move_to_end(physical);
            }
        } else if delta < 0 {
            let start = visible.len().saturating_sub(delta.unsigned_abs());
            for &physical in &visible[start..] {
                self.pool.move_before(physical, first);
            }
        }
        if delta != 0 {
            debug!(delta, "reordered elements to match visual order");
        }
    }

    // ------------------------------------------------------------------
    // Host events
    // ------------------------------------------------------------------

    fn settle_pending_resize(&mut self) {
        if self.scheduler.cancel(Task::Resize) {
            self.run_resize();
        }
    }

    pub(crate) fn on_scroll(&mut self, scroll_top: f64, now: Instant) {
        self.advance_clock(now);
        self.settle_pending_resize();
        self.region.set_scroll_top(scroll_top);
        self.process_scroll();
    }

    pub(crate) fn on_wheel(&mut self, event: &WheelEvent, now: Instant) -> WheelOutcome {
        self.advance_clock(now);
        self.wheel
            .set_viewport_extent(self.region.viewport_extent());
        let outcome = self.wheel.filter(event, self.region.scroll_box());
        if outcome.opens_frame() {
            self.scheduler.schedule_frame(Task::WheelFrame);
        }
        if let WheelOutcome::Apply { delta_x, delta_y } = outcome {
            self.scheduler
                .schedule_after(Task::IgnoreWheel, self.config.ignore_wheel_delay, self.now);
            self.settle_pending_resize();
            let left = self.region.scroll_box().scroll_left + delta_x;
            let top = self.region.scroll_top() + delta_y;
            self.region.set_scroll_left(left);
            self.region.set_scroll_top(top);
            self.process_scroll();
        }
        trace!(?outcome, "wheel event");
        outcome
    }

    /// Touch drag by pixel deltas. Returns `false` when the region has no
    /// room in that direction and the platform should pass it on.
    pub(crate) fn on_touch_move(&mut self, delta_x: f64, delta_y: f64, now: Instant) -> bool {
        self.advance_clock(now);
        if !self.region.scroll_box().can_scroll(delta_x, delta_y) {
            trace!(delta_y, "touch move released");
            return false;
        }
        self.settle_pending_resize();
        let left = self.region.scroll_box().scroll_left + delta_x;
        let top = self.region.scroll_top() + delta_y;
        self.region.set_scroll_left(left);
        self.region.set_scroll_top(top);
        self.process_scroll();
        true
    }

    pub(crate) fn on_resize(&mut self, resize: Resize) {
        self.region.apply_resize(resize);
        self.wheel
            .set_viewport_extent(self.region.viewport_extent());
        self.scheduler.schedule_frame(Task::Resize);
    }

    pub(crate) fn set_horizontal_extent(&mut self, scroll_width: f64) {
        self.region.set_horizontal_extent(scroll_width);
    }

    pub(crate) fn pointer_down(&mut self) {
        self.pointer_down = true;
    }

    pub(crate) fn pointer_up(&mut self) {
        self.pointer_down = false;
        if self.pending_reorder {
            self.reorder_elements();
        }
    }

    pub(crate) fn set_focused_slot(&mut self, physical: Option<usize>) {
        self.focused_slot = physical;
    }

    // ------------------------------------------------------------------
    // Deferred work
    // ------------------------------------------------------------------

    fn run_task(&mut self, task: Task) {
        trace!(?task, "running deferred task");
        match task {
            Task::Resize | Task::ClearPlaceholders => self.run_resize(),
            Task::FixPositioning => self.fix_invalid_item_positioning(),
            Task::Reorder => self.reorder_elements(),
            Task::WheelFrame => self.wheel.end_frame(),
            Task::IgnoreWheel => self.wheel.end_ignore_window(),
        }
    }

    pub(crate) fn on_animation_frame(&mut self) {
        for task in self.scheduler.take_frame() {
            self.run_task(task);
        }
    }

    pub(crate) fn tick(&mut self, now: Instant) {
        self.advance_clock(now);
        for task in self.scheduler.take_due(self.now) {
            self.run_task(task);
        }
    }

    /// Run everything pending, in dependency order, until nothing is left.
    pub(crate) fn flush(&mut self) {
        let _span = debug_span!("flush").entered();
        for _ in 0..MAX_FLUSH_ROUNDS {
            self.settle_pending_resize();
            self.sync_scroll();
            let batch = self.scheduler.take_all();
            if batch.is_empty() {
                return;
            }
            for task in batch {
                self.run_task(task);
            }
        }
    }
}
