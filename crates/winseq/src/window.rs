#![forbid(unsafe_code)]

//! Ring-buffer layout of the slot pool.
//!
//! The pool is treated as a ring: the slot at `physical_start` shows
//! `virtual_start`, the next slot (mod pool size) shows `virtual_start + 1`,
//! and so on. Scrolling moves slots from one end of the ring to the other by
//! advancing both starts, so recycling never moves more than the slots that
//! actually left the viewport.
//!
//! Everything here is pixel and index arithmetic. Slot extents are passed in
//! as a lookup so this module never touches elements.

use smallvec::SmallVec;

/// Smallest pool the engine builds once there is anything to show.
pub(crate) const MIN_POOL: usize = 3;

/// Physical positions selected for one recycling step.
pub(crate) type SlotSet = SmallVec<[usize; 16]>;

/// Slots that can move to the other end of the ring.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Reusables {
    /// Physical positions, in the order they leave their end of the ring.
    pub(crate) slots: SlotSet,
    /// Position of the first slot once they moved (meaningful when recycling
    /// from the top).
    pub(crate) physical_top: f64,
}

/// Layout state of the windowing primitive.
#[derive(Debug, Clone)]
pub(crate) struct WindowState {
    physical_start: usize,
    physical_count: usize,
    virtual_start: usize,
    virtual_count: usize,
    physical_top: f64,
    physical_size: f64,
    average: f64,
    average_count: usize,
    scroll_height: f64,
    scroll_position: f64,
    max_pages: f64,
}

impl WindowState {
    pub(crate) fn new(max_pages: f64) -> Self {
        Self {
            physical_start: 0,
            physical_count: 0,
            virtual_start: 0,
            virtual_count: 0,
            physical_top: 0.0,
            physical_size: 0.0,
            average: 0.0,
            average_count: 0,
            scroll_height: 0.0,
            scroll_position: 0.0,
            max_pages,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub(crate) fn physical_start(&self) -> usize {
        self.physical_start
    }

    pub(crate) fn physical_count(&self) -> usize {
        self.physical_count
    }

    pub(crate) fn virtual_start(&self) -> usize {
        self.virtual_start
    }

    pub(crate) fn virtual_count(&self) -> usize {
        self.virtual_count
    }

    pub(crate) fn physical_top(&self) -> f64 {
        self.physical_top
    }

    pub(crate) fn set_physical_top(&mut self, top: f64) {
        self.physical_top = top;
    }

    pub(crate) fn physical_size(&self) -> f64 {
        self.physical_size
    }

    pub(crate) fn physical_bottom(&self) -> f64 {
        self.physical_top + self.physical_size
    }

    /// Running average of measured slot extents.
    pub(crate) fn average(&self) -> f64 {
        self.average
    }

    pub(crate) fn scroll_position(&self) -> f64 {
        self.scroll_position
    }

    pub(crate) fn set_scroll_position(&mut self, position: f64) {
        self.scroll_position = position;
    }

    /// Last virtual index the ring would cover, rendered or not.
    pub(crate) fn virtual_end(&self) -> usize {
        (self.virtual_start + self.physical_count).saturating_sub(1)
    }

    fn physical_end(&self) -> usize {
        (self.physical_start + self.physical_count - 1) % self.physical_count
    }

    pub(crate) fn max_virtual_start(&self) -> usize {
        self.virtual_count.saturating_sub(self.physical_count)
    }

    // ------------------------------------------------------------------
    // Ring bookkeeping
    // ------------------------------------------------------------------

    /// Start over for a collection of `virtual_count` positions.
    pub(crate) fn items_changed(&mut self, virtual_count: usize) {
        self.virtual_count = virtual_count;
        self.virtual_start = 0;
        self.physical_start = 0;
        self.physical_top = 0.0;
    }

    /// The pool grew to `count` slots.
    pub(crate) fn set_physical_count(&mut self, count: usize) {
        self.physical_count = count;
        if count > 0 {
            self.physical_start %= count;
        } else {
            self.physical_start = 0;
        }
        self.virtual_start = self.virtual_start.min(self.max_virtual_start());
    }

    /// Point the ring at `virtual_start`, clamped so the ring never runs
    /// past the last virtual index.
    pub(crate) fn set_virtual_start(&mut self, virtual_start: usize) {
        self.virtual_start = virtual_start.min(self.max_virtual_start());
    }

    /// Rotate the ring by `n` slots (negative moves toward the start).
    pub(crate) fn shift(&mut self, n: isize) {
        let max = self.max_virtual_start() as isize;
        self.virtual_start = (self.virtual_start as isize).saturating_add(n).clamp(0, max) as usize;
        if self.physical_count > 0 {
            let count = self.physical_count as isize;
            self.physical_start = (self.physical_start as isize + n).rem_euclid(count) as usize;
        }
    }

    /// Every slot of the ring with the virtual index it stands for, in
    /// visual order. Indices at or past `virtual_count` belong to slots that
    /// must stay hidden.
    pub(crate) fn ring(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let count = self.physical_count;
        (0..count).map(move |k| ((self.physical_start + k) % count, self.virtual_start + k))
    }

    /// Slots that show an item, in visual order.
    pub(crate) fn rendered(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.ring().take_while(|&(_, v)| v < self.virtual_count)
    }

    /// Virtual index shown by the slot at `physical`.
    pub(crate) fn virtual_of(&self, physical: usize) -> usize {
        if physical >= self.physical_start {
            self.virtual_start + (physical - self.physical_start)
        } else {
            self.virtual_start + (self.physical_count - self.physical_start) + physical
        }
    }

    pub(crate) fn is_index_rendered(&self, virtual_index: usize) -> bool {
        virtual_index >= self.virtual_start && virtual_index <= self.virtual_end()
    }

    // ------------------------------------------------------------------
    // Metrics
    // ------------------------------------------------------------------

    /// Content the pool renders beyond one viewport.
    pub(crate) fn hidden_content_size(&self, viewport: f64) -> f64 {
        self.physical_size - viewport
    }

    /// Rendered extent the pool aims for.
    pub(crate) fn opt_physical_size(&self, viewport: f64) -> f64 {
        viewport * self.max_pages
    }

    /// Whether the rendered slots cover the whole viewport.
    pub(crate) fn is_client_full(&self, viewport: f64) -> bool {
        let scroll_bottom = self.scroll_position + viewport;
        scroll_bottom != 0.0
            && self.physical_bottom() - 1.0 >= scroll_bottom
            && self.physical_top <= self.scroll_position
    }

    pub(crate) fn reset_average(&mut self) {
        self.average = 0.0;
        self.average_count = 0;
    }

    /// Fold one measurement pass into the totals. `measured` counts the
    /// slots that reported a non-zero extent.
    pub(crate) fn record_metrics(&mut self, old_total: f64, new_total: f64, measured: usize) {
        self.physical_size += new_total - old_total;
        if measured > 0 {
            let previous = self.average_count as f64;
            self.average_count += measured;
            self.average =
                ((self.average * previous + new_total) / self.average_count as f64).round();
        }
    }

    /// Re-estimate the full content extent. Returns the new extent when the
    /// scroll container should be resized: on request, on first layout, near
    /// the estimated end, or once the estimate drifted by a viewport.
    pub(crate) fn estimate_scroll_height(&mut self, force: bool, viewport: f64) -> Option<f64> {
        let remaining = self
            .virtual_count
            .saturating_sub(self.physical_count + self.virtual_start);
        let estimate = self.physical_bottom() + remaining as f64 * self.average;
        if force
            || self.scroll_height == 0.0
            || self.scroll_position >= estimate - self.physical_size
            || (estimate - self.scroll_height).abs() >= viewport
        {
            self.scroll_height = estimate;
            Some(estimate)
        } else {
            None
        }
    }

    /// Keep the first item at the very top of the content. Returns the
    /// correction applied to `physical_top`; the caller scrolls by the same
    /// amount so the viewport content does not move.
    pub(crate) fn scroll_correction(&mut self) -> f64 {
        let delta = if self.virtual_start == 0 {
            self.physical_top
        } else {
            (self.scroll_position + self.physical_top).min(0.0)
        };
        if delta != 0.0 {
            self.physical_top -= delta;
        }
        delta
    }

    /// Re-estimate the ring position after a scroll larger than the whole
    /// pool. Every slot must be reassigned afterwards.
    pub(crate) fn jump(&mut self, delta: f64) {
        let shift = (delta / self.average).round() as isize;
        self.shift(shift);
        self.physical_top = (self.virtual_start as f64 * self.average).min(self.scroll_position);
    }

    /// Slots that left the viewport far enough to move to the other end.
    ///
    /// `from_top` collects slots above the viewport (scrolling down). A
    /// protected margin of `ratio` times the hidden content stays rendered on
    /// the side being emptied.
    pub(crate) fn reusables(
        &self,
        extent: impl Fn(usize) -> f64,
        from_top: bool,
        ratio: f64,
        viewport: f64,
    ) -> Reusables {
        let mut slots = SlotSet::new();
        let count = self.physical_count;
        if count == 0 {
            return Reusables {
                slots,
                physical_top: self.physical_top,
            };
        }
        let protected = self.hidden_content_size(viewport) * ratio;
        let scroll_top = self.scroll_position;
        let scroll_bottom = scroll_top + viewport;
        let mut top = self.physical_top;
        let (mut ith, mut offset_content) = if from_top {
            (self.physical_start, scroll_top - top)
        } else {
            (self.physical_end(), self.physical_bottom() - scroll_bottom)
        };

        loop {
            let item = extent(ith);
            offset_content -= item;
            if slots.len() >= count || offset_content <= protected {
                break;
            }
            if from_top {
                if self.virtual_end() + slots.len() + 1 >= self.virtual_count {
                    break;
                }
                if top + item >= scroll_top {
                    break;
                }
                slots.push(ith);
                top += item;
                ith = (ith + 1) % count;
            } else {
                if self.virtual_start <= slots.len() {
                    break;
                }
                if top + self.physical_size - item <= scroll_bottom {
                    break;
                }
                slots.push(ith);
                top -= item;
                ith = if ith == 0 { count - 1 } else { ith - 1 };
            }
        }
        Reusables {
            slots,
            physical_top: top,
        }
    }

    // ------------------------------------------------------------------
    // Visible range
    // ------------------------------------------------------------------

    /// First virtual index whose slot reaches below the scroll position.
    pub(crate) fn first_visible(&self, extent: impl Fn(usize) -> f64) -> Option<usize> {
        let mut offset = self.physical_top;
        let mut last = None;
        for (physical, virtual_index) in self.rendered() {
            offset += extent(physical);
            if offset > self.scroll_position {
                return Some(virtual_index);
            }
            last = Some(virtual_index);
        }
        last
    }

    /// Last virtual index whose slot starts above the viewport bottom.
    pub(crate) fn last_visible(&self, extent: impl Fn(usize) -> f64, viewport: f64) -> Option<usize> {
        let scroll_bottom = self.scroll_position + viewport;
        let mut offset = self.physical_top;
        let mut found = None;
        let mut first = None;
        for (physical, virtual_index) in self.rendered() {
            first.get_or_insert(virtual_index);
            if offset < scroll_bottom {
                found = Some(virtual_index);
            }
            offset += extent(physical);
        }
        found.or(first)
    }
}
