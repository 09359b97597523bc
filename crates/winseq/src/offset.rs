#![forbid(unsafe_code)]

//! Translation between the bounded virtual index space and the logical one.
//!
//! The windowing primitive can only address `virtual_count` positions
//! (`min(logical_size, max_virtual_count)`). For larger collections an
//! additive `offset` slides that window across the logical range:
//! `logical = virtual + offset`, with `0 <= offset <= logical_size - virtual_count`.
//!
//! Keeping the offset right while the user scrolls is a hybrid:
//!
//! - exact reset at the scroll extremes, so the first and last logical items
//!   are always reachable,
//! - proportional recomputation for discontinuous jumps (scrollbar drags),
//! - small bounded nudges while the visible index sits in an edge band, with
//!   the caller counter-scrolling so the displayed content does not move.

use crate::config::VirtualizerConfig;

/// Thresholds steering offset adjustment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetTuning {
    /// Size of the virtual window.
    pub max_virtual_count: usize,
    /// Edge band width in virtual items.
    pub edge_band: usize,
    /// Largest offset change per nudge.
    pub max_shift: usize,
    /// Pixel delta above which a scroll counts as a jump.
    pub large_jump_threshold: f64,
}

impl Default for OffsetTuning {
    fn default() -> Self {
        Self::from(&VirtualizerConfig::default())
    }
}

impl From<&VirtualizerConfig> for OffsetTuning {
    fn from(config: &VirtualizerConfig) -> Self {
        Self {
            max_virtual_count: config.max_virtual_count,
            edge_band: config.offset_edge_band,
            max_shift: config.offset_max_shift,
            large_jump_threshold: config.large_jump_threshold,
        }
    }
}

/// Scroll facts sampled for one scroll event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSample {
    /// Signed pixel delta since the previous scroll event.
    pub delta: f64,
    /// Current scroll position.
    pub scroll_top: f64,
    /// Largest scroll position the window currently allows.
    pub max_scroll_top: f64,
    /// Total scrollable content extent.
    pub scroll_height: f64,
    /// Viewport extent.
    pub client_height: f64,
    /// First visible index in virtual space.
    pub first_visible: usize,
}

impl ScrollSample {
    /// Scroll position as a fraction of the scrollable range, in `[0, 1]`.
    #[must_use]
    pub fn scroll_fraction(&self) -> f64 {
        let range = self.scroll_height - self.client_height;
        if range <= 0.0 || !range.is_finite() {
            return 0.0;
        }
        (self.scroll_top / range).clamp(0.0, 1.0)
    }
}

/// What [`IndexOffset::adjust_for_scroll_delta`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetAdjustment {
    /// Offset kept its value.
    Unchanged,
    /// Adjustment was suppressed by a pending skip request.
    Skipped,
    /// Offset was recomputed proportionally; every slot must be reassigned.
    Rescaled,
    /// Offset moved; the window must be re-anchored at this virtual index so
    /// the displayed content stays put.
    Reanchor(usize),
}

/// Index-offset state for one virtualizer.
#[derive(Debug, Clone)]
pub struct IndexOffset {
    offset: usize,
    logical_size: usize,
    virtual_count: usize,
    skip_next: bool,
    tuning: OffsetTuning,
}

impl IndexOffset {
    /// Empty mapper.
    #[must_use]
    pub fn new(tuning: OffsetTuning) -> Self {
        Self {
            offset: 0,
            logical_size: 0,
            virtual_count: 0,
            skip_next: false,
            tuning,
        }
    }

    /// Current offset.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Authoritative collection size.
    #[must_use]
    pub fn logical_size(&self) -> usize {
        self.logical_size
    }

    /// Number of positions the window addresses.
    #[must_use]
    pub fn virtual_count(&self) -> usize {
        self.virtual_count
    }

    /// Largest legal offset.
    #[must_use]
    pub fn max_offset(&self) -> usize {
        self.logical_size - self.virtual_count
    }

    /// Whether the collection is larger than the virtual window.
    #[must_use]
    pub fn is_oversized(&self) -> bool {
        self.logical_size > self.virtual_count
    }

    /// Update the logical size. Small collections always get `offset == 0`;
    /// large ones keep their offset clamped to the new maximum.
    pub fn set_logical_size(&mut self, size: usize) {
        self.logical_size = size;
        self.virtual_count = size.min(self.tuning.max_virtual_count);
        if size <= self.virtual_count {
            self.offset = 0;
        } else {
            self.offset = self.offset.min(self.max_offset());
        }
    }

    /// Virtual to logical.
    #[must_use]
    pub fn to_logical(&self, virtual_index: usize) -> usize {
        virtual_index + self.offset
    }

    /// Logical to virtual, when the logical index falls inside the window.
    #[must_use]
    pub fn to_virtual(&self, logical_index: usize) -> Option<usize> {
        logical_index
            .checked_sub(self.offset)
            .filter(|&v| v < self.virtual_count)
    }

    /// Suppress the next scroll-driven adjustment. Used right after a
    /// programmatic scroll so the offset it chose is not second-guessed.
    pub fn skip_next_adjustment(&mut self) {
        self.skip_next = true;
    }

    /// Whether an adjustment skip is pending.
    #[must_use]
    pub fn skip_pending(&self) -> bool {
        self.skip_next
    }

    /// Place the offset so that `logical_index` can be shown, returning the
    /// virtual index the window should scroll to.
    ///
    /// Indices near the end pin the offset to its maximum and indices near
    /// the start keep the target inside the start edge band, leaving room for
    /// `visible_count` slots on either side. Everything else maps
    /// proportionally. The offset chosen here is protected from the next
    /// scroll adjustment.
    pub fn plan_scroll_to(&mut self, logical_index: usize, visible_count: usize) -> usize {
        if self.logical_size == 0 {
            return 0;
        }
        let index = logical_index.min(self.logical_size - 1);
        self.skip_next = true;
        if !self.is_oversized() {
            self.offset = 0;
            return index;
        }

        let vc = self.virtual_count;
        let proportional =
            usize::try_from(index as u128 * vc as u128 / self.logical_size as u128)
                .unwrap_or(vc - 1);
        let target = if vc - proportional < visible_count {
            index.saturating_sub(self.max_offset())
        } else if proportional < visible_count {
            index.min(self.tuning.edge_band)
        } else {
            proportional
        };
        self.offset = (index - target).min(self.max_offset());
        index - self.offset
    }

    /// React to one scroll event.
    pub fn adjust_for_scroll_delta(&mut self, sample: &ScrollSample) -> OffsetAdjustment {
        if !self.is_oversized() {
            self.offset = 0;
            return OffsetAdjustment::Unchanged;
        }
        if self.skip_next {
            self.skip_next = false;
            return OffsetAdjustment::Skipped;
        }

        let max_offset = self.max_offset();
        if sample.delta.abs() > self.tuning.large_jump_threshold {
            let scaled = (sample.scroll_fraction() * max_offset as f64).round();
            let next = if scaled <= 0.0 {
                0
            } else {
                (scaled as usize).min(max_offset)
            };
            let changed = next != self.offset;
            self.offset = next;
            tracing::debug!(offset = next, "index offset rescaled after scroll jump");
            return if changed {
                OffsetAdjustment::Rescaled
            } else {
                OffsetAdjustment::Unchanged
            };
        }

        let old = self.offset;
        let band = self.tuning.edge_band;
        let shift = self.tuning.max_shift;
        let first = sample.first_visible;

        if sample.scroll_top <= 0.0 {
            self.offset = 0;
            if old != 0 {
                return OffsetAdjustment::Reanchor(0);
            }
        } else if first < band && self.offset > 0 {
            self.offset -= self.offset.min(shift);
            return OffsetAdjustment::Reanchor(first + (old - self.offset));
        } else if sample.max_scroll_top > 0.0 && sample.scroll_top >= sample.max_scroll_top {
            self.offset = max_offset;
            if old != max_offset {
                return OffsetAdjustment::Reanchor(self.virtual_count - 1);
            }
        } else if first > self.virtual_count.saturating_sub(band) && self.offset < max_offset {
            self.offset += (max_offset - self.offset).min(shift);
            return OffsetAdjustment::Reanchor(first.saturating_sub(self.offset - old));
        }
        OffsetAdjustment::Unchanged
    }
}
