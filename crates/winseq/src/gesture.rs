#![forbid(unsafe_code)]

//! Wheel input filtering.
//!
//! Raw wheel events are decided here before they reach the scroll region:
//!
//! - a scrollable ancestor between the event target and the region, with room
//!   left in the wheel direction, gets the event instead (no scroll capture),
//! - line and page deltas are normalized to pixels,
//! - deltas arriving while a frame is pending are coalesced and applied in
//!   one step on the next event after the frame,
//! - a flick that runs out of room keeps swallowing its decaying momentum
//!   instead of leaking it to the page.
//!
//! The filter is a pure state machine. The engine applies the resulting
//! scroll and arms the frame and ignore-window timers.

use crate::viewport::ScrollBox;
use smallvec::SmallVec;

/// Unit of a wheel delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeltaMode {
    /// Pixels.
    #[default]
    Pixel,
    /// Lines; multiplied by the scroll line height.
    Line,
    /// Pages; multiplied by the viewport minus one line.
    Page,
}

/// One wheel event as seen by the scroll region.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WheelEvent {
    /// Horizontal delta.
    pub delta_x: f64,
    /// Vertical delta.
    pub delta_y: f64,
    /// Unit of both deltas.
    pub delta_mode: DeltaMode,
    /// Ctrl held (browser zoom gesture).
    pub ctrl_key: bool,
    /// Elements between the event target and the scroll region, innermost first.
    pub ancestors: SmallVec<[ScrollBox; 4]>,
}

impl WheelEvent {
    /// Pixel-mode event.
    #[must_use]
    pub fn pixels(delta_x: f64, delta_y: f64) -> Self {
        Self {
            delta_x,
            delta_y,
            ..Self::default()
        }
    }

    /// Line-mode vertical event.
    #[must_use]
    pub fn lines(delta_y: f64) -> Self {
        Self {
            delta_y,
            delta_mode: DeltaMode::Line,
            ..Self::default()
        }
    }

    /// Page-mode vertical event.
    #[must_use]
    pub fn pages(delta_y: f64) -> Self {
        Self {
            delta_y,
            delta_mode: DeltaMode::Page,
            ..Self::default()
        }
    }

    /// Add an ancestor on the path to the scroll region.
    #[must_use]
    pub fn with_ancestor(mut self, ancestor: ScrollBox) -> Self {
        self.ancestors.push(ancestor);
        self
    }

    /// Mark the ctrl key as held.
    #[must_use]
    pub fn with_ctrl(mut self) -> Self {
        self.ctrl_key = true;
        self
    }
}

/// Decision for one wheel event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WheelOutcome {
    /// Ctrl+wheel; left to the platform.
    Zoom,
    /// A scrollable ancestor takes the event.
    Yield,
    /// Accumulated into the pending frame; default prevented.
    Coalesced,
    /// Scroll the region by these pixel deltas; default prevented.
    Apply {
        /// Horizontal pixels.
        delta_x: f64,
        /// Vertical pixels.
        delta_y: f64,
    },
    /// Residual momentum swallowed; default prevented.
    Suppressed,
    /// The region cannot scroll and the input is fresh; left to the platform.
    Release,
}

impl WheelOutcome {
    /// Whether the platform default action must be prevented.
    #[must_use]
    pub fn prevents_default(&self) -> bool {
        matches!(
            self,
            Self::Coalesced | Self::Apply { .. } | Self::Suppressed
        )
    }

    /// Whether this event opened a coalescing frame.
    #[must_use]
    pub fn opens_frame(&self) -> bool {
        matches!(self, Self::Apply { .. } | Self::Suppressed | Self::Release)
    }
}

/// Wheel filter state for one scroll region.
#[derive(Debug, Clone)]
pub struct WheelFilter {
    line_height: f64,
    page_height: f64,
    accumulated_dy: f64,
    frame_pending: bool,
    residual_momentum: bool,
    previous_momentum: f64,
    ignoring: bool,
}

impl WheelFilter {
    /// Filter normalizing line deltas with `line_height` pixels per line.
    #[must_use]
    pub fn new(line_height: f64) -> Self {
        Self {
            line_height,
            page_height: 0.0,
            accumulated_dy: 0.0,
            frame_pending: false,
            residual_momentum: false,
            previous_momentum: 0.0,
            ignoring: false,
        }
    }

    /// Track the viewport extent so page deltas scroll one page minus a line.
    pub fn set_viewport_extent(&mut self, extent: f64) {
        self.page_height = (extent - self.line_height).max(0.0);
    }

    /// Convert a delta to pixels.
    #[must_use]
    pub fn normalize(&self, delta: f64, mode: DeltaMode) -> f64 {
        match mode {
            DeltaMode::Pixel => delta,
            DeltaMode::Line => delta * self.line_height,
            DeltaMode::Page => delta * self.page_height,
        }
    }

    /// Decide what to do with `event`, given the region's current geometry.
    pub fn filter(&mut self, event: &WheelEvent, target: &ScrollBox) -> WheelOutcome {
        if event.ctrl_key {
            return WheelOutcome::Zoom;
        }
        if event.ancestors.iter().any(|ancestor| {
            ancestor.overflow.is_user_scrollable()
                && ancestor.can_scroll(event.delta_x, event.delta_y)
        }) {
            return WheelOutcome::Yield;
        }

        let delta_x = self.normalize(event.delta_x, event.delta_mode);
        let mut delta_y = self.normalize(event.delta_y, event.delta_mode);
        if self.frame_pending {
            self.accumulated_dy += delta_y;
            return WheelOutcome::Coalesced;
        }
        delta_y += self.accumulated_dy;
        self.accumulated_dy = 0.0;
        self.frame_pending = true;

        let momentum = delta_x.abs() + delta_y.abs();
        let outcome = if target.can_scroll(delta_x, delta_y) {
            self.residual_momentum = true;
            self.ignoring = true;
            WheelOutcome::Apply { delta_x, delta_y }
        } else if (self.residual_momentum && momentum <= self.previous_momentum) || self.ignoring {
            WheelOutcome::Suppressed
        } else {
            if momentum > self.previous_momentum {
                self.residual_momentum = false;
            }
            WheelOutcome::Release
        };
        self.previous_momentum = momentum;
        outcome
    }

    /// The coalescing frame ended.
    pub fn end_frame(&mut self) {
        self.frame_pending = false;
    }

    /// The ignore window ended.
    pub fn end_ignore_window(&mut self) {
        self.ignoring = false;
    }

    /// Whether a coalescing frame is open.
    #[must_use]
    pub fn is_frame_pending(&self) -> bool {
        self.frame_pending
    }

    /// Vertical pixels waiting for the next frame.
    #[must_use]
    pub fn accumulated(&self) -> f64 {
        self.accumulated_dy
    }

    /// Whether a recent flick is still decaying.
    #[must_use]
    pub fn has_residual_momentum(&self) -> bool {
        self.residual_momentum
    }

    /// Whether unconsumable input is being swallowed.
    #[must_use]
    pub fn is_ignoring(&self) -> bool {
        self.ignoring
    }
}
