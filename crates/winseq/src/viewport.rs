#![forbid(unsafe_code)]

//! Scroll region state and the facts the host feeds into it.
//!
//! The engine owns a [`ScrollRegion`] describing the host-designated
//! scrollable region: how large the viewport is, how far it is scrolled and
//! how large the scrollable content is. The host mirrors platform facts into
//! it (user scrolls, resizes) and reads back what the engine decided
//! (programmatic scroll positions, content extent).

/// CSS-style overflow of an element along both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    /// Content spills out, no scrolling.
    #[default]
    Visible,
    /// Content is clipped, no user scrolling.
    Hidden,
    /// Scrollbars appear when needed.
    Auto,
    /// Scrollbars always present.
    Scroll,
}

impl Overflow {
    /// Whether the user can scroll an element with this overflow.
    #[must_use]
    pub fn is_user_scrollable(self) -> bool {
        matches!(self, Self::Auto | Self::Scroll)
    }
}

/// Scroll geometry of one element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollBox {
    /// Vertical scroll position.
    pub scroll_top: f64,
    /// Horizontal scroll position.
    pub scroll_left: f64,
    /// Full scrollable height.
    pub scroll_height: f64,
    /// Full scrollable width.
    pub scroll_width: f64,
    /// Visible height.
    pub client_height: f64,
    /// Visible width.
    pub client_width: f64,
    /// Overflow style.
    pub overflow: Overflow,
}

impl ScrollBox {
    /// Largest vertical scroll position.
    #[must_use]
    pub fn max_scroll_top(&self) -> f64 {
        (self.scroll_height - self.client_height).max(0.0)
    }

    /// Largest horizontal scroll position.
    #[must_use]
    pub fn max_scroll_left(&self) -> f64 {
        (self.scroll_width - self.client_width).max(0.0)
    }

    /// Whether the element has room to scroll in the direction of the deltas.
    #[must_use]
    pub fn can_scroll(&self, delta_x: f64, delta_y: f64) -> bool {
        (delta_y > 0.0 && self.scroll_top < self.max_scroll_top())
            || (delta_y < 0.0 && self.scroll_top > 0.0)
            || (delta_x > 0.0 && self.scroll_left < self.max_scroll_left())
            || (delta_x < 0.0 && self.scroll_left > 0.0)
    }
}

/// Size-change notifications from the host's resize watcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resize {
    /// The scroll target changed size.
    ScrollTarget {
        /// New viewport width.
        width: f64,
        /// New viewport height (extent along the scroll axis).
        height: f64,
    },
    /// The elements container changed width.
    ElementsContainer {
        /// New width.
        width: f64,
    },
    /// The element in the slot at this physical position changed size.
    Element(usize),
}

/// Inclusive range of visible logical indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRange {
    /// First visible logical index.
    pub first: usize,
    /// Last visible logical index.
    pub last: usize,
}

impl VisibleRange {
    /// Whether `index` lies in the range.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.first <= index && index <= self.last
    }

    /// Number of indices in the range.
    #[must_use]
    pub fn len(&self) -> usize {
        self.last.saturating_sub(self.first) + 1
    }

    /// Always `false`; a range holds at least one index.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// The scroll target the engine virtualizes.
#[derive(Debug, Clone, Default)]
pub struct ScrollRegion {
    target: ScrollBox,
    elements_width: f64,
}

impl ScrollRegion {
    /// Region with no rendered size yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current geometry.
    #[must_use]
    pub fn scroll_box(&self) -> &ScrollBox {
        &self.target
    }

    /// Vertical scroll position.
    #[must_use]
    pub fn scroll_top(&self) -> f64 {
        self.target.scroll_top
    }

    /// Viewport extent along the scroll axis.
    #[must_use]
    pub fn viewport_extent(&self) -> f64 {
        self.target.client_height
    }

    /// Scrollable content extent.
    #[must_use]
    pub fn content_extent(&self) -> f64 {
        self.target.scroll_height
    }

    /// Width of the elements container.
    #[must_use]
    pub fn elements_width(&self) -> f64 {
        self.elements_width
    }

    /// Whether the region has a rendered extent. Measurement-dependent work
    /// is skipped while it does not.
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        self.target.client_height > 0.0
    }

    /// Largest vertical scroll position.
    #[must_use]
    pub fn max_scroll_top(&self) -> f64 {
        self.target.max_scroll_top()
    }

    /// Move the vertical scroll position, clamped like a real scroll target.
    /// Returns the position actually applied.
    pub fn set_scroll_top(&mut self, top: f64) -> f64 {
        let top = if top.is_finite() { top } else { 0.0 };
        self.target.scroll_top = top.clamp(0.0, self.max_scroll_top());
        self.target.scroll_top
    }

    /// Move the horizontal scroll position, clamped.
    pub fn set_scroll_left(&mut self, left: f64) -> f64 {
        let left = if left.is_finite() { left } else { 0.0 };
        self.target.scroll_left = left.clamp(0.0, self.target.max_scroll_left());
        self.target.scroll_left
    }

    /// Set the content extent; the scroll position is re-clamped.
    pub fn set_content_extent(&mut self, extent: f64) {
        self.target.scroll_height = extent.max(0.0);
        let top = self.target.scroll_top;
        self.set_scroll_top(top);
    }

    /// Set the horizontal content extent.
    pub fn set_horizontal_extent(&mut self, scroll_width: f64) {
        self.target.scroll_width = scroll_width.max(0.0);
        let left = self.target.scroll_left;
        self.set_scroll_left(left);
    }

    /// Apply a resize of the target or the elements container.
    pub fn apply_resize(&mut self, resize: Resize) {
        match resize {
            Resize::ScrollTarget { width, height } => {
                self.target.client_width = width.max(0.0);
                self.target.client_height = height.max(0.0);
                let top = self.target.scroll_top;
                self.set_scroll_top(top);
            }
            Resize::ElementsContainer { width } => self.elements_width = width.max(0.0),
            Resize::Element(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(viewport: f64, content: f64) -> ScrollRegion {
        let mut r = ScrollRegion::new();
        r.apply_resize(Resize::ScrollTarget {
            width: 300.0,
            height: viewport,
        });
        r.set_content_extent(content);
        r
    }

    #[test]
    fn scroll_top_is_clamped() {
        let mut r = region(100.0, 500.0);
        assert_eq!(r.set_scroll_top(1_000.0), 400.0);
        assert_eq!(r.set_scroll_top(-5.0), 0.0);
        assert_eq!(r.set_scroll_top(f64::NAN), 0.0);
    }

    #[test]
    fn shrinking_content_reclamps() {
        let mut r = region(100.0, 500.0);
        r.set_scroll_top(400.0);
        r.set_content_extent(200.0);
        assert_eq!(r.scroll_top(), 100.0);
    }

    #[test]
    fn unrendered_region() {
        let r = ScrollRegion::new();
        assert!(!r.is_rendered());
    }

    #[test]
    fn can_scroll_respects_room() {
        let b = ScrollBox {
            scroll_top: 0.0,
            scroll_height: 300.0,
            client_height: 100.0,
            ..ScrollBox::default()
        };
        assert!(b.can_scroll(0.0, 10.0));
        assert!(!b.can_scroll(0.0, -10.0));
        assert!(!b.can_scroll(5.0, 0.0));
    }

    #[test]
    fn overflow_scrollability() {
        assert!(Overflow::Auto.is_user_scrollable());
        assert!(Overflow::Scroll.is_user_scrollable());
        assert!(!Overflow::Hidden.is_user_scrollable());
        assert!(!Overflow::Visible.is_user_scrollable());
    }

    #[test]
    fn visible_range_contains() {
        let r = VisibleRange { first: 3, last: 7 };
        assert!(r.contains(3) && r.contains(7));
        assert!(!r.contains(8));
        assert_eq!(r.len(), 5);
    }
}
