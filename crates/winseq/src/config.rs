#![forbid(unsafe_code)]

//! Tuning knobs for the virtualizer.
//!
//! Every threshold the windowing engine relies on is empirical: it was tuned
//! for one rendering surface and may not transfer to another. They all live
//! here so hosts can adjust them, and [`VirtualizerConfig::validate`] rejects
//! combinations the engine cannot honor.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Configuration for a [`Virtualizer`](crate::Virtualizer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualizerConfig {
    /// Largest number of positions the windowing primitive addresses directly.
    /// Bigger collections slide this window with an index offset.
    pub max_virtual_count: usize,
    /// Width (in items) of the bands near either end of the virtual window in
    /// which the offset is nudged toward its extreme.
    pub offset_edge_band: usize,
    /// Largest offset change applied by a single edge nudge.
    pub offset_max_shift: usize,
    /// Scroll deltas (px) above this are treated as discontinuous jumps.
    pub large_jump_threshold: f64,
    /// Rendered slots should cover this many viewports.
    pub max_pages: f64,
    /// Pixels per line for line-mode wheel deltas.
    pub scroll_line_height: f64,
    /// Extent given to slots that measure zero before any real measurement
    /// has been seen.
    pub initial_placeholder_extent: f64,
    /// Upper bound on slots created by one estimated pool growth round.
    pub max_pool_growth_step: usize,
    /// Keep element document order in sync with visual order.
    pub reorder_elements: bool,
    /// Quiet period after scrolling before elements are reordered.
    pub reorder_delay: Duration,
    /// How long wheel input the region cannot consume stays swallowed after
    /// a consumed wheel event.
    pub ignore_wheel_delay: Duration,
    /// Quiet period after scrolling before rendered coverage is repaired.
    pub fix_positioning_delay: Duration,
}

impl Default for VirtualizerConfig {
    fn default() -> Self {
        Self {
            max_virtual_count: 100_000,
            offset_edge_band: 1_000,
            offset_max_shift: 100,
            large_jump_threshold: 10_000.0,
            max_pages: 1.3,
            scroll_line_height: 16.0,
            initial_placeholder_extent: 200.0,
            max_pool_growth_step: 100,
            reorder_elements: false,
            reorder_delay: Duration::from_millis(500),
            ignore_wheel_delay: Duration::from_millis(500),
            fix_positioning_delay: Duration::from_millis(100),
        }
    }
}

impl VirtualizerConfig {
    /// Set the virtual window size.
    #[must_use]
    pub fn with_max_virtual_count(mut self, count: usize) -> Self {
        self.max_virtual_count = count;
        self
    }

    /// Set the edge band width and the per-event shift used near the edges.
    #[must_use]
    pub fn with_offset_edges(mut self, band: usize, max_shift: usize) -> Self {
        self.offset_edge_band = band;
        self.offset_max_shift = max_shift;
        self
    }

    /// Set the large-jump threshold in pixels.
    #[must_use]
    pub fn with_large_jump_threshold(mut self, px: f64) -> Self {
        self.large_jump_threshold = px;
        self
    }

    /// Set the line height used to normalize line-mode wheel deltas.
    #[must_use]
    pub fn with_scroll_line_height(mut self, px: f64) -> Self {
        self.scroll_line_height = px;
        self
    }

    /// Enable or disable document-order reconciliation.
    #[must_use]
    pub fn with_reorder_elements(mut self, enabled: bool) -> Self {
        self.reorder_elements = enabled;
        self
    }

    /// Set the reorder debounce delay.
    #[must_use]
    pub fn with_reorder_delay(mut self, delay: Duration) -> Self {
        self.reorder_delay = delay;
        self
    }

    /// Check that the engine can operate with these values.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_virtual_count == 0 {
            return Err(ConfigError::ZeroCount("max_virtual_count"));
        }
        if self.offset_max_shift == 0 {
            return Err(ConfigError::ZeroCount("offset_max_shift"));
        }
        if self.max_pool_growth_step == 0 {
            return Err(ConfigError::ZeroCount("max_pool_growth_step"));
        }
        if self.offset_edge_band.saturating_mul(2) >= self.max_virtual_count {
            return Err(ConfigError::EdgeBandTooWide {
                band: self.offset_edge_band,
                max_virtual_count: self.max_virtual_count,
            });
        }
        for (field, value) in [
            ("large_jump_threshold", self.large_jump_threshold),
            ("max_pages", self.max_pages),
            ("scroll_line_height", self.scroll_line_height),
            ("initial_placeholder_extent", self.initial_placeholder_extent),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidExtent { field, value });
            }
        }
        Ok(())
    }
}

/// Rejected configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A count that must be positive is zero.
    ZeroCount(&'static str),
    /// The two edge bands would overlap inside the virtual window.
    EdgeBandTooWide {
        /// Configured band width.
        band: usize,
        /// Configured virtual window size.
        max_virtual_count: usize,
    },
    /// A pixel or ratio value is non-finite or not positive.
    InvalidExtent {
        /// Field name.
        field: &'static str,
        /// Offending value.
        value: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroCount(field) => write!(f, "{field} must be greater than zero"),
            Self::EdgeBandTooWide {
                band,
                max_virtual_count,
            } => write!(
                f,
                "offset_edge_band {band} leaves no middle ground in a virtual window of {max_virtual_count}"
            ),
            Self::InvalidExtent { field, value } => {
                write!(f, "{field} must be finite and positive, got {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(VirtualizerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_virtual_count_rejected() {
        let cfg = VirtualizerConfig::default().with_max_virtual_count(0);
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::ZeroCount("max_virtual_count"))
        );
    }

    #[test]
    fn overlapping_edge_bands_rejected() {
        let cfg = VirtualizerConfig::default()
            .with_max_virtual_count(1_000)
            .with_offset_edges(500, 10);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::EdgeBandTooWide { band: 500, .. })
        ));
    }

    #[test]
    fn nan_line_height_rejected() {
        let cfg = VirtualizerConfig::default().with_scroll_line_height(f64::NAN);
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("scroll_line_height"));
    }

    #[test]
    fn zero_shift_rejected() {
        let cfg = VirtualizerConfig::default().with_offset_edges(1_000, 0);
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::ZeroCount("offset_max_shift"))
        );
    }
}
