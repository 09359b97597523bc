#![forbid(unsafe_code)]

//! Windowed sequence virtualizer.
//!
//! # Role
//! `winseq` renders an ordered collection of any size through a small pool of
//! reusable elements. Only the items intersecting the viewport (plus a margin)
//! are ever materialized; scrolling recycles elements from one end of the pool
//! to the other.
//!
//! # Primary responsibilities
//! - **Windowing**: a ring of slots laid out over a bounded virtual index
//!   space, with a running average item extent estimating the content height.
//! - **Index offset**: collections larger than the virtual space are reached
//!   by sliding that space across the logical indices, so every item stays
//!   reachable by scrolling and by [`Virtualizer::scroll_to_index`].
//! - **Scheduling**: resize, placeholder, gap-repair, reorder and wheel work
//!   is debounced by name and runs on frames, timers or [`Virtualizer::flush`].
//! - **Wheel filtering**: coalescing, line/page normalization and momentum
//!   suppression at the edges.
//!
//! # How it fits
//! The host implements [`ElementHost`] and forwards platform events. The
//! virtualizer answers with slot assignments, slot offsets, a content extent
//! and a scroll position to apply. [`testing::SimHost`] is a deterministic
//! in-memory host.

pub mod config;
pub mod gesture;
pub mod host;
pub mod offset;
pub mod pool;
pub mod schedule;
pub mod testing;
pub mod viewport;

mod engine;
mod virtualizer;
mod window;

pub use config::{ConfigError, VirtualizerConfig};
pub use gesture::{DeltaMode, WheelEvent, WheelOutcome};
pub use host::ElementHost;
pub use offset::{IndexOffset, OffsetAdjustment};
pub use pool::{Slot, SlotPool};
pub use schedule::Task;
pub use viewport::{Overflow, Resize, ScrollBox, ScrollRegion, VisibleRange};
pub use virtualizer::Virtualizer;
