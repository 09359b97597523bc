//! Property-based invariant tests for the winseq virtualizer.
//!
//! These tests verify structural invariants that must hold after **any**
//! sequence of host input once deferred work has been flushed:
//!
//! 1. The scroll position stays within the scrollable range.
//! 2. The index offset stays within `[0, size - virtual_count]`.
//! 3. Visible slots show distinct, in-range logical indices.
//! 4. A non-empty rendered collection always has a visible range.
//! 5. The slot pool never shrinks.
//! 6. Flushing twice in a row changes nothing.
//! 7. `scroll_to_index(i)` shows `i` first, or the last item when `i` lies
//!    within a viewport of the end.

use std::collections::BTreeSet;
use std::time::Duration;

use proptest::prelude::*;
use web_time::Instant;
use winseq::testing::SimHost;
use winseq::{Resize, Virtualizer, VirtualizerConfig};

// ── Helpers ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    ScrollToIndex(usize),
    UserScroll(f64),
    Viewport(u16),
    SetSize(usize),
    Update,
    Frame,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..=200_000).prop_map(Op::ScrollToIndex),
        (0.0f64..=1.0).prop_map(Op::UserScroll),
        (50u16..=900).prop_map(Op::Viewport),
        (0usize..=200_000).prop_map(Op::SetSize),
        Just(Op::Update),
        Just(Op::Frame),
    ]
}

/// Small virtual window so moderately sized collections exercise the
/// index offset.
fn small_window() -> VirtualizerConfig {
    VirtualizerConfig::default()
        .with_max_virtual_count(1_000)
        .with_offset_edges(100, 10)
}

fn rendered(
    size: usize,
    extent: u16,
    viewport: u16,
    config: VirtualizerConfig,
) -> Virtualizer<SimHost> {
    let host = SimHost::new(f64::from(extent)).without_update_log();
    let mut v = Virtualizer::new(host, config).expect("valid config");
    v.on_resize(Resize::ScrollTarget {
        width: 320.0,
        height: f64::from(viewport),
    });
    v.set_size(size);
    v.flush();
    v
}

fn apply(v: &mut Virtualizer<SimHost>, op: &Op, now: Instant) {
    match *op {
        Op::ScrollToIndex(index) => v.scroll_to_index(index),
        Op::UserScroll(fraction) => {
            let top = (v.region().max_scroll_top() * fraction).round();
            v.on_scroll_at(top, now);
        }
        Op::Viewport(height) => v.on_resize(Resize::ScrollTarget {
            width: 320.0,
            height: f64::from(height),
        }),
        Op::SetSize(size) => v.set_size(size),
        Op::Update => v.update(..),
        Op::Frame => v.on_animation_frame(),
    }
}

type Snapshot = (u64, u64, Option<(usize, usize)>, usize, Vec<Option<usize>>);

fn snapshot(v: &Virtualizer<SimHost>) -> Snapshot {
    (
        v.scroll_top().to_bits(),
        v.content_extent().to_bits(),
        v.visible_range().map(|range| (range.first, range.last)),
        v.index_offset(),
        v.slots().iter().map(|slot| slot.index()).collect(),
    )
}

fn check_settled(v: &Virtualizer<SimHost>) -> Result<(), TestCaseError> {
    let size = v.size();
    let top = v.scroll_top();
    prop_assert!(top >= 0.0, "negative scroll position {}", top);
    prop_assert!(
        top <= v.region().max_scroll_top(),
        "scroll position {} past max {}",
        top,
        v.region().max_scroll_top()
    );
    prop_assert!(v.virtual_count() <= size);
    prop_assert!(v.index_offset() <= size - v.virtual_count());

    let mut seen = BTreeSet::new();
    for slot in v.visible_slots() {
        let index = slot.index();
        prop_assert!(index.is_some(), "visible slot without an index");
        let index = index.unwrap_or_default();
        prop_assert!(index < size, "index {} out of range {}", index, size);
        prop_assert!(seen.insert(index), "index {} shown twice", index);
    }

    if size > 0 {
        let first = v.first_visible_index();
        let last = v.last_visible_index();
        prop_assert!(first.is_some_and(|i| i < size), "first {:?}", first);
        prop_assert!(last.is_some_and(|i| i < size), "last {:?}", last);
    } else {
        prop_assert_eq!(v.visible_slots().count(), 0);
    }
    Ok(())
}

// ═════════════════════════════════════════════════════════════════════════
// 1-6. Invariants after arbitrary input sequences
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn invariants_hold_after_any_sequence(
        size in 0usize..=200_000,
        extent in 10u16..=120,
        viewport in 50u16..=900,
        ops in proptest::collection::vec(op_strategy(), 1..=12),
    ) {
        let mut v = rendered(size, extent, viewport, small_window());
        let t0 = Instant::now();
        let mut pool = v.slots().len();

        for (step, op) in ops.iter().enumerate() {
            let now = t0 + Duration::from_millis(step as u64 * 20);
            apply(&mut v, op, now);
            v.flush();

            prop_assert!(v.slots().len() >= pool, "pool shrank after {:?}", op);
            pool = v.slots().len();
            check_settled(&v)?;

            let before = snapshot(&v);
            v.flush();
            prop_assert_eq!(snapshot(&v), before, "second flush changed state after {:?}", op);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. scroll_to_index round trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn scroll_to_index_shows_target(
        size in 1usize..=10_000_000,
        extent in 10u16..=120,
        viewport in 50u16..=900,
        seed in any::<u64>(),
    ) {
        let mut v = rendered(size, extent, viewport, VirtualizerConfig::default());
        let index = (seed % size as u64) as usize;
        v.scroll_to_index(index);
        v.flush();

        let first = v.first_visible_index();
        let last = v.last_visible_index();
        prop_assert!(
            first == Some(index) || last == Some(size - 1),
            "index {} of {}: first {:?}, last {:?}",
            index, size, first, last
        );
    }

    #[test]
    fn scroll_to_index_is_repeatable(
        size in 1usize..=5_000_000,
        seed in any::<u64>(),
    ) {
        let mut v = rendered(size, 40, 400, VirtualizerConfig::default());
        let index = (seed % size as u64) as usize;
        v.scroll_to_index(index);
        v.flush();
        let first = snapshot(&v);
        v.scroll_to_index(index);
        v.flush();
        prop_assert_eq!(snapshot(&v).2, first.2);
    }
}
