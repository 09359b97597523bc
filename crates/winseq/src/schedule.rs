#![forbid(unsafe_code)]

//! Named debounced work.
//!
//! Every deferred concern has one [`Task`] name and at most one pending
//! entry. Scheduling a task that is already pending replaces the entry
//! (re-debouncing), so only the latest request for a concern ever runs.
//! Frame tasks run on the next display refresh; timer tasks run once their
//! deadline has passed without being rescheduled.
//!
//! Tasks are always handed out in dependency order, the order of
//! [`Task::ALL`].

use smallvec::SmallVec;
use std::time::Duration;
use web_time::Instant;

/// Deferred engine work, in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// Full re-population after a size change.
    Resize,
    /// Re-measure slots padded with placeholder extents.
    ClearPlaceholders,
    /// Close gaps between rendered slots and the viewport edges.
    FixPositioning,
    /// Bring element document order back in line with visual order.
    Reorder,
    /// End of the wheel coalescing frame.
    WheelFrame,
    /// End of the window in which unconsumable wheel input is swallowed.
    IgnoreWheel,
}

impl Task {
    /// All tasks in dependency order.
    pub const ALL: [Self; 6] = [
        Self::Resize,
        Self::ClearPlaceholders,
        Self::FixPositioning,
        Self::Reorder,
        Self::WheelFrame,
        Self::IgnoreWheel,
    ];

    fn slot(self) -> usize {
        match self {
            Self::Resize => 0,
            Self::ClearPlaceholders => 1,
            Self::FixPositioning => 2,
            Self::Reorder => 3,
            Self::WheelFrame => 4,
            Self::IgnoreWheel => 5,
        }
    }
}

/// When a pending task becomes runnable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// On the next animation frame.
    NextFrame,
    /// Once this instant has passed.
    At(Instant),
}

/// Batch of tasks handed out by the scheduler.
pub type TaskBatch = SmallVec<[Task; 6]>;

/// Pending-task table.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    pending: [Option<Trigger>; 6],
}

impl Scheduler {
    /// Empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task`, replacing any pending entry.
    pub fn schedule(&mut self, task: Task, trigger: Trigger) {
        self.pending[task.slot()] = Some(trigger);
    }

    /// Schedule `task` to run on the next frame.
    pub fn schedule_frame(&mut self, task: Task) {
        self.schedule(task, Trigger::NextFrame);
    }

    /// Schedule `task` to run `delay` after `now`.
    pub fn schedule_after(&mut self, task: Task, delay: Duration, now: Instant) {
        self.schedule(task, Trigger::At(now + delay));
    }

    /// Drop a pending task. Returns whether it was pending.
    pub fn cancel(&mut self, task: Task) -> bool {
        self.pending[task.slot()].take().is_some()
    }

    /// Whether `task` is pending.
    #[must_use]
    pub fn is_pending(&self, task: Task) -> bool {
        self.pending[task.slot()].is_some()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.pending.iter().all(Option::is_none)
    }

    /// Take every task waiting for the next frame.
    pub fn take_frame(&mut self) -> TaskBatch {
        self.take_where(|trigger| trigger == Trigger::NextFrame)
    }

    /// Take every timer task whose deadline has passed at `now`.
    pub fn take_due(&mut self, now: Instant) -> TaskBatch {
        self.take_where(|trigger| matches!(trigger, Trigger::At(at) if at <= now))
    }

    /// Take everything that is pending.
    pub fn take_all(&mut self) -> TaskBatch {
        self.take_where(|_| true)
    }

    /// Earliest timer deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending
            .iter()
            .filter_map(|trigger| match trigger {
                Some(Trigger::At(at)) => Some(*at),
                _ => None,
            })
            .min()
    }

    /// Time left until the earliest timer deadline.
    #[must_use]
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.next_deadline()
            .map(|at| at.saturating_duration_since(now))
    }

    fn take_where(&mut self, mut pred: impl FnMut(Trigger) -> bool) -> TaskBatch {
        let mut out = TaskBatch::new();
        for task in Task::ALL {
            let entry = &mut self.pending[task.slot()];
            if entry.is_some_and(&mut pred) {
                *entry = None;
                out.push(task);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescheduling_replaces_entry() {
        let mut s = Scheduler::new();
        let now = Instant::now();
        s.schedule_after(Task::Reorder, Duration::from_millis(500), now);
        s.schedule_after(
            Task::Reorder,
            Duration::from_millis(500),
            now + Duration::from_millis(400),
        );
        assert!(s.take_due(now + Duration::from_millis(600)).is_empty());
        let due = s.take_due(now + Duration::from_millis(900));
        assert_eq!(due.as_slice(), &[Task::Reorder]);
        assert!(s.is_idle());
    }

    #[test]
    fn frame_and_timer_tasks_are_separate() {
        let mut s = Scheduler::new();
        let now = Instant::now();
        s.schedule_frame(Task::WheelFrame);
        s.schedule_after(Task::IgnoreWheel, Duration::from_millis(500), now);
        assert_eq!(s.take_frame().as_slice(), &[Task::WheelFrame]);
        assert!(s.is_pending(Task::IgnoreWheel));
        assert!(s.take_frame().is_empty());
    }

    #[test]
    fn take_all_is_in_dependency_order() {
        let mut s = Scheduler::new();
        let now = Instant::now();
        s.schedule_frame(Task::WheelFrame);
        s.schedule_after(Task::Reorder, Duration::from_millis(500), now);
        s.schedule_frame(Task::Resize);
        s.schedule_after(Task::FixPositioning, Duration::from_millis(100), now);
        assert_eq!(
            s.take_all().as_slice(),
            &[
                Task::Resize,
                Task::FixPositioning,
                Task::Reorder,
                Task::WheelFrame
            ]
        );
    }

    #[test]
    fn cancel_reports_pending() {
        let mut s = Scheduler::new();
        s.schedule_frame(Task::Resize);
        assert!(s.cancel(Task::Resize));
        assert!(!s.cancel(Task::Resize));
    }

    #[test]
    fn time_until_next_reports_earliest() {
        let mut s = Scheduler::new();
        let now = Instant::now();
        assert!(s.time_until_next(now).is_none());
        s.schedule_after(Task::Reorder, Duration::from_millis(500), now);
        s.schedule_after(Task::FixPositioning, Duration::from_millis(100), now);
        assert_eq!(s.time_until_next(now), Some(Duration::from_millis(100)));
        assert_eq!(
            s.time_until_next(now + Duration::from_secs(1)),
            Some(Duration::ZERO)
        );
    }
}
