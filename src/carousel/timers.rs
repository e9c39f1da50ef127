//! Virtual-time timer queue driving the carousel.
//!
//! Instants are offsets on the page clock (time since mount). Nothing here
//! sleeps; the owner asks for [`Timers::next_deadline`] and feeds the clock
//! back through [`Timers::pop_due`], which makes the whole carousel
//! deterministic under test and lets the async runtime own real time.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    AutoRotate,
    Progress,
    /// One-shot delay between transition phases.
    Phase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub handle: TimerHandle,
    pub kind: TimerKind,
    /// Scheduled instant of this firing, not the instant it was observed.
    pub at: Duration,
}

#[derive(Debug, Clone)]
struct Entry {
    handle: TimerHandle,
    kind: TimerKind,
    due: Duration,
    period: Option<Duration>,
}

#[derive(Debug, Default)]
pub struct Timers {
    next_id: u64,
    entries: Vec<Entry>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recurring timer first firing at `now + period`.
    pub fn start_interval(&mut self, kind: TimerKind, now: Duration, period: Duration) -> TimerHandle {
        // A zero period would re-arm at the same instant forever.
        let period = period.max(Duration::from_millis(1));
        self.push(kind, now + period, Some(period))
    }

    pub fn start_timeout(&mut self, kind: TimerKind, now: Duration, delay: Duration) -> TimerHandle {
        self.push(kind, now + delay, None)
    }

    /// Returns `false` when the handle already fired (one-shot) or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.handle != handle);
        before != self.entries.len()
    }

    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    pub fn live(&self, kind: TimerKind) -> usize {
        self.entries.iter().filter(|entry| entry.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.iter().map(|entry| entry.due).min()
    }

    /// Removes and returns the earliest timer due at or before `now`.
    ///
    /// Ties resolve in creation order. Interval timers are re-armed one
    /// period after their scheduled instant, so a late poll never drifts
    /// the cadence.
    pub fn pop_due(&mut self, now: Duration) -> Option<Fired> {
        let (idx, _) = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due <= now)
            .min_by_key(|(_, entry)| (entry.due, entry.handle))?;

        let entry = &mut self.entries[idx];
        let fired = Fired {
            handle: entry.handle,
            kind: entry.kind,
            at: entry.due,
        };
        let period = entry.period;
        match period {
            Some(period) => entry.due += period,
            None => {
                self.entries.swap_remove(idx);
            }
        }
        Some(fired)
    }

    fn push(&mut self, kind: TimerKind, due: Duration, period: Option<Duration>) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            handle,
            kind,
            due,
            period,
        });
        handle
    }
}
