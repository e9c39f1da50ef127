use super::timers::TimerHandle;

/// Where the carousel is in its rotation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No slides, or shut down. Every request is a no-op.
    Idle,
    Showing,
    /// Outgoing slide is animating out; `current` is still `from`.
    Exiting { from: usize, to: usize },
    /// `index` is current and still carries its entering mark.
    Entering { index: usize },
}

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Started { from: usize, to: usize },
    /// Target is already the current slide.
    Unchanged,
    /// An exit phase is in flight; the request was dropped.
    Busy,
    OutOfRange,
    Idle,
}

impl Navigation {
    pub fn started(&self) -> bool {
        matches!(self, Navigation::Started { .. })
    }
}

#[derive(Debug)]
pub struct CarouselState {
    current: usize,
    total: usize,
    phase: Phase,
    pub(super) auto_rotate: Option<TimerHandle>,
    pub(super) progress: Option<TimerHandle>,
    pub(super) phase_timer: Option<TimerHandle>,
}

impl CarouselState {
    pub fn new(total: usize) -> Self {
        Self {
            current: 0,
            total,
            phase: if total == 0 {
                Phase::Idle
            } else {
                Phase::Showing
            },
            auto_rotate: None,
            progress: None,
            phase_timer: None,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn next_index(&self) -> Option<usize> {
        (self.total > 0).then(|| (self.current + 1) % self.total)
    }

    pub fn previous_index(&self) -> Option<usize> {
        (self.total > 0).then(|| (self.current + self.total - 1) % self.total)
    }

    /// Decides whether a transition to `target` may start right now.
    pub fn admit(&self, target: usize) -> Navigation {
        match self.phase {
            Phase::Idle => Navigation::Idle,
            Phase::Exiting { .. } => Navigation::Busy,
            Phase::Showing | Phase::Entering { .. } => {
                if target >= self.total {
                    Navigation::OutOfRange
                } else if target == self.current {
                    Navigation::Unchanged
                } else {
                    Navigation::Started {
                        from: self.current,
                        to: target,
                    }
                }
            }
        }
    }

    pub(super) fn begin_exit(&mut self, to: usize) -> usize {
        let from = self.current;
        self.phase = Phase::Exiting { from, to };
        from
    }

    /// Exiting → Entering. Returns `(from, to)` when an exit was in flight.
    pub(super) fn complete_exit(&mut self) -> Option<(usize, usize)> {
        let Phase::Exiting { from, to } = self.phase else {
            return None;
        };
        self.current = to;
        self.phase = Phase::Entering { index: to };
        Some((from, to))
    }

    /// Entering → Showing. Returns the slide that finished entering.
    pub(super) fn complete_enter(&mut self) -> Option<usize> {
        let Phase::Entering { index } = self.phase else {
            return None;
        };
        self.phase = Phase::Showing;
        Some(index)
    }

    pub(super) fn stop(&mut self) {
        self.phase = Phase::Idle;
        self.auto_rotate = None;
        self.progress = None;
        self.phase_timer = None;
    }
}
