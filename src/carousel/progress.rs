use std::time::Duration;

/// Elapsed share of the current slide's dwell time, counted in whole ticks.
#[derive(Debug, Clone)]
pub struct ProgressMeter {
    dwell: Duration,
    tick: Duration,
    ticks: u64,
}

impl ProgressMeter {
    pub fn new(dwell: Duration, tick: Duration) -> Self {
        Self {
            dwell,
            tick,
            ticks: 0,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick
    }

    pub fn reset(&mut self) {
        self.ticks = 0;
    }

    /// Adds one tick unless already full. Returns `true` once full.
    pub fn tick(&mut self) -> bool {
        if !self.is_complete() {
            self.ticks += 1;
        }
        self.is_complete()
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed_nanos() >= self.dwell.as_nanos()
    }

    pub fn fraction(&self) -> f64 {
        let dwell = self.dwell.as_nanos();
        if dwell == 0 {
            return 1.0;
        }
        (self.elapsed_nanos() as f64 / dwell as f64).min(1.0)
    }

    /// CSS width for the progress bar, e.g. `"42.57%"`.
    pub fn width_label(&self) -> String {
        format!("{}%", crate::css::number(self.fraction() * 100.0, 2))
    }

    fn elapsed_nanos(&self) -> u128 {
        u128::from(self.ticks) * self.tick.as_nanos()
    }
}
