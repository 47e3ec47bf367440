//! Wall-clock bookkeeping for the run loop.
//!
//! The physics step is fixed; the clock only drives decorations and logs.

/// Elapsed host time and the delta since the previous sample, in seconds
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClockState {
    pub elapsed: f64,
    pub previous: f64,
    pub delta: f64,
}

impl ClockState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new host time and returns the delta since the last sample.
    ///
    /// Time never runs backwards: an earlier `now` yields a zero delta.
    pub fn sample(&mut self, now: f64) -> f64 {
        let now = if now.is_finite() { now.max(self.elapsed) } else { self.elapsed };
        self.previous = self.elapsed;
        self.elapsed = now;
        self.delta = now - self.previous;
        self.delta
    }
}
