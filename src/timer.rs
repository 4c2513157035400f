//! Timing utilities for per-frame instrumentation.

use std::{
    cell::Cell,
    fmt,
    time::{Duration, Instant},
};

use itertools::Itertools;

/// Measures and accumulates the time spent in some part of the pipeline.
///
/// Displaying a [`Timer`] prints the average recorded duration and resets
/// the accumulator, so the printed value covers the time since the last
/// print.
pub struct Timer {
    name: &'static str,
    sum: Cell<Duration>,
    count: Cell<u32>,
}

impl Timer {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            sum: Cell::new(Duration::ZERO),
            count: Cell::new(0),
        }
    }

    /// Invokes `f`, recording how long it takes.
    pub fn time<T>(&self, f: impl FnOnce() -> T) -> T {
        let _guard = self.start();
        f()
    }

    /// Starts a measurement that stops when the returned guard is dropped.
    pub fn start(&self) -> TimerGuard<'_> {
        TimerGuard {
            timer: self,
            start: Instant::now(),
        }
    }
}

impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sum = self.sum.replace(Duration::ZERO);
        let count = self.count.replace(0);
        let avg = sum.checked_div(count).unwrap_or(Duration::ZERO);
        write!(f, "{}: {:.1?}", self.name, avg)
    }
}

pub struct TimerGuard<'a> {
    timer: &'a Timer,
    start: Instant,
}

impl Drop for TimerGuard<'_> {
    fn drop(&mut self) {
        let timer = self.timer;
        timer.sum.set(timer.sum.get() + self.start.elapsed());
        timer.count.set(timer.count.get() + 1);
    }
}

/// Counts frames and logs the frame rate about once per second.
pub struct FpsCounter {
    name: String,
    frames: u32,
    start: Instant,
}

impl FpsCounter {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            frames: 0,
            start: Instant::now(),
        }
    }

    /// Registers a frame.
    pub fn tick(&mut self) {
        self.tick_with(std::iter::empty::<&Timer>());
    }

    /// Registers a frame, logging the given timers alongside the FPS.
    pub fn tick_with<'a, I: IntoIterator<Item = &'a Timer>>(&mut self, timers: I) {
        self.frames += 1;
        let elapsed = self.start.elapsed();
        if elapsed >= Duration::from_secs(1) {
            let fps = self.frames as f32 / elapsed.as_secs_f32();
            let timers = timers.into_iter().map(|t| t.to_string()).join(", ");
            if timers.is_empty() {
                log::debug!("{}: {:.1} FPS", self.name, fps);
            } else {
                log::debug!("{}: {:.1} FPS ({timers})", self.name, fps);
            }

            self.frames = 0;
            self.start = Instant::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_averages_and_resets() {
        let timer = Timer::new("t");
        timer.time(|| {});
        timer.time(|| {});
        assert_eq!(timer.count.get(), 2);
        let _ = timer.to_string();
        assert_eq!(timer.count.get(), 0);
        assert_eq!(timer.sum.get(), Duration::ZERO);
    }
}
