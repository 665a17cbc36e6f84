/*
MIT License

Copyright (c) 2025 Vincent Hiribarren

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/
use web_time::{Duration, Instant};

enum TimeSource {
    Monotonic { start: Instant, last_tick: Instant },
    Manual,
}

/// Elapsed-time source shared by everything animated in a frame.
///
/// Only the frame driver advances the clock; animated objects read
/// [`Clock::elapsed_secs`] and never keep time on their own, so replaying the
/// same elapsed time always reproduces the same frame.
pub struct Clock {
    source: TimeSource,
    elapsed: Duration,
    delta: Duration,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    /// Clock following wall time, starting now.
    #[must_use]
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            source: TimeSource::Monotonic {
                start: now,
                last_tick: now,
            },
            elapsed: Duration::ZERO,
            delta: Duration::ZERO,
        }
    }

    /// Clock that only moves through [`Clock::advance`] and [`Clock::set_elapsed`].
    #[must_use]
    pub fn manual() -> Self {
        Self {
            source: TimeSource::Manual,
            elapsed: Duration::ZERO,
            delta: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn is_manual(&self) -> bool {
        matches!(self.source, TimeSource::Manual)
    }

    /// Samples the time source. A manual clock keeps its time and reports a zero delta.
    pub fn tick(&mut self) {
        match &mut self.source {
            TimeSource::Monotonic { start, last_tick } => {
                let now = Instant::now();
                self.delta = now.duration_since(*last_tick);
                self.elapsed = now.duration_since(*start);
                *last_tick = now;
            }
            TimeSource::Manual => self.delta = Duration::ZERO,
        }
    }

    pub fn advance(&mut self, by: Duration) {
        if !self.is_manual() {
            log::warn!("Ignoring advance on a wall-time clock");
            return;
        }
        self.elapsed += by;
        self.delta = by;
    }

    pub fn set_elapsed(&mut self, elapsed: Duration) {
        if !self.is_manual() {
            log::warn!("Ignoring set_elapsed on a wall-time clock");
            return;
        }
        self.delta = elapsed.saturating_sub(self.elapsed);
        self.elapsed = elapsed;
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    #[must_use]
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    #[must_use]
    pub fn delta(&self) -> Duration {
        self.delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_accumulates_and_reports_delta() {
        let mut clock = Clock::manual();
        clock.advance(Duration::from_millis(250));
        clock.advance(Duration::from_millis(500));
        assert_eq!(clock.elapsed(), Duration::from_millis(750));
        assert_eq!(clock.delta(), Duration::from_millis(500));
        clock.tick();
        assert_eq!(clock.elapsed(), Duration::from_millis(750));
        assert_eq!(clock.delta(), Duration::ZERO);
    }

    #[test]
    fn set_elapsed_never_reports_negative_delta() {
        let mut clock = Clock::manual();
        clock.set_elapsed(Duration::from_secs(3));
        assert_eq!(clock.delta(), Duration::from_secs(3));
        clock.set_elapsed(Duration::from_secs(1));
        assert_eq!(clock.elapsed(), Duration::from_secs(1));
        assert_eq!(clock.delta(), Duration::ZERO);
    }

    #[test]
    fn wall_clock_is_monotonic() {
        let mut clock = Clock::new();
        clock.tick();
        let first = clock.elapsed();
        clock.tick();
        assert!(clock.elapsed() >= first);
        clock.advance(Duration::from_secs(10));
        assert!(clock.elapsed() < Duration::from_secs(10));
    }
}
