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
use web_time::Duration;

/// Frame rate over the last full second.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameRate {
    pub fps: f32,
    pub mean_frame_time: Duration,
}

/// Accumulates frame deltas and publishes a [`FrameRate`] once per second.
#[derive(Default)]
pub struct FrameStats {
    window: Duration,
    frames: u32,
    latest: Option<FrameRate>,
}

impl FrameStats {
    const PUBLISH_PERIOD: Duration = Duration::from_secs(1);

    /// Records one frame. Returns the new rate when a period just completed.
    #[allow(clippy::cast_precision_loss)]
    pub fn record(&mut self, delta: Duration) -> Option<FrameRate> {
        self.window += delta;
        self.frames += 1;
        if self.window < Self::PUBLISH_PERIOD {
            return None;
        }
        let rate = FrameRate {
            fps: self.frames as f32 / self.window.as_secs_f32(),
            mean_frame_time: self.window / self.frames,
        };
        self.window = Duration::ZERO;
        self.frames = 0;
        self.latest = Some(rate);
        Some(rate)
    }

    #[must_use]
    pub fn latest(&self) -> Option<FrameRate> {
        self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publishes_once_per_second() {
        let mut stats = FrameStats::default();
        let frame = Duration::from_millis(20);
        for _ in 0..49 {
            assert_eq!(stats.record(frame), None);
        }
        let rate = stats.record(frame).unwrap();
        assert!((rate.fps - 50.0).abs() < 1e-3);
        assert_eq!(rate.mean_frame_time, frame);
        assert_eq!(stats.latest(), Some(rate));
        assert_eq!(stats.record(frame), None);
    }
}
