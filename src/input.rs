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
use std::collections::VecDeque;

use cgmath::Point2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Pointer input collected between two steps.
///
/// Positions are normalized device coordinates: `[-1, 1]` on both axes, y up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    PointerMoved {
        position: Point2<f32>,
    },
    PointerPressed {
        button: PointerButton,
        position: Point2<f32>,
    },
    PointerReleased {
        button: PointerButton,
        position: Point2<f32>,
    },
    PointerLeft,
    /// Positive when scrolling away from the user.
    Wheel {
        delta: f32,
    },
}

/// Window pixel coordinates to normalized device coordinates.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn to_ndc(x: f64, y: f64, width: u32, height: u32) -> Point2<f32> {
    let width = f64::from(width.max(1));
    let height = f64::from(height.max(1));
    Point2::new(
        (2.0 * x / width - 1.0) as f32,
        (1.0 - 2.0 * y / height) as f32,
    )
}

/// Events queued by the window between steps, drained once per step.
#[derive(Default)]
pub struct InputQueue {
    events: VecDeque<InputEvent>,
}

impl InputQueue {
    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        self.events.drain(..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ndc_corners() {
        assert_eq!(to_ndc(0.0, 0.0, 800, 600), Point2::new(-1.0, 1.0));
        assert_eq!(to_ndc(800.0, 600.0, 800, 600), Point2::new(1.0, -1.0));
        assert_eq!(to_ndc(400.0, 300.0, 800, 600), Point2::new(0.0, 0.0));
    }

    #[test]
    fn queue_drains_in_order() {
        let mut queue = InputQueue::default();
        queue.push(InputEvent::Wheel { delta: 1.0 });
        queue.push(InputEvent::PointerLeft);
        let drained: Vec<_> = queue.drain().collect();
        assert_eq!(
            drained,
            vec![InputEvent::Wheel { delta: 1.0 }, InputEvent::PointerLeft]
        );
        assert!(queue.is_empty());
    }
}
