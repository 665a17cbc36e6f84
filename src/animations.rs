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
use std::f64::consts::TAU;

use crate::clock::Clock;
use crate::objects::Transform;

/// Height of the world floor the bounce is measured from.
pub const FLOOR_HEIGHT: f32 = 0.0;

/// Rotation about the vertical axis as a function of elapsed time, wrapped to `[0, 2π)`.
pub fn rotate(transform: &mut Transform, clock: &Clock, speed: f32) {
    transform.rotation.y = rotation_angle(clock.elapsed_secs(), speed);
}

/// Vertical position `floor + |sin(t * speed)| * height + offset`.
pub fn bounce(transform: &mut Transform, clock: &Clock, speed: f32, height: f32, offset: f32) {
    transform.position.y = bounce_height(clock.elapsed_secs(), speed, height, offset);
}

/// Phase is computed in `f64` so long uptimes do not quantize the angle.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn rotation_angle(elapsed_secs: f64, speed: f32) -> f32 {
    let angle = (elapsed_secs * f64::from(speed)).rem_euclid(TAU) as f32;
    // Narrowing can round a value just below 2π up to it.
    if angle >= std::f32::consts::TAU { 0.0 } else { angle }
}

#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn bounce_height(elapsed_secs: f64, speed: f32, height: f32, offset: f32) -> f32 {
    let swing = (elapsed_secs * f64::from(speed)).sin().abs() as f32;
    FLOOR_HEIGHT + swing * height + offset
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_3};
    use std::f32::consts::TAU as TAU_F32;

    use web_time::Duration;

    use super::*;

    const EPSILON: f32 = 1e-4;

    fn clock_at(secs: f32) -> Clock {
        let mut clock = Clock::manual();
        clock.set_elapsed(Duration::from_secs_f32(secs));
        clock
    }

    #[test]
    fn rotation_wraps_into_one_turn() {
        for secs in [0.0, 0.5, 5.9, 6.3, 100.0, 12_345.6] {
            let angle = rotation_angle(secs, FRAC_PI_3);
            assert!((0.0..TAU_F32).contains(&angle), "{angle} out of range at {secs}");
            #[allow(clippy::cast_possible_truncation)]
            let expected = ((secs * f64::from(FRAC_PI_3)) % TAU) as f32;
            assert!((angle - expected).abs() < EPSILON);
        }
    }

    #[test]
    fn rotation_stays_precise_after_a_day() {
        let day = 86_400.0;
        let frame: f32 = 1.0 / 60.0;
        let before = rotation_angle(day, FRAC_PI_3);
        let after = rotation_angle(day + f64::from(frame), FRAC_PI_3);
        let step = (after - before).rem_euclid(TAU_F32);
        assert!((step - frame * FRAC_PI_3).abs() < 1e-5, "step {step}");
    }

    #[test]
    fn negative_speed_never_reaches_a_full_turn() {
        for secs in [1e-12, 1e-9, 0.5, 1_000.0] {
            let angle = rotation_angle(secs, -FRAC_PI_3);
            assert!((0.0..TAU_F32).contains(&angle), "{angle} out of range at {secs}");
        }
    }

    #[test]
    fn rotate_only_touches_y_rotation() {
        let mut transform = Transform::default();
        transform.rotation.x = 0.25;
        transform.position.y = 3.0;
        rotate(&mut transform, &clock_at(1.5), 2.0);
        assert!((transform.rotation.y - 3.0).abs() < EPSILON);
        assert!((transform.rotation.x - 0.25).abs() < EPSILON);
        assert!((transform.position.y - 3.0).abs() < EPSILON);
    }

    #[test]
    fn replaying_elapsed_time_is_idempotent() {
        let clock = clock_at(42.0);
        let mut first = Transform::default();
        rotate(&mut first, &clock, FRAC_PI_3);
        bounce(&mut first, &clock, 1.0, 0.5, 0.5);
        let mut second = first;
        rotate(&mut second, &clock, FRAC_PI_3);
        bounce(&mut second, &clock, 1.0, 0.5, 0.5);
        assert_eq!(first, second);
    }

    #[test]
    fn bounce_stays_between_floor_and_peak() {
        let (height, offset) = (0.5, 0.5);
        for step in 0..1000 {
            let secs = f64::from(step) * 0.037;
            let y = bounce_height(secs, 1.0, height, offset);
            assert!(y >= FLOOR_HEIGHT + offset - EPSILON);
            assert!(y <= FLOOR_HEIGHT + height + offset + EPSILON);
        }
    }

    #[test]
    fn bounce_starts_at_rest_and_peaks_at_quarter_period() {
        let mut transform = Transform::default();
        bounce(&mut transform, &clock_at(0.0), 1.0, 0.5, 0.5);
        assert!((transform.position.y - 0.5).abs() < EPSILON);
        bounce(&mut transform, &clock_at(FRAC_PI_2), 1.0, 0.5, 0.5);
        assert!((transform.position.y - 1.0).abs() < EPSILON);
    }
}
