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
use cgmath::Vector3;

use crate::color::Color;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
    pub visible: bool,
}

impl AmbientLight {
    #[must_use]
    pub fn new(color: Color, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            visible: true,
        }
    }

    /// Linear radiance added to every surface, zero when hidden.
    #[must_use]
    pub fn radiance(&self) -> [f32; 3] {
        if self.visible {
            self.color.scaled_linear(self.intensity)
        } else {
            [0.0; 3]
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub color: Color,
    pub intensity: f32,
    /// Range after which the light contributes nothing, 0 for unbounded.
    pub distance: f32,
    pub decay: f32,
    pub position: Vector3<f32>,
    pub visible: bool,
}

impl PointLight {
    pub const DEFAULT_DECAY: f32 = 2.0;

    #[must_use]
    pub fn new(color: Color, intensity: f32, distance: f32) -> Self {
        Self {
            color,
            intensity,
            distance,
            decay: Self::DEFAULT_DECAY,
            position: Vector3::new(0.0, 0.0, 0.0),
            visible: true,
        }
    }

    #[must_use]
    pub fn radiance(&self) -> [f32; 3] {
        if self.visible {
            self.color.scaled_linear(self.intensity)
        } else {
            [0.0; 3]
        }
    }
}
