/*
MIT License

Copyright (c) 2021, 2022, 2024, 2025 Vincent Hiribarren

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

mod launcher;
mod window;

pub(crate) mod draw_context;

pub mod animations;
pub mod cameras;
pub mod clock;
pub mod color;
pub mod config;
pub mod drag;
pub mod geometry;
pub mod helpers;
pub mod input;
pub mod lights;
pub mod loading;
pub mod objects;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod stats;
pub mod surface;

#[cfg(feature = "egui")]
pub mod gui;
#[cfg(feature = "egui")]
pub mod overlay;

pub use launcher::launch_app;
pub use scene::{AnimationState, SceneApp, SceneGraph};
pub use surface::{Dimensions, HeadlessSurface, RenderSurface};
