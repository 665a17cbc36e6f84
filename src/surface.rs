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
use std::collections::BTreeSet;

use anyhow::bail;
use log::debug;

use crate::{
    cameras::PerspectiveCamera,
    geometry::{Geometry, Topology},
    scene::SceneGraph,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn surface_ratio(&self) -> f32 {
        if self.height > 0 {
            self.width as f32 / self.height as f32
        } else {
            1.0
        }
    }
}

/// Identifies geometry buffers owned by a render surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GeometryHandle(pub(crate) u32);

/// Whatever draws the scene graph: the GPU renderer, or the headless recorder.
pub trait RenderSurface {
    /// Size of the backing store the next frame renders into.
    fn backing_size(&self) -> Dimensions;

    /// Resizes the backing store when it no longer matches the display size.
    /// Returns the new size when a resize happened.
    fn resize_to_display_size(&mut self) -> Option<Dimensions>;

    fn upload_geometry(&mut self, geometry: &Geometry) -> anyhow::Result<GeometryHandle>;

    /// Frees the buffers behind `handle`. Releasing an unknown handle is a no-op.
    fn release_geometry(&mut self, handle: GeometryHandle);

    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) -> anyhow::Result<()>;
}

pub(crate) fn validate_geometry(geometry: &Geometry) -> anyhow::Result<()> {
    let vertex_count = geometry.vertex_count();
    if vertex_count == 0 || geometry.indices.is_empty() {
        bail!("Geometry {:?} is empty", geometry.label);
    }
    if let Some(index) = geometry.indices.iter().find(|&&i| i as usize >= vertex_count) {
        bail!(
            "Geometry {:?} references vertex {index} but only has {vertex_count}",
            geometry.label
        );
    }
    let (attribute, len) = match geometry.topology {
        Topology::Triangles => ("normals", geometry.normals.len()),
        Topology::Lines => ("colors", geometry.colors.len()),
    };
    if len != vertex_count {
        bail!(
            "Geometry {:?} has {len} {attribute} for {vertex_count} vertices",
            geometry.label
        );
    }
    Ok(())
}

/// What a headless frame would have drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedFrame {
    pub camera_eye: [f32; 3],
    pub camera_aspect: f32,
    pub drawn: Vec<GeometryHandle>,
}

/// Render surface without a GPU: keeps track of geometry and records frames.
///
/// Used by the headless driver and the tests.
pub struct HeadlessSurface {
    display_size: Dimensions,
    backing_size: Dimensions,
    next_handle: u32,
    live_geometry: BTreeSet<GeometryHandle>,
    frames_rendered: usize,
    last_frame: Option<RenderedFrame>,
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SIZE)
    }
}

impl HeadlessSurface {
    pub const DEFAULT_SIZE: Dimensions = Dimensions {
        width: 800,
        height: 600,
    };

    #[must_use]
    pub fn new(size: Dimensions) -> Self {
        Self {
            display_size: size,
            backing_size: size,
            next_handle: 0,
            live_geometry: BTreeSet::new(),
            frames_rendered: 0,
            last_frame: None,
        }
    }

    /// Simulates the window changing size; picked up by the next step.
    pub fn set_display_size(&mut self, size: Dimensions) {
        self.display_size = size;
    }

    #[must_use]
    pub fn frames_rendered(&self) -> usize {
        self.frames_rendered
    }

    #[must_use]
    pub fn last_frame(&self) -> Option<&RenderedFrame> {
        self.last_frame.as_ref()
    }

    #[must_use]
    pub fn is_live(&self, handle: GeometryHandle) -> bool {
        self.live_geometry.contains(&handle)
    }

    #[must_use]
    pub fn live_geometry_count(&self) -> usize {
        self.live_geometry.len()
    }
}

impl RenderSurface for HeadlessSurface {
    fn backing_size(&self) -> Dimensions {
        self.backing_size
    }

    fn resize_to_display_size(&mut self) -> Option<Dimensions> {
        if self.backing_size == self.display_size {
            return None;
        }
        self.backing_size = self.display_size;
        Some(self.backing_size)
    }

    fn upload_geometry(&mut self, geometry: &Geometry) -> anyhow::Result<GeometryHandle> {
        validate_geometry(geometry)?;
        let handle = GeometryHandle(self.next_handle);
        self.next_handle += 1;
        self.live_geometry.insert(handle);
        debug!("Uploaded {:?} geometry as {handle:?}", geometry.label);
        Ok(handle)
    }

    fn release_geometry(&mut self, handle: GeometryHandle) {
        self.live_geometry.remove(&handle);
    }

    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) -> anyhow::Result<()> {
        let drawn = scene
            .drawables()
            .filter(|drawable| self.live_geometry.contains(&drawable.geometry))
            .map(|drawable| drawable.geometry)
            .collect();
        self.frames_rendered += 1;
        self.last_frame = Some(RenderedFrame {
            camera_eye: camera.position.into(),
            camera_aspect: camera.aspect,
            drawn,
        });
        Ok(())
    }
}
