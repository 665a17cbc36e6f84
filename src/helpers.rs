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
use log::debug;

use crate::{
    color::Color,
    geometry::{axes_geometry, grid_geometry, wire_sphere_geometry},
    objects::Transform,
    surface::{GeometryHandle, RenderSurface},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HelperKind {
    Axes,
    Grid,
    PointLight,
}

/// Line-drawn scene furniture: axes, floor grid, light marker.
#[derive(Debug)]
pub struct Helper {
    pub kind: HelperKind,
    pub geometry: GeometryHandle,
    pub transform: Transform,
    pub visible: bool,
    disposed: bool,
}

impl Helper {
    fn new(kind: HelperKind, geometry: GeometryHandle) -> Self {
        Self {
            kind,
            geometry,
            transform: Transform::default(),
            visible: true,
            disposed: false,
        }
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn dispose(&mut self, surface: &mut impl RenderSurface) {
        if self.disposed {
            debug!("{:?} helper already disposed", self.kind);
            return;
        }
        surface.release_geometry(self.geometry);
        self.disposed = true;
    }
}

pub const AXES_SIZE: f32 = 4.0;
pub const GRID_SIZE: f32 = 20.0;
pub const GRID_DIVISIONS: u32 = 20;
pub const GRID_HEIGHT: f32 = -0.01;
pub const POINT_LIGHT_HELPER_RADIUS: f32 = 1.0;

pub fn create_axes(surface: &mut impl RenderSurface) -> anyhow::Result<Helper> {
    let handle = surface.upload_geometry(&axes_geometry(AXES_SIZE))?;
    Ok(Helper::new(HelperKind::Axes, handle))
}

pub fn create_grid(surface: &mut impl RenderSurface) -> anyhow::Result<Helper> {
    let geometry = grid_geometry(GRID_SIZE, GRID_DIVISIONS, Color::TEAL, Color::DARK_GRAY);
    let mut grid = Helper::new(HelperKind::Grid, surface.upload_geometry(&geometry)?);
    grid.transform.position.y = GRID_HEIGHT;
    Ok(grid)
}

pub fn create_point_light_helper(
    surface: &mut impl RenderSurface,
    color: Color,
) -> anyhow::Result<Helper> {
    let geometry = wire_sphere_geometry(POINT_LIGHT_HELPER_RADIUS, 4, 2, color);
    Ok(Helper::new(
        HelperKind::PointLight,
        surface.upload_geometry(&geometry)?,
    ))
}
