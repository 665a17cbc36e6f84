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
use std::f32::consts::{FRAC_PI_2, FRAC_PI_3};

use cgmath::{Matrix4, Rad, Vector3};
use log::{debug, warn};

use crate::{
    animations,
    clock::Clock,
    color::Color,
    geometry::{box_geometry, plane_geometry},
    surface::{GeometryHandle, RenderSurface},
};

/// Position, Euler rotation (radians, applied X then Y then Z) and scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    #[must_use]
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from_angle_x(Rad(self.rotation.x))
            * Matrix4::from_angle_y(Rad(self.rotation.y))
            * Matrix4::from_angle_z(Rad(self.rotation.z))
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShadingModel {
    /// Diffuse plus a roughness-driven highlight; metalness tints it.
    Standard,
    /// Diffuse only.
    Lambert,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Front,
    Double,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub shading: ShadingModel,
    pub color: Color,
    pub emissive: Color,
    pub emissive_intensity: f32,
    pub metalness: f32,
    pub roughness: f32,
    pub opacity: f32,
    pub transparent: bool,
    pub wireframe: bool,
    pub side: Side,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            shading: ShadingModel::Standard,
            color: Color::WHITE,
            emissive: Color::BLACK,
            emissive_intensity: 1.0,
            metalness: 0.0,
            roughness: 1.0,
            opacity: 1.0,
            transparent: false,
            wireframe: false,
            side: Side::Front,
        }
    }
}

impl Material {
    /// Opacity only takes effect on transparent materials.
    #[must_use]
    pub fn effective_opacity(&self) -> f32 {
        if self.transparent {
            self.opacity.clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    Cube,
    Plane,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Constructed,
    Active,
    Disposed,
}

/// A renderable entity: geometry handle, material and transform.
#[derive(Debug)]
pub struct SceneObject {
    pub kind: ObjectKind,
    pub geometry: GeometryHandle,
    pub material: Material,
    pub transform: Transform,
    pub visible: bool,
    /// Local-space half size, used for pointer picking.
    pub half_extents: Vector3<f32>,
    lifecycle: Lifecycle,
}

impl SceneObject {
    #[must_use]
    pub fn new(
        kind: ObjectKind,
        geometry: GeometryHandle,
        material: Material,
        half_extents: Vector3<f32>,
    ) -> Self {
        Self {
            kind,
            geometry,
            material,
            transform: Transform::default(),
            visible: true,
            half_extents,
            lifecycle: Lifecycle::Constructed,
        }
    }

    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }

    /// Starts receiving updates. Returns false for a disposed object, which stays disposed.
    pub fn activate(&mut self) -> bool {
        match self.lifecycle {
            Lifecycle::Disposed => {
                warn!("Refusing to activate disposed {:?}", self.kind);
                false
            }
            Lifecycle::Constructed | Lifecycle::Active => {
                self.lifecycle = Lifecycle::Active;
                true
            }
        }
    }
}

pub const CUBE_SIDE: f32 = 1.0;
pub const CUBE_COLOR: Color = Color::from_rgb8(0xf6, 0x9f, 0x1f);
pub const CUBE_METALNESS: f32 = 0.5;
pub const CUBE_ROUGHNESS: f32 = 0.7;
pub const CUBE_REST_HEIGHT: f32 = 0.5;
pub const CUBE_ROTATION_SPEED: f32 = FRAC_PI_3;
pub const CUBE_BOUNCE_SPEED: f32 = 1.0;
pub const CUBE_BOUNCE_HEIGHT: f32 = 0.5;
pub const CUBE_BOUNCE_OFFSET: f32 = 0.5;
pub const PLANE_SIDE: f32 = 3.0;

pub fn create_cube(surface: &mut impl RenderSurface) -> anyhow::Result<SceneObject> {
    let geometry = box_geometry(CUBE_SIDE, CUBE_SIDE, CUBE_SIDE);
    let handle = surface.upload_geometry(&geometry)?;
    let material = Material {
        color: CUBE_COLOR,
        metalness: CUBE_METALNESS,
        roughness: CUBE_ROUGHNESS,
        ..Material::default()
    };
    let mut cube = SceneObject::new(
        ObjectKind::Cube,
        handle,
        material,
        geometry.half_extents().into(),
    );
    cube.transform.position.y = CUBE_REST_HEIGHT;
    Ok(cube)
}

pub fn create_plane(surface: &mut impl RenderSurface) -> anyhow::Result<SceneObject> {
    let geometry = plane_geometry(PLANE_SIDE, PLANE_SIDE);
    let handle = surface.upload_geometry(&geometry)?;
    let material = Material {
        shading: ShadingModel::Lambert,
        color: Color::GRAY,
        emissive: Color::TEAL,
        emissive_intensity: 0.2,
        side: Side::Double,
        transparent: true,
        opacity: 0.4,
        ..Material::default()
    };
    let mut plane = SceneObject::new(
        ObjectKind::Plane,
        handle,
        material,
        geometry.half_extents().into(),
    );
    plane.transform.rotation.x = FRAC_PI_2;
    Ok(plane)
}

/// Per-frame update. Only active objects move; the plane never does.
pub fn update(object: &mut SceneObject, clock: &Clock) {
    if !object.is_active() {
        return;
    }
    match object.kind {
        ObjectKind::Cube => {
            animations::rotate(&mut object.transform, clock, CUBE_ROTATION_SPEED);
            animations::bounce(
                &mut object.transform,
                clock,
                CUBE_BOUNCE_SPEED,
                CUBE_BOUNCE_HEIGHT,
                CUBE_BOUNCE_OFFSET,
            );
        }
        ObjectKind::Plane => {}
    }
}

/// Releases the object's geometry. Later calls are no-ops.
pub fn dispose(object: &mut SceneObject, surface: &mut impl RenderSurface) {
    if object.lifecycle == Lifecycle::Disposed {
        debug!("{:?} already disposed", object.kind);
        return;
    }
    surface.release_geometry(object.geometry);
    object.lifecycle = Lifecycle::Disposed;
}

#[cfg(test)]
mod tests {
    use web_time::Duration;

    use super::*;
    use crate::surface::HeadlessSurface;

    #[test]
    fn cube_starts_resting_on_the_floor() {
        let mut surface = HeadlessSurface::default();
        let cube = create_cube(&mut surface).unwrap();
        assert_eq!(cube.lifecycle(), Lifecycle::Constructed);
        assert!((cube.transform.position.y - CUBE_REST_HEIGHT).abs() < f32::EPSILON);
        assert_eq!(cube.half_extents, Vector3::new(0.5, 0.5, 0.5));
        assert_eq!(cube.material.effective_opacity(), 1.0);
    }

    #[test]
    fn constructed_objects_ignore_updates() {
        let mut surface = HeadlessSurface::default();
        let mut cube = create_cube(&mut surface).unwrap();
        let before = cube.transform;
        let mut clock = Clock::manual();
        clock.advance(Duration::from_secs(1));
        update(&mut cube, &clock);
        assert_eq!(cube.transform, before);
        assert!(cube.activate());
        update(&mut cube, &clock);
        assert_ne!(cube.transform, before);
    }

    #[test]
    fn plane_update_is_empty() {
        let mut surface = HeadlessSurface::default();
        let mut plane = create_plane(&mut surface).unwrap();
        plane.activate();
        let before = plane.transform;
        let mut clock = Clock::manual();
        clock.advance(Duration::from_secs(7));
        update(&mut plane, &clock);
        assert_eq!(plane.transform, before);
        assert!((plane.material.effective_opacity() - 0.4).abs() < f32::EPSILON);
    }

    #[test]
    fn dispose_is_idempotent_and_final() {
        let mut surface = HeadlessSurface::default();
        let mut cube = create_cube(&mut surface).unwrap();
        cube.activate();
        dispose(&mut cube, &mut surface);
        assert!(!surface.is_live(cube.geometry));
        dispose(&mut cube, &mut surface);
        assert_eq!(cube.lifecycle(), Lifecycle::Disposed);
        assert!(!cube.activate());

        let before = cube.transform;
        let mut clock = Clock::manual();
        clock.advance(Duration::from_secs(2));
        update(&mut cube, &clock);
        assert_eq!(cube.transform, before);
    }

    #[test]
    fn transform_matrix_applies_translation_last() {
        let transform = Transform {
            position: Vector3::new(1.0, 2.0, 3.0),
            rotation: Vector3::new(0.0, FRAC_PI_2, 0.0),
            ..Transform::default()
        };
        let matrix = transform.matrix();
        assert_eq!(matrix.w.truncate(), Vector3::new(1.0, 2.0, 3.0));
    }
}
