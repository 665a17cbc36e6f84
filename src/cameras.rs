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
use std::f32::consts::{PI, TAU};
use std::sync::LazyLock;

use cgmath::{
    Deg, EuclideanSpace, InnerSpace, Matrix4, Point2, Point3, SquareMatrix, Vector3, Vector4,
    perspective, vec3,
};

use crate::input::{InputEvent, PointerButton};

static TO_WEBGPU_NDCS: LazyLock<Matrix4<f32>> = LazyLock::new(|| {
    Matrix4::from_translation(vec3(0., 0., 0.5)) * Matrix4::from_nonuniform_scale(1., 1., 0.5)
});

/// Half-line used for pointer picking.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    #[must_use]
    pub fn at(&self, distance: f32) -> Point3<f32> {
        self.origin + self.direction * distance
    }

    /// Distance to the plane through `point` with `normal`, if hit in front of the origin.
    #[must_use]
    pub fn intersect_plane(&self, point: Point3<f32>, normal: Vector3<f32>) -> Option<f32> {
        let denom = self.direction.dot(normal);
        if denom.abs() < 1e-6 {
            return None;
        }
        let distance = (point - self.origin).dot(normal) / denom;
        (distance >= 0.0).then_some(distance)
    }

    /// Nearest hit against the box `[-half, half]` after moving it by `model`.
    #[must_use]
    pub fn intersect_box(&self, model: Matrix4<f32>, half: Vector3<f32>) -> Option<f32> {
        let inverse = model.invert()?;
        let origin = inverse * self.origin.to_homogeneous();
        let origin = origin.truncate() / origin.w;
        let direction = (inverse * self.direction.extend(0.0)).truncate();
        let mut near = f32::NEG_INFINITY;
        let mut far = f32::INFINITY;
        for axis in 0..3 {
            if direction[axis].abs() < 1e-9 {
                if origin[axis].abs() > half[axis] {
                    return None;
                }
                continue;
            }
            let t1 = (-half[axis] - origin[axis]) / direction[axis];
            let t2 = (half[axis] - origin[axis]) / direction[axis];
            near = near.max(t1.min(t2));
            far = far.min(t1.max(t2));
        }
        if near > far || far < 0.0 {
            return None;
        }
        // Same parameter in world space since the direction went through the same linear map.
        Some(near.max(0.0))
    }
}

/// Right-handed, Y-up perspective camera looking at a point.
pub struct PerspectiveCamera {
    /// Vertical field of view, in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Point3<f32>,
    pub up: Vector3<f32>,
    look_at: Point3<f32>,
    projection_cache: Matrix4<f32>,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(75.0, 1.0, 0.1, 1_000.0)
    }
}

impl PerspectiveCamera {
    #[must_use]
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            fov,
            aspect,
            near,
            far,
            position: Point3::new(0.0, 0.0, 1.0),
            up: Vector3::unit_y(),
            look_at: Point3::origin(),
            projection_cache: Matrix4::identity(),
        };
        camera.update_projection_matrix();
        camera
    }

    /// Recomputes the projection after `fov`, `aspect`, `near` or `far` changed.
    pub fn update_projection_matrix(&mut self) {
        self.projection_cache = perspective(Deg(self.fov), self.aspect, self.near, self.far);
    }

    pub fn look_at(&mut self, target: Point3<f32>) {
        self.look_at = target;
    }

    #[must_use]
    pub fn looking_at(&self) -> Point3<f32> {
        self.look_at
    }

    #[must_use]
    pub fn direction(&self) -> Vector3<f32> {
        (self.look_at - self.position).normalize()
    }

    #[must_use]
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.look_at, self.up)
    }

    #[must_use]
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection_cache
    }

    /// View-projection with depth mapped to the `[0, 1]` range wgpu expects.
    #[must_use]
    pub fn view_projection(&self) -> Matrix4<f32> {
        (*TO_WEBGPU_NDCS) * self.projection_cache * self.view_matrix()
    }

    /// Ray through a point given in normalized device coordinates (`[-1, 1]`, y up).
    #[must_use]
    pub fn ray_from_ndc(&self, ndc: Point2<f32>) -> Option<Ray> {
        let inverse = (self.projection_cache * self.view_matrix()).invert()?;
        let unproject = |z: f32| {
            let p = inverse * Vector4::new(ndc.x, ndc.y, z, 1.0);
            Point3::from_vec(p.truncate() / p.w)
        };
        let near = unproject(-1.0);
        let far = unproject(1.0);
        Some(Ray {
            origin: self.position,
            direction: (far - near).normalize(),
        })
    }
}

/// Radius, polar angle from +Y, azimuth around +Y starting at +Z.
#[derive(Clone, Copy, Debug)]
struct Spherical {
    radius: f32,
    phi: f32,
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: Vector3<f32>) -> Self {
        let radius = offset.magnitude();
        if radius == 0.0 {
            return Self {
                radius,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            theta: offset.x.atan2(offset.z),
        }
    }

    fn to_offset(self) -> Vector3<f32> {
        let sin_phi = self.phi.sin();
        Vector3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum OrbitState {
    Idle,
    Rotating { last: Point2<f32> },
}

/// Orbits the camera around `target` with pointer drags and the wheel.
pub struct OrbitControls {
    pub enabled: bool,
    pub target: Point3<f32>,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub auto_rotate: bool,
    /// Turns per minute are `auto_rotate_speed / 2` at 60 updates per second.
    pub auto_rotate_speed: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    state: OrbitState,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
}

impl OrbitControls {
    const POLAR_EPSILON: f32 = 1e-6;
    const ZOOM_BASE: f32 = 0.95;

    #[must_use]
    pub fn new(target: Point3<f32>) -> Self {
        Self {
            enabled: true,
            target,
            enable_damping: false,
            damping_factor: 0.05,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            state: OrbitState::Idle,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
        }
    }

    #[must_use]
    pub fn is_rotating(&self) -> bool {
        matches!(self.state, OrbitState::Rotating { .. })
    }

    /// Feeds one pointer event. Returns true when the event was used.
    pub fn handle_input(&mut self, event: &InputEvent, aspect: f32) -> bool {
        if !self.enabled {
            self.state = OrbitState::Idle;
            return false;
        }
        match (*event, self.state) {
            (
                InputEvent::PointerPressed {
                    button: PointerButton::Primary,
                    position,
                },
                _,
            ) => {
                self.state = OrbitState::Rotating { last: position };
                true
            }
            (InputEvent::PointerMoved { position }, OrbitState::Rotating { last }) => {
                // Pointer travel relative to the viewport height drives a full turn.
                let dx = (position.x - last.x) * aspect / 2.0;
                let dy = (position.y - last.y) / 2.0;
                self.rotate_left(TAU * dx * self.rotate_speed);
                self.rotate_up(-TAU * dy * self.rotate_speed);
                self.state = OrbitState::Rotating { last: position };
                true
            }
            (
                InputEvent::PointerReleased {
                    button: PointerButton::Primary,
                    ..
                }
                | InputEvent::PointerLeft,
                OrbitState::Rotating { .. },
            ) => {
                self.state = OrbitState::Idle;
                true
            }
            (InputEvent::Wheel { delta }, _) if delta != 0.0 => {
                let zoom = Self::ZOOM_BASE.powf(self.zoom_speed);
                if delta > 0.0 {
                    self.scale *= zoom;
                } else {
                    self.scale /= zoom;
                }
                true
            }
            _ => false,
        }
    }

    fn rotate_left(&mut self, angle: f32) {
        self.delta_theta -= angle;
    }

    fn rotate_up(&mut self, angle: f32) {
        self.delta_phi -= angle;
    }

    /// Applies pending rotation and zoom, plus auto-rotation, then aims the camera at the target.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) {
        let mut spherical = Spherical::from_offset(camera.position - self.target);
        if self.auto_rotate && !self.is_rotating() {
            self.rotate_left(TAU / 60.0 / 60.0 * self.auto_rotate_speed);
        }
        if self.enable_damping {
            spherical.theta += self.delta_theta * self.damping_factor;
            spherical.phi += self.delta_phi * self.damping_factor;
        } else {
            spherical.theta += self.delta_theta;
            spherical.phi += self.delta_phi;
        }
        spherical.theta = (spherical.theta + PI).rem_euclid(TAU) - PI;
        spherical.phi = spherical
            .phi
            .clamp(Self::POLAR_EPSILON, PI - Self::POLAR_EPSILON);
        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        camera.position = self.target + spherical.to_offset();
        camera.look_at(self.target);

        if self.enable_damping {
            self.delta_theta *= 1.0 - self.damping_factor;
            self.delta_phi *= 1.0 - self.damping_factor;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
        }
        self.scale = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn camera_at(position: Point3<f32>) -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(75.0, 1.0, 0.1, 1000.0);
        camera.position = position;
        camera.look_at(Point3::origin());
        camera
    }

    #[test]
    fn spherical_round_trip() {
        let offset = Vector3::new(2.0, 1.5, -5.0);
        let back = Spherical::from_offset(offset).to_offset();
        assert!((back - offset).magnitude() < EPSILON);
    }

    #[test]
    fn center_ray_points_forward() {
        let camera = camera_at(Point3::new(0.0, 0.0, 5.0));
        let ray = camera.ray_from_ndc(Point2::new(0.0, 0.0)).unwrap();
        assert!((ray.direction - Vector3::new(0.0, 0.0, -1.0)).magnitude() < EPSILON);
        let hit = ray
            .intersect_box(Matrix4::identity(), Vector3::new(0.5, 0.5, 0.5))
            .unwrap();
        assert!((hit - 4.5).abs() < EPSILON);
    }

    #[test]
    fn ray_misses_box_off_axis() {
        let camera = camera_at(Point3::new(0.0, 0.0, 5.0));
        let ray = camera.ray_from_ndc(Point2::new(0.9, 0.9)).unwrap();
        assert!(
            ray.intersect_box(Matrix4::identity(), Vector3::new(0.5, 0.5, 0.5))
                .is_none()
        );
    }

    #[test]
    fn plane_intersection_ignores_planes_behind() {
        let ray = Ray {
            origin: Point3::new(0.0, 1.0, 0.0),
            direction: Vector3::new(0.0, -1.0, 0.0),
        };
        let hit = ray.intersect_plane(Point3::origin(), Vector3::unit_y()).unwrap();
        assert!((ray.at(hit) - Point3::origin()).magnitude() < EPSILON);
        assert!(
            ray.intersect_plane(Point3::new(0.0, 2.0, 0.0), Vector3::unit_y())
                .is_none()
        );
    }

    #[test]
    fn auto_rotate_keeps_distance_to_target() {
        let mut camera = camera_at(Point3::new(2.0, 2.0, 5.0));
        let mut controls = OrbitControls::new(Point3::origin());
        controls.auto_rotate = true;
        let radius = camera.position.to_vec().magnitude();
        for _ in 0..120 {
            controls.update(&mut camera);
        }
        assert!((camera.position.to_vec().magnitude() - radius).abs() < 1e-3);
        assert!((camera.position - Point3::new(2.0, 2.0, 5.0)).magnitude() > 0.1);
        assert_eq!(camera.looking_at(), Point3::origin());
    }

    #[test]
    fn damping_spreads_rotation_over_frames() {
        let mut camera = camera_at(Point3::new(0.0, 0.0, 5.0));
        let mut controls = OrbitControls::new(Point3::origin());
        controls.enable_damping = true;
        let press = InputEvent::PointerPressed {
            button: PointerButton::Primary,
            position: Point2::new(0.0, 0.0),
        };
        assert!(controls.handle_input(&press, 1.0));
        assert!(controls.handle_input(
            &InputEvent::PointerMoved {
                position: Point2::new(0.2, 0.0)
            },
            1.0
        ));
        controls.update(&mut camera);
        let first = camera.position;
        controls.update(&mut camera);
        let second = camera.position;
        assert!((first - Point3::new(0.0, 0.0, 5.0)).magnitude() > 0.0);
        assert!((second - first).magnitude() > 0.0);
    }

    #[test]
    fn disabled_controls_ignore_pointer() {
        let mut controls = OrbitControls::new(Point3::origin());
        controls.enabled = false;
        let press = InputEvent::PointerPressed {
            button: PointerButton::Primary,
            position: Point2::new(0.0, 0.0),
        };
        assert!(!controls.handle_input(&press, 1.0));
        assert!(!controls.is_rotating());
    }

    #[test]
    fn wheel_up_moves_closer() {
        let mut camera = camera_at(Point3::new(0.0, 0.0, 5.0));
        let mut controls = OrbitControls::new(Point3::origin());
        controls.handle_input(&InputEvent::Wheel { delta: 1.0 }, 1.0);
        controls.update(&mut camera);
        assert!((camera.position.z - 4.75).abs() < EPSILON);
    }
}
