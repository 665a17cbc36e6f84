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
use cgmath::{EuclideanSpace, Point2, Point3, Vector3};

use crate::{
    cameras::{PerspectiveCamera, Ray},
    input::{InputEvent, PointerButton},
    objects::Transform,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragEvent {
    HoverOn,
    HoverOff,
    DragStart,
    DragEnd,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DragOutcome {
    /// The event belongs to the drag and must not reach other controls.
    pub consumed: bool,
    pub event: Option<DragEvent>,
}

impl DragOutcome {
    const IGNORED: Self = Self {
        consumed: false,
        event: None,
    };

    fn consumed(event: Option<DragEvent>) -> Self {
        Self {
            consumed: true,
            event,
        }
    }

    fn passed(event: Option<DragEvent>) -> Self {
        Self {
            consumed: false,
            event,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Grab {
    plane_normal: Vector3<f32>,
    offset: Vector3<f32>,
}

/// Moves one object on the plane facing the camera while the primary button is held.
#[derive(Default)]
pub struct DragControls {
    pub enabled: bool,
    hovered: bool,
    grab: Option<Grab>,
}

impl DragControls {
    #[must_use]
    pub fn is_hovering(&self) -> bool {
        self.hovered
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.grab.is_some()
    }

    pub fn handle_input(
        &mut self,
        event: &InputEvent,
        camera: &PerspectiveCamera,
        target: &mut Transform,
        half_extents: Vector3<f32>,
    ) -> DragOutcome {
        if !self.enabled {
            return self.release_all();
        }
        match *event {
            InputEvent::PointerMoved { position } => {
                let Some(ray) = camera.ray_from_ndc(position) else {
                    return DragOutcome::IGNORED;
                };
                if let Some(grab) = self.grab {
                    Self::follow(&ray, grab, target);
                    return DragOutcome::consumed(None);
                }
                let hovered = Self::pick(&ray, target, half_extents).is_some();
                DragOutcome::passed(self.set_hovered(hovered))
            }
            InputEvent::PointerPressed {
                button: PointerButton::Primary,
                position,
            } => self.start(position, camera, target, half_extents),
            InputEvent::PointerReleased {
                button: PointerButton::Primary,
                ..
            }
            | InputEvent::PointerLeft => match self.grab.take() {
                Some(_) => DragOutcome::consumed(Some(DragEvent::DragEnd)),
                None if matches!(event, InputEvent::PointerLeft) => {
                    DragOutcome::passed(self.set_hovered(false))
                }
                None => DragOutcome::IGNORED,
            },
            _ => DragOutcome::IGNORED,
        }
    }

    fn start(
        &mut self,
        position: Point2<f32>,
        camera: &PerspectiveCamera,
        target: &Transform,
        half_extents: Vector3<f32>,
    ) -> DragOutcome {
        let Some(ray) = camera.ray_from_ndc(position) else {
            return DragOutcome::IGNORED;
        };
        if Self::pick(&ray, target, half_extents).is_none() {
            return DragOutcome::IGNORED;
        }
        let plane_normal = camera.direction();
        let anchor = Point3::from_vec(target.position);
        let Some(distance) = ray.intersect_plane(anchor, plane_normal) else {
            return DragOutcome::IGNORED;
        };
        self.grab = Some(Grab {
            plane_normal,
            offset: ray.at(distance) - anchor,
        });
        self.hovered = true;
        DragOutcome::consumed(Some(DragEvent::DragStart))
    }

    fn follow(ray: &Ray, grab: Grab, target: &mut Transform) {
        let anchor = Point3::from_vec(target.position);
        if let Some(distance) = ray.intersect_plane(anchor + grab.offset, grab.plane_normal) {
            target.position = (ray.at(distance) - grab.offset).to_vec();
        }
    }

    fn pick(ray: &Ray, target: &Transform, half_extents: Vector3<f32>) -> Option<f32> {
        ray.intersect_box(target.matrix(), half_extents)
    }

    fn set_hovered(&mut self, hovered: bool) -> Option<DragEvent> {
        if hovered == self.hovered {
            return None;
        }
        self.hovered = hovered;
        Some(if hovered {
            DragEvent::HoverOn
        } else {
            DragEvent::HoverOff
        })
    }

    /// Ends whatever was going on when the controls got disabled, one event at a time.
    fn release_all(&mut self) -> DragOutcome {
        if self.grab.take().is_some() {
            return DragOutcome::consumed(Some(DragEvent::DragEnd));
        }
        DragOutcome::passed(self.set_hovered(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn half() -> Vector3<f32> {
        Vector3::new(0.5, 0.5, 0.5)
    }

    fn front_camera() -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(75.0, 1.0, 0.1, 1000.0);
        camera.position = Point3::new(0.0, 0.0, 5.0);
        camera.look_at(Point3::origin());
        camera
    }

    fn moved(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerMoved {
            position: Point2::new(x, y),
        }
    }

    #[test]
    fn disabled_controls_pass_everything_through() {
        let mut controls = DragControls::default();
        let mut target = Transform::default();
        let outcome = controls.handle_input(&moved(0.0, 0.0), &front_camera(), &mut target, half());
        assert_eq!(outcome, DragOutcome::IGNORED);
        assert!(!controls.is_hovering());
    }

    #[test]
    fn hover_fires_once_per_transition() {
        let camera = front_camera();
        let mut controls = DragControls {
            enabled: true,
            ..DragControls::default()
        };
        let mut target = Transform::default();
        let on = controls.handle_input(&moved(0.0, 0.0), &camera, &mut target, half());
        assert_eq!(on, DragOutcome::passed(Some(DragEvent::HoverOn)));
        let still = controls.handle_input(&moved(0.01, 0.0), &camera, &mut target, half());
        assert_eq!(still, DragOutcome::IGNORED);
        let off = controls.handle_input(&moved(0.9, 0.9), &camera, &mut target, half());
        assert_eq!(off, DragOutcome::passed(Some(DragEvent::HoverOff)));
    }

    #[test]
    fn drag_moves_target_with_pointer() {
        let camera = front_camera();
        let mut controls = DragControls {
            enabled: true,
            ..DragControls::default()
        };
        let mut target = Transform::default();
        let press = InputEvent::PointerPressed {
            button: PointerButton::Primary,
            position: Point2::new(0.0, 0.0),
        };
        let started = controls.handle_input(&press, &camera, &mut target, half());
        assert_eq!(started, DragOutcome::consumed(Some(DragEvent::DragStart)));

        let dragged = controls.handle_input(&moved(0.2, 0.0), &camera, &mut target, half());
        assert!(dragged.consumed);
        assert!(target.position.x > 0.0);
        assert!(target.position.y.abs() < 1e-4);
        assert!(target.position.z.abs() < 1e-4);

        let release = InputEvent::PointerReleased {
            button: PointerButton::Primary,
            position: Point2::new(0.2, 0.0),
        };
        let ended = controls.handle_input(&release, &camera, &mut target, half());
        assert_eq!(ended, DragOutcome::consumed(Some(DragEvent::DragEnd)));
        assert!(!controls.is_dragging());
    }

    #[test]
    fn press_outside_target_is_not_consumed() {
        let camera = front_camera();
        let mut controls = DragControls {
            enabled: true,
            ..DragControls::default()
        };
        let mut target = Transform::default();
        let press = InputEvent::PointerPressed {
            button: PointerButton::Primary,
            position: Point2::new(0.9, -0.9),
        };
        assert_eq!(
            controls.handle_input(&press, &camera, &mut target, half()),
            DragOutcome::IGNORED
        );
    }

    #[test]
    fn disabling_mid_drag_ends_the_drag() {
        let camera = front_camera();
        let mut controls = DragControls {
            enabled: true,
            ..DragControls::default()
        };
        let mut target = Transform::default();
        let press = InputEvent::PointerPressed {
            button: PointerButton::Primary,
            position: Point2::new(0.0, 0.0),
        };
        controls.handle_input(&press, &camera, &mut target, half());
        controls.enabled = false;
        let outcome = controls.handle_input(&moved(0.1, 0.1), &camera, &mut target, half());
        assert_eq!(outcome, DragOutcome::consumed(Some(DragEvent::DragEnd)));
        let outcome = controls.handle_input(&moved(0.1, 0.1), &camera, &mut target, half());
        assert_eq!(outcome, DragOutcome::passed(Some(DragEvent::HoverOff)));
    }
}
