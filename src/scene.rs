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
use cgmath::{EuclideanSpace, Matrix4, Point3, Vector3};
use log::{debug, info};

use crate::{
    cameras::{OrbitControls, PerspectiveCamera},
    clock::Clock,
    color::Color,
    config::SceneConfig,
    drag::{DragControls, DragEvent},
    helpers::{self, Helper},
    input::{InputEvent, InputQueue},
    lights::{AmbientLight, PointLight},
    loading::LoadingManager,
    objects::{self, Material, SceneObject},
    settings::{CubeSettings, Settings},
    surface::{GeometryHandle, RenderSurface},
};

/// Whether the scene objects animate this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationState {
    /// Set by the user.
    pub enabled: bool,
    /// Cleared while the cube is being manipulated.
    pub play: bool,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self {
            enabled: true,
            play: true,
        }
    }
}

impl AnimationState {
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.enabled && self.play
    }
}

#[derive(Clone, Copy, Debug)]
pub enum DrawKind<'a> {
    Mesh(&'a Material),
    Lines,
}

/// One geometry to draw with its world matrix.
#[derive(Clone, Copy, Debug)]
pub struct DrawItem<'a> {
    pub geometry: GeometryHandle,
    pub model: Matrix4<f32>,
    pub kind: DrawKind<'a>,
}

/// Lights, objects and helpers submitted to the renderer each frame.
pub struct SceneGraph {
    pub ambient_light: AmbientLight,
    pub point_light: PointLight,
    pub cube: SceneObject,
    pub plane: SceneObject,
    pub axes_helper: Helper,
    pub point_light_helper: Helper,
    pub grid_helper: Helper,
}

impl SceneGraph {
    pub fn objects_mut(&mut self) -> impl Iterator<Item = &mut SceneObject> {
        [&mut self.cube, &mut self.plane].into_iter()
    }

    pub fn helpers_mut(&mut self) -> impl Iterator<Item = &mut Helper> {
        [
            &mut self.axes_helper,
            &mut self.point_light_helper,
            &mut self.grid_helper,
        ]
        .into_iter()
    }

    /// Visible, live geometry in draw order: opaque meshes, lines, then transparent meshes.
    pub fn drawables(&self) -> impl Iterator<Item = DrawItem<'_>> {
        let meshes = [&self.cube, &self.plane]
            .into_iter()
            .filter(|object| object.visible && object.is_active())
            .map(|object| DrawItem {
                geometry: object.geometry,
                model: object.transform.matrix(),
                kind: DrawKind::Mesh(&object.material),
            });
        let (transparent, opaque): (Vec<_>, Vec<_>) = meshes.partition(|item| match item.kind {
            DrawKind::Mesh(material) => material.transparent,
            DrawKind::Lines => false,
        });
        let lines = [&self.grid_helper, &self.axes_helper, &self.point_light_helper]
            .into_iter()
            .filter(|helper| helper.visible && !helper.is_disposed())
            .map(|helper| DrawItem {
                geometry: helper.geometry,
                model: helper.transform.matrix(),
                kind: DrawKind::Lines,
            });
        opaque.into_iter().chain(lines).chain(transparent)
    }
}

/// Owns the renderer, camera, controls and scene graph, and advances them one frame at a time.
pub struct SceneApp<R: RenderSurface> {
    pub renderer: R,
    pub graph: SceneGraph,
    pub camera: PerspectiveCamera,
    pub camera_controls: OrbitControls,
    pub drag_controls: DragControls,
    pub animation: AnimationState,
    pub loading: LoadingManager,
    input: InputQueue,
}

impl<R: RenderSurface> SceneApp<R> {
    pub fn new(renderer: R, config: &SceneConfig, settings: &Settings) -> anyhow::Result<Self> {
        Self::with_loading(renderer, config, settings, LoadingManager::default())
    }

    pub fn with_loading(
        mut renderer: R,
        config: &SceneConfig,
        settings: &Settings,
        mut loading: LoadingManager,
    ) -> anyhow::Result<Self> {
        let mut camera = PerspectiveCamera::new(
            config.camera_fov,
            renderer.backing_size().surface_ratio(),
            config.camera_near,
            config.camera_far,
        );
        camera.position = config.camera_position;

        let ambient_light = AmbientLight::new(config.ambient_color, config.ambient_intensity);
        let mut point_light = PointLight::new(
            config.point_light_color,
            config.point_light_intensity,
            config.point_light_distance,
        );
        point_light.position = config.point_light_position;

        loading.item_start("scene");
        let graph = Self::build_graph(&mut renderer, config, ambient_light, point_light);
        if let Err(err) = &graph {
            loading.item_error("scene", err);
        }
        loading.item_end("scene");
        let graph = graph?;

        let mut camera_controls = OrbitControls::new(Point3::from_vec(graph.cube.transform.position));
        camera_controls.enable_damping = config.orbit_damping;
        camera_controls.auto_rotate = false;
        camera_controls.update(&mut camera);

        let mut app = Self {
            renderer,
            graph,
            camera,
            camera_controls,
            drag_controls: DragControls::default(),
            animation: AnimationState::default(),
            loading,
            input: InputQueue::default(),
        };
        app.apply_settings(settings);
        info!("Scene ready");
        Ok(app)
    }

    fn build_graph(
        renderer: &mut R,
        config: &SceneConfig,
        ambient_light: AmbientLight,
        point_light: PointLight,
    ) -> anyhow::Result<SceneGraph> {
        let mut cube = objects::create_cube(renderer)?;
        let mut plane = objects::create_plane(renderer)?;
        cube.activate();
        plane.activate();

        let mut axes_helper = helpers::create_axes(renderer)?;
        axes_helper.visible = false;
        let mut point_light_helper =
            helpers::create_point_light_helper(renderer, config.point_light_helper_color)?;
        point_light_helper.visible = false;
        point_light_helper.transform.position = point_light.position;
        let grid_helper = helpers::create_grid(renderer)?;

        Ok(SceneGraph {
            ambient_light,
            point_light,
            cube,
            plane,
            axes_helper,
            point_light_helper,
            grid_helper,
        })
    }

    /// Queues pointer input for the next step.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Advances the scene by one frame and renders it.
    pub fn step(&mut self, clock: &Clock) -> anyhow::Result<()> {
        self.process_input();

        if self.animation.is_running() {
            for object in self.graph.objects_mut() {
                objects::update(object, clock);
            }
        }

        if let Some(size) = self.renderer.resize_to_display_size() {
            self.camera.aspect = size.surface_ratio();
            self.camera.update_projection_matrix();
            debug!("Resized to {}x{}", size.width, size.height);
        }

        self.camera_controls.update(&mut self.camera);
        self.graph.point_light_helper.transform.position = self.graph.point_light.position;

        self.renderer.render(&self.graph, &self.camera)
    }

    fn process_input(&mut self) {
        let mut queue = std::mem::take(&mut self.input);
        for event in queue.drain() {
            let cube = &mut self.graph.cube;
            let outcome = self.drag_controls.handle_input(
                &event,
                &self.camera,
                &mut cube.transform,
                cube.half_extents,
            );
            if let Some(drag_event) = outcome.event {
                self.apply_drag_event(drag_event);
            }
            if !outcome.consumed {
                self.camera_controls.handle_input(&event, self.camera.aspect);
            }
        }
        self.input = queue;
    }

    pub fn apply_drag_event(&mut self, event: DragEvent) {
        debug!("Drag event {event:?}");
        let material = &mut self.graph.cube.material;
        match event {
            DragEvent::HoverOn => material.emissive = Color::ORANGE,
            DragEvent::HoverOff => material.emissive = Color::BLACK,
            DragEvent::DragStart => {
                self.camera_controls.enabled = false;
                self.animation.play = false;
                material.emissive = Color::BLACK;
                material.opacity = 0.7;
            }
            DragEvent::DragEnd => {
                self.camera_controls.enabled = true;
                self.animation.play = true;
                material.emissive = Color::BLACK;
                material.opacity = 1.0;
            }
        }
    }

    /// Snapshot of the panel-bound fields.
    #[must_use]
    pub fn settings(&self) -> Settings {
        let cube = &self.graph.cube;
        Settings {
            cube: CubeSettings {
                position: cube.transform.position.into(),
                rotation: cube.transform.rotation.into(),
                wireframe: cube.material.wireframe,
                color: cube.material.color,
                metalness: cube.material.metalness,
                roughness: cube.material.roughness,
            },
            animated: self.animation.enabled,
            auto_rotate: self.camera_controls.auto_rotate,
            drag_controls: self.drag_controls.enabled,
            point_light_visible: self.graph.point_light.visible,
            ambient_light_visible: self.graph.ambient_light.visible,
            axes_visible: self.graph.axes_helper.visible,
            point_light_helper_visible: self.graph.point_light_helper.visible,
        }
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        let cube = &mut self.graph.cube;
        cube.transform.position = Vector3::from(settings.cube.position);
        cube.transform.rotation = Vector3::from(settings.cube.rotation);
        cube.material.wireframe = settings.cube.wireframe;
        cube.material.color = settings.cube.color;
        cube.material.metalness = settings.cube.metalness.clamp(0.0, 1.0);
        cube.material.roughness = settings.cube.roughness.clamp(0.0, 1.0);
        self.animation.enabled = settings.animated;
        self.camera_controls.auto_rotate = settings.auto_rotate;
        self.drag_controls.enabled = settings.drag_controls;
        self.graph.point_light.visible = settings.point_light_visible;
        self.graph.ambient_light.visible = settings.ambient_light_visible;
        self.graph.axes_helper.visible = settings.axes_visible;
        self.graph.point_light_helper.visible = settings.point_light_helper_visible;
    }

    /// Releases every geometry. Safe to call more than once.
    pub fn dispose(&mut self) {
        for object in self.graph.objects_mut() {
            objects::dispose(object, &mut self.renderer);
        }
        for helper in self.graph.helpers_mut() {
            helper.dispose(&mut self.renderer);
        }
        info!("Scene disposed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::HeadlessSurface;

    fn app() -> SceneApp<HeadlessSurface> {
        SceneApp::new(
            HeadlessSurface::default(),
            &SceneConfig::default(),
            &Settings::default(),
        )
        .unwrap()
    }

    #[test]
    fn scene_starts_like_the_defaults() {
        let app = app();
        assert_eq!(app.settings(), Settings::default());
        assert!(!app.drag_controls.enabled);
        assert!(app.camera_controls.enable_damping);
        assert_eq!(app.camera_controls.target, Point3::new(0.0, 0.5, 0.0));
        assert!(app.graph.cube.is_active());
        assert!(app.graph.plane.is_active());
        assert!(!app.loading.is_loading());
    }

    #[test]
    fn hidden_helpers_are_not_drawn() {
        let app = app();
        let drawn: Vec<_> = app.graph.drawables().map(|item| item.geometry).collect();
        assert_eq!(
            drawn,
            vec![
                app.graph.cube.geometry,
                app.graph.grid_helper.geometry,
                app.graph.plane.geometry
            ]
        );
    }

    #[test]
    fn hover_highlights_and_drag_suppresses_play() {
        let mut app = app();
        app.apply_drag_event(DragEvent::HoverOn);
        assert_eq!(app.graph.cube.material.emissive, Color::ORANGE);
        app.apply_drag_event(DragEvent::DragStart);
        assert!(!app.animation.play);
        assert!(!app.camera_controls.enabled);
        assert_eq!(app.graph.cube.material.emissive, Color::BLACK);
        assert!((app.graph.cube.material.opacity - 0.7).abs() < f32::EPSILON);
        app.apply_drag_event(DragEvent::DragEnd);
        assert!(app.animation.play);
        assert!(app.camera_controls.enabled);
        assert!((app.graph.cube.material.opacity - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn settings_apply_to_live_fields() {
        let mut app = app();
        let settings = Settings {
            animated: false,
            drag_controls: true,
            axes_visible: true,
            cube: CubeSettings {
                position: [1.0, 2.0, 3.0],
                ..CubeSettings::default()
            },
            ..Settings::default()
        };
        app.apply_settings(&settings);
        assert_eq!(app.settings(), settings);
        assert!(!app.animation.enabled);
        assert!(app.drag_controls.enabled);
        assert_eq!(app.graph.cube.transform.position, Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn dispose_releases_everything_once() {
        let mut app = app();
        assert_eq!(app.renderer.live_geometry_count(), 5);
        app.dispose();
        assert_eq!(app.renderer.live_geometry_count(), 0);
        app.dispose();
        assert_eq!(app.graph.drawables().count(), 0);
    }
}
