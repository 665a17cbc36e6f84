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
use std::f32::consts::TAU;
use std::f64::consts::FRAC_PI_4;
use std::ops::RangeInclusive;

use log::error;

use crate::{
    color::Color,
    scene::{AnimationState, SceneApp},
    settings::{Settings, SettingsStore},
    stats::FrameRate,
    surface::RenderSurface,
};

/// What a widget interaction means for the panel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Edit {
    /// Value is being edited right now.
    active: bool,
    /// Edit completed this frame: slider released, box ticked.
    finished: bool,
}

impl Edit {
    fn of(response: &egui::Response) -> Self {
        let finished = response.drag_stopped() || (response.changed() && !response.dragged());
        Self {
            active: response.dragged() || response.changed(),
            finished,
        }
    }

    fn merge(self, other: Self) -> Self {
        Self {
            active: self.active || other.active,
            finished: self.finished || other.finished,
        }
    }
}

/// Editing an animated axis pauses the animation until the edit completes.
fn pause_for_edit(animation: &mut AnimationState, edit: Edit) {
    if edit.active {
        animation.play = false;
    }
    if edit.finished {
        animation.play = true;
    }
}

/// Swatch opening an sRGB picker; `color` only changes when the user picks.
fn color_row(ui: &mut egui::Ui, color: &mut Color) -> egui::Response {
    let mut srgb = color.to_rgb8();
    let response = ui
        .horizontal(|ui| {
            let response = ui.color_edit_button_srgb(&mut srgb);
            ui.label("color");
            response
        })
        .inner;
    if response.changed() {
        let [r, g, b] = srgb;
        *color = Color::from_rgb8(r, g, b);
    }
    response
}

/// Debug control panel bound to the live scene fields.
pub struct DebugPanel {
    store: SettingsStore,
    /// Color changed while its picker was open; saved once the picker closes.
    color_pending: bool,
}

impl DebugPanel {
    const TITLE: &'static str = "🐞 Debug GUI";
    const WIDTH: f32 = 300.0;
    const POSITION_RANGE: f32 = 5.0;

    #[must_use]
    pub fn new(store: SettingsStore) -> Self {
        Self {
            store,
            color_pending: false,
        }
    }

    /// Forgets the stored state and puts every bound field back to its default.
    pub fn reset<R: RenderSurface>(&mut self, app: &mut SceneApp<R>) {
        self.color_pending = false;
        if let Err(err) = self.store.clear() {
            error!("{err:#}");
        }
        app.apply_settings(&Settings::default());
    }

    fn persist<R: RenderSurface>(&self, app: &SceneApp<R>) {
        if let Err(err) = self.store.save(&app.settings()) {
            error!("{err:#}");
        }
    }

    /// Saves after a finished edit. Color edits wait for the picker to close.
    fn conclude<R: RenderSurface>(
        &mut self,
        app: &SceneApp<R>,
        edit: Edit,
        color_changed: bool,
        picker_open: bool,
    ) {
        self.color_pending |= color_changed;
        let color_done = self.color_pending && !picker_open;
        if color_done {
            self.color_pending = false;
        }
        if edit.finished || color_done {
            self.persist(app);
        }
    }

    pub fn show<R: RenderSurface>(
        &mut self,
        ctx: &egui::Context,
        app: &mut SceneApp<R>,
        frame_rate: Option<FrameRate>,
    ) {
        let mut edit = Edit::default();
        let mut color_changed = false;
        let mut reset = false;
        egui::Window::new(Self::TITLE)
            .default_open(false)
            .default_width(Self::WIDTH)
            .show(ctx, |ui| {
                match frame_rate {
                    Some(rate) => ui.label(format!(
                        "{:.0} FPS ({:.1} ms)",
                        rate.fps,
                        rate.mean_frame_time.as_secs_f64() * 1_000.0
                    )),
                    None => ui.label("-- FPS"),
                };
                ui.collapsing("Cube one", |ui| {
                    let (cube, color) = Self::cube_folder(ui, app);
                    edit = edit.merge(cube);
                    color_changed = color;
                });
                ui.collapsing("Camera", |ui| {
                    let response = ui.checkbox(&mut app.camera_controls.auto_rotate, "autoRotate");
                    edit = edit.merge(Edit::of(&response));
                });
                ui.collapsing("Controls", |ui| {
                    let response = ui.checkbox(&mut app.drag_controls.enabled, "drag controls");
                    edit = edit.merge(Edit::of(&response));
                });
                ui.collapsing("Lights", |ui| {
                    let graph = &mut app.graph;
                    let point = ui.checkbox(&mut graph.point_light.visible, "point light");
                    let ambient = ui.checkbox(&mut graph.ambient_light.visible, "ambient light");
                    edit = edit.merge(Edit::of(&point)).merge(Edit::of(&ambient));
                });
                ui.collapsing("Helpers", |ui| {
                    let graph = &mut app.graph;
                    let axes = ui.checkbox(&mut graph.axes_helper.visible, "axes");
                    let light = ui.checkbox(&mut graph.point_light_helper.visible, "pointLight");
                    edit = edit.merge(Edit::of(&axes)).merge(Edit::of(&light));
                });
                reset = ui.button("RESET").clicked();
            });
        if reset {
            self.reset(app);
        } else {
            let picker_open = ctx.memory(egui::Memory::any_popup_open);
            self.conclude(app, edit, color_changed, picker_open);
        }
    }

    /// Returns the slider and checkbox edits, and whether the color changed.
    fn cube_folder<R: RenderSurface>(ui: &mut egui::Ui, app: &mut SceneApp<R>) -> (Edit, bool) {
        let positions = -Self::POSITION_RANGE..=Self::POSITION_RANGE;
        let angles = -TAU..=TAU;
        let cube = &mut app.graph.cube;
        let mut edit = Edit::default();

        let mut slider = |ui: &mut egui::Ui,
                          value: &mut f32,
                          range: RangeInclusive<f32>,
                          step: f64,
                          text: &str| {
            let response = ui.add(egui::Slider::new(value, range).step_by(step).text(text));
            let this = Edit::of(&response);
            edit = edit.merge(this);
            this
        };

        let transform = &mut cube.transform;
        slider(ui, &mut transform.position.x, positions.clone(), 0.5, "pos x");
        let pos_y = slider(ui, &mut transform.position.y, positions.clone(), 1.0, "pos y");
        slider(ui, &mut transform.position.z, positions, 0.5, "pos z");

        let material = &mut cube.material;
        let wireframe = ui.checkbox(&mut material.wireframe, "wireframe");
        let color = color_row(ui, &mut material.color);
        slider(ui, &mut material.metalness, 0.0..=1.0, 0.1, "metalness");
        slider(ui, &mut material.roughness, 0.0..=1.0, 0.1, "roughness");

        let transform = &mut cube.transform;
        slider(ui, &mut transform.rotation.x, angles.clone(), FRAC_PI_4, "rotate x");
        let rot_y = slider(ui, &mut transform.rotation.y, angles.clone(), FRAC_PI_4, "rotate y");
        slider(ui, &mut transform.rotation.z, angles, FRAC_PI_4, "rotate z");

        let animated = ui.checkbox(&mut app.animation.enabled, "animated");
        pause_for_edit(&mut app.animation, pos_y.merge(rot_y));
        (
            edit.merge(Edit::of(&wireframe)).merge(Edit::of(&animated)),
            color.changed(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::SceneConfig, objects::CUBE_COLOR, surface::HeadlessSurface};

    fn app() -> SceneApp<HeadlessSurface> {
        SceneApp::new(
            HeadlessSurface::default(),
            &SceneConfig::default(),
            &Settings::default(),
        )
        .unwrap()
    }

    impl Edit {
        const ONGOING: Self = Self {
            active: true,
            finished: false,
        };
        const DONE: Self = Self {
            active: false,
            finished: true,
        };
    }

    fn fills(shape: &egui::Shape, out: &mut Vec<egui::Color32>) {
        match shape {
            egui::Shape::Rect(rect) => out.push(rect.fill),
            egui::Shape::Vec(shapes) => shapes.iter().for_each(|shape| fills(shape, out)),
            _ => {}
        }
    }

    fn close_to(left: egui::Color32, right: egui::Color32) -> bool {
        left.to_array()
            .iter()
            .zip(right.to_array())
            .all(|(l, r)| l.abs_diff(r) <= 1)
    }

    #[test]
    fn idle_panel_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut panel = DebugPanel::new(SettingsStore::new(&path));
        let mut app = app();
        let ctx = egui::Context::default();
        for _ in 0..2 {
            let _ = ctx.run(egui::RawInput::default(), |ctx| panel.show(ctx, &mut app, None));
        }
        assert_eq!(app.settings(), Settings::default());
        assert!(app.animation.play);
        assert!(!path.exists());
    }

    #[test]
    fn color_swatch_shows_the_srgb_color() {
        let ctx = egui::Context::default();
        let mut color = CUBE_COLOR;
        let mut output = None;
        for _ in 0..2 {
            output = Some(ctx.run(egui::RawInput::default(), |ctx| {
                egui::CentralPanel::default().show(ctx, |ui| color_row(ui, &mut color));
            }));
        }
        let mut painted = Vec::new();
        for clipped in output.unwrap().shapes {
            fills(&clipped.shape, &mut painted);
        }
        let expected = egui::Color32::from_rgb(0xf6, 0x9f, 0x1f);
        assert!(
            painted.iter().any(|fill| close_to(*fill, expected)),
            "no swatch in {painted:?}"
        );
        assert_eq!(color, CUBE_COLOR);
    }

    #[test]
    fn editing_an_animated_axis_pauses_until_released() {
        let mut animation = AnimationState::default();
        pause_for_edit(&mut animation, Edit::ONGOING);
        assert!(!animation.play);
        pause_for_edit(&mut animation, Edit::default());
        assert!(!animation.play);
        pause_for_edit(&mut animation, Edit::DONE);
        assert!(animation.play);
        assert!(animation.enabled);
    }

    #[test]
    fn finished_edit_is_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::new(&path);
        let mut panel = DebugPanel::new(SettingsStore::new(&path));
        let mut app = app();
        app.graph.axes_helper.visible = true;

        panel.conclude(&app, Edit::ONGOING, false, false);
        assert!(!path.exists());
        panel.conclude(&app, Edit::DONE, false, false);
        let saved = store.load(&mut app.loading).unwrap();
        assert!(saved.axes_visible);
    }

    #[test]
    fn color_is_saved_once_the_picker_closes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut panel = DebugPanel::new(SettingsStore::new(&path));
        let mut app = app();
        app.graph.cube.material.color = Color::TEAL;

        for _ in 0..3 {
            panel.conclude(&app, Edit::default(), true, true);
        }
        panel.conclude(&app, Edit::default(), false, true);
        assert!(!path.exists());

        panel.conclude(&app, Edit::default(), false, false);
        assert!(path.exists());
        std::fs::remove_file(&path).unwrap();
        panel.conclude(&app, Edit::default(), false, false);
        assert!(!path.exists());
    }

    #[test]
    fn reset_clears_store_and_restores_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::new(&path);
        let mut app = app();
        app.apply_settings(&Settings {
            animated: false,
            axes_visible: true,
            ..Settings::default()
        });
        store.save(&app.settings()).unwrap();

        let mut panel = DebugPanel::new(store);
        panel.reset(&mut app);
        assert!(!path.exists());
        assert_eq!(app.settings(), Settings::default());
    }
}
