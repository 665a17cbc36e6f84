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
use std::sync::Arc;

use anyhow::Context;
use log::{debug, error, info};
use pollster::FutureExt;
use web_time::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalPosition},
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Fullscreen, Window, WindowId},
};

#[cfg(feature = "egui")]
use crate::{gui::DebugPanel, overlay::Overlay};
use crate::{
    clock::Clock,
    config::{LaunchConfig, SceneConfig},
    input::{InputEvent, PointerButton, to_ndc},
    loading::LoadingManager,
    renderer::WgpuSurface,
    scene::SceneApp,
    settings::SettingsStore,
    stats::FrameStats,
};

const WINDOW_TITLE: &str = "Cube scene";
const WINDOW_SIZE: LogicalSize<u32> = LogicalSize::new(1280, 720);
const DOUBLE_CLICK_DELAY: Duration = Duration::from_millis(400);
/// Wheel pixels worth one line.
const PIXELS_PER_LINE: f64 = 100.0;

struct Running {
    window: Arc<Window>,
    scene: SceneApp<WgpuSurface>,
    #[cfg(feature = "egui")]
    overlay: Overlay,
    #[cfg(feature = "egui")]
    panel: DebugPanel,
}

impl Running {
    fn window(&self) -> &Arc<Window> {
        &self.window
    }
}

struct WindowApp {
    launch: LaunchConfig,
    running: Option<Running>,
    clock: Clock,
    stats: FrameStats,
    cursor: PhysicalPosition<f64>,
    last_press: Option<Instant>,
    error: Option<anyhow::Error>,
}

impl WindowApp {
    fn new(launch: LaunchConfig) -> Self {
        Self {
            launch,
            running: None,
            clock: Clock::new(),
            stats: FrameStats::default(),
            cursor: PhysicalPosition::new(0.0, 0.0),
            last_press: None,
            error: None,
        }
    }

    fn start(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<Running> {
        let window = Arc::new(
            event_loop
                .create_window(
                    Window::default_attributes()
                        .with_title(WINDOW_TITLE)
                        .with_inner_size(WINDOW_SIZE),
                )
                .context("Cannot create window")?,
        );
        #[cfg(feature = "egui")]
        let overlay = Overlay::new(&window);
        let renderer = WgpuSurface::new(Arc::clone(&window)).block_on()?;

        let store = SettingsStore::new(&self.launch.settings_path);
        let mut loading = LoadingManager::default();
        let settings = store.load(&mut loading).unwrap_or_default();
        let scene = SceneApp::with_loading(renderer, &SceneConfig::default(), &settings, loading)?;
        Ok(Running {
            window,
            scene,
            #[cfg(feature = "egui")]
            overlay,
            #[cfg(feature = "egui")]
            panel: DebugPanel::new(store),
        })
    }

    fn ndc(&self, window: &Window) -> cgmath::Point2<f32> {
        let size = window.inner_size();
        to_ndc(self.cursor.x, self.cursor.y, size.width, size.height)
    }

    fn redraw(&mut self) {
        let Some(running) = self.running.as_mut() else {
            return;
        };
        self.clock.tick();
        if let Some(rate) = self.stats.record(self.clock.delta()) {
            debug!("{:.1} FPS", rate.fps);
        }
        #[cfg(feature = "egui")]
        {
            let frame_rate = self.stats.latest();
            let Running {
                scene,
                overlay,
                panel,
                ..
            } = &mut *running;
            let frame = overlay.run(|ctx| panel.show(ctx, scene, frame_rate));
            scene.renderer.set_overlay_frame(frame);
        }
        if let Err(err) = running.scene.step(&self.clock) {
            error!("Frame failed: {err:#}");
        }
    }

    fn on_pointer_button(&mut self, state: ElementState, button: MouseButton) {
        let Some(running) = self.running.as_ref() else {
            return;
        };
        let button = match button {
            MouseButton::Left => PointerButton::Primary,
            MouseButton::Right => PointerButton::Secondary,
            MouseButton::Middle => PointerButton::Middle,
            _ => return,
        };
        let window = Arc::clone(running.window());
        let position = self.ndc(&window);
        let event = match state {
            ElementState::Pressed => {
                if button == PointerButton::Primary {
                    self.detect_double_click(&window);
                }
                InputEvent::PointerPressed { button, position }
            }
            ElementState::Released => InputEvent::PointerReleased { button, position },
        };
        self.push_input(event);
    }

    fn detect_double_click(&mut self, window: &Window) {
        let now = Instant::now();
        match self.last_press {
            Some(last) if now.duration_since(last) <= DOUBLE_CLICK_DELAY => {
                let fullscreen = match window.fullscreen() {
                    Some(_) => None,
                    None => Some(Fullscreen::Borderless(None)),
                };
                info!("Full screen {}", if fullscreen.is_some() { "on" } else { "off" });
                window.set_fullscreen(fullscreen);
                self.last_press = None;
            }
            _ => self.last_press = Some(now),
        }
    }

    fn push_input(&mut self, event: InputEvent) {
        if let Some(running) = self.running.as_mut() {
            running.scene.push_input(event);
        }
    }
}

impl ApplicationHandler for WindowApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(running) => {
                running.window().request_redraw();
                self.running = Some(running);
            }
            Err(err) => {
                self.error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        #[cfg(feature = "egui")]
        if let Some(running) = self.running.as_mut() {
            let response = running.overlay.on_window_event(&event);
            if response.repaint {
                running.window().request_redraw();
            }
            let pointer_event = matches!(
                event,
                WindowEvent::MouseInput { .. } | WindowEvent::MouseWheel { .. }
            );
            if response.consumed || (pointer_event && running.overlay.wants_pointer()) {
                return;
            }
        }
        match event {
            WindowEvent::CloseRequested => {
                if let Some(mut running) = self.running.take() {
                    running.scene.dispose();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(_) => {
                if let Some(running) = self.running.as_ref() {
                    running.window().request_redraw();
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = position;
                if let Some(running) = self.running.as_ref() {
                    let position = self.ndc(&Arc::clone(running.window()));
                    self.push_input(InputEvent::PointerMoved { position });
                }
            }
            WindowEvent::CursorLeft { .. } => self.push_input(InputEvent::PointerLeft),
            WindowEvent::MouseInput { state, button, .. } => self.on_pointer_button(state, button),
            WindowEvent::MouseWheel { delta, .. } => {
                #[allow(clippy::cast_possible_truncation)]
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(position) => (position.y / PIXELS_PER_LINE) as f32,
                };
                self.push_input(InputEvent::Wheel { delta });
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(running) = self.running.as_ref() {
            running.window().request_redraw();
        }
    }
}

/// Opens the window and drives one scene step per redraw until it is closed.
pub fn run_event_loop(launch: LaunchConfig) -> anyhow::Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut app = WindowApp::new(launch);
    event_loop.run_app(&mut app)?;
    app.error.map_or(Ok(()), Err)
}
