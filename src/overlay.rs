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

use egui_winit::EventResponse;
use winit::window::Window;

use crate::draw_context::DrawContext;

/// Tessellated UI for one frame, waiting to be painted over the scene.
pub struct OverlayFrame {
    primitives: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
    pixels_per_point: f32,
}

impl OverlayFrame {
    /// Tessellates what `ctx` produced; the platform output is left to the caller.
    #[must_use]
    pub fn from_output(ctx: &egui::Context, output: egui::FullOutput) -> Self {
        Self {
            primitives: ctx.tessellate(output.shapes, output.pixels_per_point),
            textures_delta: output.textures_delta,
            pixels_per_point: output.pixels_per_point,
        }
    }
}

/// Window side of the overlay: feeds winit events to egui and runs the UI.
pub struct Overlay {
    egui_state: egui_winit::State,
    window: Arc<Window>,
}

impl Overlay {
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(window: &Arc<Window>) -> Self {
        let egui_state = egui_winit::State::new(
            egui::Context::default(),
            egui::ViewportId::default(),
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        Self {
            egui_state,
            window: Arc::clone(window),
        }
    }

    #[must_use]
    pub fn egui_context(&self) -> &egui::Context {
        self.egui_state.egui_ctx()
    }

    /// Returns whether egui wants the event for itself.
    pub fn on_window_event(&mut self, event: &winit::event::WindowEvent) -> EventResponse {
        self.egui_state.on_window_event(&self.window, event)
    }

    #[must_use]
    pub fn wants_pointer(&self) -> bool {
        self.egui_context().wants_pointer_input() || self.egui_context().is_pointer_over_area()
    }

    pub fn run<F>(&mut self, run_ui: F) -> OverlayFrame
    where
        F: FnMut(&egui::Context),
    {
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let mut full_output = self.egui_state.egui_ctx().run(raw_input, run_ui);
        let platform_output = std::mem::take(&mut full_output.platform_output);
        self.egui_state
            .handle_platform_output(&self.window, platform_output);
        OverlayFrame::from_output(self.egui_state.egui_ctx(), full_output)
    }
}

/// GPU side of the overlay, owned by the renderer.
pub struct OverlayPainter {
    egui_renderer: egui_wgpu::Renderer,
    pending: Option<(OverlayFrame, egui_wgpu::ScreenDescriptor)>,
}

impl OverlayPainter {
    pub fn new(draw_context: &DrawContext) -> Self {
        let egui_renderer = egui_wgpu::Renderer::new(
            &draw_context.device,
            draw_context.surface_config.format,
            Some(DrawContext::DEPTH_FORMAT),
            draw_context.multisample_config.get_multisample_count(),
            true,
        );
        Self {
            egui_renderer,
            pending: None,
        }
    }

    /// Uploads textures and buffers for `frame`; `pixel_ratio` is backing pixels per window pixel.
    pub fn prepare(&mut self, draw_context: &DrawContext, frame: OverlayFrame, pixel_ratio: f32) {
        let device = &draw_context.device;
        let queue = &draw_context.queue;
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [
                draw_context.surface_config.width,
                draw_context.surface_config.height,
            ],
            pixels_per_point: frame.pixels_per_point * pixel_ratio,
        };
        for (id, image_delta) in &frame.textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Overlay Encoder"),
        });
        let mut command_buffers = self.egui_renderer.update_buffers(
            device,
            queue,
            &mut encoder,
            &frame.primitives,
            &screen_descriptor,
        );
        command_buffers.push(encoder.finish());
        queue.submit(command_buffers);
        self.pending = Some((frame, screen_descriptor));
    }

    pub fn paint(&self, render_pass: &mut wgpu::RenderPass<'static>) {
        if let Some((frame, screen_descriptor)) = &self.pending {
            self.egui_renderer
                .render(render_pass, &frame.primitives, screen_descriptor);
        }
    }

    /// Releases the textures egui no longer needs, once the frame is submitted.
    pub fn finish(&mut self) {
        if let Some((frame, _)) = self.pending.take() {
            for id in &frame.textures_delta.free {
                self.egui_renderer.free_texture(id);
            }
        }
    }
}
