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
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use bytemuck::{Pod, Zeroable};
use cgmath::{Matrix, Matrix4, SquareMatrix};
use log::{debug, info};
use winit::window::Window;

use crate::{
    cameras::PerspectiveCamera,
    draw_context::{
        BindingSlot, DrawContext, Drawable, DrawableBuilder, FrameStatus, IndexBuffer, Uniform,
        create_vertex_buffer, impl_uniform,
    },
    geometry::{Geometry, Topology},
    objects::{Material, ShadingModel, Side},
    scene::{DrawKind, SceneGraph},
    surface::{Dimensions, GeometryHandle, RenderSurface, validate_geometry},
};

#[cfg(feature = "egui")]
use crate::overlay::{OverlayFrame, OverlayPainter};

const SCENE_SHADER: &str = include_str!("shaders/scene.wgsl");
const LINES_SHADER: &str = include_str!("shaders/lines.wgsl");

const BIND_GROUP_SCENE: u32 = 0;
const BIND_GROUP_OBJECT: u32 = 1;
const LOCATION_POSITION: u32 = 0;
const LOCATION_ATTRIBUTE: u32 = 1;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct SceneUniforms {
    view_projection: [[f32; 4]; 4],
    camera_position: [f32; 4],
    ambient: [f32; 4],
    light_position: [f32; 4],
    light_radiance: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct ObjectUniforms {
    model: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    color: [f32; 4],
    emissive: [f32; 4],
    material: [f32; 4],
}

impl_uniform!(SceneUniforms, ObjectUniforms);

impl SceneUniforms {
    fn new(scene: &SceneGraph, camera: &PerspectiveCamera) -> Self {
        let light = &scene.point_light;
        let [ar, ag, ab] = scene.ambient_light.radiance();
        let [lr, lg, lb] = light.radiance();
        Self {
            view_projection: camera.view_projection().into(),
            camera_position: camera.position.to_homogeneous().into(),
            ambient: [ar, ag, ab, 0.0],
            light_position: light.position.extend(light.distance).into(),
            light_radiance: [lr, lg, lb, light.decay],
        }
    }
}

impl ObjectUniforms {
    fn new(model: Matrix4<f32>, material: Option<&Material>) -> Self {
        let normal_matrix = model.invert().unwrap_or_else(Matrix4::identity).transpose();
        let (color, emissive, params) = material.map_or(([0.0; 4], [0.0; 4], [0.0; 4]), |m| {
            let [r, g, b] = m.color.to_linear();
            let [er, eg, eb] = m.emissive.scaled_linear(m.emissive_intensity);
            let lambert = match m.shading {
                ShadingModel::Standard => 0.0,
                ShadingModel::Lambert => 1.0,
            };
            (
                [r, g, b, m.effective_opacity()],
                [er, eg, eb, 0.0],
                [m.metalness, m.roughness, lambert, 0.0],
            )
        });
        Self {
            model: model.into(),
            normal_matrix: normal_matrix.into(),
            color,
            emissive,
            material: params,
        }
    }
}

/// Pipeline state a geometry is drawn with; drawables are cached per geometry and variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Variant {
    Mesh { transparent: bool, double_sided: bool },
    Wireframe { transparent: bool },
    Lines,
}

impl Variant {
    fn for_kind(kind: DrawKind<'_>) -> Self {
        match kind {
            DrawKind::Lines => Self::Lines,
            DrawKind::Mesh(material) if material.wireframe => Self::Wireframe {
                transparent: material.transparent,
            },
            DrawKind::Mesh(material) => Self::Mesh {
                transparent: material.transparent,
                double_sided: material.side == Side::Double,
            },
        }
    }
}

struct GpuGeometry {
    topology: Topology,
    positions: Arc<wgpu::Buffer>,
    attribute: Arc<wgpu::Buffer>,
    indices: IndexBuffer,
    wireframe_indices: Option<IndexBuffer>,
    uniforms: Uniform<ObjectUniforms>,
}

struct Shaders {
    scene: wgpu::ShaderModule,
    lines: wgpu::ShaderModule,
}

/// wgpu implementation of [`RenderSurface`], drawing into the window or an offscreen texture.
pub struct WgpuSurface {
    draw_context: DrawContext,
    shaders: Shaders,
    scene_uniforms: Uniform<SceneUniforms>,
    geometries: HashMap<GeometryHandle, GpuGeometry>,
    drawables: HashMap<(GeometryHandle, Variant), Drawable>,
    next_handle: u32,
    #[cfg(feature = "egui")]
    overlay: OverlayPainter,
    #[cfg(feature = "egui")]
    overlay_frame: Option<OverlayFrame>,
}

impl WgpuSurface {
    /// Backing store never exceeds two physical pixels per logical pixel.
    pub const MAX_PIXEL_RATIO: f64 = 2.0;

    /// Renderer presenting into `window`.
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let dimensions = Self::display_size_of(&window);
        let draw_context = DrawContext::new(Some(window), dimensions).await?;
        Ok(Self::with_context(draw_context))
    }

    /// Renderer drawing into a texture of `size`, without any window.
    pub async fn offscreen(size: Dimensions) -> anyhow::Result<Self> {
        let draw_context = DrawContext::new(None, size).await?;
        Ok(Self::with_context(draw_context))
    }

    fn with_context(draw_context: DrawContext) -> Self {
        let dimensions = draw_context.surface_dimensions();
        info!(
            "Surface {:?} {}x{}",
            draw_context.surface_config.format, dimensions.width, dimensions.height
        );
        let shaders = Shaders {
            scene: draw_context.create_shader_module(SCENE_SHADER),
            lines: draw_context.create_shader_module(LINES_SHADER),
        };
        let scene_uniforms = Uniform::new(&draw_context, SceneUniforms::zeroed());
        #[cfg(feature = "egui")]
        let overlay = OverlayPainter::new(&draw_context);
        Self {
            draw_context,
            shaders,
            scene_uniforms,
            geometries: HashMap::new(),
            drawables: HashMap::new(),
            next_handle: 0,
            #[cfg(feature = "egui")]
            overlay,
            #[cfg(feature = "egui")]
            overlay_frame: None,
        }
    }

    /// UI to paint over the next rendered frame.
    #[cfg(feature = "egui")]
    pub fn set_overlay_frame(&mut self, frame: OverlayFrame) {
        self.overlay_frame = Some(frame);
    }

    fn pixel_ratio(window: &Window) -> f64 {
        let scale = window.scale_factor();
        scale.min(Self::MAX_PIXEL_RATIO) / scale
    }

    /// Size the backing store should have; an offscreen target keeps its own.
    fn display_size(&self) -> Dimensions {
        self.draw_context
            .window()
            .map_or_else(|| self.draw_context.surface_dimensions(), |window| {
                Self::display_size_of(window)
            })
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn display_size_of(window: &Window) -> Dimensions {
        let size = window.inner_size();
        let ratio = Self::pixel_ratio(window);
        Dimensions {
            width: (f64::from(size.width) * ratio).round() as u32,
            height: (f64::from(size.height) * ratio).round() as u32,
        }
    }

    fn build_drawable(
        draw_context: &DrawContext,
        shaders: &Shaders,
        scene_uniforms: &Uniform<SceneUniforms>,
        geometry: &GpuGeometry,
        variant: Variant,
    ) -> anyhow::Result<Drawable> {
        // Normals and line colors are both three floats at the second location.
        let shader = match geometry.topology {
            Topology::Triangles => &shaders.scene,
            Topology::Lines => &shaders.lines,
        };
        let indices = match variant {
            Variant::Wireframe { .. } => geometry
                .wireframe_indices
                .clone()
                .context("Wireframe drawn for a geometry without edges")?,
            Variant::Mesh { .. } | Variant::Lines => geometry.indices.clone(),
        };
        let mut builder = DrawableBuilder::new(draw_context, shader, indices);
        builder
            .add_attribute(
                LOCATION_POSITION,
                &geometry.positions,
                wgpu::VertexFormat::Float32x3,
            )?
            .add_attribute(
                LOCATION_ATTRIBUTE,
                &geometry.attribute,
                wgpu::VertexFormat::Float32x3,
            )?
            .add_binding_slot(&BindingSlot {
                bind_group: BIND_GROUP_SCENE,
                binding: 0,
                resource: scene_uniforms,
            })?
            .add_binding_slot(&BindingSlot {
                bind_group: BIND_GROUP_OBJECT,
                binding: 0,
                resource: &geometry.uniforms,
            })?;
        match variant {
            Variant::Mesh {
                transparent,
                double_sided,
            } => {
                if double_sided {
                    builder.set_cull_mode(None);
                }
                if transparent {
                    builder
                        .set_blend_option(wgpu::BlendState::ALPHA_BLENDING)
                        .set_depth_write(false);
                }
            }
            Variant::Wireframe { transparent } => {
                builder
                    .set_topology(wgpu::PrimitiveTopology::LineList)
                    .set_cull_mode(None);
                if transparent {
                    builder
                        .set_blend_option(wgpu::BlendState::ALPHA_BLENDING)
                        .set_depth_write(false);
                }
            }
            Variant::Lines => {
                builder
                    .set_topology(wgpu::PrimitiveTopology::LineList)
                    .set_cull_mode(None);
            }
        }
        debug!("Built {variant:?} drawable");
        Ok(builder.build())
    }
}

impl RenderSurface for WgpuSurface {
    fn backing_size(&self) -> Dimensions {
        self.draw_context.surface_dimensions()
    }

    fn resize_to_display_size(&mut self) -> Option<Dimensions> {
        let display_size = self.display_size();
        if display_size.width == 0 || display_size.height == 0 {
            return None;
        }
        if display_size == self.draw_context.surface_dimensions() {
            return None;
        }
        self.draw_context.resize(display_size);
        Some(display_size)
    }

    fn upload_geometry(&mut self, geometry: &Geometry) -> anyhow::Result<GeometryHandle> {
        validate_geometry(geometry)?;
        let context = &self.draw_context;
        let attribute = match geometry.topology {
            Topology::Triangles => &geometry.normals,
            Topology::Lines => &geometry.colors,
        };
        let wireframe_indices = match geometry.topology {
            Topology::Triangles => Some(IndexBuffer::new(context, &geometry.wireframe_indices())?),
            Topology::Lines => None,
        };
        let gpu_geometry = GpuGeometry {
            topology: geometry.topology,
            positions: create_vertex_buffer(context, &geometry.positions),
            attribute: create_vertex_buffer(context, attribute),
            indices: IndexBuffer::new(context, &geometry.indices)?,
            wireframe_indices,
            uniforms: Uniform::new(context, ObjectUniforms::zeroed()),
        };
        let handle = GeometryHandle(self.next_handle);
        self.next_handle += 1;
        self.geometries.insert(handle, gpu_geometry);
        debug!("Uploaded {:?} geometry as {handle:?}", geometry.label);
        Ok(handle)
    }

    fn release_geometry(&mut self, handle: GeometryHandle) {
        if self.geometries.remove(&handle).is_some() {
            self.drawables.retain(|(owner, _), _| *owner != handle);
            debug!("Released {handle:?}");
        }
    }

    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) -> anyhow::Result<()> {
        self.scene_uniforms
            .write_uniform(&SceneUniforms::new(scene, camera));

        let mut draw_list = Vec::new();
        for item in scene.drawables() {
            let Some(geometry) = self.geometries.get_mut(&item.geometry) else {
                continue;
            };
            let material = match item.kind {
                DrawKind::Mesh(material) => Some(material),
                DrawKind::Lines => None,
            };
            geometry
                .uniforms
                .write_uniform(&ObjectUniforms::new(item.model, material));
            let key = (item.geometry, Variant::for_kind(item.kind));
            if !self.drawables.contains_key(&key) {
                let drawable = Self::build_drawable(
                    &self.draw_context,
                    &self.shaders,
                    &self.scene_uniforms,
                    geometry,
                    key.1,
                )?;
                self.drawables.insert(key, drawable);
            }
            draw_list.push(key);
        }

        #[cfg(feature = "egui")]
        if let Some(frame) = self.overlay_frame.take() {
            #[allow(clippy::cast_possible_truncation)]
            let pixel_ratio = self
                .draw_context
                .window()
                .map_or(1.0, |window| Self::pixel_ratio(window) as f32);
            self.overlay.prepare(&self.draw_context, frame, pixel_ratio);
        }

        let drawables = &self.drawables;
        #[cfg(feature = "egui")]
        let overlay = &self.overlay;
        let status = self.draw_context.render_frame(|render_pass| {
            for drawable in draw_list.iter().filter_map(|key| drawables.get(key)) {
                drawable.render(render_pass);
            }
            #[cfg(feature = "egui")]
            overlay.paint(render_pass);
        })?;
        #[cfg(feature = "egui")]
        self.overlay.finish();
        if status == FrameStatus::Skipped {
            debug!("Frame skipped");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pollster::FutureExt;

    use super::*;
    use crate::{clock::Clock, config::SceneConfig, scene::SceneApp, settings::Settings};

    const SIZE: Dimensions = Dimensions {
        width: 320,
        height: 240,
    };

    #[test]
    fn offscreen_frames_pass_validation() {
        let Ok(draw_context) = DrawContext::new(None, SIZE).block_on() else {
            eprintln!("No wgpu adapter available, skipping");
            return;
        };
        draw_context
            .device
            .push_error_scope(wgpu::ErrorFilter::Validation);
        let renderer = WgpuSurface::with_context(draw_context);
        let settings = Settings {
            axes_visible: true,
            point_light_helper_visible: true,
            ..Settings::default()
        };
        let mut app = SceneApp::new(renderer, &SceneConfig::default(), &settings).unwrap();
        let mut clock = Clock::manual();

        #[cfg(feature = "egui")]
        let dir = tempfile::tempdir().unwrap();
        #[cfg(feature = "egui")]
        {
            let store = crate::settings::SettingsStore::new(dir.path().join("settings.json"));
            let mut panel = crate::gui::DebugPanel::new(store);
            let ctx = egui::Context::default();
            let output = ctx.run(egui::RawInput::default(), |ctx| panel.show(ctx, &mut app, None));
            app.renderer
                .set_overlay_frame(OverlayFrame::from_output(&ctx, output));
        }

        for _ in 0..3 {
            clock.advance(web_time::Duration::from_millis(16));
            app.step(&clock).unwrap();
        }
        app.graph.cube.material.wireframe = true;
        app.step(&clock).unwrap();
        assert_eq!(app.renderer.backing_size(), SIZE);
        // Cube solid and wireframe, plane, grid, axes, light helper.
        assert_eq!(app.renderer.drawables.len(), 6);

        app.dispose();
        assert!(app.renderer.drawables.is_empty());
        let error = app.renderer.draw_context.device.pop_error_scope().block_on();
        assert!(error.is_none(), "{error:?}");
    }
}
