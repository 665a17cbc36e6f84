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
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{Context, anyhow, bail};
use bytemuck::NoUninit;
use log::{debug, warn};
use wgpu::util::DeviceExt;
use wgpu::{
    DepthBiasState, PipelineCompilationOptions, PipelineLayoutDescriptor, StencilState,
    SurfaceConfiguration, Texture,
};
use winit::window::Window;

use crate::surface::Dimensions;

pub trait UniformType {
    type AlignedType: NoUninit;
    fn apply_alignment(&self) -> Self::AlignedType;
}

macro_rules! impl_uniform {
    ( $($type:ty),+ ) => {
        $(
            impl $crate::draw_context::UniformType for $type {
                type AlignedType = Self;
                fn apply_alignment(&self) -> Self::AlignedType {
                    *self
                }
            }
        )*
    };
}
pub(crate) use impl_uniform;

pub struct Uniform<T> {
    buffer: wgpu::Buffer,
    queue: Rc<wgpu::Queue>,
    _value: PhantomData<T>,
}

impl<T: UniformType> Uniform<T> {
    pub fn new(context: &DrawContext, value: T) -> Self {
        let buffer = context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Uniform Buffer"),
                contents: bytemuck::cast_slice(&[value.apply_alignment()]),
                usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::UNIFORM,
            });
        let queue = Rc::clone(&context.queue);
        Self {
            buffer,
            queue,
            _value: PhantomData,
        }
    }
    pub fn write_uniform(&mut self, data: &T) {
        self.queue.write_buffer(
            &self.buffer,
            0 as wgpu::BufferAddress,
            bytemuck::cast_slice(&[data.apply_alignment()]),
        );
    }
}

pub struct BindingSlot<'a> {
    pub bind_group: u32,
    pub binding: u32,
    pub resource: &'a dyn AsBindingResource,
}

pub trait AsBindingResource {
    fn binding_resource(&self) -> wgpu::BindingResource;
    fn binding_type(&self) -> wgpu::BindingType;
}

impl<T> AsBindingResource for Uniform<T>
where
    T: UniformType,
{
    fn binding_resource(&self) -> wgpu::BindingResource {
        self.buffer.as_entire_binding()
    }
    fn binding_type(&self) -> wgpu::BindingType {
        wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        }
    }
}

/// Index buffer shared by every drawable built over the same geometry.
#[derive(Clone)]
pub struct IndexBuffer {
    buffer: Arc<wgpu::Buffer>,
    count: u32,
}

impl IndexBuffer {
    pub fn new(context: &DrawContext, indices: &[u32]) -> anyhow::Result<Self> {
        let count = u32::try_from(indices.len()).context("Too many indices")?;
        let buffer = context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Index Buffer"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        Ok(Self {
            buffer: Arc::new(buffer),
            count,
        })
    }
}

pub fn create_vertex_buffer<T: NoUninit>(context: &DrawContext, data: &[T]) -> Arc<wgpu::Buffer> {
    Arc::new(
        context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Buffer"),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::VERTEX,
            }),
    )
}

pub struct DrawableBuilder<'a> {
    context: &'a DrawContext,
    shader_module: &'a wgpu::ShaderModule,
    attributes: Vec<[wgpu::VertexAttribute; 1]>,
    buffers: Vec<Arc<wgpu::Buffer>>,
    index_buffer: IndexBuffer,
    topology: wgpu::PrimitiveTopology,
    cull_mode: Option<wgpu::Face>,
    depth_write: bool,
    blend_option: Option<wgpu::BlendState>,
    binding_groups:
        Vec<Option<BTreeMap<u32, (wgpu::BindingResource<'a>, wgpu::BindGroupLayoutEntry)>>>,
}

impl<'a> DrawableBuilder<'a> {
    pub fn new(
        context: &'a DrawContext,
        shader_module: &'a wgpu::ShaderModule,
        index_buffer: IndexBuffer,
    ) -> Self {
        Self {
            context,
            shader_module,
            attributes: Vec::new(),
            buffers: Vec::new(),
            index_buffer,
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: Some(wgpu::Face::Back),
            depth_write: true,
            blend_option: None,
            binding_groups: Vec::new(),
        }
    }
    pub fn set_topology(&mut self, topology: wgpu::PrimitiveTopology) -> &mut Self {
        self.topology = topology;
        self
    }
    pub fn set_cull_mode(&mut self, cull_mode: Option<wgpu::Face>) -> &mut Self {
        self.cull_mode = cull_mode;
        self
    }
    pub fn set_depth_write(&mut self, depth_write: bool) -> &mut Self {
        self.depth_write = depth_write;
        self
    }
    pub fn set_blend_option(&mut self, blend_option: wgpu::BlendState) -> &mut Self {
        self.blend_option = Some(blend_option);
        self
    }
    pub fn add_binding_slot(
        &mut self,
        binding_slot: &BindingSlot<'a>,
    ) -> Result<&mut Self, anyhow::Error> {
        let bind_group_layout_entry = wgpu::BindGroupLayoutEntry {
            binding: binding_slot.binding,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: binding_slot.resource.binding_type(),
            count: None,
        };
        let bind_group = binding_slot.bind_group as usize;
        if bind_group >= self.binding_groups.len() {
            self.binding_groups.resize(bind_group + 1, None);
        }
        let bindings = self.binding_groups[bind_group].get_or_insert_with(BTreeMap::new);
        if bindings.contains_key(&binding_slot.binding) {
            bail!(
                "Binding {} of group {} already used!",
                binding_slot.binding,
                binding_slot.bind_group
            );
        }
        bindings.insert(
            binding_slot.binding,
            (
                binding_slot.resource.binding_resource(),
                bind_group_layout_entry,
            ),
        );
        Ok(self)
    }
    /// Binds a vertex buffer holding one attribute per vertex.
    pub fn add_attribute(
        &mut self,
        shader_location: u32,
        buffer: &Arc<wgpu::Buffer>,
        format: wgpu::VertexFormat,
    ) -> Result<&mut Self, anyhow::Error> {
        if self
            .attributes
            .iter()
            .any(|[attribute]| attribute.shader_location == shader_location)
        {
            bail!("Location {} already used!", shader_location);
        }
        self.attributes.push([wgpu::VertexAttribute {
            format,
            offset: 0,
            shader_location,
        }]);
        self.buffers.push(Arc::clone(buffer));
        Ok(self)
    }
    #[must_use]
    pub fn build(self) -> Drawable {
        let mut bind_groups = BTreeMap::<u32, wgpu::BindGroup>::new();
        let mut bind_group_layouts = Vec::new();
        for (group_id, group) in (0u32..).zip(self.binding_groups) {
            let mut bind_group_layout_entries = Vec::new();
            let mut bind_group_entries = Vec::new();
            for (bind_id, (bind, entry)) in group.unwrap_or_default() {
                bind_group_layout_entries.push(entry);
                bind_group_entries.push(wgpu::BindGroupEntry {
                    binding: bind_id,
                    resource: bind,
                });
            }
            let bind_group_layout =
                self.context
                    .device
                    .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                        label: None,
                        entries: &bind_group_layout_entries,
                    });
            let bind_group = self
                .context
                .device
                .create_bind_group(&wgpu::BindGroupDescriptor {
                    label: None,
                    layout: &bind_group_layout,
                    entries: &bind_group_entries,
                });
            bind_group_layouts.push(bind_group_layout);
            bind_groups.insert(group_id, bind_group);
        }

        let vertex_buffer_layouts: Vec<_> = self
            .attributes
            .iter()
            .map(|attributes| wgpu::VertexBufferLayout {
                array_stride: attributes[0].format.size() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes,
            })
            .collect();
        let vertex_state = wgpu::VertexState {
            module: self.shader_module,
            entry_point: None,
            buffers: &vertex_buffer_layouts,
            compilation_options: PipelineCompilationOptions::default(),
        };
        let fragment_state = wgpu::FragmentState {
            module: self.shader_module,
            entry_point: None,
            targets: &[Some(wgpu::ColorTargetState {
                format: self.context.surface_config.format,
                blend: self.blend_option,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: PipelineCompilationOptions::default(),
        };
        let pipeline_layout =
            self.context
                .device
                .create_pipeline_layout(&PipelineLayoutDescriptor {
                    label: None,
                    bind_group_layouts: &bind_group_layouts.iter().collect::<Vec<_>>(),
                    push_constant_ranges: &[],
                });
        let pipeline =
            self.context
                .device
                .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    cache: None,
                    label: Some("Render Pipeline"),
                    layout: Some(&pipeline_layout),
                    vertex: vertex_state,
                    fragment: Some(fragment_state),
                    primitive: wgpu::PrimitiveState {
                        topology: self.topology,
                        strip_index_format: None,
                        front_face: wgpu::FrontFace::Ccw,
                        cull_mode: self.cull_mode,
                        unclipped_depth: false,
                        polygon_mode: wgpu::PolygonMode::Fill,
                        conservative: false,
                    },
                    depth_stencil: Some(wgpu::DepthStencilState {
                        format: DrawContext::DEPTH_FORMAT,
                        depth_write_enabled: self.depth_write,
                        depth_compare: wgpu::CompareFunction::LessEqual,
                        stencil: StencilState::default(),
                        bias: DepthBiasState::default(),
                    }),
                    multisample: wgpu::MultisampleState {
                        count: self.context.multisample_config.get_multisample_count(),
                        ..Default::default()
                    },
                    multiview: None,
                });

        Drawable {
            index_buffer: self.index_buffer,
            buffers: self.buffers,
            pipeline,
            bind_groups,
        }
    }
}

pub struct Drawable {
    index_buffer: IndexBuffer,
    buffers: Vec<Arc<wgpu::Buffer>>,
    pipeline: wgpu::RenderPipeline,
    bind_groups: BTreeMap<u32, wgpu::BindGroup>,
}

impl Drawable {
    pub fn render(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_pipeline(&self.pipeline);
        for (group_id, bind_group) in &self.bind_groups {
            render_pass.set_bind_group(*group_id, bind_group, &[]);
        }
        for (slot, vertex_buffer) in (0u32..).zip(&self.buffers) {
            render_pass.set_vertex_buffer(slot, vertex_buffer.slice(..));
        }
        render_pass.set_index_buffer(self.index_buffer.buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.index_buffer.count, 0, 0..1);
    }
}

pub struct MultiSampleConfig {
    multisample_enabled: bool,
    multisample_count: u32,
}

impl MultiSampleConfig {
    #[must_use]
    pub fn get_multisample_count(&self) -> u32 {
        if self.multisample_enabled {
            self.multisample_count
        } else {
            1
        }
    }
}

trait DeviceLocalExt {
    fn create_depth_texture(
        &self,
        surface_config: &wgpu::SurfaceConfiguration,
        multisample_config: &MultiSampleConfig,
    ) -> wgpu::Texture;
    fn create_multisample_texture(
        &self,
        surface_config: &wgpu::SurfaceConfiguration,
        multisample_config: &MultiSampleConfig,
    ) -> Option<wgpu::Texture>;
}

impl DeviceLocalExt for wgpu::Device {
    fn create_depth_texture(
        &self,
        surface_config: &SurfaceConfiguration,
        multisample_config: &MultiSampleConfig,
    ) -> Texture {
        self.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: surface_config.width,
                height: surface_config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: multisample_config.get_multisample_count(),
            dimension: wgpu::TextureDimension::D2,
            view_formats: &[],
            format: DrawContext::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        })
    }

    fn create_multisample_texture(
        &self,
        surface_config: &SurfaceConfiguration,
        multisample_config: &MultiSampleConfig,
    ) -> Option<Texture> {
        multisample_config.multisample_enabled.then(|| {
            self.create_texture(&wgpu::TextureDescriptor {
                label: Some("Multisample Texture"),
                size: wgpu::Extent3d {
                    width: surface_config.width,
                    height: surface_config.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: multisample_config.get_multisample_count(),
                dimension: wgpu::TextureDimension::D2,
                format: surface_config.format,
                view_formats: &[],
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            })
        })
    }
}

/// Outcome of one [`DrawContext::render_frame`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStatus {
    Presented,
    /// The surface was not ready; nothing was drawn this time.
    Skipped,
}

/// Where frames end up: the window surface, or a texture nobody presents.
enum DrawTarget {
    Window {
        surface: wgpu::Surface<'static>,
        window: Arc<Window>,
    },
    Offscreen(wgpu::Texture),
}

impl DrawTarget {
    fn configure(&mut self, device: &wgpu::Device, surface_config: &SurfaceConfiguration) {
        match self {
            Self::Window { surface, .. } => surface.configure(device, surface_config),
            Self::Offscreen(texture) => *texture = Self::create_texture(device, surface_config),
        }
    }

    fn create_texture(device: &wgpu::Device, surface_config: &SurfaceConfiguration) -> Texture {
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Target Texture"),
            size: wgpu::Extent3d {
                width: surface_config.width,
                height: surface_config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: surface_config.format,
            usage: wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
    }
}

pub struct DrawContext {
    multisample_texture: Option<wgpu::Texture>,
    target: DrawTarget,
    clear_color: wgpu::Color,
    pub multisample_config: MultiSampleConfig,
    pub depth_texture: wgpu::Texture,
    pub queue: Rc<wgpu::Queue>,
    pub device: wgpu::Device,
    pub surface_config: wgpu::SurfaceConfiguration,
}

impl DrawContext {
    const DEFAULT_MULTISAMPLE_ENABLED: bool = true;
    const DEFAULT_MULTISAMPLE_COUNT: u32 = 4;
    const DEFAULT_CLEAR_COLOR: wgpu::Color = wgpu::Color {
        r: 0.012,
        g: 0.014,
        b: 0.018,
        a: 1.0,
    };
    const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Draws into `window`, or into an offscreen texture when there is none.
    pub async fn new(window: Option<Arc<Window>>, dimensions: Dimensions) -> anyhow::Result<Self> {
        let multisample_config = MultiSampleConfig {
            multisample_enabled: Self::DEFAULT_MULTISAMPLE_ENABLED,
            multisample_count: Self::DEFAULT_MULTISAMPLE_COUNT,
        };
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = match &window {
            Some(window) => Some(
                instance
                    .create_surface(Arc::clone(window))
                    .context("Could not create surface")?,
            ),
            None => None,
        };
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: surface.as_ref(),
            })
            .await
            .ok_or_else(|| anyhow!("Could not create WebGPU adapter"))?;
        debug!("{:?}", adapter.get_info());
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device Descriptor"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await?;
        let surface_format = match &surface {
            Some(surface) => {
                let surface_caps = surface.get_capabilities(&adapter);
                surface_caps
                    .formats
                    .iter()
                    .find(|f| f.is_srgb())
                    .or_else(|| surface_caps.formats.first())
                    .copied()
                    .ok_or_else(|| anyhow!("Surface reports no texture format"))?
            }
            None => Self::OFFSCREEN_FORMAT,
        };
        let surface_config = wgpu::SurfaceConfiguration {
            desired_maximum_frame_latency: 2,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: dimensions.width.max(1),
            height: dimensions.height.max(1),
            view_formats: vec![],
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            present_mode: wgpu::PresentMode::Fifo,
        };
        let target = match (surface, window) {
            (Some(surface), Some(window)) => {
                surface.configure(&device, &surface_config);
                DrawTarget::Window { surface, window }
            }
            _ => DrawTarget::Offscreen(DrawTarget::create_texture(&device, &surface_config)),
        };
        let depth_texture = device.create_depth_texture(&surface_config, &multisample_config);
        let multisample_texture =
            device.create_multisample_texture(&surface_config, &multisample_config);

        Ok(Self {
            multisample_config,
            multisample_texture,
            target,
            device,
            queue: Rc::new(queue),
            surface_config,
            depth_texture,
            clear_color: Self::DEFAULT_CLEAR_COLOR,
        })
    }

    #[must_use]
    pub fn window(&self) -> Option<&Arc<Window>> {
        match &self.target {
            DrawTarget::Window { window, .. } => Some(window),
            DrawTarget::Offscreen(_) => None,
        }
    }

    pub fn create_shader_module(&self, wgsl_shader: &str) -> wgpu::ShaderModule {
        self.device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: None,
                source: wgpu::ShaderSource::Wgsl(wgsl_shader.into()),
            })
    }

    pub fn resize(&mut self, dimensions: Dimensions) {
        self.surface_config.width = dimensions.width.max(1);
        self.surface_config.height = dimensions.height.max(1);
        self.reconfigure();
    }

    fn reconfigure(&mut self) {
        self.target.configure(&self.device, &self.surface_config);
        self.depth_texture = self
            .device
            .create_depth_texture(&self.surface_config, &self.multisample_config);
        self.multisample_texture = self
            .device
            .create_multisample_texture(&self.surface_config, &self.multisample_config);
    }

    pub fn surface_dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.surface_config.width,
            height: self.surface_config.height,
        }
    }

    /// Acquires the next target texture and lets `draw` fill a single render pass.
    pub fn render_frame<C>(&mut self, draw: C) -> anyhow::Result<FrameStatus>
    where
        C: FnOnce(&mut wgpu::RenderPass<'static>),
    {
        let acquired = match &self.target {
            DrawTarget::Window { surface, .. } => Some(surface.get_current_texture()),
            DrawTarget::Offscreen(_) => None,
        };
        let surface_texture = match acquired {
            None => None,
            Some(Ok(texture)) => Some(texture),
            Some(Err(err @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated))) => {
                warn!("Surface {err}, reconfiguring");
                self.reconfigure();
                return Ok(FrameStatus::Skipped);
            }
            Some(Err(wgpu::SurfaceError::Timeout)) => {
                warn!("Surface timeout, skipping frame");
                return Ok(FrameStatus::Skipped);
            }
            Some(Err(err)) => bail!("Cannot acquire surface texture: {err}"),
        };
        let displayed_view = match (&surface_texture, &self.target) {
            (Some(surface_texture), _) => surface_texture
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default()),
            (None, DrawTarget::Offscreen(texture)) => {
                texture.create_view(&wgpu::TextureViewDescriptor::default())
            }
            (None, DrawTarget::Window { .. }) => bail!("Window target without a surface texture"),
        };
        let depth_texture_view = self
            .depth_texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let multisample_view = self
            .multisample_texture
            .as_ref()
            .map(|texture| texture.create_view(&wgpu::TextureViewDescriptor::default()));
        let (pass_view, pass_resolve_target) = match &multisample_view {
            Some(multisample_view) => (multisample_view, Some(&displayed_view)),
            None => (&displayed_view, None),
        };
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Command Encoder"),
            });
        let mut render_pass = encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render pass"),
                timestamp_writes: None,
                occlusion_query_set: None,
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: pass_view,
                    resolve_target: pass_resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth_texture_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
            })
            .forget_lifetime();
        draw(&mut render_pass);
        drop(render_pass);
        self.queue.submit(std::iter::once(encoder.finish()));
        if let (Some(surface_texture), DrawTarget::Window { window, .. }) =
            (surface_texture, &self.target)
        {
            window.pre_present_notify();
            surface_texture.present();
        }
        Ok(FrameStatus::Presented)
    }
}
