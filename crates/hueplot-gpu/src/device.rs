//! GPU context ownership and shader program compilation.
//!
//! A [`GraphicsDevice`] stands in for one canvas: it owns the wgpu
//! device/queue plus an offscreen color+depth target, and compiles
//! header+body WGSL source pairs into [`ShaderProgram`]s whose uniforms
//! are addressed by name, the way the scene machinery expects.

use std::num::NonZeroU64;
use std::sync::Arc;

/// Shared WGSL header injected before every program body. Declares the
/// scene-machinery uniforms, the quad vertex interface, and helpers
/// available to all programs.
const SHADER_HEADER: &str = include_str!("../shaders/header.wgsl");

/// Default vertex stage: transform the unit quad by model/view/projection.
const DEFAULT_VERTEX: &str = include_str!("../shaders/quad_vert.wgsl");

/// Default fragment stage: texture-coordinate debug gradient.
const DEFAULT_FRAGMENT: &str = include_str!("../shaders/debug_frag.wgsl");

/// Texture format of the offscreen color target.
const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Depth buffer format.
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Errors from GPU context creation and shader compilation.
///
/// All of these degrade the visualization rather than abort the caller:
/// no adapter means "no histogram picker available", a failed program
/// simply never draws.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("no compatible GPU adapter found: {0}")]
    ContextUnavailable(#[from] wgpu::RequestAdapterError),
    #[error("failed to acquire GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),
    #[error("shader compilation failed: {0}")]
    CompileFailed(String),
}

/// Resolved device-side location of a named uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformLocation {
    pub(crate) binding: u32,
}

struct UniformSpec {
    name: String,
    binding: u32,
    size: u64,
}

/// A compiled shader program: render pipeline and reflected uniform table.
///
/// Programs hold no uniform storage of their own; every material backs
/// the program's uniform table with its own [`UniformBindings`], so
/// materials sharing one program never overwrite each other's values.
/// Programs live as long as the [`GraphicsDevice`] that compiled them and
/// are shared between materials via `Arc`.
pub struct ShaderProgram {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniforms: Vec<UniformSpec>,
    position_location: Option<u32>,
    tex_coord_location: Option<u32>,
}

impl ShaderProgram {
    /// Look up the location of a named uniform.
    ///
    /// Scanned fresh on every call; callers must tolerate `None` for
    /// names the program does not declare.
    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        self.uniforms
            .iter()
            .find(|slot| slot.name == name)
            .map(|slot| UniformLocation {
                binding: slot.binding,
            })
    }

    /// Reflected location of the `aVertexPosition` input, if declared.
    pub fn position_location(&self) -> Option<u32> {
        self.position_location
    }

    /// Reflected location of the `aTexCoord` input, if declared.
    pub fn tex_coord_location(&self) -> Option<u32> {
        self.tex_coord_location
    }

    pub(crate) fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    /// Allocate per-material storage for this program's uniform table:
    /// one buffer per reflected binding plus the bind group over them.
    pub(crate) fn create_bindings(&self, device: &wgpu::Device) -> UniformBindings {
        let slots: Vec<UniformSlot> = self
            .uniforms
            .iter()
            .map(|spec| UniformSlot {
                binding: spec.binding,
                size: spec.size,
                buffer: device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(&format!("hueplot_uniform_{}", spec.name)),
                    size: spec.size,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                }),
            })
            .collect();

        let entries: Vec<wgpu::BindGroupEntry> = slots
            .iter()
            .map(|slot| wgpu::BindGroupEntry {
                binding: slot.binding,
                resource: slot.buffer.as_entire_binding(),
            })
            .collect();
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("hueplot_material_bg"),
            layout: &self.bind_group_layout,
            entries: &entries,
        });

        UniformBindings { slots, bind_group }
    }
}

struct UniformSlot {
    binding: u32,
    size: u64,
    buffer: wgpu::Buffer,
}

/// One material's backing storage for a program's uniform table.
///
/// Buffers and the bind group are created once and never replaced;
/// uniform pushes only rewrite buffer contents.
pub struct UniformBindings {
    slots: Vec<UniformSlot>,
    bind_group: wgpu::BindGroup,
}

impl UniformBindings {
    fn slot(&self, location: UniformLocation) -> Option<&UniformSlot> {
        self.slots
            .iter()
            .find(|slot| slot.binding == location.binding)
    }

    pub(crate) fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

/// Owns one canvas-sized rendering context.
///
/// Two picker canvases each own an independent `GraphicsDevice`; neither
/// interacts with the other's state.
pub struct GraphicsDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    color_view: wgpu::TextureView,
    color_target: wgpu::Texture,
    depth_view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl GraphicsDevice {
    /// Acquire a GPU context with an offscreen `width` × `height` target.
    ///
    /// Adapter or device absence is recoverable: callers degrade to "no
    /// picker" instead of crashing.
    pub fn new(width: u32, height: u32) -> Result<Self, GpuError> {
        let instance = wgpu::Instance::default();
        let adapter = pollster::block_on(
            instance.request_adapter(&wgpu::RequestAdapterOptions::default()),
        )
        .map_err(|err| {
            tracing::error!(%err, "GPU context unavailable");
            GpuError::ContextUnavailable(err)
        })?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("hueplot_device"),
            ..Default::default()
        }))
        .map_err(|err| {
            tracing::error!(%err, "GPU device request failed");
            GpuError::DeviceRequest(err)
        })?;

        let color_target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("hueplot_color_target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let color_view = color_target.create_view(&wgpu::TextureViewDescriptor::default());

        let depth_target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("hueplot_depth_target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth_target.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            device,
            queue,
            color_view,
            color_target,
            depth_view,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub(crate) fn wgpu_device(&self) -> &wgpu::Device {
        &self.device
    }

    pub(crate) fn wgpu_queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub(crate) fn color_view(&self) -> &wgpu::TextureView {
        &self.color_view
    }

    pub(crate) fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_view
    }

    /// Compile a program from optional vertex/fragment bodies.
    ///
    /// The shared header is concatenated ahead of the bodies so the
    /// header-declared interface is available to every program; `None`
    /// falls back to the stock quad vertex stage and the debug fragment
    /// stage. Parse or validation failure yields [`GpuError::CompileFailed`]
    /// with the naga diagnostic; the error is logged and no program is
    /// produced, so callers must check before drawing.
    pub fn compile_program(
        &self,
        vertex_body: Option<&str>,
        fragment_body: Option<&str>,
    ) -> Result<Arc<ShaderProgram>, GpuError> {
        let source = format!(
            "{SHADER_HEADER}\n{}\n{}",
            vertex_body.unwrap_or(DEFAULT_VERTEX),
            fragment_body.unwrap_or(DEFAULT_FRAGMENT),
        );

        let module = naga::front::wgsl::parse_str(&source).map_err(|err| {
            let diagnostic = err.emit_to_string(&source);
            tracing::error!("shader compilation error:\n{diagnostic}");
            GpuError::CompileFailed(diagnostic)
        })?;

        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .map_err(|err| {
            let diagnostic = err.emit_to_string(&source);
            tracing::error!("shader validation error:\n{diagnostic}");
            GpuError::CompileFailed(diagnostic)
        })?;

        let has_vertex = module
            .entry_points
            .iter()
            .any(|ep| ep.stage == naga::ShaderStage::Vertex);
        let has_fragment = module
            .entry_points
            .iter()
            .any(|ep| ep.stage == naga::ShaderStage::Fragment);
        if !has_vertex || !has_fragment {
            let diagnostic = "program must define vs_main and fs_main entry points".to_string();
            tracing::error!("shader linking error: {diagnostic}");
            return Err(GpuError::CompileFailed(diagnostic));
        }

        // Reflect the uniform interface: name, binding, and size per
        // uniform-space global. Storage is allocated per material.
        let mut uniforms = Vec::new();
        for (_, var) in module.global_variables.iter() {
            if var.space != naga::AddressSpace::Uniform {
                continue;
            }
            let (Some(name), Some(resource)) = (var.name.clone(), var.binding.clone()) else {
                continue;
            };
            if resource.group != 0 {
                continue;
            }
            let size = module.types[var.ty].inner.size(module.to_ctx()) as u64;
            uniforms.push(UniformSpec {
                name,
                binding: resource.binding,
                size: size.max(16),
            });
        }

        // Reflect the vertex input locations by attribute name.
        let mut position_location = None;
        let mut tex_coord_location = None;
        for ep in &module.entry_points {
            if ep.stage != naga::ShaderStage::Vertex {
                continue;
            }
            for arg in &ep.function.arguments {
                let Some(naga::Binding::Location { location, .. }) = &arg.binding else {
                    continue;
                };
                match arg.name.as_deref() {
                    Some("aVertexPosition") => position_location = Some(*location),
                    Some("aTexCoord") => tex_coord_location = Some(*location),
                    _ => {}
                }
            }
        }

        let shader = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("hueplot_program_shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let layout_entries: Vec<wgpu::BindGroupLayoutEntry> = uniforms
            .iter()
            .map(|slot| wgpu::BindGroupLayoutEntry {
                binding: slot.binding,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(slot.size),
                },
                count: None,
            })
            .collect();

        let bind_group_layout =
            self.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("hueplot_program_layout"),
                    entries: &layout_entries,
                });

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("hueplot_program_pipeline_layout"),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

        let position_attrs = [wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: 0,
            shader_location: position_location.unwrap_or(0),
        }];
        let tex_coord_attrs = [wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x2,
            offset: 0,
            shader_location: tex_coord_location.unwrap_or(1),
        }];

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("hueplot_program_pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    buffers: &[
                        wgpu::VertexBufferLayout {
                            array_stride: 12,
                            step_mode: wgpu::VertexStepMode::Vertex,
                            attributes: &position_attrs,
                        },
                        wgpu::VertexBufferLayout {
                            array_stride: 8,
                            step_mode: wgpu::VertexStepMode::Vertex,
                            attributes: &tex_coord_attrs,
                        },
                    ],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: TARGET_FORMAT,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::LessEqual,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        Ok(Arc::new(ShaderProgram {
            pipeline,
            bind_group_layout,
            uniforms,
            position_location,
            tex_coord_location,
        }))
    }

    /// Copy float data into a resolved uniform's buffer within one
    /// material's bindings.
    ///
    /// Data beyond the uniform's declared size is truncated.
    pub fn write_uniform(
        &self,
        bindings: &UniformBindings,
        location: UniformLocation,
        data: &[f32],
    ) {
        let Some(slot) = bindings.slot(location) else {
            return;
        };
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let len = bytes.len().min(slot.size as usize);
        // Copies must stay 4-byte aligned.
        let len = len - (len % 4);
        if len == 0 {
            return;
        }
        self.queue.write_buffer(&slot.buffer, 0, &bytes[..len]);
    }

    /// Read the offscreen color target back as tightly packed RGBA bytes.
    ///
    /// Synchronous; intended for headless verification of rendered frames.
    pub fn read_target(&self) -> Vec<u8> {
        const ROW_ALIGN: u32 = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let unpadded = self.width * 4;
        let padded = unpadded.div_ceil(ROW_ALIGN) * ROW_ALIGN;

        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("hueplot_readback_staging"),
            size: (padded as u64) * (self.height as u64),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("hueplot_readback_encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.color_target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: None,
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit([encoder.finish()]);

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = self.device.poll(wgpu::PollType::wait_indefinitely());
        if rx.recv().map(|r| r.is_err()).unwrap_or(true) {
            tracing::error!("readback mapping failed");
            return Vec::new();
        }

        let mapped = slice.get_mapped_range();
        let mut pixels = Vec::with_capacity((unpadded as usize) * (self.height as usize));
        for row in 0..self.height {
            let start = (row * padded) as usize;
            pixels.extend_from_slice(&mapped[start..start + unpadded as usize]);
        }
        drop(mapped);
        staging.unmap();
        pixels
    }
}
