//! `wgpu` implementation of [`RenderBackend`].
//!
//! One pipeline layout serves both materials: binding 0 is the uniform block,
//! binding 1 the plane texture, binding 2 a nearest sampler. Textures are
//! `Rgba8Unorm` and the target format is non-sRGB so ink colors reach the
//! screen unchanged.

use std::collections::HashMap;
use std::sync::{Arc, mpsc};

use anyhow::{Context, anyhow};
use image::RgbaImage;
use tracing::{debug, info, warn};
use wgpu::util::DeviceExt;
use wgpu::{self, SurfaceError};
use winit::window::Window;

use crate::error::Error;
use crate::processing::layout::PlaneSize;
use crate::processing::ordered::Viewport;

use super::backend::{DrawCall, GeometryId, MaterialDesc, MaterialId, RenderBackend, TextureId};
use super::camera::{Camera, Mat4};

const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const CLEAR: wgpu::Color = wgpu::Color {
    r: 1.0,
    g: 1.0,
    b: 1.0,
    a: 0.0,
};

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct PlaneVertex {
    position: [f32; 3],
    uv: [f32; 2],
}

impl PlaneVertex {
    fn layout<'a>() -> wgpu::VertexBufferLayout<'a> {
        const ATTRS: [wgpu::VertexAttribute; 2] =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PlaneVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRS,
        }
    }
}

/// Triangle-strip quad centered on the origin; image row 0 is at the top.
fn plane_vertices(size: PlaneSize) -> [PlaneVertex; 4] {
    let hw = size.width / 2.0;
    let hh = size.height / 2.0;
    [
        PlaneVertex {
            position: [-hw, -hh, 0.0],
            uv: [0.0, 1.0],
        },
        PlaneVertex {
            position: [hw, -hh, 0.0],
            uv: [1.0, 1.0],
        },
        PlaneVertex {
            position: [-hw, hh, 0.0],
            uv: [0.0, 0.0],
        },
        PlaneVertex {
            position: [hw, hh, 0.0],
            uv: [1.0, 0.0],
        },
    ]
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    mvp: Mat4,
    ink: [f32; 4],
    // viewport width, viewport height, dither scale, unused
    params: [f32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MaterialKind {
    Textured,
    Ordered,
}

struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

struct GpuMaterial {
    kind: MaterialKind,
    uniforms: Uniforms,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

enum Target {
    Window {
        surface: wgpu::Surface<'static>,
        config: wgpu::SurfaceConfiguration,
    },
    Offscreen {
        texture: wgpu::Texture,
    },
}

struct Pipelines {
    bind_layout: wgpu::BindGroupLayout,
    textured: wgpu::RenderPipeline,
    ordered: wgpu::RenderPipeline,
}

pub struct GpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    target: Target,
    viewport: Viewport,
    pipelines: Pipelines,
    sampler: wgpu::Sampler,
    max_texture_dimension: u32,
    next_id: u64,
    textures: HashMap<TextureId, GpuTexture>,
    geometries: HashMap<GeometryId, wgpu::Buffer>,
    materials: HashMap<MaterialId, GpuMaterial>,
    disposed: bool,
}

impl GpuBackend {
    /// Presents into `window`.
    ///
    /// # Errors
    /// [`Error::RendererUnavailable`] when no surface, adapter or device can be
    /// created for the window.
    pub fn for_window(window: Arc<Window>) -> Result<Self, Error> {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window.clone())
            .map_err(|err| unavailable("failed to create surface", err))?;
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|err| unavailable("failed to acquire GPU adapter", err))?;
        let (device, queue) = request_device(&adapter)?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|fmt| !fmt.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| Error::RendererUnavailable("surface reports no formats".into()))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let size = window.inner_size();
        let viewport = Viewport::new(size.width, size.height).non_zero();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: viewport.width,
            height: viewport.height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        info!(
            width = config.width,
            height = config.height,
            format = ?config.format,
            "render surface configured",
        );

        Ok(Self::assemble(
            device,
            queue,
            Target::Window { surface, config },
            format,
            viewport,
        ))
    }

    /// Renders into an `Rgba8Unorm` texture readable with [`Self::snapshot`].
    pub fn offscreen(viewport: Viewport) -> Result<Self, Error> {
        let instance = wgpu::Instance::default();
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|err| unavailable("failed to acquire GPU adapter", err))?;
        let (device, queue) = request_device(&adapter)?;

        let viewport = viewport.non_zero();
        let texture = offscreen_texture(&device, viewport);
        info!(
            width = viewport.width,
            height = viewport.height,
            "offscreen target configured"
        );
        Ok(Self::assemble(
            device,
            queue,
            Target::Offscreen { texture },
            OFFSCREEN_FORMAT,
            viewport,
        ))
    }

    fn assemble(
        device: wgpu::Device,
        queue: wgpu::Queue,
        target: Target,
        format: wgpu::TextureFormat,
        viewport: Viewport,
    ) -> Self {
        let pipelines = create_pipelines(&device, format);
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("plane-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let max_texture_dimension = device.limits().max_texture_dimension_2d;
        Self {
            device,
            queue,
            target,
            viewport,
            pipelines,
            sampler,
            max_texture_dimension,
            next_id: 1,
            textures: HashMap::new(),
            geometries: HashMap::new(),
            materials: HashMap::new(),
            disposed: false,
        }
    }

    /// Copies the offscreen target into host memory.
    ///
    /// # Errors
    /// Fails for window targets and when the readback cannot be mapped.
    pub fn snapshot(&self) -> Result<RgbaImage, Error> {
        let Target::Offscreen { texture } = &self.target else {
            return Err(Error::Render(anyhow!("snapshot needs an offscreen target")));
        };
        let Viewport { width, height } = self.viewport;
        let unpadded = 4 * width;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded = unpadded.div_ceil(align) * align;

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("snapshot-readback"),
            size: u64::from(padded) * u64::from(height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("snapshot-encoder"),
            });
        encoder.copy_texture_to_buffer(
            texture.as_image_copy(),
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(height),
                },
            },
            extent(width, height),
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = buffer.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device
            .poll(wgpu::PollType::Wait)
            .context("device poll failed during snapshot")
            .map_err(Error::Render)?;
        rx.recv()
            .context("snapshot map callback dropped")
            .map_err(Error::Render)?
            .context("failed to map snapshot buffer")
            .map_err(Error::Render)?;

        let mut pixels = Vec::with_capacity((unpadded * height) as usize);
        {
            let data = slice.get_mapped_range();
            for row in data.chunks(padded as usize) {
                pixels.extend_from_slice(&row[..unpadded as usize]);
            }
        }
        buffer.unmap();
        buffer.destroy();
        RgbaImage::from_raw(width, height, pixels)
            .ok_or_else(|| Error::Render(anyhow!("snapshot size mismatch")))
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn reconfigure(&mut self) {
        match &mut self.target {
            Target::Window { surface, config } => {
                config.width = self.viewport.width;
                config.height = self.viewport.height;
                surface.configure(&self.device, config);
            }
            Target::Offscreen { texture } => {
                texture.destroy();
                *texture = offscreen_texture(&self.device, self.viewport);
            }
        }
        debug!(
            width = self.viewport.width,
            height = self.viewport.height,
            "render target resized"
        );
    }

    /// Records and submits one pass; `draw` is skipped when `None`.
    fn submit(&mut self, draw: Option<&DrawCall>) -> Result<(), Error> {
        let acquired = match &self.target {
            Target::Window { surface, .. } => Some(surface.get_current_texture()),
            Target::Offscreen { .. } => None,
        };
        let frame = match acquired {
            None => None,
            Some(Ok(frame)) => Some(frame),
            Some(Err(SurfaceError::Outdated | SurfaceError::Lost)) => {
                info!("render surface lost; reconfiguring");
                self.reconfigure();
                return Ok(());
            }
            Some(Err(SurfaceError::Timeout)) => {
                warn!("render surface acquisition timed out");
                return Ok(());
            }
            Some(Err(SurfaceError::OutOfMemory)) => {
                return Err(Error::Render(anyhow!("render surface out of memory")));
            }
            Some(Err(SurfaceError::Other)) => {
                warn!("render surface reported an unknown error; reconfiguring");
                self.reconfigure();
                return Ok(());
            }
        };
        let view = match (&frame, &self.target) {
            (Some(frame), _) => frame
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default()),
            (None, Target::Offscreen { texture }) => {
                texture.create_view(&wgpu::TextureViewDescriptor::default())
            }
            (None, Target::Window { .. }) => return Ok(()),
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("plane-encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("plane-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            if let Some(draw) = draw {
                let geometry = self
                    .geometries
                    .get(&draw.geometry)
                    .ok_or_else(|| Error::Render(anyhow!("draw references a released geometry")))?;
                let material = self
                    .materials
                    .get(&draw.material)
                    .ok_or_else(|| Error::Render(anyhow!("draw references a released material")))?;
                let pipeline = match material.kind {
                    MaterialKind::Textured => &self.pipelines.textured,
                    MaterialKind::Ordered => &self.pipelines.ordered,
                };
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, &material.bind_group, &[]);
                pass.set_vertex_buffer(0, geometry.slice(..));
                pass.draw(0..4, 0..1);
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        if let Some(frame) = frame {
            frame.present();
        }
        Ok(())
    }
}

impl RenderBackend for GpuBackend {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn max_texture_dimension(&self) -> u32 {
        self.max_texture_dimension
    }

    fn resize(&mut self, viewport: Viewport) {
        let viewport = viewport.non_zero();
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.reconfigure();
    }

    fn create_texture(&mut self, image: &RgbaImage) -> Result<TextureId, Error> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(Error::Render(anyhow!("cannot upload an empty texture")));
        }
        if width > self.max_texture_dimension || height > self.max_texture_dimension {
            return Err(Error::Render(anyhow!(
                "texture {width}x{height} exceeds device limit {}",
                self.max_texture_dimension
            )));
        }
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("plane-texture"),
            size: extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            texture.as_image_copy(),
            image.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            extent(width, height),
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let id = TextureId(self.next_id());
        self.textures.insert(id, GpuTexture { texture, view });
        debug!(id = id.0, width, height, "texture uploaded");
        Ok(id)
    }

    fn create_geometry(&mut self, size: PlaneSize) -> Result<GeometryId, Error> {
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("plane-vertices"),
                contents: bytemuck::cast_slice(&plane_vertices(size)),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let id = GeometryId(self.next_id());
        self.geometries.insert(id, buffer);
        Ok(id)
    }

    fn create_material(&mut self, desc: &MaterialDesc) -> Result<MaterialId, Error> {
        let texture = self
            .textures
            .get(&desc.texture())
            .ok_or_else(|| Error::Render(anyhow!("material references a released texture")))?;
        let (kind, ink, params) = match desc {
            MaterialDesc::Textured { .. } => (MaterialKind::Textured, [0.0; 4], [0.0; 4]),
            MaterialDesc::Ordered { dither, .. } => {
                let [r, g, b] = dither.ink.components();
                (
                    MaterialKind::Ordered,
                    [r, g, b, 1.0],
                    [
                        dither.viewport.width as f32,
                        dither.viewport.height as f32,
                        dither.scale,
                        0.0,
                    ],
                )
            }
        };
        let uniforms = Uniforms {
            mvp: super::camera::IDENTITY,
            ink,
            params,
        };
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("plane-uniforms"),
                contents: bytemuck::bytes_of(&uniforms),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("plane-bind-group"),
            layout: &self.pipelines.bind_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        let id = MaterialId(self.next_id());
        self.materials.insert(
            id,
            GpuMaterial {
                kind,
                uniforms,
                buffer,
                bind_group,
            },
        );
        Ok(id)
    }

    fn release_texture(&mut self, id: TextureId) {
        match self.textures.remove(&id) {
            Some(gpu) => gpu.texture.destroy(),
            None => warn!(id = id.0, "release of unknown texture"),
        }
    }

    fn release_geometry(&mut self, id: GeometryId) {
        match self.geometries.remove(&id) {
            Some(buffer) => buffer.destroy(),
            None => warn!(id = id.0, "release of unknown geometry"),
        }
    }

    fn release_material(&mut self, id: MaterialId) {
        match self.materials.remove(&id) {
            Some(material) => material.buffer.destroy(),
            None => warn!(id = id.0, "release of unknown material"),
        }
    }

    fn render(&mut self, camera: &Camera, draw: Option<&DrawCall>) -> Result<(), Error> {
        if self.disposed {
            return Err(Error::Disposed);
        }
        if let Some(draw) = draw {
            let material = self
                .materials
                .get_mut(&draw.material)
                .ok_or_else(|| Error::Render(anyhow!("draw references a released material")))?;
            material.uniforms.mvp = camera.mvp(draw.rotation);
            self.queue
                .write_buffer(&material.buffer, 0, bytemuck::bytes_of(&material.uniforms));
        }
        self.submit(draw)
    }

    fn clear(&mut self) -> Result<(), Error> {
        if self.disposed {
            return Err(Error::Disposed);
        }
        self.submit(None)
    }

    fn dispose(&mut self) {
        if std::mem::replace(&mut self.disposed, true) {
            return;
        }
        let leaked = self.textures.len() + self.geometries.len() + self.materials.len();
        if leaked > 0 {
            warn!(leaked, "disposing backend with live resources");
        }
        for (_, gpu) in self.textures.drain() {
            gpu.texture.destroy();
        }
        for (_, buffer) in self.geometries.drain() {
            buffer.destroy();
        }
        for (_, material) in self.materials.drain() {
            material.buffer.destroy();
        }
        if let Target::Offscreen { texture } = &self.target {
            texture.destroy();
        }
        self.device.destroy();
        info!("gpu backend disposed");
    }
}

fn unavailable(what: &str, err: impl std::fmt::Display) -> Error {
    Error::RendererUnavailable(format!("{what}: {err}"))
}

fn request_device(adapter: &wgpu::Adapter) -> Result<(wgpu::Device, wgpu::Queue), Error> {
    let limits = adapter.limits();
    pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
        label: Some("poster-device"),
        required_features: wgpu::Features::empty(),
        required_limits: limits,
        memory_hints: wgpu::MemoryHints::default(),
        trace: wgpu::Trace::default(),
    }))
    .map_err(|err| unavailable("failed to acquire GPU device", err))
}

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}

fn offscreen_texture(device: &wgpu::Device, viewport: Viewport) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("offscreen-target"),
        size: extent(viewport.width, viewport.height),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: OFFSCREEN_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}

fn create_pipelines(device: &wgpu::Device, format: wgpu::TextureFormat) -> Pipelines {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("plane-shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/plane.wgsl").into()),
    });
    let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("plane-bind-layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("plane-layout"),
        bind_group_layouts: &[&bind_layout],
        push_constant_ranges: &[],
    });
    let pipeline = |label: &str, fragment: &str| {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[PlaneVertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some(fragment),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        })
    };
    Pipelines {
        textured: pipeline("plane-textured", "fs_textured"),
        ordered: pipeline("plane-ordered", "fs_ordered"),
        bind_layout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniforms_match_shader_layout() {
        assert_eq!(std::mem::size_of::<Uniforms>(), 96);
        assert_eq!(std::mem::size_of::<PlaneVertex>(), 20);
    }

    #[test]
    fn plane_is_centered_with_top_row_at_v_zero() {
        let verts = plane_vertices(PlaneSize {
            width: 2.0,
            height: 1.0,
        });
        assert_eq!(verts[0].position, [-1.0, -0.5, 0.0]);
        assert_eq!(verts[3].position, [1.0, 0.5, 0.0]);
        assert_eq!(verts[2].uv, [0.0, 0.0]);
        assert_eq!(verts[1].uv, [1.0, 1.0]);
    }
}
