//! wgpu renderer
//!
//! Owns the device, the surface, the uploaded meshes, and the two render
//! passes. Geometry generation stays on the CPU side in [`crate::geometry`];
//! this module is the only place mesh data meets the graphics API.

mod environment;
mod error;
mod pbr_pass;
mod sky_pass;

pub use environment::Environment;
pub use error::{RenderError, RenderResult};

use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::geometry::MeshCache;
use crate::resources::{PbrTextureSet, TextureData};
use crate::scene::Scene;
use crate::DemoConfig;

use pbr_pass::PbrPass;
use sky_pass::SkyPass;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// An uploaded mesh.
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: Option<wgpu::Buffer>,
    /// Index count for indexed meshes, vertex count otherwise.
    draw_count: u32,
}

pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    sphere: GpuMesh,
    cube: GpuMesh,
    pbr: PbrPass,
    sky: SkyPass,
}

impl Renderer {
    /// Blocking initialization, wrapping the async adapter/device requests.
    pub fn new(
        window: Arc<Window>,
        config: &DemoConfig,
        texture_sets: &[PbrTextureSet],
        scene: &Scene,
    ) -> RenderResult<Self> {
        pollster::block_on(Self::new_async(window, config, texture_sets, scene))
    }

    pub async fn new_async(
        window: Arc<Window>,
        config: &DemoConfig,
        texture_sets: &[PbrTextureSet],
        scene: &Scene,
    ) -> RenderResult<Self> {
        let (surface, adapter, device, queue) = init_device(window.clone()).await?;

        let size = window.inner_size();
        let surface_config =
            configure_surface(&surface, &adapter, &device, size.width, size.height, config.vsync);
        let depth_view = create_depth_view(&device, surface_config.width, surface_config.height);

        // Build and upload the two meshes. The cache guarantees each is
        // generated exactly once.
        let mut meshes = MeshCache::new();
        let sphere_mesh = meshes.sphere(config.sphere_segments, config.sphere_segments)?;
        let sphere = GpuMesh {
            vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Sphere Vertex Buffer"),
                contents: sphere_mesh.vertex_bytes(),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            index_buffer: Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Sphere Index Buffer"),
                contents: sphere_mesh.index_bytes(),
                usage: wgpu::BufferUsages::INDEX,
            })),
            draw_count: sphere_mesh.index_count(),
        };

        let cube_mesh = meshes.cube();
        let cube = GpuMesh {
            vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Cube Vertex Buffer"),
                contents: cube_mesh.vertex_bytes(),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            index_buffer: None,
            draw_count: cube_mesh.vertex_count(),
        };

        let hdr_path = config
            .asset_root
            .join("textures/hdr")
            .join(&config.environment_map);
        let environment = Environment::new(
            &device,
            &queue,
            &hdr_path,
            &cube.vertex_buffer,
            cube.draw_count,
        );

        let pbr = PbrPass::new(
            &device,
            &queue,
            surface_config.format,
            texture_sets,
            scene,
            &environment,
        );
        let sky = SkyPass::new(&device, surface_config.format, &environment);

        Ok(Self {
            surface,
            device,
            queue,
            surface_config,
            depth_view,
            sphere,
            cube,
            pbr,
            sky,
        })
    }

    /// The configured surface size, which device limits may have clamped
    /// below the window size.
    pub fn surface_size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let (width, height) = clamp_to_limits(&self.device, width, height);
        if width == self.surface_config.width && height == self.surface_config.height {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = create_depth_view(&self.device, width, height);
    }

    /// Render one frame. A lost or outdated surface reconfigures and skips
    /// the frame; the caller just tries again next time.
    pub fn render(&mut self, scene: &Scene) -> RenderResult<()> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
            Err(e) => return Err(RenderError::AcquireImageFailed(e.to_string())),
        };

        self.pbr.update_frame(&self.queue, &scene.camera, &scene.light);
        self.sky.update_frame(&self.queue, &scene.camera);

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.2,
                            g: 0.2,
                            b: 0.2,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(ref indices) = self.sphere.index_buffer {
                self.pbr.draw(
                    &mut pass,
                    &self.sphere.vertex_buffer,
                    indices,
                    self.sphere.draw_count,
                );
            }
            // Sky last, behind everything already drawn.
            self.sky
                .draw(&mut pass, &self.cube.vertex_buffer, self.cube.draw_count);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

async fn init_device(
    window: Arc<Window>,
) -> RenderResult<(
    wgpu::Surface<'static>,
    wgpu::Adapter,
    wgpu::Device,
    wgpu::Queue,
)> {
    let backends = if std::env::var("WGPU_BACKEND").is_ok() {
        wgpu::Backends::all()
    } else {
        #[cfg(target_os = "windows")]
        {
            // Prefer Vulkan on Windows to dodge D3D12 debug layer noise.
            wgpu::Backends::VULKAN
        }
        #[cfg(not(target_os = "windows"))]
        {
            wgpu::Backends::all()
        }
    };

    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends,
        ..Default::default()
    });

    let surface = instance
        .create_surface(window.clone())
        .map_err(|e| RenderError::SurfaceCreationFailed(e.to_string()))?;

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await;

    // If no adapter matched the preferred backend, retry with everything.
    let (surface, adapter) = match adapter {
        Some(adapter) => (surface, adapter),
        None if backends != wgpu::Backends::all() => {
            log::warn!("Preferred backend not available, falling back to all backends");
            let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                ..Default::default()
            });
            let surface = instance
                .create_surface(window.clone())
                .map_err(|e| RenderError::SurfaceCreationFailed(e.to_string()))?;
            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::HighPerformance,
                    compatible_surface: Some(&surface),
                    force_fallback_adapter: false,
                })
                .await
                .ok_or_else(|| {
                    RenderError::InitializationFailed("No suitable adapter found".into())
                })?;
            (surface, adapter)
        }
        None => {
            return Err(RenderError::InitializationFailed(
                "No suitable adapter found".into(),
            ))
        }
    };

    let adapter_info = adapter.get_info();
    log::info!(
        "Selected GPU: {} ({:?} backend)",
        adapter_info.name,
        adapter_info.backend
    );

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("PBR Demo Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
            },
            None,
        )
        .await
        .map_err(|e| RenderError::DeviceCreationFailed(e.to_string()))?;

    Ok((surface, adapter, device, queue))
}

fn configure_surface(
    surface: &wgpu::Surface<'_>,
    adapter: &wgpu::Adapter,
    device: &wgpu::Device,
    width: u32,
    height: u32,
    vsync: bool,
) -> wgpu::SurfaceConfiguration {
    let caps = surface.get_capabilities(adapter);
    let format = caps
        .formats
        .iter()
        .copied()
        .find(|f| f.is_srgb())
        .unwrap_or(caps.formats[0]);

    let present_mode = if vsync {
        wgpu::PresentMode::AutoVsync
    } else {
        wgpu::PresentMode::AutoNoVsync
    };

    let (width, height) = clamp_to_limits(device, width, height);

    let config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width,
        height,
        present_mode,
        alpha_mode: caps.alpha_modes[0],
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };
    surface.configure(device, &config);
    config
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Buffer"),
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
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn clamp_to_limits(device: &wgpu::Device, width: u32, height: u32) -> (u32, u32) {
    let max_size = device.limits().max_texture_dimension_2d;
    if width > max_size || height > max_size {
        let scale = (max_size as f32 / width as f32).min(max_size as f32 / height as f32);
        (
            ((width as f32 * scale) as u32).max(1),
            ((height as f32 * scale) as u32).max(1),
        )
    } else {
        (width.max(1), height.max(1))
    }
}

/// Upload RGBA8 pixel data and return a view of it.
pub(crate) fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    data: &TextureData,
) -> wgpu::TextureView {
    let format = if data.srgb {
        wgpu::TextureFormat::Rgba8UnormSrgb
    } else {
        wgpu::TextureFormat::Rgba8Unorm
    };

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(&data.name),
        size: wgpu::Extent3d {
            width: data.width,
            height: data.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &data.data,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(data.width * 4),
            rows_per_image: Some(data.height),
        },
        wgpu::Extent3d {
            width: data.width,
            height: data.height,
            depth_or_array_layers: 1,
        },
    );

    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
