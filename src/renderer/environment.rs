//! HDR environment map loading and cubemap capture
//!
//! The equirectangular HDR image is projected onto a 512x512 cubemap by
//! rendering the unit cube once per face with a 90 degree camera sitting at
//! the origin. The resulting cubemap feeds the skybox and the PBR shader's
//! irradiance term.

use std::path::Path;

use glam::{Mat4, Vec3};

pub const CUBEMAP_SIZE: u32 = 512;

const CAPTURE_SHADER: &str = include_str!("../shaders/equirect.wgsl");

/// An equirectangular HDR image as Rgba16Float texel data.
struct HdrImage {
    width: u32,
    height: u32,
    /// Four u16 (f16 bits) per pixel.
    texels: Vec<u16>,
}

impl HdrImage {
    fn load(path: &Path) -> Result<Self, image::ImageError> {
        let img = image::open(path)?;
        let rgb = img.to_rgb32f();
        let (width, height) = rgb.dimensions();

        let mut texels = Vec::with_capacity((width * height * 4) as usize);
        for p in rgb.pixels() {
            texels.push(half::f16::from_f32(p[0]).to_bits());
            texels.push(half::f16::from_f32(p[1]).to_bits());
            texels.push(half::f16::from_f32(p[2]).to_bits());
            texels.push(half::f16::from_f32(1.0).to_bits());
        }

        Ok(Self {
            width,
            height,
            texels,
        })
    }

    /// A vertical sky-to-ground gradient, used when no HDR file is
    /// available so the demo still has something to reflect.
    fn gradient_fallback() -> Self {
        let width = 64u32;
        let height = 32u32;
        let zenith = [0.35f32, 0.55, 0.95];
        let horizon = [0.45f32, 0.42, 0.40];

        let mut texels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            let t = y as f32 / (height - 1) as f32;
            for _ in 0..width {
                for c in 0..3 {
                    let value = zenith[c] * (1.0 - t) + horizon[c] * t;
                    texels.push(half::f16::from_f32(value).to_bits());
                }
                texels.push(half::f16::from_f32(1.0).to_bits());
            }
        }

        Self {
            width,
            height,
            texels,
        }
    }
}

/// The six capture view matrices, one per cubemap face in +X, -X, +Y, -Y,
/// +Z, -Z order.
fn capture_views() -> [Mat4; 6] {
    let origin = Vec3::ZERO;
    [
        Mat4::look_at_rh(origin, Vec3::X, Vec3::new(0.0, -1.0, 0.0)),
        Mat4::look_at_rh(origin, Vec3::NEG_X, Vec3::new(0.0, -1.0, 0.0)),
        Mat4::look_at_rh(origin, Vec3::Y, Vec3::new(0.0, 0.0, 1.0)),
        Mat4::look_at_rh(origin, Vec3::NEG_Y, Vec3::new(0.0, 0.0, -1.0)),
        Mat4::look_at_rh(origin, Vec3::Z, Vec3::new(0.0, -1.0, 0.0)),
        Mat4::look_at_rh(origin, Vec3::NEG_Z, Vec3::new(0.0, -1.0, 0.0)),
    ]
}

/// The captured environment cubemap.
pub struct Environment {
    pub cubemap_view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl Environment {
    /// Load the HDR image at `path` and capture it into a cubemap. A
    /// missing or unreadable file falls back to a procedural gradient run
    /// through the same conversion.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
        cube_vertices: &wgpu::Buffer,
        cube_vertex_count: u32,
    ) -> Self {
        let hdr = match HdrImage::load(path) {
            Ok(hdr) => {
                log::info!(
                    "loaded environment map {} ({}x{})",
                    path.display(),
                    hdr.width,
                    hdr.height
                );
                hdr
            }
            Err(e) => {
                log::error!(
                    "failed to load environment map {}: {e}; using gradient fallback",
                    path.display()
                );
                HdrImage::gradient_fallback()
            }
        };

        let equirect_view = upload_equirect(device, queue, &hdr);

        let cubemap = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Environment Cubemap"),
            size: wgpu::Extent3d {
                width: CUBEMAP_SIZE,
                height: CUBEMAP_SIZE,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba16Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        capture_faces(
            device,
            queue,
            &equirect_view,
            &cubemap,
            cube_vertices,
            cube_vertex_count,
        );

        let cubemap_view = cubemap.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Environment Cubemap View"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Environment Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            cubemap_view,
            sampler,
        }
    }
}

fn upload_equirect(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    hdr: &HdrImage,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Equirectangular HDR"),
        size: wgpu::Extent3d {
            width: hdr.width,
            height: hdr.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba16Float,
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
        bytemuck::cast_slice(&hdr.texels),
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(hdr.width * 8),
            rows_per_image: Some(hdr.height),
        },
        wgpu::Extent3d {
            width: hdr.width,
            height: hdr.height,
            depth_or_array_layers: 1,
        },
    );

    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn capture_faces(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    equirect_view: &wgpu::TextureView,
    cubemap: &wgpu::Texture,
    cube_vertices: &wgpu::Buffer,
    cube_vertex_count: u32,
) {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Equirect Capture Shader"),
        source: wgpu::ShaderSource::Wgsl(CAPTURE_SHADER.into()),
    });

    let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Capture Uniform Layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    });

    let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Capture Texture Layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Capture Pipeline Layout"),
        bind_group_layouts: &[&uniform_layout, &texture_layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Equirect Capture Pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: "vs_main",
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<crate::geometry::CubeVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                }],
            }],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format: wgpu::TextureFormat::Rgba16Float,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    });

    let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Capture Uniform Buffer"),
        size: std::mem::size_of::<Mat4>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Capture Uniform Bind Group"),
        layout: &uniform_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform_buffer.as_entire_binding(),
        }],
    });

    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("Capture Sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    });

    let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Capture Texture Bind Group"),
        layout: &texture_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(equirect_view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&sampler),
            },
        ],
    });

    let projection = Mat4::perspective_rh(90.0f32.to_radians(), 1.0, 0.1, 10.0);

    for (face, view) in capture_views().iter().enumerate() {
        let view_proj = projection * *view;
        queue.write_buffer(&uniform_buffer, 0, bytemuck::bytes_of(&view_proj));

        let face_view = cubemap.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Cubemap Face View"),
            dimension: Some(wgpu::TextureViewDimension::D2),
            base_array_layer: face as u32,
            array_layer_count: Some(1),
            ..Default::default()
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Capture Encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Capture Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &face_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&pipeline);
            pass.set_bind_group(0, &uniform_bind_group, &[]);
            pass.set_bind_group(1, &texture_bind_group, &[]);
            pass.set_vertex_buffer(0, cube_vertices.slice(..));
            pass.draw(0..cube_vertex_count, 0..1);
        }
        // Submit per face so the uniform write for the next face does not
        // overtake this pass.
        queue.submit(std::iter::once(encoder.finish()));
    }
}
