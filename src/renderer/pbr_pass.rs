//! PBR sphere pass

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

use crate::resources::PbrTextureSet;
use crate::scene::{Camera, PointLight, Scene};

use super::environment::Environment;
use super::upload_texture;

const PBR_SHADER: &str = include_str!("../shaders/pbr.wgsl");

/// Per-frame uniforms shared by every sphere draw.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct FrameUniform {
    view: Mat4,
    proj: Mat4,
    camera_pos: Vec4,
    light_pos: Vec4,
    light_color: Vec4,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct ModelUniform {
    model: Mat4,
}

/// One sphere draw: which model bind group with which material.
struct SphereDraw {
    model_bind_group: wgpu::BindGroup,
    material: usize,
}

pub struct PbrPass {
    pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    material_bind_groups: Vec<wgpu::BindGroup>,
    irradiance_bind_group: wgpu::BindGroup,
    draws: Vec<SphereDraw>,
}

impl PbrPass {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        texture_sets: &[PbrTextureSet],
        scene: &Scene,
        environment: &Environment,
    ) -> Self {
        let frame_layout = uniform_layout(device, "Frame Layout", wgpu::ShaderStages::VERTEX_FRAGMENT);
        let model_layout = uniform_layout(device, "Model Layout", wgpu::ShaderStages::VERTEX);
        let material_layout = material_bind_group_layout(device);
        let irradiance_layout = cubemap_bind_group_layout(device, "Irradiance Layout");

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("PBR Shader"),
            source: wgpu::ShaderSource::Wgsl(PBR_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("PBR Pipeline Layout"),
            bind_group_layouts: &[
                &frame_layout,
                &model_layout,
                &material_layout,
                &irradiance_layout,
            ],
            push_constant_ranges: &[],
        });

        // position, uv, normal interleaved
        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<crate::geometry::SphereVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 12,
                    shader_location: 1,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 20,
                    shader_location: 2,
                },
            ],
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("PBR Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[vertex_layout],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: Some(wgpu::IndexFormat::Uint32),
                front_face: wgpu::FrontFace::Ccw,
                // The zig-zag strip reverses direction every row, so face
                // orientation is not uniform; the sphere is closed anyway.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: super::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform Buffer"),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let material_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Material Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let material_bind_groups = texture_sets
            .iter()
            .map(|set| {
                let views: Vec<wgpu::TextureView> = set
                    .maps()
                    .iter()
                    .map(|map| upload_texture(device, queue, map))
                    .collect();

                let mut entries: Vec<wgpu::BindGroupEntry> = views
                    .iter()
                    .enumerate()
                    .map(|(i, view)| wgpu::BindGroupEntry {
                        binding: i as u32,
                        resource: wgpu::BindingResource::TextureView(view),
                    })
                    .collect();
                entries.push(wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::Sampler(&material_sampler),
                });

                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("Material Bind Group ({})", set.name)),
                    layout: &material_layout,
                    entries: &entries,
                })
            })
            .collect::<Vec<_>>();

        let irradiance_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Irradiance Bind Group"),
            layout: &irradiance_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&environment.cubemap_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&environment.sampler),
                },
            ],
        });

        // One draw per material sphere, then the light marker sphere drawn
        // with the last material still bound.
        let last_material = material_bind_groups.len().saturating_sub(1);
        let mut draws = Vec::new();
        for (i, position) in scene.sphere_positions.iter().enumerate() {
            draws.push(SphereDraw {
                model_bind_group: model_bind_group(
                    device,
                    &model_layout,
                    Mat4::from_translation(*position),
                ),
                material: i.min(last_material),
            });
        }
        draws.push(SphereDraw {
            model_bind_group: model_bind_group(
                device,
                &model_layout,
                Mat4::from_translation(scene.light.position),
            ),
            material: last_material,
        });

        Self {
            pipeline,
            frame_buffer,
            frame_bind_group,
            material_bind_groups,
            irradiance_bind_group,
            draws,
        }
    }

    /// Write this frame's camera and light state.
    pub fn update_frame(&self, queue: &wgpu::Queue, camera: &Camera, light: &PointLight) {
        let uniform = FrameUniform {
            view: camera.view_matrix(),
            proj: camera.projection_matrix(),
            camera_pos: camera.position.extend(1.0),
            light_pos: light.position.extend(1.0),
            light_color: light.color.extend(1.0),
        };
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&uniform));
    }

    pub fn draw<'pass>(
        &'pass self,
        pass: &mut wgpu::RenderPass<'pass>,
        sphere_vertices: &'pass wgpu::Buffer,
        sphere_indices: &'pass wgpu::Buffer,
        index_count: u32,
    ) {
        if self.material_bind_groups.is_empty() {
            return;
        }

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.frame_bind_group, &[]);
        pass.set_bind_group(3, &self.irradiance_bind_group, &[]);
        pass.set_vertex_buffer(0, sphere_vertices.slice(..));
        pass.set_index_buffer(sphere_indices.slice(..), wgpu::IndexFormat::Uint32);

        for draw in &self.draws {
            pass.set_bind_group(1, &draw.model_bind_group, &[]);
            pass.set_bind_group(2, &self.material_bind_groups[draw.material], &[]);
            pass.draw_indexed(0..index_count, 0, 0..1);
        }
    }
}

fn uniform_layout(
    device: &wgpu::Device,
    label: &str,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn material_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let mut entries: Vec<wgpu::BindGroupLayoutEntry> = (0..5)
        .map(|binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        })
        .collect();
    entries.push(wgpu::BindGroupLayoutEntry {
        binding: 5,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    });

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Material Layout"),
        entries: &entries,
    })
}

pub(super) fn cubemap_bind_group_layout(
    device: &wgpu::Device,
    label: &str,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::Cube,
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
    })
}

fn model_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    model: Mat4,
) -> wgpu::BindGroup {
    use wgpu::util::DeviceExt;

    let uniform = ModelUniform { model };
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Model Uniform Buffer"),
        contents: bytemuck::bytes_of(&uniform),
        usage: wgpu::BufferUsages::UNIFORM,
    });

    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Model Bind Group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    })
}
