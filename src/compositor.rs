use wgpu::util::DeviceExt;

use crate::camera::Camera;
use crate::geometry::Vertex;
use crate::scene::{self, Instance, SceneDef};
use crate::texture;

/// Color format of every offscreen tableau target.
pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

/// Per-scene uniform, rewritten each frame for the two active tableaux.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct SceneUniform {
    view_proj: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    rotation: [[f32; 4]; 4],
}

/// GPU residency for one tableau: its geometry, instance field, image bind
/// groups, and the offscreen color target it renders into.
struct SceneSlot {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    instance_buffer: wgpu::Buffer,
    instance_count: u32,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    matcap_bind_group: wgpu::BindGroup,
    background_bind_group: wgpu::BindGroup,
    target_view: wgpu::TextureView,
}

/// Renders tableaux into their dedicated offscreen targets.
///
/// Every frame exactly two scenes (current and next) are rendered; their
/// targets are then sampled by the cross-fade presenter, so both offscreen
/// passes are recorded before the present pass in the same encoder.
pub struct Compositor {
    background_pipeline: wgpu::RenderPipeline,
    mesh_pipeline: wgpu::RenderPipeline,
    scenes: Vec<SceneSlot>,
    depth_view: wgpu::TextureView,
}

impl Compositor {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        defs: &[SceneDef],
        width: u32,
        height: u32,
    ) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene uniform layout"),
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
            label: Some("scene texture layout"),
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

        let background_pipeline = Self::create_background_pipeline(device, &texture_layout);
        let mesh_pipeline = Self::create_mesh_pipeline(device, &uniform_layout, &texture_layout);

        let sampler = texture::linear_sampler(device);

        let scenes = defs
            .iter()
            .enumerate()
            .map(|(i, def)| {
                Self::create_scene_slot(
                    device,
                    queue,
                    def,
                    i,
                    &uniform_layout,
                    &texture_layout,
                    &sampler,
                    width,
                    height,
                )
            })
            .collect();

        let depth_view = create_depth_view(device, width, height);

        Self {
            background_pipeline,
            mesh_pipeline,
            scenes,
            depth_view,
        }
    }

    fn create_background_pipeline(
        device: &wgpu::Device,
        texture_layout: &wgpu::BindGroupLayout,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Background Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("background.wgsl").into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Background Pipeline Layout"),
            bind_group_layouts: &[texture_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Background Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: TARGET_FORMAT,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            // Shares the pass with the mesh pipeline; never touches depth.
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
    }

    fn create_mesh_pipeline(
        device: &wgpu::Device,
        uniform_layout: &wgpu::BindGroupLayout,
        texture_layout: &wgpu::BindGroupLayout,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("scene.wgsl").into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[uniform_layout, texture_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Scene Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::LAYOUT, Instance::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: TARGET_FORMAT,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn create_scene_slot(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        def: &SceneDef,
        index: usize,
        uniform_layout: &wgpu::BindGroupLayout,
        texture_layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        width: u32,
        height: u32,
    ) -> SceneSlot {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("scene vertices"),
            contents: bytemuck::cast_slice(&def.mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("scene indices"),
            contents: bytemuck::cast_slice(&def.mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let instances = scene::scatter_instances(index, scene::INSTANCES_PER_SCENE);
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("scene instances"),
            contents: bytemuck::cast_slice(&instances),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scene uniform"),
            size: std::mem::size_of::<SceneUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene uniform bind group"),
            layout: uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let matcap_view =
            texture::load_or_placeholder(device, queue, &def.matcap, &format!("{} matcap", def.name));
        let background_view = texture::load_or_placeholder(
            device,
            queue,
            &def.background,
            &format!("{} background", def.name),
        );

        let matcap_bind_group =
            create_texture_bind_group(device, texture_layout, &matcap_view, sampler, "matcap");
        let background_bind_group = create_texture_bind_group(
            device,
            texture_layout,
            &background_view,
            sampler,
            "background",
        );

        SceneSlot {
            vertex_buffer,
            index_buffer,
            index_count: def.mesh.index_count(),
            instance_buffer,
            instance_count: instances.len() as u32,
            uniform_buffer,
            uniform_bind_group,
            matcap_bind_group,
            background_bind_group,
            target_view: create_target_view(device, width, height),
        }
    }

    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// Offscreen color view for one tableau, for the presenter to sample.
    pub fn target_view(&self, index: usize) -> &wgpu::TextureView {
        &self.scenes[index].target_view
    }

    /// Reallocate every offscreen target and the shared depth buffer. Must
    /// run together with the surface reconfigure so no frame samples a
    /// stale-sized buffer.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_view = create_depth_view(device, width, height);
        for slot in &mut self.scenes {
            slot.target_view = create_target_view(device, width, height);
        }
    }

    /// Write the per-frame uniform for one tableau.
    pub fn update_scene(&self, queue: &wgpu::Queue, index: usize, camera: &Camera, rotation: f32) {
        let view = glam::Mat4::look_at_rh(camera.position, glam::Vec3::ZERO, glam::Vec3::Y);
        let uniform = SceneUniform {
            view_proj: camera.view_projection().to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            rotation: glam::Mat4::from_rotation_y(rotation).to_cols_array_2d(),
        };
        queue.write_buffer(
            &self.scenes[index].uniform_buffer,
            0,
            bytemuck::cast_slice(&[uniform]),
        );
    }

    /// Record one tableau's render pass into its offscreen target.
    pub fn render_scene(&self, encoder: &mut wgpu::CommandEncoder, index: usize) {
        let slot = &self.scenes[index];

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Tableau Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &slot.target_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: 0.93,
                        g: 0.93,
                        b: 0.93,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        pass.set_pipeline(&self.background_pipeline);
        pass.set_bind_group(0, &slot.background_bind_group, &[]);
        pass.draw(0..6, 0..1);

        pass.set_pipeline(&self.mesh_pipeline);
        pass.set_bind_group(0, &slot.uniform_bind_group, &[]);
        pass.set_bind_group(1, &slot.matcap_bind_group, &[]);
        pass.set_vertex_buffer(0, slot.vertex_buffer.slice(..));
        pass.set_vertex_buffer(1, slot.instance_buffer.slice(..));
        pass.set_index_buffer(slot.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..slot.index_count, 0, 0..slot.instance_count);
    }
}

fn create_texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

fn create_target_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("tableau target"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TARGET_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let depth = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("tableau depth"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    depth.create_view(&wgpu::TextureViewDescriptor::default())
}
