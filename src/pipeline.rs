// MIT License

// Copyright (c) 2022 AnonmousDapper

use std::sync::Arc;

use log::warn;

use pixels::wgpu::{
    include_wgsl, AddressMode, BindGroupDescriptor, BindGroupEntry, BindGroupLayout,
    BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingResource, BindingType, BlendState,
    Color, ColorTargetState, ColorWrites, CommandEncoder, Device, FilterMode, FragmentState,
    LoadOp, MultisampleState, Operations, PipelineLayoutDescriptor, PrimitiveState,
    RenderPassColorAttachment, RenderPassDescriptor, RenderPipeline, RenderPipelineDescriptor,
    Sampler, SamplerBindingType, SamplerDescriptor, ShaderStages, TextureFormat,
    TextureSampleType, TextureView, TextureViewDimension, VertexState,
};

use crate::{backend::DisplaySurface, gpu::GpuTexture};

fn create_sampler(device: &Device) -> Sampler {
    device.create_sampler(&SamplerDescriptor {
        address_mode_u: AddressMode::ClampToEdge,
        address_mode_v: AddressMode::ClampToEdge,
        address_mode_w: AddressMode::ClampToEdge,
        mag_filter: FilterMode::Nearest,
        min_filter: FilterMode::Nearest,
        mipmap_filter: FilterMode::Nearest,
        ..Default::default()
    })
}

/// Draws the most recently published simulation buffer to the screen.
pub struct PresentPass {
    pipeline: RenderPipeline,
    group_layout: BindGroupLayout,
    sampler: Sampler,
    binding: String,
    texture: Option<Arc<TextureView>>,
}

impl PresentPass {
    pub fn new(device: &Device, surface_format: TextureFormat, binding: &str) -> Self {
        let vertex_module = device.create_shader_module(include_wgsl!("shaders/vert.wgsl"));
        let shader = device.create_shader_module(include_wgsl!("shaders/present.wgsl"));

        let sampler = create_sampler(device);

        let group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: None,
            entries: &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Sampler(SamplerBindingType::NonFiltering),
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Texture {
                        sample_type: TextureSampleType::Float { filterable: false },
                        multisampled: false,
                        view_dimension: TextureViewDimension::D2,
                    },
                    count: None,
                },
            ],
        });

        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("present_render_pipeline"),
            layout: Some(&device.create_pipeline_layout(&PipelineLayoutDescriptor {
                label: None,
                bind_group_layouts: &[&group_layout],
                push_constant_ranges: &[],
            })),
            vertex: VertexState {
                module: &vertex_module,
                entry_point: "main",
                buffers: &[],
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: "main",
                targets: &[Some(ColorTargetState {
                    format: surface_format,
                    blend: Some(BlendState::REPLACE),
                    write_mask: ColorWrites::ALL,
                })],
            }),
            primitive: PrimitiveState::default(),
            depth_stencil: None,
            multisample: MultisampleState::default(),
            multiview: None,
        });

        Self {
            pipeline,
            group_layout,
            sampler,
            binding: binding.to_owned(),
            texture: None,
        }
    }

    pub fn render(
        &self,
        device: &Device,
        encoder: &mut CommandEncoder,
        target: &TextureView,
        clip: (u32, u32, u32, u32),
    ) {
        let group = self.texture.as_ref().map(|texture| {
            device.create_bind_group(&BindGroupDescriptor {
                label: Some("present_bind_group"),
                layout: &self.group_layout,
                entries: &[
                    BindGroupEntry {
                        binding: 0,
                        resource: BindingResource::Sampler(&self.sampler),
                    },
                    BindGroupEntry {
                        binding: 1,
                        resource: BindingResource::TextureView(texture),
                    },
                ],
            })
        });

        let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("present_render_pass"),
            color_attachments: &[Some(RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: Operations {
                    load: LoadOp::Clear(Color::BLACK),
                    store: true,
                },
            })],
            depth_stencil_attachment: None,
        });

        // nothing published yet, leave the frame cleared
        if let Some(group) = &group {
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, group, &[]);
            pass.set_scissor_rect(clip.0, clip.1, clip.2, clip.3);
            pass.draw(0..3, 0..1);
        }
    }
}

impl DisplaySurface<GpuTexture> for PresentPass {
    fn set_texture(&mut self, binding: &str, texture: &GpuTexture) {
        if binding != self.binding {
            warn!("present pass has no texture slot named {}", binding);
            return;
        }

        self.texture = Some(Arc::clone(texture.view()));
    }
}
