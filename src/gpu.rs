// MIT License

// Copyright (c) 2022 AnonmousDapper

use std::{collections::HashMap, num::NonZeroU32, sync::Arc};

use glam::UVec3;

use log::{debug, error, warn};

use pixels::wgpu::{
    BindGroupDescriptor, BindGroupEntry, BindGroupLayout, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, BindingResource, BindingType, CommandEncoderDescriptor,
    ComputePassDescriptor, ComputePipeline, ComputePipelineDescriptor, Device, ErrorFilter,
    Extent3d, ImageCopyTexture, ImageDataLayout, Origin3d, PipelineLayoutDescriptor, Queue,
    ShaderModule, ShaderModuleDescriptor, ShaderStages, StorageTextureAccess, Texture,
    TextureAspect, TextureDescriptor, TextureDimension, TextureSampleType, TextureUsages,
    TextureView, TextureViewDescriptor, TextureViewDimension,
};

use crate::{
    backend::{ComputeBackend, StateTextureDescriptor},
    canvas::Canvas,
    error::{Error, Result},
    PIPELINE_TEXTURE_FORMAT,
};

/// Bytes per `Rgba16Float` texel.
const TEXEL_SIZE: u32 = 8;

/// Shared handle to a 2D state texture and its default view.
#[derive(Clone, Debug)]
pub struct GpuTexture {
    texture: Arc<Texture>,
    view: Arc<TextureView>,
}

impl GpuTexture {
    #[inline]
    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    #[inline]
    pub fn view(&self) -> &Arc<TextureView> {
        &self.view
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingKind {
    /// Read with `textureLoad` from a `texture_2d<f32>`.
    Sampled,

    /// Written through a write-only `texture_storage_2d`.
    StorageWrite,
}

#[derive(Clone, Debug)]
pub struct BindingSlot {
    pub name: String,
    pub binding: u32,
    pub kind: BindingKind,
}

impl BindingSlot {
    pub fn sampled(name: &str, binding: u32) -> Self {
        Self {
            name: name.to_owned(),
            binding,
            kind: BindingKind::Sampled,
        }
    }

    pub fn storage(name: &str, binding: u32) -> Self {
        Self {
            name: name.to_owned(),
            binding,
            kind: BindingKind::StorageWrite,
        }
    }

    fn layout_entry(&self) -> BindGroupLayoutEntry {
        let ty = match self.kind {
            BindingKind::Sampled => BindingType::Texture {
                sample_type: TextureSampleType::Float { filterable: false },
                multisampled: false,
                view_dimension: TextureViewDimension::D2,
            },
            BindingKind::StorageWrite => BindingType::StorageTexture {
                access: StorageTextureAccess::WriteOnly,
                format: PIPELINE_TEXTURE_FORMAT,
                view_dimension: TextureViewDimension::D2,
            },
        };

        BindGroupLayoutEntry {
            binding: self.binding,
            visibility: ShaderStages::COMPUTE,
            ty,
            count: None,
        }
    }
}

struct KernelEntry {
    name: String,
    slots: Vec<BindingSlot>,
}

/// A WGSL module together with the compute entry points it exposes.
///
/// Every entry point is listed with the bindings it touches; all of them live
/// in bind group 0.
pub struct ComputeProgram {
    module: ShaderModule,
    kernels: Vec<KernelEntry>,
}

impl ComputeProgram {
    pub fn new(device: &Device, source: ShaderModuleDescriptor<'_>) -> Self {
        Self {
            module: device.create_shader_module(source),
            kernels: Vec::new(),
        }
    }

    pub fn with_kernel(mut self, name: &str, slots: &[BindingSlot]) -> Self {
        self.kernels.push(KernelEntry {
            name: name.to_owned(),
            slots: slots.to_vec(),
        });
        self
    }
}

pub struct GpuKernel {
    name: String,
    pipeline: ComputePipeline,
    layout: BindGroupLayout,
    slots: Vec<BindingSlot>,
    bound: HashMap<u32, Arc<TextureView>>,
}

/// Compute backend on top of a borrowed wgpu device and queue.
///
/// Each dispatch is recorded into its own encoder and submitted right away,
/// so ordering follows the queue.
pub struct WgpuCompute<'a> {
    device: &'a Device,
    queue: &'a Queue,
}

impl<'a> WgpuCompute<'a> {
    pub fn new(device: &'a Device, queue: &'a Queue) -> Self {
        Self { device, queue }
    }

    #[inline]
    pub fn max_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    /// Creates a texture inside error scopes so that out-of-memory and
    /// validation failures come back as errors instead of reaching the
    /// uncaptured error handler.
    fn create(
        &self,
        label: &str,
        desc: &StateTextureDescriptor,
        usage: TextureUsages,
    ) -> Result<GpuTexture> {
        desc.validate(self.max_dimension())?;

        self.device.push_error_scope(ErrorFilter::OutOfMemory);
        self.device.push_error_scope(ErrorFilter::Validation);

        let texture = self.device.create_texture(&TextureDescriptor {
            label: Some(label),
            size: Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: PIPELINE_TEXTURE_FORMAT,
            usage,
        });

        let view = texture.create_view(&TextureViewDescriptor::default());

        let invalid = pollster::block_on(self.device.pop_error_scope());
        let out_of_memory = pollster::block_on(self.device.pop_error_scope());

        if let Some(e) = out_of_memory.or(invalid) {
            return Err(Error::ResourceAllocation {
                width: desc.width,
                height: desc.height,
                reason: e.to_string(),
            });
        }

        Ok(GpuTexture {
            texture: Arc::new(texture),
            view: Arc::new(view),
        })
    }

    /// Uploads a painted canvas as a read-only texture.
    pub fn upload_image(&self, canvas: &Canvas) -> Result<GpuTexture> {
        let size = canvas.size();
        let desc = StateTextureDescriptor {
            random_write: false,
            ..StateTextureDescriptor::square(size)
        };

        let image = self.create(
            "initial_state_texture",
            &desc,
            TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
        )?;

        self.queue.write_texture(
            ImageCopyTexture {
                texture: image.texture(),
                mip_level: 0,
                origin: Origin3d::ZERO,
                aspect: TextureAspect::All,
            },
            canvas.as_bytes(),
            ImageDataLayout {
                offset: 0,
                bytes_per_row: NonZeroU32::new(size * TEXEL_SIZE),
                rows_per_image: NonZeroU32::new(size),
            },
            Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
        );

        Ok(image)
    }
}

impl<'a> ComputeBackend for WgpuCompute<'a> {
    type Texture = GpuTexture;
    type Kernel = GpuKernel;
    type Program = ComputeProgram;

    fn create_texture(&mut self, desc: &StateTextureDescriptor) -> Result<GpuTexture> {
        let mut usage = TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_SRC;
        if desc.random_write {
            usage |= TextureUsages::STORAGE_BINDING;
        }

        self.create("state_texture", desc, usage)
    }

    fn resolve_kernel(&mut self, program: &ComputeProgram, name: &str) -> Option<GpuKernel> {
        let entry = program.kernels.iter().find(|k| k.name == name)?;

        let entries = entry
            .slots
            .iter()
            .map(BindingSlot::layout_entry)
            .collect::<Vec<_>>();

        let layout = self
            .device
            .create_bind_group_layout(&BindGroupLayoutDescriptor {
                label: Some(name),
                entries: &entries,
            });

        let pipeline = self
            .device
            .create_compute_pipeline(&ComputePipelineDescriptor {
                label: Some(name),
                layout: Some(&self.device.create_pipeline_layout(
                    &PipelineLayoutDescriptor {
                        label: None,
                        bind_group_layouts: &[&layout],
                        push_constant_ranges: &[],
                    },
                )),
                module: &program.module,
                entry_point: name,
            });

        debug!("resolved compute kernel {}", name);

        Some(GpuKernel {
            name: name.to_owned(),
            pipeline,
            layout,
            slots: entry.slots.clone(),
            bound: HashMap::new(),
        })
    }

    fn bind_texture(&mut self, kernel: &mut GpuKernel, binding: &str, texture: &GpuTexture) {
        match kernel.slots.iter().find(|slot| slot.name == binding) {
            Some(slot) => {
                kernel.bound.insert(slot.binding, Arc::clone(texture.view()));
            }
            None => warn!("kernel {} has no binding named {}", kernel.name, binding),
        }
    }

    fn dispatch(&mut self, kernel: &GpuKernel, groups: UVec3) -> bool {
        let mut entries = Vec::with_capacity(kernel.slots.len());

        for slot in &kernel.slots {
            match kernel.bound.get(&slot.binding) {
                Some(view) => entries.push(BindGroupEntry {
                    binding: slot.binding,
                    resource: BindingResource::TextureView(view),
                }),
                None => {
                    error!(
                        "skipping dispatch of {}: nothing bound to {}",
                        kernel.name, slot.name
                    );
                    return false;
                }
            }
        }

        let group = self.device.create_bind_group(&BindGroupDescriptor {
            label: Some(kernel.name.as_str()),
            layout: &kernel.layout,
            entries: &entries,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("simulation_encoder"),
            });

        {
            let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor {
                label: Some(kernel.name.as_str()),
            });

            pass.set_pipeline(&kernel.pipeline);
            pass.set_bind_group(0, &group, &[]);
            pass.dispatch_workgroups(groups.x, groups.y, groups.z);
        }

        self.queue.submit(Some(encoder.finish()));
        true
    }
}
