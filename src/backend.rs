// MIT License

// Copyright (c) 2022 AnonmousDapper

use glam::UVec3;

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateTextureDescriptor {
    pub width: u32,
    pub height: u32,
    pub random_write: bool,
}

impl StateTextureDescriptor {
    pub fn square(size: u32) -> Self {
        Self {
            width: size,
            height: size,
            random_write: true,
        }
    }

    /// Rejects empty textures and textures larger than `max_dimension` on either axis.
    pub fn validate(&self, max_dimension: u32) -> Result<()> {
        let reason = if self.width == 0 || self.height == 0 {
            "dimensions must be positive".to_owned()
        } else if self.width > max_dimension || self.height > max_dimension {
            format!("device limit is {}", max_dimension)
        } else {
            return Ok(());
        };

        Err(Error::ResourceAllocation {
            width: self.width,
            height: self.height,
            reason,
        })
    }
}

/// Compute dispatch capability the simulation driver is written against.
///
/// Submissions are queued in order; a dispatch observes every write made by
/// the dispatches submitted before it.
pub trait ComputeBackend {
    type Texture: Clone;
    type Kernel;
    type Program: ?Sized;

    /// Allocates and realizes a 2D texture.
    fn create_texture(&mut self, desc: &StateTextureDescriptor) -> Result<Self::Texture>;

    fn resolve_kernel(&mut self, program: &Self::Program, name: &str) -> Option<Self::Kernel>;

    /// Binds `texture` to the named slot of `kernel`, replacing any previous binding.
    fn bind_texture(&mut self, kernel: &mut Self::Kernel, binding: &str, texture: &Self::Texture);

    /// Queues `kernel` over `groups` thread groups. Returns false when nothing
    /// was submitted, e.g. because a slot of the kernel has no texture bound.
    fn dispatch(&mut self, kernel: &Self::Kernel, groups: UVec3) -> bool;
}

/// Something that presents a texture, e.g. a material on screen.
pub trait DisplaySurface<T> {
    fn set_texture(&mut self, binding: &str, texture: &T);
}

#[cfg(test)]
pub(crate) mod recording {
    use std::collections::HashMap;

    use glam::UVec3;

    use super::{ComputeBackend, DisplaySurface, StateTextureDescriptor};
    use crate::error::Result;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct TextureId(pub usize);

    #[derive(Debug, Default)]
    pub struct Kernel {
        pub name: String,
        pub bindings: HashMap<String, TextureId>,
    }

    pub struct Program {
        pub kernels: Vec<&'static str>,
    }

    impl Program {
        pub fn with_kernels(kernels: &[&'static str]) -> Self {
            Self {
                kernels: kernels.to_vec(),
            }
        }
    }

    #[derive(Clone, Debug, PartialEq)]
    pub enum Call {
        Create(StateTextureDescriptor),
        Bind {
            kernel: String,
            binding: String,
            texture: TextureId,
        },
        Dispatch {
            kernel: String,
            groups: UVec3,
            bindings: Vec<(String, TextureId)>,
        },
    }

    /// In-memory backend that records every call made against it.
    #[derive(Default)]
    pub struct RecordingBackend {
        pub calls: Vec<Call>,
        pub max_size: Option<u32>,
        /// Refuse every dispatch, as a backend with unbound slots would.
        pub refuse_dispatch: bool,
        next_texture: usize,
    }

    impl RecordingBackend {
        pub fn new() -> Self {
            Self::default()
        }

        /// Reserves an id for an image supplied from outside the driver.
        pub fn image(&mut self) -> TextureId {
            let id = TextureId(self.next_texture);
            self.next_texture += 1;
            id
        }

        pub fn dispatches(&self) -> Vec<&Call> {
            self.calls
                .iter()
                .filter(|call| matches!(call, Call::Dispatch { .. }))
                .collect()
        }

        pub fn binds(&self) -> usize {
            self.calls
                .iter()
                .filter(|call| matches!(call, Call::Bind { .. }))
                .count()
        }
    }

    impl ComputeBackend for RecordingBackend {
        type Texture = TextureId;
        type Kernel = Kernel;
        type Program = Program;

        fn create_texture(&mut self, desc: &StateTextureDescriptor) -> Result<TextureId> {
            desc.validate(self.max_size.unwrap_or(u32::MAX))?;

            self.calls.push(Call::Create(*desc));
            Ok(self.image())
        }

        fn resolve_kernel(&mut self, program: &Program, name: &str) -> Option<Kernel> {
            program.kernels.iter().find(|k| **k == name).map(|k| Kernel {
                name: (*k).to_owned(),
                bindings: HashMap::new(),
            })
        }

        fn bind_texture(&mut self, kernel: &mut Kernel, binding: &str, texture: &TextureId) {
            kernel.bindings.insert(binding.to_owned(), *texture);
            self.calls.push(Call::Bind {
                kernel: kernel.name.clone(),
                binding: binding.to_owned(),
                texture: *texture,
            });
        }

        fn dispatch(&mut self, kernel: &Kernel, groups: UVec3) -> bool {
            if self.refuse_dispatch {
                return false;
            }

            let mut bindings = kernel
                .bindings
                .iter()
                .map(|(name, tex)| (name.clone(), *tex))
                .collect::<Vec<_>>();
            bindings.sort();

            self.calls.push(Call::Dispatch {
                kernel: kernel.name.clone(),
                groups,
                bindings,
            });
            true
        }
    }

    #[derive(Default)]
    pub struct RecordingSurface {
        pub published: Vec<(String, TextureId)>,
    }

    impl DisplaySurface<TextureId> for RecordingSurface {
        fn set_texture(&mut self, binding: &str, texture: &TextureId) {
            self.published.push((binding.to_owned(), *texture));
        }
    }
}
