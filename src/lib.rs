// MIT License

// Copyright (c) 2022 AnonmousDapper

#![deny(rust_2018_idioms)]

pub const WINDOW_WIDTH: u32 = 700;
pub const WINDOW_HEIGHT: u32 = 700;

pub const PIPELINE_TEXTURE_FORMAT: pixels::wgpu::TextureFormat =
    pixels::wgpu::TextureFormat::Rgba16Float;

/// Edge length of a compute thread group in X and Y.
pub const THREAD_GROUP_SIZE: u32 = 8;

/// Z extent of the initialization dispatch. Kernel-side addressing depends on it.
pub const INIT_GROUPS_Z: u32 = 4;

/// Z extent of every update dispatch.
pub const STEP_GROUPS_Z: u32 = 1;

pub mod backend;

pub mod canvas;

pub mod config;

pub mod driver;

pub mod error;

pub mod gpu;

pub mod pipeline;

pub mod timer;

pub mod window;

pub use error::Error;
