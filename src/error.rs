// MIT License

// Copyright (c) 2022 AnonmousDapper

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("kernel `{0}` not found in compute program")]
    KernelResolution(String),

    #[error("failed to allocate {width}x{height} texture: {reason}")]
    ResourceAllocation {
        width: u32,
        height: u32,
        reason: String,
    },

    #[error("kernel `{0}` could not be dispatched")]
    Dispatch(String),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
