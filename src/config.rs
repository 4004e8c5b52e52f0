// MIT License

// Copyright (c) 2022 AnonmousDapper

use std::path::Path;

use serde::Deserialize;

use crate::{backend::StateTextureDescriptor, error::Result};

pub type Point = glam::Vec2;

/// Raw simulation state stored in one texel.
pub type State = [f32; 4];

fn default_grid_size() -> u32 {
    256
}

fn default_background() -> State {
    [1.0, 0.0, 0.0, 1.0] // all A, no B
}

fn default_seed_state() -> State {
    [1.0, 1.0, 0.0, 1.0]
}

fn default_radius() -> f32 {
    8.0
}

fn default_seeds() -> Vec<Seed> {
    let center = default_grid_size() as f32 / 2.0;

    vec![Seed {
        position: Point::new(center, center),
        radius: 10.0,
        shape: Shape::Circle,
        state: default_seed_state(),
    }]
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct KernelNames {
    #[serde(alias = "init")]
    pub initialization: String,

    #[serde(alias = "main")]
    pub update: String,
}

impl Default for KernelNames {
    fn default() -> Self {
        Self {
            initialization: "CSInitialization".to_owned(),
            update: "CSMain".to_owned(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BindingNames {
    pub initial_state: String,
    pub previous_state: String,
    pub result: String,
    pub display: String,
}

impl Default for BindingNames {
    fn default() -> Self {
        Self {
            initial_state: "InitialState".to_owned(),
            previous_state: "PreviousState".to_owned(),
            result: "Result".to_owned(),
            display: "_MainTex".to_owned(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Circle,
    Square,
}

impl Default for Shape {
    fn default() -> Self {
        Self::Circle
    }
}

/// A patch of non-background state painted into the initial image.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Seed {
    #[serde(alias = "pos")]
    pub position: Point,

    #[serde(default = "default_radius")]
    pub radius: f32,

    #[serde(default)]
    pub shape: Shape,

    #[serde(default = "default_seed_state")]
    pub state: State,
}

/// Everything the simulation driver needs besides its GPU collaborators.
#[derive(Clone, Debug, PartialEq)]
pub struct DriverConfig {
    pub grid_size: u32,
    pub refresh_interval: f32,
    pub kernels: KernelNames,
    pub bindings: BindingNames,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            grid_size: default_grid_size(),
            refresh_interval: 0.0,
            kernels: KernelNames::default(),
            bindings: BindingNames::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_grid_size")]
    #[serde(alias = "size")]
    pub grid_size: u32,

    /// Seconds between simulation steps; 0 steps on every frame.
    #[serde(default)]
    #[serde(alias = "refresh_rate")]
    pub refresh_interval: f32,

    #[serde(default)]
    pub kernels: KernelNames,

    #[serde(default)]
    pub bindings: BindingNames,

    #[serde(default = "default_background")]
    pub background: State,

    #[serde(default = "default_seeds")]
    #[serde(alias = "seed")]
    pub seeds: Vec<Seed>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid_size: default_grid_size(),
            refresh_interval: 0.0,
            kernels: KernelNames::default(),
            bindings: BindingNames::default(),
            background: default_background(),
            seeds: default_seeds(),
        }
    }
}

impl Config {
    pub fn from_toml(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml(&source)
    }

    /// Checks that the grid fits a texture no larger than `max_dimension`.
    pub fn validate(&self, max_dimension: u32) -> Result<()> {
        StateTextureDescriptor::square(self.grid_size).validate(max_dimension)
    }

    pub fn driver(&self) -> DriverConfig {
        DriverConfig {
            grid_size: self.grid_size,
            refresh_interval: self.refresh_interval,
            kernels: self.kernels.clone(),
            bindings: self.bindings.clone(),
        }
    }
}
