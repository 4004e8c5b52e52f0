// MIT License

// Copyright (c) 2022 AnonmousDapper

use glam::UVec3;

use log::{debug, info, warn};

use crate::{
    backend::{ComputeBackend, DisplaySurface, StateTextureDescriptor},
    config::DriverConfig,
    error::{Error, Result},
    timer::Timer,
    INIT_GROUPS_Z, STEP_GROUPS_Z, THREAD_GROUP_SIZE,
};

/// Thread groups for the one-time seeding dispatch.
pub fn init_groups(grid_size: u32) -> UVec3 {
    let side = grid_size / THREAD_GROUP_SIZE;
    UVec3::new(side, side, INIT_GROUPS_Z)
}

/// Thread groups for each simulation step.
pub fn step_groups(grid_size: u32) -> UVec3 {
    let side = grid_size / THREAD_GROUP_SIZE;
    UVec3::new(side, side, STEP_GROUPS_Z)
}

/// Runs a compute kernel over a pair of state textures, alternating which
/// one is read and which one is written on every step.
///
/// A driver only exists once initialization has succeeded, so every value of
/// this type is ready to tick. The backend is passed in per call; the driver
/// only owns the textures and the update kernel it resolved.
pub struct SimulationDriver<T, K> {
    buffers: [T; 2],
    current: usize,
    update_kernel: K,
    timer: Timer,
    config: DriverConfig,
    generation: u64,
}

impl<T, K> SimulationDriver<T, K> {
    /// Allocates both state buffers and seeds buffer 0 from `initial_state`.
    ///
    /// Kernels are resolved before anything is bound or dispatched, so a
    /// failed call leaves no bindings behind.
    pub fn initialize<B>(
        backend: &mut B,
        config: &DriverConfig,
        initial_state: &T,
        program: &B::Program,
    ) -> Result<Self>
    where
        B: ComputeBackend<Texture = T, Kernel = K>,
    {
        let size = config.grid_size;
        if size == 0 {
            return Err(Error::ResourceAllocation {
                width: size,
                height: size,
                reason: "grid size must be positive".to_owned(),
            });
        }

        let desc = StateTextureDescriptor::square(size);
        let buffers = [backend.create_texture(&desc)?, backend.create_texture(&desc)?];

        let kernels = &config.kernels;
        let mut init_kernel = backend
            .resolve_kernel(program, &kernels.initialization)
            .ok_or_else(|| Error::KernelResolution(kernels.initialization.clone()))?;
        let mut update_kernel = backend
            .resolve_kernel(program, &kernels.update)
            .ok_or_else(|| Error::KernelResolution(kernels.update.clone()))?;

        let bindings = &config.bindings;
        backend.bind_texture(&mut init_kernel, &bindings.initial_state, initial_state);
        // tick rebinds this before every dispatch
        backend.bind_texture(&mut update_kernel, &bindings.previous_state, &buffers[0]);
        backend.bind_texture(&mut init_kernel, &bindings.result, &buffers[0]);
        if !backend.dispatch(&init_kernel, init_groups(size)) {
            return Err(Error::Dispatch(kernels.initialization.clone()));
        }

        info!(
            "simulation initialized: {}x{} grid, refresh interval {}s",
            size, size, config.refresh_interval
        );

        Ok(Self {
            buffers,
            current: 0,
            update_kernel,
            timer: Timer::new(config.refresh_interval),
            config: config.clone(),
            generation: 0,
        })
    }

    /// Advances the timer and, when it runs out, dispatches one step and
    /// publishes the freshly written buffer. Returns whether a step ran.
    ///
    /// A step the backend refuses to submit leaves the current buffer, the
    /// display and the generation count as they were.
    pub fn tick<B, S>(&mut self, backend: &mut B, surface: &mut S, elapsed: f32) -> bool
    where
        B: ComputeBackend<Texture = T, Kernel = K>,
        S: DisplaySurface<T> + ?Sized,
    {
        if !self.timer.advance(elapsed) {
            return false;
        }

        let bindings = &self.config.bindings;
        let next = 1 - self.current;

        backend.bind_texture(
            &mut self.update_kernel,
            &bindings.previous_state,
            &self.buffers[self.current],
        );
        backend.bind_texture(
            &mut self.update_kernel,
            &bindings.result,
            &self.buffers[next],
        );

        if !backend.dispatch(&self.update_kernel, step_groups(self.config.grid_size)) {
            warn!("step {} was not submitted", self.generation + 1);
            return false;
        }

        self.current = next;
        surface.set_texture(&bindings.display, &self.buffers[self.current]);

        self.generation += 1;
        debug!("step {} wrote buffer {}", self.generation, self.current);

        true
    }

    #[inline]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[inline]
    pub fn current_buffer(&self) -> &T {
        &self.buffers[self.current]
    }

    pub fn buffer(&self, index: usize) -> Option<&T> {
        self.buffers.get(index)
    }

    #[inline]
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Steps dispatched since initialization.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
