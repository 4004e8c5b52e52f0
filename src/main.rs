// MIT License

// Copyright (c) 2022 AnonmousDapper

#![deny(rust_2018_idioms)]

use std::time::Instant;

use pixels::{
    wgpu::{include_wgsl, Limits},
    PixelsBuilder, SurfaceTexture,
};

use winit::{
    event::{Event, VirtualKeyCode},
    event_loop::{ControlFlow, EventLoop},
};

use winit_input_helper::WinitInputHelper;

use log::{error, info};

use pingpong::{
    canvas::Canvas,
    config::Config,
    driver::SimulationDriver,
    gpu::{BindingSlot, ComputeProgram, WgpuCompute},
    pipeline::PresentPass,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("loading config from {}", path);
            Config::load(path)?
        }
        None => Config::default(),
    };
    // pixels and the canvas both size themselves from the grid; refuse bad
    // sizes before either exists
    config.validate(Limits::default().max_texture_dimension_2d)?;
    let driver_config = config.driver();

    let event_loop = EventLoop::new();
    let mut input = WinitInputHelper::new();

    let (window, window_width, window_height, _hidpi) =
        pingpong::window::create_window("pingpong", config.grid_size, &event_loop)?;

    let mut pixels = {
        let surtex = SurfaceTexture::new(window_width, window_height, &window);
        PixelsBuilder::new(config.grid_size, config.grid_size, surtex)
            .texture_format(pingpong::PIPELINE_TEXTURE_FORMAT)
            .enable_vsync(true)
            .build()?
    };

    let bindings = &driver_config.bindings;
    let program = ComputeProgram::new(pixels.device(), include_wgsl!("shaders/gray_scott.wgsl"))
        .with_kernel(
            &driver_config.kernels.initialization,
            &[
                BindingSlot::sampled(&bindings.initial_state, 0),
                BindingSlot::storage(&bindings.result, 2),
            ],
        )
        .with_kernel(
            &driver_config.kernels.update,
            &[
                BindingSlot::sampled(&bindings.previous_state, 1),
                BindingSlot::storage(&bindings.result, 2),
            ],
        );

    let mut present = PresentPass::new(
        pixels.device(),
        pixels.surface_texture_format(),
        &bindings.display,
    );

    let (initial_state, mut driver) = {
        let mut backend = WgpuCompute::new(pixels.device(), pixels.queue());
        config.validate(backend.max_dimension())?;

        let image = backend.upload_image(&Canvas::from_config(&config))?;
        let driver = SimulationDriver::initialize(&mut backend, &driver_config, &image, &program)?;

        (image, driver)
    };

    let mut paused = false;
    let mut last_frame = Instant::now();

    event_loop.run(move |evt, _, flow| {
        if let Event::RedrawRequested(_) = evt {
            let now = Instant::now();
            let elapsed = now.duration_since(last_frame).as_secs_f32();
            last_frame = now;

            let result = pixels.render_with(|encoder, target, ctx| {
                if !paused {
                    let mut backend = WgpuCompute::new(&ctx.device, &ctx.queue);
                    driver.tick(&mut backend, &mut present, elapsed);
                }

                present.render(
                    &ctx.device,
                    encoder,
                    target,
                    ctx.scaling_renderer.clip_rect(),
                );

                Ok(())
            });

            if result
                .map_err(|e| error!("pixels render failed: {}", e))
                .is_err()
            {
                *flow = ControlFlow::Exit;
            }
        }

        if input.update(&evt) {
            if input.key_pressed(VirtualKeyCode::Escape) || input.quit() {
                *flow = ControlFlow::Exit;
                return;
            }

            if input.key_pressed(VirtualKeyCode::Space) {
                paused = !paused;
                info!("simulation {}", if paused { "paused" } else { "resumed" });
            }

            if input.key_pressed(VirtualKeyCode::R) {
                let mut backend = WgpuCompute::new(pixels.device(), pixels.queue());
                match SimulationDriver::initialize(
                    &mut backend,
                    &driver_config,
                    &initial_state,
                    &program,
                ) {
                    Ok(fresh) => driver = fresh,
                    Err(e) => {
                        error!("re-initialization failed: {}", e);
                        *flow = ControlFlow::Exit;
                        return;
                    }
                }
            }

            if let Some(size) = input.window_resized() {
                if let Err(e) = pixels.resize_surface(size.width, size.height) {
                    error!("pixels resize failed: {}", e);
                    *flow = ControlFlow::Exit;
                    return;
                }
            }

            window.request_redraw();
        }
    });
}
