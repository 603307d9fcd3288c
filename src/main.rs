//! PBR demo application
//!
//! Controls:
//!   WASD     - Move camera
//!   Mouse    - Look around
//!   Scroll   - Zoom
//!   Shift    - Sprint (2x speed)
//!   Escape   - Exit

use std::sync::Arc;
use std::time::Instant;

use pbr_demo::resources::PbrTextureSet;
use pbr_demo::scene::{CameraController, CameraInput, FreeFlyController, Scene};
use pbr_demo::{DemoConfig, Renderer};
use winit::{
    dpi::PhysicalSize,
    event::{DeviceEvent, ElementState, Event, MouseScrollDelta, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowBuilder},
};

/// Application state for input handling
struct AppState {
    camera_input: CameraInput,
    free_fly: FreeFlyController,
    last_frame: Instant,
    cursor_grabbed: bool,
}

impl AppState {
    fn new() -> Self {
        Self {
            camera_input: CameraInput::new(),
            free_fly: FreeFlyController::default(),
            last_frame: Instant::now(),
            cursor_grabbed: false,
        }
    }

    fn grab_cursor(&mut self, window: &Window) {
        let grabbed = window
            .set_cursor_grab(CursorGrabMode::Confined)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked))
            .is_ok();
        window.set_cursor_visible(!grabbed);
        self.cursor_grabbed = grabbed;
    }

    fn release_cursor(&mut self, window: &Window) {
        let _ = window.set_cursor_grab(CursorGrabMode::None);
        window.set_cursor_visible(true);
        self.cursor_grabbed = false;
    }
}

fn main() {
    env_logger::init();

    let config = DemoConfig::default();

    println!("Starting PBR Demo");
    println!();
    println!("Controls:");
    println!("  WASD   - Move camera");
    println!("  Mouse  - Look around");
    println!("  Scroll - Zoom");
    println!("  Shift  - Sprint (2x speed)");
    println!("  Escape - Exit");
    println!();

    let event_loop = EventLoop::new().expect("Failed to create event loop");

    let window = Arc::new(
        WindowBuilder::new()
            .with_title(&config.title)
            .with_inner_size(PhysicalSize::new(config.width, config.height))
            .build(&event_loop)
            .expect("Failed to create window"),
    );

    let texture_dir = config.asset_root.join("textures");
    let texture_sets: Vec<PbrTextureSet> = config
        .texture_sets
        .iter()
        .map(|name| PbrTextureSet::load(&texture_dir, name))
        .collect();

    let mut scene = Scene::sphere_row(texture_sets.len(), 2.5);
    scene
        .camera
        .set_aspect(config.width as f32, config.height as f32);

    let mut renderer = match Renderer::new(Arc::clone(&window), &config, &texture_sets, &scene) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Failed to create renderer: {e}");
            return;
        }
    };

    let mut state = AppState::new();
    state.free_fly.sync_with_camera(&scene.camera);
    state.grab_cursor(&window);

    let window_clone = Arc::clone(&window);
    event_loop
        .run(move |event, elwt: &EventLoopWindowTarget<()>| {
            elwt.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent { event, .. } => {
                    handle_window_event(&event, &mut state, &mut scene, &mut renderer, &window_clone, elwt);
                }
                Event::DeviceEvent { event, .. } => {
                    if let DeviceEvent::MouseMotion { delta } = event {
                        if state.cursor_grabbed {
                            state.camera_input.mouse_delta.x += delta.0 as f32;
                            state.camera_input.mouse_delta.y += delta.1 as f32;
                        }
                    }
                }
                Event::AboutToWait => {
                    let now = Instant::now();
                    let dt = (now - state.last_frame).as_secs_f32();
                    state.last_frame = now;

                    state
                        .free_fly
                        .update(&mut scene.camera, &state.camera_input, dt);
                    state.camera_input.reset_deltas();

                    window_clone.request_redraw();
                }
                _ => {}
            }
        })
        .expect("Event loop failed");
}

fn handle_window_event(
    event: &WindowEvent,
    state: &mut AppState,
    scene: &mut Scene,
    renderer: &mut Renderer,
    window: &Window,
    elwt: &EventLoopWindowTarget<()>,
) {
    match event {
        WindowEvent::CloseRequested => {
            elwt.exit();
        }
        WindowEvent::Resized(size) => {
            renderer.resize(size.width, size.height);
            let (width, height) = renderer.surface_size();
            scene.camera.set_aspect(width as f32, height as f32);
        }
        WindowEvent::RedrawRequested => {
            if let Err(e) = renderer.render(scene) {
                log::error!("render error: {e}");
                elwt.exit();
            }
        }
        WindowEvent::KeyboardInput { event, .. } => {
            let pressed = event.state == ElementState::Pressed;

            if let PhysicalKey::Code(key) = event.physical_key {
                match key {
                    KeyCode::Escape => {
                        elwt.exit();
                    }
                    KeyCode::KeyW => state.camera_input.forward = pressed,
                    KeyCode::KeyS => state.camera_input.backward = pressed,
                    KeyCode::KeyA => state.camera_input.left = pressed,
                    KeyCode::KeyD => state.camera_input.right = pressed,
                    KeyCode::ShiftLeft | KeyCode::ShiftRight => {
                        state.camera_input.sprint = pressed
                    }
                    _ => {}
                }
            }
        }
        WindowEvent::MouseWheel { delta, .. } => {
            let scroll = match delta {
                MouseScrollDelta::LineDelta(_, y) => *y,
                MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
            };
            state.camera_input.scroll_delta += scroll;
        }
        WindowEvent::Focused(focused) => {
            // Release all keys when the window loses focus
            if *focused {
                state.grab_cursor(window);
            } else {
                state.camera_input = CameraInput::new();
                state.release_cursor(window);
            }
        }
        _ => {}
    }
}
