mod display;
mod screen;
mod uniform;

use std::time::Instant;

use fnv::FnvHashSet;
use log::{debug, error, info};
use tiny_mandelbrot::{
    explorer::{Explorer, Input},
    pixel::Rgba,
};
use winit::{
    dpi::LogicalSize,
    event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

use crate::{display::Display, screen::Size};

/// Initial window size as a multiple of the frame size.
const WINDOW_SCALE: u32 = 3;

/// Keyboard state between two explorer updates.
#[derive(Default)]
struct Keys {
    held: FnvHashSet<VirtualKeyCode>,
    pressed: FnvHashSet<VirtualKeyCode>,
}

impl Keys {
    fn handle(&mut self, key: VirtualKeyCode, state: ElementState) {
        match state {
            // Auto-repeat sends more presses while the key is held.
            ElementState::Pressed => {
                if self.held.insert(key) {
                    self.pressed.insert(key);
                }
            }
            ElementState::Released => {
                self.held.remove(&key);
            }
        }
    }

    /// Input for the next update; presses are reported once.
    fn take_input(&mut self) -> Input {
        let input = Input {
            left: self.held.contains(&VirtualKeyCode::Left),
            right: self.held.contains(&VirtualKeyCode::Right),
            up: self.held.contains(&VirtualKeyCode::Up),
            down: self.held.contains(&VirtualKeyCode::Down),
            zoom_in: self.pressed.contains(&VirtualKeyCode::A),
            zoom_out: self.pressed.contains(&VirtualKeyCode::Z),
            benchmark: self.pressed.contains(&VirtualKeyCode::B),
            toggle_colouring: self.pressed.contains(&VirtualKeyCode::H),
        };
        self.pressed.clear();
        input
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let threads = num_cpus::get_physical();
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()?;
    debug!("colouring with {} threads", threads);

    let mut explorer: Explorer = Explorer::new();
    let frame_size = Size::new(explorer.width() as u32, explorer.height() as u32);
    let mut frame = vec![Rgba::BLACK; (frame_size.width * frame_size.height) as usize];

    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title("tiny-mandelbrot")
        .with_inner_size(LogicalSize::new(
            frame_size.width * WINDOW_SCALE,
            frame_size.height * WINDOW_SCALE,
        ))
        .build(&event_loop)?;

    let mut display = Display::new(&window, frame_size)?;
    info!("arrows pan, A/Z zoom, B benchmark view, H colouring, Escape quits");

    let mut keys = Keys::default();
    let start = Instant::now();

    event_loop.run(move |event, _, control_flow| match event {
        Event::MainEventsCleared => {
            window.request_redraw();
        }
        Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
            WindowEvent::CloseRequested => {
                *control_flow = ControlFlow::Exit;
            }
            WindowEvent::Resized(size) => {
                display.resize(size.into());
                window.request_redraw();
            }
            WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                display.resize((*new_inner_size).into());
            }
            WindowEvent::KeyboardInput {
                input:
                    KeyboardInput {
                        state,
                        virtual_keycode: Some(key),
                        ..
                    },
                ..
            } => {
                if key == VirtualKeyCode::Escape {
                    *control_flow = ControlFlow::Exit;
                } else {
                    keys.handle(key, state);
                }
            }
            _ => {}
        },
        Event::RedrawRequested(window_id) if window_id == window.id() => {
            let now_ms = start.elapsed().as_millis() as u64;
            explorer.update(now_ms, &keys.take_input());
            if let Err(err) = explorer.draw(now_ms, &mut frame) {
                error!("drawing failed: {}", err);
                *control_flow = ControlFlow::Exit;
                return;
            }

            match display.present(&frame) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    debug!("surface lost, reconfiguring");
                    display.reconfigure();
                }
                Err(wgpu::SurfaceError::Timeout) => {
                    debug!("surface timed out");
                }
                Err(err) => {
                    error!("presenting failed: {}", err);
                    *control_flow = ControlFlow::Exit;
                }
            }
        }
        _ => {}
    });
}
