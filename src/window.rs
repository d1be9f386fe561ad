//! Native window host.
//!
//! Opens a winit window, renders the field through [`GpuSurface`] and uses
//! the window's redraw request as the display-refresh callback.

use std::sync::Arc;

use tracing::{error, info};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::animator::ParticleField;
use crate::config::FieldConfig;
use crate::error::RunError;
use crate::gpu::GpuSurface;
use crate::scheduler::{FrameHandle, FrameScheduler};

/// Schedules frames by requesting a redraw of the window.
///
/// winit cannot take a redraw request back, so cancelling only forgets the
/// pending handle and the next `RedrawRequested` is ignored.
pub struct RedrawScheduler {
    window: Arc<Window>,
    next_id: u64,
    pending: Option<FrameHandle>,
}

impl RedrawScheduler {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            next_id: 0,
            pending: None,
        }
    }

    /// Consume the pending request. Returns whether a frame is due.
    pub fn fire(&mut self) -> bool {
        self.pending.take().is_some()
    }
}

impl FrameScheduler for RedrawScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending = Some(handle);
        self.window.request_redraw();
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}

struct Running {
    window: Arc<Window>,
    scheduler: RedrawScheduler,
    field: ParticleField<GpuSurface>,
}

struct App {
    config: FieldConfig,
    running: Option<Running>,
    error: Option<RunError>,
}

impl App {
    fn new(config: FieldConfig) -> Self {
        Self {
            config,
            running: None,
            error: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<Running, RunError> {
        let window_attrs = Window::default_attributes()
            .with_title("Particle Field")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let surface = pollster::block_on(GpuSurface::new(window.clone()))?;

        let mut scheduler = RedrawScheduler::new(window.clone());
        let mut field = ParticleField::new(surface, self.config.clone())?;
        field.initialize(&mut scheduler)?;

        Ok(Running {
            window,
            scheduler,
            field,
        })
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(running) => self.running = Some(running),
            Err(e) => {
                error!("failed to start: {}", e);
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(running) = &mut self.running else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                running.field.stop(&mut running.scheduler);
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                // Minimized windows report zero; keep the last real size.
                if physical_size.width > 0 && physical_size.height > 0 {
                    running
                        .field
                        .on_resize(physical_size.width, physical_size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                if !running.scheduler.fire() {
                    return;
                }
                running.field.frame(&mut running.scheduler);

                if running.field.surface().out_of_memory() {
                    running.field.stop(&mut running.scheduler);
                    event_loop.exit();
                    return;
                }

                if running.field.frames() % 30 == 0 {
                    running.window.set_title(&format!(
                        "Particle Field - {:.0} FPS",
                        running.field.clock().fps()
                    ));
                }
            }
            _ => {}
        }
    }
}

/// Open a window and animate a field with `config` until it is closed.
pub fn run(config: FieldConfig) -> Result<(), RunError> {
    config.validate().map_err(crate::error::FieldError::from)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => {
            info!("window closed");
            Ok(())
        }
    }
}
