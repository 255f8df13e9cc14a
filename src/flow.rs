//! Application event loop.
//!
//! Each frame the loop:
//! 1. collects window/device events (movement keys, phase toggle, mouse look)
//! 2. measures the time since the previous frame
//! 3. moves the camera and advances the [`SceneDriver`]
//! 4. hands the resulting [`Frame`](crate::render::Frame) to the [`Renderer`] (wgpu by default)
//! 5. requests the next redraw
//!
//! `H` flips the scene's phase flag. Key repeats are ignored and a toggle is
//! only accepted [`TOGGLE_DEBOUNCE`] after the previous one.

use std::{collections::HashSet, path::Path, sync::Arc};

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{DeviceEvent, DeviceId, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::{
    camera::{Camera, Direction, Projection},
    config::IniConfig,
    context::GpuContext,
    render::{FrameLog, GpuRenderer, Renderer},
    scene::{SceneDriver, SceneSettings},
};

pub const TOGGLE_DEBOUNCE: Duration = Duration::from_millis(100);

pub fn direction_for(key: KeyCode) -> Option<Direction> {
    match key {
        KeyCode::KeyW => Some(Direction::Forward),
        KeyCode::KeyS => Some(Direction::Backward),
        KeyCode::KeyA => Some(Direction::Left),
        KeyCode::KeyD => Some(Direction::Right),
        _ => None,
    }
}

/// Accepts a toggle request unless one was accepted less than `window` ago.
#[derive(Debug)]
pub struct Debounce {
    window: Duration,
    last: Option<Instant>,
}

impl Debounce {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    pub fn accept(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.duration_since(last) < self.window => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

pub struct App {
    driver: SceneDriver,
    camera: Camera,
    projection: Projection,
    renderer: Box<dyn Renderer>,
    window: Option<Arc<Window>>,
    held: HashSet<Direction>,
    toggle: Debounce,
    last_time: Instant,
}

impl App {
    pub fn new(settings: SceneSettings, mut renderer: Box<dyn Renderer>) -> Self {
        let projection = Projection::new(
            settings.window.width,
            settings.window.height,
            cgmath::Deg(45.0),
            0.1,
            100.0,
        );
        let mut driver = SceneDriver::new(settings);
        driver.load_assets(renderer.texture_loader());
        Self {
            driver,
            camera: Camera::default(),
            projection,
            renderer,
            window: None,
            held: HashSet::new(),
            toggle: Debounce::new(TOGGLE_DEBOUNCE),
            last_time: Instant::now(),
        }
    }

    pub fn driver(&self) -> &SceneDriver {
        &self.driver
    }

    fn handle_key(&mut self, event: &KeyEvent, event_loop: &ActiveEventLoop) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        let pressed = event.state.is_pressed();
        if let Some(direction) = direction_for(code) {
            if pressed {
                self.held.insert(direction);
            } else {
                self.held.remove(&direction);
            }
            return;
        }
        match code {
            KeyCode::KeyH if pressed && !event.repeat => {
                if self.toggle.accept(Instant::now()) {
                    self.driver.toggle_phase();
                }
            }
            KeyCode::Escape if pressed => event_loop.exit(),
            _ => (),
        }
    }

    fn redraw(&mut self) {
        let dt = self.last_time.elapsed();
        self.last_time = Instant::now();
        let dt = dt.as_secs_f32();

        for direction in &self.held {
            self.camera.advance(*direction, dt);
        }
        self.driver.update(dt);

        let frame = self.driver.frame(
            self.camera.view_matrix(),
            self.projection.matrix(),
            self.camera.position,
        );
        if let Err(e) = self.renderer.render(&frame) {
            log::error!("Unable to render {}", e);
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let settings = &self.driver.settings().window;
        let window_attributes = Window::default_attributes()
            .with_title(settings.title.clone())
            .with_inner_size(LogicalSize::new(settings.width, settings.height));
        match event_loop.create_window(window_attributes) {
            Ok(window) => {
                let window = Arc::new(window);
                if let Err(e) = self.renderer.attach(window.clone()) {
                    log::error!("Nothing will be drawn to the window: {}", e);
                }
                window.request_redraw();
                self.window = Some(window);
                self.last_time = Instant::now();
            }
            Err(e) => {
                log::error!("Cannot create the main window: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                self.projection.resize(size.width, size.height);
                self.renderer.resize(size.width, size.height);
            }
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(&event, event_loop),
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.camera.rotate(dx as f32, -dy as f32);
        }
    }
}

/// Loads `config_path` (defaults apply when it is missing) and runs the scene
/// until the window is closed.
pub fn run(config_path: impl AsRef<Path>) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    }

    let config_path = config_path.as_ref();
    let config = IniConfig::load(config_path).unwrap_or_else(|e| {
        log::warn!("{}; running with default settings", e);
        IniConfig::default()
    });
    run_with(SceneSettings::from_config(&config), default_renderer())
}

/// wgpu when an adapter is available, otherwise frames are only logged.
pub fn default_renderer() -> Box<dyn Renderer> {
    match GpuContext::blocking_headless() {
        Ok(ctx) => Box::new(GpuRenderer::new(ctx)),
        Err(e) => {
            log::warn!("No GPU adapter ({}); frames will only be logged", e);
            Box::new(FrameLog::new())
        }
    }
}

pub fn run_with(settings: SceneSettings, renderer: Box<dyn Renderer>) -> anyhow::Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut app = App::new(settings, renderer);
    event_loop.run_app(&mut app)?;
    Ok(())
}
