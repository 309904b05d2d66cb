use std::num::NonZeroU32;
use std::rc::Rc;

use anyhow::{anyhow, Context, Result};
use glutin::config::{ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use glsandbox_engine::demo::{DemoHost, DemoMenu};
use glsandbox_engine::gl::{ContextConfig, ErrorPolicy, GlContext, GlowBackend};
use glsandbox_engine::time::FrameClock;

use crate::keyboard_ui::KeyboardUi;

/// Window and GL context configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Requested core-profile version.
    pub gl_version: (u8, u8),
    pub vsync: bool,
    pub error_policy: ErrorPolicy,
    /// Demo to open right away instead of showing the menu.
    pub initial_demo: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "glsandbox".to_string(),
            initial_size: LogicalSize::new(960.0, 540.0),
            gl_version: (3, 3),
            vsync: true,
            error_policy: ErrorPolicy::for_build(),
            initial_demo: None,
        }
    }
}

pub struct Runtime;

impl Runtime {
    /// Opens one window and drives `menu` in it until the window closes.
    pub fn run(config: RuntimeConfig, menu: DemoMenu) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState {
            config,
            menu: Some(menu),
            window: None,
            exit_requested: false,
        };

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        Ok(())
    }
}

/// Everything tied to the one open window.
///
/// Field order is drop order: GL objects go before the context they live in.
struct WindowEntry {
    host: DemoHost,
    ui: KeyboardUi,
    clock: FrameClock,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    window: Window,
}

struct AppState {
    config: RuntimeConfig,
    menu: Option<DemoMenu>,
    window: Option<WindowEntry>,
    exit_requested: bool,
}

impl AppState {
    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let config = &self.config;
        let attrs = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(config.initial_size);

        let template = ConfigTemplateBuilder::new().with_alpha_size(8);
        let (window, gl_config) = DisplayBuilder::new()
            .with_window_attributes(Some(attrs.clone()))
            .build(event_loop, template, |configs| {
                // glutin only calls the picker with at least one config.
                configs
                    .reduce(|best, c| if c.num_samples() > best.num_samples() { c } else { best })
                    .expect("display offered no GL configs")
            })
            .map_err(|e| anyhow!("failed to create GL display: {e}"))?;

        let window = match window {
            Some(window) => window,
            None => glutin_winit::finalize_window(event_loop, attrs, &gl_config)
                .context("failed to create window")?,
        };

        let raw_window_handle = window
            .window_handle()
            .context("window has no native handle")?
            .as_raw();
        let gl_display = gl_config.display();
        let (major, minor) = config.gl_version;
        let context_attributes = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(major, minor))))
            .build(Some(raw_window_handle));

        let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes) }
            .with_context(|| format!("failed to create OpenGL {major}.{minor} core context"))?;

        let surface_attributes = window
            .build_surface_attributes(Default::default())
            .context("failed to describe window surface")?;
        let surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attributes) }
            .context("failed to create window surface")?;
        let context = not_current
            .make_current(&surface)
            .context("failed to make GL context current")?;

        let interval = if config.vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(e) = surface.set_swap_interval(&context, interval) {
            log::warn!("failed to set swap interval: {e}");
        }

        // The context is current on this thread from here on.
        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|s| gl_display.get_proc_address(s))
        };
        let ctx: Rc<GlContext> = GlContext::new(
            GlowBackend::new(gl),
            ContextConfig {
                error_policy: config.error_policy,
                ..ContextConfig::default()
            },
        );

        let menu = self.menu.take().context("demo menu already consumed")?;
        let mut host = DemoHost::new(&ctx, menu);
        let size = window.inner_size();
        host.resize(size.width, size.height)?;
        if let Some(name) = &config.initial_demo {
            if !host.open(name)? {
                log::warn!("unknown demo '{name}'; showing the menu");
            }
        }

        window.request_redraw();
        self.window = Some(WindowEntry {
            host,
            ui: KeyboardUi::new(),
            clock: FrameClock::new(),
            surface,
            context,
            window,
        });
        Ok(())
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        // Release GL objects while the context is still current.
        self.window = None;
        event_loop.exit();
    }
}

impl WindowEntry {
    fn resize(&mut self, size: PhysicalSize<u32>) {
        let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            // Minimised.
            return;
        };
        self.surface.resize(&self.context, width, height);
        if let Err(e) = self.host.resize(size.width, size.height) {
            log::error!("failed to resize viewport: {e}");
        }
        self.window.request_redraw();
    }

    fn frame(&mut self) {
        let ft = self.clock.tick();
        self.host.update(ft.dt);

        if let Err(e) = self.host.render() {
            log::error!("demo render failed: {e}");
            self.host.back_to_menu();
        }

        self.ui.begin_frame();
        let switched_from = self.host.current().map(str::to_owned);
        if let Err(e) = self.host.ui(&mut self.ui) {
            log::error!("failed to start demo: {e}");
        }
        if self.host.current() != switched_from.as_deref() {
            self.clock.reset();
        }
        if let Some(summary) = self.ui.end_frame() {
            self.window.set_title(summary);
        }

        if let Err(e) = self.surface.swap_buffers(&self.context) {
            log::error!("failed to swap buffers: {e}");
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.exit_requested {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop) {
            log::error!("failed to create window: {e:#}");
            self.request_exit(event_loop);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Demos animate, so redraw continuously.
        if let Some(entry) = &self.window {
            entry.window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(entry) = self.window.as_mut() else {
            return;
        };
        if entry.window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.request_exit(event_loop),

            WindowEvent::Resized(size) => entry.resize(size),

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    if let PhysicalKey::Code(code) = event.physical_key {
                        entry.ui.key_pressed(code);
                    }
                }
            }

            WindowEvent::RedrawRequested => entry.frame(),

            _ => {}
        }
    }
}
