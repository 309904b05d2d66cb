use std::rc::Rc;

use crate::error::Result;
use crate::gl::GlContext;
use crate::render::Renderer;

use super::{Demo, DemoMenu, DemoUi};

/// Label of the button that leaves the running demo.
pub const BACK_LABEL: &str = "<-";

/// Runs either the menu or one demo picked from it.
pub struct DemoHost {
    ctx: Rc<GlContext>,
    renderer: Renderer,
    menu: DemoMenu,
    current: Option<(String, Box<dyn Demo>)>,
    viewport: Option<(u32, u32)>,
}

impl DemoHost {
    pub fn new(ctx: &Rc<GlContext>, menu: DemoMenu) -> Self {
        Self {
            ctx: Rc::clone(ctx),
            renderer: Renderer::new(ctx),
            menu,
            current: None,
            viewport: None,
        }
    }

    /// Name of the running demo; `None` while the menu is shown.
    pub fn current(&self) -> Option<&str> {
        self.current.as_ref().map(|(name, _)| name.as_str())
    }

    /// Starts the named demo directly. Returns `false` for an unknown name.
    pub fn open(&mut self, name: &str) -> Result<bool> {
        match self.menu.create(&self.ctx, name)? {
            Some(demo) => {
                self.start(name.to_string(), demo);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Drops the running demo and shows the menu again.
    pub fn back_to_menu(&mut self) {
        if let Some((name, _)) = self.current.take() {
            log::info!("leaving demo '{name}'");
        }
    }

    /// Updates the viewport and tells the running demo.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.renderer.set_viewport(width, height)?;
        self.viewport = Some((width, height));
        if let Some((_, demo)) = &mut self.current {
            demo.on_resize(width, height);
        }
        Ok(())
    }

    pub fn update(&mut self, dt: f32) {
        if let Some((_, demo)) = &mut self.current {
            demo.on_update(dt);
        }
    }

    /// Clears to black, then lets the running demo draw.
    pub fn render(&mut self) -> Result<()> {
        self.renderer.set_clear_color([0.0, 0.0, 0.0, 1.0])?;
        self.renderer.clear()?;
        match &mut self.current {
            Some((_, demo)) => demo.on_render(&self.renderer),
            None => Ok(()),
        }
    }

    /// Draws the menu, or the back button plus the demo's own widgets.
    pub fn ui(&mut self, ui: &mut dyn DemoUi) -> Result<()> {
        let Some((name, demo)) = &mut self.current else {
            if let Some((name, demo)) = self.menu.on_ui(&self.ctx, ui)? {
                self.start(name, demo);
            }
            return Ok(());
        };

        ui.text(name);
        if ui.button(BACK_LABEL) {
            self.back_to_menu();
        } else {
            demo.on_ui(ui);
        }
        Ok(())
    }

    fn start(&mut self, name: String, mut demo: Box<dyn Demo>) {
        if let Some((width, height)) = self.viewport {
            demo.on_resize(width, height);
        }
        self.current = Some((name, demo));
    }
}

impl std::fmt::Debug for DemoHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DemoHost")
            .field("menu", &self.menu)
            .field("current", &self.current())
            .field("viewport", &self.viewport)
            .finish()
    }
}
