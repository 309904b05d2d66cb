use crate::error::Result;
use crate::render::Renderer;

use super::{Demo, DemoUi};

/// Fills the window with an editable solid color.
#[derive(Debug, Clone)]
pub struct ClearColorDemo {
    clear_color: [f32; 4],
}

impl ClearColorDemo {
    pub const DEFAULT_COLOR: [f32; 4] = [0.2, 0.3, 0.8, 1.0];

    pub fn new() -> Self {
        Self {
            clear_color: Self::DEFAULT_COLOR,
        }
    }

    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }
}

impl Default for ClearColorDemo {
    fn default() -> Self {
        Self::new()
    }
}

impl Demo for ClearColorDemo {
    fn on_render(&mut self, renderer: &Renderer) -> Result<()> {
        renderer.set_clear_color(self.clear_color)?;
        renderer.clear()
    }

    fn on_ui(&mut self, ui: &mut dyn DemoUi) {
        ui.color_picker("Clear Color", &mut self.clear_color);
    }
}
