//! Interactive demo scenes and the menu that switches between them.
//!
//! A demo only talks to the UI through [`DemoUi`], so the same scene runs
//! under the windowed keyboard harness and under a scripted test UI.

mod clear_color;
mod host;
mod menu;
mod quad;

pub use clear_color::ClearColorDemo;
pub use host::{DemoHost, BACK_LABEL};
pub use menu::{DemoFactory, DemoMenu};
pub use quad::QuadDemo;

use crate::error::Result;
use crate::render::Renderer;

/// Immediate-mode widget surface offered to demos.
///
/// Widgets report interaction for the current frame only.
pub trait DemoUi {
    /// Returns `true` if the button was pressed this frame.
    fn button(&mut self, label: &str) -> bool;

    /// Lets the user edit `rgba` in place. Returns `true` if it changed.
    fn color_picker(&mut self, label: &str, rgba: &mut [f32; 4]) -> bool;

    fn text(&mut self, text: &str);
}

/// One runnable scene.
pub trait Demo {
    fn on_update(&mut self, dt: f32) {
        let _ = dt;
    }

    fn on_render(&mut self, renderer: &Renderer) -> Result<()> {
        let _ = renderer;
        Ok(())
    }

    fn on_ui(&mut self, ui: &mut dyn DemoUi) {
        let _ = ui;
    }

    /// Framebuffer size in pixels changed.
    fn on_resize(&mut self, width: u32, height: u32) {
        let _ = (width, height);
    }
}
