//! Keyboard-driven stand-in for an immediate-mode GUI.
//!
//! Widgets are listed in the window title; keys act on them:
//! - `1`..`9` press the N-th button
//! - `Escape` presses the back button
//! - `C` cycles any color picker through a fixed palette

use glsandbox_engine::demo::{DemoUi, BACK_LABEL};
use winit::keyboard::KeyCode;

const PALETTE: [[f32; 4]; 5] = [
    [0.2, 0.3, 0.8, 1.0],
    [0.8, 0.2, 0.3, 1.0],
    [0.2, 0.7, 0.3, 1.0],
    [0.9, 0.8, 0.2, 1.0],
    [0.1, 0.1, 0.1, 1.0],
];

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Press {
    Button(usize),
    Back,
    CycleColor,
}

#[derive(Debug, Default)]
pub struct KeyboardUi {
    pending: Option<Press>,
    buttons_seen: usize,
    palette_index: usize,
    widgets: Vec<String>,
    summary: String,
}

impl KeyboardUi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the key for the next UI pass. Returns `false` for unmapped keys.
    pub fn key_pressed(&mut self, key: KeyCode) -> bool {
        let press = match key {
            KeyCode::Escape => Press::Back,
            KeyCode::KeyC => Press::CycleColor,
            other => match digit(other) {
                Some(n) => Press::Button(n),
                None => return false,
            },
        };
        self.pending = Some(press);
        true
    }

    pub fn begin_frame(&mut self) {
        self.buttons_seen = 0;
        self.widgets.clear();
    }

    /// Drops any press no widget consumed.
    ///
    /// Returns the widget summary when it differs from the previous frame.
    pub fn end_frame(&mut self) -> Option<&str> {
        if let Some(press) = self.pending.take() {
            log::debug!("key press {press:?} matched no widget");
        }
        let summary = self.widgets.join("  |  ");
        if summary == self.summary {
            return None;
        }
        self.summary = summary;
        Some(&self.summary)
    }

    fn take(&mut self, press: Press) -> bool {
        if self.pending == Some(press) {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

impl DemoUi for KeyboardUi {
    fn button(&mut self, label: &str) -> bool {
        if label == BACK_LABEL {
            self.widgets.push(format!("[Esc] {label}"));
            return self.take(Press::Back);
        }

        self.buttons_seen += 1;
        let n = self.buttons_seen;
        if n <= 9 {
            self.widgets.push(format!("[{n}] {label}"));
        }
        self.take(Press::Button(n))
    }

    fn color_picker(&mut self, label: &str, rgba: &mut [f32; 4]) -> bool {
        self.widgets.push(format!("[C] {label}"));
        if !self.take(Press::CycleColor) {
            return false;
        }
        self.palette_index = (self.palette_index + 1) % PALETTE.len();
        *rgba = PALETTE[self.palette_index];
        log::info!("{label}: {rgba:?}");
        true
    }

    fn text(&mut self, text: &str) {
        self.widgets.push(text.to_string());
    }
}

fn digit(key: KeyCode) -> Option<usize> {
    Some(match key {
        KeyCode::Digit1 | KeyCode::Numpad1 => 1,
        KeyCode::Digit2 | KeyCode::Numpad2 => 2,
        KeyCode::Digit3 | KeyCode::Numpad3 => 3,
        KeyCode::Digit4 | KeyCode::Numpad4 => 4,
        KeyCode::Digit5 | KeyCode::Numpad5 => 5,
        KeyCode::Digit6 | KeyCode::Numpad6 => 6,
        KeyCode::Digit7 | KeyCode::Numpad7 => 7,
        KeyCode::Digit8 | KeyCode::Numpad8 => 8,
        KeyCode::Digit9 | KeyCode::Numpad9 => 9,
        _ => return None,
    })
}
