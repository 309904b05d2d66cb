mod keyboard_ui;
mod runtime;

use anyhow::Result;

use glsandbox_engine::demo::{ClearColorDemo, DemoMenu, QuadDemo};
use glsandbox_engine::logging::{init_logging, LoggingConfig};

use runtime::{Runtime, RuntimeConfig};

const BASIC_SHADER: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/res/shaders/Basic.shader");

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let mut menu = DemoMenu::new();
    menu.register("Clear Color", |_| Ok(ClearColorDemo::new()))
        .register("Quad", |ctx| QuadDemo::from_file(ctx, BASIC_SHADER));

    let config = RuntimeConfig {
        initial_demo: std::env::args().nth(1),
        ..RuntimeConfig::default()
    };

    log::info!("demos: {:?}", menu);
    Runtime::run(config, menu)
}
