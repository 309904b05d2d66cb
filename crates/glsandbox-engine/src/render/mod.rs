//! Frame-level drawing over the wrapper objects.

mod renderer;

pub use renderer::Renderer;
