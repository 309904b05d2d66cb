//! glsandbox engine crate.
//!
//! Owning wrappers over OpenGL objects (buffers, vertex arrays, shader
//! programs), an error-checked call layer, and the demo contracts the studio
//! binary drives. The crate never opens a window; callers hand it a loaded
//! `glow::Context` through [`gl::GlowBackend`].

pub mod gl;

pub mod buffer;
pub mod layout;
pub mod vertex_array;
pub mod shader;
pub mod render;

pub mod demo;
pub mod error;
pub mod logging;
pub mod time;

pub use buffer::{IndexBuffer, VertexBuffer};
pub use error::{GraphicsError, Result};
pub use layout::{VertexBufferElement, VertexBufferLayout};
pub use render::Renderer;
pub use shader::{Shader, ShaderProgramSource, UniformSlot};
pub use vertex_array::VertexArray;
