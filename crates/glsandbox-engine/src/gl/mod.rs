//! Error-checked call layer over the OpenGL driver.
//!
//! The driver reports errors through a sticky, context-global queue rather
//! than per-call return values. [`GlContext::call`] (and the [`gl_call!`]
//! macro) clears the queue, issues one call, then drains the queue and
//! attributes every code to the call site.
//!
//! Backends:
//! - [`GlowBackend`]: the real driver through `glow`
//! - [`DummyBackend`]: recording fake for tests and headless runs
//!
//! [`gl_call!`]: crate::gl_call

mod backend;
mod check;
mod context;
mod dummy;
mod glow_backend;

pub use backend::{
    AttribPointer, BufferHandle, BufferTarget, GlBackend, ProgramHandle, ScalarType,
    ShaderHandle, ShaderStage, UniformLocation, VertexArrayHandle,
};
pub use check::{CallSite, GlErrorCode};
pub use context::{Bindings, ContextConfig, ErrorPolicy, GlContext};
pub use dummy::{DrawCall, DummyBackend, UniformValue};
pub use glow_backend::GlowBackend;
