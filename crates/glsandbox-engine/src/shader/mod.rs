//! Shader programs.
//!
//! A combined source file holds both stages, each introduced by a
//! `#shader vertex` or `#shader fragment` line. [`Shader`] compiles and links
//! the pair and caches uniform locations per name.

mod program;
mod source;
mod uniform;

pub use program::Shader;
pub use source::{parse_shader_source, ShaderProgramSource, SECTION_MARKER};
pub use uniform::UniformSlot;
