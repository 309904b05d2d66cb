use std::rc::Rc;

use crate::buffer::IndexBuffer;
use crate::error::Result;
use crate::gl::GlContext;
use crate::gl_call;
use crate::shader::Shader;
use crate::vertex_array::VertexArray;

/// Clears the framebuffer and issues indexed triangle draws.
#[derive(Debug)]
pub struct Renderer {
    ctx: Rc<GlContext>,
}

impl Renderer {
    pub fn new(ctx: &Rc<GlContext>) -> Self {
        Self {
            ctx: Rc::clone(ctx),
        }
    }

    /// Maps clip space onto a `width` x `height` pixel framebuffer.
    pub fn set_viewport(&self, width: u32, height: u32) -> Result<()> {
        let width = i32::try_from(width).unwrap_or(i32::MAX);
        let height = i32::try_from(height).unwrap_or(i32::MAX);
        gl_call!(self.ctx, |gl| gl.viewport(0, 0, width, height))
    }

    pub fn set_clear_color(&self, rgba: [f32; 4]) -> Result<()> {
        gl_call!(self.ctx, |gl| gl.clear_color(rgba))
    }

    /// Clears the color buffer with the current clear color.
    pub fn clear(&self) -> Result<()> {
        gl_call!(self.ctx, |gl| gl.clear_color_buffer())
    }

    /// Draws `ib.count()` indices as triangles.
    ///
    /// Binds `shader`, `va` and `ib` first; they stay bound afterwards.
    pub fn draw(&self, va: &VertexArray, ib: &IndexBuffer, shader: &Shader) -> Result<()> {
        shader.bind()?;
        va.bind()?;
        ib.bind()?;

        let count = i32::try_from(ib.count()).unwrap_or(i32::MAX);
        gl_call!(self.ctx, |gl| gl.draw_triangles_u32(count, 0))
    }
}
