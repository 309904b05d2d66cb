//! Vertex array object: binds buffer contents to attribute slots.

use std::rc::Rc;

use crate::buffer::VertexBuffer;
use crate::error::{GraphicsError, Result};
use crate::gl::{AttribPointer, GlContext, VertexArrayHandle};
use crate::gl_call;
use crate::layout::VertexBufferLayout;

#[derive(Debug)]
pub struct VertexArray {
    ctx: Rc<GlContext>,
    handle: VertexArrayHandle,
}

impl VertexArray {
    pub fn new(ctx: &Rc<GlContext>) -> Result<Self> {
        let handle = gl_call!(ctx, |gl| gl.create_vertex_array())?.map_err(|reason| {
            GraphicsError::ResourceCreation {
                kind: "vertex array",
                reason,
            }
        })?;
        log::debug!("vertex array {} created", handle.get());
        Ok(Self {
            ctx: Rc::clone(ctx),
            handle,
        })
    }

    /// Wires `buffer` to consecutive attribute slots described by `layout`.
    ///
    /// Slots always start at 0: adding a second buffer reconfigures the same
    /// slots. Nothing is retained about `buffer` or `layout` afterwards.
    pub fn add_buffer(&self, buffer: &VertexBuffer, layout: &VertexBufferLayout) -> Result<()> {
        self.bind()?;
        buffer.bind()?;

        let stride = layout.stride() as i32;
        let mut offset = 0u32;
        for (index, element) in (0u32..).zip(layout.elements()) {
            let pointer = AttribPointer {
                index,
                components: element.count as i32,
                scalar: element.scalar,
                normalized: element.normalized,
                stride,
                offset: offset as i32,
            };
            gl_call!(self.ctx, |gl| gl.enable_vertex_attrib_array(index))?;
            gl_call!(self.ctx, |gl| gl.vertex_attrib_pointer(pointer))?;
            offset += element.byte_size();
        }
        Ok(())
    }

    pub fn bind(&self) -> Result<()> {
        gl_call!(self.ctx, |gl| gl.bind_vertex_array(Some(self.handle)))?;
        self.ctx.record_vertex_array(Some(self.handle));
        Ok(())
    }

    pub fn unbind(&self) -> Result<()> {
        gl_call!(self.ctx, |gl| gl.bind_vertex_array(None))?;
        self.ctx.record_vertex_array(None);
        Ok(())
    }

    pub fn handle(&self) -> VertexArrayHandle {
        self.handle
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        let handle = self.handle;
        if let Err(e) = gl_call!(self.ctx, |gl| gl.delete_vertex_array(handle)) {
            log::error!("failed to delete vertex array {}: {e}", handle.get());
        }
        self.ctx.forget_vertex_array(handle);
        log::trace!("vertex array {} released", handle.get());
    }
}
