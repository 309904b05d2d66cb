use std::rc::Rc;

use crate::error::Result;
use crate::gl::{BufferHandle, BufferTarget, GlContext};

/// Immutable vertex data on the GPU (`GL_ARRAY_BUFFER`).
#[derive(Debug)]
pub struct VertexBuffer {
    ctx: Rc<GlContext>,
    handle: BufferHandle,
    byte_len: usize,
}

impl VertexBuffer {
    /// Uploads `data` as static draw content. The new buffer is left bound.
    pub fn new(ctx: &Rc<GlContext>, data: &[u8]) -> Result<Self> {
        let handle = super::create_static(ctx, BufferTarget::Array, data)?;
        log::debug!("vertex buffer {} created ({} bytes)", handle.get(), data.len());
        Ok(Self {
            ctx: Rc::clone(ctx),
            handle,
            byte_len: data.len(),
        })
    }

    /// Uploads a typed slice, e.g. `&[f32]` positions or `#[repr(C)]` vertices.
    pub fn from_slice<T: bytemuck::Pod>(ctx: &Rc<GlContext>, data: &[T]) -> Result<Self> {
        Self::new(ctx, bytemuck::cast_slice(data))
    }

    pub fn bind(&self) -> Result<()> {
        super::bind(&self.ctx, BufferTarget::Array, Some(self.handle))
    }

    pub fn unbind(&self) -> Result<()> {
        super::bind(&self.ctx, BufferTarget::Array, None)
    }

    pub fn handle(&self) -> BufferHandle {
        self.handle
    }

    pub fn byte_len(&self) -> usize {
        self.byte_len
    }
}

impl Drop for VertexBuffer {
    fn drop(&mut self) {
        log::trace!("vertex buffer {} released", self.handle.get());
        super::release(&self.ctx, self.handle);
    }
}
