use std::rc::Rc;

use crate::error::Result;
use crate::gl::{BufferHandle, BufferTarget, GlContext};

/// Immutable `u32` draw indices on the GPU (`GL_ELEMENT_ARRAY_BUFFER`).
///
/// Indices are always 4-byte unsigned integers; draws issued through
/// [`Renderer`](crate::render::Renderer) rely on that.
#[derive(Debug)]
pub struct IndexBuffer {
    ctx: Rc<GlContext>,
    handle: BufferHandle,
    count: u32,
}

impl IndexBuffer {
    /// Uploads `indices` as static draw content. The new buffer is left bound.
    pub fn new(ctx: &Rc<GlContext>, indices: &[u32]) -> Result<Self> {
        let bytes: &[u8] = bytemuck::cast_slice(indices);
        let handle = super::create_static(ctx, BufferTarget::ElementArray, bytes)?;
        log::debug!(
            "index buffer {} created ({} indices)",
            handle.get(),
            indices.len()
        );
        Ok(Self {
            ctx: Rc::clone(ctx),
            handle,
            count: indices.len() as u32,
        })
    }

    pub fn bind(&self) -> Result<()> {
        super::bind(&self.ctx, BufferTarget::ElementArray, Some(self.handle))
    }

    pub fn unbind(&self) -> Result<()> {
        super::bind(&self.ctx, BufferTarget::ElementArray, None)
    }

    /// Number of indices, as passed to the draw call.
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn handle(&self) -> BufferHandle {
        self.handle
    }
}

impl Drop for IndexBuffer {
    fn drop(&mut self) {
        log::trace!("index buffer {} released", self.handle.get());
        super::release(&self.ctx, self.handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::{ContextConfig, DummyBackend};

    #[test]
    fn count_is_number_of_indices() {
        let dummy = DummyBackend::new();
        let ctx = GlContext::new(dummy.clone(), ContextConfig::default());

        let ib = IndexBuffer::new(&ctx, &[0, 1, 2, 2, 3, 0]).unwrap();
        assert_eq!(ib.count(), 6);

        let other = IndexBuffer::new(&ctx, &[9, 9, 9, 41, 7, 1_000_000]).unwrap();
        assert_eq!(other.count(), 6);
        assert_eq!(dummy.buffer_contents(other.handle()).unwrap().len(), 24);
    }

    #[test]
    fn binds_element_target() {
        let dummy = DummyBackend::new();
        let ctx = GlContext::new(dummy.clone(), ContextConfig::default());

        let ib = IndexBuffer::new(&ctx, &[0, 1, 2]).unwrap();
        assert_eq!(ctx.bindings().element_buffer, Some(ib.handle()));
        assert_eq!(ctx.bindings().array_buffer, None);

        ib.unbind().unwrap();
        assert_eq!(dummy.current_buffer(BufferTarget::ElementArray), None);
    }
}
