//! GPU buffer objects.
//!
//! Each wrapper owns exactly one driver buffer name. Content is uploaded once
//! at construction as static draw data; there is no update path, so changing
//! the data means dropping the buffer and creating a new one.

mod index;
mod vertex;

pub use index::IndexBuffer;
pub use vertex::VertexBuffer;

use std::rc::Rc;

use crate::error::{GraphicsError, Result};
use crate::gl::{BufferHandle, BufferTarget, GlContext};
use crate::gl_call;

/// Allocates a buffer, binds it on `target` and uploads `data`.
///
/// The buffer is left bound on `target`.
fn create_static(
    ctx: &Rc<GlContext>,
    target: BufferTarget,
    data: &[u8],
) -> Result<BufferHandle> {
    let handle = gl_call!(ctx, |gl| gl.create_buffer())?.map_err(|reason| {
        GraphicsError::ResourceCreation {
            kind: "buffer",
            reason,
        }
    })?;

    let upload = gl_call!(ctx, |gl| gl.bind_buffer(target, Some(handle)))
        .and_then(|()| gl_call!(ctx, |gl| gl.buffer_data_static(target, data)));
    if let Err(e) = upload {
        release(ctx, handle);
        return Err(e);
    }

    ctx.record_buffer(target, Some(handle));
    Ok(handle)
}

fn bind(ctx: &GlContext, target: BufferTarget, handle: Option<BufferHandle>) -> Result<()> {
    gl_call!(ctx, |gl| gl.bind_buffer(target, handle))?;
    ctx.record_buffer(target, handle);
    Ok(())
}

fn release(ctx: &GlContext, handle: BufferHandle) {
    if let Err(e) = gl_call!(ctx, |gl| gl.delete_buffer(handle)) {
        log::error!("failed to delete buffer {}: {e}", handle.get());
    }
    ctx.forget_buffer(handle);
}
