use std::fmt;

/// Where a checked driver call was issued from.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CallSite {
    /// Source text of the call expression.
    pub expr: &'static str,
    pub file: &'static str,
    pub line: u32,
}

impl CallSite {
    pub const fn new(expr: &'static str, file: &'static str, line: u32) -> Self {
        Self { expr, file, line }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` ({}:{})", self.expr, self.file, self.line)
    }
}

/// Raw code popped from the driver error queue.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct GlErrorCode(pub u32);

impl GlErrorCode {
    pub const INVALID_ENUM: Self = Self(glow::INVALID_ENUM);
    pub const INVALID_VALUE: Self = Self(glow::INVALID_VALUE);
    pub const INVALID_OPERATION: Self = Self(glow::INVALID_OPERATION);
    pub const OUT_OF_MEMORY: Self = Self(glow::OUT_OF_MEMORY);

    /// Symbolic name of the code, when known.
    pub fn name(self) -> Option<&'static str> {
        Some(match self.0 {
            glow::INVALID_ENUM => "GL_INVALID_ENUM",
            glow::INVALID_VALUE => "GL_INVALID_VALUE",
            glow::INVALID_OPERATION => "GL_INVALID_OPERATION",
            glow::STACK_OVERFLOW => "GL_STACK_OVERFLOW",
            glow::STACK_UNDERFLOW => "GL_STACK_UNDERFLOW",
            glow::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
            glow::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
            glow::CONTEXT_LOST => "GL_CONTEXT_LOST",
            _ => return None,
        })
    }
}

impl fmt::Display for GlErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} (0x{:04X})", self.0),
            None => write!(f, "unknown GL error (0x{:04X})", self.0),
        }
    }
}

/// Issues one driver call through [`GlContext::call`], attributing any
/// resulting driver error to the expression text and source location.
///
/// ```ignore
/// gl_call!(ctx, |gl| gl.bind_buffer(BufferTarget::Array, Some(handle)))?;
/// ```
///
/// [`GlContext::call`]: crate::gl::GlContext::call
#[macro_export]
macro_rules! gl_call {
    ($ctx:expr, |$gl:ident| $body:expr) => {
        $ctx.call(
            $crate::gl::CallSite::new(stringify!($body), file!(), line!()),
            |$gl: &dyn $crate::gl::GlBackend| $body,
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_have_names() {
        assert_eq!(
            GlErrorCode::INVALID_OPERATION.to_string(),
            "GL_INVALID_OPERATION (0x0502)"
        );
        assert_eq!(GlErrorCode(0x0505).name(), Some("GL_OUT_OF_MEMORY"));
    }

    #[test]
    fn unknown_code_keeps_raw_value() {
        assert_eq!(GlErrorCode(0x1234).to_string(), "unknown GL error (0x1234)");
    }

    #[test]
    fn call_site_formats_expression_and_location() {
        let site = CallSite::new("gl.link_program(p)", "src/shader/program.rs", 88);
        assert_eq!(site.to_string(), "`gl.link_program(p)` (src/shader/program.rs:88)");
    }
}
