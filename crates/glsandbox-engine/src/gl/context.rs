use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{GraphicsError, Result};

use super::{
    BufferHandle, BufferTarget, CallSite, GlBackend, GlErrorCode, ProgramHandle,
    VertexArrayHandle,
};

/// What a checked call does when the driver error queue is non-empty.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum ErrorPolicy {
    /// Return `GraphicsError::Driver` to the caller.
    #[default]
    Propagate,
    /// Log every code and carry on.
    Log,
    /// Log every code, then panic at the call site.
    Panic,
}

impl ErrorPolicy {
    /// `Panic` in debug builds, `Log` in release builds.
    pub fn for_build() -> Self {
        if cfg!(debug_assertions) {
            Self::Panic
        } else {
            Self::Log
        }
    }
}

/// Configuration of a [`GlContext`].
#[derive(Debug, Clone)]
pub struct ContextConfig {
    pub error_policy: ErrorPolicy,

    /// Upper bound on codes drained per check.
    ///
    /// A lost context may report `GL_CONTEXT_LOST` on every query.
    pub max_drained_errors: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            error_policy: ErrorPolicy::default(),
            max_drained_errors: 64,
        }
    }
}

/// Objects currently bound on each binding point, as issued through this context.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Bindings {
    pub array_buffer: Option<BufferHandle>,
    /// Element buffer of the bound vertex array (or of none, if none is bound).
    pub element_buffer: Option<BufferHandle>,
    pub vertex_array: Option<VertexArrayHandle>,
    pub program: Option<ProgramHandle>,
}

/// Session over one current GL context.
///
/// Every wrapper object holds an `Rc<GlContext>`; the type is deliberately
/// `!Send` because the underlying context is bound to one thread.
pub struct GlContext {
    backend: Box<dyn GlBackend>,
    config: ContextConfig,
    bindings: Cell<Bindings>,
    /// Element buffer per vertex array; `None` keys the unbound state.
    element_buffers: RefCell<HashMap<Option<VertexArrayHandle>, BufferHandle>>,
}

impl GlContext {
    pub fn new(backend: impl GlBackend + 'static, config: ContextConfig) -> Rc<Self> {
        log::debug!(
            "gl context created (backend: {}, policy: {:?})",
            backend.name(),
            config.error_policy
        );
        Rc::new(Self {
            backend: Box::new(backend),
            config,
            bindings: Cell::new(Bindings::default()),
            element_buffers: RefCell::new(HashMap::new()),
        })
    }

    pub fn backend(&self) -> &dyn GlBackend {
        self.backend.as_ref()
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Binding state as last set through the wrapper layer.
    pub fn bindings(&self) -> Bindings {
        self.bindings.get()
    }

    /// Drains stale codes so the next check only sees errors from its own call.
    pub fn clear_errors(&self) {
        let stale = self.drain_errors();
        if !stale.is_empty() {
            log::trace!("discarded {} stale GL error(s)", stale.len());
        }
    }

    /// Drains pending codes, logging each against `site`.
    ///
    /// Returns `false` if any error was pending.
    pub fn check_errors(&self, site: CallSite) -> bool {
        self.take_errors(site).is_empty()
    }

    /// Clears the error queue, runs `f`, then checks the queue and applies
    /// the configured [`ErrorPolicy`].
    pub fn call<T>(&self, site: CallSite, f: impl FnOnce(&dyn GlBackend) -> T) -> Result<T> {
        self.clear_errors();
        let out = f(self.backend.as_ref());
        let codes = self.take_errors(site);
        if codes.is_empty() {
            return Ok(out);
        }

        match self.config.error_policy {
            ErrorPolicy::Propagate => Err(GraphicsError::Driver { site, codes }),
            ErrorPolicy::Log => Ok(out),
            ErrorPolicy::Panic => panic!("GL error at {site}"),
        }
    }

    fn take_errors(&self, site: CallSite) -> Vec<GlErrorCode> {
        let codes = self.drain_errors();
        for code in &codes {
            log::error!("[OpenGL error] {code} at {site}");
        }
        codes
    }

    fn drain_errors(&self) -> Vec<GlErrorCode> {
        let mut codes = Vec::new();
        while codes.len() < self.config.max_drained_errors {
            match self.backend.get_error() {
                glow::NO_ERROR => break,
                code => codes.push(GlErrorCode(code)),
            }
        }
        codes
    }

    pub(crate) fn record_buffer(&self, target: BufferTarget, buffer: Option<BufferHandle>) {
        let mut b = self.bindings.get();
        match target {
            BufferTarget::Array => b.array_buffer = buffer,
            BufferTarget::ElementArray => {
                self.attach_element_buffer(b.vertex_array, buffer);
                b.element_buffer = buffer;
            }
        }
        self.bindings.set(b);
    }

    /// Binding a vertex array also switches to the element buffer it carries.
    pub(crate) fn record_vertex_array(&self, array: Option<VertexArrayHandle>) {
        let mut b = self.bindings.get();
        b.vertex_array = array;
        b.element_buffer = self.element_buffers.borrow().get(&array).copied();
        self.bindings.set(b);
    }

    fn attach_element_buffer(
        &self,
        array: Option<VertexArrayHandle>,
        buffer: Option<BufferHandle>,
    ) {
        let mut attached = self.element_buffers.borrow_mut();
        match buffer {
            Some(buffer) => attached.insert(array, buffer),
            None => attached.remove(&array),
        };
    }

    pub(crate) fn record_program(&self, program: Option<ProgramHandle>) {
        let mut b = self.bindings.get();
        b.program = program;
        self.bindings.set(b);
    }

    /// Forgets a deleted object, mirroring the driver's unbind-on-delete.
    pub(crate) fn forget_buffer(&self, buffer: BufferHandle) {
        let mut b = self.bindings.get();
        if b.array_buffer == Some(buffer) {
            b.array_buffer = None;
        }
        if b.element_buffer == Some(buffer) {
            self.attach_element_buffer(b.vertex_array, None);
            b.element_buffer = None;
        }
        self.bindings.set(b);
    }

    pub(crate) fn forget_vertex_array(&self, array: VertexArrayHandle) {
        self.attach_element_buffer(Some(array), None);
        if self.bindings.get().vertex_array == Some(array) {
            self.record_vertex_array(None);
        }
    }
}

impl std::fmt::Debug for GlContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlContext")
            .field("backend", &self.backend.name())
            .field("config", &self.config)
            .field("bindings", &self.bindings.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::DummyBackend;
    use crate::gl_call;

    fn ctx_with(policy: ErrorPolicy) -> (DummyBackend, Rc<GlContext>) {
        let dummy = DummyBackend::new();
        let ctx = GlContext::new(
            dummy.clone(),
            ContextConfig {
                error_policy: policy,
                ..ContextConfig::default()
            },
        );
        (dummy, ctx)
    }

    #[test]
    fn clean_call_returns_value() {
        let (_dummy, ctx) = ctx_with(ErrorPolicy::Propagate);
        let handle = gl_call!(ctx, |gl| gl.create_buffer()).unwrap();
        assert!(handle.is_ok());
    }

    #[test]
    fn stale_errors_are_not_attributed_to_next_call() {
        let (dummy, ctx) = ctx_with(ErrorPolicy::Propagate);
        dummy.push_error(glow::INVALID_ENUM);
        assert!(gl_call!(ctx, |gl| gl.clear_color([0.0; 4])).is_ok());
    }

    #[test]
    fn propagate_returns_every_pending_code_with_site() {
        let (dummy, ctx) = ctx_with(ErrorPolicy::Propagate);
        let err = gl_call!(ctx, |gl| {
            dummy.push_error(glow::INVALID_VALUE);
            dummy.push_error(glow::INVALID_OPERATION);
            gl.clear_color_buffer()
        })
        .unwrap_err();

        match err {
            GraphicsError::Driver { site, codes } => {
                assert_eq!(
                    codes,
                    vec![GlErrorCode::INVALID_VALUE, GlErrorCode::INVALID_OPERATION]
                );
                assert!(site.file.ends_with("context.rs"));
                assert!(site.expr.contains("clear_color_buffer"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn log_policy_continues() {
        let (dummy, ctx) = ctx_with(ErrorPolicy::Log);
        let out = gl_call!(ctx, |gl| {
            dummy.push_error(glow::INVALID_ENUM);
            gl.get_error()
        });
        // The closure itself popped the injected code.
        assert_eq!(out.unwrap(), glow::INVALID_ENUM);

        let out = gl_call!(ctx, |_gl| dummy.push_error(glow::OUT_OF_MEMORY));
        assert!(out.is_ok());
    }

    #[test]
    #[should_panic(expected = "GL error at")]
    fn panic_policy_breaks_at_call_site() {
        let (dummy, ctx) = ctx_with(ErrorPolicy::Panic);
        let _ = gl_call!(ctx, |_gl| dummy.push_error(glow::INVALID_OPERATION));
    }

    #[test]
    fn check_errors_reports_pending_queue() {
        let (dummy, ctx) = ctx_with(ErrorPolicy::Propagate);
        let site = CallSite::new("manual", file!(), line!());
        assert!(ctx.check_errors(site));
        dummy.push_error(glow::INVALID_ENUM);
        assert!(!ctx.check_errors(site));
        assert!(ctx.check_errors(site));
    }

    #[test]
    fn element_buffer_binding_belongs_to_vertex_array() {
        let (dummy, ctx) = ctx_with(ErrorPolicy::Propagate);
        let ib = dummy.create_buffer().unwrap();
        let first = dummy.create_vertex_array().unwrap();
        let second = dummy.create_vertex_array().unwrap();

        ctx.record_vertex_array(Some(first));
        ctx.record_buffer(BufferTarget::ElementArray, Some(ib));
        assert_eq!(ctx.bindings().element_buffer, Some(ib));

        ctx.record_vertex_array(Some(second));
        assert_eq!(ctx.bindings().element_buffer, None);

        ctx.record_vertex_array(Some(first));
        assert_eq!(ctx.bindings().element_buffer, Some(ib));

        ctx.forget_vertex_array(first);
        assert_eq!(ctx.bindings(), Bindings::default());
    }

    #[test]
    fn element_buffer_bound_without_vertex_array_stays_loose() {
        let (dummy, ctx) = ctx_with(ErrorPolicy::Propagate);
        let ib = dummy.create_buffer().unwrap();
        let va = dummy.create_vertex_array().unwrap();

        ctx.record_buffer(BufferTarget::ElementArray, Some(ib));
        ctx.record_vertex_array(Some(va));
        assert_eq!(ctx.bindings().element_buffer, None);

        ctx.record_vertex_array(None);
        assert_eq!(ctx.bindings().element_buffer, Some(ib));
    }

    #[test]
    fn drain_is_bounded() {
        let (dummy, ctx) = ctx_with(ErrorPolicy::Propagate);
        for _ in 0..100 {
            dummy.push_error(glow::CONTEXT_LOST);
        }
        let err = gl_call!(ctx, |gl| gl.clear_color_buffer());
        // Stale codes beyond the cap leak into the first check.
        match err.unwrap_err() {
            GraphicsError::Driver { codes, .. } => assert_eq!(codes.len(), 36),
            other => panic!("unexpected error: {other}"),
        }
    }
}
