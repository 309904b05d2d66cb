use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{GraphicsError, Result};
use crate::gl::{GlContext, ProgramHandle, ShaderHandle, ShaderStage};
use crate::gl_call;

use super::source::ShaderProgramSource;
use super::uniform::{UniformCache, UniformSlot};

/// A linked vertex + fragment program.
///
/// Construction either yields a linked program or fails; there is no
/// half-built state. Uniform setters act on whichever program is current, so
/// call [`bind`](Self::bind) first.
#[derive(Debug)]
pub struct Shader {
    ctx: Rc<GlContext>,
    handle: ProgramHandle,
    path: Option<PathBuf>,
    uniforms: UniformCache,
}

impl Shader {
    /// Reads a combined `#shader` file, then compiles and links it.
    pub fn from_file(ctx: &Rc<GlContext>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = ShaderProgramSource::from_file(path)?;
        let mut shader = Self::from_source(ctx, &source)?;
        log::debug!("shader program {} loaded from {}", shader.handle.get(), path.display());
        shader.path = Some(path.to_path_buf());
        Ok(shader)
    }

    /// Compiles both stages and links them.
    ///
    /// A stage that fails to compile aborts construction before linking.
    pub fn from_source(ctx: &Rc<GlContext>, source: &ShaderProgramSource) -> Result<Self> {
        let handle = create_program(ctx, source)?;
        Ok(Self {
            ctx: Rc::clone(ctx),
            handle,
            path: None,
            uniforms: UniformCache::default(),
        })
    }

    pub fn bind(&self) -> Result<()> {
        gl_call!(self.ctx, |gl| gl.use_program(Some(self.handle)))?;
        self.ctx.record_program(Some(self.handle));
        Ok(())
    }

    pub fn unbind(&self) -> Result<()> {
        gl_call!(self.ctx, |gl| gl.use_program(None))?;
        self.ctx.record_program(None);
        Ok(())
    }

    /// Resolves `name`, querying the driver only on the first lookup.
    pub fn uniform_location(&mut self, name: &str) -> Result<UniformSlot> {
        let (ctx, handle) = (&self.ctx, self.handle);
        self.uniforms
            .resolve(name, || gl_call!(ctx, |gl| gl.get_uniform_location(handle, name)))
    }

    pub fn set_uniform_1i(&mut self, name: &str, value: i32) -> Result<()> {
        let location = self.uniform_location(name)?.location();
        gl_call!(self.ctx, |gl| gl.uniform_1_i32(location, value))
    }

    pub fn set_uniform_4f(&mut self, name: &str, v0: f32, v1: f32, v2: f32, v3: f32) -> Result<()> {
        let location = self.uniform_location(name)?.location();
        gl_call!(self.ctx, |gl| gl.uniform_4_f32(location, [v0, v1, v2, v3]))
    }

    /// Uploads a column-major matrix.
    pub fn set_uniform_mat4(&mut self, name: &str, matrix: &glam::Mat4) -> Result<()> {
        let location = self.uniform_location(name)?.location();
        let columns = matrix.to_cols_array();
        gl_call!(self.ctx, |gl| gl.uniform_matrix_4_f32(location, &columns))
    }

    pub fn handle(&self) -> ProgramHandle {
        self.handle
    }

    /// File the program was loaded from, if any. Diagnostic only.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of distinct uniform names resolved so far.
    pub fn cached_uniforms(&self) -> usize {
        self.uniforms.len()
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        let handle = self.handle;
        // A current program is only flagged; the driver frees it once replaced.
        if let Err(e) = gl_call!(self.ctx, |gl| gl.delete_program(handle)) {
            log::error!("failed to delete shader program {}: {e}", handle.get());
        }
        log::trace!("shader program {} released", handle.get());
    }
}

fn create_program(ctx: &GlContext, source: &ShaderProgramSource) -> Result<ProgramHandle> {
    let program = gl_call!(ctx, |gl| gl.create_program())?.map_err(|reason| {
        GraphicsError::ResourceCreation {
            kind: "shader program",
            reason,
        }
    })?;

    match build_program(ctx, program, source) {
        Ok(()) => Ok(program),
        Err(e) => {
            if let Err(del) = gl_call!(ctx, |gl| gl.delete_program(program)) {
                log::error!("failed to delete shader program {}: {del}", program.get());
            }
            Err(e)
        }
    }
}

fn build_program(ctx: &GlContext, program: ProgramHandle, source: &ShaderProgramSource) -> Result<()> {
    let vs = compile_stage(ctx, ShaderStage::Vertex, &source.vertex)?;
    let fs = match compile_stage(ctx, ShaderStage::Fragment, &source.fragment) {
        Ok(fs) => fs,
        Err(e) => {
            delete_stage(ctx, vs);
            return Err(e);
        }
    };

    let linked = link_stages(ctx, program, [vs, fs]);

    // Stage objects are not needed once the program is linked (or has failed to).
    delete_stage(ctx, vs);
    delete_stage(ctx, fs);
    linked
}

fn compile_stage(ctx: &GlContext, stage: ShaderStage, source: &str) -> Result<ShaderHandle> {
    let shader = gl_call!(ctx, |gl| gl.create_shader(stage))?.map_err(|reason| {
        GraphicsError::ResourceCreation {
            kind: "shader",
            reason,
        }
    })?;

    let compiled = gl_call!(ctx, |gl| gl.shader_source(shader, source))
        .and_then(|()| gl_call!(ctx, |gl| gl.compile_shader(shader)))
        .and_then(|()| gl_call!(ctx, |gl| gl.get_shader_compile_status(shader)));

    let failure = match compiled {
        Ok(true) => return Ok(shader),
        Ok(false) => {
            let log = gl_call!(ctx, |gl| gl.get_shader_info_log(shader)).unwrap_or_default();
            log::error!("failed to compile {stage} shader!\n{log}");
            GraphicsError::ShaderCompile { stage, log }
        }
        Err(e) => e,
    };

    delete_stage(ctx, shader);
    Err(failure)
}

fn link_stages(ctx: &GlContext, program: ProgramHandle, stages: [ShaderHandle; 2]) -> Result<()> {
    for shader in stages {
        gl_call!(ctx, |gl| gl.attach_shader(program, shader))?;
    }
    gl_call!(ctx, |gl| gl.link_program(program))?;

    let result = if gl_call!(ctx, |gl| gl.get_program_link_status(program))? {
        Ok(())
    } else {
        let log = gl_call!(ctx, |gl| gl.get_program_info_log(program))?;
        log::error!("failed to link shader program {}!\n{log}", program.get());
        Err(GraphicsError::ProgramLink { log })
    };

    for shader in stages {
        gl_call!(ctx, |gl| gl.detach_shader(program, shader))?;
    }
    result
}

fn delete_stage(ctx: &GlContext, shader: ShaderHandle) {
    if let Err(e) = gl_call!(ctx, |gl| gl.delete_shader(shader)) {
        log::error!("failed to delete shader {}: {e}", shader.get());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::{ContextConfig, DummyBackend, UniformLocation, UniformValue};

    fn source() -> ShaderProgramSource {
        ShaderProgramSource {
            vertex: "void main() {}\n".to_string(),
            fragment: "void main() {}\n".to_string(),
        }
    }

    fn setup(uniforms: &[&str]) -> (DummyBackend, Rc<GlContext>) {
        let dummy = DummyBackend::new().with_uniforms(uniforms);
        let ctx = GlContext::new(dummy.clone(), ContextConfig::default());
        (dummy, ctx)
    }

    #[test]
    fn links_and_releases_stage_objects() {
        let (dummy, ctx) = setup(&[]);
        let shader = Shader::from_source(&ctx, &source()).unwrap();

        assert_eq!(dummy.live_programs(), 1);
        assert_eq!(dummy.live_shaders(), 0);
        assert!(dummy.attached_shaders(shader.handle()).is_empty());
        assert_eq!(dummy.call_count("link_program"), 1);
        assert!(shader.path().is_none());
    }

    #[test]
    fn compile_failure_skips_link() {
        let (dummy, ctx) = setup(&[]);
        dummy.fail_compile(ShaderStage::Fragment, "0:3: 'colr' : undeclared identifier");

        let err = Shader::from_source(&ctx, &source()).unwrap_err();
        match err {
            GraphicsError::ShaderCompile { stage, log } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(log.contains("undeclared identifier"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(dummy.call_count("link_program"), 0);
        assert_eq!(dummy.live_shaders(), 0);
        assert_eq!(dummy.live_programs(), 0);
    }

    #[test]
    fn empty_source_fails_to_compile() {
        let (_dummy, ctx) = setup(&[]);
        let err = Shader::from_source(&ctx, &ShaderProgramSource::default()).unwrap_err();
        assert!(matches!(
            err,
            GraphicsError::ShaderCompile { stage: ShaderStage::Vertex, .. }
        ));
    }

    #[test]
    fn link_failure_is_reported() {
        let (dummy, ctx) = setup(&[]);
        dummy.fail_link("varying mismatch");

        let err = Shader::from_source(&ctx, &source()).unwrap_err();
        assert!(matches!(err, GraphicsError::ProgramLink { ref log } if log == "varying mismatch"));
        assert_eq!(dummy.live_programs(), 0);
        assert_eq!(dummy.live_shaders(), 0);
    }

    #[test]
    fn uniform_location_queries_driver_once() {
        let (dummy, ctx) = setup(&["u_Color"]);
        let mut shader = Shader::from_source(&ctx, &source()).unwrap();

        let first = shader.uniform_location("u_Color").unwrap();
        let second = shader.uniform_location("u_Color").unwrap();
        assert_eq!(first, UniformSlot::Found(UniformLocation(0)));
        assert_eq!(first, second);
        assert_eq!(dummy.call_count("get_uniform_location"), 1);
    }

    #[test]
    fn missing_uniform_is_cached_as_not_found() {
        let (dummy, ctx) = setup(&["u_Color"]);
        let mut shader = Shader::from_source(&ctx, &source()).unwrap();

        assert_eq!(shader.uniform_location("u_Nope").unwrap().raw(), -1);
        assert_eq!(shader.uniform_location("u_Nope").unwrap().raw(), -1);
        assert_eq!(dummy.call_count("get_uniform_location"), 1);
        assert_eq!(shader.cached_uniforms(), 1);
    }

    #[test]
    fn setters_write_to_bound_program() {
        let (dummy, ctx) = setup(&["u_Color", "u_Texture", "u_MVP"]);
        let mut shader = Shader::from_source(&ctx, &source()).unwrap();
        shader.bind().unwrap();

        shader.set_uniform_4f("u_Color", 0.8, 0.3, 0.8, 1.0).unwrap();
        shader.set_uniform_1i("u_Texture", 0).unwrap();
        let mvp = glam::Mat4::orthographic_rh_gl(-2.0, 2.0, -1.5, 1.5, -1.0, 1.0);
        shader.set_uniform_mat4("u_MVP", &mvp).unwrap();

        let h = shader.handle();
        assert_eq!(
            dummy.uniform_value(h, "u_Color"),
            Some(UniformValue::Vec4([0.8, 0.3, 0.8, 1.0]))
        );
        assert_eq!(dummy.uniform_value(h, "u_Texture"), Some(UniformValue::Int(0)));
        assert_eq!(
            dummy.uniform_value(h, "u_MVP"),
            Some(UniformValue::Mat4(mvp.to_cols_array()))
        );
    }

    #[test]
    fn setting_missing_uniform_is_silent_noop() {
        let (dummy, ctx) = setup(&[]);
        let mut shader = Shader::from_source(&ctx, &source()).unwrap();
        shader.bind().unwrap();

        shader.set_uniform_1i("u_Missing", 3).unwrap();
        shader.set_uniform_1i("u_Missing", 4).unwrap();
        assert_eq!(dummy.call_count("uniform_1_i32"), 2);
        assert_eq!(dummy.call_count("get_uniform_location"), 1);
        assert!(dummy.pending_errors().is_empty());
    }

    #[test]
    fn setter_without_bound_program_is_driver_error() {
        let (_dummy, ctx) = setup(&["u_Color"]);
        let mut shader = Shader::from_source(&ctx, &source()).unwrap();

        let err = shader.set_uniform_4f("u_Color", 1.0, 0.0, 0.0, 1.0).unwrap_err();
        assert!(matches!(err, GraphicsError::Driver { .. }));
    }

    #[test]
    fn drop_deletes_unbound_program() {
        let (dummy, ctx) = setup(&[]);
        let shader = Shader::from_source(&ctx, &source()).unwrap();

        drop(shader);
        assert_eq!(dummy.live_programs(), 0);
        assert_eq!(dummy.call_count("delete_program"), 1);
    }

    #[test]
    fn dropping_current_program_leaves_it_current_until_replaced() {
        let (dummy, ctx) = setup(&[]);
        let shader = Shader::from_source(&ctx, &source()).unwrap();
        shader.bind().unwrap();
        let handle = shader.handle();

        drop(shader);
        assert_eq!(dummy.current_program(), Some(handle.get()));
        assert_eq!(ctx.bindings().program, Some(handle));
        assert_eq!(dummy.live_programs(), 1);

        let next = Shader::from_source(&ctx, &source()).unwrap();
        next.bind().unwrap();
        assert_eq!(dummy.live_programs(), 1);
        assert_eq!(ctx.bindings().program, Some(next.handle()));
        assert!(dummy.pending_errors().is_empty());
    }

    #[test]
    fn from_file_remembers_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Basic.shader");
        std::fs::write(&path, "#shader vertex\nv\n#shader fragment\nf\n").unwrap();

        let (dummy, ctx) = setup(&[]);
        let shader = Shader::from_file(&ctx, &path).unwrap();
        assert_eq!(shader.path(), Some(path.as_path()));
        assert_eq!(
            dummy.shader_sources().len(),
            0,
            "stage objects are deleted after linking"
        );
    }

    #[test]
    fn from_file_missing_is_io_error_before_compiling() {
        let (dummy, ctx) = setup(&[]);
        let err = Shader::from_file(&ctx, "nope/Basic.shader").unwrap_err();
        assert!(matches!(err, GraphicsError::ShaderSourceIo { .. }));
        assert_eq!(dummy.call_count("create_program"), 0);
    }
}
