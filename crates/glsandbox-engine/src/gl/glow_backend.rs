use glow::HasContext;

use super::{
    AttribPointer, BufferHandle, BufferTarget, GlBackend, ProgramHandle, ShaderHandle,
    ShaderStage, UniformLocation, VertexArrayHandle,
};

/// [`GlBackend`] over a loaded `glow::Context`.
///
/// Every method is a direct driver call. The caller guarantees that the
/// context is current on this thread for as long as the backend is used;
/// that is the safety contract of every `unsafe` block below.
pub struct GlowBackend {
    gl: glow::Context,
}

impl GlowBackend {
    pub fn new(gl: glow::Context) -> Self {
        let version = gl.version();
        log::info!(
            "OpenGL {}.{} ({})",
            version.major,
            version.minor,
            version.vendor_info
        );
        Self { gl }
    }
}

fn buffer(h: BufferHandle) -> glow::NativeBuffer {
    glow::NativeBuffer(h.0)
}

fn vertex_array(h: VertexArrayHandle) -> glow::NativeVertexArray {
    glow::NativeVertexArray(h.0)
}

fn shader(h: ShaderHandle) -> glow::NativeShader {
    glow::NativeShader(h.0)
}

fn program(h: ProgramHandle) -> glow::NativeProgram {
    glow::NativeProgram(h.0)
}

fn location(l: UniformLocation) -> glow::NativeUniformLocation {
    glow::NativeUniformLocation(l.0)
}

impl GlBackend for GlowBackend {
    fn name(&self) -> &'static str {
        "glow"
    }

    fn get_error(&self) -> u32 {
        unsafe { self.gl.get_error() }
    }

    fn create_buffer(&self) -> Result<BufferHandle, String> {
        unsafe { self.gl.create_buffer() }.map(|b| BufferHandle(b.0))
    }

    fn delete_buffer(&self, b: BufferHandle) {
        unsafe { self.gl.delete_buffer(buffer(b)) }
    }

    fn bind_buffer(&self, target: BufferTarget, b: Option<BufferHandle>) {
        unsafe { self.gl.bind_buffer(target.to_gl(), b.map(buffer)) }
    }

    fn buffer_data_static(&self, target: BufferTarget, data: &[u8]) {
        unsafe {
            self.gl
                .buffer_data_u8_slice(target.to_gl(), data, glow::STATIC_DRAW)
        }
    }

    fn create_vertex_array(&self) -> Result<VertexArrayHandle, String> {
        unsafe { self.gl.create_vertex_array() }.map(|va| VertexArrayHandle(va.0))
    }

    fn delete_vertex_array(&self, va: VertexArrayHandle) {
        unsafe { self.gl.delete_vertex_array(vertex_array(va)) }
    }

    fn bind_vertex_array(&self, va: Option<VertexArrayHandle>) {
        unsafe { self.gl.bind_vertex_array(va.map(vertex_array)) }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(index) }
    }

    fn vertex_attrib_pointer(&self, p: AttribPointer) {
        unsafe {
            self.gl.vertex_attrib_pointer_f32(
                p.index,
                p.components,
                p.scalar.to_gl(),
                p.normalized,
                p.stride,
                p.offset,
            )
        }
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderHandle, String> {
        unsafe { self.gl.create_shader(stage.to_gl()) }.map(|s| ShaderHandle(s.0))
    }

    fn shader_source(&self, s: ShaderHandle, source: &str) {
        unsafe { self.gl.shader_source(shader(s), source) }
    }

    fn compile_shader(&self, s: ShaderHandle) {
        unsafe { self.gl.compile_shader(shader(s)) }
    }

    fn get_shader_compile_status(&self, s: ShaderHandle) -> bool {
        unsafe { self.gl.get_shader_compile_status(shader(s)) }
    }

    fn get_shader_info_log(&self, s: ShaderHandle) -> String {
        unsafe { self.gl.get_shader_info_log(shader(s)) }
    }

    fn delete_shader(&self, s: ShaderHandle) {
        unsafe { self.gl.delete_shader(shader(s)) }
    }

    fn create_program(&self) -> Result<ProgramHandle, String> {
        unsafe { self.gl.create_program() }.map(|p| ProgramHandle(p.0))
    }

    fn attach_shader(&self, p: ProgramHandle, s: ShaderHandle) {
        unsafe { self.gl.attach_shader(program(p), shader(s)) }
    }

    fn detach_shader(&self, p: ProgramHandle, s: ShaderHandle) {
        unsafe { self.gl.detach_shader(program(p), shader(s)) }
    }

    fn link_program(&self, p: ProgramHandle) {
        unsafe { self.gl.link_program(program(p)) }
    }

    fn get_program_link_status(&self, p: ProgramHandle) -> bool {
        unsafe { self.gl.get_program_link_status(program(p)) }
    }

    fn get_program_info_log(&self, p: ProgramHandle) -> String {
        unsafe { self.gl.get_program_info_log(program(p)) }
    }

    fn use_program(&self, p: Option<ProgramHandle>) {
        unsafe { self.gl.use_program(p.map(program)) }
    }

    fn delete_program(&self, p: ProgramHandle) {
        unsafe { self.gl.delete_program(program(p)) }
    }

    fn get_uniform_location(&self, p: ProgramHandle, name: &str) -> Option<UniformLocation> {
        unsafe { self.gl.get_uniform_location(program(p), name) }.map(|l| UniformLocation(l.0))
    }

    fn uniform_1_i32(&self, l: Option<UniformLocation>, value: i32) {
        unsafe { self.gl.uniform_1_i32(l.map(location).as_ref(), value) }
    }

    fn uniform_4_f32(&self, l: Option<UniformLocation>, [x, y, z, w]: [f32; 4]) {
        unsafe { self.gl.uniform_4_f32(l.map(location).as_ref(), x, y, z, w) }
    }

    fn uniform_matrix_4_f32(&self, l: Option<UniformLocation>, value: &[f32; 16]) {
        unsafe {
            self.gl
                .uniform_matrix_4_f32_slice(l.map(location).as_ref(), false, value)
        }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) }
    }

    fn clear_color(&self, [r, g, b, a]: [f32; 4]) {
        unsafe { self.gl.clear_color(r, g, b, a) }
    }

    fn clear_color_buffer(&self) {
        unsafe { self.gl.clear(glow::COLOR_BUFFER_BIT) }
    }

    fn draw_triangles_u32(&self, count: i32, offset: i32) {
        unsafe {
            self.gl
                .draw_elements(glow::TRIANGLES, count, glow::UNSIGNED_INT, offset)
        }
    }
}
