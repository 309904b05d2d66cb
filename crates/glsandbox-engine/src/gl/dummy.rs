//! Recording GL driver for tests and headless runs.
//!
//! `DummyBackend` performs no rendering. It hands out object names, stores
//! what the wrapper layer uploads and configures, and pushes the error codes a
//! core-profile driver would report for misuse (binding unknown names,
//! configuring attributes without a vertex array, drawing with nothing bound).
//! The element buffer binding is vertex array state, and a program deleted
//! while current stays current until it is replaced.
//! Clones share state, so a test can keep one clone for inspection while the
//! context owns another.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::num::NonZeroU32;
use std::rc::Rc;

use super::{
    AttribPointer, BufferHandle, BufferTarget, GlBackend, ProgramHandle, ShaderHandle,
    ShaderStage, UniformLocation, VertexArrayHandle,
};

/// Last value written to a uniform slot.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Vec4([f32; 4]),
    Mat4([f32; 16]),
}

/// One recorded indexed draw.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DrawCall {
    pub count: i32,
    pub offset: i32,
    pub program: ProgramHandle,
    pub vertex_array: VertexArrayHandle,
    pub element_buffer: BufferHandle,
}

#[derive(Debug, Default)]
struct VertexArrayState {
    enabled: BTreeSet<u32>,
    pointers: BTreeMap<u32, AttribPointer>,
    element_buffer: Option<u32>,
}

#[derive(Debug)]
struct ShaderState {
    stage: ShaderStage,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Debug, Default)]
struct ProgramState {
    attached: BTreeSet<u32>,
    linked: bool,
    delete_pending: bool,
    log: String,
    uniforms: HashMap<u32, UniformValue>,
}

#[derive(Debug, Default)]
struct State {
    next_name: u32,
    errors: VecDeque<u32>,
    calls: HashMap<&'static str, usize>,

    buffers: HashMap<u32, Vec<u8>>,
    array_buffer: Option<u32>,
    /// Element binding while no vertex array is bound.
    loose_element_buffer: Option<u32>,

    vertex_arrays: HashMap<u32, VertexArrayState>,
    vertex_array: Option<u32>,

    shaders: HashMap<u32, ShaderState>,
    programs: HashMap<u32, ProgramState>,
    program: Option<u32>,

    declared_uniforms: Vec<String>,
    compile_failures: HashMap<ShaderStage, String>,
    link_failure: Option<String>,

    viewport: [i32; 4],
    clear_color: [f32; 4],
    clears: usize,
    draws: Vec<DrawCall>,
}

impl State {
    fn alloc(&mut self) -> NonZeroU32 {
        self.next_name += 1;
        // Names start at 1; 0 is the driver's "no object".
        NonZeroU32::new(self.next_name).unwrap_or(NonZeroU32::MIN)
    }

    fn error(&mut self, code: u32) {
        self.errors.push_back(code);
    }

    fn element_buffer(&self) -> Option<u32> {
        match self.vertex_array {
            Some(va) => self.vertex_arrays.get(&va).and_then(|v| v.element_buffer),
            None => self.loose_element_buffer,
        }
    }

    fn set_element_buffer(&mut self, buffer: Option<u32>) {
        match self.vertex_array {
            Some(va) => {
                if let Some(v) = self.vertex_arrays.get_mut(&va) {
                    v.element_buffer = buffer;
                }
            }
            None => self.loose_element_buffer = buffer,
        }
    }

    fn uniform_target(&mut self, location: Option<UniformLocation>) -> Option<(u32, u32)> {
        let location = location?;
        match self.program {
            Some(program) => Some((program, location.0)),
            None => {
                self.error(glow::INVALID_OPERATION);
                None
            }
        }
    }

    fn set_uniform(&mut self, location: Option<UniformLocation>, value: UniformValue) {
        if let Some((program, slot)) = self.uniform_target(location) {
            if let Some(p) = self.programs.get_mut(&program) {
                p.uniforms.insert(slot, value);
            }
        }
    }
}

/// Shared-state recording backend.
#[derive(Debug, Clone, Default)]
pub struct DummyBackend {
    state: Rc<RefCell<State>>,
}

impl DummyBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares uniform names every linked program exposes, in location order.
    pub fn with_uniforms(self, names: &[&str]) -> Self {
        self.state
            .borrow_mut()
            .declared_uniforms
            .extend(names.iter().map(|n| n.to_string()));
        self
    }

    /// Makes the next compile of `stage` fail with `log`.
    pub fn fail_compile(&self, stage: ShaderStage, log: &str) {
        self.state
            .borrow_mut()
            .compile_failures
            .insert(stage, log.to_string());
    }

    /// Makes the next link fail with `log`.
    pub fn fail_link(&self, log: &str) {
        self.state.borrow_mut().link_failure = Some(log.to_string());
    }

    /// Queues a raw error code, as if the driver had raised it.
    pub fn push_error(&self, code: u32) {
        self.state.borrow_mut().error(code);
    }

    pub fn pending_errors(&self) -> Vec<u32> {
        self.state.borrow().errors.iter().copied().collect()
    }

    /// Number of times the named entry point was called.
    pub fn call_count(&self, entry_point: &str) -> usize {
        self.state
            .borrow()
            .calls
            .get(entry_point)
            .copied()
            .unwrap_or(0)
    }

    pub fn buffer_contents(&self, buffer: BufferHandle) -> Option<Vec<u8>> {
        self.state.borrow().buffers.get(&buffer.get()).cloned()
    }

    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub fn live_vertex_arrays(&self) -> usize {
        self.state.borrow().vertex_arrays.len()
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    /// Programs that still exist, including one flagged for deletion while current.
    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn shader_sources(&self) -> Vec<(ShaderStage, String)> {
        let s = self.state.borrow();
        let mut names: Vec<_> = s.shaders.keys().copied().collect();
        names.sort_unstable();
        names
            .into_iter()
            .map(|n| (s.shaders[&n].stage, s.shaders[&n].source.clone()))
            .collect()
    }

    /// Attached stage objects of a program, by name.
    pub fn attached_shaders(&self, program: ProgramHandle) -> Vec<u32> {
        self.state
            .borrow()
            .programs
            .get(&program.get())
            .map(|p| p.attached.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn enabled_attribs(&self, array: VertexArrayHandle) -> Vec<u32> {
        self.state
            .borrow()
            .vertex_arrays
            .get(&array.get())
            .map(|va| va.enabled.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn attrib_pointers(&self, array: VertexArrayHandle) -> Vec<AttribPointer> {
        self.state
            .borrow()
            .vertex_arrays
            .get(&array.get())
            .map(|va| va.pointers.values().copied().collect())
            .unwrap_or_default()
    }

    pub fn uniform_value(&self, program: ProgramHandle, name: &str) -> Option<UniformValue> {
        let s = self.state.borrow();
        let slot = s.declared_uniforms.iter().position(|u| u == name)? as u32;
        s.programs.get(&program.get())?.uniforms.get(&slot).cloned()
    }

    pub fn current_program(&self) -> Option<u32> {
        self.state.borrow().program
    }

    pub fn current_vertex_array(&self) -> Option<u32> {
        self.state.borrow().vertex_array
    }

    pub fn current_buffer(&self, target: BufferTarget) -> Option<u32> {
        let s = self.state.borrow();
        match target {
            BufferTarget::Array => s.array_buffer,
            BufferTarget::ElementArray => s.element_buffer(),
        }
    }

    /// Element buffer attached to `array`, whether or not it is bound.
    pub fn element_buffer_of(&self, array: VertexArrayHandle) -> Option<u32> {
        self.state
            .borrow()
            .vertex_arrays
            .get(&array.get())
            .and_then(|va| va.element_buffer)
    }

    /// Last viewport as `[x, y, width, height]`.
    pub fn viewport(&self) -> [i32; 4] {
        self.state.borrow().viewport
    }

    pub fn last_clear_color(&self) -> [f32; 4] {
        self.state.borrow().clear_color
    }

    pub fn clear_count(&self) -> usize {
        self.state.borrow().clears
    }

    pub fn draws(&self) -> Vec<DrawCall> {
        self.state.borrow().draws.clone()
    }

    fn enter(&self, entry_point: &'static str) -> std::cell::RefMut<'_, State> {
        log::trace!("DummyBackend: {entry_point}");
        let mut s = self.state.borrow_mut();
        *s.calls.entry(entry_point).or_insert(0) += 1;
        s
    }
}

impl GlBackend for DummyBackend {
    fn name(&self) -> &'static str {
        "Dummy"
    }

    fn get_error(&self) -> u32 {
        self.state
            .borrow_mut()
            .errors
            .pop_front()
            .unwrap_or(glow::NO_ERROR)
    }

    fn create_buffer(&self) -> Result<BufferHandle, String> {
        let mut s = self.enter("create_buffer");
        let name = s.alloc();
        s.buffers.insert(name.get(), Vec::new());
        Ok(BufferHandle(name))
    }

    fn delete_buffer(&self, buffer: BufferHandle) {
        let mut s = self.enter("delete_buffer");
        let name = buffer.get();
        if s.buffers.remove(&name).is_some() {
            if s.array_buffer == Some(name) {
                s.array_buffer = None;
            }
            // Only the current bindings let go; other vertex arrays keep it.
            if s.element_buffer() == Some(name) {
                s.set_element_buffer(None);
            }
        }
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferHandle>) {
        let mut s = self.enter("bind_buffer");
        let name = buffer.map(BufferHandle::get);
        if let Some(n) = name {
            if !s.buffers.contains_key(&n) {
                s.error(glow::INVALID_OPERATION);
                return;
            }
        }
        match target {
            BufferTarget::Array => s.array_buffer = name,
            BufferTarget::ElementArray => s.set_element_buffer(name),
        }
    }

    fn buffer_data_static(&self, target: BufferTarget, data: &[u8]) {
        let mut s = self.enter("buffer_data");
        let bound = match target {
            BufferTarget::Array => s.array_buffer,
            BufferTarget::ElementArray => s.element_buffer(),
        };
        match bound {
            Some(name) => {
                s.buffers.insert(name, data.to_vec());
            }
            None => s.error(glow::INVALID_OPERATION),
        }
    }

    fn create_vertex_array(&self) -> Result<VertexArrayHandle, String> {
        let mut s = self.enter("create_vertex_array");
        let name = s.alloc();
        s.vertex_arrays.insert(name.get(), VertexArrayState::default());
        Ok(VertexArrayHandle(name))
    }

    fn delete_vertex_array(&self, array: VertexArrayHandle) {
        let mut s = self.enter("delete_vertex_array");
        if s.vertex_arrays.remove(&array.get()).is_some() && s.vertex_array == Some(array.get()) {
            s.vertex_array = None;
        }
    }

    fn bind_vertex_array(&self, array: Option<VertexArrayHandle>) {
        let mut s = self.enter("bind_vertex_array");
        let name = array.map(VertexArrayHandle::get);
        if let Some(n) = name {
            if !s.vertex_arrays.contains_key(&n) {
                s.error(glow::INVALID_OPERATION);
                return;
            }
        }
        s.vertex_array = name;
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        let mut s = self.enter("enable_vertex_attrib_array");
        let Some(current) = s.vertex_array else {
            s.error(glow::INVALID_OPERATION);
            return;
        };
        if let Some(va) = s.vertex_arrays.get_mut(&current) {
            va.enabled.insert(index);
        }
    }

    fn vertex_attrib_pointer(&self, pointer: AttribPointer) {
        let mut s = self.enter("vertex_attrib_pointer");
        let (Some(current), Some(_)) = (s.vertex_array, s.array_buffer) else {
            s.error(glow::INVALID_OPERATION);
            return;
        };
        if !(1..=4).contains(&pointer.components) || pointer.stride < 0 {
            s.error(glow::INVALID_VALUE);
            return;
        }
        if let Some(va) = s.vertex_arrays.get_mut(&current) {
            va.pointers.insert(pointer.index, pointer);
        }
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderHandle, String> {
        let mut s = self.enter("create_shader");
        let name = s.alloc();
        s.shaders.insert(
            name.get(),
            ShaderState {
                stage,
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        Ok(ShaderHandle(name))
    }

    fn shader_source(&self, shader: ShaderHandle, source: &str) {
        let mut s = self.enter("shader_source");
        match s.shaders.get_mut(&shader.get()) {
            Some(sh) => sh.source = source.to_string(),
            None => s.error(glow::INVALID_VALUE),
        }
    }

    fn compile_shader(&self, shader: ShaderHandle) {
        let mut s = self.enter("compile_shader");
        let Some(stage) = s.shaders.get(&shader.get()).map(|sh| sh.stage) else {
            s.error(glow::INVALID_VALUE);
            return;
        };
        let failure = s.compile_failures.remove(&stage);
        if let Some(sh) = s.shaders.get_mut(&shader.get()) {
            match failure {
                Some(log) => {
                    sh.compiled = false;
                    sh.log = log;
                }
                None if sh.source.trim().is_empty() => {
                    sh.compiled = false;
                    sh.log = "error: empty shader source".to_string();
                }
                None => {
                    sh.compiled = true;
                    sh.log.clear();
                }
            }
        }
    }

    fn get_shader_compile_status(&self, shader: ShaderHandle) -> bool {
        let s = self.enter("get_shader_compile_status");
        s.shaders
            .get(&shader.get())
            .is_some_and(|sh| sh.compiled)
    }

    fn get_shader_info_log(&self, shader: ShaderHandle) -> String {
        let s = self.enter("get_shader_info_log");
        s.shaders
            .get(&shader.get())
            .map(|sh| sh.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: ShaderHandle) {
        let mut s = self.enter("delete_shader");
        s.shaders.remove(&shader.get());
    }

    fn create_program(&self) -> Result<ProgramHandle, String> {
        let mut s = self.enter("create_program");
        let name = s.alloc();
        s.programs.insert(name.get(), ProgramState::default());
        Ok(ProgramHandle(name))
    }

    fn attach_shader(&self, program: ProgramHandle, shader: ShaderHandle) {
        let mut s = self.enter("attach_shader");
        if !s.shaders.contains_key(&shader.get()) {
            s.error(glow::INVALID_VALUE);
            return;
        }
        match s.programs.get_mut(&program.get()) {
            Some(p) => {
                p.attached.insert(shader.get());
            }
            None => s.error(glow::INVALID_VALUE),
        }
    }

    fn detach_shader(&self, program: ProgramHandle, shader: ShaderHandle) {
        let mut s = self.enter("detach_shader");
        let removed = s
            .programs
            .get_mut(&program.get())
            .map(|p| p.attached.remove(&shader.get()));
        if removed != Some(true) {
            s.error(glow::INVALID_OPERATION);
        }
    }

    fn link_program(&self, program: ProgramHandle) {
        let mut s = self.enter("link_program");
        let failure = s.link_failure.take();
        let all_compiled = match s.programs.get(&program.get()) {
            Some(p) => {
                p.attached.len() >= 2
                    && p
                        .attached
                        .iter()
                        .all(|n| s.shaders.get(n).is_some_and(|sh| sh.compiled))
            }
            None => {
                s.error(glow::INVALID_VALUE);
                return;
            }
        };
        if let Some(p) = s.programs.get_mut(&program.get()) {
            match (failure, all_compiled) {
                (Some(log), _) => {
                    p.linked = false;
                    p.log = log;
                }
                (None, false) => {
                    p.linked = false;
                    p.log = "error: attached shaders must be compiled".to_string();
                }
                (None, true) => {
                    p.linked = true;
                    p.log.clear();
                }
            }
        }
    }

    fn get_program_link_status(&self, program: ProgramHandle) -> bool {
        let s = self.enter("get_program_link_status");
        s.programs.get(&program.get()).is_some_and(|p| p.linked)
    }

    fn get_program_info_log(&self, program: ProgramHandle) -> String {
        let s = self.enter("get_program_info_log");
        s.programs
            .get(&program.get())
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn use_program(&self, program: Option<ProgramHandle>) {
        let mut s = self.enter("use_program");
        let name = program.map(ProgramHandle::get);
        if let Some(n) = name {
            match s.programs.get(&n) {
                Some(p) if p.linked => {}
                Some(_) => {
                    s.error(glow::INVALID_OPERATION);
                    return;
                }
                None => {
                    s.error(glow::INVALID_VALUE);
                    return;
                }
            }
        }
        if let Some(previous) = s.program.filter(|p| Some(*p) != name) {
            if s.programs.get(&previous).is_some_and(|p| p.delete_pending) {
                s.programs.remove(&previous);
            }
        }
        s.program = name;
    }

    fn delete_program(&self, program: ProgramHandle) {
        let mut s = self.enter("delete_program");
        let name = program.get();
        if s.program == Some(name) {
            if let Some(p) = s.programs.get_mut(&name) {
                p.delete_pending = true;
            }
        } else {
            s.programs.remove(&name);
        }
    }

    fn get_uniform_location(
        &self,
        program: ProgramHandle,
        name: &str,
    ) -> Option<UniformLocation> {
        let mut s = self.enter("get_uniform_location");
        match s.programs.get(&program.get()) {
            Some(p) if p.linked => {}
            _ => {
                s.error(glow::INVALID_OPERATION);
                return None;
            }
        }
        s.declared_uniforms
            .iter()
            .position(|u| u == name)
            .map(|slot| UniformLocation(slot as u32))
    }

    fn uniform_1_i32(&self, location: Option<UniformLocation>, value: i32) {
        self.enter("uniform_1_i32")
            .set_uniform(location, UniformValue::Int(value));
    }

    fn uniform_4_f32(&self, location: Option<UniformLocation>, value: [f32; 4]) {
        self.enter("uniform_4_f32")
            .set_uniform(location, UniformValue::Vec4(value));
    }

    fn uniform_matrix_4_f32(&self, location: Option<UniformLocation>, value: &[f32; 16]) {
        self.enter("uniform_matrix_4_f32")
            .set_uniform(location, UniformValue::Mat4(*value));
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        let mut s = self.enter("viewport");
        if width < 0 || height < 0 {
            s.error(glow::INVALID_VALUE);
            return;
        }
        s.viewport = [x, y, width, height];
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        self.enter("clear_color").clear_color = rgba;
    }

    fn clear_color_buffer(&self) {
        self.enter("clear").clears += 1;
    }

    fn draw_triangles_u32(&self, count: i32, offset: i32) {
        let mut s = self.enter("draw_elements");
        if count < 0 {
            s.error(glow::INVALID_VALUE);
            return;
        }
        let (Some(program), Some(vertex_array), Some(element_buffer)) =
            (s.program, s.vertex_array, s.element_buffer())
        else {
            s.error(glow::INVALID_OPERATION);
            return;
        };
        let (Some(program), Some(vertex_array), Some(element_buffer)) = (
            NonZeroU32::new(program),
            NonZeroU32::new(vertex_array),
            NonZeroU32::new(element_buffer),
        ) else {
            return;
        };
        s.draws.push(DrawCall {
            count,
            offset,
            program: ProgramHandle(program),
            vertex_array: VertexArrayHandle(vertex_array),
            element_buffer: BufferHandle(element_buffer),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique_and_non_zero() {
        let gl = DummyBackend::new();
        let a = gl.create_buffer().unwrap();
        let b = gl.create_buffer().unwrap();
        let va = gl.create_vertex_array().unwrap();
        assert_ne!(a, b);
        assert_ne!(a.get(), va.get());
        assert!(a.get() > 0);
    }

    #[test]
    fn binding_unknown_buffer_is_invalid_operation() {
        let gl = DummyBackend::new();
        let b = gl.create_buffer().unwrap();
        gl.delete_buffer(b);
        gl.bind_buffer(BufferTarget::Array, Some(b));
        assert_eq!(gl.get_error(), glow::INVALID_OPERATION);
        assert_eq!(gl.get_error(), glow::NO_ERROR);
    }

    #[test]
    fn attrib_pointer_requires_bound_vertex_array() {
        let gl = DummyBackend::new();
        let b = gl.create_buffer().unwrap();
        gl.bind_buffer(BufferTarget::Array, Some(b));
        gl.vertex_attrib_pointer(AttribPointer {
            index: 0,
            components: 2,
            scalar: crate::gl::ScalarType::Float,
            normalized: false,
            stride: 8,
            offset: 0,
        });
        assert_eq!(gl.pending_errors(), vec![glow::INVALID_OPERATION]);
    }

    #[test]
    fn draw_without_program_is_invalid_operation() {
        let gl = DummyBackend::new();
        gl.draw_triangles_u32(6, 0);
        assert_eq!(gl.get_error(), glow::INVALID_OPERATION);
        assert!(gl.draws().is_empty());
    }

    #[test]
    fn clones_share_state() {
        let gl = DummyBackend::new();
        let observer = gl.clone();
        gl.create_buffer().unwrap();
        assert_eq!(observer.live_buffers(), 1);
        assert_eq!(observer.call_count("create_buffer"), 1);
    }

    fn linked_program(gl: &DummyBackend) -> ProgramHandle {
        let program = gl.create_program().unwrap();
        for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
            let shader = gl.create_shader(stage).unwrap();
            gl.shader_source(shader, "void main() {}");
            gl.compile_shader(shader);
            gl.attach_shader(program, shader);
        }
        gl.link_program(program);
        program
    }

    #[test]
    fn element_binding_follows_vertex_array() {
        let gl = DummyBackend::new();
        let program = linked_program(&gl);
        gl.use_program(Some(program));

        let first = gl.create_vertex_array().unwrap();
        let second = gl.create_vertex_array().unwrap();
        let ib = gl.create_buffer().unwrap();

        gl.bind_vertex_array(Some(first));
        gl.bind_buffer(BufferTarget::ElementArray, Some(ib));
        assert_eq!(gl.element_buffer_of(first), Some(ib.get()));

        gl.bind_vertex_array(Some(second));
        assert_eq!(gl.current_buffer(BufferTarget::ElementArray), None);
        gl.draw_triangles_u32(3, 0);
        assert_eq!(gl.get_error(), glow::INVALID_OPERATION);

        gl.bind_vertex_array(Some(first));
        assert_eq!(gl.current_buffer(BufferTarget::ElementArray), Some(ib.get()));
        gl.draw_triangles_u32(3, 0);
        assert_eq!(gl.get_error(), glow::NO_ERROR);
        assert_eq!(gl.draws().len(), 1);
    }

    #[test]
    fn element_binding_without_vertex_array_is_not_inherited() {
        let gl = DummyBackend::new();
        let program = linked_program(&gl);
        gl.use_program(Some(program));

        let ib = gl.create_buffer().unwrap();
        gl.bind_buffer(BufferTarget::ElementArray, Some(ib));
        let va = gl.create_vertex_array().unwrap();
        gl.bind_vertex_array(Some(va));

        gl.draw_triangles_u32(6, 0);
        assert_eq!(gl.pending_errors(), vec![glow::INVALID_OPERATION]);
        assert!(gl.draws().is_empty());
    }

    #[test]
    fn deleting_current_program_defers_until_replaced() {
        let gl = DummyBackend::new();
        let program = linked_program(&gl);
        gl.use_program(Some(program));

        gl.delete_program(program);
        assert_eq!(gl.current_program(), Some(program.get()));
        assert_eq!(gl.live_programs(), 1);

        gl.use_program(None);
        assert_eq!(gl.live_programs(), 0);
        assert!(gl.pending_errors().is_empty());
    }
}
