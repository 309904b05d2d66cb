use std::fmt;
use std::num::NonZeroU32;

macro_rules! gl_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
        pub struct $name(pub NonZeroU32);

        impl $name {
            /// Raw driver name of the object.
            #[inline]
            pub fn get(self) -> u32 {
                self.0.get()
            }
        }
    };
}

gl_handle!(
    /// Driver name of a buffer object.
    BufferHandle
);
gl_handle!(
    /// Driver name of a vertex array object.
    VertexArrayHandle
);
gl_handle!(
    /// Driver name of a shader stage object.
    ShaderHandle
);
gl_handle!(
    /// Driver name of a linked program object.
    ProgramHandle
);

/// Resolved uniform slot inside a program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UniformLocation(pub u32);

/// Binding target for buffer objects.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferTarget {
    /// `GL_ARRAY_BUFFER`: per-vertex attribute data.
    Array,
    /// `GL_ELEMENT_ARRAY_BUFFER`: draw indices.
    ElementArray,
}

impl BufferTarget {
    pub fn to_gl(self) -> u32 {
        match self {
            Self::Array => glow::ARRAY_BUFFER,
            Self::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
        }
    }
}

/// Programmable pipeline stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn to_gl(self) -> u32 {
        match self {
            Self::Vertex => glow::VERTEX_SHADER,
            Self::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
        })
    }
}

/// Scalar component type of a vertex attribute.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ScalarType {
    Float,
    UnsignedInt,
    UnsignedByte,
}

impl ScalarType {
    /// Size in bytes of one component.
    pub fn size_of(self) -> u32 {
        match self {
            Self::Float | Self::UnsignedInt => 4,
            Self::UnsignedByte => 1,
        }
    }

    pub fn to_gl(self) -> u32 {
        match self {
            Self::Float => glow::FLOAT,
            Self::UnsignedInt => glow::UNSIGNED_INT,
            Self::UnsignedByte => glow::UNSIGNED_BYTE,
        }
    }
}

/// Attribute pointer configuration for one attribute slot.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AttribPointer {
    pub index: u32,
    pub components: i32,
    pub scalar: ScalarType,
    pub normalized: bool,
    pub stride: i32,
    pub offset: i32,
}

/// Immediate-mode driver surface consumed by the wrapper layer.
///
/// Implementations assume the context is current on the calling thread.
/// Methods mirror one driver entry point each; errors are not returned here
/// but left on the driver's sticky error queue, read back with [`get_error`].
///
/// [`get_error`]: GlBackend::get_error
pub trait GlBackend {
    /// Human-readable backend name for diagnostics.
    fn name(&self) -> &'static str;

    /// Pops one pending error code; `NO_ERROR` (0) when the queue is empty.
    fn get_error(&self) -> u32;

    fn create_buffer(&self) -> Result<BufferHandle, String>;
    fn delete_buffer(&self, buffer: BufferHandle);
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferHandle>);
    /// Uploads `data` to the buffer bound on `target` as static draw content.
    fn buffer_data_static(&self, target: BufferTarget, data: &[u8]);

    fn create_vertex_array(&self) -> Result<VertexArrayHandle, String>;
    fn delete_vertex_array(&self, array: VertexArrayHandle);
    fn bind_vertex_array(&self, array: Option<VertexArrayHandle>);
    fn enable_vertex_attrib_array(&self, index: u32);
    fn vertex_attrib_pointer(&self, pointer: AttribPointer);

    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderHandle, String>;
    fn shader_source(&self, shader: ShaderHandle, source: &str);
    fn compile_shader(&self, shader: ShaderHandle);
    fn get_shader_compile_status(&self, shader: ShaderHandle) -> bool;
    fn get_shader_info_log(&self, shader: ShaderHandle) -> String;
    fn delete_shader(&self, shader: ShaderHandle);

    fn create_program(&self) -> Result<ProgramHandle, String>;
    fn attach_shader(&self, program: ProgramHandle, shader: ShaderHandle);
    fn detach_shader(&self, program: ProgramHandle, shader: ShaderHandle);
    fn link_program(&self, program: ProgramHandle);
    fn get_program_link_status(&self, program: ProgramHandle) -> bool;
    fn get_program_info_log(&self, program: ProgramHandle) -> String;
    fn use_program(&self, program: Option<ProgramHandle>);
    fn delete_program(&self, program: ProgramHandle);

    fn get_uniform_location(&self, program: ProgramHandle, name: &str)
    -> Option<UniformLocation>;
    fn uniform_1_i32(&self, location: Option<UniformLocation>, value: i32);
    fn uniform_4_f32(&self, location: Option<UniformLocation>, value: [f32; 4]);
    /// Column-major 4x4 matrix, never transposed.
    fn uniform_matrix_4_f32(&self, location: Option<UniformLocation>, value: &[f32; 16]);

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color(&self, rgba: [f32; 4]);
    /// Clears the colour buffer of the current framebuffer.
    fn clear_color_buffer(&self);
    /// Indexed triangle-list draw over the bound element buffer (`u32` indices).
    fn draw_triangles_u32(&self, count: i32, offset: i32);
}
