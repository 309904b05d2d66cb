use std::path::Path;
use std::rc::Rc;

use glam::Mat4;

use crate::buffer::{IndexBuffer, VertexBuffer};
use crate::error::Result;
use crate::gl::GlContext;
use crate::layout::VertexBufferLayout;
use crate::render::Renderer;
use crate::shader::{Shader, ShaderProgramSource};
use crate::vertex_array::VertexArray;

use super::{Demo, DemoUi};

const POSITIONS: [f32; 8] = [
    -0.5, -0.5, //
    0.5, -0.5, //
    0.5, 0.5, //
    -0.5, 0.5, //
];

const INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

/// Red-channel change per second; the channel bounces between 0 and 1.
const RED_SPEED: f32 = 3.0;

/// A single indexed quad with a pulsing `u_Color`.
///
/// The shader must declare `uniform vec4 u_Color` and `uniform mat4 u_MVP`
/// and read a `vec2` position from attribute 0.
#[derive(Debug)]
pub struct QuadDemo {
    shader: Shader,
    va: VertexArray,
    // Kept alive for the vertex array's attribute bindings.
    _vb: VertexBuffer,
    ib: IndexBuffer,
    color: [f32; 4],
    increment: f32,
    projection: Mat4,
}

impl QuadDemo {
    pub fn from_file(ctx: &Rc<GlContext>, path: impl AsRef<Path>) -> Result<Self> {
        Self::new(ctx, Shader::from_file(ctx, path)?)
    }

    pub fn from_source(ctx: &Rc<GlContext>, source: &ShaderProgramSource) -> Result<Self> {
        Self::new(ctx, Shader::from_source(ctx, source)?)
    }

    fn new(ctx: &Rc<GlContext>, shader: Shader) -> Result<Self> {
        let va = VertexArray::new(ctx)?;
        let vb = VertexBuffer::from_slice(ctx, &POSITIONS)?;
        let mut layout = VertexBufferLayout::new();
        layout.push::<f32>(2);
        va.add_buffer(&vb, &layout)?;
        let ib = IndexBuffer::new(ctx, &INDICES)?;

        va.unbind()?;
        vb.unbind()?;
        ib.unbind()?;

        Ok(Self {
            shader,
            va,
            _vb: vb,
            ib,
            color: [0.0, 0.3, 0.8, 1.0],
            increment: RED_SPEED,
            projection: projection(1.0),
        })
    }

    pub fn color(&self) -> [f32; 4] {
        self.color
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }
}

/// Orthographic projection keeping unit-square geometry square.
fn projection(aspect: f32) -> Mat4 {
    if aspect >= 1.0 {
        Mat4::orthographic_rh_gl(-aspect, aspect, -1.0, 1.0, -1.0, 1.0)
    } else {
        let inv = 1.0 / aspect;
        Mat4::orthographic_rh_gl(-1.0, 1.0, -inv, inv, -1.0, 1.0)
    }
}

impl Demo for QuadDemo {
    fn on_update(&mut self, dt: f32) {
        let r = &mut self.color[0];
        *r += self.increment * dt;
        if *r > 1.0 {
            *r = 1.0;
            self.increment = -RED_SPEED;
        } else if *r < 0.0 {
            *r = 0.0;
            self.increment = RED_SPEED;
        }
    }

    fn on_render(&mut self, renderer: &Renderer) -> Result<()> {
        let [r, g, b, a] = self.color;
        self.shader.bind()?;
        self.shader.set_uniform_4f("u_Color", r, g, b, a)?;
        self.shader.set_uniform_mat4("u_MVP", &self.projection)?;
        renderer.draw(&self.va, &self.ib, &self.shader)
    }

    fn on_ui(&mut self, ui: &mut dyn DemoUi) {
        ui.text(&format!("u_Color.r = {:.2}", self.color[0]));
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.projection = projection(width as f32 / height as f32);
    }
}
