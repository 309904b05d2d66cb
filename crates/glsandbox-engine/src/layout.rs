//! Vertex layout descriptor.
//!
//! A layout is an append-only list of attribute descriptions for one
//! interleaved vertex buffer. Element `i` feeds attribute slot `i`; the stride
//! is the sum of every element's byte size and is kept current on each push.
//!
//! ```
//! use glsandbox_engine::layout::VertexBufferLayout;
//!
//! let mut layout = VertexBufferLayout::new();
//! layout.push::<f32>(2); // position
//! layout.push::<u8>(4); // colour, normalised
//! assert_eq!(layout.stride(), 12);
//! ```

use crate::gl::ScalarType;

/// Scalar types a layout element may be built from.
pub trait VertexScalar: bytemuck::Pod {
    const SCALAR: ScalarType;
    /// Whether integer components are mapped to `[0, 1]` when read as floats.
    const NORMALIZED: bool;
}

impl VertexScalar for f32 {
    const SCALAR: ScalarType = ScalarType::Float;
    const NORMALIZED: bool = false;
}

impl VertexScalar for u32 {
    const SCALAR: ScalarType = ScalarType::UnsignedInt;
    const NORMALIZED: bool = false;
}

impl VertexScalar for u8 {
    const SCALAR: ScalarType = ScalarType::UnsignedByte;
    const NORMALIZED: bool = true;
}

/// One attribute: `count` components of `scalar`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VertexBufferElement {
    pub count: u32,
    pub scalar: ScalarType,
    pub normalized: bool,
}

impl VertexBufferElement {
    /// Bytes this element occupies in one vertex.
    pub fn byte_size(&self) -> u32 {
        self.count * self.scalar.size_of()
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct VertexBufferLayout {
    elements: Vec<VertexBufferElement>,
    stride: u32,
}

impl VertexBufferLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an element of `count` components of `T`.
    pub fn push<T: VertexScalar>(&mut self, count: u32) -> &mut Self {
        let element = VertexBufferElement {
            count,
            scalar: T::SCALAR,
            normalized: T::NORMALIZED,
        };
        self.stride += element.byte_size();
        self.elements.push(element);
        self
    }

    /// Elements in push order (= attribute slot order).
    pub fn elements(&self) -> &[VertexBufferElement] {
        &self.elements
    }

    /// Byte distance between consecutive vertices.
    pub fn stride(&self) -> u32 {
        self.stride
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_layout_has_zero_stride() {
        let layout = VertexBufferLayout::new();
        assert!(layout.elements().is_empty());
        assert_eq!(layout.stride(), 0);
    }

    #[test]
    fn mixed_layout_stride_and_order() {
        let mut layout = VertexBufferLayout::new();
        layout.push::<f32>(2).push::<u8>(4).push::<f32>(3);

        assert_eq!(layout.stride(), 2 * 4 + 4 * 1 + 3 * 4);
        assert_eq!(
            layout.elements(),
            &[
                VertexBufferElement { count: 2, scalar: ScalarType::Float, normalized: false },
                VertexBufferElement { count: 4, scalar: ScalarType::UnsignedByte, normalized: true },
                VertexBufferElement { count: 3, scalar: ScalarType::Float, normalized: false },
            ]
        );
    }

    #[test]
    fn stride_tracks_each_push() {
        let mut layout = VertexBufferLayout::new();
        layout.push::<u32>(1);
        assert_eq!(layout.stride(), 4);
        layout.push::<u8>(3);
        assert_eq!(layout.stride(), 7);
        let sum: u32 = layout.elements().iter().map(|e| e.byte_size()).sum();
        assert_eq!(layout.stride(), sum);
    }
}
