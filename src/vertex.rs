//! Vertex formats understood by [`Geometry`](crate::Geometry) and [`Program`](crate::Program).
//!
//! Every format follows the same attribute contract so one shader can serve
//! several formats:
//!
//! | Attribute | Shader Location | Formats                      |
//! |-----------|-----------------|------------------------------|
//! | position  | 0               | all                          |
//! | normal    | 1               | [`LitVertex3d`] only         |

/// Identifies a vertex layout at runtime, for pipeline caching.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VertexKind {
    /// 2D position only.
    Position2,
    /// 3D position only.
    Position3,
    /// 3D position followed by a 3D normal.
    Position3Normal,
}

/// A vertex type that can be uploaded to a vertex buffer.
pub trait Vertex: bytemuck::Pod {
    /// Runtime tag for this layout.
    const KIND: VertexKind;
    /// The wgpu buffer layout describing this type.
    const LAYOUT: wgpu::VertexBufferLayout<'static>;
}

/// A 2D vertex.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex2d {
    pub position: [f32; 2],
}

impl Vertex2d {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { position: [x, y] }
    }
}

impl Vertex for Vertex2d {
    const KIND: VertexKind = VertexKind::Position2;
    const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex2d>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x2,
        }],
    };
}

/// A 3D vertex without a normal, for wireframes and flat-colored solids.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3d {
    pub position: [f32; 3],
}

impl Vertex3d {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { position: [x, y, z] }
    }
}

impl Vertex for Vertex3d {
    const KIND: VertexKind = VertexKind::Position3;
    const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex3d>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        }],
    };
}

/// A 3D vertex with a surface normal, for lit geometry.
///
/// # Memory Layout
///
/// 24 bytes per vertex: `position` at offset 0, `normal` at offset 12.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LitVertex3d {
    /// Model-space position.
    pub position: [f32; 3],
    /// Surface normal; should be normalized for correct lighting.
    pub normal: [f32; 3],
}

impl LitVertex3d {
    pub const fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }
}

impl Vertex for LitVertex3d {
    const KIND: VertexKind = VertexKind::Position3Normal;
    const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<LitVertex3d>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // normal
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
        ],
    };
}

impl VertexKind {
    /// The buffer layout for this kind.
    pub fn layout(self) -> wgpu::VertexBufferLayout<'static> {
        match self {
            VertexKind::Position2 => Vertex2d::LAYOUT,
            VertexKind::Position3 => Vertex3d::LAYOUT,
            VertexKind::Position3Normal => LitVertex3d::LAYOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strides_match_struct_sizes() {
        assert_eq!(Vertex2d::LAYOUT.array_stride, 8);
        assert_eq!(Vertex3d::LAYOUT.array_stride, 12);
        assert_eq!(LitVertex3d::LAYOUT.array_stride, 24);
    }

    #[test]
    fn normal_follows_position() {
        let attrs = LitVertex3d::LAYOUT.attributes;
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].shader_location, 0);
        assert_eq!(attrs[1].shader_location, 1);
        assert_eq!(attrs[1].offset, 12);
    }
}
