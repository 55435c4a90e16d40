//! The uniform block shared by every program, and the per-frame ring it is
//! uploaded through.
//!
//! Every shader sees the same block at `@group(0) @binding(0)`:
//!
//! ```wgsl
//! struct Uniforms {
//!     model: mat4x4f,
//!     view: mat4x4f,
//!     projection: mat4x4f,
//!     normal_matrix: mat3x3f,
//!     location: vec2f,
//!     size: vec2f,
//!     scale: f32,
//!     aspect: f32,
//!     time: f32,
//! }
//! @group(0) @binding(0) var<uniform> u: Uniforms;
//! ```
//!
//! A shader only has to declare the block if it reads from it.

use glam::Mat3;

use crate::gpu::GpuContext;
use crate::matrix::Matrix;
use crate::window::WindowState;

/// Per-draw shader inputs.
///
/// Start from [`Uniforms::for_window`] each frame and set the matrices the
/// program needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Uniforms {
    pub model: Matrix,
    pub view: Matrix,
    pub projection: Matrix,
    /// Pan offset of the window in normalized device coordinates.
    pub location: [f32; 2],
    /// Window size in pixels.
    pub size: [f32; 2],
    pub scale: f32,
    pub aspect: f32,
    /// Seconds since the app started.
    pub time: f32,
}

impl Default for Uniforms {
    fn default() -> Self {
        Self {
            model: Matrix::identity(),
            view: Matrix::identity(),
            projection: Matrix::identity(),
            location: [0.0, 0.0],
            size: [1.0, 1.0],
            scale: 100.0,
            aspect: 1.0,
            time: 0.0,
        }
    }
}

impl Uniforms {
    /// Identity matrices plus the current window state.
    pub fn for_window(window: &WindowState, time: f32) -> Self {
        Self {
            location: window.location(),
            size: [window.width(), window.height()],
            scale: window.scale(),
            aspect: window.aspect(),
            time,
            ..Default::default()
        }
    }

    pub fn model(mut self, model: Matrix) -> Self {
        self.model = model;
        self
    }

    pub fn view(mut self, view: Matrix) -> Self {
        self.view = view;
        self
    }

    pub fn projection(mut self, projection: Matrix) -> Self {
        self.projection = projection;
        self
    }

    /// Packs the uniforms in the WGSL layout.
    ///
    /// The normal matrix is derived from `view * model`, and the projection is
    /// remapped from OpenGL to wgpu clip depth.
    pub fn to_gpu(&self) -> GpuUniforms {
        let normal = (self.view * self.model).normal_matrix();
        GpuUniforms {
            model: self.model.to_cols_array(),
            view: self.view.to_cols_array(),
            projection: (Matrix::GL_TO_WGPU_DEPTH * self.projection).to_cols_array(),
            normal_matrix: pad_mat3(normal),
            location: self.location,
            size: self.size,
            scale: self.scale,
            aspect: self.aspect,
            time: self.time,
            _padding: 0.0,
        }
    }
}

/// [`Uniforms`] in the byte layout the shaders read (272 bytes).
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuUniforms {
    pub model: [f32; 16],
    pub view: [f32; 16],
    pub projection: [f32; 16],
    /// Three columns, each padded to 16 bytes as `mat3x3f` requires.
    pub normal_matrix: [[f32; 4]; 3],
    pub location: [f32; 2],
    pub size: [f32; 2],
    pub scale: f32,
    pub aspect: f32,
    pub time: f32,
    /// Padding to the 16-byte struct alignment.
    pub _padding: f32,
}

fn pad_mat3(m: Mat3) -> [[f32; 4]; 3] {
    [m.x_axis.extend(0.0), m.y_axis.extend(0.0), m.z_axis.extend(0.0)].map(|c| c.to_array())
}

/// Rounds `size` up to a multiple of `alignment`.
fn aligned_stride(size: u64, alignment: u64) -> u64 {
    size.div_ceil(alignment) * alignment
}

/// Uniform slots for one frame, addressed with dynamic offsets.
///
/// Each draw writes its [`Uniforms`] into the next slot, so many draws in one
/// render pass can see different values. The ring is reset at the start of
/// every frame.
pub struct UniformRing {
    buffer: wgpu::Buffer,
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    stride: u64,
    capacity: u32,
    next: u32,
}

impl UniformRing {
    /// Number of draws a single frame can issue.
    pub const DEFAULT_CAPACITY: u32 = 256;

    pub fn new(gpu: &GpuContext, capacity: u32) -> Self {
        let device = &gpu.device;
        let size = std::mem::size_of::<GpuUniforms>() as u64;
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let stride = aligned_stride(size, alignment);

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Uniform Ring"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Uniform Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(size),
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(size),
                }),
            }],
        });

        Self {
            buffer,
            layout,
            bind_group,
            stride,
            capacity,
            next: 0,
        }
    }

    /// The layout every program's pipelines are built against.
    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    /// Frees every slot; called once per frame before drawing.
    pub fn reset(&mut self) {
        self.next = 0;
    }

    /// Writes `uniforms` into the next free slot and returns its dynamic offset.
    ///
    /// Returns `None` when every slot of this frame is taken.
    pub fn push(&mut self, gpu: &GpuContext, uniforms: &Uniforms) -> Option<u32> {
        if self.next >= self.capacity {
            return None;
        }
        let offset = self.next as u64 * self.stride;
        self.next += 1;

        gpu.queue
            .write_buffer(&self.buffer, offset, bytemuck::cast_slice(&[uniforms.to_gpu()]));
        Some(offset as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn gpu_layout_is_272_bytes() {
        assert_eq!(std::mem::size_of::<GpuUniforms>(), 272);
    }

    #[test]
    fn stride_rounds_up_to_alignment() {
        assert_eq!(aligned_stride(272, 256), 512);
        assert_eq!(aligned_stride(256, 256), 256);
        assert_eq!(aligned_stride(272, 16), 272);
    }

    #[test]
    fn projection_is_uploaded_with_wgpu_depth() {
        let projection = Matrix::orthogonal(-1.0, 1.0, -1.0, 1.0, 1.0, 10.0);
        let uniforms = Uniforms::default().projection(projection);
        let packed = Matrix::from_cols_array(uniforms.to_gpu().projection);

        let near = packed.project_point(Vec3::new(0.0, 0.0, -1.0));
        let far = packed.project_point(Vec3::new(0.0, 0.0, -10.0));
        assert!(near.z.abs() < 1e-5);
        assert!((far.z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn normal_matrix_follows_model_view() {
        let rotation = Matrix::rotate(0.5, 0.0, 1.0, 0.0);
        let uniforms = Uniforms::default()
            .model(rotation)
            .view(Matrix::translate(0.0, 0.0, -5.0));
        let packed = uniforms.to_gpu();

        // Translation does not affect normals
        let expected = rotation.normal_matrix();
        assert_eq!(packed.normal_matrix[0][..3], expected.x_axis.to_array());
        assert_eq!(packed.normal_matrix[2][3], 0.0);
    }

    #[test]
    fn for_window_copies_view_state() {
        let window = WindowState::new(640, 480);
        let uniforms = Uniforms::for_window(&window, 2.5);
        assert_eq!(uniforms.size, [640.0, 480.0]);
        assert_eq!(uniforms.scale, 100.0);
        assert_eq!(uniforms.location, [0.0, 0.0]);
        assert!((uniforms.aspect - 4.0 / 3.0).abs() < 1e-6);
        assert_eq!(uniforms.time, 2.5);
        assert_eq!(uniforms.model, Matrix::identity());
    }
}
