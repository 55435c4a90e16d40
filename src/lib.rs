//! # Tiny Renderer
//!
//! **A small teaching wrapper around wgpu and winit.**
//!
//! Build transforms by hand with [`Matrix`], upload vertex data as
//! [`Geometry`], load a vertex and a fragment shader as a [`Program`], and draw
//! them in a per-frame closure. Arrow keys, mouse drag and the scroll wheel
//! drive a [`WindowState`] that every shader can read through [`Uniforms`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use tiny_renderer::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::new().title("Box").shader_dir("demos/shaders");
//!
//!     run_with_config(config, |ctx| {
//!         let program = ctx.load_program("mvp.vert.wgsl", "point.frag.wgsl")?;
//!         let rect = ctx.geometry(&shape::rectangle(-0.5, -0.5, 1.0, 1.0));
//!
//!         Ok(move |frame: &mut Frame| {
//!             let uniforms = frame
//!                 .uniforms()
//!                 .model(Matrix::rotate(frame.time, 0.0, 1.0, 0.0))
//!                 .view(Matrix::translate(0.0, 0.0, -4.0))
//!                 .projection(Matrix::perspective(0.8, frame.aspect(), 1.0, 10.0));
//!             frame.draw(&rect, &program, &uniforms);
//!         })
//!     })
//! }
//! ```
//!
//! Matrices follow OpenGL conventions (camera looking down `-Z`, clip depth in
//! `[-1, 1]`); the projection is remapped to wgpu's depth range on upload.

mod app;
mod geometry;
mod gpu;
mod input;
mod logging;
mod matrix;
mod program;
pub mod shape;
mod uniforms;
mod vertex;
mod window;

pub use app::{AppConfig, Frame, LoopMode, SetupContext, run, run_with_config};
pub use geometry::{Dispatch, DrawCall, Elements, Geometry, Object, Topology};
pub use gpu::{DEPTH_FORMAT, GpuContext};
pub use input::{InputEvent, scroll_lines};
pub use logging::{LoggingConfig, init_logging};
pub use matrix::Matrix;
pub use program::{Program, ProgramError, RenderState, ShaderStage};
pub use shape::Shape;
pub use uniforms::{GpuUniforms, UniformRing, Uniforms};
pub use vertex::{LitVertex3d, Vertex, Vertex2d, Vertex3d, VertexKind};
pub use window::{LoopState, WindowState};

// Re-export glam math types for convenience
pub use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

// Re-export commonly used winit types for convenience
pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;
