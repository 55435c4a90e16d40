//! Shader programs loaded from a vertex and a fragment WGSL file.
//!
//! A [`Program`] is the pair of compiled shader modules plus the render
//! pipelines built from them. wgpu bakes the vertex layout and the primitive
//! topology into each pipeline, so pipelines are created on first use for each
//! ([`VertexKind`], topology) pair and cached.
//!
//! # Shader contract
//!
//! - The vertex file has exactly one `@vertex` entry point and reads
//!   `position` from `@location(0)` and, for lit vertices, `normal` from
//!   `@location(1)`.
//! - The fragment file has exactly one `@fragment` entry point writing its
//!   color to `@location(0)`.
//! - Both may read the [`Uniforms`](crate::Uniforms) block at
//!   `@group(0) @binding(0)`.
//!
//! # Failure
//!
//! Loading never panics. An unreadable file or a compile error is returned as a
//! [`ProgramError`] and logged together with the compiler output.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::geometry::Topology;
use crate::gpu::{DEPTH_FORMAT, GpuContext};
use crate::vertex::VertexKind;

/// The two programmable stages a program is built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Why a program could not be loaded or used.
#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    #[error("can't read {stage} shader {}: {source}", path.display())]
    Read {
        stage: ShaderStage,
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{stage} shader {} failed to compile:\n{log}", path.display())]
    Compile {
        stage: ShaderStage,
        path: PathBuf,
        log: String,
    },
    #[error("program '{label}' failed to link for {kind:?} vertices as {topology:?}:\n{log}")]
    Link {
        label: String,
        kind: VertexKind,
        topology: wgpu::PrimitiveTopology,
        log: String,
    },
}

/// Fixed-function state shared by every pipeline of a program.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderState {
    /// Depth test with `Less` and depth writes.
    pub depth_test: bool,
    /// Cull faces wound clockwise on screen.
    pub cull_back_faces: bool,
}

type PipelineKey = (VertexKind, wgpu::PrimitiveTopology);

/// A compiled vertex + fragment shader pair.
pub struct Program {
    label: String,
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
    layout: wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    state: RenderState,
    /// `None` marks a combination that failed to link; it is not retried.
    pipelines: RefCell<HashMap<PipelineKey, Option<wgpu::RenderPipeline>>>,
}

impl Program {
    /// Reads and compiles both stages.
    ///
    /// `uniform_layout` is the bind group layout of the frame's
    /// [`UniformRing`](crate::UniformRing).
    pub fn load(
        gpu: &GpuContext,
        uniform_layout: &wgpu::BindGroupLayout,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, ProgramError> {
        let (vertex_path, fragment_path) = (vertex_path.as_ref(), fragment_path.as_ref());

        // Read both before failing so every missing file gets reported.
        let vertex_source = read_source(ShaderStage::Vertex, vertex_path);
        let fragment_source = read_source(ShaderStage::Fragment, fragment_path);
        let (vertex_source, fragment_source) = (vertex_source?, fragment_source?);

        let vertex = compile(gpu, ShaderStage::Vertex, vertex_path, &vertex_source)?;
        let fragment = compile(gpu, ShaderStage::Fragment, fragment_path, &fragment_source)?;

        let label = format!("{} + {}", file_name(vertex_path), file_name(fragment_path));

        let layout = gpu
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Program Pipeline Layout"),
                bind_group_layouts: &[uniform_layout],
                push_constant_ranges: &[],
            });

        log::info!("loaded program '{label}'");

        Ok(Self {
            label,
            vertex,
            fragment,
            layout,
            color_format: gpu.config.format,
            state: RenderState::default(),
            pipelines: RefCell::new(HashMap::new()),
        })
    }

    /// Enables or disables depth testing for subsequent draws.
    pub fn depth_test(mut self, enabled: bool) -> Self {
        self.state.depth_test = enabled;
        self.pipelines.get_mut().clear();
        self
    }

    /// Enables or disables back-face culling (counter-clockwise front faces).
    pub fn cull_back_faces(mut self, enabled: bool) -> Self {
        self.state.cull_back_faces = enabled;
        self.pipelines.get_mut().clear();
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn render_state(&self) -> RenderState {
        self.state
    }

    /// The cached pipeline for this vertex layout and topology, built on first use.
    ///
    /// A combination that fails to link is logged once and then skipped.
    pub fn pipeline(
        &self,
        gpu: &GpuContext,
        kind: VertexKind,
        topology: Topology,
    ) -> Option<wgpu::RenderPipeline> {
        let key = (kind, topology.to_wgpu());
        let mut pipelines = self.pipelines.borrow_mut();

        pipelines
            .entry(key)
            .or_insert_with(|| match self.build_pipeline(gpu, kind, topology) {
                Ok(pipeline) => Some(pipeline),
                Err(e) => {
                    log::error!("{e}");
                    None
                }
            })
            .clone()
    }

    /// Builds a pipeline without touching the cache.
    pub fn build_pipeline(
        &self,
        gpu: &GpuContext,
        kind: VertexKind,
        topology: Topology,
    ) -> Result<wgpu::RenderPipeline, ProgramError> {
        let depth_compare = if self.state.depth_test {
            wgpu::CompareFunction::Less
        } else {
            wgpu::CompareFunction::Always
        };

        gpu.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let pipeline = gpu
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&self.label),
                layout: Some(&self.layout),
                vertex: wgpu::VertexState {
                    module: &self.vertex,
                    entry_point: None,
                    buffers: &[kind.layout()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &self.fragment,
                    entry_point: None,
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.color_format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: topology.to_wgpu(),
                    strip_index_format: topology.strip_index_format(),
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: self.state.cull_back_faces.then_some(wgpu::Face::Back),
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: self.state.depth_test,
                    depth_compare,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        match pollster::block_on(gpu.device.pop_error_scope()) {
            None => {
                log::debug!("built pipeline for '{}': {:?} {:?}", self.label, kind, topology);
                Ok(pipeline)
            }
            Some(error) => Err(ProgramError::Link {
                label: self.label.clone(),
                kind,
                topology: topology.to_wgpu(),
                log: error.to_string(),
            }),
        }
    }
}

/// Reads a whole shader file.
pub fn read_source(stage: ShaderStage, path: &Path) -> Result<String, ProgramError> {
    fs::read_to_string(path).map_err(|source| {
        let error = ProgramError::Read {
            stage,
            path: path.to_path_buf(),
            source,
        };
        log::error!("{error}");
        error
    })
}

fn compile(
    gpu: &GpuContext,
    stage: ShaderStage,
    path: &Path,
    source: &str,
) -> Result<wgpu::ShaderModule, ProgramError> {
    let label = format!("{stage} shader {}", file_name(path));

    gpu.device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = gpu
        .device
        .create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
    let info = pollster::block_on(module.get_compilation_info());
    let scope_error = pollster::block_on(gpu.device.pop_error_scope());

    let mut errors = Vec::new();
    for message in &info.messages {
        let text = format_message(message);
        match message.message_type {
            wgpu::CompilationMessageType::Error => errors.push(text),
            wgpu::CompilationMessageType::Warning => log::warn!("{label}: {text}"),
            wgpu::CompilationMessageType::Info => log::info!("{label}: {text}"),
        }
    }

    // Validation can fail without a compilation message (e.g. missing entry point).
    if errors.is_empty()
        && let Some(error) = scope_error
    {
        errors.push(error.to_string());
    }

    if errors.is_empty() {
        return Ok(module);
    }

    let error = ProgramError::Compile {
        stage,
        path: path.to_path_buf(),
        log: errors.join("\n"),
    };
    log::error!("{error}");
    Err(error)
}

fn format_message(message: &wgpu::CompilationMessage) -> String {
    match &message.location {
        Some(at) => format!("{}:{}: {}", at.line_number, at.line_position, message.message),
        None => message.message.clone(),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
