use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::geometry::{Geometry, Topology};
use crate::gpu::GpuContext;
use crate::input::InputEvent;
use crate::logging::{LoggingConfig, init_logging};
use crate::program::{Program, ProgramError};
use crate::shape::Shape;
use crate::uniforms::{UniformRing, Uniforms};
use crate::vertex::Vertex;
use crate::window::WindowState;

/// Context provided during app setup.
pub struct SetupContext<'a> {
    pub gpu: &'a GpuContext,
    pub window: &'a WindowState,
    uniforms: &'a UniformRing,
    shader_dir: &'a Path,
}

impl SetupContext<'_> {
    /// Resolves a shader file name against [`AppConfig::shader_dir`].
    pub fn shader_path(&self, name: impl AsRef<Path>) -> PathBuf {
        self.shader_dir.join(name)
    }

    /// Loads a program from two files in the shader directory.
    pub fn load_program(
        &self,
        vertex: impl AsRef<Path>,
        fragment: impl AsRef<Path>,
    ) -> Result<Program, ProgramError> {
        Program::load(
            self.gpu,
            self.uniforms.layout(),
            self.shader_path(vertex),
            self.shader_path(fragment),
        )
    }

    /// Uploads a shape to the GPU.
    pub fn geometry<V: Vertex>(&self, shape: &Shape<V>) -> Geometry {
        Geometry::new(self.gpu, shape)
    }
}

/// Context provided each frame for rendering.
///
/// A frame is one render pass over the window, already cleared to
/// [`AppConfig::clear_color`] with depth cleared to 1.0.
pub struct Frame<'a> {
    /// GPU context for advanced rendering.
    pub gpu: &'a GpuContext,
    /// Total elapsed time in seconds.
    pub time: f32,
    /// Delta time since last frame in seconds.
    pub dt: f32,
    pass: wgpu::RenderPass<'a>,
    uniforms: &'a mut UniformRing,
    window: &'a WindowState,
    ring_full_reported: bool,
}

impl Frame<'_> {
    pub fn window(&self) -> &WindowState {
        self.window
    }

    /// Window width in pixels.
    pub fn width(&self) -> f32 {
        self.window.width()
    }

    /// Window height in pixels.
    pub fn height(&self) -> f32 {
        self.window.height()
    }

    pub fn aspect(&self) -> f32 {
        self.window.aspect()
    }

    pub fn scale(&self) -> f32 {
        self.window.scale()
    }

    pub fn location(&self) -> [f32; 2] {
        self.window.location()
    }

    /// Uniforms pre-filled with this frame's window state and time.
    pub fn uniforms(&self) -> Uniforms {
        Uniforms::for_window(self.window, self.time)
    }

    /// Draws every element of `geometry` with its default topology.
    pub fn draw(&mut self, geometry: &Geometry, program: &Program, uniforms: &Uniforms) {
        self.draw_with(geometry, program, uniforms, geometry.default_topology());
    }

    /// Draws every element of `geometry` as `topology`.
    ///
    /// Empty geometry, draws whose pipeline failed to link, and draws that
    /// exceed the frame's uniform slots are skipped.
    pub fn draw_with(
        &mut self,
        geometry: &Geometry,
        program: &Program,
        uniforms: &Uniforms,
        topology: Topology,
    ) {
        if geometry.is_empty() {
            return;
        }

        let Some(pipeline) = program.pipeline(self.gpu, geometry.vertex_kind(), topology) else {
            return;
        };

        let Some(offset) = self.uniforms.push(self.gpu, uniforms) else {
            if !self.ring_full_reported {
                log::warn!("uniform ring full, skipping remaining draws this frame");
                self.ring_full_reported = true;
            }
            return;
        };

        self.pass.set_pipeline(&pipeline);
        self.pass.set_bind_group(0, self.uniforms.bind_group(), &[offset]);
        geometry.draw(&mut self.pass, topology);
    }
}

/// How the loop waits between frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopMode {
    /// Redraw continuously.
    Poll,
    /// Block until input arrives, except while a key is held.
    #[default]
    WaitWhenIdle,
}

/// Configuration for the app window.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// RGBA in `[0, 1]`.
    pub clear_color: [f64; 4],
    pub loop_mode: LoopMode,
    /// Directory that [`SetupContext::load_program`] resolves file names against.
    pub shader_dir: PathBuf,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Tiny Renderer".to_string(),
            width: 640,
            height: 480,
            clear_color: [1.0, 1.0, 1.0, 1.0],
            loop_mode: LoopMode::default(),
            shader_dir: PathBuf::from("shaders"),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn clear_color(mut self, r: f64, g: f64, b: f64, a: f64) -> Self {
        self.clear_color = [r, g, b, a];
        self
    }

    pub fn loop_mode(mut self, mode: LoopMode) -> Self {
        self.loop_mode = mode;
        self
    }

    pub fn shader_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.shader_dir = dir.into();
        self
    }

    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }
}

/// Run an app with setup and frame closures.
///
/// # Example
/// ```no_run
/// use tiny_renderer::*;
///
/// fn main() -> anyhow::Result<()> {
///     run(|ctx| {
///         let program = ctx.load_program("point.vert.wgsl", "point.frag.wgsl")?;
///         let rect = ctx.geometry(&shape::rectangle(-0.5, -0.5, 1.0, 1.0));
///
///         Ok(move |frame: &mut Frame| {
///             let uniforms = frame.uniforms();
///             frame.draw(&rect, &program, &uniforms);
///         })
///     })
/// }
/// ```
pub fn run<S, F>(setup: S) -> Result<()>
where
    S: FnOnce(&mut SetupContext) -> Result<F> + 'static,
    F: FnMut(&mut Frame) + 'static,
{
    run_with_config(AppConfig::default(), setup)
}

/// Run an app with custom configuration.
///
/// Returns once the window closes. Failing setup, window creation, GPU
/// initialization or an out-of-memory surface end the loop with an error.
pub fn run_with_config<S, F>(config: AppConfig, setup: S) -> Result<()>
where
    S: FnOnce(&mut SetupContext) -> Result<F> + 'static,
    F: FnMut(&mut Frame) + 'static,
{
    init_logging(config.logging.clone());

    let event_loop = EventLoop::new().context("failed to create event loop")?;

    let mut app = App {
        config,
        state: AppState::Pending {
            setup: Some(Box::new(move |ctx| {
                let frame_fn = setup(ctx)?;
                Ok(Box::new(frame_fn) as FrameFn)
            })),
        },
        error: None,
    };

    event_loop
        .run_app(&mut app)
        .context("event loop terminated with error")?;

    match app.error {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

type FrameFn = Box<dyn FnMut(&mut Frame)>;
type SetupFn = Box<dyn FnOnce(&mut SetupContext) -> Result<FrameFn>>;

struct App {
    config: AppConfig,
    state: AppState,
    error: Option<anyhow::Error>,
}

enum AppState {
    Pending { setup: Option<SetupFn> },
    Running(Box<Running>),
}

struct Running {
    window: Arc<Window>,
    gpu: GpuContext,
    uniforms: UniformRing,
    window_state: WindowState,
    frame_fn: FrameFn,
    start_time: Instant,
    last_frame: Instant,
    /// Input arrived since the last redraw.
    dirty: bool,
}

impl App {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        self.error = Some(error);
        event_loop.exit();
    }

    fn start(&self, event_loop: &ActiveEventLoop, setup: SetupFn) -> Result<Running> {
        let config = &self.config;
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::PhysicalSize::new(config.width, config.height));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .context("failed to create window")?,
        );
        let gpu = GpuContext::new(window.clone())?;
        let uniforms = UniformRing::new(&gpu, UniformRing::DEFAULT_CAPACITY);
        let window_state = WindowState::new(gpu.width(), gpu.height());

        let mut ctx = SetupContext {
            gpu: &gpu,
            window: &window_state,
            uniforms: &uniforms,
            shader_dir: &config.shader_dir,
        };
        let frame_fn = setup(&mut ctx).context("setup failed")?;

        log::info!("window '{}' ready ({}x{})", config.title, gpu.width(), gpu.height());
        window.request_redraw();

        Ok(Running {
            window,
            gpu,
            uniforms,
            window_state,
            frame_fn,
            start_time: Instant::now(),
            last_frame: Instant::now(),
            dirty: false,
        })
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let AppState::Pending { setup } = &mut self.state else {
            return;
        };
        let Some(setup) = setup.take() else {
            return;
        };

        match self.start(event_loop, setup) {
            Ok(running) => self.state = AppState::Running(Box::new(running)),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let AppState::Running(running) = &mut self.state else {
            return;
        };

        if let Some(input) = InputEvent::from_window_event(&event) {
            running.window_state.apply(&input);
            running.dirty = true;
        }

        match event {
            WindowEvent::Resized(size) => {
                running.gpu.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                let clear_color = self.config.clear_color;
                if let Err(e) = running.render(clear_color) {
                    self.fail(event_loop, e);
                    return;
                }
            }
            _ => {}
        }

        if running.window_state.should_close() {
            log::debug!("closing window");
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let AppState::Running(running) = &mut self.state else {
            return;
        };

        running.window_state.step();

        let polling =
            self.config.loop_mode == LoopMode::Poll || !running.window_state.waits_for_input();

        if polling || running.dirty {
            running.dirty = false;
            running.window.request_redraw();
        }

        event_loop.set_control_flow(if polling {
            ControlFlow::Poll
        } else {
            ControlFlow::Wait
        });
    }
}

impl Running {
    /// Renders one frame; surface hiccups skip the frame, out-of-memory is fatal.
    fn render(&mut self, clear_color: [f64; 4]) -> Result<()> {
        let output = match self.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost or outdated, reconfiguring");
                self.gpu.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(anyhow!("surface out of memory"));
            }
            Err(e) => {
                log::warn!("skipping frame: {e}");
                return Ok(());
            }
        };

        let now = Instant::now();
        let time = self.start_time.elapsed().as_secs_f32();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        self.uniforms.reset();

        {
            let [r, g, b, a] = clear_color;
            let pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Frame Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.gpu.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let mut frame = Frame {
                gpu: &self.gpu,
                time,
                dt,
                pass,
                uniforms: &mut self.uniforms,
                window: &self.window_state,
                ring_full_reported: false,
            };

            (self.frame_fn)(&mut frame);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        self.window.pre_present_notify();
        output.present();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_demo_window() {
        let config = AppConfig::default();
        assert_eq!((config.width, config.height), (640, 480));
        assert_eq!(config.clear_color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(config.loop_mode, LoopMode::WaitWhenIdle);
    }

    #[test]
    fn builder_sets_every_field() {
        let config = AppConfig::new()
            .title("Box")
            .size(800, 600)
            .clear_color(0.0, 0.0, 0.0, 1.0)
            .loop_mode(LoopMode::Poll)
            .shader_dir("demos/shaders")
            .logging(LoggingConfig::default().filter("warn"));

        assert_eq!(config.title, "Box");
        assert_eq!((config.width, config.height), (800, 600));
        assert_eq!(config.clear_color, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(config.loop_mode, LoopMode::Poll);
        assert_eq!(config.shader_dir, Path::new("demos/shaders"));
        assert_eq!(config.logging.env_filter.as_deref(), Some("warn"));
    }
}
