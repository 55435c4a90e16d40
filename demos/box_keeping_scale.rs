//! A square of fixed pixel size. Scroll to zoom, arrows or drag to move it.

use tiny_renderer::{AppConfig, Frame, run_with_config, shape};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::new().title("Box keeping scale").shader_dir("demos/shaders");

    run_with_config(config, |ctx| {
        let program = ctx.load_program("keep_scale.vert.wgsl", "point.frag.wgsl")?;
        let rect = ctx.geometry(&shape::rectangle(-0.5, -0.5, 1.0, 1.0));

        Ok(move |frame: &mut Frame| {
            let uniforms = frame.uniforms();
            frame.draw(&rect, &program, &uniforms);
        })
    })
}
