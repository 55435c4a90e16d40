//! A square that stays square when the window is resized.

use tiny_renderer::{AppConfig, Frame, run_with_config, shape};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::new().title("Box keeping aspect").shader_dir("demos/shaders");

    run_with_config(config, |ctx| {
        let program = ctx.load_program("keep_aspect.vert.wgsl", "point.frag.wgsl")?;
        let rect = ctx.geometry(&shape::rectangle(-0.5, -0.5, 1.0, 1.0));

        Ok(move |frame: &mut Frame| {
            let uniforms = frame.uniforms();
            frame.draw(&rect, &program, &uniforms);
        })
    })
}
