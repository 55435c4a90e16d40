//! Opens a white window and loads the point program; Escape closes it.

use tiny_renderer::{AppConfig, Frame, run_with_config};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::new().title("Test").shader_dir("demos/shaders");

    run_with_config(config, |ctx| {
        let program = ctx.load_program("point.vert.wgsl", "point.frag.wgsl")?;
        log::info!("hello window using program '{}'", program.label());

        Ok(move |_frame: &mut Frame| {
            let _program = &program;
        })
    })
}
