//! The scale box again, with the scaling and panning done by a model matrix.

use tiny_renderer::{AppConfig, Frame, Matrix, Shape, Vertex2d, run_with_config};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::new().title("Box MVP").shader_dir("demos/shaders");

    run_with_config(config, |ctx| {
        let program = ctx.load_program("mvp.vert.wgsl", "point.frag.wgsl")?;
        let rect = ctx.geometry(&Shape::new(vec![
            Vertex2d::new(-0.5, -0.5),
            Vertex2d::new(0.5, -0.5),
            Vertex2d::new(0.5, 0.5),
            Vertex2d::new(-0.5, 0.5),
        ]));

        Ok(move |frame: &mut Frame| {
            let scale = frame.scale() * 2.0;
            let scaling = Matrix::scale(scale / frame.width(), scale / frame.height(), 1.0);

            let [x, y] = frame.location();
            let translation = Matrix::translate(x, y, 0.0);

            let uniforms = frame.uniforms().model(translation * scaling);
            frame.draw(&rect, &program, &uniforms);
        })
    })
}
