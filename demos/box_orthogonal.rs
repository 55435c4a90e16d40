//! The model-matrix box seen from (3, 4, 5) through an orthographic camera.

use tiny_renderer::{AppConfig, Frame, Matrix, Vec3, run_with_config, shape};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::new().title("Box orthogonal").shader_dir("demos/shaders");

    run_with_config(config, |ctx| {
        let program = ctx.load_program("mvp.vert.wgsl", "point.frag.wgsl")?;
        let rect = ctx.geometry(&shape::rectangle(-0.5, -0.5, 1.0, 1.0));

        let view = Matrix::look_at(Vec3::new(3.0, 4.0, 5.0), Vec3::ZERO, Vec3::Y);

        Ok(move |frame: &mut Frame| {
            let (width, height) = (frame.width(), frame.height());
            let scale = frame.scale() * 2.0;

            let [x, y] = frame.location();
            let model =
                Matrix::translate(x, y, 0.0) * Matrix::scale(scale / width, scale / height, 1.0);

            let (w, h) = (width / scale, height / scale);
            let projection = Matrix::orthogonal(-w, w, -h, h, 1.0, 10.0);

            let uniforms = frame.uniforms().model(model).view(view).projection(projection);
            frame.draw(&rect, &program, &uniforms);
        })
    })
}
