//! Two rotating solid cubes through a perspective camera.
//!
//! Depth testing and back-face culling are on. Scroll changes the field of view.

use tiny_renderer::{AppConfig, Frame, LoopMode, Matrix, Topology, Vec3, run_with_config, shape};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::new()
        .title("Cube")
        .loop_mode(LoopMode::Poll)
        .shader_dir("demos/shaders");

    run_with_config(config, |ctx| {
        let program = ctx
            .load_program("color_mvp.vert.wgsl", "normal_point.frag.wgsl")?
            .depth_test(true)
            .cull_back_faces(true);
        let cube = ctx.geometry(&shape::solid_cube(1.0));

        let view = Matrix::look_at(Vec3::new(3.0, 4.0, 5.0), Vec3::ZERO, Vec3::Y);

        Ok(move |frame: &mut Frame| {
            let [x, y] = frame.location();
            let rotation = Matrix::rotate(frame.time, 0.0, 1.0, 0.0);
            let model = Matrix::translate(x, y, 0.0) * rotation;

            let fovy = frame.scale() * 0.01;
            let projection = Matrix::perspective(fovy, frame.aspect(), 1.0, 10.0);

            let uniforms = frame.uniforms().model(model).view(view).projection(projection);
            frame.draw_with(&cube, &program, &uniforms, Topology::Triangles);

            let second = uniforms.model(model * Matrix::translate(0.0, 0.0, 3.0));
            frame.draw_with(&cube, &program, &second, Topology::Triangles);
        })
    })
}
