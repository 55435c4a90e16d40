//! A sphere with per-vertex normals shaded by a directional light.

use tiny_renderer::{AppConfig, Frame, LoopMode, Matrix, Topology, Vec3, run_with_config, shape};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::new()
        .title("Lit sphere")
        .clear_color(0.1, 0.1, 0.15, 1.0)
        .loop_mode(LoopMode::Poll)
        .shader_dir("demos/shaders");

    run_with_config(config, |ctx| {
        let program = ctx
            .load_program("lambert.vert.wgsl", "lambert.frag.wgsl")?
            .depth_test(true)
            .cull_back_faces(true);
        let sphere = ctx
            .geometry(&shape::sphere(1.0, 32, 16))
            .with_topology(Topology::Triangles);

        let view = Matrix::look_at(Vec3::new(0.0, 1.0, 4.0), Vec3::ZERO, Vec3::Y);

        Ok(move |frame: &mut Frame| {
            let [x, y] = frame.location();
            let spin = Matrix::rotate(frame.time * 0.5, 0.0, 1.0, 0.0);
            let model = Matrix::translate(x, y, 0.0) * spin;

            let fovy = frame.scale() * 0.01;
            let projection = Matrix::perspective(fovy, frame.aspect(), 1.0, 10.0);

            let uniforms = frame.uniforms().model(model).view(view).projection(projection);
            frame.draw(&sphere, &program, &uniforms);
        })
    })
}
