use tiny_renderer::shape;
use tiny_renderer::{
    Elements, InputEvent, KeyCode, Matrix, Topology, Uniforms, Vec3, Vec4, WindowState,
};

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

#[test]
fn test_model_matrix_keeps_box_at_scale_pixels() {
    let window = WindowState::new(640, 480);
    let scale = window.scale() * 2.0;
    let model = Matrix::translate(0.0, 0.0, 0.0)
        * Matrix::scale(scale / window.width(), scale / window.height(), 1.0);

    // Unit box corner lands half a box (scale / 2 pixels) from the center
    let corner = model.project_point(Vec3::new(0.5, 0.5, 0.0));
    let pixels_x = corner.x * window.width() / 2.0;
    let pixels_y = corner.y * window.height() / 2.0;
    assert!(close(pixels_x, 50.0));
    assert!(close(pixels_y, 50.0));
}

#[test]
fn test_panned_box_follows_window_location() {
    let mut window = WindowState::new(100, 100);
    window.apply(&InputEvent::Key {
        code: KeyCode::ArrowRight,
        pressed: true,
    });
    for _ in 0..5 {
        window.step();
    }

    let [x, y] = window.location();
    let model = Matrix::translate(x, y, 0.0);
    let center = model.project_point(Vec3::ZERO);
    assert!(close(center.x, 0.1));
    assert!(close(center.y, 0.0));
}

#[test]
fn test_orthographic_camera_centers_target() {
    let view = Matrix::look_at(Vec3::new(3.0, 4.0, 5.0), Vec3::ZERO, Vec3::Y);
    let projection = Matrix::orthogonal(-3.2, 3.2, -2.4, 2.4, 1.0, 10.0);

    let clip = (projection * view).transform(Vec4::new(0.0, 0.0, 0.0, 1.0));
    assert!(close(clip.x, 0.0));
    assert!(close(clip.y, 0.0));
    assert!(clip.z > -1.0 && clip.z < 1.0);
    assert!(close(clip.w, 1.0));
}

#[test]
fn test_perspective_camera_sees_both_cubes() {
    let view = Matrix::look_at(Vec3::new(3.0, 4.0, 5.0), Vec3::ZERO, Vec3::Y);
    let projection = Matrix::perspective(1.0, 640.0 / 480.0, 1.0, 10.0);
    let view_projection = projection * view;

    for offset in [0.0, 3.0] {
        let model = Matrix::translate(0.0, 0.0, offset);
        let ndc = (view_projection * model).project_point(Vec3::ZERO);
        assert!(ndc.x.abs() <= 1.0, "x out of view: {ndc:?}");
        assert!(ndc.y.abs() <= 1.0, "y out of view: {ndc:?}");
        assert!(ndc.z > -1.0 && ndc.z < 1.0, "z clipped: {ndc:?}");
    }
}

#[test]
fn test_uploaded_projection_uses_zero_to_one_depth() {
    let projection = Matrix::perspective(1.0, 1.0, 1.0, 10.0);
    let packed = Uniforms::default().projection(projection).to_gpu();
    let uploaded = Matrix::from_cols_array(packed.projection);

    let near = uploaded.project_point(Vec3::new(0.0, 0.0, -1.0));
    let far = uploaded.project_point(Vec3::new(0.0, 0.0, -10.0));
    assert!(close(near.z, 0.0));
    assert!(close(far.z, 1.0));
}

#[test]
fn test_shapes_describe_their_draw_calls() {
    let rect = shape::rectangle(-0.5, -0.5, 1.0, 1.0);
    let call = rect.draw_call(Topology::LineLoop);
    assert_eq!(call.elements, Elements::Vertices(4));
    assert_eq!(rect.loop_indices(), vec![0, 1, 2, 3, 0]);

    let cube = shape::solid_cube(1.0);
    let call = cube.draw_call(Topology::Triangles);
    assert_eq!(call.elements, Elements::Indices(36));

    let sphere = shape::sphere(1.0, 32, 16);
    assert_eq!(sphere.vertices().len(), 33 * 17);
    assert_eq!(sphere.elements(), Elements::Indices(32 * 16 * 6));
}
