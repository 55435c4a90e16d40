//! 4×4 column-major transform matrices.
//!
//! [`Matrix`] is a small value type for building model, view and projection
//! transforms by hand. Every factory follows the OpenGL conventions: the camera
//! looks down `-Z`, and projections map the view volume to normalized device
//! coordinates in `[-1, 1]` on all three axes.
//!
//! # Composition
//!
//! `a * b` is the ordinary matrix product, so the right-hand matrix is applied
//! first:
//!
//! ```
//! use tiny_renderer::{Matrix, Vec3};
//!
//! // Scale first, then translate.
//! let model = Matrix::translate(1.0, 0.0, 0.0) * Matrix::scale(2.0, 2.0, 2.0);
//! let p = model.project_point(Vec3::new(1.0, 0.0, 0.0));
//! assert!((p.x - 3.0).abs() < 1e-6);
//! ```
//!
//! # Degenerate inputs
//!
//! Factories never fail. A zero-length rotation axis yields the identity, a
//! colinear look-at yields a translation-only view, and zero projection extents
//! leave the affected terms at their identity values. The numbers produced in
//! those cases are fallbacks, not meaningful transforms.
//!
//! # Memory Layout
//!
//! ```text
//! | 0  4  8 12 |
//! | 1  5  9 13 |
//! | 2  6 10 14 |
//! | 3  7 11 15 |
//! ```

use std::ops::Mul;

use glam::{Mat3, Mat4, Vec3, Vec4};

/// A 4×4 transform stored as 16 floats in column-major order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix([f32; 16]);

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    /// Remaps OpenGL clip depth `[-w, w]` to the `[0, w]` range wgpu clips against.
    ///
    /// Pre-multiply a projection built by this module with it before handing it
    /// to the GPU. [`Uniforms`](crate::Uniforms) does this on upload.
    #[rustfmt::skip]
    pub const GL_TO_WGPU_DEPTH: Matrix = Matrix([
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.5, 0.0,
        0.0, 0.0, 0.5, 1.0,
    ]);

    /// Creates a matrix from 16 column-major values.
    pub const fn from_cols_array(values: [f32; 16]) -> Self {
        Self(values)
    }

    /// Returns the 16 column-major values.
    pub const fn to_cols_array(&self) -> [f32; 16] {
        self.0
    }

    /// Borrows the column-major values, e.g. for `bytemuck::cast_slice`.
    pub fn as_slice(&self) -> &[f32; 16] {
        &self.0
    }

    /// Returns the value at `row`, `column`.
    ///
    /// # Panics
    ///
    /// Panics if either index is greater than 3.
    pub fn get(&self, row: usize, column: usize) -> f32 {
        assert!(row < 4 && column < 4, "matrix index out of range");
        self.0[column * 4 + row]
    }

    /// The identity transform.
    #[rustfmt::skip]
    pub const fn identity() -> Self {
        Self([
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Translation by `(x, y, z)`.
    pub fn translate(x: f32, y: f32, z: f32) -> Self {
        let mut t = Self::identity();
        t.0[12] = x;
        t.0[13] = y;
        t.0[14] = z;
        t
    }

    /// Scaling by `(x, y, z)` around the origin.
    pub fn scale(x: f32, y: f32, z: f32) -> Self {
        let mut t = Self::identity();
        t.0[0] = x;
        t.0[5] = y;
        t.0[10] = z;
        t
    }

    /// Rotation by `theta` radians around the axis `(x, y, z)`.
    ///
    /// The axis does not need to be normalized. A zero-length axis returns the
    /// identity.
    pub fn rotate(theta: f32, x: f32, y: f32, z: f32) -> Self {
        let mut t = Self::identity();
        let d = (x * x + y * y + z * z).sqrt();
        if d <= 0.0 {
            return t;
        }

        // Rodrigues' rotation formula
        let (l, m, n) = (x / d, y / d, z / d);
        let (sin, cos) = theta.sin_cos();
        let k = 1.0 - cos;

        t.0[0] = l * l * k + cos;
        t.0[1] = l * m * k + n * sin;
        t.0[2] = l * n * k - m * sin;

        t.0[4] = l * m * k - n * sin;
        t.0[5] = m * m * k + cos;
        t.0[6] = m * n * k + l * sin;

        t.0[8] = l * n * k + m * sin;
        t.0[9] = m * n * k - l * sin;
        t.0[10] = n * n * k + cos;

        t
    }

    /// View transform for a camera at `eye` looking at `target`.
    ///
    /// `up` only needs to be roughly upward; it is re-orthogonalized against the
    /// view direction. When `eye`, `target` and `up` are colinear (or `eye` equals
    /// `target`) there is no usable basis and only the translation `-eye` is
    /// returned.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let tv = Self::translate(-eye.x, -eye.y, -eye.z);

        // t points from the target back to the eye (camera +Z)
        let t = eye - target;
        let r = up.cross(t);
        let s = t.cross(r);

        if s.length_squared() == 0.0 {
            return tv;
        }

        let (r, s, t) = (r.normalize(), s.normalize(), t.normalize());

        let mut rv = Self::identity();
        rv.0[0] = r.x;
        rv.0[4] = r.y;
        rv.0[8] = r.z;

        rv.0[1] = s.x;
        rv.0[5] = s.y;
        rv.0[9] = s.z;

        rv.0[2] = t.x;
        rv.0[6] = t.y;
        rv.0[10] = t.z;

        rv * tv
    }

    /// Orthographic projection of the box `[left, right] × [bottom, top]`
    /// between the `z_near` and `z_far` planes.
    pub fn orthogonal(
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        z_near: f32,
        z_far: f32,
    ) -> Self {
        let mut t = Self::identity();
        let dx = right - left;
        let dy = top - bottom;
        let dz = z_far - z_near;

        if dx != 0.0 && dy != 0.0 && dz != 0.0 {
            t.0[0] = 2.0 / dx;
            t.0[5] = 2.0 / dy;
            t.0[10] = -2.0 / dz;
            t.0[12] = -(right + left) / dx;
            t.0[13] = -(top + bottom) / dy;
            t.0[14] = -(z_far + z_near) / dz;
        }

        t
    }

    /// Perspective projection of an arbitrary view frustum.
    ///
    /// `left`, `right`, `bottom` and `top` are measured on the near plane.
    pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, z_near: f32, z_far: f32) -> Self {
        let mut t = Self::identity();
        let dx = right - left;
        let dy = top - bottom;
        let dz = z_far - z_near;

        if dx != 0.0 && dy != 0.0 && dz != 0.0 {
            t.0[0] = 2.0 * z_near / dx;
            t.0[5] = 2.0 * z_near / dy;
            t.0[8] = (right + left) / dx;
            t.0[9] = (top + bottom) / dy;
            t.0[10] = -(z_far + z_near) / dz;
            t.0[11] = -1.0;
            t.0[14] = -2.0 * z_far * z_near / dz;
            t.0[15] = 0.0;
        }

        t
    }

    /// Symmetric perspective projection.
    ///
    /// `fovy` is the vertical field of view in radians and `aspect` is
    /// width / height.
    pub fn perspective(fovy: f32, aspect: f32, z_near: f32, z_far: f32) -> Self {
        let mut t = Self::identity();
        let dz = z_far - z_near;

        if dz != 0.0 {
            let f = 1.0 / (fovy * 0.5).tan();
            t.0[0] = f / aspect;
            t.0[5] = f;
            t.0[10] = -(z_far + z_near) / dz;
            t.0[11] = -1.0;
            t.0[14] = -2.0 * z_far * z_near / dz;
            t.0[15] = 0.0;
        }

        t
    }

    /// Transform for surface normals: the cofactor matrix of the upper-left 3×3 block.
    ///
    /// The cofactor matrix equals `det * inverse().transpose()`, so directions are
    /// correct but lengths are scaled by the determinant. Normalize the result in
    /// the shader.
    pub fn normal_matrix(&self) -> Mat3 {
        let c0 = Vec3::new(self.0[0], self.0[1], self.0[2]);
        let c1 = Vec3::new(self.0[4], self.0[5], self.0[6]);
        let c2 = Vec3::new(self.0[8], self.0[9], self.0[10]);

        Mat3::from_cols(c1.cross(c2), c2.cross(c0), c0.cross(c1))
    }

    /// Multiplies a homogeneous vector.
    pub fn transform(&self, v: Vec4) -> Vec4 {
        Mat4::from(*self) * v
    }

    /// Transforms a point and applies the perspective divide.
    pub fn project_point(&self, p: Vec3) -> Vec3 {
        let v = self.transform(p.extend(1.0));
        v.truncate() / v.w
    }
}

impl Mul for Matrix {
    type Output = Matrix;

    fn mul(self, m: Matrix) -> Matrix {
        let mut t = [0.0; 16];
        for (i, value) in t.iter_mut().enumerate() {
            let (j, k) = (i & 3, i & !3);
            *value = self.0[j] * m.0[k]
                + self.0[4 + j] * m.0[k + 1]
                + self.0[8 + j] * m.0[k + 2]
                + self.0[12 + j] * m.0[k + 3];
        }
        Matrix(t)
    }
}

impl From<Matrix> for Mat4 {
    fn from(m: Matrix) -> Self {
        Mat4::from_cols_array(&m.0)
    }
}

impl From<Mat4> for Matrix {
    fn from(m: Mat4) -> Self {
        Matrix(m.to_cols_array())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_3};

    const EPS: f32 = 1e-5;

    fn assert_close(a: &Matrix, b: &Matrix) {
        for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
            assert!((x - y).abs() < EPS, "{a:?} != {b:?}");
        }
    }

    fn samples() -> Vec<Matrix> {
        vec![
            Matrix::translate(1.0, -2.0, 3.5),
            Matrix::scale(2.0, 0.5, 4.0),
            Matrix::rotate(0.7, 1.0, 2.0, 3.0),
            Matrix::translate(1.0, 2.0, 3.0) * Matrix::rotate(FRAC_PI_3, 0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn identity_is_neutral_for_products() {
        let id = Matrix::identity();
        for m in samples() {
            assert_eq!(id * m, m);
            assert_eq!(m * id, m);
        }
    }

    #[test]
    fn product_applies_right_hand_side_first() {
        let m = Matrix::translate(1.0, 0.0, 0.0) * Matrix::scale(2.0, 2.0, 2.0);
        let p = m.project_point(Vec3::new(1.0, 1.0, 1.0));
        assert!((p - Vec3::new(3.0, 2.0, 2.0)).length() < EPS);
    }

    #[test]
    fn product_matches_glam() {
        let a = Matrix::rotate(0.3, 0.0, 0.0, 1.0) * Matrix::translate(0.0, 1.0, 0.0);
        let rotation = Mat4::from(Matrix::rotate(0.3, 0.0, 0.0, 1.0));
        let b = Matrix::from(rotation * Mat4::from_translation(Vec3::Y));
        assert_close(&a, &b);
    }

    #[test]
    fn rotate_keeps_axis_fixed() {
        let axis = Vec3::new(1.0, 2.0, -3.0);
        for theta in [0.0, 0.4, 1.3, 3.0, -2.2] {
            let r = Matrix::rotate(theta, axis.x, axis.y, axis.z);
            let v = r.project_point(axis * 2.0);
            assert!((v - axis * 2.0).length() < 1e-4, "theta {theta}: {v:?}");
        }
    }

    #[test]
    fn rotate_quarter_turn_about_y() {
        let r = Matrix::rotate(FRAC_PI_2, 0.0, 1.0, 0.0);
        let v = r.project_point(Vec3::X);
        assert!((v - Vec3::new(0.0, 0.0, -1.0)).length() < EPS);
    }

    #[test]
    fn rotate_zero_axis_is_identity() {
        assert_eq!(Matrix::rotate(1.0, 0.0, 0.0, 0.0), Matrix::identity());
    }

    #[test]
    fn look_at_moves_eye_to_origin_and_target_down_negative_z() {
        let eye = Vec3::new(3.0, 4.0, 5.0);
        let view = Matrix::look_at(eye, Vec3::ZERO, Vec3::Y);

        assert!(view.project_point(eye).length() < EPS);

        let target = view.project_point(Vec3::ZERO);
        assert!(target.x.abs() < EPS);
        assert!(target.y.abs() < EPS);
        assert!((target.z + eye.length()).abs() < 1e-4);
    }

    #[test]
    fn look_at_colinear_falls_back_to_translation() {
        let eye = Vec3::new(0.0, 5.0, 0.0);
        let view = Matrix::look_at(eye, Vec3::ZERO, Vec3::Y);
        assert_eq!(view, Matrix::translate(0.0, -5.0, 0.0));

        let same = Matrix::look_at(eye, eye, Vec3::Y);
        assert_eq!(same, Matrix::translate(0.0, -5.0, 0.0));
    }

    #[test]
    fn perspective_maps_near_and_far_to_depth_range() {
        let p = Matrix::perspective(FRAC_PI_2, 1.0, 1.0, 10.0);

        let near = p.project_point(Vec3::new(0.0, 0.0, -1.0));
        let far = p.project_point(Vec3::new(0.0, 0.0, -10.0));
        assert!((near.z + 1.0).abs() < EPS);
        assert!((far.z - 1.0).abs() < EPS);

        // 90° field of view: the top of the near plane sits at y = near
        let edge = p.project_point(Vec3::new(0.0, 1.0, -1.0));
        assert!((edge.y - 1.0).abs() < EPS);
    }

    #[test]
    fn frustum_matches_symmetric_perspective() {
        let f = Matrix::frustum(-1.0, 1.0, -1.0, 1.0, 1.0, 10.0);
        let p = Matrix::perspective(FRAC_PI_2, 1.0, 1.0, 10.0);
        assert_close(&f, &p);
    }

    #[test]
    fn orthogonal_maps_box_boundaries() {
        let o = Matrix::orthogonal(-1.0, 1.0, -1.0, 1.0, 1.0, 10.0);

        let near = o.project_point(Vec3::new(0.0, 0.0, -1.0));
        let far = o.project_point(Vec3::new(0.0, 0.0, -10.0));
        assert!((near - Vec3::new(0.0, 0.0, -1.0)).length() < EPS);
        assert!((far - Vec3::new(0.0, 0.0, 1.0)).length() < EPS);

        let corner = o.project_point(Vec3::new(1.0, -1.0, -1.0));
        assert!((corner.x - 1.0).abs() < EPS);
        assert!((corner.y + 1.0).abs() < EPS);
    }

    #[test]
    fn zero_extents_fall_back_to_identity() {
        assert_eq!(Matrix::orthogonal(1.0, 1.0, -1.0, 1.0, 1.0, 10.0), Matrix::identity());
        assert_eq!(Matrix::frustum(-1.0, 1.0, 2.0, 2.0, 1.0, 10.0), Matrix::identity());
        assert_eq!(Matrix::perspective(1.0, 1.0, 5.0, 5.0), Matrix::identity());
    }

    #[test]
    fn normal_matrix_of_rotation_is_the_rotation() {
        let r = Matrix::rotate(0.9, 1.0, 1.0, 0.0);
        let n = r.normal_matrix();
        let expected = Mat3::from_mat4(Mat4::from(r));
        assert!(n.abs_diff_eq(expected, EPS));
    }

    #[test]
    fn normal_matrix_is_proportional_to_inverse_transpose() {
        let m = Matrix::scale(2.0, 1.0, 0.5) * Matrix::rotate(0.4, 0.0, 0.0, 1.0);
        let n = m.normal_matrix();
        let m3 = Mat3::from_mat4(Mat4::from(m));
        let expected = m3.inverse().transpose() * m3.determinant();
        assert!(n.abs_diff_eq(expected, EPS));
    }

    #[test]
    fn depth_remap_moves_gl_range_into_unit_range() {
        let p = Matrix::GL_TO_WGPU_DEPTH * Matrix::perspective(FRAC_PI_2, 1.0, 1.0, 10.0);
        let near = p.project_point(Vec3::new(0.0, 0.0, -1.0));
        let far = p.project_point(Vec3::new(0.0, 0.0, -10.0));
        assert!(near.z.abs() < EPS);
        assert!((far.z - 1.0).abs() < EPS);
    }

    #[test]
    fn get_reads_row_and_column() {
        let t = Matrix::translate(1.0, 2.0, 3.0);
        assert_eq!(t.get(0, 3), 1.0);
        assert_eq!(t.get(1, 3), 2.0);
        assert_eq!(t.get(2, 3), 3.0);
        assert_eq!(t.get(3, 3), 1.0);
    }
}
