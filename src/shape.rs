//! CPU-side shapes and the built-in primitives.
//!
//! A [`Shape`] is the vertex (and optional index) data of a geometry before it
//! is uploaded with [`Geometry::new`](crate::Geometry::new). Everything here is
//! plain data, so shapes can be built and inspected without a GPU.

use std::f32::consts::{PI, TAU};

use crate::geometry::{DrawCall, Elements, Topology};
use crate::vertex::{LitVertex3d, Vertex, Vertex2d, Vertex3d};

/// Vertex data plus an optional index list, fixed once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Shape<V: Vertex> {
    vertices: Vec<V>,
    indices: Option<Vec<u32>>,
}

impl<V: Vertex> Shape<V> {
    /// A non-indexed shape; drawn as a line loop unless told otherwise.
    pub fn new(vertices: Vec<V>) -> Self {
        Self {
            vertices,
            indices: None,
        }
    }

    /// An indexed shape; drawn as a line list unless told otherwise.
    ///
    /// # Panics
    ///
    /// Panics if an index does not refer to a vertex.
    pub fn indexed(vertices: Vec<V>, indices: Vec<u32>) -> Self {
        assert!(
            indices.iter().all(|&i| (i as usize) < vertices.len()),
            "index out of range for {} vertices",
            vertices.len()
        );
        Self {
            vertices,
            indices: Some(indices),
        }
    }

    pub fn vertices(&self) -> &[V] {
        &self.vertices
    }

    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    pub fn elements(&self) -> Elements {
        match &self.indices {
            Some(indices) => Elements::Indices(indices.len() as u32),
            None => Elements::Vertices(self.vertices.len() as u32),
        }
    }

    /// The draw call this shape produces once uploaded.
    pub fn draw_call(&self, topology: Topology) -> DrawCall {
        self.elements().draw_call(topology)
    }

    /// The element stream with its first element appended, closing a line loop.
    pub fn loop_indices(&self) -> Vec<u32> {
        let mut indices = match &self.indices {
            Some(indices) => indices.clone(),
            None => (0..self.vertices.len() as u32).collect(),
        };
        if let Some(&first) = indices.first() {
            indices.push(first);
        }
        indices
    }
}

/// Axis-aligned rectangle with its lower-left corner at `(x, y)`.
pub fn rectangle(x: f32, y: f32, w: f32, h: f32) -> Shape<Vertex2d> {
    Shape::new(vec![
        Vertex2d::new(x, y),
        Vertex2d::new(x + w, y),
        Vertex2d::new(x + w, y + h),
        Vertex2d::new(x, y + h),
    ])
}

/// Octahedron outline with vertices at distance `s` on each axis.
///
/// The twelve vertices trace every edge in a single line loop.
pub fn octahedron(s: f32) -> Shape<Vertex3d> {
    Shape::new(vec![
        Vertex3d::new(0.0, s, 0.0),
        Vertex3d::new(-s, 0.0, 0.0),
        Vertex3d::new(0.0, -s, 0.0),
        Vertex3d::new(s, 0.0, 0.0),
        Vertex3d::new(0.0, s, 0.0),
        Vertex3d::new(0.0, 0.0, s),
        Vertex3d::new(0.0, -s, 0.0),
        Vertex3d::new(0.0, 0.0, -s),
        Vertex3d::new(-s, 0.0, 0.0),
        Vertex3d::new(0.0, 0.0, s),
        Vertex3d::new(s, 0.0, 0.0),
        Vertex3d::new(0.0, 0.0, -s),
    ])
}

fn cube_corners(s: f32) -> [[f32; 3]; 8] {
    let h = s * 0.5;
    [
        [-h, -h, -h],
        [h, -h, -h],
        [h, h, -h],
        [-h, h, -h],
        [-h, -h, h],
        [h, -h, h],
        [h, h, h],
        [-h, h, h],
    ]
}

/// Cube of edge length `s` as 12 edges (24 indices, line list).
pub fn wire_cube(s: f32) -> Shape<Vertex3d> {
    let vertices = cube_corners(s)
        .iter()
        .map(|&[x, y, z]| Vertex3d::new(x, y, z))
        .collect();

    #[rustfmt::skip]
    let indices = vec![
        0, 1, 1, 2, 2, 3, 3, 0, // back
        4, 5, 5, 6, 6, 7, 7, 4, // front
        0, 4, 1, 5, 2, 6, 3, 7, // sides
    ];

    Shape::indexed(vertices, indices)
}

/// Cube of edge length `s` from 8 shared corners and 36 triangle indices.
///
/// Faces wind counter-clockwise seen from outside. Each corner's normal points
/// away from the center, which gives a smooth color gradient rather than flat
/// faces.
pub fn solid_cube(s: f32) -> Shape<LitVertex3d> {
    let vertices = cube_corners(s)
        .iter()
        .map(|&p| {
            let n = glam::Vec3::from(p).normalize_or_zero();
            LitVertex3d::new(p, n.to_array())
        })
        .collect();

    #[rustfmt::skip]
    let indices = vec![
        4, 5, 6, 4, 6, 7, // front (Z+)
        1, 0, 3, 1, 3, 2, // back (Z-)
        5, 1, 2, 5, 2, 6, // right (X+)
        0, 4, 7, 0, 7, 3, // left (X-)
        7, 6, 2, 7, 2, 3, // top (Y+)
        0, 1, 5, 0, 5, 4, // bottom (Y-)
    ];

    Shape::indexed(vertices, indices)
}

/// UV sphere of the given radius centered at the origin.
///
/// `slices` divide the equator and `stacks` run pole to pole. Produces
/// `(slices + 1) * (stacks + 1)` vertices and `slices * stacks * 6` triangle
/// indices, wound counter-clockwise seen from outside.
pub fn sphere(radius: f32, slices: u32, stacks: u32) -> Shape<LitVertex3d> {
    let slices = slices.max(3);
    let stacks = stacks.max(2);

    let mut vertices = Vec::with_capacity(((slices + 1) * (stacks + 1)) as usize);
    for stack in 0..=stacks {
        let phi = PI * stack as f32 / stacks as f32;
        let (ring_radius, y) = phi.sin_cos();

        for slice in 0..=slices {
            let theta = TAU * slice as f32 / slices as f32;
            let (sin, cos) = theta.sin_cos();
            let normal = [ring_radius * cos, y, ring_radius * sin];
            let position = normal.map(|c| c * radius);
            vertices.push(LitVertex3d::new(position, normal));
        }
    }

    let mut indices = Vec::with_capacity((slices * stacks * 6) as usize);
    for stack in 0..stacks {
        for slice in 0..slices {
            let current = stack * (slices + 1) + slice;
            let next = current + slices + 1;

            indices.extend_from_slice(&[current, current + 1, next]);
            indices.extend_from_slice(&[current + 1, next + 1, next]);
        }
    }

    Shape::indexed(vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn position(v: &LitVertex3d) -> Vec3 {
        Vec3::from(v.position)
    }

    /// Every triangle's normal should point away from the origin.
    fn assert_outward_ccw(shape: &Shape<LitVertex3d>) {
        let vertices = shape.vertices();
        for tri in shape.indices().unwrap().chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| position(&vertices[i as usize]));
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            if normal.length() > 1e-6 {
                assert!(normal.dot(centroid) > 0.0, "inward triangle {tri:?}");
            }
        }
    }

    #[test]
    fn rectangle_draws_one_loop_over_four_vertices() {
        let rect = rectangle(-0.5, -0.5, 1.0, 1.0);
        assert_eq!(
            rect.vertices(),
            &[
                Vertex2d::new(-0.5, -0.5),
                Vertex2d::new(0.5, -0.5),
                Vertex2d::new(0.5, 0.5),
                Vertex2d::new(-0.5, 0.5),
            ]
        );

        let call = rect.draw_call(rect.elements().default_topology());
        assert_eq!(call.topology, Topology::LineLoop);
        assert_eq!(call.elements, Elements::Vertices(4));
    }

    #[test]
    fn loop_indices_close_the_outline() {
        let rect = rectangle(0.0, 0.0, 1.0, 1.0);
        assert_eq!(rect.loop_indices(), vec![0, 1, 2, 3, 0]);

        let cube = wire_cube(1.0);
        let closed = cube.loop_indices();
        assert_eq!(closed.len(), 25);
        assert_eq!(closed.first(), closed.last());
    }

    #[test]
    fn solid_cube_draws_thirty_six_indices() {
        let cube = solid_cube(1.0);
        assert_eq!(cube.vertices().len(), 8);

        let call = cube.draw_call(Topology::Triangles);
        assert_eq!(call.elements, Elements::Indices(36));
        assert_eq!(cube.elements().default_topology(), Topology::Lines);
        assert_outward_ccw(&cube);
    }

    #[test]
    fn wire_cube_has_twelve_edges() {
        let cube = wire_cube(2.0);
        assert_eq!(cube.elements(), Elements::Indices(24));
        assert_eq!(cube.vertices()[6], Vertex3d::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn octahedron_is_a_single_loop() {
        let shape = octahedron(1.0);
        assert_eq!(shape.elements(), Elements::Vertices(12));
        assert!(shape.indices().is_none());
    }

    #[test]
    fn sphere_counts_and_winding() {
        let shape = sphere(2.0, 16, 8);
        assert_eq!(shape.vertices().len(), 17 * 9);
        assert_eq!(shape.elements(), Elements::Indices(16 * 8 * 6));
        assert_outward_ccw(&shape);

        for v in shape.vertices() {
            assert!((position(v).length() - 2.0).abs() < 1e-4);
            assert!((Vec3::from(v.normal).length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    #[should_panic(expected = "index out of range")]
    fn indexed_rejects_dangling_indices() {
        Shape::indexed(vec![Vertex3d::new(0.0, 0.0, 0.0)], vec![0, 1]);
    }
}
