//! GPU-resident geometry and draw-call dispatch.
//!
//! A [`Geometry`] is uploaded once from a [`Shape`] and drawn every frame. It
//! never changes after upload: no partial draws, no dynamic updates.
//!
//! - [`Object`] owns the device buffers.
//! - [`Geometry`] is a cheap handle (`Arc<Object>` plus draw mode) that can be
//!   cloned so several logical shapes share one upload.
//! - [`Topology`] picks how the vertex stream is rasterized. Non-indexed
//!   geometry defaults to a closed line loop, indexed geometry to a line list.
//!
//! # Example
//!
//! ```ignore
//! use tiny_renderer::*;
//!
//! let square = Geometry::new(&gpu, &shape::rectangle(-0.5, -0.5, 1.0, 1.0));
//! let cube = Geometry::new(&gpu, &shape::solid_cube(1.0));
//!
//! frame.draw(&square, &program, &uniforms);                       // outline
//! frame.draw_with(&cube, &program, &uniforms, Topology::Triangles); // filled
//! ```

use std::sync::Arc;

use wgpu::util::DeviceExt;

use crate::gpu::GpuContext;
use crate::shape::Shape;
use crate::vertex::{Vertex, VertexKind};

/// How a vertex or index stream is assembled into primitives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topology {
    Points,
    Lines,
    LineStrip,
    /// A line strip that also connects the last element back to the first.
    LineLoop,
    Triangles,
    TriangleStrip,
}

impl Topology {
    /// The wgpu topology used to rasterize this one.
    ///
    /// wgpu has no line loop; it is drawn as a strip over a closing index list.
    pub fn to_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            Topology::Points => wgpu::PrimitiveTopology::PointList,
            Topology::Lines => wgpu::PrimitiveTopology::LineList,
            Topology::LineStrip | Topology::LineLoop => wgpu::PrimitiveTopology::LineStrip,
            Topology::Triangles => wgpu::PrimitiveTopology::TriangleList,
            Topology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
        }
    }

    /// Strip topologies need the index format baked into the pipeline.
    pub fn strip_index_format(self) -> Option<wgpu::IndexFormat> {
        match self.to_wgpu() {
            wgpu::PrimitiveTopology::LineStrip | wgpu::PrimitiveTopology::TriangleStrip => {
                Some(wgpu::IndexFormat::Uint32)
            }
            _ => None,
        }
    }
}

/// The element stream a draw call walks over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Elements {
    /// Non-indexed: `n` vertices in buffer order.
    Vertices(u32),
    /// Indexed: `n` entries of the index buffer.
    Indices(u32),
}

impl Elements {
    /// Number of vertices or indices covered.
    pub fn count(self) -> u32 {
        match self {
            Elements::Vertices(n) | Elements::Indices(n) => n,
        }
    }

    /// Line loop for plain vertex lists, line list for indexed ones.
    pub fn default_topology(self) -> Topology {
        match self {
            Elements::Vertices(_) => Topology::LineLoop,
            Elements::Indices(_) => Topology::Lines,
        }
    }

    /// Plans the single draw call covering every element.
    pub fn draw_call(self, topology: Topology) -> DrawCall {
        DrawCall {
            topology,
            elements: self,
        }
    }
}

/// A planned draw call: one topology over the full element stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawCall {
    pub topology: Topology,
    pub elements: Elements,
}

impl DrawCall {
    /// The device call that realizes this plan.
    pub fn dispatch(self) -> Dispatch {
        match (self.topology, self.elements) {
            (_, elements) if elements.count() == 0 => Dispatch::Skip,
            (Topology::LineLoop, elements) => Dispatch::LoopIndexed(elements.count() + 1),
            (_, Elements::Indices(count)) => Dispatch::Indexed(count),
            (_, Elements::Vertices(count)) => Dispatch::Direct(count),
        }
    }
}

/// Which draw command [`Geometry::draw`] records, with its element count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Nothing to draw.
    Skip,
    /// `draw_indexed` over the loop buffer, first element repeated at the end.
    LoopIndexed(u32),
    /// `draw_indexed` over the shape's index buffer.
    Indexed(u32),
    /// `draw` over the vertex buffer in order.
    Direct(u32),
}

/// Device buffers backing a [`Geometry`].
///
/// Freed when the last [`Geometry`] handle referencing it is dropped.
#[derive(Debug)]
pub struct Object {
    vertex_buffer: wgpu::Buffer,
    index_buffer: Option<wgpu::Buffer>,
    /// `[elements.., first]`, drawn as a strip to emulate a line loop.
    loop_buffer: wgpu::Buffer,
    kind: VertexKind,
}

impl Object {
    fn upload<V: Vertex>(gpu: &GpuContext, shape: &Shape<V>) -> Self {
        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Geometry Vertex Buffer"),
                contents: bytemuck::cast_slice(shape.vertices()),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = shape.indices().map(|indices| {
            gpu.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Geometry Index Buffer"),
                    contents: bytemuck::cast_slice(indices),
                    usage: wgpu::BufferUsages::INDEX,
                })
        });

        let loop_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Geometry Loop Index Buffer"),
                contents: bytemuck::cast_slice(&shape.loop_indices()),
                usage: wgpu::BufferUsages::INDEX,
            });

        log::debug!(
            "uploaded {:?} geometry: {} vertices, {:?}",
            V::KIND,
            shape.vertices().len(),
            shape.elements()
        );

        Self {
            vertex_buffer,
            index_buffer,
            loop_buffer,
            kind: V::KIND,
        }
    }
}

impl Drop for Object {
    fn drop(&mut self) {
        self.vertex_buffer.destroy();
        if let Some(buffer) = &self.index_buffer {
            buffer.destroy();
        }
        self.loop_buffer.destroy();
        log::trace!("released {:?} geometry buffers", self.kind);
    }
}

/// A drawable handle to uploaded geometry.
///
/// Cloning shares the device buffers; they are released with the last clone.
#[derive(Clone, Debug)]
pub struct Geometry {
    object: Arc<Object>,
    elements: Elements,
    topology: Topology,
}

impl Geometry {
    /// Uploads a shape to the GPU.
    pub fn new<V: Vertex>(gpu: &GpuContext, shape: &Shape<V>) -> Self {
        Self {
            object: Arc::new(Object::upload(gpu, shape)),
            elements: shape.elements(),
            topology: shape.elements().default_topology(),
        }
    }

    /// Another handle on the same buffers with a different default topology.
    pub fn with_topology(&self, topology: Topology) -> Self {
        Self {
            object: Arc::clone(&self.object),
            elements: self.elements,
            topology,
        }
    }

    /// The topology used by [`Frame::draw`](crate::Frame::draw).
    pub fn default_topology(&self) -> Topology {
        self.topology
    }

    pub fn vertex_kind(&self) -> VertexKind {
        self.object.kind
    }

    pub fn elements(&self) -> Elements {
        self.elements
    }

    /// `true` when there is no vertex or index to draw.
    pub fn is_empty(&self) -> bool {
        self.elements.count() == 0
    }

    /// The draw call [`draw`](Self::draw) issues for `topology`.
    pub fn draw_call(&self, topology: Topology) -> DrawCall {
        self.elements.draw_call(topology)
    }

    /// Binds the buffers and issues one draw call over every element.
    ///
    /// Empty geometry records nothing.
    ///
    /// The caller has already set a pipeline built for `topology` and this
    /// geometry's [`vertex_kind`](Self::vertex_kind).
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass, topology: Topology) {
        let dispatch = self.draw_call(topology).dispatch();
        if dispatch == Dispatch::Skip {
            return;
        }

        let object = &self.object;
        render_pass.set_vertex_buffer(0, object.vertex_buffer.slice(..));

        match dispatch {
            Dispatch::Skip => {}
            Dispatch::LoopIndexed(count) => {
                let indices = object.loop_buffer.slice(..);
                render_pass.set_index_buffer(indices, wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..count, 0, 0..1);
            }
            Dispatch::Indexed(count) => {
                // Indices(n) only comes from shapes that uploaded an index buffer.
                if let Some(index_buffer) = &object.index_buffer {
                    render_pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    render_pass.draw_indexed(0..count, 0, 0..1);
                }
            }
            Dispatch::Direct(count) => {
                render_pass.draw(0..count, 0..1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_topology_depends_on_indexing() {
        assert_eq!(Elements::Vertices(4).default_topology(), Topology::LineLoop);
        assert_eq!(Elements::Indices(36).default_topology(), Topology::Lines);
    }

    #[test]
    fn draw_call_covers_every_element() {
        let call = Elements::Indices(36).draw_call(Topology::Triangles);
        assert_eq!(call.topology, Topology::Triangles);
        assert_eq!(call.elements.count(), 36);
    }

    #[test]
    fn line_loop_is_rasterized_as_indexed_strip() {
        assert_eq!(Topology::LineLoop.to_wgpu(), wgpu::PrimitiveTopology::LineStrip);
        assert_eq!(
            Topology::LineLoop.strip_index_format(),
            Some(wgpu::IndexFormat::Uint32)
        );
        assert_eq!(Topology::Triangles.strip_index_format(), None);
    }

    #[test]
    fn line_loop_dispatch_closes_over_first_element() {
        let rectangle = Elements::Vertices(4).draw_call(Topology::LineLoop);
        assert_eq!(rectangle.dispatch(), Dispatch::LoopIndexed(5));

        let cube_edges = Elements::Indices(24).draw_call(Topology::LineLoop);
        assert_eq!(cube_edges.dispatch(), Dispatch::LoopIndexed(25));
    }

    #[test]
    fn indexed_elements_dispatch_indexed_for_other_topologies() {
        let topologies = [
            Topology::Points,
            Topology::Lines,
            Topology::LineStrip,
            Topology::Triangles,
            Topology::TriangleStrip,
        ];
        for topology in topologies {
            let cube = Elements::Indices(36).draw_call(topology);
            assert_eq!(cube.dispatch(), Dispatch::Indexed(36), "{topology:?}");

            let rectangle = Elements::Vertices(4).draw_call(topology);
            assert_eq!(rectangle.dispatch(), Dispatch::Direct(4), "{topology:?}");
        }
    }

    #[test]
    fn empty_elements_draw_nothing() {
        let topologies = [
            Topology::Points,
            Topology::Lines,
            Topology::LineStrip,
            Topology::LineLoop,
            Topology::Triangles,
            Topology::TriangleStrip,
        ];
        for topology in topologies {
            for elements in [Elements::Vertices(0), Elements::Indices(0)] {
                assert_eq!(elements.draw_call(topology).dispatch(), Dispatch::Skip);
            }
        }
    }

    #[test]
    fn empty_shapes_plan_a_skipped_draw() {
        use crate::vertex::Vertex2d;

        let plain = Shape::<Vertex2d>::new(vec![]);
        assert!(plain.loop_indices().is_empty());
        assert_eq!(plain.draw_call(Topology::LineLoop).dispatch(), Dispatch::Skip);

        let indexed = Shape::indexed(vec![Vertex2d::new(0.0, 0.0)], vec![]);
        assert_eq!(indexed.draw_call(Topology::Lines).dispatch(), Dispatch::Skip);
    }
}
