//! CPU-side geometry buffers and the builders effects use to fill them.

mod curve;
mod primitives;
mod tube;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

pub use curve::{CatmullRomCurve3, CurveType, ARC_LENGTH_DIVISIONS};
pub use primitives::{BoxParameters, PlaneParameters};
pub use tube::{FrenetFrames, TubeParameters};

/// Interleaved vertex layout uploaded to the renderer.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, uv: [f32; 2]) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv,
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

/// How the index buffer (or the vertex order, when unindexed) is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Triangles,
    Lines,
    LineStrip,
    LineLoop,
    Points,
}

/// The parameters a geometry was generated from.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryKind {
    Tube(TubeParameters),
    Box(BoxParameters),
    Plane(PlaneParameters),
    Polyline,
    Points,
}

/// Vertex and index data for one mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub topology: Topology,
    pub kind: GeometryKind,
}

impl Geometry {
    /// Unindexed points.
    pub fn points(positions: &[Vec3]) -> Self {
        let vertices = positions
            .iter()
            .map(|p| Vertex::new(*p, p.normalize_or_zero(), [0.0, 0.0]))
            .collect();
        Self {
            vertices,
            indices: Vec::new(),
            topology: Topology::Points,
            kind: GeometryKind::Points,
        }
    }

    /// Connected line through the positions, optionally closed into a loop.
    pub fn polyline(positions: &[Vec3], closed: bool) -> Self {
        let last = positions.len().saturating_sub(1).max(1) as f32;
        let vertices = positions
            .iter()
            .enumerate()
            .map(|(i, p)| Vertex::new(*p, Vec3::Y, [i as f32 / last, 0.0]))
            .collect();
        Self {
            vertices,
            indices: Vec::new(),
            topology: if closed {
                Topology::LineLoop
            } else {
                Topology::LineStrip
            },
            kind: GeometryKind::Polyline,
        }
    }

    /// Disconnected segments, one per pair of endpoints.
    pub fn segments(segments: &[(Vec3, Vec3)]) -> Self {
        let mut vertices = Vec::with_capacity(segments.len() * 2);
        let mut indices = Vec::with_capacity(segments.len() * 2);
        for (start, end) in segments {
            let base = vertices.len() as u32;
            vertices.push(Vertex::new(*start, Vec3::Y, [0.0, 0.0]));
            vertices.push(Vertex::new(*end, Vec3::Y, [1.0, 0.0]));
            indices.extend_from_slice(&[base, base + 1]);
        }
        Self {
            vertices,
            indices,
            topology: Topology::Lines,
            kind: GeometryKind::Polyline,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of primitives (triangles, segments or points) drawn.
    pub fn primitive_count(&self) -> usize {
        let elements = if self.indices.is_empty() {
            self.vertices.len()
        } else {
            self.indices.len()
        };
        match self.topology {
            Topology::Triangles => elements / 3,
            Topology::Lines => elements / 2,
            Topology::LineStrip => elements.saturating_sub(1),
            Topology::LineLoop => {
                if elements > 1 {
                    elements
                } else {
                    0
                }
            }
            Topology::Points => elements,
        }
    }

    /// The curve a tube was swept along.
    pub fn path(&self) -> Option<&CatmullRomCurve3> {
        match &self.kind {
            GeometryKind::Tube(params) => Some(&params.path),
            _ => None,
        }
    }

    /// Raw vertex bytes as they would be uploaded.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Size of both buffers in bytes.
    pub fn byte_size(&self) -> usize {
        self.vertex_bytes().len() + self.index_bytes().len()
    }

    /// Axis-aligned bounds of the vertex positions.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut positions = self.vertices.iter().map(Vertex::position);
        let first = positions.next()?;
        Some(positions.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }

    /// Recomputes smooth normals for indexed triangle geometry.
    pub fn compute_vertex_normals(&mut self) {
        if self.topology != Topology::Triangles {
            return;
        }
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];
        for tri in self.indices.chunks_exact(3) {
            let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let pa = self.vertices[a].position();
            let pb = self.vertices[b].position();
            let pc = self.vertices[c].position();
            let face = (pc - pb).cross(pa - pb);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }
        for (vertex, normal) in self.vertices.iter_mut().zip(normals) {
            vertex.normal = normal.normalize_or_zero().to_array();
        }
    }
}
