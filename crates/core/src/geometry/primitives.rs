use glam::Vec3;

use super::{Geometry, GeometryKind, Topology, Vertex};

/// Axis-aligned box centred on the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxParameters {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl BoxParameters {
    pub fn new(width: f32, height: f32, depth: f32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Four vertices and two triangles per face.
    pub fn build(self) -> Geometry {
        let half = Vec3::new(self.width, self.height, self.depth) * 0.5;
        // (normal, u axis, v axis) for each face
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, u, v) in faces {
            let base = vertices.len() as u32;
            let centre = normal * half;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let position = centre + u * half * su + v * half * sv;
                let uv = [(su + 1.0) * 0.5, (sv + 1.0) * 0.5];
                vertices.push(Vertex::new(position, normal, uv));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Geometry {
            vertices,
            indices,
            topology: Topology::Triangles,
            kind: GeometryKind::Box(self),
        }
    }
}

/// Flat grid lying in the XZ plane, centred on the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneParameters {
    pub width: f32,
    pub depth: f32,
    pub width_segments: usize,
    pub depth_segments: usize,
}

impl PlaneParameters {
    pub fn new(width: f32, depth: f32, width_segments: usize, depth_segments: usize) -> Self {
        Self {
            width,
            depth,
            width_segments: width_segments.max(1),
            depth_segments: depth_segments.max(1),
        }
    }

    /// Vertices per row.
    pub fn columns(&self) -> usize {
        self.width_segments + 1
    }

    pub fn rows(&self) -> usize {
        self.depth_segments + 1
    }

    /// Row-major vertices, row 0 at the back (negative z).
    pub fn build(self) -> Geometry {
        let columns = self.columns();
        let rows = self.rows();
        let half_width = self.width / 2.0;
        let half_depth = self.depth / 2.0;

        let mut vertices = Vec::with_capacity(columns * rows);
        for z in 0..rows {
            for x in 0..columns {
                let u = x as f32 / self.width_segments as f32;
                let v = z as f32 / self.depth_segments as f32;
                let position = Vec3::new(u * self.width - half_width, 0.0, v * self.depth - half_depth);
                vertices.push(Vertex::new(position, Vec3::Y, [u, v]));
            }
        }

        // Counter-clockwise seen from +y.
        let mut indices = Vec::with_capacity(self.width_segments * self.depth_segments * 6);
        for z in 0..self.depth_segments {
            for x in 0..self.width_segments {
                let top_left = (z * columns + x) as u32;
                let top_right = top_left + 1;
                let bottom_left = ((z + 1) * columns + x) as u32;
                let bottom_right = bottom_left + 1;
                indices.extend_from_slice(&[
                    top_left,
                    bottom_left,
                    top_right,
                    top_right,
                    bottom_left,
                    bottom_right,
                ]);
            }
        }

        Geometry {
            vertices,
            indices,
            topology: Topology::Triangles,
            kind: GeometryKind::Plane(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_has_six_quads() {
        let geometry = BoxParameters::new(2.0, 4.0, 6.0).build();
        assert_eq!(geometry.vertex_count(), 24);
        assert_eq!(geometry.primitive_count(), 12);
        let (min, max) = geometry.bounds().unwrap();
        assert_eq!(min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn plane_normals_point_up_after_recompute() {
        let mut geometry = PlaneParameters::new(10.0, 10.0, 4, 4).build();
        assert_eq!(geometry.vertex_count(), 25);
        assert_eq!(geometry.primitive_count(), 32);

        geometry.compute_vertex_normals();
        for vertex in &geometry.vertices {
            assert!((vertex.normal[1] - 1.0).abs() < 1e-5);
        }
    }
}
