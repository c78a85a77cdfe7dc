use std::f32::consts::TAU;

use glam::{Quat, Vec3};

use super::{CatmullRomCurve3, Geometry, GeometryKind, Topology, Vertex};

/// Parameters of a tube swept along a curve.
#[derive(Debug, Clone, PartialEq)]
pub struct TubeParameters {
    pub path: CatmullRomCurve3,
    pub tubular_segments: usize,
    pub radius: f32,
    pub radial_segments: usize,
    pub closed: bool,
}

/// Tangent, normal and binormal per sample along a curve, with normals
/// carried forward by parallel transport so the tube does not twist.
#[derive(Debug, Clone)]
pub struct FrenetFrames {
    pub tangents: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub binormals: Vec<Vec3>,
}

impl FrenetFrames {
    pub fn compute(path: &CatmullRomCurve3, segments: usize, closed: bool) -> Self {
        let tangents: Vec<Vec3> = (0..=segments)
            .map(|i| path.tangent_at(i as f32 / segments as f32))
            .collect();
        let mut normals = Vec::with_capacity(segments + 1);
        let mut binormals = Vec::with_capacity(segments + 1);

        // Seed the first normal with the axis least aligned to the tangent.
        let first = tangents[0];
        let (tx, ty, tz) = (first.x.abs(), first.y.abs(), first.z.abs());
        let mut min = f32::MAX;
        let mut seed = Vec3::X;
        if tx <= min {
            min = tx;
            seed = Vec3::X;
        }
        if ty <= min {
            min = ty;
            seed = Vec3::Y;
        }
        if tz <= min {
            seed = Vec3::Z;
        }
        let axis = first.cross(seed).normalize_or_zero();
        normals.push(first.cross(axis));
        binormals.push(first.cross(normals[0]));

        for i in 1..=segments {
            let mut normal = normals[i - 1];
            let axis = tangents[i - 1].cross(tangents[i]);
            if axis.length() > f32::EPSILON {
                let theta = tangents[i - 1].dot(tangents[i]).clamp(-1.0, 1.0).acos();
                normal = Quat::from_axis_angle(axis.normalize(), theta) * normal;
            }
            normals.push(normal);
            binormals.push(tangents[i].cross(normal));
        }

        if closed && segments > 0 {
            let mut theta = normals[0].dot(normals[segments]).clamp(-1.0, 1.0).acos();
            theta /= segments as f32;
            if tangents[0].dot(normals[0].cross(normals[segments])) > 0.0 {
                theta = -theta;
            }
            for i in 1..=segments {
                normals[i] = Quat::from_axis_angle(tangents[i], theta * i as f32) * normals[i];
                binormals[i] = tangents[i].cross(normals[i]);
            }
        }

        Self {
            tangents,
            normals,
            binormals,
        }
    }
}

impl TubeParameters {
    pub fn new(path: CatmullRomCurve3, tubular_segments: usize, radius: f32, radial_segments: usize) -> Self {
        let closed = path.is_closed();
        Self {
            path,
            tubular_segments: tubular_segments.max(1),
            radius,
            radial_segments: radial_segments.max(3),
            closed,
        }
    }

    /// Sweeps a ring of `radial_segments + 1` vertices along the path at
    /// `tubular_segments + 1` stations.
    pub fn build(self) -> Geometry {
        let tubular = self.tubular_segments;
        let radial = self.radial_segments;
        let frames = FrenetFrames::compute(&self.path, tubular, self.closed);

        let mut vertices = Vec::with_capacity((tubular + 1) * (radial + 1));
        for i in 0..=tubular {
            // A closed tube repeats its first ring so the seam shares positions.
            let station = if self.closed && i == tubular { 0 } else { i };
            let centre = self.path.point_at(station as f32 / tubular as f32);
            let n = frames.normals[station];
            let b = frames.binormals[station];

            for j in 0..=radial {
                let v = j as f32 / radial as f32 * TAU;
                let sin = v.sin();
                let cos = -v.cos();
                let normal = (n * cos + b * sin).normalize_or_zero();
                let position = centre + normal * self.radius;
                let uv = [i as f32 / tubular as f32, j as f32 / radial as f32];
                vertices.push(Vertex::new(position, normal, uv));
            }
        }

        let mut indices = Vec::with_capacity(tubular * radial * 6);
        let ring = (radial + 1) as u32;
        for j in 1..=tubular as u32 {
            for i in 1..=radial as u32 {
                let a = ring * (j - 1) + (i - 1);
                let b = ring * j + (i - 1);
                let c = ring * j + i;
                let d = ring * (j - 1) + i;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        Geometry {
            vertices,
            indices,
            topology: Topology::Triangles,
            kind: GeometryKind::Tube(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_path() -> CatmullRomCurve3 {
        CatmullRomCurve3::new(vec![
            Vec3::new(-100.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(100.0, 0.0, 0.0),
        ])
    }

    #[test]
    fn builds_expected_buffer_sizes() {
        let geometry = TubeParameters::new(straight_path(), 16, 2.0, 8).build();
        assert_eq!(geometry.vertex_count(), 17 * 9);
        assert_eq!(geometry.indices.len(), 16 * 8 * 6);
        assert_eq!(geometry.primitive_count(), 16 * 8 * 2);
        assert!(geometry.path().is_some());
    }

    #[test]
    fn vertices_sit_on_the_radius() {
        let geometry = TubeParameters::new(straight_path(), 4, 2.0, 8).build();
        for vertex in &geometry.vertices {
            let p = vertex.position();
            let distance = (p.y * p.y + p.z * p.z).sqrt();
            assert!((distance - 2.0).abs() < 1e-3, "{p}");
        }
    }

    #[test]
    fn frames_stay_orthonormal_on_a_bend() {
        let path = CatmullRomCurve3::new(vec![
            Vec3::ZERO,
            Vec3::new(10.0, 10.0, 0.0),
            Vec3::new(20.0, 0.0, 5.0),
        ]);
        let frames = FrenetFrames::compute(&path, 12, false);
        for ((t, n), b) in frames
            .tangents
            .iter()
            .zip(&frames.normals)
            .zip(&frames.binormals)
        {
            assert!(t.dot(*n).abs() < 1e-3);
            assert!(t.dot(*b).abs() < 1e-3);
            assert!((n.length() - 1.0).abs() < 1e-3);
        }
    }

    #[test]
    fn closed_tube_shares_seam_positions() {
        let ring: Vec<Vec3> = (0..8)
            .map(|i| {
                let angle = i as f32 / 8.0 * TAU;
                Vec3::new(angle.cos() * 50.0, angle.sin() * 50.0, 0.0)
            })
            .collect();
        let geometry = TubeParameters::new(CatmullRomCurve3::closed(ring), 16, 1.0, 6).build();
        let first = geometry.vertices[0].position();
        let seam = geometry.vertices[16 * 7].position();
        assert!(first.distance(seam) < 1e-2, "{first} vs {seam}");
    }
}
