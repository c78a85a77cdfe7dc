use std::f32::consts::{PI, TAU};

use glam::Vec3;

use super::{level, recolor, VisualEffect};
use crate::{
    geometry::Geometry,
    scene::{Color, GeometryStore, Material, Mesh, SceneNode},
    EffectType, VisualizerProps,
};

const PARTICLES_PER_DETAIL: usize = 8;
const RADIUS: f32 = 50.0;
const PUSH: f32 = 30.0;
const POINT_SIZE: f32 = 1.5;
/// Radians of spin per frame at unit movement speed.
const SPIN: f32 = 0.01;

/// A sphere of points that breathes outward with the samples and spins
/// while animating.
#[derive(Debug, Clone, Copy, Default)]
pub struct Particles;

impl Particles {
    /// `count` unit vectors spread evenly over a sphere.
    pub fn fibonacci_sphere(count: usize) -> Vec<Vec3> {
        let golden_angle = PI * (3.0 - 5f32.sqrt());
        (0..count)
            .map(|i| {
                let y = 1.0 - 2.0 * (i as f32 + 0.5) / count as f32;
                let radius = (1.0 - y * y).max(0.0).sqrt();
                let theta = golden_angle * i as f32;
                Vec3::new(theta.cos() * radius, y, theta.sin() * radius)
            })
            .collect()
    }
}

impl VisualEffect for Particles {
    fn kind(&self) -> EffectType {
        EffectType::Particles
    }

    fn create(&self, props: &VisualizerProps, store: &mut GeometryStore) -> SceneNode {
        let positions: Vec<Vec3> = Self::fibonacci_sphere(props.detail_level * PARTICLES_PER_DETAIL)
            .into_iter()
            .map(|direction| direction * RADIUS)
            .collect();

        let mut node = SceneNode::new("particles");
        node.add(Mesh::new(
            "particle-cloud",
            store,
            Geometry::points(&positions),
            Material::points(Color::WHITE, POINT_SIZE),
        ));
        node
    }

    fn update(&self, node: &mut SceneNode, props: &VisualizerProps, store: &mut GeometryStore) {
        if !node.has_renderable() {
            return;
        }
        if props.is_animating {
            let step = props.movement_speed * SPIN;
            node.phase = (node.phase + step).rem_euclid(TAU);
            node.transform.rotation.y = node.phase;
        }

        let Some(mesh) = node.first_mesh_mut() else {
            return;
        };
        if let Some(geometry) = mesh.geometry_mut(store) {
            let count = geometry.vertices.len();
            for (i, vertex) in geometry.vertices.iter_mut().enumerate() {
                // Normals keep the unit direction each particle travels along.
                let direction = Vec3::from_array(vertex.normal);
                let radius = RADIUS + level(props.sample_for(i, count)) * PUSH * props.color_intensity;
                vertex.position = (direction * radius).to_array();
            }
        }
        recolor(mesh, props);
    }
}
