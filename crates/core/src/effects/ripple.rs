use glam::Vec3;

use super::{ring_points, VisualEffect};
use crate::{
    geometry::Geometry,
    props::normalize_sample,
    scene::{Color, GeometryStore, Material, Mesh, SceneNode},
    EffectType, VisualizerProps,
};

const MAX_RINGS: usize = 16;
const SEGMENTS: usize = 64;
const SPACING: f32 = 12.0;
const SWELL: f32 = 0.25;
/// Hue spread from the innermost to the outermost ring.
const HUE_SPREAD: f32 = 0.5;

/// Concentric line loops lying on the floor, each swelling with its own bin.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ripple;

impl Ripple {
    pub fn ring_count(detail_level: usize) -> usize {
        detail_level.clamp(1, MAX_RINGS)
    }

    fn base_radius(ring: usize) -> f32 {
        (ring + 1) as f32 * SPACING
    }

    /// Points of a ring in the XZ plane.
    fn ring(radius: f32) -> Vec<Vec3> {
        ring_points(SEGMENTS, radius)
            .into_iter()
            .map(|p| Vec3::new(p.x, 0.0, p.y))
            .collect()
    }
}

impl VisualEffect for Ripple {
    fn kind(&self) -> EffectType {
        EffectType::Ripple
    }

    fn create(&self, props: &VisualizerProps, store: &mut GeometryStore) -> SceneNode {
        let mut node = SceneNode::new("ripple");
        for ring in 0..Self::ring_count(props.detail_level) {
            node.add(Mesh::new(
                format!("ripple-{ring}"),
                store,
                Geometry::polyline(&Self::ring(Self::base_radius(ring)), true),
                Material::basic(Color::WHITE),
            ));
        }
        node
    }

    fn update(&self, node: &mut SceneNode, props: &VisualizerProps, store: &mut GeometryStore) {
        if !node.has_renderable() {
            return;
        }
        let rings = node.children.len();
        let hue = props.hue();
        for (ring, mesh) in node.children.iter_mut().enumerate() {
            let swell = 1.0 + normalize_sample(props.sample_for(ring, rings)) * SWELL * props.color_intensity;
            let radius = Self::base_radius(ring) * swell.max(0.0);
            if let Some(geometry) = mesh.geometry_mut(store) {
                for (vertex, point) in geometry.vertices.iter_mut().zip(Self::ring(radius)) {
                    vertex.position = point.to_array();
                }
            }
            let offset = ring as f32 / rings as f32 * HUE_SPREAD;
            mesh.material.color.set_hsl(hue + offset, 1.0, 0.5);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::test_support::props;

    fn radius_of(node: &SceneNode, ring: usize, store: &GeometryStore) -> f32 {
        node.children[ring].geometry(store).unwrap().vertices[0].position().length()
    }

    #[test]
    fn ring_count_is_capped() {
        assert_eq!(Ripple::ring_count(4), 4);
        assert_eq!(Ripple::ring_count(400), MAX_RINGS);
    }

    #[test]
    fn rings_swell_and_shrink_with_samples() {
        let mut store = GeometryStore::new();
        let frame = props(EffectType::Ripple, 3, vec![255, 128, 0]);
        let mut node = Ripple.create(&frame, &mut store);
        Ripple.update(&mut node, &frame, &mut store);

        assert!(radius_of(&node, 0, &store) > 12.0 * 1.24);
        assert!((radius_of(&node, 1, &store) - 24.0).abs() < 1e-3);
        assert!((radius_of(&node, 2, &store) - 36.0 * 0.75).abs() < 1e-3);
        assert_eq!(store.live_count(), 3);
    }
}
