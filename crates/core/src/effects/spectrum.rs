use glam::Vec3;

use super::{level, recolor, VisualEffect};
use crate::{
    geometry::Geometry,
    scene::{Color, GeometryStore, Material, Mesh, SceneNode},
    EffectType, VisualizerProps,
};

const SPAN: f32 = 200.0;
const HEIGHT: f32 = 60.0;

/// A line strip across the x axis tracing the sample magnitudes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Spectrum;

impl Spectrum {
    fn flat_line(count: usize) -> Geometry {
        let last = count.saturating_sub(1).max(1) as f32;
        let positions: Vec<Vec3> = (0..count)
            .map(|i| Vec3::new(i as f32 / last * SPAN - SPAN / 2.0, 0.0, 0.0))
            .collect();
        Geometry::polyline(&positions, false)
    }
}

impl VisualEffect for Spectrum {
    fn kind(&self) -> EffectType {
        EffectType::Spectrum
    }

    fn create(&self, props: &VisualizerProps, store: &mut GeometryStore) -> SceneNode {
        let mut node = SceneNode::new("spectrum");
        node.add(Mesh::new(
            "spectrum-line",
            store,
            Self::flat_line(props.detail_level),
            Material::basic(Color::WHITE),
        ));
        node
    }

    fn update(&self, node: &mut SceneNode, props: &VisualizerProps, store: &mut GeometryStore) {
        if !node.has_renderable() {
            return;
        }
        let Some(mesh) = node.first_mesh_mut() else {
            return;
        };

        let stale = mesh
            .geometry(store)
            .map_or(true, |geometry| geometry.vertex_count() != props.detail_level);
        if stale {
            mesh.replace_geometry(store, Self::flat_line(props.detail_level));
        }

        if let Some(geometry) = mesh.geometry_mut(store) {
            let count = geometry.vertices.len();
            for (i, vertex) in geometry.vertices.iter_mut().enumerate() {
                vertex.position[1] = level(props.sample_for(i, count)) * HEIGHT * props.color_intensity;
            }
        }
        recolor(mesh, props);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::test_support::{props, ramp};

    #[test]
    fn heights_track_each_bin() {
        let mut store = GeometryStore::new();
        let frame = props(EffectType::Spectrum, 3, vec![0, 255, 51]);
        let mut node = Spectrum.create(&frame, &mut store);
        Spectrum.update(&mut node, &frame, &mut store);

        let geometry = node.children[0].geometry(&store).unwrap();
        let ys: Vec<f32> = geometry.vertices.iter().map(|v| v.position[1]).collect();
        assert_eq!(ys[0], 0.0);
        assert!((ys[1] - 60.0).abs() < 1e-4);
        assert!((ys[2] - 12.0).abs() < 1e-4);
        assert_eq!(geometry.primitive_count(), 2);
    }

    #[test]
    fn resizes_with_detail_level() {
        let mut store = GeometryStore::new();
        let mut node = Spectrum.create(&props(EffectType::Spectrum, 4, ramp(16)), &mut store);
        Spectrum.update(&mut node, &props(EffectType::Spectrum, 9, ramp(16)), &mut store);

        let geometry = node.children[0].geometry(&store).unwrap();
        assert_eq!(geometry.vertex_count(), 9);
        assert_eq!(store.live_count(), 1);
    }
}
