use glam::Vec3;

use super::{recolor, VisualEffect};
use crate::{
    geometry::{CatmullRomCurve3, Geometry, TubeParameters},
    scene::{Color, GeometryStore, Material, Mesh, SceneNode},
    EffectType, VisualizerProps,
};

/// Half the length of the axis the waveform spans.
pub const HALF_SPAN: f32 = 100.0;
pub const TUBE_RADIUS: f32 = 2.0;
pub const RADIAL_SEGMENTS: usize = 8;

/// A wireframe tube along the x axis whose y offsets follow the samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct Waveform;

impl Waveform {
    /// `detail_level` points evenly spread over `[-HALF_SPAN, HALF_SPAN]`.
    pub fn baseline(detail_level: usize) -> Vec<Vec3> {
        let last = detail_level.saturating_sub(1).max(1) as f32;
        (0..detail_level)
            .map(|i| Vec3::new((i as f32 / last) * 2.0 * HALF_SPAN - HALF_SPAN, 0.0, 0.0))
            .collect()
    }

    fn tube(path: CatmullRomCurve3, detail_level: usize) -> Geometry {
        TubeParameters::new(path, detail_level, TUBE_RADIUS, RADIAL_SEGMENTS).build()
    }

    /// Undisplaced points for this frame: the node's baseline path re-sampled
    /// at the current detail level, or the mesh's current path when the node
    /// carries no baseline.
    pub fn reference_points(
        node: &SceneNode,
        props: &VisualizerProps,
        store: &GeometryStore,
    ) -> Option<Vec<Vec3>> {
        let detail = props.detail_level;
        match &node.reference_path {
            Some(path) => Some(path.sample(detail)),
            None => node
                .first_mesh()?
                .geometry(store)?
                .path()
                .map(|path| path.get_points(detail)),
        }
    }

    /// Replaces the y coordinate of each reference point with its audio
    /// displacement, leaving x and z untouched.
    pub fn displace(reference: &[Vec3], props: &VisualizerProps) -> Vec<Vec3> {
        reference
            .iter()
            .take(props.detail_level)
            .enumerate()
            .map(|(i, point)| Vec3::new(point.x, props.displacement_at(i), point.z))
            .collect()
    }
}

impl VisualEffect for Waveform {
    fn kind(&self) -> EffectType {
        EffectType::Waveform
    }

    fn create(&self, props: &VisualizerProps, store: &mut GeometryStore) -> SceneNode {
        let path = CatmullRomCurve3::new(Self::baseline(props.detail_level));
        let geometry = Self::tube(path.clone(), props.detail_level);

        let mut node = SceneNode::new("waveform");
        node.add(Mesh::new(
            "waveform-tube",
            store,
            geometry,
            Material::wireframe(Color::WHITE),
        ));
        node.reference_path = Some(path);
        node
    }

    fn update(&self, node: &mut SceneNode, props: &VisualizerProps, store: &mut GeometryStore) {
        if !node.has_renderable() {
            return;
        }
        let Some(reference) = Self::reference_points(node, props, store) else {
            tracing::warn!(node = %node.name, "waveform mesh has no path to re-sample");
            return;
        };

        let points = Self::displace(&reference, props);
        let geometry = Self::tube(CatmullRomCurve3::new(points), props.detail_level);

        let Some(mesh) = node.first_mesh_mut() else {
            return;
        };
        mesh.replace_geometry(store, geometry);
        recolor(mesh, props);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{effects::test_support::props, scene::Color};

    fn geometry_of(node: &SceneNode, store: &GeometryStore) -> Geometry {
        node.first_mesh()
            .and_then(|mesh| mesh.geometry(store))
            .cloned()
            .expect("waveform node should own a live tube")
    }

    #[test]
    fn create_builds_one_tube_sized_by_detail() {
        for detail in [2, 3, 8, 64] {
            let mut store = GeometryStore::new();
            let node = Waveform.create(&props(EffectType::Waveform, detail, vec![128]), &mut store);

            assert_eq!(node.children.len(), 1);
            let geometry = geometry_of(&node, &store);
            assert_eq!(geometry.vertex_count(), (detail + 1) * (RADIAL_SEGMENTS + 1));
            assert_eq!(geometry.indices.len(), detail * RADIAL_SEGMENTS * 6);
            assert_eq!(geometry.path().unwrap().points().len(), detail);
            assert!(node.children[0].material.wireframe);
            assert_eq!(node.children[0].material.color, Color::WHITE);
        }
    }

    #[test]
    fn displaces_reference_scenario() {
        let mut store = GeometryStore::new();
        let frame = props(EffectType::Waveform, 4, vec![0, 128, 255, 64]);
        let mut node = Waveform.create(&frame, &mut store);

        let reference = Waveform::reference_points(&node, &frame, &store).unwrap();
        Waveform.update(&mut node, &frame, &mut store);

        let path = geometry_of(&node, &store).path().cloned().unwrap();
        let expected_y = [-50.0, 0.0, 49.609375, -25.0];
        assert_eq!(path.points().len(), 4);
        for ((point, before), y) in path.points().iter().zip(&reference).zip(expected_y) {
            assert!((point.y - y).abs() < 1e-4, "{} != {y}", point.y);
            assert_eq!(point.x, before.x);
            assert_eq!(point.z, before.z);
        }
    }

    #[test]
    fn midpoint_audio_leaves_the_line_flat() {
        let mut store = GeometryStore::new();
        let mut frame = props(EffectType::Waveform, 16, vec![128; 256]);
        frame.color_intensity = 3.0;
        let mut node = Waveform.create(&frame, &mut store);
        Waveform.update(&mut node, &frame, &mut store);

        let path = geometry_of(&node, &store).path().cloned().unwrap();
        assert!(path.points().iter().all(|p| p.y == 0.0));
    }

    #[test]
    fn repeated_updates_are_idempotent() {
        let mut store = GeometryStore::new();
        let frame = props(EffectType::Waveform, 12, (0..=255).collect());
        let mut node = Waveform.create(&frame, &mut store);

        Waveform.update(&mut node, &frame, &mut store);
        let first = geometry_of(&node, &store);
        Waveform.update(&mut node, &frame, &mut store);
        let second = geometry_of(&node, &store);

        assert_eq!(first.vertices, second.vertices);
        assert_eq!(first.indices, second.indices);
    }

    #[test]
    fn update_releases_the_replaced_tube() {
        let mut store = GeometryStore::new();
        let frame = props(EffectType::Waveform, 8, vec![10, 200, 90]);
        let mut node = Waveform.create(&frame, &mut store);
        let original = node.children[0].geometry_id();

        for _ in 0..100 {
            Waveform.update(&mut node, &frame, &mut store);
        }

        assert!(!store.contains(original));
        assert_eq!(store.live_count(), 1);
        assert_eq!(store.stats().released, 100);
    }

    #[test]
    fn follows_detail_changes_without_recreating() {
        let mut store = GeometryStore::new();
        let mut node = Waveform.create(&props(EffectType::Waveform, 4, vec![128]), &mut store);

        let frame = props(EffectType::Waveform, 10, vec![128]);
        Waveform.update(&mut node, &frame, &mut store);

        let path = geometry_of(&node, &store).path().cloned().unwrap();
        assert_eq!(path.points().len(), 10);
        let first = path.points()[0];
        let last = path.points()[9];
        assert!((first.x + HALF_SPAN).abs() < 1e-3);
        assert!((last.x - HALF_SPAN).abs() < 1e-3);
    }

    #[test]
    fn falls_back_to_the_mesh_path() {
        let mut store = GeometryStore::new();
        let frame = props(EffectType::Waveform, 4, vec![128]);
        let mut node = Waveform.create(&frame, &mut store);
        node.reference_path = None;

        let reference = Waveform::reference_points(&node, &frame, &store).unwrap();
        assert_eq!(reference.len(), 5);
        Waveform.update(&mut node, &frame, &mut store);
        assert_eq!(store.live_count(), 1);
    }

    #[test]
    fn recolours_from_intensity() {
        let mut store = GeometryStore::new();
        let frame = props(EffectType::Waveform, 4, vec![128]);
        let mut node = Waveform.create(&frame, &mut store);
        Waveform.update(&mut node, &frame, &mut store);

        let expected = Color::from_hsl(100.0 / 360.0, 1.0, 0.5);
        assert_eq!(node.children[0].material.color, expected);
        assert!(node.children[0].material.wireframe);
    }
}
