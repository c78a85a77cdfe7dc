use glam::Vec3;

use super::{recolor, ring_points, VisualEffect};
use crate::{
    geometry::{CatmullRomCurve3, Geometry, TubeParameters},
    props::normalize_sample,
    scene::{Color, GeometryStore, Material, Mesh, SceneNode},
    EffectType, VisualizerProps,
};

const RADIUS: f32 = 60.0;
const DISPLACEMENT: f32 = 20.0;
const TUBE_RADIUS: f32 = 1.5;
const RADIAL_SEGMENTS: usize = 8;

/// A closed tube ring whose radius bulges with the samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct Circle;

impl Circle {
    fn tube(path: CatmullRomCurve3, detail_level: usize) -> Geometry {
        TubeParameters::new(path, detail_level * 2, TUBE_RADIUS, RADIAL_SEGMENTS).build()
    }

    /// Pushes each point away from the centre by its sample's displacement.
    fn displace(reference: &[Vec3], props: &VisualizerProps) -> Vec<Vec3> {
        let count = reference.len();
        reference
            .iter()
            .enumerate()
            .map(|(i, point)| {
                let offset =
                    normalize_sample(props.sample_for(i, count)) * DISPLACEMENT * props.color_intensity;
                *point + point.normalize_or_zero() * offset
            })
            .collect()
    }
}

impl VisualEffect for Circle {
    fn kind(&self) -> EffectType {
        EffectType::Circle
    }

    fn create(&self, props: &VisualizerProps, store: &mut GeometryStore) -> SceneNode {
        let path = CatmullRomCurve3::closed(ring_points(props.detail_level, RADIUS));
        let geometry = Self::tube(path.clone(), props.detail_level);

        let mut node = SceneNode::new("circle");
        node.add(Mesh::new(
            "circle-tube",
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
        let detail = props.detail_level;
        // A closed curve's last sample repeats its first.
        let reference: Vec<Vec3> = match &node.reference_path {
            Some(path) => path.get_points(detail).into_iter().take(detail).collect(),
            None => ring_points(detail, RADIUS),
        };

        let points = Self::displace(&reference, props);
        let geometry = Self::tube(CatmullRomCurve3::closed(points), detail);

        let Some(mesh) = node.first_mesh_mut() else {
            return;
        };
        mesh.replace_geometry(store, geometry);
        recolor(mesh, props);
    }
}
