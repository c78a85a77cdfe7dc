use glam::Vec3;

use super::{level, VisualEffect};
use crate::{
    geometry::BoxParameters,
    scene::{Color, GeometryStore, Material, Mesh, SceneNode, Transform},
    EffectType, VisualizerProps,
};

const SPAN: f32 = 200.0;
const MAX_HEIGHT: f32 = 80.0;
const MIN_HEIGHT: f32 = 0.1;
/// Fraction of each slot a bar occupies.
const FILL: f32 = 0.8;
/// Hue spread across the row of bars.
const HUE_SPREAD: f32 = 0.25;

/// A row of boxes, one per detail step, scaled vertically by the samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bars;

impl Bars {
    fn bar(index: usize, count: usize, store: &mut GeometryStore) -> Mesh {
        let slot = SPAN / count as f32;
        let geometry = BoxParameters::new(slot * FILL, 1.0, slot * FILL).build();
        let mut mesh = Mesh::new(
            format!("bar-{index}"),
            store,
            geometry,
            Material::basic(Color::WHITE),
        );
        mesh.transform = Transform::from_position(Vec3::new(
            -SPAN / 2.0 + slot * (index as f32 + 0.5),
            MIN_HEIGHT / 2.0,
            0.0,
        ));
        mesh.transform.scale.y = MIN_HEIGHT;
        mesh
    }

    /// Rebuilds the row when the detail level no longer matches the bar count.
    fn resize(node: &mut SceneNode, count: usize, store: &mut GeometryStore) {
        if node.children.len() == count {
            return;
        }
        for mesh in node.children.drain(..) {
            mesh.dispose(store);
        }
        for index in 0..count {
            node.add(Self::bar(index, count, store));
        }
    }
}

impl VisualEffect for Bars {
    fn kind(&self) -> EffectType {
        EffectType::Bars
    }

    fn create(&self, props: &VisualizerProps, store: &mut GeometryStore) -> SceneNode {
        let mut node = SceneNode::new("bars");
        Self::resize(&mut node, props.detail_level, store);
        node
    }

    fn update(&self, node: &mut SceneNode, props: &VisualizerProps, store: &mut GeometryStore) {
        if !node.has_renderable() {
            return;
        }
        Self::resize(node, props.detail_level, store);

        let count = node.children.len();
        let hue = props.hue();
        for (i, mesh) in node.children.iter_mut().enumerate() {
            let sample = props.sample_for(i, count);
            let height = (level(sample) * MAX_HEIGHT * props.color_intensity).max(MIN_HEIGHT);
            mesh.transform.scale.y = height;
            mesh.transform.position.y = height / 2.0;

            let offset = i as f32 / count as f32 * HUE_SPREAD;
            mesh.material.color.set_hsl(hue + offset, 1.0, 0.5);
        }
    }
}
