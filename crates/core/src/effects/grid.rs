use std::f32::consts::SQRT_2;

use super::{recolor, VisualEffect};
use crate::{
    geometry::{Geometry, PlaneParameters, Topology},
    props::normalize_sample,
    scene::{Color, GeometryStore, Material, Mesh, SceneNode},
    EffectType, VisualizerProps,
};

const SIZE: f32 = 200.0;
const HEIGHT: f32 = 15.0;

/// A line lattice on the floor. Each vertex rises or sinks with the sample
/// picked by its distance from the centre, so ripples spread outward.
#[derive(Debug, Clone, Copy, Default)]
pub struct Grid;

impl Grid {
    fn lattice(cells: usize) -> Geometry {
        let params = PlaneParameters::new(SIZE, SIZE, cells, cells);
        let columns = params.columns() as u32;
        let rows = params.rows() as u32;
        let mut geometry = params.build();

        let mut indices = Vec::with_capacity((columns * (rows - 1) + rows * (columns - 1)) as usize * 2);
        for row in 0..rows {
            for column in 0..columns {
                let index = row * columns + column;
                if column + 1 < columns {
                    indices.extend_from_slice(&[index, index + 1]);
                }
                if row + 1 < rows {
                    indices.extend_from_slice(&[index, index + columns]);
                }
            }
        }
        geometry.indices = indices;
        geometry.topology = Topology::Lines;
        geometry
    }

    /// Bin for a vertex at normalised distance `distance` in `[0, 1]`.
    fn bin_for(distance: f32, len: usize) -> usize {
        ((distance.clamp(0.0, 1.0) * len as f32) as usize).min(len.saturating_sub(1))
    }
}

impl VisualEffect for Grid {
    fn kind(&self) -> EffectType {
        EffectType::Grid
    }

    fn create(&self, props: &VisualizerProps, store: &mut GeometryStore) -> SceneNode {
        let mut node = SceneNode::new("grid");
        node.add(Mesh::new(
            "grid-lines",
            store,
            Self::lattice(props.detail_level),
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

        let max_distance = SIZE / 2.0 * SQRT_2;
        let len = props.audio_data.len();
        if let Some(geometry) = mesh.geometry_mut(store) {
            for vertex in &mut geometry.vertices {
                let [x, _, z] = vertex.position;
                let distance = (x * x + z * z).sqrt() / max_distance;
                let sample = props.audio_data[Self::bin_for(distance, len)];
                vertex.position[1] = normalize_sample(sample) * HEIGHT * props.color_intensity;
            }
        }
        recolor(mesh, props);
    }
}
