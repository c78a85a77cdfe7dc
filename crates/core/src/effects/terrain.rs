use super::{level, recolor, VisualEffect};
use crate::{
    geometry::{Geometry, GeometryKind, PlaneParameters},
    scene::{Color, GeometryStore, Material, Mesh, SceneNode},
    EffectType, VisualizerProps,
};

const SIZE: f32 = 200.0;
const HEIGHT: f32 = 40.0;

/// A plane whose rows scroll back one step per frame, with the front row
/// raised to the current samples, so the surface is a history of frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct Terrain;

impl Terrain {
    fn plane(detail_level: usize) -> Geometry {
        let segments = detail_level.saturating_sub(1).max(1);
        PlaneParameters::new(SIZE, SIZE, segments, segments).build()
    }

    /// Shifts every row's heights one row back and fills the front row.
    fn scroll(geometry: &mut Geometry, columns: usize, rows: usize, front: &[f32]) {
        for row in 0..rows.saturating_sub(1) {
            for column in 0..columns {
                let height = geometry.vertices[(row + 1) * columns + column].position[1];
                geometry.vertices[row * columns + column].position[1] = height;
            }
        }
        let last = rows.saturating_sub(1) * columns;
        for (column, height) in front.iter().enumerate().take(columns) {
            geometry.vertices[last + column].position[1] = *height;
        }
        geometry.compute_vertex_normals();
    }
}

impl VisualEffect for Terrain {
    fn kind(&self) -> EffectType {
        EffectType::Terrain
    }

    fn create(&self, props: &VisualizerProps, store: &mut GeometryStore) -> SceneNode {
        let mut node = SceneNode::new("terrain");
        node.add(Mesh::new(
            "terrain-surface",
            store,
            Self::plane(props.detail_level),
            Material::wireframe(Color::WHITE),
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

        let dimensions = mesh.geometry(store).and_then(|geometry| match &geometry.kind {
            GeometryKind::Plane(params) => Some((params.columns(), params.rows())),
            _ => None,
        });
        let (columns, rows) = match dimensions {
            Some((columns, rows)) if columns == props.detail_level => (columns, rows),
            _ => {
                // Detail changed: start a fresh history at the new resolution.
                mesh.replace_geometry(store, Self::plane(props.detail_level));
                let columns = props.detail_level.max(2);
                (columns, columns)
            }
        };

        let front: Vec<f32> = (0..columns)
            .map(|column| level(props.sample_for(column, columns)) * HEIGHT * props.color_intensity)
            .collect();
        if let Some(geometry) = mesh.geometry_mut(store) {
            Self::scroll(geometry, columns, rows, &front);
        }
        recolor(mesh, props);
    }
}
