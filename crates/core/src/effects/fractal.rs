use std::collections::VecDeque;

use glam::{Quat, Vec3};

use super::{level, recolor, VisualEffect};
use crate::{
    geometry::Geometry,
    scene::{Color, GeometryStore, Material, Mesh, SceneNode},
    EffectType, VisualizerProps,
};

const MAX_DEPTH: u32 = 8;
const TRUNK: f32 = 40.0;
const MIN_ANGLE_DEG: f32 = 15.0;
const ANGLE_RANGE_DEG: f32 = 45.0;
const BASE_RATIO: f32 = 0.55;
const MAX_RATIO: f32 = 0.85;

/// Shape of the branching tree for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeShape {
    pub depth: u32,
    /// Angle between a branch and each child, in radians.
    pub spread: f32,
    /// Length of a child relative to its parent.
    pub ratio: f32,
}

impl TreeShape {
    pub fn for_props(props: &VisualizerProps) -> Self {
        Self {
            depth: Fractal::depth_for(props.detail_level),
            spread: (MIN_ANGLE_DEG + props.mean_level() * ANGLE_RANGE_DEG).to_radians(),
            ratio: (BASE_RATIO + 0.1 * props.color_intensity).min(MAX_RATIO),
        }
    }
}

/// A binary branching tree whose spread opens with the overall level and
/// whose branches stretch with their own samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fractal;

impl Fractal {
    /// `floor(log2(detail))`, kept within `[1, MAX_DEPTH]`.
    pub fn depth_for(detail_level: usize) -> u32 {
        detail_level.max(2).ilog2().clamp(1, MAX_DEPTH)
    }

    /// Number of branches a tree of `depth` levels has.
    pub fn branch_count(depth: u32) -> usize {
        (1usize << (depth + 1)) - 1
    }

    /// Segments of the tree, trunk first, children in breadth-first order.
    /// Each branch's length is scaled by the sample assigned to it.
    pub fn branches(shape: TreeShape, props: &VisualizerProps) -> Vec<(Vec3, Vec3)> {
        let total = Self::branch_count(shape.depth);
        let mut segments = Vec::with_capacity(total);
        // (start, direction, length, level)
        let mut frontier = VecDeque::from([(Vec3::new(0.0, -TRUNK, 0.0), Vec3::Y, TRUNK, 0u32)]);

        while let Some((start, direction, length, depth)) = frontier.pop_front() {
            let index = segments.len();
            let stretch = 0.8 + 0.4 * level(props.sample_for(index, total));
            let end = start + direction * length * stretch;
            segments.push((start, end));

            if depth < shape.depth {
                // Alternate the bending axis so the tree fills space.
                let axis = if depth % 2 == 0 { Vec3::Z } else { Vec3::X };
                for sign in [-1.0, 1.0] {
                    let child = Quat::from_axis_angle(axis, sign * shape.spread) * direction;
                    frontier.push_back((end, child, length * shape.ratio, depth + 1));
                }
            }
        }
        segments
    }
}

impl VisualEffect for Fractal {
    fn kind(&self) -> EffectType {
        EffectType::Fractal
    }

    fn create(&self, props: &VisualizerProps, store: &mut GeometryStore) -> SceneNode {
        let geometry = Geometry::segments(&Self::branches(TreeShape::for_props(props), props));
        let mut node = SceneNode::new("fractal");
        node.add(Mesh::new(
            "fractal-tree",
            store,
            geometry,
            Material::basic(Color::WHITE),
        ));
        node
    }

    fn update(&self, node: &mut SceneNode, props: &VisualizerProps, store: &mut GeometryStore) {
        if !node.has_renderable() {
            return;
        }
        let geometry = Geometry::segments(&Self::branches(TreeShape::for_props(props), props));
        let Some(mesh) = node.first_mesh_mut() else {
            return;
        };
        mesh.replace_geometry(store, geometry);
        recolor(mesh, props);
    }
}
