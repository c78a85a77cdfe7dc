use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{
    scene::{GeometryStore, SceneNode, StoreStats},
    Result, VisualiserError,
};

/// Handle to a node attached to a [`RenderGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// Totals gathered while walking the graph for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameStats {
    pub nodes: usize,
    pub meshes: usize,
    pub vertices: usize,
    pub primitives: usize,
    /// World-space bounds of every vertex drawn, if anything was drawn.
    pub bounds: Option<([f32; 3], [f32; 3])>,
    pub store: StoreStats,
}

/// The shared scene effects attach their nodes to. Owns the geometry store
/// so buffer lifetimes are tracked in one place.
#[derive(Debug, Default)]
pub struct RenderGraph {
    store: GeometryStore,
    nodes: Vec<(NodeId, SceneNode)>,
    next_id: u64,
}

impl RenderGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &GeometryStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut GeometryStore {
        &mut self.store
    }

    pub fn attach(&mut self, node: SceneNode) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        tracing::debug!(%id, node = %node.name, "attaching node");
        self.nodes.push((id, node));
        id
    }

    /// Removes a node from the scene without releasing its buffers.
    pub fn detach(&mut self, id: NodeId) -> Option<SceneNode> {
        let index = self.nodes.iter().position(|(node_id, _)| *node_id == id)?;
        Some(self.nodes.remove(index).1)
    }

    /// Detaches a node and releases every buffer it holds.
    pub fn dispose(&mut self, id: NodeId) -> bool {
        match self.detach(id) {
            Some(node) => {
                node.dispose(&mut self.store);
                true
            }
            None => false,
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes
            .iter()
            .find(|(node_id, _)| *node_id == id)
            .map(|(_, node)| node)
    }

    /// Mutable access to a node together with the store its meshes live in.
    pub fn node_parts_mut(&mut self, id: NodeId) -> Option<(&mut SceneNode, &mut GeometryStore)> {
        let node = self
            .nodes
            .iter_mut()
            .find(|(node_id, _)| *node_id == id)
            .map(|(_, node)| node)?;
        Some((node, &mut self.store))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Walks every attached node and totals what would be submitted.
    pub fn draw(&self) -> Result<FrameStats> {
        let mut stats = FrameStats {
            nodes: self.nodes.len(),
            store: self.store.stats(),
            ..FrameStats::default()
        };
        let mut bounds: Option<(Vec3, Vec3)> = None;

        for (_, node) in &self.nodes {
            let node_matrix = node.transform.matrix();
            for mesh in &node.children {
                let geometry = mesh
                    .geometry(&self.store)
                    .ok_or(VisualiserError::DanglingGeometry(mesh.geometry_id().raw()))?;
                stats.meshes += 1;
                stats.vertices += geometry.vertex_count();
                stats.primitives += geometry.primitive_count();

                let world = node_matrix * mesh.transform.matrix();
                for vertex in &geometry.vertices {
                    let p = world.transform_point3(vertex.position());
                    bounds = Some(match bounds {
                        Some((min, max)) => (min.min(p), max.max(p)),
                        None => (p, p),
                    });
                }
            }
        }

        stats.bounds = bounds.map(|(min, max)| (min.to_array(), max.to_array()));
        tracing::trace!(
            nodes = stats.nodes,
            meshes = stats.meshes,
            vertices = stats.vertices,
            "frame drawn"
        );
        Ok(stats)
    }
}
