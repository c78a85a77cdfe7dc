mod material;
mod store;

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::geometry::{CatmullRomCurve3, Geometry};

pub use material::{Color, Material};
pub use store::{GeometryId, GeometryStore, StoreStats};

/// Translation, Euler rotation (radians, XYZ order) and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.position)
    }
}

/// A geometry buffer drawn with one material.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    geometry: GeometryId,
    pub material: Material,
    pub transform: Transform,
}

impl Mesh {
    /// Moves `geometry` into the store and wraps the resulting handle.
    pub fn new(
        name: impl Into<String>,
        store: &mut GeometryStore,
        geometry: Geometry,
        material: Material,
    ) -> Self {
        Self {
            name: name.into(),
            geometry: store.insert(geometry),
            material,
            transform: Transform::default(),
        }
    }

    pub fn geometry_id(&self) -> GeometryId {
        self.geometry
    }

    pub fn geometry<'a>(&self, store: &'a GeometryStore) -> Option<&'a Geometry> {
        store.get(self.geometry)
    }

    pub fn geometry_mut<'a>(&self, store: &'a mut GeometryStore) -> Option<&'a mut Geometry> {
        store.get_mut(self.geometry)
    }

    /// Installs a new geometry and releases the one it replaces in the same
    /// step, so the old buffer can never outlive its last reference.
    pub fn replace_geometry(&mut self, store: &mut GeometryStore, geometry: Geometry) {
        let previous = std::mem::replace(&mut self.geometry, store.insert(geometry));
        store.release(previous);
    }

    /// Releases the geometry this mesh owns.
    pub fn dispose(self, store: &mut GeometryStore) {
        store.release(self.geometry);
    }
}

/// Renderable subtree exclusively owned by the effect that created it.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    pub children: Vec<Mesh>,
    /// Baseline curve an effect re-samples instead of its displaced output.
    pub reference_path: Option<CatmullRomCurve3>,
    /// Accumulated animation phase in radians.
    pub phase: f32,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            children: Vec::new(),
            reference_path: None,
            phase: 0.0,
        }
    }

    pub fn add(&mut self, mesh: Mesh) {
        self.children.push(mesh);
    }

    pub fn has_renderable(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn first_mesh(&self) -> Option<&Mesh> {
        self.children.first()
    }

    pub fn first_mesh_mut(&mut self) -> Option<&mut Mesh> {
        self.children.first_mut()
    }

    /// Ids of every geometry referenced by this node.
    pub fn geometry_ids(&self) -> impl Iterator<Item = GeometryId> + '_ {
        self.children.iter().map(Mesh::geometry_id)
    }

    /// Releases every geometry buffer held by the node's meshes.
    pub fn dispose(self, store: &mut GeometryStore) {
        tracing::debug!(node = %self.name, meshes = self.children.len(), "disposing scene node");
        for mesh in self.children {
            mesh.dispose(store);
        }
    }
}
