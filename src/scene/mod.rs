//! Render-side scene graph: entities with poses, optional parents, and the
//! camera that views them.

mod camera;
mod entity;

pub use camera::{Camera, CameraFollow};
pub use entity::{EntityKind, Geometry, Light, MeshDesc, RenderEntity, Rgba, SurfaceMaterial, TextDesc};

use crate::dynamics::Pose;

/// Index of an entity in a [`SceneGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl EntityId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Distance fog
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Rgba,
    pub near: f32,
    pub far: f32,
}

impl Fog {
    /// Fog weight in [0, 1] at a view distance
    pub fn factor(&self, distance: f32) -> f32 {
        if self.far <= self.near {
            return 0.0;
        }
        ((distance - self.near) / (self.far - self.near)).clamp(0.0, 1.0)
    }
}

/// Flat list of entities; children reference their parent by id
#[derive(Debug, Clone)]
pub struct SceneGraph {
    pub background: Rgba,
    pub fog: Option<Fog>,
    entities: Vec<RenderEntity>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self {
            background: Rgba::rgb(0, 0, 0),
            fog: None,
            entities: Vec::new(),
        }
    }
}

impl SceneGraph {
    pub fn new(background: Rgba) -> Self {
        Self {
            background,
            ..Self::default()
        }
    }

    /// Adds a root entity
    pub fn add(&mut self, mut entity: RenderEntity) -> EntityId {
        entity.parent = None;
        self.push(entity)
    }

    /// Adds an entity under `parent`; unknown parents make it a root
    pub fn add_child(&mut self, parent: EntityId, mut entity: RenderEntity) -> EntityId {
        entity.parent = self.get(parent).map(|_| parent);
        self.push(entity)
    }

    fn push(&mut self, entity: RenderEntity) -> EntityId {
        let id = EntityId(self.entities.len() as u32);
        self.entities.push(entity);
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&RenderEntity> {
        self.entities.get(id.index())
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut RenderEntity> {
        self.entities.get_mut(id.index())
    }

    /// Overwrites an entity's local pose; returns false for unknown ids
    pub fn set_pose(&mut self, id: EntityId, pose: Pose) -> bool {
        match self.get_mut(id) {
            Some(entity) => {
                entity.pose = pose;
                true
            }
            None => false,
        }
    }

    /// Local pose of an entity
    pub fn pose(&self, id: EntityId) -> Option<Pose> {
        self.get(id).map(|e| e.pose)
    }

    /// Pose in world space, composing the parent chain
    pub fn world_transform(&self, id: EntityId) -> Option<Pose> {
        let entity = self.get(id)?;
        let mut pose = entity.pose;
        let mut parent = entity.parent;
        let mut depth = 0;

        while let Some(parent_id) = parent {
            let parent_entity = self.get(parent_id)?;
            pose = Pose::new(
                parent_entity.pose.transform_point(pose.position),
                parent_entity.pose.rotation * pose.rotation,
            );
            parent = parent_entity.parent;

            depth += 1;
            if depth > self.entities.len() {
                break;
            }
        }

        Some(pose)
    }

    /// Whether the entity and all its ancestors are visible
    pub fn is_visible(&self, id: EntityId) -> bool {
        let mut current = Some(id);
        let mut depth = 0;
        while let Some(cur) = current {
            match self.get(cur) {
                Some(e) if e.visible => current = e.parent,
                _ => return false,
            }
            depth += 1;
            if depth > self.entities.len() {
                break;
            }
        }
        true
    }

    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.entities
            .iter()
            .position(|e| e.name == name)
            .map(|i| EntityId(i as u32))
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &RenderEntity)> {
        self.entities
            .iter()
            .enumerate()
            .map(|(i, e)| (EntityId(i as u32), e))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
