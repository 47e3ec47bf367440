//! One-to-one pairing between physics bodies and scene entities.

use tracing::debug;

use crate::collision::BodyHandle;
use crate::error::BindingError;
use crate::scene::{EntityId, SceneGraph};
use crate::world::World;

/// A body whose pose drives an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub body: BodyHandle,
    pub entity: EntityId,
}

#[derive(Debug, Clone, Default)]
pub struct BindingSet {
    bindings: Vec<Binding>,
}

impl BindingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs a body with an entity; neither may already be bound
    pub fn bind(&mut self, body: BodyHandle, entity: EntityId) -> Result<(), BindingError> {
        if self.bindings.iter().any(|b| b.body == body) {
            return Err(BindingError::BodyAlreadyBound(body));
        }
        if self.bindings.iter().any(|b| b.entity == entity) {
            return Err(BindingError::EntityAlreadyBound(entity));
        }
        self.bindings.push(Binding { body, entity });
        debug!(?body, ?entity, "bound body to entity");
        Ok(())
    }

    /// Like [`bind`](Self::bind), also checking both ends exist
    pub fn bind_checked(
        &mut self,
        world: &World,
        scene: &SceneGraph,
        body: BodyHandle,
        entity: EntityId,
    ) -> Result<(), BindingError> {
        if world.body(body).is_none() {
            return Err(BindingError::UnknownBody(body));
        }
        if scene.get(entity).is_none() {
            return Err(BindingError::UnknownEntity(entity));
        }
        self.bind(body, entity)
    }

    /// Copies every bound body's position and orientation onto its entity
    pub fn sync(&self, world: &World, scene: &mut SceneGraph) {
        for binding in &self.bindings {
            if let Some(pose) = world.body_pose(binding.body) {
                scene.set_pose(binding.entity, pose);
            }
        }
    }

    pub fn entity_for(&self, body: BodyHandle) -> Option<EntityId> {
        self.bindings.iter().find(|b| b.body == body).map(|b| b.entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
