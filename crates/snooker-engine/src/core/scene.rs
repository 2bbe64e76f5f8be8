use crate::api::types::EntityId;
use crate::components::entity::{Entity, EntityKind};

/// Flat entity storage. A table holds a few dozen bodies, so linear scans win.
pub struct Scene {
    entities: Vec<Entity>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            entities: Vec::with_capacity(64),
        }
    }

    /// Add an entity to the scene.
    pub fn spawn(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    /// Remove an entity by ID. Returns the removed entity if found.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let idx = self.entities.iter().position(|e| e.id == id)?;
        Some(self.entities.swap_remove(idx))
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// IDs of every entity of the given kind.
    pub fn ids_of_kind(&self, kind: EntityKind) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.id)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn spawn_and_get() {
        let mut scene = Scene::new();
        let id = EntityId(1);
        scene.spawn(Entity::new(id, EntityKind::Ball).with_pos(Vec2::new(10.0, 20.0)));
        let e = scene.get(id).unwrap();
        assert_eq!(e.pos, Vec2::new(10.0, 20.0));
        assert_eq!(e.kind, EntityKind::Ball);
    }

    #[test]
    fn despawn_removes_entity() {
        let mut scene = Scene::new();
        let id = EntityId(1);
        scene.spawn(Entity::new(id, EntityKind::Ball));
        assert!(scene.despawn(id).is_some());
        assert!(scene.is_empty());
        assert!(scene.despawn(id).is_none());
        assert!(scene.get(id).is_none());
    }

    #[test]
    fn ids_of_kind_filters() {
        let mut scene = Scene::new();
        scene.spawn(Entity::new(EntityId(1), EntityKind::Cushion));
        scene.spawn(Entity::new(EntityId(2), EntityKind::Ball));
        scene.spawn(Entity::new(EntityId(3), EntityKind::Cushion));
        scene.spawn(Entity::new(EntityId(4), EntityKind::Boundary));
        assert_eq!(scene.ids_of_kind(EntityKind::Cushion), vec![EntityId(1), EntityId(3)]);
        assert_eq!(scene.ids_of_kind(EntityKind::Boundary), vec![EntityId(4)]);
    }
}
