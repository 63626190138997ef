//! Entities and the type-indexed groups used by the broad phase
//!
//! The `World` is the part of the engine that game callbacks get mutable
//! access to: they can move bodies, swap textures and remove entities, but
//! never touch the registries being walked by the engine.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use glam::Vec2;

use super::body::{Body, Edges};
use super::scene_list::SceneList;

/// Opaque handle to a registered object. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub(crate) u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A registered object: an optional body, texture and type tag.
///
/// Plain game objects have all three; overlays and triggers may have none.
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    kind: Option<String>,
    texture: Option<String>,
    body: Option<Body>,
    dead: bool,
}

impl Entity {
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Type tag used for collision-group membership
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn texture(&self) -> Option<&str> {
        self.texture.as_deref()
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    pub fn body_mut(&mut self) -> Option<&mut Body> {
        self.body.as_mut()
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn set_texture(&mut self, key: impl Into<String>) {
        self.texture = Some(key.into());
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        if let Some(body) = self.body.as_mut() {
            body.pos = Vec2::new(x, y);
        }
    }

    pub fn set_velocity(&mut self, vx: f32, vy: f32) {
        if let Some(body) = self.body.as_mut() {
            body.vel = Vec2::new(vx, vy);
        }
    }

    pub fn set_static(&mut self, is_static: bool) {
        if let Some(body) = self.body.as_mut() {
            body.is_static = is_static;
        }
    }

    pub fn set_immovable(&mut self, immovable: bool) {
        if let Some(body) = self.body.as_mut() {
            body.immovable = immovable;
        }
    }

    pub fn set_bounce(&mut self, x: bool, y: bool) {
        if let Some(body) = self.body.as_mut() {
            body.bounce_x = x;
            body.bounce_y = y;
        }
    }

    /// Clamp the body against the given world-bound edges
    pub fn keep_within_bounds(&mut self, left: bool, top: bool, right: bool, bottom: bool) {
        if let Some(body) = self.body.as_mut() {
            body.keep_within = Edges::new(left, top, right, bottom);
        }
    }
}

/// Entity store plus the type index.
#[derive(Debug, Default)]
pub struct World {
    entities: BTreeMap<EntityId, Entity>,
    groups: HashMap<String, SceneList<EntityId>>,
    next_id: u32,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new entity and put it in its type group.
    pub(crate) fn spawn(
        &mut self,
        kind: Option<String>,
        texture: Option<String>,
        body: Option<Body>,
    ) -> EntityId {
        self.next_id += 1;
        let id = EntityId(self.next_id);
        if let Some(kind) = kind.as_deref() {
            self.group_entry(kind).push(id);
        }
        self.entities.insert(
            id,
            Entity {
                id,
                kind,
                texture,
                body,
                dead: false,
            },
        );
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id).filter(|e| !e.dead)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id).filter(|e| !e.dead)
    }

    pub fn body(&self, id: EntityId) -> Option<&Body> {
        self.get(id).and_then(Entity::body)
    }

    pub fn body_mut(&mut self, id: EntityId) -> Option<&mut Body> {
        self.get_mut(id).and_then(Entity::body_mut)
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Flag an entity (and so its body) dead.
    ///
    /// It leaves its type group at once; every other registry drops it at
    /// its next sweep. Returns false if it was already gone.
    pub fn remove(&mut self, id: EntityId) -> bool {
        let Some(entity) = self.entities.get_mut(&id).filter(|e| !e.dead) else {
            return false;
        };
        entity.dead = true;
        if let Some(group) = entity.kind.as_deref().and_then(|k| self.groups.get_mut(k)) {
            group.remove_where(|member| *member == id);
        }
        log::debug!("Removed entity {id}");
        true
    }

    /// Live members of a type group, in registration order
    pub fn group(&self, kind: &str) -> impl Iterator<Item = EntityId> + '_ {
        self.groups.get(kind).into_iter().flat_map(|g| g.iter().copied())
    }

    pub fn group_len(&self, kind: &str) -> usize {
        self.groups.get(kind).map_or(0, SceneList::len)
    }

    pub(crate) fn group_snapshot(&self, kind: &str) -> Vec<EntityId> {
        self.groups.get(kind).map(SceneList::snapshot).unwrap_or_default()
    }

    /// Make sure a group exists so colliders can reference it before any member
    pub(crate) fn ensure_group(&mut self, kind: &str) {
        self.group_entry(kind);
    }

    fn group_entry(&mut self, kind: &str) -> &mut SceneList<EntityId> {
        self.groups.entry(kind.to_owned()).or_default()
    }

    /// Drop dead entities from the store. Returns how many were dropped.
    pub(crate) fn sweep(&mut self) -> usize {
        let before = self.entities.len();
        self.entities.retain(|_, e| !e.dead);
        before - self.entities.len()
    }

    /// Live entity count
    pub fn len(&self) -> usize {
        self.entities.values().filter(|e| !e.dead).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(world: &mut World, x: f32) -> EntityId {
        world.spawn(
            Some("block".into()),
            Some("block-red".into()),
            Some(Body::new(x, 0.0, 1.0, 1.0)),
        )
    }

    #[test]
    fn test_spawn_registers_in_type_group() {
        let mut world = World::new();
        let a = block(&mut world, 0.0);
        let b = block(&mut world, 1.0);
        let overlay = world.spawn(None, None, None);

        assert_eq!(world.group("block").collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(world.group_len("ball"), 0);
        assert!(world.body(overlay).is_none());
        assert_eq!(world.len(), 3);
    }

    #[test]
    fn test_remove_leaves_group_immediately() {
        let mut world = World::new();
        let a = block(&mut world, 0.0);
        let b = block(&mut world, 1.0);

        assert!(world.remove(a));
        assert!(!world.remove(a));
        assert_eq!(world.group_len("block"), 1);
        assert!(!world.is_alive(a));
        assert!(world.body(a).is_none());
        assert!(world.is_alive(b));

        assert_eq!(world.sweep(), 1);
        assert_eq!(world.sweep(), 0);
    }

    #[test]
    fn test_entity_setters_reach_body() {
        let mut world = World::new();
        let a = block(&mut world, 0.0);
        let e = world.get_mut(a).unwrap();
        e.set_static(true);
        e.set_immovable(false);
        e.set_bounce(true, false);
        e.keep_within_bounds(true, false, true, false);
        e.set_position(4.0, 5.0);
        e.set_texture("block-red-hit");

        let e = world.get(a).unwrap();
        let body = e.body().unwrap();
        assert!(body.is_static);
        assert!(!body.immovable);
        assert!(body.bounce_x && !body.bounce_y);
        assert_eq!(body.keep_within, Edges::new(true, false, true, false));
        assert_eq!(body.pos, Vec2::new(4.0, 5.0));
        assert_eq!(e.texture(), Some("block-red-hit"));
    }
}
