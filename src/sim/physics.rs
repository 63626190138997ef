//! Integration, world-bound clamping and AABB collision resolution
//!
//! Per tick: every live non-static body is integrated and clamped first, so
//! collision checks always see post-move, pre-resolution positions. Colliders
//! then run in registration order.

use glam::Vec2;

use super::body::{Body, Edges};
use super::collider::{Collider, ColliderId, HitCallback};
use super::scene_list::SceneList;
use super::world::{EntityId, World};

/// Owns the body list, the colliders and the world bounds.
#[derive(Debug)]
pub struct Physics {
    /// World bounds (width, height), anchored at the origin
    bounds: Vec2,
    bodies: SceneList<EntityId>,
    colliders: SceneList<Collider>,
    next_collider: u32,
}

impl Physics {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            bounds: Vec2::new(width, height),
            bodies: SceneList::new(),
            colliders: SceneList::new(),
            next_collider: 0,
        }
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    pub fn set_bounds(&mut self, width: f32, height: f32) {
        self.bounds = Vec2::new(width, height);
    }

    pub(crate) fn add_body(&mut self, id: EntityId) {
        self.bodies.push(id);
    }

    /// Bodies still registered, dead ones awaiting a sweep included
    pub fn body_count(&self) -> usize {
        self.bodies.stored_len()
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    pub(crate) fn add_collider(
        &mut self,
        group_a: &str,
        group_b: &str,
        on_hit: Option<HitCallback>,
    ) -> ColliderId {
        self.next_collider += 1;
        let id = ColliderId(self.next_collider);
        self.colliders
            .push(Collider::new(id, group_a, group_b, on_hit));
        id
    }

    /// Flag a collider dead; it stops running at the next update.
    pub fn remove_collider(&mut self, id: ColliderId) -> bool {
        self.colliders.kill_where(|c| c.id() == id) > 0
    }

    /// Advance one fixed step.
    pub fn update(&mut self, world: &mut World, dt: f32) {
        self.bodies.kill_where(|id| !world.is_alive(*id));
        self.bodies.sweep();

        self.integrate(world, dt);
        for id in self.bodies.iter() {
            if let Some(body) = world.body_mut(*id).filter(|b| !b.is_static) {
                clamp_to_bounds(body, self.bounds);
            }
        }

        self.colliders.sweep();
        for collider in self.colliders.iter_mut() {
            collider.scan(world);
        }
    }

    /// Move every non-static body by `vel * dt` and reset its touching flags.
    pub fn integrate(&self, world: &mut World, dt: f32) {
        for id in self.bodies.iter() {
            let Some(body) = world.body_mut(*id) else {
                continue;
            };
            if body.is_static {
                continue;
            }
            body.touching = Edges::NONE;
            body.pos += body.vel * dt;
        }
    }
}

/// Snap a body back inside the clamped edges of `bounds`.
///
/// Left/right share the horizontal axis and top/bottom the vertical one. A
/// hit on an axis flips that velocity component when the body bounces on it.
pub fn clamp_to_bounds(body: &mut Body, bounds: Vec2) {
    let keep = body.keep_within;
    let mut hit_horizontal = false;
    let mut hit_vertical = false;

    if keep.left && body.pos.x < 0.0 {
        body.pos.x = 0.0;
        hit_horizontal = true;
    } else if keep.right && body.right() > bounds.x {
        body.pos.x = bounds.x - body.size.x;
        hit_horizontal = true;
    }

    if keep.top && body.pos.y < 0.0 {
        body.pos.y = 0.0;
        hit_vertical = true;
    } else if keep.bottom && body.bottom() > bounds.y {
        body.pos.y = bounds.y - body.size.y;
        hit_vertical = true;
    }

    if hit_horizontal && body.bounce_x {
        body.vel.x = -body.vel.x;
    }
    if hit_vertical && body.bounce_y {
        body.vel.y = -body.vel.y;
    }
}

/// Separate an overlapping pair and reflect the moving body.
///
/// Exactly one side must be immovable; the other is pushed out. A static
/// moving side is left in place.
///
/// The push is the overlap on the shallower axis, which separates the pair
/// only when the moving body straddles an edge of the fixed one on that
/// axis. A moving body that sits fully inside the fixed one on the push
/// axis can still intersect afterwards.
///
/// # Panics
/// If both bodies are immovable or both are movable. That pairing is a
/// setup mistake, not a runtime condition.
pub fn resolve_collision(a: &mut Body, b: &mut Body) {
    if a.immovable == b.immovable {
        panic!(
            "unsupported collision pairing: both bodies are {}",
            if a.immovable { "immovable" } else { "movable" }
        );
    }
    let (moving, fixed) = if a.immovable { (b, &*a) } else { (a, &*b) };
    if moving.is_static || !moving.intersects(fixed) {
        return;
    }
    separate(moving, fixed);
}

/// Minimum-translation push of `moving` out of `fixed`, then bounce.
fn separate(moving: &mut Body, fixed: &Body) {
    let overlap = moving.overlap(fixed);
    let (w, h) = (overlap.size.x, overlap.size.y);
    // Equal overlap pushes out on both axes
    let push_x = w <= h;
    let push_y = h <= w;
    let mut contact = Edges::NONE;

    if push_x {
        // Left of the overlap origin means we came from the left
        moving.pos.x -= if moving.pos.x < overlap.pos.x { w } else { -w };
        contact.left = moving.pos.x > overlap.pos.x;
        contact.right = moving.pos.x < overlap.pos.x;
    }
    if push_y {
        moving.pos.y -= if moving.pos.y < overlap.pos.y { h } else { -h };
        contact.top = moving.pos.y > overlap.pos.y;
        contact.bottom = moving.pos.y < overlap.pos.y;
    }

    // Reflection ignores the bounce flags, those only apply to world bounds
    if contact.vertical() {
        moving.vel.y = -moving.vel.y;
    }
    if contact.horizontal() {
        moving.vel.x = -moving.vel.x;
    }

    let touching = &mut moving.touching;
    touching.left |= contact.left;
    touching.right |= contact.right;
    touching.top |= contact.top;
    touching.bottom |= contact.bottom;
}
