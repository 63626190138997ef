//! Standing collision rules between two type groups

use super::physics::resolve_collision;
use super::world::{EntityId, World};

/// Called once per overlapping pair per tick, after separation.
///
/// Arguments are `(member of group A, member of group B)`.
pub type HitCallback = Box<dyn FnMut(&mut World, EntityId, EntityId)>;

/// Handle returned by collider registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderId(pub(crate) u32);

/// A registered pairing between two named groups
pub struct Collider {
    id: ColliderId,
    group_a: String,
    group_b: String,
    on_hit: Option<HitCallback>,
}

impl std::fmt::Debug for Collider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collider")
            .field("id", &self.id)
            .field("group_a", &self.group_a)
            .field("group_b", &self.group_b)
            .field("on_hit", &self.on_hit.is_some())
            .finish()
    }
}

impl Collider {
    pub(crate) fn new(
        id: ColliderId,
        group_a: impl Into<String>,
        group_b: impl Into<String>,
        on_hit: Option<HitCallback>,
    ) -> Self {
        Self {
            id,
            group_a: group_a.into(),
            group_b: group_b.into(),
            on_hit,
        }
    }

    pub fn id(&self) -> ColliderId {
        self.id
    }

    pub fn groups(&self) -> (&str, &str) {
        (&self.group_a, &self.group_b)
    }

    /// Broad phase over the cross product of both groups.
    ///
    /// Groups are snapshotted up front; members removed by a callback are
    /// skipped for the rest of the scan. Returns the number of hits.
    pub(crate) fn scan(&mut self, world: &mut World) -> usize {
        let members_a = world.group_snapshot(&self.group_a);
        let members_b = world.group_snapshot(&self.group_b);
        let mut hits = 0;

        for &a in &members_a {
            for &b in &members_b {
                if a == b {
                    continue;
                }
                // `a` may have been removed by a callback on an earlier pair
                if !world.is_alive(a) {
                    break;
                }
                let (Some(mut body_a), Some(mut body_b)) =
                    (world.body(a).copied(), world.body(b).copied())
                else {
                    continue;
                };
                if !body_a.intersects(&body_b) {
                    continue;
                }

                resolve_collision(&mut body_a, &mut body_b);
                if let Some(body) = world.body_mut(a) {
                    *body = body_a;
                }
                if let Some(body) = world.body_mut(b) {
                    *body = body_b;
                }

                hits += 1;
                if let Some(on_hit) = self.on_hit.as_mut() {
                    on_hit(world, a, b);
                }
            }
        }

        if hits > 0 {
            log::trace!("{} x {}: {} hits", self.group_a, self.group_b, hits);
        }
        hits
    }
}
