//! Axis-aligned physical footprint of an entity

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// One flag per rectangle edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edges {
    pub left: bool,
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
}

impl Edges {
    pub const NONE: Edges = Edges::new(false, false, false, false);
    pub const ALL: Edges = Edges::new(true, true, true, true);

    pub const fn new(left: bool, top: bool, right: bool, bottom: bool) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn horizontal(&self) -> bool {
        self.left || self.right
    }

    pub fn vertical(&self) -> bool {
        self.top || self.bottom
    }

    pub fn any(&self) -> bool {
        self.horizontal() || self.vertical()
    }
}

/// Axis-aligned rectangle. `pos` is the top-left corner, y grows downward.
///
/// The size may be zero or negative when the rect is the result of
/// [`Rect::overlap`] on two disjoint rects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// Far corner (right, bottom)
    #[inline]
    pub fn max(&self) -> Vec2 {
        self.pos + self.size
    }

    /// Intersection of two rects: max of near edges, min of far edges
    pub fn overlap(&self, other: &Rect) -> Rect {
        let pos = self.pos.max(other.pos);
        let far = self.max().min(other.max());
        Rect {
            pos,
            size: far - pos,
        }
    }

    /// Strict overlap test: touching edges do not count
    pub fn intersects(&self, other: &Rect) -> bool {
        let a_max = self.max();
        let b_max = other.max();
        self.pos.x < b_max.x
            && a_max.x > other.pos.x
            && self.pos.y < b_max.y
            && a_max.y > other.pos.y
    }
}

/// Physical state of one entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    /// Excluded from integration and never moved by resolution
    pub is_static: bool,
    /// Only ever the stationary side of a resolved collision
    pub immovable: bool,
    pub bounce_x: bool,
    pub bounce_y: bool,
    /// World-bound edges this body is clamped against
    pub keep_within: Edges,
    /// Sides involved in a collision during the current tick
    pub touching: Edges,
}

impl Body {
    /// Create a body at rest.
    ///
    /// # Panics
    /// If `width` or `height` is not strictly positive.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        assert!(
            width > 0.0 && height > 0.0,
            "body size must be positive, got {width}x{height}"
        );
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(width, height),
            vel: Vec2::ZERO,
            is_static: false,
            immovable: true,
            bounce_x: false,
            bounce_y: false,
            keep_within: Edges::NONE,
            touching: Edges::NONE,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn intersects(&self, other: &Body) -> bool {
        self.rect().intersects(&other.rect())
    }

    pub fn overlap(&self, other: &Body) -> Rect {
        self.rect().overlap(&other.rect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_rect() {
        let a = Rect::new(0.0, 0.0, 4.0, 4.0);
        let b = Rect::new(3.0, 1.0, 4.0, 2.0);
        let o = a.overlap(&b);
        assert_eq!(o, Rect::new(3.0, 1.0, 1.0, 2.0));
    }

    #[test]
    fn test_overlap_of_disjoint_rects_is_not_positive() {
        let a = Rect::new(0.0, 0.0, 1.0, 1.0);
        let b = Rect::new(3.0, 0.0, 1.0, 1.0);
        let o = a.overlap(&b);
        assert!(o.size.x <= 0.0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 1.0, 1.0);
        let b = Rect::new(1.0, 0.0, 1.0, 1.0);
        assert!(!a.intersects(&b));
        let c = Rect::new(0.5, 0.999, 1.0, 1.0);
        assert!(a.intersects(&c));
    }

    #[test]
    fn test_body_defaults() {
        let b = Body::new(1.0, 2.0, 3.0, 4.0);
        assert!(b.immovable);
        assert!(!b.is_static);
        assert_eq!(b.keep_within, Edges::NONE);
        assert_eq!(b.right(), 4.0);
        assert_eq!(b.bottom(), 6.0);
        assert_eq!(b.center(), Vec2::new(2.5, 4.0));
    }

    #[test]
    #[should_panic(expected = "body size must be positive")]
    fn test_zero_size_body_panics() {
        Body::new(0.0, 0.0, 0.0, 1.0);
    }
}
