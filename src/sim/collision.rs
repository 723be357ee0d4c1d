//! Overlap tests and contact geometry
//!
//! Ships, villains, projectiles and pickups are axis-aligned rectangles
//! (top-left origin); asteroids and tail samples are circles. The resolver
//! needs both a yes/no overlap and, for shield deflection, a contact normal.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle, `pos` is the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    #[inline]
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self {
            pos: center - size * 0.5,
            size,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.pos
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.pos + self.size
    }

    /// Closest point inside the rectangle to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min(), self.max())
    }
}

/// Result of a contact query
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// Whether the shapes overlap
    pub hit: bool,
    /// Unit normal pointing from the first shape toward the second
    pub normal: Vec2,
    /// Overlap depth along `normal`
    pub penetration: f32,
}

impl Contact {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Strict rectangle intersection (touching edges do not count)
#[inline]
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    a.pos.x < b.pos.x + b.size.x
        && a.pos.x + a.size.x > b.pos.x
        && a.pos.y < b.pos.y + b.size.y
        && a.pos.y + a.size.y > b.pos.y
}

/// Circle vs rectangle intersection
#[inline]
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let closest = rect.closest_point(center);
    center.distance_squared(closest) < radius * radius
}

/// Circle vs circle intersection
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    a.distance_squared(b) < r * r
}

/// Contact from rectangle `a` toward rectangle `b` along the axis of least
/// penetration
pub fn rect_rect_contact(a: &Rect, b: &Rect) -> Contact {
    if !rects_overlap(a, b) {
        return Contact::miss();
    }
    let overlap_x = (a.max().x.min(b.max().x)) - (a.min().x.max(b.min().x));
    let overlap_y = (a.max().y.min(b.max().y)) - (a.min().y.max(b.min().y));
    let delta = b.center() - a.center();

    if overlap_x < overlap_y {
        let sign = if delta.x < 0.0 { -1.0 } else { 1.0 };
        Contact {
            hit: true,
            normal: Vec2::new(sign, 0.0),
            penetration: overlap_x,
        }
    } else {
        let sign = if delta.y < 0.0 { -1.0 } else { 1.0 };
        Contact {
            hit: true,
            normal: Vec2::new(0.0, sign),
            penetration: overlap_y,
        }
    }
}

/// Contact from rectangle `rect` toward a circle
pub fn rect_circle_contact(rect: &Rect, center: Vec2, radius: f32) -> Contact {
    let closest = rect.closest_point(center);
    let offset = center - closest;
    let dist_sq = offset.length_squared();

    if dist_sq >= radius * radius {
        return Contact::miss();
    }

    if dist_sq > 1e-8 {
        let dist = dist_sq.sqrt();
        return Contact {
            hit: true,
            normal: offset / dist,
            penetration: radius - dist,
        };
    }

    // Circle center is inside the rectangle: push out through the nearest face
    let min = rect.min();
    let max = rect.max();
    let faces = [
        (center.x - min.x, Vec2::NEG_X),
        (max.x - center.x, Vec2::X),
        (center.y - min.y, Vec2::NEG_Y),
        (max.y - center.y, Vec2::Y),
    ];
    let (depth, normal) = faces
        .iter()
        .copied()
        .fold((f32::INFINITY, Vec2::X), |best, face| {
            if face.0 < best.0 { face } else { best }
        });
    Contact {
        hit: true,
        normal,
        penetration: depth + radius,
    }
}

/// Reflect velocity off a surface: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f32, y: f32, w: f32, h: f32) -> Rect {
        Rect::new(Vec2::new(x, y), Vec2::new(w, h))
    }

    #[test]
    fn test_rects_overlap() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        assert!(rects_overlap(&a, &rect(5.0, 5.0, 10.0, 10.0)));
        // Touching edges is not an overlap
        assert!(!rects_overlap(&a, &rect(10.0, 0.0, 10.0, 10.0)));
        assert!(!rects_overlap(&a, &rect(20.0, 20.0, 1.0, 1.0)));
    }

    #[test]
    fn test_circle_rect_overlap() {
        let r = rect(0.0, 0.0, 10.0, 10.0);
        assert!(circle_rect_overlap(Vec2::new(15.0, 5.0), 6.0, &r));
        assert!(!circle_rect_overlap(Vec2::new(15.0, 5.0), 4.0, &r));
        // Corner case uses euclidean distance
        assert!(!circle_rect_overlap(Vec2::new(14.0, 14.0), 5.0, &r));
        assert!(circle_rect_overlap(Vec2::new(5.0, 5.0), 1.0, &r));
    }

    #[test]
    fn test_rect_rect_contact_axis() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(8.0, 1.0, 10.0, 8.0);
        let c = rect_rect_contact(&a, &b);
        assert!(c.hit);
        assert_eq!(c.normal, Vec2::X);
        assert!((c.penetration - 2.0).abs() < 1e-5);

        let above = rect(1.0, -7.0, 8.0, 10.0);
        let c = rect_rect_contact(&a, &above);
        assert_eq!(c.normal, Vec2::NEG_Y);
        assert!((c.penetration - 3.0).abs() < 1e-5);

        assert!(!rect_rect_contact(&a, &rect(30.0, 0.0, 1.0, 1.0)).hit);
    }

    #[test]
    fn test_rect_circle_contact_outside_and_inside() {
        let r = rect(0.0, 0.0, 10.0, 10.0);
        let c = rect_circle_contact(&r, Vec2::new(13.0, 5.0), 5.0);
        assert!(c.hit);
        assert!((c.normal - Vec2::X).length() < 1e-5);
        assert!((c.penetration - 2.0).abs() < 1e-5);

        // Center inside, nearest face is the top
        let c = rect_circle_contact(&r, Vec2::new(5.0, 1.0), 3.0);
        assert!(c.hit);
        assert_eq!(c.normal, Vec2::NEG_Y);
        assert!((c.penetration - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_reflect_velocity() {
        let reflected = reflect_velocity(Vec2::new(100.0, 20.0), Vec2::NEG_X);
        assert!((reflected.x + 100.0).abs() < 1e-3);
        assert!((reflected.y - 20.0).abs() < 1e-3);
    }
}
