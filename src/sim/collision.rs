//! Collision detection between the player and obstacles
//!
//! Plain AABB overlap. Touching edges do not count as a hit.

use super::obstacles::Obstacle;
use super::rect::Rect;

/// Check whether two rectangles overlap
#[inline]
pub fn intersects(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}

/// Index of the first obstacle overlapping the player, if any.
///
/// Stops at the first hit: one collision ends the run.
pub fn first_hit(player: &Rect, obstacles: &[Obstacle]) -> Option<usize> {
    obstacles.iter().position(|o| intersects(player, &o.rect))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_overlapping_rects_intersect() {
        let player = Rect::new(0.0, 0.0, 10.0, 10.0);
        let obstacle = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(intersects(&player, &obstacle));
    }

    #[test]
    fn test_disjoint_rects_miss() {
        let player = Rect::new(0.0, 0.0, 10.0, 10.0);
        let obstacle = Rect::new(20.0, 20.0, 5.0, 5.0);
        assert!(!intersects(&player, &obstacle));
    }

    #[test]
    fn test_touching_edges_miss() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!intersects(&a, &b));
        let c = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!intersects(&a, &c));
    }

    #[test]
    fn test_containment_intersects() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new(40.0, 40.0, 5.0, 5.0);
        assert!(intersects(&outer, &inner));
        assert!(intersects(&inner, &outer));
    }

    #[test]
    fn test_first_hit_returns_first_overlap() {
        let player = Rect::new(60.0, 285.0, 30.0, 30.0);
        let obstacles = vec![
            Obstacle::new(1, Rect::new(300.0, 0.0, 20.0, 100.0), -4.0),
            Obstacle::new(2, Rect::new(70.0, 250.0, 20.0, 60.0), -4.0),
            Obstacle::new(3, Rect::new(65.0, 290.0, 20.0, 60.0), -4.0),
        ];
        assert_eq!(first_hit(&player, &obstacles), Some(1));
        assert_eq!(first_hit(&player, &obstacles[..1]), None);
        assert_eq!(first_hit(&player, &[]), None);
    }

    proptest! {
        #[test]
        fn prop_intersects_is_symmetric(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0,
            aw in 0.1f32..200.0, ah in 0.1f32..200.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0,
            bw in 0.1f32..200.0, bh in 0.1f32..200.0,
        ) {
            let a = Rect::new(ax, ay, aw, ah);
            let b = Rect::new(bx, by, bw, bh);
            prop_assert_eq!(intersects(&a, &b), intersects(&b, &a));
        }

        #[test]
        fn prop_rect_intersects_itself(
            x in -500.0f32..500.0, y in -500.0f32..500.0,
            w in 0.1f32..200.0, h in 0.1f32..200.0,
        ) {
            let r = Rect::new(x, y, w, h);
            prop_assert!(intersects(&r, &r));
        }
    }
}
