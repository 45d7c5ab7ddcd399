use campus_common::Rect;
use glam::Vec2;

/// The camera: a rectangle of the world shown on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    center: Vec2,
    size: Vec2,
}

impl Viewport {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.center = center;
    }

    pub fn move_by(&mut self, delta: Vec2) {
        self.center += delta;
    }

    pub fn bounds(&self) -> Rect {
        Rect::centered(self.center, self.size)
    }

    /// Shift the center so the viewport lies inside `world`. On an axis where
    /// the world is smaller than the viewport, center on the world instead.
    /// A non-finite center is reset to the world center first.
    pub fn clamp_to(&mut self, world: &Rect) {
        if !self.center.is_finite() {
            tracing::warn!(center = ?self.center, "viewport center is not finite, recentering");
            self.center = world.center();
        }
        let half = self.size / 2.0;
        let clamp_axis = |center: f32, half: f32, lo: f32, hi: f32| {
            if hi - lo <= half * 2.0 {
                (lo + hi) / 2.0
            } else {
                center.clamp(lo + half, hi - half)
            }
        };
        self.center = Vec2::new(
            clamp_axis(self.center.x, half.x, world.left, world.right()),
            clamp_axis(self.center.y, half.y, world.top, world.bottom()),
        );
    }

    /// Pan by half the viewport extent when `focus` comes within `border`
    /// pixels of an edge, then clamp to `world`. Returns whether the center moved.
    pub fn follow(&mut self, focus: Vec2, border: f32, world: &Rect) -> bool {
        let view = self.bounds();
        let half = self.size / 2.0;
        let before = self.center;

        if focus.x <= view.left + border {
            self.center.x -= half.x;
        } else if focus.x >= view.right() - border {
            self.center.x += half.x;
        }
        if focus.y <= view.top + border {
            self.center.y -= half.y;
        } else if focus.y >= view.bottom() - border {
            self.center.y += half.y;
        }

        self.clamp_to(world);
        self.center != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> Rect {
        Rect::new(0.0, 0.0, 7000.0, 4000.0)
    }

    fn inside(view: &Viewport, world: &Rect) -> bool {
        let b = view.bounds();
        b.left >= world.left && b.top >= world.top && b.right() <= world.right() && b.bottom() <= world.bottom()
    }

    #[test]
    fn bounds_are_centered() {
        let v = Viewport::new(Vec2::new(900.0, 1100.0), Vec2::new(1366.0, 768.0));
        let b = v.bounds();
        assert_eq!(b.left, 217.0);
        assert_eq!(b.top, 716.0);
    }

    #[test]
    fn focus_in_dead_zone_does_not_pan() {
        let mut v = Viewport::new(Vec2::new(900.0, 1100.0), Vec2::new(1366.0, 768.0));
        assert!(!v.follow(Vec2::new(900.0, 1100.0), 16.0, &world()));
        assert_eq!(v.center(), Vec2::new(900.0, 1100.0));
    }

    #[test]
    fn pans_right_by_half_extent() {
        let mut v = Viewport::new(Vec2::new(900.0, 1100.0), Vec2::new(1366.0, 768.0));
        assert!(v.follow(Vec2::new(1580.0, 1100.0), 16.0, &world()));
        assert_eq!(v.center(), Vec2::new(1583.0, 1100.0));
    }

    #[test]
    fn pan_is_clamped_at_world_edge() {
        let world = world();
        let mut v = Viewport::new(Vec2::new(6000.0, 2000.0), Vec2::new(1366.0, 768.0));
        assert!(v.follow(Vec2::new(6999.0, 2000.0), 16.0, &world));
        assert!(v.center().x > 6000.0);
        assert_eq!(v.bounds().right(), 7000.0);
        assert!(inside(&v, &world));
    }

    #[test]
    fn pans_up_and_left_without_leaving_world() {
        let world = world();
        let mut v = Viewport::new(Vec2::new(700.0, 400.0), Vec2::new(1366.0, 768.0));
        v.follow(Vec2::new(20.0, 20.0), 16.0, &world);
        assert_eq!(v.bounds().left, 0.0);
        assert_eq!(v.bounds().top, 0.0);
        assert!(inside(&v, &world));
    }

    #[test]
    fn small_world_centers_view() {
        let small = Rect::new(0.0, 0.0, 1000.0, 500.0);
        let mut v = Viewport::new(Vec2::new(5000.0, 5000.0), Vec2::new(1366.0, 768.0));
        v.clamp_to(&small);
        assert_eq!(v.center(), Vec2::new(500.0, 250.0));
    }

    #[test]
    fn nan_center_is_recentered() {
        let world = world();
        let mut v = Viewport::new(Vec2::new(f32::NAN, 1100.0), Vec2::new(1366.0, 768.0));
        v.clamp_to(&world);
        assert_eq!(v.center(), Vec2::new(3500.0, 2000.0));

        v.move_by(Vec2::new(0.0, f32::INFINITY));
        v.follow(Vec2::new(3500.0, 2000.0), 16.0, &world);
        assert!(v.center().is_finite());
        assert!(inside(&v, &world));
    }
}
