/// Scroll-position state machine for the card row.
///
/// Holds the single continuous scroll coordinate; integer values center a
/// card exactly. At most one position animation runs at a time; every command
/// that starts a new one cancels the in-flight one first (last-writer-wins,
/// no queuing), so the final position is always the latest command's target.

const ADVANCE_DURATION: f32 = 0.28;
const CENTER_DURATION: f32 = 0.5;
/// Seconds of projected travel used to pick a momentum target.
const MOMENTUM_WINDOW: f32 = 0.2;
/// Momentum animation duration scales with distance, within these bounds.
const MOMENTUM_BASE_DURATION: f32 = 0.2;
const MOMENTUM_PER_CARD: f32 = 0.08;
const MOMENTUM_MIN_DURATION: f32 = 0.2;
const MOMENTUM_MAX_DURATION: f32 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    /// Decelerating, for wheel/momentum steps.
    CubicOut,
    /// Longer, more pronounced deceleration for click-to-center.
    QuintOut,
}

impl Easing {
    fn apply(self, t: f32) -> f32 {
        let inv = 1.0 - t.clamp(0.0, 1.0);
        match self {
            Easing::CubicOut => 1.0 - inv * inv * inv,
            Easing::QuintOut => 1.0 - inv * inv * inv * inv * inv,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Anim {
    from: f32,
    target: f32,
    elapsed: f32,
    duration: f32,
    easing: Easing,
}

#[derive(Debug)]
pub struct NavController {
    scroll: f32,
    count: usize,
    anim: Option<Anim>,
}

impl NavController {
    pub fn new(count: usize) -> Self {
        Self {
            scroll: 0.0,
            count,
            anim: None,
        }
    }

    pub fn scroll_position(&self) -> f32 {
        self.scroll
    }

    pub fn is_animating(&self) -> bool {
        self.anim.is_some()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Target of the in-flight animation, if any.
    pub fn animation_target(&self) -> Option<f32> {
        self.anim.map(|a| a.target)
    }

    /// Replace the listing: scroll back to zero, drop any animation.
    pub fn reset(&mut self, count: usize) {
        self.count = count;
        self.scroll = 0.0;
        self.anim = None;
    }

    fn max_position(&self) -> f32 {
        self.count.saturating_sub(1) as f32
    }

    fn clamp(&self, position: f32) -> f32 {
        position.clamp(0.0, self.max_position())
    }

    /// Stop the in-flight animation immediately, freezing at the current
    /// scroll position. Its completion never fires.
    pub fn cancel(&mut self) {
        self.anim = None;
    }

    fn start_anim(&mut self, target: f32, duration: f32, easing: Easing) {
        self.cancel();
        if (target - self.scroll).abs() < f32::EPSILON {
            return;
        }
        self.anim = Some(Anim {
            from: self.scroll,
            target,
            elapsed: 0.0,
            duration: duration.max(f32::EPSILON),
            easing,
        });
    }

    /// Step one card in `direction` (-1 or +1), clamped at the row ends.
    /// Idempotent at the boundaries; retargets an in-flight step.
    pub fn advance(&mut self, direction: i32) {
        if self.count == 0 {
            return;
        }
        let target = self.clamp((self.scroll + direction as f32).round());
        if (target - self.scroll).abs() < f32::EPSILON {
            return;
        }
        self.start_anim(target, ADVANCE_DURATION, Easing::CubicOut);
    }

    /// Continuous drag: set the position immediately, no easing. Valid any
    /// time; cancels an in-flight animation.
    pub fn drag_to(&mut self, raw_position: f32) {
        self.cancel();
        if self.count == 0 {
            return;
        }
        self.scroll = self.clamp(raw_position);
    }

    /// End a drag: project the release velocity (cards/second) forward,
    /// snap to the nearest integer card and ease there, with duration
    /// proportional to the distance travelled.
    pub fn release_drag_with_velocity(&mut self, velocity: f32) {
        if self.count == 0 {
            return;
        }
        let projected = self.scroll + velocity * MOMENTUM_WINDOW;
        let target = self.clamp(projected.round());
        let distance = (target - self.scroll).abs();
        let duration = (MOMENTUM_BASE_DURATION + MOMENTUM_PER_CARD * distance)
            .clamp(MOMENTUM_MIN_DURATION, MOMENTUM_MAX_DURATION);
        self.start_anim(target, duration, Easing::CubicOut);
    }

    /// Animate to an explicit card index; used for click-to-select.
    pub fn center_on(&mut self, index: usize) {
        if self.count == 0 {
            return;
        }
        let target = self.clamp(index as f32);
        self.start_anim(target, CENTER_DURATION, Easing::QuintOut);
    }

    /// Advance the in-flight animation by `dt` seconds. Returns true while
    /// still animating. The interpolation parameter is strictly monotonic,
    /// so the position never jumps backward within one transition.
    pub fn tick(&mut self, dt: f32) -> bool {
        let Some(mut anim) = self.anim else {
            return false;
        };
        anim.elapsed += dt.max(0.0);
        let t = (anim.elapsed / anim.duration).min(1.0);
        let eased = anim.easing.apply(t);
        self.scroll = anim.from + (anim.target - anim.from) * eased;

        if t >= 1.0 {
            self.scroll = anim.target;
            self.anim = None;
            false
        } else {
            self.anim = Some(anim);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settle(nav: &mut NavController) {
        let dt = 1.0 / 60.0;
        for _ in 0..600 {
            if !nav.tick(dt) {
                break;
            }
        }
    }

    #[test]
    fn test_advance_idempotent_at_boundaries() {
        let mut nav = NavController::new(5);
        nav.advance(-1);
        assert!(!nav.is_animating());
        assert_eq!(nav.scroll_position(), 0.0);

        nav.drag_to(4.0);
        nav.advance(1);
        assert!(!nav.is_animating());
        assert_eq!(nav.scroll_position(), 4.0);
    }

    #[test]
    fn test_advance_reaches_target() {
        let mut nav = NavController::new(5);
        nav.advance(1);
        assert!(nav.is_animating());
        settle(&mut nav);
        assert!((nav.scroll_position() - 1.0).abs() < 1e-6);
        assert!(!nav.is_animating());
    }

    #[test]
    fn test_second_advance_cancels_first() {
        let mut nav = NavController::new(10);
        nav.advance(1);
        nav.tick(0.05);
        let mid = nav.scroll_position();
        assert!(mid > 0.0 && mid < 1.0);

        // Second command wins outright; the first target is discarded.
        nav.advance(1);
        assert_eq!(nav.animation_target(), Some((mid + 1.0).round()));
        settle(&mut nav);
        assert_eq!(nav.scroll_position(), (mid + 1.0).round());
    }

    #[test]
    fn test_drag_is_immediate_and_clamped() {
        let mut nav = NavController::new(4);
        nav.drag_to(2.4);
        assert_eq!(nav.scroll_position(), 2.4);
        assert!(!nav.is_animating());

        nav.drag_to(99.0);
        assert_eq!(nav.scroll_position(), 3.0);
        nav.drag_to(-5.0);
        assert_eq!(nav.scroll_position(), 0.0);
    }

    #[test]
    fn test_drag_cancels_animation() {
        let mut nav = NavController::new(6);
        nav.center_on(5);
        assert!(nav.is_animating());
        nav.drag_to(1.5);
        assert!(!nav.is_animating());
        assert_eq!(nav.scroll_position(), 1.5);
    }

    #[test]
    fn test_release_snaps_to_momentum_target() {
        let mut nav = NavController::new(10);
        nav.drag_to(2.0);
        // 10 cards/sec over the momentum window projects two cards ahead.
        nav.release_drag_with_velocity(10.0);
        assert_eq!(nav.animation_target(), Some(4.0));
        settle(&mut nav);
        assert_eq!(nav.scroll_position(), 4.0);
    }

    #[test]
    fn test_release_with_tiny_velocity_snaps_to_nearest() {
        let mut nav = NavController::new(10);
        nav.drag_to(2.6);
        nav.release_drag_with_velocity(0.0);
        assert_eq!(nav.animation_target(), Some(3.0));
    }

    #[test]
    fn test_release_clamps_at_row_end() {
        let mut nav = NavController::new(4);
        nav.drag_to(2.5);
        nav.release_drag_with_velocity(50.0);
        assert_eq!(nav.animation_target(), Some(3.0));
    }

    #[test]
    fn test_scroll_is_monotonic_during_animation() {
        let mut nav = NavController::new(10);
        nav.center_on(7);
        let mut prev = nav.scroll_position();
        while nav.tick(1.0 / 120.0) {
            let now = nav.scroll_position();
            assert!(now >= prev - 1e-6, "scroll jumped backward: {prev} -> {now}");
            prev = now;
        }
        assert_eq!(nav.scroll_position(), 7.0);
    }

    #[test]
    fn test_empty_listing_is_inert() {
        let mut nav = NavController::new(0);
        nav.advance(1);
        nav.drag_to(3.0);
        nav.release_drag_with_velocity(5.0);
        nav.center_on(2);
        assert_eq!(nav.scroll_position(), 0.0);
        assert!(!nav.is_animating());
    }

    #[test]
    fn test_reset_returns_to_origin() {
        let mut nav = NavController::new(8);
        nav.drag_to(5.0);
        nav.center_on(7);
        nav.reset(3);
        assert_eq!(nav.scroll_position(), 0.0);
        assert!(!nav.is_animating());
        assert_eq!(nav.count(), 3);
    }
}
