/// View zoom, independent of the navigation state and not persisted across
/// drill-downs (the app keeps one instance per view).

pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 2.5;
/// Keyboard +/- step.
pub const ZOOM_STEP: f32 = 0.1;

#[derive(Debug, Clone, Copy)]
pub struct ZoomState {
    current: f32,
}

impl Default for ZoomState {
    fn default() -> Self {
        Self { current: 1.0 }
    }
}

impl ZoomState {
    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn set(&mut self, value: f32) {
        self.current = value.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Multiplicative zoom, used for pinch and modifier-wheel. A pinch
    /// gesture feeds per-frame ratios, whose product is the ratio of the
    /// current finger distance to the distance at gesture start.
    pub fn zoom_by(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.set(self.current * factor);
        }
    }

    /// Keyboard nudge: `steps` is +1 for `+`, -1 for `-`.
    pub fn nudge(&mut self, steps: i32) {
        self.set(self.current + steps as f32 * ZOOM_STEP);
    }

    /// Keyboard `0`: back to unity.
    pub fn reset(&mut self) {
        self.current = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_to_range() {
        let mut zoom = ZoomState::default();
        zoom.set(10.0);
        assert_eq!(zoom.current(), MAX_ZOOM);
        zoom.set(0.01);
        assert_eq!(zoom.current(), MIN_ZOOM);
    }

    #[test]
    fn test_nudge_and_reset() {
        let mut zoom = ZoomState::default();
        zoom.nudge(1);
        assert!((zoom.current() - 1.1).abs() < 1e-6);
        zoom.nudge(-2);
        assert!((zoom.current() - 0.9).abs() < 1e-6);
        zoom.reset();
        assert_eq!(zoom.current(), 1.0);
    }

    #[test]
    fn test_zoom_by_ignores_degenerate_factors() {
        let mut zoom = ZoomState::default();
        zoom.zoom_by(0.0);
        zoom.zoom_by(-1.0);
        zoom.zoom_by(f32::NAN);
        assert_eq!(zoom.current(), 1.0);
        zoom.zoom_by(1.5);
        assert!((zoom.current() - 1.5).abs() < 1e-6);
    }
}
