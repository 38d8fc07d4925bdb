use glam::{Vec2, Vec3};

/// World-space distance between adjacent card centers.
pub const CARD_SPACING: f32 = 1.25;
/// Per-axis ratios of the diagonal row. Negative x/y so that increasing
/// index walks down-and-right once projected to screen space.
pub const X_RATIO: f32 = -0.85;
pub const Y_RATIO: f32 = -0.45;
pub const Z_RATIO: f32 = -0.10;
/// Extra scale for the centered card; decays to zero one card away.
pub const SCALE_BOOST: f32 = 0.15;
/// Lift of the centered card, added to the vertical offset only.
pub const ELEVATION_PEAK: f32 = 0.6;

/// Screen projection constants.
pub const PIXELS_PER_UNIT: f32 = 180.0;
pub const CARD_WIDTH_PX: f32 = 190.0;
pub const CARD_HEIGHT_PX: f32 = 250.0;

/// Placement of one card: world-space position plus uniform scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardTransform {
    pub position: Vec3,
    pub scale: f32,
}

/// Pure layout function: where card `index` sits when the row is scrolled to
/// `scroll`. Identical inputs always produce identical outputs; this is called
/// both per animation frame and for instantaneous snaps during drag.
pub fn card_transform(index: usize, scroll: f32) -> CardTransform {
    let offset = index as f32 - scroll;
    let proximity = (1.0 - offset.abs()).max(0.0);

    let scale = 1.0 + SCALE_BOOST * proximity;
    let elevation = ELEVATION_PEAK * proximity;

    let position = Vec3::new(
        offset * CARD_SPACING * X_RATIO,
        offset * CARD_SPACING * Y_RATIO + elevation,
        offset * CARD_SPACING * Z_RATIO,
    );

    CardTransform { position, scale }
}

/// Project a world transform into a screen-space rect (min corner, size).
/// World y points up, so it flips; world x is mirrored so the negative
/// ratios produce the down-right diagonal.
pub fn screen_rect(transform: &CardTransform, viewport_center: Vec2, zoom: f32) -> (Vec2, Vec2) {
    let center = Vec2::new(
        viewport_center.x - transform.position.x * PIXELS_PER_UNIT * zoom,
        viewport_center.y - transform.position.y * PIXELS_PER_UNIT * zoom,
    );
    let size = Vec2::new(CARD_WIDTH_PX, CARD_HEIGHT_PX) * transform.scale * zoom;
    (center - size * 0.5, size)
}

/// Indices ordered far-to-near for painting: most distant from the scroll
/// position first, so the centered card lands on top.
pub fn paint_order(count: usize, scroll: f32) -> Vec<usize> {
    let mut order: Vec<usize> = (0..count).collect();
    order.sort_by(|a, b| {
        let da = (*a as f32 - scroll).abs();
        let db = (*b as f32 - scroll).abs();
        db.partial_cmp(&da).unwrap_or(std::cmp::Ordering::Equal)
    });
    order
}

/// Resolve a screen-space point to the topmost struck card, scanning
/// near-to-far. Returns `None` when the point misses every card.
pub fn pick_topmost(
    count: usize,
    scroll: f32,
    viewport_center: Vec2,
    zoom: f32,
    point: Vec2,
) -> Option<usize> {
    let mut order = paint_order(count, scroll);
    order.reverse();
    for index in order {
        let transform = card_transform(index, scroll);
        let (min, size) = screen_rect(&transform, viewport_center, zoom);
        if point.x >= min.x && point.x <= min.x + size.x && point.y >= min.y && point.y <= min.y + size.y
        {
            return Some(index);
        }
    }
    None
}

/// Screen-space direction of one +1 index step at zoom 1, and its pixel
/// length. Used to map pointer drags back into scroll-position deltas.
pub fn row_axis_px() -> (Vec2, f32) {
    // Elevation is excluded: the drag axis is the flat diagonal, not the
    // center bump.
    let axis = Vec2::new(
        -CARD_SPACING * X_RATIO * PIXELS_PER_UNIT,
        -CARD_SPACING * Y_RATIO * PIXELS_PER_UNIT,
    );
    let len = axis.length();
    (axis / len, len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_bounds_and_peak() {
        for index in 0..12 {
            for step in 0..40 {
                let scroll = step as f32 * 0.3;
                let t = card_transform(index, scroll);
                assert!(t.scale >= 1.0 - 1e-6 && t.scale <= 1.15 + 1e-6);
            }
        }
        let centered = card_transform(3, 3.0);
        assert!((centered.scale - 1.15).abs() < 1e-6);
        let adjacent = card_transform(4, 3.0);
        assert!((adjacent.scale - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_elevation_bounds_and_monotonic_decay() {
        let elevation = |index: usize, scroll: f32| {
            let t = card_transform(index, scroll);
            let offset = index as f32 - scroll;
            t.position.y - offset * CARD_SPACING * Y_RATIO
        };

        assert!((elevation(5, 5.0) - ELEVATION_PEAK).abs() < 1e-6);
        assert!(elevation(6, 5.0).abs() < 1e-6);

        // Non-increasing in |index - scroll|.
        let mut prev = f32::MAX;
        for step in 0..20 {
            let scroll = 5.0 - step as f32 * 0.1;
            let e = elevation(5, scroll);
            assert!(e <= prev + 1e-6);
            assert!((0.0..=ELEVATION_PEAK + 1e-6).contains(&e));
            prev = e;
        }
    }

    #[test]
    fn test_deterministic() {
        let a = card_transform(7, 2.35);
        let b = card_transform(7, 2.35);
        assert_eq!(a, b);
    }

    #[test]
    fn test_diagonal_runs_down_right_on_screen() {
        let center = Vec2::new(500.0, 400.0);
        let (lo_min, _) = screen_rect(&card_transform(2, 2.0), center, 1.0);
        let (hi_min, _) = screen_rect(&card_transform(3, 2.0), center, 1.0);
        assert!(hi_min.x > lo_min.x, "higher index should sit further right");
        assert!(hi_min.y > lo_min.y, "higher index should sit further down");
    }

    #[test]
    fn test_pick_prefers_centered_card() {
        let center = Vec2::new(500.0, 400.0);
        // The centered card's own center must resolve to itself even though
        // neighbours overlap it.
        let t = card_transform(4, 4.0);
        let (min, size) = screen_rect(&t, center, 1.0);
        let hit = pick_topmost(9, 4.0, center, 1.0, min + size * 0.5);
        assert_eq!(hit, Some(4));
    }

    #[test]
    fn test_pick_misses_empty_space() {
        let center = Vec2::new(500.0, 400.0);
        let hit = pick_topmost(3, 1.0, center, 1.0, Vec2::new(-4000.0, -4000.0));
        assert_eq!(hit, None);
    }

    #[test]
    fn test_paint_order_far_first() {
        let order = paint_order(5, 2.0);
        assert_eq!(*order.last().unwrap(), 2);
        let first = order[0];
        assert!(first == 0 || first == 4);
    }

    #[test]
    fn test_row_axis_points_down_right() {
        let (axis, len) = row_axis_px();
        assert!(axis.x > 0.0 && axis.y > 0.0);
        assert!((axis.length() - 1.0).abs() < 1e-5);
        assert!(len > 0.0);
    }
}
