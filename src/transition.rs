use crate::layout::{self, CardTransform};
use glam::Vec3;

/// Two-phase drill-down animation: the old card set drops away and fades
/// while the new set fans out of the struck card's position into the steady
/// diagonal layout at scroll position 0. Runs on the frame clock like the
/// navigation animations; resolves only when the full timeline is done.

const BASE_DURATION: f32 = 0.9;
/// Phase A (drop-out) covers the first portion of the timeline.
const PHASE_A_FRACTION: f32 = 0.55;
/// Phase B (fan-in) starts before Phase A ends, overlapping its tail.
const PHASE_B_START_FRACTION: f32 = 0.35;
const PHASE_B_FRACTION: f32 = 0.55;
/// World-space distance old cards drop.
const DROP_DISTANCE: f32 = 2.4;
/// Per-index stagger so cards do not move in lockstep.
const STAGGER: f32 = 0.03;
/// Overshoot amount of the fan-in easing.
const BACK_OVERSHOOT: f32 = 1.70158;

/// Drawable state of one card mid-transition.
#[derive(Debug, Clone, Copy)]
pub struct CardVisual {
    pub position: Vec3,
    pub scale: f32,
    pub opacity: f32,
}

/// Painting order for a transition card set: farthest from the row center
/// first, so nearer cards overlap correctly. Depth follows |z|, which the
/// layout scales linearly with the distance from the centered card; the same
/// far-to-near rule the steady-state painter uses.
pub fn depth_order(visuals: &[CardVisual]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..visuals.len()).collect();
    order.sort_by(|a, b| {
        let da = visuals[*a].position.z.abs();
        let db = visuals[*b].position.z.abs();
        db.partial_cmp(&da).unwrap_or(std::cmp::Ordering::Equal)
    });
    order
}

#[derive(Debug, Clone, Copy)]
struct OldCard {
    base: CardTransform,
}

#[derive(Debug, Clone, Copy)]
struct NewCard {
    origin: Vec3,
    target: CardTransform,
}

#[derive(Debug)]
pub struct TransitionTimeline {
    old: Vec<OldCard>,
    new: Vec<NewCard>,
    old_visuals: Vec<CardVisual>,
    new_visuals: Vec<CardVisual>,
    elapsed: f32,
    active: bool,
}

fn ease_in_quad(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t
}

/// Overshoot-then-settle: rises past 1.0 and eases back.
fn ease_out_back(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let c1 = BACK_OVERSHOOT;
    let c3 = c1 + 1.0;
    1.0 + c3 * (t - 1.0).powi(3) + c1 * (t - 1.0).powi(2)
}

impl TransitionTimeline {
    /// `old_transforms` are the live card placements at the moment of
    /// activation; `selected` is the struck card's placement, which the new
    /// cards grow out of; the new set lands on the layout for scroll 0.
    pub fn start(old_transforms: &[CardTransform], new_count: usize, selected: CardTransform) -> Self {
        let old: Vec<OldCard> = old_transforms.iter().map(|&base| OldCard { base }).collect();
        let new: Vec<NewCard> = (0..new_count)
            .map(|index| NewCard {
                origin: selected.position,
                target: layout::card_transform(index, 0.0),
            })
            .collect();

        let mut timeline = Self {
            old_visuals: Vec::with_capacity(old.len()),
            new_visuals: Vec::with_capacity(new.len()),
            old,
            new,
            elapsed: 0.0,
            active: true,
        };
        timeline.recompute();
        timeline
    }

    fn phase_a_duration() -> f32 {
        BASE_DURATION * PHASE_A_FRACTION
    }

    fn phase_b_duration() -> f32 {
        BASE_DURATION * PHASE_B_FRACTION
    }

    fn phase_b_start() -> f32 {
        BASE_DURATION * PHASE_B_START_FRACTION
    }

    /// Full timeline length including every staggered card.
    pub fn total_duration(&self) -> f32 {
        let last_old = self.old.len().saturating_sub(1) as f32;
        let last_new = self.new.len().saturating_sub(1) as f32;
        let a_end = last_old * STAGGER + Self::phase_a_duration();
        let b_end = Self::phase_b_start() + last_new * STAGGER + Self::phase_b_duration();
        a_end.max(b_end).max(BASE_DURATION)
    }

    /// Advance by `dt`; returns true while the transition is still running.
    pub fn update(&mut self, dt: f32) -> bool {
        if !self.active {
            return false;
        }
        self.elapsed += dt.max(0.0);
        self.recompute();
        if self.elapsed >= self.total_duration() {
            self.active = false;
        }
        self.active
    }

    /// Halt every in-flight interpolation immediately. Visuals freeze where
    /// they are; the timeline never completes.
    pub fn cancel(&mut self) {
        self.active = false;
    }

    pub fn is_finished(&self) -> bool {
        !self.active && self.elapsed >= self.total_duration()
    }

    pub fn old_visuals(&self) -> &[CardVisual] {
        &self.old_visuals
    }

    pub fn new_visuals(&self) -> &[CardVisual] {
        &self.new_visuals
    }

    fn recompute(&mut self) {
        let elapsed = self.elapsed;

        self.old_visuals.clear();
        for (index, card) in self.old.iter().enumerate() {
            let local = (elapsed - index as f32 * STAGGER) / Self::phase_a_duration();
            let eased = ease_in_quad(local);
            self.old_visuals.push(CardVisual {
                position: card.base.position - Vec3::new(0.0, DROP_DISTANCE * eased, 0.0),
                scale: card.base.scale * (1.0 - eased),
                opacity: 1.0 - eased,
            });
        }

        self.new_visuals.clear();
        for (index, card) in self.new.iter().enumerate() {
            let start = Self::phase_b_start() + index as f32 * STAGGER;
            let local = (elapsed - start) / Self::phase_b_duration();
            let eased = ease_out_back(local);
            self.new_visuals.push(CardVisual {
                position: card.origin.lerp(card.target.position, eased),
                scale: (card.target.scale * eased).max(0.0),
                opacity: if local <= 0.0 { 0.0 } else { 1.0 },
            });
        }
    }
}
