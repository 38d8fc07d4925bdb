use glam::Vec2;
use std::collections::VecDeque;

/// Minimum interval between accepted wheel ticks, so high-frequency wheels
/// do not overshoot the one-card step.
pub const WHEEL_DEBOUNCE: f64 = 0.12;
/// Wheel deltas below this are treated as jitter.
pub const WHEEL_MIN_DELTA: f32 = 0.5;
/// Modifier-wheel zoom rate (exponential, per delta pixel).
pub const WHEEL_ZOOM_RATE: f32 = 0.002;
/// Euclidean pixel distance past which a pointer gesture becomes a drag.
pub const DRAG_THRESHOLD_PX: f32 = 6.0;
/// A press shorter than this (and under the drag threshold) is a tap.
pub const TAP_MAX_DURATION: f64 = 0.3;
/// Wall-clock span of drag samples kept for the release velocity.
pub const VELOCITY_WINDOW: f64 = 0.1;

/// Abstract commands emitted toward the navigation controller and zoom state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Advance(i32),
    DragTo(f32),
    ReleaseDrag { velocity: f32 },
    CenterOn(usize),
    Activate(usize),
    ZoomBy(f32),
    NudgeZoom(i32),
    ResetZoom,
}

/// One frame's worth of raw input, gathered by the view layer. Keeping this
/// plain data (no UI types) lets the classification rules run under test.
#[derive(Debug, Clone, Copy)]
pub struct InputFrame {
    /// Wall-clock seconds.
    pub time: f64,
    /// Raw wheel delta in pixels (x right, y up).
    pub wheel_delta: Vec2,
    /// Zoom modifier (cmd/ctrl) held.
    pub zoom_modifier: bool,
    /// Per-frame pinch ratio; 1.0 means no pinch. The product over a gesture
    /// equals the finger-distance ratio relative to gesture start.
    pub pinch_factor: f32,
    pub pointer_pos: Option<Vec2>,
    /// Primary pointer went down this frame.
    pub pointer_pressed: bool,
    /// Primary pointer is currently down.
    pub pointer_down: bool,
    /// Primary pointer went up this frame.
    pub pointer_released: bool,
    pub zoom_in_key: bool,
    pub zoom_out_key: bool,
    pub zoom_reset_key: bool,
    /// Scroll position at frame start, for anchoring drags.
    pub current_scroll: f32,
    /// Screen-space unit direction of one +1 index step.
    pub row_axis: Vec2,
    /// Pixel length of one index step at the current zoom.
    pub px_per_step: f32,
}

impl InputFrame {
    /// A frame with nothing happening, for building test scenarios.
    pub fn idle(time: f64) -> Self {
        Self {
            time,
            wheel_delta: Vec2::ZERO,
            zoom_modifier: false,
            pinch_factor: 1.0,
            pointer_pos: None,
            pointer_pressed: false,
            pointer_down: false,
            pointer_released: false,
            zoom_in_key: false,
            zoom_out_key: false,
            zoom_reset_key: false,
            current_scroll: 0.0,
            row_axis: Vec2::new(1.0, 0.0),
            px_per_step: 100.0,
        }
    }
}

#[derive(Debug)]
struct Gesture {
    start_pos: Vec2,
    start_time: f64,
    start_scroll: f32,
    dragging: bool,
    /// (time, scroll position) samples while dragging.
    samples: VecDeque<(f64, f32)>,
}

/// Converts heterogeneous raw events into navigation/zoom commands.
/// Owns only gesture bookkeeping; never touches view state directly.
#[derive(Debug, Default)]
pub struct InputNormalizer {
    last_wheel_accept: Option<f64>,
    gesture: Option<Gesture>,
}

impl InputNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(
        &mut self,
        frame: &InputFrame,
        pick: impl Fn(Vec2) -> Option<usize>,
    ) -> Vec<Command> {
        let mut commands = Vec::new();

        if frame.zoom_in_key {
            commands.push(Command::NudgeZoom(1));
        }
        if frame.zoom_out_key {
            commands.push(Command::NudgeZoom(-1));
        }
        if frame.zoom_reset_key {
            commands.push(Command::ResetZoom);
        }

        if (frame.pinch_factor - 1.0).abs() > 1e-4 {
            commands.push(Command::ZoomBy(frame.pinch_factor));
        }

        self.process_wheel(frame, &mut commands);
        self.process_pointer(frame, &pick, &mut commands);

        commands
    }

    fn process_wheel(&mut self, frame: &InputFrame, commands: &mut Vec<Command>) {
        let delta = frame.wheel_delta;
        if delta.x.abs() < WHEEL_MIN_DELTA && delta.y.abs() < WHEEL_MIN_DELTA {
            return;
        }

        if frame.zoom_modifier {
            // Continuous zoom; no debouncing, every delta counts.
            commands.push(Command::ZoomBy((delta.y * WHEEL_ZOOM_RATE).exp()));
            return;
        }

        if let Some(last) = self.last_wheel_accept {
            if frame.time - last < WHEEL_DEBOUNCE {
                return;
            }
        }
        self.last_wheel_accept = Some(frame.time);

        // Pick the axis with the larger magnitude and emit a signed unit step.
        let dominant = if delta.x.abs() > delta.y.abs() {
            delta.x
        } else {
            delta.y
        };
        let direction = if dominant < 0.0 { 1 } else { -1 };
        commands.push(Command::Advance(direction));
    }

    fn process_pointer(
        &mut self,
        frame: &InputFrame,
        pick: &impl Fn(Vec2) -> Option<usize>,
        commands: &mut Vec<Command>,
    ) {
        if frame.pointer_pressed {
            if let Some(pos) = frame.pointer_pos {
                let mut samples = VecDeque::new();
                samples.push_back((frame.time, frame.current_scroll));
                self.gesture = Some(Gesture {
                    start_pos: pos,
                    start_time: frame.time,
                    start_scroll: frame.current_scroll,
                    dragging: false,
                    samples,
                });
            }
        }

        if frame.pointer_down && !frame.pointer_released {
            if let (Some(gesture), Some(pos)) = (self.gesture.as_mut(), frame.pointer_pos) {
                let travel = pos - gesture.start_pos;
                if !gesture.dragging && travel.length() > DRAG_THRESHOLD_PX {
                    gesture.dragging = true;
                }
                if gesture.dragging {
                    // Dragging along the row axis pulls earlier cards toward
                    // the center, so screen travel maps to negative steps.
                    let steps = -travel.dot(frame.row_axis) / frame.px_per_step.max(1.0);
                    let target = gesture.start_scroll + steps;
                    gesture.samples.push_back((frame.time, target));
                    while let Some(&(t, _)) = gesture.samples.front() {
                        if frame.time - t > VELOCITY_WINDOW && gesture.samples.len() > 2 {
                            gesture.samples.pop_front();
                        } else {
                            break;
                        }
                    }
                    commands.push(Command::DragTo(target));
                }
            }
        }

        if frame.pointer_released {
            if let Some(gesture) = self.gesture.take() {
                if gesture.dragging {
                    commands.push(Command::ReleaseDrag {
                        velocity: Self::sampled_velocity(&gesture.samples),
                    });
                } else if frame.time - gesture.start_time <= TAP_MAX_DURATION {
                    let pos = frame.pointer_pos.unwrap_or(gesture.start_pos);
                    if let Some(index) = pick(pos) {
                        commands.push(Command::CenterOn(index));
                        commands.push(Command::Activate(index));
                    }
                }
            }
        }
    }

    /// Discrete derivative of scroll position over wall-clock time across the
    /// retained sample window, in cards per second.
    fn sampled_velocity(samples: &VecDeque<(f64, f32)>) -> f32 {
        let (Some(&(t0, p0)), Some(&(t1, p1))) = (samples.front(), samples.back()) else {
            return 0.0;
        };
        let dt = t1 - t0;
        if dt <= 1e-6 {
            return 0.0;
        }
        ((p1 - p0) as f64 / dt) as f32
    }
}
