//! Per-image gesture engine.
//!
//! `GestureSnapshot::reduce` is a pure transition `(state, input) -> (state', effects)`
//! dispatched on the touch phase. `GestureEngine` wraps a snapshot together with
//! the long-press timer it owns and turns effects into host-facing outputs.

use crate::config::GestureConfig;
use crate::geometry::{clamp_translate, fit_transform, touch_distance, touch_midpoint};
use crate::model::{Dimensions, Position, Touch, TouchFrame, TouchPhase, Transform};
use crate::state::timer::{DeferredTask, TaskHandle};

/// Everything a transition needs besides the snapshot itself.
#[derive(Clone, Debug, PartialEq)]
pub struct GestureContext {
    pub initial_scale: f64,
    pub initial_translate: Position,
    pub viewport: Dimensions,
    pub double_tap_to_zoom_enabled: bool,
    pub delay_long_press_ms: f64,
    pub config: GestureConfig,
}

impl GestureContext {
    /// Context for an image of `image` natural size shown in `viewport`.
    /// Unknown or degenerate sizes fall back to scale 1 at the origin.
    pub fn fit(
        image: Option<Dimensions>,
        viewport: Dimensions,
        config: GestureConfig,
        double_tap_to_zoom_enabled: bool,
        delay_long_press_ms: f64,
    ) -> Self {
        let (initial_translate, initial_scale) = match fit_transform(image, viewport) {
            Some((t, s)) if s > 0.0 => (t, s),
            _ => (Position::default(), 1.0),
        };
        Self {
            initial_scale,
            initial_translate,
            viewport,
            double_tap_to_zoom_enabled,
            delay_long_press_ms,
            config,
        }
    }

    pub fn min_scale(&self) -> f64 {
        self.initial_scale
    }

    pub fn max_scale(&self) -> f64 {
        self.initial_scale * self.config.max_scale_factor
    }

    pub fn double_tap_scale(&self) -> f64 {
        (self.initial_scale * self.config.double_tap_scale_factor).clamp(self.min_scale(), self.max_scale())
    }

    fn clamp(&self, translate: Position, scale: f64) -> Position {
        clamp_translate(
            translate,
            self.initial_translate,
            scale,
            self.viewport,
            self.config.pan_margin_px,
        )
    }

    /// Translate that keeps the image point under `anchor_from` at `anchor_to`
    /// while the scale moves from `from_scale` to `to_scale`.
    fn anchored_translate(
        &self,
        from_translate: Position,
        from_scale: f64,
        to_scale: f64,
        anchor_from: Position,
        anchor_to: Position,
    ) -> Position {
        let half_vp = Position::new(self.viewport.width / 2.0, self.viewport.height / 2.0);
        let center = half_vp + (from_translate - self.initial_translate);
        let k = if from_scale > 0.0 { to_scale / from_scale } else { 1.0 };
        let reach = anchor_from - center;
        let next_center = anchor_to - Position::new(reach.x * k, reach.y * k);
        self.clamp(self.initial_translate + (next_center - half_vp), to_scale)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    Touching,
    Panning,
    Pinching,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tap {
    pub at_ms: f64,
    pub position: Position,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct PinchBaseline {
    distance: f64,
    scale: f64,
    translate: Position,
    midpoint: Position,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GestureSnapshot {
    pub phase: GesturePhase,
    pub scale: f64,
    pub translate: Position,
    pub touch_count: usize,
    pub last_tap: Option<Tap>,
    pub long_press_armed: bool,
    pub zoomed: bool,
    start: Option<Position>,
    last: Option<Position>,
    moved: bool,
    max_touches: usize,
    long_press_fired: bool,
    pinch: Option<PinchBaseline>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GestureInput {
    Touch(TouchFrame),
    LongPressElapsed,
    /// Back to the resting fit transform (layout change or explicit reset).
    Reset,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureEffect {
    ArmLongPress { delay_ms: f64 },
    CancelLongPress,
    LongPress,
    ZoomChanged(bool),
}

impl GestureSnapshot {
    pub fn resting(ctx: &GestureContext) -> Self {
        Self {
            phase: GesturePhase::Idle,
            scale: ctx.initial_scale,
            translate: ctx.initial_translate,
            touch_count: 0,
            last_tap: None,
            long_press_armed: false,
            zoomed: false,
            start: None,
            last: None,
            moved: false,
            max_touches: 0,
            long_press_fired: false,
            pinch: None,
        }
    }

    pub fn transform(&self) -> Transform {
        Transform {
            scale: self.scale,
            translate: self.translate,
        }
    }

    pub fn reduce(&self, ctx: &GestureContext, input: GestureInput) -> (Self, Vec<GestureEffect>) {
        let mut new = self.clone();
        let mut effects = Vec::new();
        match input {
            GestureInput::Touch(frame) => match frame.phase {
                TouchPhase::Down => new.on_down(ctx, &frame, &mut effects),
                TouchPhase::Move if frame.touches.len() >= 2 => new.on_pinch_move(ctx, &frame, &mut effects),
                TouchPhase::Move => new.on_move(ctx, &frame, &mut effects),
                TouchPhase::Up | TouchPhase::Cancel => new.on_up(ctx, &frame, &mut effects),
            },
            GestureInput::LongPressElapsed => new.on_long_press_elapsed(&mut effects),
            GestureInput::Reset => {
                new.disarm_long_press(&mut effects);
                let zoomed = new.zoomed;
                new = Self::resting(ctx);
                // keep the flag so the crossing below is reported
                new.zoomed = zoomed;
            }
        }
        new.sync_zoom(ctx, &mut effects);
        (new, effects)
    }

    fn on_down(&mut self, ctx: &GestureContext, frame: &TouchFrame, effects: &mut Vec<GestureEffect>) {
        let count = frame.touches.len();
        if count == 0 {
            return;
        }
        if self.touch_count == 0 {
            self.start = frame.touches[0].position();
            self.last = self.start;
            self.moved = false;
            self.max_touches = 0;
            self.long_press_fired = false;
            self.phase = GesturePhase::Touching;
            if count == 1 {
                self.long_press_armed = true;
                effects.push(GestureEffect::ArmLongPress {
                    delay_ms: ctx.delay_long_press_ms,
                });
            }
        }
        if count >= 2 {
            self.disarm_long_press(effects);
            self.moved = true;
            self.begin_pinch(&frame.touches);
        }
        self.max_touches = self.max_touches.max(count);
        self.touch_count = count;
    }

    fn on_move(&mut self, ctx: &GestureContext, frame: &TouchFrame, effects: &mut Vec<GestureEffect>) {
        if frame.touches.is_empty() {
            return;
        }
        self.touch_count = frame.touches.len();
        if self.pinch.take().is_some() {
            self.last = frame.touches.first().and_then(Touch::position);
            return;
        }
        let Some(pos) = frame.touches.first().and_then(Touch::position) else {
            return;
        };
        let start = *self.start.get_or_insert(pos);
        let last = self.last.unwrap_or(pos);
        let travelled = pos.distance_to(start);
        if travelled > ctx.config.long_press_slop_px {
            self.disarm_long_press(effects);
        }
        if travelled > ctx.config.tap_slop_px {
            self.moved = true;
        }
        if self.zoomed {
            self.translate = ctx.clamp(self.translate + (pos - last), self.scale);
            self.phase = GesturePhase::Panning;
        }
        self.last = Some(pos);
    }

    fn on_pinch_move(&mut self, ctx: &GestureContext, frame: &TouchFrame, effects: &mut Vec<GestureEffect>) {
        self.touch_count = frame.touches.len();
        self.max_touches = self.max_touches.max(self.touch_count);
        let Some(base) = self.pinch else {
            // second finger arrived without its own down event
            self.disarm_long_press(effects);
            self.moved = true;
            self.begin_pinch(&frame.touches);
            return;
        };
        self.phase = GesturePhase::Pinching;
        let distance = touch_distance(&frame.touches);
        if base.distance < ctx.config.pinch_epsilon_px || distance <= 0.0 {
            return;
        }
        let scale = (base.scale * distance / base.distance).clamp(ctx.min_scale(), ctx.max_scale());
        let midpoint = touch_midpoint(&frame.touches).unwrap_or(base.midpoint);
        self.translate = ctx.anchored_translate(base.translate, base.scale, scale, base.midpoint, midpoint);
        self.scale = scale;
    }

    fn on_up(&mut self, ctx: &GestureContext, frame: &TouchFrame, effects: &mut Vec<GestureEffect>) {
        self.disarm_long_press(effects);
        let remaining = if frame.phase == TouchPhase::Cancel {
            0
        } else {
            frame.touches.len()
        };
        if remaining >= 2 {
            self.touch_count = remaining;
            self.begin_pinch(&frame.touches);
            return;
        }
        if remaining == 1 {
            self.touch_count = 1;
            self.pinch = None;
            self.last = frame.touches[0].position();
            self.phase = if self.zoomed {
                GesturePhase::Panning
            } else {
                GesturePhase::Touching
            };
            return;
        }

        let is_tap = frame.phase == TouchPhase::Up
            && !self.moved
            && self.max_touches == 1
            && !self.long_press_fired;
        if is_tap {
            let position = frame
                .changed
                .first()
                .and_then(Touch::position)
                .or(self.last)
                .or(self.start)
                .unwrap_or_default();
            self.on_tap(ctx, Tap {
                at_ms: frame.at_ms,
                position,
            });
        } else {
            self.last_tap = None;
        }

        if self.scale < ctx.min_scale() * ctx.config.zoom_enter_ratio {
            self.scale = ctx.min_scale();
            self.translate = ctx.initial_translate;
        }
        self.phase = GesturePhase::Idle;
        self.touch_count = 0;
        self.pinch = None;
        self.start = None;
        self.last = None;
        self.moved = false;
        self.max_touches = 0;
        self.long_press_fired = false;
    }

    fn on_tap(&mut self, ctx: &GestureContext, tap: Tap) {
        let is_double = ctx.double_tap_to_zoom_enabled
            && self.last_tap.is_some_and(|prev| {
                tap.at_ms - prev.at_ms <= ctx.config.double_tap_delay_ms
                    && tap.position.distance_to(prev.position) <= ctx.config.double_tap_slop_px
            });
        if !is_double {
            self.last_tap = Some(tap);
            return;
        }
        self.last_tap = None;
        if self.zoomed {
            log::debug!("double tap: zoom out to {:.3}", ctx.min_scale());
            self.scale = ctx.min_scale();
            self.translate = ctx.initial_translate;
        } else {
            let target = ctx.double_tap_scale();
            log::debug!("double tap: zoom in to {:.3}", target);
            self.translate =
                ctx.anchored_translate(self.translate, self.scale, target, tap.position, tap.position);
            self.scale = target;
        }
    }

    fn on_long_press_elapsed(&mut self, effects: &mut Vec<GestureEffect>) {
        if !self.long_press_armed || self.touch_count != 1 {
            self.long_press_armed = false;
            return;
        }
        self.long_press_armed = false;
        self.long_press_fired = true;
        log::debug!("long press fired");
        effects.push(GestureEffect::LongPress);
    }

    fn begin_pinch(&mut self, touches: &[Touch]) {
        self.pinch = Some(PinchBaseline {
            distance: touch_distance(touches),
            scale: self.scale,
            translate: self.translate,
            midpoint: touch_midpoint(touches).unwrap_or_default(),
        });
        self.phase = GesturePhase::Pinching;
    }

    fn disarm_long_press(&mut self, effects: &mut Vec<GestureEffect>) {
        if self.long_press_armed {
            self.long_press_armed = false;
            effects.push(GestureEffect::CancelLongPress);
        }
    }

    fn sync_zoom(&mut self, ctx: &GestureContext, effects: &mut Vec<GestureEffect>) {
        let ratio = self.scale / ctx.initial_scale;
        if !self.zoomed && ratio > ctx.config.zoom_enter_ratio {
            self.zoomed = true;
            log::debug!("zoom state: zoomed (scale {:.3})", self.scale);
            effects.push(GestureEffect::ZoomChanged(true));
        } else if self.zoomed && ratio <= ctx.config.zoom_exit_ratio {
            self.zoomed = false;
            log::debug!("zoom state: unzoomed");
            effects.push(GestureEffect::ZoomChanged(false));
        }
    }
}

/// What the host has to act on after feeding the engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EngineOutput {
    ZoomChanged(bool),
    LongPress,
    /// Arm a real timer and pass `task` back to [`GestureEngine::run_task`] when it fires.
    ScheduleLongPress { task: TaskHandle, delay_ms: f64 },
}

#[derive(Debug, Clone)]
pub struct GestureEngine {
    ctx: GestureContext,
    snapshot: GestureSnapshot,
    long_press: DeferredTask,
    clock_ms: f64,
}

impl GestureEngine {
    pub fn new(ctx: GestureContext) -> Self {
        let snapshot = GestureSnapshot::resting(&ctx);
        Self {
            ctx,
            snapshot,
            long_press: DeferredTask::new(),
            clock_ms: 0.0,
        }
    }

    pub fn context(&self) -> &GestureContext {
        &self.ctx
    }

    pub fn snapshot(&self) -> &GestureSnapshot {
        &self.snapshot
    }

    pub fn transform(&self) -> Transform {
        self.snapshot.transform()
    }

    pub fn is_zoomed(&self) -> bool {
        self.snapshot.zoomed
    }

    /// Replaces the fit context (new viewport or newly discovered image size)
    /// and returns to the resting transform.
    pub fn set_layout(&mut self, ctx: GestureContext) -> Vec<EngineOutput> {
        if ctx == self.ctx {
            return Vec::new();
        }
        self.ctx = ctx;
        self.reset()
    }

    pub fn reset(&mut self) -> Vec<EngineOutput> {
        self.apply(GestureInput::Reset)
    }

    pub fn handle(&mut self, frame: TouchFrame) -> Vec<EngineOutput> {
        if frame.at_ms.is_finite() {
            self.clock_ms = frame.at_ms;
        }
        self.apply(GestureInput::Touch(frame))
    }

    pub fn run_task(&mut self, task: TaskHandle) -> Vec<EngineOutput> {
        if self.long_press.fire(task) {
            self.apply(GestureInput::LongPressElapsed)
        } else {
            Vec::new()
        }
    }

    pub fn advance_to(&mut self, now_ms: f64) -> Vec<EngineOutput> {
        self.clock_ms = self.clock_ms.max(now_ms);
        if self.long_press.fire_due(now_ms) {
            self.apply(GestureInput::LongPressElapsed)
        } else {
            Vec::new()
        }
    }

    /// Cancels owned timers and drops gesture progress. Nothing fires afterwards.
    pub fn teardown(&mut self) {
        self.long_press.cancel();
        self.snapshot = GestureSnapshot::resting(&self.ctx);
    }

    fn apply(&mut self, input: GestureInput) -> Vec<EngineOutput> {
        let (next, effects) = self.snapshot.reduce(&self.ctx, input);
        self.snapshot = next;
        let mut out = Vec::new();
        for effect in effects {
            match effect {
                GestureEffect::ArmLongPress { delay_ms } => {
                    let task = self.long_press.schedule(self.clock_ms, delay_ms);
                    out.push(EngineOutput::ScheduleLongPress { task, delay_ms });
                }
                GestureEffect::CancelLongPress => self.long_press.cancel(),
                GestureEffect::LongPress => out.push(EngineOutput::LongPress),
                GestureEffect::ZoomChanged(z) => out.push(EngineOutput::ZoomChanged(z)),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    // 400x300 image in a 400x800 viewport: fit scale 1, translate (0, 250)
    fn ctx() -> GestureContext {
        GestureContext::fit(
            Some(Dimensions::new(400.0, 300.0)),
            Dimensions::new(400.0, 800.0),
            GestureConfig::default(),
            true,
            800.0,
        )
    }

    fn down(points: &[(f64, f64)], at: f64) -> TouchFrame {
        let touches: Vec<Touch> = points.iter().map(|&(x, y)| Touch::at(x, y)).collect();
        TouchFrame::new(TouchPhase::Down, touches.clone(), touches, at)
    }

    fn moved(points: &[(f64, f64)], at: f64) -> TouchFrame {
        let touches: Vec<Touch> = points.iter().map(|&(x, y)| Touch::at(x, y)).collect();
        TouchFrame::new(TouchPhase::Move, touches.clone(), touches, at)
    }

    fn up(remaining: &[(f64, f64)], lifted: (f64, f64), at: f64) -> TouchFrame {
        let touches = remaining.iter().map(|&(x, y)| Touch::at(x, y)).collect();
        TouchFrame::new(TouchPhase::Up, touches, vec![Touch::at(lifted.0, lifted.1)], at)
    }

    fn tap(engine: &mut GestureEngine, x: f64, y: f64, at: f64) -> Vec<EngineOutput> {
        let mut out = engine.handle(down(&[(x, y)], at));
        out.extend(engine.handle(up(&[], (x, y), at + 40.0)));
        out
    }

    fn zoom_events(out: &[EngineOutput]) -> Vec<bool> {
        out.iter()
            .filter_map(|o| match o {
                EngineOutput::ZoomChanged(z) => Some(*z),
                _ => None,
            })
            .collect()
    }

    /// Two fingers placed horizontally around the viewport centre, `d` apart.
    fn pinch_points(d: f64) -> [(f64, f64); 2] {
        [(200.0 - d / 2.0, 400.0), (200.0 + d / 2.0, 400.0)]
    }

    #[test]
    fn starts_at_fit_transform() {
        let engine = GestureEngine::new(ctx());
        assert!(approx_eq(engine.transform().scale, 1.0));
        assert_eq!(engine.transform().translate, Position::new(0.0, 250.0));
        assert!(!engine.is_zoomed());
    }

    #[test]
    fn pinch_scales_by_distance_ratio() {
        let mut engine = GestureEngine::new(ctx());
        engine.handle(down(&pinch_points(100.0), 0.0));
        engine.handle(moved(&pinch_points(100.0), 10.0));
        assert!(approx_eq(engine.transform().scale, 1.0));
        let out = engine.handle(moved(&pinch_points(150.0), 20.0));
        assert!(approx_eq(engine.transform().scale, 1.5));
        assert_eq!(zoom_events(&out), vec![true]);
        // symmetric pinch around the centre keeps the image centred
        assert!(approx_eq(engine.transform().translate.x, 0.0));
        assert!(approx_eq(engine.transform().translate.y, 250.0));
    }

    #[test]
    fn pinch_is_clamped_to_scale_bounds() {
        let mut engine = GestureEngine::new(ctx());
        engine.handle(down(&pinch_points(100.0), 0.0));
        engine.handle(moved(&pinch_points(1_000.0), 10.0));
        assert!(approx_eq(engine.transform().scale, 3.0));
        engine.handle(moved(&pinch_points(10.0), 20.0));
        assert!(approx_eq(engine.transform().scale, 1.0));
    }

    #[test]
    fn overlapping_fingers_do_not_change_scale() {
        let mut engine = GestureEngine::new(ctx());
        engine.handle(down(&[(200.0, 400.0), (200.0, 400.0)], 0.0));
        engine.handle(moved(&pinch_points(200.0), 10.0));
        assert!(approx_eq(engine.transform().scale, 1.0));
        assert!(!engine.is_zoomed());
    }

    #[test]
    fn pinch_keeps_midpoint_anchored() {
        let mut engine = GestureEngine::new(ctx());
        // fingers around (300, 400), 100px right of the viewport centre
        engine.handle(down(&[(250.0, 400.0), (350.0, 400.0)], 0.0));
        engine.handle(moved(&[(200.0, 400.0), (400.0, 400.0)], 10.0));
        let t = engine.transform();
        assert!(approx_eq(t.scale, 2.0));
        // the image centre moves away from the anchor: 200 - (300 - 200) = 100
        let center_x = 200.0 + (t.translate.x - 0.0);
        assert!(approx_eq(center_x, 100.0));
    }

    #[test]
    fn dropping_to_one_finger_ends_pinch() {
        let mut engine = GestureEngine::new(ctx());
        engine.handle(down(&pinch_points(100.0), 0.0));
        engine.handle(moved(&pinch_points(200.0), 10.0));
        engine.handle(up(&[(100.0, 400.0)], (300.0, 400.0), 20.0));
        assert_eq!(engine.snapshot().phase, GesturePhase::Panning);
        assert_eq!(engine.snapshot().touch_count, 1);
        engine.handle(up(&[], (100.0, 400.0), 30.0));
        assert_eq!(engine.snapshot().phase, GesturePhase::Idle);
        assert!(approx_eq(engine.transform().scale, 2.0));
    }

    #[test]
    fn single_drag_moves_image_only_when_zoomed() {
        let mut engine = GestureEngine::new(ctx());
        engine.handle(down(&[(200.0, 400.0)], 0.0));
        engine.handle(moved(&[(260.0, 300.0)], 10.0));
        assert_eq!(engine.transform().translate, Position::new(0.0, 250.0));
        engine.handle(up(&[], (260.0, 300.0), 20.0));

        tap(&mut engine, 200.0, 400.0, 100.0);
        tap(&mut engine, 200.0, 400.0, 250.0);
        assert!(engine.is_zoomed());
        engine.handle(down(&[(200.0, 400.0)], 1_000.0));
        engine.handle(moved(&[(260.0, 380.0)], 1_010.0));
        let t = engine.transform().translate;
        assert!(approx_eq(t.x, 60.0));
        // 2x of a 300px-high image is 600px: still fits vertically, no vertical pan
        assert!(approx_eq(t.y, 250.0));
        engine.handle(moved(&[(900.0, 380.0)], 1_020.0));
        assert!(approx_eq(engine.transform().translate.x, 200.0));
    }

    #[test]
    fn malformed_move_is_zero_delta() {
        let mut engine = GestureEngine::new(ctx());
        tap(&mut engine, 200.0, 400.0, 0.0);
        tap(&mut engine, 200.0, 400.0, 100.0);
        engine.handle(down(&[(200.0, 400.0)], 1_000.0));
        let before = engine.transform();
        let frame = TouchFrame::new(TouchPhase::Move, vec![Touch::default()], vec![], 1_010.0);
        engine.handle(frame);
        assert_eq!(engine.transform(), before);
        let empty = TouchFrame::new(TouchPhase::Move, vec![], vec![], 1_020.0);
        engine.handle(empty);
        assert_eq!(engine.transform(), before);
    }

    #[test]
    fn double_tap_toggles_and_third_tap_starts_fresh() {
        let mut engine = GestureEngine::new(ctx());
        let first = tap(&mut engine, 200.0, 400.0, 0.0);
        assert!(zoom_events(&first).is_empty());
        let second = tap(&mut engine, 205.0, 402.0, 200.0);
        assert_eq!(zoom_events(&second), vec![true]);
        assert!(approx_eq(engine.transform().scale, 2.0));

        // outside the window: a fresh single tap
        let third = tap(&mut engine, 200.0, 400.0, 1_000.0);
        assert!(zoom_events(&third).is_empty());
        assert!(approx_eq(engine.transform().scale, 2.0));

        let fourth = tap(&mut engine, 200.0, 400.0, 1_200.0);
        assert_eq!(zoom_events(&fourth), vec![false]);
        assert!(approx_eq(engine.transform().scale, 1.0));
        assert_eq!(engine.transform().translate, Position::new(0.0, 250.0));
    }

    #[test]
    fn taps_far_apart_are_not_a_double_tap() {
        let mut engine = GestureEngine::new(ctx());
        tap(&mut engine, 50.0, 100.0, 0.0);
        tap(&mut engine, 300.0, 600.0, 100.0);
        assert!(!engine.is_zoomed());
    }

    #[test]
    fn double_tap_disabled_is_plain_taps() {
        let mut c = ctx();
        c.double_tap_to_zoom_enabled = false;
        let mut engine = GestureEngine::new(c);
        tap(&mut engine, 200.0, 400.0, 0.0);
        let out = tap(&mut engine, 200.0, 400.0, 100.0);
        assert!(zoom_events(&out).is_empty());
        assert!(approx_eq(engine.transform().scale, 1.0));
    }

    #[test]
    fn long_press_fires_once_when_held_still() {
        let mut engine = GestureEngine::new(ctx());
        let out = engine.handle(down(&[(200.0, 400.0)], 0.0));
        assert!(matches!(out[..], [EngineOutput::ScheduleLongPress { delay_ms, .. }] if delay_ms == 800.0));
        engine.handle(moved(&[(203.0, 402.0)], 300.0));
        assert!(engine.advance_to(799.0).is_empty());
        assert_eq!(engine.advance_to(800.0), vec![EngineOutput::LongPress]);
        assert!(engine.advance_to(2_000.0).is_empty());
        // releasing after a long press is not a tap
        engine.handle(up(&[], (203.0, 402.0), 2_100.0));
        assert_eq!(engine.snapshot().last_tap, None);
    }

    #[test]
    fn long_press_via_task_handle() {
        let mut engine = GestureEngine::new(ctx());
        let out = engine.handle(down(&[(200.0, 400.0)], 0.0));
        let EngineOutput::ScheduleLongPress { task, .. } = out[0] else {
            panic!("expected a long-press schedule");
        };
        assert_eq!(engine.run_task(task), vec![EngineOutput::LongPress]);
        assert!(engine.run_task(task).is_empty());
    }

    #[test]
    fn early_release_cancels_long_press() {
        let mut engine = GestureEngine::new(ctx());
        let out = engine.handle(down(&[(200.0, 400.0)], 0.0));
        let EngineOutput::ScheduleLongPress { task, .. } = out[0] else {
            panic!("expected a long-press schedule");
        };
        engine.handle(up(&[], (200.0, 400.0), 799.0));
        assert!(engine.advance_to(800.0).is_empty());
        assert!(engine.run_task(task).is_empty());
    }

    #[test]
    fn movement_or_second_finger_cancels_long_press() {
        let mut engine = GestureEngine::new(ctx());
        engine.handle(down(&[(200.0, 400.0)], 0.0));
        engine.handle(moved(&[(230.0, 400.0)], 100.0));
        assert!(engine.advance_to(900.0).is_empty());
        engine.handle(up(&[], (230.0, 400.0), 950.0));

        engine.handle(down(&[(200.0, 400.0)], 1_000.0));
        engine.handle(down(&[(200.0, 400.0), (260.0, 400.0)], 1_100.0));
        assert!(!engine.snapshot().long_press_armed);
        assert!(engine.advance_to(2_000.0).is_empty());
    }

    #[test]
    fn zoom_crossings_are_reported_once() {
        let mut engine = GestureEngine::new(ctx());
        engine.handle(down(&pinch_points(100.0), 0.0));
        let mut events = Vec::new();
        for (i, d) in [105.0, 120.0, 150.0, 180.0, 150.0, 102.0, 100.0].iter().enumerate() {
            events.extend(zoom_events(&engine.handle(moved(&pinch_points(*d), i as f64))));
        }
        assert_eq!(events, vec![true, false]);
    }

    #[test]
    fn hysteresis_band_does_not_flicker() {
        let mut engine = GestureEngine::new(ctx());
        engine.handle(down(&pinch_points(100.0), 0.0));
        let mut events = Vec::new();
        // 1.02 enters, 1.005 stays inside the band, 1.02 again is no new crossing
        for d in [102.0, 100.5, 102.0, 100.5] {
            events.extend(zoom_events(&engine.handle(moved(&pinch_points(d), 1.0))));
        }
        assert_eq!(events, vec![true]);
    }

    #[test]
    fn release_near_fit_snaps_back() {
        let mut engine = GestureEngine::new(ctx());
        engine.handle(down(&pinch_points(100.0), 0.0));
        engine.handle(moved(&pinch_points(100.8), 10.0));
        engine.handle(up(&[(150.0, 400.0)], (250.0, 400.0), 20.0));
        engine.handle(up(&[], (150.0, 400.0), 30.0));
        assert!(approx_eq(engine.transform().scale, 1.0));
        assert_eq!(engine.transform().translate, Position::new(0.0, 250.0));
    }

    #[test]
    fn layout_change_resets_and_reports_zoom_out() {
        let mut engine = GestureEngine::new(ctx());
        tap(&mut engine, 200.0, 400.0, 0.0);
        tap(&mut engine, 200.0, 400.0, 100.0);
        assert!(engine.is_zoomed());
        let rotated = GestureContext::fit(
            Some(Dimensions::new(400.0, 300.0)),
            Dimensions::new(800.0, 400.0),
            GestureConfig::default(),
            true,
            800.0,
        );
        let out = engine.set_layout(rotated);
        assert_eq!(zoom_events(&out), vec![false]);
        assert!(approx_eq(engine.transform().scale, 4.0 / 3.0));
    }

    #[test]
    fn teardown_cancels_pending_long_press() {
        let mut engine = GestureEngine::new(ctx());
        let out = engine.handle(down(&[(200.0, 400.0)], 0.0));
        let EngineOutput::ScheduleLongPress { task, .. } = out[0] else {
            panic!("expected a long-press schedule");
        };
        engine.teardown();
        assert!(engine.run_task(task).is_empty());
        assert!(engine.advance_to(10_000.0).is_empty());
    }

    #[test]
    fn unknown_image_uses_neutral_context() {
        let c = GestureContext::fit(None, Dimensions::new(400.0, 800.0), GestureConfig::default(), true, 800.0);
        assert!(approx_eq(c.initial_scale, 1.0));
        assert_eq!(c.initial_translate, Position::default());
    }
}
