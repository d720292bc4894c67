//! Swipe-to-close tracking for the image currently on screen.

use std::collections::VecDeque;

use crate::config::DismissConfig;

const HISTORY_SIZE: usize = 20;
/// Only samples this recent contribute to the release velocity.
const HORIZON_MS: f64 = 100.0;

/// Velocity of a 1-D drag from recent (time, offset) samples, in px/ms.
#[derive(Debug, Clone, Default)]
pub struct VelocityTracker {
    samples: VecDeque<(f64, f64)>,
}

impl VelocityTracker {
    pub fn add_sample(&mut self, at_ms: f64, offset: f64) {
        if !at_ms.is_finite() || !offset.is_finite() {
            return;
        }
        if self.samples.len() == HISTORY_SIZE {
            self.samples.pop_front();
        }
        self.samples.push_back((at_ms, offset));
    }

    pub fn velocity_at(&self, now_ms: f64) -> f64 {
        let recent: Vec<&(f64, f64)> = self
            .samples
            .iter()
            .filter(|(t, _)| now_ms - t <= HORIZON_MS)
            .collect();
        match (recent.first(), recent.last()) {
            (Some((t0, p0)), Some((t1, p1))) if t1 > t0 => (p1 - p0) / (t1 - t0),
            _ => 0.0,
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DismissDecision {
    Dismiss,
    /// The container scrolls back to 0 on its own.
    SnapBack,
}

#[derive(Debug, Clone)]
pub struct DismissController {
    config: DismissConfig,
    viewport_height: f64,
    enabled: bool,
    active: bool,
    locked: bool,
    offset: f64,
    tracker: VelocityTracker,
}

impl DismissController {
    pub fn new(config: DismissConfig, enabled: bool) -> Self {
        Self {
            config,
            viewport_height: 0.0,
            enabled,
            active: false,
            locked: false,
            offset: 0.0,
            tracker: VelocityTracker::default(),
        }
    }

    pub fn set_viewport_height(&mut self, height: f64) {
        if height.is_finite() && height >= 0.0 {
            self.viewport_height = height;
        }
    }

    /// Only the image on screen watches its scroll.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        if !active {
            self.settle();
        }
    }

    /// Locked while the image is zoomed.
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
        if locked {
            self.settle();
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.enabled && self.active && !self.locked
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Records a vertical offset and returns the resulting opacity.
    pub fn on_scroll(&mut self, offset: f64, at_ms: f64) -> f64 {
        if !self.is_tracking() {
            return self.opacity();
        }
        self.offset = if offset.is_finite() { offset } else { 0.0 };
        self.tracker.add_sample(at_ms, self.offset);
        self.opacity()
    }

    /// 1.0 at rest, falling linearly to `min_opacity` at the close offset.
    pub fn opacity(&self) -> f64 {
        let progress = (self.offset.abs() / self.config.close_offset).min(1.0);
        1.0 - progress * (1.0 - self.config.min_opacity)
    }

    pub fn should_dismiss(&self, offset: f64, velocity: f64) -> bool {
        let offset = offset.abs();
        let flick = velocity.abs() > self.config.close_velocity && offset > self.config.close_offset;
        let past_half = offset > self.viewport_height / 2.0;
        flick || past_half
    }

    pub fn on_release(&mut self, at_ms: f64) -> DismissDecision {
        if !self.is_tracking() {
            return DismissDecision::SnapBack;
        }
        let velocity = self.tracker.velocity_at(at_ms);
        let decision = if self.should_dismiss(self.offset, velocity) {
            DismissDecision::Dismiss
        } else {
            DismissDecision::SnapBack
        };
        log::debug!(
            "dismiss release: offset {:.1} velocity {:.2} -> {:?}",
            self.offset,
            velocity,
            decision
        );
        if decision == DismissDecision::SnapBack {
            self.settle();
        } else {
            self.tracker.clear();
        }
        decision
    }

    fn settle(&mut self) {
        self.offset = 0.0;
        self.tracker.clear();
    }
}
