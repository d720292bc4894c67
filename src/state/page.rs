//! Current-page tracking for the horizontal pager.

use crate::config::{PageAnchor, PageConfig};
use crate::state::timer::{DeferredTask, TaskHandle};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PageEvent {
    IndexChanged(usize),
    /// Arm a real timer for `delay_ms` and hand `task` back to [`PageController::run_task`].
    ScheduleReposition { task: TaskHandle, delay_ms: f64 },
    /// Jump the list (without animation) so `index` is on screen.
    ScrollToIndex(usize),
}

#[derive(Debug, Clone)]
pub struct PageController {
    requested_index: usize,
    current_index: usize,
    item_count: usize,
    viewport_width: f64,
    config: PageConfig,
    settle: DeferredTask,
    reposition_target: Option<usize>,
}

impl PageController {
    pub fn new(requested_index: usize, item_count: usize, config: PageConfig) -> Self {
        let requested_index = requested_index.min(item_count.saturating_sub(1));
        Self {
            requested_index,
            current_index: requested_index,
            item_count,
            viewport_width: 0.0,
            config,
            settle: DeferredTask::new(),
            reposition_target: None,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn is_settling(&self) -> bool {
        self.settle.is_pending()
    }

    /// Viewport width pushed by the host. A real change (rotation, window
    /// resize) schedules a reposition once layout had time to settle.
    pub fn on_layout_width(&mut self, width: f64, now_ms: f64) -> Vec<PageEvent> {
        if !width.is_finite() || width <= 0.0 || width == self.viewport_width {
            return Vec::new();
        }
        let target = match self.config.anchor {
            PageAnchor::RequestedIndex => self.requested_index,
            PageAnchor::LastVisited => self.reposition_target.unwrap_or(self.current_index),
        };
        self.viewport_width = width;
        let mut events = Vec::new();
        if target != self.current_index {
            self.current_index = target;
            events.push(PageEvent::IndexChanged(target));
        }
        let task = self.settle.schedule(now_ms, self.config.settle_delay_ms);
        self.reposition_target = Some(target);
        log::debug!("viewport width {width}: reposition to {target} scheduled");
        events.push(PageEvent::ScheduleReposition {
            task,
            delay_ms: self.config.settle_delay_ms,
        });
        events
    }

    /// Scroll came to rest at `offset`. Ignored while a reposition is pending,
    /// since offsets reported mid-resize are meaningless.
    pub fn on_scroll_settle(&mut self, offset: f64) -> Vec<PageEvent> {
        if self.settle.is_pending() || self.viewport_width <= 0.0 || !offset.is_finite() {
            return Vec::new();
        }
        let raw = (offset / self.viewport_width).round().max(0.0) as usize;
        let next = raw.min(self.item_count.saturating_sub(1));
        if next == self.current_index {
            return Vec::new();
        }
        self.current_index = next;
        vec![PageEvent::IndexChanged(next)]
    }

    pub fn run_task(&mut self, task: TaskHandle) -> Vec<PageEvent> {
        if self.settle.fire(task) {
            self.reposition()
        } else {
            Vec::new()
        }
    }

    pub fn advance_to(&mut self, now_ms: f64) -> Vec<PageEvent> {
        if self.settle.fire_due(now_ms) {
            self.reposition()
        } else {
            Vec::new()
        }
    }

    pub fn teardown(&mut self) {
        self.settle.cancel();
        self.reposition_target = None;
    }

    fn reposition(&mut self) -> Vec<PageEvent> {
        let Some(target) = self.reposition_target.take() else {
            return Vec::new();
        };
        log::debug!("reposition to {target}");
        let mut events = Vec::new();
        if target != self.current_index {
            self.current_index = target;
            events.push(PageEvent::IndexChanged(target));
        }
        events.push(PageEvent::ScrollToIndex(target));
        events
    }
}
