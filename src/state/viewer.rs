//! Viewer orchestration: pager, per-item dismiss tracking, zoom lock and close.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::ViewerConfig;
use crate::model::{Dimensions, ImageSource};
use crate::state::dismiss::{DismissController, DismissDecision};
use crate::state::page::{PageController, PageEvent};
use crate::state::timer::TaskHandle;

/// Pages on each side of the current one that stay mounted.
const MOUNT_RADIUS: usize = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseReason {
    /// Close button or host request.
    Explicit,
    SwipeDismiss,
    /// Hardware back / Escape.
    Back,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewerEvent {
    IndexChanged(usize),
    /// Paging must be locked while `true`.
    ZoomChanged(bool),
    ScheduleReposition { task: TaskHandle, delay_ms: f64 },
    ScrollToIndex(usize),
    LongPress(ImageSource),
    Close(CloseReason),
}

#[derive(Debug, Clone)]
pub struct Viewer {
    config: ViewerConfig,
    images: Vec<ImageSource>,
    layout: Dimensions,
    page: PageController,
    dismiss: BTreeMap<usize, DismissController>,
    zoomed: bool,
    closed: bool,
}

impl Viewer {
    pub fn new(images: Vec<ImageSource>, config: ViewerConfig) -> Self {
        let page = PageController::new(config.image_index, images.len(), config.page.clone());
        Self {
            config,
            images,
            layout: Dimensions::default(),
            page,
            dismiss: BTreeMap::new(),
            zoomed: false,
            closed: false,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn images(&self) -> &[ImageSource] {
        &self.images
    }

    pub fn layout(&self) -> Dimensions {
        self.layout
    }

    pub fn current_index(&self) -> usize {
        self.page.current_index()
    }

    pub fn is_zoomed(&self) -> bool {
        self.zoomed
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn scroll_enabled(&self) -> bool {
        !self.zoomed && !self.closed && !self.page.is_settling()
    }

    pub fn bars_visible(&self) -> bool {
        !self.zoomed
    }

    pub fn overlay_opacity(&self) -> f64 {
        if self.closed { 0.0 } else { 1.0 }
    }

    pub fn dismiss_enabled(&self, index: usize) -> bool {
        !self.closed && self.dismiss.get(&index).is_some_and(DismissController::is_tracking)
    }

    pub fn item_opacity(&self, index: usize) -> f64 {
        self.dismiss.get(&index).map_or(1.0, DismissController::opacity)
    }

    pub fn item_offset(&self, index: usize) -> f64 {
        self.dismiss.get(&index).map_or(0.0, DismissController::offset)
    }

    /// Indices that should have a live item: the current page and its neighbours.
    pub fn mount_window(&self) -> BTreeSet<usize> {
        let current = self.current_index();
        let last = (current + MOUNT_RADIUS).min(self.images.len().saturating_sub(1));
        if self.images.is_empty() {
            return BTreeSet::new();
        }
        (current.saturating_sub(MOUNT_RADIUS)..=last).collect()
    }

    pub fn on_layout(&mut self, layout: Dimensions, now_ms: f64) -> Vec<ViewerEvent> {
        if !layout.width.is_finite() || !layout.height.is_finite() {
            return Vec::new();
        }
        self.layout = layout;
        for controller in self.dismiss.values_mut() {
            controller.set_viewport_height(layout.height);
        }
        let events = self.page.on_layout_width(layout.width, now_ms);
        self.map_page_events(events)
    }

    pub fn on_scroll_settle(&mut self, offset: f64) -> Vec<ViewerEvent> {
        if self.closed {
            return Vec::new();
        }
        let events = self.page.on_scroll_settle(offset);
        self.map_page_events(events)
    }

    pub fn run_page_task(&mut self, task: TaskHandle) -> Vec<ViewerEvent> {
        let events = self.page.run_task(task);
        self.map_page_events(events)
    }

    pub fn advance_to(&mut self, now_ms: f64) -> Vec<ViewerEvent> {
        let events = self.page.advance_to(now_ms);
        self.map_page_events(events)
    }

    /// Zoom report from an item. Only the page on screen is listened to.
    pub fn on_zoom(&mut self, index: usize, zoomed: bool) -> Vec<ViewerEvent> {
        if self.closed || index != self.current_index() || zoomed == self.zoomed {
            return Vec::new();
        }
        self.set_zoomed(zoomed)
    }

    pub fn mount_item(&mut self, index: usize) {
        let mut controller =
            DismissController::new(self.config.dismiss.clone(), self.config.swipe_to_close_enabled);
        controller.set_viewport_height(self.layout.height);
        controller.set_active(index == self.current_index());
        controller.set_locked(index == self.current_index() && self.zoomed);
        self.dismiss.insert(index, controller);
    }

    pub fn unmount_item(&mut self, index: usize) -> Vec<ViewerEvent> {
        self.dismiss.remove(&index);
        if index == self.current_index() && self.zoomed {
            self.set_zoomed(false)
        } else {
            Vec::new()
        }
    }

    /// Vertical drag offset of item `index`; returns its opacity.
    pub fn on_item_scroll(&mut self, index: usize, offset: f64, at_ms: f64) -> f64 {
        if self.closed {
            return self.item_opacity(index);
        }
        match self.dismiss.get_mut(&index) {
            Some(controller) => controller.on_scroll(offset, at_ms),
            None => 1.0,
        }
    }

    pub fn on_item_release(&mut self, index: usize, at_ms: f64) -> Vec<ViewerEvent> {
        if self.closed {
            return Vec::new();
        }
        let decision = self
            .dismiss
            .get_mut(&index)
            .map_or(DismissDecision::SnapBack, |c| c.on_release(at_ms));
        match decision {
            DismissDecision::Dismiss => self.request_close(CloseReason::SwipeDismiss),
            DismissDecision::SnapBack => Vec::new(),
        }
    }

    pub fn on_long_press(&self, index: usize) -> Vec<ViewerEvent> {
        if self.closed {
            return Vec::new();
        }
        self.images
            .get(index)
            .map(|source| vec![ViewerEvent::LongPress(source.clone())])
            .unwrap_or_default()
    }

    /// Every close path funnels through here; only the first one counts.
    pub fn request_close(&mut self, reason: CloseReason) -> Vec<ViewerEvent> {
        if self.closed {
            log::debug!("close ({reason:?}) ignored, already closing");
            return Vec::new();
        }
        self.closed = true;
        self.page.teardown();
        log::info!("viewer closing ({reason:?}) at index {}", self.current_index());
        vec![ViewerEvent::Close(reason)]
    }

    /// Cancels pending work before the host drops the viewer.
    pub fn teardown(&mut self) {
        self.page.teardown();
        self.dismiss.clear();
    }

    fn set_zoomed(&mut self, zoomed: bool) -> Vec<ViewerEvent> {
        self.zoomed = zoomed;
        let current = self.current_index();
        if let Some(controller) = self.dismiss.get_mut(&current) {
            controller.set_locked(zoomed);
        }
        vec![ViewerEvent::ZoomChanged(zoomed)]
    }

    fn map_page_events(&mut self, events: Vec<PageEvent>) -> Vec<ViewerEvent> {
        let mut out = Vec::new();
        for event in events {
            match event {
                PageEvent::IndexChanged(index) => {
                    if self.zoomed {
                        out.extend(self.set_zoomed(false));
                    }
                    for (i, controller) in self.dismiss.iter_mut() {
                        controller.set_locked(false);
                        controller.set_active(*i == index);
                    }
                    out.push(ViewerEvent::IndexChanged(index));
                }
                PageEvent::ScheduleReposition { task, delay_ms } => {
                    out.push(ViewerEvent::ScheduleReposition { task, delay_ms })
                }
                PageEvent::ScrollToIndex(index) => out.push(ViewerEvent::ScrollToIndex(index)),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn images(n: u32) -> Vec<ImageSource> {
        (0..n).map(ImageSource::Asset).collect()
    }

    fn open(index: usize) -> Viewer {
        let config = ViewerConfig {
            image_index: index,
            ..ViewerConfig::default()
        };
        let mut viewer = Viewer::new(images(5), config);
        viewer.on_layout(Dimensions::new(400.0, 800.0), 0.0);
        viewer.advance_to(100.0);
        for i in index.saturating_sub(1)..=(index + 1).min(4) {
            viewer.mount_item(i);
        }
        viewer
    }

    #[test]
    fn zoom_locks_paging_and_dismiss() {
        let mut viewer = open(1);
        assert!(viewer.dismiss_enabled(1));
        assert!(!viewer.dismiss_enabled(0));
        assert_eq!(viewer.on_zoom(1, true), vec![ViewerEvent::ZoomChanged(true)]);
        assert!(!viewer.scroll_enabled());
        assert!(!viewer.bars_visible());
        assert!(!viewer.dismiss_enabled(1));
        viewer.on_item_scroll(1, 500.0, 10.0);
        assert!(viewer.on_item_release(1, 20.0).is_empty());

        assert_eq!(viewer.on_zoom(1, false), vec![ViewerEvent::ZoomChanged(false)]);
        assert!(viewer.scroll_enabled());
        assert!(viewer.dismiss_enabled(1));
    }

    #[test]
    fn zoom_from_off_screen_item_is_ignored() {
        let mut viewer = open(1);
        assert!(viewer.on_zoom(2, true).is_empty());
        assert!(viewer.scroll_enabled());
        assert!(viewer.on_zoom(1, false).is_empty());
    }

    #[test]
    fn close_signals_collapse_into_one() {
        let mut viewer = open(0);
        let mut closes = Vec::new();
        closes.extend(viewer.request_close(CloseReason::Back));
        closes.extend(viewer.request_close(CloseReason::Explicit));
        viewer.on_item_scroll(0, 500.0, 10.0);
        closes.extend(viewer.on_item_release(0, 20.0));
        assert_eq!(closes, vec![ViewerEvent::Close(CloseReason::Back)]);
        assert!(viewer.is_closed());
        assert_eq!(viewer.overlay_opacity(), 0.0);
    }

    #[test]
    fn swipe_past_half_height_closes() {
        let mut viewer = open(0);
        viewer.on_item_scroll(0, 200.0, 0.0);
        let opacity = viewer.on_item_scroll(0, 450.0, 500.0);
        assert!((opacity - 0.7).abs() < 1e-9);
        assert_eq!(
            viewer.on_item_release(0, 700.0),
            vec![ViewerEvent::Close(CloseReason::SwipeDismiss)]
        );
        assert!(viewer.request_close(CloseReason::Explicit).is_empty());
    }

    #[test]
    fn index_changes_move_dismiss_tracking() {
        let mut viewer = open(1);
        assert_eq!(viewer.on_scroll_settle(800.0), vec![ViewerEvent::IndexChanged(2)]);
        assert_eq!(viewer.current_index(), 2);
        viewer.mount_item(3);
        assert!(viewer.dismiss_enabled(2));
        assert!(!viewer.dismiss_enabled(1));
        assert!(!viewer.dismiss_enabled(3));
    }

    #[test]
    fn unmounting_zoomed_item_unlocks_paging() {
        let mut viewer = open(1);
        viewer.on_zoom(1, true);
        assert_eq!(viewer.unmount_item(1), vec![ViewerEvent::ZoomChanged(false)]);
        assert!(viewer.scroll_enabled());
    }

    #[test]
    fn long_press_carries_the_source() {
        let viewer = open(2);
        assert_eq!(
            viewer.on_long_press(2),
            vec![ViewerEvent::LongPress(ImageSource::Asset(2))]
        );
        assert!(viewer.on_long_press(42).is_empty());
    }

    #[test]
    fn rotation_repositions_through_the_pager() {
        let mut viewer = open(2);
        viewer.on_scroll_settle(1_200.0);
        let events = viewer.on_layout(Dimensions::new(800.0, 400.0), 1_000.0);
        assert_eq!(events[0], ViewerEvent::IndexChanged(2));
        assert!(matches!(events[1], ViewerEvent::ScheduleReposition { .. }));
        assert!(!viewer.scroll_enabled());
        assert_eq!(viewer.advance_to(1_100.0), vec![ViewerEvent::ScrollToIndex(2)]);
        assert!(viewer.scroll_enabled());
    }

    #[test]
    fn mount_window_follows_current_page() {
        let viewer = open(0);
        assert_eq!(viewer.mount_window().into_iter().collect::<Vec<_>>(), vec![0, 1]);
        let mut viewer = open(2);
        assert_eq!(viewer.mount_window().into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
        viewer.on_scroll_settle(1_600.0);
        assert_eq!(viewer.mount_window().into_iter().collect::<Vec<_>>(), vec![3, 4]);
        assert!(Viewer::new(Vec::new(), ViewerConfig::default()).mount_window().is_empty());
    }

    #[test]
    fn teardown_drops_pending_reposition() {
        let mut viewer = Viewer::new(images(3), ViewerConfig::default());
        viewer.on_layout(Dimensions::new(400.0, 800.0), 0.0);
        viewer.mount_item(0);
        viewer.teardown();
        assert!(viewer.advance_to(500.0).is_empty());
        assert!(!viewer.dismiss_enabled(0));
    }

    #[test]
    fn swipe_to_close_can_be_disabled() {
        let config = ViewerConfig {
            swipe_to_close_enabled: false,
            ..ViewerConfig::default()
        };
        let mut viewer = Viewer::new(images(2), config);
        viewer.on_layout(Dimensions::new(400.0, 800.0), 0.0);
        viewer.mount_item(0);
        assert!(!viewer.dismiss_enabled(0));
        viewer.on_item_scroll(0, 600.0, 0.0);
        assert!(viewer.on_item_release(0, 10.0).is_empty());
    }
}
