use std::cell::RefCell;
use std::collections::{BTreeSet, VecDeque};
use std::rc::Rc;

use gloo::events::EventListener;
use gloo::timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, KeyboardEvent};
use yew::prelude::*;

use super::image_header::ImageHeader;
use super::image_item::ImageItem;
use crate::config::ViewerConfig;
use crate::dimensions;
use crate::model::{Dimensions, ImageSource};
use crate::state::{CloseReason, Viewer, ViewerEvent};
use crate::util::now_ms;

const SCROLL_SETTLE_MS: u32 = 120;
const CLOSE_FADE_MS: u32 = 200;

#[derive(Properties, PartialEq, Clone)]
pub struct ImageViewingProps {
    pub images: Vec<ImageSource>,
    pub visible: bool,
    #[prop_or_default]
    pub config: ViewerConfig,
    pub on_request_close: Callback<()>,
    #[prop_or_default]
    pub on_long_press: Callback<ImageSource>,
    #[prop_or_default]
    pub on_image_index_change: Callback<usize>,
    #[prop_or_default]
    pub key_extractor: Option<Callback<(ImageSource, usize), String>>,
    /// Replaces the default header; receives the current index.
    #[prop_or_default]
    pub header: Option<Callback<usize, Html>>,
    #[prop_or_default]
    pub footer: Option<Callback<usize, Html>>,
}

#[derive(Clone)]
struct ViewerHandles {
    viewer: Rc<RefCell<Viewer>>,
    mounted: Rc<RefCell<BTreeSet<usize>>>,
    pager: NodeRef,
    reposition: Rc<RefCell<Option<Timeout>>>,
    scroll_settle: Rc<RefCell<Option<Timeout>>>,
    close: Rc<RefCell<Option<Timeout>>>,
    props: Rc<RefCell<ImageViewingProps>>,
    force: UseForceUpdateHandle,
}

impl ViewerHandles {
    fn dispatch(&self, events: Vec<ViewerEvent>) {
        if events.is_empty() {
            return;
        }
        let props = self.props.borrow().clone();
        let mut queue: VecDeque<ViewerEvent> = events.into();
        while let Some(event) = queue.pop_front() {
            match event {
                ViewerEvent::IndexChanged(index) => {
                    log::debug!("image index -> {index}");
                    queue.extend(self.sync_window());
                    props.on_image_index_change.emit(index);
                }
                ViewerEvent::ZoomChanged(zoomed) => log::debug!("zoomed: {zoomed}"),
                ViewerEvent::ScheduleReposition { task, delay_ms } => {
                    let handles = self.clone();
                    *self.reposition.borrow_mut() = Some(Timeout::new(delay_ms.max(0.0) as u32, move || {
                        let events = handles.viewer.borrow_mut().run_page_task(task);
                        handles.dispatch(events);
                    }));
                }
                ViewerEvent::ScrollToIndex(index) => self.scroll_to(index),
                ViewerEvent::LongPress(source) => props.on_long_press.emit(source),
                ViewerEvent::Close(_) => {
                    let handles = self.clone();
                    *self.close.borrow_mut() = Some(Timeout::new(CLOSE_FADE_MS, move || {
                        let on_close = handles.props.borrow().on_request_close.clone();
                        on_close.emit(());
                    }));
                }
            }
        }
        self.force.force_update();
    }

    /// Mounts the pages around the current one and releases the rest.
    fn sync_window(&self) -> Vec<ViewerEvent> {
        let mut viewer = self.viewer.borrow_mut();
        let wanted = viewer.mount_window();
        let mut mounted = self.mounted.borrow_mut();
        let mut events = Vec::new();
        for index in mounted.difference(&wanted) {
            events.extend(viewer.unmount_item(*index));
        }
        for index in wanted.difference(&mounted) {
            viewer.mount_item(*index);
        }
        *mounted = wanted;
        events
    }

    fn scroll_to(&self, index: usize) {
        if let Some(el) = self.pager.cast::<HtmlElement>() {
            let width = self.viewer.borrow().layout().width;
            el.set_scroll_left((index as f64 * width).round() as i32);
        }
    }

    fn measure(&self) {
        let Some(el) = self.pager.cast::<HtmlElement>() else {
            return;
        };
        let layout = Dimensions::new(f64::from(el.client_width()), f64::from(el.client_height()));
        let events = self.viewer.borrow_mut().on_layout(layout, now_ms());
        self.dispatch(events);
    }

    fn request_close(&self, reason: CloseReason) {
        let events = self.viewer.borrow_mut().request_close(reason);
        self.dispatch(events);
    }

    fn reopen(&self, images: Vec<ImageSource>, config: ViewerConfig) {
        dimensions::configure(config.dimension_cache_capacity);
        *self.viewer.borrow_mut() = Viewer::new(images, config);
        self.mounted.borrow_mut().clear();
    }

    fn teardown(&self) {
        self.reposition.borrow_mut().take();
        self.scroll_settle.borrow_mut().take();
        self.close.borrow_mut().take();
        self.viewer.borrow_mut().teardown();
        self.mounted.borrow_mut().clear();
    }
}

/// Full-screen, swipeable image gallery.
#[function_component]
pub fn ImageViewing(props: &ImageViewingProps) -> Html {
    let viewer = {
        let images = props.images.clone();
        let config = props.config.clone();
        use_mut_ref(move || Viewer::new(images, config))
    };
    let props_ref = use_mut_ref(|| props.clone());
    *props_ref.borrow_mut() = props.clone();
    let handles = ViewerHandles {
        viewer,
        mounted: use_mut_ref(BTreeSet::new),
        pager: use_node_ref(),
        reposition: use_mut_ref(|| None::<Timeout>),
        scroll_settle: use_mut_ref(|| None::<Timeout>),
        close: use_mut_ref(|| None::<Timeout>),
        props: props_ref,
        force: use_force_update(),
    };
    let item_config = use_memo(props.config.clone(), |config| config.clone());

    // Every opening starts from a fresh viewer.
    {
        let handles = handles.clone();
        use_effect_with(
            (props.images.clone(), props.config.clone(), props.visible),
            move |(images, config, visible)| {
                handles.reopen(images.clone(), config.clone());
                if *visible {
                    let events = handles.sync_window();
                    handles.dispatch(events);
                    handles.measure();
                }
                handles.force.force_update();
                move || handles.teardown()
            },
        );
    }

    {
        let handles = handles.clone();
        use_effect_with((), move |_| {
            let mut listeners = Vec::new();
            if let Some(win) = web_sys::window() {
                let on_resize = handles.clone();
                listeners.push(EventListener::new(&win, "resize", move |_| on_resize.measure()));
                let on_key = handles.clone();
                listeners.push(EventListener::new(&win, "keydown", move |event| {
                    let escape = event
                        .dyn_ref::<KeyboardEvent>()
                        .is_some_and(|e| e.key() == "Escape");
                    if escape && on_key.props.borrow().visible {
                        on_key.request_close(CloseReason::Back);
                    }
                }));
            }
            move || drop(listeners)
        });
    }

    if !props.visible {
        return html! {};
    }

    let onscroll = {
        let handles = handles.clone();
        Callback::from(move |_: Event| {
            let settled = handles.clone();
            *handles.scroll_settle.borrow_mut() = Some(Timeout::new(SCROLL_SETTLE_MS, move || {
                let Some(el) = settled.pager.cast::<HtmlElement>() else {
                    return;
                };
                let events = settled.viewer.borrow_mut().on_scroll_settle(f64::from(el.scroll_left()));
                settled.dispatch(events);
            }));
        })
    };
    let on_zoom = {
        let handles = handles.clone();
        Callback::from(move |(index, zoomed): (usize, bool)| {
            let events = handles.viewer.borrow_mut().on_zoom(index, zoomed);
            handles.dispatch(events);
        })
    };
    let on_long_press = {
        let handles = handles.clone();
        Callback::from(move |index: usize| {
            let events = handles.viewer.borrow().on_long_press(index);
            handles.dispatch(events);
        })
    };
    let on_drag = {
        let handles = handles.clone();
        Callback::from(move |(index, offset, at): (usize, f64, f64)| {
            handles.viewer.borrow_mut().on_item_scroll(index, offset, at);
            handles.force.force_update();
        })
    };
    let on_release = {
        let handles = handles.clone();
        Callback::from(move |(index, at): (usize, f64)| {
            let events = handles.viewer.borrow_mut().on_item_release(index, at);
            handles.dispatch(events);
            handles.force.force_update();
        })
    };
    let on_close = {
        let handles = handles.clone();
        Callback::from(move |_: ()| handles.request_close(CloseReason::Explicit))
    };

    let viewer = handles.viewer.borrow();
    let mounted = handles.mounted.borrow();
    let layout = viewer.layout();
    let current = viewer.current_index();
    let count = viewer.images().len();

    let items: Html = viewer
        .images()
        .iter()
        .enumerate()
        .map(|(index, source)| {
            let key = match &props.key_extractor {
                Some(extract) => extract.emit((source.clone(), index)),
                None => source.cache_key(),
            };
            if mounted.contains(&index) && layout.is_drawable() {
                html! {<ImageItem
                    key={key}
                    index={index}
                    source={source.clone()}
                    layout={layout}
                    config={item_config.clone()}
                    is_current={index == current}
                    offset_y={viewer.item_offset(index)}
                    opacity={viewer.item_opacity(index)}
                    dismiss_enabled={viewer.dismiss_enabled(index)}
                    on_zoom={on_zoom.clone()}
                    on_long_press={on_long_press.clone()}
                    on_drag={on_drag.clone()}
                    on_release={on_release.clone()}
                />}
            } else {
                html! {<div key={key} style={format!("flex:0 0 auto; width:{}px; height:100%; scroll-snap-align:start;", layout.width)}></div>}
            }
        })
        .collect();

    let bars = viewer.bars_visible();
    let header = match (&props.header, bars) {
        (_, false) => html! {},
        (Some(render), true) => render.emit(current),
        (None, true) => html! {<ImageHeader image_index={current} image_count={count} on_close={on_close} />},
    };
    let footer = match (&props.footer, bars) {
        (Some(render), true) => html! {<div style="position:absolute; left:0; right:0; bottom:0; z-index:10;">{render.emit(current)}</div>},
        _ => html! {},
    };
    let overflow = if viewer.scroll_enabled() { "auto" } else { "hidden" };
    let pointer_events = if viewer.is_closed() { "none" } else { "auto" };

    html! {<div style={format!("position:fixed; inset:0; z-index:1000; overflow:hidden; background:{}; opacity:{}; transition:opacity {}ms ease-out; pointer-events:{};", viewer.config().background_color, viewer.overlay_opacity(), CLOSE_FADE_MS, pointer_events)}>
        <div ref={handles.pager.clone()} onscroll={onscroll}
            style={format!("display:flex; width:100%; height:100%; overflow-x:{}; overflow-y:hidden; scroll-snap-type:x mandatory; scrollbar-width:none; overscroll-behavior:contain;", overflow)}>
            {items}
        </div>
        {header}
        {footer}
    </div>}
}
