use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions};
use gloo::timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, HtmlImageElement, TouchEvent, TouchList};
use yew::prelude::*;

use super::image_loading::ImageLoading;
use crate::config::ViewerConfig;
use crate::dimensions;
use crate::geometry::style_for;
use crate::model::{Dimensions, ImageSource, Touch, TouchFrame, TouchPhase};
use crate::state::gesture::GesturePhase;
use crate::state::{DragState, EngineOutput, GestureContext, GestureEngine};
use crate::util::now_ms;

#[derive(Properties, PartialEq, Clone)]
pub struct ImageItemProps {
    pub index: usize,
    pub source: ImageSource,
    pub layout: Dimensions,
    pub config: Rc<ViewerConfig>,
    pub is_current: bool,
    pub offset_y: f64,
    pub opacity: f64,
    pub dismiss_enabled: bool,
    pub on_zoom: Callback<(usize, bool)>,
    pub on_long_press: Callback<usize>,
    /// (index, vertical offset, timestamp)
    pub on_drag: Callback<(usize, f64, f64)>,
    /// (index, timestamp)
    pub on_release: Callback<(usize, f64)>,
}

fn gesture_context(image: Option<Dimensions>, layout: Dimensions, config: &ViewerConfig) -> GestureContext {
    GestureContext::fit(
        image,
        layout,
        config.gesture.clone(),
        config.double_tap_to_zoom_enabled,
        f64::from(config.delay_long_press_ms),
    )
}

fn touches_of(list: &TouchList, left: f64, top: f64) -> Vec<Touch> {
    (0..list.length())
        .map(|i| match list.item(i) {
            Some(t) => Touch::at(f64::from(t.client_x()) - left, f64::from(t.client_y()) - top),
            None => Touch::default(),
        })
        .collect()
}

/// Shared handles the native listeners and timers work through.
#[derive(Clone)]
struct ItemHandles {
    engine: Rc<RefCell<GestureEngine>>,
    drag: Rc<RefCell<DragState>>,
    long_press: Rc<RefCell<Option<Timeout>>>,
    props: Rc<RefCell<ImageItemProps>>,
    force: UseForceUpdateHandle,
}

impl ItemHandles {
    fn dispatch(&self, outputs: Vec<EngineOutput>) {
        let (index, on_zoom, on_long_press) = {
            let p = self.props.borrow();
            (p.index, p.on_zoom.clone(), p.on_long_press.clone())
        };
        for output in outputs {
            match output {
                EngineOutput::ZoomChanged(zoomed) => on_zoom.emit((index, zoomed)),
                EngineOutput::LongPress => on_long_press.emit(index),
                EngineOutput::ScheduleLongPress { task, delay_ms } => {
                    let handles = self.clone();
                    // replacing the previous timeout cancels it
                    *self.long_press.borrow_mut() = Some(Timeout::new(delay_ms.max(0.0) as u32, move || {
                        let outputs = handles.engine.borrow_mut().run_task(task);
                        handles.dispatch(outputs);
                        handles.force.force_update();
                    }));
                }
            }
        }
    }

    fn on_touch(&self, phase: TouchPhase, e: &TouchEvent, element: &HtmlElement) {
        let rect = element.get_bounding_client_rect();
        let now = now_ms();
        let touches = touches_of(&e.touches(), rect.left(), rect.top());
        let changed = touches_of(&e.changed_touches(), rect.left(), rect.top());
        let first = touches.first().and_then(Touch::position);
        let active = touches.len();

        let outputs = self
            .engine
            .borrow_mut()
            .handle(TouchFrame::new(phase, touches, changed, now));
        self.dispatch(outputs);

        let zoomed = self.engine.borrow().is_zoomed();
        let props = self.props.borrow().clone();
        match phase {
            TouchPhase::Down => {
                let single = active == 1 && !zoomed && props.dismiss_enabled;
                match first {
                    Some(at) if single => self.drag.borrow_mut().begin(at),
                    _ => {
                        if self.drag.borrow_mut().end() {
                            props.on_release.emit((props.index, now));
                        }
                    }
                }
            }
            TouchPhase::Move => {
                let offset = first.and_then(|at| self.drag.borrow_mut().update(at, props.config.gesture.tap_slop_px));
                if let Some(offset) = offset {
                    props.on_drag.emit((props.index, offset, now));
                }
                if zoomed || self.drag.borrow().is_dragging() {
                    e.prevent_default();
                }
            }
            TouchPhase::Up | TouchPhase::Cancel => {
                if active == 0 && self.drag.borrow_mut().end() {
                    props.on_release.emit((props.index, now));
                }
            }
        }
        self.force.force_update();
    }
}

#[function_component]
pub fn ImageItem(props: &ImageItemProps) -> Html {
    let container = use_node_ref();
    let dims = {
        let source = props.source.clone();
        use_state(move || dimensions::resolve(&source))
    };
    let ctx = gesture_context(*dims, props.layout, &props.config);
    let engine = {
        let ctx = ctx.clone();
        use_mut_ref(move || GestureEngine::new(ctx))
    };
    let drag = use_mut_ref(DragState::default);
    let long_press = use_mut_ref(|| None::<Timeout>);
    let props_ref = use_mut_ref(|| props.clone());
    *props_ref.borrow_mut() = props.clone();
    let force = use_force_update();

    let handles = ItemHandles {
        engine: engine.clone(),
        drag: drag.clone(),
        long_press,
        props: props_ref,
        force,
    };

    // Touch listeners are registered natively so touchmove can prevent scrolling.
    {
        let container = container.clone();
        let handles = handles.clone();
        use_effect_with((), move |_| {
            let mut listeners = Vec::new();
            if let Some(el) = container.cast::<HtmlElement>() {
                let phases = [
                    ("touchstart", TouchPhase::Down),
                    ("touchmove", TouchPhase::Move),
                    ("touchend", TouchPhase::Up),
                    ("touchcancel", TouchPhase::Cancel),
                ];
                for (name, phase) in phases {
                    let handles = handles.clone();
                    let target = el.clone();
                    listeners.push(EventListener::new_with_options(
                        &el,
                        name,
                        EventListenerOptions::enable_prevent_default(),
                        move |event| {
                            if let Some(e) = event.dyn_ref::<TouchEvent>() {
                                handles.on_touch(phase, e, &target);
                            }
                        },
                    ));
                }
            } else {
                log::warn!("image item mounted without a container element");
            }
            move || {
                drop(listeners);
                handles.long_press.borrow_mut().take();
                handles.engine.borrow_mut().teardown();
            }
        });
    }

    // New viewport or newly discovered size: refit.
    {
        let handles = handles.clone();
        use_effect_with(ctx, move |ctx| {
            if handles.engine.borrow().context() != ctx {
                let outputs = handles.engine.borrow_mut().set_layout(ctx.clone());
                handles.dispatch(outputs);
                handles.force.force_update();
            }
            || ()
        });
    }

    // Pages that scroll off screen return to rest.
    {
        let handles = handles.clone();
        use_effect_with(props.is_current, move |current| {
            if !*current && handles.engine.borrow().is_zoomed() {
                let outputs = handles.engine.borrow_mut().reset();
                handles.dispatch(outputs);
                handles.force.force_update();
            }
            || ()
        });
    }

    let onload = {
        let source = props.source.clone();
        let dims = dims.clone();
        Callback::from(move |e: Event| {
            let Some(img) = e.target_dyn_into::<HtmlImageElement>() else {
                return;
            };
            let natural = Dimensions::new(f64::from(img.natural_width()), f64::from(img.natural_height()));
            if let Some(found) = dimensions::record(&source, natural) {
                if *dims != Some(found) {
                    dims.set(Some(found));
                }
            }
        })
    };
    let onerror = {
        let uri = props.source.cache_key();
        Callback::from(move |_: Event| log::warn!("failed to load image {uri}"))
    };

    let (transform, zoomed, settled) = {
        let engine = engine.borrow();
        (engine.transform(), engine.is_zoomed(), engine.snapshot().phase == GesturePhase::Idle)
    };
    let attrs = style_for(*dims, transform.translate, Some(transform.scale));
    let touch_action = if zoomed { "none" } else { "pan-x" };
    let transition = if drag.borrow().is_dragging() {
        ""
    } else {
        "transition:transform 0.2s ease-out, opacity 0.2s ease-out;"
    };
    // animate snaps and double taps, follow fingers directly
    let image_transition = if settled { "transition:transform 0.15s ease-out;" } else { "" };
    let uri = props.source.render_uri(&props.config.asset_base);

    html! {<div ref={container} style={format!("position:relative; flex:0 0 auto; width:{}px; height:{}px; overflow:hidden; scroll-snap-align:start; touch-action:{};", props.layout.width, props.layout.height, touch_action)}>
        <div style={format!("position:absolute; inset:0; transform:translateY({}px); opacity:{}; {}", props.offset_y, props.opacity, transition)}>
            <img src={uri} draggable="false" onload={onload} onerror={onerror}
                style={format!("position:absolute; left:0; top:0; max-width:none; transform-origin:center center; user-select:none; -webkit-user-drag:none; {}{}", image_transition, attrs.to_css())} />
        </div>
        if attrs.is_placeholder() {
            <ImageLoading />
        }
    </div>}
}
