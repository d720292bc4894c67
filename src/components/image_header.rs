use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ImageHeaderProps {
    pub image_index: usize,
    pub image_count: usize,
    pub on_close: Callback<()>,
}

/// Default top bar: position counter and a close button.
#[function_component]
pub fn ImageHeader(props: &ImageHeaderProps) -> Html {
    let close_cb = {
        let cb = props.on_close.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let counter = if props.image_count > 0 {
        format!("{} / {}", props.image_index + 1, props.image_count)
    } else {
        String::new()
    };

    html! {<div style="position:absolute; top:0; left:0; right:0; display:flex; justify-content:space-between; align-items:center; padding:12px 16px; background:linear-gradient(rgba(0,0,0,0.45), rgba(0,0,0,0)); color:#fff; z-index:10;">
        <span style="font-size:15px; font-variant-numeric:tabular-nums;">{counter}</span>
        <button onclick={close_cb} aria-label="Close" style="background:none; border:none; color:#fff; font-size:22px; line-height:1; padding:4px 8px; cursor:pointer;">{"✕"}</button>
    </div>}
}
