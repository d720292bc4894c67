use yew::prelude::*;

/// Spinner shown in place of an image whose size is not known yet.
#[function_component]
pub fn ImageLoading() -> Html {
    html! {<div style="position:absolute; inset:0; display:flex; align-items:center; justify-content:center; pointer-events:none;">
        <style>{"@keyframes iv-spin { to { transform: rotate(360deg); } }"}</style>
        <div style="width:32px; height:32px; border-radius:50%; border:3px solid rgba(255,255,255,0.25); border-top-color:#fff; animation:iv-spin 0.9s linear infinite;"></div>
    </div>}
}
