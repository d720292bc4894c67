use super::image_viewing::ImageViewing;
use crate::config::ViewerConfig;
use crate::model::ImageSource;
use yew::prelude::*;

const CONFIG_KEY: &str = "iv_viewer_config";

fn demo_images() -> Vec<ImageSource> {
    vec![
        ImageSource::Asset(1),
        ImageSource::Asset(2),
        ImageSource::Remote {
            uri: "https://picsum.photos/id/1015/1200/800".to_string(),
            width: Some(1200.0),
            height: Some(800.0),
        },
        ImageSource::uri("https://picsum.photos/id/1025/800/1200"),
        ImageSource::uri("https://picsum.photos/id/1043/1600/900"),
    ]
}

/// Reads viewer settings from local storage; anything unusable means defaults.
fn load_config() -> ViewerConfig {
    let raw = web_sys::window()
        .and_then(|win| win.local_storage().ok().flatten())
        .and_then(|store| store.get_item(CONFIG_KEY).ok().flatten());
    match raw {
        Some(raw) => ViewerConfig::from_json(&raw).unwrap_or_else(|err| {
            log::warn!("ignoring stored viewer config: {err}");
            ViewerConfig::default()
        }),
        None => ViewerConfig::default(),
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let images = use_memo((), |_| demo_images());
    let base_config = use_memo((), |_| load_config());
    let open_at = use_state(|| None::<usize>);
    let current = use_state(|| 0usize);
    let last_press = use_state(|| None::<String>);

    let on_request_close = {
        let open_at = open_at.clone();
        Callback::from(move |_| open_at.set(None))
    };
    let on_index_change = {
        let current = current.clone();
        Callback::from(move |index: usize| current.set(index))
    };
    let on_long_press = {
        let last_press = last_press.clone();
        Callback::from(move |source: ImageSource| {
            log::info!("long press on {}", source.cache_key());
            last_press.set(Some(source.cache_key()));
        })
    };
    let footer = {
        let count = images.len();
        Callback::from(move |index: usize| {
            html! {<div style="padding:16px; text-align:center; color:#ccc; font-size:13px;">
                {format!("Photo {} of {}", index + 1, count)}
            </div>}
        })
    };

    let config = ViewerConfig {
        image_index: (*open_at).unwrap_or(0),
        ..(*base_config).clone()
    };
    let asset_base = base_config.asset_base.clone();

    let thumbs: Html = images
        .iter()
        .enumerate()
        .map(|(index, source)| {
            let open_at = open_at.clone();
            let current = current.clone();
            let onclick = Callback::from(move |_| {
                current.set(index);
                open_at.set(Some(index));
            });
            html! {<button key={index} onclick={onclick} style="padding:0; border:1px solid #30363d; border-radius:8px; overflow:hidden; background:#161b22; cursor:pointer;">
                <img src={source.render_uri(&asset_base)} style="display:block; width:100%; height:120px; object-fit:cover;" />
            </button>}
        })
        .collect();

    html! {
        <div id="root" style="padding:12px; color:#e6edf3; background:#0d1117; min-height:100vh; font-family:sans-serif;">
            <h2 style="margin:0 0 12px 0;">{"Gallery"}</h2>
            <div style="display:grid; grid-template-columns:repeat(auto-fill, minmax(140px, 1fr)); gap:8px;">
                {thumbs}
            </div>
            <p style="opacity:0.7; font-size:13px;">{format!("Last viewed: {}", *current + 1)}</p>
            if let Some(key) = (*last_press).clone() {
                <p style="opacity:0.7; font-size:13px;">{format!("Long pressed: {key}")}</p>
            }
            <ImageViewing
                images={(*images).clone()}
                visible={open_at.is_some()}
                config={config}
                on_request_close={on_request_close}
                on_image_index_change={on_index_change}
                on_long_press={on_long_press}
                footer={Some(footer)}
            />
        </div>
    }
}
