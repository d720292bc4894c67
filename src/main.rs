mod cache;
mod components;
mod config;
mod dimensions;
mod geometry;
mod model;
mod state;
mod util;

use components::app::App;
use log::LevelFilter;

fn main() {
    console_error_panic_hook::set_once();
    util::init_logging(LevelFilter::Info);
    log::info!("image viewer starting");
    yew::Renderer::<App>::new().render();
}
