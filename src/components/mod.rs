pub mod app;
pub mod image_header;
pub mod image_item;
pub mod image_loading;
pub mod image_viewing;
