pub mod dismiss;
pub mod gesture;
pub mod page;
pub mod timer;
pub mod touch;
pub mod viewer;

pub use gesture::{EngineOutput, GestureContext, GestureEngine};
pub use touch::DragState;
pub use viewer::{CloseReason, Viewer, ViewerEvent};
