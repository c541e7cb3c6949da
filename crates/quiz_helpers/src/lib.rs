mod app;
pub use app::*;

pub mod input;
pub mod shapes;

mod window_resizing;
