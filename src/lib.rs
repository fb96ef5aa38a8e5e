pub mod composer;
pub mod config;
pub mod drag;
pub mod error;
pub mod geometry;
pub mod hit;
pub mod layer;
pub mod logging;
pub mod render;
pub mod suggest;

pub use composer::{Composer, ExportError};
pub use error::{AppError, AppResult};
