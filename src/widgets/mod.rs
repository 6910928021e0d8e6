//! Worked widgets assembled from gadgets

pub mod image;
pub mod progress_bar;
pub mod scale;

pub use image::Image;
pub use progress_bar::ProgressBar;
pub use scale::{MarkPosition, Scale};
