//! Colour filters, two-image blends and the spatial effects.
//!
//! In-place effects take `&mut Image`. [`blur`] and [`melt`] build a new
//! image and leave the input untouched.

mod blend;
mod blur;
mod edges;
mod filters;
mod glitch;
mod melt;

pub use blend::{combine, merge};
pub use blur::blur;
pub use edges::edge_detection;
pub use filters::{
    brightness_cut, channel_average, contrast, dim, filter_channels, grayscale_average,
    grayscale_luma, hue_shift, invert, luma, scale, swap_channels,
};
pub use glitch::glitch;
pub use melt::melt;
