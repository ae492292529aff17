//! # zenbmpfx
//!
//! Reader, validator, transformer and writer for uncompressed 24-bit BMP
//! files.
//!
//! Files are checked against their own headers before any pixel memory is
//! allocated: the declared size must match the real size, the pixel array
//! must fit, and optional [`Limits`] cap the dimensions and allocation.
//! Decoded pixels live in an [`Image`] owned by a [`Bmp`], which applies
//! [`Operation`]s in caller order and writes the result back with freshly
//! computed row padding.
//!
//! ## Supported input
//!
//! - `BM` file header with a BITMAPINFOHEADER (or larger) DIB header
//! - 24 bits per pixel, BI_RGB, one colour plane
//! - bottom-up (positive height) and top-down (negative height) row order
//!
//! The OS/2 family (`BA`, `CI`, `CP`, `IC`, `PT`) is recognized and
//! rejected as [`BmpError::UnsupportedVariant`].
//!
//! ## Transforms
//!
//! - geometry: flip, reverse, tiled transpose, quarter-turn rotation
//! - colour: invert, channel zeroing, luma and average grayscale,
//!   brightness cut, contrast, channel swap, hue bias, dim, scale
//! - spatial: glitch, separable box blur, melt pixel-sort, edge marking
//! - blends with a second file: combine (average) and merge (saturating add)
//!
//! ## Usage
//!
//! ```no_run
//! use zenbmpfx::{Bmp, ChannelMask, Operation};
//!
//! let mut bmp = Bmp::open("in.bmp")?;
//! println!("{}", bmp.info_header());
//! bmp.apply_all(&[
//!     Operation::Rotate(1),
//!     Operation::Blur(4),
//!     Operation::FilterChannels(ChannelMask::BLUE),
//! ])?;
//! bmp.write("out.bmp")?;
//! bmp.close();
//! # Ok::<(), zenbmpfx::BmpError>(())
//! ```
//!
//! ## Features
//!
//! - **`simd`**: SIMD red/blue channel swap via `garb`.

#![forbid(unsafe_code)]

mod error;
mod image;
mod limits;
mod operation;
mod pixel;

pub mod bmp;
pub mod effects;
pub mod geometry;

pub use bmp::{Bmp, BmpInfo, FileHeader, InfoHeader, OpenRequest, Permissiveness, probe};
pub use enough::{Stop, Unstoppable};
pub use error::{BmpError, ErrorKind};
pub use image::Image;
pub use limits::Limits;
pub use operation::Operation;
pub use pixel::{BYTES_PER_PIXEL, ChannelMask, Pixel, intensity};
