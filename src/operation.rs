use std::path::{Path, PathBuf};

use crate::effects;
use crate::error::BmpError;
use crate::geometry;
use crate::image::Image;
use crate::pixel::ChannelMask;

/// Every transform a [`crate::Bmp`] can apply.
///
/// Callers build an ordered list and hand it to [`crate::Bmp::apply_all`];
/// nothing is registered globally.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Operation {
    /// Mirror vertically.
    Flip,
    /// Mirror horizontally.
    Reverse,
    Transpose,
    /// Quarter turns clockwise; negative turns anticlockwise.
    Rotate(i64),
    GrayscaleLuma,
    GrayscaleAverage,
    Invert,
    /// Exchange red and blue.
    SwapChannels,
    /// Zero the channels in the mask.
    FilterChannels(ChannelMask),
    /// Zero channels brighter than the cutoff.
    BrightnessCut(u8),
    Contrast {
        factor: u8,
        low: u8,
        high: u8,
    },
    Dim {
        red: u8,
        green: u8,
        blue: u8,
    },
    Scale {
        red: f32,
        green: f32,
        blue: f32,
        /// Clamp instead of wrapping.
        strict: bool,
    },
    Glitch(usize),
    /// Box blur radius.
    Blur(usize),
    /// Pixel-sort start offset, non-zero.
    Melt(i32),
    /// Average with another BMP of identical dimensions.
    Combine(PathBuf),
    /// Saturating add of another BMP of identical dimensions.
    Merge(PathBuf),
    HueShift {
        red: i32,
        green: i32,
        blue: i32,
    },
    /// Experimental red edge marking.
    EdgeDetect(i32),
}

impl Operation {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Flip => "flip",
            Self::Reverse => "reverse",
            Self::Transpose => "transpose",
            Self::Rotate(_) => "rotate",
            Self::GrayscaleLuma => "grayscale",
            Self::GrayscaleAverage => "average",
            Self::Invert => "invert",
            Self::SwapChannels => "swap",
            Self::FilterChannels(_) => "filter",
            Self::BrightnessCut(_) => "brightness-cut",
            Self::Contrast { .. } => "contrast",
            Self::Dim { .. } => "dim",
            Self::Scale { .. } => "scale",
            Self::Glitch(_) => "glitch",
            Self::Blur(_) => "blur",
            Self::Melt(_) => "melt",
            Self::Combine(_) => "combine",
            Self::Merge(_) => "merge",
            Self::HueShift { .. } => "hue",
            Self::EdgeDetect(_) => "edge-detect",
        }
    }

    /// Whether the result may have different dimensions from the input.
    pub fn changes_dimensions(&self) -> bool {
        match self {
            Self::Transpose => true,
            Self::Rotate(turns) => geometry::rotation_swaps_axes(*turns),
            _ => false,
        }
    }

    /// Apply the operation to `image`.
    ///
    /// Transforms that change the layout replace `*image` with a new buffer.
    /// `open_secondary` loads the second image for [`Operation::Combine`] and
    /// [`Operation::Merge`]. When a precondition fails `image` is untouched.
    pub fn apply<F>(&self, image: &mut Image, open_secondary: F) -> Result<(), BmpError>
    where
        F: FnOnce(&Path) -> Result<Image, BmpError>,
    {
        match self {
            Self::Flip => geometry::flip(image),
            Self::Reverse => geometry::reverse(image),
            Self::Transpose => *image = geometry::transpose(image)?,
            Self::Rotate(turns) => geometry::rotate(image, *turns)?,
            Self::GrayscaleLuma => effects::grayscale_luma(image),
            Self::GrayscaleAverage => effects::grayscale_average(image),
            Self::Invert => effects::invert(image),
            Self::SwapChannels => effects::swap_channels(image),
            Self::FilterChannels(mask) => effects::filter_channels(image, *mask),
            Self::BrightnessCut(cutoff) => effects::brightness_cut(image, *cutoff),
            Self::Contrast { factor, low, high } => effects::contrast(image, *factor, *low, *high),
            Self::Dim { red, green, blue } => effects::dim(image, *red, *green, *blue),
            Self::Scale {
                red,
                green,
                blue,
                strict,
            } => effects::scale(image, *red, *green, *blue, *strict),
            Self::Glitch(offset) => effects::glitch(image, *offset)?,
            Self::Blur(radius) => *image = effects::blur(image, *radius)?,
            Self::Melt(start) => *image = effects::melt(image, *start)?,
            Self::Combine(path) => {
                let secondary = open_secondary(path)?;
                effects::combine(image, &secondary)?;
            }
            Self::Merge(path) => {
                let secondary = open_secondary(path)?;
                effects::merge(image, &secondary)?;
            }
            Self::HueShift { red, green, blue } => effects::hue_shift(image, *red, *green, *blue),
            Self::EdgeDetect(threshold) => effects::edge_detection(image, *threshold),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::Pixel;

    fn no_files(_: &Path) -> Result<Image, BmpError> {
        panic!("no secondary image expected")
    }

    fn sample() -> Image {
        let pixels = (0..6u8).map(|i| Pixel { b: i, g: i * 2, r: 200 }).collect();
        Image::from_pixels(3, 2, pixels).unwrap()
    }

    #[test]
    fn in_place_ops_keep_dimensions() {
        for op in [
            Operation::Flip,
            Operation::Invert,
            Operation::FilterChannels(ChannelMask::GREEN),
            Operation::Dim {
                red: 1,
                green: 2,
                blue: 3,
            },
            Operation::EdgeDetect(10),
        ] {
            let mut img = sample();
            op.apply(&mut img, no_files).unwrap();
            assert_eq!(img.dimensions(), (3, 2), "{}", op.name());
            assert!(!op.changes_dimensions());
        }
    }

    #[test]
    fn rotations_report_axis_swap() {
        let op = Operation::Rotate(3);
        assert!(op.changes_dimensions());
        let mut img = sample();
        op.apply(&mut img, no_files).unwrap();
        assert_eq!(img.dimensions(), (2, 3));
        assert!(!Operation::Rotate(2).changes_dimensions());
        assert!(Operation::Transpose.changes_dimensions());
    }

    #[test]
    fn secondary_is_loaded_for_blends() {
        let op = Operation::Merge(PathBuf::from("other.bmp"));
        let mut img = sample();
        op.apply(&mut img, |path| {
            assert_eq!(path, Path::new("other.bmp"));
            Image::from_pixels(3, 2, vec![Pixel { b: 255, g: 0, r: 0 }; 6])
        })
        .unwrap();
        assert!(img.pixels().iter().all(|p| p.b == 255 && p.r == 200));
    }

    #[test]
    fn failed_preconditions_leave_image() {
        let mut img = sample();
        assert!(matches!(
            Operation::Glitch(3).apply(&mut img, no_files),
            Err(BmpError::OffsetOutOfBounds { .. })
        ));
        assert!(matches!(
            Operation::Melt(0).apply(&mut img, no_files),
            Err(BmpError::InvalidMeltOffset)
        ));
        assert_eq!(img, sample());
    }
}
