//! Two-image blends. Both images must have identical dimensions.

use crate::error::BmpError;
use crate::image::Image;
use crate::pixel::Pixel;

fn check_dimensions(primary: &Image, secondary: &Image) -> Result<(), BmpError> {
    if primary.same_dimensions(secondary) {
        return Ok(());
    }
    Err(BmpError::DimensionMismatch {
        expected_width: primary.width(),
        expected_height: primary.height(),
        actual_width: secondary.width(),
        actual_height: secondary.height(),
    })
}

fn zip_pixels(primary: &mut Image, secondary: &Image, f: impl Fn(u8, u8) -> u8) {
    for (dst, src) in primary.pixels_mut().iter_mut().zip(secondary.pixels()) {
        *dst = Pixel {
            b: f(dst.b, src.b),
            g: f(dst.g, src.g),
            r: f(dst.r, src.r),
        };
    }
}

/// Average `secondary` into `primary`, channel by channel.
pub fn combine(primary: &mut Image, secondary: &Image) -> Result<(), BmpError> {
    check_dimensions(primary, secondary)?;
    zip_pixels(primary, secondary, |a, b| ((u16::from(a) + u16::from(b)) >> 1) as u8);
    Ok(())
}

/// Add `secondary` onto `primary`, saturating at 255.
pub fn merge(primary: &mut Image, secondary: &Image) -> Result<(), BmpError> {
    check_dimensions(primary, secondary)?;
    zip_pixels(primary, secondary, u8::saturating_add);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: usize, h: usize, v: u8) -> Image {
        Image::from_pixels(w, h, vec![Pixel { b: v, g: v, r: v }; w * h]).unwrap()
    }

    #[test]
    fn combine_averages() {
        let mut a = solid(2, 2, 10);
        combine(&mut a, &solid(2, 2, 255)).unwrap();
        assert!(a.pixels().iter().all(|p| p.g == 132));
    }

    #[test]
    fn merge_saturates() {
        let mut a = solid(2, 2, 200);
        merge(&mut a, &solid(2, 2, 100)).unwrap();
        assert!(a.pixels().iter().all(|p| p.r == 255));
    }

    #[test]
    fn mismatch_leaves_primary_untouched() {
        let mut a = solid(2, 3, 7);
        let before = a.clone();
        let err = combine(&mut a, &solid(3, 2, 1)).unwrap_err();
        assert!(matches!(
            err,
            BmpError::DimensionMismatch {
                expected_width: 2,
                actual_width: 3,
                ..
            }
        ));
        assert!(merge(&mut a, &solid(2, 4, 1)).is_err());
        assert_eq!(a, before);
    }
}
