use crate::image::Image;
use crate::pixel::Pixel;

const MARK: Pixel = Pixel { b: 0, g: 0, r: 255 };

/// Experimental edge marker.
///
/// Walks each row left to right comparing every pixel with its right-hand
/// neighbour. When the neighbour's channel sum is higher by more than
/// `threshold` the neighbour is painted red; when it is lower by more than
/// `threshold` the current pixel is. Marks feed into later comparisons on
/// the same row.
pub fn edge_detection(image: &mut Image, threshold: i32) {
    for row in image.rows_mut() {
        for x in 1..row.len() {
            let diff = channel_sum(row[x]) - channel_sum(row[x - 1]);
            if diff > threshold {
                row[x] = MARK;
            } else if -diff > threshold {
                row[x - 1] = MARK;
            }
        }
    }
}

fn channel_sum(p: Pixel) -> i32 {
    i32::from(p.b) + i32::from(p.g) + i32::from(p.r)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(v: u8) -> Pixel {
        Pixel { b: v, g: v, r: v }
    }

    #[test]
    fn marks_brighter_neighbour() {
        let mut img = Image::from_pixels(3, 1, vec![gray(0), gray(100), gray(100)]).unwrap();
        edge_detection(&mut img, 50);
        assert_eq!(img.pixels(), &[gray(0), MARK, gray(100)]);
    }

    #[test]
    fn marks_current_on_drop() {
        let mut img = Image::from_pixels(2, 1, vec![gray(200), gray(10)]).unwrap();
        edge_detection(&mut img, 50);
        assert_eq!(img.pixels(), &[MARK, gray(10)]);
    }

    #[test]
    fn flat_image_untouched() {
        let mut img = Image::from_pixels(4, 2, vec![gray(77); 8]).unwrap();
        let before = img.clone();
        edge_detection(&mut img, 0);
        assert_eq!(img, before);
    }
}
