//! RGB <-> YCbCr conversion and channel separation
//!
//! ```text
//! Y  =       0.299    * R + 0.587    * G + 0.114    * B
//! Cb = 128 - 0.168736 * R - 0.331264 * G + 0.5      * B
//! Cr = 128 + 0.5      * R - 0.418688 * G - 0.081312 * B
//! ```
//!
//! Both directions truncate toward zero; the way back to RGB also clamps
//! every channel to `0..=255`.
use crate::error::{CodecError, Result};
use crate::plane::{Layer, PixelImage, Plane};

const CHROMA_CENTER: f64 = 128.0;

pub fn rgb_to_ycbcr([r, g, b]: [i32; 3]) -> [i32; 3] {
    let (r, g, b) = (r as f64, g as f64, b as f64);
    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let cb = CHROMA_CENTER - 0.168736 * r - 0.331264 * g + 0.5 * b;
    let cr = CHROMA_CENTER + 0.5 * r - 0.418688 * g - 0.081312 * b;
    [y as i32, cb as i32, cr as i32]
}

pub fn ycbcr_to_rgb([y, cb, cr]: [i32; 3]) -> [i32; 3] {
    let y = y as f64;
    let cb = cb as f64 - CHROMA_CENTER;
    let cr = cr as f64 - CHROMA_CENTER;
    let r = y + 1.402 * cr;
    let g = y - 0.344136 * cb - 0.714136 * cr;
    let b = y + 1.772 * cb;
    [r, g, b].map(|channel| (channel as i32).clamp(0, 255))
}

pub fn image_rgb_to_ycbcr(image: &PixelImage) -> PixelImage {
    image.map(rgb_to_ycbcr)
}

pub fn image_ycbcr_to_rgb(image: &PixelImage) -> PixelImage {
    image.map(ycbcr_to_rgb)
}

/// One layer per channel, in channel order.
pub fn separate_layers(image: &PixelImage) -> [Layer; 3] {
    [0, 1, 2].map(|channel| image.map(|pixel| pixel[channel]))
}

pub fn join_layers(layers: &[Layer; 3]) -> Result<PixelImage> {
    let [first, second, third] = layers;
    for layer in [second, third] {
        if (layer.width, layer.height) != (first.width, first.height) {
            return Err(CodecError::shape(format!(
                "cannot join a {}x{} layer with a {}x{} layer",
                layer.width, layer.height, first.width, first.height
            )));
        }
    }
    let data = first.data.iter()
        .zip(&second.data)
        .zip(&third.data)
        .map(|((&a, &b), &c)| [a, b, c])
        .collect();
    Plane::from_vec(data, first.width, first.height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_and_grey() {
        assert_eq!(rgb_to_ycbcr([0, 0, 0]), [0, 128, 128]);
        assert_eq!(ycbcr_to_rgb([0, 128, 128]), [0, 0, 0]);
        assert_eq!(ycbcr_to_rgb([100, 128, 128]), [100, 100, 100]);
    }

    #[test]
    fn test_pure_red() {
        assert_eq!(rgb_to_ycbcr([255, 0, 0]), [76, 84, 255]);
        // blue comes back slightly negative and is clamped
        assert_eq!(ycbcr_to_rgb([76, 84, 255]), [254, 0, 0]);
    }

    #[test]
    fn test_round_trip_is_close() {
        for pixel in [[12, 200, 97], [255, 255, 0], [30, 30, 30], [128, 64, 250]] {
            let restored = ycbcr_to_rgb(rgb_to_ycbcr(pixel));
            for (a, b) in pixel.iter().zip(&restored) {
                assert!((a - b).abs() <= 3, "{:?} -> {:?}", pixel, restored);
            }
        }
    }

    #[test]
    fn test_separate_and_join() {
        let image = Plane::from_rows(vec![
            vec![[1, 2, 3], [4, 5, 6]],
            vec![[7, 8, 9], [10, 11, 12]],
        ]).unwrap();
        let layers = separate_layers(&image);
        assert_eq!(layers[0].data, vec![1, 4, 7, 10]);
        assert_eq!(layers[2].to_rows(), vec![vec![3, 6], vec![9, 12]]);
        assert_eq!(join_layers(&layers).unwrap(), image);
    }

    #[test]
    fn test_join_mismatched_layers() {
        let layers = [Plane::new(2, 2), Plane::new(2, 2), Plane::new(3, 2)];
        assert!(matches!(join_layers(&layers), Err(CodecError::Shape { .. })));
    }

    #[test]
    fn test_image_conversion() {
        let image = Plane::from_vec(vec![[0, 0, 0], [255, 0, 0]], 2, 1).unwrap();
        let converted = image_rgb_to_ycbcr(&image);
        assert_eq!(converted.data, vec![[0, 128, 128], [76, 84, 255]]);
        assert_eq!(image_ycbcr_to_rgb(&converted).data, vec![[0, 0, 0], [254, 0, 0]]);
    }
}
