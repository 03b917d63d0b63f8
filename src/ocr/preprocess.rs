use image::{ImageBuffer, Luma, Rgba};

/// Converts a cropped card region to grayscale for the recognition engine.
///
/// When `threshold` is set, the result is binarized: pixels whose luma is
/// below the threshold become black (ink), all others white (card stock).
/// Useful for photographed cards with uneven lighting.
pub fn prepare_for_ocr(
    img: &ImageBuffer<Rgba<u8>, Vec<u8>>,
    threshold: Option<u8>,
) -> ImageBuffer<Luma<u8>, Vec<u8>> {
    let gray = image::imageops::grayscale(img);
    match threshold {
        Some(t) => binarize_dark_pixels(&gray, t),
        None => gray,
    }
}

/// Keeps only dark pixels as black text on a white background.
pub fn binarize_dark_pixels(
    img: &ImageBuffer<Luma<u8>, Vec<u8>>,
    threshold: u8,
) -> ImageBuffer<Luma<u8>, Vec<u8>> {
    let (width, height) = img.dimensions();
    let mut output = ImageBuffer::new(width, height);

    for (x, y, pixel) in img.enumerate_pixels() {
        let value = if pixel[0] < threshold { 0u8 } else { 255u8 };
        output.put_pixel(x, y, Luma([value]));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binarize_dark_pixels() {
        let mut img: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::new(3, 1);
        img.put_pixel(0, 0, Luma([20]));
        img.put_pixel(1, 0, Luma([240]));
        img.put_pixel(2, 0, Luma([140]));

        let result = binarize_dark_pixels(&img, 140);

        assert_eq!(result.get_pixel(0, 0)[0], 0, "Dark pixel should become ink");
        assert_eq!(result.get_pixel(1, 0)[0], 255, "Bright pixel should become paper");
        assert_eq!(result.get_pixel(2, 0)[0], 255, "Threshold itself counts as paper");
    }

    #[test]
    fn test_prepare_keeps_dimensions() {
        let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_pixel(7, 4, Rgba([255, 255, 255, 255]));

        let gray = prepare_for_ocr(&img, None);
        assert_eq!(gray.dimensions(), (7, 4));
        assert_eq!(gray.get_pixel(0, 0)[0], 255);

        let binary = prepare_for_ocr(&img, Some(128));
        assert_eq!(binary.get_pixel(6, 3)[0], 255);
    }
}
