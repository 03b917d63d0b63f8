//! Region segmentation for card images.
//!
//! Splits a card into a header slice (name and year) and a body slice
//! (ratings, defense, result charts) using relative-height rules.

use image::{ImageBuffer, Rgba};

use crate::error::{CardError, Result};

/// How tall a cropped region should be.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HeightSpec {
    /// Fraction of the image height (0.0–1.0)
    Fraction(f32),
    /// Fraction of the image height, but never more than `max_px` pixels
    Capped { fraction: f32, max_px: u32 },
}

impl HeightSpec {
    fn to_pixels(self, image_height: u32) -> u32 {
        match self {
            HeightSpec::Fraction(f) => scale(f, image_height),
            HeightSpec::Capped { fraction, max_px } => scale(fraction, image_height).min(max_px),
        }
    }
}

/// Fraction of a pixel length, rounded to the nearest pixel.
fn scale(fraction: f32, length: u32) -> u32 {
    (fraction.max(0.0) * length as f32).round() as u32
}

/// Relative layout of the two regions on a card.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionLayout {
    /// Header height as fraction of card height; also where the body starts
    pub header_fraction: f32,
    /// Absolute cap on header height
    pub header_max_px: u32,
    /// Body height as fraction of card height
    pub body_fraction: f32,
}

impl RegionLayout {
    pub fn header_spec(&self) -> HeightSpec {
        HeightSpec::Capped {
            fraction: self.header_fraction,
            max_px: self.header_max_px,
        }
    }

    pub fn body_spec(&self) -> HeightSpec {
        HeightSpec::Fraction(self.body_fraction)
    }
}

/// Crops a full-width horizontal slice from an image.
///
/// The slice starts at `start_fraction` of the image height and is clamped
/// to the image bounds. A slice with no pixels is a configuration error:
/// the image is too small to segment with this layout.
pub fn crop_region(
    img: &ImageBuffer<Rgba<u8>, Vec<u8>>,
    start_fraction: f32,
    height: HeightSpec,
) -> Result<ImageBuffer<Rgba<u8>, Vec<u8>>> {
    let (w, h) = img.dimensions();

    let y0 = scale(start_fraction, h).min(h);
    let rh = height.to_pixels(h).min(h - y0);

    if w == 0 || rh == 0 {
        return Err(CardError::Config(format!(
            "image too small to segment: {}x{} gives empty region at y={} ({:?})",
            w, h, y0, height
        )));
    }

    Ok(image::imageops::crop_imm(img, 0, y0, w, rh).to_image())
}

/// Crops the header region: top slice, capped height.
pub fn crop_header(
    img: &ImageBuffer<Rgba<u8>, Vec<u8>>,
    layout: &RegionLayout,
) -> Result<ImageBuffer<Rgba<u8>, Vec<u8>>> {
    crop_region(img, 0.0, layout.header_spec())
}

/// Crops the body region, starting at the header's fractional offset.
pub fn crop_body(
    img: &ImageBuffer<Rgba<u8>, Vec<u8>>,
    layout: &RegionLayout,
) -> Result<ImageBuffer<Rgba<u8>, Vec<u8>>> {
    crop_region(img, layout.header_fraction, layout.body_spec())
}
