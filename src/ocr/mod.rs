pub mod engine;
pub mod preprocess;
pub mod setup;

pub use engine::{CancelToken, Recognizer, TesseractRecognizer};
pub use preprocess::prepare_for_ocr;
pub use setup::ensure_tesseract;

use image::{ImageBuffer, Rgba};
use std::time::Instant;

use crate::error::Result;

/// Turns one cropped region into text.
///
/// Takes ownership of the raster so both it and the preprocessed copy are
/// released once recognition returns, whether it succeeded or not.
pub fn read_region<R: Recognizer + ?Sized>(
    recognizer: &R,
    raster: ImageBuffer<Rgba<u8>, Vec<u8>>,
    region: &str,
    threshold: Option<u8>,
    cancel: &CancelToken,
) -> Result<String> {
    let (w, h) = raster.dimensions();
    let prepared = prepare_for_ocr(&raster, threshold);
    drop(raster);

    let started = Instant::now();
    let result = recognizer.recognize(&prepared, region, cancel);
    drop(prepared);

    match &result {
        Ok(text) => crate::log(&format!(
            "OCR {}: {}x{} -> {} lines in {:.2?}",
            region,
            w,
            h,
            text.lines().count(),
            started.elapsed()
        )),
        Err(e) => crate::log(&format!("OCR {} failed after {:.2?}: {}", region, started.elapsed(), e)),
    }

    result
}
