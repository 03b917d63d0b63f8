//! Extraction pipeline: image → regions → text → decoders → record.
//!
//! Header and body are recognized on two scoped threads and joined before
//! assembly. A failure in either region cancels the other through a child
//! of the caller's token, so the caller's token is never tripped by us;
//! the whole call then fails with no partial record.

use image::{ImageBuffer, Rgba};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;

use crate::config::ScanConfig;
use crate::decode;
use crate::error::{CardError, Result};
use crate::ocr::{read_region, CancelToken, Recognizer};
use crate::record::{ExtractedCardRecord, UNKNOWN_PLAYER};
use crate::segment::{crop_body, crop_header, RegionLayout};

/// Where the card image comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    Url(String),
}

impl ImageSource {
    /// Treats http(s) arguments as URLs and everything else as a file path.
    pub fn parse(arg: &str) -> Self {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            ImageSource::Url(arg.to_string())
        } else {
            ImageSource::Path(PathBuf::from(arg))
        }
    }

    /// Loads and decodes the image as RGBA.
    pub fn load(&self) -> Result<ImageBuffer<Rgba<u8>, Vec<u8>>> {
        match self {
            ImageSource::Path(path) => load_image_file(path),
            ImageSource::Url(url) => {
                crate::log(&format!("Fetching card image: {}", url));
                let client = reqwest::blocking::Client::builder()
                    .timeout(std::time::Duration::from_secs(60))
                    .build()?;
                let bytes = client
                    .get(url)
                    .header("User-Agent", "card-scan")
                    .send()?
                    .error_for_status()?
                    .bytes()?;
                Ok(image::load_from_memory(&bytes)?.to_rgba8())
            }
        }
    }
}

fn load_image_file(path: &Path) -> Result<ImageBuffer<Rgba<u8>, Vec<u8>>> {
    Ok(image::open(path)?.to_rgba8())
}

/// Recognized text of both regions, before decoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionTexts {
    pub header: String,
    pub body: String,
}

/// Merges every decoder's output into one record.
///
/// Decoders own disjoint fields, so this is a plain union. The only
/// default is the player name sentinel.
pub fn assemble(header_text: &str, body_text: &str) -> ExtractedCardRecord {
    let name_year = decode::decode_name_year(header_text);
    let (player_name, year) = match name_year {
        Some(ny) => (ny.name, Some(ny.year)),
        None => (UNKNOWN_PLAYER.to_string(), None),
    };

    ExtractedCardRecord {
        player_name,
        year,
        balance: decode::decode_balance(body_text),
        steal_rating: decode::decode_steal(body_text),
        run_rating: decode::decode_run(body_text),
        bunting: decode::decode_bunting(body_text),
        hit_and_run: decode::decode_hit_and_run(body_text),
        defense: decode::decode_defense(body_text),
        hitting: decode::decode_hitting(body_text),
        pitching: decode::decode_pitching(body_text),
    }
}

/// Runs the full pipeline with a given recognition engine.
pub struct CardExtractor<R: Recognizer> {
    recognizer: R,
    layout: RegionLayout,
    threshold: Option<u8>,
}

impl<R: Recognizer> CardExtractor<R> {
    pub fn new(recognizer: R, config: &ScanConfig) -> Self {
        Self {
            recognizer,
            layout: config.layout(),
            threshold: config.binarize_threshold,
        }
    }

    /// Segments the card and recognizes both regions concurrently.
    pub fn recognize_regions(
        &self,
        img: &ImageBuffer<Rgba<u8>, Vec<u8>>,
        cancel: &CancelToken,
    ) -> Result<RegionTexts> {
        let header_raster = crop_header(img, &self.layout)?;
        let body_raster = crop_body(img, &self.layout)?;

        // Cancelled by the caller's token or by a failing sibling region
        let siblings = cancel.child();
        let siblings = &siblings;

        let (header, body) = thread::scope(|s| {
            let header_task = s.spawn(|| {
                let result = read_region(&self.recognizer, header_raster, "header", self.threshold, siblings);
                if result.is_err() {
                    siblings.cancel();
                }
                result
            });
            let body_task = s.spawn(|| {
                let result = read_region(&self.recognizer, body_raster, "body", self.threshold, siblings);
                if result.is_err() {
                    siblings.cancel();
                }
                result
            });
            (join_region(header_task, "header"), join_region(body_task, "body"))
        });

        match (header, body) {
            (Ok(header), Ok(body)) => Ok(RegionTexts { header, body }),
            (Err(e), Ok(_)) | (Ok(_), Err(e)) => Err(e),
            (Err(header_err), Err(body_err)) => Err(first_real_error(header_err, body_err)),
        }
    }

    /// Extracts a record from an already-loaded image.
    pub fn extract(
        &self,
        img: &ImageBuffer<Rgba<u8>, Vec<u8>>,
        cancel: &CancelToken,
    ) -> Result<ExtractedCardRecord> {
        let started = Instant::now();
        let (w, h) = img.dimensions();
        crate::log(&format!("Extracting card {}x{}", w, h));

        let texts = self.recognize_regions(img, cancel)?;
        let record = assemble(&texts.header, &texts.body);

        crate::log(&format!(
            "Extracted '{}' ({} defense positions) in {:.2?}",
            record.player_name,
            record.defense.as_ref().map_or(0, |d| d.len()),
            started.elapsed()
        ));

        Ok(record)
    }

    /// Loads the image from `source`, then extracts.
    pub fn extract_source(
        &self,
        source: &ImageSource,
        cancel: &CancelToken,
    ) -> Result<ExtractedCardRecord> {
        let img = source.load()?;
        self.extract(&img, cancel)
    }
}

/// Picks the error to report when both regions failed.
///
/// A region stopped only because its sibling failed reports `Cancelled`;
/// the sibling's error is the real cause. Otherwise the header wins.
fn first_real_error(header: CardError, body: CardError) -> CardError {
    match (header, body) {
        (CardError::Cancelled, body) => body,
        (header, _) => header,
    }
}

/// A panicking region task is reported as a recognition failure.
fn join_region(
    handle: thread::ScopedJoinHandle<'_, Result<String>>,
    region: &str,
) -> Result<String> {
    handle
        .join()
        .unwrap_or_else(|_| Err(CardError::recognition(region, "recognition task panicked")))
}
