//! Card Scan
//!
//! Reads a photographed or scanned tabletop-baseball player card and
//! extracts its gameplay ratings: name and year, balance, speed and bunting
//! grades, defensive ratings, split result charts and pitcher endurance.

pub mod config;
pub mod decode;
pub mod error;
pub mod ocr;
pub mod paths;
pub mod pipeline;
pub mod record;
pub mod segment;

pub use error::{CardError, Result};
pub use pipeline::{assemble, CardExtractor, ImageSource};
pub use record::ExtractedCardRecord;

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;

/// Name of the log file under the logs directory.
pub const LOG_FILE_NAME: &str = "card_scan.log";

/// Logs a message to both stderr and log file with timestamp.
///
/// Stdout is reserved for extracted records.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    eprint!("{}", line);
    let log_path = paths::get_logs_dir().join(LOG_FILE_NAME);
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        let _ = file.write_all(line.as_bytes());
    }
}
