//! Single-value ratings printed as "label value" pairs on the card body.
//!
//! Labels are matched case-insensitively and may be followed by a colon or
//! a dash. Grades themselves must be uppercase.

use lazy_static::lazy_static;
use regex::Regex;

use super::first_capture;

lazy_static! {
    static ref BALANCE: Regex = Regex::new(r"(?i:balance)\s*[:\-]?\s*(\d?[LRE])\b").unwrap();
    static ref STEAL: Regex =
        Regex::new(r"(?i:stealing)\s*[:\-]?\s*\(\*?([A-E]{1,3})\)").unwrap();
    static ref RUN: Regex = Regex::new(r"(?i:running)\s*[:\-]?\s*(\d-\d{1,2})\b").unwrap();
    static ref BUNTING: Regex = Regex::new(r"(?i:bunting)\s*[:\-]?\s*([A-D])\b").unwrap();
    static ref HIT_AND_RUN: Regex =
        Regex::new(r"(?i:hit\s*(?:&|and)\s*run)\s*[:\-]?\s*([A-D])\b").unwrap();
}

/// Balance code, e.g. "1R", "9L" or "E".
pub fn decode_balance(text: &str) -> Option<String> {
    first_capture(&BALANCE, text)
}

/// Stealing grade from "stealing-(B)".
pub fn decode_steal(text: &str) -> Option<String> {
    first_capture(&STEAL, text)
}

/// Running range from "running 1-11".
pub fn decode_run(text: &str) -> Option<String> {
    first_capture(&RUN, text)
}

pub fn decode_bunting(text: &str) -> Option<String> {
    first_capture(&BUNTING, text)
}

pub fn decode_hit_and_run(text: &str) -> Option<String> {
    first_capture(&HIT_AND_RUN, text)
}
