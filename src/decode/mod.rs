//! Field decoders.
//!
//! Each decoder is a pure function from recognized text to an optional
//! value. Decoders share no state, so any of them can run on any thread.

pub mod defense;
pub mod header;
pub mod ratings;
pub mod splits;

pub use defense::decode_defense;
pub use header::{decode_name_year, NameYear};
pub use ratings::{
    decode_balance, decode_bunting, decode_hit_and_run, decode_run, decode_steal,
};
pub use splits::{decode_endurance, decode_hitting, decode_pitching, ChartKind};

use regex::Regex;

/// Returns the first capture group of the first match, if any.
pub(crate) fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
