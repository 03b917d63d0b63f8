//! Defensive ratings: "POS-R(±A)eE" tokens plus the catcher's "T-n" throwing.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::record::{DefenseMap, DefenseRating};

lazy_static! {
    /// Position code, range digit, optional signed arm, error number.
    static ref POSITION: Regex = Regex::new(
        r"(?i)\b(1b|2b|3b|ss|lf|cf|rf|of|c|p)-(\d)(?:\(([+-]?\d{1,2})\))?e(\d{1,2})\b"
    )
    .unwrap();
    static ref THROWING: Regex = Regex::new(r"\bT-(\d)\b").unwrap();
}

/// Position code of the only entry that can carry a throwing rating.
const CATCHER: &str = "C";

/// Builds one map entry from a position match.
///
/// Every numeric group is a `\d` class, so parsing only fails on overflow,
/// which the `{1,2}` bounds rule out; a failed parse drops the match anyway.
fn rating_from(caps: &Captures) -> Option<(String, DefenseRating)> {
    let position = caps.get(1)?.as_str().to_uppercase();
    let range = caps.get(2)?.as_str().parse().ok()?;
    let arm = match caps.get(3) {
        Some(m) => Some(m.as_str().parse().ok()?),
        None => None,
    };
    let error = caps.get(4)?.as_str().parse().ok()?;

    Some((
        position,
        DefenseRating {
            range,
            error,
            arm,
            throwing: None,
        },
    ))
}

/// Scans the whole body for defensive ratings.
///
/// Matches are folded into the map in text order, so when a position
/// appears twice the later rating replaces the earlier one. A `T-n` token
/// is attached to the catcher entry only if one exists; otherwise it is
/// dropped.
pub fn decode_defense(body_text: &str) -> Option<DefenseMap> {
    let mut map: DefenseMap = POSITION
        .captures_iter(body_text)
        .filter_map(|caps| rating_from(&caps))
        .fold(DefenseMap::new(), |mut acc, (position, rating)| {
            acc.insert(position, rating);
            acc
        });

    if let Some(throwing) = THROWING.find(body_text) {
        if let Some(catcher) = map.get_mut(CATCHER) {
            catcher.throwing = Some(throwing.as_str().to_string());
        }
    }

    if map.is_empty() { None } else { Some(map) }
}
