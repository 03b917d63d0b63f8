use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Capitalized name tokens (comma or space separated) then "(YYYY)".
    static ref NAME_YEAR: Regex = Regex::new(
        r"([A-Z][A-Za-z.'\-]*(?:(?:,\s*|\s+)[A-Z][A-Za-z.'\-]*)*)\s*\((\d{4})\)"
    )
    .unwrap();
}

/// Player name and card year read from the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameYear {
    pub name: String,
    pub year: String,
}

/// Scans header lines top to bottom and returns the first name/year line.
///
/// First match wins; later lines are never consulted once one matches.
pub fn decode_name_year(header_text: &str) -> Option<NameYear> {
    header_text.lines().find_map(|line| {
        let caps = NAME_YEAR.captures(line)?;
        Some(NameYear {
            name: caps.get(1)?.as_str().trim().to_string(),
            year: caps.get(2)?.as_str().to_string(),
        })
    })
}
