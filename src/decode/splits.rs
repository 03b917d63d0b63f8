//! Result-chart tokens for the hitting and pitching split tables.
//!
//! A line's tokens land in the left-handed table only if the line itself
//! carries a left-handed marker, otherwise in the right-handed table only
//! if it carries a right-handed marker. Lines with neither marker are
//! scanned but their tokens are dropped: the card text alone does not say
//! which column they belong to, and the caller is expected to confirm
//! charts with the user.

use lazy_static::lazy_static;
use regex::Regex;

use crate::record::{PitchingChart, SplitChart};

lazy_static! {
    /// Three alternatives, tried left to right at each position:
    /// a dice range followed by an outcome, a bare outcome word, or a
    /// shorthand marker (HR, TR, SI*, DO**).
    static ref RESULT_TOKEN: Regex = Regex::new(concat!(
        r"(?i)\b\d{1,2}-\d{1,2}\s*(?:",
        r"home\s?run|hbp|triple|double|single|walk|strikeout|lineout|popout|foulout",
        r"|gb\s?\([a-z0-9]{1,2}\)[abc]?|fly\s?\([a-z0-9]{1,2}\)[abc]?",
        r"|HR|TR|SI\**|DO\**)",
        r"|\b(?:",
        r"home\s?run|hbp|triple|double|single|walk|strikeout|lineout|popout|foulout",
        r"|gb\s?\([a-z0-9]{1,2}\)[abc]?|fly\s?\([a-z0-9]{1,2}\)[abc]?)",
        r"|(?-i:\b(?:HR|TR|SI|DO)(?:\*{1,2}|\b))",
    ))
    .unwrap();
    static ref ENDURANCE: Regex = Regex::new(r"\b([SRC]\d{1,2})\b").unwrap();
}

/// Which card the split tables come from; selects the handedness markers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartKind {
    /// Batter card: results against left/right-handed pitchers
    Hitting,
    /// Pitcher card: results against left/right-handed batters
    Pitching,
}

impl ChartKind {
    fn left_markers(self) -> &'static [&'static str] {
        match self {
            ChartKind::Hitting => &["lhp", "left"],
            ChartKind::Pitching => &["lhb", "left"],
        }
    }

    fn right_markers(self) -> &'static [&'static str] {
        match self {
            ChartKind::Hitting => &["rhp", "right"],
            ChartKind::Pitching => &["rhb", "right"],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

fn line_side(line: &str, kind: ChartKind) -> Option<Side> {
    let lower = line.to_lowercase();
    if kind.left_markers().iter().any(|m| lower.contains(m)) {
        Some(Side::Left)
    } else if kind.right_markers().iter().any(|m| lower.contains(m)) {
        Some(Side::Right)
    } else {
        None
    }
}

/// Raw result tokens on one line, in reading order.
pub fn line_tokens(line: &str) -> Vec<String> {
    RESULT_TOKEN
        .find_iter(line)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Folds every marked line of `text` into a split chart.
///
/// Within a table, a line's tokens fill the three columns left to right,
/// wrapping to the first column after the third.
///
/// This column order is provisional: the card editor that consumes the
/// chart has not confirmed how printed columns map to `column1..column6`,
/// so callers should treat per-column placement as a best guess until it
/// does.
pub fn decode_split_chart(text: &str, kind: ChartKind) -> SplitChart {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .fold(SplitChart::default(), |mut chart, line| {
            let tokens = line_tokens(line);
            match line_side(line, kind) {
                Some(Side::Left) => {
                    for (idx, token) in tokens.into_iter().enumerate() {
                        chart.vs_lefty.column_mut(idx).push(token);
                    }
                }
                Some(Side::Right) => {
                    for (idx, token) in tokens.into_iter().enumerate() {
                        chart.vs_righty.column_mut(idx).push(token);
                    }
                }
                None => {}
            }
            chart
        })
}

/// Hitting chart, or None when no marked line carried a result.
pub fn decode_hitting(body_text: &str) -> Option<SplitChart> {
    let chart = decode_split_chart(body_text, ChartKind::Hitting);
    if chart.is_empty() { None } else { Some(chart) }
}

/// First endurance code ("S#", "R#" or "C#") anywhere in the text.
pub fn decode_endurance(body_text: &str) -> Option<String> {
    super::first_capture(&ENDURANCE, body_text)
}

/// Pitching chart plus endurance, or None when neither was found.
pub fn decode_pitching(body_text: &str) -> Option<PitchingChart> {
    let chart = decode_split_chart(body_text, ChartKind::Pitching);
    let endurance = decode_endurance(body_text);
    if chart.is_empty() && endurance.is_none() {
        return None;
    }
    Some(PitchingChart { chart, endurance })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_tokens_alternatives() {
        let tokens = line_tokens("1-5 SINGLE strikeout HR gb(ss)A 6-20 fly(cf)B");
        assert_eq!(
            tokens,
            vec!["1-5 SINGLE", "strikeout", "HR", "gb(ss)A", "6-20 fly(cf)B"]
        );
    }

    #[test]
    fn test_shorthand_with_stars() {
        assert_eq!(line_tokens("SI** DO* TR"), vec!["SI**", "DO*", "TR"]);
    }

    #[test]
    fn test_shorthand_not_matched_inside_words() {
        assert!(line_tokens("SIDE DOOR HRS").is_empty());
    }

    #[test]
    fn test_left_marked_line_fills_left_columns() {
        let chart = decode_hitting("vs. LHP 1-5 single walk strikeout 2-8 HR").unwrap();
        assert_eq!(chart.vs_lefty.column1, vec!["1-5 single", "2-8 HR"]);
        assert_eq!(chart.vs_lefty.column2, vec!["walk"]);
        assert_eq!(chart.vs_lefty.column3, vec!["strikeout"]);
        assert!(chart.vs_righty.is_empty());
    }

    #[test]
    fn test_right_marked_line_fills_right_columns() {
        let chart = decode_hitting("vs RHP: double triple").unwrap();
        assert_eq!(chart.vs_righty.column4, vec!["double"]);
        assert_eq!(chart.vs_righty.column5, vec!["triple"]);
        assert!(chart.vs_righty.column6.is_empty());
        assert!(chart.vs_lefty.is_empty());
    }

    #[test]
    fn test_unmarked_line_contributes_nothing() {
        // Valid tokens, but no handedness marker on the line
        let text = "1-5 single walk strikeout\nvs. LHP homerun";
        let chart = decode_hitting(text).unwrap();
        assert_eq!(chart.vs_lefty.column1, vec!["homerun"]);
        assert!(chart.vs_lefty.column2.is_empty());
        assert!(chart.vs_righty.is_empty());

        assert_eq!(decode_hitting("1-5 single walk strikeout"), None);
    }

    #[test]
    fn test_left_marker_takes_precedence() {
        let chart = decode_hitting("left / right walk").unwrap();
        assert_eq!(chart.vs_lefty.column1, vec!["walk"]);
        assert!(chart.vs_righty.is_empty());
    }

    #[test]
    fn test_pitching_uses_batter_markers() {
        let text = "vs LHB strikeout\nvs RHB lineout";
        let pitching = decode_pitching(text).unwrap();
        assert_eq!(pitching.chart.vs_lefty.column1, vec!["strikeout"]);
        assert_eq!(pitching.chart.vs_righty.column4, vec!["lineout"]);
        assert_eq!(pitching.endurance, None);

        // LHP is a hitting marker, not a pitching one
        assert_eq!(decode_pitching("vs LHP strikeout"), None);
    }

    #[test]
    fn test_endurance_first_match_wins() {
        assert_eq!(decode_endurance("starter S6 relief R2").as_deref(), Some("S6"));
        assert_eq!(decode_endurance("closer C1").as_deref(), Some("C1"));
        assert_eq!(decode_endurance("c-1(-5)e1"), None);
    }

    #[test]
    fn test_pitching_with_only_endurance() {
        let pitching = decode_pitching("endurance R3").unwrap();
        assert!(pitching.chart.is_empty());
        assert_eq!(pitching.endurance.as_deref(), Some("R3"));
    }
}
