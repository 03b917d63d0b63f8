//! Extracted card record types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name used when the header yields no name/year line.
pub const UNKNOWN_PLAYER: &str = "Unknown Player";

/// Everything read off one card. Only `player_name` is guaranteed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedCardRecord {
    pub player_name: String,
    pub year: Option<String>,
    pub balance: Option<String>,
    pub steal_rating: Option<String>,
    pub run_rating: Option<String>,
    pub bunting: Option<String>,
    pub hit_and_run: Option<String>,
    /// Keyed by uppercased position code
    pub defense: Option<DefenseMap>,
    pub hitting: Option<SplitChart>,
    pub pitching: Option<PitchingChart>,
}

pub type DefenseMap = BTreeMap<String, DefenseRating>;

/// Fielding rating for one position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefenseRating {
    pub range: i32,
    pub error: i32,
    pub arm: Option<i32>,
    /// Catcher throwing rating, e.g. "T-1"
    pub throwing: Option<String>,
}

/// Result tokens against left-handed opponents (card columns 1–3).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeftColumns {
    pub column1: Vec<String>,
    pub column2: Vec<String>,
    pub column3: Vec<String>,
}

/// Result tokens against right-handed opponents (card columns 4–6).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RightColumns {
    pub column4: Vec<String>,
    pub column5: Vec<String>,
    pub column6: Vec<String>,
}

/// A card's two result tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitChart {
    pub vs_lefty: LeftColumns,
    pub vs_righty: RightColumns,
}

impl LeftColumns {
    pub fn is_empty(&self) -> bool {
        self.column1.is_empty() && self.column2.is_empty() && self.column3.is_empty()
    }

    pub(crate) fn column_mut(&mut self, idx: usize) -> &mut Vec<String> {
        match idx % 3 {
            0 => &mut self.column1,
            1 => &mut self.column2,
            _ => &mut self.column3,
        }
    }
}

impl RightColumns {
    pub fn is_empty(&self) -> bool {
        self.column4.is_empty() && self.column5.is_empty() && self.column6.is_empty()
    }

    pub(crate) fn column_mut(&mut self, idx: usize) -> &mut Vec<String> {
        match idx % 3 {
            0 => &mut self.column4,
            1 => &mut self.column5,
            _ => &mut self.column6,
        }
    }
}

impl SplitChart {
    pub fn is_empty(&self) -> bool {
        self.vs_lefty.is_empty() && self.vs_righty.is_empty()
    }
}

/// Pitcher chart: the split tables plus the endurance code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PitchingChart {
    #[serde(flatten)]
    pub chart: SplitChart,
    /// "S#", "R#" or "C#"
    pub endurance: Option<String>,
}
