use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type PlayerId = u32;
pub type Season = u32;

/// Stat name to value, ordered by name.
pub type StatMap = BTreeMap<String, f64>;

/// Lookup key for everything recorded about one player in one season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeasonKey {
    pub player_id: PlayerId,
    pub season: Season,
}

impl SeasonKey {
    pub fn new(player_id: PlayerId, season: Season) -> Self {
        Self { player_id, season }
    }
}

/// Identity of a player as first seen in the stats table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRecord {
    pub player_id: PlayerId,
    pub name: String,
    pub years_active: String,
}

/// Format the inclusive span of `seasons` as `"{min}–{max}"`.
///
/// Returns an empty string when there are no seasons.
pub fn years_range(seasons: &[Season]) -> String {
    match (seasons.iter().min(), seasons.iter().max()) {
        (Some(min), Some(max)) => format!("{min}–{max}"),
        _ => String::new(),
    }
}

/// A player as returned by every query.
///
/// Which optional parts are filled depends on the query: search and career
/// recommendations carry career data and the season breakdown, season
/// recommendations carry a single season's team and stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    pub player_id: PlayerId,
    pub name: String,
    pub years: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teams: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub career_stats: Option<StatMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_stats: Option<StatMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasons: Option<Vec<SeasonSummary>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub year: Season,
    pub team: String,
    pub stats: StatMap,
}
