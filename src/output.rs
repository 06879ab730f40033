//! Terminal rendering for the query subcommands.

use std::fmt::Write as _;

use serde::Serialize;

use crate::{
    data_dir::DataPaths,
    error::Result,
    index::RecommendationIndex,
    player::{PlayerSummary, Season, StatMap},
    stats_table::LoadReport,
};

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// One block per player: rank, name, id, span and score, then teams and
/// stats on indented lines.
pub fn format_players(players: &[PlayerSummary]) -> String {
    if players.is_empty() {
        return "No players found.\n".to_string();
    }

    let mut out = String::new();
    for (rank, p) in players.iter().enumerate() {
        let _ = write!(
            out,
            "{:>3}. {} #{} ({})",
            rank + 1,
            p.name,
            p.player_id,
            p.years
        );
        if let Some(score) = p.similarity_score {
            let _ = write!(out, " [{score:.3}]");
        }
        out.push('\n');

        if let Some(teams) = p.teams.as_ref().filter(|t| !t.is_empty()) {
            let _ = writeln!(out, "     {}", teams.join(", "));
        }
        if let Some(stats) = p.career_stats.as_ref().or(p.season_stats.as_ref())
            && !stats.is_empty()
        {
            let _ = writeln!(out, "     {}", format_stats(stats));
        }
    }
    let _ = writeln!(out, "\n{} player(s)", players.len());
    out
}

pub fn format_seasons(player_id: i64, seasons: &[Season]) -> String {
    if seasons.is_empty() {
        return format!("No seasons recorded for player {player_id}.\n");
    }

    let mut out = String::new();
    for season in seasons {
        let _ = writeln!(out, "{season}");
    }
    out
}

pub fn format_status(paths: &DataPaths, index: &RecommendationIndex) -> String {
    let report = index.report();
    let mut out = String::new();
    let _ = writeln!(out, "Career table: {}", paths.career.display());
    let _ = writeln!(out, "Season table: {}", paths.season.display());
    let _ = writeln!(out, "Stats table: {}", paths.stats.display());
    let _ = writeln!(out, "Players: {}", index.player_count());
    let _ = writeln!(out, "Player seasons: {}", index.season_count());
    let _ = writeln!(out, "Career lists: {}", index.career_list_count());
    let _ = writeln!(out, "Season lists: {}", index.season_list_count());
    let unordered =
        index.unordered_career_lists() + index.unordered_season_lists();
    if unordered > 0 {
        let _ = writeln!(
            out,
            "  kept out of score order: {} career, {} season",
            index.unordered_career_lists(),
            index.unordered_season_lists()
        );
    }
    let _ = writeln!(
        out,
        "Rows: {} read, {} accepted, {} skipped",
        report.rows,
        report.accepted,
        report.skipped()
    );
    if report.skipped() > 0 {
        let _ = writeln!(
            out,
            "  bad player id: {}, bad season: {}, blank name: {}",
            report.skipped_player_id, report.skipped_season, report.skipped_name
        );
    }
    let _ = writeln!(out, "Dropped stat values: {}", report.rejected_stat_fields);
    let _ = writeln!(out, "Duplicate seasons: {}", report.duplicate_seasons);
    out
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusJson<'a> {
    career_file: String,
    season_file: String,
    stats_file: String,
    players: usize,
    player_seasons: usize,
    career_lists: usize,
    season_lists: usize,
    unordered_career_lists: usize,
    unordered_season_lists: usize,
    load: &'a LoadReport,
}

impl<'a> StatusJson<'a> {
    pub fn new(paths: &DataPaths, index: &'a RecommendationIndex) -> Self {
        Self {
            career_file: paths.career.display().to_string(),
            season_file: paths.season.display().to_string(),
            stats_file: paths.stats.display().to_string(),
            players: index.player_count(),
            player_seasons: index.season_count(),
            career_lists: index.career_list_count(),
            season_lists: index.season_list_count(),
            unordered_career_lists: index.unordered_career_lists(),
            unordered_season_lists: index.unordered_season_lists(),
            load: index.report(),
        }
    }
}

fn format_stats(stats: &StatMap) -> String {
    stats
        .iter()
        .map(|(name, value)| format!("{name} {value:.1}"))
        .collect::<Vec<_>>()
        .join("  ")
}
