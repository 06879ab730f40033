//! The in-memory recommendation index.
//!
//! Built once from the three source artifacts and read-only afterwards, so a
//! single instance can be shared across request handlers behind an `Arc`
//! without locking.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::{
    data_dir::DataPaths,
    error::Result,
    player::{
        PlayerId,
        PlayerRecord,
        PlayerSummary,
        Season,
        SeasonKey,
        SeasonSummary,
        StatMap,
        years_range,
    },
    similarity::{
        CareerMatch,
        OrderPolicy,
        SeasonMatch,
        SimilarityTable,
        season_key,
    },
    stats_table::{LoadReport, RowOutcome, StatsTable},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    pub order: OrderPolicy,
}

#[derive(Debug)]
pub struct RecommendationIndex {
    career: SimilarityTable<CareerMatch>,
    season: SimilarityTable<SeasonMatch>,
    players: HashMap<PlayerId, PlayerRecord>,
    /// Player ids in the order they first appeared in the stats table.
    encounter: Vec<PlayerId>,
    seasons: HashMap<PlayerId, Vec<Season>>,
    teams: HashMap<PlayerId, Vec<String>>,
    season_teams: HashMap<SeasonKey, String>,
    season_stats: HashMap<SeasonKey, StatMap>,
    career_stats: HashMap<PlayerId, StatMap>,
    report: LoadReport,
}

impl RecommendationIndex {
    /// Load all three artifacts and build the derived lookups.
    ///
    /// Any file-level failure aborts the whole load; there is no partially
    /// built index.
    pub fn load(paths: &DataPaths, options: LoadOptions) -> Result<Self> {
        let career = SimilarityTable::load(&paths.career, options.order)?;
        let season = SimilarityTable::load(&paths.season, options.order)?;

        let table = StatsTable::open(&paths.stats)?;
        debug!(
            path = %paths.stats.display(),
            stat_columns = table.stat_columns().count(),
            "reading stats table"
        );

        let mut builder = IndexBuilder::default();
        for outcome in table {
            builder.push(outcome?);
        }
        let index = builder.finish(career, season);

        let report = index.report();
        debug!(
            path = %paths.stats.display(),
            rows = report.rows,
            accepted = report.accepted,
            "loaded stats table"
        );
        if report.skipped() > 0 {
            info!(
                skipped_player_id = report.skipped_player_id,
                skipped_season = report.skipped_season,
                skipped_name = report.skipped_name,
                "skipped malformed stats rows"
            );
        }
        if report.rejected_stat_fields > 0 {
            debug!(
                fields = report.rejected_stat_fields,
                "dropped unparseable stat values"
            );
        }
        if report.duplicate_seasons > 0 {
            warn!(
                duplicates = report.duplicate_seasons,
                "duplicate player seasons in stats table; last row wins"
            );
        }
        info!(
            players = index.player_count(),
            seasons = index.season_count(),
            career_lists = index.career.len(),
            season_lists = index.season.len(),
            "recommendation index ready"
        );

        Ok(index)
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&PlayerRecord> {
        self.players.get(&player_id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Number of distinct (player, season) pairs.
    pub fn season_count(&self) -> usize {
        self.season_stats.len()
    }

    pub fn career_list_count(&self) -> usize {
        self.career.len()
    }

    pub fn season_list_count(&self) -> usize {
        self.season.len()
    }

    /// Career lists kept in stored order although their scores were not
    /// descending.
    pub fn unordered_career_lists(&self) -> usize {
        self.career.unordered()
    }

    pub fn unordered_season_lists(&self) -> usize {
        self.season.unordered()
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn career_stats(&self, player_id: PlayerId) -> Option<&StatMap> {
        self.career_stats.get(&player_id)
    }

    /// Players whose name contains `query`, ignoring case, sorted by name
    /// ignoring case.
    ///
    /// Players sharing a name keep the order they were first seen in.
    pub fn search_players(&self, query: &str) -> Vec<PlayerSummary> {
        let needle = query.to_lowercase();

        let mut matches: Vec<&PlayerRecord> = self
            .encounter
            .iter()
            .filter_map(|id| self.players.get(id))
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .collect();
        matches
            .sort_by_cached_key(|p| (p.name.to_lowercase(), p.name.clone()));

        matches
            .into_iter()
            .map(|p| self.career_summary(p, None))
            .collect()
    }

    /// Career-level matches for `player_id`, in stored order.
    pub fn career_recommendations(
        &self,
        player_id: PlayerId,
    ) -> Vec<PlayerSummary> {
        let Some(entries) = self.career.get(&player_id.to_string()) else {
            return Vec::new();
        };

        entries
            .iter()
            .filter_map(|entry| {
                let record = self.resolve(entry.player_id)?;
                Some(self.career_summary(record, Some(entry.score)))
            })
            .collect()
    }

    /// Season-level matches for one season of `player_id`, in stored order.
    ///
    /// Each result describes only the matched season: `years` holds that
    /// single year and the stats are that season's, not career averages.
    pub fn season_recommendations(
        &self,
        player_id: PlayerId,
        season: Season,
    ) -> Vec<PlayerSummary> {
        let Some(entries) = self.season.get(&season_key(player_id, season))
        else {
            return Vec::new();
        };

        entries
            .iter()
            .filter_map(|entry| {
                let record = self.resolve(entry.player_id)?;
                let key = Season::try_from(entry.season)
                    .ok()
                    .map(|season| SeasonKey::new(record.player_id, season));

                let team = match key {
                    Some(key) => self.team_for(key),
                    None => self.first_team(record.player_id),
                };
                let stats = key.and_then(|k| self.season_stats.get(&k)).cloned();

                Some(PlayerSummary {
                    player_id: record.player_id,
                    name: record.name.clone(),
                    years: entry.season.to_string(),
                    teams: Some(vec![team]),
                    career_stats: None,
                    season_stats: stats,
                    seasons: None,
                    similarity_score: Some(entry.score),
                })
            })
            .collect()
    }

    /// Known seasons for `player_id`, most recent first.
    pub fn seasons_for_player(&self, player_id: PlayerId) -> Vec<Season> {
        let mut seasons =
            self.seasons.get(&player_id).cloned().unwrap_or_default();
        seasons.sort_unstable_by(|a, b| b.cmp(a));
        seasons
    }

    fn resolve(&self, target: i64) -> Option<&PlayerRecord> {
        let id = PlayerId::try_from(target).ok()?;
        self.players.get(&id)
    }

    fn career_summary(
        &self,
        record: &PlayerRecord,
        score: Option<f64>,
    ) -> PlayerSummary {
        let id = record.player_id;
        let seasons = self
            .seasons
            .get(&id)
            .map(|years| {
                years
                    .iter()
                    .map(|&year| {
                        let key = SeasonKey::new(id, year);
                        SeasonSummary {
                            year,
                            team: self.team_for(key),
                            stats: self
                                .season_stats
                                .get(&key)
                                .cloned()
                                .unwrap_or_default(),
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        PlayerSummary {
            player_id: id,
            name: record.name.clone(),
            years: record.years_active.clone(),
            teams: Some(self.teams.get(&id).cloned().unwrap_or_default()),
            career_stats: Some(
                self.career_stats.get(&id).cloned().unwrap_or_default(),
            ),
            season_stats: None,
            seasons: Some(seasons),
            similarity_score: score,
        }
    }

    /// Team for an exact season, falling back to the first team the player
    /// was seen with, then to an empty string.
    fn team_for(&self, key: SeasonKey) -> String {
        match self.season_teams.get(&key) {
            Some(team) => team.clone(),
            None => self.first_team(key.player_id),
        }
    }

    fn first_team(&self, player_id: PlayerId) -> String {
        self.teams
            .get(&player_id)
            .and_then(|teams| teams.first())
            .cloned()
            .unwrap_or_default()
    }
}

/// Folds stats rows into the per-player lookups.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    players: HashMap<PlayerId, PlayerRecord>,
    encounter: Vec<PlayerId>,
    seasons: HashMap<PlayerId, Vec<Season>>,
    teams: HashMap<PlayerId, Vec<String>>,
    season_teams: HashMap<SeasonKey, String>,
    season_stats: HashMap<SeasonKey, StatMap>,
    report: LoadReport,
}

impl IndexBuilder {
    pub fn push(&mut self, outcome: RowOutcome) {
        self.report.record(&outcome);
        let Ok(row) = outcome else {
            return;
        };

        let id = row.player_id;
        let key = SeasonKey::new(id, row.season);

        let seasons = self.seasons.entry(id).or_default();
        if seasons.contains(&row.season) {
            self.report.duplicate_seasons += 1;
        } else {
            seasons.push(row.season);
        }

        let teams = self.teams.entry(id).or_default();
        if let Some(team) = &row.team
            && !teams.contains(team)
        {
            teams.push(team.clone());
        }

        if !self.players.contains_key(&id) {
            self.encounter.push(id);
            self.players.insert(id, PlayerRecord {
                player_id: id,
                name: row.name,
                years_active: String::new(),
            });
        }

        self.season_stats.insert(key, row.stats);
        if let Some(team) = row.team {
            self.season_teams.insert(key, team);
        }
    }

    pub fn finish(
        mut self,
        career: SimilarityTable<CareerMatch>,
        season: SimilarityTable<SeasonMatch>,
    ) -> RecommendationIndex {
        for (id, years) in &self.seasons {
            if let Some(record) = self.players.get_mut(id) {
                record.years_active = years_range(years);
            }
        }

        let career_stats = self
            .seasons
            .iter()
            .map(|(&id, years)| {
                let per_season = years.iter().filter_map(|&year| {
                    self.season_stats.get(&SeasonKey::new(id, year))
                });
                (id, average_stats(per_season))
            })
            .collect();

        RecommendationIndex {
            career,
            season,
            players: self.players,
            encounter: self.encounter,
            seasons: self.seasons,
            teams: self.teams,
            season_teams: self.season_teams,
            season_stats: self.season_stats,
            career_stats,
            report: self.report,
        }
    }
}

/// Mean of every stat over the seasons that define it. A season without a
/// stat counts toward neither the sum nor the divisor.
fn average_stats<'a>(seasons: impl Iterator<Item = &'a StatMap>) -> StatMap {
    let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();
    for stats in seasons {
        for (name, value) in stats {
            let slot = sums.entry(name.as_str()).or_insert((0.0, 0));
            slot.0 += value;
            slot.1 += 1;
        }
    }

    sums.into_iter()
        .map(|(name, (sum, count))| (name.to_string(), sum / count as f64))
        .collect()
}
