//! Streaming reader for the flat per-season statistics table.
//!
//! The table has a header row with the identity columns `playerid`,
//! `player`, `season` and `team`. Every other column is a stat whose name is
//! the header text; the stat set is open-ended and varies between dataset
//! revisions.
//!
//! Fields are decoded as UTF-8 with invalid bytes replaced by U+FFFD.

use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use csv::{ByteRecord, StringRecord};
use serde::Serialize;

use crate::{
    error::{Error, Result},
    player::{PlayerId, Season, StatMap},
};

pub const PLAYER_ID_COLUMN: &str = "playerid";
pub const NAME_COLUMN: &str = "player";
pub const SEASON_COLUMN: &str = "season";
pub const TEAM_COLUMN: &str = "team";

const IDENTITY_COLUMNS: [&str; 4] =
    [NAME_COLUMN, TEAM_COLUMN, SEASON_COLUMN, PLAYER_ID_COLUMN];

/// One accepted row of the table.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonRow {
    pub player_id: PlayerId,
    pub season: Season,
    pub name: String,
    pub team: Option<String>,
    pub stats: StatMap,
    /// Stat fields dropped because they were blank or not a finite number.
    pub rejected_fields: usize,
}

/// Why a row was left out of the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    InvalidPlayerId,
    InvalidSeason,
    BlankName,
}

pub type RowOutcome = std::result::Result<SeasonRow, SkipReason>;

/// Counters collected while folding the table into the index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    pub rows: usize,
    pub accepted: usize,
    pub skipped_player_id: usize,
    pub skipped_season: usize,
    pub skipped_name: usize,
    pub rejected_stat_fields: usize,
    pub duplicate_seasons: usize,
}

impl LoadReport {
    pub fn record(&mut self, outcome: &RowOutcome) {
        self.rows += 1;
        match outcome {
            Ok(row) => {
                self.accepted += 1;
                self.rejected_stat_fields += row.rejected_fields;
            }
            Err(SkipReason::InvalidPlayerId) => self.skipped_player_id += 1,
            Err(SkipReason::InvalidSeason) => self.skipped_season += 1,
            Err(SkipReason::BlankName) => self.skipped_name += 1,
        }
    }

    pub fn skipped(&self) -> usize {
        self.skipped_player_id + self.skipped_season + self.skipped_name
    }
}

/// Header positions resolved once per file.
#[derive(Debug, Clone)]
struct Columns {
    player_id: usize,
    name: usize,
    season: usize,
    team: usize,
    stats: Vec<(usize, String)>,
}

impl Columns {
    fn from_headers(headers: &StringRecord, path: &Path) -> Result<Self> {
        let find = |column: &'static str| {
            headers.iter().position(|h| h == column).ok_or_else(|| {
                Error::MissingColumn {
                    path: path.to_path_buf(),
                    column,
                }
            })
        };

        let stats = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !IDENTITY_COLUMNS.contains(h))
            .map(|(idx, h)| (idx, h.to_string()))
            .collect();

        Ok(Self {
            player_id: find(PLAYER_ID_COLUMN)?,
            name: find(NAME_COLUMN)?,
            season: find(SEASON_COLUMN)?,
            team: find(TEAM_COLUMN)?,
            stats,
        })
    }

    fn parse(&self, record: &ByteRecord) -> RowOutcome {
        let field = |idx: usize| {
            String::from_utf8_lossy(record.get(idx).unwrap_or_default())
        };

        let player_id = parse_positive(field(self.player_id).trim())
            .ok_or(SkipReason::InvalidPlayerId)?;
        let season = parse_positive(field(self.season).trim())
            .ok_or(SkipReason::InvalidSeason)?;
        let name = field(self.name);
        let name = name.trim();
        if name.is_empty() {
            return Err(SkipReason::BlankName);
        }
        let team = field(self.team);
        let team = Some(team.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        let mut stats = StatMap::new();
        let mut rejected_fields = 0;
        for (idx, stat) in &self.stats {
            match parse_stat(field(*idx).trim()) {
                Some(value) => {
                    stats.insert(stat.clone(), value);
                }
                None => rejected_fields += 1,
            }
        }

        Ok(SeasonRow {
            player_id,
            season,
            name: name.to_string(),
            team,
            stats,
            rejected_fields,
        })
    }
}

fn parse_positive(raw: &str) -> Option<u32> {
    raw.parse::<u32>().ok().filter(|v| *v > 0)
}

fn parse_stat(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Row-by-row reader over a stats table.
///
/// Yields `Err` only for file-level failures (I/O, broken encoding). Rows
/// that cannot be used come back as `Ok(Err(SkipReason))`.
pub struct StatsTable<R> {
    reader: csv::Reader<R>,
    columns: Columns,
    path: PathBuf,
    record: ByteRecord,
}

impl StatsTable<File> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, path)
    }
}

impl<R: Read> StatsTable<R> {
    /// Wrap a reader. `path` is only used in errors.
    pub fn from_reader(reader: R, path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = reader.byte_headers().map_err(|source| Error::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let headers = StringRecord::from_byte_record_lossy(headers.clone());
        let columns = Columns::from_headers(&headers, path)?;

        Ok(Self {
            reader,
            columns,
            path: path.to_path_buf(),
            record: ByteRecord::new(),
        })
    }

    /// Names of the stat columns, in header order.
    pub fn stat_columns(&self) -> impl Iterator<Item = &str> {
        self.columns.stats.iter().map(|(_, name)| name.as_str())
    }
}

impl<R: Read> Iterator for StatsTable<R> {
    type Item = Result<RowOutcome>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_byte_record(&mut self.record) {
            Ok(true) => Some(Ok(self.columns.parse(&self.record))),
            Ok(false) => None,
            Err(source) => Some(Err(Error::Csv {
                path: self.path.clone(),
                source,
            })),
        }
    }
}
