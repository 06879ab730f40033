use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const CAREER_FILE: &str = "career_recommendations.json";
pub const SEASON_FILE: &str = "season_recommendations.json";
pub const STATS_FILE: &str = "player_dataset_CLEANED.csv";

#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Resolve the data directory from, in order of priority:
    /// 1. An explicit path (from --data-dir)
    /// 2. The SIMPLAYER_DATA_DIR environment variable
    /// 3. The XDG data directory (~/.local/share/simplayer/)
    ///
    /// The directory must already exist; nothing is ever written to it.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let root = if let Some(path) = explicit {
            path.to_path_buf()
        } else if let Ok(val) = std::env::var("SIMPLAYER_DATA_DIR") {
            PathBuf::from(val)
        } else {
            xdg::BaseDirectories::with_prefix("simplayer")
                .get_data_home()
                .ok_or_else(|| {
                    Error::Config(
                        "could not determine XDG data home directory".into(),
                    )
                })?
        };

        if !root.is_dir() {
            return Err(Error::DataDir(root));
        }

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Artifact paths inside this directory, each replaceable by an
    /// explicit override.
    pub fn paths(
        &self,
        career: Option<&Path>,
        season: Option<&Path>,
        stats: Option<&Path>,
    ) -> DataPaths {
        let pick = |explicit: Option<&Path>, default: &str| {
            explicit
                .map(Path::to_path_buf)
                .unwrap_or_else(|| self.root.join(default))
        };

        DataPaths {
            career: pick(career, CAREER_FILE),
            season: pick(season, SEASON_FILE),
            stats: pick(stats, STATS_FILE),
        }
    }
}

/// Locations of the three source artifacts the index is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub career: PathBuf,
    pub season: PathBuf,
    pub stats: PathBuf,
}

impl DataPaths {
    /// Artifact paths from explicit overrides, falling back to the data
    /// directory. The data directory is only resolved (and only has to
    /// exist) when at least one artifact has no override.
    pub fn resolve(
        data_dir: Option<&Path>,
        career: Option<&Path>,
        season: Option<&Path>,
        stats: Option<&Path>,
    ) -> Result<Self> {
        if let (Some(career), Some(season), Some(stats)) = (career, season, stats)
        {
            return Ok(Self {
                career: career.to_path_buf(),
                season: season.to_path_buf(),
                stats: stats.to_path_buf(),
            });
        }

        Ok(DataDir::resolve(data_dir)?.paths(career, season, stats))
    }

    pub fn in_dir(root: &Path) -> Self {
        Self {
            career: root.join(CAREER_FILE),
            season: root.join(SEASON_FILE),
            stats: root.join(STATS_FILE),
        }
    }
}
