//! simplayer - similar-player lookups over precomputed similarity tables.
//!
//! The index joins two offline similarity tables (career-level and
//! season-level) with a per-season statistics table, and answers name
//! search, career recommendations, season recommendations and season
//! listings from memory. The same index backs the HTTP API, the MCP server
//! and the CLI.
//!
//! # Quick start
//!
//! ```no_run
//! use simplayer::{DataDir, LoadOptions, RecommendationIndex};
//!
//! let data_dir = DataDir::resolve(None).unwrap();
//! let paths = data_dir.paths(None, None, None);
//! let index = RecommendationIndex::load(&paths, LoadOptions::default()).unwrap();
//!
//! for player in index.search_players("smith") {
//!     println!("{} #{} ({})", player.name, player.player_id, player.years);
//! }
//!
//! for similar in index.career_recommendations(12) {
//!     println!("{} {:.3}", similar.name, similar.similarity_score.unwrap_or(0.0));
//! }
//! ```

pub mod data_dir;
pub mod error;
pub mod http;
pub mod index;
pub mod mcp;
pub mod output;
pub mod player;
pub mod similarity;
pub mod stats_table;
pub mod validate;

pub use data_dir::{DataDir, DataPaths};
pub use error::{Error, Result};
pub use index::{LoadOptions, RecommendationIndex};
pub use player::{PlayerId, PlayerSummary, Season, SeasonSummary};
pub use similarity::OrderPolicy;
