use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Debug, Parser)]
#[command(
    name = "simplayer",
    about = "Look up statistically similar players from precomputed tables"
)]
pub struct Cli {
    /// Directory holding the similarity tables and the stats table
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Career similarity table (default: <data-dir>/career_recommendations.json)
    #[arg(long, global = true)]
    pub career_file: Option<PathBuf>,

    /// Season similarity table (default: <data-dir>/season_recommendations.json)
    #[arg(long, global = true)]
    pub season_file: Option<PathBuf>,

    /// Per-season stats table (default: <data-dir>/player_dataset_CLEANED.csv)
    #[arg(long, global = true)]
    pub stats_file: Option<PathBuf>,

    /// Fail to load when a similarity list is not sorted by descending score
    #[arg(long, global = true)]
    pub strict_order: bool,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the HTTP API
    Serve(ServeArgs),
    /// Start MCP server for AI agent integration
    Mcp,
    /// Find players by name
    Search(SearchArgs),
    /// Players with the most similar careers
    Career(CareerArgs),
    /// Player-seasons most similar to one season
    Season(SeasonArgs),
    /// List the seasons recorded for a player
    Seasons(SeasonsArgs),
    /// Show data locations and load statistics
    Status(StatusArgs),
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Serve --

#[derive(Debug, Parser)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "SIMPLAYER_BIND", default_value = "127.0.0.1:8080")]
    pub bind: String,

    /// Browser origin allowed to call the API (repeatable, `*` for any)
    #[arg(
        long = "allow-origin",
        env = "SIMPLAYER_ALLOW_ORIGINS",
        value_delimiter = ','
    )]
    pub allow_origins: Vec<String>,
}

// -- Queries --

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// Part of the player's name
    pub query: String,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct CareerArgs {
    /// Player id
    pub player_id: i64,

    /// Number of results to return
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct SeasonArgs {
    /// Player id
    pub player_id: i64,

    /// Season year
    pub season: i64,

    /// Number of results to return
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct SeasonsArgs {
    /// Player id
    pub player_id: i64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Status --

#[derive(Debug, Parser)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "simplayer",
            &mut std::io::stdout(),
        );
    }
}
