use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Command};
use simplayer::{
    DataPaths,
    LoadOptions,
    OrderPolicy,
    PlayerSummary,
    RecommendationIndex,
    error,
    http,
    mcp,
    output,
    validate::{self, Checked},
};

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("SIMPLAYER_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Command::Completions(args) = &cli.command {
        args.generate();
        return Ok(());
    }

    let paths = DataPaths::resolve(
        cli.data_dir.as_deref(),
        cli.career_file.as_deref(),
        cli.season_file.as_deref(),
        cli.stats_file.as_deref(),
    )?;
    let options = LoadOptions {
        order: if cli.strict_order {
            OrderPolicy::Strict
        } else {
            OrderPolicy::Trust
        },
    };

    let index = RecommendationIndex::load(&paths, options).inspect_err(|e| {
        tracing::error!(error = %e, "failed to load recommendation data");
    })?;

    match cli.command {
        Command::Serve(args) => {
            http::run_http(index, &args.bind, args.allow_origins)?;
        }
        Command::Mcp => {
            mcp::run_mcp(index)?;
        }
        Command::Search(args) => {
            let query = validate::validate_query(&args.query)?;
            print_players(&index.search_players(query), args.json)?;
        }
        Command::Career(args) => {
            let mut results = match validate::validate_player_id(args.player_id)? {
                Checked::Known(id) => index.career_recommendations(id),
                Checked::OutOfRange => Vec::new(),
            };
            if let Some(count) = args.count {
                results.truncate(count);
            }
            print_players(&results, args.json)?;
        }
        Command::Season(args) => {
            let mut results = match validate::validate_player_season(
                args.player_id,
                args.season,
            )? {
                Checked::Known((id, season)) => {
                    index.season_recommendations(id, season)
                }
                Checked::OutOfRange => Vec::new(),
            };
            if let Some(count) = args.count {
                results.truncate(count);
            }
            print_players(&results, args.json)?;
        }
        Command::Seasons(args) => {
            let seasons = match validate::validate_player_id(args.player_id)? {
                Checked::Known(id) => index.seasons_for_player(id),
                Checked::OutOfRange => Vec::new(),
            };
            if args.json {
                println!("{}", output::to_json(&seasons)?);
            } else {
                print!("{}", output::format_seasons(args.player_id, &seasons));
            }
        }
        Command::Status(args) => {
            cmd_status(&paths, &index, args.json)?;
        }
        Command::Completions(_) => {}
    }

    Ok(())
}

fn print_players(players: &[PlayerSummary], json: bool) -> error::Result<()> {
    if json {
        println!("{}", output::to_json(players)?);
    } else {
        print!("{}", output::format_players(players));
    }
    Ok(())
}

fn cmd_status(
    paths: &DataPaths,
    index: &RecommendationIndex,
    json: bool,
) -> error::Result<()> {
    if json {
        let status = output::StatusJson::new(paths, index);
        println!("{}", output::to_json(&status)?);
    } else {
        print!("{}", output::format_status(paths, index));
    }
    Ok(())
}
