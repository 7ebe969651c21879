mod config;
mod ledger;
mod logging;
mod output;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use fafmats_core::{
    EloConfig, MatchResult, Outcome, PlayerDirectory, TablePairingAction, TablePairingOutcome,
    compute_match_rating_delta, compute_round_pairing, handle_table_pairing, seriate_players,
};
use std::path::{Path, PathBuf};

use crate::ledger::{Ledger, SortMethod};

pub fn bail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

#[derive(Parser)]
#[command(name = "fafmats", version, about = "Track club ratings and pair players into drafts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Club file (default: from config, or club.json next to it)
    #[arg(long, global = true)]
    club: Option<PathBuf>,

    /// Path to config file (default: ~/.config/fafmats/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Create a default config file
    Init,
    /// Add a player at the starting rating
    AddPlayer { name: String },
    /// List players
    Players {
        /// Sort order: name, name-desc, rating, rating-desc, joined, joined-desc
        /// (or the short forms a, A, e, E, d, D)
        #[arg(long, value_enum, default_value = "name")]
        sort: SortMethod,
    },
    /// Record a match result relative to the first player
    AddMatch {
        player_a: String,
        player_b: String,
        /// One of 2:0, 2:1, 1:2, 0:2, draw, forfeit
        result: String,
        /// Show the rating change without saving it
        #[arg(long)]
        dry_run: bool,
    },
    /// List matches, optionally from one player's side
    Matches {
        #[arg(long)]
        player: Option<String>,
    },
    /// A player's rating after each match
    History { player: String },
    /// Register a new draft by name
    AddDraft { name: String },
    /// Show a draft's tables and stored round pairings
    Draft { name: String },
    /// Split players into draft tables
    Pair(PairArgs),
    /// Pair players at one table for a round
    Round(RoundArgs),
    /// Rating change for player A, computed from two ratings
    Delta {
        #[arg(allow_negative_numbers = true)]
        rating_a: f64,
        #[arg(allow_negative_numbers = true)]
        rating_b: f64,
        result: String,
    },
}

#[derive(Parser)]
struct PairArgs {
    /// Player name (repeatable). Default: the whole club
    #[arg(long = "player")]
    players: Vec<String>,

    /// Table sizes, e.g. 4,4,3. Default: one table with everybody
    #[arg(long, value_delimiter = ',')]
    tables: Vec<usize>,

    /// Store the tables on this draft
    #[arg(long)]
    draft: Option<String>,

    /// 1.0 = pair by closest skill, 0.0 = pair by fewest past matches
    #[arg(long)]
    ratio: Option<f64>,

    /// Don't pair automatically; seat players by hand
    #[arg(long)]
    decline: bool,

    /// Also print the seriated affinity matrix
    #[arg(long, conflicts_with = "json")]
    show_matrix: bool,

    /// Output JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct RoundArgs {
    /// Player name (repeatable). Default: the draft table's seating, or the whole club
    #[arg(long = "player")]
    players: Vec<String>,

    /// Store the pairings on this draft
    #[arg(long)]
    draft: Option<String>,

    /// Table within the draft, starting at 1
    #[arg(long, default_value_t = 1)]
    table: usize,

    /// Round number within the draft, starting at 1
    #[arg(long, default_value_t = 1)]
    round: u32,

    #[arg(long)]
    ratio: Option<f64>,

    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        bail(format!("{e:#}"));
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(config::config_path);

    if let Commands::Init = cli.command {
        config::create_default_config(&config_path);
        println!("Created config at {}", config_path.display());
        println!("Edit it to set your club file, rating constants, etc.");
        return Ok(());
    }

    // Load config file, merge with CLI args (CLI wins)
    let cfg = config::load_config(&config_path);
    let elo = cfg.elo();
    let club_path = cli.club.clone().unwrap_or_else(|| cfg.club_path(&config_path));
    let mut ledger = Ledger::load(&club_path)?;
    tracing::debug!(club = %club_path.display(), players = ledger.players.len(), "loaded club");

    match cli.command {
        Commands::Init => unreachable!("handled above"),
        Commands::AddPlayer { name } => {
            ledger.add_player(&name, &elo, Utc::now())?;
            ledger.save(&club_path)?;
        }
        Commands::Players { sort } => {
            output::print_players(&ledger.players_sorted(sort));
        }
        Commands::AddMatch { player_a, player_b, result, dry_run } => {
            add_match(&mut ledger, &club_path, &elo, &player_a, &player_b, &result, dry_run)?;
        }
        Commands::Matches { player } => {
            let id = match player {
                Some(name) => Some(player_id(&ledger, &name)?),
                None => None,
            };
            output::print_matches(&ledger, &ledger.matches_for(id));
        }
        Commands::History { player } => {
            let id = player_id(&ledger, &player)?;
            output::print_history(&ledger, &ledger.history_for(id));
        }
        Commands::AddDraft { name } => {
            ledger.add_draft(&name, Utc::now())?;
            ledger.save(&club_path)?;
        }
        Commands::Draft { name } => {
            let draft = ledger
                .draft_by_name(&name)
                .with_context(|| format!("Draft \"{}\" does not exist", name.trim()))?;
            output::print_draft_record(&ledger, draft);
        }
        Commands::Pair(args) => {
            let ratio = args.ratio.unwrap_or_else(|| cfg.fun_friendship_ratio());
            pair(&mut ledger, &club_path, args, ratio)?;
        }
        Commands::Round(args) => {
            let ratio = args.ratio.unwrap_or_else(|| cfg.fun_friendship_ratio());
            round(&mut ledger, &club_path, args, ratio)?;
        }
        Commands::Delta { rating_a, rating_b, result } => {
            let outcome: Outcome = result.parse()?;
            let delta = compute_match_rating_delta(rating_a, rating_b, outcome, &elo);
            println!("{delta:.2}");
        }
    }

    Ok(())
}

fn player_id(ledger: &Ledger, name: &str) -> Result<i64> {
    ledger
        .player_by_name(name.trim())
        .map(|p| p.id)
        .with_context(|| format!("Did not find player \"{name}\""))
}

/// Named players, or the whole club when no names are given.
fn selected_players(ledger: &Ledger, names: &[String]) -> Result<Vec<i64>> {
    if names.is_empty() {
        Ok(ledger.directory().list_players(&[]))
    } else {
        ledger.resolve_names(names)
    }
}

fn add_match(
    ledger: &mut Ledger,
    club_path: &Path,
    elo: &EloConfig,
    player_a: &str,
    player_b: &str,
    result: &str,
    dry_run: bool,
) -> Result<()> {
    let outcome: Outcome = result.parse()?;
    let a = player_id(ledger, player_a)?;
    let b = player_id(ledger, player_b)?;
    let result = MatchResult::new(a, b, outcome);

    if dry_run {
        let change = ledger.preview_match(result, elo)?;
        output::print_rating_change(ledger, &change);
        tracing::info!("dry run, nothing saved");
        return Ok(());
    }

    let change = ledger.record_match(result, elo, Utc::now())?;
    ledger.save(club_path)?;
    output::print_rating_change(ledger, &change);
    Ok(())
}

fn pair(ledger: &mut Ledger, club_path: &Path, args: PairArgs, ratio: f64) -> Result<()> {
    if let Some(name) = &args.draft {
        ledger.draft_by_name(name).with_context(|| format!("Draft \"{}\" does not exist", name.trim()))?;
    }
    let ids = selected_players(ledger, &args.players)?;
    let directory = ledger.directory();

    let action = if args.decline {
        TablePairingAction::Decline
    } else if args.tables.is_empty() {
        TablePairingAction::Autopair { table_sizes: vec![ids.len()] }
    } else {
        TablePairingAction::Autopair { table_sizes: args.tables.clone() }
    };

    if args.show_matrix {
        let seriated = seriate_players(&ids, &directory, ratio)?;
        output::print_matrix(ledger, &seriated);
        println!();
    }

    let grouping = match handle_table_pairing(&action, &ids, &directory, ratio)? {
        TablePairingOutcome::Paired(grouping) => grouping,
        TablePairingOutcome::Declined => {
            tracing::info!(players = ids.len(), "autopairing declined, seat players manually");
            return Ok(());
        }
    };

    if args.json {
        output::print_draft_json(ledger, &grouping);
    } else {
        output::print_draft(ledger, &grouping);
    }

    if let Some(name) = &args.draft {
        ledger.set_draft_tables(name, &grouping)?;
        ledger.save(club_path)?;
    }
    Ok(())
}

fn round(ledger: &mut Ledger, club_path: &Path, args: RoundArgs, ratio: f64) -> Result<()> {
    let seated = match &args.draft {
        Some(name) if args.players.is_empty() => ledger.table_players(name, args.table)?,
        Some(name) => {
            ledger.draft_by_name(name).with_context(|| format!("Draft \"{}\" does not exist", name.trim()))?;
            None
        }
        None => None,
    };
    let ids = match seated {
        Some(ids) => ids,
        None => selected_players(ledger, &args.players)?,
    };

    let pairing = compute_round_pairing(args.round, &ids, &ledger.directory(), ratio)?;
    if args.json {
        output::print_round_json(ledger, &pairing);
    } else {
        output::print_round(ledger, &pairing);
    }

    if let Some(name) = &args.draft {
        ledger.record_round(name, args.round, args.table, &pairing)?;
        ledger.save(club_path)?;
    }
    Ok(())
}
