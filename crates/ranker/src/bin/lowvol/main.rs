mod output;

use std::{
    fs::{self, File},
    io::{self, BufWriter},
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::Context;
use clap::Parser;
use lowvol_ranker::{
    AdaptiveRanker, JsonLinesSink, RankerEnv, Session, StopReason, TextSink, session::parse_items,
};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(
    name = "lowvol",
    version,
    about = "Rank a handful of items by answering which of two you prefer"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Ask for comparisons on the terminal and update the ratings
    Session(SessionArgs),
    /// Print the ranking stored in a state file
    Show(ShowArgs),
}

#[derive(Parser)]
struct SessionArgs {
    /// File with one item per line, or a JSON array of strings
    #[arg(long)]
    items: PathBuf,

    /// Ranker state: restored when the file exists, saved after the session
    #[arg(long)]
    state: Option<PathBuf>,

    /// Write every comparison as an `id1 id2 score` line
    #[arg(long)]
    results: Option<PathBuf>,

    /// Write final ratings (tab separated, or JSON lines with --json)
    #[arg(long)]
    ratings: Option<PathBuf>,

    /// Output JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Stop after this many comparisons
    #[arg(long)]
    max: Option<usize>,

    /// Allow the last pair's members to be picked again right away
    #[arg(long)]
    no_avoid_twice: bool,
}

#[derive(Parser)]
struct ShowArgs {
    /// Ranker state written by `lowvol session --state`
    #[arg(long)]
    state: PathBuf,

    /// Group the ranking into at most this many tiers
    #[arg(long)]
    tiers: Option<usize>,

    /// Output JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let log_level = std::env::var("LOG_LEVEL")
        .ok()
        .and_then(to_log_level)
        .unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .try_init()
        .map_err(anyhow::Error::msg)?;

    let result = match cli.command {
        Commands::Session(args) => run_session(&args),
        Commands::Show(args) => show(&args),
    };
    if let Err(err) = &result {
        error!("{err:#}");
    }
    result
}

fn to_log_level(env: String) -> Option<tracing::Level> {
    tracing::Level::from_str(&env.to_uppercase()).ok()
}

fn run_session(args: &SessionArgs) -> anyhow::Result<()> {
    let mut env = RankerEnv::try_from_env()?;
    if args.no_avoid_twice {
        env.avoid_twice = false;
    }

    let content = fs::read_to_string(&args.items)
        .with_context(|| format!("failed to read items from {}", args.items.display()))?;
    let items = parse_items(&content)?;

    let mut ranker = match &args.state {
        Some(path) if path.exists() => {
            let ranker = AdaptiveRanker::load(path)?;
            if ranker.config().avoid_twice != env.avoid_twice {
                warn!(
                    stored = ranker.config().avoid_twice,
                    "state file keeps its own avoid-twice setting"
                );
            }
            ranker
        }
        _ => AdaptiveRanker::new(env.ranker_config()),
    };

    let mut added = 0;
    for item in items {
        if ranker.find_by_name(&item).is_none() {
            ranker.add_named_entity(item, env.default_rating, env.default_rd);
            added += 1;
        }
    }
    if ranker.len() < 2 {
        anyhow::bail!("need at least two items to compare, got {}", ranker.len());
    }
    info!(entities = ranker.len(), added, "starting session");

    let summary = Session::new(&mut ranker, io::stdin().lock(), io::stdout())
        .max_comparisons(args.max)
        .run()?;
    if summary.stopped == StopReason::NoEligiblePair {
        warn!("ran out of eligible pairs");
    }
    println!("\n{} comparisons this session\n", summary.comparisons);

    if let Some(path) = &args.state {
        ranker.save(path)?;
    }
    if let Some(path) = &args.results {
        ranker.ledger().write_to(create(path)?)?;
    }
    if let Some(path) = &args.ratings {
        let writer = create(path)?;
        if args.json {
            ranker.dump_ratings(&mut JsonLinesSink::new(writer))?;
        } else {
            ranker.dump_ratings(&mut TextSink::new(writer))?;
        }
    }

    if args.json {
        output::print_json(&ranker, None)?;
    } else {
        output::print_table(&ranker);
    }
    Ok(())
}

fn show(args: &ShowArgs) -> anyhow::Result<()> {
    let ranker = AdaptiveRanker::load(&args.state)?;
    let tiers = args.tiers.map(|n| ranker.tiers(n)).transpose()?;

    if args.json {
        output::print_json(&ranker, tiers.as_deref())?;
    } else if let Some(tiers) = &tiers {
        output::print_tiers(&ranker, tiers);
    } else {
        output::print_table(&ranker);
    }
    Ok(())
}

fn create(path: &Path) -> anyhow::Result<BufWriter<File>> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}
