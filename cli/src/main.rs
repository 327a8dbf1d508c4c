//! `elect`: run a configured election against a script of calls.

mod script;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use elect_election::{ElectionConfig, ElectionController, ElectionPhase, ElectionSnapshot};
use elect_fees::AccountBook;
use elect_types::{Principal, SystemClock};
use elect_utils::{format_duration, init_tracing_with, LogFormat};
use serde_json::json;

use crate::script::{replay, ReplayClock, Script};

#[derive(Parser)]
#[command(name = "elect", about = "Time-boxed election coordinator")]
struct Cli {
    /// Log level used when RUST_LOG is unset. Overrides the config file.
    #[arg(long, env = "ELECT_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json". Overrides the config file.
    #[arg(long, env = "ELECT_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Build an election from a config file and replay a script against it.
    Run {
        /// Election configuration (TOML).
        #[arg(long, env = "ELECT_CONFIG")]
        config: PathBuf,

        /// Script of calls (TOML `[[step]]` tables).
        #[arg(long)]
        script: PathBuf,

        /// Resume from a snapshot instead of a fresh election.
        #[arg(long)]
        resume: Option<PathBuf>,

        /// Write a snapshot of the final state here.
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Stop at the first failing step.
        #[arg(long)]
        strict: bool,

        /// Print the committed event log after the step results.
        #[arg(long)]
        events: bool,
    },

    /// Summarize a saved snapshot.
    Inspect {
        #[arg(long)]
        snapshot: PathBuf,
    },

    /// Print a config file with every default filled in.
    Config {
        #[arg(long)]
        owner: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            config,
            script,
            resume,
            snapshot,
            strict,
            events,
        } => {
            let config = ElectionConfig::from_toml_file(&config)
                .with_context(|| format!("loading config {}", config.display()))?;
            let format = cli.log_format.as_deref().unwrap_or(&config.log_format);
            let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
            init_tracing_with(LogFormat::parse(format), level);
            run(&config, &script, resume, snapshot, strict, events)
        }
        Command::Inspect { snapshot } => {
            init_tracing_with(
                LogFormat::parse(cli.log_format.as_deref().unwrap_or("human")),
                cli.log_level.as_deref().unwrap_or("info"),
            );
            inspect(&snapshot)
        }
        Command::Config { owner } => {
            let owner = Principal::new(owner)?;
            print!("{}", ElectionConfig::new(owner).to_toml_string()?);
            Ok(())
        }
    }
}

fn run(
    config: &ElectionConfig,
    script_path: &Path,
    resume: Option<PathBuf>,
    snapshot_path: Option<PathBuf>,
    strict: bool,
    print_events: bool,
) -> anyhow::Result<()> {
    let script = Script::from_toml_file(script_path)?;
    let start = script
        .steps
        .iter()
        .find_map(|s| s.at)
        .unwrap_or(config.voting_start);
    let clock = Arc::new(ReplayClock::new(start));
    let payout = Box::new(AccountBook::new());

    let mut election = match resume {
        Some(path) => {
            let snapshot = ElectionSnapshot::load(&path)?;
            ElectionController::restore(snapshot, clock.clone(), payout)?
        }
        None => ElectionController::from_config(config, clock.clone(), payout)?,
    };

    let period = election.voting_period();
    tracing::info!(
        steps = script.steps.len(),
        start = %period.start(),
        length = %format_duration(period.duration_secs()),
        "replaying script"
    );

    let outcomes = replay(&mut election, &clock, &script, strict)?;
    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    for outcome in &outcomes {
        println!("{}", outcome.to_json());
    }
    if print_events {
        for record in election.events() {
            println!("{}", serde_json::to_string(record)?);
        }
    }

    election
        .check_invariants()
        .context("election state inconsistent after replay")?;
    tracing::info!(
        steps = outcomes.len(),
        failed,
        phase = %election.phase(),
        "replay finished"
    );

    if let Some(path) = snapshot_path {
        election.snapshot().save(&path)?;
        tracing::info!(path = %path.display(), "snapshot written");
    }
    Ok(())
}

fn inspect(path: &Path) -> anyhow::Result<()> {
    let snapshot = ElectionSnapshot::load(path)?;
    let clock = Arc::new(SystemClock);
    let election = ElectionController::restore(snapshot, clock, Box::new(AccountBook::new()))?;

    let now = election.now();
    let period = election.voting_period();
    let phase = election.phase();
    let timing = match phase {
        ElectionPhase::NotStarted => {
            format!("opens in {}", format_duration(period.start().remaining_from(now)))
        }
        ElectionPhase::Open => {
            format!("closes in {}", format_duration(period.end().remaining_from(now)))
        }
        ElectionPhase::Closed | ElectionPhase::Finalized => {
            format!("closed {} ago", format_duration(period.end().elapsed_since(now)))
        }
    };

    let candidates: Vec<_> = election
        .candidates()
        .into_iter()
        .filter_map(|id| election.candidate_details(id).ok())
        .map(|c| {
            json!({
                "id": c.id,
                "name": c.name,
                "address": c.address,
                "total_votes": c.total_votes,
                "active": c.active,
            })
        })
        .collect();
    let escrow = election.escrow();
    let winner = election.winner().ok().map(|w| {
        json!({ "id": w.id, "name": w.name, "address": w.address, "votes": w.total_votes })
    });

    let summary = json!({
        "phase": phase.name(),
        "timing": timing,
        "voting_period": { "start": period.start().as_secs(), "end": period.end().as_secs() },
        "fee": election.fee_config().fee_amount.format_units(),
        "escrow": { "balance": escrow.balance.format_units(), "released": escrow.released },
        "candidates": candidates,
        "voters": election.voters().len(),
        "winner": winner,
        "events": election.events().len(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
