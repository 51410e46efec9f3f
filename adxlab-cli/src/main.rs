//! ADX Lab CLI: config validation and tick-feed replay.
//!
//! Commands:
//! - `check`: validate a TOML config and print its fingerprint
//! - `default-config`: print the default config as TOML
//! - `replay`: run a recorded CSV tick feed through the engine against the paper gateway

use adxlab_core::domain::Intent;
use adxlab_core::feed::load_ticks;
use adxlab_core::replay::{run_replay, ReplayStep};
use adxlab_core::{Engine, EngineEvent, PaperConfig, PaperGateway, StrategyConfig};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "adxlab",
    about = "ADX Lab CLI: ADX-rating trend entries with pyramiding and a P/L circuit breaker"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a TOML config file and print its fingerprint.
    Check {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,
    },
    /// Print the default configuration as TOML.
    DefaultConfig,
    /// Replay a CSV tick feed through the engine using the paper gateway.
    Replay {
        /// Path to a TOML config file. Defaults are used when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// CSV feed: timestamp,close,reference_ma,di_plus,di_minus,adx_rating,bar_close
        #[arg(long)]
        feed: PathBuf,

        /// Price distance of one pip.
        #[arg(long, default_value_t = 0.0001)]
        pip_size: f64,

        /// Account-currency value of one pip per lot.
        #[arg(long, default_value_t = 10.0)]
        pip_value: f64,

        /// Print one JSON object per active step instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { config } => run_check(config),
        Commands::DefaultConfig => run_default_config(),
        Commands::Replay {
            config,
            feed,
            pip_size,
            pip_value,
            json,
        } => run_replay_cmd(config, feed, pip_size, pip_value, json),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<StrategyConfig> {
    match path {
        Some(path) => StrategyConfig::from_file(&path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(StrategyConfig::default()),
    }
}

fn run_check(path: PathBuf) -> Result<()> {
    let config = load_config(Some(path))?;
    let engine_config = config.validate().context("invalid configuration")?;

    println!("Config OK");
    println!("Fingerprint: {}", config.fingerprint());
    println!("Symbol:      {}", engine_config.symbol);
    println!("Label:       {}", engine_config.label);
    println!(
        "Session:     {} - {} (re-arm before {:02}:00)",
        engine_config.session.start.format("%H:%M"),
        engine_config.session.end.format("%H:%M"),
        engine_config.rearm.before_hour
    );
    println!(
        "Pyramiding:  {}",
        if engine_config.pyramid.enabled { "on" } else { "off" }
    );
    Ok(())
}

fn run_default_config() -> Result<()> {
    print!("{}", StrategyConfig::default().to_toml()?);
    Ok(())
}

fn run_replay_cmd(
    config_path: Option<PathBuf>,
    feed_path: PathBuf,
    pip_size: f64,
    pip_value: f64,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let mut engine = Engine::from_strategy(&config).context("invalid configuration")?;
    let fingerprint = config.fingerprint();
    let symbol = engine.config().symbol.clone();
    info!(
        fingerprint = fingerprint.short(),
        symbol = %symbol,
        label = %engine.config().label,
        "engine ready"
    );

    let ticks = load_ticks(&feed_path)
        .with_context(|| format!("loading feed {}", feed_path.display()))?;
    info!(ticks = ticks.len(), "feed loaded");

    let mut gateway = PaperGateway::new(PaperConfig::new(symbol, pip_size, pip_value));
    let steps = run_replay(&mut engine, &mut gateway, &ticks);

    for step in steps.iter().filter(|s| !s.is_quiet()) {
        if json {
            println!("{}", step_json(step));
        } else {
            print_step(step);
        }
    }

    let state = engine.state();
    println!(
        "Done: {} ticks, {} open positions, bias {:?}, target hit: {}",
        ticks.len(),
        gateway.open_count(),
        state.bias,
        state.risk.target_hit
    );
    Ok(())
}

fn step_json(step: &ReplayStep) -> serde_json::Value {
    serde_json::json!({
        "time": step.now.to_string(),
        "stopped_out": step.stopped_out,
        "tick": step.tick,
        "bar": step.bar,
    })
}

fn print_step(step: &ReplayStep) {
    for id in &step.stopped_out {
        println!("{}  stop/target  {id}", step.now);
    }
    for outcome in step.outcomes() {
        for intent in &outcome.intents {
            println!("{}  {}", step.now, describe_intent(intent));
        }
        for event in &outcome.events {
            println!("{}    {}", step.now, describe_event(event));
        }
    }
}

fn describe_intent(intent: &Intent) -> String {
    match intent {
        Intent::Entry(o) => format!("ENTRY     {} {:.2} {} [{}]", o.side, o.volume, o.symbol, o.label),
        Intent::ScaleIn(o) => format!("SCALE-IN  {} {:.2} {} [{}]", o.side, o.volume, o.symbol, o.label),
        Intent::Close(c) => format!("CLOSE     {}", c.position_id),
    }
}

fn describe_event(event: &EngineEvent) -> String {
    match event {
        EngineEvent::Entered { side, position_id, volume } => {
            format!("entered {side} {position_id} ({volume:.2} lots)")
        }
        EngineEvent::EntryRejected { side, reason } => format!("{side} entry rejected: {reason}"),
        EngineEvent::ScaledIn { replaced, position_id, volume } => {
            format!("scaled in {replaced} -> {position_id} ({volume:.2} lots)")
        }
        EngineEvent::ScaleInRejected { position_id, reason } => {
            format!("scale-in on {position_id} rejected: {reason}")
        }
        EngineEvent::Closed { position_id } => format!("closed {position_id}"),
        EngineEvent::CloseFailed { position_id, reason } => {
            format!("close {position_id} failed: {reason}")
        }
        EngineEvent::TargetHit { total_net_profit } => {
            format!("target hit (net {total_net_profit:.2})")
        }
        EngineEvent::LossLimitHit { total_net_profit } => {
            format!("loss limit hit (net {total_net_profit:.2})")
        }
        EngineEvent::Rearmed => "re-armed".to_string(),
        EngineEvent::Pruned { position_id } => format!("untracked {position_id}"),
    }
}
