mod agent;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use agent::Agent;
use config::{parse_models, AgentConfig};

#[derive(Parser)]
#[command(name = "nexus-agent")]
#[command(about = "Two-tier token screener with batched remote analysis")]
struct Cli {
    /// Number of cycles to run (0 = until interrupted)
    #[arg(long, default_value = "1")]
    cycles: u64,

    /// Seconds between cycles
    #[arg(long, default_value = "60")]
    interval_secs: u64,

    /// Mock signals generated per cycle
    #[arg(long, default_value = "500")]
    signals_per_cycle: usize,

    /// Share of generated signals that look like rug pulls (0.0-1.0)
    #[arg(long, default_value = "0.05")]
    rug_ratio: f64,

    /// Seed for the mock signal generator
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Comma-separated remote models in preference order
    #[arg(
        long,
        default_value = "gemini-2.0-flash,gemini-1.5-flash,gemini-1.5-flash-8b,gemini-1.5-pro"
    )]
    models: String,

    /// API key for the remote analyzer; without one Tier 2 is rule-based
    #[arg(long, env = "NEXUS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// OpenAI-compatible API base URL
    #[arg(long, default_value = "https://generativelanguage.googleapis.com/v1beta/openai")]
    api_base: String,

    /// Minimum milliseconds between remote requests
    #[arg(long, default_value = "1000")]
    min_request_interval_ms: u64,

    /// Minimum confidence for executing a SHORT
    #[arg(long, default_value = "70")]
    min_confidence: u8,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "nexus_agent={},nexus_strategy={},nexus_data={}",
                cli.log_level, cli.log_level, cli.log_level
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AgentConfig {
        cycles: cli.cycles,
        cycle_interval: Duration::from_secs(cli.interval_secs),
        signals_per_cycle: cli.signals_per_cycle,
        rug_ratio: cli.rug_ratio,
        seed: cli.seed,
        models: parse_models(&cli.models),
        api_key: cli.api_key,
        api_base: cli.api_base,
        min_request_interval: Duration::from_millis(cli.min_request_interval_ms),
        min_confidence: cli.min_confidence,
        ..AgentConfig::default()
    };

    tracing::info!("Nexus agent starting");
    tracing::info!("Configuration:");
    tracing::info!("  Cycles: {}", config.cycles);
    tracing::info!("  Signals per cycle: {}", config.signals_per_cycle);
    tracing::info!("  Rug ratio: {:.2}", config.rug_ratio);
    tracing::info!(
        "  Tier 2: {}",
        if config.remote_api_key().is_some() {
            format!("remote {:?}", config.models)
        } else {
            "rule-based".to_string()
        }
    );

    let mut agent = Agent::new(config)?;
    let stats = agent.run().await?;

    let report = serde_json::to_string_pretty(&stats).context("Failed to serialize stats")?;
    println!("{}", report);

    Ok(())
}
