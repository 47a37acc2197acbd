//! Desk CLI — drive coordination rounds against the firm roster
//!
//! Subcommands:
//! - `status`: print one agent or the whole firm grouped by department
//! - `coordinate`: run a single coordination round for a context
//! - `demo`: full loop — coordinate, strategic review, outcome feedback,
//!   coordinate again

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use coordination::council::{CouncilCoordinator, PolicyContext, TrendDirection};
use coordination::registry::AgentRegistry;
use coordination::state::{DecisionContext, Outcome};

use desk_agents::roster::{default_roster, RosterConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Trading desk agent council", long_about = None)]
struct Cli {
    /// Path to a TOML roster; the built-in firm is used when omitted
    #[arg(long)]
    roster: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show agent status, one agent or the whole firm
    Status {
        /// Agent display name
        #[arg(long)]
        name: Option<String>,
    },

    /// Run one coordination round
    Coordinate {
        #[arg(long, default_value = "trading")]
        decision_type: String,

        #[arg(long)]
        symbol: Option<String>,

        #[arg(long, default_value = "general")]
        market_type: String,

        #[arg(long, default_value_t = 0.1)]
        volatility: f64,

        #[arg(long)]
        risk_score: Option<f64>,

        /// Extra numeric context keys as key=value, repeatable
        #[arg(long = "set", value_parser = parse_key_val)]
        extra: Vec<(String, f64)>,
    },

    /// Run the full loop: coordinate, review, feedback, coordinate again
    Demo,
}

fn parse_key_val(raw: &str) -> Result<(String, f64), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let value: f64 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    Ok((key.to_string(), value))
}

fn load_roster(path: Option<&PathBuf>) -> Result<RosterConfig> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading roster {}", path.display()))?;
            RosterConfig::from_toml_str(&raw)
                .with_context(|| format!("parsing roster {}", path.display()))
        }
        None => Ok(default_roster()),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let registry = AgentRegistry::new();
    let roster = load_roster(cli.roster.as_ref())?;
    roster.install(&registry).context("installing roster")?;
    let coordinator = CouncilCoordinator::new(registry.shared());

    info!(agents = coordinator.registry().len(), "Desk council ready");

    match cli.command {
        Command::Status { name } => match name {
            Some(name) => {
                let status = coordinator.agent_status(&name).await?;
                print_json(&status)?;
            }
            None => {
                let status = coordinator.firm_status().await;
                // Keyed by department name for readable JSON
                let status: HashMap<String, _> = status
                    .into_iter()
                    .map(|(department, agents)| (department.to_string(), agents))
                    .collect();
                print_json(&status)?;
            }
        },

        Command::Coordinate {
            decision_type,
            symbol,
            market_type,
            volatility,
            risk_score,
            extra,
        } => {
            let mut ctx = DecisionContext::new(decision_type)
                .with_market_type(market_type)
                .with_volatility(volatility);
            if let Some(symbol) = symbol {
                ctx = ctx.with_symbol(symbol);
            }
            if let Some(risk_score) = risk_score {
                ctx = ctx.with_risk_score(risk_score);
            }
            for (key, value) in extra {
                ctx = ctx.with_extra(key, serde_json::json!(value));
            }

            let session = coordinator.coordinate(&ctx).await?;
            print_json(&session)?;
        }

        Command::Demo => {
            let ctx = DecisionContext::new("trading")
                .with_symbol("BTC")
                .with_volatility(0.25)
                .with_risk_score(0.4)
                .with_extra("technical_score", serde_json::json!(0.72))
                .with_extra("innovation_momentum", serde_json::json!(0.8));

            let session = coordinator.coordinate(&ctx).await?;
            info!(
                winner = %session.winning_recommendation,
                consensus = session.consensus_strength,
                "First round tallied"
            );
            print_json(&session)?;

            let review = coordinator.review_session(
                &session.id,
                &PolicyContext::new(TrendDirection::Bullish, ctx.volatility),
            )?;
            print_json(&review)?;

            // Reward agents that voted with the winner, penalize the rest
            for decision in &session.decisions {
                let aligned = decision.recommendation == session.winning_recommendation;
                let outcome = if aligned {
                    Outcome { score: 0.85, accuracy: 0.85 }
                } else {
                    Outcome { score: 0.4, accuracy: 0.25 }
                };
                coordinator.record_outcome(&decision.agent_id, outcome).await?;
            }
            info!("Outcome feedback applied");

            let second = coordinator.coordinate(&ctx).await?;
            info!(
                winner = %second.winning_recommendation,
                consensus = second.consensus_strength,
                "Second round tallied after feedback"
            );
            print_json(&second)?;
        }
    }

    Ok(())
}
