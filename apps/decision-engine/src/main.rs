//! Decision engine CLI.
//!
//! Subcommands cover each stage of the pipeline plus the combined
//! shadow run. Diagnostics go to stderr; JSON and previews to stdout.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;

use decision_engine::marketdata::{fetch_snapshot, BinancePublicClient};
use decision_engine::models::market::{ExchangeRulesSnapshot, PricingSnapshot};
use decision_engine::models::plan::PlanDocument;
use decision_engine::models::settlement::{ExecutionMode, PortfolioState};
use decision_engine::preview::render_plan;
use decision_engine::shadow::{shadow_run, ShadowInputs};
use decision_engine::validate::validate_plan_document;
use decision_engine::{
    EngineConfig, EngineError, ExecutionPlanBuilder, FactsPack, MarketSnapshot, PlanInputs,
    Posture, RegimeClassifier, SettlementSimulator,
};

/// Budget override environment variable, read only here at the edge.
const BUDGET_ENV_VAR: &str = "UMBRA_BUDGET_QUOTE";

#[derive(Parser)]
#[command(name = "decision-engine", about = "Deterministic dry-run trading decision pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify a facts pack into a risk posture.
    Decide {
        /// Facts pack JSON path.
        facts: PathBuf,
        /// Output path for the posture JSON (stdout when omitted).
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Build and validate an execution plan.
    Plan {
        /// Facts pack JSON path.
        facts: PathBuf,
        /// Decision packet (posture) JSON path.
        decision: PathBuf,
        /// Output path for the plan JSON.
        #[arg(long, default_value = "execution_plan.json")]
        out: PathBuf,
    },
    /// Simulate a plan against a portfolio state.
    Simulate {
        /// Execution plan JSON path.
        plan: PathBuf,
        /// Portfolio state JSON path.
        portfolio: PathBuf,
    },
    /// Print a human-readable plan preview.
    Preview {
        /// Execution plan JSON path.
        plan: PathBuf,
    },
    /// Build, validate and simulate in one pass.
    ShadowRun {
        /// Facts pack JSON path.
        facts: PathBuf,
        /// Decision packet (posture) JSON path.
        decision: PathBuf,
        /// Portfolio state JSON path.
        portfolio: PathBuf,
    },
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, EngineError> {
    let text = std::fs::read_to_string(path).map_err(|source| EngineError::InputLoad {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| EngineError::InputParse {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), EngineError> {
    let text = serde_json::to_string_pretty(value).map_err(|source| EngineError::InputParse {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, text).map_err(|source| EngineError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}

fn budget_override() -> Option<String> {
    std::env::var(BUDGET_ENV_VAR).ok()
}

/// Fetch the market snapshot for the posture's allowed universe. When
/// the HTTP client cannot even be constructed the snapshot degrades to
/// empty maps, which the planner turns into per-symbol refusals.
async fn market_snapshot(posture: &Posture) -> MarketSnapshot {
    let now = chrono::Utc::now();
    match BinancePublicClient::new() {
        Ok(client) => fetch_snapshot(&client, &client, &posture.allowed_symbols, now).await,
        Err(err) => {
            tracing::warn!(error = %err, "market data client unavailable, planning without it");
            MarketSnapshot {
                pricing: PricingSnapshot {
                    as_of_utc: now,
                    source: "binance_public".to_string(),
                    prices: BTreeMap::new(),
                },
                exchange_rules: ExchangeRulesSnapshot {
                    as_of_utc: now,
                    source: "binance_exchange_info".to_string(),
                    symbols: BTreeMap::new(),
                },
            }
        }
    }
}

fn print_plan_summary(doc: &PlanDocument) {
    let orders = &doc.plan.orders;
    let avg_price = if orders.is_empty() {
        Decimal::ZERO
    } else {
        let total: Decimal = orders.iter().map(|o| o.price_used).sum();
        total / Decimal::from(orders.len())
    };
    println!(
        "Action: {}, Orders: {}, Avg price used: {avg_price:.4}, Refusals: {}",
        match doc.plan.action {
            decision_engine::models::plan::PlanAction::Rebalance => "rebalance",
            decision_engine::models::plan::PlanAction::NoAction => "no_action",
        },
        orders.len(),
        doc.refusals.len()
    );
    println!(
        "Exchange rules fetched for {} symbol(s)",
        doc.exchange_rules.symbols.len()
    );
    if let Some(first) = doc.refusals.first() {
        println!("First refusal: {} ({})", first.code, first.symbol);
    }
}

async fn run(cli: Cli) -> Result<(), EngineError> {
    let config = EngineConfig::default();

    match cli.command {
        Command::Decide { facts, out } => {
            let pack: FactsPack = load_json(&facts)?;
            let posture = RegimeClassifier::new().classify(&pack);
            match out {
                Some(path) => write_json(&path, &posture)?,
                None => match serde_json::to_string_pretty(&posture) {
                    Ok(text) => println!("{text}"),
                    Err(source) => {
                        return Err(EngineError::InputParse {
                            path: facts,
                            source,
                        })
                    }
                },
            }
        }
        Command::Plan {
            facts,
            decision,
            out,
        } => {
            // The facts pack is loaded for provenance and to fail fast
            // on a missing input even though sizing only needs the
            // decision packet.
            let _pack: FactsPack = load_json(&facts)?;
            let posture: Posture = load_json(&decision)?;
            let snapshot = market_snapshot(&posture).await;

            let inputs = PlanInputs {
                facts_pack_path: facts.display().to_string(),
                decision_packet_path: decision.display().to_string(),
            };
            let builder = ExecutionPlanBuilder::new(config);
            let doc = builder.build(&posture, &snapshot, inputs, budget_override().as_deref());

            if let Err(err) = validate_plan_document(&doc) {
                println!("EXECUTION PLAN INVALID");
                println!("{err}");
                return Err(err.into());
            }

            write_json(&out, &doc)?;
            println!("EXECUTION PLAN VALID");
            print_plan_summary(&doc);
        }
        Command::Simulate { plan, portfolio } => {
            let doc: PlanDocument = load_json(&plan)?;
            let state: PortfolioState = load_json(&portfolio)?;
            let simulator = SettlementSimulator::new(ExecutionMode::AllOrNothing);
            let report = simulator.simulate(&doc, &state)?;
            match serde_json::to_string_pretty(&report) {
                Ok(text) => println!("{text}"),
                Err(source) => return Err(EngineError::InputParse { path: plan, source }),
            }
        }
        Command::Preview { plan } => {
            let doc: PlanDocument = load_json(&plan)?;
            println!("{}", render_plan(&doc));
        }
        Command::ShadowRun {
            facts,
            decision,
            portfolio,
        } => {
            let _pack: FactsPack = load_json(&facts)?;
            let posture: Posture = load_json(&decision)?;
            let state: PortfolioState = load_json(&portfolio)?;
            let snapshot = market_snapshot(&posture).await;

            let inputs = ShadowInputs {
                facts_path: facts.display().to_string(),
                decision_path: decision.display().to_string(),
                portfolio_state_path: portfolio.display().to_string(),
            };
            let report = shadow_run(
                &config,
                &posture,
                &snapshot,
                &state,
                inputs,
                budget_override().as_deref(),
            )?;
            match serde_json::to_string_pretty(&report) {
                Ok(text) => println!("{text}"),
                Err(source) => return Err(EngineError::InputParse { path: facts, source }),
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    decision_engine::telemetry::init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "run failed");
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
