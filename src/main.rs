//! OPC Precision
//!
//! DCA entry-ladder calculator: splits a risk budget across a band of
//! limit orders, front-loading the entry nearest the market, and
//! reports average entry, notional, projected profit, and a
//! safety-bounded recommended leverage. Plans can be built from manual
//! inputs or from locally stored signal records.

mod db;
mod ladder;
mod models;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::db::Database;
use crate::ladder::LadderCalculator;
use crate::models::{Direction, LadderResult, Signal, SignalStatus, TradeParameters};

/// OPC precision calculator CLI.
#[derive(Parser)]
#[command(name = "opc")]
#[command(about = "DCA entry-ladder and position-sizing calculator", long_about = None)]
struct Cli {
    /// Database file path
    #[arg(
        short,
        long,
        env = "OPC_DATABASE_URL",
        default_value = "sqlite:./opc.db?mode=rwc"
    )]
    database: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute an entry ladder from manual trade parameters
    Plan {
        /// Risk budget in USD (falls back to the stored default)
        #[arg(short, long)]
        risk: Option<f64>,

        /// Upper entry price (or the single entry price)
        #[arg(long)]
        entry_high: f64,

        /// Lower entry price; defaults to the upper for a single-price entry
        #[arg(long)]
        entry_low: Option<f64>,

        /// Stop-loss price
        #[arg(short, long)]
        stop_loss: f64,

        /// Target price (projected-profit display only)
        #[arg(short, long)]
        target: f64,

        /// Number of limit orders to split the band into
        #[arg(short, long, default_value = "4")]
        bids: u32,

        /// Emit the plan as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Manage stored signals and plan from them
    Signal {
        #[command(subcommand)]
        command: SignalCommands,
    },

    /// Persist the default risk budget
    SetRisk {
        /// Risk budget in USD
        amount: f64,
    },

    /// Show the ladder constants
    Config,
}

#[derive(Subcommand)]
enum SignalCommands {
    /// Store a new signal
    Add {
        /// Ticker symbol, e.g. BTCUSDT
        ticker: String,

        /// Trade side (long or short)
        #[arg(short, long)]
        direction: String,

        /// Primary entry price
        #[arg(long)]
        entry1: f64,

        /// Optional second entry bounding the band
        #[arg(long)]
        entry2: Option<f64>,

        /// Stop-loss price
        #[arg(short, long)]
        stop_loss: f64,

        /// Target price
        #[arg(short, long)]
        target: f64,

        /// Trade profile, e.g. SCALP or SWING
        #[arg(short, long)]
        profile: Option<String>,

        /// Suggested bid count
        #[arg(short, long)]
        bids: Option<u32>,
    },

    /// List stored signals
    List,

    /// Show one signal record
    Show {
        /// Signal id
        id: i64,
    },

    /// Compute an entry ladder from a stored signal
    Plan {
        /// Signal id
        id: i64,

        /// Risk budget in USD (falls back to the stored default)
        #[arg(short, long)]
        risk: Option<f64>,

        /// Override the signal's bid count
        #[arg(short, long)]
        bids: Option<u32>,

        /// Emit the plan as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Update a signal's status (open, filled, closed, cancelled)
    Status {
        /// Signal id
        id: i64,

        /// New status
        status: String,
    },

    /// Delete a signal
    Remove {
        /// Signal id
        id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let db = Database::new(&cli.database).await?;
    let calculator = LadderCalculator::default();

    match cli.command {
        Commands::Plan {
            risk,
            entry_high,
            entry_low,
            stop_loss,
            target,
            bids,
            json,
        } => {
            let Some(risk_budget) = resolve_risk(risk, &db).await? else {
                println!("No risk budget given. Pass --risk or persist one with 'opc set-risk'.");
                return Ok(());
            };

            let entry_high = Decimal::try_from(entry_high)?;
            let params = TradeParameters {
                risk_budget,
                entry_high,
                entry_low: entry_low.map(Decimal::try_from).transpose()?.unwrap_or(entry_high),
                stop_loss: Decimal::try_from(stop_loss)?,
                target: Decimal::try_from(target)?,
                bid_count: bids,
            };

            info!(
                risk = %params.risk_budget,
                bids = params.bid_count,
                "Computing plan from manual parameters"
            );

            let result = calculator.compute(&params);
            print_plan(&params, &result, json)?;
        }

        Commands::Signal { command } => {
            handle_signal_command(command, &db, &calculator).await?;
        }

        Commands::SetRisk { amount } => {
            let risk = Decimal::try_from(amount)?;
            if risk <= Decimal::ZERO {
                return Err(anyhow!("Risk budget must be positive"));
            }

            db.set_default_risk(risk).await?;
            println!("Default risk set to ${risk}");
        }

        Commands::Config => {
            let config = calculator.config();

            println!("\n=== Ladder Configuration ===\n");
            println!("Sizing:");
            println!("  Fee Rate:             {}%", config.fee_rate * Decimal::from(100));
            println!("  Default Bid Count:    {}", config.default_bid_count);

            println!("\nLeverage:");
            println!("  Maintenance Margin:   {}%", config.maintenance_margin_rate * Decimal::from(100));
            println!("  Safety Buffer:        {}%", config.safety_buffer * Decimal::from(100));
            println!("  Derating Factor:      {}", config.leverage_derating);
            println!("  Max Leverage:         {}x", config.max_leverage);

            match db.get_default_risk().await? {
                Some(risk) => println!("\nDefault Risk:           ${risk}"),
                None => println!("\nDefault Risk:           not set"),
            }
        }
    }

    Ok(())
}

async fn handle_signal_command(
    command: SignalCommands,
    db: &Database,
    calculator: &LadderCalculator,
) -> Result<()> {
    match command {
        SignalCommands::Add {
            ticker,
            direction,
            entry1,
            entry2,
            stop_loss,
            target,
            profile,
            bids,
        } => {
            let direction = Direction::from_str(&direction)
                .ok_or_else(|| anyhow!("Direction must be 'long' or 'short'"))?;

            let signal = Signal {
                id: 0, // assigned by the database
                ticker: ticker.to_uppercase(),
                direction,
                entry1: Decimal::try_from(entry1)?,
                entry2: entry2.map(Decimal::try_from).transpose()?,
                stop_loss: Decimal::try_from(stop_loss)?,
                target: Decimal::try_from(target)?,
                profile,
                bids,
                status: SignalStatus::Open,
                created_at: chrono::Utc::now(),
            };

            let id = db.save_signal(&signal).await?;
            info!(id = id, ticker = %signal.ticker, "Signal saved");
            println!("Saved signal {} ({} {})", id, signal.ticker, signal.direction.as_str());
        }

        SignalCommands::List => {
            let signals = db.list_signals().await?;

            if signals.is_empty() {
                println!("No signals stored. Use 'opc signal add' to create one.");
                return Ok(());
            }

            println!(
                "\n{:>4} {:<10} {:<6} {:>12} {:>12} {:>12} {:>12} {:<10}",
                "ID", "TICKER", "SIDE", "ENTRY1", "ENTRY2", "STOP", "TARGET", "STATUS"
            );
            println!("{}", "-".repeat(86));

            for signal in signals {
                println!(
                    "{:>4} {:<10} {:<6} {:>12} {:>12} {:>12} {:>12} {:<10}",
                    signal.id,
                    signal.ticker,
                    signal.direction.as_str(),
                    signal.entry1,
                    signal
                        .entry2
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    signal.stop_loss,
                    signal.target,
                    signal.status.as_str()
                );
            }
        }

        SignalCommands::Show { id } => {
            let signal = db.get_signal(id).await?;

            println!("\n=== Signal {} ===", signal.id);
            println!("Ticker:     {}", signal.ticker);
            println!("Direction:  {}", signal.direction.as_str());
            println!("Entry 1:    {}", signal.entry1);
            if let Some(entry2) = signal.entry2 {
                println!("Entry 2:    {}", entry2);
            }
            println!("Stop Loss:  {}", signal.stop_loss);
            println!("Target:     {}", signal.target);
            println!("Profile:    {}", signal.profile.as_deref().unwrap_or("SCALP"));
            if let Some(bids) = signal.bids {
                println!("Bids:       {}", bids);
            }
            println!("Status:     {}", signal.status.as_str());
            println!("Created:    {}", signal.created_at.format("%Y-%m-%d %H:%M UTC"));
        }

        SignalCommands::Plan {
            id,
            risk,
            bids,
            json,
        } => {
            let signal = db.get_signal(id).await?;

            let Some(risk_budget) = resolve_risk(risk, db).await? else {
                println!("No risk budget given. Pass --risk or persist one with 'opc set-risk'.");
                return Ok(());
            };

            let mut params =
                signal.trade_parameters(risk_budget, calculator.config().default_bid_count);
            if let Some(bids) = bids {
                params.bid_count = bids;
            }

            info!(
                signal = id,
                ticker = %signal.ticker,
                risk = %params.risk_budget,
                "Computing plan from signal"
            );

            if !json {
                println!(
                    "\n{} {} | stop {} | target {}",
                    signal.ticker,
                    signal.direction.as_str(),
                    signal.stop_loss,
                    signal.target
                );
            }

            let result = calculator.compute(&params);
            print_plan(&params, &result, json)?;
        }

        SignalCommands::Status { id, status } => {
            let status = SignalStatus::from_str(&status).ok_or_else(|| {
                anyhow!("Status must be one of: open, filled, closed, cancelled")
            })?;

            db.set_signal_status(id, status).await?;
            println!("Signal {} marked {}", id, status.as_str());
        }

        SignalCommands::Remove { id } => {
            db.remove_signal(id).await?;
            println!("Removed signal {}", id);
        }
    }

    Ok(())
}

/// Resolve the risk budget: explicit flag first, stored default second.
async fn resolve_risk(cli_risk: Option<f64>, db: &Database) -> Result<Option<Decimal>> {
    match cli_risk {
        Some(risk) => Ok(Some(Decimal::try_from(risk)?)),
        None => db.get_default_risk().await,
    }
}

/// Render a computed plan as a table (or JSON).
fn print_plan(params: &TradeParameters, result: &LadderResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    if result.is_empty() {
        println!("\nEnter valid trade parameters to see the breakdown.");
        return Ok(());
    }

    println!("\n=== Order Breakdown ===");
    for (i, bid) in result.bids.iter().enumerate() {
        println!(
            "  BID {:<2} {:>12.4} ({:>5.1}%) @ {:.4}  (${:.2})",
            i + 1,
            bid.size,
            bid.risk_share_pct,
            bid.price,
            bid.notional_value
        );
    }

    println!("\n=== Summary ===");
    println!("Risk Budget:          ${}", params.risk_budget);
    println!("Total Order Value:    ${:.2}", result.total_notional_value);
    println!("Average Entry:        {:.4}", result.average_entry_price);
    println!("Projected Profit:     ${:.2}", result.projected_profit);
    println!("Recommended Leverage: {:.2}x", result.recommended_leverage);

    Ok(())
}
