//! Bridge Deposit CLI
//!
//! Run modes:
//!   bridge-deposit fees                       - Show current fee tiers
//!   bridge-deposit deposit --amount <btc> ... - Run a full deposit
//!   bridge-deposit resume --deposit-id <id>   - Retry a failed deposit
//!   bridge-deposit pending                    - List resumable deposits

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use bridge_deposit::bridge::{BroadcastReceipt, HttpBridgeClient};
use bridge_deposit::config::{BridgeConfig, Network};
use bridge_deposit::deposit_flow::DepositFlow;
use bridge_deposit::error::{AppError, Result};
use bridge_deposit::logging::{init_from_config, log_system_event};
use bridge_deposit::storage::{ResumeStore, SqliteResumeStore};
use bridge_deposit::types::{
    sats_to_display, DepositId, DepositIntent, FailedDeposit, FeePriority, FlowStep,
    WalletProvider,
};

#[derive(Parser)]
#[command(name = "bridge-deposit")]
#[command(about = "Deposit BTC into sBTC through the bridge service")]
struct Cli {
    /// Network (mainnet, testnet)
    #[arg(long, global = true, env = "BRIDGE_NETWORK")]
    network: Option<Network>,

    /// Print the loaded configuration before running
    #[arg(long, global = true)]
    show_config: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show current fee rates per priority
    Fees,

    /// Register, prepare and broadcast a deposit
    Deposit {
        /// Amount in BTC (e.g., 0.0005)
        #[arg(short, long)]
        amount: f64,

        /// Stacks address that receives sBTC
        #[arg(short, long)]
        stx_receiver: String,

        /// Bitcoin address that funds the deposit
        #[arg(short, long)]
        btc_sender: String,

        /// Fee priority (low, medium, high)
        #[arg(short, long, default_value = "medium")]
        fee_priority: FeePriority,

        /// Wallet that signs the transaction (leather, xverse)
        #[arg(short, long, default_value = "leather")]
        wallet: WalletProvider,
    },

    /// Retry prepare and execute for a registered deposit
    Resume {
        /// Deposit ID from a previous failed run
        #[arg(short, long)]
        deposit_id: String,
    },

    /// List deposits that can be resumed
    Pending,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error [{}]: {}", e.error_code(), e);
            if e.is_retryable() {
                eprintln!("This error is usually temporary; try again shortly.");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = BridgeConfig::from_env()?;
    if let Some(network) = cli.network {
        if network != config.network && std::env::var("BRIDGE_CACHE_URL").is_err() {
            config.bridge_url = network.default_bridge_url().to_string();
        }
        config.network = network;
    }

    init_from_config(&config)?;
    log_system_event(
        "starting",
        Some(serde_json::json!({
            "network": config.network.to_string(),
            "bridge_url": config.bridge_url,
        })),
    );

    if cli.show_config {
        config.print_summary();
    }

    match cli.command {
        Commands::Fees => show_fees(&config).await,
        Commands::Deposit {
            amount,
            stx_receiver,
            btc_sender,
            fee_priority,
            wallet,
        } => {
            let intent = DepositIntent::new(amount, stx_receiver, btc_sender, fee_priority, wallet);
            run_deposit(&config, intent).await
        }
        Commands::Resume { deposit_id } => run_resume(&config, DepositId::new(deposit_id)).await,
        Commands::Pending => list_pending(&config).await,
    }
}

fn build_flow(config: &BridgeConfig) -> Result<DepositFlow<HttpBridgeClient>> {
    let client = HttpBridgeClient::from_config(config)?;
    Ok(DepositFlow::new(client).with_limits(config.limits))
}

fn open_store(config: &BridgeConfig) -> Result<SqliteResumeStore> {
    let store = SqliteResumeStore::new(&config.resume_db_path)?;
    log_system_event(
        "resume store opened",
        Some(serde_json::json!({ "path": config.resume_db_path })),
    );
    Ok(store)
}

async fn show_fees(config: &BridgeConfig) -> Result<()> {
    let flow = build_flow(config)?;
    let fees = flow.fee_estimates().await?;

    println!("=== Fee Estimates (sat/vB) ===");
    for priority in [FeePriority::Low, FeePriority::Medium, FeePriority::High] {
        println!("  {:<8} {}", priority, fees.rate_for(priority));
    }
    Ok(())
}

async fn run_deposit(config: &BridgeConfig, intent: DepositIntent) -> Result<()> {
    config.ensure_deposits_supported()?;
    if !config.network.accepts_btc_address(&intent.btc_sender) {
        tracing::warn!(
            btc_sender = %intent.btc_sender,
            network = %config.network,
            "Bitcoin address does not parse for the configured network"
        );
    }

    let flow = build_flow(config)?;
    let store = open_store(config)?;

    println!(
        "Depositing {} from {} to {}",
        sats_to_display(intent.amount_sats()),
        intent.btc_sender,
        intent.stx_receiver
    );

    match flow.complete_deposit_flow(&intent).await {
        Ok(done) => {
            println!("Deposit ID: {}", done.deposit_id);
            println!("Transaction ID: {}", done.execution.txid());
            Ok(())
        }
        Err(failed) => {
            if let Some(point) = failed.resume_point(&intent) {
                store.save(&point).await?;
                println!(
                    "Deposit {} is registered. Resume with: bridge-deposit resume --deposit-id {}",
                    point.deposit_id, point.deposit_id
                );
            }
            Err(report_failure(failed))
        }
    }
}

async fn run_resume(config: &BridgeConfig, deposit_id: DepositId) -> Result<()> {
    config.ensure_deposits_supported()?;
    let store = open_store(config)?;
    let point = store.get(&deposit_id).await?.ok_or_else(|| {
        AppError::input(format!("no resumable deposit with ID {}", deposit_id))
    })?;

    println!(
        "Resuming deposit {} (last failed at {}: {})",
        point.deposit_id, point.step, point.message
    );

    let flow = build_flow(config)?;
    match flow
        .resume_deposit_flow(&point.intent, point.deposit_id.clone())
        .await
    {
        Ok(done) => {
            store.remove(&done.deposit_id).await?;
            println!("Deposit ID: {}", done.deposit_id);
            println!("Transaction ID: {}", done.execution.txid());
            Ok(())
        }
        Err(failed) => {
            match failed.resume_point(&point.intent) {
                Some(next) => store.save(&next).await?,
                // Broadcast may already have happened
                None if failed.step() == FlowStep::CompleteFlow => {
                    store.remove(&point.deposit_id).await?;
                }
                None => {}
            }
            Err(report_failure(failed))
        }
    }
}

async fn list_pending(config: &BridgeConfig) -> Result<()> {
    let store = open_store(config)?;
    let points = store.list().await?;

    if points.is_empty() {
        println!("No resumable deposits.");
        return Ok(());
    }

    println!("=== Resumable Deposits ===");
    for point in points {
        let recorded = chrono::DateTime::from_timestamp(point.recorded_at as i64, 0)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| point.recorded_at.to_string());
        println!(
            "{}  {}  failed at {}  ({})  {}",
            point.deposit_id,
            sats_to_display(point.intent.amount_sats()),
            point.step,
            recorded,
            point.message
        );
    }
    Ok(())
}

fn report_failure<P>(failed: FailedDeposit<P>) -> AppError {
    if let Some(hint) = failed.error.remediation() {
        eprintln!("{}", hint);
    }
    if let Some(details) = &failed.error.details {
        let raw = serde_json::to_string_pretty(details).unwrap_or_else(|_| details.to_string());
        eprintln!("Bridge response:\n{}", raw);
    }
    AppError::Flow(failed.error)
}
