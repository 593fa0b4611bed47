//! CLI for running the LabToken ledger on an in-process devnet.
//!
//! - `replay`: execute a scenario file of transfers and report the outcome
//! - `estimate`: estimate the gas of a single transfer
//! - `accounts`: list the generated accounts and their balances

use clap::{Parser, Subcommand};
use devnet::Devnet;
use labtoken::{
    account_balances,
    config::Config,
    init_tracing,
    metrics::{install_prometheus_exporter, Metrics},
    run_scenario,
    scenario::Party,
    Scenario,
};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "labtoken")]
#[command(about = "Run the LabToken ledger on an in-process devnet")]
struct Cli {
    /// Path to the configuration file (defaults are used if it does not exist)
    #[arg(short, long, default_value = "labtoken.toml")]
    config: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Execute a scenario file of transfers
    Replay {
        /// Path to the scenario file
        #[arg(short, long)]
        scenario: String,
    },

    /// Estimate the gas of a single transfer
    Estimate {
        /// Index of the sending account
        #[arg(long, default_value_t = 0)]
        from: usize,

        /// Recipient: account index or address
        #[arg(long)]
        to: Party,

        /// Amount in decimal token units
        #[arg(long)]
        amount: String,
    },

    /// List the generated accounts and their balances
    Accounts,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(&cli.config)?;

    // Override log format from CLI flag
    if cli.log_json {
        config.log_json = true;
    }

    init_tracing(config.log_json);

    info!("Loaded config:");
    info!("  Config file: {}", cli.config);
    info!(
        "  Token: {} ({})",
        config.devnet.token.name, config.devnet.token.symbol
    );
    info!("  Initial supply: {}", config.devnet.token.initial_supply);
    info!("  Accounts: {}", config.devnet.accounts);

    if let Some(port) = config.metrics_port {
        install_prometheus_exporter(port)?;
        info!("  Metrics: 0.0.0.0:{}", port);
    }

    let devnet = Devnet::start(config.devnet.clone())?;

    match cli.command {
        Command::Replay { scenario } => {
            info!("Running: replay {}", scenario);

            let scenario = Scenario::from_file(&scenario)?;
            let report = run_scenario(&devnet, &scenario, &Metrics::new()).await?;

            let token = devnet.token(devnet.deployer());
            for (address, balance) in &report.balances {
                info!(%address, balance = %token.format_units(*balance), "Final balance");
            }

            let mismatches = report.mismatches().count();
            if mismatches > 0 {
                for outcome in report.mismatches() {
                    error!(
                        index = outcome.index,
                        outcome = %outcome.outcome,
                        expected = ?outcome.expected,
                        "Unexpected outcome"
                    );
                }
                eyre::bail!(
                    "{} of {} transfers did not match expectations",
                    mismatches,
                    report.outcomes.len()
                );
            }

            info!(
                transfers = report.outcomes.len(),
                holders = report.summary.holders,
                "Replay completed, invariants hold"
            );
        }
        Command::Estimate { from, to, amount } => {
            let caller = devnet
                .accounts()
                .get(from)
                .ok_or_else(|| eyre::eyre!("No account #{}", from))?;
            let token = devnet.token(caller);
            let to = to.resolve(&devnet)?;
            let amount = token.parse_units(&amount)?;

            let gas = token.estimate_transfer(to, amount).await?;
            info!(
                from = %caller.address(),
                %to,
                amount = %token.format_units(amount),
                gas,
                "Estimated transfer gas"
            );
        }
        Command::Accounts => {
            let token = devnet.token(devnet.deployer());
            let balances = account_balances(&devnet).await?;
            for (index, (address, balance)) in balances.iter().enumerate() {
                info!(
                    index,
                    %address,
                    balance = %token.format_units(*balance),
                    "Account"
                );
            }
        }
    }

    Ok(())
}
