pub mod config;
pub mod metrics;
pub mod scenario;

use alloy_primitives::{Address, U256};
use devnet::Devnet;

pub use scenario::{run_scenario, Scenario, ScenarioReport};

/// Install the global tracing subscriber.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`.
pub fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Current balance of every devnet account, in account order.
pub async fn account_balances(devnet: &Devnet) -> eyre::Result<Vec<(Address, U256)>> {
    let mut balances = Vec::with_capacity(devnet.accounts().len());

    for account in devnet.accounts() {
        let address = account.address();
        balances.push((address, devnet.node().balance_of(address).await?));
    }

    Ok(balances)
}
