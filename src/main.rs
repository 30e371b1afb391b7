//! AUTOINVEST: Automated peer-lending note purchasing agent
//!
//! Entry point. Loads configuration, initialises structured logging,
//! wires the marketplace gateways into an investment session, and runs it
//! once or on a fixed interval.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use autoinvest::config::{self, AppConfig};
use autoinvest::engine::session::InvestmentSession;
use autoinvest::gateways::dry_run::DryRunOrderGateway;
use autoinvest::gateways::lending_club::LendingClubClient;
use autoinvest::gateways::OrderGateway;
use autoinvest::storage::AuditLog;
use autoinvest::strategy::conservative::ConservativePolicy;
use autoinvest::strategy::selection::SelectionEngine;

const DEFAULT_CONFIG: &str = "autoinvest.toml";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let cfg = config::AppConfig::load(&config_path)?;

    info!(
        account_id = %cfg.investor.account_id,
        unit_size = %cfg.session.unit_size,
        dry_run = cfg.session.dry_run,
        audit_log = %cfg.session.audit_log.display(),
        "AUTOINVEST starting up"
    );

    let session = build_session(&cfg)?;

    let Some(schedule) = &cfg.schedule else {
        let record = session
            .run()
            .await
            .context("Investment session aborted")?;
        info!(record = %record, "Done");
        return Ok(());
    };

    // Each tick awaits the previous run, so sessions never overlap.
    let mut interval = tokio::time::interval(Duration::from_secs(schedule.interval_secs));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(
        interval_secs = schedule.interval_secs,
        "Entering schedule loop. Press Ctrl+C to stop."
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match session.run().await {
                    Ok(record) => info!(record = %record, "Scheduled session finished"),
                    Err(e) => error!(error = %e, "Session aborted; continuing to next tick"),
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    Ok(())
}

/// Wire gateways, policy, and audit log from configuration.
fn build_session(cfg: &AppConfig) -> Result<InvestmentSession> {
    let token = cfg.auth_token()?;
    let client = Arc::new(LendingClubClient::new(&cfg.api, token)?);

    let orders: Arc<dyn OrderGateway> = if cfg.session.dry_run {
        Arc::new(DryRunOrderGateway::new())
    } else {
        client.clone()
    };
    info!(order_gateway = orders.name(), "Order gateway ready");

    let engine = SelectionEngine::new(Box::new(ConservativePolicy::new(cfg.policy.clone())));

    Ok(InvestmentSession::new(
        cfg.investor.account_id.clone(),
        cfg.session.unit_size,
        client.clone(),
        client,
        orders,
        engine,
        AuditLog::new(&cfg.session.audit_log),
    ))
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("autoinvest=info"));

    let json_logging = std::env::var("AUTOINVEST_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
