//! Investment session.
//!
//! Runs one linear pass for a single account:
//! balance → budget → catalog + holdings → selection → order → audit.
//!
//! Every terminal state (insufficient funds, no eligible loans, order
//! success, order unfilled) appends exactly one audit entry. A gateway
//! failure aborts the run before anything is written, so a missing entry
//! means the run failed.

use rust_decimal::prelude::*;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::gateways::{AccountGateway, CatalogGateway, OrderGateway};
use crate::storage::AuditLog;
use crate::strategy::selection::SelectionEngine;
use crate::types::{GatewayError, InvestmentOrder, OrderStatus, SessionOutcome, SessionRecord};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Fatal session failures. Business outcomes are never errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("gateway call failed: {0}")]
    Gateway(#[from] GatewayError),

    #[error("failed to append audit entry: {0}")]
    Audit(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Budget
// ---------------------------------------------------------------------------

/// Number of notes `available_cash` can fund at `unit_size` each, or `None`
/// when the balance does not exceed a single unit. Fractional cash is
/// dropped first: only whole currency units count.
pub fn target_count(available_cash: Decimal, unit_size: Decimal) -> Option<usize> {
    let available_cash = available_cash.trunc();
    if unit_size <= Decimal::ZERO || available_cash <= unit_size {
        return None;
    }
    (available_cash / unit_size).floor().to_usize()
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Everything one session needs. Built once per process; each `run` is an
/// independent session with no state carried between calls.
pub struct InvestmentSession {
    account_id: String,
    unit_size: Decimal,
    accounts: Arc<dyn AccountGateway>,
    catalog: Arc<dyn CatalogGateway>,
    orders: Arc<dyn OrderGateway>,
    engine: SelectionEngine,
    audit: AuditLog,
}

impl InvestmentSession {
    pub fn new(
        account_id: impl Into<String>,
        unit_size: Decimal,
        accounts: Arc<dyn AccountGateway>,
        catalog: Arc<dyn CatalogGateway>,
        orders: Arc<dyn OrderGateway>,
        engine: SelectionEngine,
        audit: AuditLog,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            unit_size,
            accounts,
            catalog,
            orders,
            engine,
            audit,
        }
    }

    /// Run one session to a terminal state and append its audit entry.
    pub async fn run(&self) -> Result<SessionRecord, SessionError> {
        info!(account_id = %self.account_id, "Session started");

        let outcome = self.advance().await?;
        let record = SessionRecord::new(&self.account_id, outcome);
        if let Err(e) = self.audit.append(&record) {
            // The order may already have executed; keep its outcome visible.
            error!(record = %record, error = %e, "Audit entry could not be written");
            return Err(e.into());
        }

        info!(
            account_id = %self.account_id,
            outcome = record.outcome.label(),
            "Session complete"
        );
        Ok(record)
    }

    /// Walk the state machine without touching the audit log.
    async fn advance(&self) -> Result<SessionOutcome, GatewayError> {
        let available_cash = self
            .accounts
            .available_cash(&self.account_id)
            .await?
            .trunc();

        let Some(target) = target_count(available_cash, self.unit_size) else {
            info!(
                cash = %available_cash,
                unit = %self.unit_size,
                "Insufficient funds for a single note"
            );
            return Ok(SessionOutcome::InsufficientFunds { available_cash });
        };
        info!(cash = %available_cash, target, "Balance checked");

        let listings = self.catalog.open_listings().await?;
        let owned = self.catalog.held_loan_ids(&self.account_id).await?;

        let selected = self.engine.select(&listings, &owned, target);
        if selected.is_empty() {
            info!(listings = listings.len(), "No eligible loans");
            return Ok(SessionOutcome::NoEligibleLoans {
                available_cash,
                target_count: target,
            });
        }

        let order = InvestmentOrder::uniform(&self.account_id, &selected, self.unit_size);
        let requested = order.len();
        let outcome = self.orders.submit(&order).await?;

        for item in &outcome.items {
            info!(loan_id = %item.loan_id, status = %item.status(), "Order item");
        }

        match outcome.status() {
            OrderStatus::Success => {
                let loans_fulfilled = outcome.loans_fulfilled();
                if loans_fulfilled < requested {
                    info!(
                        requested,
                        fulfilled = loans_fulfilled,
                        "Order partially fulfilled"
                    );
                }
                Ok(SessionOutcome::OrderPlaced {
                    available_cash,
                    requested,
                    order_id: outcome.order_id,
                    loans_fulfilled,
                })
            }
            OrderStatus::Failure => {
                warn!(
                    order_id = %outcome.order_id,
                    requested,
                    "Order accepted but no loans fulfilled; likely funded by others"
                );
                Ok(SessionOutcome::OrderUnfilled {
                    available_cash,
                    requested,
                    order_id: outcome.order_id,
                })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
