//! Marketplace gateways.
//!
//! Defines the three remote contracts the session consumes and provides:
//! - LendingClub: the real investor REST API (all three traits)
//! - Dry run: an order gateway that never contacts the marketplace

pub mod dry_run;
pub mod lending_club;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::types::{GatewayError, HoldingSet, InvestmentOrder, LoanListing, OrderOutcome};

/// Reports uninvested cash for an account.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountGateway: Send + Sync {
    async fn available_cash(&self, account_id: &str) -> Result<Decimal, GatewayError>;
}

/// Lists open loans and the loans an account already holds.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Every listing currently open for investment, in marketplace order.
    async fn open_listings(&self) -> Result<Vec<LoanListing>, GatewayError>;

    /// Ids of loans the account already owns a note in.
    async fn held_loan_ids(&self, account_id: &str) -> Result<HoldingSet, GatewayError>;
}

/// Submits batch purchase orders.
///
/// Implementations must not retry a submission: the marketplace offers no
/// idempotency key, so a retry can buy the same notes twice.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn submit(&self, order: &InvestmentOrder) -> Result<OrderOutcome, GatewayError>;

    /// Gateway name for logging.
    fn name(&self) -> &str;
}
