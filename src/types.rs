//! Shared types for the AUTOINVEST agent.
//!
//! These types form the data model used across all modules.
//! Gateways produce them, the strategy layer reads them, and the
//! session engine turns them into audit records.

use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Marketplace status string that marks a requested note as executed.
pub const ORDER_FULFILLED: &str = "ORDER_FULFILLED";

// ---------------------------------------------------------------------------
// Listings & holdings
// ---------------------------------------------------------------------------

/// Opaque marketplace loan identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(pub u64);

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Loans the investor already owns a note in. Fetched fresh every run.
pub type HoldingSet = HashSet<LoanId>;

/// An open loan offer, as seen in one catalog snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanListing {
    pub id: LoanId,
    /// Annualised interest rate, in percent (e.g. 13.56).
    pub interest_rate: Decimal,
    /// Debt-to-income ratio, in percent.
    pub debt_to_income: Decimal,
    pub public_records: u32,
    /// Marketplace purpose category, e.g. "debt_consolidation".
    pub purpose: String,
    pub inquiries_last_6_months: u32,
    /// OWN | MORTGAGE | RENT | OTHER | ...
    pub home_ownership: String,
    /// Two-letter state code.
    pub address_state: String,
    /// `None` when the borrower has no recorded delinquency.
    pub months_since_last_delinquency: Option<u32>,
}

impl fmt::Display for LoanListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "loan {} ({}% | dti={}% | {} | {} | {})",
            self.id,
            self.interest_rate,
            self.debt_to_income,
            self.purpose,
            self.home_ownership,
            self.address_state,
        )
    }
}

impl LoanListing {
    /// Helper to build a test listing that passes the default policy.
    #[cfg(test)]
    pub fn sample(id: u64, interest_rate: Decimal) -> Self {
        LoanListing {
            id: LoanId(id),
            interest_rate,
            debt_to_income: Decimal::new(125, 1),
            public_records: 0,
            purpose: "debt_consolidation".to_string(),
            inquiries_last_6_months: 0,
            home_ownership: "MORTGAGE".to_string(),
            address_state: "NY".to_string(),
            months_since_last_delinquency: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// One line of a batch purchase request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub loan_id: LoanId,
    pub requested_amount: Decimal,
}

/// A batch purchase request for one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentOrder {
    pub account_id: String,
    pub lines: Vec<OrderLine>,
}

impl InvestmentOrder {
    /// Build an order buying `unit_size` of every loan in `loan_ids`,
    /// preserving their order.
    pub fn uniform(account_id: &str, loan_ids: &[LoanId], unit_size: Decimal) -> Self {
        Self {
            account_id: account_id.to_string(),
            lines: loan_ids
                .iter()
                .map(|&loan_id| OrderLine {
                    loan_id,
                    requested_amount: unit_size,
                })
                .collect(),
        }
    }

    /// Total cash this order would commit if fully filled.
    pub fn total_requested(&self) -> Decimal {
        self.lines.iter().map(|l| l.requested_amount).sum()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Per-item execution result, derived from the marketplace status list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    Fulfilled,
    /// Executed, but for less than the requested amount.
    PartiallyFilled,
    Rejected { reason: String },
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionStatus::Fulfilled => write!(f, "fulfilled"),
            ExecutionStatus::PartiallyFilled => write!(f, "partially filled"),
            ExecutionStatus::Rejected { reason } => write!(f, "rejected ({reason})"),
        }
    }
}

/// Confirmation for a single requested loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemOutcome {
    pub loan_id: LoanId,
    pub requested_amount: Decimal,
    pub invested_amount: Decimal,
    /// Raw marketplace status codes, e.g. `["ORDER_FULFILLED"]`.
    pub execution_status: Vec<String>,
}

impl ItemOutcome {
    /// Whether the marketplace reports this note as executed.
    pub fn is_fulfilled(&self) -> bool {
        self.execution_status.iter().any(|s| s == ORDER_FULFILLED)
    }

    pub fn status(&self) -> ExecutionStatus {
        if !self.is_fulfilled() {
            let reason = if self.execution_status.is_empty() {
                "unknown".to_string()
            } else {
                self.execution_status.join(",")
            };
            return ExecutionStatus::Rejected { reason };
        }
        if self.invested_amount < self.requested_amount {
            ExecutionStatus::PartiallyFilled
        } else {
            ExecutionStatus::Fulfilled
        }
    }
}

/// Business-level result of a submitted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Success,
    Failure,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Success => write!(f, "success"),
            OrderStatus::Failure => write!(f, "failure"),
        }
    }
}

/// What the marketplace reported back for an `InvestmentOrder`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderOutcome {
    pub order_id: String,
    pub items: Vec<ItemOutcome>,
}

impl OrderOutcome {
    /// Notes actually executed, fully or partially.
    pub fn loans_fulfilled(&self) -> usize {
        self.items.iter().filter(|i| i.is_fulfilled()).count()
    }

    /// Success iff at least one note was executed. Partial fulfilment of a
    /// batch is still a success.
    pub fn status(&self) -> OrderStatus {
        if self.loans_fulfilled() > 0 {
            OrderStatus::Success
        } else {
            OrderStatus::Failure
        }
    }

    /// Sum invested across all executed notes.
    pub fn total_invested(&self) -> Decimal {
        self.items
            .iter()
            .filter(|i| i.is_fulfilled())
            .map(|i| i.invested_amount)
            .sum()
    }
}

// ---------------------------------------------------------------------------
// Session records
// ---------------------------------------------------------------------------

/// Terminal state reached by one investment session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionOutcome {
    /// Not enough cash to buy a single note.
    InsufficientFunds { available_cash: Decimal },
    /// Cash was available but nothing in the catalog passed the policy.
    NoEligibleLoans {
        available_cash: Decimal,
        target_count: usize,
    },
    /// Order accepted and at least one note executed.
    OrderPlaced {
        available_cash: Decimal,
        requested: usize,
        order_id: String,
        loans_fulfilled: usize,
    },
    /// Order accepted but every note was funded by someone else first.
    OrderUnfilled {
        available_cash: Decimal,
        requested: usize,
        order_id: String,
    },
}

impl SessionOutcome {
    /// Short path label, also used as a structured log field.
    pub fn label(&self) -> &'static str {
        match self {
            SessionOutcome::InsufficientFunds { .. } => "insufficient_funds",
            SessionOutcome::NoEligibleLoans { .. } => "no_loans",
            SessionOutcome::OrderPlaced { .. } => "success",
            SessionOutcome::OrderUnfilled { .. } => "failure",
        }
    }
}

/// The audit entry written once per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub timestamp: DateTime<Local>,
    pub investor_id: String,
    pub outcome: SessionOutcome,
}

/// Timestamp layout used in the audit log.
pub const AUDIT_TIME_FORMAT: &str = "%d/%m/%Y %H:%M";

impl SessionRecord {
    pub fn new(investor_id: &str, outcome: SessionOutcome) -> Self {
        Self {
            timestamp: Local::now(),
            investor_id: investor_id.to_string(),
            outcome,
        }
    }

    /// Render the human-readable line group for the audit log.
    /// Always ends with a newline.
    pub fn to_log_lines(&self) -> String {
        let mut out = format!(
            "{} User {}: Session started\n",
            self.timestamp.format(AUDIT_TIME_FORMAT),
            self.investor_id,
        );
        match &self.outcome {
            SessionOutcome::InsufficientFunds { available_cash } => {
                out.push_str(&format!(
                    "Only ${available_cash} in account - not enough money for loan\n"
                ));
            }
            SessionOutcome::NoEligibleLoans { .. } => {
                out.push_str("No loans available\n");
            }
            SessionOutcome::OrderPlaced {
                order_id,
                loans_fulfilled,
                ..
            } => {
                out.push_str(&format!(
                    "Order Successful; Order ID: {order_id}\n{loans_fulfilled} loan(s) added\n"
                ));
            }
            SessionOutcome::OrderUnfilled { .. } => {
                out.push_str("Couldn't make loans. Perhaps they were funded?\n");
            }
        }
        out
    }
}

impl fmt::Display for SessionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] investor={} outcome={}",
            self.timestamp.format(AUDIT_TIME_FORMAT),
            self.investor_id,
            self.outcome.label(),
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// A remote call that did not complete successfully.
///
/// Always fatal for the current session. Never retried: order submission
/// is not idempotent on the marketplace side.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("{endpoint} request failed: {message}")]
    Transport { endpoint: String, message: String },

    #[error("{endpoint} returned a malformed response: {message}")]
    Malformed { endpoint: String, message: String },
}

impl GatewayError {
    /// HTTP status code, when the remote answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            GatewayError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
