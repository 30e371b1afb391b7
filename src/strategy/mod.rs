//! Strategy layer: listing eligibility, ranking, and selection.
//!
//! The policy decides which listings are acceptable and how they rank.
//! The selection engine applies a policy to a catalog snapshot and picks
//! exactly enough loans to deploy the available cash.

pub mod conservative;
pub mod selection;

use rust_decimal::Decimal;
use std::fmt;

use crate::types::{HoldingSet, LoanListing};

// ---------------------------------------------------------------------------
// Rejections
// ---------------------------------------------------------------------------

/// Why a listing did not survive the eligibility filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    AlreadyOwned,
    DebtToIncome { dti: Decimal, max: Decimal },
    PublicRecords(u32),
    Purpose(String),
    RecentInquiries(u32),
    HomeOwnership(String),
    ExcludedState(String),
    RecentDelinquency(u32),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::AlreadyOwned => write!(f, "already owned"),
            Rejection::DebtToIncome { dti, max } => write!(f, "dti {dti}% > {max}%"),
            Rejection::PublicRecords(n) => write!(f, "{n} public record(s)"),
            Rejection::Purpose(p) => write!(f, "purpose '{p}' not accepted"),
            Rejection::RecentInquiries(n) => write!(f, "{n} inquiry(ies) in last 6 months"),
            Rejection::HomeOwnership(h) => write!(f, "home ownership '{h}' not accepted"),
            Rejection::ExcludedState(s) => write!(f, "state {s} excluded"),
            Rejection::RecentDelinquency(m) => write!(f, "delinquent {m} month(s) ago"),
        }
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// The tunable part of the agent: an eligibility predicate and a scalar
/// ranking key. Implementations must be pure.
pub trait SelectionPolicy: Send + Sync {
    /// `Ok(())` if the listing may be bought, otherwise the first failed
    /// criterion.
    fn evaluate(&self, listing: &LoanListing, owned: &HoldingSet) -> Result<(), Rejection>;

    /// Ranking key. Higher keys are preferred.
    fn rank_key(&self, listing: &LoanListing) -> Decimal;

    /// Policy name for logging.
    fn name(&self) -> &str;

    fn is_eligible(&self, listing: &LoanListing, owned: &HoldingSet) -> bool {
        self.evaluate(listing, owned).is_ok()
    }
}
