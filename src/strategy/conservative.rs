//! Conservative note policy.
//!
//! Accepts only borrowers with moderate leverage, a clean public record,
//! no recent credit shopping, owned or mortgaged housing, and no recent
//! delinquency. Ranks survivors by interest rate.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use super::{Rejection, SelectionPolicy};
use crate::types::{HoldingSet, LoanListing};

const POLICY_NAME: &str = "conservative";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Thresholds for `ConservativePolicy`. Every field has a default, so a
/// `[policy]` table may override only what it needs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Inclusive upper bound on debt-to-income, in percent.
    pub max_debt_to_income: Decimal,
    pub max_public_records: u32,
    pub max_inquiries_last_6_months: u32,
    /// Inclusive bound; unknown delinquency history always passes.
    pub max_months_since_delinquency: u32,
    pub purposes: Vec<String>,
    pub home_ownership: Vec<String>,
    pub excluded_states: Vec<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            max_debt_to_income: dec!(20),
            max_public_records: 0,
            max_inquiries_last_6_months: 0,
            max_months_since_delinquency: 24,
            purposes: vec![
                "debt_consolidation".into(),
                "renewable_energy".into(),
                "wedding".into(),
                "credit_card".into(),
            ],
            home_ownership: vec!["OWN".into(), "MORTGAGE".into()],
            excluded_states: vec!["CA".into(), "FL".into()],
        }
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ConservativePolicy {
    config: PolicyConfig,
}

impl ConservativePolicy {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }
}

impl SelectionPolicy for ConservativePolicy {
    fn evaluate(&self, listing: &LoanListing, owned: &HoldingSet) -> Result<(), Rejection> {
        let c = &self.config;

        if owned.contains(&listing.id) {
            return Err(Rejection::AlreadyOwned);
        }
        if listing.debt_to_income > c.max_debt_to_income {
            return Err(Rejection::DebtToIncome {
                dti: listing.debt_to_income,
                max: c.max_debt_to_income,
            });
        }
        if listing.public_records > c.max_public_records {
            return Err(Rejection::PublicRecords(listing.public_records));
        }
        if !c.purposes.iter().any(|p| p == &listing.purpose) {
            return Err(Rejection::Purpose(listing.purpose.clone()));
        }
        if listing.inquiries_last_6_months > c.max_inquiries_last_6_months {
            return Err(Rejection::RecentInquiries(listing.inquiries_last_6_months));
        }
        if !c.home_ownership.iter().any(|h| h == &listing.home_ownership) {
            return Err(Rejection::HomeOwnership(listing.home_ownership.clone()));
        }
        if c.excluded_states.iter().any(|s| s == &listing.address_state) {
            return Err(Rejection::ExcludedState(listing.address_state.clone()));
        }
        match listing.months_since_last_delinquency {
            Some(m) if m > c.max_months_since_delinquency => {
                Err(Rejection::RecentDelinquency(m))
            }
            _ => Ok(()),
        }
    }

    fn rank_key(&self, listing: &LoanListing) -> Decimal {
        listing.interest_rate
    }

    fn name(&self) -> &str {
        POLICY_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
