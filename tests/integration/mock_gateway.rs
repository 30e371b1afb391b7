//! Mock marketplace for integration testing.
//!
//! Provides a deterministic in-memory implementation of all three gateway
//! traits. Balance, listings, holdings, and order confirmations are fully
//! controllable from test code, and every call is recorded.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use autoinvest::gateways::{AccountGateway, CatalogGateway, OrderGateway};
use autoinvest::types::*;

/// Which remote call to fail with HTTP 500.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Balance,
    Listings,
    Holdings,
    Order,
}

/// A mock marketplace for deterministic testing.
#[derive(Clone)]
pub struct MockMarketplace {
    balance: Decimal,
    listings: Vec<LoanListing>,
    holdings: HashSet<LoanId>,
    /// Loans another investor funds between listing fetch and order.
    funded_elsewhere: HashSet<LoanId>,
    fail_at: Option<FailAt>,
    calls: Arc<Mutex<Vec<&'static str>>>,
    orders: Arc<Mutex<Vec<InvestmentOrder>>>,
}

impl MockMarketplace {
    pub fn new(balance: Decimal, listings: Vec<LoanListing>) -> Self {
        Self {
            balance,
            listings,
            holdings: HashSet::new(),
            funded_elsewhere: HashSet::new(),
            fail_at: None,
            calls: Arc::new(Mutex::new(Vec::new())),
            orders: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_holdings(mut self, ids: &[u64]) -> Self {
        self.holdings = ids.iter().map(|&i| LoanId(i)).collect();
        self
    }

    pub fn with_funded_elsewhere(mut self, ids: &[u64]) -> Self {
        self.funded_elsewhere = ids.iter().map(|&i| LoanId(i)).collect();
        self
    }

    pub fn failing_at(mut self, at: FailAt) -> Self {
        self.fail_at = Some(at);
        self
    }

    /// Names of remote calls made so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    /// Orders submitted so far.
    pub fn orders(&self) -> Vec<InvestmentOrder> {
        self.orders.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str, at: FailAt) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push(call);
        if self.fail_at == Some(at) {
            return Err(GatewayError::Status {
                endpoint: call.to_string(),
                status: 500,
                body: "internal error".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AccountGateway for MockMarketplace {
    async fn available_cash(&self, _account_id: &str) -> Result<Decimal, GatewayError> {
        self.record("available_cash", FailAt::Balance)?;
        Ok(self.balance)
    }
}

#[async_trait]
impl CatalogGateway for MockMarketplace {
    async fn open_listings(&self) -> Result<Vec<LoanListing>, GatewayError> {
        self.record("open_listings", FailAt::Listings)?;
        Ok(self.listings.clone())
    }

    async fn held_loan_ids(&self, _account_id: &str) -> Result<HoldingSet, GatewayError> {
        self.record("held_loan_ids", FailAt::Holdings)?;
        Ok(self.holdings.clone())
    }
}

#[async_trait]
impl OrderGateway for MockMarketplace {
    async fn submit(&self, order: &InvestmentOrder) -> Result<OrderOutcome, GatewayError> {
        self.record("submit", FailAt::Order)?;
        self.orders.lock().unwrap().push(order.clone());

        let items = order
            .lines
            .iter()
            .map(|line| {
                let funded = self.funded_elsewhere.contains(&line.loan_id);
                ItemOutcome {
                    loan_id: line.loan_id,
                    requested_amount: line.requested_amount,
                    invested_amount: if funded { Decimal::ZERO } else { line.requested_amount },
                    execution_status: vec![if funded {
                        "NOT_AN_IN_FUNDING_LOAN".to_string()
                    } else {
                        ORDER_FULFILLED.to_string()
                    }],
                }
            })
            .collect();

        Ok(OrderOutcome {
            order_id: format!("MOCK-{}", self.orders.lock().unwrap().len()),
            items,
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A listing that passes the default policy.
pub fn eligible(id: u64, rate: Decimal) -> LoanListing {
    LoanListing {
        id: LoanId(id),
        interest_rate: rate,
        debt_to_income: Decimal::from(10),
        public_records: 0,
        purpose: "credit_card".to_string(),
        inquiries_last_6_months: 0,
        home_ownership: "OWN".to_string(),
        address_state: "TX".to_string(),
        months_since_last_delinquency: None,
    }
}
