//! Dry-run order gateway.
//!
//! Logs the order it would have placed and reports every line as fully
//! executed. Never contacts the marketplace.

use async_trait::async_trait;
use tracing::info;

use super::OrderGateway;
use crate::types::{GatewayError, InvestmentOrder, ItemOutcome, OrderOutcome, ORDER_FULFILLED};

const GATEWAY_NAME: &str = "dry-run";

#[derive(Debug, Default, Clone)]
pub struct DryRunOrderGateway;

impl DryRunOrderGateway {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OrderGateway for DryRunOrderGateway {
    async fn submit(&self, order: &InvestmentOrder) -> Result<OrderOutcome, GatewayError> {
        let order_id = format!("dry-run-{}", uuid::Uuid::new_v4());

        for line in &order.lines {
            info!(
                order_id = %order_id,
                loan_id = %line.loan_id,
                amount = %line.requested_amount,
                "[DRY RUN] Would buy note"
            );
        }

        Ok(OrderOutcome {
            order_id,
            items: order
                .lines
                .iter()
                .map(|l| ItemOutcome {
                    loan_id: l.loan_id,
                    requested_amount: l.requested_amount,
                    invested_amount: l.requested_amount,
                    execution_status: vec![ORDER_FULFILLED.to_string()],
                })
                .collect(),
        })
    }

    fn name(&self) -> &str {
        GATEWAY_NAME
    }
}
