//! LendingClub investor API integration.
//!
//! Implements all three gateway traits against the REST API.
//!
//! Base URL: https://api.lendingclub.com/api/investor/{version}
//! Auth: `Authorization: {token}` on every request.
//! Requests use explicit timeouts from `[api]` config and are never retried.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::{AccountGateway, CatalogGateway, OrderGateway};
use crate::config::ApiConfig;
use crate::types::{
    GatewayError, HoldingSet, InvestmentOrder, ItemOutcome, LoanId, LoanListing, OrderOutcome,
};

const GATEWAY_NAME: &str = "lending_club";

// ---------------------------------------------------------------------------
// API response types (LendingClub JSON → Rust)
// ---------------------------------------------------------------------------

/// `GET accounts/{id}/availablecash`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AvailableCashResponse {
    available_cash: Decimal,
}

/// `GET loans/listing`. The `loans` key is omitted when nothing is listed.
#[derive(Debug, Deserialize)]
struct ListingResponse {
    #[serde(default)]
    loans: Vec<WireListing>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireListing {
    id: u64,
    int_rate: Decimal,
    dti: Decimal,
    pub_rec: u32,
    purpose: String,
    inq_last6_mths: u32,
    home_ownership: String,
    addr_state: String,
    #[serde(default)]
    mths_since_last_delinq: Option<u32>,
}

impl From<WireListing> for LoanListing {
    fn from(w: WireListing) -> Self {
        LoanListing {
            id: LoanId(w.id),
            interest_rate: w.int_rate,
            debt_to_income: w.dti,
            public_records: w.pub_rec,
            purpose: w.purpose,
            inquiries_last_6_months: w.inq_last6_mths,
            home_ownership: w.home_ownership,
            address_state: w.addr_state,
            months_since_last_delinquency: w.mths_since_last_delinq,
        }
    }
}

/// `GET accounts/{id}/notes`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotesResponse {
    #[serde(default)]
    my_notes: Vec<WireNote>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireNote {
    loan_id: u64,
}

/// `POST accounts/{id}/orders` request body.
#[derive(Debug, Serialize)]
struct OrderRequest {
    aid: serde_json::Value,
    orders: Vec<WireOrder>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireOrder {
    loan_id: u64,
    requested_amount: Decimal,
}

impl OrderRequest {
    fn from_order(order: &InvestmentOrder) -> Self {
        // The API expects a numeric account id; pass anything else through.
        let aid = order
            .account_id
            .parse::<u64>()
            .map(serde_json::Value::from)
            .unwrap_or_else(|_| serde_json::Value::from(order.account_id.clone()));
        Self {
            aid,
            orders: order
                .lines
                .iter()
                .map(|l| WireOrder {
                    loan_id: l.loan_id.0,
                    requested_amount: l.requested_amount,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderResponse {
    order_instruct_id: serde_json::Value,
    #[serde(default)]
    order_confirmations: Vec<WireConfirmation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireConfirmation {
    loan_id: u64,
    #[serde(default)]
    requested_amount: Decimal,
    #[serde(default)]
    invested_amount: Decimal,
    #[serde(default)]
    execution_status: Vec<String>,
}

impl OrderResponse {
    fn into_outcome(self) -> OrderOutcome {
        let order_id = match self.order_instruct_id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        OrderOutcome {
            order_id,
            items: self
                .order_confirmations
                .into_iter()
                .map(|c| ItemOutcome {
                    loan_id: LoanId(c.loan_id),
                    requested_amount: c.requested_amount,
                    invested_amount: c.invested_amount,
                    execution_status: c.execution_status,
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// LendingClub investor API client.
pub struct LendingClubClient {
    http: Client,
    base_url: String,
    token: SecretString,
}

impl LendingClubClient {
    /// Build a client from `[api]` config and a resolved auth token.
    pub fn new(api: &ApiConfig, token: SecretString) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .connect_timeout(Duration::from_secs(api.connect_timeout_secs))
            .user_agent("AUTOINVEST/0.1.0 (note-purchasing-agent)")
            .build()
            .context("Failed to build HTTP client for LendingClub")?;

        Ok(Self {
            http,
            base_url: format!("{}/{}", api.base_url.trim_end_matches('/'), api.version),
            token,
        })
    }

    // -- Internal helpers ------------------------------------------------

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn account_path(account_id: &str, tail: &str) -> String {
        format!("accounts/{}/{tail}", urlencoding::encode(account_id))
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("Authorization", self.token.expose_secret().as_str())
            .header("Accept", "application/json")
    }

    /// Send a request and decode a 2xx JSON body. Anything else is a
    /// `GatewayError`.
    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        req: RequestBuilder,
    ) -> Result<T, GatewayError> {
        let resp = self
            .authorized(req)
            .send()
            .await
            .map_err(|e| GatewayError::Transport {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                endpoint: endpoint.to_string(),
                status,
                body,
            });
        }

        let body = resp.text().await.map_err(|e| GatewayError::Transport {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;

        decode(endpoint, &body)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let url = self.url(path);
        debug!(url = %url, "LendingClub GET");
        self.send_json(path, self.http.get(&url)).await
    }
}

fn decode<T: DeserializeOwned>(endpoint: &str, body: &str) -> Result<T, GatewayError> {
    serde_json::from_str(body).map_err(|e| GatewayError::Malformed {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Gateway trait implementations
// ---------------------------------------------------------------------------

#[async_trait]
impl AccountGateway for LendingClubClient {
    async fn available_cash(&self, account_id: &str) -> Result<Decimal, GatewayError> {
        let resp: AvailableCashResponse = self
            .get_json(&Self::account_path(account_id, "availablecash"))
            .await?;
        // Only whole currency units are investable.
        let cash = resp.available_cash.trunc();
        debug!(account_id, cash = %cash, "Available cash fetched");
        Ok(cash)
    }
}

#[async_trait]
impl CatalogGateway for LendingClubClient {
    async fn open_listings(&self) -> Result<Vec<LoanListing>, GatewayError> {
        let resp: ListingResponse = self.get_json("loans/listing").await?;
        let listings: Vec<LoanListing> = resp.loans.into_iter().map(LoanListing::from).collect();
        info!(count = listings.len(), "LendingClub listings fetched");
        Ok(listings)
    }

    async fn held_loan_ids(&self, account_id: &str) -> Result<HoldingSet, GatewayError> {
        let resp: NotesResponse = self
            .get_json(&Self::account_path(account_id, "notes"))
            .await?;
        let held: HoldingSet = resp.my_notes.into_iter().map(|n| LoanId(n.loan_id)).collect();
        debug!(account_id, held = held.len(), "Holdings fetched");
        Ok(held)
    }
}

#[async_trait]
impl OrderGateway for LendingClubClient {
    /// Submit the order once. A non-2xx answer surfaces as
    /// `GatewayError::Status` carrying the response body.
    async fn submit(&self, order: &InvestmentOrder) -> Result<OrderOutcome, GatewayError> {
        let path = Self::account_path(&order.account_id, "orders");
        let url = self.url(&path);
        let body = OrderRequest::from_order(order);

        info!(
            account_id = %order.account_id,
            loans = order.len(),
            total = %order.total_requested(),
            "Submitting LendingClub order"
        );

        let resp: OrderResponse = self.send_json(&path, self.http.post(&url).json(&body)).await?;
        Ok(resp.into_outcome())
    }

    fn name(&self) -> &str {
        GATEWAY_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
