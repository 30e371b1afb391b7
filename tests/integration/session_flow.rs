//! Full session runs: balance → selection → order → audit entry.

use rust_decimal_macros::dec;
use std::path::PathBuf;
use std::sync::Arc;

use autoinvest::engine::session::{InvestmentSession, SessionError};
use autoinvest::gateways::dry_run::DryRunOrderGateway;
use autoinvest::gateways::OrderGateway;
use autoinvest::storage::AuditLog;
use autoinvest::strategy::selection::SelectionEngine;
use autoinvest::types::*;

use crate::mock_gateway::{eligible, FailAt, MockMarketplace};

fn temp_log() -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("autoinvest_it_{}.log", uuid::Uuid::new_v4()));
    p
}

fn session_on(market: &MockMarketplace, log: &PathBuf) -> InvestmentSession {
    let shared = Arc::new(market.clone());
    InvestmentSession::new(
        "inv-7",
        dec!(25),
        shared.clone(),
        shared.clone(),
        shared,
        SelectionEngine::default(),
        AuditLog::new(log),
    )
}

fn read_log(log: &PathBuf) -> String {
    std::fs::read_to_string(log).unwrap_or_default()
}

#[tokio::test]
async fn test_low_balance_never_touches_catalog() {
    let log = temp_log();
    let market = MockMarketplace::new(dec!(10), vec![eligible(1, dec!(12))]);

    let record = session_on(&market, &log).run().await.unwrap();

    assert_eq!(record.outcome.label(), "insufficient_funds");
    assert_eq!(market.calls(), vec!["available_cash"]);
    assert!(read_log(&log).contains("Only $10 in account - not enough money for loan"));
    let _ = std::fs::remove_file(&log);
}

#[tokio::test]
async fn test_buys_highest_rated_unowned_loans() {
    let log = temp_log();
    let mut risky = eligible(4, dec!(24));
    risky.debt_to_income = dec!(25);
    let market = MockMarketplace::new(
        dec!(60),
        vec![
            eligible(1, dec!(9)),
            eligible(2, dec!(12)),
            eligible(3, dec!(15)),
            risky,
            eligible(5, dec!(18)),
        ],
    )
    .with_holdings(&[5]);

    let record = session_on(&market, &log).run().await.unwrap();

    let orders = market.orders();
    assert_eq!(orders.len(), 1);
    let bought: Vec<LoanId> = orders[0].lines.iter().map(|l| l.loan_id).collect();
    assert_eq!(bought, vec![LoanId(2), LoanId(3)]);
    assert!(orders[0].lines.iter().all(|l| l.requested_amount == dec!(25)));
    assert_eq!(orders[0].account_id, "inv-7");

    assert_eq!(
        record.outcome,
        SessionOutcome::OrderPlaced {
            available_cash: dec!(60),
            requested: 2,
            order_id: "MOCK-1".into(),
            loans_fulfilled: 2,
        }
    );
    assert_eq!(
        market.calls(),
        vec!["available_cash", "open_listings", "held_loan_ids", "submit"]
    );

    let text = read_log(&log);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with("User inv-7: Session started"));
    assert_eq!(lines[1], "Order Successful; Order ID: MOCK-1");
    assert_eq!(lines[2], "2 loan(s) added");
    let _ = std::fs::remove_file(&log);
}

#[tokio::test]
async fn test_partial_fulfilment_reports_fulfilled_count() {
    let log = temp_log();
    let market = MockMarketplace::new(
        dec!(90),
        vec![eligible(1, dec!(9)), eligible(2, dec!(12)), eligible(3, dec!(15))],
    )
    .with_funded_elsewhere(&[2]);

    let record = session_on(&market, &log).run().await.unwrap();

    match record.outcome {
        SessionOutcome::OrderPlaced {
            requested,
            loans_fulfilled,
            ..
        } => {
            assert_eq!(requested, 3);
            assert_eq!(loans_fulfilled, 2);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(read_log(&log).contains("2 loan(s) added"));
    let _ = std::fs::remove_file(&log);
}

#[tokio::test]
async fn test_everything_funded_elsewhere_is_logged_failure() {
    let log = temp_log();
    let market = MockMarketplace::new(dec!(50), vec![eligible(1, dec!(9)), eligible(2, dec!(12))])
        .with_funded_elsewhere(&[1, 2]);

    let record = session_on(&market, &log).run().await.unwrap();

    assert_eq!(
        record.outcome,
        SessionOutcome::OrderUnfilled {
            available_cash: dec!(50),
            requested: 2,
            order_id: "MOCK-1".into(),
        }
    );
    assert!(read_log(&log).ends_with("Couldn't make loans. Perhaps they were funded?\n"));
    let _ = std::fs::remove_file(&log);
}

#[tokio::test]
async fn test_all_owned_means_no_loans() {
    let log = temp_log();
    let market = MockMarketplace::new(dec!(200), vec![eligible(1, dec!(9)), eligible(2, dec!(12))])
        .with_holdings(&[1, 2]);

    let record = session_on(&market, &log).run().await.unwrap();

    assert_eq!(record.outcome.label(), "no_loans");
    assert!(market.orders().is_empty());
    assert!(read_log(&log).ends_with("No loans available\n"));
    let _ = std::fs::remove_file(&log);
}

#[tokio::test]
async fn test_catalog_failure_aborts_without_log_line() {
    let log = temp_log();
    let market =
        MockMarketplace::new(dec!(100), vec![eligible(1, dec!(9))]).failing_at(FailAt::Listings);

    let err = session_on(&market, &log).run().await.unwrap_err();

    match err {
        SessionError::Gateway(e) => assert_eq!(e.status_code(), Some(500)),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(market.calls(), vec!["available_cash", "open_listings"]);
    assert!(!log.exists());
}

#[tokio::test]
async fn test_holdings_failure_aborts_without_log_line() {
    let log = temp_log();
    let market =
        MockMarketplace::new(dec!(100), vec![eligible(1, dec!(9))]).failing_at(FailAt::Holdings);

    let err = session_on(&market, &log).run().await.unwrap_err();

    match err {
        SessionError::Gateway(e) => assert_eq!(e.status_code(), Some(500)),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        market.calls(),
        vec!["available_cash", "open_listings", "held_loan_ids"]
    );
    assert!(market.orders().is_empty());
    assert!(!log.exists());
}

#[tokio::test]
async fn test_balance_failure_aborts_without_log_line() {
    let log = temp_log();
    let market =
        MockMarketplace::new(dec!(100), vec![eligible(1, dec!(9))]).failing_at(FailAt::Balance);

    let result = session_on(&market, &log).run().await;

    assert!(matches!(result, Err(SessionError::Gateway(_))));
    assert_eq!(market.calls(), vec!["available_cash"]);
    assert!(market.orders().is_empty());
    assert!(!log.exists());
}

#[tokio::test]
async fn test_order_failure_is_fatal_and_unlogged() {
    let log = temp_log();
    let market =
        MockMarketplace::new(dec!(100), vec![eligible(1, dec!(9))]).failing_at(FailAt::Order);

    let result = session_on(&market, &log).run().await;

    assert!(matches!(result, Err(SessionError::Gateway(_))));
    assert!(!log.exists());
}

#[tokio::test]
async fn test_repeated_runs_append_entries() {
    let log = temp_log();
    let market = MockMarketplace::new(dec!(10), Vec::new());
    let session = session_on(&market, &log);

    session.run().await.unwrap();
    session.run().await.unwrap();

    let text = read_log(&log);
    assert_eq!(text.matches("Session started").count(), 2);
    assert_eq!(market.calls(), vec!["available_cash", "available_cash"]);
    let _ = std::fs::remove_file(&log);
}

#[tokio::test]
async fn test_dry_run_gateway_end_to_end() {
    let log = temp_log();
    let market = Arc::new(MockMarketplace::new(
        dec!(75),
        vec![eligible(1, dec!(9)), eligible(2, dec!(12)), eligible(3, dec!(15))],
    ));
    let orders: Arc<dyn OrderGateway> = Arc::new(DryRunOrderGateway::new());
    let session = InvestmentSession::new(
        "inv-7",
        dec!(25),
        market.clone(),
        market.clone(),
        orders,
        SelectionEngine::default(),
        AuditLog::new(&log),
    );

    let record = session.run().await.unwrap();

    match &record.outcome {
        SessionOutcome::OrderPlaced {
            order_id,
            loans_fulfilled,
            ..
        } => {
            assert!(order_id.starts_with("dry-run-"));
            assert_eq!(*loans_fulfilled, 3);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(!market.calls().contains(&"submit"));
    let _ = std::fs::remove_file(&log);
}
