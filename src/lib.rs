//! AUTOINVEST: Automated peer-lending note purchasing agent
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod gateways;
pub mod strategy;
pub mod engine;
pub mod storage;
