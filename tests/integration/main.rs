//! End-to-end session tests against an in-memory marketplace.

mod mock_gateway;
mod session_flow;
