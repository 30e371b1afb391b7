//! Core engine: one balance → select → order → audit pass.

pub mod session;
