//! Application layer containing the wallet's business logic orchestration.
//!
//! This module defines the `PaymentEngine`, the primary entry point for
//! initialising the wallet, reading its coins and paying from it.

pub mod engine;
