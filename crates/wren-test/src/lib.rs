//! Wren Test - Shared test utilities for the Wren agent runtime.
//!
//! This crate provides mock port implementations, fixtures, and a shared
//! `MemoryPort` conformance suite that other `wren-*` crates pull in as a
//! dev-dependency.
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! wren-test.workspace = true
//! ```
//!
//! Then use in your tests:
//!
//! ```rust,ignore
//! #[cfg(test)]
//! mod tests {
//!     use wren_test::{test_approval_request, MockLlmProvider};
//!
//!     #[tokio::test]
//!     async fn test_a_scripted_turn() {
//!         let provider = MockLlmProvider::new("test-model").queue_text("hi");
//!         // ...
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod contract;
pub mod fixtures;
pub mod harness;
pub mod mocks;
pub mod prelude;

pub use contract::memory_port_contract_suite;
pub use fixtures::*;
pub use harness::*;
pub use mocks::*;
