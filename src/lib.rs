//! # suretrack
//!
//! Tracking library and CLI for sports-arbitrage ("surebet") betting
//! operations: stake balancing across 2- and 3-outcome structures, cash
//! ledger reconciliation with an explicit compare-and-swap status guard,
//! idempotent per-leg settlement and investor/caixa reporting, all over a
//! hosted relational backend reached through its REST surface.
//!
//! ## Quick Start
//!
//! ```no_run
//! use suretrack::{BackendApiClient, Config, LedgerService};
//! use rust_decimal::Decimal;
//!
//! # async fn example() -> suretrack::Result<()> {
//! // Load configuration from config.toml
//! let config = Config::new()?;
//! let ledger = LedgerService::new(BackendApiClient::new(config));
//!
//! // List pending cash movements awaiting reconciliation
//! let pending = ledger.list_pending(None).await?;
//!
//! // Confirm one of them; losing the status guard to another user
//! // surfaces as Error::Conflict with no side effects.
//! if let Some(tx) = pending.first().and_then(|t| t.id) {
//!     let outcome = ledger.confirm_transaction(tx, Decimal::new(15000, 2)).await?;
//!     println!("confirmed at {}", outcome.valor_confirmado);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Stake balancing
//!
//! The calculator is pure and UI-free: describe the legs, get derived
//! stakes and a per-outcome scenario table back.
//!
//! ```
//! use suretrack::stake::{balance_stakes, scenario_table, CalcOptions, LegInput};
//! use rust_decimal::Decimal;
//!
//! let legs = vec![
//!     LegInput::simple(Decimal::new(200, 2), Decimal::new(100, 0)), // 2.00 @ 100
//!     LegInput::simple(Decimal::new(180, 2), Decimal::ZERO),        // 1.80, derived
//! ];
//! let opts = CalcOptions { rounding_increment: Some(Decimal::ONE) };
//! let balanced = balance_stakes(&legs, 0, &opts).unwrap();
//! assert_eq!(balanced.stakes[1], Decimal::new(111, 0));
//! ```
//!
//! ## Configuration
//!
//! Create a `config.toml` with the backend coordinates:
//!
//! ```toml
//! [backend]
//! url = "https://your-project.backend.co"
//! api_key = "service_role_or_anon_key"
//! schema = "public"
//! operator = "alice"
//! ```

pub mod api_client;
pub mod balance;
pub mod config;
pub mod dto;
pub mod error;
pub mod ledger;
pub mod operations;
pub mod rate_limiter;
pub mod report;
pub mod settlement;
pub mod stake;

// Re-export commonly used types at the crate root
pub use api_client::BackendApiClient;
pub use config::Config;
pub use dto::*;
pub use error::{Error, Result};
pub use ledger::LedgerService;
pub use operations::OperationService;
