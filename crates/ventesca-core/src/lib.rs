//! # ventesca-core: Pure Business Logic for Ventesca
//!
//! This crate holds the business rules of Ventesca as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Ventesca Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web client                                   │   │
//! │  │    Current order ──► Line intents      Bulk repricing screens   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP / JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/server (axum)                           │   │
//! │  │    intent dispatch, catalog endpoints, error mapping            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ ventesca-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  pricing  │  │   bulk    │  │ validation│  │   │
//! │  │   │  Product  │  │ LineTotals│  │ new price │  │   rules   │  │   │
//! │  │   │  Discount │  │ line type │  │ lifecycle │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 ventesca-db (Database Layer)                    │   │
//! │  │         SQLite queries, migrations, execute/revert transactions │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Discount, ProductOrder, BulkPriceModification, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - Line-pricing engine and the line type state machine
//! - [`bulk`] - Bulk repricing arithmetic, lifecycle and projection
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use ventesca_core::pricing::{calculate_totals, PricedLine};
//! use ventesca_core::{LineType, Money};
//!
//! let line = PricedLine::new(2, Money::from_minor(1500), Vec::new());
//! let totals = calculate_totals(&line, LineType::Sell);
//! assert_eq!(totals.total_price.minor(), 3000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bulk;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, FieldError, ValidationError, ValidationErrors};
pub use money::Money;
pub use types::*;

// =============================================================================
// Limits
// =============================================================================

/// Highest price, cost or fixed amount accepted, in minor units.
///
/// ## Business Reason
/// Keeps `price × quantity` and every bulk adjustment inside i64.
pub const MAX_PRICE: i64 = 10_000_000_000;

/// Highest stock level a product may hold.
pub const MAX_STOCK: i64 = 100_000_000;

/// Highest quantity a single order line may carry.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 100000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 1_000_000;

/// Highest PERCENTAGE bulk adjustment.
pub const MAX_ADJUSTMENT_PERCENT: i64 = 1_000;
