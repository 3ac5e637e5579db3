//! # ventesca-db: Database Layer for Ventesca
//!
//! This crate provides database access for the Ventesca server.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Ventesca Data Flow                               │
//! │                                                                         │
//! │  HTTP intent (add-product, execute-bulk, ...)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                    ventesca-db (THIS CRATE)                     │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐   │    │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │   │    │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │   │    │
//! │  │   │               │    │ ProductRepo    │    │ 001_initial  │   │    │
//! │  │   │ SqlitePool    │◄───│ DiscountRepo   │    │   _schema    │   │    │
//! │  │   │ Connection    │    │ OrderRepo      │    │              │   │    │
//! │  │   │ Management    │    │ BulkModRepo    │    │              │   │    │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘   │    │
//! │  │                                                                 │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (VENTESCA_DATABASE_PATH)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ventesca_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./ventesca.db")).await?;
//!
//! let order = db.orders().open_current(&tenant_id, &seller_id).await?;
//! let bulk = db.bulk_modifications().execute(&tenant_id, &bulk_id, &user_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::bulk::BulkModificationRepository;
pub use repository::catalog::{CategoryRepository, SupplierRepository};
pub use repository::discount::DiscountRepository;
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
