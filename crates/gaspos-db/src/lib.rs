//! # gaspos-db: Database Layer for GasPOS Payroll
//!
//! This crate provides database access for the GasPOS back-office.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        GasPOS Data Flow                                 │
//! │                                                                         │
//! │  Back-Office Command (generate_payroll)                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     gaspos-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (employee.rs) │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ EmployeeRepo  │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │◄───│ AttendanceRepo│    │ ...          │  │   │
//! │  │   │ Management    │    │ PayrollRepo   │    │              │  │   │
//! │  │   │               │    │ OutboxRepo    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (WAL mode)                                                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`pool`] - Connection pool and the [`pool::Database`] handle
//! - [`migrations`] - Embedded schema migrations
//! - [`repository`] - Employee, attendance, payroll, and outbox repositories
//! - [`error`] - Database error types
//!
//! ## Division of Labor With gaspos-core
//!
//! The payroll engine never sees SQL; this crate never computes pay.
//! A finalization is the one place they meet: the engine produces a
//! [`gaspos_core::engine::FinalizeOutcome`] and
//! [`repository::payroll::PayrollRepository::commit_finalization`] persists
//! it atomically.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use gaspos_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./gaspos.db")).await?;
//!
//! let employees = db.employees().list().await?;
//! let attendance = db.attendance().list_between(start, end).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::attendance::AttendanceRepository;
pub use repository::employee::EmployeeRepository;
pub use repository::outbox::{OutboxEntry, OutboxRepository};
pub use repository::payroll::PayrollRepository;
