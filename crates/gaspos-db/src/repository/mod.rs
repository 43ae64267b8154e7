//! # Repository Module
//!
//! Database repository implementations for GasPOS payroll.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Back-Office Command                                                   │
//! │       │                                                                 │
//! │       │  db.attendance().list_between(start, end)                      │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  AttendanceRepository                                                  │
//! │  ├── upsert(&self, record)                                             │
//! │  ├── get(&self, employee_id, date)                                     │
//! │  └── list_between(&self, start, end)                                   │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • Easy to test (in-memory database per test)                          │
//! │  • SQL is isolated in one place                                        │
//! │  • Core types never learn about SQL                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`employee::EmployeeRepository`] - Employee CRUD and balance updates
//! - [`attendance::AttendanceRepository`] - One-record-per-day punch storage
//! - [`payroll::PayrollRepository`] - Drafts, history, finalization transaction
//! - [`outbox::OutboxRepository`] - Sync queue management

pub mod attendance;
pub mod employee;
pub mod outbox;
pub mod payroll;
