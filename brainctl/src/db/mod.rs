//! Database layer for data persistence and access.
//!
//! This module implements the data access layer using SQLx with PostgreSQL,
//! following the repository pattern:
//!
//! - [`handlers`]: Repository implementations for CRUD operations
//! - [`models`]: Database record structures matching table schemas
//! - [`errors`]: Database-specific error types
//!
//! Each entity (users, API keys, brains, brain files) has a repository that
//! encapsulates all database access for that table. Repositories borrow a
//! `PgConnection`, so callers decide whether an operation runs on a pool
//! connection or inside a transaction.

pub mod errors;
pub mod handlers;
pub mod models;
