//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Upload** (`POST /upload`): quota-gated file ingestion into a brain
//! - **Brains** (`/brains/*`): brain management and usage reporting
//! - **Files** (`/brains/{id}/files`): per-brain file records
//!
//! All endpoints require bearer API key authentication and are documented
//! with OpenAPI annotations via `utoipa`; docs are served at `/docs`.

pub mod handlers;
pub mod models;
