//! HTTP request handlers for all API endpoints.
//!
//! Each handler is responsible for request validation, authentication via the
//! [`crate::api::models::users::CurrentUser`] extractor, business logic through
//! the database repositories, and response serialization. Handlers return
//! [`crate::errors::Error`], which converts into the appropriate HTTP status.
//!
//! - [`upload`]: quota-gated file upload into a brain
//! - [`brains`]: brain creation, listing, and usage detail
//! - [`files`]: per-brain file record listing

pub mod brains;
pub mod files;
pub mod upload;
