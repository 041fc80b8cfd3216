//! Authentication layer.
//!
//! brainctl authenticates every API request with a bearer API key
//! (`Authorization: Bearer sk-...`). The [`current_user`] module provides the
//! [`crate::api::models::users::CurrentUser`] extractor that handlers use to
//! get the resolved account.

pub mod current_user;
