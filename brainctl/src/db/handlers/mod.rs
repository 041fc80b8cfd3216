//! Repository implementations for CRUD operations.
//!
//! One repository per table:
//!
//! - [`users::Users`]: user accounts
//! - [`api_keys::ApiKeys`]: bearer API keys
//! - [`brains::Brains`]: knowledge stores with capacity ceilings
//! - [`files::BrainFiles`]: per-brain file records (quota accounting)

pub mod api_keys;
pub mod brains;
pub mod files;
pub mod repository;
pub mod users;

pub use api_keys::ApiKeys;
pub use brains::Brains;
pub use files::BrainFiles;
pub use repository::Repository;
pub use users::Users;
