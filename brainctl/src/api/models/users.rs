use crate::types::UserId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The authenticated account attached to a request.
///
/// Produced by the bearer-key extractor in [`crate::auth::current_user`].
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrentUser {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub username: String,
    pub email: String,
}
