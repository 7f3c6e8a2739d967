use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A play venue registered by a user, backing the match form's venue picker.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Venue {
    pub venue_id: Uuid,
    pub user_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
