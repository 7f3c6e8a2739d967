use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::Venue;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVenueRequest {
    #[validate(length(min = 1, max = 100, message = "会場名は1〜100文字で入力してください"))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VenueResponse {
    pub venue_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Venue> for VenueResponse {
    fn from(venue: Venue) -> Self {
        Self {
            venue_id: venue.venue_id,
            name: venue.name,
            created_at: venue.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VenueListResponse {
    pub venues: Vec<VenueResponse>,
    pub total: usize,
}
