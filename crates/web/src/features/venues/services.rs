use sqlx::PgPool;
use storage::{models::Venue, repository::venue::VenueRepository};

use crate::error::WebResult;
use crate::middleware::auth::AuthUser;

pub async fn list_venues(pool: &PgPool, user: &AuthUser) -> WebResult<Vec<Venue>> {
    let repo = VenueRepository::new(pool);
    Ok(repo.list_for_user(&user.user_id).await?)
}

pub async fn create_venue(pool: &PgPool, user: &AuthUser, name: &str) -> WebResult<Venue> {
    let repo = VenueRepository::new(pool);
    Ok(repo.create(&user.user_id, name).await?)
}
