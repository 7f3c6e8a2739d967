use sqlx::PgPool;

use crate::error::{Result, StorageError};
use crate::models::Venue;

/// Repository for venue database operations.
pub struct VenueRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> VenueRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Venue>> {
        let venues = sqlx::query_as::<_, Venue>(
            r#"
            SELECT venue_id, user_id, name, created_at
            FROM venues
            WHERE user_id = $1
            ORDER BY name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(venues)
    }

    pub async fn create(&self, user_id: &str, name: &str) -> Result<Venue> {
        let venue = sqlx::query_as::<_, Venue>(
            r#"
            INSERT INTO venues (user_id, name)
            VALUES ($1, $2)
            RETURNING venue_id, user_id, name, created_at
            "#,
        )
        .bind(user_id)
        .bind(name.trim())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            let error = StorageError::from(e);
            if error.is_unique_violation() {
                StorageError::ConstraintViolation("Venue already exists".to_string())
            } else {
                error
            }
        })?;

        Ok(venue)
    }
}
