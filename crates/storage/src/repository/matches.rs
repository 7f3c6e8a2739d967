use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{EntryMethod, GameMode, MatchRecord, MatchType};

/// A match as resolved by the service layer, ready to persist. Computed
/// final points and provisional raw scores are already filled in.
#[derive(Debug, Clone)]
pub struct NewMatch {
    pub user_id: String,
    pub match_date: DateTime<Utc>,
    pub game_mode: GameMode,
    pub entry_method: EntryMethod,
    pub ruleset_id: Option<Uuid>,
    pub match_type: Option<MatchType>,
    pub rank: i32,
    pub final_points: Option<Decimal>,
    pub raw_score: Option<i32>,
    pub chip_count: Option<i32>,
    pub venue_id: Option<Uuid>,
    pub venue_name: Option<String>,
    pub memo: Option<String>,
    pub floating_count: Option<i16>,
}

/// Repository for match database operations.
pub struct MatchRepository<'a> {
    pool: &'a PgPool,
}

#[derive(sqlx::FromRow)]
struct MatchRow {
    match_id: Uuid,
    user_id: String,
    match_date: DateTime<Utc>,
    game_mode: String,
    entry_method: String,
    ruleset_id: Option<Uuid>,
    match_type: Option<String>,
    rank: i16,
    final_points: Option<Decimal>,
    raw_score: Option<i32>,
    chip_count: Option<i32>,
    venue_id: Option<Uuid>,
    venue_name: Option<String>,
    memo: Option<String>,
    floating_count: Option<i16>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MatchRow {
    fn into_model(self) -> Result<MatchRecord> {
        let game_mode = GameMode::parse(&self.game_mode).ok_or_else(|| {
            StorageError::CorruptRecord(format!("unknown game mode '{}'", self.game_mode))
        })?;
        let entry_method = EntryMethod::parse(&self.entry_method).ok_or_else(|| {
            StorageError::CorruptRecord(format!("unknown entry method '{}'", self.entry_method))
        })?;
        let match_type = match self.match_type.as_deref() {
            Some(raw) => Some(MatchType::parse(raw).ok_or_else(|| {
                StorageError::CorruptRecord(format!("unknown match type '{raw}'"))
            })?),
            None => None,
        };

        Ok(MatchRecord {
            match_id: self.match_id,
            user_id: self.user_id,
            match_date: self.match_date,
            game_mode,
            entry_method,
            ruleset_id: self.ruleset_id,
            match_type,
            rank: i32::from(self.rank),
            final_points: self.final_points,
            raw_score: self.raw_score,
            chip_count: self.chip_count,
            venue_id: self.venue_id,
            venue_name: self.venue_name,
            memo: self.memo,
            floating_count: self.floating_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const MATCH_COLUMNS: &str = r#"
    match_id, user_id, match_date, game_mode, entry_method, ruleset_id,
    match_type, rank, final_points, raw_score, chip_count, venue_id,
    venue_name, memo, floating_count, created_at, updated_at
"#;

impl<'a> MatchRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: &NewMatch) -> Result<MatchRecord> {
        let sql = format!(
            r#"
            INSERT INTO matches (
                user_id, match_date, game_mode, entry_method, ruleset_id,
                match_type, rank, final_points, raw_score, chip_count,
                venue_id, venue_name, memo, floating_count
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {MATCH_COLUMNS}
            "#
        );

        let row = bind_new_match(sqlx::query_as::<_, MatchRow>(&sql), new)
            .fetch_one(self.pool)
            .await?;

        row.into_model()
    }

    /// Replaces an existing match owned by the user; the original creation
    /// timestamp is kept.
    pub async fn update(
        &self,
        user_id: &str,
        match_id: Uuid,
        new: &NewMatch,
    ) -> Result<MatchRecord> {
        let sql = format!(
            r#"
            UPDATE matches
            SET match_date = $3,
                game_mode = $4,
                entry_method = $5,
                ruleset_id = $6,
                match_type = $7,
                rank = $8,
                final_points = $9,
                raw_score = $10,
                chip_count = $11,
                venue_id = $12,
                venue_name = $13,
                memo = $14,
                floating_count = $15,
                updated_at = now()
            WHERE match_id = $1 AND user_id = $2
            RETURNING {MATCH_COLUMNS}
            "#
        );

        let query = sqlx::query_as::<_, MatchRow>(&sql)
            .bind(match_id)
            .bind(user_id)
            .bind(new.match_date)
            .bind(new.game_mode.as_str())
            .bind(new.entry_method.as_str())
            .bind(new.ruleset_id)
            .bind(new.match_type.map(MatchType::as_str))
            .bind(new.rank as i16)
            .bind(new.final_points)
            .bind(new.raw_score)
            .bind(new.chip_count)
            .bind(new.venue_id)
            .bind(new.venue_name.as_deref())
            .bind(new.memo.as_deref())
            .bind(new.floating_count);

        query
            .fetch_optional(self.pool)
            .await?
            .ok_or(StorageError::NotFound)?
            .into_model()
    }

    pub async fn find(&self, user_id: &str, match_id: Uuid) -> Result<MatchRecord> {
        let sql = format!(
            r#"
            SELECT {MATCH_COLUMNS}
            FROM matches
            WHERE match_id = $1 AND user_id = $2
            "#
        );

        sqlx::query_as::<_, MatchRow>(&sql)
            .bind(match_id)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(StorageError::NotFound)?
            .into_model()
    }

    /// One page of the user's match history, newest first, with the total
    /// count of matching rows.
    pub async fn list_page(
        &self,
        user_id: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        game_mode: Option<GameMode>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<MatchRecord>, i64)> {
        let sql = format!(
            r#"
            SELECT {MATCH_COLUMNS}
            FROM matches
            WHERE user_id = $1
              AND ($2::timestamptz IS NULL OR match_date >= $2)
              AND ($3::timestamptz IS NULL OR match_date <= $3)
              AND ($4::text IS NULL OR game_mode = $4)
            ORDER BY match_date DESC, created_at DESC
            LIMIT $5 OFFSET $6
            "#
        );

        let rows = sqlx::query_as::<_, MatchRow>(&sql)
            .bind(user_id)
            .bind(from)
            .bind(to)
            .bind(game_mode.map(GameMode::as_str))
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await?;

        let (total,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM matches
            WHERE user_id = $1
              AND ($2::timestamptz IS NULL OR match_date >= $2)
              AND ($3::timestamptz IS NULL OR match_date <= $3)
              AND ($4::text IS NULL OR game_mode = $4)
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .bind(game_mode.map(GameMode::as_str))
        .fetch_one(self.pool)
        .await?;

        let matches = rows
            .into_iter()
            .map(MatchRow::into_model)
            .collect::<Result<Vec<_>>>()?;

        Ok((matches, total))
    }

    /// Every match in the filter window, oldest first. Streak statistics need
    /// the full chronological sequence, so this skips pagination.
    pub async fn list_all(
        &self,
        user_id: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        game_mode: Option<GameMode>,
    ) -> Result<Vec<MatchRecord>> {
        let sql = format!(
            r#"
            SELECT {MATCH_COLUMNS}
            FROM matches
            WHERE user_id = $1
              AND ($2::timestamptz IS NULL OR match_date >= $2)
              AND ($3::timestamptz IS NULL OR match_date <= $3)
              AND ($4::text IS NULL OR game_mode = $4)
            ORDER BY match_date ASC, created_at ASC
            "#
        );

        let rows = sqlx::query_as::<_, MatchRow>(&sql)
            .bind(user_id)
            .bind(from)
            .bind(to)
            .bind(game_mode.map(GameMode::as_str))
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(MatchRow::into_model).collect()
    }

    pub async fn delete(&self, user_id: &str, match_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM matches WHERE match_id = $1 AND user_id = $2")
            .bind(match_id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}

fn bind_new_match<'q>(
    query: sqlx::query::QueryAs<'q, sqlx::Postgres, MatchRow, sqlx::postgres::PgArguments>,
    new: &'q NewMatch,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, MatchRow, sqlx::postgres::PgArguments> {
    query
        .bind(new.user_id.as_str())
        .bind(new.match_date)
        .bind(new.game_mode.as_str())
        .bind(new.entry_method.as_str())
        .bind(new.ruleset_id)
        .bind(new.match_type.map(MatchType::as_str))
        .bind(new.rank as i16)
        .bind(new.final_points)
        .bind(new.raw_score)
        .bind(new.chip_count)
        .bind(new.venue_id)
        .bind(new.venue_name.as_deref())
        .bind(new.memo.as_deref())
        .bind(new.floating_count)
}
