use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::dto::ruleset::RulesetPayload;
use crate::error::{Result, StorageError};
use crate::models::{GameMode, Ruleset, UmaRule};

/// Repository for ruleset database operations.
pub struct RulesetRepository<'a> {
    pool: &'a PgPool,
}

#[derive(sqlx::FromRow)]
struct RulesetRow {
    ruleset_id: Uuid,
    rule_name: String,
    game_mode: String,
    starting_points: i32,
    base_points: i32,
    uma: Json<UmaRule>,
    oka: i32,
    use_chips: bool,
    is_global: bool,
    memo: Option<String>,
    created_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RulesetRow {
    fn into_model(self) -> Result<Ruleset> {
        let game_mode = GameMode::parse(&self.game_mode).ok_or_else(|| {
            StorageError::CorruptRecord(format!("unknown game mode '{}'", self.game_mode))
        })?;

        Ok(Ruleset {
            ruleset_id: self.ruleset_id,
            rule_name: self.rule_name,
            game_mode,
            starting_points: self.starting_points,
            base_points: self.base_points,
            uma: self.uma.0,
            oka: self.oka,
            use_chips: self.use_chips,
            is_global: self.is_global,
            memo: self.memo,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const RULESET_COLUMNS: &str = r#"
    ruleset_id, rule_name, game_mode, starting_points, base_points,
    uma, oka, use_chips, is_global, memo, created_by, created_at, updated_at
"#;

impl<'a> RulesetRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Lists the user's personal rulesets, optionally together with the
    /// global ones. Global rulesets sort first.
    pub async fn list_for_user(&self, user_id: &str, include_global: bool) -> Result<Vec<Ruleset>> {
        let sql = format!(
            r#"
            SELECT {RULESET_COLUMNS}
            FROM rulesets
            WHERE (created_by = $1 AND NOT is_global) OR (is_global AND $2)
            ORDER BY is_global DESC, created_at ASC
            "#
        );

        let rows = sqlx::query_as::<_, RulesetRow>(&sql)
            .bind(user_id)
            .bind(include_global)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(RulesetRow::into_model).collect()
    }

    /// Fetches a ruleset the user is allowed to see: their own or a global one.
    pub async fn find_visible(&self, ruleset_id: Uuid, user_id: &str) -> Result<Ruleset> {
        let sql = format!(
            r#"
            SELECT {RULESET_COLUMNS}
            FROM rulesets
            WHERE ruleset_id = $1 AND (is_global OR created_by = $2)
            "#
        );

        sqlx::query_as::<_, RulesetRow>(&sql)
            .bind(ruleset_id)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(StorageError::NotFound)?
            .into_model()
    }

    pub async fn create(
        &self,
        req: &RulesetPayload,
        created_by: &str,
        is_global: bool,
    ) -> Result<Ruleset> {
        let sql = format!(
            r#"
            INSERT INTO rulesets (
                rule_name, game_mode, starting_points, base_points,
                uma, oka, use_chips, is_global, memo, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {RULESET_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, RulesetRow>(&sql)
            .bind(req.rule_name.trim())
            .bind(req.game_mode.as_str())
            .bind(req.starting_points)
            .bind(req.base_points)
            .bind(Json(req.uma_rule()))
            .bind(req.oka)
            .bind(req.use_chips)
            .bind(is_global)
            .bind(req.normalized_memo())
            .bind(created_by)
            .fetch_one(self.pool)
            .await
            .map_err(|e| map_name_conflict(StorageError::from(e)))?;

        row.into_model()
    }

    pub async fn update(&self, ruleset_id: Uuid, req: &RulesetPayload) -> Result<Ruleset> {
        let sql = format!(
            r#"
            UPDATE rulesets
            SET rule_name = $2,
                game_mode = $3,
                starting_points = $4,
                base_points = $5,
                uma = $6,
                oka = $7,
                use_chips = $8,
                memo = $9,
                updated_at = now()
            WHERE ruleset_id = $1
            RETURNING {RULESET_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, RulesetRow>(&sql)
            .bind(ruleset_id)
            .bind(req.rule_name.trim())
            .bind(req.game_mode.as_str())
            .bind(req.starting_points)
            .bind(req.base_points)
            .bind(Json(req.uma_rule()))
            .bind(req.oka)
            .bind(req.use_chips)
            .bind(req.normalized_memo())
            .fetch_optional(self.pool)
            .await
            .map_err(|e| map_name_conflict(StorageError::from(e)))?
            .ok_or(StorageError::NotFound)?;

        row.into_model()
    }

    pub async fn delete(&self, ruleset_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM rulesets WHERE ruleset_id = $1")
            .bind(ruleset_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    /// Whether the owner already has a ruleset with this name. Used by the
    /// seeder to keep re-runs idempotent.
    pub async fn exists_by_name(&self, created_by: &str, rule_name: &str) -> Result<bool> {
        let exists: Option<(Uuid,)> = sqlx::query_as(
            "SELECT ruleset_id FROM rulesets WHERE created_by = $1 AND rule_name = $2",
        )
        .bind(created_by)
        .bind(rule_name)
        .fetch_optional(self.pool)
        .await?;

        Ok(exists.is_some())
    }
}

fn map_name_conflict(error: StorageError) -> StorageError {
    if error.is_unique_violation() {
        StorageError::ConstraintViolation("Ruleset name already exists".to_string())
    } else {
        error
    }
}
