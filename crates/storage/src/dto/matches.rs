use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::{default_page, default_page_size};
use crate::models::{EntryMethod, GameMode, MatchRecord, MatchType};
use crate::scoring::fields::FieldVerdict;
use crate::scoring::match_validator::MatchInput;

/// Request payload for registering or updating a match result.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveMatchRequest {
    /// Match date, ISO 8601.
    pub date: String,

    pub game_mode: GameMode,

    pub entry_method: EntryMethod,

    #[serde(default)]
    pub ruleset_id: Option<Uuid>,

    #[serde(default)]
    pub match_type: Option<MatchType>,

    #[validate(range(min = 1, max = 4, message = "順位は1〜4の範囲で入力してください"))]
    pub rank: i32,

    #[serde(default)]
    pub final_points: Option<Decimal>,

    #[serde(default)]
    pub raw_score: Option<i32>,

    #[serde(default)]
    pub chip_count: Option<i32>,

    #[serde(default)]
    pub venue_id: Option<Uuid>,

    #[serde(default)]
    pub venue_name: Option<String>,

    #[serde(default)]
    pub memo: Option<String>,

    #[validate(range(min = 0, max = 4, message = "浮き人数は0〜4の範囲で入力してください"))]
    #[serde(default)]
    pub floating_count: Option<i16>,
}

impl SaveMatchRequest {
    /// View of this request as the scoring engine's validation input.
    pub fn as_match_input(&self) -> MatchInput<'_> {
        MatchInput {
            date: &self.date,
            game_mode: self.game_mode,
            entry_method: self.entry_method,
            rank: self.rank,
            final_points: self.final_points,
            raw_score: self.raw_score,
            floating_count: self.floating_count(),
            chip_count: self.chip_count,
        }
    }

    pub fn floating_count(&self) -> Option<u8> {
        self.floating_count.and_then(|c| u8::try_from(c).ok())
    }

    pub fn normalized_memo(&self) -> Option<String> {
        self.memo
            .as_deref()
            .map(str::trim)
            .filter(|memo| !memo.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchResponse {
    pub match_id: Uuid,
    pub date: DateTime<Utc>,
    pub game_mode: GameMode,
    pub entry_method: EntryMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ruleset_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_type: Option<MatchType>,
    pub rank: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_points: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chip_count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floating_count: Option<i16>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MatchRecord> for MatchResponse {
    fn from(record: MatchRecord) -> Self {
        Self {
            match_id: record.match_id,
            date: record.match_date,
            game_mode: record.game_mode,
            entry_method: record.entry_method,
            ruleset_id: record.ruleset_id,
            match_type: record.match_type,
            rank: record.rank,
            final_points: record.final_points,
            raw_score: record.raw_score,
            chip_count: record.chip_count,
            venue_id: record.venue_id,
            venue_name: record.venue_name,
            memo: record.memo,
            floating_count: record.floating_count,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Query filter for the match history listing.
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchListFilter {
    /// Earliest match date to include, ISO 8601.
    pub from: Option<String>,
    /// Latest match date to include, ISO 8601.
    pub to: Option<String>,
    pub mode: Option<GameMode>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl MatchListFilter {
    pub fn validate(&self) -> Result<(), String> {
        if self.page < 1 {
            return Err("page must be >= 1".to_string());
        }
        if self.page_size < 1 || self.page_size > 100 {
            return Err("page_size must be between 1 and 100".to_string());
        }
        Ok(())
    }

    pub fn offset(&self) -> i64 {
        i64::from((self.page - 1) * self.page_size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }
}

/// Raw form text sent for server-side field validation on blur.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldCheckRequest {
    pub game_mode: GameMode,
    #[serde(default)]
    pub raw_score: Option<String>,
    #[serde(default)]
    pub rank: Option<String>,
    #[serde(default)]
    pub final_points: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldCheckResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_score: Option<FieldVerdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<FieldVerdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_points: Option<FieldVerdict>,
}
