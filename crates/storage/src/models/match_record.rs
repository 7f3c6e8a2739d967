use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::GameMode;

/// How the player's result was entered on the registration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntryMethod {
    /// Rank plus an already-standardized final point value.
    RankPlusPoints,
    /// Rank plus the raw end-of-match score; final points are computed.
    RankPlusRaw,
    /// Rank only; a provisional raw score is assumed and points computed.
    ProvisionalRankOnly,
}

impl EntryMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryMethod::RankPlusPoints => "rank_plus_points",
            EntryMethod::RankPlusRaw => "rank_plus_raw",
            EntryMethod::ProvisionalRankOnly => "provisional_rank_only",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "rank_plus_points" => Some(EntryMethod::RankPlusPoints),
            "rank_plus_raw" => Some(EntryMethod::RankPlusRaw),
            "provisional_rank_only" => Some(EntryMethod::ProvisionalRankOnly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Free,
    Set,
    Competition,
}

impl MatchType {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchType::Free => "free",
            MatchType::Set => "set",
            MatchType::Competition => "competition",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "free" => Some(MatchType::Free),
            "set" => Some(MatchType::Set),
            "competition" => Some(MatchType::Competition),
            _ => None,
        }
    }
}

/// One registered match result for one user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MatchRecord {
    pub match_id: Uuid,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
