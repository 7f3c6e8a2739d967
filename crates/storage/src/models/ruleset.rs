use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Number of seats at the table. Every rank/floating computation derives its
/// player count from this and never takes it as independent configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Three,
    Four,
}

impl GameMode {
    pub fn player_count(self) -> u8 {
        match self {
            GameMode::Three => 3,
            GameMode::Four => 4,
        }
    }

    pub fn max_rank(self) -> i32 {
        self.player_count() as i32
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameMode::Three => "three",
            GameMode::Four => "four",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "three" => Some(GameMode::Three),
            "four" => Some(GameMode::Four),
            _ => None,
        }
    }
}

/// Uma configuration of a ruleset.
///
/// `Fixed` applies one bonus/penalty array by final rank. `Floating` selects
/// the array by how many players finished at or above the base points; the map
/// is keyed by that floating count. Consumers must handle both variants, so
/// this is a tagged union rather than a pair of optional fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum UmaRule {
    Fixed(Vec<i32>),
    Floating(BTreeMap<u8, Vec<i32>>),
}

impl UmaRule {
    pub fn is_floating(&self) -> bool {
        matches!(self, UmaRule::Floating(_))
    }
}

/// A named scoring configuration. Global rulesets are admin-owned and visible
/// to everyone; personal rulesets are scoped to their creator.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Ruleset {
    pub ruleset_id: Uuid,
    pub rule_name: String,
    pub game_mode: GameMode,
    pub starting_points: i32,
    pub base_points: i32,
    pub uma: UmaRule,
    pub oka: i32,
    pub use_chips: bool,
    pub is_global: bool,
    pub memo: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ruleset {
    pub fn player_count(&self) -> u8 {
        self.game_mode.player_count()
    }
}
