use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::GameMode;

/// Query filter for the stats summary.
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    /// Earliest match date to include, ISO 8601.
    pub from: Option<String>,
    /// Latest match date to include, ISO 8601.
    pub to: Option<String>,
    pub mode: Option<GameMode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankDistribution {
    pub first: u32,
    pub second: u32,
    pub third: u32,
    /// Four-player mode only; stays 0 for three-player matches.
    pub fourth: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub count: u32,
    pub avg_rank: f64,
    pub avg_score: Decimal,
    pub total_points: Decimal,
    pub chip_total: i64,
    pub rank_distribution: RankDistribution,
    pub top_rate: f64,
    pub second_rate: f64,
    pub third_rate: f64,
    pub last_rate: f64,
    pub max_consecutive_first: u32,
    pub max_consecutive_last: u32,
    pub max_score: Decimal,
    pub min_score: Decimal,
}

impl StatsSummary {
    pub fn empty() -> Self {
        Self {
            count: 0,
            avg_rank: 0.0,
            avg_score: Decimal::ZERO,
            total_points: Decimal::ZERO,
            chip_total: 0,
            rank_distribution: RankDistribution::default(),
            top_rate: 0.0,
            second_rate: 0.0,
            third_rate: 0.0,
            last_rate: 0.0,
            max_consecutive_first: 0,
            max_consecutive_last: 0,
            max_score: Decimal::ZERO,
            min_score: Decimal::ZERO,
        }
    }
}
