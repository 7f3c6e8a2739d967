//! Conversion of validated raw scores into standardized final points:
//! `(raw - base) / 1000 + uma + oka`, rounded to one decimal place, with the
//! uma row taken from the fixed array or the floating-count matrix.

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use super::{ScoringError, floating};
use crate::models::{Ruleset, UmaRule};

/// Provisional raw-score offsets from the base points, by rank band. Rank 1
/// is assumed +15000, rank 2 +5000, rank 3 −5000, anything below −15000.
const PROVISIONAL_OFFSETS: [i32; 4] = [15_000, 5_000, -5_000, -15_000];

/// Full breakdown of a point computation, kept so the client can show the
/// user how a value was derived.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PointBreakdown {
    pub raw_score: i32,
    pub base_points: i32,
    pub base_calculation: Decimal,
    pub rank: i32,
    pub uma_points: i32,
    pub oka_points: i32,
    pub final_points: Decimal,
    pub formula: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_provisional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisional_raw_score: Option<i32>,
}

/// Resolves the uma for a rank under the ruleset's uma rule. Floating rules
/// require the match's floating count to pick the row.
pub fn uma_for_rank(
    ruleset: &Ruleset,
    rank: i32,
    floating_count: Option<u8>,
) -> Result<i32, ScoringError> {
    if rank < 1 {
        return Err(ScoringError::UmaRankOutOfRange(rank));
    }

    let row: &[i32] = match &ruleset.uma {
        UmaRule::Fixed(uma) => uma,
        UmaRule::Floating(matrix) => {
            let count = floating_count.ok_or(ScoringError::FloatingCountRequired)?;
            floating::uma_for_floating_count(count, matrix)?
        }
    };

    row.get(rank as usize - 1)
        .copied()
        .ok_or(ScoringError::UmaRankOutOfRange(rank))
}

/// Computes the standardized final points for one player.
pub fn calculate_final_points(
    ruleset: &Ruleset,
    rank: i32,
    raw_score: i32,
    floating_count: Option<u8>,
) -> Result<PointBreakdown, ScoringError> {
    let uma_points = uma_for_rank(ruleset, rank, floating_count)?;
    let oka_points = if rank == 1 { ruleset.oka } else { 0 };

    let base_calculation =
        Decimal::from(raw_score - ruleset.base_points) / Decimal::from(1000);
    let mut final_points =
        (base_calculation + Decimal::from(uma_points) + Decimal::from(oka_points)).round_dp(1);
    // Pin the scale so a whole-number result still reads "65.0".
    final_points.rescale(1);

    let mut base_display = base_calculation.round_dp(1);
    base_display.rescale(1);

    Ok(PointBreakdown {
        raw_score,
        base_points: ruleset.base_points,
        base_calculation: base_display,
        rank,
        uma_points,
        oka_points,
        final_points,
        formula: format!(
            "({raw_score} - {base}) / 1000 + {uma_points} + {oka_points} = {final_points}",
            base = ruleset.base_points
        ),
        is_provisional: false,
        provisional_raw_score: None,
    })
}

/// Computes points for a rank-only entry by assuming a provisional raw score
/// near the base points, then running the normal computation.
pub fn calculate_provisional_points(
    ruleset: &Ruleset,
    rank: i32,
    floating_count: Option<u8>,
) -> Result<PointBreakdown, ScoringError> {
    if rank < 1 {
        return Err(ScoringError::UmaRankOutOfRange(rank));
    }

    let band = (rank as usize - 1).min(PROVISIONAL_OFFSETS.len() - 1);
    let provisional_raw_score = ruleset.base_points + PROVISIONAL_OFFSETS[band];

    let mut breakdown =
        calculate_final_points(ruleset, rank, provisional_raw_score, floating_count)?;
    breakdown.is_provisional = true;
    breakdown.provisional_raw_score = Some(provisional_raw_score);

    Ok(breakdown)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::*;
    use crate::models::GameMode;

    fn ruleset(game_mode: GameMode, starting: i32, base: i32, uma: UmaRule, oka: i32) -> Ruleset {
        Ruleset {
            ruleset_id: Uuid::nil(),
            rule_name: "テスト".to_string(),
            game_mode,
            starting_points: starting,
            base_points: base,
            uma,
            oka,
            use_chips: false,
            is_global: true,
            memo: None,
            created_by: "system".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn m_league() -> Ruleset {
        ruleset(
            GameMode::Four,
            25000,
            30000,
            UmaRule::Fixed(vec![30, 10, -10, -30]),
            20,
        )
    }

    fn renmei() -> Ruleset {
        // 30000 start / 30000 base, floating uma, no oka.
        ruleset(
            GameMode::Four,
            30000,
            30000,
            UmaRule::Floating(BTreeMap::from([
                (0, vec![0, 0, 0, 0]),
                (1, vec![12, -1, -3, -8]),
                (2, vec![8, 4, -4, -8]),
                (3, vec![8, 3, 1, -12]),
                (4, vec![0, 0, 0, 0]),
            ])),
            0,
        )
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn fixed_uma_top_gets_uma_and_oka() {
        // (45000 - 30000) / 1000 + 30 + 20 = 65.0
        let breakdown = calculate_final_points(&m_league(), 1, 45000, None).unwrap();
        assert_eq!(breakdown.final_points, dec("65.0"));
        assert_eq!(breakdown.uma_points, 30);
        assert_eq!(breakdown.oka_points, 20);
        assert_eq!(breakdown.formula, "(45000 - 30000) / 1000 + 30 + 20 = 65.0");
    }

    #[test]
    fn fixed_uma_non_top_gets_no_oka() {
        // (18000 - 30000) / 1000 - 30 = -42.0
        let breakdown = calculate_final_points(&m_league(), 4, 18000, None).unwrap();
        assert_eq!(breakdown.final_points, dec("-42.0"));
        assert_eq!(breakdown.oka_points, 0);
    }

    #[test]
    fn floating_uma_row_depends_on_count() {
        // Same raw score and rank, different floating counts.
        let rs = renmei();
        let one = calculate_final_points(&rs, 1, 35000, Some(1)).unwrap();
        assert_eq!(one.final_points, dec("17.0")); // 5.0 + 12 + 0

        let two = calculate_final_points(&rs, 1, 35000, Some(2)).unwrap();
        assert_eq!(two.final_points, dec("13.0")); // 5.0 + 8 + 0

        let three = calculate_final_points(&rs, 1, 35000, Some(3)).unwrap();
        assert_eq!(three.final_points, dec("13.0")); // 5.0 + 8 + 0
    }

    #[test]
    fn floating_uma_requires_count() {
        assert_eq!(
            calculate_final_points(&renmei(), 1, 35000, None),
            Err(ScoringError::FloatingCountRequired)
        );
    }

    #[test]
    fn floating_uma_missing_row_is_an_error() {
        let rs = ruleset(
            GameMode::Four,
            30000,
            30000,
            UmaRule::Floating(BTreeMap::from([(1, vec![12, -1, -3, -8])])),
            0,
        );
        assert_eq!(
            calculate_final_points(&rs, 1, 35000, Some(2)),
            Err(ScoringError::UmaRowMissing(2))
        );
    }

    #[test]
    fn rank_outside_uma_array_is_an_error() {
        let rs = ruleset(
            GameMode::Three,
            35000,
            40000,
            UmaRule::Fixed(vec![20, 0, -20]),
            15,
        );
        assert_eq!(
            calculate_final_points(&rs, 4, 30000, None),
            Err(ScoringError::UmaRankOutOfRange(4))
        );
        assert_eq!(
            calculate_final_points(&rs, 0, 30000, None),
            Err(ScoringError::UmaRankOutOfRange(0))
        );
    }

    #[test]
    fn provisional_points_use_rank_band_offsets() {
        let rs = m_league();

        let first = calculate_provisional_points(&rs, 1, None).unwrap();
        assert_eq!(first.provisional_raw_score, Some(45000));
        assert_eq!(first.final_points, dec("65.0"));
        assert!(first.is_provisional);

        let second = calculate_provisional_points(&rs, 2, None).unwrap();
        assert_eq!(second.provisional_raw_score, Some(35000));
        assert_eq!(second.final_points, dec("15.0")); // 5.0 + 10

        let third = calculate_provisional_points(&rs, 3, None).unwrap();
        assert_eq!(third.provisional_raw_score, Some(25000));
        assert_eq!(third.final_points, dec("-15.0")); // -5.0 - 10

        let fourth = calculate_provisional_points(&rs, 4, None).unwrap();
        assert_eq!(fourth.provisional_raw_score, Some(15000));
        assert_eq!(fourth.final_points, dec("-45.0")); // -15.0 - 30
    }

    #[test]
    fn hundred_point_scores_always_round_cleanly() {
        // 100-point raw scores produce exactly one decimal place.
        let breakdown = calculate_final_points(&m_league(), 2, 32400, None).unwrap();
        assert_eq!(breakdown.final_points, dec("12.4"));
        assert_eq!(breakdown.base_calculation, dec("2.4"));
    }
}
