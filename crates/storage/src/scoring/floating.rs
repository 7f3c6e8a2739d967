//! Floating-count arithmetic: the legal range of "players at or above the
//! base points" implied by a ruleset, classification of a single player, and
//! validation of floating-uma matrices against that range.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use super::ScoringError;
use crate::models::GameMode;

/// Inclusive range of legal floating counts for a ruleset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct FloatingRange {
    pub min: u8,
    pub max: u8,
}

impl FloatingRange {
    pub fn contains(&self, count: u8) -> bool {
        self.min <= count && count <= self.max
    }
}

/// Whether a player finished at/above (floating) or below (sinking) the base
/// points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PlayerStatus {
    Floating,
    Sinking,
}

/// Legal floating-count range given the ordering of starting vs. base points.
///
/// The three cases follow from the zero-sum constraint (raw scores sum to
/// `starting_points * player_count`):
///
/// - starting == base: everyone at the origin counts as everyone floating, so
///   at least one player always floats.
/// - starting < base: nobody reaching the base is possible, everyone exceeding
///   it is not.
/// - starting > base: not realizable under normal scoring conventions; the
///   range degenerates to [0, 0].
pub fn floating_range(starting_points: i32, base_points: i32, player_count: u8) -> FloatingRange {
    match starting_points.cmp(&base_points) {
        Ordering::Equal => FloatingRange {
            min: 1,
            max: player_count,
        },
        Ordering::Less => FloatingRange {
            min: 0,
            max: player_count - 1,
        },
        Ordering::Greater => FloatingRange { min: 0, max: 0 },
    }
}

/// A player exactly at the base points counts as floating.
pub fn classify_player(raw_score: i32, base_points: i32) -> PlayerStatus {
    if raw_score >= base_points {
        PlayerStatus::Floating
    } else {
        PlayerStatus::Sinking
    }
}

/// Looks up the uma row for a floating count.
pub fn uma_for_floating_count(
    count: u8,
    matrix: &BTreeMap<u8, Vec<i32>>,
) -> Result<&[i32], ScoringError> {
    matrix
        .get(&count)
        .map(Vec::as_slice)
        .ok_or(ScoringError::UmaRowMissing(count))
}

/// Validates a single uma array for a game mode: one entry per player,
/// summing to zero. Returns human-readable problems, empty when fine.
pub fn validate_uma_array(uma: &[i32], game_mode: GameMode) -> Vec<String> {
    let expected = game_mode.player_count() as usize;
    if uma.len() != expected {
        return vec![format!(
            "ウマ配列は{expected}要素（{expected}人麻雀）である必要があります"
        )];
    }

    let total: i32 = uma.iter().sum();
    if total != 0 {
        return vec![format!(
            "ウマ配列の合計は0である必要があります（現在: {total}）"
        )];
    }

    Vec::new()
}

/// Validates a floating-uma matrix against the ruleset's legal range.
///
/// Every count from 0 to the player count must be present. Counts inside the
/// legal range carry real uma arrays; counts outside it are unreachable and
/// must hold all-zero placeholders so a stale row can never be applied.
pub fn validate_uma_matrix(
    matrix: &BTreeMap<u8, Vec<i32>>,
    game_mode: GameMode,
    starting_points: i32,
    base_points: i32,
) -> Vec<String> {
    let player_count = game_mode.player_count();
    let range = floating_range(starting_points, base_points, player_count);
    let mut errors = Vec::new();

    for count in 0..=player_count {
        let Some(row) = matrix.get(&count) else {
            errors.push(format!("浮き人数{count}のウマ配列が存在しません"));
            continue;
        };

        if range.contains(count) {
            for err in validate_uma_array(row, game_mode) {
                errors.push(format!("浮き人数{count}: {err}"));
            }
        } else {
            let expected = vec![0i32; player_count as usize];
            if *row != expected {
                errors.push(format!(
                    "浮き人数{count}は使用されないため、ウマ配列は{expected:?}である必要があります"
                ));
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_start_and_base_forces_at_least_one_floating() {
        assert_eq!(
            floating_range(25000, 25000, 4),
            FloatingRange { min: 1, max: 4 }
        );
        assert_eq!(
            floating_range(35000, 35000, 3),
            FloatingRange { min: 1, max: 3 }
        );
    }

    #[test]
    fn lower_start_excludes_all_floating() {
        assert_eq!(
            floating_range(25000, 30000, 4),
            FloatingRange { min: 0, max: 3 }
        );
        assert_eq!(
            floating_range(30000, 35000, 3),
            FloatingRange { min: 0, max: 2 }
        );
    }

    #[test]
    fn higher_start_degenerates() {
        assert_eq!(
            floating_range(35000, 30000, 4),
            FloatingRange { min: 0, max: 0 }
        );
    }

    #[test]
    fn classification_is_non_strict_at_base() {
        assert_eq!(classify_player(30000, 30000), PlayerStatus::Floating);
        assert_eq!(classify_player(35000, 30000), PlayerStatus::Floating);
        assert_eq!(classify_player(29900, 30000), PlayerStatus::Sinking);
        assert_eq!(classify_player(20000, 30000), PlayerStatus::Sinking);
    }

    fn sample_matrix() -> BTreeMap<u8, Vec<i32>> {
        BTreeMap::from([
            (0, vec![0, 0, 0, 0]),
            (1, vec![12, -1, -3, -8]),
            (2, vec![8, 4, -4, -8]),
            (3, vec![8, 3, 1, -12]),
            (4, vec![0, 0, 0, 0]),
        ])
    }

    #[test]
    fn uma_lookup_finds_row() {
        let matrix = sample_matrix();
        assert_eq!(
            uma_for_floating_count(2, &matrix).unwrap(),
            &[8, 4, -4, -8]
        );
    }

    #[test]
    fn uma_lookup_reports_missing_row() {
        let mut matrix = sample_matrix();
        matrix.remove(&2);
        assert_eq!(
            uma_for_floating_count(2, &matrix),
            Err(ScoringError::UmaRowMissing(2))
        );
    }

    #[test]
    fn uma_array_must_match_player_count() {
        let errors = validate_uma_array(&[30, 10, -10, -30], GameMode::Three);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("3要素"));
    }

    #[test]
    fn uma_array_must_sum_to_zero() {
        let errors = validate_uma_array(&[30, 10, -10, -20], GameMode::Four);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("合計は0"));

        assert!(validate_uma_array(&[30, 10, -10, -30], GameMode::Four).is_empty());
    }

    #[test]
    fn matrix_with_equal_points_validates_cleanly() {
        // 30000 start / 30000 base: counts 1..=4 legal, count 0 a placeholder.
        let errors = validate_uma_matrix(&sample_matrix(), GameMode::Four, 30000, 30000);
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn matrix_missing_row_is_reported() {
        let mut matrix = sample_matrix();
        matrix.remove(&3);
        let errors = validate_uma_matrix(&matrix, GameMode::Four, 30000, 30000);
        assert_eq!(errors, vec!["浮き人数3のウマ配列が存在しません".to_string()]);
    }

    #[test]
    fn matrix_unused_count_must_be_zero_filled() {
        let mut matrix = sample_matrix();
        // With a lower start, count 4 (all floating) is unreachable.
        matrix.insert(4, vec![1, 1, -1, -1]);
        let errors = validate_uma_matrix(&matrix, GameMode::Four, 25000, 30000);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("浮き人数4は使用されないため"));
    }

    #[test]
    fn matrix_bad_row_inside_range_is_prefixed_with_count() {
        let mut matrix = sample_matrix();
        matrix.insert(2, vec![8, 4, -4, -7]);
        let errors = validate_uma_matrix(&matrix, GameMode::Four, 30000, 30000);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("浮き人数2: "));
    }
}
