use rust_decimal::Decimal;
use sqlx::PgPool;
use storage::{
    dto::stats::{RankDistribution, StatsQuery, StatsSummary},
    models::{GameMode, MatchRecord},
    repository::matches::MatchRepository,
};

use crate::error::WebResult;
use crate::features::matches::services::parse_date_bound;
use crate::middleware::auth::AuthUser;

/// Performance summary over the caller's matches in the filter window.
pub async fn stats_summary(
    pool: &PgPool,
    user: &AuthUser,
    query: &StatsQuery,
) -> WebResult<StatsSummary> {
    let from = parse_date_bound(query.from.as_deref(), false)?;
    let to = parse_date_bound(query.to.as_deref(), true)?;

    let repo = MatchRepository::new(pool);
    let matches = repo.list_all(&user.user_id, from, to, query.mode).await?;

    Ok(summarize(&matches, query.mode))
}

/// Pure summary computation; `matches` must be in chronological order for the
/// streak counters to make sense.
pub fn summarize(matches: &[MatchRecord], game_mode: Option<GameMode>) -> StatsSummary {
    if matches.is_empty() {
        return StatsSummary::empty();
    }

    let count = matches.len() as u32;
    // Three-player filters look at rank 3 for "last place"; everything else
    // (four-player or mixed) uses rank 4.
    let last_rank = match game_mode {
        Some(GameMode::Three) => 3,
        _ => 4,
    };

    let mut total_rank: i64 = 0;
    let mut total_points = Decimal::ZERO;
    let mut chip_total: i64 = 0;
    let mut rank_counts = [0u32; 4];
    let mut max_score: Option<Decimal> = None;
    let mut min_score: Option<Decimal> = None;

    for record in matches {
        total_rank += i64::from(record.rank);
        let points = record.final_points.unwrap_or(Decimal::ZERO);
        total_points += points;
        chip_total += i64::from(record.chip_count.unwrap_or(0));

        if (1..=4).contains(&record.rank) {
            rank_counts[record.rank as usize - 1] += 1;
        }

        max_score = Some(max_score.map_or(points, |m| m.max(points)));
        min_score = Some(min_score.map_or(points, |m| m.min(points)));
    }

    let ranks: Vec<i32> = matches.iter().map(|m| m.rank).collect();

    let rate = |hits: u32| round1(f64::from(hits) / f64::from(count) * 100.0);

    StatsSummary {
        count,
        avg_rank: round2(total_rank as f64 / f64::from(count)),
        avg_score: (total_points / Decimal::from(count)).round_dp(1),
        total_points: total_points.round_dp(1),
        chip_total,
        rank_distribution: RankDistribution {
            first: rank_counts[0],
            second: rank_counts[1],
            third: rank_counts[2],
            fourth: rank_counts[3],
        },
        top_rate: rate(rank_counts[0]),
        second_rate: rate(rank_counts[1]),
        third_rate: rate(rank_counts[2]),
        last_rate: rate(rank_counts[last_rank as usize - 1]),
        max_consecutive_first: max_consecutive(&ranks, 1),
        max_consecutive_last: max_consecutive(&ranks, last_rank),
        max_score: max_score.unwrap_or(Decimal::ZERO).round_dp(1),
        min_score: min_score.unwrap_or(Decimal::ZERO).round_dp(1),
    }
}

/// Longest run of the target rank in the chronological sequence.
fn max_consecutive(ranks: &[i32], target: i32) -> u32 {
    let mut longest = 0u32;
    let mut current = 0u32;

    for &rank in ranks {
        if rank == target {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }

    longest
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use storage::models::EntryMethod;
    use uuid::Uuid;

    use super::*;

    fn record(rank: i32, points: &str, chips: Option<i32>) -> MatchRecord {
        MatchRecord {
            match_id: Uuid::new_v4(),
            user_id: "user".to_string(),
            match_date: Utc::now(),
            game_mode: GameMode::Four,
            entry_method: EntryMethod::RankPlusPoints,
            ruleset_id: None,
            match_type: None,
            rank,
            final_points: Some(points.parse().unwrap()),
            raw_score: None,
            chip_count: chips,
            venue_id: None,
            venue_name: None,
            memo: None,
            floating_count: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn empty_history_yields_empty_summary() {
        assert_eq!(summarize(&[], None), StatsSummary::empty());
    }

    #[test]
    fn summary_aggregates_basic_statistics() {
        let matches = vec![
            record(1, "65.0", Some(3)),
            record(4, "-42.0", None),
            record(2, "12.4", Some(-1)),
            record(1, "50.1", None),
        ];

        let summary = summarize(&matches, Some(GameMode::Four));

        assert_eq!(summary.count, 4);
        assert_eq!(summary.avg_rank, 2.0);
        assert_eq!(summary.total_points, dec("85.5"));
        assert_eq!(summary.avg_score, dec("21.4"));
        assert_eq!(summary.chip_total, 2);
        assert_eq!(summary.rank_distribution.first, 2);
        assert_eq!(summary.rank_distribution.fourth, 1);
        assert_eq!(summary.top_rate, 50.0);
        assert_eq!(summary.last_rate, 25.0);
        assert_eq!(summary.max_score, dec("65.0"));
        assert_eq!(summary.min_score, dec("-42.0"));
    }

    #[test]
    fn streaks_are_counted_over_the_sequence() {
        let matches = vec![
            record(1, "50.0", None),
            record(1, "55.0", None),
            record(1, "60.0", None),
            record(4, "-40.0", None),
            record(1, "45.0", None),
            record(4, "-35.0", None),
            record(4, "-30.0", None),
        ];

        let summary = summarize(&matches, Some(GameMode::Four));
        assert_eq!(summary.max_consecutive_first, 3);
        assert_eq!(summary.max_consecutive_last, 2);
    }

    #[test]
    fn three_player_last_rate_uses_rank_three() {
        let mut matches = vec![
            record(1, "40.0", None),
            record(3, "-25.0", None),
            record(3, "-20.0", None),
        ];
        for m in &mut matches {
            m.game_mode = GameMode::Three;
        }

        let summary = summarize(&matches, Some(GameMode::Three));
        assert_eq!(summary.last_rate, 66.7);
        assert_eq!(summary.max_consecutive_last, 2);
        // thirdRate and lastRate coincide for three-player mode.
        assert_eq!(summary.third_rate, summary.last_rate);
    }

    #[test]
    fn missing_points_count_as_zero() {
        let mut no_points = record(2, "0.0", None);
        no_points.final_points = None;

        let summary = summarize(&[no_points], None);
        assert_eq!(summary.total_points, Decimal::ZERO);
        assert_eq!(summary.count, 1);
    }
}
