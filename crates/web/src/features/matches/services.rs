use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use storage::{
    dto::matches::{FieldCheckRequest, FieldCheckResponse, MatchListFilter, SaveMatchRequest},
    models::{EntryMethod, MatchRecord, Ruleset},
    repository::{
        matches::{MatchRepository, NewMatch},
        ruleset::RulesetRepository,
    },
    scoring::{fields, match_validator, points},
};
use uuid::Uuid;

use crate::error::{WebError, WebResult};
use crate::middleware::auth::AuthUser;

/// Register a new match. The entry is validated against its ruleset and the
/// final points are computed for raw and provisional entries before saving.
pub async fn register_match(
    pool: &PgPool,
    user: &AuthUser,
    req: &SaveMatchRequest,
) -> WebResult<MatchRecord> {
    let new = resolve_entry(pool, user, req).await?;
    let repo = MatchRepository::new(pool);
    Ok(repo.create(&new).await?)
}

pub async fn update_match(
    pool: &PgPool,
    user: &AuthUser,
    match_id: Uuid,
    req: &SaveMatchRequest,
) -> WebResult<MatchRecord> {
    let new = resolve_entry(pool, user, req).await?;
    let repo = MatchRepository::new(pool);
    Ok(repo.update(&user.user_id, match_id, &new).await?)
}

pub async fn get_match(pool: &PgPool, user: &AuthUser, match_id: Uuid) -> WebResult<MatchRecord> {
    let repo = MatchRepository::new(pool);
    Ok(repo.find(&user.user_id, match_id).await?)
}

pub async fn delete_match(pool: &PgPool, user: &AuthUser, match_id: Uuid) -> WebResult<()> {
    let repo = MatchRepository::new(pool);
    Ok(repo.delete(&user.user_id, match_id).await?)
}

/// One page of match history, newest first.
pub async fn list_matches(
    pool: &PgPool,
    user: &AuthUser,
    filter: &MatchListFilter,
) -> WebResult<(Vec<MatchRecord>, i64)> {
    let from = parse_date_bound(filter.from.as_deref(), false)?;
    let to = parse_date_bound(filter.to.as_deref(), true)?;

    let repo = MatchRepository::new(pool);
    Ok(repo
        .list_page(
            &user.user_id,
            from,
            to,
            filter.mode,
            filter.limit(),
            filter.offset(),
        )
        .await?)
}

/// Server-side field validation for the registration form: each provided
/// field gets its own verdict, empty fields report silently invalid.
pub fn check_fields(req: &FieldCheckRequest) -> FieldCheckResponse {
    FieldCheckResponse {
        raw_score: req
            .raw_score
            .as_deref()
            .map(fields::validate_raw_score),
        rank: req
            .rank
            .as_deref()
            .map(|text| fields::validate_rank(text, req.game_mode.max_rank())),
        final_points: req
            .final_points
            .as_deref()
            .map(fields::validate_final_points),
    }
}

/// Validates the entry and fills in computed values, producing the record to
/// persist.
async fn resolve_entry(
    pool: &PgPool,
    user: &AuthUser,
    req: &SaveMatchRequest,
) -> WebResult<NewMatch> {
    let ruleset = match req.ruleset_id {
        Some(ruleset_id) => Some(
            RulesetRepository::new(pool)
                .find_visible(ruleset_id, &user.user_id)
                .await?,
        ),
        None => None,
    };

    let input = req.as_match_input();
    let result = match &ruleset {
        Some(ruleset) => match_validator::validate(&input, ruleset),
        None => {
            let mut basic = match_validator::validate_basic(&input);
            basic
                .errors
                .extend(match_validator::validate_entry_requirements(&input).errors);
            match_validator::ValidationResult::from_errors(basic.errors)
        }
    };
    if !result.is_valid {
        return Err(WebError::RuleViolation(result.errors));
    }

    let (final_points, raw_score) = resolve_points(req, ruleset.as_ref())?;
    let match_date = parse_match_datetime(&req.date)?;

    Ok(NewMatch {
        user_id: user.user_id.clone(),
        match_date,
        game_mode: req.game_mode,
        entry_method: req.entry_method,
        ruleset_id: req.ruleset_id,
        match_type: req.match_type,
        rank: req.rank,
        final_points,
        raw_score,
        chip_count: req.chip_count,
        venue_id: req.venue_id,
        venue_name: req.venue_name.clone(),
        memo: req.normalized_memo(),
        floating_count: req.floating_count,
    })
}

/// Final points and raw score to store, depending on the entry method.
fn resolve_points(
    req: &SaveMatchRequest,
    ruleset: Option<&Ruleset>,
) -> WebResult<(Option<Decimal>, Option<i32>)> {
    match req.entry_method {
        EntryMethod::RankPlusPoints => Ok((req.final_points, req.raw_score)),
        EntryMethod::RankPlusRaw => match (ruleset, req.raw_score) {
            (Some(ruleset), Some(raw_score)) => {
                let breakdown = points::calculate_final_points(
                    ruleset,
                    req.rank,
                    raw_score,
                    req.floating_count(),
                )?;
                Ok((Some(breakdown.final_points), Some(raw_score)))
            }
            // Without a ruleset the raw score is stored as-is.
            _ => Ok((req.final_points, req.raw_score)),
        },
        EntryMethod::ProvisionalRankOnly => {
            let ruleset = ruleset.ok_or_else(|| {
                WebError::BadRequest("仮スコア方式ではルールセットの選択が必要です".to_string())
            })?;
            let breakdown =
                points::calculate_provisional_points(ruleset, req.rank, req.floating_count())?;
            Ok((Some(breakdown.final_points), breakdown.provisional_raw_score))
        }
    }
}

fn parse_match_datetime(date: &str) -> WebResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| WebError::BadRequest("日付はISO形式で入力してください".to_string()))
}

/// Parses a filter bound; a bare date on the `to` side extends to the end of
/// that day so the day's matches are included.
pub fn parse_date_bound(
    date: Option<&str>,
    end_of_day: bool,
) -> WebResult<Option<DateTime<Utc>>> {
    let Some(date) = date else {
        return Ok(None);
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }

    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| WebError::BadRequest("日付はISO形式で入力してください".to_string()))?;

    let time = if end_of_day {
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
    } else {
        NaiveTime::MIN
    };

    Ok(Some(day.and_time(time).and_utc()))
}
