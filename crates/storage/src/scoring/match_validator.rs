//! Composite validation of a match entry against its ruleset.
//!
//! Basic form checks run first and short-circuit the rule-consistency checks,
//! so cross-field rules only ever see well-formed values. Every failure is a
//! structured verdict with a stable code, a user-facing message and a hint;
//! there is no exception path.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use super::floating::{PlayerStatus, classify_player};
use super::points;
use crate::models::{EntryMethod, GameMode, Ruleset, UmaRule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    Error,
    Warning,
}

/// Stable error codes for match-entry validation, grouped by family:
/// E-00 basic form, E-01 entry-method/rule consistency, E-10 floating-count
/// existence, E-20 raw-score/floating-count consistency, E-30 rank/raw-score
/// relation, E-40 computed points, E-43/E-44 manual final-point bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorCode {
    InvalidDateFormat,
    FutureDate,
    TooOldDate,
    InvalidRank,
    InvalidFinalPointsRange,
    InvalidFinalPointsPrecision,
    InvalidRawScoreRange,
    InvalidRawScoreUnit,
    InvalidChipCount,
    InvalidFloatingCountRange,
    FloatingCountWithFixedUma,
    MissingFloatingCount,
    MissingFinalPoints,
    MissingRawScore,
    ImpossibleZeroFloating,
    ImpossibleAllFloating,
    FloatingScoreWithZeroCount,
    SinkingScoreWithAllFloating,
    TopRankSinkingWithFloating,
    LastRankFloatingWithoutAllFloating,
    LastRankFloatingWithLowerStart,
    AllFloatingWithSinkingScore,
    AllSinkingWithFloatingScore,
    UmaNotDefined,
    CalculatedPointsOutOfRange,
    TopPointsBelowMinimum,
    LastPointsAboveMaximum,
}

impl ValidationErrorCode {
    pub fn as_str(self) -> &'static str {
        use ValidationErrorCode::*;
        match self {
            InvalidDateFormat => "E-00-01",
            FutureDate => "E-00-02",
            TooOldDate => "E-00-03",
            InvalidRank => "E-00-04",
            InvalidFinalPointsRange => "E-00-05",
            InvalidFinalPointsPrecision => "E-00-06",
            InvalidRawScoreRange => "E-00-07",
            InvalidRawScoreUnit => "E-00-08",
            InvalidChipCount => "E-00-09",
            InvalidFloatingCountRange => "E-00-10",
            FloatingCountWithFixedUma => "E-01-01",
            MissingFloatingCount => "E-01-02",
            MissingFinalPoints => "E-01-03",
            MissingRawScore => "E-01-04",
            ImpossibleZeroFloating => "E-10-01",
            ImpossibleAllFloating => "E-10-02",
            FloatingScoreWithZeroCount => "E-20-01",
            SinkingScoreWithAllFloating => "E-20-02",
            TopRankSinkingWithFloating => "E-30-01",
            LastRankFloatingWithoutAllFloating => "E-30-02",
            LastRankFloatingWithLowerStart => "E-30-03",
            AllFloatingWithSinkingScore => "E-30-04",
            AllSinkingWithFloatingScore => "E-30-05",
            UmaNotDefined => "E-40-01",
            CalculatedPointsOutOfRange => "E-40-02",
            TopPointsBelowMinimum => "E-43-01",
            LastPointsAboveMaximum => "E-44-01",
        }
    }

    fn message(self) -> &'static str {
        use ValidationErrorCode::*;
        match self {
            InvalidDateFormat => "日付の形式が正しくありません",
            FutureDate => "未来の日付は選択できません",
            TooOldDate => "5年以上前の日付は選択できません",
            InvalidRank => "順位が範囲外です",
            InvalidFinalPointsRange => "最終ポイントが範囲外です",
            InvalidFinalPointsPrecision => "最終ポイントの精度が正しくありません",
            InvalidRawScoreRange => "素点が範囲外です",
            InvalidRawScoreUnit => "素点の単位が正しくありません",
            InvalidChipCount => "チップ数が正しくありません",
            InvalidFloatingCountRange => "浮き人数が範囲外です",
            FloatingCountWithFixedUma => "固定ウマルールでは浮き人数は不要です",
            MissingFloatingCount => "浮きウマルールでは浮き人数が必須です",
            MissingFinalPoints => "順位+最終ポイント方式では最終ポイントが必要です",
            MissingRawScore => "順位+素点方式では素点が必要です",
            ImpossibleZeroFloating => "開始点と基準点が同じ場合、浮き人数0は存在しません",
            ImpossibleAllFloating => "開始点が基準点より小さい場合、全員浮きは不可能です",
            FloatingScoreWithZeroCount => "自分が浮いているのに浮き人数が0人になっています",
            SinkingScoreWithAllFloating => "自分が沈んでいるのに全員浮きになっています",
            TopRankSinkingWithFloating => {
                "1位なのに素点が基準点未満です（浮き人数が2人以上の場合、1位は必ず浮きます）"
            }
            LastRankFloatingWithoutAllFloating => {
                "最下位なのに素点が基準点以上です（浮き人数が少ない場合、最下位は必ず沈みます）"
            }
            LastRankFloatingWithLowerStart => {
                "開始点が基準点より小さい場合、最下位が浮くことはありません"
            }
            AllFloatingWithSinkingScore => "全員浮きなのに自分が沈んでいます",
            AllSinkingWithFloatingScore => "全員沈みなのに自分が浮いています",
            UmaNotDefined => "選択されたルールに該当するウマが定義されていません",
            CalculatedPointsOutOfRange => "計算された最終ポイントが範囲外です",
            TopPointsBelowMinimum => "1位の最終ポイントがルール上の最小値を下回っています",
            LastPointsAboveMaximum => "最下位の最終ポイントがルール上の最大値を上回っています",
        }
    }

    fn hint(self) -> &'static str {
        use ValidationErrorCode::*;
        match self {
            InvalidDateFormat => "YYYY-MM-DD形式で入力してください",
            FutureDate => "今日以前の日付を選択してください",
            TooOldDate => "直近5年以内の日付を選択してください",
            InvalidRank => "1から{maxRank}の範囲で入力してください",
            InvalidFinalPointsRange => "-999.9から999.9の範囲で入力してください",
            InvalidFinalPointsPrecision => "小数点第1位までで入力してください",
            InvalidRawScoreRange => "-999900から999900の範囲で入力してください",
            InvalidRawScoreUnit => "下2桁は00である必要があります（100点単位）",
            InvalidChipCount => "0以上の整数を入力してください",
            InvalidFloatingCountRange => "0から{maxFloating}の範囲で入力してください",
            FloatingCountWithFixedUma => "浮き人数の入力を削除してください",
            MissingFloatingCount => "浮き人数を入力してください",
            MissingFinalPoints => "最終ポイントを入力してください",
            MissingRawScore => "素点を入力してください",
            ImpossibleZeroFloating => "浮き人数を1以上に修正してください",
            ImpossibleAllFloating => "浮き人数を{maxFloating}未満に修正してください",
            FloatingScoreWithZeroCount => "浮き人数を1人以上に修正してください",
            SinkingScoreWithAllFloating => "浮き人数または素点を確認してください",
            TopRankSinkingWithFloating => "素点または順位を確認してください",
            LastRankFloatingWithoutAllFloating => "素点または順位を確認してください",
            LastRankFloatingWithLowerStart => "素点または順位を確認してください",
            AllFloatingWithSinkingScore => "浮き人数または素点を確認してください",
            AllSinkingWithFloatingScore => "浮き人数または素点を確認してください",
            UmaNotDefined => "ルールまたは浮き人数を確認してください",
            CalculatedPointsOutOfRange => "素点または順位を確認してください",
            TopPointsBelowMinimum => "最終ポイントは{minPoints}以上である必要があります",
            LastPointsAboveMaximum => "最終ポイントは{maxPoints}以下である必要があります",
        }
    }
}

impl Serialize for ValidationErrorCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub field: &'static str,
    #[schema(value_type = String)]
    pub code: ValidationErrorCode,
    pub message: String,
    pub severity: ValidationSeverity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ValidationError {
    fn new(field: &'static str, code: ValidationErrorCode) -> Self {
        Self {
            field,
            code,
            message: code.message().to_string(),
            severity: ValidationSeverity::Error,
            hint: Some(code.hint().to_string()),
        }
    }

    fn with_params(
        field: &'static str,
        code: ValidationErrorCode,
        params: &[(&str, String)],
    ) -> Self {
        Self {
            field,
            code,
            message: fill_placeholders(code.message(), params),
            severity: ValidationSeverity::Error,
            hint: Some(fill_placeholders(code.hint(), params)),
        }
    }
}

fn fill_placeholders(template: &str, params: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (key, value) in params {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    pub fn has_code(&self, code: ValidationErrorCode) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }
}

/// One player's entry as submitted on the registration form.
#[derive(Debug, Clone)]
pub struct MatchInput<'a> {
    pub date: &'a str,
    pub game_mode: GameMode,
    pub entry_method: EntryMethod,
    pub rank: i32,
    pub final_points: Option<Decimal>,
    pub raw_score: Option<i32>,
    pub floating_count: Option<u8>,
    pub chip_count: Option<i32>,
}

fn parse_match_date(date: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return Some(dt.date_naive());
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// ISO 8601 date, not in the future, not older than five years.
pub fn validate_date(date: &str) -> ValidationResult {
    let Some(parsed) = parse_match_date(date) else {
        return ValidationResult::from_errors(vec![ValidationError::new(
            "date",
            ValidationErrorCode::InvalidDateFormat,
        )]);
    };

    let mut errors = Vec::new();
    let today = Utc::now().date_naive();

    if parsed > today {
        errors.push(ValidationError::new("date", ValidationErrorCode::FutureDate));
    }

    if parsed < today - Duration::days(365 * 5) {
        errors.push(ValidationError::new("date", ValidationErrorCode::TooOldDate));
    }

    ValidationResult::from_errors(errors)
}

pub fn validate_rank_value(rank: i32, game_mode: GameMode) -> ValidationResult {
    let max_rank = game_mode.max_rank();
    if rank < 1 || rank > max_rank {
        return ValidationResult::from_errors(vec![ValidationError::with_params(
            "rank",
            ValidationErrorCode::InvalidRank,
            &[("maxRank", max_rank.to_string())],
        )]);
    }
    ValidationResult::ok()
}

pub fn validate_final_points_value(points: Decimal) -> ValidationResult {
    let mut errors = Vec::new();
    let limit = Decimal::new(9999, 1); // 999.9

    if points < -limit || points > limit {
        errors.push(ValidationError::new(
            "finalPoints",
            ValidationErrorCode::InvalidFinalPointsRange,
        ));
    }

    if points.round_dp(1) != points {
        errors.push(ValidationError::new(
            "finalPoints",
            ValidationErrorCode::InvalidFinalPointsPrecision,
        ));
    }

    ValidationResult::from_errors(errors)
}

pub fn validate_raw_score_value(score: i32) -> ValidationResult {
    let mut errors = Vec::new();

    if !(-999_900..=999_900).contains(&score) {
        errors.push(ValidationError::new(
            "rawScore",
            ValidationErrorCode::InvalidRawScoreRange,
        ));
    }

    if score % 100 != 0 {
        errors.push(ValidationError::new(
            "rawScore",
            ValidationErrorCode::InvalidRawScoreUnit,
        ));
    }

    ValidationResult::from_errors(errors)
}

pub fn validate_floating_count_value(count: u8, game_mode: GameMode) -> ValidationResult {
    let max_floating = game_mode.player_count();
    if count > max_floating {
        return ValidationResult::from_errors(vec![ValidationError::with_params(
            "floatingCount",
            ValidationErrorCode::InvalidFloatingCountRange,
            &[("maxFloating", max_floating.to_string())],
        )]);
    }
    ValidationResult::ok()
}

pub fn validate_chip_count_value(count: i32) -> ValidationResult {
    if count < 0 {
        return ValidationResult::from_errors(vec![ValidationError::new(
            "chipCount",
            ValidationErrorCode::InvalidChipCount,
        )]);
    }
    ValidationResult::ok()
}

/// Basic form checks over the fields that are present. Used directly for
/// entries registered without a ruleset.
pub fn validate_basic(input: &MatchInput) -> ValidationResult {
    let mut errors = Vec::new();

    errors.extend(validate_date(input.date).errors);
    errors.extend(validate_rank_value(input.rank, input.game_mode).errors);

    if let Some(points) = input.final_points {
        errors.extend(validate_final_points_value(points).errors);
    }
    if let Some(score) = input.raw_score {
        errors.extend(validate_raw_score_value(score).errors);
    }
    if let Some(count) = input.floating_count {
        errors.extend(validate_floating_count_value(count, input.game_mode).errors);
    }
    if let Some(count) = input.chip_count {
        errors.extend(validate_chip_count_value(count).errors);
    }

    ValidationResult::from_errors(errors)
}

/// Field-presence requirements implied by the entry method alone, usable
/// even when the entry carries no ruleset.
pub fn validate_entry_requirements(input: &MatchInput) -> ValidationResult {
    let mut errors = Vec::new();

    if input.entry_method == EntryMethod::RankPlusPoints && input.final_points.is_none() {
        errors.push(ValidationError::new(
            "finalPoints",
            ValidationErrorCode::MissingFinalPoints,
        ));
    }

    if input.entry_method == EntryMethod::RankPlusRaw && input.raw_score.is_none() {
        errors.push(ValidationError::new(
            "rawScore",
            ValidationErrorCode::MissingRawScore,
        ));
    }

    ValidationResult::from_errors(errors)
}

/// The entry method and the ruleset must agree on which fields are present.
pub fn validate_entry_method_consistency(
    input: &MatchInput,
    ruleset: &Ruleset,
) -> ValidationResult {
    let mut errors = Vec::new();

    if !ruleset.uma.is_floating() && input.floating_count.is_some() {
        errors.push(ValidationError::new(
            "floatingCount",
            ValidationErrorCode::FloatingCountWithFixedUma,
        ));
    }

    if ruleset.uma.is_floating()
        && matches!(
            input.entry_method,
            EntryMethod::RankPlusRaw | EntryMethod::ProvisionalRankOnly
        )
        && input.floating_count.is_none()
    {
        errors.push(ValidationError::new(
            "floatingCount",
            ValidationErrorCode::MissingFloatingCount,
        ));
    }

    errors.extend(validate_entry_requirements(input).errors);

    ValidationResult::from_errors(errors)
}

/// The floating count must be realizable under the ruleset's starting/base
/// point configuration.
pub fn validate_floating_count_existence(
    ruleset: &Ruleset,
    floating_count: u8,
    game_mode: GameMode,
) -> ValidationResult {
    let mut errors = Vec::new();
    let max_players = game_mode.player_count();

    if ruleset.starting_points == ruleset.base_points && floating_count == 0 {
        errors.push(ValidationError::new(
            "floatingCount",
            ValidationErrorCode::ImpossibleZeroFloating,
        ));
    }

    if ruleset.starting_points < ruleset.base_points && floating_count == max_players {
        errors.push(ValidationError::with_params(
            "floatingCount",
            ValidationErrorCode::ImpossibleAllFloating,
            &[("maxFloating", (max_players - 1).to_string())],
        ));
    }

    ValidationResult::from_errors(errors)
}

/// The player's own floating status must be consistent with the count.
pub fn validate_raw_score_floating_consistency(
    raw_score: i32,
    floating_count: u8,
    ruleset: &Ruleset,
    game_mode: GameMode,
) -> ValidationResult {
    let mut errors = Vec::new();
    let max_players = game_mode.player_count();
    let status = classify_player(raw_score, ruleset.base_points);

    if status == PlayerStatus::Floating && floating_count == 0 {
        errors.push(ValidationError::new(
            "floatingCount",
            ValidationErrorCode::FloatingScoreWithZeroCount,
        ));
    }

    if status == PlayerStatus::Sinking && floating_count == max_players {
        errors.push(ValidationError::new(
            "floatingCount",
            ValidationErrorCode::SinkingScoreWithAllFloating,
        ));
    }

    ValidationResult::from_errors(errors)
}

/// Rank and raw score must be mutually consistent with the floating count.
/// Only meaningful under a floating-uma rule.
pub fn validate_rank_raw_score_relation(
    rank: i32,
    raw_score: i32,
    floating_count: u8,
    game_mode: GameMode,
    ruleset: &Ruleset,
) -> ValidationResult {
    if !ruleset.uma.is_floating() {
        return ValidationResult::ok();
    }

    let mut errors = Vec::new();
    let base = ruleset.base_points;
    let max_players = game_mode.player_count();
    let last_rank = i32::from(max_players);

    if rank == 1 && floating_count >= 2 && raw_score < base {
        errors.push(ValidationError::new(
            "rawScore",
            ValidationErrorCode::TopRankSinkingWithFloating,
        ));
    }

    if rank == last_rank && floating_count <= max_players - 2 && raw_score > base {
        errors.push(ValidationError::new(
            "rawScore",
            ValidationErrorCode::LastRankFloatingWithoutAllFloating,
        ));
    }

    if ruleset.starting_points < base && rank == last_rank && raw_score > base {
        errors.push(ValidationError::new(
            "rawScore",
            ValidationErrorCode::LastRankFloatingWithLowerStart,
        ));
    }

    let status = classify_player(raw_score, base);

    if floating_count == max_players && status == PlayerStatus::Sinking {
        errors.push(ValidationError::new(
            "floatingCount",
            ValidationErrorCode::AllFloatingWithSinkingScore,
        ));
    }

    if floating_count == 0 && status == PlayerStatus::Floating {
        errors.push(ValidationError::new(
            "floatingCount",
            ValidationErrorCode::AllSinkingWithFloatingScore,
        ));
    }

    ValidationResult::from_errors(errors)
}

/// Points computed from a raw score must land inside the storable range.
pub fn validate_computed_points(
    rank: i32,
    raw_score: i32,
    floating_count: Option<u8>,
    ruleset: &Ruleset,
) -> ValidationResult {
    if ruleset.uma.is_floating() && floating_count.is_none() {
        // Cannot evaluate without the floating count; the missing count is
        // reported by the entry-method consistency check.
        return ValidationResult::ok();
    }

    let breakdown = match points::calculate_final_points(ruleset, rank, raw_score, floating_count)
    {
        Ok(breakdown) => breakdown,
        Err(_) => {
            let field = if ruleset.uma.is_floating() {
                "floatingCount"
            } else {
                "rank"
            };
            return ValidationResult::from_errors(vec![ValidationError::new(
                field,
                ValidationErrorCode::UmaNotDefined,
            )]);
        }
    };

    let limit = Decimal::new(9999, 1);
    if breakdown.final_points < -limit || breakdown.final_points > limit {
        return ValidationResult::from_errors(vec![ValidationError::new(
            "rawScore",
            ValidationErrorCode::CalculatedPointsOutOfRange,
        )]);
    }

    ValidationResult::ok()
}

/// A manually entered final point value for first place can never drop below
/// `uma + oka` (the value at exactly the base points).
pub fn validate_top_points_minimum(
    final_points: Decimal,
    rank: i32,
    ruleset: &Ruleset,
    floating_count: Option<u8>,
) -> ValidationResult {
    if rank != 1 {
        return ValidationResult::ok();
    }

    let top_uma = match &ruleset.uma {
        UmaRule::Fixed(uma) => match uma.first() {
            Some(&value) => value,
            None => return ValidationResult::ok(),
        },
        UmaRule::Floating(matrix) => {
            let Some(count) = floating_count.filter(|&c| c >= 1) else {
                return ValidationResult::ok();
            };
            match matrix.get(&count).and_then(|row| row.first()) {
                Some(&value) => value,
                None => return ValidationResult::ok(),
            }
        }
    };

    let min_points = Decimal::from(top_uma + ruleset.oka);
    if final_points < min_points {
        return ValidationResult::from_errors(vec![ValidationError::with_params(
            "finalPoints",
            ValidationErrorCode::TopPointsBelowMinimum,
            &[("minPoints", min_points.to_string())],
        )]);
    }

    ValidationResult::ok()
}

/// A manually entered final point value for last place can never exceed the
/// last-place uma (oka only ever goes to first).
pub fn validate_last_points_maximum(
    final_points: Decimal,
    rank: i32,
    game_mode: GameMode,
    ruleset: &Ruleset,
    floating_count: Option<u8>,
) -> ValidationResult {
    let last_rank = game_mode.max_rank();
    if rank != last_rank {
        return ValidationResult::ok();
    }

    let last_index = last_rank as usize - 1;
    let last_uma = match &ruleset.uma {
        UmaRule::Fixed(uma) => match uma.get(last_index) {
            Some(&value) => value,
            None => return ValidationResult::ok(),
        },
        UmaRule::Floating(matrix) => {
            let Some(count) = floating_count.filter(|&c| i32::from(c) < last_rank) else {
                return ValidationResult::ok();
            };
            match matrix.get(&count).and_then(|row| row.get(last_index)) {
                Some(&value) => value,
                None => return ValidationResult::ok(),
            }
        }
    };

    let max_points = Decimal::from(last_uma);
    if final_points > max_points {
        return ValidationResult::from_errors(vec![ValidationError::with_params(
            "finalPoints",
            ValidationErrorCode::LastPointsAboveMaximum,
            &[("maxPoints", max_points.to_string())],
        )]);
    }

    ValidationResult::ok()
}

/// Full validation of a match entry against its ruleset. Basic form errors
/// short-circuit the rule-consistency checks.
pub fn validate(input: &MatchInput, ruleset: &Ruleset) -> ValidationResult {
    let basic = validate_basic(input);
    if !basic.is_valid {
        return basic;
    }

    let mut errors = Vec::new();

    errors.extend(validate_entry_method_consistency(input, ruleset).errors);

    if ruleset.uma.is_floating() {
        if let Some(count) = input.floating_count {
            errors.extend(
                validate_floating_count_existence(ruleset, count, input.game_mode).errors,
            );

            if let Some(raw_score) = input.raw_score {
                errors.extend(
                    validate_raw_score_floating_consistency(
                        raw_score,
                        count,
                        ruleset,
                        input.game_mode,
                    )
                    .errors,
                );
            }
        }
    }

    if let (Some(raw_score), Some(count)) = (input.raw_score, input.floating_count) {
        errors.extend(
            validate_rank_raw_score_relation(
                input.rank,
                raw_score,
                count,
                input.game_mode,
                ruleset,
            )
            .errors,
        );
    }

    if input.entry_method == EntryMethod::RankPlusRaw {
        if let Some(raw_score) = input.raw_score {
            errors.extend(
                validate_computed_points(input.rank, raw_score, input.floating_count, ruleset)
                    .errors,
            );
        }
    }

    if let Some(final_points) = input.final_points {
        errors.extend(
            validate_top_points_minimum(final_points, input.rank, ruleset, input.floating_count)
                .errors,
        );
        errors.extend(
            validate_last_points_maximum(
                final_points,
                input.rank,
                input.game_mode,
                ruleset,
                input.floating_count,
            )
            .errors,
        );
    }

    ValidationResult::from_errors(errors)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use super::*;

    fn recent_date() -> String {
        (Utc::now() - Duration::days(30)).to_rfc3339()
    }

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

    fn fixed_four() -> Ruleset {
        ruleset(
            GameMode::Four,
            25000,
            30000,
            UmaRule::Fixed(vec![30, 10, -10, -30]),
            20,
        )
    }

    fn floating_four() -> Ruleset {
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

    fn floating_three() -> Ruleset {
        ruleset(
            GameMode::Three,
            30000,
            35000,
            UmaRule::Floating(BTreeMap::from([
                (0, vec![0, 0, 0]),
                (1, vec![40, -20, -20]),
                (2, vec![20, 0, -20]),
                (3, vec![0, 0, 0]),
            ])),
            15,
        )
    }

    fn input<'a>(
        date: &'a str,
        game_mode: GameMode,
        entry_method: EntryMethod,
        rank: i32,
    ) -> MatchInput<'a> {
        MatchInput {
            date,
            game_mode,
            entry_method,
            rank,
            final_points: None,
            raw_score: None,
            floating_count: None,
            chip_count: None,
        }
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn valid_rank_plus_points_entry_passes() {
        let date = recent_date();
        let mut entry = input(&date, GameMode::Four, EntryMethod::RankPlusPoints, 2);
        entry.final_points = Some(dec("15.0"));

        let result = validate(&entry, &fixed_four());
        assert!(result.is_valid, "{:?}", result.errors);
    }

    #[test]
    fn malformed_date_short_circuits() {
        let mut entry = input("not-a-date", GameMode::Four, EntryMethod::RankPlusPoints, 2);
        entry.final_points = Some(dec("15.0"));

        let result = validate(&entry, &fixed_four());
        assert!(!result.is_valid);
        assert!(result.has_code(ValidationErrorCode::InvalidDateFormat));
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn future_and_ancient_dates_are_rejected() {
        let future = (Utc::now() + Duration::days(3)).to_rfc3339();
        assert!(validate_date(&future).has_code(ValidationErrorCode::FutureDate));

        let ancient = (Utc::now() - Duration::days(365 * 6)).to_rfc3339();
        assert!(validate_date(&ancient).has_code(ValidationErrorCode::TooOldDate));

        let plain = (Utc::now() - Duration::days(10))
            .date_naive()
            .format("%Y-%m-%d")
            .to_string();
        assert!(validate_date(&plain).is_valid);
    }

    #[test]
    fn rank_respects_game_mode() {
        assert!(validate_rank_value(4, GameMode::Four).is_valid);
        let result = validate_rank_value(4, GameMode::Three);
        assert!(result.has_code(ValidationErrorCode::InvalidRank));
        assert!(result.errors[0].hint.as_deref().unwrap().contains('3'));
    }

    #[test]
    fn final_points_value_checks_range_and_precision() {
        assert!(validate_final_points_value(dec("999.9")).is_valid);
        assert!(validate_final_points_value(dec("-999.9")).is_valid);
        assert!(
            validate_final_points_value(dec("1000.0"))
                .has_code(ValidationErrorCode::InvalidFinalPointsRange)
        );
        assert!(
            validate_final_points_value(dec("25.12"))
                .has_code(ValidationErrorCode::InvalidFinalPointsPrecision)
        );
    }

    #[test]
    fn raw_score_value_checks_range_and_unit() {
        assert!(validate_raw_score_value(999_900).is_valid);
        assert!(
            validate_raw_score_value(1_000_000)
                .has_code(ValidationErrorCode::InvalidRawScoreRange)
        );
        assert!(
            validate_raw_score_value(32_450).has_code(ValidationErrorCode::InvalidRawScoreUnit)
        );
        assert!(
            validate_raw_score_value(-18_050).has_code(ValidationErrorCode::InvalidRawScoreUnit)
        );
    }

    #[test]
    fn floating_count_with_fixed_uma_is_rejected() {
        let date = recent_date();
        let mut entry = input(&date, GameMode::Four, EntryMethod::RankPlusPoints, 1);
        entry.final_points = Some(dec("60.0"));
        entry.floating_count = Some(2);

        let result = validate(&entry, &fixed_four());
        assert!(result.has_code(ValidationErrorCode::FloatingCountWithFixedUma));
    }

    #[test]
    fn floating_rule_raw_entry_requires_count() {
        let date = recent_date();
        let mut entry = input(&date, GameMode::Four, EntryMethod::RankPlusRaw, 1);
        entry.raw_score = Some(40000);

        let result = validate(&entry, &floating_four());
        assert!(result.has_code(ValidationErrorCode::MissingFloatingCount));
    }

    #[test]
    fn rank_plus_points_requires_final_points() {
        let date = recent_date();
        let entry = input(&date, GameMode::Four, EntryMethod::RankPlusPoints, 2);

        let result = validate(&entry, &fixed_four());
        assert!(result.has_code(ValidationErrorCode::MissingFinalPoints));
    }

    #[test]
    fn rank_plus_raw_requires_raw_score() {
        let date = recent_date();
        let entry = input(&date, GameMode::Four, EntryMethod::RankPlusRaw, 2);

        let result = validate(&entry, &fixed_four());
        assert!(result.has_code(ValidationErrorCode::MissingRawScore));
    }

    #[test]
    fn equal_points_rule_has_no_zero_floating() {
        let date = recent_date();
        let mut entry = input(&date, GameMode::Four, EntryMethod::RankPlusRaw, 2);
        entry.raw_score = Some(25000);
        entry.floating_count = Some(0);

        let result = validate(&entry, &floating_four());
        assert!(result.has_code(ValidationErrorCode::ImpossibleZeroFloating));
    }

    #[test]
    fn lower_start_rule_has_no_all_floating() {
        let date = recent_date();
        let mut entry = input(&date, GameMode::Three, EntryMethod::RankPlusRaw, 1);
        entry.raw_score = Some(40000);
        entry.floating_count = Some(3);

        let result = validate(&entry, &floating_three());
        assert!(result.has_code(ValidationErrorCode::ImpossibleAllFloating));
    }

    #[test]
    fn own_floating_score_contradicts_zero_count() {
        let rs = floating_three();
        let result = validate_raw_score_floating_consistency(36000, 0, &rs, GameMode::Three);
        assert!(result.has_code(ValidationErrorCode::FloatingScoreWithZeroCount));

        let result = validate_raw_score_floating_consistency(30000, 3, &rs, GameMode::Three);
        assert!(result.has_code(ValidationErrorCode::SinkingScoreWithAllFloating));
    }

    #[test]
    fn top_rank_cannot_sink_when_two_float() {
        let result =
            validate_rank_raw_score_relation(1, 29000, 2, GameMode::Four, &floating_four());
        assert!(result.has_code(ValidationErrorCode::TopRankSinkingWithFloating));
    }

    #[test]
    fn last_rank_cannot_float_when_few_float() {
        let result =
            validate_rank_raw_score_relation(4, 31000, 2, GameMode::Four, &floating_four());
        assert!(result.has_code(ValidationErrorCode::LastRankFloatingWithoutAllFloating));
    }

    #[test]
    fn last_rank_never_floats_with_lower_start() {
        let result =
            validate_rank_raw_score_relation(3, 36000, 2, GameMode::Three, &floating_three());
        assert!(result.has_code(ValidationErrorCode::LastRankFloatingWithLowerStart));
    }

    #[test]
    fn relation_checks_skip_fixed_uma_rules() {
        let result = validate_rank_raw_score_relation(1, 20000, 2, GameMode::Four, &fixed_four());
        assert!(result.is_valid);
    }

    #[test]
    fn computed_points_out_of_range_is_reported() {
        let date = recent_date();
        let mut entry = input(&date, GameMode::Four, EntryMethod::RankPlusRaw, 1);
        entry.raw_score = Some(999_900);

        let result = validate(&entry, &fixed_four());
        assert!(result.has_code(ValidationErrorCode::CalculatedPointsOutOfRange));
    }

    #[test]
    fn computed_points_missing_uma_row_is_reported() {
        let rs = ruleset(
            GameMode::Four,
            30000,
            30000,
            UmaRule::Floating(BTreeMap::from([(1, vec![12, -1, -3, -8])])),
            0,
        );
        let result = validate_computed_points(1, 35000, Some(2), &rs);
        assert!(result.has_code(ValidationErrorCode::UmaNotDefined));
    }

    #[test]
    fn top_points_below_minimum_is_reported() {
        // Fixed uma 30 + oka 20: first place can never score below 50.
        let result = validate_top_points_minimum(dec("45.0"), 1, &fixed_four(), None);
        assert!(result.has_code(ValidationErrorCode::TopPointsBelowMinimum));
        assert!(result.errors[0].hint.as_deref().unwrap().contains("50"));

        assert!(validate_top_points_minimum(dec("50.0"), 1, &fixed_four(), None).is_valid);
        assert!(validate_top_points_minimum(dec("45.0"), 2, &fixed_four(), None).is_valid);
    }

    #[test]
    fn top_points_minimum_uses_floating_row() {
        // Count 1: top uma 12, oka 0.
        let result = validate_top_points_minimum(dec("11.9"), 1, &floating_four(), Some(1));
        assert!(result.has_code(ValidationErrorCode::TopPointsBelowMinimum));

        assert!(validate_top_points_minimum(dec("12.0"), 1, &floating_four(), Some(1)).is_valid);
        // Without a count the check cannot run.
        assert!(validate_top_points_minimum(dec("0.0"), 1, &floating_four(), None).is_valid);
    }

    #[test]
    fn last_points_above_maximum_is_reported() {
        // Fixed last uma -30: last place can never score above -30.
        let result =
            validate_last_points_maximum(dec("-20.0"), 4, GameMode::Four, &fixed_four(), None);
        assert!(result.has_code(ValidationErrorCode::LastPointsAboveMaximum));
        assert!(result.errors[0].hint.as_deref().unwrap().contains("-30"));

        assert!(
            validate_last_points_maximum(dec("-30.0"), 4, GameMode::Four, &fixed_four(), None)
                .is_valid
        );
        assert!(
            validate_last_points_maximum(dec("-20.0"), 3, GameMode::Four, &fixed_four(), None)
                .is_valid
        );
    }

    #[test]
    fn valid_floating_raw_entry_passes_end_to_end() {
        let date = recent_date();
        let mut entry = input(&date, GameMode::Four, EntryMethod::RankPlusRaw, 1);
        entry.raw_score = Some(35000);
        entry.floating_count = Some(2);

        let result = validate(&entry, &floating_four());
        assert!(result.is_valid, "{:?}", result.errors);
    }

    #[test]
    fn validation_is_idempotent() {
        let date = recent_date();
        let mut entry = input(&date, GameMode::Four, EntryMethod::RankPlusRaw, 1);
        entry.raw_score = Some(29000);
        entry.floating_count = Some(2);

        let first = validate(&entry, &floating_four());
        let second = validate(&entry, &floating_four());
        assert_eq!(first, second);
    }
}
