//! Text-level validation for the numeric fields of the match registration
//! form. Each function takes the field's current text verbatim and returns a
//! verdict; an empty string is "not yet entered" and carries no message.
//!
//! Parsing deliberately accepts a valid leading number followed by trailing
//! garbage (`"12abc"` parses as 12). The form has always behaved that way, and
//! stricter parsing would reject input it previously accepted.

use serde::Serialize;
use utoipa::ToSchema;

pub const MSG_NOT_NUMERIC: &str = "数値を入力してください";
pub const MSG_RAW_SCORE_FORMAT: &str = "6桁までの数値を入力してください（下2桁は00）";
pub const MSG_FINAL_POINTS_FORMAT: &str =
    "-999.9から999.9の範囲で入力してください（小数点第1位まで）";

pub const RAW_SCORE_MAX: i64 = 999_900;
pub const FINAL_POINTS_MAX: f64 = 999.9;

/// Uniform validation outcome for a single form field.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldVerdict {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FieldVerdict {
    fn valid() -> Self {
        Self {
            is_valid: true,
            message: None,
        }
    }

    /// Invalid without a message: the field is empty, not wrong.
    fn empty() -> Self {
        Self {
            is_valid: false,
            message: None,
        }
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: Some(message.into()),
        }
    }
}

/// Extracts a leading integer: optional sign followed by ASCII digits, with
/// anything after the digits ignored. Magnitudes beyond `i64` saturate, which
/// keeps absurdly long inputs in the out-of-range branch instead of the
/// not-numeric one.
fn parse_leading_int(text: &str) -> Option<i64> {
    let s = text.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let magnitude = rest[..digits_len].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Extracts a leading decimal number: optional sign, digits, optional
/// fractional part, optional exponent. `"12.5abc"` parses as 12.5; `".5"` and
/// `"12."` are accepted; a bare `"."` is not.
fn parse_leading_float(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let b = s.as_bytes();
    let mut i = 0;

    if matches!(b.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_start = i;
    while b.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    let mut has_digits = i > int_start;

    if b.get(i) == Some(&b'.') {
        let frac_start = i + 1;
        let mut j = frac_start;
        while b.get(j).is_some_and(u8::is_ascii_digit) {
            j += 1;
        }
        if j > frac_start || has_digits {
            has_digits = has_digits || j > frac_start;
            i = j;
        }
    }

    if !has_digits {
        return None;
    }

    if matches!(b.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(b.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_digits_start = j;
        while b.get(j).is_some_and(u8::is_ascii_digit) {
            j += 1;
        }
        if j > exp_digits_start {
            i = j;
        }
    }

    s[..i].parse::<f64>().ok()
}

/// Validates a raw score: an integer in 100-point units within
/// ±999,900 (six digits, last two always 00).
pub fn validate_raw_score(text: &str) -> FieldVerdict {
    if text.is_empty() {
        return FieldVerdict::empty();
    }

    let Some(value) = parse_leading_int(text) else {
        return FieldVerdict::invalid(MSG_NOT_NUMERIC);
    };

    if !(-RAW_SCORE_MAX..=RAW_SCORE_MAX).contains(&value) {
        return FieldVerdict::invalid(MSG_RAW_SCORE_FORMAT);
    }

    if value.abs() % 100 != 0 {
        return FieldVerdict::invalid(MSG_RAW_SCORE_FORMAT);
    }

    FieldVerdict::valid()
}

/// Validates a rank against the game mode's player count. Fractional text such
/// as `"2.5"` truncates to its leading integer; that is how the form has
/// always parsed it.
pub fn validate_rank(text: &str, max_rank: i32) -> FieldVerdict {
    if text.is_empty() {
        return FieldVerdict::empty();
    }

    let Some(value) = parse_leading_int(text) else {
        return FieldVerdict::invalid(MSG_NOT_NUMERIC);
    };

    if value < 1 || value > i64::from(max_rank) {
        return FieldVerdict::invalid(format!("1〜{max_rank}位で入力してください"));
    }

    FieldVerdict::valid()
}

/// Validates a final point value: within ±999.9 with at most one digit after
/// the decimal point. The decimal-place check inspects the original text, not
/// the parsed value, since parsing silently normalizes precision.
pub fn validate_final_points(text: &str) -> FieldVerdict {
    if text.is_empty() {
        return FieldVerdict::empty();
    }

    let Some(value) = parse_leading_float(text) else {
        return FieldVerdict::invalid(MSG_NOT_NUMERIC);
    };

    if !(-FINAL_POINTS_MAX..=FINAL_POINTS_MAX).contains(&value) {
        return FieldVerdict::invalid(MSG_FINAL_POINTS_FORMAT);
    }

    let decimal_places = text.split('.').nth(1).map_or(0, str::len);
    if decimal_places > 1 {
        return FieldVerdict::invalid(MSG_FINAL_POINTS_FORMAT);
    }

    FieldVerdict::valid()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invalid_with(verdict: FieldVerdict, message: &str) {
        assert!(!verdict.is_valid);
        assert_eq!(verdict.message.as_deref(), Some(message));
    }

    #[test]
    fn raw_score_accepts_hundred_point_units() {
        for text in ["45000", "32400", "100", "999900", "0"] {
            assert!(validate_raw_score(text).is_valid, "{text}");
        }
        for text in ["-25000", "-18000", "-100", "-999900"] {
            assert!(validate_raw_score(text).is_valid, "{text}");
        }
    }

    #[test]
    fn raw_score_empty_is_silent() {
        let verdict = validate_raw_score("");
        assert!(!verdict.is_valid);
        assert!(verdict.message.is_none());
    }

    #[test]
    fn raw_score_rejects_non_numeric() {
        assert_invalid_with(validate_raw_score("abc"), MSG_NOT_NUMERIC);
        assert_invalid_with(validate_raw_score("-"), MSG_NOT_NUMERIC);
    }

    #[test]
    fn raw_score_leading_integer_parse_reaches_unit_check() {
        // "12abc" parses to 12, so it fails the 100-point-unit check rather
        // than the numeric one.
        assert_invalid_with(validate_raw_score("12abc"), MSG_RAW_SCORE_FORMAT);
    }

    #[test]
    fn raw_score_rejects_out_of_range() {
        for text in ["1000000", "999901", "-1000000", "-999901"] {
            assert_invalid_with(validate_raw_score(text), MSG_RAW_SCORE_FORMAT);
        }
    }

    #[test]
    fn raw_score_rejects_non_hundred_units() {
        for text in ["32450", "-18050", "12345", "99", "50"] {
            assert_invalid_with(validate_raw_score(text), MSG_RAW_SCORE_FORMAT);
        }
    }

    #[test]
    fn raw_score_accepts_leading_zeros() {
        assert!(validate_raw_score("025000").is_valid);
    }

    #[test]
    fn raw_score_huge_input_is_out_of_range_not_non_numeric() {
        assert_invalid_with(
            validate_raw_score("99999999999999999999999"),
            MSG_RAW_SCORE_FORMAT,
        );
    }

    #[test]
    fn rank_accepts_full_range_four_player() {
        for text in ["1", "2", "3", "4"] {
            assert!(validate_rank(text, 4).is_valid, "{text}");
        }
    }

    #[test]
    fn rank_rejects_out_of_range_four_player() {
        assert_invalid_with(validate_rank("0", 4), "1〜4位で入力してください");
        assert_invalid_with(validate_rank("5", 4), "1〜4位で入力してください");
        assert_invalid_with(validate_rank("abc", 4), MSG_NOT_NUMERIC);
        assert!(!validate_rank("", 4).is_valid);
        assert!(validate_rank("", 4).message.is_none());
    }

    #[test]
    fn rank_respects_three_player_maximum() {
        for text in ["1", "2", "3"] {
            assert!(validate_rank(text, 3).is_valid, "{text}");
        }
        assert_invalid_with(validate_rank("4", 3), "1〜3位で入力してください");
        assert_invalid_with(validate_rank("0", 3), "1〜3位で入力してください");
    }

    #[test]
    fn rank_truncates_fractional_text() {
        // Leading-integer parsing turns "2.5" into 2: truncation, not rounding.
        assert!(validate_rank("2.5", 4).is_valid);
        assert_invalid_with(validate_rank("0.9", 4), "1〜4位で入力してください");
    }

    #[test]
    fn final_points_accepts_one_decimal_place() {
        for text in ["25.1", "-25.1", "0", "0.0", "999.9", "-999.9", "100"] {
            assert!(validate_final_points(text).is_valid, "{text}");
        }
    }

    #[test]
    fn final_points_rejects_two_decimal_places() {
        assert_invalid_with(validate_final_points("25.12"), MSG_FINAL_POINTS_FORMAT);
        assert_invalid_with(validate_final_points("-0.15"), MSG_FINAL_POINTS_FORMAT);
    }

    #[test]
    fn final_points_rejects_out_of_range() {
        assert_invalid_with(validate_final_points("1000.0"), MSG_FINAL_POINTS_FORMAT);
        assert_invalid_with(validate_final_points("-1000.0"), MSG_FINAL_POINTS_FORMAT);
        assert_invalid_with(validate_final_points("1000"), MSG_FINAL_POINTS_FORMAT);
    }

    #[test]
    fn final_points_rejects_non_numeric() {
        assert_invalid_with(validate_final_points("abc"), MSG_NOT_NUMERIC);
        assert_invalid_with(validate_final_points("."), MSG_NOT_NUMERIC);
        let verdict = validate_final_points("");
        assert!(!verdict.is_valid);
        assert!(verdict.message.is_none());
    }

    #[test]
    fn final_points_decimal_check_uses_original_text() {
        // "12.5abc" parses to 12.5, but the text after the dot is four
        // characters long, so the string-level precision check rejects it.
        assert_invalid_with(validate_final_points("12.5abc"), MSG_FINAL_POINTS_FORMAT);
    }

    #[test]
    fn final_points_accepts_leading_zeros_and_bare_fraction() {
        assert!(validate_final_points("025.5").is_valid);
        assert!(validate_final_points(".5").is_valid);
        assert!(validate_final_points("12.").is_valid);
    }

    #[test]
    fn final_points_exponent_is_parsed_before_range_check() {
        // parseFloat-style input: 1e3 is 1000, which is out of range.
        assert_invalid_with(validate_final_points("1e3"), MSG_FINAL_POINTS_FORMAT);
    }

    #[test]
    fn validators_are_idempotent() {
        for text in ["", "abc", "12abc", "25000", "25.12"] {
            assert_eq!(validate_raw_score(text), validate_raw_score(text));
            assert_eq!(validate_rank(text, 4), validate_rank(text, 4));
            assert_eq!(validate_final_points(text), validate_final_points(text));
        }
    }
}
