//! Ruleset-driven score computation and input validation.
//!
//! Everything in this module is a synchronous computation over immutable
//! input: text-level field validation for the registration form, the legal
//! floating-count range of a ruleset, conversion of raw scores into
//! standardized final points, and the composite rule-consistency validation
//! applied before a match is persisted.

pub mod fields;
pub mod floating;
pub mod match_validator;
pub mod points;
pub mod templates;

use thiserror::Error;

pub use fields::{FieldVerdict, validate_final_points, validate_rank, validate_raw_score};
pub use floating::{FloatingRange, PlayerStatus, classify_player, floating_range};
pub use match_validator::{
    MatchInput, ValidationError, ValidationErrorCode, ValidationResult, ValidationSeverity,
};
pub use points::{PointBreakdown, calculate_final_points, calculate_provisional_points};

/// Failures of the point computation itself, as opposed to invalid user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("浮き人数{0}のウマ配列が存在しません")]
    UmaRowMissing(u8),

    #[error("浮きウマルールでは浮き人数が必須です")]
    FloatingCountRequired,

    #[error("順位{0}のウマが定義されていません")]
    UmaRankOutOfRange(i32),
}
