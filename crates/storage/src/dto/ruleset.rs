use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{GameMode, Ruleset, UmaRule};
use crate::scoring::floating::{validate_uma_array, validate_uma_matrix};
use crate::scoring::points::PointBreakdown;
use crate::scoring::templates::{RuleTemplate, UmaPattern};

/// Request payload for creating or updating a ruleset. The uma configuration
/// arrives flat (fixed array plus optional floating matrix) and is folded into
/// the tagged `UmaRule` after validation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RulesetPayload {
    #[validate(custom(function = "validate_rule_name"))]
    pub rule_name: String,

    pub game_mode: GameMode,

    #[validate(range(
        min = 10000,
        max = 50000,
        message = "開始点は10000〜50000の範囲で入力してください"
    ))]
    pub starting_points: i32,

    #[validate(range(
        min = 10000,
        max = 50000,
        message = "基準点は10000〜50000の範囲で入力してください"
    ))]
    pub base_points: i32,

    #[serde(default)]
    pub use_floating_uma: bool,

    pub uma: Vec<i32>,

    #[serde(default)]
    pub uma_matrix: Option<BTreeMap<u8, Vec<i32>>>,

    pub oka: i32,

    #[serde(default)]
    pub use_chips: bool,

    #[serde(default)]
    pub memo: Option<String>,

    #[serde(default)]
    pub is_global: bool,
}

fn validate_rule_name(name: &str) -> Result<(), validator::ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > 100 {
        return Err(validator::ValidationError::new("invalid_rule_name"));
    }
    Ok(())
}

impl RulesetPayload {
    /// Engine-level validation that spans multiple fields: base vs. starting
    /// points and the uma configuration against the floating range.
    pub fn validate_scoring_rules(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.base_points < self.starting_points {
            errors.push("基準点は開始点以上である必要があります".to_string());
        }

        if self.use_floating_uma {
            match &self.uma_matrix {
                Some(matrix) => errors.extend(validate_uma_matrix(
                    matrix,
                    self.game_mode,
                    self.starting_points,
                    self.base_points,
                )),
                None => errors.push("浮きウマルールでは浮き人数別ウマ表が必要です".to_string()),
            }
        } else {
            errors.extend(validate_uma_array(&self.uma, self.game_mode));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Folds the flat uma fields into the tagged union. Only meaningful after
    /// `validate_scoring_rules` has passed.
    pub fn uma_rule(&self) -> UmaRule {
        if self.use_floating_uma {
            UmaRule::Floating(self.uma_matrix.clone().unwrap_or_default())
        } else {
            UmaRule::Fixed(self.uma.clone())
        }
    }

    pub fn normalized_memo(&self) -> Option<String> {
        self.memo
            .as_deref()
            .map(str::trim)
            .filter(|memo| !memo.is_empty())
            .map(str::to_string)
    }
}

/// A ruleset as returned by the API, with the uma rule flattened back into
/// the form the client edits.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RulesetResponse {
    pub ruleset_id: Uuid,
    pub rule_name: String,
    pub game_mode: GameMode,
    pub starting_points: i32,
    pub base_points: i32,
    pub use_floating_uma: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uma: Option<Vec<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uma_matrix: Option<BTreeMap<u8, Vec<i32>>>,
    pub oka: i32,
    pub use_chips: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    pub is_global: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Ruleset> for RulesetResponse {
    fn from(ruleset: Ruleset) -> Self {
        let (use_floating_uma, uma, uma_matrix) = match ruleset.uma {
            UmaRule::Fixed(uma) => (false, Some(uma), None),
            UmaRule::Floating(matrix) => (true, None, Some(matrix)),
        };

        Self {
            ruleset_id: ruleset.ruleset_id,
            rule_name: ruleset.rule_name,
            game_mode: ruleset.game_mode,
            starting_points: ruleset.starting_points,
            base_points: ruleset.base_points,
            use_floating_uma,
            uma,
            uma_matrix,
            oka: ruleset.oka,
            use_chips: ruleset.use_chips,
            memo: ruleset.memo,
            is_global: ruleset.is_global,
            created_by: ruleset.created_by,
            created_at: ruleset.created_at,
            updated_at: ruleset.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RulesetListResponse {
    pub rulesets: Vec<RulesetResponse>,
    pub total: usize,
}

/// Point preview request for the rule form.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PointCalculationRequest {
    pub ruleset_id: Uuid,

    #[validate(range(min = 1, max = 4, message = "順位は1〜4の範囲で入力してください"))]
    pub rank: i32,

    pub raw_score: i32,

    #[validate(range(min = 0, max = 4, message = "浮き人数は0〜4の範囲で入力してください"))]
    pub floating_count: Option<u8>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PointCalculationResponse {
    pub final_points: Decimal,
    pub calculation: PointBreakdown,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuleTemplateDto {
    pub name: String,
    pub game_mode: GameMode,
    pub starting_points: i32,
    pub base_points: i32,
    pub uma: Vec<i32>,
    pub oka: i32,
    pub description: String,
}

impl From<&RuleTemplate> for RuleTemplateDto {
    fn from(template: &RuleTemplate) -> Self {
        Self {
            name: template.name.to_string(),
            game_mode: template.game_mode,
            starting_points: template.starting_points,
            base_points: template.base_points,
            uma: template.uma.to_vec(),
            oka: template.oka,
            description: template.description.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuleTemplateResponse {
    pub templates: Vec<RuleTemplateDto>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UmaPatternDto {
    pub label: String,
    pub uma: Vec<i32>,
}

impl From<&UmaPattern> for UmaPatternDto {
    fn from(pattern: &UmaPattern) -> Self {
        Self {
            label: pattern.label.to_string(),
            uma: pattern.uma.to_vec(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UmaPatternsResponse {
    pub three: Vec<UmaPatternDto>,
    pub four: Vec<UmaPatternDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> RulesetPayload {
        RulesetPayload {
            rule_name: "Mリーグルール".to_string(),
            game_mode: GameMode::Four,
            starting_points: 25000,
            base_points: 30000,
            use_floating_uma: false,
            uma: vec![30, 10, -10, -30],
            uma_matrix: None,
            oka: 20,
            use_chips: false,
            memo: Some("  ".to_string()),
            is_global: false,
        }
    }

    #[test]
    fn fixed_payload_validates_and_folds() {
        let payload = payload();
        assert!(payload.validate_scoring_rules().is_ok());
        assert_eq!(payload.uma_rule(), UmaRule::Fixed(vec![30, 10, -10, -30]));
        assert_eq!(payload.normalized_memo(), None);
    }

    #[test]
    fn base_points_must_not_be_below_starting_points() {
        let mut payload = payload();
        payload.base_points = 20000;
        let errors = payload.validate_scoring_rules().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("基準点は開始点以上")));
    }

    #[test]
    fn floating_payload_requires_matrix() {
        let mut payload = payload();
        payload.use_floating_uma = true;
        let errors = payload.validate_scoring_rules().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("浮き人数別ウマ表")));
    }

    #[test]
    fn unbalanced_uma_is_rejected() {
        let mut payload = payload();
        payload.uma = vec![30, 10, -10, -20];
        assert!(payload.validate_scoring_rules().is_err());
    }

    #[test]
    fn response_flattens_the_uma_rule() {
        let payload = payload();
        let response = RulesetResponse {
            ruleset_id: Uuid::nil(),
            rule_name: payload.rule_name.clone(),
            game_mode: payload.game_mode,
            starting_points: payload.starting_points,
            base_points: payload.base_points,
            use_floating_uma: false,
            uma: Some(payload.uma.clone()),
            uma_matrix: None,
            oka: payload.oka,
            use_chips: false,
            memo: None,
            is_global: false,
            created_by: "user".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["useFloatingUma"], serde_json::json!(false));
        assert_eq!(json["uma"], serde_json::json!([30, 10, -10, -30]));
        assert!(json.get("umaMatrix").is_none());
    }
}
