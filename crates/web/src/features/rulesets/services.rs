use sqlx::PgPool;
use storage::{
    dto::ruleset::{PointCalculationRequest, PointCalculationResponse, RulesetPayload},
    models::Ruleset,
    repository::ruleset::RulesetRepository,
    scoring::points,
};
use uuid::Uuid;

use crate::error::{WebError, WebResult};
use crate::middleware::auth::AuthUser;

/// List the caller's personal rulesets together with the global ones.
pub async fn list_rulesets(pool: &PgPool, user: &AuthUser) -> WebResult<Vec<Ruleset>> {
    let repo = RulesetRepository::new(pool);
    Ok(repo.list_for_user(&user.user_id, true).await?)
}

pub async fn get_ruleset(pool: &PgPool, user: &AuthUser, ruleset_id: Uuid) -> WebResult<Ruleset> {
    let repo = RulesetRepository::new(pool);
    Ok(repo.find_visible(ruleset_id, &user.user_id).await?)
}

/// Create a ruleset after engine-level validation of its uma configuration.
/// Global rulesets are reserved for admins.
pub async fn create_ruleset(
    pool: &PgPool,
    user: &AuthUser,
    req: &RulesetPayload,
) -> WebResult<Ruleset> {
    req.validate_scoring_rules().map_err(WebError::RulesetConfig)?;

    if req.is_global && !user.is_admin {
        return Err(WebError::Forbidden(
            "グローバルルールは管理者のみが作成できます".to_string(),
        ));
    }

    let repo = RulesetRepository::new(pool);
    Ok(repo.create(req, &user.user_id, req.is_global).await?)
}

/// Update a ruleset. Only the creator may write; global rulesets additionally
/// require admin rights.
pub async fn update_ruleset(
    pool: &PgPool,
    user: &AuthUser,
    ruleset_id: Uuid,
    req: &RulesetPayload,
) -> WebResult<Ruleset> {
    req.validate_scoring_rules().map_err(WebError::RulesetConfig)?;

    let repo = RulesetRepository::new(pool);
    let existing = repo.find_visible(ruleset_id, &user.user_id).await?;
    ensure_owner(user, &existing)?;

    Ok(repo.update(ruleset_id, req).await?)
}

/// Delete a ruleset. Matches recorded under it keep their stored points.
pub async fn delete_ruleset(pool: &PgPool, user: &AuthUser, ruleset_id: Uuid) -> WebResult<()> {
    let repo = RulesetRepository::new(pool);
    let existing = repo.find_visible(ruleset_id, &user.user_id).await?;
    ensure_owner(user, &existing)?;

    Ok(repo.delete(ruleset_id).await?)
}

/// Point preview: convert a raw score under a ruleset without saving anything.
pub async fn calculate_points(
    pool: &PgPool,
    user: &AuthUser,
    req: &PointCalculationRequest,
) -> WebResult<PointCalculationResponse> {
    let repo = RulesetRepository::new(pool);
    let ruleset = repo.find_visible(req.ruleset_id, &user.user_id).await?;

    let breakdown =
        points::calculate_final_points(&ruleset, req.rank, req.raw_score, req.floating_count)?;

    Ok(PointCalculationResponse {
        final_points: breakdown.final_points,
        calculation: breakdown,
    })
}

fn ensure_owner(user: &AuthUser, ruleset: &Ruleset) -> WebResult<()> {
    if ruleset.is_global {
        if !user.is_admin || ruleset.created_by != user.user_id {
            return Err(WebError::Forbidden(
                "グローバルルールは作成者のみが変更できます".to_string(),
            ));
        }
    } else if ruleset.created_by != user.user_id {
        return Err(WebError::Forbidden(
            "他のユーザーのルールは変更できません".to_string(),
        ));
    }

    Ok(())
}
