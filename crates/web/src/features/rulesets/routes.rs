use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;

use super::handlers::{
    calculate_points, create_ruleset, delete_ruleset, get_ruleset, get_templates,
    get_uma_patterns, list_rulesets, update_ruleset,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_rulesets).post(create_ruleset))
        .route("/templates", get(get_templates))
        .route("/uma-patterns", get(get_uma_patterns))
        .route("/calculate", post(calculate_points))
        .route(
            "/:ruleset_id",
            get(get_ruleset).put(update_ruleset).delete(delete_ruleset),
        )
}
