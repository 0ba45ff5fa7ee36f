//! Common routes: health and readiness.

use crate::endpoints::RegistrationState;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
struct ReadyBody {
    status: &'static str,
    registration: RegistrationState,
    database: &'static str,
}

async fn health() -> &'static str {
    "Ok"
}

/// 200 once endpoints are registered and the database answers.
async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyBody>) {
    let registration = state.synthesizer.state();
    let database_ok = sqlx::query("SELECT 1").fetch_optional(&state.pool).await.is_ok();
    let ready = database_ok && registration == RegistrationState::Registered;
    let status = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (
        status,
        Json(ReadyBody {
            status: if ready { "ok" } else { "degraded" },
            registration,
            database: if database_ok { "ok" } else { "unavailable" },
        }),
    )
}

/// `GET /health` (no state needed) and `GET /ready`.
pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .with_state(state)
}
