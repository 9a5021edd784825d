// routes/logout.rs
// POST /logout -> clears session cookie and removes the session entry.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::routes::login::set_session_cookie;
use crate::session::SessionUser;
use crate::state::{AppState, delete_session};

pub async fn logout(State(st): State<Arc<AppState>>, session: SessionUser) -> Response {
    let mut response = match delete_session(&st, session.token()).await {
        Ok(_) => (StatusCode::OK, Json(serde_json::json!({ "ok": true }))).into_response(),
        Err(e) => {
            tracing::error!(error = ?e, "session delete failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "falha ao encerrar a sessão" })),
            )
                .into_response()
        }
    };
    // The cookie is cleared either way.
    set_session_cookie(&mut response, "", 0);
    response
}
