// routes/login.rs
// POST /login { "email": "...", "code": "123456" } -> session cookie
// POST /signup { "email": "...", "name": "..." } -> first admin, only while no user exists

use axum::{
    extract::{Json, State},
    http::{HeaderValue, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::UserRole;
use crate::session::SESSION_COOKIE_NAME;
use crate::state::{
    AppState, NewUser, SESSION_TTL_SECONDS, count_users, create_session, create_user, find_user,
};
use crate::totp::{build_totp, generate_base32_secret, provisioning_url};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub code: String,
}

/// Verifies the current TOTP code with a small skew (±1 step) defined in TOTP::new().
pub async fn login(
    State(st): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Response> {
    let Some(user) = find_user(&st, &body.email).await? else {
        tracing::info!(email = %body.email, "login for unknown user");
        return Err(AppError::Unauthorized);
    };
    let totp = build_totp(&st.config.salon_name, &user.email, &user.secret)?;
    if !totp.check_current(body.code.trim()).unwrap_or(false) {
        tracing::info!(email = %user.email, "login with wrong code");
        return Err(AppError::Unauthorized);
    }

    let token = create_session(&st, &user.email).await?;
    let mut response = (
        StatusCode::OK,
        Json(json!({
            "ok": true,
            "email": user.email,
            "name": user.name,
            "role": user.role.as_str(),
        })),
    )
        .into_response();
    set_session_cookie(&mut response, &token, SESSION_TTL_SECONDS);
    Ok(response)
}

#[derive(Deserialize)]
pub struct SignupRequest {
    pub email: String,
    #[serde(default)]
    pub name: String,
}

pub async fn signup(
    State(st): State<Arc<AppState>>,
    Json(body): Json<SignupRequest>,
) -> AppResult<Response> {
    let email = body.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::invalid("e-mail inválido"));
    }
    if count_users(&st).await? > 0 {
        return Err(AppError::Forbidden);
    }

    let secret = generate_base32_secret();
    let otpauth_url = provisioning_url(&st.config.salon_name, &email, &secret)?;
    let id = create_user(
        &st,
        NewUser {
            email: email.clone(),
            name: body.name,
            secret: secret.clone(),
            role: UserRole::Admin,
            provider_id: None,
        },
    )
    .await?;
    tracing::info!(email = %email, "first administrator created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "ok": true,
            "id": id.to_hex(),
            "email": email,
            "secret": secret,
            "otpauth_url": otpauth_url,
        })),
    )
        .into_response())
}

pub(crate) fn set_session_cookie(response: &mut Response, token: &str, max_age: u64) {
    if let Ok(header_value) = HeaderValue::from_str(&format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}"
    )) {
        response.headers_mut().append(SET_COOKIE, header_value);
    }
}
