// routes/users.rs
// Current session and staff accounts.

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{User, UserRole};
use crate::routes::parse_object_id;
use crate::session::SessionUser;
use crate::state::{
    AppState, NewUser, create_user, delete_user, find_user, get_user_by_id, list_users,
};
use crate::totp::{generate_base32_secret, provisioning_url, qr_png};

/// A user as exposed over HTTP; the TOTP secret never leaves the server after creation.
#[derive(Serialize)]
pub struct UserView {
    pub id: Option<String>,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub provider_id: Option<String>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        UserView {
            id: user.id.map(|id| id.to_hex()),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role.clone(),
            provider_id: user.provider_id.map(|id| id.to_hex()),
        }
    }
}

pub async fn current_session(session: SessionUser) -> Json<UserView> {
    Json(UserView::from(session.user()))
}

pub async fn users_index(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
) -> AppResult<Json<Vec<UserView>>> {
    session.require_admin()?;
    let users = list_users(&st).await?;
    Ok(Json(users.iter().map(UserView::from).collect()))
}

#[derive(Deserialize)]
pub struct UserForm {
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub provider_id: Option<ObjectId>,
}

pub async fn users_create(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Json(form): Json<UserForm>,
) -> AppResult<(StatusCode, Json<Value>)> {
    session.require_admin()?;
    let email = form.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::invalid("e-mail inválido"));
    }
    if find_user(&st, &email).await?.is_some() {
        return Err(AppError::invalid(format!("{email} já está cadastrado")));
    }
    if let Some(provider_id) = &form.provider_id {
        if st.providers.get(provider_id).is_none() {
            return Err(AppError::invalid("profissional não existe"));
        }
    }

    let secret = generate_base32_secret();
    let otpauth_url = provisioning_url(&st.config.salon_name, &email, &secret)?;
    let id = create_user(
        &st,
        NewUser {
            email: email.clone(),
            name: form.name,
            secret: secret.clone(),
            role: form.role,
            provider_id: form.provider_id,
        },
    )
    .await?;
    tracing::info!(email = %email, by = %session.user().email, "user created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": id.to_hex(),
            "email": email,
            "secret": secret,
            "otpauth_url": otpauth_url,
        })),
    ))
}

pub async fn users_delete(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    session.require_admin()?;
    let id = parse_object_id(&id)?;
    if session.user_id() == Some(&id) {
        return Err(AppError::invalid("não é possível excluir o próprio usuário"));
    }
    if !delete_user(&st, &id).await? {
        return Err(AppError::not_found(format!("usuário {}", id.to_hex())));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Enrollment QR for a user; admins see anyone's, staff only their own.
pub async fn users_qrcode(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let id = parse_object_id(&id)?;
    if !session.is_admin() && session.user_id() != Some(&id) {
        return Err(AppError::Forbidden);
    }
    let user = get_user_by_id(&st, &id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("usuário {}", id.to_hex())))?;
    let url = provisioning_url(&st.config.salon_name, &user.email, &user.secret)?;
    let png = qr_png(&url)?;
    Ok(([(CONTENT_TYPE, "image/png")], png).into_response())
}
