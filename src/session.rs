// session.rs
// Session middleware to protect routes and extractor to access session data.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::COOKIE, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures::future::BoxFuture;

use mongodb::bson::oid::ObjectId;

use crate::error::AppError;
use crate::models::User;
use crate::state::{AppState, find_user_by_session};

pub const SESSION_COOKIE_NAME: &str = "session";

#[derive(Clone)]
pub struct SessionData {
    pub user: User,
    pub token: String,
}

pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let tokens = extract_cookies(request.headers(), SESSION_COOKIE_NAME);
    if tokens.is_empty() {
        return Err(AppError::Unauthorized.into_response());
    }

    // Try all cookies with the session name until one is valid
    for token in tokens {
        match find_user_by_session(&state, &token).await {
            Ok(Some(user)) => {
                request.extensions_mut().insert(SessionData { user, token });
                return Ok(next.run(request).await);
            }
            Ok(None) => continue,
            Err(err) => return Err(AppError::Remote(err).into_response()),
        }
    }
    Err(AppError::Unauthorized.into_response())
}

pub struct SessionUser(pub SessionData);

impl SessionUser {
    pub fn user(&self) -> &User {
        &self.0.user
    }

    pub fn token(&self) -> &str {
        &self.0.token
    }

    pub fn user_id(&self) -> Option<&ObjectId> {
        self.0.user.id.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        self.0.user.role.is_admin()
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

#[allow(refining_impl_trait)]
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> BoxFuture<'static, Result<Self, Self::Rejection>> {
        let data = parts
            .extensions
            .get::<SessionData>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized.into_response());

        Box::pin(async move {
            match data {
                Ok(session) => Ok(SessionUser(session)),
                Err(resp) => Err(resp),
            }
        })
    }
}

pub fn extract_cookies(headers: &HeaderMap, name: &str) -> Vec<String> {
    headers
        .get_all(COOKIE)
        .into_iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let mut split = pair.trim().splitn(2, '=');
            let key = split.next()?.trim();
            let value = split.next()?.trim();
            if key == name {
                Some(value.to_owned())
            } else {
                None
            }
        })
        .collect()
}
