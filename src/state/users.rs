use anyhow::{Context, Result};
use data_encoding::BASE32_NOPAD;
use futures::stream::TryStreamExt;
use mongodb::bson::{DateTime, doc, oid::ObjectId};
use rand::RngCore;
use std::time::{Duration, SystemTime};

use crate::models::{Session, User, UserRole};

use super::{AppState, SESSION_TTL_SECONDS};

pub async fn find_user(state: &AppState, email: &str) -> Result<Option<User>> {
    Ok(state
        .users
        .find_one(doc! { "email": email.trim().to_lowercase() })
        .await?)
}

pub async fn count_users(state: &AppState) -> Result<u64> {
    Ok(state.users.count_documents(doc! {}).await?)
}

pub async fn create_session(state: &AppState, email: &str) -> Result<String> {
    let _ = state
        .sessions
        .delete_many(doc! { "user_email": email.to_string() })
        .await;

    let mut token_bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut token_bytes);
    let token = BASE32_NOPAD.encode(&token_bytes);

    let expires_at =
        DateTime::from_system_time(SystemTime::now() + Duration::from_secs(SESSION_TTL_SECONDS));

    state
        .sessions
        .insert_one(Session {
            id: None,
            token: token.clone(),
            user_email: email.to_string(),
            expires_at,
        })
        .await?;

    Ok(token)
}

pub async fn find_user_by_session(state: &AppState, token: &str) -> Result<Option<User>> {
    if let Some(session) = state.sessions.find_one(doc! { "token": token }).await? {
        let expires_at = session.expires_at.to_system_time();
        if expires_at <= SystemTime::now() {
            // Remove expired session, ignore result
            let _ = state.sessions.delete_one(doc! { "token": token }).await;
            return Ok(None);
        }
        find_user(state, &session.user_email).await
    } else {
        Ok(None)
    }
}

pub async fn list_users(state: &AppState) -> Result<Vec<User>> {
    let mut cursor = state.users.find(doc! {}).await?;
    let mut users = Vec::new();
    while let Some(user) = cursor.try_next().await? {
        users.push(user);
    }
    users.sort_by(|a, b| a.email.cmp(&b.email));
    Ok(users)
}

pub async fn get_user_by_id(state: &AppState, id: &ObjectId) -> Result<Option<User>> {
    Ok(state.users.find_one(doc! { "_id": id }).await?)
}

pub struct NewUser {
    pub email: String,
    pub name: String,
    pub secret: String,
    pub role: UserRole,
    pub provider_id: Option<ObjectId>,
}

pub async fn create_user(state: &AppState, user: NewUser) -> Result<ObjectId> {
    let res = state
        .users
        .insert_one(User {
            id: None,
            email: user.email.trim().to_lowercase(),
            name: user.name.trim().to_string(),
            secret: user.secret,
            role: user.role,
            provider_id: user.provider_id,
            created_at: Some(DateTime::now()),
        })
        .await?;
    res.inserted_id
        .as_object_id()
        .context("user insert missing _id")
}

pub async fn delete_user(state: &AppState, id: &ObjectId) -> Result<bool> {
    let Some(user) = get_user_by_id(state, id).await? else {
        return Ok(false);
    };
    state.users.delete_one(doc! { "_id": id }).await?;
    let _ = state
        .sessions
        .delete_many(doc! { "user_email": &user.email })
        .await;
    Ok(true)
}

pub async fn delete_session(state: &AppState, token: &str) -> Result<()> {
    let _ = state.sessions.delete_one(doc! { "token": token }).await?;
    Ok(())
}
