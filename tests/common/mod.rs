#![allow(dead_code)]

use std::{
    sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError},
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use mongodb::{
    Client,
    bson::{Document, doc, oid::ObjectId},
};
use serde_json::Value;
use tower::ServiceExt; // for oneshot

use aminna::config::AppConfig;
use aminna::session::SESSION_COOKIE_NAME;
use aminna::state::{AppState, init_state};

/// Global lock so integration tests that mutate the DB run one-at-a-time.
static TEST_DB_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

pub struct TestContext {
    pub state: AppState,
    pub db_name: String,
    uri: String,
    _guard: MutexGuard<'static, ()>,
}

impl TestContext {
    pub fn shared(&self) -> Arc<AppState> {
        Arc::new(self.state.clone())
    }
}

fn test_uri(base: &str) -> String {
    if base.contains("serverSelectionTimeoutMS") {
        return base.to_string();
    }
    let sep = if base.contains('?') { '&' } else { '?' };
    let base = if base.contains('?') || base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    };
    format!("{base}{sep}serverSelectionTimeoutMS=2000")
}

pub async fn setup_state() -> Option<TestContext> {
    let guard = TEST_DB_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    let defaults = AppConfig::from_env();
    let uri = test_uri(&defaults.mongodb_uri);
    let db_name = format!(
        "aminnatest_{}",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis()
    );

    let client = match Client::with_uri_str(&uri).await {
        Ok(c) => c,
        Err(err) => {
            eprintln!("Skipping test; cannot connect to MongoDB: {err:?}");
            return None;
        }
    };
    if let Err(err) = client.database(&db_name).drop().await {
        eprintln!("Skipping test; cannot drop test DB: {err:?}");
        return None;
    }

    let config = AppConfig {
        mongodb_uri: uri.clone(),
        mongodb_db: db_name.clone(),
        gemini_api_key: None,
        ..defaults
    };
    match init_state(&config).await {
        Ok(state) => Some(TestContext {
            state,
            db_name,
            uri,
            _guard: guard,
        }),
        Err(err) => {
            eprintln!("Skipping test; init_state failed: {err:?}");
            None
        }
    }
}

pub async fn teardown(ctx: Option<TestContext>) {
    if let Some(ctx) = ctx {
        if let Ok(client) = Client::with_uri_str(&ctx.uri).await {
            let _ = client.database(&ctx.db_name).drop().await;
        }
        drop(ctx);
    }
}

/// Deletes a row straight from MongoDB, leaving the in-memory mirror stale so
/// the next write to it fails remotely.
pub async fn remove_remote(ctx: &TestContext, table: &str, id: ObjectId) {
    let client = Client::with_uri_str(&ctx.uri).await.unwrap();
    client
        .database(&ctx.db_name)
        .collection::<Document>(table)
        .delete_one(doc! { "_id": id })
        .await
        .unwrap();
}

pub async fn send(
    app: Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        req = req.header("cookie", format!("{SESSION_COOKIE_NAME}={token}"));
    }
    let req = match body {
        Some(body) => req
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    let res = app.oneshot(req).await.expect("request failed");
    let status = res.status();
    let bytes = to_bytes(res.into_body(), 1024 * 1024)
        .await
        .expect("body read failed");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
