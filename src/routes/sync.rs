// routes/sync.rs
// POST /api/sync -> reloads every mirror from MongoDB.

use std::{collections::BTreeMap, sync::Arc};

use axum::{Json, extract::State};

use crate::error::AppResult;
use crate::session::SessionUser;
use crate::state::{AppState, load_all};

pub async fn sync(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
) -> AppResult<Json<BTreeMap<&'static str, usize>>> {
    let loaded = load_all(&st).await?;
    tracing::info!(by = %session.user().email, "mirrors reloaded");
    Ok(Json(loaded.into_iter().collect()))
}
