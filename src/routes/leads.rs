// routes/leads.rs
// Funnel moves, conversion and the per-stage summary.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::funnel::{self, FunnelSummary};
use crate::models::{Customer, Lead, LeadStage};
use crate::routes::parse_object_id;
use crate::session::SessionUser;
use crate::state::{AppState, convert_lead, move_lead};

#[derive(Deserialize)]
pub struct StageForm {
    pub stage: LeadStage,
}

pub async fn leads_stage(
    State(st): State<Arc<AppState>>,
    _session: SessionUser,
    Path(id): Path<String>,
    Json(body): Json<StageForm>,
) -> AppResult<Json<Lead>> {
    let id = parse_object_id(&id)?;
    Ok(Json(move_lead(&st, &id, body.stage).await?))
}

#[derive(Serialize)]
pub struct Conversion {
    pub lead: Lead,
    pub customer: Customer,
}

pub async fn leads_convert(
    State(st): State<Arc<AppState>>,
    _session: SessionUser,
    Path(id): Path<String>,
) -> AppResult<Json<Conversion>> {
    let id = parse_object_id(&id)?;
    let (lead, customer) = convert_lead(&st, &id).await?;
    Ok(Json(Conversion { lead, customer }))
}

pub async fn leads_summary(
    State(st): State<Arc<AppState>>,
    _session: SessionUser,
) -> Json<FunnelSummary> {
    Json(funnel::summarize(&st.leads.snapshot()))
}
