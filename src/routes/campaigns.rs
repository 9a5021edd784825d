// routes/campaigns.rs
// GET /api/campaigns/{id}/messages -> one WhatsApp link per customer with a phone.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::messaging::{campaign_message, whatsapp_link};
use crate::routes::agenda::MessageLink;
use crate::routes::parse_object_id;
use crate::session::SessionUser;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AudienceQuery {
    /// Only VIP customers.
    #[serde(default)]
    pub vip: bool,
}

pub async fn campaigns_messages(
    State(st): State<Arc<AppState>>,
    _session: SessionUser,
    Path(id): Path<String>,
    Query(q): Query<AudienceQuery>,
) -> AppResult<Json<Vec<MessageLink>>> {
    let id = parse_object_id(&id)?;
    let campaign = st
        .campaigns
        .get(&id)
        .ok_or_else(|| AppError::not_found(format!("campanha {}", id.to_hex())))?;
    if campaign.message.trim().is_empty() {
        return Err(AppError::invalid("campanha sem mensagem"));
    }
    let links = st
        .customers
        .snapshot()
        .into_iter()
        .filter(|c| !q.vip || c.is_vip)
        .filter(|c| !c.phone.trim().is_empty())
        .map(|c| {
            let text = campaign_message(&campaign.message, &c.name);
            MessageLink {
                url: whatsapp_link(&c.phone, &text),
                phone: c.phone,
                text,
            }
        })
        .collect();
    Ok(Json(links))
}
