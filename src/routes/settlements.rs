// routes/settlements.rs
// Commission settlements: JSON, printable receipt (HTML and PDF) and WhatsApp summary.

use std::sync::Arc;

use askama::Template;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::messaging::whatsapp_link;
use crate::models::Provider;
use crate::pdf;
use crate::routes::agenda::MessageLink;
use crate::routes::{PeriodQuery, parse_object_id, render};
use crate::session::SessionUser;
use crate::settlement::{Settlement, format_brl, format_rate, summary_message};
use crate::state::{
    AppState, all_settlements, commission_setting, find_provider, provider_settlement,
};

#[derive(Serialize)]
pub struct ProviderSettlement {
    pub provider_name: String,
    #[serde(flatten)]
    pub settlement: Settlement,
}

fn settle(
    st: &AppState,
    session: &SessionUser,
    id: &str,
    q: &PeriodQuery,
) -> AppResult<(Provider, Settlement)> {
    session.require_admin()?;
    let id = parse_object_id(id)?;
    let provider = find_provider(st, &id)?;
    let (start, end) = q.resolve(&commission_setting(st));
    let settlement = provider_settlement(st, &provider, start, end)?;
    Ok((provider, settlement))
}

pub async fn settlements_show(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
    Query(q): Query<PeriodQuery>,
) -> AppResult<Json<ProviderSettlement>> {
    let (provider, settlement) = settle(&st, &session, &id, &q)?;
    Ok(Json(ProviderSettlement {
        provider_name: provider.name,
        settlement,
    }))
}

pub async fn settlements_index(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Query(q): Query<PeriodQuery>,
) -> AppResult<Json<Vec<ProviderSettlement>>> {
    session.require_admin()?;
    let (start, end) = q.resolve(&commission_setting(&st));
    let results = all_settlements(&st, start, end)?
        .into_iter()
        .map(|(provider, settlement)| ProviderSettlement {
            provider_name: provider.name,
            settlement,
        })
        .collect();
    Ok(Json(results))
}

struct ReceiptRow {
    date: String,
    time: String,
    service: String,
    client: String,
    base: String,
    rate: String,
    payout: String,
}

#[derive(Template)]
#[template(path = "settlement/receipt.html")]
struct ReceiptTemplate {
    salon: String,
    provider_name: String,
    period: String,
    rows: Vec<ReceiptRow>,
    count: usize,
    revenue: String,
    payout: String,
    effective_rate: String,
}

pub async fn settlements_receipt(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
    Query(q): Query<PeriodQuery>,
) -> AppResult<Html<String>> {
    let (provider, settlement) = settle(&st, &session, &id, &q)?;
    render(ReceiptTemplate {
        salon: st.config.salon_name.clone(),
        provider_name: provider.name,
        period: format!(
            "{} a {}",
            settlement.period_start.format("%d/%m/%Y"),
            settlement.period_end.format("%d/%m/%Y")
        ),
        rows: settlement
            .lines
            .iter()
            .map(|l| ReceiptRow {
                date: l.date.format("%d/%m/%Y").to_string(),
                time: l.time.clone(),
                service: l.service_name.clone(),
                client: l.client_name.clone(),
                base: format_brl(l.base_value),
                rate: format_rate(l.rate),
                payout: format_brl(l.payout),
            })
            .collect(),
        count: settlement.count,
        revenue: format_brl(settlement.revenue),
        payout: format_brl(settlement.payout),
        effective_rate: format_rate(settlement.effective_rate),
    })
}

pub async fn settlements_pdf(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
    Query(q): Query<PeriodQuery>,
) -> AppResult<Response> {
    let (provider, settlement) = settle(&st, &session, &id, &q)?;
    let source = pdf::settlement_source(&st.config.salon_name, &provider.name, &settlement);
    let bytes = pdf::compile_typst(&st.config.typst_bin, &source).await?;
    let filename = format!(
        "fechamento-{}.pdf",
        settlement.period_end.format("%Y-%m-%d")
    );
    Ok((
        [
            (CONTENT_TYPE, "application/pdf".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("inline; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

pub async fn settlements_message(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
    Query(q): Query<PeriodQuery>,
) -> AppResult<Json<MessageLink>> {
    let (provider, settlement) = settle(&st, &session, &id, &q)?;
    let phone = provider
        .phone
        .clone()
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::invalid("profissional sem telefone cadastrado"))?;
    let text = summary_message(&st.config.salon_name, &provider.name, &settlement);
    Ok(Json(MessageLink {
        url: whatsapp_link(&phone, &text),
        phone,
        text,
    }))
}
