// routes/assistant.rs
// POST /api/assistant { "question": "..." } -> { "answer": "..." }

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::assistant::{SnapshotSource, ask, build_snapshot};
use crate::error::{AppError, AppResult};
use crate::routes::today;
use crate::session::SessionUser;
use crate::settlement::fortnight_containing;
use crate::state::{AppState, commission_setting};

#[derive(Deserialize)]
pub struct Question {
    pub question: String,
}

#[derive(Serialize)]
pub struct Answer {
    pub answer: String,
}

pub async fn assistant_ask(
    State(st): State<Arc<AppState>>,
    _session: SessionUser,
    Json(body): Json<Question>,
) -> AppResult<Json<Answer>> {
    if body.question.trim().is_empty() {
        return Err(AppError::invalid("pergunta vazia"));
    }
    let today = today();
    let appointments = st.appointments.snapshot();
    let customers = st.customers.snapshot();
    let services = st.services.snapshot();
    let providers = st.providers.snapshot();
    let stock = st.stock_items.snapshot();
    let leads = st.leads.snapshot();
    let sales = st.sales.snapshot();
    let payment_settings = st.payment_settings.snapshot();
    let snapshot = build_snapshot(&SnapshotSource {
        today,
        period: fortnight_containing(today, &commission_setting(&st)),
        appointments: &appointments,
        customers: &customers,
        services: &services,
        providers: &providers,
        stock: &stock,
        leads: &leads,
        sales: &sales,
        payment_settings: &payment_settings,
    });

    let answer = ask(st.assistant.as_ref(), &snapshot, &body.question).await?;
    Ok(Json(Answer { answer }))
}
