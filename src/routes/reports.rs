// routes/reports.rs
// GET /api/reports/summary?start=&end= -> period financial summary.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};

use crate::error::AppResult;
use crate::reports::{PeriodSummary, summarize};
use crate::routes::PeriodQuery;
use crate::session::SessionUser;
use crate::state::{AppState, commission_setting};

pub async fn reports_summary(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Query(q): Query<PeriodQuery>,
) -> AppResult<Json<PeriodSummary>> {
    session.require_admin()?;
    let (start, end) = q.resolve(&commission_setting(&st));
    Ok(Json(summarize(
        start,
        end,
        &st.appointments.snapshot(),
        &st.sales.snapshot(),
        &st.services.snapshot(),
        &st.payment_settings.snapshot(),
    )))
}
