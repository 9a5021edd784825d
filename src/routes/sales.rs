// routes/sales.rs
// POST /api/sales -> registers a point-of-sale sale and takes the items out of stock.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use crate::checkout::SaleRequest;
use crate::error::AppResult;
use crate::models::Sale;
use crate::session::SessionUser;
use crate::state::{AppState, register_sale};

pub async fn sales_create(
    State(st): State<Arc<AppState>>,
    _session: SessionUser,
    Json(body): Json<SaleRequest>,
) -> AppResult<(StatusCode, Json<Sale>)> {
    let sale = register_sale(&st, body).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}
