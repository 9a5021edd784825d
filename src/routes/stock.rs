// routes/stock.rs
// Stock movements and counts, pantry movements, low-stock lists and label scanning.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::inventory::{low_pantry, low_stock, stock_value};
use crate::models::{PantryItem, PantryLog, StockItem, UsageLog};
use crate::ocr::match_item;
use crate::routes::parse_object_id;
use crate::session::SessionUser;
use crate::state::{
    AppState, CountRequest, MovementRequest, pantry_movement, stock_count, stock_movement,
};

#[derive(Serialize)]
pub struct StockChange {
    pub item: StockItem,
    pub log: UsageLog,
}

pub async fn stock_move(
    State(st): State<Arc<AppState>>,
    _session: SessionUser,
    Path(id): Path<String>,
    Json(body): Json<MovementRequest>,
) -> AppResult<Json<StockChange>> {
    let id = parse_object_id(&id)?;
    let (item, log) = stock_movement(&st, &id, body).await?;
    Ok(Json(StockChange { item, log }))
}

pub async fn stock_recount(
    State(st): State<Arc<AppState>>,
    _session: SessionUser,
    Path(id): Path<String>,
    Json(body): Json<CountRequest>,
) -> AppResult<Json<StockChange>> {
    let id = parse_object_id(&id)?;
    let (item, log) = stock_count(&st, &id, body).await?;
    Ok(Json(StockChange { item, log }))
}

#[derive(Serialize)]
pub struct StockOverview {
    pub low_stock: Vec<StockItem>,
    pub stock_value: f64,
}

pub async fn stock_low(
    State(st): State<Arc<AppState>>,
    _session: SessionUser,
) -> Json<StockOverview> {
    let items = st.stock_items.snapshot();
    Json(StockOverview {
        low_stock: low_stock(&items),
        stock_value: stock_value(&items),
    })
}

#[derive(Deserialize)]
pub struct ScanForm {
    pub text: String,
}

pub async fn stock_scan(
    State(st): State<Arc<AppState>>,
    _session: SessionUser,
    Json(body): Json<ScanForm>,
) -> AppResult<Json<StockItem>> {
    let items = st.stock_items.snapshot();
    match_item(&body.text, &items)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::not_found("produto correspondente ao rótulo"))
}

#[derive(Serialize)]
pub struct PantryChange {
    pub item: PantryItem,
    pub log: PantryLog,
}

pub async fn pantry_move(
    State(st): State<Arc<AppState>>,
    _session: SessionUser,
    Path(id): Path<String>,
    Json(body): Json<MovementRequest>,
) -> AppResult<Json<PantryChange>> {
    let id = parse_object_id(&id)?;
    let (item, log) = pantry_movement(&st, &id, body).await?;
    Ok(Json(PantryChange { item, log }))
}

pub async fn pantry_low(
    State(st): State<Arc<AppState>>,
    _session: SessionUser,
) -> Json<Vec<PantryItem>> {
    Json(low_pantry(&st.pantry_items.snapshot()))
}
