use chrono::{Local, NaiveDate};
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::inventory::{self, Direction};
use crate::models::{MovementKind, PantryItem, PantryLog, StockItem, UsageLog};
use crate::store::Mutation;

use super::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct MovementRequest {
    pub direction: Direction,
    pub quantity: i64,
    #[serde(default)]
    pub provider_id: Option<ObjectId>,
    #[serde(default)]
    pub responsible: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CountRequest {
    pub counted: i64,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn stock_item(state: &AppState, id: &ObjectId) -> AppResult<StockItem> {
    state
        .stock_items
        .get(id)
        .ok_or_else(|| AppError::not_found(format!("produto {}", id.to_hex())))
}

fn clean(note: Option<String>) -> Option<String> {
    note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

/// Journals the change, then sets the stock item's quantity. The journal
/// entry is withdrawn if the quantity write fails.
async fn write_stock(
    state: &AppState,
    mut item: StockItem,
    id: ObjectId,
    mut log: UsageLog,
) -> AppResult<(StockItem, UsageLog)> {
    item.quantity = log.resulting_quantity;
    let log_id = state.usage_logs.apply(Mutation::Create(log.clone())).await?;
    log.id = Some(log_id);
    if let Err(err) = state
        .stock_items
        .apply(Mutation::Update(id, item.clone()))
        .await
    {
        if let Err(undo) = state.usage_logs.apply(Mutation::Delete(log_id)).await {
            tracing::error!(log = %log_id.to_hex(), error = ?undo, "could not withdraw usage log");
        }
        return Err(err.into());
    }
    Ok((item, log))
}

pub async fn stock_movement(
    state: &AppState,
    id: &ObjectId,
    request: MovementRequest,
) -> AppResult<(StockItem, UsageLog)> {
    inventory::validate_quantity(request.quantity)?;
    let item = stock_item(state, id)?;
    let previous = item.quantity;
    let resulting = inventory::apply_movement(previous, request.direction, request.quantity);
    let log = UsageLog {
        id: None,
        stock_item_id: *id,
        provider_id: request.provider_id,
        kind: request.direction.kind(),
        quantity: request.quantity,
        previous_quantity: previous,
        resulting_quantity: resulting,
        note: clean(request.note),
        date: request.date.unwrap_or_else(today),
    };
    write_stock(state, item, *id, log).await
}

pub async fn stock_count(
    state: &AppState,
    id: &ObjectId,
    request: CountRequest,
) -> AppResult<(StockItem, UsageLog)> {
    let item = stock_item(state, id)?;
    let adjustment =
        inventory::reconcile_count(item.quantity, request.counted, request.note.as_deref())?;
    if adjustment.divergence() != 0 {
        tracing::info!(
            item = %item.name,
            system = adjustment.previous,
            counted = adjustment.counted,
            "stock count divergence"
        );
    }
    let log = UsageLog {
        id: None,
        stock_item_id: *id,
        provider_id: None,
        kind: MovementKind::Adjustment,
        quantity: adjustment.divergence().abs(),
        previous_quantity: adjustment.previous,
        resulting_quantity: adjustment.counted,
        note: adjustment.note,
        date: request.date.unwrap_or_else(today),
    };
    write_stock(state, item, *id, log).await
}

pub async fn pantry_movement(
    state: &AppState,
    id: &ObjectId,
    request: MovementRequest,
) -> AppResult<(PantryItem, PantryLog)> {
    inventory::validate_quantity(request.quantity)?;
    let mut item = state
        .pantry_items
        .get(id)
        .ok_or_else(|| AppError::not_found(format!("item da copa {}", id.to_hex())))?;
    item.quantity = inventory::apply_movement(item.quantity, request.direction, request.quantity);
    let mut log = PantryLog {
        id: None,
        pantry_item_id: *id,
        kind: request.direction.kind(),
        quantity: request.quantity,
        resulting_quantity: item.quantity,
        responsible: clean(request.responsible),
        note: clean(request.note),
        date: request.date.unwrap_or_else(today),
    };
    let log_id = state.pantry_logs.apply(Mutation::Create(log.clone())).await?;
    log.id = Some(log_id);
    if let Err(err) = state
        .pantry_items
        .apply(Mutation::Update(*id, item.clone()))
        .await
    {
        if let Err(undo) = state.pantry_logs.apply(Mutation::Delete(log_id)).await {
            tracing::error!(log = %log_id.to_hex(), error = ?undo, "could not withdraw pantry log");
        }
        return Err(err.into());
    }
    Ok((item, log))
}
