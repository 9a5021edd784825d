use anyhow::Result;
use chrono::Local;
use mongodb::bson::oid::ObjectId;

use crate::checkout::{self, SaleRequest};
use crate::error::AppResult;
use crate::inventory::{self, Direction};
use crate::models::{MovementKind, Sale, StockItem, UsageLog};
use crate::store::Mutation;

use super::AppState;

/// Writes already made for a sale, undone in reverse if a later one fails.
struct SaleWrites {
    sale: ObjectId,
    logs: Vec<ObjectId>,
    stock: Vec<(ObjectId, StockItem)>,
}

impl SaleWrites {
    async fn roll_back(self, state: &AppState) {
        for (id, item) in self.stock.into_iter().rev() {
            if let Err(err) = state.stock_items.apply(Mutation::Update(id, item)).await {
                tracing::error!(item = %id.to_hex(), error = ?err, "could not restore stock");
            }
        }
        for id in self.logs.into_iter().rev() {
            if let Err(err) = state.usage_logs.apply(Mutation::Delete(id)).await {
                tracing::error!(log = %id.to_hex(), error = ?err, "could not withdraw usage log");
            }
        }
        if let Err(err) = state.sales.apply(Mutation::Delete(self.sale)).await {
            tracing::error!(sale = %self.sale.to_hex(), error = ?err, "could not withdraw sale");
        }
    }
}

/// Stores the sale, then takes every line out of stock. Any failure
/// withdraws what was already written.
pub async fn register_sale(state: &AppState, request: SaleRequest) -> AppResult<Sale> {
    let stock = state.stock_items.snapshot();
    let mut sale = checkout::build_sale(request, &stock, Local::now().date_naive())?;
    let id = state.sales.apply(Mutation::Create(sale.clone())).await?;
    sale.id = Some(id);

    let mut writes = SaleWrites {
        sale: id,
        logs: Vec::new(),
        stock: Vec::new(),
    };
    if let Err(err) = take_out_of_stock(state, &sale, &mut writes).await {
        tracing::warn!(id = %id.to_hex(), error = ?err, "sale rolled back");
        writes.roll_back(state).await;
        return Err(err.into());
    }
    tracing::info!(id = %id.to_hex(), total = sale.total, "sale registered");
    Ok(sale)
}

async fn take_out_of_stock(state: &AppState, sale: &Sale, writes: &mut SaleWrites) -> Result<()> {
    for line in &sale.items {
        // Re-read per line so repeated items in one sale stack.
        let Some(original) = state.stock_items.get(&line.stock_item_id) else {
            continue;
        };
        let previous = original.quantity;
        let mut item = original.clone();
        item.quantity = inventory::apply_movement(previous, Direction::Out, line.quantity);
        let log_id = state
            .usage_logs
            .apply(Mutation::Create(UsageLog {
                id: None,
                stock_item_id: line.stock_item_id,
                provider_id: sale.provider_id,
                kind: MovementKind::Sale,
                quantity: line.quantity,
                previous_quantity: previous,
                resulting_quantity: item.quantity,
                note: Some(format!("venda {}", writes.sale.to_hex())),
                date: sale.date,
            }))
            .await?;
        writes.logs.push(log_id);
        state
            .stock_items
            .apply(Mutation::Update(line.stock_item_id, item))
            .await?;
        writes.stock.push((line.stock_item_id, original));
    }
    Ok(())
}
