// inventory.rs
// Stock and pantry quantity arithmetic with journal-style logs.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::{MovementKind, PantryItem, StockItem};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Direction {
    #[serde(rename = "entrada")]
    In,
    #[serde(rename = "saida")]
    Out,
}

impl Direction {
    pub fn kind(&self) -> MovementKind {
        match self {
            Direction::In => MovementKind::Entry,
            Direction::Out => MovementKind::Exit,
        }
    }
}

/// Quantity after a movement. Exits never drive stock below zero.
pub fn apply_movement(current: i64, direction: Direction, quantity: i64) -> i64 {
    match direction {
        Direction::In => current.saturating_add(quantity),
        Direction::Out => current.saturating_sub(quantity).max(0),
    }
}

pub fn validate_quantity(quantity: i64) -> Result<(), ValidationError> {
    if quantity <= 0 {
        return Err(ValidationError::Invalid(
            "quantidade deve ser maior que zero".into(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountAdjustment {
    pub previous: i64,
    pub counted: i64,
    pub note: Option<String>,
}

impl CountAdjustment {
    pub fn divergence(&self) -> i64 {
        self.counted - self.previous
    }
}

/// Physical count reconciliation. A divergent count needs a justification note.
pub fn reconcile_count(
    system_quantity: i64,
    counted: i64,
    note: Option<&str>,
) -> Result<CountAdjustment, ValidationError> {
    if counted < 0 {
        return Err(ValidationError::Invalid(
            "contagem não pode ser negativa".into(),
        ));
    }
    let note = note.map(str::trim).filter(|n| !n.is_empty());
    if counted != system_quantity && note.is_none() {
        return Err(ValidationError::MissingJustification {
            system: system_quantity,
            counted,
        });
    }
    Ok(CountAdjustment {
        previous: system_quantity,
        counted,
        note: note.map(str::to_string),
    })
}

pub fn low_stock(items: &[StockItem]) -> Vec<StockItem> {
    items
        .iter()
        .filter(|i| i.active && i.quantity <= i.min_quantity)
        .cloned()
        .collect()
}

pub fn low_pantry(items: &[PantryItem]) -> Vec<PantryItem> {
    items
        .iter()
        .filter(|i| i.quantity <= i.min_quantity)
        .cloned()
        .collect()
}

pub fn stock_value(items: &[StockItem]) -> f64 {
    items
        .iter()
        .filter(|i| i.active)
        .map(|i| i.quantity as f64 * i.cost_price)
        .sum()
}
