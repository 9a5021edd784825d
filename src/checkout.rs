// checkout.rs
// Point-of-sale totals and line validation.

use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;

use crate::error::ValidationError;
use crate::models::{Sale, SaleItem, StockItem};

#[derive(Debug, Clone, Deserialize)]
pub struct SaleLineRequest {
    pub stock_item_id: ObjectId,
    pub quantity: i64,
    /// Defaults to the item's sale price.
    #[serde(default)]
    pub unit_price: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaleRequest {
    #[serde(default)]
    pub customer_id: Option<ObjectId>,
    #[serde(default)]
    pub provider_id: Option<ObjectId>,
    pub items: Vec<SaleLineRequest>,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Sum of the lines minus the discount, never negative.
pub fn sale_total(items: &[SaleItem], discount: f64) -> f64 {
    let gross: f64 = items
        .iter()
        .map(|i| i.quantity as f64 * i.unit_price)
        .sum();
    (gross - discount.max(0.0)).max(0.0)
}

pub fn build_sale(
    request: SaleRequest,
    stock: &[StockItem],
    today: NaiveDate,
) -> Result<Sale, ValidationError> {
    if request.items.is_empty() {
        return Err(ValidationError::Required("itens da venda"));
    }
    let payment_method = request.payment_method.trim().to_string();
    if payment_method.is_empty() {
        return Err(ValidationError::Required("forma de pagamento"));
    }
    if !request.discount.is_finite() || request.discount < 0.0 {
        return Err(ValidationError::Invalid(
            "desconto não pode ser negativo".into(),
        ));
    }

    let mut items = Vec::with_capacity(request.items.len());
    for line in request.items {
        crate::inventory::validate_quantity(line.quantity)?;
        let item = stock
            .iter()
            .find(|s| s.id.as_ref() == Some(&line.stock_item_id))
            .ok_or_else(|| {
                ValidationError::Invalid(format!(
                    "produto {} não existe",
                    line.stock_item_id.to_hex()
                ))
            })?;
        let unit_price = line.unit_price.unwrap_or(item.sale_price);
        if !unit_price.is_finite() || unit_price < 0.0 {
            return Err(ValidationError::Invalid(format!(
                "preço inválido para {}",
                item.name
            )));
        }
        items.push(SaleItem {
            stock_item_id: line.stock_item_id,
            name: item.name.clone(),
            quantity: line.quantity,
            unit_price,
        });
    }

    let total = sale_total(&items, request.discount);
    Ok(Sale {
        id: None,
        customer_id: request.customer_id,
        provider_id: request.provider_id,
        items,
        discount: request.discount,
        total,
        payment_method,
        date: request.date.unwrap_or(today),
    })
}
