// routes/crud.rs
// Generic JSON CRUD over the mirrored plain tables.
//
// GET    /api/<table>        -> mirror snapshot
// POST   /api/<table>        -> create
// GET    /api/<table>/{id}   -> one row
// PUT    /api/<table>/{id}   -> replace
// DELETE /api/<table>/{id}   -> remove

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};

use crate::error::{AppError, AppResult, ValidationError};
use crate::models::{
    Campaign, CommissionSetting, Customer, ExpenseCategory, Lead, PantryItem, PantryLog, Partner,
    PaymentSetting, Provider, Sale, Service, StockItem, Supplier, UsageLog,
};
use crate::routes::parse_object_id;
use crate::session::SessionUser;
use crate::state::AppState;
use crate::store::{Mutation, Record, Table};

/// A mirrored table exposed over HTTP.
pub trait Resource: Record {
    /// Writes need the admin role.
    const ADMIN_ONLY: bool = false;

    fn table(state: &AppState) -> &Table<Self>;

    /// Field-presence checks run before every write.
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

fn required(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(())
    }
}

fn non_negative(value: f64, field: &str) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        Err(ValidationError::Invalid(format!("{field} não pode ser negativo")))
    } else {
        Ok(())
    }
}

fn rate(value: f64, field: &str) -> Result<(), ValidationError> {
    if !(0.0..=1.0).contains(&value) {
        Err(ValidationError::Invalid(format!(
            "{field} deve estar entre 0 e 1"
        )))
    } else {
        Ok(())
    }
}

impl Resource for Customer {
    fn table(state: &AppState) -> &Table<Self> {
        &state.customers
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required(&self.name, "nome")
    }
}

impl Resource for Service {
    const ADMIN_ONLY: bool = true;

    fn table(state: &AppState) -> &Table<Self> {
        &state.services
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required(&self.name, "nome")?;
        non_negative(self.price, "preço")
    }
}

impl Resource for Provider {
    const ADMIN_ONLY: bool = true;

    fn table(state: &AppState) -> &Table<Self> {
        &state.providers
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required(&self.name, "nome")?;
        rate(self.commission_rate, "comissão")
    }
}

impl Resource for StockItem {
    fn table(state: &AppState) -> &Table<Self> {
        &state.stock_items
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required(&self.name, "nome")?;
        if self.quantity < 0 || self.min_quantity < 0 {
            return Err(ValidationError::Invalid(
                "quantidade não pode ser negativa".into(),
            ));
        }
        non_negative(self.cost_price, "custo")?;
        non_negative(self.sale_price, "preço de venda")
    }
}

impl Resource for Lead {
    fn table(state: &AppState) -> &Table<Self> {
        &state.leads
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required(&self.name, "nome")
    }
}

impl Resource for Partner {
    fn table(state: &AppState) -> &Table<Self> {
        &state.partners
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required(&self.name, "nome")?;
        rate(self.discount_rate, "desconto")
    }
}

impl Resource for Campaign {
    fn table(state: &AppState) -> &Table<Self> {
        &state.campaigns
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required(&self.name, "nome")?;
        if let (Some(start), Some(end)) = (self.starts_on, self.ends_on) {
            if start > end {
                return Err(ValidationError::Invalid(
                    "início da campanha após o fim".into(),
                ));
            }
        }
        Ok(())
    }
}

impl Resource for PantryItem {
    fn table(state: &AppState) -> &Table<Self> {
        &state.pantry_items
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required(&self.name, "nome")
    }
}

impl Resource for CommissionSetting {
    const ADMIN_ONLY: bool = true;

    fn table(state: &AppState) -> &Table<Self> {
        &state.commission_settings
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=27).contains(&self.cutoff_day) {
            return Err(ValidationError::Invalid(
                "dia de corte deve estar entre 1 e 27".into(),
            ));
        }
        Ok(())
    }
}

impl Resource for PaymentSetting {
    const ADMIN_ONLY: bool = true;

    fn table(state: &AppState) -> &Table<Self> {
        &state.payment_settings
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required(&self.method, "forma de pagamento")?;
        rate(self.fee_rate, "taxa")
    }
}

impl Resource for ExpenseCategory {
    const ADMIN_ONLY: bool = true;

    fn table(state: &AppState) -> &Table<Self> {
        &state.expense_categories
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required(&self.name, "nome")
    }
}

impl Resource for Supplier {
    fn table(state: &AppState) -> &Table<Self> {
        &state.suppliers
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required(&self.name, "nome")
    }
}

// Journals: written only by their operations.
impl Resource for Sale {
    fn table(state: &AppState) -> &Table<Self> {
        &state.sales
    }
}

impl Resource for UsageLog {
    fn table(state: &AppState) -> &Table<Self> {
        &state.usage_logs
    }
}

impl Resource for PantryLog {
    fn table(state: &AppState) -> &Table<Self> {
        &state.pantry_logs
    }
}

fn check_write<T: Resource>(session: &SessionUser) -> AppResult<()> {
    if T::ADMIN_ONLY {
        session.require_admin()?;
    }
    Ok(())
}

pub async fn list<T: Resource>(
    State(st): State<Arc<AppState>>,
    _session: SessionUser,
) -> Json<Vec<T>> {
    Json(T::table(&st).snapshot())
}

pub async fn show<T: Resource>(
    State(st): State<Arc<AppState>>,
    _session: SessionUser,
    Path(id): Path<String>,
) -> AppResult<Json<T>> {
    let id = parse_object_id(&id)?;
    T::table(&st)
        .get(&id)
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("{} {}", T::TABLE, id.to_hex())))
}

pub async fn create<T: Resource>(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Json(mut row): Json<T>,
) -> AppResult<(StatusCode, Json<T>)> {
    check_write::<T>(&session)?;
    row.validate()?;
    let id = T::table(&st).apply(Mutation::Create(row.clone())).await?;
    row.set_id(id);
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn update<T: Resource>(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
    Json(mut row): Json<T>,
) -> AppResult<Json<T>> {
    check_write::<T>(&session)?;
    let id = parse_object_id(&id)?;
    let table = T::table(&st);
    if table.get(&id).is_none() {
        return Err(AppError::not_found(format!("{} {}", T::TABLE, id.to_hex())));
    }
    row.validate()?;
    row.set_id(id);
    table.apply(Mutation::Update(id, row.clone())).await?;
    Ok(Json(row))
}

pub async fn delete<T: Resource>(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    check_write::<T>(&session)?;
    let id = parse_object_id(&id)?;
    let table = T::table(&st);
    if table.get(&id).is_none() {
        return Err(AppError::not_found(format!("{} {}", T::TABLE, id.to_hex())));
    }
    table.apply(Mutation::Delete(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Full CRUD routes for `T` under `/api/<table>`.
pub fn routes<T: Resource>() -> Router<Arc<AppState>> {
    let base = format!("/api/{}", T::TABLE);
    Router::new()
        .route(&base, get(list::<T>).post(create::<T>))
        .route(
            &format!("{base}/{{id}}"),
            get(show::<T>).put(update::<T>).delete(delete::<T>),
        )
}

/// List and show only, for journals written by other operations.
pub fn read_only_routes<T: Resource>() -> Router<Arc<AppState>> {
    let base = format!("/api/{}", T::TABLE);
    Router::new()
        .route(&base, get(list::<T>))
        .route(&format!("{base}/{{id}}"), get(show::<T>))
}
