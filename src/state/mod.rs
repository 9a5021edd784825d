// state module: AppState, initialization, and re-exports of submodules.

use std::sync::Arc;

use anyhow::{Context, Result};
use mongodb::{Client, Collection, Database};

use crate::assistant::{CompletionClient, GeminiClient};
use crate::config::AppConfig;
use crate::models::{
    Appointment, Campaign, CommissionSetting, Customer, ExpenseCategory, Lead, PantryItem,
    PantryLog, Partner, PaymentSetting, Provider, Sale, Service, Session, StockItem, Supplier,
    UsageLog, User,
};
use crate::store::{Record, Table};

mod agenda;
mod inventory;
mod leads;
mod sales;
mod seed;
mod settlements;
mod users;

pub use agenda::*;
pub use inventory::*;
pub use leads::*;
pub use sales::*;
pub use settlements::*;
pub use users::*;

pub const SESSION_TTL_SECONDS: u64 = 60 * 60 * 24; // 1 day

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub users: Collection<User>,
    pub sessions: Collection<Session>,
    pub customers: Table<Customer>,
    pub appointments: Table<Appointment>,
    pub services: Table<Service>,
    pub providers: Table<Provider>,
    pub stock_items: Table<StockItem>,
    pub usage_logs: Table<UsageLog>,
    pub leads: Table<Lead>,
    pub sales: Table<Sale>,
    pub partners: Table<Partner>,
    pub campaigns: Table<Campaign>,
    pub pantry_items: Table<PantryItem>,
    pub pantry_logs: Table<PantryLog>,
    pub commission_settings: Table<CommissionSetting>,
    pub payment_settings: Table<PaymentSetting>,
    pub expense_categories: Table<ExpenseCategory>,
    pub suppliers: Table<Supplier>,
    pub assistant: Arc<dyn CompletionClient>,
}

fn table<T: Record>(db: &Database) -> Table<T> {
    Table::new(db.collection::<T>(T::TABLE))
}

pub async fn init_state(config: &AppConfig) -> Result<AppState> {
    let client = Client::with_uri_str(&config.mongodb_uri)
        .await
        .context("connect to MongoDB")?;
    let db = client.database(&config.mongodb_db);

    seed::ensure_collections(&db).await?;

    // Only seed when the database is effectively empty (no users).
    if seed::is_database_empty(&db).await? {
        tracing::info!(db = %config.mongodb_db, "empty database, seeding defaults");
        let default_users = seed::load_default_users(&config.users_file)?;
        seed::seed_default_users(&db, &default_users).await?;
        seed::seed_services(&db, &config.services_file).await?;
        seed::seed_payment_settings(&db).await?;
        seed::seed_commission_setting(&db).await?;
    }

    let state = AppState {
        config: config.clone(),
        users: db.collection::<User>("users"),
        sessions: db.collection::<Session>("sessions"),
        customers: table(&db),
        appointments: table(&db),
        services: table(&db),
        providers: table(&db),
        stock_items: table(&db),
        usage_logs: table(&db),
        leads: table(&db),
        sales: table(&db),
        partners: table(&db),
        campaigns: table(&db),
        pantry_items: table(&db),
        pantry_logs: table(&db),
        commission_settings: table(&db),
        payment_settings: table(&db),
        expense_categories: table(&db),
        suppliers: table(&db),
        assistant: Arc::new(GeminiClient::new(
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
        )),
    };

    let loaded = load_all(&state).await?;
    tracing::info!(
        tables = loaded.len(),
        rows = loaded.iter().map(|(_, n)| n).sum::<usize>(),
        "mirrors loaded"
    );
    Ok(state)
}

/// Reloads every mirror from MongoDB. Returns `(table, rows)` per table.
pub async fn load_all(state: &AppState) -> Result<Vec<(&'static str, usize)>> {
    Ok(vec![
        (state.customers.name(), state.customers.load().await?),
        (state.appointments.name(), state.appointments.load().await?),
        (state.services.name(), state.services.load().await?),
        (state.providers.name(), state.providers.load().await?),
        (state.stock_items.name(), state.stock_items.load().await?),
        (state.usage_logs.name(), state.usage_logs.load().await?),
        (state.leads.name(), state.leads.load().await?),
        (state.sales.name(), state.sales.load().await?),
        (state.partners.name(), state.partners.load().await?),
        (state.campaigns.name(), state.campaigns.load().await?),
        (state.pantry_items.name(), state.pantry_items.load().await?),
        (state.pantry_logs.name(), state.pantry_logs.load().await?),
        (
            state.commission_settings.name(),
            state.commission_settings.load().await?,
        ),
        (
            state.payment_settings.name(),
            state.payment_settings.load().await?,
        ),
        (
            state.expense_categories.name(),
            state.expense_categories.load().await?,
        ),
        (state.suppliers.name(), state.suppliers.load().await?),
    ])
}

/// The active commission schedule; the first stored row wins.
pub fn commission_setting(state: &AppState) -> CommissionSetting {
    state
        .commission_settings
        .snapshot()
        .into_iter()
        .next()
        .unwrap_or_default()
}
