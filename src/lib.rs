// lib.rs
// Salon back office: router wiring shared by the binary and the integration tests.
//
// Public:
// - GET  /                      -> login page
// - POST /login                 -> validates {"email","code"} against current TOTP
// - POST /signup                -> first administrator, only while no user exists
//
// Everything else requires a session cookie; see `build_app`.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

pub mod agenda;
pub mod assistant;
pub mod checkout;
pub mod config;
pub mod error;
pub mod funnel;
pub mod inventory;
pub mod messaging;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod reports;
pub mod routes;
pub mod session;
pub mod settlement;
pub mod state;
pub mod store;
pub mod totp;

use crate::models::{
    Campaign, CommissionSetting, Customer, ExpenseCategory, Lead, PantryItem, PantryLog, Partner,
    PaymentSetting, Provider, Sale, Service, StockItem, Supplier, UsageLog,
};
use crate::routes::crud;
use crate::state::AppState;

pub fn build_app(state: Arc<AppState>) -> Router {
    let tables = Router::new()
        .merge(crud::routes::<Customer>())
        .merge(crud::routes::<Service>())
        .merge(crud::routes::<Provider>())
        .merge(crud::routes::<StockItem>())
        .merge(crud::routes::<Lead>())
        .merge(crud::routes::<Partner>())
        .merge(crud::routes::<Campaign>())
        .merge(crud::routes::<PantryItem>())
        .merge(crud::routes::<CommissionSetting>())
        .merge(crud::routes::<PaymentSetting>())
        .merge(crud::routes::<ExpenseCategory>())
        .merge(crud::routes::<Supplier>())
        .merge(crud::read_only_routes::<UsageLog>())
        .merge(crud::read_only_routes::<PantryLog>());

    let protected = Router::new()
        .route("/logout", post(routes::logout))
        .route("/api/session", get(routes::current_session))
        .route(
            "/api/users",
            get(routes::users_index).post(routes::users_create),
        )
        .route("/api/users/{id}", delete(routes::users_delete))
        .route("/api/users/{id}/qrcode", get(routes::users_qrcode))
        .route("/api/sync", post(routes::sync))
        .route(
            "/api/appointments",
            get(routes::agenda::appointments_index).post(routes::agenda::appointments_create),
        )
        .route(
            "/api/appointments/{id}",
            get(routes::agenda::appointments_show).delete(routes::agenda::appointments_delete),
        )
        .route(
            "/api/appointments/{id}/status",
            post(routes::agenda::appointments_status),
        )
        .route(
            "/api/appointments/{id}/checkout",
            post(routes::agenda::appointments_checkout),
        )
        .route(
            "/api/appointments/{id}/reminder",
            get(routes::agenda::appointments_reminder),
        )
        .route("/api/agenda", get(routes::agenda::agenda_day))
        .route("/api/leads/summary", get(routes::leads::leads_summary))
        .route("/api/leads/{id}/stage", post(routes::leads::leads_stage))
        .route("/api/leads/{id}/convert", post(routes::leads::leads_convert))
        .route("/api/stock/low", get(routes::stock::stock_low))
        .route("/api/stock/scan", post(routes::stock::stock_scan))
        .route("/api/stock/{id}/movement", post(routes::stock::stock_move))
        .route("/api/stock/{id}/count", post(routes::stock::stock_recount))
        .route("/api/pantry/low", get(routes::stock::pantry_low))
        .route("/api/pantry/{id}/movement", post(routes::stock::pantry_move))
        .route(
            "/api/sales",
            get(crud::list::<Sale>).post(routes::sales::sales_create),
        )
        .route("/api/sales/{id}", get(crud::show::<Sale>))
        .route(
            "/api/campaigns/{id}/messages",
            get(routes::campaigns::campaigns_messages),
        )
        .route(
            "/api/settlements",
            get(routes::settlements::settlements_index),
        )
        .route(
            "/api/settlements/{id}",
            get(routes::settlements::settlements_show),
        )
        .route(
            "/api/settlements/{id}/message",
            get(routes::settlements::settlements_message),
        )
        .route(
            "/settlements/{id}/receipt",
            get(routes::settlements::settlements_receipt),
        )
        .route(
            "/settlements/{id}/receipt.pdf",
            get(routes::settlements::settlements_pdf),
        )
        .route("/api/reports/summary", get(routes::reports::reports_summary))
        .route("/api/assistant", post(routes::assistant::assistant_ask))
        .merge(tables)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_session,
        ));

    Router::new()
        .route("/", get(routes::home))
        .route("/login", post(routes::login))
        .route("/signup", post(routes::signup))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
