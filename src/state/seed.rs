use anyhow::{Context, Result};
use mongodb::{
    Collection, Database,
    bson::{DateTime, doc},
};
use serde::de::DeserializeOwned;
use std::fs;

use crate::models::{
    Appointment, Campaign, CommissionSetting, Customer, ExpenseCategory, Lead, PantryItem,
    PantryLog, Partner, PaymentSetting, Provider, Sale, Service, SeedUser, StockItem, Supplier,
    UsageLog, User,
};
use crate::store::Record;

pub(super) async fn is_database_empty(db: &Database) -> Result<bool> {
    let users_coll = db.collection::<User>("users");
    let count = users_coll.estimated_document_count().await?;
    Ok(count == 0)
}

/// Seed users; a missing file seeds nobody and leaves sign-up open.
pub(super) fn load_default_users(path: &str) -> Result<Vec<SeedUser>> {
    load_json_array(path)
}

pub(super) fn load_json_array<T: DeserializeOwned>(path: &str) -> Result<Vec<T>> {
    match fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str::<Vec<T>>(&contents)
            .with_context(|| format!("parse seed file {path}")),
        Err(err) => {
            tracing::warn!(path, error = %err, "seed file not readable, skipping");
            Ok(Vec::new())
        }
    }
}

async fn ensure_collection(db: &Database, existing: &[String], name: &str) -> Result<()> {
    if !existing.iter().any(|n| n == name) {
        db.create_collection(name).await?;
    }
    Ok(())
}

pub(super) async fn ensure_collections(db: &Database) -> Result<()> {
    let existing = db.list_collection_names().await?;
    for name in [
        "users",
        "sessions",
        Customer::TABLE,
        Appointment::TABLE,
        Service::TABLE,
        Provider::TABLE,
        StockItem::TABLE,
        UsageLog::TABLE,
        Lead::TABLE,
        Sale::TABLE,
        Partner::TABLE,
        Campaign::TABLE,
        PantryItem::TABLE,
        PantryLog::TABLE,
        CommissionSetting::TABLE,
        PaymentSetting::TABLE,
        ExpenseCategory::TABLE,
        Supplier::TABLE,
    ] {
        ensure_collection(db, &existing, name).await?;
    }
    Ok(())
}

pub(super) async fn seed_default_users(db: &Database, users: &[SeedUser]) -> Result<()> {
    let users_coll = db.collection::<User>("users");
    for user in users {
        // Upsert user
        let res = users_coll
            .update_one(
                doc! { "email": &user.email },
                doc! {
                    "$set": {
                        "email": &user.email,
                        "name": &user.name,
                        "secret": &user.secret,
                        "role": user.role.as_str(),
                    }
                },
            )
            .await?;
        if res.matched_count == 0 {
            users_coll
                .insert_one(User {
                    id: None,
                    email: user.email.clone(),
                    name: user.name.clone(),
                    secret: user.secret.clone(),
                    role: user.role.clone(),
                    provider_id: None,
                    created_at: Some(DateTime::now()),
                })
                .await?;
        }
    }
    tracing::info!(count = users.len(), "seeded users");
    Ok(())
}

async fn is_collection_empty<T: Send + Sync>(coll: &Collection<T>) -> Result<bool> {
    Ok(coll.estimated_document_count().await? == 0)
}

pub(super) async fn seed_services(db: &Database, path: &str) -> Result<()> {
    let coll = db.collection::<Service>(Service::TABLE);
    if !is_collection_empty(&coll).await? {
        return Ok(());
    }
    let services: Vec<Service> = load_json_array(path)?;
    if services.is_empty() {
        return Ok(());
    }
    let count = services.len();
    coll.insert_many(services.into_iter().map(|mut s| {
        s.id = None;
        s
    }))
    .await
    .context("seed services")?;
    tracing::info!(count, "seeded service catalog");
    Ok(())
}

pub(super) fn default_payment_settings() -> Vec<PaymentSetting> {
    [
        ("Dinheiro", 0.0, 0),
        ("Pix", 0.0, 0),
        ("Cartão de Débito", 0.0199, 1),
        ("Cartão de Crédito", 0.0399, 30),
        ("Fiado", 0.0, 0),
        ("Cortesia", 0.0, 0),
    ]
    .into_iter()
    .map(|(method, fee_rate, receive_in_days)| PaymentSetting {
        id: None,
        method: method.to_string(),
        fee_rate,
        receive_in_days,
        active: true,
    })
    .collect()
}

pub(super) async fn seed_payment_settings(db: &Database) -> Result<()> {
    let coll = db.collection::<PaymentSetting>(PaymentSetting::TABLE);
    if is_collection_empty(&coll).await? {
        coll.insert_many(default_payment_settings())
            .await
            .context("seed payment settings")?;
    }
    Ok(())
}

pub(super) async fn seed_commission_setting(db: &Database) -> Result<()> {
    let coll = db.collection::<CommissionSetting>(CommissionSetting::TABLE);
    if is_collection_empty(&coll).await? {
        coll.insert_one(CommissionSetting::default())
            .await
            .context("seed commission setting")?;
    }
    Ok(())
}
