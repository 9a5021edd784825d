// routes/mod.rs
// Route handlers grouped by feature, plus the helpers they share.

use askama::Template;
use axum::response::Html;
use chrono::{Local, NaiveDate};
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::CommissionSetting;
use crate::settlement::fortnight_containing;

pub mod agenda;
pub mod assistant;
pub mod campaigns;
pub mod crud;
pub mod home;
pub mod leads;
pub mod login;
pub mod logout;
pub mod reports;
pub mod sales;
pub mod settlements;
pub mod stock;
pub mod sync;
pub mod users;

pub use home::home;
pub use login::{login, signup};
pub use logout::logout;
pub use sync::sync;
pub use users::{current_session, users_create, users_delete, users_index, users_qrcode};

pub(crate) fn render<T: Template>(tpl: T) -> AppResult<Html<String>> {
    tpl.render()
        .map(Html)
        .map_err(|e| AppError::Remote(anyhow::Error::new(e).context("template render")))
}

pub(crate) fn parse_object_id(raw: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(raw.trim()).map_err(|_| AppError::invalid(format!("id inválido: {raw}")))
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `?start=&end=` bounds. Missing bounds fall back to the fortnight around the given
/// bound (or today).
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl PeriodQuery {
    pub fn resolve(&self, setting: &CommissionSetting) -> (NaiveDate, NaiveDate) {
        match (self.start, self.end) {
            (Some(start), Some(end)) => (start, end),
            (Some(day), None) | (None, Some(day)) => fortnight_containing(day, setting),
            (None, None) => fortnight_containing(today(), setting),
        }
    }
}
