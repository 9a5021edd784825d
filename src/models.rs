// models.rs
// Typed records for every MongoDB collection. Field names are the snake_case wire names.

use chrono::NaiveDate;
use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::store::Record;

/// User roles for authorization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Staff,
}

impl UserRole {
    pub fn default_staff() -> Self {
        UserRole::Staff
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Staff => "staff",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Staff
    }
}

/// User definition as stored in users.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub secret: String,
    #[serde(default = "UserRole::default_staff")]
    pub role: UserRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub name: String,
    pub secret: String,
    pub role: UserRole,
    #[serde(default)]
    pub provider_id: Option<ObjectId>,
    #[serde(default)]
    pub created_at: Option<DateTime>,
}

/// Session document linking a token to a user and expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub token: String,
    pub user_email: String,
    pub expires_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_vip: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default = "default_true")]
    pub active: bool,
}

/// A professional who performs services and earns commission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Provider {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
    /// Fraction, 0.5 means 50%.
    #[serde(default)]
    pub commission_rate: f64,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AppointmentStatus {
    #[serde(rename = "Pendente", alias = "Pending")]
    Pending,
    #[serde(rename = "Confirmado", alias = "Confirmed")]
    Confirmed,
    #[serde(rename = "Em Atendimento", alias = "InProgress")]
    InProgress,
    #[serde(rename = "Concluído", alias = "Completed")]
    Completed,
    #[serde(rename = "Cancelado", alias = "Cancelled")]
    Cancelled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 5] = [
        AppointmentStatus::Pending,
        AppointmentStatus::Confirmed,
        AppointmentStatus::InProgress,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "Pendente",
            AppointmentStatus::Confirmed => "Confirmado",
            AppointmentStatus::InProgress => "Em Atendimento",
            AppointmentStatus::Completed => "Concluído",
            AppointmentStatus::Cancelled => "Cancelado",
        }
    }
}

impl Default for AppointmentStatus {
    fn default() -> Self {
        AppointmentStatus::Pending
    }
}

/// Secondary service on an appointment, possibly performed by another professional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AdditionalService {
    pub service_id: Option<ObjectId>,
    pub provider_id: Option<ObjectId>,
    #[serde(default)]
    pub booked_price: Option<f64>,
    #[serde(default)]
    pub commission_rate_snapshot: Option<f64>,
    #[serde(default)]
    pub is_courtesy: bool,
    #[serde(default)]
    pub client_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Appointment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub customer_id: Option<ObjectId>,
    pub service_id: Option<ObjectId>,
    pub provider_id: Option<ObjectId>,
    pub date: NaiveDate,
    pub time: String,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub booked_price: Option<f64>,
    #[serde(default)]
    pub price_paid: Option<f64>,
    #[serde(default)]
    pub payment_method: Option<String>,
    /// Raw payment timestamp; only its date part matters.
    #[serde(default)]
    pub payment_date: Option<String>,
    #[serde(default)]
    pub commission_rate_snapshot: Option<f64>,
    #[serde(default)]
    pub additional_services: Vec<AdditionalService>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MovementKind {
    #[serde(rename = "entrada")]
    Entry,
    #[serde(rename = "saida")]
    Exit,
    #[serde(rename = "ajuste")]
    Adjustment,
    #[serde(rename = "venda")]
    Sale,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Entry => "entrada",
            MovementKind::Exit => "saida",
            MovementKind::Adjustment => "ajuste",
            MovementKind::Sale => "venda",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockItem {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub min_quantity: i64,
    #[serde(default)]
    pub cost_price: f64,
    #[serde(default)]
    pub sale_price: f64,
    #[serde(default)]
    pub supplier_id: Option<ObjectId>,
    #[serde(default = "default_true")]
    pub active: bool,
}

/// Journal entry for every stock quantity change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UsageLog {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub stock_item_id: ObjectId,
    #[serde(default)]
    pub provider_id: Option<ObjectId>,
    pub kind: MovementKind,
    pub quantity: i64,
    pub previous_quantity: i64,
    pub resulting_quantity: i64,
    #[serde(default)]
    pub note: Option<String>,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum LeadStage {
    #[serde(rename = "Novo")]
    New,
    #[serde(rename = "Contato")]
    Contacted,
    #[serde(rename = "Agendado")]
    Scheduled,
    #[serde(rename = "Convertido")]
    Converted,
    #[serde(rename = "Perdido")]
    Lost,
}

impl LeadStage {
    pub const ALL: [LeadStage; 5] = [
        LeadStage::New,
        LeadStage::Contacted,
        LeadStage::Scheduled,
        LeadStage::Converted,
        LeadStage::Lost,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            LeadStage::New => "Novo",
            LeadStage::Contacted => "Contato",
            LeadStage::Scheduled => "Agendado",
            LeadStage::Converted => "Convertido",
            LeadStage::Lost => "Perdido",
        }
    }
}

impl Default for LeadStage {
    fn default() -> Self {
        LeadStage::New
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lead {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub interest: Option<String>,
    #[serde(default)]
    pub stage: LeadStage,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub customer_id: Option<ObjectId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaleItem {
    pub stock_item_id: ObjectId,
    #[serde(default)]
    pub name: String,
    pub quantity: i64,
    pub unit_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sale {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default)]
    pub customer_id: Option<ObjectId>,
    #[serde(default)]
    pub provider_id: Option<ObjectId>,
    pub items: Vec<SaleItem>,
    #[serde(default)]
    pub discount: f64,
    pub total: f64,
    pub payment_method: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Partner {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Discount granted to the partner's referrals, as a fraction.
    #[serde(default)]
    pub discount_rate: f64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CampaignStatus {
    #[serde(rename = "rascunho")]
    Draft,
    #[serde(rename = "ativa")]
    Active,
    #[serde(rename = "encerrada")]
    Closed,
}

impl Default for CampaignStatus {
    fn default() -> Self {
        CampaignStatus::Draft
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Campaign {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: CampaignStatus,
    #[serde(default)]
    pub starts_on: Option<NaiveDate>,
    #[serde(default)]
    pub ends_on: Option<NaiveDate>,
    #[serde(default)]
    pub partner_id: Option<ObjectId>,
}

/// Consumables for the client lounge (coffee, water, snacks).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PantryItem {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub min_quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PantryLog {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub pantry_item_id: ObjectId,
    pub kind: MovementKind,
    pub quantity: i64,
    pub resulting_quantity: i64,
    #[serde(default)]
    pub responsible: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    pub date: NaiveDate,
}

/// Settlement schedule: fortnights split after `cutoff_day`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommissionSetting {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default = "default_cutoff_day")]
    pub cutoff_day: u32,
    #[serde(default)]
    pub payment_delay_days: u32,
}

impl Default for CommissionSetting {
    fn default() -> Self {
        CommissionSetting {
            id: None,
            cutoff_day: default_cutoff_day(),
            payment_delay_days: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentSetting {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub method: String,
    /// Card machine fee, as a fraction of the amount.
    #[serde(default)]
    pub fee_rate: f64,
    #[serde(default)]
    pub receive_in_days: u32,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExpenseKind {
    #[serde(rename = "fixa")]
    Fixed,
    #[serde(rename = "variavel")]
    Variable,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpenseCategory {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub kind: ExpenseKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Supplier {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_cutoff_day() -> u32 {
    15
}

macro_rules! impl_record {
    ($($ty:ty => $table:literal),+ $(,)?) => {
        $(
            impl Record for $ty {
                const TABLE: &'static str = $table;

                fn id(&self) -> Option<ObjectId> {
                    self.id
                }

                fn set_id(&mut self, id: ObjectId) {
                    self.id = Some(id);
                }
            }
        )+
    };
}

impl_record! {
    Customer => "customers",
    Appointment => "appointments",
    Service => "services",
    Provider => "providers",
    StockItem => "stock_items",
    Lead => "leads",
    Sale => "sales",
    Partner => "partners",
    Campaign => "campaigns",
    PantryItem => "pantry_items",
    PantryLog => "pantry_logs",
    CommissionSetting => "commission_settings",
    PaymentSetting => "payment_settings",
    ExpenseCategory => "expense_categories",
    Supplier => "suppliers",
    UsageLog => "usage_logs",
}
