// assistant.rs
// Conversational assistant: a business snapshot sent as context to a completion service.

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;
use serde::Serialize;
use serde_json::json;

use crate::funnel::{self, FunnelSummary};
use crate::models::{
    Appointment, Customer, Lead, PaymentSetting, Provider, Sale, Service, StockItem,
};
use crate::reports::{self, PeriodSummary};

pub const SYSTEM_INSTRUCTION: &str = "Você é a assistente de gestão do salão. Responda em português do Brasil, \
de forma objetiva, usando apenas os dados do contexto em JSON. Valores monetários em reais (R$). \
Se a informação não estiver no contexto, diga que não sabe.";

/// Swappable completion backend.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, system: &str, context: &str, question: &str) -> Result<String>;
}

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        GeminiClient {
            http: reqwest::Client::new(),
            api_key,
            model: model.into(),
            endpoint: GEMINI_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, system: &str, context: &str, question: &str) -> Result<String> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("GEMINI_API_KEY não configurada"))?;
        // The key travels in a header so it never shows up in a logged URL.
        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        let body = json!({
            "system_instruction": { "parts": [{ "text": system }] },
            "contents": [{
                "role": "user",
                "parts": [
                    { "text": format!("Contexto do negócio (JSON):\n{context}") },
                    { "text": question }
                ]
            }]
        });

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("gemini request failed")?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            bail!("gemini returned {status}: {text}");
        }
        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .context("gemini response not JSON")?;
        json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .context("gemini returned no text")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgendaEntry {
    pub time: String,
    pub client: String,
    pub service: String,
    pub professional: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LowStockEntry {
    pub name: String,
    pub quantity: i64,
    pub min_quantity: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BusinessSnapshot {
    pub today: NaiveDate,
    pub customers: usize,
    pub vip_customers: usize,
    pub active_professionals: Vec<String>,
    pub agenda_today: Vec<AgendaEntry>,
    pub low_stock: Vec<LowStockEntry>,
    pub funnel: FunnelSummary,
    pub current_period: PeriodSummary,
}

pub struct SnapshotSource<'a> {
    pub today: NaiveDate,
    pub period: (NaiveDate, NaiveDate),
    pub appointments: &'a [Appointment],
    pub customers: &'a [Customer],
    pub services: &'a [Service],
    pub providers: &'a [Provider],
    pub stock: &'a [StockItem],
    pub leads: &'a [Lead],
    pub sales: &'a [Sale],
    pub payment_settings: &'a [PaymentSetting],
}

fn name_of(id: Option<ObjectId>, names: &[(Option<ObjectId>, &str)]) -> String {
    names
        .iter()
        .find(|(n_id, _)| id.is_some() && *n_id == id)
        .map(|(_, n)| n.to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn build_snapshot(src: &SnapshotSource<'_>) -> BusinessSnapshot {
    let customer_names: Vec<_> = src
        .customers
        .iter()
        .map(|c| (c.id, c.name.as_str()))
        .collect();
    let service_names: Vec<_> = src.services.iter().map(|s| (s.id, s.name.as_str())).collect();
    let provider_names: Vec<_> = src
        .providers
        .iter()
        .map(|p| (p.id, p.name.as_str()))
        .collect();

    let agenda_today = crate::agenda::day_agenda(src.appointments, src.today)
        .into_iter()
        .map(|a| AgendaEntry {
            time: a.time.clone(),
            client: name_of(a.customer_id, &customer_names),
            service: name_of(a.service_id, &service_names),
            professional: name_of(a.provider_id, &provider_names),
            status: a.status.label().to_string(),
        })
        .collect();

    let low_stock = crate::inventory::low_stock(src.stock)
        .into_iter()
        .map(|i| LowStockEntry {
            name: i.name,
            quantity: i.quantity,
            min_quantity: i.min_quantity,
        })
        .collect();

    BusinessSnapshot {
        today: src.today,
        customers: src.customers.len(),
        vip_customers: src.customers.iter().filter(|c| c.is_vip).count(),
        active_professionals: src
            .providers
            .iter()
            .filter(|p| p.active)
            .map(|p| p.name.clone())
            .collect(),
        agenda_today,
        low_stock,
        funnel: funnel::summarize(src.leads),
        current_period: reports::summarize(
            src.period.0,
            src.period.1,
            src.appointments,
            src.sales,
            src.services,
            src.payment_settings,
        ),
    }
}

pub async fn ask(
    client: &dyn CompletionClient,
    snapshot: &BusinessSnapshot,
    question: &str,
) -> Result<String> {
    let context = serde_json::to_string(snapshot)?;
    client
        .complete(SYSTEM_INSTRUCTION, &context, question.trim())
        .await
}
