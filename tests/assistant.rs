use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;

use aminna::assistant::{
    CompletionClient, SYSTEM_INSTRUCTION, SnapshotSource, ask, build_snapshot,
};
use aminna::models::{
    Appointment, AppointmentStatus, Customer, Lead, LeadStage, Provider, Service, StockItem,
};

/// Records what it was asked and answers with a canned reply.
#[derive(Default)]
struct RecordingClient {
    calls: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl CompletionClient for RecordingClient {
    async fn complete(&self, system: &str, context: &str, question: &str) -> Result<String> {
        self.calls.lock().unwrap().push((
            system.to_string(),
            context.to_string(),
            question.to_string(),
        ));
        Ok("Hoje há 1 atendimento.".to_string())
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 12).unwrap()
}

struct Fixture {
    customers: Vec<Customer>,
    services: Vec<Service>,
    providers: Vec<Provider>,
    appointments: Vec<Appointment>,
    stock: Vec<StockItem>,
    leads: Vec<Lead>,
}

fn fixture() -> Fixture {
    let customer = Customer {
        id: Some(ObjectId::new()),
        name: "Ana Cliente".into(),
        phone: "11987654321".into(),
        email: None,
        birth_date: None,
        is_vip: true,
        notes: None,
    };
    let service = Service {
        id: Some(ObjectId::new()),
        name: "Manicure".into(),
        category: None,
        price: 50.0,
        duration_minutes: None,
        active: true,
    };
    let provider = Provider {
        id: Some(ObjectId::new()),
        name: "Bia".into(),
        phone: None,
        email: None,
        specialty: None,
        commission_rate: 0.5,
        active: true,
    };
    let appointment = Appointment {
        id: Some(ObjectId::new()),
        customer_id: customer.id,
        service_id: service.id,
        provider_id: provider.id,
        date: today(),
        time: "10:00".into(),
        status: AppointmentStatus::Confirmed,
        ..Default::default()
    };
    let stock = StockItem {
        id: Some(ObjectId::new()),
        name: "Acetona".into(),
        code: None,
        category: None,
        unit: None,
        quantity: 1,
        min_quantity: 3,
        cost_price: 8.0,
        sale_price: 15.0,
        supplier_id: None,
        active: true,
    };
    let lead = Lead {
        id: Some(ObjectId::new()),
        name: "Carla".into(),
        phone: "11911112222".into(),
        email: None,
        source: None,
        interest: None,
        stage: LeadStage::New,
        notes: None,
        customer_id: None,
    };
    Fixture {
        customers: vec![customer],
        services: vec![service],
        providers: vec![provider],
        appointments: vec![appointment],
        stock: vec![stock],
        leads: vec![lead],
    }
}

fn source(f: &Fixture) -> SnapshotSource<'_> {
    SnapshotSource {
        today: today(),
        period: (
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        ),
        appointments: &f.appointments,
        customers: &f.customers,
        services: &f.services,
        providers: &f.providers,
        stock: &f.stock,
        leads: &f.leads,
        sales: &[],
        payment_settings: &[],
    }
}

#[test]
fn snapshot_names_today_agenda_and_alerts() {
    let f = fixture();
    let snapshot = build_snapshot(&source(&f));

    assert_eq!(snapshot.customers, 1);
    assert_eq!(snapshot.vip_customers, 1);
    assert_eq!(snapshot.active_professionals, vec!["Bia"]);
    assert_eq!(snapshot.agenda_today.len(), 1);
    let entry = &snapshot.agenda_today[0];
    assert_eq!(entry.client, "Ana Cliente");
    assert_eq!(entry.service, "Manicure");
    assert_eq!(entry.professional, "Bia");
    assert_eq!(entry.status, "Confirmado");
    assert_eq!(snapshot.low_stock.len(), 1);
    assert_eq!(snapshot.funnel.total, 1);
    assert_eq!(snapshot.current_period.total_revenue, 0.0);
}

#[tokio::test]
async fn ask_sends_snapshot_as_context() {
    let f = fixture();
    let snapshot = build_snapshot(&source(&f));
    let client = RecordingClient::default();

    let answer = ask(&client, &snapshot, "  Quantos atendimentos hoje?  ")
        .await
        .unwrap();
    assert_eq!(answer, "Hoje há 1 atendimento.");

    let calls = client.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (system, context, question) = &calls[0];
    assert_eq!(system, SYSTEM_INSTRUCTION);
    assert_eq!(question, "Quantos atendimentos hoje?");
    let context: serde_json::Value = serde_json::from_str(context).unwrap();
    assert_eq!(context["today"], "2024-03-12");
    assert_eq!(context["agenda_today"][0]["professional"], "Bia");
    assert_eq!(context["low_stock"][0]["name"], "Acetona");
}

#[tokio::test]
async fn missing_api_key_fails_without_network() {
    let client = aminna::assistant::GeminiClient::new(None, "gemini-2.0-flash");
    let err = client.complete("s", "{}", "oi").await.unwrap_err();
    assert!(err.to_string().contains("GEMINI_API_KEY"));
}

#[tokio::test]
async fn failed_request_does_not_leak_the_api_key() {
    let client = aminna::assistant::GeminiClient::new(Some("SECRETKEY123".into()), "m")
        .with_endpoint("http://127.0.0.1:9/v1beta");
    let err = client.complete("s", "{}", "oi").await.unwrap_err();
    let rendered = aminna::error::AppError::Remote(err);
    assert!(rendered.to_string().contains("gemini request failed"));
    assert!(!rendered.to_string().contains("SECRETKEY123"));
    assert!(!format!("{rendered:?}").contains("SECRETKEY123"));
}
