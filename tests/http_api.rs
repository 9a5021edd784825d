#[path = "common/mod.rs"]
mod common;

use axum::http::StatusCode;
use chrono::NaiveDate;
use serde_json::{Value, json};

use aminna::agenda::BookingRequest;
use aminna::build_app;
use aminna::models::{Customer, Provider};
use aminna::state::{create_appointment, create_session};
use aminna::store::Mutation;
use aminna::totp::build_totp;

const ADMIN: &str = "admin@aminna.com.br";
const STAFF: &str = "recepcao@aminna.com.br";

fn oid_hex(value: &Value) -> String {
    value["_id"]["$oid"].as_str().unwrap_or_default().to_string()
}

#[tokio::test]
async fn protected_routes_need_a_session() {
    let ctx = common::setup_state().await;
    if ctx.is_none() {
        return;
    }
    let ctx = ctx.unwrap();
    let app = build_app(ctx.shared());

    let (status, _) = common::send(app.clone(), "GET", "/", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = common::send(app.clone(), "GET", "/api/customers", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = common::send(
        app.clone(),
        "GET",
        "/api/session",
        Some("not-a-session"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Sign-up only bootstraps an empty database.
    let (status, _) = common::send(
        app,
        "POST",
        "/signup",
        None,
        Some(json!({ "email": "nova@aminna.com.br", "name": "Nova" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn login_checks_the_totp_code() {
    let ctx = common::setup_state().await;
    if ctx.is_none() {
        return;
    }
    let ctx = ctx.unwrap();
    let state = ctx.shared();
    let app = build_app(state.clone());

    let (status, _) = common::send(
        app.clone(),
        "POST",
        "/login",
        None,
        Some(json!({ "email": ADMIN, "code": "000000x" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let user = aminna::state::find_user(&state, ADMIN)
        .await
        .unwrap()
        .unwrap();
    let code = build_totp(&state.config.salon_name, &user.email, &user.secret)
        .unwrap()
        .generate_current()
        .unwrap();
    let (status, body) = common::send(
        app.clone(),
        "POST",
        "/login",
        None,
        Some(json!({ "email": ADMIN, "code": code })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "admin");

    let token = create_session(&state, STAFF).await.unwrap();
    let (status, body) = common::send(app.clone(), "GET", "/api/session", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], STAFF);
    assert_eq!(body["role"], "staff");
    assert!(body.get("secret").is_none());

    let (status, _) = common::send(app.clone(), "POST", "/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = common::send(app, "GET", "/api/session", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn customers_crud_round_trip() {
    let ctx = common::setup_state().await;
    if ctx.is_none() {
        return;
    }
    let ctx = ctx.unwrap();
    let state = ctx.shared();
    let app = build_app(state.clone());
    let token = create_session(&state, STAFF).await.unwrap();

    let (status, body) = common::send(
        app.clone(),
        "POST",
        "/api/customers",
        Some(&token),
        Some(json!({ "name": "  ", "phone": "11 98765-4321" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "nome é obrigatório");

    let (status, created) = common::send(
        app.clone(),
        "POST",
        "/api/customers",
        Some(&token),
        Some(json!({ "name": "Ana", "phone": "11 98765-4321", "is_vip": true })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = oid_hex(&created);
    assert!(!id.is_empty());

    let path = format!("/api/customers/{id}");
    let (status, shown) = common::send(app.clone(), "GET", &path, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shown["is_vip"], true);

    let (status, updated) = common::send(
        app.clone(),
        "PUT",
        &path,
        Some(&token),
        Some(json!({ "name": "Ana Souza", "phone": "11 98765-4321" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Ana Souza");
    assert_eq!(oid_hex(&updated), id);

    let (status, listed) =
        common::send(app.clone(), "GET", "/api/customers", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let (status, _) = common::send(app.clone(), "DELETE", &path, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = common::send(app.clone(), "GET", &path, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = common::send(app, "GET", "/api/customers/xyz", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn catalog_and_settlements_are_admin_only() {
    let ctx = common::setup_state().await;
    if ctx.is_none() {
        return;
    }
    let ctx = ctx.unwrap();
    let state = ctx.shared();
    let app = build_app(state.clone());
    let staff = create_session(&state, STAFF).await.unwrap();
    let admin = create_session(&state, ADMIN).await.unwrap();

    let provider = json!({ "name": "Bia", "commission_rate": 0.4 });
    let (status, _) = common::send(
        app.clone(),
        "POST",
        "/api/providers",
        Some(&staff),
        Some(provider.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = common::send(
        app.clone(),
        "POST",
        "/api/providers",
        Some(&admin),
        Some(json!({ "name": "Bia", "commission_rate": 1.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, created) = common::send(
        app.clone(),
        "POST",
        "/api/providers",
        Some(&admin),
        Some(provider),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let provider_id = oid_hex(&created);

    // Staff still reads the catalog.
    let (status, _) = common::send(app.clone(), "GET", "/api/providers", Some(&staff), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) =
        common::send(app.clone(), "GET", "/api/settlements", Some(&staff), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) =
        common::send(app.clone(), "GET", "/api/reports/summary", Some(&staff), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, list) = common::send(
        app.clone(),
        "GET",
        "/api/settlements?start=2024-03-01&end=2024-03-15",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([]));

    let (status, one) = common::send(
        app.clone(),
        "GET",
        &format!("/api/settlements/{provider_id}?start=2024-03-01&end=2024-03-15"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(one["provider_name"], "Bia");
    assert_eq!(one["count"], 0);
    assert_eq!(one["payout"], 0.0);
    assert_eq!(one["period_end"], "2024-03-15");

    let (status, _) = common::send(
        app,
        "GET",
        &format!("/api/settlements/{}", mongodb::bson::oid::ObjectId::new().to_hex()),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn reminder_link_targets_the_client_phone() {
    let ctx = common::setup_state().await;
    if ctx.is_none() {
        return;
    }
    let ctx = ctx.unwrap();
    let state = ctx.shared();
    let app = build_app(state.clone());
    let token = create_session(&state, STAFF).await.unwrap();

    let customer_id = state
        .customers
        .apply(Mutation::Create(Customer {
            id: None,
            name: "Ana".into(),
            phone: "(11) 98765-4321".into(),
            email: None,
            birth_date: None,
            is_vip: false,
            notes: None,
        }))
        .await
        .unwrap();
    let provider_id = state
        .providers
        .apply(Mutation::Create(Provider {
            id: None,
            name: "Bia".into(),
            phone: None,
            email: None,
            specialty: None,
            commission_rate: 0.5,
            active: true,
        }))
        .await
        .unwrap();
    let service = state.services.snapshot().into_iter().next().unwrap();

    let appointment = create_appointment(
        &state,
        BookingRequest {
            customer_id: Some(customer_id),
            service_id: service.id,
            provider_id: Some(provider_id),
            date: NaiveDate::from_ymd_opt(2024, 3, 15),
            time: "14:30".into(),
            booked_price: None,
            status: None,
            additional_services: vec![],
            notes: None,
        },
    )
    .await
    .unwrap();
    let id = appointment.id.unwrap().to_hex();

    let (status, link) = common::send(
        app.clone(),
        "GET",
        &format!("/api/appointments/{id}/reminder"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(link["phone"], "(11) 98765-4321");
    assert!(
        link["url"]
            .as_str()
            .unwrap()
            .starts_with("https://wa.me/5511987654321?text=")
    );
    assert!(link["text"].as_str().unwrap().contains("15/03/2024 às 14:30"));

    let (status, day) = common::send(
        app.clone(),
        "GET",
        "/api/agenda?date=2024-03-15",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(day.as_array().map(Vec::len), Some(1));

    // Booking over HTTP uses extended-JSON ids.
    let (status, booked) = common::send(
        app,
        "POST",
        "/api/appointments",
        Some(&token),
        Some(json!({
            "customer_id": { "$oid": customer_id.to_hex() },
            "service_id": { "$oid": service.id.unwrap().to_hex() },
            "provider_id": { "$oid": provider_id.to_hex() },
            "date": "2024-03-15",
            "time": "16:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booked["status"], "Pendente");
    assert_eq!(booked["commission_rate_snapshot"], 0.5);

    common::teardown(Some(ctx)).await;
}
