// routes/agenda.rs
// Appointments: booking, lifecycle, day agenda and WhatsApp reminders.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::agenda::{BookingRequest, CheckoutRequest, day_agenda};
use crate::error::{AppError, AppResult};
use crate::messaging::{reminder_message, whatsapp_link};
use crate::models::{Appointment, AppointmentStatus};
use crate::routes::{parse_object_id, today};
use crate::session::SessionUser;
use crate::settlement::{CLIENT_PLACEHOLDER, SERVICE_PLACEHOLDER};
use crate::state::{
    AppState, check_out_appointment, create_appointment, delete_appointment,
    set_appointment_status,
};

pub async fn appointments_index(
    State(st): State<Arc<AppState>>,
    _session: SessionUser,
) -> Json<Vec<Appointment>> {
    let mut items = st.appointments.snapshot();
    items.sort_by(|a, b| (a.date, &a.time).cmp(&(b.date, &b.time)));
    Json(items)
}

pub async fn appointments_create(
    State(st): State<Arc<AppState>>,
    _session: SessionUser,
    Json(body): Json<BookingRequest>,
) -> AppResult<(StatusCode, Json<Appointment>)> {
    let appointment = create_appointment(&st, body).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

pub async fn appointments_show(
    State(st): State<Arc<AppState>>,
    _session: SessionUser,
    Path(id): Path<String>,
) -> AppResult<Json<Appointment>> {
    let id = parse_object_id(&id)?;
    st.appointments
        .get(&id)
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("agendamento {}", id.to_hex())))
}

pub async fn appointments_delete(
    State(st): State<Arc<AppState>>,
    _session: SessionUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_object_id(&id)?;
    delete_appointment(&st, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct StatusForm {
    pub status: AppointmentStatus,
}

pub async fn appointments_status(
    State(st): State<Arc<AppState>>,
    _session: SessionUser,
    Path(id): Path<String>,
    Json(body): Json<StatusForm>,
) -> AppResult<Json<Appointment>> {
    let id = parse_object_id(&id)?;
    Ok(Json(set_appointment_status(&st, &id, body.status).await?))
}

pub async fn appointments_checkout(
    State(st): State<Arc<AppState>>,
    _session: SessionUser,
    Path(id): Path<String>,
    Json(body): Json<CheckoutRequest>,
) -> AppResult<Json<Appointment>> {
    let id = parse_object_id(&id)?;
    Ok(Json(check_out_appointment(&st, &id, body).await?))
}

#[derive(Deserialize)]
pub struct AgendaQuery {
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

pub async fn agenda_day(
    State(st): State<Arc<AppState>>,
    _session: SessionUser,
    Query(q): Query<AgendaQuery>,
) -> Json<Vec<Appointment>> {
    let day = q.date.unwrap_or_else(today);
    Json(day_agenda(&st.appointments.snapshot(), day))
}

#[derive(Serialize)]
pub struct MessageLink {
    pub phone: String,
    pub text: String,
    pub url: String,
}

pub async fn appointments_reminder(
    State(st): State<Arc<AppState>>,
    _session: SessionUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageLink>> {
    let id = parse_object_id(&id)?;
    let appointment = st
        .appointments
        .get(&id)
        .ok_or_else(|| AppError::not_found(format!("agendamento {}", id.to_hex())))?;
    let customer = appointment
        .customer_id
        .and_then(|cid| st.customers.get(&cid));
    let phone = customer
        .as_ref()
        .map(|c| c.phone.clone())
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::invalid("cliente sem telefone cadastrado"))?;
    let client_name = customer
        .as_ref()
        .map(|c| c.name.clone())
        .unwrap_or_else(|| CLIENT_PLACEHOLDER.to_string());
    let service_name = appointment
        .service_id
        .and_then(|sid| st.services.get(&sid))
        .map(|s| s.name)
        .unwrap_or_else(|| SERVICE_PLACEHOLDER.to_string());

    let text = reminder_message(
        &st.config.salon_name,
        &client_name,
        &service_name,
        appointment.date,
        &appointment.time,
    );
    Ok(Json(MessageLink {
        url: whatsapp_link(&phone, &text),
        phone,
        text,
    }))
}
