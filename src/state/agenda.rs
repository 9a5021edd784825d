use mongodb::bson::oid::ObjectId;

use crate::agenda::{self, BookingRequest, CheckoutRequest};
use crate::error::{AppError, AppResult};
use crate::models::{Appointment, AppointmentStatus};
use crate::store::Mutation;

use super::AppState;

pub async fn create_appointment(state: &AppState, request: BookingRequest) -> AppResult<Appointment> {
    let customer = request
        .customer_id
        .and_then(|id| state.customers.get(&id));
    if request.customer_id.is_some() && customer.is_none() {
        return Err(AppError::invalid("cliente não existe"));
    }
    let mut appointment = agenda::book(
        request,
        &state.services.snapshot(),
        &state.providers.snapshot(),
    )?;
    let id = state
        .appointments
        .apply(Mutation::Create(appointment.clone()))
        .await?;
    appointment.id = Some(id);
    tracing::info!(id = %id.to_hex(), date = %appointment.date, time = %appointment.time, "appointment booked");
    Ok(appointment)
}

fn appointment(state: &AppState, id: &ObjectId) -> AppResult<Appointment> {
    state
        .appointments
        .get(id)
        .ok_or_else(|| AppError::not_found(format!("agendamento {}", id.to_hex())))
}

pub async fn set_appointment_status(
    state: &AppState,
    id: &ObjectId,
    status: AppointmentStatus,
) -> AppResult<Appointment> {
    let mut appointment = appointment(state, id)?;
    agenda::transition(&mut appointment, status)?;
    state
        .appointments
        .apply(Mutation::Update(*id, appointment.clone()))
        .await?;
    Ok(appointment)
}

pub async fn check_out_appointment(
    state: &AppState,
    id: &ObjectId,
    request: CheckoutRequest,
) -> AppResult<Appointment> {
    let mut appointment = appointment(state, id)?;
    agenda::check_out(&mut appointment, request)?;
    state
        .appointments
        .apply(Mutation::Update(*id, appointment.clone()))
        .await?;
    Ok(appointment)
}

/// Completed appointments are part of settlements and cannot be removed.
pub async fn delete_appointment(state: &AppState, id: &ObjectId) -> AppResult<()> {
    let appointment = appointment(state, id)?;
    if appointment.status == AppointmentStatus::Completed {
        return Err(AppError::invalid(
            "agendamentos concluídos não podem ser excluídos",
        ));
    }
    state.appointments.apply(Mutation::Delete(*id)).await?;
    Ok(())
}
