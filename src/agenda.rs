// agenda.rs
// Appointment booking and status lifecycle (check-in / check-out).

use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;

use crate::error::ValidationError;
use crate::models::{AdditionalService, Appointment, AppointmentStatus, Provider, Service};

#[derive(Debug, Clone, Deserialize)]
pub struct AdditionalServiceRequest {
    pub service_id: ObjectId,
    pub provider_id: ObjectId,
    #[serde(default)]
    pub booked_price: Option<f64>,
    #[serde(default)]
    pub is_courtesy: bool,
    #[serde(default)]
    pub client_name: Option<String>,
}

/// Booking form. Prices and commission rates are resolved and frozen by [`book`].
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    pub customer_id: Option<ObjectId>,
    pub service_id: Option<ObjectId>,
    pub provider_id: Option<ObjectId>,
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub booked_price: Option<f64>,
    #[serde(default)]
    pub status: Option<AppointmentStatus>,
    #[serde(default)]
    pub additional_services: Vec<AdditionalServiceRequest>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub payment_method: String,
    #[serde(default)]
    pub price_paid: Option<f64>,
    #[serde(default)]
    pub payment_date: Option<String>,
}

/// Builds the appointment to store, freezing the booked price (request value, else the
/// catalog price) and the provider's current commission rate on every line.
pub fn book(
    request: BookingRequest,
    services: &[Service],
    providers: &[Provider],
) -> Result<Appointment, ValidationError> {
    let customer_id = request.customer_id.ok_or(ValidationError::Required("cliente"))?;
    let service_id = request.service_id.ok_or(ValidationError::Required("serviço"))?;
    let provider_id = request
        .provider_id
        .ok_or(ValidationError::Required("profissional"))?;
    let date = request.date.ok_or(ValidationError::Required("data"))?;
    let time = request.time.trim().to_string();
    if time.is_empty() {
        return Err(ValidationError::Required("horário"));
    }
    validate_time(&time)?;

    let status = request.status.unwrap_or_default();
    if matches!(
        status,
        AppointmentStatus::InProgress | AppointmentStatus::Completed
    ) {
        return Err(ValidationError::Invalid(format!(
            "agendamentos novos não podem começar como {}",
            status.label()
        )));
    }

    let service = find_service(services, &service_id)?;
    let provider = find_provider(providers, &provider_id)?;

    let mut additional_services = Vec::with_capacity(request.additional_services.len());
    for extra in request.additional_services {
        let extra_service = find_service(services, &extra.service_id)?;
        let extra_provider = find_provider(providers, &extra.provider_id)?;
        additional_services.push(AdditionalService {
            service_id: Some(extra.service_id),
            provider_id: Some(extra.provider_id),
            booked_price: Some(resolve_price(extra.booked_price, extra_service)?),
            commission_rate_snapshot: Some(extra_provider.commission_rate),
            is_courtesy: extra.is_courtesy,
            client_name: extra.client_name.filter(|n| !n.trim().is_empty()),
        });
    }

    Ok(Appointment {
        id: None,
        customer_id: Some(customer_id),
        service_id: Some(service_id),
        provider_id: Some(provider_id),
        date,
        time,
        status,
        booked_price: Some(resolve_price(request.booked_price, service)?),
        price_paid: None,
        payment_method: None,
        payment_date: None,
        commission_rate_snapshot: Some(provider.commission_rate),
        additional_services,
        notes: request.notes.filter(|n| !n.trim().is_empty()),
    })
}

/// Whether a status may move to `to` through the regular lifecycle.
pub fn can_transition(from: AppointmentStatus, to: AppointmentStatus) -> bool {
    use AppointmentStatus::*;
    match (from, to) {
        (Completed, _) => false,
        (Cancelled, to) => to == Pending,
        (_, Cancelled) => true,
        (Pending, Confirmed) => true,
        (Pending | Confirmed, InProgress) => true,
        // Completed is reachable only through check_out, which records the payment.
        _ => false,
    }
}

pub fn transition(
    appointment: &mut Appointment,
    to: AppointmentStatus,
) -> Result<(), ValidationError> {
    if !can_transition(appointment.status, to) {
        return Err(ValidationError::Transition {
            from: appointment.status.label().to_string(),
            to: to.label().to_string(),
        });
    }
    appointment.status = to;
    Ok(())
}

/// Marks the appointment completed and records the payment.
pub fn check_out(
    appointment: &mut Appointment,
    request: CheckoutRequest,
) -> Result<(), ValidationError> {
    if !matches!(
        appointment.status,
        AppointmentStatus::Confirmed | AppointmentStatus::InProgress
    ) {
        return Err(ValidationError::Transition {
            from: appointment.status.label().to_string(),
            to: AppointmentStatus::Completed.label().to_string(),
        });
    }
    let method = request.payment_method.trim();
    if method.is_empty() {
        return Err(ValidationError::Required("forma de pagamento"));
    }
    if let Some(paid) = request.price_paid {
        if !paid.is_finite() || paid < 0.0 {
            return Err(ValidationError::Invalid(
                "valor pago não pode ser negativo".into(),
            ));
        }
    }
    let payment_date = request
        .payment_date
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    if let Some(raw) = &payment_date {
        if crate::settlement::parse_date_prefix(raw).is_none() {
            return Err(ValidationError::Invalid(format!(
                "data de pagamento inválida: {raw}"
            )));
        }
    }

    appointment.payment_method = Some(method.to_string());
    appointment.price_paid = request.price_paid;
    appointment.payment_date = payment_date;
    appointment.status = AppointmentStatus::Completed;
    Ok(())
}

/// Appointments of one day ordered by time.
pub fn day_agenda(appointments: &[Appointment], day: NaiveDate) -> Vec<Appointment> {
    let mut items: Vec<Appointment> = appointments
        .iter()
        .filter(|a| a.date == day)
        .cloned()
        .collect();
    items.sort_by(|a, b| a.time.cmp(&b.time));
    items
}

fn validate_time(time: &str) -> Result<(), ValidationError> {
    chrono::NaiveTime::parse_from_str(time, "%H:%M")
        .map(|_| ())
        .map_err(|_| ValidationError::Invalid(format!("horário inválido: {time} (use HH:MM)")))
}

fn resolve_price(requested: Option<f64>, service: &Service) -> Result<f64, ValidationError> {
    match requested {
        Some(price) if !price.is_finite() || price < 0.0 => Err(ValidationError::Invalid(
            "preço não pode ser negativo".into(),
        )),
        Some(price) => Ok(price),
        None => Ok(service.price),
    }
}

fn find_service<'a>(
    services: &'a [Service],
    id: &ObjectId,
) -> Result<&'a Service, ValidationError> {
    services
        .iter()
        .find(|s| s.id.as_ref() == Some(id))
        .ok_or_else(|| ValidationError::Invalid(format!("serviço {} não existe", id.to_hex())))
}

fn find_provider<'a>(
    providers: &'a [Provider],
    id: &ObjectId,
) -> Result<&'a Provider, ValidationError> {
    let provider = providers
        .iter()
        .find(|p| p.id.as_ref() == Some(id))
        .ok_or_else(|| ValidationError::Invalid(format!("profissional {} não existe", id.to_hex())))?;
    if !provider.active {
        return Err(ValidationError::Invalid(format!(
            "profissional {} está inativo",
            provider.name
        )));
    }
    Ok(provider)
}
