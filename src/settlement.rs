// settlement.rs
// Commission settlement: per-professional production and payout over a date range.

use std::collections::HashMap;

use chrono::{Datelike, Months, NaiveDate};
use mongodb::bson::oid::ObjectId;
use serde::Serialize;

use crate::models::{
    AdditionalService, Appointment, AppointmentStatus, CommissionSetting, Customer, Service,
};

pub const SERVICE_PLACEHOLDER: &str = "Serviço";
pub const CLIENT_PLACEHOLDER: &str = "Cliente";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SettlementLine {
    pub date: NaiveDate,
    pub time: String,
    pub service_name: String,
    pub client_name: String,
    pub payout: f64,
    pub base_value: f64,
    pub rate: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Settlement {
    pub provider_id: ObjectId,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub revenue: f64,
    pub payout: f64,
    pub effective_rate: f64,
    pub count: usize,
    pub lines: Vec<SettlementLine>,
}

/// Payment labels that mean "paid later" (debt/tab).
pub fn is_deferred_payment(method: Option<&str>) -> bool {
    method.is_some_and(|m| {
        let m = m.trim().to_lowercase();
        m.contains("fiado") || m.contains("dívida") || m.contains("divida") || m.contains("debt")
    })
}

/// Payment labels that mean complimentary.
pub fn is_courtesy_payment(method: Option<&str>) -> bool {
    method.is_some_and(|m| {
        let m = m.trim().to_lowercase();
        m.contains("cortesia") || m.contains("courtesy")
    })
}

/// Date used to place an appointment in a period: the payment date when it parses,
/// otherwise the scheduled date.
pub fn reference_date(appointment: &Appointment) -> NaiveDate {
    appointment
        .payment_date
        .as_deref()
        .and_then(parse_date_prefix)
        .unwrap_or(appointment.date)
}

/// Parses `YYYY-MM-DD`, ignoring anything after the date (time of day, offset).
pub fn parse_date_prefix(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let head = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

struct Catalog<'a> {
    services: HashMap<ObjectId, &'a Service>,
    customers: HashMap<ObjectId, &'a Customer>,
}

impl<'a> Catalog<'a> {
    fn new(services: &'a [Service], customers: &'a [Customer]) -> Self {
        Catalog {
            services: services.iter().filter_map(|s| Some((s.id?, s))).collect(),
            customers: customers.iter().filter_map(|c| Some((c.id?, c))).collect(),
        }
    }

    fn service(&self, id: Option<ObjectId>) -> Option<&'a Service> {
        id.and_then(|id| self.services.get(&id).copied())
    }

    fn customer(&self, id: Option<ObjectId>) -> Option<&'a Customer> {
        id.and_then(|id| self.customers.get(&id).copied())
    }

    fn service_name(&self, id: Option<ObjectId>) -> String {
        self.service(id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| SERVICE_PLACEHOLDER.to_string())
    }

    fn catalog_price(&self, id: Option<ObjectId>) -> f64 {
        self.service(id).map(|s| s.price).unwrap_or(0.0)
    }
}

/// Booked price when one was recorded, else the current catalog price.
pub fn booked_or_catalog(booked: Option<f64>, catalog_price: f64) -> f64 {
    match booked {
        Some(price) if price > 0.0 => price,
        _ => catalog_price,
    }
}

struct Accumulator {
    revenue: f64,
    payout: f64,
    lines: Vec<SettlementLine>,
}

impl Accumulator {
    fn push(
        &mut self,
        appointment: &Appointment,
        service_name: String,
        client_name: String,
        base: f64,
        rate: f64,
    ) {
        let payout = base * rate;
        self.revenue += base;
        self.payout += payout;
        self.lines.push(SettlementLine {
            date: reference_date(appointment),
            time: appointment.time.clone(),
            service_name,
            client_name,
            payout,
            base_value: base,
            rate,
        });
    }
}

/// Computes the settlement of one professional over `[period_start, period_end]`.
///
/// `appointments` must be the full candidate set: additional-service lines can pay a
/// professional other than the appointment's primary one. `default_rate` applies only
/// to lines without a commission-rate snapshot. Dangling references degrade to the
/// placeholder name and a zero catalog price.
pub fn compute_settlement(
    provider_id: &ObjectId,
    period_start: NaiveDate,
    period_end: NaiveDate,
    appointments: &[Appointment],
    services: &[Service],
    customers: &[Customer],
    default_rate: f64,
) -> Settlement {
    let catalog = Catalog::new(services, customers);
    let mut acc = Accumulator {
        revenue: 0.0,
        payout: 0.0,
        lines: Vec::new(),
    };

    for appointment in appointments {
        if appointment.status != AppointmentStatus::Completed {
            continue;
        }
        let day = reference_date(appointment);
        if day < period_start || day > period_end {
            continue;
        }

        let customer = catalog.customer(appointment.customer_id);
        let is_vip = customer.is_some_and(|c| c.is_vip);
        let client_name = customer
            .map(|c| c.name.clone())
            .unwrap_or_else(|| CLIENT_PLACEHOLDER.to_string());
        let method = appointment.payment_method.as_deref();
        let payment_override =
            is_deferred_payment(method) || is_courtesy_payment(method) || is_vip;

        if appointment.provider_id.as_ref() == Some(provider_id) {
            let base = primary_base_value(appointment, &catalog, payment_override);
            let rate = appointment.commission_rate_snapshot.unwrap_or(default_rate);
            acc.push(
                appointment,
                catalog.service_name(appointment.service_id),
                client_name.clone(),
                base,
                rate,
            );
        }

        for extra in &appointment.additional_services {
            if extra.provider_id.as_ref() != Some(provider_id) {
                continue;
            }
            let base = additional_base_value(extra, &catalog);
            let rate = extra.commission_rate_snapshot.unwrap_or(default_rate);
            let name = extra
                .client_name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| client_name.clone());
            acc.push(appointment, catalog.service_name(extra.service_id), name, base, rate);
        }
    }

    let effective_rate = if acc.revenue > 0.0 {
        acc.payout / acc.revenue
    } else {
        default_rate
    };

    Settlement {
        provider_id: *provider_id,
        period_start,
        period_end,
        revenue: acc.revenue,
        payout: acc.payout,
        effective_rate,
        count: acc.lines.len(),
        lines: acc.lines,
    }
}

fn primary_base_value(
    appointment: &Appointment,
    catalog: &Catalog<'_>,
    payment_override: bool,
) -> f64 {
    let standard = booked_or_catalog(
        appointment.booked_price,
        catalog.catalog_price(appointment.service_id),
    );
    // Legacy single-service records only carried the amount collected.
    let paid = appointment.price_paid.filter(|p| *p > 0.0);
    let base = match paid {
        Some(paid) if appointment.additional_services.is_empty() => paid,
        _ => standard,
    };
    if payment_override || base == 0.0 {
        standard
    } else {
        base
    }
}

// Additional lines carry no price paid, so the courtesy/debt/VIP/zero overrides all
// resolve to booked-or-catalog as well.
fn additional_base_value(extra: &AdditionalService, catalog: &Catalog<'_>) -> f64 {
    booked_or_catalog(extra.booked_price, catalog.catalog_price(extra.service_id))
}

/// The settlement fortnight containing `day`: `[1, cutoff]` or `[cutoff + 1, month end]`.
pub fn fortnight_containing(
    day: NaiveDate,
    setting: &CommissionSetting,
) -> (NaiveDate, NaiveDate) {
    let month_start = day.with_day(1).unwrap_or(day);
    let month_end = last_day_of_month(day);
    let cutoff = setting.cutoff_day.clamp(1, 27);
    let cutoff_date = month_start.with_day(cutoff).unwrap_or(month_end);
    if day <= cutoff_date {
        (month_start, cutoff_date)
    } else {
        (cutoff_date.succ_opt().unwrap_or(cutoff_date), month_end)
    }
}

pub fn last_day_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next| next.pred_opt())
        .unwrap_or(day)
}

/// Brazilian currency formatting: `R$ 1.234,56`.
pub fn format_brl(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let int_part = (cents / 100).to_string();
    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}R$ {grouped},{:02}", cents % 100)
}

pub fn format_rate(rate: f64) -> String {
    let pct = rate * 100.0;
    if (pct - pct.round()).abs() < 0.05 {
        format!("{:.0}%", pct)
    } else {
        format!("{:.1}%", pct).replace('.', ",")
    }
}

/// Plain-text summary sent to the professional.
pub fn summary_message(salon: &str, provider_name: &str, settlement: &Settlement) -> String {
    let mut text = format!(
        "Olá, {}! Segue o fechamento {} de {} a {}.\n",
        provider_name,
        salon,
        settlement.period_start.format("%d/%m/%Y"),
        settlement.period_end.format("%d/%m/%Y"),
    );
    text.push_str(&format!("Atendimentos: {}\n", settlement.count));
    text.push_str(&format!("Produção: {}\n", format_brl(settlement.revenue)));
    text.push_str(&format!(
        "Comissão ({}): {}",
        format_rate(settlement.effective_rate),
        format_brl(settlement.payout)
    ));
    text
}
