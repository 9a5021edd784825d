// reports.rs
// Period financial summary over completed appointments and product sales.

use std::collections::HashMap;

use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;
use serde::Serialize;

use crate::models::{Appointment, AppointmentStatus, PaymentSetting, Sale, Service};
use crate::settlement::{
    SERVICE_PLACEHOLDER, booked_or_catalog, is_courtesy_payment, is_deferred_payment,
    reference_date,
};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MethodTotal {
    pub method: String,
    pub amount: f64,
    pub fee: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatusCount {
    pub status: AppointmentStatus,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ServiceTotal {
    pub service_name: String,
    pub count: usize,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PeriodSummary {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub service_revenue: f64,
    pub product_revenue: f64,
    pub total_revenue: f64,
    /// Deferred ("fiado") amounts still to be collected.
    pub receivables: f64,
    pub courtesy_count: usize,
    pub fees: f64,
    pub net_revenue: f64,
    pub by_payment_method: Vec<MethodTotal>,
    pub status_counts: Vec<StatusCount>,
    pub top_services: Vec<ServiceTotal>,
}

const TOP_SERVICES: usize = 5;

/// Amount collected for a completed appointment: price paid when recorded, else the
/// booked value of every line.
pub fn appointment_amount(
    appointment: &Appointment,
    services: &HashMap<ObjectId, &Service>,
) -> f64 {
    if let Some(paid) = appointment.price_paid.filter(|p| *p > 0.0) {
        return paid;
    }
    let price = |id: Option<ObjectId>| {
        id.and_then(|id| services.get(&id))
            .map(|s| s.price)
            .unwrap_or(0.0)
    };
    let primary = booked_or_catalog(appointment.booked_price, price(appointment.service_id));
    let extras: f64 = appointment
        .additional_services
        .iter()
        .filter(|e| !e.is_courtesy)
        .map(|e| booked_or_catalog(e.booked_price, price(e.service_id)))
        .sum();
    primary + extras
}

pub fn summarize(
    period_start: NaiveDate,
    period_end: NaiveDate,
    appointments: &[Appointment],
    sales: &[Sale],
    services: &[Service],
    payment_settings: &[PaymentSetting],
) -> PeriodSummary {
    let catalog: HashMap<ObjectId, &Service> =
        services.iter().filter_map(|s| Some((s.id?, s))).collect();
    let in_period = |day: NaiveDate| day >= period_start && day <= period_end;

    let mut service_revenue = 0.0;
    let mut receivables = 0.0;
    let mut courtesy_count = 0;
    let mut methods: Vec<(String, f64)> = Vec::new();
    let mut per_service: HashMap<String, (usize, f64)> = HashMap::new();

    let mut add_method = |method: &str, amount: f64| {
        let label = method.trim();
        match methods
            .iter_mut()
            .find(|(m, _)| m.eq_ignore_ascii_case(label))
        {
            Some((_, total)) => *total += amount,
            None => methods.push((label.to_string(), amount)),
        }
    };

    for appointment in appointments
        .iter()
        .filter(|a| a.status == AppointmentStatus::Completed && in_period(reference_date(a)))
    {
        let method = appointment.payment_method.as_deref();
        if is_courtesy_payment(method) {
            courtesy_count += 1;
            continue;
        }
        let amount = appointment_amount(appointment, &catalog);
        if is_deferred_payment(method) {
            receivables += amount;
        } else {
            service_revenue += amount;
            add_method(method.unwrap_or("Não informado"), amount);
        }

        let mut tally = |service_id: Option<ObjectId>, value: f64| {
            let name = service_id
                .and_then(|id| catalog.get(&id))
                .map(|s| s.name.clone())
                .unwrap_or_else(|| SERVICE_PLACEHOLDER.to_string());
            let entry = per_service.entry(name).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += value;
        };
        let catalog_price = |id: Option<ObjectId>| {
            id.and_then(|id| catalog.get(&id))
                .map(|s| s.price)
                .unwrap_or(0.0)
        };
        tally(
            appointment.service_id,
            booked_or_catalog(appointment.booked_price, catalog_price(appointment.service_id)),
        );
        for extra in appointment.additional_services.iter().filter(|e| !e.is_courtesy) {
            tally(
                extra.service_id,
                booked_or_catalog(extra.booked_price, catalog_price(extra.service_id)),
            );
        }
    }

    let mut product_revenue = 0.0;
    for sale in sales.iter().filter(|s| in_period(s.date)) {
        if is_deferred_payment(Some(&sale.payment_method)) {
            receivables += sale.total;
            continue;
        }
        product_revenue += sale.total;
        add_method(&sale.payment_method, sale.total);
    }

    let by_payment_method: Vec<MethodTotal> = methods
        .into_iter()
        .map(|(method, amount)| {
            let fee_rate = payment_settings
                .iter()
                .find(|p| p.method.trim().eq_ignore_ascii_case(&method))
                .map(|p| p.fee_rate)
                .unwrap_or(0.0);
            MethodTotal {
                fee: amount * fee_rate,
                method,
                amount,
            }
        })
        .collect();
    let fees: f64 = by_payment_method.iter().map(|m| m.fee).sum();
    let total_revenue = service_revenue + product_revenue;

    let status_counts = AppointmentStatus::ALL
        .iter()
        .map(|status| StatusCount {
            status: *status,
            count: appointments
                .iter()
                .filter(|a| a.status == *status && in_period(a.date))
                .count(),
        })
        .collect();

    let mut top_services: Vec<ServiceTotal> = per_service
        .into_iter()
        .map(|(service_name, (count, revenue))| ServiceTotal {
            service_name,
            count,
            revenue,
        })
        .collect();
    top_services.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then_with(|| a.service_name.cmp(&b.service_name))
    });
    top_services.truncate(TOP_SERVICES);

    PeriodSummary {
        period_start,
        period_end,
        service_revenue,
        product_revenue,
        total_revenue,
        receivables,
        courtesy_count,
        fees,
        net_revenue: total_revenue - fees,
        by_payment_method,
        status_counts,
        top_services,
    }
}
