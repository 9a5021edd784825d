use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;

use crate::error::{AppError, AppResult};
use crate::models::Provider;
use crate::settlement::{Settlement, compute_settlement};

use super::AppState;

pub fn find_provider(state: &AppState, id: &ObjectId) -> AppResult<Provider> {
    state
        .providers
        .get(id)
        .ok_or_else(|| AppError::not_found(format!("profissional {}", id.to_hex())))
}

/// Settlement of one professional computed over the mirrored tables.
pub fn provider_settlement(
    state: &AppState,
    provider: &Provider,
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<Settlement> {
    let provider_id = provider
        .id
        .ok_or_else(|| AppError::invalid("profissional sem identificador"))?;
    if start > end {
        return Err(AppError::invalid("início do período após o fim"));
    }
    Ok(compute_settlement(
        &provider_id,
        start,
        end,
        &state.appointments.snapshot(),
        &state.services.snapshot(),
        &state.customers.snapshot(),
        provider.commission_rate,
    ))
}

/// Every active professional with production in the period, highest payout first.
pub fn all_settlements(
    state: &AppState,
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<Vec<(Provider, Settlement)>> {
    if start > end {
        return Err(AppError::invalid("início do período após o fim"));
    }
    let appointments = state.appointments.snapshot();
    let services = state.services.snapshot();
    let customers = state.customers.snapshot();
    let mut results: Vec<(Provider, Settlement)> = state
        .providers
        .snapshot()
        .into_iter()
        .filter(|p| p.active)
        .filter_map(|p| {
            let id = p.id?;
            let settlement = compute_settlement(
                &id,
                start,
                end,
                &appointments,
                &services,
                &customers,
                p.commission_rate,
            );
            (settlement.count > 0).then_some((p, settlement))
        })
        .collect();
    results.sort_by(|a, b| b.1.payout.total_cmp(&a.1.payout));
    Ok(results)
}
