use mongodb::bson::oid::ObjectId;

use crate::error::{AppError, AppResult};
use crate::funnel;
use crate::models::{Customer, Lead, LeadStage};
use crate::store::Mutation;

use super::AppState;

fn lead(state: &AppState, id: &ObjectId) -> AppResult<Lead> {
    state
        .leads
        .get(id)
        .ok_or_else(|| AppError::not_found(format!("lead {}", id.to_hex())))
}

pub async fn move_lead(state: &AppState, id: &ObjectId, stage: LeadStage) -> AppResult<Lead> {
    let mut lead = lead(state, id)?;
    funnel::move_lead(&mut lead, stage)?;
    state.leads.apply(Mutation::Update(*id, lead.clone())).await?;
    Ok(lead)
}

/// Creates the customer, then links it on the lead. The customer is removed
/// again when the lead cannot be updated.
pub async fn convert_lead(state: &AppState, id: &ObjectId) -> AppResult<(Lead, Customer)> {
    let mut lead = lead(state, id)?;
    let mut customer = funnel::convert_lead(&mut lead, &state.customers.snapshot())?;
    let customer_id = state
        .customers
        .apply(Mutation::Create(customer.clone()))
        .await?;
    customer.id = Some(customer_id);
    lead.customer_id = Some(customer_id);
    if let Err(err) = state.leads.apply(Mutation::Update(*id, lead.clone())).await {
        if let Err(undo) = state.customers.apply(Mutation::Delete(customer_id)).await {
            tracing::error!(
                customer = %customer_id.to_hex(),
                error = ?undo,
                "could not roll back customer of failed conversion"
            );
        }
        return Err(err.into());
    }
    tracing::info!(lead = %id.to_hex(), customer = %customer_id.to_hex(), "lead converted");
    Ok((lead, customer))
}
