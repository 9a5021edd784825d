// funnel.rs
// Leads kanban: stage transitions, duplicate detection and conversion to customer.

use serde::Serialize;

use crate::error::ValidationError;
use crate::models::{Customer, Lead, LeadStage};

/// Digits only, without the Brazilian country code.
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.strip_prefix("55") {
        Some(rest) if digits.len() >= 12 => rest.to_string(),
        _ => digits,
    }
}

pub fn find_duplicate_phone<'a>(phone: &str, customers: &'a [Customer]) -> Option<&'a Customer> {
    let wanted = normalize_phone(phone);
    if wanted.is_empty() {
        return None;
    }
    customers
        .iter()
        .find(|c| normalize_phone(&c.phone) == wanted)
}

/// Validates a kanban move. Conversion has its own operation; converted leads are final.
pub fn move_lead(lead: &mut Lead, to: LeadStage) -> Result<(), ValidationError> {
    let invalid = || ValidationError::Transition {
        from: lead.stage.label().to_string(),
        to: to.label().to_string(),
    };
    if lead.stage == LeadStage::Converted || to == LeadStage::Converted {
        return Err(invalid());
    }
    lead.stage = to;
    Ok(())
}

/// Builds the customer for a lead and marks the lead converted.
///
/// The caller stores the customer and then records its id on the lead.
pub fn convert_lead(lead: &mut Lead, customers: &[Customer]) -> Result<Customer, ValidationError> {
    if lead.stage == LeadStage::Converted {
        return Err(ValidationError::Transition {
            from: lead.stage.label().to_string(),
            to: LeadStage::Converted.label().to_string(),
        });
    }
    let name = lead.name.trim();
    if name.is_empty() {
        return Err(ValidationError::Required("nome"));
    }
    let phone = normalize_phone(&lead.phone);
    if phone.is_empty() {
        return Err(ValidationError::Required("telefone"));
    }
    if find_duplicate_phone(&phone, customers).is_some() {
        return Err(ValidationError::DuplicatePhone(lead.phone.trim().to_string()));
    }

    lead.stage = LeadStage::Converted;
    Ok(Customer {
        id: None,
        name: name.to_string(),
        phone,
        email: lead.email.clone().filter(|e| !e.trim().is_empty()),
        birth_date: None,
        is_vip: false,
        notes: lead.notes.clone(),
    })
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StageCount {
    pub stage: LeadStage,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FunnelSummary {
    pub total: usize,
    pub stages: Vec<StageCount>,
    /// Converted leads over all leads; zero with no leads.
    pub conversion_rate: f64,
}

pub fn summarize(leads: &[Lead]) -> FunnelSummary {
    let stages: Vec<StageCount> = LeadStage::ALL
        .iter()
        .map(|stage| StageCount {
            stage: *stage,
            count: leads.iter().filter(|l| l.stage == *stage).count(),
        })
        .collect();
    let converted = leads
        .iter()
        .filter(|l| l.stage == LeadStage::Converted)
        .count();
    let conversion_rate = if leads.is_empty() {
        0.0
    } else {
        converted as f64 / leads.len() as f64
    };
    FunnelSummary {
        total: leads.len(),
        stages,
        conversion_rate,
    }
}
