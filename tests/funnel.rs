use mongodb::bson::oid::ObjectId;

use aminna::error::ValidationError;
use aminna::funnel::{convert_lead, find_duplicate_phone, move_lead, normalize_phone, summarize};
use aminna::models::{Customer, Lead, LeadStage};

fn lead(name: &str, phone: &str, stage: LeadStage) -> Lead {
    Lead {
        id: Some(ObjectId::new()),
        name: name.to_string(),
        phone: phone.to_string(),
        email: None,
        source: Some("Instagram".into()),
        interest: None,
        stage,
        notes: None,
        customer_id: None,
    }
}

fn customer(name: &str, phone: &str) -> Customer {
    Customer {
        id: Some(ObjectId::new()),
        name: name.to_string(),
        phone: phone.to_string(),
        email: None,
        birth_date: None,
        is_vip: false,
        notes: None,
    }
}

#[test]
fn phones_normalize_to_local_digits() {
    assert_eq!(normalize_phone("+55 (11) 98765-4321"), "11987654321");
    assert_eq!(normalize_phone("(11) 98765-4321"), "11987654321");
    assert_eq!(normalize_phone("5511"), "5511");
    assert_eq!(normalize_phone(""), "");
}

#[test]
fn duplicate_detection_ignores_formatting() {
    let customers = vec![customer("Ana", "11 98765 4321")];
    assert!(find_duplicate_phone("+55 11 98765-4321", &customers).is_some());
    assert!(find_duplicate_phone("11 91234-5678", &customers).is_none());
    assert!(find_duplicate_phone("", &customers).is_none());
}

#[test]
fn conversion_rejects_duplicate_phone() {
    let customers = vec![customer("Ana", "11987654321")];
    let mut l = lead("Ana Souza", "+55 11 98765-4321", LeadStage::Scheduled);
    let err = convert_lead(&mut l, &customers).unwrap_err();
    assert!(matches!(err, ValidationError::DuplicatePhone(_)));
    assert_eq!(l.stage, LeadStage::Scheduled);
}

#[test]
fn conversion_builds_customer_and_marks_lead() {
    let mut l = lead("  Beatriz ", "(21) 99999-0000", LeadStage::Contacted);
    l.email = Some("bia@example.com".into());
    let created = convert_lead(&mut l, &[]).unwrap();
    assert_eq!(created.name, "Beatriz");
    assert_eq!(created.phone, "21999990000");
    assert_eq!(created.email.as_deref(), Some("bia@example.com"));
    assert_eq!(l.stage, LeadStage::Converted);

    // Converted leads are final.
    assert!(convert_lead(&mut l, &[]).is_err());
    assert!(move_lead(&mut l, LeadStage::New).is_err());
}

#[test]
fn conversion_requires_a_phone() {
    let mut l = lead("Carla", " ", LeadStage::New);
    assert_eq!(
        convert_lead(&mut l, &[]).unwrap_err(),
        ValidationError::Required("telefone")
    );
}

#[test]
fn kanban_moves_cannot_set_converted() {
    let mut l = lead("Dani", "11911112222", LeadStage::New);
    move_lead(&mut l, LeadStage::Contacted).unwrap();
    move_lead(&mut l, LeadStage::Lost).unwrap();
    // Lost leads can be reopened.
    move_lead(&mut l, LeadStage::New).unwrap();
    assert!(matches!(
        move_lead(&mut l, LeadStage::Converted),
        Err(ValidationError::Transition { .. })
    ));
    assert_eq!(l.stage, LeadStage::New);
}

#[test]
fn summary_counts_every_stage() {
    let leads = vec![
        lead("A", "1", LeadStage::New),
        lead("B", "2", LeadStage::New),
        lead("C", "3", LeadStage::Converted),
        lead("D", "4", LeadStage::Lost),
    ];
    let summary = summarize(&leads);
    assert_eq!(summary.total, 4);
    assert_eq!(summary.stages.len(), 5);
    let new = summary
        .stages
        .iter()
        .find(|s| s.stage == LeadStage::New)
        .unwrap();
    assert_eq!(new.count, 2);
    assert_eq!(summary.conversion_rate, 0.25);

    assert_eq!(summarize(&[]).conversion_rate, 0.0);
}
