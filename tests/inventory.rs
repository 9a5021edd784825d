use mongodb::bson::oid::ObjectId;

use aminna::error::ValidationError;
use aminna::inventory::{
    Direction, apply_movement, low_pantry, low_stock, reconcile_count, stock_value,
    validate_quantity,
};
use aminna::models::{MovementKind, PantryItem, StockItem};

fn item(name: &str, quantity: i64, min_quantity: i64) -> StockItem {
    StockItem {
        id: Some(ObjectId::new()),
        name: name.to_string(),
        code: None,
        category: None,
        unit: None,
        quantity,
        min_quantity,
        cost_price: 10.0,
        sale_price: 25.0,
        supplier_id: None,
        active: true,
    }
}

#[test]
fn repeated_exits_never_go_below_zero() {
    let mut quantity = 5;
    for _ in 0..4 {
        quantity = apply_movement(quantity, Direction::Out, 2);
        assert!(quantity >= 0);
    }
    assert_eq!(quantity, 0);
    assert_eq!(apply_movement(0, Direction::Out, i64::MAX), 0);
    assert_eq!(apply_movement(quantity, Direction::In, 7), 7);
}

#[test]
fn movement_directions_map_to_log_kinds() {
    assert_eq!(Direction::In.kind(), MovementKind::Entry);
    assert_eq!(Direction::Out.kind(), MovementKind::Exit);
    assert_eq!(MovementKind::Sale.as_str(), "venda");
}

#[test]
fn movements_need_a_positive_quantity() {
    assert!(validate_quantity(1).is_ok());
    assert!(matches!(
        validate_quantity(0),
        Err(ValidationError::Invalid(_))
    ));
    assert!(validate_quantity(-3).is_err());
}

#[test]
fn divergent_count_requires_justification() {
    let err = reconcile_count(10, 8, None).unwrap_err();
    assert_eq!(
        err,
        ValidationError::MissingJustification {
            system: 10,
            counted: 8
        }
    );
    assert!(reconcile_count(10, 8, Some("   ")).is_err());

    let adjustment = reconcile_count(10, 8, Some(" quebra no transporte ")).unwrap();
    assert_eq!(adjustment.divergence(), -2);
    assert_eq!(adjustment.note.as_deref(), Some("quebra no transporte"));
}

#[test]
fn matching_count_needs_no_note() {
    let adjustment = reconcile_count(4, 4, None).unwrap();
    assert_eq!(adjustment.divergence(), 0);
    assert!(adjustment.note.is_none());
    assert!(reconcile_count(4, -1, Some("erro")).is_err());
}

#[test]
fn low_stock_includes_items_at_the_minimum() {
    let mut inactive = item("Acetona antiga", 0, 5);
    inactive.active = false;
    let items = vec![
        item("Acetona", 2, 5),
        item("Lixa", 5, 5),
        item("Algodão", 12, 5),
        inactive,
    ];
    let names: Vec<String> = low_stock(&items).into_iter().map(|i| i.name).collect();
    assert_eq!(names, vec!["Acetona", "Lixa"]);
    assert_eq!(stock_value(&items), (2 + 5 + 12) as f64 * 10.0);
}

#[test]
fn low_pantry_lists_items_to_restock() {
    let pantry = vec![
        PantryItem {
            id: Some(ObjectId::new()),
            name: "Café".into(),
            unit: Some("pacote".into()),
            quantity: 1,
            min_quantity: 2,
        },
        PantryItem {
            id: Some(ObjectId::new()),
            name: "Água".into(),
            unit: None,
            quantity: 10,
            min_quantity: 4,
        },
    ];
    let low = low_pantry(&pantry);
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].name, "Café");
}
