use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;

use aminna::messaging::{campaign_message, international_digits, reminder_message, whatsapp_link};
use aminna::models::StockItem;
use aminna::ocr::{fold, match_item};

fn item(name: &str, code: Option<&str>) -> StockItem {
    StockItem {
        id: Some(ObjectId::new()),
        name: name.to_string(),
        code: code.map(str::to_string),
        category: None,
        unit: None,
        quantity: 3,
        min_quantity: 1,
        cost_price: 5.0,
        sale_price: 12.0,
        supplier_id: None,
        active: true,
    }
}

#[test]
fn fold_strips_accents_and_punctuation() {
    assert_eq!(fold("  Esmalte  VERMELHÓ!! "), "esmalte vermelho");
    assert_eq!(fold("Óleo de Cutícula - 15ml"), "oleo de cuticula 15ml");
    assert_eq!(fold("***"), "");
}

#[test]
fn longest_contained_name_wins() {
    let items = vec![item("Esmalte", None), item("Esmalte Vermelho", None)];
    let found = match_item("ESMALTE VERMELHO Risqué 8ml", &items).unwrap();
    assert_eq!(found.name, "Esmalte Vermelho");

    let found = match_item("esmalte azul", &items).unwrap();
    assert_eq!(found.name, "Esmalte");
}

#[test]
fn code_hit_beats_name_hit() {
    let items = vec![
        item("Esmalte Vermelho", None),
        item("Base Fortalecedora", Some("BF-01")),
    ];
    let found = match_item("Esmalte vermelho lote BF 01", &items).unwrap();
    assert_eq!(found.name, "Base Fortalecedora");

    let found = match_item("ref bf01", &items).unwrap();
    assert_eq!(found.name, "Base Fortalecedora");
}

#[test]
fn name_words_may_appear_out_of_order() {
    let items = vec![item("Removedor Acetona", None)];
    let found = match_item("Acetona 100ml removedor de esmalte", &items).unwrap();
    assert_eq!(found.name, "Removedor Acetona");
}

#[test]
fn inactive_or_unknown_items_are_not_matched() {
    let mut gone = item("Algodão", None);
    gone.active = false;
    let items = vec![gone, item("Lixa", None)];
    assert!(match_item("algodao 50g", &items).is_none());
    assert!(match_item("pincel", &items).is_none());
    assert!(match_item("   ", &items).is_none());
}

#[test]
fn phones_become_international_digits() {
    assert_eq!(international_digits("(11) 98765-4321"), "5511987654321");
    assert_eq!(international_digits("+55 11 98765-4321"), "5511987654321");
    assert_eq!(international_digits("011 98765 4321"), "5511987654321");
    assert_eq!(international_digits("(11) 3333-4444"), "551133334444");
    assert_eq!(international_digits("+44 20 7946 0958"), "442079460958");
}

#[test]
fn whatsapp_link_encodes_the_message() {
    assert_eq!(
        whatsapp_link("11987654321", "Olá, Ana!"),
        "https://wa.me/5511987654321?text=Ol%C3%A1%2C%20Ana%21"
    );
}

#[test]
fn reminder_mentions_service_date_and_time() {
    let text = reminder_message(
        "Aminna",
        "Ana",
        "Manicure",
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        "14:30",
    );
    assert!(text.starts_with("Olá, Ana!"));
    assert!(text.contains("Manicure no Aminna em 15/03/2024 às 14:30"));
}

#[test]
fn campaign_template_fills_every_name_slot() {
    assert_eq!(
        campaign_message("Oi {nome}! {nome}, temos novidades.", "Bia"),
        "Oi Bia! Bia, temos novidades."
    );
    assert_eq!(campaign_message("Sem nome", "Bia"), "Sem nome");
}
