// messaging.rs
// WhatsApp deep links with a pre-filled message. No API call is made.

use chrono::NaiveDate;

const WHATSAPP_BASE: &str = "https://wa.me/";

/// International digits for a phone; local 10/11-digit numbers get the `55` prefix.
pub fn international_digits(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    let digits = digits.trim_start_matches('0').to_string();
    if matches!(digits.len(), 10 | 11) {
        format!("55{digits}")
    } else {
        digits
    }
}

pub fn whatsapp_link(phone: &str, text: &str) -> String {
    let number = international_digits(phone);
    format!("{WHATSAPP_BASE}{number}?text={}", urlencoding::encode(text))
}

pub fn reminder_message(
    salon: &str,
    client_name: &str,
    service_name: &str,
    date: NaiveDate,
    time: &str,
) -> String {
    format!(
        "Olá, {client_name}! Passando para lembrar do seu horário de {service_name} no {salon} em {} às {time}. Podemos confirmar?",
        date.format("%d/%m/%Y")
    )
}

/// Fills `{nome}` in a campaign template.
pub fn campaign_message(template: &str, client_name: &str) -> String {
    template.replace("{nome}", client_name)
}
