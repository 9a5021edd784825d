use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;

use aminna::agenda::{
    AdditionalServiceRequest, BookingRequest, CheckoutRequest, book, can_transition, check_out,
    day_agenda, transition,
};
use aminna::error::ValidationError;
use aminna::models::{AppointmentStatus, Provider, Service};

fn service(name: &str, price: f64) -> Service {
    Service {
        id: Some(ObjectId::new()),
        name: name.to_string(),
        category: None,
        price,
        duration_minutes: Some(45),
        active: true,
    }
}

fn provider(name: &str, rate: f64) -> Provider {
    Provider {
        id: Some(ObjectId::new()),
        name: name.to_string(),
        phone: None,
        email: None,
        specialty: None,
        commission_rate: rate,
        active: true,
    }
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn booking(service: &Service, provider: &Provider) -> BookingRequest {
    BookingRequest {
        customer_id: Some(ObjectId::new()),
        service_id: service.id,
        provider_id: provider.id,
        date: Some(day(12)),
        time: "09:30".into(),
        booked_price: None,
        status: None,
        additional_services: vec![],
        notes: None,
    }
}

fn checkout(method: &str) -> CheckoutRequest {
    CheckoutRequest {
        payment_method: method.to_string(),
        price_paid: None,
        payment_date: None,
    }
}

#[test]
fn booking_freezes_prices_and_rates() {
    let mani = service("Manicure", 50.0);
    let pedi = service("Pedicure", 60.0);
    let ana = provider("Ana", 0.5);
    let bia = provider("Bia", 0.4);

    let mut request = booking(&mani, &ana);
    request.booked_price = Some(45.0);
    request.additional_services.push(AdditionalServiceRequest {
        service_id: pedi.id.unwrap(),
        provider_id: bia.id.unwrap(),
        booked_price: None,
        is_courtesy: false,
        client_name: Some(" ".into()),
    });

    let services = [mani.clone(), pedi.clone()];
    let providers = [ana.clone(), bia.clone()];
    let appointment = book(request, &services, &providers).unwrap();

    assert_eq!(appointment.status, AppointmentStatus::Pending);
    assert_eq!(appointment.booked_price, Some(45.0));
    assert_eq!(appointment.commission_rate_snapshot, Some(0.5));
    let extra = &appointment.additional_services[0];
    assert_eq!(extra.booked_price, Some(60.0));
    assert_eq!(extra.commission_rate_snapshot, Some(0.4));
    assert_eq!(extra.client_name, None);
}

#[test]
fn booking_requires_core_fields() {
    let mani = service("Manicure", 50.0);
    let ana = provider("Ana", 0.5);
    let services = [mani.clone()];
    let providers = [ana.clone()];

    let mut request = booking(&mani, &ana);
    request.customer_id = None;
    assert_eq!(
        book(request, &services, &providers).unwrap_err(),
        ValidationError::Required("cliente")
    );

    let mut request = booking(&mani, &ana);
    request.time = " ".into();
    assert_eq!(
        book(request, &services, &providers).unwrap_err(),
        ValidationError::Required("horário")
    );

    let mut request = booking(&mani, &ana);
    request.time = "9h".into();
    assert!(book(request, &services, &providers).is_err());

    let mut request = booking(&mani, &ana);
    request.booked_price = Some(-1.0);
    assert!(book(request, &services, &providers).is_err());

    let mut request = booking(&mani, &ana);
    request.status = Some(AppointmentStatus::Completed);
    assert!(book(request, &services, &providers).is_err());
}

#[test]
fn inactive_professionals_cannot_be_booked() {
    let mani = service("Manicure", 50.0);
    let mut ana = provider("Ana", 0.5);
    ana.active = false;
    let err = book(booking(&mani, &ana), &[mani.clone()], &[ana.clone()]).unwrap_err();
    assert!(matches!(err, ValidationError::Invalid(msg) if msg.contains("inativo")));
}

#[test]
fn lifecycle_transitions() {
    use AppointmentStatus::*;
    assert!(can_transition(Pending, Confirmed));
    assert!(can_transition(Confirmed, InProgress));
    assert!(can_transition(Pending, Cancelled));
    assert!(can_transition(Cancelled, Pending));
    assert!(!can_transition(Cancelled, Confirmed));
    assert!(!can_transition(Pending, Completed));
    assert!(!can_transition(Completed, Cancelled));
    assert!(!can_transition(InProgress, Pending));
}

#[test]
fn check_out_records_payment_once() {
    let mani = service("Manicure", 50.0);
    let ana = provider("Ana", 0.5);
    let mut appointment = book(booking(&mani, &ana), &[mani.clone()], &[ana.clone()]).unwrap();

    // Pending appointments must be confirmed first.
    assert!(check_out(&mut appointment, checkout("Pix")).is_err());

    transition(&mut appointment, AppointmentStatus::Confirmed).unwrap();
    assert_eq!(
        check_out(&mut appointment, checkout("  ")).unwrap_err(),
        ValidationError::Required("forma de pagamento")
    );

    let mut bad_date = checkout("Pix");
    bad_date.payment_date = Some("ontem".into());
    assert!(check_out(&mut appointment, bad_date).is_err());
    assert_eq!(appointment.status, AppointmentStatus::Confirmed);

    let mut request = checkout(" Pix ");
    request.price_paid = Some(40.0);
    request.payment_date = Some("2024-03-13T10:00:00Z".into());
    check_out(&mut appointment, request).unwrap();

    assert_eq!(appointment.status, AppointmentStatus::Completed);
    assert_eq!(appointment.payment_method.as_deref(), Some("Pix"));
    assert_eq!(appointment.price_paid, Some(40.0));
    assert!(check_out(&mut appointment, checkout("Pix")).is_err());
    assert!(transition(&mut appointment, AppointmentStatus::Cancelled).is_err());
}

#[test]
fn day_agenda_is_sorted_by_time() {
    let mani = service("Manicure", 50.0);
    let ana = provider("Ana", 0.5);
    let services = [mani.clone()];
    let providers = [ana.clone()];

    let mut late = booking(&mani, &ana);
    late.time = "16:00".into();
    let mut early = booking(&mani, &ana);
    early.time = "08:15".into();
    let mut other_day = booking(&mani, &ana);
    other_day.date = Some(day(13));

    let appointments = vec![
        book(late, &services, &providers).unwrap(),
        book(other_day, &services, &providers).unwrap(),
        book(early, &services, &providers).unwrap(),
    ];
    let times: Vec<String> = day_agenda(&appointments, day(12))
        .into_iter()
        .map(|a| a.time)
        .collect();
    assert_eq!(times, vec!["08:15", "16:00"]);
}
