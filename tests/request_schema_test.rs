use chrono::NaiveDate;
use serde_json::json;
use tiny_itinerary_rs::schemas::{
    parse_request_as_of, parse_request_str, request_schema, validate_payload, DaysInput,
    ItineraryRequestPayload,
};
use tiny_itinerary_rs::{ItineraryError, ItineraryRequest};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 5, 1).unwrap()
}

#[test]
fn schema_accepts_number_or_text_days() {
    let schema = request_schema();
    assert!(schema["properties"]["days"].is_object());
    assert!(validate_payload(&json!({"country": "Japan", "days": 5})).is_ok());
    assert!(validate_payload(&json!({"country": "Japan", "days": "3-5"})).is_ok());
    assert!(validate_payload(&json!({"country": "Japan", "days": [3]})).is_err());
}

#[test]
fn camel_case_payloads_are_accepted() {
    let request = parse_request_as_of(
        json!({
            "country": "Japan",
            "days": "5-7",
            "travelType": "honeymoon",
            "specialRequirements": "please add one day in Kyoto",
            "departureDate": "2026-06-01"
        }),
        today(),
    )
    .unwrap();

    assert_eq!(request.country(), "Japan");
    assert_eq!(request.target_days(), 7);
    assert_eq!(
        request.departure_date(),
        NaiveDate::from_ymd_opt(2026, 6, 1)
    );
}

#[test]
fn every_field_problem_is_reported_at_once() {
    let err = parse_request_as_of(
        json!({
            "country": "  ",
            "days": 45,
            "travel_type": "space",
            "departure_date": "2020-01-01"
        }),
        today(),
    )
    .unwrap_err();

    let fields: Vec<&str> = err
        .field_errors()
        .iter()
        .map(|error| error.field.as_str())
        .collect();
    assert_eq!(fields, vec!["country", "days", "travel_type", "departure_date"]);

    let payload = err.to_error_payload();
    assert_eq!(payload["error"]["code"], "INVALID_REQUEST");
    assert_eq!(payload["error"]["details"].as_array().unwrap().len(), 4);
}

#[test]
fn malformed_json_is_an_invalid_request() {
    let err = parse_request_str(r#"{"country": "Japan", "days": "#).unwrap_err();
    assert!(matches!(err, ItineraryError::InvalidRequest(_)));
}

#[test]
fn payload_converts_through_the_builder() {
    let mut payload = ItineraryRequestPayload::new("France", DaysInput::Count(4));
    payload.region = Some("Provence".to_string());

    let request = payload.into_request_as_of(today()).unwrap();
    let built = ItineraryRequest::builder("France", "4")
        .with_region("Provence")
        .build_as_of(today())
        .unwrap();
    assert_eq!(request, built);
}
