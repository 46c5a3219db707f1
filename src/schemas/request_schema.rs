use crate::error::{FieldError, ItineraryError, Result};
use crate::types::request::ItineraryRequest;
use chrono::NaiveDate;
use jsonschema::{Draft, JSONSchema};
use once_cell::sync::Lazy;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

const MAX_SCHEMA_ERRORS: usize = 8;

/// Day count as sent by clients: a number or text such as "3-5" or "7+"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum DaysInput {
    Count(u32),
    Text(String),
}

impl fmt::Display for DaysInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaysInput::Count(days) => write!(f, "{}", days),
            DaysInput::Text(text) => f.write_str(text),
        }
    }
}

/// Wire shape of an itinerary request
///
/// Field names are snake_case; the camelCase spellings used by browser
/// clients are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ItineraryRequestPayload {
    /// Destination country
    #[schemars(length(min = 1))]
    pub country: String,
    /// Requested trip length
    pub days: DaysInput,
    /// One of family, honeymoon, adventure, culture, food
    #[serde(default, alias = "travelType")]
    pub travel_type: Option<String>,
    #[serde(default, alias = "specialRequirements")]
    pub special_requirements: Option<String>,
    /// Region or city focus inside the country
    #[serde(default)]
    pub region: Option<String>,
    /// Departure date as YYYY-MM-DD
    #[serde(default, alias = "departureDate")]
    pub departure_date: Option<String>,
}

impl ItineraryRequestPayload {
    pub fn new(country: impl Into<String>, days: DaysInput) -> Self {
        Self {
            country: country.into(),
            days,
            travel_type: None,
            special_requirements: None,
            region: None,
            departure_date: None,
        }
    }

    /// Validate the fields against today's date
    pub fn into_request(self) -> Result<ItineraryRequest> {
        self.into_request_as_of(chrono::Local::now().date_naive())
    }

    pub fn into_request_as_of(self, today: NaiveDate) -> Result<ItineraryRequest> {
        let mut builder = ItineraryRequest::builder(self.country, self.days.to_string());
        if let Some(travel_type) = self.travel_type {
            builder = builder.with_travel_type(travel_type);
        }
        if let Some(requirements) = self.special_requirements {
            builder = builder.with_special_requirements(requirements);
        }
        if let Some(region) = self.region {
            builder = builder.with_region(region);
        }
        if let Some(date) = self.departure_date {
            builder = builder.with_departure_date(date);
        }
        builder.build_as_of(today)
    }
}

static REQUEST_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::to_value(schema_for!(ItineraryRequestPayload)).unwrap_or_default()
});

/// JSON schema (draft 7) of [`ItineraryRequestPayload`]
pub fn request_schema() -> &'static Value {
    &REQUEST_SCHEMA
}

fn field_from_path(path: &str) -> String {
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() {
        "<root>".to_string()
    } else {
        trimmed.replace('/', ".")
    }
}

/// Check a raw payload against the request schema, collecting field errors
pub fn validate_payload(payload: &Value) -> Result<()> {
    let validator = JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(request_schema())
        .map_err(|err| ItineraryError::Config(format!("request schema failed to compile: {}", err)))?;

    if let Err(errors) = validator.validate(payload) {
        let details: Vec<FieldError> = errors
            .take(MAX_SCHEMA_ERRORS)
            .map(|error| FieldError::new(field_from_path(&error.instance_path.to_string()), error.to_string()))
            .collect();
        return Err(ItineraryError::InvalidRequest(details));
    }

    Ok(())
}

/// Schema-check, deserialize and validate a JSON request in one go
pub fn parse_request(payload: Value) -> Result<ItineraryRequest> {
    parse_request_as_of(payload, chrono::Local::now().date_naive())
}

pub fn parse_request_as_of(payload: Value, today: NaiveDate) -> Result<ItineraryRequest> {
    validate_payload(&payload)?;
    let payload: ItineraryRequestPayload = serde_path_to_error::deserialize(payload).map_err(|err| {
        ItineraryError::InvalidRequest(vec![FieldError::new(
            err.path().to_string(),
            err.inner().to_string(),
        )])
    })?;
    payload.into_request_as_of(today)
}

/// Parse a JSON document into a request, reporting the failing path on malformed input
pub fn parse_request_str(json: &str) -> Result<ItineraryRequest> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    let value: Value = serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
        ItineraryError::InvalidRequest(vec![FieldError::new(
            err.path().to_string(),
            format!("malformed JSON: {}", err.inner()),
        )])
    })?;
    parse_request(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 1).unwrap()
    }

    #[test]
    fn schema_describes_the_payload() {
        let schema = request_schema();
        assert_eq!(schema["title"], "ItineraryRequestPayload");
        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("country")));
        assert!(required.contains(&json!("days")));
    }

    #[test]
    fn accepts_numeric_and_text_days() {
        let request = parse_request_as_of(json!({"country": "Japan", "days": 3}), today()).unwrap();
        assert_eq!(request.target_days(), 3);

        let request = parse_request_as_of(
            json!({"country": "Japan", "days": "3-5", "travelType": "food"}),
            today(),
        )
        .unwrap();
        assert_eq!(request.target_days(), 4);
        assert!(request.travel_type().is_some());
    }

    #[test]
    fn missing_fields_are_reported_by_the_schema() {
        let err = parse_request_as_of(json!({"days": 3}), today()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_REQUEST");
        assert!(err.field_errors()[0].message.contains("country"));
    }

    #[test]
    fn wrong_types_name_the_field() {
        let err = parse_request_as_of(json!({"country": 7, "days": 3}), today()).unwrap_err();
        assert_eq!(err.field_errors()[0].field, "country");
    }
}
