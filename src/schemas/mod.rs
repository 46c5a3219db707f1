//! Wire-level request payloads and their JSON schema validation.

pub mod request_schema;

pub use request_schema::{
    parse_request, parse_request_as_of, parse_request_str, request_schema, validate_payload,
    DaysInput, ItineraryRequestPayload,
};
