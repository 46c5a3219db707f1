use crate::error::{FieldError, ItineraryError, Result};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_TRIP_DAYS: u32 = 1;
pub const MAX_TRIP_DAYS: u32 = 30;

/// Extra days assumed for open-ended ranges such as `"13+"`
const OPEN_RANGE_SPAN: u32 = 2;

const MINUS_ONE_DAY_TOKENS: &[&str] = &[
    "-1 day",
    "minus 1 day",
    "minus one day",
    "one day less",
    "one less day",
    "remove 1 day",
    "remove one day",
];

const PLUS_ONE_DAY_TOKENS: &[&str] = &[
    "+1 day",
    "plus 1 day",
    "plus one day",
    "add 1 day",
    "add one day",
    "one more day",
    "one extra day",
];

/// Kind of trip the traveller asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TravelType {
    Family,
    Honeymoon,
    Adventure,
    Culture,
    Food,
}

impl TravelType {
    /// Phrase used when describing the trip in a prompt
    pub fn description(&self) -> &'static str {
        match self {
            TravelType::Family => "a family trip",
            TravelType::Honeymoon => "a honeymoon",
            TravelType::Adventure => "an adventure trip",
            TravelType::Culture => "a cultural experience trip",
            TravelType::Food => "a food-focused trip",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TravelType::Family => "family",
            TravelType::Honeymoon => "honeymoon",
            TravelType::Adventure => "adventure",
            TravelType::Culture => "culture",
            TravelType::Food => "food",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "family" => Some(TravelType::Family),
            "honeymoon" => Some(TravelType::Honeymoon),
            "adventure" => Some(TravelType::Adventure),
            "culture" => Some(TravelType::Culture),
            "food" => Some(TravelType::Food),
            _ => None,
        }
    }
}

impl fmt::Display for TravelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a day-count adjustment requested in free text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayAdjustment {
    PlusOne,
    MinusOne,
}

impl DayAdjustment {
    /// Detect a "+1 day" / "-1 day" request. A minus request wins when both appear.
    pub fn detect(requirements: &str) -> Option<Self> {
        let lowered = requirements.trim().to_lowercase();
        if lowered.is_empty() {
            return None;
        }

        if MINUS_ONE_DAY_TOKENS
            .iter()
            .any(|token| lowered.contains(token))
        {
            Some(DayAdjustment::MinusOne)
        } else if PLUS_ONE_DAY_TOKENS.iter().any(|token| lowered.contains(token)) {
            Some(DayAdjustment::PlusOne)
        } else {
            None
        }
    }

    pub fn apply(&self, target: u32) -> u32 {
        match self {
            DayAdjustment::PlusOne => target.saturating_add(1).min(MAX_TRIP_DAYS),
            DayAdjustment::MinusOne => target.saturating_sub(1).max(MIN_TRIP_DAYS),
        }
    }
}

/// Requested trip length and the single day count the generator is asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRange {
    pub min: u32,
    pub max: u32,
    pub target: u32,
}

impl DayRange {
    /// Build a range and derive its midpoint target (halves round up)
    pub fn new(min: u32, max: u32) -> Self {
        Self {
            min,
            max,
            target: ((u64::from(min) + u64::from(max) + 1) / 2) as u32,
        }
    }

    pub fn single(days: u32) -> Self {
        Self::new(days, days)
    }

    /// Parse `"5"`, `"3-5"` (also `"3~5"`, `"3 to 5"`) or `"13+"`
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim().trim_end_matches(|c: char| c.is_alphabetic()).trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Some(open) = trimmed.strip_suffix('+') {
            let min = open.trim().parse::<u32>().ok()?;
            return Some(Self::new(min, min.saturating_add(OPEN_RANGE_SPAN)));
        }

        for separator in ["-", "~", "to"] {
            if let Some((low, high)) = trimmed.split_once(separator) {
                let min = low.trim().parse::<u32>().ok()?;
                let max = high.trim().parse::<u32>().ok()?;
                return Some(Self::new(min, max));
            }
        }

        trimmed.parse::<u32>().ok().map(Self::single)
    }

    /// Same range with the target moved by a free-text adjustment
    ///
    /// The target never leaves `MIN_TRIP_DAYS..=MAX_TRIP_DAYS`, even when an
    /// open range such as `"30+"` reaches past it.
    pub fn adjusted(self, adjustment: Option<DayAdjustment>) -> Self {
        let target = match adjustment {
            Some(adjustment) => adjustment.apply(self.target),
            None => self.target,
        };
        Self {
            target: target.clamp(MIN_TRIP_DAYS, MAX_TRIP_DAYS),
            ..self
        }
    }
}

impl fmt::Display for DayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}

/// Validated request for a generated itinerary. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItineraryRequest {
    country: String,
    day_range: DayRange,
    travel_type: Option<TravelType>,
    special_requirements: Option<String>,
    region: Option<String>,
    departure_date: Option<NaiveDate>,
}

impl ItineraryRequest {
    pub fn builder(country: impl Into<String>, days: impl Into<String>) -> ItineraryRequestBuilder {
        ItineraryRequestBuilder::new(country, days)
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn day_range(&self) -> DayRange {
        self.day_range
    }

    pub fn target_days(&self) -> u32 {
        self.day_range.target
    }

    pub fn travel_type(&self) -> Option<TravelType> {
        self.travel_type
    }

    pub fn special_requirements(&self) -> Option<&str> {
        self.special_requirements.as_deref()
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn departure_date(&self) -> Option<NaiveDate> {
        self.departure_date
    }

    /// Day adjustment requested in the special requirements, if any
    pub fn day_adjustment(&self) -> Option<DayAdjustment> {
        self.special_requirements
            .as_deref()
            .and_then(DayAdjustment::detect)
    }
}

/// Collects raw request fields and validates them all at once
#[derive(Debug, Clone)]
pub struct ItineraryRequestBuilder {
    country: String,
    days: String,
    travel_type: Option<String>,
    special_requirements: Option<String>,
    region: Option<String>,
    departure_date: Option<String>,
}

impl ItineraryRequestBuilder {
    pub fn new(country: impl Into<String>, days: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            days: days.into(),
            travel_type: None,
            special_requirements: None,
            region: None,
            departure_date: None,
        }
    }

    pub fn with_travel_type(mut self, travel_type: impl Into<String>) -> Self {
        self.travel_type = Some(travel_type.into());
        self
    }

    pub fn with_special_requirements(mut self, requirements: impl Into<String>) -> Self {
        self.special_requirements = Some(requirements.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_departure_date(mut self, date: impl Into<String>) -> Self {
        self.departure_date = Some(date.into());
        self
    }

    /// Validate against today's local date
    pub fn build(self) -> Result<ItineraryRequest> {
        let today = chrono::Local::now().date_naive();
        self.build_as_of(today)
    }

    /// Validate every field, reporting all problems together
    pub fn build_as_of(self, today: NaiveDate) -> Result<ItineraryRequest> {
        let mut errors = Vec::new();

        let country = self.country.trim().to_string();
        if country.is_empty() {
            errors.push(FieldError::new("country", "country must not be empty"));
        }

        let day_range = match DayRange::parse(&self.days) {
            Some(range) if !(MIN_TRIP_DAYS..=MAX_TRIP_DAYS).contains(&range.min) => {
                errors.push(FieldError::new(
                    "days",
                    format!("days must be between {MIN_TRIP_DAYS} and {MAX_TRIP_DAYS}"),
                ));
                None
            }
            Some(range) if range.max > MAX_TRIP_DAYS + OPEN_RANGE_SPAN => {
                errors.push(FieldError::new(
                    "days",
                    format!("day range must not extend beyond {MAX_TRIP_DAYS} days"),
                ));
                None
            }
            Some(range) if range.max < range.min => {
                errors.push(FieldError::new(
                    "days",
                    "day range maximum must not be below its minimum",
                ));
                None
            }
            Some(range) => Some(range),
            None => {
                errors.push(FieldError::new(
                    "days",
                    format!("days must be between {MIN_TRIP_DAYS} and {MAX_TRIP_DAYS}"),
                ));
                None
            }
        };

        let travel_type = match non_blank(self.travel_type) {
            Some(raw) => match TravelType::parse(&raw) {
                Some(travel_type) => Some(travel_type),
                None => {
                    errors.push(FieldError::new(
                        "travel_type",
                        format!("unknown travel type `{raw}`"),
                    ));
                    None
                }
            },
            None => None,
        };

        let departure_date = match non_blank(self.departure_date) {
            Some(raw) => match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
                Ok(date) if date < today => {
                    errors.push(FieldError::new(
                        "departure_date",
                        "departure date must not be in the past",
                    ));
                    None
                }
                Ok(date) => Some(date),
                Err(_) => {
                    errors.push(FieldError::new(
                        "departure_date",
                        "departure date must use the YYYY-MM-DD format",
                    ));
                    None
                }
            },
            None => None,
        };

        if !errors.is_empty() {
            return Err(ItineraryError::InvalidRequest(errors));
        }

        let special_requirements = non_blank(self.special_requirements);
        let adjustment = special_requirements
            .as_deref()
            .and_then(DayAdjustment::detect);
        let day_range = day_range
            .ok_or_else(|| ItineraryError::Unknown("day range missing after validation".into()))?
            .adjusted(adjustment);

        Ok(ItineraryRequest {
            country,
            day_range,
            travel_type,
            special_requirements,
            region: non_blank(self.region),
            departure_date,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 1).unwrap()
    }

    #[test]
    fn parses_day_range_formats() {
        assert_eq!(DayRange::parse("4"), Some(DayRange::new(4, 4)));
        assert_eq!(DayRange::parse("3-5").unwrap().target, 4);
        assert_eq!(DayRange::parse("6-9").unwrap().target, 8);
        assert_eq!(DayRange::parse("13+"), Some(DayRange::new(13, 15)));
        assert_eq!(DayRange::parse(" 5 days"), Some(DayRange::single(5)));
        assert_eq!(DayRange::parse("a week"), None);
    }

    #[test]
    fn detects_day_adjustments() {
        assert_eq!(
            DayAdjustment::detect("Please add one day in Kyoto"),
            Some(DayAdjustment::PlusOne)
        );
        assert_eq!(DayAdjustment::detect("-1 day please"), Some(DayAdjustment::MinusOne));
        assert_eq!(
            DayAdjustment::detect("+1 day, actually -1 day"),
            Some(DayAdjustment::MinusOne)
        );
        assert_eq!(DayAdjustment::detect("vegetarian food"), None);
        assert_eq!(DayAdjustment::MinusOne.apply(1), 1);
    }

    #[test]
    fn builds_request_with_adjusted_target() {
        let request = ItineraryRequest::builder("Japan", "3-5")
            .with_special_requirements("+1 day for Osaka")
            .with_travel_type("food")
            .build_as_of(today())
            .unwrap();

        assert_eq!(request.day_range().min, 3);
        assert_eq!(request.day_range().max, 5);
        assert_eq!(request.target_days(), 5);
        assert_eq!(request.travel_type(), Some(TravelType::Food));
    }

    #[test]
    fn target_stays_within_trip_limits() {
        let build = |days: &str, requirements: &str| {
            ItineraryRequest::builder("Japan", days)
                .with_special_requirements(requirements)
                .build_as_of(today())
                .unwrap()
        };

        assert_eq!(build("30+", "").target_days(), 30);
        assert_eq!(build("28-32", "").target_days(), 30);
        assert_eq!(build("30", "add one day").target_days(), 30);
        assert_eq!(build("30+", "add one day").day_range().max, 32);
        assert_eq!(DayAdjustment::PlusOne.apply(MAX_TRIP_DAYS), MAX_TRIP_DAYS);
    }

    #[test]
    fn collects_all_field_errors() {
        let err = ItineraryRequest::builder("  ", "45")
            .with_departure_date("2020-01-01")
            .with_travel_type("cruise")
            .build_as_of(today())
            .unwrap_err();

        let fields: Vec<&str> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["country", "days", "travel_type", "departure_date"]);
    }

    #[test]
    fn rejects_malformed_departure_date() {
        let err = ItineraryRequest::builder("France", "3")
            .with_departure_date("next tuesday")
            .build_as_of(today())
            .unwrap_err();
        assert_eq!(err.field_errors()[0].field, "departure_date");
    }
}
