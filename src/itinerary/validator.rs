//! Structural validation of an itinerary against its target day count.

use super::markdown;
use crate::types::report::{DayDiagnostic, Subsection, ValidationReport};
use tracing::debug;

/// A day block must carry more than this many characters of trimmed text
pub const MIN_DAY_CHARS: usize = 30;

/// A present subsection body must carry at least this many characters
pub const MIN_SECTION_CHARS: usize = 15;

pub const CONTENT_TOO_SHORT: &str = "content too short";

/// Allowed distance between the actual and the target day count
pub fn day_tolerance(target_days: u32) -> u32 {
    match target_days {
        0..=3 => 0,
        4..=7 => 1,
        _ => {
            let ten_percent = (u64::from(target_days) + 9) / 10;
            ten_percent.min(2) as u32
        }
    }
}

/// Checks day headers, subsections and minimum content
#[derive(Debug, Clone, Copy, Default)]
pub struct StructureValidator;

impl StructureValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, text: &str, target_days: u32) -> ValidationReport {
        validate(text, target_days)
    }
}

pub fn validate(text: &str, target_days: u32) -> ValidationReport {
    let actual_days = markdown::max_day_number(text);
    let tolerance = day_tolerance(target_days);
    let blocks = markdown::day_blocks(text);

    let mut errors = Vec::new();
    let mut content_errors = 0usize;

    if actual_days.saturating_add(tolerance) < target_days {
        errors.push(format!(
            "too few days: found {actual_days}, expected {target_days}"
        ));
    }
    if actual_days > target_days.saturating_add(tolerance) {
        errors.push(format!(
            "too many days: found {actual_days}, expected {target_days}"
        ));
    }

    let checked_days = actual_days.min(target_days);
    let mut day_details = Vec::with_capacity(checked_days as usize);

    for day_num in 1..=checked_days {
        let mut diagnostic = DayDiagnostic::new(day_num);
        let block = blocks
            .iter()
            .find(|block| block.day_num == day_num)
            .map(|block| block.text(text));

        match block {
            Some(block) if block.trim().chars().count() > MIN_DAY_CHARS => {
                diagnostic.has_content = true;
                check_subsections(block, &mut diagnostic, &mut errors, &mut content_errors);
            }
            Some(block) => {
                diagnostic
                    .missing_subheaders
                    .extend(missing_subsections(block));
                record_short_day(&mut diagnostic, &mut errors, &mut content_errors);
            }
            None => {
                diagnostic.missing_subheaders.extend(Subsection::ALL);
                record_short_day(&mut diagnostic, &mut errors, &mut content_errors);
            }
        }

        day_details.push(diagnostic);
    }

    let subheaders_valid = blocks.is_empty()
        || blocks
            .iter()
            .any(|block| markdown::has_section_marker(block.text(text)));
    if !subheaders_valid {
        errors.push("no day contains any subsection headers".to_string());
    }

    let header_valid = actual_days >= 1
        && actual_days.saturating_add(tolerance) >= target_days
        && actual_days <= target_days.saturating_add(tolerance);
    let content_valid = content_errors == 0;
    let is_valid = header_valid && errors.is_empty();

    debug!(
        target: "itinerary::validator",
        actual_days,
        target_days,
        tolerance,
        is_valid,
        errors = errors.len(),
        "validated itinerary"
    );

    ValidationReport {
        actual_days,
        target_days,
        header_valid,
        subheaders_valid,
        content_valid,
        is_valid,
        errors,
        day_details,
    }
}

fn missing_subsections(block: &str) -> impl Iterator<Item = Subsection> {
    let present = markdown::subsections(block);
    Subsection::ALL
        .into_iter()
        .filter(move |section| !present.contains(section))
}

fn check_subsections(
    block: &str,
    diagnostic: &mut DayDiagnostic,
    errors: &mut Vec<String>,
    content_errors: &mut usize,
) {
    for section in Subsection::ALL {
        match markdown::subsection_body(block, section) {
            None => {
                diagnostic.missing_subheaders.insert(section);
            }
            Some(body) if body.trim().chars().count() < MIN_SECTION_CHARS => {
                diagnostic
                    .content_issues
                    .push(format!("{} section too short", section.heading().to_lowercase()));
                errors.push(format!(
                    "day {} {} section is too short",
                    diagnostic.day_num,
                    section.heading().to_lowercase()
                ));
                *content_errors += 1;
            }
            Some(_) => {}
        }
    }
}

fn record_short_day(
    diagnostic: &mut DayDiagnostic,
    errors: &mut Vec<String>,
    content_errors: &mut usize,
) {
    diagnostic.content_issues.push(CONTENT_TOO_SHORT.to_string());
    errors.push(format!(
        "day {} content is too short or missing",
        diagnostic.day_num
    ));
    *content_errors += 1;
}
