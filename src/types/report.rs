use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// One of the four sections every day of an itinerary must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subsection {
    Itinerary,
    Meals,
    Lodging,
    Tips,
}

impl Subsection {
    pub const ALL: [Subsection; 4] = [
        Subsection::Itinerary,
        Subsection::Meals,
        Subsection::Lodging,
        Subsection::Tips,
    ];

    /// Canonical heading text used in prompts and generated markdown
    pub fn heading(&self) -> &'static str {
        match self {
            Subsection::Itinerary => "Itinerary",
            Subsection::Meals => "Meals",
            Subsection::Lodging => "Lodging",
            Subsection::Tips => "Tips",
        }
    }

    /// Map a heading title to a subsection, tolerating common alternate phrasings
    pub fn from_heading(title: &str) -> Option<Self> {
        let lowered = title
            .trim()
            .trim_end_matches(|c: char| c == ':' || c.is_whitespace())
            .to_lowercase();
        let first_word = lowered.split_whitespace().next().unwrap_or_default();

        match first_word {
            "itinerary" | "schedule" | "activities" | "plan" => Some(Subsection::Itinerary),
            "meals" | "meal" | "dining" | "food" | "restaurants" => Some(Subsection::Meals),
            "lodging" | "accommodation" | "accommodations" | "hotel" | "hotels" | "stay" => {
                Some(Subsection::Lodging)
            }
            "tips" | "tip" | "advice" | "notes" => Some(Subsection::Tips),
            _ => None,
        }
    }
}

impl fmt::Display for Subsection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.heading())
    }
}

/// Per-day findings of a validation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayDiagnostic {
    pub day_num: u32,
    pub has_content: bool,
    pub missing_subheaders: BTreeSet<Subsection>,
    pub content_issues: Vec<String>,
}

impl DayDiagnostic {
    pub fn new(day_num: u32) -> Self {
        Self {
            day_num,
            has_content: false,
            missing_subheaders: BTreeSet::new(),
            content_issues: Vec::new(),
        }
    }

    /// True when the day needs no rewriting
    pub fn is_complete(&self) -> bool {
        self.has_content && self.missing_subheaders.is_empty() && self.content_issues.is_empty()
    }

    /// True when the day has problems that count against validity
    pub fn has_blocking_issues(&self) -> bool {
        !self.has_content || !self.content_issues.is_empty()
    }
}

/// Structural diagnosis of a whole itinerary against its target day count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub actual_days: u32,
    pub target_days: u32,
    pub header_valid: bool,
    pub subheaders_valid: bool,
    pub content_valid: bool,
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub day_details: Vec<DayDiagnostic>,
}

impl ValidationReport {
    pub fn shortfall(&self) -> u32 {
        self.target_days.saturating_sub(self.actual_days)
    }

    pub fn excess(&self) -> u32 {
        self.actual_days.saturating_sub(self.target_days)
    }

    /// Days whose blocks are missing, too short or carry undersized sections
    pub fn problem_days(&self) -> Vec<u32> {
        self.day_details
            .iter()
            .filter(|day| day.has_blocking_issues())
            .map(|day| day.day_num)
            .collect()
    }

    /// Days that are structurally incomplete in any way, including missing sections
    pub fn incomplete_days(&self) -> Vec<u32> {
        self.day_details
            .iter()
            .filter(|day| !day.is_complete())
            .map(|day| day.day_num)
            .collect()
    }

    pub fn day(&self, day_num: u32) -> Option<&DayDiagnostic> {
        self.day_details.iter().find(|day| day.day_num == day_num)
    }

    /// Machine-readable completeness summary returned alongside an itinerary
    pub fn completeness(&self) -> CompletenessDescriptor {
        CompletenessDescriptor {
            actual_days: self.actual_days,
            target_days: self.target_days,
            is_valid: self.is_valid,
            error_count: self.errors.len(),
            day_issues: self
                .day_details
                .iter()
                .map(|day| DayIssues {
                    day_num: day.day_num,
                    is_complete: day.is_complete(),
                    missing_subheaders: day.missing_subheaders.iter().copied().collect(),
                    content_issues: day.content_issues.clone(),
                })
                .collect(),
        }
    }
}

/// Completeness descriptor: actual vs. target days plus per-day issues
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletenessDescriptor {
    pub actual_days: u32,
    pub target_days: u32,
    pub is_valid: bool,
    pub error_count: usize,
    pub day_issues: Vec<DayIssues>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayIssues {
    pub day_num: u32,
    pub is_complete: bool,
    pub missing_subheaders: Vec<Subsection>,
    pub content_issues: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_heading_aliases() {
        assert_eq!(Subsection::from_heading("Itinerary"), Some(Subsection::Itinerary));
        assert_eq!(Subsection::from_heading("Meal Recommendations"), Some(Subsection::Meals));
        assert_eq!(Subsection::from_heading("accommodation:"), Some(Subsection::Lodging));
        assert_eq!(Subsection::from_heading("Travel Tips"), None);
        assert_eq!(Subsection::from_heading("Tips & Advice"), Some(Subsection::Tips));
    }

    #[test]
    fn missing_sections_do_not_block_a_day() {
        let mut day = DayDiagnostic::new(2);
        day.has_content = true;
        day.missing_subheaders.insert(Subsection::Tips);

        assert!(!day.is_complete());
        assert!(!day.has_blocking_issues());
    }
}
