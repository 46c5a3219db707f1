//! Whole-draft analysis used when resuming or patching a partial itinerary.

use super::markdown;
use crate::types::report::Subsection;
use crate::types::request::TravelType;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// A draft needs more than this many non-empty lines per day to count as substantial
const LINES_PER_DAY: usize = 8;

const STRUCTURE_WEIGHT: f64 = 70.0;
const CONTENT_WEIGHT: f64 = 30.0;

static RANGE_INPUT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)\s*(?:-|~|to)\s*(\d+)").expect("range input pattern is valid")
});

static NUMBER_INPUT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)").expect("number input pattern is valid"));

/// Structural summary of a draft itinerary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentAnalysis {
    pub current_days: u32,
    pub section_counts: BTreeMap<Subsection, usize>,
    pub has_substantial_content: bool,
    pub last_day_complete: bool,
    /// Subsections that appear fewer times than there are days
    pub missing_structures: Vec<Subsection>,
    /// 0-100: 70 for subsection coverage plus 30 for substantial content
    pub completeness_score: f64,
}

impl ContentAnalysis {
    pub fn section_count(&self, section: Subsection) -> usize {
        self.section_counts.get(&section).copied().unwrap_or(0)
    }

    pub fn is_nearly_complete(&self) -> bool {
        self.current_days > 0 && self.has_substantial_content && self.missing_structures.len() <= 1
    }

    /// True when the draft has every structure and a finished last day
    pub fn is_structurally_complete(&self) -> bool {
        self.missing_structures.is_empty() && self.last_day_complete
    }
}

pub fn analyze(content: &str) -> ContentAnalysis {
    let current_days = markdown::max_day_number(content);

    let mut section_counts: BTreeMap<Subsection, usize> =
        Subsection::ALL.iter().map(|section| (*section, 0)).collect();
    for section in markdown::subsections(content) {
        *section_counts.entry(section).or_insert(0) += 1;
    }

    let content_lines = content.lines().filter(|line| !line.trim().is_empty()).count();
    let has_substantial_content = content_lines > current_days as usize * LINES_PER_DAY;

    let last_day_complete = current_days > 0
        && markdown::find_day_block(content, current_days)
            .map(|block| {
                let present = markdown::subsections(block);
                Subsection::ALL.iter().all(|section| present.contains(section))
            })
            .unwrap_or(false);

    let missing_structures = Subsection::ALL
        .into_iter()
        .filter(|section| section_counts[section] < current_days as usize)
        .collect();

    let completeness_score = if current_days == 0 {
        0.0
    } else {
        let found: usize = section_counts.values().sum();
        let expected = current_days as f64 * Subsection::ALL.len() as f64;
        let structure = found as f64 / expected * STRUCTURE_WEIGHT;
        let content = if has_substantial_content { CONTENT_WEIGHT } else { 0.0 };
        (structure + content).min(100.0)
    };

    ContentAnalysis {
        current_days,
        section_counts,
        has_substantial_content,
        last_day_complete,
        missing_structures,
        completeness_score,
    }
}

/// Day count to aim for when continuing a draft that already has `current_days`
///
/// - range input: its upper bound, or one more day once the draft is past it
/// - single number: that number, or one more day once the draft reached it
/// - anything else: two more days
pub fn parse_continuation_target(days_input: Option<&str>, current_days: u32) -> u32 {
    let Some(input) = days_input.map(str::trim).filter(|input| !input.is_empty()) else {
        return current_days.saturating_add(2);
    };

    if let Some(caps) = RANGE_INPUT.captures(input) {
        let max = caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok());
        if let Some(max) = max {
            return if current_days > max {
                current_days.saturating_add(1)
            } else {
                max
            };
        }
    }

    if let Some(target) = NUMBER_INPUT
        .captures(input)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
    {
        return if target <= current_days {
            current_days.saturating_add(1)
        } else {
            target
        };
    }

    current_days.saturating_add(2)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailLevel {
    VeryHigh,
    High,
    Medium,
    Concise,
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DetailLevel::VeryHigh => "very detailed",
            DetailLevel::High => "detailed",
            DetailLevel::Medium => "moderately detailed",
            DetailLevel::Concise => "concise",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialFocus {
    Food,
    History,
    Nature,
    Shopping,
    Family,
    General,
}

impl fmt::Display for SpecialFocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SpecialFocus::Food => "food experiences",
            SpecialFocus::History => "history and culture",
            SpecialFocus::Nature => "nature and scenery",
            SpecialFocus::Shopping => "shopping",
            SpecialFocus::Family => "family activities",
            SpecialFocus::General => "a mix of sights",
        })
    }
}

/// Writing style of a draft, echoed back in continuation prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleFeatures {
    pub detail_level: DetailLevel,
    pub special_focus: SpecialFocus,
}

struct FocusRule {
    focus: SpecialFocus,
    trigger: &'static str,
    vocabulary: Lazy<Regex>,
}

const FOCUS_MIN_MENTIONS: usize = 10;

static FOCUS_RULES: [FocusRule; 5] = [
    FocusRule {
        focus: SpecialFocus::Food,
        trigger: "food",
        vocabulary: Lazy::new(|| {
            Regex::new(r"(?i)restaurant|food|cuisine|street food|snack|cafe|dessert|dining")
                .expect("food vocabulary is valid")
        }),
    },
    FocusRule {
        focus: SpecialFocus::History,
        trigger: "histor",
        vocabulary: Lazy::new(|| {
            Regex::new(r"(?i)histor|heritage|museum|culture|ruins|tradition")
                .expect("history vocabulary is valid")
        }),
    },
    FocusRule {
        focus: SpecialFocus::Nature,
        trigger: "nature",
        vocabulary: Lazy::new(|| {
            Regex::new(r"(?i)nature|park|mountain|lake|beach|scenery|landscape")
                .expect("nature vocabulary is valid")
        }),
    },
    FocusRule {
        focus: SpecialFocus::Shopping,
        trigger: "shopping",
        vocabulary: Lazy::new(|| {
            Regex::new(r"(?i)shopping|shop|market|department store|mall|boutique")
                .expect("shopping vocabulary is valid")
        }),
    },
    FocusRule {
        focus: SpecialFocus::Family,
        trigger: "family",
        vocabulary: Lazy::new(|| {
            Regex::new(r"(?i)family|kids|children|amusement|theme park|playground")
                .expect("family vocabulary is valid")
        }),
    },
];

pub fn style_features(content: &str) -> StyleFeatures {
    let long_lines: Vec<usize> = content
        .lines()
        .map(|line| line.trim().chars().count())
        .filter(|len| *len > 10)
        .collect();
    let average = long_lines.iter().sum::<usize>() as f64 / long_lines.len().max(1) as f64;

    let detail_level = if average > 80.0 {
        DetailLevel::VeryHigh
    } else if average > 50.0 {
        DetailLevel::High
    } else if average > 30.0 {
        DetailLevel::Medium
    } else {
        DetailLevel::Concise
    };

    let lowered = content.to_lowercase();
    let special_focus = FOCUS_RULES
        .iter()
        .find(|rule| {
            lowered.contains(rule.trigger)
                && rule.vocabulary.find_iter(&lowered).count() > FOCUS_MIN_MENTIONS
        })
        .map(|rule| rule.focus)
        .unwrap_or(SpecialFocus::General);

    StyleFeatures {
        detail_level,
        special_focus,
    }
}

/// World region mentioned by a saved itinerary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Asia,
    Europe,
    America,
    Oceania,
    Africa,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Asia => "asia",
            Region::Europe => "europe",
            Region::America => "america",
            Region::Oceania => "oceania",
            Region::Africa => "africa",
        }
    }
}

/// Request fields recovered from an itinerary that arrived without them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItineraryMetadata {
    pub country: Option<String>,
    pub days: Option<u32>,
    pub region: Option<Region>,
    pub travel_type: Option<TravelType>,
}

impl ItineraryMetadata {
    pub fn is_empty(&self) -> bool {
        self.country.is_none()
            && self.days.is_none()
            && self.region.is_none()
            && self.travel_type.is_none()
    }
}

struct KeywordRule<T> {
    value: T,
    pattern: Lazy<Regex>,
}

// "# Japan 5-Day Itinerary", "# Kyoto and Osaka 4 days trip"
static TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^#[ \t]*([^#\n]+?)[ \t]*\d+[ \t-]*days?\b[ \t-]*(?:trip|tour|itinerary|journey|getaway|adventure|guide|travel|plan)")
        .expect("title pattern is valid")
});

static TITLE_NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\[\]()【】「」『』]").expect("title noise pattern is valid"));

static TRIP_LENGTH: [Lazy<Regex>; 3] = [
    Lazy::new(|| {
        Regex::new(r"(?i)\b(\d+)[ \t-]*days?[ \t-]*(?:trip|tour|itinerary|journey|getaway|adventure)")
            .expect("trip length pattern is valid")
    }),
    Lazy::new(|| {
        Regex::new(r"(?i)\b(?:over|spanning|a total of|for)[ \t]+(\d+)[ \t]+days\b")
            .expect("trip span pattern is valid")
    }),
    Lazy::new(|| {
        Regex::new(r"(?im)^#[^#\n]*?\b(\d+)[ \t-]*days?\b").expect("title length pattern is valid")
    }),
];

const COMMON_COUNTRIES: &[&str] = &[
    "Japan",
    "South Korea",
    "Korea",
    "Thailand",
    "Taiwan",
    "Singapore",
    "Malaysia",
    "Vietnam",
    "Indonesia",
    "Philippines",
    "China",
    "Hong Kong",
    "Macau",
    "India",
    "United States",
    "Canada",
    "Mexico",
    "United Kingdom",
    "France",
    "Germany",
    "Italy",
    "Spain",
    "Portugal",
    "Switzerland",
    "Netherlands",
    "Belgium",
    "Austria",
    "Greece",
    "Australia",
    "New Zealand",
];

// list order decides between several mentioned countries
static COUNTRY_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    COMMON_COUNTRIES
        .iter()
        .map(|country| {
            let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(country)))
                .expect("escaped country name is a valid pattern");
            (*country, pattern)
        })
        .collect()
});

static REGION_RULES: [KeywordRule<Region>; 5] = [
    KeywordRule {
        value: Region::Asia,
        pattern: Lazy::new(|| {
            Regex::new(r"(?i)\b(?:asia|east asia|southeast asia|south asia)\b")
                .expect("asia pattern is valid")
        }),
    },
    KeywordRule {
        value: Region::Europe,
        pattern: Lazy::new(|| {
            Regex::new(r"(?i)\beurope(?:an)?\b|\b(?:western|eastern|southern|northern) europe\b")
                .expect("europe pattern is valid")
        }),
    },
    KeywordRule {
        value: Region::America,
        pattern: Lazy::new(|| {
            Regex::new(r"(?i)\b(?:americas|north america|south america|latin america)\b")
                .expect("america pattern is valid")
        }),
    },
    KeywordRule {
        value: Region::Oceania,
        pattern: Lazy::new(|| {
            Regex::new(r"(?i)\b(?:oceania|australasia|australia)\b").expect("oceania pattern is valid")
        }),
    },
    KeywordRule {
        value: Region::Africa,
        pattern: Lazy::new(|| Regex::new(r"(?i)\bafrica\b").expect("africa pattern is valid")),
    },
];

static TRAVEL_TYPE_RULES: [KeywordRule<TravelType>; 5] = [
    KeywordRule {
        value: TravelType::Family,
        pattern: Lazy::new(|| {
            Regex::new(r"(?i)\bfamily (?:trip|travel|holiday|vacation)\b|\bwith (?:the )?kids\b|\bchildren\b")
                .expect("family pattern is valid")
        }),
    },
    KeywordRule {
        value: TravelType::Honeymoon,
        pattern: Lazy::new(|| {
            Regex::new(r"(?i)\bhoneymoon\b|\bcouples\b|\bromantic\b").expect("honeymoon pattern is valid")
        }),
    },
    KeywordRule {
        value: TravelType::Adventure,
        pattern: Lazy::new(|| {
            Regex::new(r"(?i)\badventur\w*|\bexpedition\b|\bhik(?:e|ing)\b|\btrek\w*|\bdiving\b|\bclimb\w*")
                .expect("adventure pattern is valid")
        }),
    },
    KeywordRule {
        value: TravelType::Culture,
        pattern: Lazy::new(|| {
            Regex::new(r"(?i)\bcultur\w*|\bhistor\w*|\bheritage\b|\bart\b|\bfestival\w*")
                .expect("culture pattern is valid")
        }),
    },
    KeywordRule {
        value: TravelType::Food,
        pattern: Lazy::new(|| {
            Regex::new(r"(?i)\bfood\w*|\bcuisine\b|\brestaurants?\b|\bstreet food\b|\bsnacks?\b")
                .expect("food pattern is valid")
        }),
    },
];

/// Best-effort recovery of country, length, region and trip type from itinerary text
///
/// Each field is inferred independently; the first matching rule wins.
pub fn infer_metadata(content: &str) -> ItineraryMetadata {
    if content.trim().is_empty() {
        return ItineraryMetadata::default();
    }

    let metadata = ItineraryMetadata {
        country: infer_country(content),
        days: infer_days(content),
        region: first_rule_match(&REGION_RULES, content),
        travel_type: first_rule_match(&TRAVEL_TYPE_RULES, content),
    };
    debug!(target: "itinerary::analysis", ?metadata, "inferred itinerary metadata");
    metadata
}

fn infer_country(content: &str) -> Option<String> {
    let from_title = TITLE
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|title| TITLE_NOISE.replace_all(title.as_str(), "").trim().to_string())
        .find(|title| !title.is_empty());
    if from_title.is_some() {
        return from_title;
    }

    COUNTRY_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(content))
        .map(|(country, _)| country.to_string())
}

fn infer_days(content: &str) -> Option<u32> {
    TRIP_LENGTH
        .iter()
        .find_map(|pattern| {
            pattern
                .captures(content)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse::<u32>().ok())
                .filter(|days| *days > 0)
        })
        .or_else(|| Some(markdown::max_day_number(content)).filter(|days| *days > 0))
}

fn first_rule_match<T: Copy>(rules: &[KeywordRule<T>], content: &str) -> Option<T> {
    rules
        .iter()
        .find(|rule| rule.pattern.is_match(content))
        .map(|rule| rule.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPLETE_DAY: &str = "# Day 1 (Seoul)\n\n## Itinerary\n\n* **Gyeongbokgung Palace**\n\n## Meals\n\n* Bibimbap\n\n## Lodging\n\n* Hanok stay\n\n## Tips\n\n* T-money card\n";

    #[test]
    fn analyzes_a_complete_day() {
        let analysis = analyze(COMPLETE_DAY);
        assert_eq!(analysis.current_days, 1);
        assert!(analysis.last_day_complete);
        assert!(analysis.missing_structures.is_empty());
        assert!(analysis.has_substantial_content);
        assert_eq!(analysis.completeness_score, 100.0);
    }

    #[test]
    fn reports_missing_structures() {
        let text = format!("{COMPLETE_DAY}\n# Day 2 (Busan)\n\n## Itinerary\n\n* **Haeundae Beach**\n");
        let analysis = analyze(&text);
        assert_eq!(analysis.current_days, 2);
        assert!(!analysis.last_day_complete);
        assert_eq!(
            analysis.missing_structures,
            vec![Subsection::Meals, Subsection::Lodging, Subsection::Tips]
        );
        assert_eq!(analysis.section_count(Subsection::Itinerary), 2);
        assert!(analysis.completeness_score < 70.0);
    }

    #[test]
    fn empty_draft_scores_zero() {
        let analysis = analyze("nothing here");
        assert_eq!(analysis.current_days, 0);
        assert_eq!(analysis.completeness_score, 0.0);
        assert!(!analysis.last_day_complete);
    }

    #[test]
    fn continuation_targets() {
        assert_eq!(parse_continuation_target(None, 3), 5);
        assert_eq!(parse_continuation_target(Some("  "), 3), 5);
        assert_eq!(parse_continuation_target(Some("5-7"), 3), 7);
        assert_eq!(parse_continuation_target(Some("5~7"), 6), 7);
        assert_eq!(parse_continuation_target(Some("5 to 7"), 9), 10);
        assert_eq!(parse_continuation_target(Some("6"), 3), 6);
        assert_eq!(parse_continuation_target(Some("6 days"), 6), 7);
        assert_eq!(parse_continuation_target(Some("a while"), 1), 3);
    }

    #[test]
    fn style_reflects_line_length_and_focus() {
        let terse = style_features("* Walk\n* Temple visit today\n* Lunch at noon ok");
        assert_eq!(terse.detail_level, DetailLevel::Concise);
        assert_eq!(terse.special_focus, SpecialFocus::General);

        let foodie = "Food lovers: restaurant after restaurant, street food and dessert.\n".repeat(4);
        let style = style_features(&foodie);
        assert_eq!(style.special_focus, SpecialFocus::Food);
        assert_eq!(style.detail_level, DetailLevel::High);
    }

    #[test]
    fn metadata_comes_from_the_title_first() {
        let text = "# Japan 5-Day Itinerary\n\nA romantic trip through East Asia.\n\n# Day 1 (Tokyo)\n\n## Itinerary\n\n* Morning: **Senso-ji**\n";
        let metadata = infer_metadata(text);
        assert_eq!(metadata.country.as_deref(), Some("Japan"));
        assert_eq!(metadata.days, Some(5));
        assert_eq!(metadata.region, Some(Region::Asia));
        assert_eq!(metadata.travel_type, Some(TravelType::Honeymoon));
    }

    #[test]
    fn metadata_falls_back_to_mentions_and_day_headers() {
        let text = "# Day 1 (Busan)\n\n## Itinerary\n\n* Morning: hike to the temple above the harbour in South Korea for a couple of hours\n\n# Day 2 (Busan)\n\n* Seafood market\n";
        let metadata = infer_metadata(text);
        assert_eq!(metadata.country.as_deref(), Some("South Korea"));
        assert_eq!(metadata.days, Some(2));
        assert_eq!(metadata.region, None);
        assert_eq!(metadata.travel_type, Some(TravelType::Adventure));
    }

    #[test]
    fn blank_text_has_no_metadata() {
        assert!(infer_metadata("  \n").is_empty());
        assert_eq!(infer_metadata("just words").days, None);
    }
}
