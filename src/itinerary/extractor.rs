//! Attraction records pulled from the bolded names of one day.

use super::markdown;
use crate::types::attraction::Attraction;
use crate::types::report::Subsection;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

pub const MAX_ATTRACTIONS: usize = 8;

static NAME_WITH_ALT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*([^*]+)\*\*\s*\(([^)]+)\)").expect("name with alt pattern is valid")
});

static NAME_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("name pattern is valid"));

// time of day, meals and logistics words that are bolded but are not places
static STOPLIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:morning|afternoon|evening|night|noon|breakfast|lunch|dinner|arrive|arrival|depart|departure|head to|go to|take|on foot|walk|enjoy|taste|watch|check[- ]?in|check[- ]?out|rest|relax|cost|price|afterward|afterwards|after|then)\b",
    )
    .expect("stoplist pattern is valid")
});

#[derive(Debug, Clone, Copy, Default)]
pub struct AttractionExtractor;

impl AttractionExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, itinerary_section: &str, day_num: u32) -> Vec<Attraction> {
        extract_attractions(itinerary_section, day_num)
    }

    pub fn for_day(&self, text: &str, day_num: u32) -> Vec<Attraction> {
        attractions_for_day(text, day_num)
    }
}

/// Extract up to [`MAX_ATTRACTIONS`] names from an Itinerary section
///
/// Falls back to two placeholder records when nothing qualifies.
pub fn extract_attractions(itinerary_section: &str, day_num: u32) -> Vec<Attraction> {
    let mut names: Vec<String> = Vec::new();

    for caps in NAME_WITH_ALT.captures_iter(itinerary_section) {
        let (Some(name), Some(alt)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let full = format!("{} ({})", name.as_str().trim(), alt.as_str().trim());
        if !names.contains(&full) {
            names.push(full);
        }
    }

    for caps in NAME_ONLY.captures_iter(itinerary_section) {
        let Some(name) = caps.get(1).map(|m| m.as_str().trim()) else {
            continue;
        };
        if names.iter().any(|accepted| accepted.contains(name)) {
            continue;
        }
        if name.chars().count() <= 1 || STOPLIST.is_match(name) {
            continue;
        }
        names.push(name.to_string());
    }

    if names.is_empty() {
        debug!(target: "itinerary::extractor", day = day_num, "no attractions found, using placeholders");
        return placeholders(day_num);
    }

    names
        .into_iter()
        .take(MAX_ATTRACTIONS)
        .enumerate()
        .map(|(idx, name)| {
            Attraction::new(
                format!("day{day_num}_attr{}", idx + 1),
                name,
                format!("Sight visited on day {day_num}"),
            )
        })
        .collect()
}

fn placeholders(day_num: u32) -> Vec<Attraction> {
    vec![
        Attraction::new(
            format!("day{day_num}_default1"),
            "Morning attraction",
            "Main sight of the morning",
        ),
        Attraction::new(
            format!("day{day_num}_default2"),
            "Afternoon attraction",
            "Main sight of the afternoon",
        ),
    ]
}

/// Attractions of one day of a full itinerary; empty when the day is absent
pub fn attractions_for_day(text: &str, day_num: u32) -> Vec<Attraction> {
    let Some(block) = markdown::find_day_block(text, day_num) else {
        return Vec::new();
    };
    let section = markdown::subsection_body(block, Subsection::Itinerary).unwrap_or(block);
    extract_attractions(section, day_num)
}
