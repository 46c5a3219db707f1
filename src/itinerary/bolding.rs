//! Best-effort bolding of attraction names the generator forgot to mark.
//!
//! Two rules run per line, longest names first:
//! - curated full names are bolded on any non-header line,
//! - `<place prefix> <type suffix>` combinations (e.g. "Kyoto Temple") are
//!   bolded only on activity lines (bullets or time-of-day lines).
//!
//! Text already inside `**...**`, and the `(<alt-name>)` that may follow it,
//! is never touched, so running the rules twice changes nothing.

use super::markdown;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::ops::Range;

/// A bold name plus its optional parenthesised alternate name
static PROTECTED_SPAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*[^*\n]+\*\*(?:[ \t]*\([^)\n]*\))?").expect("protected span pattern is valid")
});

const FULL_NAMES: &[&str] = &[
    // Japan
    "Tokyo Tower",
    "Tokyo Skytree",
    "Senso-ji",
    "Meiji Jingu",
    "Meiji Shrine",
    "Imperial Palace",
    "Tsukiji Outer Market",
    "Ueno Park",
    "Kiyomizu-dera",
    "Kinkaku-ji",
    "Ginkaku-ji",
    "Fushimi Inari Taisha",
    "Arashiyama Bamboo Grove",
    "Nara Park",
    "Todai-ji",
    "Osaka Castle",
    "Dotonbori",
    "Universal Studios Japan",
    "Mount Fuji",
    // France
    "Eiffel Tower",
    "Louvre Museum",
    "Notre-Dame Cathedral",
    "Arc de Triomphe",
    "Champs-Elysees",
    "Palace of Versailles",
    "Sacre-Coeur",
    "Montmartre",
    "Musee d'Orsay",
    // United Kingdom
    "British Museum",
    "London Eye",
    "Big Ben",
    "Buckingham Palace",
    "Tower Bridge",
    "Westminster Abbey",
    "Covent Garden",
    "Hyde Park",
    // United States
    "Statue of Liberty",
    "Central Park",
    "Times Square",
    "Empire State Building",
    "Brooklyn Bridge",
    "Rockefeller Center",
    // South Korea
    "Gyeongbokgung Palace",
    "Changdeokgung Palace",
    "Myeongdong",
    "N Seoul Tower",
    "Bukchon Hanok Village",
    // Thailand
    "Grand Palace",
    "Wat Pho",
    "Wat Arun",
    "Khao San Road",
    "Chatuchak Weekend Market",
    // Taiwan
    "National Palace Museum",
    "Chiang Kai-shek Memorial Hall",
    "Taipei 101",
    "Jiufen Old Street",
    "Taroko National Park",
    "Sun Moon Lake",
];

const PLACE_PREFIXES: &[&str] = &[
    "Tokyo", "Kyoto", "Osaka", "Nara", "Asakusa", "Shinjuku", "Shibuya", "Ueno", "Hakone",
    "Nikko", "Kamakura", "Hiroshima", "Sapporo", "Paris", "Louvre", "Versailles", "London",
    "Westminster", "New York", "Brooklyn", "Seoul", "Busan", "Jeju", "Bangkok", "Chiang Mai",
    "Phuket", "Taipei", "Tainan", "Kaohsiung",
];

const TYPE_SUFFIXES: &[&str] = &[
    "Temple",
    "Shrine",
    "Tower",
    "Castle",
    "Palace",
    "Museum",
    "Gallery",
    "Cathedral",
    "Church",
    "Park",
    "Garden",
    "Gardens",
    "Zoo",
    "Aquarium",
    "Market",
    "Night Market",
    "Square",
    "Bridge",
    "Station",
    "Observatory",
    "Beach",
    "Lake",
];

const ACTIVITY_MARKERS: &[&str] = &[
    "morning",
    "afternoon",
    "evening",
    "noon",
    "night",
    "visit",
    "head to",
    "explore",
    "stroll",
];

/// Replaceable vocabulary driving the bolding rules
#[derive(Debug, Clone)]
pub struct BoldingLexicon {
    full_names: Regex,
    combinations: Regex,
}

impl BoldingLexicon {
    /// Build a lexicon from custom word lists
    pub fn new(full_names: &[&str], prefixes: &[&str], suffixes: &[&str]) -> Option<Self> {
        Some(Self {
            full_names: alternation(full_names, None)?,
            combinations: alternation(prefixes, Some(suffixes))?,
        })
    }

    fn matches(&self, line: &str) -> Vec<Range<usize>> {
        let mut protected: Vec<Range<usize>> =
            PROTECTED_SPAN.find_iter(line).map(|m| m.range()).collect();
        let mut accepted = Vec::new();

        let mut candidates: Vec<Range<usize>> =
            self.full_names.find_iter(line).map(|m| m.range()).collect();
        if is_activity_line(line) {
            candidates.extend(self.combinations.find_iter(line).map(|m| m.range()));
        }
        candidates.sort_by(|a, b| (b.end - b.start).cmp(&(a.end - a.start)).then(a.start.cmp(&b.start)));

        for candidate in candidates {
            if touches_bold_markers(line, &candidate) {
                continue;
            }
            if protected.iter().any(|range| overlaps(range, &candidate)) {
                continue;
            }
            protected.push(candidate.clone());
            accepted.push(candidate);
        }

        accepted.sort_by_key(|range| range.start);
        accepted
    }
}

impl Default for BoldingLexicon {
    fn default() -> Self {
        DEFAULT_LEXICON.clone()
    }
}

static DEFAULT_LEXICON: Lazy<BoldingLexicon> = Lazy::new(|| {
    BoldingLexicon::new(FULL_NAMES, PLACE_PREFIXES, TYPE_SUFFIXES)
        .expect("built-in bolding lexicon is valid")
});

/// Wrap un-bolded attraction names in `**` markers
pub fn bold_attractions(content: &str, lexicon: &BoldingLexicon) -> String {
    content
        .split('\n')
        .map(|line| {
            if markdown::is_day_header(line) || line.trim_start().starts_with('#') {
                return line.to_string();
            }
            bold_line(line, &lexicon.matches(line))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn bold_line(line: &str, ranges: &[Range<usize>]) -> String {
    if ranges.is_empty() {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() + ranges.len() * 4);
    let mut cursor = 0;
    for range in ranges {
        out.push_str(&line[cursor..range.start]);
        out.push_str("**");
        out.push_str(&line[range.clone()]);
        out.push_str("**");
        cursor = range.end;
    }
    out.push_str(&line[cursor..]);
    out
}

fn is_activity_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    if trimmed.starts_with("* ") || trimmed.starts_with("- ") {
        return true;
    }
    let lowered = line.to_lowercase();
    ACTIVITY_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

/// A name directly adjacent to `*` is part of some emphasis we should not split
fn touches_bold_markers(line: &str, range: &Range<usize>) -> bool {
    line[..range.start].ends_with('*') || line[range.end..].starts_with('*')
}

fn alternation(words: &[&str], suffixes: Option<&[&str]>) -> Option<Regex> {
    let mut sorted: Vec<&str> = words.to_vec();
    sorted.sort_by_key(|word| std::cmp::Reverse(word.len()));
    let group = sorted
        .iter()
        .map(|word| regex::escape(word))
        .collect::<Vec<_>>()
        .join("|");

    let pattern = match suffixes {
        Some(suffixes) => {
            let mut sorted_suffixes: Vec<&str> = suffixes.to_vec();
            sorted_suffixes.sort_by_key(|word| std::cmp::Reverse(word.len()));
            let suffix_group = sorted_suffixes
                .iter()
                .map(|word| regex::escape(word))
                .collect::<Vec<_>>()
                .join("|");
            format!(r"\b(?:{group})\s+(?:{suffix_group})\b")
        }
        None => format!(r"\b(?:{group})\b"),
    };

    RegexBuilder::new(&pattern).build().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bold(content: &str) -> String {
        bold_attractions(content, &BoldingLexicon::default())
    }

    #[test]
    fn bolds_known_full_names() {
        assert_eq!(
            bold("Walk from the Eiffel Tower to the river."),
            "Walk from the **Eiffel Tower** to the river."
        );
    }

    #[test]
    fn bolds_combinations_only_on_activity_lines() {
        assert_eq!(
            bold("* Morning: explore Kyoto Temple grounds"),
            "* Morning: explore **Kyoto Temple** grounds"
        );
        assert_eq!(bold("Kyoto Temple etiquette matters."), "Kyoto Temple etiquette matters.");
    }

    #[test]
    fn never_touches_existing_bold_or_headers() {
        let already = "* Morning: **Tokyo Tower** then **Ueno** Park";
        assert_eq!(bold(already), already);

        let header = "# Day 1 (Tokyo Tower area)";
        assert_eq!(bold(header), header);
    }

    #[test]
    fn leaves_alternate_names_alone() {
        let line = "* Morning: **Eiffel Tower** (Eiffel Tower) with a long river walk";
        assert_eq!(bold(line), line);

        let mixed = "* Afternoon: **Louvre** (Louvre Museum), then Tokyo Tower";
        assert_eq!(
            bold(mixed),
            "* Afternoon: **Louvre** (Louvre Museum), then **Tokyo Tower**"
        );
    }

    #[test]
    fn prefers_longest_name() {
        assert_eq!(
            bold("* Afternoon: Tokyo Skytree views"),
            "* Afternoon: **Tokyo Skytree** views"
        );
    }

    #[test]
    fn is_idempotent() {
        let once = bold("* Evening: Osaka Castle and the London Eye");
        assert_eq!(bold(&once), once);
        assert!(once.contains("**Osaka Castle**"));
        assert!(once.contains("**London Eye**"));
    }
}
