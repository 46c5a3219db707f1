//! Markdown contract shared by every itinerary component.
//!
//! A day starts at a `# Day <N> (<place>)` header (one or two `#`, any case)
//! and runs until the next day header or the end of the text. Subsections are
//! `## <Title>` lines whose title maps to a [`Subsection`].

use crate::types::report::Subsection;
use crate::types::request::MAX_TRIP_DAYS;
use once_cell::sync::Lazy;
use regex::Regex;

/// Day numbers above this are treated as noise, not as day headers
pub const MAX_DAY_NUMBER: u32 = MAX_TRIP_DAYS * 10;

static DAY_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[ \t]*#{1,2}[ \t]*day[ \t]*(\d+)").expect("day header pattern is valid")
});

static SECTION_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*##[ \t]*([^#\n][^\n]*?)[ \t]*$").expect("section header pattern is valid")
});

static ANY_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*#").expect("heading pattern is valid"));

/// Byte range of one day inside an itinerary text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayBlock {
    pub day_num: u32,
    pub start: usize,
    pub end: usize,
}

impl DayBlock {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// Split a text into day blocks, in order of appearance
pub fn day_blocks(text: &str) -> Vec<DayBlock> {
    let headers: Vec<(usize, u32)> = DAY_HEADER
        .captures_iter(text)
        .filter_map(|caps| {
            let start = caps.get(0)?.start();
            let day_num = caps.get(1)?.as_str().parse::<u32>().ok()?;
            is_plausible_day(day_num).then_some((start, day_num))
        })
        .collect();

    headers
        .iter()
        .enumerate()
        .map(|(idx, &(start, day_num))| DayBlock {
            day_num,
            start,
            end: headers
                .get(idx + 1)
                .map(|&(next, _)| next)
                .unwrap_or(text.len()),
        })
        .collect()
}

/// Text before the first day header
pub fn preamble(text: &str) -> &str {
    match day_blocks(text).first() {
        Some(block) => &text[..block.start],
        None => text,
    }
}

/// Day numbers referenced by headers, in order of appearance
pub fn day_numbers(text: &str) -> Vec<u32> {
    day_blocks(text).iter().map(|block| block.day_num).collect()
}

/// Highest day number referenced by any day header (0 when there are none)
pub fn max_day_number(text: &str) -> u32 {
    day_numbers(text).into_iter().max().unwrap_or(0)
}

/// First block carrying the given day number
pub fn find_day_block(text: &str, day_num: u32) -> Option<&str> {
    day_blocks(text)
        .into_iter()
        .find(|block| block.day_num == day_num)
        .map(|block| block.text(text))
}

/// Parse the day number of a single header line
pub fn day_header_number(line: &str) -> Option<u32> {
    DAY_HEADER
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|day| is_plausible_day(*day))
}

fn is_plausible_day(day_num: u32) -> bool {
    (1..=MAX_DAY_NUMBER).contains(&day_num)
}

pub fn is_day_header(line: &str) -> bool {
    DAY_HEADER.is_match(line)
}

/// A `##` line that is not itself a day header
pub fn is_section_header(line: &str) -> bool {
    SECTION_HEADER.is_match(line) && !is_day_header(line)
}

/// Recognised subsections of a day block, in order of appearance
pub fn subsections(block: &str) -> Vec<Subsection> {
    SECTION_HEADER
        .captures_iter(block)
        .filter_map(|caps| caps.get(1))
        .filter_map(|title| Subsection::from_heading(title.as_str()))
        .collect()
}

/// True when the block has any `##` heading at all, recognised or not
pub fn has_section_marker(block: &str) -> bool {
    block.lines().any(is_section_header)
}

/// Body of a subsection: from the line after its heading to the next heading
pub fn subsection_body(block: &str, section: Subsection) -> Option<&str> {
    let heading = SECTION_HEADER.captures_iter(block).find(|caps| {
        caps.get(1)
            .and_then(|title| Subsection::from_heading(title.as_str()))
            == Some(section)
    })?;

    let body_start = heading.get(0)?.end();
    let rest = &block[body_start..];
    let body_end = ANY_HEADING
        .find_iter(rest)
        .map(|m| m.start())
        .find(|&pos| pos > 0)
        .unwrap_or(rest.len());

    Some(&rest[..body_end])
}

/// Last `n` lines of a text, used as style context in prompts
pub fn tail_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let skip = lines.len().saturating_sub(n);
    lines[skip..].join("\n")
}

/// Last `n` characters of a text, respecting char boundaries
pub fn tail_chars(text: &str, n: usize) -> &str {
    let count = text.chars().count();
    if count <= n {
        return text;
    }
    let skip = count - n;
    match text.char_indices().nth(skip) {
        Some((idx, _)) => &text[idx..],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Intro line\n\n# Day 1 (Tokyo)\n\n## Itinerary\n\n* Morning: **Senso-ji**\n\n## Meals\n\n* Lunch: ramen\n\n## Day 2 (Kyoto)\n\n## Lodging\n\nRyokan near Gion\n";

    #[test]
    fn splits_blocks_on_day_headers() {
        let blocks = day_blocks(SAMPLE);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].day_num, 1);
        assert!(blocks[0].text(SAMPLE).starts_with("# Day 1 (Tokyo)"));
        assert!(blocks[1].text(SAMPLE).starts_with("## Day 2 (Kyoto)"));
        assert_eq!(preamble(SAMPLE), "Intro line\n\n");
        assert_eq!(max_day_number(SAMPLE), 2);
    }

    #[test]
    fn finds_subsection_bodies() {
        let day_one = find_day_block(SAMPLE, 1).unwrap();
        assert_eq!(subsections(day_one), vec![Subsection::Itinerary, Subsection::Meals]);

        let body = subsection_body(day_one, Subsection::Itinerary).unwrap();
        assert_eq!(body.trim(), "* Morning: **Senso-ji**");
        assert!(subsection_body(day_one, Subsection::Tips).is_none());
    }

    #[test]
    fn day_header_needs_a_number() {
        assert_eq!(day_header_number("# Day 12 (Nara)"), Some(12));
        assert_eq!(day_header_number("# day3"), Some(3));
        assert_eq!(day_header_number("# Day zero"), None);
        assert_eq!(day_header_number("# Day 0 (Nowhere)"), None);
        assert!(!is_section_header("## Day 2 (Kyoto)"));
        assert!(is_section_header("## Meals"));
    }

    #[test]
    fn implausible_day_numbers_are_not_days() {
        let text = "# Day 4294967295 (Nowhere)\n\ntext\n\n# Day 301 (Far)\n\n# Day 2 (Kyoto)\n";
        assert_eq!(day_numbers(text), vec![2]);
        assert_eq!(max_day_number(text), 2);
        assert_eq!(day_header_number("# Day 300 (Edge)"), Some(MAX_DAY_NUMBER));
        assert_eq!(day_header_number("# Day 99999999999 (Overflow)"), None);
    }

    #[test]
    fn tails_respect_char_boundaries() {
        assert_eq!(tail_chars("日本旅行", 2), "旅行");
        assert_eq!(tail_lines("a\nb\nc", 2), "b\nc");
    }
}
