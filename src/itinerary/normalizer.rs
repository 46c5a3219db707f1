//! Cleans raw generator output into the markdown contract.

use super::bolding::{bold_attractions, BoldingLexicon};
use super::markdown;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Upper bound on the size of one response, in characters
pub const MAX_CONTENT_CHARS: usize = 12_000;

pub const TRUNCATION_WARNING: &str = "content truncated";

const PREAMBLE_MAX_CHARS: usize = 500;
const PREAMBLE_MAX_LINES: usize = 10;
const MIN_CONTENT_LINES: usize = 5;

static COURTESY_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(sure|certainly|of course|absolutely|okay|ok|great|here is|here's|here are|below is|below are|i've|i have|i will|i'll)\b")
        .expect("courtesy line pattern is valid")
});

static BARE_DAY_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[ \t]*#{1,2}[ \t]*day[ \t]*\d+[ \t]*$").expect("bare day header pattern is valid")
});

static FUSED_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^([ \t]*#{1,2}[ \t]*day[ \t]*\d+(?:[ \t]*\([^)\n]*\))?)[ \t]*[-–:|]?[ \t]*(##[ \t]*[^#\s][^\n]*)$")
        .expect("fused header pattern is valid")
});

/// Output of one normalization pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Normalized {
    pub content: String,
    pub warning: Option<String>,
}

/// Applies the cleaning rules in a fixed order
#[derive(Debug, Clone)]
pub struct ContentNormalizer {
    lexicon: BoldingLexicon,
    max_chars: usize,
}

impl Default for ContentNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentNormalizer {
    pub fn new() -> Self {
        Self {
            lexicon: BoldingLexicon::default(),
            max_chars: MAX_CONTENT_CHARS,
        }
    }

    /// Replace the attraction vocabulary used for bolding
    pub fn with_lexicon(mut self, lexicon: BoldingLexicon) -> Self {
        self.lexicon = lexicon;
        self
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars.max(1);
        self
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn normalize(&self, raw: &str) -> Normalized {
        let text = strip_code_fence(raw);
        let text = strip_preamble(&text);
        let text = repair_header_lines(&text);

        let (text, mut truncated) = bound_length(&text, self.max_chars);
        let bolded = bold_attractions(&text, &self.lexicon);
        let (text, rebounded) = bound_length(&bolded, self.max_chars);
        truncated |= rebounded;

        let content = text.trim().to_string();
        log_diagnostics(&content);

        if truncated {
            warn!(
                target: "itinerary::normalizer",
                limit = self.max_chars,
                "response exceeded size limit and was truncated"
            );
        }

        Normalized {
            content,
            warning: truncated.then(|| TRUNCATION_WARNING.to_string()),
        }
    }
}

/// Rule 0: remove a ```` ``` ```` or ```` ```markdown ```` wrapper
pub fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    let body = match trimmed.find('\n') {
        Some(newline) => &trimmed[newline + 1..],
        None => "",
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim().to_string()
}

/// Rule 1: drop short chatty text in front of the first header
pub fn strip_preamble(text: &str) -> String {
    match first_header_offset(text) {
        Some(0) => text.to_string(),
        Some(offset) => {
            let preamble = &text[..offset];
            let is_chatter = preamble.chars().count() < PREAMBLE_MAX_CHARS
                && preamble.lines().count() < PREAMBLE_MAX_LINES
                && !preamble.contains('#')
                && !preamble.contains('*');
            if is_chatter {
                debug!(target: "itinerary::normalizer", preamble = preamble.trim(), "stripped preamble");
                text[offset..].to_string()
            } else {
                text.to_string()
            }
        }
        None => strip_courtesy_lines(text),
    }
}

fn first_header_offset(text: &str) -> Option<usize> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let bare = line.trim_end_matches(['\n', '\r']);
        if markdown::is_day_header(bare) || markdown::is_section_header(bare) {
            return Some(offset);
        }
        offset += line.len();
    }
    None
}

/// Without any header, only leading courtesy lines are removed, and only while
/// real content follows them
fn strip_courtesy_lines(text: &str) -> String {
    let mut rest = text.trim_start();
    loop {
        let (first, remainder) = match rest.split_once('\n') {
            Some(split) => split,
            None => break,
        };
        if !COURTESY_LINE.is_match(first) || remainder.trim().is_empty() {
            break;
        }
        rest = remainder.trim_start();
    }
    rest.to_string()
}

/// Rules 2 and 3: split fused day/section headers, then drop truncated headers
pub fn repair_header_lines(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    for line in text.split('\n') {
        if let Some((day, section)) = split_fused_header(line) {
            lines.push(day);
            lines.push(String::new());
            lines.push(section);
            continue;
        }
        lines.push(line.to_string());
    }

    lines
        .into_iter()
        .filter(|line| {
            let drop = is_incomplete_header(line);
            if drop {
                debug!(target: "itinerary::normalizer", line = line.as_str(), "dropped incomplete header");
            }
            !drop
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `# Day 1 (Paris) - ## Itinerary` becomes two header lines
pub fn split_fused_header(line: &str) -> Option<(String, String)> {
    let caps = FUSED_HEADER.captures(line)?;
    let day = caps.get(1)?.as_str().trim_end().to_string();
    let section = caps.get(2)?.as_str().trim_end().to_string();
    Some((day, section))
}

/// True for a header line cut off before it was finished
pub fn is_incomplete_header(line: &str) -> bool {
    let trimmed = line.trim_end();
    let unclosed = trimmed.matches('(').count() > trimmed.matches(')').count();

    if markdown::is_day_header(trimmed) {
        return trimmed.ends_with(['(', '-', ',', ':'])
            || unclosed
            || BARE_DAY_HEADER.is_match(trimmed);
    }
    if markdown::is_section_header(trimmed) {
        return trimmed.ends_with(['(', '-', ',']) || unclosed;
    }
    false
}

/// Rule 4: keep the text under `max_chars`, preferring a cut before a day header
pub fn bound_length(text: &str, max_chars: usize) -> (String, bool) {
    if text.chars().count() <= max_chars {
        return (text.to_string(), false);
    }

    let limit = text
        .char_indices()
        .nth(max_chars)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());

    let cut = markdown::day_blocks(text)
        .into_iter()
        .map(|block| block.start)
        .filter(|&start| start > 0 && start < limit)
        .last();

    let bounded = match cut {
        Some(start) => text[..start].trim_end().to_string(),
        None => text[..limit].to_string(),
    };
    (bounded, true)
}

fn log_diagnostics(content: &str) {
    if markdown::day_blocks(content).is_empty() {
        warn!(target: "itinerary::normalizer", "response has no day headers");
    }
    if !content.lines().any(markdown::is_section_header) {
        warn!(target: "itinerary::normalizer", "response has no subsection headers");
    }
    let content_lines = content.lines().filter(|line| !line.trim().is_empty()).count();
    if content_lines < MIN_CONTENT_LINES {
        warn!(target: "itinerary::normalizer", content_lines, "response is suspiciously short");
    }
}
