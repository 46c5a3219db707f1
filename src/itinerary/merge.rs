//! Day-level merging of generator output into an existing itinerary.
//!
//! Every function rebuilds the text as `preamble + day blocks`, so the result
//! never carries two blocks with the same day number.

use super::markdown;
use super::validator::MIN_DAY_CHARS;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Result of a merge: the new text plus which incoming days were used
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Merged {
    pub content: String,
    pub applied_days: Vec<u32>,
    pub skipped_days: Vec<u32>,
}

impl Merged {
    fn unchanged(content: &str) -> Self {
        Self {
            content: content.to_string(),
            applied_days: Vec::new(),
            skipped_days: Vec::new(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.applied_days.is_empty()
    }
}

#[derive(Debug, Clone)]
struct OwnedBlock {
    day_num: u32,
    text: String,
}

fn owned_blocks(text: &str) -> Vec<OwnedBlock> {
    markdown::day_blocks(text)
        .into_iter()
        .map(|block| OwnedBlock {
            day_num: block.day_num,
            text: block.text(text).to_string(),
        })
        .collect()
}

/// Keep the first block of each day number
fn dedup(blocks: Vec<OwnedBlock>) -> Vec<OwnedBlock> {
    let mut seen = BTreeSet::new();
    blocks
        .into_iter()
        .filter(|block| seen.insert(block.day_num))
        .collect()
}

/// Insert before the first block with a higher day number
fn insert_sorted(blocks: &mut Vec<OwnedBlock>, block: OwnedBlock) {
    let position = blocks
        .iter()
        .position(|existing| existing.day_num > block.day_num)
        .unwrap_or(blocks.len());
    blocks.insert(position, block);
}

fn assemble(preamble: &str, blocks: &[OwnedBlock]) -> String {
    let preamble = preamble.trim();
    let mut parts: Vec<&str> = Vec::with_capacity(blocks.len() + 1);
    if !preamble.is_empty() {
        parts.push(preamble);
    }
    parts.extend(blocks.iter().map(|block| block.text.trim()));
    parts.join("\n\n")
}

/// Append days the existing text does not have yet
///
/// Incoming days that already exist are dropped. Incoming text without any
/// day header leaves the existing text untouched.
pub fn merge_continuation(existing: &str, incoming: &str) -> Merged {
    let incoming_blocks = owned_blocks(incoming);
    if incoming_blocks.is_empty() {
        debug!(target: "itinerary::merge", "continuation had no day headers, ignoring");
        return Merged::unchanged(existing);
    }

    let mut blocks = dedup(owned_blocks(existing));
    let mut present: BTreeSet<u32> = blocks.iter().map(|block| block.day_num).collect();
    let mut applied_days = Vec::new();
    let mut skipped_days = Vec::new();

    for block in incoming_blocks {
        if !present.insert(block.day_num) {
            skipped_days.push(block.day_num);
            continue;
        }
        applied_days.push(block.day_num);
        insert_sorted(&mut blocks, block);
    }

    if applied_days.is_empty() {
        return Merged {
            skipped_days,
            ..Merged::unchanged(existing)
        };
    }

    debug!(
        target: "itinerary::merge",
        applied = ?applied_days,
        skipped = ?skipped_days,
        "merged continuation"
    );

    Merged {
        content: assemble(markdown::preamble(existing), &blocks),
        applied_days,
        skipped_days,
    }
}

/// Replace (or insert) exactly the requested days with their repaired blocks
///
/// A repaired block is only used when it carries real content.
pub fn merge_repair(existing: &str, incoming: &str, requested_days: &[u32]) -> Merged {
    let incoming_blocks = dedup(owned_blocks(incoming));
    if incoming_blocks.is_empty() {
        debug!(target: "itinerary::merge", "repair had no day headers, ignoring");
        return Merged::unchanged(existing);
    }

    let mut blocks = dedup(owned_blocks(existing));
    let mut applied_days = Vec::new();
    let mut skipped_days = Vec::new();

    for block in incoming_blocks {
        if !requested_days.contains(&block.day_num)
            || block.text.trim().chars().count() <= MIN_DAY_CHARS
        {
            skipped_days.push(block.day_num);
            continue;
        }

        applied_days.push(block.day_num);
        match blocks
            .iter_mut()
            .find(|existing| existing.day_num == block.day_num)
        {
            Some(existing) => existing.text = block.text,
            None => insert_sorted(&mut blocks, block),
        }
    }

    if applied_days.is_empty() {
        return Merged {
            skipped_days,
            ..Merged::unchanged(existing)
        };
    }

    debug!(
        target: "itinerary::merge",
        applied = ?applied_days,
        skipped = ?skipped_days,
        "merged repair"
    );

    Merged {
        content: assemble(markdown::preamble(existing), &blocks),
        applied_days,
        skipped_days,
    }
}

/// Patch content shorter than this is ignored
const MIN_PATCH_CHARS: usize = 10;

/// Fold patch content into existing days without ever adding a day
///
/// Headerless patch text is appended to `fallback_day` (or the last day).
/// Patch blocks with day headers contribute their bodies to the matching
/// existing day; blocks for unknown days are dropped.
pub fn merge_patch(existing: &str, patch: &str, fallback_day: Option<u32>) -> Merged {
    let patch = patch.trim();
    if patch.chars().count() < MIN_PATCH_CHARS {
        return Merged::unchanged(existing);
    }

    let mut blocks = dedup(owned_blocks(existing));
    if blocks.is_empty() {
        return Merged::unchanged(existing);
    }

    let patch_blocks = owned_blocks(patch);
    let mut applied_days = Vec::new();
    let mut skipped_days = Vec::new();

    if patch_blocks.is_empty() {
        let day_num = fallback_day
            .filter(|day| blocks.iter().any(|block| block.day_num == *day))
            .unwrap_or_else(|| blocks.iter().map(|block| block.day_num).max().unwrap_or(0));
        if let Some(block) = blocks.iter_mut().find(|block| block.day_num == day_num) {
            block.text = format!("{}\n\n{}", block.text.trim_end(), patch);
            applied_days.push(day_num);
        }
    } else {
        for incoming in patch_blocks {
            let body = incoming
                .text
                .split_once('\n')
                .map(|(_, body)| body.trim())
                .unwrap_or_default();
            let target = blocks.iter_mut().find(|block| block.day_num == incoming.day_num);
            match target {
                Some(block) if !body.is_empty() => {
                    block.text = format!("{}\n\n{}", block.text.trim_end(), body);
                    applied_days.push(incoming.day_num);
                }
                _ => skipped_days.push(incoming.day_num),
            }
        }
    }

    if applied_days.is_empty() {
        return Merged {
            skipped_days,
            ..Merged::unchanged(existing)
        };
    }

    debug!(
        target: "itinerary::merge",
        applied = ?applied_days,
        skipped = ?skipped_days,
        "merged patch"
    );

    Merged {
        content: assemble(markdown::preamble(existing), &blocks),
        applied_days,
        skipped_days,
    }
}

/// Keep the preamble and the first `target_days` blocks numbered within the target
pub fn truncate_to_target(text: &str, target_days: u32) -> String {
    let blocks: Vec<OwnedBlock> = dedup(owned_blocks(text))
        .into_iter()
        .filter(|block| block.day_num <= target_days)
        .take(target_days as usize)
        .collect();
    assemble(markdown::preamble(text), &blocks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(day_num: u32, place: &str) -> String {
        format!(
            "# Day {day_num} ({place})\n\n## Itinerary\n\n* Morning: **{place} Museum** and a long walk\n"
        )
    }

    #[test]
    fn continuation_appends_only_new_days() {
        let existing = format!("{}\n{}", day(1, "Lyon"), day(2, "Paris"));
        let incoming = format!("{}\n{}", day(2, "Nice"), day(3, "Nice"));

        let merged = merge_continuation(&existing, &incoming);
        assert_eq!(merged.applied_days, vec![3]);
        assert_eq!(merged.skipped_days, vec![2]);
        assert_eq!(markdown::day_numbers(&merged.content), vec![1, 2, 3]);
        assert!(merged.content.contains("# Day 2 (Paris)"));
        assert!(!merged.content.contains("# Day 2 (Nice)"));
    }

    #[test]
    fn continuation_fills_gaps_in_order() {
        let existing = format!("{}\n{}", day(1, "Lyon"), day(3, "Nice"));
        let merged = merge_continuation(&existing, &day(2, "Dijon"));
        assert_eq!(markdown::day_numbers(&merged.content), vec![1, 2, 3]);
    }

    #[test]
    fn headerless_continuation_is_a_noop() {
        let existing = day(1, "Lyon");
        let merged = merge_continuation(&existing, "Sorry, I cannot continue.");
        assert!(merged.is_noop());
        assert_eq!(merged.content, existing);
    }

    #[test]
    fn repair_replaces_only_requested_days() {
        let existing = format!("# Day 1 (Lyon)\n\nshort\n\n{}", day(2, "Paris"));
        let incoming = format!("{}\n{}", day(1, "Lyon"), day(2, "Nice"));

        let merged = merge_repair(&existing, &incoming, &[1]);
        assert_eq!(merged.applied_days, vec![1]);
        assert!(merged.content.contains("**Lyon Museum**"));
        assert!(merged.content.contains("# Day 2 (Paris)"));
        assert_eq!(markdown::day_numbers(&merged.content), vec![1, 2]);
    }

    #[test]
    fn repair_ignores_thin_blocks() {
        let existing = day(1, "Lyon");
        let merged = merge_repair(&existing, "# Day 1 (Lyon)\n\nok", &[1]);
        assert!(merged.is_noop());
        assert_eq!(merged.content, existing);
    }

    #[test]
    fn headerless_patch_extends_the_fallback_day() {
        let existing = format!("{}\n{}", day(1, "Lyon"), day(2, "Paris"));
        let merged = merge_patch(&existing, "## Tips\n\nBook museum tickets online", Some(2));
        assert_eq!(merged.applied_days, vec![2]);
        assert_eq!(markdown::day_numbers(&merged.content), vec![1, 2]);
        assert!(merged.content.trim_end().ends_with("Book museum tickets online"));
    }

    #[test]
    fn patch_never_adds_days() {
        let existing = day(1, "Lyon");
        let patch = "# Day 1 (Lyon)\n\n## Meals\n\n* Dinner: bouchon\n\n# Day 2 (Paris)\n\n## Meals\n\n* Lunch: crepes";
        let merged = merge_patch(&existing, patch, None);
        assert_eq!(merged.applied_days, vec![1]);
        assert_eq!(merged.skipped_days, vec![2]);
        assert_eq!(markdown::day_numbers(&merged.content), vec![1]);
        assert!(merged.content.contains("* Dinner: bouchon"));
        assert!(!merged.content.contains("crepes"));
    }

    #[test]
    fn tiny_patch_is_ignored() {
        let existing = day(1, "Lyon");
        assert!(merge_patch(&existing, "ok", None).is_noop());
    }

    #[test]
    fn truncation_keeps_first_target_days() {
        let text = format!(
            "Overview\n\n{}",
            (1..=6).map(|n| day(n, "Rome")).collect::<Vec<_>>().join("\n")
        );
        let truncated = truncate_to_target(&text, 3);
        assert!(truncated.starts_with("Overview"));
        assert_eq!(markdown::day_numbers(&truncated), vec![1, 2, 3]);
    }

    #[test]
    fn truncation_drops_out_of_range_and_duplicate_days() {
        let text = [day(1, "A"), day(5, "B"), day(1, "C"), day(2, "D")].join("\n");
        let truncated = truncate_to_target(&text, 2);
        assert_eq!(markdown::day_numbers(&truncated), vec![1, 2]);
        assert!(truncated.contains("(A)"));
        assert!(!truncated.contains("(C)"));
    }
}
