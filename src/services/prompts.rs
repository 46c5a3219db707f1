use crate::itinerary::analysis::{style_features, ContentAnalysis, StyleFeatures};
use crate::itinerary::markdown;
use crate::types::report::ValidationReport;
use crate::types::request::{DayAdjustment, ItineraryRequest};

/// Lines of the existing itinerary quoted back when asking for more days
const CONTINUATION_CONTEXT_LINES: usize = 10;
/// Characters quoted back when resuming a partial draft
const RESUME_CONTEXT_CHARS: usize = 300;
/// Characters quoted back when patching the last day of a draft
const PATCH_CONTEXT_CHARS: usize = 500;

const DAY_TEMPLATE: &str = "\
## Itinerary

* Morning: detailed activities with transport (wrap every attraction name in bold, e.g. **Attraction Name**)
* Afternoon: detailed activities with transport (wrap every attraction name in bold, e.g. **Attraction Name**)
* Evening: detailed activities (wrap every attraction name in bold, e.g. **Attraction Name**)

## Meals

* Breakfast: restaurant name and signature dish
* Lunch: restaurant name and signature dish
* Dinner: restaurant name and signature dish

## Lodging

* Hotel or guesthouse name, location, price range, notable facilities

## Tips

Practical advice such as clothing, transport and local etiquette";

const BOLD_REMINDER: &str = "Wrap EVERY attraction name in markdown bold, e.g. **Statue of Liberty**, **Louvre Museum**, **Eiffel Tower**, in every part of every day.";

fn day_template(label: &str) -> String {
    format!("# Day {label} (Place Name)\n\n{DAY_TEMPLATE}")
}

fn style_hints(style: StyleFeatures) -> String {
    format!(
        "Keep the same level of detail as the existing itinerary ({}).\nFocus: {}.",
        style.detail_level, style.special_focus
    )
}

fn join_days(days: &[u32]) -> String {
    days.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Initial generation prompt for a validated request
pub fn build_itinerary_prompt(request: &ItineraryRequest) -> String {
    let target = request.target_days();
    let range = request.day_range();

    let mut prompt = format!(
        "Plan a {target}-day travel itinerary for {}.",
        request.country()
    );

    if let Some(region) = request.region() {
        prompt.push_str(&format!(" Focus on the {region} region."));
    }
    if let Some(date) = request.departure_date() {
        prompt.push_str(&format!(" Departure date: {}.", date.format("%Y-%m-%d")));
    }
    if let Some(travel_type) = request.travel_type() {
        prompt.push_str(&format!(" This is {}.", travel_type.description()));
    }
    if let Some(requirements) = request.special_requirements() {
        prompt.push_str(&format!("\n\nSpecial requirements: {requirements}"));
    }
    match request.day_adjustment() {
        Some(DayAdjustment::MinusOne) => prompt.push_str(&format!(
            "\n\nThe traveller asked for one day less, so the itinerary must have exactly {target} days."
        )),
        Some(DayAdjustment::PlusOne) => prompt.push_str(&format!(
            "\n\nThe traveller asked for one extra day, so the itinerary must have exactly {target} days."
        )),
        None => {}
    }

    prompt.push_str(&format!(
        "\n\nUse exactly the following markdown format for every day from Day 1 to Day {target}. You must produce exactly {target} days:\n\n{}\n\n{}\n\n",
        day_template("1"),
        day_template("2"),
    ));

    prompt.push_str(&format!(
        "Formatting rules (follow strictly):
1. Produce exactly {target} complete days, numbered from 1 to {target} without gaps.
2. Every day must contain all four subsections, each with real content: ## Itinerary, ## Meals, ## Lodging, ## Tips.
3. Day headers use `# Day N (Place Name)`; subsections use `## Title`.
4. Put every header on its own line and leave a blank line after it.
5. Never omit a subsection, even when the content is similar to another day.
6. Do not write placeholder days such as \"# Day N (to be continued)\".
7. {BOLD_REMINDER}
8. Fewer or more than {target} days does not meet the requirement.

Note: the requested range is {range} days, but {target} days is the exact target. If fewer days are produced you will be asked to continue; extra days will be cut off."
    ));

    prompt
}

/// Ask for exactly the missing days, quoting the end of the current text
pub fn build_continuation_prompt(
    request: &ItineraryRequest,
    content: &str,
    actual_days: u32,
    missing_days: &[u32],
) -> String {
    let target = request.target_days();
    let country = request.country();
    let missing = join_days(missing_days);

    format!(
        "Below is a {target}-day travel itinerary for {country} (requested range: {range} days). Only days 1 to {actual_days} are complete so far.

Last part of the existing itinerary:
{context}

Write the complete content for these days, in order: Day {missing}.
Use exactly this format for every day:

{template}

Requirements:
1. Output only days {missing}, so that the itinerary reaches {target} days.
2. Do not repeat any day that already exists and add no introduction.
3. Keep the format, tone and level of detail of the existing days.
4. {BOLD_REMINDER}

{style}",
        range = request.day_range(),
        context = markdown::tail_lines(content, CONTINUATION_CONTEXT_LINES),
        template = day_template("X"),
        style = style_hints(style_features(content)),
    )
}

/// Ask for complete rewrites of the listed days only
pub fn build_repair_prompt(
    request: &ItineraryRequest,
    content: &str,
    report: &ValidationReport,
    days: &[u32],
) -> String {
    let mut prompt = format!(
        "Below is a {}-day travel itinerary for {} in which some days need to be fixed.\n\n",
        request.target_days(),
        request.country()
    );

    for day_num in days {
        prompt.push_str(&format!("Problems on day {day_num}:\n"));
        match report.day(*day_num) {
            Some(day) => {
                if !day.missing_subheaders.is_empty() {
                    let missing = day
                        .missing_subheaders
                        .iter()
                        .map(|section| section.heading())
                        .collect::<Vec<_>>()
                        .join(", ");
                    prompt.push_str(&format!("- missing subsections: {missing}\n"));
                }
                if !day.content_issues.is_empty() {
                    prompt.push_str(&format!("- content issues: {}\n", day.content_issues.join(", ")));
                }
            }
            None => prompt.push_str("- the day is missing\n"),
        }
    }

    prompt.push_str("\nOriginal content:\n\n");
    for day_num in days {
        if let Some(block) = markdown::find_day_block(content, *day_num) {
            prompt.push_str(block.trim_end());
            prompt.push_str("\n\n");
        }
    }

    prompt.push_str(&format!(
        "Rewrite days {} completely, fixing the problems above. Each rewritten day must follow this structure:\n\n{}\n\nRequirements:\n1. Only output these {} days; do not output or change any other day.\n2. {BOLD_REMINDER}\n\n{}",
        join_days(days),
        day_template("X"),
        days.len(),
        style_hints(style_features(content)),
    ));

    prompt
}

/// Continue a partial draft up to `target_days`, or regenerate it when it has no days
pub fn build_resume_prompt(
    country: &str,
    content: &str,
    target_days: u32,
    analysis: &ContentAnalysis,
) -> String {
    if analysis.current_days == 0 {
        return format!(
            "Plan a {target_days}-day travel itinerary for {country}.\n\nUse exactly this format for every day from Day 1 to Day {target_days}:\n\n{}\n\nRequirements:\n1. Output the itinerary only, with no introduction.\n2. {BOLD_REMINDER}",
            day_template("X"),
        );
    }

    let next_day = analysis.current_days + 1;
    let final_day = target_days.max(next_day);
    let missing_structures = if analysis.missing_structures.is_empty() {
        "none".to_string()
    } else {
        analysis
            .missing_structures
            .iter()
            .map(|section| section.heading())
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "Below are days 1 to {current} of a travel itinerary for {country}. Continue it with days {next_day} to {final_day}.

Current state:
- days written: {current}
- target length: {final_day} days
- missing subsections: {missing_structures}

Requirements:
1. Start directly with Day {next_day}.
2. No introduction, confirmation or pleasantries.
3. Day headers use `# Day N (Place Name)`.
4. Every day contains ## Itinerary, ## Meals, ## Lodging and ## Tips.
5. Stay consistent with the existing days.
6. {BOLD_REMINDER}

End of the existing itinerary:
{context}

Start writing Day {next_day} now:",
        current = analysis.current_days,
        context = markdown::tail_chars(content, RESUME_CONTEXT_CHARS),
    )
}

/// Ask only for the missing structures of a draft that already has enough days
pub fn build_patch_prompt(country: &str, content: &str, analysis: &ContentAnalysis) -> String {
    let missing = analysis
        .missing_structures
        .iter()
        .map(|section| section.heading())
        .collect::<Vec<_>>()
        .join(", ");

    if !analysis.last_day_complete {
        return format!(
            "Complete the missing subsections of day {day} of this travel itinerary for {country}.

The last day is missing: {missing}

Requirements:
1. Output only the missing subsections of day {day}.
2. Use `## Title` headers.
3. No introduction or explanation, and do not repeat existing content.
4. {BOLD_REMINDER}

End of the existing itinerary:
{context}

Output the missing subsections now:",
            day = analysis.current_days,
            missing = if missing.is_empty() { "unknown sections".to_string() } else { missing },
            context = markdown::tail_chars(content, PATCH_CONTEXT_CHARS),
        );
    }

    format!(
        "Add the missing subsections ({missing}) to this {days}-day travel itinerary for {country}.

Requirements:
1. Only output the missing content, grouped under `# Day N (Place Name)` headers for the days that need it.
2. Use `## Title` headers for subsections.
3. No introduction or explanation.
4. {BOLD_REMINDER}

Full itinerary:
{content}",
        days = analysis.current_days,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::itinerary::analysis::analyze;
    use crate::itinerary::validator::validate;
    use chrono::NaiveDate;

    fn request(days: &str, requirements: Option<&str>) -> ItineraryRequest {
        let mut builder = ItineraryRequest::builder("Japan", days)
            .with_region("Kansai")
            .with_travel_type("culture")
            .with_departure_date("2026-06-01");
        if let Some(requirements) = requirements {
            builder = builder.with_special_requirements(requirements);
        }
        builder
            .build_as_of(NaiveDate::from_ymd_opt(2026, 5, 1).unwrap())
            .unwrap()
    }

    #[test]
    fn itinerary_prompt_states_exact_target() {
        let prompt = build_itinerary_prompt(&request("3-5", None));
        assert!(prompt.starts_with("Plan a 4-day travel itinerary for Japan."));
        assert!(prompt.contains("Kansai region"));
        assert!(prompt.contains("Departure date: 2026-06-01"));
        assert!(prompt.contains("a cultural experience trip"));
        assert!(prompt.contains("# Day 1 (Place Name)"));
        assert!(prompt.contains("# Day 2 (Place Name)"));
        assert!(prompt.contains("requested range is 3-5 days"));
        assert_eq!(prompt, build_itinerary_prompt(&request("3-5", None)));
    }

    #[test]
    fn itinerary_prompt_mentions_adjustment() {
        let prompt = build_itinerary_prompt(&request("4", Some("add one day in Kyoto")));
        assert!(prompt.contains("one extra day"));
        assert!(prompt.contains("exactly 5 days"));
    }

    #[test]
    fn continuation_prompt_lists_missing_days() {
        let content = "# Day 1 (Kyoto)\n\n## Itinerary\n\n* Morning: **Kiyomizu-dera**\n";
        let prompt = build_continuation_prompt(&request("3", None), content, 1, &[2, 3]);
        assert!(prompt.contains("Day 2, 3"));
        assert!(prompt.contains("* Morning: **Kiyomizu-dera**"));
        assert!(prompt.contains("Only days 1 to 1"));
    }

    #[test]
    fn repair_prompt_quotes_only_requested_days() {
        let content = "# Day 1 (Kyoto)\n\nshort\n\n# Day 2 (Nara)\n\n## Itinerary\n\n* Morning: deer park and **Todai-ji** temple\n";
        let report = validate(content, 2);
        let prompt = build_repair_prompt(&request("2", None), content, &report, &[1]);
        assert!(prompt.contains("Problems on day 1"));
        assert!(prompt.contains("content too short"));
        assert!(prompt.contains("# Day 1 (Kyoto)"));
        assert!(!prompt.contains("# Day 2 (Nara)"));
    }

    #[test]
    fn resume_prompt_regenerates_empty_drafts() {
        let analysis = analyze("");
        let prompt = build_resume_prompt("Peru", "", 4, &analysis);
        assert!(prompt.starts_with("Plan a 4-day travel itinerary for Peru."));
    }
}
