use tiny_itinerary_rs::itinerary::markdown;
use tiny_itinerary_rs::{
    attractions_for_day, extract_attractions, merge_continuation, truncate_to_target, validate,
    BoldingLexicon, ContentNormalizer, StructureValidator,
};

fn perfect_day(day_num: u32) -> String {
    format!(
        "# Day {day_num} (Kyoto)

## Itinerary

* Morning: Visit **Fushimi Inari Shrine** early to avoid crowds
* Afternoon: Walk through **Arashiyama Bamboo Grove**

## Meals

* Lunch: Yudofu set near the temple
* Dinner: Kaiseki in Pontocho

## Lodging

* Machiya guesthouse in Higashiyama

## Tips

Buy a bus day pass and carry small change.
"
    )
}

fn perfect_itinerary(days: u32) -> String {
    (1..=days).map(perfect_day).collect::<Vec<_>>().join("\n")
}

#[test]
fn perfect_itineraries_validate_for_every_supported_length() {
    let validator = StructureValidator::new();
    for target in 1..=30 {
        let report = validator.validate(&perfect_itinerary(target), target);
        assert!(report.is_valid, "target {target}: {:?}", report.errors);
        assert_eq!(report.actual_days, target);
        assert!(report.day_details.iter().all(|day| day.is_complete()));
    }
}

#[test]
fn nineteen_of_twenty_days_is_within_tolerance() {
    let report = validate(&perfect_itinerary(19), 20);
    assert!(report.is_valid);
    assert_eq!(report.shortfall(), 1);
}

#[test]
fn normalizing_twice_changes_nothing() {
    let raw = format!(
        "```markdown\nSure! Here is your plan.\n\n{}\n# Day 4 (\n```",
        perfect_itinerary(3).replace("**Arashiyama Bamboo Grove**", "Arashiyama Bamboo Grove")
    );
    let normalizer = ContentNormalizer::new();

    let once = normalizer.normalize(&raw);
    let twice = normalizer.normalize(&once.content);

    assert_eq!(once.content, twice.content);
    assert!(twice.warning.is_none());
    assert!(once.content.starts_with("# Day 1 (Kyoto)"));
    assert!(!once.content.contains("# Day 4"));
    assert!(!once.content.contains("****"));
    assert_eq!(once.content.matches("**Arashiyama Bamboo Grove**").count(), 3);
}

#[test]
fn oversized_content_is_cut_at_a_day_boundary() {
    let normalizer = ContentNormalizer::new().with_max_chars(1_000);
    let normalized = normalizer.normalize(&perfect_itinerary(6));

    assert_eq!(normalized.warning.as_deref(), Some("content truncated"));
    assert!(normalized.content.chars().count() <= 1_000);
    let days = markdown::day_numbers(&normalized.content);
    assert!(!days.is_empty());
    assert!(normalized.content.trim_end().ends_with("carry small change."));
}

#[test]
fn continuation_merge_never_duplicates_days() {
    let base = perfect_itinerary(3);
    let incoming = format!(
        "# Day 3 (Osaka)\n\n## Itinerary\n\n* Morning: Visit **Osaka Castle**\n\n{}\n{}",
        perfect_day(4),
        perfect_day(5)
    );

    let merged = merge_continuation(&base, &incoming);

    assert_eq!(markdown::day_numbers(&merged.content), vec![1, 2, 3, 4, 5]);
    assert_eq!(merged.content.matches("# Day 3").count(), 1);
    assert!(!merged.content.contains("Osaka Castle"));
    assert_eq!(merged.applied_days, vec![4, 5]);
}

#[test]
fn truncation_keeps_the_leading_days_in_order() {
    let text = perfect_itinerary(8);
    let truncated = truncate_to_target(&text, 5);

    assert_eq!(markdown::day_numbers(&truncated), vec![1, 2, 3, 4, 5]);
    assert_eq!(validate(&truncated, 5).actual_days, 5);
}

#[test]
fn attraction_with_alternate_name_absorbs_its_fragment() {
    let attractions = extract_attractions("* **Eiffel Tower** (Eiffel Tower)\n* Then **Eiffel Tower** again", 2);
    assert_eq!(attractions.len(), 1);
    assert_eq!(attractions[0].name, "Eiffel Tower (Eiffel Tower)");
    assert_eq!(attractions[0].id, "day2_attr1");
}

#[test]
fn stoplisted_spans_fall_back_to_placeholders() {
    let attractions = extract_attractions("**Morning** coffee, then **Depart** for the airport", 4);
    let ids: Vec<&str> = attractions.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["day4_default1", "day4_default2"]);
    assert!(attractions.iter().all(|a| a.is_placeholder()));
}

#[test]
fn attractions_come_from_the_requested_day_only() {
    let text = perfect_itinerary(2).replacen("Fushimi Inari Shrine", "Kiyomizu-dera", 1);

    let day_one = attractions_for_day(&text, 1);
    let day_two = attractions_for_day(&text, 2);

    assert_eq!(day_one[0].name, "Kiyomizu-dera");
    assert_eq!(day_two[0].name, "Fushimi Inari Shrine");
    assert!(attractions_for_day(&text, 9).is_empty());
}

#[test]
fn custom_lexicon_bolds_configured_names() {
    let lexicon = BoldingLexicon::new(&["Hobbiton Movie Set"], &["Rotorua"], &["Lake"]).unwrap();
    let normalizer = ContentNormalizer::new().with_lexicon(lexicon);

    let normalized = normalizer.normalize(
        "# Day 1 (Matamata)\n\n## Itinerary\n\n* Morning: tour the Hobbiton Movie Set\n* Afternoon: drive to Rotorua Lake\n",
    );

    assert!(normalized.content.contains("**Hobbiton Movie Set**"));
    assert!(normalized.content.contains("**Rotorua Lake**"));
}

#[test]
fn normalized_alternate_names_reach_the_extractor_intact() {
    let raw = "# Day 1 (Paris)

## Itinerary

* Morning: **Eiffel Tower** (Eiffel Tower) with a long river walk
* Afternoon: **Louvre** (Louvre Museum) and the Tuileries
* Evening: back at the **Eiffel Tower** for the lights

## Meals

* Dinner: Bistro near Saint-Germain

## Lodging

* Boutique hotel in the Marais

## Tips

Buy a museum pass before arriving.
";
    let normalized = ContentNormalizer::new().normalize(raw);

    assert!(normalized.content.contains("**Eiffel Tower** (Eiffel Tower)"));
    assert!(normalized.content.contains("**Louvre** (Louvre Museum)"));

    let names: Vec<String> = attractions_for_day(&normalized.content, 1)
        .into_iter()
        .map(|attraction| attraction.name)
        .collect();
    assert_eq!(names, vec!["Eiffel Tower (Eiffel Tower)", "Louvre (Louvre Museum)"]);
}
