use crate::{
    generators::OpenAiGenerator,
    itinerary::{attractions_for_day, ContentNormalizer, StructureValidator},
    ItineraryPipeline, ItineraryRequest, PipelineConfig,
};
use anyhow::{anyhow, Context};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::env;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tracing::{error, info};

fn input_arg() -> Arg {
    Arg::new("input")
        .short('i')
        .long("input")
        .value_name("FILE")
        .help("Itinerary markdown file, or - for stdin")
        .default_value("-")
}

fn generator_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("MODEL")
                .help("Model to use (or set ITINERARY_MODEL)"),
        )
        .arg(
            Arg::new("api-key")
                .short('k')
                .long("api-key")
                .value_name("KEY")
                .help("API key (or set OPENAI_API_KEY env var)"),
        )
        .arg(
            Arg::new("base-url")
                .short('u')
                .long("base-url")
                .value_name("URL")
                .help("API base URL (or set OPENAI_BASE_URL / OPENROUTER_BASE_URL env vars)"),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .value_name("SECONDS")
                .help("Request timeout in seconds")
                .default_value("120"),
        )
}

fn command() -> Command {
    Command::new("tiny-itinerary")
        .version("0.1.0")
        .about("Generate, validate and repair travel itineraries")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(generator_args(
            Command::new("generate")
                .about("Generate a complete itinerary")
                .arg(Arg::new("country").help("Destination country").required(true).index(1))
                .arg(
                    Arg::new("days")
                        .short('d')
                        .long("days")
                        .value_name("DAYS")
                        .help("Trip length: 5, 3-5 or 7+")
                        .default_value("3"),
                )
                .arg(
                    Arg::new("travel-type")
                        .long("travel-type")
                        .value_name("TYPE")
                        .help("family, honeymoon, adventure, culture or food"),
                )
                .arg(
                    Arg::new("requirements")
                        .short('r')
                        .long("requirements")
                        .value_name("TEXT")
                        .help("Special requirements"),
                )
                .arg(Arg::new("region").long("region").value_name("REGION"))
                .arg(
                    Arg::new("departure")
                        .long("departure")
                        .value_name("YYYY-MM-DD")
                        .help("Departure date"),
                )
                .arg(
                    Arg::new("max-attempts")
                        .long("max-attempts")
                        .value_name("COUNT")
                        .help("Maximum repair attempts (default 3, or ITINERARY_MAX_ATTEMPTS)"),
                )
                .arg(
                    Arg::new("replay")
                        .long("replay")
                        .action(ArgAction::SetTrue)
                        .help("Print the generation trace instead of the itinerary"),
                ),
        ))
        .subcommand(generator_args(
            Command::new("continue")
                .about("Continue or patch a partial itinerary")
                .arg(Arg::new("country").help("Destination country").required(true).index(1))
                .arg(
                    Arg::new("days")
                        .short('d')
                        .long("days")
                        .value_name("DAYS")
                        .help("Requested trip length; defaults to two more days"),
                )
                .arg(input_arg()),
        ))
        .subcommand(
            Command::new("validate")
                .about("Normalize and validate an itinerary, printing the report as JSON")
                .arg(
                    Arg::new("days")
                        .short('d')
                        .long("days")
                        .value_name("COUNT")
                        .help("Target day count")
                        .required(true),
                )
                .arg(input_arg())
                .arg(
                    Arg::new("raw")
                        .long("raw")
                        .action(ArgAction::SetTrue)
                        .help("Validate the text as-is, without normalizing"),
                ),
        )
        .subcommand(
            Command::new("attractions")
                .about("Extract the attractions of one day as JSON")
                .arg(
                    Arg::new("day")
                        .long("day")
                        .value_name("N")
                        .help("Day number")
                        .required(true),
                )
                .arg(input_arg()),
        )
}

async fn read_input(matches: &ArgMatches) -> anyhow::Result<String> {
    let path = matches
        .get_one::<String>("input")
        .map(String::as_str)
        .unwrap_or("-");
    if path == "-" {
        let mut text = String::new();
        tokio::io::stdin().read_to_string(&mut text).await?;
        return Ok(text);
    }
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path))
}

fn parse_number<T: std::str::FromStr>(matches: &ArgMatches, name: &str) -> anyhow::Result<T> {
    let raw = matches
        .get_one::<String>(name)
        .ok_or_else(|| anyhow!("--{} is required", name))?;
    raw.parse::<T>()
        .map_err(|_| anyhow!("--{} must be a number, got '{}'", name, raw))
}

fn build_generator(matches: &ArgMatches) -> anyhow::Result<OpenAiGenerator> {
    let api_key = matches
        .get_one::<String>("api-key")
        .cloned()
        .or_else(|| env::var("OPENAI_API_KEY").ok())
        .ok_or_else(|| {
            anyhow!("API key is required. Set OPENAI_API_KEY environment variable or use --api-key")
        })?;

    let mut generator = OpenAiGenerator::new(api_key);
    if let Some(base_url) = matches
        .get_one::<String>("base-url")
        .cloned()
        .or_else(|| env::var("OPENAI_BASE_URL").ok())
        .or_else(|| env::var("OPENROUTER_BASE_URL").ok())
    {
        generator = generator.with_base_url(base_url);
    }
    if let Some(model) = matches
        .get_one::<String>("model")
        .cloned()
        .or_else(|| env::var("ITINERARY_MODEL").ok())
    {
        generator = generator.with_model(model);
    }

    let timeout_seconds: u64 = parse_number(matches, "timeout")?;
    Ok(generator.with_timeout(Duration::from_secs(timeout_seconds)))
}

async fn run_generate(matches: &ArgMatches) -> anyhow::Result<()> {
    let country = matches
        .get_one::<String>("country")
        .ok_or_else(|| anyhow!("country is required"))?;
    let days = matches
        .get_one::<String>("days")
        .map(String::as_str)
        .unwrap_or("3");

    let mut builder = ItineraryRequest::builder(country.as_str(), days);
    if let Some(travel_type) = matches.get_one::<String>("travel-type") {
        builder = builder.with_travel_type(travel_type.as_str());
    }
    if let Some(requirements) = matches.get_one::<String>("requirements") {
        builder = builder.with_special_requirements(requirements.as_str());
    }
    if let Some(region) = matches.get_one::<String>("region") {
        builder = builder.with_region(region.as_str());
    }
    if let Some(departure) = matches.get_one::<String>("departure") {
        builder = builder.with_departure_date(departure.as_str());
    }
    let request = builder.build()?;

    let generator = build_generator(matches)?;
    info!("Using model: {}", generator.model());
    info!("Base URL: {}", generator.base_url());

    let mut config = PipelineConfig::from_env()?;
    if matches.contains_id("max-attempts") {
        config = config.with_max_attempts(parse_number(matches, "max-attempts")?);
    }
    let pipeline = ItineraryPipeline::new(generator).with_config(config);

    info!(
        "Generating a {}-day itinerary for {}",
        request.target_days(),
        request.country()
    );
    let outcome = pipeline.generate(&request).await?;

    if matches.get_flag("replay") {
        println!("{}", outcome.replay());
    } else {
        println!("{}", outcome.content);
        for warning in &outcome.warnings {
            eprintln!("warning: {}", warning);
        }
    }
    Ok(())
}

async fn run_continue(matches: &ArgMatches) -> anyhow::Result<()> {
    let country = matches
        .get_one::<String>("country")
        .ok_or_else(|| anyhow!("country is required"))?;
    let draft = read_input(matches).await?;
    let pipeline =
        ItineraryPipeline::new(build_generator(matches)?).with_config(PipelineConfig::from_env()?);

    let outcome = pipeline
        .continue_partial(
            &draft,
            country,
            matches.get_one::<String>("days").map(String::as_str),
        )
        .await?;

    println!("{}", outcome.content);
    if let Some(note) = &outcome.note {
        eprintln!("note: {}", note);
    }
    Ok(())
}

async fn run_validate(matches: &ArgMatches) -> anyhow::Result<()> {
    let target_days: u32 = parse_number(matches, "days")?;
    let mut text = read_input(matches).await?;
    if !matches.get_flag("raw") {
        let normalized = ContentNormalizer::new().normalize(&text);
        if let Some(warning) = normalized.warning {
            eprintln!("warning: {}", warning);
        }
        text = normalized.content;
    }

    let report = StructureValidator::new().validate(&text, target_days);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn run_attractions(matches: &ArgMatches) -> anyhow::Result<()> {
    let day: u32 = parse_number(matches, "day")?;
    let text = read_input(matches).await?;
    let attractions = attractions_for_day(&text, day);
    println!("{}", serde_json::to_string_pretty(&attractions)?);
    Ok(())
}

/// CLI entry point for the tiny-itinerary tool
pub async fn run() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let matches = command().get_matches();
    let result = match matches.subcommand() {
        Some(("generate", sub)) => run_generate(sub).await,
        Some(("continue", sub)) => run_continue(sub).await,
        Some(("validate", sub)) => run_validate(sub).await,
        Some(("attractions", sub)) => run_attractions(sub).await,
        _ => Err(anyhow!("unknown command")),
    };

    if let Err(err) = &result {
        error!("Command failed: {:#}", err);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        command().debug_assert();
    }

    #[test]
    fn parses_validate_arguments() {
        let matches = command()
            .try_get_matches_from(["tiny-itinerary", "validate", "--days", "4", "--raw"])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "validate");
        assert_eq!(parse_number::<u32>(sub, "days").unwrap(), 4);
        assert!(sub.get_flag("raw"));
    }
}
