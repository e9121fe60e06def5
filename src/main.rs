// Hyetogen CLI - generates design-storm hyetographs from a TOML run file
use std::error::Error;
use std::time::Duration;
use std::{env, process};

use hyetogen_service::classify::classify;
use hyetogen_service::config::{EnvOverrides, OutputFormat, RunConfig};
use hyetogen_service::distributions::DistributionRegistry;
use hyetogen_service::generator::generate;
use hyetogen_service::ingest::atlas14::{Atlas14Client, CsvFileSource, FrequencySource, PrecipFrequencyTable};
use hyetogen_service::logging::{self, Component, LogLevel};
use hyetogen_service::planner::plan;
use hyetogen_service::verify::{VerificationStatus, print_summary, verify_registry};

const FETCH_TIMEOUT_SECS: u64 = 30;

const USAGE: &str = "\
Usage:
  hyetogen_service generate <run.toml>
  hyetogen_service classify <depth_60min> <depth_24h>
  hyetogen_service fetch <latitude> <longitude>
  hyetogen_service verify
  hyetogen_service list";

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args[1] == "--help" {
        println!("{}", USAGE);
        process::exit(0);
    }

    let env_overrides = EnvOverrides::load();

    let result = match args[1].as_str() {
        "generate" => match args.get(2) {
            Some(path) => run_generate(path, &env_overrides),
            None => Err("generate needs a run file".into()),
        },
        "classify" => run_classify(&args[2..], &env_overrides),
        "fetch" => run_fetch(&args[2..], &env_overrides),
        "verify" => run_verify(&env_overrides),
        "list" => {
            run_list();
            Ok(())
        }
        other => Err(format!("unknown command '{}'\n{}", other, USAGE).into()),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn init_logging(level: LogLevel, file: Option<&str>, timestamps: bool, env_overrides: &EnvOverrides) {
    let level = env_overrides.log_level.unwrap_or(level);
    logging::init_logger(level, file, timestamps);
}

fn parse_f64(value: Option<&String>, name: &str) -> Result<f64, Box<dyn Error>> {
    let raw = value.ok_or_else(|| format!("missing {}", name))?;
    raw.parse::<f64>()
        .map_err(|e| format!("{} '{}': {}", name, raw, e).into())
}

fn fetch_table(
    latitude: f64,
    longitude: f64,
    csv: Option<&str>,
    env_overrides: &EnvOverrides,
) -> Result<PrecipFrequencyTable, Box<dyn Error>> {
    let table = match csv {
        Some(path) => CsvFileSource::new(path).fetch(latitude, longitude)?,
        None => {
            let client = Atlas14Client::new(&env_overrides.base_url, Duration::from_secs(FETCH_TIMEOUT_SECS))?;
            client.fetch(latitude, longitude)?
        }
    };
    Ok(table)
}

fn run_generate(path: &str, env_overrides: &EnvOverrides) -> Result<(), Box<dyn Error>> {
    let config = RunConfig::load(path)?;
    init_logging(
        config.log_level()?,
        config.logging.file.as_deref(),
        config.logging.timestamps,
        env_overrides,
    );

    let registry = DistributionRegistry::standard();

    let site_table = match &config.site {
        Some(site) => Some(fetch_table(site.latitude, site.longitude, site.csv.as_deref(), env_overrides)?),
        None => None,
    };

    let storm_plan = plan(&config, site_table.as_ref())?;
    if let Some(c) = &storm_plan.classification {
        logging::info(
            Component::Classifier,
            None,
            &format!(
                "{}-yr ratio {:.3} ({:.2} / {:.2} in) → {} / {}",
                config.storm.return_period, c.ratio, c.depth_60min, c.depth_24h, c.storm_type, c.family
            ),
        );
    }

    let hyetograph = generate(&registry, storm_plan.depth_in, &storm_plan.selection)?;
    logging::info(
        Component::Generator,
        Some(&hyetograph.distribution),
        &format!("{:.2} in over 24 h, {} steps", hyetograph.total(), hyetograph.rows.len()),
    );

    match config.output.format {
        OutputFormat::Tsv => print!("{}", hyetograph.to_tsv(config.output.millimeters)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&hyetograph)?),
    }
    Ok(())
}

fn run_classify(args: &[String], env_overrides: &EnvOverrides) -> Result<(), Box<dyn Error>> {
    init_logging(LogLevel::Info, None, false, env_overrides);
    let d60 = parse_f64(args.first(), "depth_60min")?;
    let d24 = parse_f64(args.get(1), "depth_24h")?;
    let c = classify(d60, d24);
    println!("Ratio: {:.3}", c.ratio);
    println!("Storm type: {}", c.storm_type);
    println!("Distribution: {}", c.family);
    Ok(())
}

fn run_fetch(args: &[String], env_overrides: &EnvOverrides) -> Result<(), Box<dyn Error>> {
    init_logging(LogLevel::Info, None, false, env_overrides);
    let latitude = parse_f64(args.first(), "latitude")?;
    let longitude = parse_f64(args.get(1), "longitude")?;
    let table = fetch_table(latitude, longitude, None, env_overrides)?;
    print!("{}", table.to_tsv());
    Ok(())
}

fn run_verify(env_overrides: &EnvOverrides) -> Result<(), Box<dyn Error>> {
    init_logging(LogLevel::Warning, None, false, env_overrides);
    let registry = DistributionRegistry::standard();
    let report = verify_registry(&registry);
    print_summary(&report);
    if report.results.iter().any(|r| r.status == VerificationStatus::Failed) {
        return Err(format!("{} distribution(s) failed verification", report.summary.failed).into());
    }
    Ok(())
}

fn run_list() {
    let registry = DistributionRegistry::standard();
    for family in registry.families() {
        println!("{:<10} {}", family.key, family.label);
    }
    println!("{:<10} {}", "custom", hyetogen_service::distributions::CUSTOM_LABEL);
}
