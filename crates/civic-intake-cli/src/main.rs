//! civic-intake - submit a citizen issue report from a photo on disk
//!
//! Runs one draft through the intake pipeline: EXIF or device location,
//! optional manual pin, classification, gating, and delivery to the
//! report endpoint.

mod config;
mod error;
mod photo;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use civic_intake::{
    Classifier, DeviceLocator, HttpClassifier, HttpSubmitter, IntakeController, IntakeError,
    IntakePhase, LocationResolver, LocationState, NoClassifier, StaticLocator, Urgency,
    ISSUE_TYPE_OPTIONS, SERVICE_BOUNDARY,
};
use clap::{Args, Parser, Subcommand};
use geo_boundary::Coordinate;
use nominatim_client::NominatimClient;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::config::Config;
use crate::error::{CliError, Result};

#[derive(Parser)]
#[command(name = "civic-intake", version, about = "Report a civic issue from a photo")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit a report for a photo
    Submit(SubmitArgs),
    /// List the issue types accepted by --issue-type
    IssueTypes {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct SubmitArgs {
    /// Photo of the issue
    photo: PathBuf,

    /// Current device latitude, used when the photo has no GPS tags
    #[arg(long, requires = "device_lng", allow_hyphen_values = true)]
    device_lat: Option<f64>,
    #[arg(long, requires = "device_lat", allow_hyphen_values = true)]
    device_lng: Option<f64>,

    /// Manual map pin latitude
    #[arg(long, requires = "pin_lng", allow_hyphen_values = true)]
    pin_lat: Option<f64>,
    #[arg(long, requires = "pin_lat", allow_hyphen_values = true)]
    pin_lng: Option<f64>,
    /// Address shown by the map picker for the pin
    #[arg(long, requires = "pin_lat")]
    address: Option<String>,

    /// Issue type key, overrides the automatic classification
    #[arg(long, value_parser = parse_issue_type)]
    issue_type: Option<String>,

    #[arg(long, default_value = "")]
    description: String,

    /// low, medium or high
    #[arg(long, default_value = "medium")]
    urgency: Urgency,

    #[arg(long, default_value = "")]
    contact: String,

    /// Gate and print the payload without sending it
    #[arg(long)]
    dry_run: bool,
}

fn parse_issue_type(key: &str) -> std::result::Result<String, String> {
    match civic_intake::issue_type(key) {
        Some(option) => Ok(option.key.to_string()),
        None => {
            let keys: Vec<&str> = ISSUE_TYPE_OPTIONS.iter().map(|o| o.key).collect();
            Err(format!("unknown issue type (expected one of: {})", keys.join(", ")))
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    init_logging()?;

    match cli.command {
        Command::IssueTypes { json } => {
            print_issue_types(json);
            Ok(ExitCode::SUCCESS)
        }
        Command::Submit(args) => submit(Config::from_env()?, args).await,
    }
}

fn init_logging() -> Result<()> {
    let env_filter = EnvFilter::from_default_env().add_directive("civic_intake=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    };
    Ok(())
}

fn print_issue_types(json: bool) {
    if json {
        match serde_json::to_string_pretty(ISSUE_TYPE_OPTIONS) {
            Ok(out) => println!("{out}"),
            Err(e) => eprintln!("Error: {e}"),
        }
        return;
    }
    for option in ISSUE_TYPE_OPTIONS {
        println!("{:<16} {:<8} {}", option.key, option.category.as_str(), option.label);
    }
}

fn build_controller(config: &Config, args: &SubmitArgs) -> Result<IntakeController> {
    let locator: Arc<dyn DeviceLocator> = match (args.device_lat, args.device_lng) {
        (Some(lat), Some(lng)) => Arc::new(StaticLocator::at(
            Coordinate::new(lat, lng).map_err(IntakeError::from)?,
        )),
        _ => Arc::new(StaticLocator::denied()),
    };

    let classifier: Arc<dyn Classifier> = match &config.classifier_url {
        Some(url) => Arc::new(HttpClassifier::new(url.as_str())),
        None => Arc::new(NoClassifier),
    };

    let submitter = Arc::new(HttpSubmitter::new(config.submission_url.as_str()));
    let resolver = LocationResolver::new(SERVICE_BOUNDARY, locator);
    let controller = IntakeController::new(resolver, classifier, submitter);

    Ok(match &config.nominatim_url {
        Some(url) => {
            let client = match &config.geocoder_user_agent {
                Some(agent) => NominatimClient::with_base_url_and_user_agent(url.as_str(), agent),
                None => NominatimClient::with_base_url(url.as_str()),
            };
            controller.with_geocoder(Arc::new(client))
        }
        None => controller,
    })
}

async fn submit(config: Config, args: SubmitArgs) -> Result<ExitCode> {
    info!(endpoint = %config.submission_url, "Preparing report");

    let mut intake = build_controller(&config, &args)?;
    let image = photo::load_photo(&args.photo).await?;
    intake.capture(image).await;

    match &intake.draft().location {
        LocationState::Resolved(source) => {
            let c = source.coordinate();
            println!("Location: {:.5}, {:.5} ({})", c.lat(), c.lng(), source.kind());
        }
        LocationState::Invalid { reason, .. } => println!("Location: {reason}"),
        LocationState::Unresolved => println!("Location: unknown"),
    }

    if let (Some(lat), Some(lng)) = (args.pin_lat, args.pin_lng) {
        if let Err(e) = intake.pin_location(lat, lng, args.address.clone()) {
            eprintln!("Pin rejected: {e}");
            if let IntakePhase::Error(failure) = intake.phase() {
                eprintln!("Next: {}", failure.next_action());
            }
            return Ok(ExitCode::FAILURE);
        }
        intake.fill_address().await;
    }

    if let Some(key) = &args.issue_type {
        intake.set_manual_issue_type(key);
    }
    intake.set_description(args.description.as_str());
    intake.set_urgency(args.urgency);
    intake.set_contact(args.contact.as_str());

    if args.dry_run {
        return Ok(dry_run(&intake));
    }

    match intake.submit().await {
        Ok(receipt) => {
            println!(
                "Submitted at {}: category {} ({})",
                receipt.submitted_at.to_rfc3339(),
                receipt.category,
                receipt.classification
            );
            if let Some(id) = &receipt.ack.id {
                println!("Report id: {id}");
            }
            if let Some(message) = &receipt.ack.message {
                println!("{message}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(IntakeError::Blocked(blocked)) => {
            eprintln!("Report cannot be submitted yet:");
            for reason in &blocked.reasons {
                eprintln!("  - {reason}");
            }
            Ok(ExitCode::FAILURE)
        }
        Err(IntakeError::Submission(e)) => {
            eprintln!("Submission failed: {e}");
            if let IntakePhase::Error(failure) = intake.phase() {
                eprintln!("Next: {}", failure.next_action());
            }
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(CliError::from(e)),
    }
}

fn dry_run(intake: &IntakeController) -> ExitCode {
    match intake.gate().can_submit(intake.draft()) {
        Ok(verified) => {
            let payload = intake.gate().assemble(&verified);
            println!(
                "image: {} ({}, {} bytes)",
                payload.image.file_name,
                payload.image.mime_type,
                payload.image.bytes.len()
            );
            for (name, value) in payload.text_fields() {
                println!("{name}: {value}");
            }
            ExitCode::SUCCESS
        }
        Err(blocked) => {
            eprintln!("Report cannot be submitted yet:");
            for reason in &blocked.reasons {
                eprintln!("  - {reason}");
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_submit_with_pin() {
        let cli = Cli::try_parse_from([
            "civic-intake",
            "submit",
            "pothole.jpg",
            "--pin-lat",
            "26.47",
            "--pin-lng",
            "87.28",
            "--issue-type",
            "road_damage",
            "--urgency",
            "high",
        ])
        .unwrap();

        let Command::Submit(args) = cli.command else {
            panic!("Expected submit");
        };
        assert_eq!(args.pin_lat, Some(26.47));
        assert_eq!(args.issue_type.as_deref(), Some("road_damage"));
        assert_eq!(args.urgency, Urgency::High);
        assert!(!args.dry_run);
    }

    #[test]
    fn test_unknown_issue_type_rejected() {
        let result = Cli::try_parse_from([
            "civic-intake",
            "submit",
            "photo.jpg",
            "--issue-type",
            "sinkhole",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_pin_requires_both_coordinates() {
        let result = Cli::try_parse_from(["civic-intake", "submit", "photo.jpg", "--pin-lat", "26.5"]);
        assert!(result.is_err());
    }
}
