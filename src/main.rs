use booking_extract::config::ExtractorConfig;
use booking_extract::{format_bookings, BookingExtractor, ExtractError, InboundEmail};
use clap::{Parser, ValueEnum};
use log::{debug, warn};
use std::io::Read;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

/// Extract booking records from a notification email body
#[derive(Debug, Parser)]
#[command(name = "booking-extract", version, about)]
struct Cli {
    /// Sender address of the email
    #[arg(long, default_value = "")]
    from: String,

    /// Subject line of the email
    #[arg(long, default_value = "")]
    subject: String,

    /// Configuration file (defaults to ./booking-extract.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// File holding the email body, or "-" for stdin
    #[arg(default_value = "-")]
    body: String,
}

fn read_body(source: &str) -> Result<String, ExtractError> {
    if source == "-" {
        let mut body = String::new();
        std::io::stdin().read_to_string(&mut body)?;
        Ok(body)
    } else {
        Ok(std::fs::read_to_string(source)?)
    }
}

fn main() -> Result<(), ExtractError> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ExtractorConfig::load_from(path)?,
        None => ExtractorConfig::load()?,
    };
    debug!("Loaded {} routing rules", config.routing.len());

    let extractor = BookingExtractor::builder().config(&config).build();
    let email = InboundEmail::new(cli.from, cli.subject, read_body(&cli.body)?);
    let extraction = extractor.extract(&email)?;

    if extraction.selection.is_none() {
        warn!(
            "{}",
            extraction
                .selection
                .reason
                .as_deref()
                .unwrap_or("no parser found")
        );
    }

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&extraction.bookings)?),
        OutputFormat::Text => println!("{}", format_bookings(&extraction.bookings)),
    }

    Ok(())
}
