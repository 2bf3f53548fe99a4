use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use std::fs;
use std::io::{self, Read};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use wheel_listing::{extract_listing, pipeline, FetchConfig, Fetcher, DESKTOP_UA};

#[derive(Parser)]
#[command(name = "wheel-listing")]
#[command(about = "Extract wheel specs, titles and descriptions from auction listings")]
struct Cli {
    #[command(flatten)]
    fetch: FetchArgs,
    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FetchArgs {
    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 10)]
    timeout: u64,
    /// Retries after a transient failure (total attempts = retries + 1)
    #[arg(long, global = true, default_value_t = 2)]
    retries: u32,
    /// Delay before the first retry, in milliseconds
    #[arg(long, global = true, default_value_t = 1500)]
    backoff_ms: u64,
    /// Multiplier applied to the delay after each retry
    #[arg(long, global = true, default_value_t = 1.0, value_parser = parse_backoff_factor)]
    backoff_factor: f64,
}

fn parse_backoff_factor(value: &str) -> Result<f64, String> {
    let factor: f64 = value.parse().map_err(|e| format!("{e}"))?;
    if factor.is_finite() && factor >= 0.0 {
        Ok(factor)
    } else {
        Err(format!("{value} is not a finite, non-negative number"))
    }
}

impl FetchArgs {
    fn config(&self) -> FetchConfig {
        FetchConfig {
            timeout: Duration::from_secs(self.timeout),
            max_retries: self.retries,
            backoff: Duration::from_millis(self.backoff_ms),
            backoff_factor: self.backoff_factor,
            user_agent: DESKTOP_UA.to_string(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a listing page and print its raw fields as JSON
    Extract {
        /// Auction listing URL
        url: String,
    },
    /// Parse wheel specs from a listing JSON document
    Specs {
        /// Listing JSON file, or "-" for stdin
        #[arg(value_name = "LISTING_JSON")]
        input: String,
    },
    /// Generate a structured title from a specs JSON document
    Title {
        /// Specs JSON file, or "-" for stdin
        #[arg(value_name = "SPECS_JSON")]
        input: String,
    },
    /// Generate an HTML description from a specs JSON document
    Describe {
        /// Specs JSON file, or "-" for stdin
        #[arg(value_name = "SPECS_JSON")]
        input: String,
        /// Text file with the raw description copy
        #[arg(long, value_name = "FILE")]
        raw: Option<String>,
    },
    /// Run every stage for one listing URL
    Run {
        /// Auction listing URL
        url: String,
    },
}

fn init_logging(quiet: bool, verbose: bool) {
    let default_level = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        Ok(buf)
    } else {
        fs::read_to_string(input).with_context(|| format!("Failed to read {}", input))
    }
}

fn read_json(input: &str) -> Result<Value> {
    let content = read_input(input)?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse JSON from {}", input))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    match cli.command {
        Commands::Extract { url } => {
            let fetcher = Fetcher::new(cli.fetch.config())?;
            let listing = extract_listing(&fetcher, &url)
                .with_context(|| format!("Failed to extract listing from {}", url))?;
            print_json(&listing)
        }
        Commands::Specs { input } => {
            let specs = pipeline::specs_from_json(&read_json(&input)?)?;
            print_json(&specs)
        }
        Commands::Title { input } => {
            let title = pipeline::title_from_json(&read_json(&input)?)?;
            print_json(&json!({ "title": title }))
        }
        Commands::Describe { input, raw } => {
            let specs = read_json(&input)?;
            let raw_description = match raw {
                Some(path) => read_input(&path)?,
                None => String::new(),
            };
            let description_html = pipeline::description_from_json(&specs, &raw_description)?;
            print_json(&json!({ "description_html": description_html }))
        }
        Commands::Run { url } => {
            let fetcher = Fetcher::new(cli.fetch.config())?;
            let output = pipeline::run(&fetcher, &url)
                .with_context(|| format!("Failed to process listing {}", url))?;
            print_json(&output)
        }
    }
}
