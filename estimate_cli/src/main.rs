//! # Estimate CLI
//!
//! Terminal front-end for the building cost estimator.
//!
//! ```text
//! estimate calc request.json            # text table
//! estimate calc request.json --json     # Estimate as JSON
//! estimate calc - --pdf offer.pdf < request.json
//! estimate prices > prices.toml         # dump the price book
//! estimate --prices prices.toml calc request.json
//! ```

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use chrono::Local;
use clap::{Parser, Subcommand};
use eyre::{Result, WrapErr};
use tracing_subscriber::EnvFilter;

use estimate_core::format::{format_money, GROUP_SEPARATOR};
use estimate_core::payment::PaymentOption;
use estimate_core::pdf::render_estimate_pdf;
use estimate_core::validation::validate_request;
use estimate_core::{Estimate, EstimateError, Estimator, PriceBook, RawEstimateRequest};

#[derive(Parser, Debug)]
#[command(name = "estimate", version, about = "Building cost estimator")]
struct Cli {
    #[arg(long, global = true, help = "Price book TOML file (defaults to the standard list)")]
    prices: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Estimate a request read from a JSON file ("-" or nothing for stdin)
    Calc {
        input: Option<PathBuf>,
        #[arg(long, help = "Print the estimate as JSON")]
        json: bool,
        #[arg(long, help = "Print only the total")]
        total_only: bool,
        #[arg(long, value_name = "PATH", help = "Also write the offer as PDF")]
        pdf: Option<PathBuf>,
    },
    /// Print the active price book as TOML
    Prices,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let prices = load_prices(cli.prices.as_deref())?;

    match cli.command {
        Commands::Prices => {
            print!("{}", prices.to_toml_string()?);
            Ok(())
        }
        Commands::Calc {
            input,
            json,
            total_only,
            pdf,
        } => {
            let estimator = Estimator::new(prices);
            let body = read_input(input.as_deref())?;
            run_calc(&estimator, &body, json, total_only, pdf.as_deref())
        }
    }
}

fn load_prices(path: Option<&Path>) -> Result<PriceBook> {
    match path {
        Some(path) => PriceBook::from_toml_file(path)
            .wrap_err_with(|| format!("Failed to load price book from {}", path.display())),
        None => Ok(PriceBook::standard()),
    }
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read request from {}", path.display())),
        _ => {
            let mut body = String::new();
            io::stdin()
                .read_to_string(&mut body)
                .wrap_err("Failed to read request from stdin")?;
            Ok(body)
        }
    }
}

fn run_calc(
    estimator: &Estimator,
    body: &str,
    json: bool,
    total_only: bool,
    pdf: Option<&Path>,
) -> Result<()> {
    let raw: RawEstimateRequest = serde_json::from_str(body).wrap_err("Request is not valid JSON")?;

    let request = match validate_request(&raw, estimator.prices()) {
        Ok(request) => request,
        Err(e) => {
            report_rejection(&e);
            return Err(e.into());
        }
    };
    let estimate = estimator.estimate_validated(&request)?;
    let payments = estimator.payment_options(&estimate);

    if total_only {
        println!("{}", estimate.total_cash);
    } else if json {
        println!("{}", serde_json::to_string_pretty(&estimate)?);
    } else {
        print!("{}", render_table(&estimate, &payments));
    }

    if let Some(path) = pdf {
        let bytes = render_estimate_pdf(&request, &estimate, &payments, Local::now().date_naive())?;
        fs::write(path, bytes).wrap_err_with(|| format!("Failed to write {}", path.display()))?;
        eprintln!("PDF written to {}", path.display());
    }

    Ok(())
}

fn report_rejection(error: &EstimateError) {
    eprintln!("Error: {}", error);
    if let Ok(json) = serde_json::to_string_pretty(error) {
        eprintln!();
        eprintln!("Error JSON:");
        eprintln!("{}", json);
    }
}

/// Plain-text rendering of an estimate for the terminal.
fn render_table(estimate: &Estimate, payments: &[PaymentOption]) -> String {
    let money = |amount: i64| format_money(amount).replace(GROUP_SEPARATOR, " ");
    let mut out = String::new();

    out.push_str("═══════════════════════════════════════════════════════════════════\n");
    out.push_str("  СМЕТА\n");
    out.push_str("═══════════════════════════════════════════════════════════════════\n");
    for row in &estimate.rows {
        out.push_str(&format!(
            "  {}  {:<20} {:>18} {:>18}\n",
            row.code,
            row.title,
            row.volume,
            money(row.price)
        ));
        out.push_str(&format!("      {}\n", row.subtitle));
    }
    out.push_str("───────────────────────────────────────────────────────────────────\n");
    out.push_str(&format!("  ИТОГО {:>59}\n", money(estimate.total_cash)));
    for option in payments.iter().skip(1) {
        out.push_str(&format!(
            "  {} +{:.0}% {:>52}\n",
            option.method.label(),
            option.surcharge * 100.0,
            money(option.total)
        ));
    }
    out.push_str("═══════════════════════════════════════════════════════════════════\n");
    out
}
