use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::Config;
use crate::exclude::{self, ExclusionSet};
use crate::fofa::FofaClient;
use crate::report::{self, Summary};
use crate::utils::format_number;
use crate::{record, workbook, Args};

/// What a completed run produced.
#[derive(Debug)]
pub enum RunOutcome {
    NoResults,
    Written {
        path: PathBuf,
        summary: Summary,
        exclusions_enabled: bool,
        reported_size: Option<u64>,
    },
}

/// Merges CLI flags and environment over the config file.
pub fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = Config::load(args.config.as_deref())?;

    if let Some(email) = &args.email {
        config.email = email.clone();
    }
    if let Some(key) = &args.key {
        config.key = key.clone();
    }
    if let Some(size) = args.size {
        config.page_size = size;
    }
    if let Some(exclude_file) = &args.exclude_file {
        config.exclude_file = exclude_file.clone();
    }
    if let Some(output) = &args.output {
        config.output = output.clone();
    }
    Ok(config)
}

/// Loads the exclusion set for this run. `None` means exclusion mode is off,
/// either because it was not requested or because nothing usable was loaded.
pub fn load_exclusions(config: &Config, requested: bool) -> Option<ExclusionSet> {
    if !requested {
        return None;
    }

    let outcome = exclude::load_file(&config.exclude_file);
    if outcome.set.is_empty() {
        warn!(
            action = "disable",
            component = "exclusion_loading",
            file_path = ?config.exclude_file,
            "No exclusions loaded, continuing without exclusion mode"
        );
        return None;
    }

    print_exclusion_preview(&outcome.set);
    Some(outcome.set)
}

pub fn run(args: &Args) -> Result<RunOutcome> {
    let total_start_time = Instant::now();
    info!(action = "start", component = "run", "Starting FOFA search");

    let config = resolve_config(args)?;
    let client = FofaClient::new(&config)?;
    let exclusions = load_exclusions(&config, args.exclude);

    println!("\nQuery: {}", args.query);
    println!("{}", "-".repeat(50));

    let response = client.search(&args.query, None, None)?;
    let reported_size = response.size;
    let rows = response.into_rows()?;

    if rows.is_empty() {
        info!(action = "complete", component = "run", "Search returned no results");
        return Ok(RunOutcome::NoResults);
    }
    println!("Search succeeded, {} records received", format_number(rows.len()));

    let records = record::transform(&rows, exclusions.as_ref());
    let report = report::assemble(records, exclusions.as_ref());

    let path = workbook::output_path(&config.output);
    workbook::write_report(&report, &path)
        .map_err(|e| anyhow!("Failed to write workbook {}: {}", path.display(), e))?;

    info!(
        action = "complete",
        component = "run",
        duration_ms = total_start_time.elapsed().as_millis(),
        "Run completed"
    );

    Ok(RunOutcome::Written {
        path,
        summary: report.summary(),
        exclusions_enabled: report.exclusions_enabled(),
        reported_size,
    })
}

fn print_exclusion_preview(set: &ExclusionSet) {
    println!("Loaded {} exclusion entries", format_number(set.len()));
    for (i, (host, remark)) in set.iter().take(3).enumerate() {
        if remark.is_empty() {
            println!("  {}. {}", i + 1, host);
        } else {
            println!("  {}. {} - {}", i + 1, host, remark);
        }
    }
    if set.len() > 3 {
        println!("  ... {} in total", format_number(set.len()));
    }
}

pub fn print_run_outcome(outcome: &RunOutcome) {
    let RunOutcome::Written {
        path,
        summary,
        exclusions_enabled,
        reported_size,
    } = outcome
    else {
        println!("No results found");
        return;
    };

    println!("\nResults saved to: {}", path.display());
    println!("\nStatistics:");
    println!("  Total records: {}", format_number(summary.total));

    if *exclusions_enabled {
        println!("  Excluded: {}", format_number(summary.excluded_count));
        println!("  Valid: {}", format_number(summary.valid_count));
        if summary.excluded_count > 0 {
            println!(
                "  Excluded with remark: {}",
                format_number(summary.remarked_excluded_count)
            );
        }
    }

    if let Some(size) = reported_size {
        println!("  Total matches (FOFA): {}", format_number(*size as usize));
    }
}
