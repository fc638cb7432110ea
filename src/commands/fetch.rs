use crate::core::config::Settings;
use crate::core::dataset::CDR_CORPUS;
use crate::core::fetch::HttpFetcher;
use crate::core::pipeline::{Pipeline, PipelineReport};
use crate::utils::fs::format_size;
use anyhow::{Context, Result};

pub fn fetch_dataset(settings: &Settings) -> Result<PipelineReport> {
    println!("Fetching {} corpus from {}", CDR_CORPUS.name, settings.url);

    let fetcher = HttpFetcher::new()?;
    let report = Pipeline::new(settings, &CDR_CORPUS, fetcher)
        .run()
        .with_context(|| format!("could not acquire the {} corpus", CDR_CORPUS.name))?;

    print_report(&report);
    Ok(report)
}

fn print_report(report: &PipelineReport) {
    println!("✅ Placed {} file(s):", report.placed.len());
    for file in &report.placed {
        println!(
            "   {} → {} ({})",
            file.name,
            file.destination.display(),
            format_size(file.bytes)
        );
    }

    if let Some(warning) = &report.cleanup_warning {
        eprintln!("⚠️  Warning: {warning}");
        eprintln!("   The dataset is in place; remove the staging directory manually or run:");
        eprintln!("   cdrfetch clean --confirm");
    }
}
