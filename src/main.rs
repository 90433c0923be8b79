//! Def Attribution - Command Line Host
//!
//! Loads a catalog of TOML package manifests, runs the rewrite pass and prints
//! every rewritten description.

use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

use def_attribution::content::ContentLoader;
use def_attribution::core::error::Result;
use def_attribution::rewrite::{DescriptionRewriter, RunSummary, Settings, TableAnnotator};

/// Append the contributing package's name to every record description
#[derive(Parser, Debug)]
#[command(name = "def-attribution")]
#[command(about = "Append the contributing package's name to every record description")]
struct Args {
    /// Directory of package manifests (plus optional categories.toml)
    dir: PathBuf,

    /// Settings file (TOML, camelCase keys); defaults when omitted
    #[arg(long, short = 's')]
    settings: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    /// Run the pass twice, to check that descriptions don't change
    #[arg(long)]
    twice: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct Report {
    summary: RunSummary,
    records: Vec<RecordReport>,
}

#[derive(Serialize)]
struct RecordReport {
    category: String,
    name: String,
    source: Option<String>,
    description: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("def_attribution=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Err(problem) = settings.validate() {
        tracing::warn!("Settings: {}", problem);
    }

    let (mut catalog, annotations) = ContentLoader::load_directory(&args.dir)?.into_parts();

    let mut table = TableAnnotator::new();
    for annotation in annotations {
        table.insert(&annotation.category, annotation.record, annotation.text);
    }
    let rewriter = DescriptionRewriter::new().with_annotator(table);

    let mut summary = rewriter.run(&mut catalog, Some(&settings))?;
    if args.twice {
        let before: Vec<Option<String>> = catalog
            .registry()
            .records()
            .map(|r| r.description.clone())
            .collect();
        summary = rewriter.run(&mut catalog, Some(&settings))?;
        let changed = catalog
            .registry()
            .records()
            .zip(before.iter())
            .filter(|(record, old)| record.description != **old)
            .count();
        if changed == 0 {
            tracing::info!("Second pass left every description unchanged");
        } else {
            tracing::warn!("Second pass changed {} descriptions", changed);
        }
    }

    let registry = catalog.registry();
    let records: Vec<RecordReport> = registry
        .records()
        .map(|record| RecordReport {
            category: registry.category_name(record.category).to_string(),
            name: record.name.to_string(),
            source: record.source.as_ref().map(|id| id.to_string()),
            description: record.description.clone(),
        })
        .collect();

    if args.json {
        let report = Report { summary, records };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for record in &records {
            println!("[{}] {}", record.category, record.name);
            if let Some(description) = &record.description {
                println!("{}", description);
            }
            println!();
        }
        println!(
            "{} rewritten, {} from patches, {} skipped, {} failed",
            summary.rewritten,
            summary.resolved_from_patch,
            summary.skipped(),
            summary.failed
        );
    }

    Ok(())
}
