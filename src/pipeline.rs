use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::enrich::{enrich_records, EnrichOptions, EnrichStats};
use crate::export::{render_table, stage};
use crate::parser::listing::parse_listing;
use crate::settings::Settings;
use crate::source::{Source, SourceLoader};
use crate::tags::{flatten, normalize, render_vocabulary};

/// What one run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub stats: EnrichStats,
    pub tag_count: usize,
    pub output: PathBuf,
    pub tags_file: Option<PathBuf>,
}

/// Listing → summaries → detail pages → flat table on disk.
///
/// Nothing is written until every item has been visited, and neither output
/// file replaces its destination until both have been staged.
#[instrument(skip(settings))]
pub async fn run(data_source: &str, settings: &Settings, progress: bool) -> Result<RunSummary> {
    let loader = SourceLoader::new(&settings.user_agent).context("Failed to build HTTP client")?;

    let source = Source::resolve(data_source)?;
    let html = loader
        .load(&source)
        .await
        .with_context(|| format!("Failed to load listing {}", source))?;

    let summaries = parse_listing(&html).context("Listing page is malformed")?;
    info!("Found {} links", summaries.len());

    let opts = EnrichOptions {
        base: source.base_url().cloned(),
        delay: settings.delay(),
        with_tags: settings.with_tags,
        progress,
    };
    let enrichment = enrich_records(&loader, summaries, &opts).await;

    let (table, tags_file) = if settings.with_tags {
        let table = normalize(enrichment.records);
        (table, Some(settings.tags_file.clone()))
    } else {
        (flatten(enrichment.records), None)
    };

    let staged_csv = stage(&settings.output, &render_table(&table)?)?;
    let staged_tags = match &tags_file {
        Some(path) => Some(stage(path, &render_vocabulary(&table.vocabulary))?),
        None => None,
    };
    if let Some(staged) = staged_tags {
        staged.commit()?;
    }
    staged_csv.commit()?;
    info!(
        "Exported {} rows ({} tag columns) to {}",
        table.rows.len(),
        table.vocabulary.len(),
        settings.output.display()
    );

    Ok(RunSummary {
        stats: enrichment.stats,
        tag_count: table.vocabulary.len(),
        output: settings.output.clone(),
        tags_file,
    })
}
