use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, instrument, warn};
use url::Url;

use crate::parser::detail::parse_detail;
use crate::record::{EnrichedRecord, SummaryRecord};
use crate::source::{resolve_link, SourceLoader};

/// Knobs for the detail-page pass.
#[derive(Debug, Clone)]
pub struct EnrichOptions {
    /// Listing URL that relative item links are joined onto.
    pub base: Option<Url>,
    /// Fixed pause after every item, success or not.
    pub delay: Duration,
    pub with_tags: bool,
    /// Draw a progress bar on stderr.
    pub progress: bool,
}

/// Enrichment stats returned after completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnrichStats {
    pub total: usize,
    pub ok: usize,
    pub failed: usize,
}

pub struct Enrichment {
    pub records: Vec<EnrichedRecord>,
    pub stats: EnrichStats,
}

/// Visit every detail page, one at a time, in listing order.
///
/// A page that cannot be fetched leaves its record unenriched and the run
/// carries on; the failure is logged and counted.
#[instrument(skip_all, fields(total = records.len()))]
pub async fn enrich_records(
    loader: &SourceLoader,
    records: Vec<SummaryRecord>,
    opts: &EnrichOptions,
) -> Enrichment {
    let total = records.len();
    let pb = if opts.progress {
        ProgressBar::new(total as u64)
    } else {
        ProgressBar::hidden()
    };
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40} {pos}/{len} (eta {eta})")
    {
        pb.set_style(style.progress_chars("=> "));
    }

    let mut stats = EnrichStats {
        total,
        ..Default::default()
    };
    let mut enriched = Vec::with_capacity(total);

    for (i, mut summary) in records.into_iter().enumerate() {
        summary.index = i;
        pb.suspend(|| info!("{} / {} - {}", i + 1, total, summary.title));

        let target = resolve_link(opts.base.as_ref(), &summary.link);
        let record = match loader.fetch(&target).await {
            Ok(html) => {
                stats.ok += 1;
                let detail = parse_detail(&html, opts.with_tags);
                EnrichedRecord {
                    summary,
                    rating_count: detail.rating_count,
                    rating: detail.rating,
                    tags: detail.tags,
                }
            }
            Err(e) => {
                stats.failed += 1;
                pb.suspend(|| warn!("Detail page for {:?} unavailable: {}", summary.title, e));
                EnrichedRecord::unenriched(summary)
            }
        };
        enriched.push(record);
        pb.inc(1);

        tokio::time::sleep(opts.delay).await;
    }

    pb.finish_and_clear();
    info!(
        "Enriched {} items ({} ok, {} failed)",
        stats.total, stats.ok, stats.failed
    );

    Enrichment {
        records: enriched,
        stats,
    }
}
