use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::element_text;
use crate::error::ListingError;
use crate::record::SummaryRecord;

static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.game_cell").unwrap());
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a.title").unwrap());
static AUTHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a.user_link").unwrap());
static DESC: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.short_text").unwrap());
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

/// Extract one summary record per item cell, in document order.
///
/// Title, author and description fall back to empty strings. A cell without
/// a linked anchor means the page layout changed, so the whole parse fails.
pub fn parse_listing(html: &str) -> Result<Vec<SummaryRecord>, ListingError> {
    let document = Html::parse_document(html);
    document
        .select(&CELL)
        .enumerate()
        .map(|(index, cell)| parse_cell(index, cell))
        .collect()
}

fn parse_cell(index: usize, cell: ElementRef<'_>) -> Result<SummaryRecord, ListingError> {
    let link = cell
        .select(&ANCHOR)
        .next()
        .and_then(|a| a.value().attr("href"))
        .ok_or(ListingError::MissingLink { index })?;

    Ok(SummaryRecord {
        index,
        title: first_text(cell, &TITLE),
        author: first_text(cell, &AUTHOR),
        desc: first_text(cell, &DESC),
        link: link.to_string(),
    })
}

fn first_text(cell: ElementRef<'_>, sel: &Selector) -> String {
    cell.select(sel).next().map(element_text).unwrap_or_default()
}
