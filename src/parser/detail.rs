use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use super::element_text;

static RATING_COUNT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.rating_count").unwrap());
static AGGREGATE_RATING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.aggregate_rating").unwrap());
static LINKED_ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static TAG_HREF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"tag").unwrap());

/// Fields read from an item's detail page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetailFields {
    pub rating_count: Option<u64>,
    pub rating: Option<f64>,
    pub tags: Vec<String>,
}

/// Parse rating statistics and, if asked, the tag list. Never fails: anything
/// missing or unparseable comes back as `None` or an empty list.
pub fn parse_detail(html: &str, with_tags: bool) -> DetailFields {
    let document = Html::parse_document(html);

    let rating_count = first_attr(&document, &RATING_COUNT, "content")
        .and_then(|v| v.trim().parse::<u64>().ok());
    let rating = first_attr(&document, &AGGREGATE_RATING, "title")
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|r| r.is_finite());

    let tags = if with_tags {
        extract_tags(&document)
    } else {
        Vec::new()
    };

    DetailFields {
        rating_count,
        rating,
        tags,
    }
}

fn first_attr<'a>(document: &'a Html, sel: &Selector, attr: &str) -> Option<&'a str> {
    document.select(sel).next()?.value().attr(attr)
}

/// Lowercased text of every tag link, in page order. Duplicates are kept.
fn extract_tags(document: &Html) -> Vec<String> {
    document
        .select(&LINKED_ANCHOR)
        .filter(|a| a.value().attr("href").is_some_and(|h| TAG_HREF_RE.is_match(h)))
        .map(|a| element_text(a).to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}
