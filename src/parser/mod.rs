pub mod detail;
pub mod listing;

use scraper::ElementRef;

/// Text content of an element and its descendants, with every run of
/// whitespace (line breaks included) collapsed to a single space.
fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
