use std::collections::{BTreeSet, HashSet};

use crate::record::{EnrichedRecord, ExportRow, BASE_COLUMNS};

/// Flat rows plus the tag vocabulary their marks are aligned with.
#[derive(Debug, Clone, PartialEq)]
pub struct TagTable {
    pub vocabulary: Vec<String>,
    pub rows: Vec<ExportRow>,
}

impl TagTable {
    /// Column names in export order. A tag spelled like a base column is
    /// written as `tag:<name>` so no header name appears twice.
    pub fn header(&self) -> Vec<String> {
        BASE_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(self.vocabulary.iter().map(|t| tag_column(t)))
            .collect()
    }
}

fn tag_column(tag: &str) -> String {
    if BASE_COLUMNS.contains(&tag) {
        format!("tag:{}", tag)
    } else {
        tag.to_string()
    }
}

/// Turn per-record tag lists into one boolean column per distinct tag.
pub fn normalize(records: Vec<EnrichedRecord>) -> TagTable {
    let vocabulary: Vec<String> = records
        .iter()
        .flat_map(|r| r.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let rows = records
        .into_iter()
        .map(|r| {
            let own: HashSet<&str> = r.tags.iter().map(String::as_str).collect();
            let marks = vocabulary.iter().map(|t| own.contains(t.as_str())).collect();
            ExportRow {
                summary: r.summary,
                rating_count: r.rating_count,
                rating: r.rating,
                marks,
            }
        })
        .collect();

    TagTable { vocabulary, rows }
}

/// Drop tags entirely; no tag columns are produced.
pub fn flatten(records: Vec<EnrichedRecord>) -> TagTable {
    let rows = records
        .into_iter()
        .map(|r| ExportRow {
            summary: r.summary,
            rating_count: r.rating_count,
            rating: r.rating,
            marks: Vec::new(),
        })
        .collect();

    TagTable {
        vocabulary: Vec::new(),
        rows,
    }
}

/// Content of the vocabulary file: one tag per line, in vocabulary order.
pub fn render_vocabulary(vocabulary: &[String]) -> String {
    vocabulary.iter().map(|t| format!("{}\n", t)).collect()
}
