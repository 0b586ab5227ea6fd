/// One item cell from a listing page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SummaryRecord {
    pub index: usize,
    pub title: String,
    pub author: String,
    pub desc: String,
    pub link: String,
}

/// A summary record plus what its detail page told us.
///
/// `None` means the detail page had no usable value. It is exported as an
/// empty cell and must never be collapsed to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecord {
    pub summary: SummaryRecord,
    pub rating_count: Option<u64>,
    pub rating: Option<f64>,
    pub tags: Vec<String>,
}

impl EnrichedRecord {
    /// Record whose detail page could not be fetched.
    pub fn unenriched(summary: SummaryRecord) -> Self {
        Self {
            summary,
            rating_count: None,
            rating: None,
            tags: Vec::new(),
        }
    }
}

/// Export columns that precede the tag columns, in header order.
pub const BASE_COLUMNS: [&str; 7] = [
    "index",
    "title",
    "author",
    "rating_count",
    "rating",
    "desc",
    "link",
];

/// Final flat row: no tag list, one mark per vocabulary entry instead.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub summary: SummaryRecord,
    pub rating_count: Option<u64>,
    pub rating: Option<f64>,
    pub marks: Vec<bool>,
}

impl ExportRow {
    /// Cell values in header order.
    pub fn cells(&self) -> Vec<String> {
        let s = &self.summary;
        let mut cells = vec![
            s.index.to_string(),
            s.title.clone(),
            s.author.clone(),
            self.rating_count.map(|c| c.to_string()).unwrap_or_default(),
            self.rating.map(format_rating).unwrap_or_default(),
            s.desc.clone(),
            s.link.clone(),
        ];
        cells.extend(
            self.marks
                .iter()
                .map(|&m| if m { "x".to_string() } else { String::new() }),
        );
        cells
    }
}

/// Ratings keep at least one fractional digit so `4` reads as `4.0`.
pub fn format_rating(rating: f64) -> String {
    if rating.is_finite() && rating.fract() == 0.0 && rating.abs() < 1e16 {
        format!("{:.1}", rating)
    } else {
        rating.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_numerics_are_empty_cells() {
        let row = ExportRow {
            summary: SummaryRecord {
                index: 3,
                title: "Foo".into(),
                link: "/foo".into(),
                ..Default::default()
            },
            rating_count: None,
            rating: None,
            marks: vec![],
        };
        assert_eq!(row.cells(), vec!["3", "Foo", "", "", "", "", "/foo"]);
    }

    #[test]
    fn zero_is_not_unknown() {
        let row = ExportRow {
            summary: SummaryRecord::default(),
            rating_count: Some(0),
            rating: Some(0.0),
            marks: vec![true, false],
        };
        let cells = row.cells();
        assert_eq!(cells[3], "0");
        assert_eq!(cells[4], "0.0");
        assert_eq!(&cells[7..], ["x", ""]);
    }

    #[test]
    fn rating_format() {
        assert_eq!(format_rating(4.0), "4.0");
        assert_eq!(format_rating(4.25), "4.25");
        assert_eq!(format_rating(3.875), "3.875");
    }
}
