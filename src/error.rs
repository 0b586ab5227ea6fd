use thiserror::Error;

/// Failure to turn a data source string into markup.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("not a fetchable URL or an existing file: {source_str}")]
    Unresolvable { source_str: String },

    #[error("HTTP request for {url} failed: {err}")]
    Http {
        url: String,
        #[source]
        err: reqwest::Error,
    },

    #[error("failed to read {path}: {err}")]
    Io {
        path: String,
        #[source]
        err: std::io::Error,
    },
}

/// The listing page no longer looks like a listing page.
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("item cell {index} has no link")]
    MissingLink { index: usize },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no records to export")]
    Empty,

    #[error("failed to write {path}: {err}")]
    Io {
        path: String,
        #[source]
        err: std::io::Error,
    },
}
