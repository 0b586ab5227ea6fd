use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::ExportError;
use crate::tags::TagTable;

/// U+2190 LEFTWARDS ARROW. Descriptions are full of commas.
pub const DELIMITER: char = '←';
pub const LINE_END: &str = "\r\n";

/// Render header and rows. Fields are written verbatim: a value containing
/// the delimiter or a line break will not survive re-parsing.
pub fn render_table(table: &TagTable) -> Result<String, ExportError> {
    if table.rows.is_empty() {
        return Err(ExportError::Empty);
    }

    let mut out = String::new();
    push_line(&mut out, &table.header());
    for row in &table.rows {
        push_line(&mut out, &row.cells());
    }
    Ok(out)
}

fn push_line<S: AsRef<str>>(out: &mut String, cells: &[S]) {
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push(DELIMITER);
        }
        out.push_str(cell.as_ref());
    }
    out.push_str(LINE_END);
}

/// Output written next to its destination but not yet visible under its
/// final name. Dropping it without `commit` removes the temporary file.
pub struct StagedFile {
    file: NamedTempFile,
    path: PathBuf,
}

fn io_error(path: &Path, err: std::io::Error) -> ExportError {
    ExportError::Io {
        path: path.display().to_string(),
        err,
    }
}

/// Write `content` to a temporary file in the same directory as `path`.
pub fn stage(path: &Path, content: &str) -> Result<StagedFile, ExportError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir).map_err(|e| io_error(path, e))?;
    file.write_all(content.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| io_error(path, e))?;
    debug!("Staged {} bytes for {}", content.len(), path.display());
    Ok(StagedFile {
        file,
        path: path.to_path_buf(),
    })
}

impl StagedFile {
    /// Move the staged content over the destination, replacing any old file.
    pub fn commit(self) -> Result<(), ExportError> {
        let path = self.path;
        self.file
            .persist(&path)
            .map_err(|e| io_error(&path, e.error))?;
        Ok(())
    }
}
