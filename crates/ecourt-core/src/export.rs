// Cause-list export
//
// Wraps a court's cause-list table in a standalone HTML document with a
// small header, so a saved list can be opened or printed on its own.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use ecourt_api::CauseListType;
use tracing::debug;

use crate::error::CoreError;
use crate::html::escape;

/// Date format used in exported file names.
pub const FILE_DATE_FORMAT: &str = "%Y-%m-%d";

/// What the document header says about the list.
#[derive(Debug, Clone)]
pub struct ExportHeader<'a> {
    pub court_name: &'a str,
    pub date: NaiveDate,
    pub cause_list_type: CauseListType,
}

/// `CauseList_<court name>_<date>.html`, with every character of the
/// court name that is not an ASCII letter or digit replaced by `_`.
pub fn file_name(court_name: &str, date: NaiveDate) -> String {
    let sanitized: String = court_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("CauseList_{sanitized}_{}.html", date.format(FILE_DATE_FORMAT))
}

/// A standalone HTML document holding `table_html` under a header.
///
/// The backend's table is embedded as-is; only the header text is escaped.
pub fn render_document(header: &ExportHeader<'_>, table_html: &str) -> String {
    let court = escape(header.court_name);
    let date = header.date.format("%d-%m-%Y");
    let kind = match header.cause_list_type {
        CauseListType::Civil => "Civil",
        CauseListType::Criminal => "Criminal",
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Cause List - {court} - {date}</title>
<style>
  body {{ font-family: sans-serif; margin: 2em; }}
  table {{ border-collapse: collapse; width: 100%; font-size: 0.9em; }}
  th, td {{ border: 1px solid #888; padding: 4px 6px; vertical-align: top; }}
  th {{ background: #eee; }}
</style>
</head>
<body>
<h1>{court}</h1>
<p>Date: {date} &middot; {kind} cause list</p>
{table_html}
</body>
</html>
"#
    )
}

/// Write the document for `header` into `dir`, returning its path.
pub fn write_document(
    dir: &Path,
    header: &ExportHeader<'_>,
    table_html: &str,
) -> Result<PathBuf, CoreError> {
    let path = dir.join(file_name(header.court_name, header.date));
    std::fs::create_dir_all(dir).map_err(|source| CoreError::Export {
        path: dir.to_path_buf(),
        source,
    })?;
    std::fs::write(&path, render_document(header, table_html)).map_err(|source| {
        CoreError::Export {
            path: path.clone(),
            source,
        }
    })?;
    debug!(path = %path.display(), "cause list exported");
    Ok(path)
}
