// Cause-list HTML helpers
//
// The backend returns every cause list as an HTML fragment holding one
// table. These helpers scan that fragment as text, matching tag names
// case-insensitively. They are tailored to that one shape and are not
// a general HTML parser.

use serde::Serialize;

/// How a table row is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    /// Column headings: the leading `<th>` row, or any row without `<td>`.
    Header,
    /// A `<td colspan=...>` row spanning the table (section titles such
    /// as "Cases listed for hearing").
    Banner,
    /// A listed case.
    Data,
}

/// One row of the first table, with its cells reduced to text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub kind: RowKind,
    pub cells: Vec<String>,
}

/// Whether the first table of `html` lists at least one case.
pub fn has_table_data(html: &str) -> bool {
    table_rows(html).iter().any(|row| row.kind == RowKind::Data)
}

/// Rows of the first `<table>` in `html`. Empty when there is no table.
pub fn table_rows(html: &str) -> Vec<TableRow> {
    let Some(table) = first_table(html) else {
        return Vec::new();
    };

    let mut rows = Vec::new();
    for (index, row) in row_slices(table).into_iter().enumerate() {
        let cells = cell_slices(row);
        if cells.is_empty() {
            continue;
        }

        let has_th = cells.iter().any(|c| c.header);
        let has_td = cells.iter().any(|c| !c.header);
        let kind = if !has_td || (index == 0 && has_th) {
            RowKind::Header
        } else if cells.iter().any(|c| !c.header && c.colspan) {
            RowKind::Banner
        } else {
            RowKind::Data
        };

        rows.push(TableRow {
            kind,
            cells: cells.iter().map(|c| strip_tags(c.inner)).collect(),
        });
    }
    rows
}

/// Remove all tags, decode the common entities, and collapse whitespace.
pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                // Tags separate words even when the markup has no space.
                out.push(' ');
            }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    normalize_ws(&decode_entities(&out))
}

/// Escape text for inclusion in an HTML document.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

// ── Scanning ────────────────────────────────────────────────────────

struct Cell<'a> {
    header: bool,
    colspan: bool,
    inner: &'a str,
}

/// Contents of the first `<table ...>`, up to its `</table>` (or the end
/// of input when the fragment is truncated).
fn first_table(html: &str) -> Option<&str> {
    let lc = html.to_ascii_lowercase();
    let start = find_open_tag(&lc, "table", 0)?;
    let body_start = open_tag_end(html, start)?;
    let end = lc[body_start..]
        .find("</table")
        .map_or(html.len(), |rel| body_start + rel);
    Some(&html[body_start..end])
}

/// Each `<tr>`'s contents. A row ends at `</tr>`, at the next `<tr>`, or
/// at the end of the table, since the backend does not always close rows.
fn row_slices(table: &str) -> Vec<&str> {
    let lc = table.to_ascii_lowercase();
    let mut rows = Vec::new();
    let mut pos = 0;

    while let Some(start) = find_open_tag(&lc, "tr", pos) {
        let Some(body_start) = open_tag_end(table, start) else {
            break;
        };
        let close = lc[body_start..].find("</tr").map(|rel| body_start + rel);
        let next = find_open_tag(&lc, "tr", body_start);
        let end = match (close, next) {
            (Some(c), Some(n)) => c.min(n),
            (Some(c), None) => c,
            (None, Some(n)) => n,
            (None, None) => table.len(),
        };
        rows.push(&table[body_start..end]);
        pos = end;
    }
    rows
}

/// The `<td>`/`<th>` cells of one row, in order.
fn cell_slices(row: &str) -> Vec<Cell<'_>> {
    let lc = row.to_ascii_lowercase();
    let mut cells = Vec::new();
    let mut pos = 0;

    loop {
        let td = find_open_tag(&lc, "td", pos);
        let th = find_open_tag(&lc, "th", pos);
        let (start, header) = match (td, th) {
            (Some(d), Some(h)) if h < d => (h, true),
            (Some(d), _) => (d, false),
            (None, Some(h)) => (h, true),
            (None, None) => break,
        };
        let Some(body_start) = open_tag_end(row, start) else {
            break;
        };

        let close = if header { "</th" } else { "</td" };
        let end = [
            lc[body_start..].find(close).map(|rel| body_start + rel),
            find_open_tag(&lc, "td", body_start),
            find_open_tag(&lc, "th", body_start),
        ]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(row.len());

        cells.push(Cell {
            header,
            colspan: lc[start..body_start].contains("colspan"),
            inner: &row[body_start..end],
        });
        pos = end;
    }
    cells
}

/// Byte offset of the next `<name` opening tag at or after `from`, in an
/// already-lowercased string. `<tr` does not match `<track`.
fn find_open_tag(lc: &str, name: &str, from: usize) -> Option<usize> {
    let pattern = format!("<{name}");
    let mut pos = from;
    loop {
        let start = lc.get(pos..)?.find(&pattern)? + pos;
        let after = start + pattern.len();
        match lc.as_bytes().get(after) {
            None => return None,
            Some(b) if b.is_ascii_whitespace() || *b == b'>' || *b == b'/' => return Some(start),
            Some(_) => pos = after,
        }
    }
}

/// Offset just past the `>` closing the tag that starts at `start`.
fn open_tag_end(s: &str, start: usize) -> Option<usize> {
    Some(s[start..].find('>')? + start + 1)
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Collapse whitespace runs into a single space and trim.
fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const LISTED: &str = r#"
        <div class="cause-list">
        <TABLE class="table" border=1>
          <thead><tr><th>Sr No</th><th>Cases</th><th>Party Name</th><th>Advocate</th></tr></thead>
          <tbody>
            <tr><td colspan="4" class="title">Cases listed for Hearing</td></tr>
            <tr><td>1</td><td>O.S./412/2018</td><td>Ram Kumar<br>versus<br>State</td><td>A. Singh</td></tr>
            <tr><td>2</td><td>M.C.A./9/2021</td><td>Sita &amp; Others</td><td></td></tr>
          </tbody>
        </TABLE></div>"#;

    #[test]
    fn listed_cases_are_data() {
        assert!(has_table_data(LISTED));

        let rows = table_rows(LISTED);
        let kinds: Vec<RowKind> = rows.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![RowKind::Header, RowKind::Banner, RowKind::Data, RowKind::Data]
        );
        assert_eq!(rows[0].cells, vec!["Sr No", "Cases", "Party Name", "Advocate"]);
        assert_eq!(rows[2].cells[2], "Ram Kumar versus State");
        assert_eq!(rows[3].cells[2], "Sita & Others");
        assert_eq!(rows[3].cells[3], "");
    }

    #[test]
    fn header_and_banner_only_is_empty() {
        let html = r#"<table>
            <tr><th>Sr No</th><th>Cases</th></tr>
            <tr><td colspan=2>No cases listed</td></tr>
        </table>"#;
        assert!(!has_table_data(html));
    }

    #[test]
    fn no_table_is_empty() {
        assert!(!has_table_data(""));
        assert!(!has_table_data("<p>Record not found</p>"));
        assert!(table_rows("<div>nothing</div>").is_empty());
    }

    #[test]
    fn only_first_table_counts() {
        let html = "<table><tr><th>A</th></tr></table>\
                    <table><tr><td>1</td></tr></table>";
        assert!(!has_table_data(html));
    }

    #[test]
    fn unclosed_rows_and_cells_are_split() {
        let html = "<table><tr><th>No<th>Case<tr><td>1<td>O.S./1/2020<tr><td>2<td>O.S./2/2020</table>";
        let rows = table_rows(html);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].cells, vec!["1", "O.S./1/2020"]);
        assert_eq!(rows[2].kind, RowKind::Data);
    }

    #[test]
    fn th_row_after_first_is_still_a_header() {
        let html = "<table><tr><td>1</td></tr><tr><th>Section</th></tr></table>";
        let rows = table_rows(html);
        assert_eq!(rows[0].kind, RowKind::Data);
        assert_eq!(rows[1].kind, RowKind::Header);
    }

    #[test]
    fn tag_names_need_a_boundary() {
        let html = "<table><track><tr><td>1</td></tr></table>";
        assert_eq!(table_rows(html).len(), 1);
    }

    #[test]
    fn strip_tags_collapses_markup() {
        assert_eq!(strip_tags("  <b>Judge</b>&nbsp;A<br/>Court  "), "Judge A Court");
    }

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(escape(r#"A & B <"x">"#), "A &amp; B &lt;&quot;x&quot;&gt;");
    }
}
