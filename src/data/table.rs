//! Play-by-play table extraction
//!
//! Locates a table by id, either directly in the document or pre-rendered
//! inside an HTML comment, and reads each body row keyed by the cells'
//! `data-stat` attribute rather than by column position.

use crate::{PlayError, Result};
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashMap;

/// Semantic key of the field-position cell
pub const LOCATION_KEY: &str = "location";

/// Row classes that mark repeated headers and dividers inside the body
const SKIPPED_ROW_CLASSES: [&str; 2] = ["thead", "divider"];

/// One table row, keyed by each cell's `data-stat` attribute
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    fields: HashMap<String, String>,
    /// `csk` attribute of the field-position cell, if it carried one
    pub location_csk: Option<String>,
}

impl RawRow {
    /// Text of the cell with the given key, if the row had one
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.fields.insert(key.into(), text.into());
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Header labels and data rows of an extracted table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedTable {
    /// Bottom header row labels; only used for diagnostics, rows are keyed by `data-stat`
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| PlayError::Parse(format!("Bad selector {}: {}", css, e)))
}

/// Find the table with `table_id` and run `f` on it
///
/// Falls back to comment nodes when the table is not part of the live
/// document: the first comment mentioning the id whose content re-parses
/// into a matching table wins.
pub fn with_table<T>(
    html: &str,
    table_id: &str,
    f: impl FnOnce(ElementRef<'_>) -> T,
) -> Result<T> {
    let table_selector = selector(&format!("table#{}", table_id))?;
    let document = Html::parse_document(html);

    if let Some(table) = document.select(&table_selector).next() {
        return Ok(f(table));
    }

    let marker = format!("id=\"{}\"", table_id);
    for node in document.tree.nodes() {
        let Node::Comment(comment) = node.value() else {
            continue;
        };
        let text: &str = &comment.comment;
        if !text.contains(&marker) {
            continue;
        }

        let fragment = Html::parse_fragment(text);
        if let Some(table) = fragment.select(&table_selector).next() {
            log::debug!("Table {} found inside a comment", table_id);
            return Ok(f(table));
        }
    }

    Err(PlayError::TableNotFound {
        table_id: table_id.to_string(),
    })
}

/// Extract the rows of the table with `table_id` from a document
pub fn extract_table(html: &str, table_id: &str) -> Result<ExtractedTable> {
    let selectors = TableSelectors::new()?;
    with_table(html, table_id, |table| selectors.read(table))
}

struct TableSelectors {
    header_rows: Selector,
    body_rows: Selector,
    cells: Selector,
}

impl TableSelectors {
    fn new() -> Result<Self> {
        Ok(TableSelectors {
            header_rows: selector("thead tr")?,
            body_rows: selector("tbody tr")?,
            cells: selector("th, td")?,
        })
    }

    fn read(&self, table: ElementRef<'_>) -> ExtractedTable {
        // Multi-row headers: the bottom row has the finest-grained labels
        let headers = table
            .select(&self.header_rows)
            .last()
            .map(|row| row.select(&self.cells).map(cell_text).collect())
            .unwrap_or_default();

        let rows = table
            .select(&self.body_rows)
            .filter(|row| {
                !row
                    .value()
                    .classes()
                    .any(|class| SKIPPED_ROW_CLASSES.contains(&class))
            })
            .filter_map(|row| self.read_row(row))
            .collect();

        ExtractedTable { headers, rows }
    }

    fn read_row(&self, row: ElementRef<'_>) -> Option<RawRow> {
        let mut raw = RawRow::default();

        for cell in row.select(&self.cells) {
            let Some(stat) = cell.value().attr("data-stat") else {
                continue;
            };
            if stat == LOCATION_KEY {
                raw.location_csk = cell.value().attr("csk").map(str::to_string);
            }
            raw.insert(stat, cell_text(cell));
        }

        (!raw.is_empty()).then_some(raw)
    }
}

/// Cell text with each text node trimmed, joined without separators
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().map(str::trim).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"<table id="pbp">
<thead>
  <tr><th colspan="3">Game</th><th colspan="2">Score</th></tr>
  <tr><th>Quarter</th><th>Time</th><th>Location</th><th>Detail</th><th>Away</th></tr>
</thead>
<tbody>
  <tr><th data-stat="quarter">1</th><td data-stat="qtr_time_remain">15:00</td><td data-stat="location" csk="65">SFO 35</td><td data-stat="detail"><a href="/p">Player</a> kicks off</td><td data-stat="pbp_score_aw">0</td></tr>
  <tr class="thead"><th data-stat="quarter">Quarter</th></tr>
  <tr class="divider"><td data-stat="detail">End of quarter</td></tr>
  <tr><td colspan="5">no keys here</td></tr>
  <tr><th data-stat="quarter">2</th><td>unlabelled</td><td data-stat="location">PIT 20</td><td data-stat="detail">pass complete</td></tr>
</tbody>
</table>"#;

    fn page(body: &str) -> String {
        format!("<html><head><title>Box</title></head><body><div>{}</div></body></html>", body)
    }

    #[test]
    fn test_extracts_direct_table() {
        let table = extract_table(&page(TABLE), "pbp").unwrap();

        assert_eq!(
            table.headers,
            vec!["Quarter", "Time", "Location", "Detail", "Away"]
        );
        assert_eq!(table.rows.len(), 2);

        let first = &table.rows[0];
        assert_eq!(first.get("quarter"), Some("1"));
        assert_eq!(first.get("qtr_time_remain"), Some("15:00"));
        assert_eq!(first.get("location"), Some("SFO 35"));
        assert_eq!(first.location_csk.as_deref(), Some("65"));
        assert_eq!(first.get("detail"), Some("Playerkicks off"));
        assert_eq!(first.get("pbp_score_aw"), Some("0"));
    }

    #[test]
    fn test_cells_without_key_are_ignored() {
        let table = extract_table(&page(TABLE), "pbp").unwrap();
        let second = &table.rows[1];

        assert_eq!(second.len(), 3);
        assert_eq!(second.get("qtr_time_remain"), None);
        assert_eq!(second.location_csk, None);
    }

    #[test]
    fn test_comment_hidden_table_matches_direct() {
        let direct = extract_table(&page(TABLE), "pbp").unwrap();

        let hidden = page(&format!(
            "<div id=\"all_pbp\"><!-- unrelated --><!--\n{}\n--></div>",
            TABLE
        ));
        let from_comment = extract_table(&hidden, "pbp").unwrap();

        assert_eq!(direct, from_comment);
    }

    #[test]
    fn test_comment_mentioning_id_without_table_is_skipped() {
        let hidden = page(&format!(
            "<!-- see id=\"pbp\" below --><!--{}-->",
            TABLE
        ));
        let table = extract_table(&hidden, "pbp").unwrap();
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn test_missing_table() {
        let result = extract_table(&page("<table id=\"other\"></table>"), "pbp");
        assert!(matches!(
            result,
            Err(PlayError::TableNotFound { ref table_id }) if table_id == "pbp"
        ));
    }
}
