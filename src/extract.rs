// src/extract.rs
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// CSS selector for the rendered observation table container. The fetch layer
/// polls for this before grabbing the page source.
pub const OBSERVATION_TABLE_SELECTOR: &str =
    "div.observation-table.ng-star-inserted";

/// One extracted cell: plain trimmed text, or the flattened rows of a nested
/// inner table (one `Vec<String>` per inner `tr`).
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Rows(Vec<Vec<String>>),
}

/// One extracted row. Order is load-bearing: the reshaper assigns rows to
/// measurement columns purely by position.
pub type Row = Vec<Cell>;

/// Locators for the outer observation table, most specific first.
/// First match wins; no match means no data.
const TABLE_LOCATORS: &[&str] = &[
    "div.observation-table.ng-star-inserted table",
    "table.days.ng-star-inserted",
    "table.ng-star-inserted",
];

/// Flatten the observation table of a rendered history page into rows.
///
/// Walks every `tr` under the outer table in document order, including the
/// rows of nested per-measurement tables, and keeps any row with at least one
/// `td`. A cell holding an inner table becomes [`Cell::Rows`]; everything
/// else becomes its trimmed text. The first two collected rows are fixed
/// layout noise and are dropped.
///
/// A page with no matching table yields an empty `Vec`, not an error.
pub fn extract_observation_rows(html: &str) -> Vec<Row> {
    let doc = Html::parse_document(html);

    let outer = match find_outer_table(&doc) {
        Some(el) => el,
        None => {
            debug!("no observation table matched any locator");
            return Vec::new();
        }
    };

    let tr_sel = Selector::parse("tr").expect("valid tr selector");
    let td_sel = Selector::parse("td").expect("valid td selector");
    let table_sel = Selector::parse("table").expect("valid table selector");

    let mut data: Vec<Row> = Vec::new();
    for row in outer.select(&tr_sel) {
        let cells: Vec<ElementRef> = row.select(&td_sel).collect();
        if cells.is_empty() {
            continue;
        }
        let mut row_data: Row = Vec::with_capacity(cells.len());
        for cell in cells {
            if let Some(inner) = cell.select(&table_sel).next() {
                let mut inner_data = Vec::new();
                for inner_row in inner.select(&tr_sel) {
                    let inner_cells: Vec<String> =
                        inner_row.select(&td_sel).map(cell_text).collect();
                    if !inner_cells.is_empty() {
                        inner_data.push(inner_cells);
                    }
                }
                row_data.push(Cell::Rows(inner_data));
            } else {
                row_data.push(Cell::Text(cell_text(cell)));
            }
        }
        data.push(row_data);
    }

    debug!(rows = data.len(), "collected observation rows");
    // First two rows are header/noise in the fixed page layout.
    data.into_iter().skip(2).collect()
}

fn find_outer_table(doc: &Html) -> Option<ElementRef<'_>> {
    for locator in TABLE_LOCATORS {
        let sel = Selector::parse(locator).expect("valid table locator");
        if let Some(el) = doc.select(&sel).next() {
            return Some(el);
        }
    }
    None
}

fn cell_text(cell: ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    // Mirrors the real page shape: an outer table whose cells each hold an
    // inner per-measurement table. Walking `tr` recursively yields the outer
    // row first, then every inner row in document order.
    const NESTED_PAGE: &str = r#"
        <html><body>
        <div class="observation-table ng-star-inserted">
          <table>
            <tr><th>ignored header</th></tr>
            <tr>
              <td>
                <table>
                  <tr><td>May</td></tr>
                  <tr><td>1</td></tr>
                  <tr><td>2</td></tr>
                </table>
              </td>
              <td>
                <table>
                  <tr><td>Max</td><td>Avg</td><td>Min</td></tr>
                  <tr><td> 82 </td><td>75</td><td>68</td></tr>
                  <tr><td>80</td><td>74</td><td>66</td></tr>
                </table>
              </td>
            </tr>
          </table>
        </div>
        </body></html>"#;

    #[test]
    fn flattens_nested_tables_and_drops_first_two_rows() {
        let rows = extract_observation_rows(NESTED_PAGE);

        // Collected order: the outer row first, then every inner row in
        // document order. Dropping the first two (outer row + "May" label)
        // leaves the day rows and the second measurement's rows.
        assert_eq!(
            rows,
            vec![
                vec![text("1")],
                vec![text("2")],
                vec![text("Max"), text("Avg"), text("Min")],
                vec![text("82"), text("75"), text("68")],
                vec![text("80"), text("74"), text("66")],
            ]
        );
    }

    #[test]
    fn outer_row_cells_include_nested_rows() {
        // Same document, but inspect the rows before the drop by prepending
        // two throwaway rows so the outer row survives the slice.
        let html = NESTED_PAGE.replace(
            "<tr><th>ignored header</th></tr>",
            "<tr><td>noise-a</td></tr><tr><td>noise-b</td></tr>",
        );
        let rows = extract_observation_rows(&html);

        // First surviving row is the outer row; its first cell is the whole
        // flattened Time table.
        assert_eq!(
            rows[0][0],
            Cell::Rows(vec![
                vec!["May".to_string()],
                vec!["1".to_string()],
                vec!["2".to_string()],
            ])
        );
    }

    #[test]
    fn falls_back_to_more_generic_locators() {
        let html = r#"
            <html><body>
            <table class="days ng-star-inserted">
              <tr><td>a</td></tr>
              <tr><td>b</td></tr>
              <tr><td>c</td></tr>
            </table>
            </body></html>"#;
        let rows = extract_observation_rows(html);
        assert_eq!(rows, vec![vec![text("c")]]);

        let html = html.replace("days ng-star-inserted", "ng-star-inserted");
        let rows = extract_observation_rows(&html);
        assert_eq!(rows, vec![vec![text("c")]]);
    }

    #[test]
    fn missing_table_yields_empty() {
        let rows = extract_observation_rows("<html><body><p>nothing</p></body></html>");
        assert!(rows.is_empty());
    }

    #[test]
    fn rows_without_cells_are_skipped() {
        let html = r#"
            <table class="ng-star-inserted">
              <tr><th>h1</th><th>h2</th></tr>
              <tr><td>1</td></tr>
              <tr><td>2</td></tr>
              <tr><td>3</td></tr>
            </table>"#;
        // The header-only row never enters the collected set, so the drop
        // removes "1" and "2".
        assert_eq!(extract_observation_rows(html), vec![vec![text("3")]]);
    }
}
