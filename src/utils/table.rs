//! Table rendering utilities for CLI outputs.

use unicode_width::UnicodeWidthStr;

pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Missing cells render empty; extra cells are ignored.
    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                self.rows
                    .iter()
                    .filter_map(|r| r.get(i))
                    .map(|c| UnicodeWidthStr::width(c.as_str()))
                    .chain(std::iter::once(UnicodeWidthStr::width(h.as_str())))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    pub fn render(&self) -> String {
        let widths = self.widths();
        let mut out = String::new();

        // Header
        let header: Vec<&str> = self.headers.iter().map(String::as_str).collect();
        out.push_str(&render_line(&header, &widths));

        // Separator
        let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        let sep: Vec<&str> = sep.iter().map(String::as_str).collect();
        out.push_str(&render_line(&sep, &widths));

        // Rows
        for row in &self.rows {
            let cells: Vec<&str> = (0..widths.len())
                .map(|i| row.get(i).map(String::as_str).unwrap_or(""))
                .collect();
            out.push_str(&render_line(&cells, &widths));
        }

        out
    }
}

fn render_line(cells: &[&str], widths: &[usize]) -> String {
    let mut line = String::new();
    for (cell, w) in cells.iter().zip(widths) {
        let pad = w.saturating_sub(UnicodeWidthStr::width(*cell));
        line.push_str(cell);
        line.push_str(&" ".repeat(pad + 2));
    }
    let mut line = line.trim_end().to_string();
    line.push('\n');
    line
}
