//! Grid tables drawn with box characters.
//!
//! Layout follows the familiar "fancy grid" look:
//!
//! ```text
//! ╒═══════╤═════════════╕
//! │ Nodes │ Voltage (V) │
//! ╞═══════╪═════════════╡
//! │ V12   │         1.5 │
//! ╘═══════╧═════════════╛
//! ```

use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    fn render(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(v) => v.to_string(),
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(self, Cell::Number(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self { headers: headers.iter().map(|h| h.to_string()).collect(), rows: Vec::new() }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn columns(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }

    pub fn render(&self) -> String {
        let ncols = self.columns();
        if ncols == 0 {
            return String::new();
        }

        // Ragged rows are padded, never cut.
        let header: Vec<String> = (0..ncols)
            .map(|c| self.headers.get(c).cloned().unwrap_or_default())
            .collect();
        let body: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|r| (0..ncols).map(|c| r.get(c).map(Cell::render).unwrap_or_default()).collect())
            .collect();

        let align: Vec<Align> = (0..ncols)
            .map(|c| {
                let numeric = !self.rows.is_empty()
                    && self.rows.iter().all(|r| r.get(c).map_or(true, Cell::is_numeric))
                    && self.rows.iter().any(|r| r.get(c).is_some());
                if numeric { Align::Right } else { Align::Left }
            })
            .collect();

        let widths: Vec<usize> = (0..ncols)
            .map(|c| {
                body.iter()
                    .map(|r| r[c].width())
                    .chain(std::iter::once(header[c].width()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        out.push_str(&rule(&widths, '╒', '═', '╤', '╕'));
        out.push_str(&row_line(&header, &widths, &align));
        if !body.is_empty() {
            out.push_str(&rule(&widths, '╞', '═', '╪', '╡'));
            for (i, r) in body.iter().enumerate() {
                if i > 0 {
                    out.push_str(&rule(&widths, '├', '─', '┼', '┤'));
                }
                out.push_str(&row_line(r, &widths, &align));
            }
        }
        out.push_str(&rule(&widths, '╘', '═', '╧', '╛'));
        out
    }
}

fn rule(widths: &[usize], left: char, fill: char, join: char, right: char) -> String {
    let segments: Vec<String> = widths.iter().map(|w| fill.to_string().repeat(w + 2)).collect();
    format!("{}{}{}\n", left, segments.join(&join.to_string()), right)
}

fn row_line(cells: &[String], widths: &[usize], align: &[Align]) -> String {
    let mut line = String::from("│");
    for ((cell, &w), &a) in cells.iter().zip(widths).zip(align) {
        let pad = " ".repeat(w.saturating_sub(cell.width()));
        match a {
            Align::Left => line.push_str(&format!(" {}{} │", cell, pad)),
            Align::Right => line.push_str(&format!(" {}{} │", pad, cell)),
        }
    }
    line.push('\n');
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_fancy_grid() {
        let mut t = Table::new(&["Nodes", "Voltage (V)"]);
        t.push_row(vec![Cell::text("V12"), Cell::Number(1.5)]);
        t.push_row(vec![Cell::text("V13"), Cell::Number(-2.0)]);

        let expected = "\
╒═══════╤═════════════╕
│ Nodes │ Voltage (V) │
╞═══════╪═════════════╡
│ V12   │         1.5 │
├───────┼─────────────┤
│ V13   │          -2 │
╘═══════╧═════════════╛
";
        assert_eq!(t.render(), expected);
    }

    #[test]
    fn wide_glyphs_use_display_width() {
        let mut t = Table::new(&["Direction"]);
        t.push_row(vec![Cell::text("1 → 2")]);
        for line in t.render().lines() {
            assert_eq!(line.width(), "│ Direction │".width());
        }
    }

    #[test]
    fn ragged_rows_are_padded_not_truncated() {
        let mut t = Table::new(&["A"]);
        t.push_row(vec![Cell::text("x"), Cell::text("overflow")]);
        let text = t.render();
        assert!(text.contains("overflow"));
        assert!(text.lines().all(|l| l.width() == text.lines().next().unwrap().width()));
    }

    #[test]
    fn header_only_table_has_no_body_separator() {
        let t = Table::new(&["Branch", "Current (mA)"]);
        let text = t.render();
        assert_eq!(text.lines().count(), 3);
        assert!(!text.contains('╞'));
    }
}
