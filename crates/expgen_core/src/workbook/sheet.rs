//! In-memory worksheet: a header row plus data rows.
//!
//! # Invariants
//! - Column lookup is case-insensitive and ignores surrounding whitespace.
//! - Fully blank data rows are dropped, but every kept row remembers its
//!   original spreadsheet line so diagnostics point at the right cell.
//! - Columns with a blank title are never matched by name.

use super::cell::Cell;

static EMPTY_CELL: Cell = Cell::Empty;

#[derive(Debug, Clone, PartialEq)]
struct SheetLine {
    line: u32,
    cells: Vec<Cell>,
}

/// One worksheet, detached from its source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    columns: Vec<String>,
    lines: Vec<SheetLine>,
    first_col: u32,
}

impl Sheet {
    /// Creates a sheet whose header sits on spreadsheet line 1, column `A`.
    pub fn new(name: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self::with_origin(name, columns, rows, 1, 0)
    }

    /// Creates a sheet whose header sits on `header_line` (1-based) and
    /// whose first column is `first_col` (0-based).
    pub fn with_origin(
        name: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<Cell>>,
        header_line: u32,
        first_col: u32,
    ) -> Self {
        let lines = rows
            .into_iter()
            .enumerate()
            .filter(|(_, cells)| cells.iter().any(|cell| !cell.is_blank()))
            .map(|(index, cells)| SheetLine {
                line: header_line + 1 + index as u32,
                cells,
            })
            .collect();

        Self {
            name: name.into(),
            columns: columns.into_iter().map(|c| c.trim().to_string()).collect(),
            lines,
            first_col,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column titles, trimmed, in sheet order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns whether the sheet has no data rows.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.lines.len()
    }

    /// Finds a column by title (case-insensitive).
    pub fn column_index(&self, title: &str) -> Option<usize> {
        let wanted = title.trim();
        if wanted.is_empty() {
            return None;
        }
        self.columns
            .iter()
            .position(|column| column.eq_ignore_ascii_case(wanted))
    }

    pub fn has_column(&self, title: &str) -> bool {
        self.column_index(title).is_some()
    }

    /// Spreadsheet letter of the column at `index` (e.g. `C`).
    pub fn column_letter(&self, index: usize) -> String {
        column_letter(self.first_col as usize + index)
    }

    /// Spreadsheet letter of a column looked up by title, or `?` when absent.
    pub fn column_letter_of(&self, title: &str) -> String {
        self.column_index(title)
            .map(|index| self.column_letter(index))
            .unwrap_or_else(|| "?".to_string())
    }

    /// Column titles that appear more than once (case-insensitive).
    pub fn duplicate_columns(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        let mut duplicates: Vec<String> = Vec::new();
        for column in self.columns.iter().filter(|c| !c.is_empty()) {
            let lowered = column.to_lowercase();
            if seen.contains(&lowered) {
                if !duplicates.contains(&lowered) {
                    duplicates.push(lowered);
                }
            } else {
                seen.push(lowered);
            }
        }
        duplicates
    }

    /// Iterates over data rows.
    pub fn rows(&self) -> impl Iterator<Item = SheetRow<'_>> {
        self.lines.iter().map(move |line| SheetRow { sheet: self, line })
    }
}

/// Borrowed view of one data row.
#[derive(Debug, Clone, Copy)]
pub struct SheetRow<'a> {
    sheet: &'a Sheet,
    line: &'a SheetLine,
}

impl<'a> SheetRow<'a> {
    /// 1-based spreadsheet line of this row.
    pub fn line(&self) -> u32 {
        self.line.line
    }

    /// Cell under the column with the given title; `Empty` when the column
    /// does not exist or the row is short.
    pub fn get(&self, title: &str) -> &'a Cell {
        match self.sheet.column_index(title) {
            Some(index) => self.at(index),
            None => &EMPTY_CELL,
        }
    }

    /// Cell at a column index; `Empty` when the row is short.
    pub fn at(&self, index: usize) -> &'a Cell {
        self.line.cells.get(index).unwrap_or(&EMPTY_CELL)
    }

    /// Spreadsheet reference (`B3`) of the cell under `title`.
    pub fn cell_ref(&self, title: &str) -> String {
        format!("{}{}", self.sheet.column_letter_of(title), self.line())
    }

    /// Spreadsheet reference of the cell at a column index.
    pub fn cell_ref_at(&self, index: usize) -> String {
        format!("{}{}", self.sheet.column_letter(index), self.line())
    }
}

/// Converts a 0-based column number to spreadsheet letters (`0` -> `A`,
/// `26` -> `AA`).
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::{column_letter, Cell, Sheet};

    fn sample() -> Sheet {
        Sheet::new(
            "layout",
            vec!["Layout_Name".into(), " type ".into(), "text".into()],
            vec![
                vec![Cell::Text("a".into()), Cell::Text("text".into())],
                vec![Cell::Empty, Cell::Text(" ".into())],
                vec![
                    Cell::Text("b".into()),
                    Cell::Text("text".into()),
                    Cell::Text("hi".into()),
                ],
            ],
        )
    }

    #[test]
    fn column_letters_follow_spreadsheet_convention() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(column_letter(52), "BA");
    }

    #[test]
    fn lookup_is_case_insensitive_and_trimmed() {
        let sheet = sample();
        assert_eq!(sheet.column_index("layout_name"), Some(0));
        assert_eq!(sheet.column_index("TYPE"), Some(1));
        assert_eq!(sheet.column_index("missing"), None);
    }

    #[test]
    fn blank_rows_are_dropped_but_line_numbers_kept() {
        let sheet = sample();
        let lines: Vec<u32> = sheet.rows().map(|row| row.line()).collect();
        assert_eq!(lines, vec![2, 4]);
    }

    #[test]
    fn short_rows_yield_empty_cells() {
        let sheet = sample();
        let first = sheet.rows().next().expect("first row");
        assert_eq!(first.get("text"), &Cell::Empty);
        assert_eq!(first.cell_ref("text"), "C2");
    }

    #[test]
    fn duplicate_columns_are_reported_once() {
        let sheet = Sheet::new(
            "trials",
            vec!["a".into(), "A".into(), "b".into(), "a".into(), "".into(), "".into()],
            vec![],
        );
        assert_eq!(sheet.duplicate_columns(), vec!["a".to_string()]);
    }
}
