//! Tabular output.
//!
//! On a terminal, columns are padded to a common width. Otherwise fields are
//! tab-separated so the output stays easy to parse.

use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;

const COLUMN_SEPARATOR: &str = "  ";

pub struct TablePrinter {
    is_tty: bool,
    rows: Vec<Vec<String>>,
    current: Vec<String>,
}

impl TablePrinter {
    pub fn new(is_tty: bool) -> Self {
        Self {
            is_tty,
            rows: Vec::new(),
            current: Vec::new(),
        }
    }

    pub fn is_tty(&self) -> bool {
        self.is_tty
    }

    pub fn add_field(&mut self, text: impl Into<String>) {
        self.current.push(text.into());
    }

    pub fn end_row(&mut self) {
        self.rows.push(std::mem::take(&mut self.current));
    }

    /// Write every row ended with [`TablePrinter::end_row`].
    pub fn render<W: Write>(self, out: &mut W) -> io::Result<()> {
        if !self.is_tty {
            for row in &self.rows {
                writeln!(out, "{}", row.join("\t"))?;
            }
            return Ok(());
        }

        let widths = self.column_widths();
        for row in &self.rows {
            let mut line = String::new();
            for (i, field) in row.iter().enumerate() {
                if i > 0 {
                    line.push_str(COLUMN_SEPARATOR);
                }
                line.push_str(field);
                // The last column is never padded.
                if i + 1 < row.len() {
                    let pad = widths[i].saturating_sub(field.width());
                    line.extend(std::iter::repeat_n(' ', pad));
                }
            }
            writeln!(out, "{}", line)?;
        }

        Ok(())
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = Vec::new();
        for row in &self.rows {
            for (i, field) in row.iter().enumerate() {
                let width = field.width();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(width),
                    None => widths.push(width),
                }
            }
        }
        widths
    }
}
