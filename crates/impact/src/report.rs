//! Summary tables for impact reports.
//!
//! Reports are assembled as an ordered list of rows and rendered to a single
//! line of HTML, the form the map-composition and dock collaborators embed.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::utilities::remove_double_spaces;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<String>,
    pub header: bool,
}

impl TableRow {
    pub fn new<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cells: cells.into_iter().map(Into::into).collect(),
            header: false,
        }
    }

    pub fn header<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            header: true,
            ..Self::new(cells)
        }
    }

    /// Single-cell row (captions, notes, the question line).
    pub fn text(text: impl Into<String>) -> Self {
        Self::new([text.into()])
    }

    pub fn header_text(text: impl Into<String>) -> Self {
        Self::header([text.into()])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub rows: Vec<TableRow>,
}

impl Table {
    pub fn new(rows: Vec<TableRow>) -> Self {
        Self { rows }
    }

    pub fn push(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// HTML rendering without any newline characters.
    pub fn to_newline_free_string(&self) -> String {
        let mut html = String::from("<table class=\"table table-striped condensed\"><tbody>");
        for row in &self.rows {
            let tag = if row.header { "th" } else { "td" };
            html.push_str("<tr>");
            for cell in &row.cells {
                let _ = write!(html, "<{tag}>{}</{tag}>", single_line(cell));
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table>");
        html
    }

    /// Plain text, one row per line, cells separated by ` | `.
    pub fn to_plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.cells.join(" | "))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// The question a report answers, e.g. "In the event of *Flood* how many
/// *People* might *be affected*?".
/// Runs of spaces in the titles collapse to one.
pub fn get_question(hazard_title: &str, exposure_title: &str, impact: &str) -> String {
    remove_double_spaces(&format!(
        "In the event of <i>{hazard_title}</i> how many <i>{exposure_title}</i> might <i>{impact}</i>?"
    ))
}

fn single_line(text: &str) -> String {
    text.split(['\n', '\r'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
