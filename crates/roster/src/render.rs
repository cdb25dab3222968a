//! Text rendering of records for the CLI and shell.

use std::fmt::Write as _;

use crate::error::Result;
use crate::record::{Candidate, Record};
use crate::validate::{Field, FieldErrors};

const HEADERS: [&str; 5] = ["#", "Name", "Email", "Age", "Id"];

/// Render records as an aligned table with a header row.
#[must_use]
pub fn table(records: &[Record]) -> String {
    let rows: Vec<[String; 5]> = records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            [
                i.to_string(),
                r.name.clone(),
                r.email.clone(),
                r.age.to_string(),
                r.id.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &HEADERS.map(String::from), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule, &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    if rows.is_empty() {
        out.push_str("(no records)\n");
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(col, (cell, width))| {
            // Age and row number read better right-aligned.
            if col == 0 || col == 3 {
                format!("{cell:>width$}")
            } else {
                format!("{cell:<width$}")
            }
        })
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

/// Render one record per line: `index name <email> age`.
#[must_use]
pub fn plain(records: &[Record]) -> String {
    let mut out = String::new();
    for (i, r) in records.iter().enumerate() {
        let _ = writeln!(out, "{i}\t{}\t<{}>\t{}", r.name, r.email, r.age);
    }
    out
}

/// Render records as a pretty JSON array in the server's shape.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn json(records: &[Record]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Render form values, with each field's error beneath it.
#[must_use]
pub fn form(title: &str, values: &Candidate, errors: &FieldErrors) -> String {
    let mut out = format!("{title}\n");
    for field in Field::ALL {
        let value = match field {
            Field::Name => &values.name,
            Field::Email => &values.email,
            Field::Age => &values.age,
        };
        let _ = writeln!(out, "  {:<6} {value}", format!("{field}:"));
        if let Some(message) = errors.get(field) {
            let _ = writeln!(out, "         ! {message}");
        }
    }
    out
}
