//! EDF text output.
//!
//! Child records are written under the parent record that owns them, with
//! the parent-key prefix removed. Positional rows are written on their
//! introducer line, their `Comment` as the trailing comment.

use super::EdfDocument;
use crate::constants::{CHILD_KEY_SEPARATOR, header_fields};
use crate::schema::BlockKind;
use crate::table::RectangularTable;

pub fn render(doc: &EdfDocument) -> String {
    let mut out = String::new();

    for (key, value) in doc.metadata.iter() {
        out.push_str(&format!("# {}: {}\n", key, value));
    }
    if !doc.metadata.is_empty() {
        out.push('\n');
    }

    if let Some(experiment) = &doc.experiment {
        out.push_str(&format!("{}: {}\n", header_fields::EXPERIMENT, experiment));
    }
    for include in &doc.includes {
        let mut line = format!("{}: {}", header_fields::INCLUDE_FILE, include.quoted_name());
        for token in include.raw_time.iter().chain(&include.extra) {
            line.push(' ');
            line.push_str(token);
        }
        if let Some(comment) = &include.comment {
            line.push_str(" # ");
            line.push_str(comment);
        }
        out.push_str(&line);
        out.push('\n');
    }
    for (key, value) in doc.global_properties.iter().chain(doc.variables.iter()) {
        out.push_str(&format!("{}: {}\n", key, value));
    }

    for kind in BlockKind::ALL {
        if kind.parent().is_some() {
            continue;
        }
        let table = doc.table(kind);
        if table.is_empty() && kind.child().is_none_or(|c| doc.table(c).is_empty()) {
            continue;
        }
        out.push('\n');

        if kind.is_positional() {
            for row in 0..table.height() {
                out.push_str(&positional_line(kind, table, row));
                out.push('\n');
            }
            continue;
        }

        if let Some(child) = kind.child() {
            let orphans: Vec<usize> = doc
                .owners(child)
                .iter()
                .enumerate()
                .filter(|(_, owner)| owner.is_none())
                .map(|(index, _)| index)
                .collect();
            for index in orphans {
                write_record(&mut out, child, doc.table(child), index, None);
            }
        }

        for row in 0..table.height() {
            write_record(&mut out, kind, table, row, None);
            if let Some(child) = kind.child() {
                let parent_key = table.get(row, kind.introducer());
                for index in doc.children_of(kind, row) {
                    write_record(&mut out, child, doc.table(child), index, parent_key);
                }
            }
        }
    }

    if !doc.unclassified.is_empty() {
        out.push('\n');
        for line in &doc.unclassified {
            out.push_str(line);
            out.push('\n');
        }
    }

    out
}

/// `Introducer: v1 v2 ... # Comment`
fn positional_line(kind: BlockKind, table: &RectangularTable, row: usize) -> String {
    let mut line = format!("{}:", kind.introducer());
    let Some((comment_column, value_columns)) = table.columns().split_last() else {
        return line;
    };

    for column in value_columns {
        if let Some(value) = table.get(row, column) {
            line.push(' ');
            line.push_str(value);
        }
    }
    if let Some(comment) = table.get(row, comment_column) {
        line.push_str(" # ");
        line.push_str(comment);
    }
    line
}

/// Introducer line plus one `Field: value` line per present cell
fn write_record(
    out: &mut String,
    kind: BlockKind,
    table: &RectangularTable,
    row: usize,
    parent_key: Option<&str>,
) {
    let introducer = kind.introducer();

    if let Some(key) = table.get(row, introducer) {
        let key = parent_key
            .and_then(|parent| key.strip_prefix(parent))
            .and_then(|rest| rest.strip_prefix(CHILD_KEY_SEPARATOR))
            .unwrap_or(key);
        out.push_str(&format!("{}: {}\n", introducer, key));
    }
    for field in table.columns().iter().filter(|c| **c != introducer) {
        if let Some(value) = table.get(row, field) {
            out.push_str(&format!("{}: {}\n", field, value));
        }
    }
}
