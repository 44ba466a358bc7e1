//! ITL text output.
//!
//! Parameters carrying a comment are written one per physical line so the
//! comment can follow each of them.

use super::{ItlDocument, ItlEvent};
use crate::constants::INCLUDE_KEYWORD;
use crate::models::IncludeOrigin;

pub fn render(doc: &ItlDocument) -> String {
    let mut out = String::new();

    for (key, value) in doc.metadata.iter() {
        out.push_str(&format!("# {}: {}\n", key, value));
    }
    if !doc.metadata.is_empty() {
        out.push('\n');
    }

    let header_includes: Vec<_> = doc
        .includes
        .iter()
        .filter(|i| i.origin == IncludeOrigin::Header)
        .cloned()
        .collect();
    doc.header.render(&header_includes, &mut out);
    out.push('\n');

    for event in &doc.events {
        out.push_str(&render_event(event));
        out.push('\n');
    }

    for include in doc
        .includes
        .iter()
        .filter(|i| i.origin == IncludeOrigin::Timeline)
    {
        let mut line = format!(
            "{} {} {}",
            include.raw_time.as_deref().unwrap_or_default(),
            INCLUDE_KEYWORD,
            include.quoted_name()
        );
        for extra in &include.extra {
            line.push(' ');
            line.push_str(extra);
        }
        if let Some(comment) = &include.comment {
            line.push_str(" # ");
            line.push_str(comment);
        }
        out.push_str(line.trim_start());
        out.push('\n');
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

/// One timed line, possibly continued over several physical lines
pub fn render_event(event: &ItlEvent) -> String {
    let mut line = format!("{} {}", event.raw_time, event.experiment);
    for part in [&event.mode, &event.action].into_iter().flatten() {
        line.push(' ');
        line.push_str(part);
    }

    let params = &event.parameters;
    if params.is_empty() {
        if let Some(comment) = &event.comment {
            line.push_str(" # ");
            line.push_str(comment);
        }
        return line;
    }

    if params.iter().all(|p| p.comment.is_none()) {
        let assignments: Vec<String> = params.iter().map(|p| p.assignment()).collect();
        line.push_str(&format!(" ({})", assignments.join(" ")));
        if let Some(comment) = &event.comment {
            line.push_str(" # ");
            line.push_str(comment);
        }
        return line;
    }

    line.push_str(" (");
    let last = params.len() - 1;
    for (index, param) in params.iter().enumerate() {
        if index > 0 {
            line.push_str("    ");
        }
        line.push_str(&param.assignment());

        if index < last {
            line.push_str(" \\");
            if let Some(comment) = &param.comment {
                line.push_str(" # ");
                line.push_str(comment);
            }
            line.push('\n');
            continue;
        }

        match &param.comment {
            Some(comment) => line.push_str(&format!(" # {})", comment)),
            None => line.push(')'),
        }
        if let Some(comment) = &event.comment {
            line.push_str(&format!(" # {}", comment));
        }
    }

    line
}
