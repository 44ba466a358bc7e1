//! EVF text output

use super::{EvfDocument, EvfEvent};
use crate::constants::evf_keys;

pub fn render(doc: &EvfDocument) -> String {
    let mut out = String::new();

    for (key, value) in doc.metadata.iter() {
        out.push_str(&format!("# {}: {}\n", key, value));
    }
    if !doc.metadata.is_empty() {
        out.push('\n');
    }

    doc.header.render(&doc.includes, &mut out);
    out.push('\n');

    for event in &doc.events {
        out.push_str(&render_event(event));
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

pub fn render_event(event: &EvfEvent) -> String {
    let mut line = format!("{}   {}", event.raw_time, event.event);

    let mut group = Vec::new();
    if let Some(experiment) = &event.experiment {
        group.push(format!("{} = {}", evf_keys::EXPERIMENT, experiment));
    }
    if let Some(item) = &event.item {
        group.push(format!("{} = {}", evf_keys::ITEM, item));
    }
    if !group.is_empty() {
        line.push_str(&format!("  ({})", group.join(" ")));
    }
    if let Some(count) = event.count {
        line.push_str(&format!(" ({} = {})", evf_keys::COUNT, count));
    }
    if let Some(comment) = &event.comment {
        line.push_str(" # ");
        line.push_str(comment);
    }

    line
}
