//! Keyword-block reader for EDF bodies.
//!
//! The reader scans normalized lines. A block-introducing keyword
//! (`Module:`, `PID:`, ...) hands the following lines to the block reader
//! for that kind, which keeps consuming field lines until a line of any
//! other shape or a different top-level introducer shows up. Fields that
//! belong to no block are recorded as variables and never raise.

use crate::config::ParserConfig;
use crate::constants::{
    CHILD_KEY_SEPARATOR, COMMENT_MARKER, EDF_GLOBAL_PROPERTIES, FIELD_SUFFIX, SELECTIVE_MODIFIER,
    header_fields,
};
use crate::models::{IncludeFile, Metadata};
use crate::normalizer::{LineKind, NormalizedLine};
use crate::schema::BlockKind;
use crate::table::RaggedTable;
use std::collections::HashMap;
use tracing::debug;

/// Everything collected from an EDF body, before materialization
#[derive(Debug, Clone, Default)]
pub struct BlockReadout {
    pub tables: HashMap<BlockKind, RaggedTable>,
    /// Parent row index for every child record
    pub owners: HashMap<BlockKind, Vec<Option<usize>>>,
    pub experiment: Option<String>,
    pub includes: Vec<IncludeFile>,
    pub global_properties: Metadata,
    pub variables: Metadata,
    pub unclassified: Vec<String>,
}

impl BlockReadout {
    pub fn table(&self, kind: BlockKind) -> Option<&RaggedTable> {
        self.tables.get(&kind)
    }

    pub fn owners(&self, kind: BlockKind) -> &[Option<usize>] {
        self.owners.get(&kind).map(|o| o.as_slice()).unwrap_or(&[])
    }
}

/// Split a `Field: value...` line into key and value tokens
pub fn parse_field(line: &NormalizedLine) -> Option<(&str, Vec<&str>)> {
    let mut tokens = line.text.split_whitespace();
    let first = tokens.next()?;
    let key = first.strip_suffix(FIELD_SUFFIX)?;
    if key.is_empty() {
        return None;
    }
    Some((key, tokens.collect()))
}

pub struct BlockReader<'a> {
    config: &'a ParserConfig,
    out: BlockReadout,
}

impl<'a> BlockReader<'a> {
    pub fn new(config: &'a ParserConfig) -> Self {
        Self {
            config,
            out: BlockReadout::default(),
        }
    }

    /// Scan all body lines
    pub fn read(mut self, lines: &[NormalizedLine]) -> BlockReadout {
        let mut pos = 0;

        while pos < lines.len() {
            let line = &lines[pos];
            match line.kind {
                LineKind::Blank => pos += 1,
                LineKind::Comment => {
                    self.out.unclassified.push(line.text.clone());
                    pos += 1;
                }
                LineKind::Data => match parse_field(line) {
                    Some((key, value)) => match BlockKind::from_introducer(key) {
                        Some(kind) if !value.is_empty() => {
                            pos += self.read_block(kind, &lines[pos..]);
                        }
                        Some(_) => pos += 1,
                        None => {
                            self.record_variable(key, &value, line);
                            pos += 1;
                        }
                    },
                    None => {
                        self.out.unclassified.push(line.text.clone());
                        pos += 1;
                    }
                },
            }
        }

        debug!(
            "Read {} block tables, {} variables, {} unclassified lines",
            self.out.tables.len(),
            self.out.variables.len(),
            self.out.unclassified.len()
        );

        self.out
    }

    /// Read one block starting at its introducer line.
    ///
    /// Returns the number of lines consumed, at least one.
    pub fn read_block(&mut self, kind: BlockKind, lines: &[NormalizedLine]) -> usize {
        let child = kind.child();
        let mut active = kind;
        let mut consumed = 0;

        for line in lines {
            match line.kind {
                LineKind::Blank => {}
                LineKind::Comment => self.out.unclassified.push(line.text.clone()),
                LineKind::Data => {
                    let Some((key, value)) = parse_field(line) else {
                        break;
                    };

                    match BlockKind::from_introducer(key) {
                        Some(_) if value.is_empty() => {}
                        Some(intro) if intro == kind || Some(intro) == child => {
                            active = intro;
                            self.open_record(intro, line, &value);
                        }
                        Some(_) => break,
                        None if value.is_empty() => {}
                        None => {
                            let target = [Some(active), Some(kind), child]
                                .into_iter()
                                .flatten()
                                .find(|k| k.has_field(key));
                            let stored = target.is_some_and(|t| self.set_field(t, key, &value));
                            if !stored {
                                self.record_variable(key, &value, line);
                            }
                        }
                    }
                }
            }
            consumed += 1;
        }

        self.close_block(kind);
        consumed.max(1)
    }

    fn open_record(&mut self, kind: BlockKind, line: &NormalizedLine, value: &[&str]) {
        if kind.is_positional() {
            let fields = positional_fields(kind, value, line.comment.as_deref());
            let table = self.out.tables.entry(kind).or_default();
            table.start_record();
            for (column, cell) in fields {
                table.set(column, &cell);
            }
            return;
        }

        let mut key = value.join(" ");

        if let Some(parent) = kind.parent() {
            let parent_table = self.out.tables.get(&parent).filter(|t| !t.is_empty());
            let owner = parent_table.map(|t| t.records() - 1);

            if self.config.prefix_child_keys {
                if let Some(parent_key) = parent_table.and_then(|t| t.current(parent.introducer())) {
                    key = format!("{}{}{}", parent_key, CHILD_KEY_SEPARATOR, key);
                }
            }

            self.out.owners.entry(kind).or_default().push(owner);
        }

        let table = self.out.tables.entry(kind).or_default();
        table.start_record();
        table.set(kind.introducer(), &key);
    }

    fn set_field(&mut self, kind: BlockKind, key: &str, value: &[&str]) -> bool {
        let stored = self
            .out
            .tables
            .get_mut(&kind)
            .is_some_and(|table| table.set(key, &value.join(" ")));
        if !stored {
            debug!("Field '{}' outside any {} record", key, kind);
        }
        stored
    }

    fn close_block(&mut self, kind: BlockKind) {
        for k in [Some(kind), kind.child()].into_iter().flatten() {
            if let Some(table) = self.out.tables.get_mut(&k) {
                table.close_record();
            }
        }
    }

    fn record_variable(&mut self, key: &str, value: &[&str], line: &NormalizedLine) {
        match key {
            header_fields::EXPERIMENT => self.out.experiment = Some(value.join(" ")),
            header_fields::INCLUDE_FILE | header_fields::INCLUDE => {
                if let Some(include) =
                    IncludeFile::from_header_tokens(value, line.comment.clone(), line.number)
                {
                    self.out.includes.push(include);
                }
            }
            _ if EDF_GLOBAL_PROPERTIES.contains(&key) => {
                self.out.global_properties.insert(key, value.join(" "));
            }
            _ => self.out.variables.insert(key, value.join(" ")),
        }
    }
}

/// Split a positional introducer line into declared columns.
///
/// Bracket groups join into the preceding size value. Extra tokens and
/// the line's trailing comment fill `Comment`, joined by `#` when both exist.
pub fn positional_fields(
    kind: BlockKind,
    tokens: &[&str],
    comment: Option<&str>,
) -> Vec<(&'static str, String)> {
    let groups = bracket_groups(tokens);
    let mut fields = Vec::new();
    let mut pos = 0;

    let columns = kind.columns();
    let value_columns = &columns[..columns.len() - 1];

    for (index, column) in value_columns.iter().enumerate() {
        if pos >= groups.len() {
            break;
        }

        let value = match (kind, index) {
            // Only SELECTIVE joins the label; bracket groups belong to the sizes
            (BlockKind::DataStore, 0) => {
                let mut label = groups[pos].clone();
                pos += 1;
                if groups
                    .get(pos)
                    .is_some_and(|g| g.eq_ignore_ascii_case(SELECTIVE_MODIFIER))
                {
                    label = format!("{} {}", label, groups[pos]);
                    pos += 1;
                }
                label
            }
            (BlockKind::DataStore, 1 | 2) | (BlockKind::Fts, 2) => {
                let (value, next) = take_compound(&groups, pos);
                pos = next;
                value
            }
            _ => {
                pos += 1;
                groups[pos - 1].clone()
            }
        };
        fields.push((*column, value));
    }

    let comment_column = columns[columns.len() - 1];
    let extra = (pos < groups.len()).then(|| groups[pos..].join(" "));
    let text = match (extra, comment) {
        (Some(extra), Some(comment)) => Some(format!("{} {} {}", extra, COMMENT_MARKER, comment)),
        (Some(extra), None) => Some(extra),
        (None, comment) => comment.map(str::to_string),
    };
    if let Some(text) = text {
        fields.push((comment_column, text));
    }

    fields
}

fn is_bracket_group(token: &str) -> bool {
    token.starts_with('[') && token.ends_with(']')
}

/// Merge `[a`, `b]` into one `[a b]` token
fn bracket_groups(tokens: &[&str]) -> Vec<String> {
    let mut groups: Vec<String> = Vec::new();
    let mut open: Option<String> = None;

    for token in tokens {
        match open.take() {
            Some(mut group) => {
                group.push(' ');
                group.push_str(token);
                if token.ends_with(']') {
                    groups.push(group);
                } else {
                    open = Some(group);
                }
            }
            None if token.starts_with('[') && !token.ends_with(']') => {
                open = Some(token.to_string());
            }
            None => groups.push(token.to_string()),
        }
    }
    if let Some(group) = open {
        groups.push(group);
    }

    groups
}

/// A value plus any bracket groups directly following it
fn take_compound(groups: &[String], pos: usize) -> (String, usize) {
    let mut value = groups[pos].clone();
    let mut next = pos + 1;
    while next < groups.len() && is_bracket_group(&groups[next]) {
        value.push(' ');
        value.push_str(&groups[next]);
        next += 1;
    }
    (value, next)
}
