//! Timed ITL line parsing.
//!
//! A timed line reads `time experiment [mode] [action] [(NAME = v... [# c]) ...] [# comment]`.
//! `INCLUDE` in the experiment or action slot turns the line into an
//! include directive.

use crate::constants::{COMMENT_MARKER, INCLUDE_KEYWORD, PTR_MODE, SOC_EXPERIMENT};
use crate::error::{EpsError, Result};
use crate::models::{ActionParameter, IncludeFile};
use crate::normalizer::NormalizedLine;
use tracing::debug;

/// Lexical unit of a timed line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    Word(String),
    Open,
    Close,
    Equals,
    /// Comment on the last physical line
    Comment(String),
    /// Comment after a continuation marker; it cannot close a group
    ContinuedComment(String),
}

/// Tokenize every fragment; `(`, `)` and `=` split even without spaces
pub fn pieces(line: &NormalizedLine) -> Vec<Piece> {
    let mut out = Vec::new();
    let last = line.fragments.len().saturating_sub(1);

    for (index, fragment) in line.fragments.iter().enumerate() {
        let spaced = fragment
            .text
            .replace('(', " ( ")
            .replace(')', " ) ")
            .replace('=', " = ");
        for token in spaced.split_whitespace() {
            out.push(match token {
                "(" => Piece::Open,
                ")" => Piece::Close,
                "=" => Piece::Equals,
                word => Piece::Word(word.to_string()),
            });
        }
        if let Some(comment) = &fragment.comment {
            out.push(if index < last {
                Piece::ContinuedComment(comment.clone())
            } else {
                Piece::Comment(comment.clone())
            });
        }
    }

    out
}

/// Event fields before time resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub line: usize,
    pub raw_time: String,
    pub experiment: String,
    pub mode: Option<String>,
    pub action: Option<String>,
    pub parameters: Vec<ActionParameter>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimedLine {
    Event(EventDraft),
    Include(IncludeFile),
}

/// Parse a line whose first token is a time token
pub fn parse_timed_line(line: &NormalizedLine) -> Result<TimedLine> {
    let pieces = pieces(line);
    let split = pieces
        .iter()
        .position(|p| !matches!(p, Piece::Word(_)))
        .unwrap_or(pieces.len());
    let (head, tail) = pieces.split_at(split);
    let words: Vec<&str> = head
        .iter()
        .filter_map(|p| match p {
            Piece::Word(w) => Some(w.as_str()),
            _ => None,
        })
        .collect();

    let (raw_time, experiment) = match words.as_slice() {
        [time, experiment, ..] => (*time, *experiment),
        _ => {
            return Err(EpsError::malformed_value(
                "experiment",
                line.text.clone(),
                "timed line has no experiment",
            ));
        }
    };

    if experiment.eq_ignore_ascii_case(INCLUDE_KEYWORD) {
        return include_directive(line, raw_time, &words[2..], tail);
    }

    let rest = &words[2..];
    let soc_without_mode = experiment.eq_ignore_ascii_case(SOC_EXPERIMENT)
        && rest.first().is_some_and(|t| !t.eq_ignore_ascii_case(PTR_MODE));
    let (mode, action, leftover) = if soc_without_mode {
        (None, rest.first().copied(), rest.get(1..).unwrap_or(&[]))
    } else {
        (
            rest.first().copied(),
            rest.get(1).copied(),
            rest.get(2..).unwrap_or(&[]),
        )
    };

    if action.is_some_and(|a| a.eq_ignore_ascii_case(INCLUDE_KEYWORD)) {
        return include_directive(line, raw_time, leftover, tail);
    }

    let (parameters, comment) = parse_parameters(line, leftover, tail)?;

    Ok(TimedLine::Event(EventDraft {
        line: line.number,
        raw_time: raw_time.to_string(),
        experiment: experiment.to_string(),
        mode: mode.map(str::to_string),
        action: action.map(str::to_string),
        parameters,
        comment,
    }))
}

fn include_directive(
    line: &NormalizedLine,
    raw_time: &str,
    words: &[&str],
    tail: &[Piece],
) -> Result<TimedLine> {
    let (file, extra) = words.split_first().ok_or_else(|| {
        EpsError::malformed_value("INCLUDE", line.text.clone(), "missing include file name")
    })?;
    let comment = join_comments(tail.iter().filter_map(|p| match p {
        Piece::Comment(c) | Piece::ContinuedComment(c) => Some(c.as_str()),
        _ => None,
    }));

    Ok(TimedLine::Include(IncludeFile::from_directive(
        raw_time,
        file,
        extra,
        comment,
        line.number,
    )))
}

/// Parameter groups plus the event comment.
///
/// Tokens outside any group, including `leftover` words after the action,
/// are kept at the front of the event comment.
fn parse_parameters(
    line: &NormalizedLine,
    leftover: &[&str],
    pieces: &[Piece],
) -> Result<(Vec<ActionParameter>, Option<String>)> {
    let mut params: Vec<ActionParameter> = Vec::new();
    let mut pending: Vec<String> = Vec::new();
    let mut stray: Vec<String> = leftover.iter().map(|w| w.to_string()).collect();
    let mut event_comments: Vec<String> = Vec::new();
    let mut in_group = false;

    for piece in pieces {
        match piece {
            Piece::Open if in_group => stray.push("(".to_string()),
            Piece::Open => in_group = true,
            Piece::Close if in_group => in_group = false,
            Piece::Close => stray.push(")".to_string()),
            Piece::Word(word) if in_group => match params.last_mut() {
                Some(param) => param.values.push(word.clone()),
                None => pending.push(word.clone()),
            },
            Piece::Word(word) => stray.push(word.clone()),
            Piece::Equals if !in_group => stray.push("=".to_string()),
            Piece::Equals => {
                let name = match params.last_mut() {
                    Some(param) => param.values.pop(),
                    None => pending.pop(),
                };
                let name = match name {
                    Some(name) => name,
                    None => {
                        return Err(EpsError::malformed_value(
                            "parameters",
                            line.text.clone(),
                            "parameter assignment without a name",
                        ));
                    }
                };
                params.push(ActionParameter::new(name));
            }
            Piece::ContinuedComment(text) if in_group => annotate(&mut params, text),
            Piece::Comment(text) if in_group => {
                let (param_comment, after) = match group_close(text) {
                    Some(index) => {
                        in_group = false;
                        (text[..index].trim(), Some(&text[index + 1..]))
                    }
                    None => (text.as_str(), None),
                };
                annotate(&mut params, param_comment);
                if let Some(after) = after {
                    let after = after.trim();
                    let after = after.strip_prefix(COMMENT_MARKER).unwrap_or(after).trim();
                    if !after.is_empty() {
                        event_comments.push(after.to_string());
                    }
                }
            }
            Piece::Comment(text) | Piece::ContinuedComment(text) => {
                event_comments.push(text.clone())
            }
        }
    }

    // Group words never assigned to a parameter
    stray.extend(pending);
    if !stray.is_empty() {
        debug!(
            "Line {}: keeping unexpected tokens in comment: {}",
            line.number,
            stray.join(" ")
        );
        event_comments.insert(0, stray.join(" "));
    }

    let comment = join_comments(event_comments.iter().map(String::as_str));
    Ok((params, comment))
}

/// Attach a comment to the parameter it follows
fn annotate(params: &mut [ActionParameter], comment: &str) {
    if comment.is_empty() {
        return;
    }
    if let Some(param) = params.last_mut() {
        param.comment = join_comments(param.comment.as_deref().into_iter().chain([comment]));
    }
}

/// The `)` closing a parameter group inside a trailing comment: the first
/// one followed only by whitespace or another comment
fn group_close(text: &str) -> Option<usize> {
    text.char_indices()
        .filter(|(_, c)| *c == ')')
        .map(|(index, _)| index)
        .find(|&index| {
            let rest = text[index + 1..].trim_start();
            rest.is_empty() || rest.starts_with(COMMENT_MARKER)
        })
}

fn join_comments<'a>(comments: impl Iterator<Item = &'a str>) -> Option<String> {
    let joined = comments
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!joined.is_empty()).then_some(joined)
}
