//! Timed EVF line parsing.
//!
//! An event line reads `time event [(EXP = x ITEM = y)] [(COUNT = n)] [# comment]`.

use crate::constants::evf_keys;
use crate::error::{EpsError, Result};
use crate::itl::details::{Piece, pieces};
use crate::normalizer::NormalizedLine;
use tracing::debug;

/// Event fields before time resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvfDraft {
    pub line: usize,
    pub raw_time: String,
    pub event: String,
    pub experiment: Option<String>,
    pub item: Option<String>,
    pub count: Option<u64>,
    pub comment: Option<String>,
}

pub fn parse_event_line(line: &NormalizedLine) -> Result<EvfDraft> {
    let pieces = pieces(line);
    let mut words = pieces.iter().map_while(|p| match p {
        Piece::Word(w) => Some(w.as_str()),
        _ => None,
    });

    let (raw_time, event) = match (words.next(), words.next()) {
        (Some(time), Some(event)) => (time.to_string(), event.to_string()),
        _ => {
            return Err(EpsError::malformed_value(
                "event",
                line.text.clone(),
                "event line has no event name",
            ));
        }
    };

    let mut draft = EvfDraft {
        line: line.number,
        raw_time,
        event,
        experiment: None,
        item: None,
        count: None,
        comment: None,
    };

    let mut comments = Vec::new();
    let mut stray = Vec::new();
    for (key, value) in assignments(line, &pieces[2..], &mut stray, &mut comments)? {
        if key.eq_ignore_ascii_case(evf_keys::EXPERIMENT) {
            draft.experiment = Some(value);
        } else if key.eq_ignore_ascii_case(evf_keys::ITEM) {
            draft.item = Some(value);
        } else if key.eq_ignore_ascii_case(evf_keys::COUNT) {
            let count = value.parse::<u64>().map_err(|_| {
                EpsError::malformed_value(evf_keys::COUNT, value.clone(), "not an unsigned integer")
            })?;
            draft.count = Some(count);
        } else {
            stray.push(format!("{} = {}", key, value));
        }
    }

    // Unexpected tokens lead the event comment
    if !stray.is_empty() {
        debug!(
            "Line {}: keeping unexpected tokens in comment: {}",
            line.number,
            stray.join(" ")
        );
        comments.insert(0, stray.join(" "));
    }

    if !comments.is_empty() {
        draft.comment = Some(comments.join(" "));
    }
    Ok(draft)
}

/// `KEY = value` pairs from the parenthesized groups.
///
/// Tokens outside any group, and group words before the first key, go to `stray`.
fn assignments(
    line: &NormalizedLine,
    pieces: &[Piece],
    stray: &mut Vec<String>,
    comments: &mut Vec<String>,
) -> Result<Vec<(String, String)>> {
    let mut pairs: Vec<(String, Vec<String>)> = Vec::new();
    let mut pending: Vec<String> = Vec::new();
    let mut in_group = false;
    // Whether words still extend the last pair
    let mut pair_open = false;

    for piece in pieces {
        match piece {
            Piece::Open if in_group => stray.push("(".to_string()),
            Piece::Open => in_group = true,
            Piece::Close if in_group => {
                in_group = false;
                pair_open = false;
                stray.append(&mut pending);
            }
            Piece::Close => stray.push(")".to_string()),
            Piece::Word(word) if !in_group => stray.push(word.clone()),
            Piece::Word(word) => match pairs.last_mut() {
                Some((_, values)) if pair_open => values.push(word.clone()),
                _ => pending.push(word.clone()),
            },
            Piece::Equals if !in_group => stray.push("=".to_string()),
            Piece::Equals => {
                let key = match pairs.last_mut() {
                    Some((_, values)) if pair_open => values.pop(),
                    _ => pending.pop(),
                };
                let key = key.ok_or_else(|| {
                    EpsError::malformed_value("event", line.text.clone(), "assignment without a key")
                })?;
                stray.append(&mut pending);
                pairs.push((key, Vec::new()));
                pair_open = true;
            }
            Piece::Comment(text) | Piece::ContinuedComment(text) if !text.is_empty() => {
                comments.push(text.clone())
            }
            Piece::Comment(_) | Piece::ContinuedComment(_) => {}
        }
    }
    stray.append(&mut pending);

    Ok(pairs
        .into_iter()
        .map(|(key, values)| (key, values.join(" ")))
        .collect())
}
