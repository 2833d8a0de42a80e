//! Materializes an Output into the composition buffer the host reads, and
//! derives the start/update/end notifications for the transition.
//!
//! All offsets (clauses, cursor, focused index) are UTF-16 units: the host
//! counts a surrogate pair as two.

use tracing::warn;

use crate::message::{change_bits, MessageKind, NotificationMessage};
use crate::output::{Annotation, Output, Preedit, ResultText};
use crate::unicode::{char_index_to_utf16, last_utf16_unit, utf16_len};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionAttribute {
    /// Free text not yet converted.
    Input,
    /// The clause currently targeted for conversion.
    TargetConverted,
    /// Already converted, not targeted.
    Converted,
}

/// Fixed capacity of the host composition buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositionLimits {
    /// Maximum text length of any string field, in UTF-16 units.
    pub max_text_length: usize,
    /// Maximum entries of any clause array.
    pub max_clause_count: usize,
}

impl Default for CompositionLimits {
    fn default() -> Self {
        Self {
            max_text_length: 1024,
            max_clause_count: 256,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CompositionError {
    #[error("{field} is {length} UTF-16 units, capacity is {capacity}")]
    TextTooLong {
        field: &'static str,
        length: usize,
        capacity: usize,
    },
    #[error("{field} has {count} clause offsets, capacity is {capacity}")]
    TooManyClauses {
        field: &'static str,
        count: usize,
        capacity: usize,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositionSnapshot {
    pub text: String,
    pub reading: String,
    /// One attribute per UTF-16 unit of `text`.
    pub attributes: Vec<CompositionAttribute>,
    pub clauses: Vec<u32>,
    pub reading_clauses: Vec<u32>,
    pub result: String,
    pub result_reading: String,
    pub result_clauses: Vec<u32>,
    pub result_reading_clauses: Vec<u32>,
    pub cursor: u32,
    pub focused_index: u32,
}

impl CompositionSnapshot {
    pub fn is_composing(&self) -> bool {
        !self.attributes.is_empty()
    }
}

/// A new snapshot and the messages announcing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionUpdate {
    pub snapshot: CompositionSnapshot,
    pub messages: Vec<NotificationMessage>,
}

/// Build the snapshot for `output` and the notifications for moving to it from
/// `previous`.
///
/// An axis the Output does not carry raises no change bits and is empty in the
/// new snapshot. Fails as a whole on capacity overflow, leaving the caller's
/// previous snapshot untouched.
pub fn build(
    previous: &CompositionSnapshot,
    output: &Output,
    limits: &CompositionLimits,
) -> Result<CompositionUpdate, CompositionError> {
    let mut snapshot = CompositionSnapshot::default();
    if let Some(result) = &output.result {
        fill_result(&mut snapshot, result, limits)?;
    }
    if let Some(preedit) = &output.preedit {
        fill_preedit(&mut snapshot, preedit, limits)?;
    }
    let messages = transition_messages(previous, &snapshot, output);
    Ok(CompositionUpdate { snapshot, messages })
}

fn check_text(field: &'static str, s: &str, limits: &CompositionLimits) -> Result<usize, CompositionError> {
    let length = utf16_len(s);
    if length > limits.max_text_length {
        return Err(CompositionError::TextTooLong {
            field,
            length,
            capacity: limits.max_text_length,
        });
    }
    Ok(length)
}

/// Clause offsets from per-clause lengths: starts at 0, strictly increasing,
/// ends at the total. Zero-length clauses are skipped.
fn clause_offsets<I>(
    field: &'static str,
    lengths: I,
    limits: &CompositionLimits,
) -> Result<Vec<u32>, CompositionError>
where
    I: IntoIterator<Item = usize>,
{
    let mut offsets = vec![0u32];
    let mut total = 0usize;
    for len in lengths.into_iter().filter(|&l| l > 0) {
        total += len;
        offsets.push(total as u32);
    }
    if offsets.len() == 1 {
        return Ok(Vec::new());
    }
    if offsets.len() > limits.max_clause_count {
        return Err(CompositionError::TooManyClauses {
            field,
            count: offsets.len(),
            capacity: limits.max_clause_count,
        });
    }
    Ok(offsets)
}

fn fill_result(
    snapshot: &mut CompositionSnapshot,
    result: &ResultText,
    limits: &CompositionLimits,
) -> Result<(), CompositionError> {
    let len = check_text("result", &result.value, limits)?;
    let reading_len = check_text("result reading", &result.key, limits)?;
    snapshot.result = result.value.clone();
    snapshot.result_reading = result.key.clone();
    snapshot.result_clauses = clause_offsets("result clauses", [len], limits)?;
    snapshot.result_reading_clauses = clause_offsets("result reading clauses", [reading_len], limits)?;
    Ok(())
}

fn fill_preedit(
    snapshot: &mut CompositionSnapshot,
    preedit: &Preedit,
    limits: &CompositionLimits,
) -> Result<(), CompositionError> {
    let text = preedit.text();
    let reading: String = preedit.segments.iter().map(|s| s.key.as_str()).collect();
    let text_len = check_text("composition", &text, limits)?;
    check_text("composition reading", &reading, limits)?;

    let clauses = clause_offsets(
        "composition clauses",
        preedit.segments.iter().map(|s| utf16_len(&s.value)),
        limits,
    )?;
    let reading_clauses = clause_offsets(
        "composition reading clauses",
        preedit.segments.iter().map(|s| utf16_len(&s.key)),
        limits,
    )?;

    // Once any clause is highlighted, the remaining clauses have been
    // converted already.
    let default_attr = if preedit.has_highlight() {
        CompositionAttribute::Converted
    } else {
        CompositionAttribute::Input
    };
    let mut attributes = Vec::with_capacity(text_len);
    for segment in &preedit.segments {
        let attr = match segment.annotation {
            Annotation::Highlight => CompositionAttribute::TargetConverted,
            Annotation::None | Annotation::Underline => default_attr,
        };
        attributes.extend(std::iter::repeat(attr).take(utf16_len(&segment.value)));
    }

    let char_len = text.chars().count();
    let cursor_chars = if preedit.cursor > char_len {
        warn!(cursor = preedit.cursor, char_len, "preedit cursor out of range; clamping");
        char_len
    } else {
        preedit.cursor
    };
    let cursor = char_index_to_utf16(&text, cursor_chars);
    let focused_index = match preedit.highlighted_position {
        Some(pos) => char_index_to_utf16(&text, pos.min(char_len)),
        None => cursor,
    };

    snapshot.text = text;
    snapshot.reading = reading;
    snapshot.attributes = attributes;
    snapshot.clauses = clauses;
    snapshot.reading_clauses = reading_clauses;
    snapshot.cursor = cursor as u32;
    snapshot.focused_index = focused_index as u32;
    Ok(())
}

fn transition_messages(
    previous: &CompositionSnapshot,
    next: &CompositionSnapshot,
    output: &Output,
) -> Vec<NotificationMessage> {
    let was_empty = !previous.is_composing();
    let is_empty = !next.is_composing();
    let has_result = output.result.is_some();

    // Hosts expect Start/Update/End even for a result with no live
    // composition.
    let one_shot = was_empty && is_empty && has_result;
    let started = (was_empty && !is_empty) || one_shot;
    let ended = (!was_empty && is_empty) || one_shot;

    let mut messages = Vec::new();
    if started {
        messages.push(NotificationMessage::new(MessageKind::CompositionStarted));
    }

    let mut bits = 0;
    if output.preedit.is_some() {
        bits |= change_bits::PREEDIT;
    }
    if has_result {
        bits |= change_bits::RESULT;
    }
    if bits != 0 {
        messages.push(NotificationMessage::with_params(
            MessageKind::CompositionUpdated,
            u32::from(last_utf16_unit(&next.result)),
            bits,
        ));
    }

    if ended {
        if bits == 0 {
            messages.push(NotificationMessage::new(MessageKind::CompositionUpdated));
        }
        messages.push(NotificationMessage::new(MessageKind::CompositionEnded));
    }
    messages
}
