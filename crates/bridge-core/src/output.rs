//! The structured conversion result produced by the external engine.
//!
//! Every type deserializes from JSON with missing fields defaulted, so
//! scripted scenarios can spell out only what they need.

use serde::{Deserialize, Serialize};

use crate::input_state::ConversionMode;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    /// Whether the engine consumed the key that produced this output.
    pub consumed: bool,
    pub preedit: Option<Preedit>,
    pub result: Option<ResultText>,
    pub candidates: Option<CandidateList>,
    pub deletion: Option<DeletionRange>,
    /// Follow-up command to send back to the engine before materializing.
    pub callback: Option<SessionCommand>,
    pub status: Option<Status>,
}

impl Output {
    pub fn consumed() -> Self {
        Self {
            consumed: true,
            ..Self::default()
        }
    }

    pub fn with_preedit(mut self, preedit: Preedit) -> Self {
        self.preedit = Some(preedit);
        self
    }

    pub fn with_result(mut self, value: &str, key: &str) -> Self {
        self.result = Some(ResultText {
            value: value.to_string(),
            key: key.to_string(),
        });
        self
    }

    pub fn with_candidates(mut self, candidates: CandidateList) -> Self {
        self.candidates = Some(candidates);
        self
    }

    pub fn with_deletion(mut self, offset: i32, length: i32) -> Self {
        self.deletion = Some(DeletionRange { offset, length });
        self
    }

    pub fn with_callback(mut self, command: SessionCommand) -> Self {
        self.callback = Some(command);
        self
    }

    pub fn with_status(mut self, open: bool, mode: ConversionMode) -> Self {
        self.status = Some(Status { open, mode });
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Annotation {
    #[default]
    None,
    Underline,
    Highlight,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Segment {
    pub value: String,
    /// Reading of `value`.
    pub key: String,
    pub annotation: Annotation,
}

impl Segment {
    pub fn new(value: &str, key: &str, annotation: Annotation) -> Self {
        Self {
            value: value.to_string(),
            key: key.to_string(),
            annotation,
        }
    }

    pub fn plain(value: &str) -> Self {
        Self::new(value, value, Annotation::Underline)
    }

    pub fn highlighted(value: &str) -> Self {
        Self::new(value, value, Annotation::Highlight)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preedit {
    pub segments: Vec<Segment>,
    /// Cursor position in characters.
    pub cursor: usize,
    /// Character index the candidate window should align to.
    pub highlighted_position: Option<usize>,
}

impl Preedit {
    /// Segments with the cursor placed after the last character.
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        let cursor = segments.iter().map(|s| s.value.chars().count()).sum();
        Self {
            segments,
            cursor,
            highlighted_position: None,
        }
    }

    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.value.as_str()).collect()
    }

    pub fn has_highlight(&self) -> bool {
        self.segments
            .iter()
            .any(|s| s.annotation == Annotation::Highlight)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultText {
    pub value: String,
    pub key: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateCategory {
    #[default]
    Conversion,
    Prediction,
    Suggestion,
    Transliteration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Candidate {
    pub id: i32,
    pub value: String,
    pub reading: Option<String>,
}

impl Candidate {
    pub fn new(id: i32, value: &str) -> Self {
        Self {
            id,
            value: value.to_string(),
            reading: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateList {
    pub category: CandidateCategory,
    /// Whether the engine is showing a candidate window for this list.
    pub visible: bool,
    pub focused_index: Option<usize>,
    /// The full list, not only the currently paged subset.
    pub candidates: Vec<Candidate>,
}

impl CandidateList {
    pub fn visible(category: CandidateCategory, values: &[&str]) -> Self {
        Self {
            category,
            visible: true,
            focused_index: Some(0),
            candidates: values
                .iter()
                .enumerate()
                .map(|(i, v)| Candidate::new(i as i32, v))
                .collect(),
        }
    }

    pub fn with_focus(mut self, index: usize) -> Self {
        self.focused_index = Some(index);
        self
    }
}

/// Request to delete text around the cursor before applying the rest of the
/// Output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeletionRange {
    pub offset: i32,
    pub length: i32,
}

impl DeletionRange {
    /// Number of characters to delete, when the range is the supported shape
    /// "`length` characters immediately before the cursor".
    pub fn backspace_count(&self) -> Option<usize> {
        if self.length > 0 && self.offset == -self.length {
            Some(self.length as usize)
        } else {
            None
        }
    }
}

/// Commands the engine asks to have sent back to itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SessionCommand {
    Submit,
    Revert,
    Undo,
    /// Reconvert the text around the cursor. Only the host can supply that
    /// text, so this is never resolved inside the bridge.
    ConvertReverse,
    SelectCandidate { id: i32 },
    HighlightCandidate { id: i32 },
}

impl SessionCommand {
    pub fn is_reconversion(&self) -> bool {
        matches!(self, Self::ConvertReverse)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Status {
    pub open: bool,
    pub mode: ConversionMode,
}
