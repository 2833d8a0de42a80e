//! Candidate buffer with page emulation.
//!
//! The engine has no paging concept. Hosts tolerate any stable non-zero page
//! size but break on 0 or on echoing their own requested size back, so the
//! page size is fixed.

use tracing::warn;

use crate::message::{MessageKind, NotificationMessage, CANDIDATE_WINDOW_MASK};
use crate::output::{CandidateCategory, Output};

pub const PAGE_SIZE: u32 = 9;

/// Number of leading `u32` header fields in the serialized buffer.
const HEADER_FIELDS: usize = 4;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSnapshot {
    pub selection: u32,
    pub page_start: u32,
    pub candidates: Vec<String>,
    /// Null-terminated UTF-16 runs, one per candidate.
    text: Vec<u16>,
    /// Start of each candidate's run within `text`, in UTF-16 units.
    offsets: Vec<u32>,
}

impl CandidateSnapshot {
    fn from_values(values: Vec<String>, selection: u32) -> Self {
        let mut text = Vec::new();
        let mut offsets = Vec::with_capacity(values.len());
        for value in &values {
            offsets.push(text.len() as u32);
            text.extend(value.encode_utf16());
            text.push(0);
        }
        Self {
            selection,
            page_start: (selection / PAGE_SIZE) * PAGE_SIZE,
            candidates: values,
            text,
            offsets,
        }
    }

    pub fn count(&self) -> u32 {
        self.candidates.len() as u32
    }

    pub fn page_size(&self) -> u32 {
        PAGE_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn text_at(&self, index: usize) -> Option<&str> {
        self.candidates.get(index).map(String::as_str)
    }

    /// Serialize as `[count][selection][page_start][page_size][offset..]
    /// [utf16 blob]`, all little-endian. Each offset is a byte offset from the
    /// start of the buffer to the candidate's null-terminated run.
    pub fn to_buffer(&self) -> Vec<u8> {
        let blob_start = (HEADER_FIELDS + self.offsets.len()) * 4;
        let mut buf = Vec::with_capacity(blob_start + self.text.len() * 2);
        for field in [self.count(), self.selection, self.page_start, PAGE_SIZE] {
            buf.extend_from_slice(&field.to_le_bytes());
        }
        for &offset in &self.offsets {
            let byte_offset = blob_start as u32 + offset * 2;
            buf.extend_from_slice(&byte_offset.to_le_bytes());
        }
        for unit in &self.text {
            buf.extend_from_slice(&unit.to_le_bytes());
        }
        buf
    }
}

/// Candidate buffer for `output`. Empty unless the list is visible and not a
/// suggestion; suggestion popups never populate the host buffer.
pub fn build(output: &Output) -> CandidateSnapshot {
    let Some(list) = &output.candidates else {
        return CandidateSnapshot::default();
    };
    if !list.visible || list.category == CandidateCategory::Suggestion {
        return CandidateSnapshot::default();
    }

    let values: Vec<String> = list.candidates.iter().map(|c| c.value.clone()).collect();
    let selection = match list.focused_index {
        Some(i) if i < values.len() => i,
        Some(i) => {
            warn!(focused = i, count = values.len(), "focused candidate out of range");
            0
        }
        None => 0,
    };
    CandidateSnapshot::from_values(values, selection as u32)
}

/// Open / change / close notification for moving from `previous` to `next`.
pub fn transition(previous: &CandidateSnapshot, next: &CandidateSnapshot) -> Vec<NotificationMessage> {
    let kind = match (previous.is_empty(), next.is_empty()) {
        (true, false) => MessageKind::CandidateOpened,
        (false, false) if previous != next => MessageKind::CandidateChanged,
        (false, true) => MessageKind::CandidateClosed,
        _ => return Vec::new(),
    };
    vec![NotificationMessage::with_params(kind, 0, CANDIDATE_WINDOW_MASK)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::CandidateList;

    fn read_u32(buf: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
    }

    fn read_run(buf: &[u8], at: usize) -> String {
        let mut units = Vec::new();
        let mut i = at;
        loop {
            let u = u16::from_le_bytes([buf[i], buf[i + 1]]);
            if u == 0 {
                break;
            }
            units.push(u);
            i += 2;
        }
        String::from_utf16(&units).unwrap()
    }

    fn values(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("候補{i}")).collect()
    }

    fn list(n: usize, focus: usize) -> CandidateList {
        let v = values(n);
        let refs: Vec<&str> = v.iter().map(String::as_str).collect();
        CandidateList::visible(CandidateCategory::Conversion, &refs).with_focus(focus)
    }

    #[test]
    fn test_build_uses_full_list_and_fixed_page() {
        let out = Output::consumed().with_candidates(list(20, 13));
        let snap = build(&out);
        assert_eq!(snap.count(), 20);
        assert_eq!(snap.selection, 13);
        assert_eq!(snap.page_start, 9);
        assert_eq!(snap.page_size(), 9);
        assert_eq!(snap.text_at(19), Some("候補19"));
    }

    #[test]
    fn test_page_size_independent_of_count() {
        let snap = build(&Output::consumed().with_candidates(list(2, 1)));
        assert_eq!(snap.page_size(), 9);
        assert_eq!(snap.page_start, 0);
    }

    #[test]
    fn test_suggestion_and_hidden_lists_are_empty() {
        let v = ["a", "b"];
        let suggest = CandidateList::visible(CandidateCategory::Suggestion, &v);
        assert!(build(&Output::consumed().with_candidates(suggest)).is_empty());

        let mut hidden = CandidateList::visible(CandidateCategory::Prediction, &v);
        hidden.visible = false;
        assert!(build(&Output::consumed().with_candidates(hidden)).is_empty());

        assert!(build(&Output::consumed()).is_empty());
    }

    #[test]
    fn test_out_of_range_focus_selects_first() {
        let mut l = list(3, 0);
        l.focused_index = Some(7);
        let snap = build(&Output::consumed().with_candidates(l));
        assert_eq!(snap.selection, 0);
    }

    #[test]
    fn test_buffer_layout() {
        let out = Output::consumed().with_candidates(
            CandidateList::visible(CandidateCategory::Conversion, &["今日", "😀", "京"]).with_focus(2),
        );
        let buf = build(&out).to_buffer();
        assert_eq!(read_u32(&buf, 0), 3);
        assert_eq!(read_u32(&buf, 4), 2);
        assert_eq!(read_u32(&buf, 8), 0);
        assert_eq!(read_u32(&buf, 12), 9);
        let blob_start = (4 + 3) * 4;
        assert_eq!(read_u32(&buf, 16), blob_start as u32);
        assert_eq!(read_run(&buf, read_u32(&buf, 16) as usize), "今日");
        assert_eq!(read_run(&buf, read_u32(&buf, 20) as usize), "😀");
        assert_eq!(read_run(&buf, read_u32(&buf, 24) as usize), "京");
        // 今日\0 😀\0 京\0 = 3 + 3 + 2 units
        assert_eq!(buf.len(), blob_start + 8 * 2);
    }

    #[test]
    fn test_transitions() {
        let empty = CandidateSnapshot::default();
        let a = build(&Output::consumed().with_candidates(list(3, 0)));
        let b = build(&Output::consumed().with_candidates(list(3, 1)));

        let open = transition(&empty, &a);
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].kind, MessageKind::CandidateOpened);
        assert_eq!(open[0].param_b, CANDIDATE_WINDOW_MASK);
        assert_eq!(transition(&a, &b)[0].kind, MessageKind::CandidateChanged);
        assert!(transition(&a, &a).is_empty());
        assert_eq!(transition(&b, &empty)[0].kind, MessageKind::CandidateClosed);
        assert!(transition(&empty, &empty).is_empty());
    }
}
