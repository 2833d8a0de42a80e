//! Global ordering of one batch of notifications.
//!
//! Several hosts mis-paint unless a candidate close is delivered before any
//! new composition paint, and unless composition end is the last composition
//! event. The order below is fixed regardless of arrival order:
//!
//! 1. open status changed, when turning on
//! 2. conversion mode changed, when changed
//! 3. every candidate close
//! 4. composition messages other than end, in original order
//! 5. remaining candidate messages
//! 6. composition end
//! 7. open status changed, when turning off
//! 8. one UI refresh marker

use crate::input_state::ConversionMode;
use crate::message::{MessageKind, NotificationMessage};

pub fn sort(
    composition_messages: &[NotificationMessage],
    candidate_messages: &[NotificationMessage],
    open_before: bool,
    mode_before: ConversionMode,
    open_after: bool,
    mode_after: ConversionMode,
) -> Vec<NotificationMessage> {
    let mut sorted = Vec::with_capacity(composition_messages.len() + candidate_messages.len() + 3);

    if !open_before && open_after {
        sorted.push(NotificationMessage::with_params(
            MessageKind::OpenStatusChanged,
            1,
            0,
        ));
    }
    if mode_before != mode_after {
        sorted.push(NotificationMessage::with_params(
            MessageKind::ConversionModeChanged,
            mode_after.to_host_bits(),
            0,
        ));
    }

    let (closes, others): (Vec<NotificationMessage>, Vec<NotificationMessage>) =
        candidate_messages
            .iter()
            .copied()
            .partition(|m| m.kind == MessageKind::CandidateClosed);
    sorted.extend(closes);

    sorted.extend(
        composition_messages
            .iter()
            .filter(|m| m.kind != MessageKind::CompositionEnded),
    );
    sorted.extend(others);
    sorted.extend(
        composition_messages
            .iter()
            .filter(|m| m.kind == MessageKind::CompositionEnded),
    );

    if open_before && !open_after {
        sorted.push(NotificationMessage::with_params(
            MessageKind::OpenStatusChanged,
            0,
            0,
        ));
    }
    sorted.push(NotificationMessage::new(MessageKind::UiRefresh));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::CANDIDATE_WINDOW_MASK;

    use crate::message::MessageKind::*;

    fn msg(kind: MessageKind) -> NotificationMessage {
        NotificationMessage::new(kind)
    }

    fn kinds(messages: &[NotificationMessage]) -> Vec<MessageKind> {
        messages.iter().map(|m| m.kind).collect()
    }

    const H: ConversionMode = ConversionMode::Hiragana;

    #[test]
    fn test_close_first_end_last() {
        let comp = [msg(CompositionUpdated), msg(CompositionEnded)];
        let cand = [
            NotificationMessage::with_params(CandidateClosed, 0, CANDIDATE_WINDOW_MASK),
        ];
        let sorted = sort(&comp, &cand, true, H, true, H);
        assert_eq!(
            kinds(&sorted),
            vec![CandidateClosed, CompositionUpdated, CompositionEnded, UiRefresh]
        );
    }

    #[test]
    fn test_candidate_params_survive_sorting() {
        let cand = [
            NotificationMessage::with_params(CandidateOpened, 0, CANDIDATE_WINDOW_MASK),
            NotificationMessage::with_params(CandidateClosed, 7, CANDIDATE_WINDOW_MASK),
        ];
        let sorted = sort(&[], &cand, true, H, true, H);
        assert_eq!(sorted[0], cand[1]);
        assert_eq!(sorted[1], cand[0]);
        assert_eq!(sorted.len(), 3);
    }

    #[test]
    fn test_close_pulled_out_regardless_of_position() {
        let comp = [msg(CompositionStarted), msg(CompositionUpdated)];
        let cand = [msg(CandidateChanged), msg(CandidateClosed), msg(CandidateOpened)];
        let sorted = sort(&comp, &cand, true, H, true, H);
        assert_eq!(
            kinds(&sorted),
            vec![
                CandidateClosed,
                CompositionStarted,
                CompositionUpdated,
                CandidateChanged,
                CandidateOpened,
                UiRefresh
            ]
        );
    }

    #[test]
    fn test_open_and_mode_lead() {
        let comp = [msg(CompositionStarted)];
        let sorted = sort(&comp, &[], false, H, true, ConversionMode::FullKatakana);
        assert_eq!(
            kinds(&sorted),
            vec![OpenStatusChanged, ConversionModeChanged, CompositionStarted, UiRefresh]
        );
        assert_eq!(sorted[0].param_a, 1);
        assert_eq!(sorted[1].param_a, ConversionMode::FullKatakana.to_host_bits());
    }

    #[test]
    fn test_close_status_trails() {
        let comp = [msg(CompositionUpdated), msg(CompositionEnded)];
        let cand = [msg(CandidateClosed)];
        let sorted = sort(&comp, &cand, true, H, false, H);
        assert_eq!(
            kinds(&sorted),
            vec![
                CandidateClosed,
                CompositionUpdated,
                CompositionEnded,
                OpenStatusChanged,
                UiRefresh
            ]
        );
        assert_eq!(sorted[3].param_a, 0);
    }

    #[test]
    fn test_refresh_always_appended() {
        assert_eq!(kinds(&sort(&[], &[], false, H, false, H)), vec![UiRefresh]);
    }
}
