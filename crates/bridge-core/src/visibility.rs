//! Which of the bridge's own UI surfaces should be drawn.
//!
//! A notification is first dispatched as if nobody handled it: the matching
//! surface is speculatively hidden. Only if the host forwards the message back
//! to the bridge's UI window does the confirmation call make it visible again.
//! Hosts that draw their own composition or candidate UI simply never forward,
//! and the bridge stays out of their way.

use crate::message::MessageKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Composition,
    Candidate,
    Suggest,
}

/// Host bits saying which UI surfaces the bridge may draw itself.
pub mod context_bits {
    pub const COMPOSITION_WINDOW: u32 = 0x8000_0000;
    /// One bit per candidate window; four windows.
    pub const CANDIDATE_WINDOW_0: u32 = 0x0000_0001;
    pub const ALL_CANDIDATE_WINDOWS: u32 = 0x0000_000F;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiVisibilityTracker {
    composition_window: bool,
    candidate_window: bool,
    // Defaults to true: switching input methods from an external switcher
    // sends no set-context notification, and suggestions must still show.
    suggest_window: bool,
    ui_activated: bool,
}

impl Default for UiVisibilityTracker {
    fn default() -> Self {
        Self {
            composition_window: false,
            candidate_window: false,
            suggest_window: true,
            ui_activated: false,
        }
    }
}

impl UiVisibilityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_visibility_test(&mut self, surface: Surface) {
        match surface {
            Surface::Composition => self.composition_window = false,
            Surface::Candidate => self.candidate_window = false,
            Surface::Suggest => self.suggest_window = false,
        }
    }

    /// Start the test for the surface a dispatched message belongs to, or
    /// close the surface for messages that end it.
    pub fn on_message_dispatched(&mut self, kind: MessageKind) {
        match kind {
            MessageKind::CompositionStarted | MessageKind::CompositionUpdated => {
                self.begin_visibility_test(Surface::Composition)
            }
            MessageKind::CompositionEnded => self.composition_window = false,
            MessageKind::CandidateOpened | MessageKind::CandidateChanged => {
                self.begin_visibility_test(Surface::Candidate)
            }
            MessageKind::CandidateClosed => self.candidate_window = false,
            _ => {}
        }
    }

    pub fn on_start_composition(&mut self) {
        self.composition_window = true;
    }

    pub fn on_composition(&mut self) {
        self.composition_window = true;
    }

    pub fn on_end_composition(&mut self) {
        self.composition_window = false;
    }

    pub fn on_candidate_open(&mut self) {
        self.candidate_window = true;
    }

    pub fn on_candidate_change(&mut self) {
        self.candidate_window = true;
    }

    /// There is one logical candidate surface; every window index maps to it.
    pub fn on_candidate_close(&mut self, _window_index: u32) {
        self.candidate_window = false;
    }

    pub fn on_focus(&mut self) {
        self.ui_activated = true;
    }

    pub fn on_blur(&mut self) {
        self.ui_activated = false;
    }

    /// Some hosts clear only the first candidate bit while intending to draw
    /// all candidate UI themselves, so every candidate bit must be set.
    pub fn on_set_context(&mut self, allowed: u32) {
        self.suggest_window =
            allowed & context_bits::ALL_CANDIDATE_WINDOWS == context_bits::ALL_CANDIDATE_WINDOWS;
    }

    pub fn is_composition_window_visible(&self) -> bool {
        self.ui_activated && self.composition_window
    }

    pub fn is_candidate_window_visible(&self) -> bool {
        self.ui_activated && self.candidate_window
    }

    pub fn is_suggest_window_visible(&self) -> bool {
        self.ui_activated && self.suggest_window
    }

    pub fn is_any_window_visible(&self) -> bool {
        self.is_composition_window_visible()
            || self.is_candidate_window_visible()
            || self.is_suggest_window_visible()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let mut t = UiVisibilityTracker::new();
        assert!(!t.is_any_window_visible());
        t.on_focus();
        assert!(!t.is_composition_window_visible());
        assert!(!t.is_candidate_window_visible());
        assert!(t.is_suggest_window_visible());
    }

    #[test]
    fn test_test_then_confirm() {
        let mut t = UiVisibilityTracker::new();
        t.on_focus();
        t.on_message_dispatched(MessageKind::CompositionStarted);
        assert!(!t.is_composition_window_visible());
        t.on_start_composition();
        assert!(t.is_composition_window_visible());

        // Host draws its own UI this time: no confirmation arrives.
        t.on_message_dispatched(MessageKind::CompositionUpdated);
        assert!(!t.is_composition_window_visible());
        t.on_composition();
        assert!(t.is_composition_window_visible());
        t.on_end_composition();
        assert!(!t.is_composition_window_visible());
    }

    #[test]
    fn test_candidate_close_any_index() {
        let mut t = UiVisibilityTracker::new();
        t.on_focus();
        t.on_candidate_open();
        assert!(t.is_candidate_window_visible());
        t.on_candidate_close(2);
        assert!(!t.is_candidate_window_visible());
    }

    #[test]
    fn test_blur_gates_everything() {
        let mut t = UiVisibilityTracker::new();
        t.on_focus();
        t.on_candidate_open();
        t.on_start_composition();
        t.on_blur();
        assert!(!t.is_any_window_visible());
        t.on_focus();
        assert!(t.is_candidate_window_visible());
    }

    #[test]
    fn test_set_context_requires_all_candidate_bits() {
        let mut t = UiVisibilityTracker::new();
        t.on_focus();
        t.on_set_context(context_bits::COMPOSITION_WINDOW | context_bits::ALL_CANDIDATE_WINDOWS);
        assert!(t.is_suggest_window_visible());
        t.on_set_context(context_bits::ALL_CANDIDATE_WINDOWS & !context_bits::CANDIDATE_WINDOW_0);
        assert!(!t.is_suggest_window_visible());
        t.on_set_context(context_bits::CANDIDATE_WINDOW_0);
        assert!(!t.is_suggest_window_visible());
    }

    #[test]
    fn test_begin_visibility_test_suggest() {
        let mut t = UiVisibilityTracker::new();
        t.on_focus();
        t.begin_visibility_test(Surface::Suggest);
        assert!(!t.is_suggest_window_visible());
    }
}
