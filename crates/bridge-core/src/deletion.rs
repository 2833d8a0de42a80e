//! Emulates "delete N characters before the cursor" by injecting synthetic
//! backspaces and tracking them as they come back through the host.
//!
//! For N characters the emulator injects N backspace down/up pairs followed by
//! one sentinel pair. The N real pairs are only seen in the test phase and are
//! forwarded to the application, which performs the deletion. The sentinel is
//! consumed: its delivery-phase key-down is where the deferred edit gets
//! applied, and its key-up closes the cycle.

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::input_state::InputState;
use crate::key::{vk, HostKeyboard, ModifierState, SyntheticKey};
use crate::output::Output;

/// The shape of key event the host is expected to deliver next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExpectedStep {
    TestDown,
    TestUp,
    Down,
    Up,
}

impl ExpectedStep {
    fn matches(self, vkey: u8, is_down: bool, is_test_phase: bool) -> bool {
        let (want_down, want_test) = match self {
            Self::TestDown => (true, true),
            Self::TestUp => (false, true),
            Self::Down => (true, false),
            Self::Up => (false, false),
        };
        vkey == vk::BACK && is_down == want_down && is_test_phase == want_test
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionAction {
    /// No deletion in flight, or it has not visibly started yet.
    DoDefault,
    /// Let the application receive the backspace.
    ForwardToHost,
    /// Eat the key without asking the engine.
    ConsumeSilently,
    /// Apply the deferred edit now.
    ApplyPendingNow,
    /// Last expected event seen; the caller must call `end`.
    EndDeletion,
    /// Unexpected event; the caller must call `end` and then handle the key
    /// as usual.
    AbortThenDoDefault,
}

/// An Output held back until the host has deleted the preceding text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    pub output: Output,
    pub target_state: InputState,
}

/// Synthetic events for deleting `count` characters: `count` backspace pairs
/// plus the sentinel pair.
pub fn synthesize_backspaces(count: usize) -> Vec<SyntheticKey> {
    let mut keys = Vec::with_capacity(2 * count + 2);
    for _ in 0..=count {
        keys.push(SyntheticKey {
            vkey: vk::BACK,
            is_down: true,
        });
        keys.push(SyntheticKey {
            vkey: vk::BACK,
            is_down: false,
        });
    }
    keys
}

#[derive(Debug, Default)]
pub struct DeletionEmulator {
    wait_queue: VecDeque<(ExpectedStep, DeletionAction)>,
    armed_len: usize,
    pending: Option<PendingEdit>,
    saved_modifiers: Option<ModifierState>,
    release_modifiers: bool,
}

impl DeletionEmulator {
    /// `release_modifiers`: clear held modifiers for the duration of the
    /// cycle so the injected backspaces are not read as Ctrl+Backspace etc.
    pub fn new(release_modifiers: bool) -> Self {
        Self {
            release_modifiers,
            ..Self::default()
        }
    }

    pub fn is_ongoing(&self) -> bool {
        !self.wait_queue.is_empty()
    }

    /// Start deleting `count` characters, deferring `edit` until they are gone.
    ///
    /// Any previous cycle is ended first. A `count` of zero leaves the emulator
    /// idle. When the deletion does not start (zero count, or the host refused
    /// the injected keys) the edit is handed back so the caller can apply it
    /// directly.
    #[allow(clippy::result_large_err)]
    pub fn begin(
        &mut self,
        count: usize,
        edit: PendingEdit,
        keyboard: &mut dyn HostKeyboard,
    ) -> Result<(), PendingEdit> {
        self.end(keyboard);
        if count == 0 {
            return Err(edit);
        }

        if self.release_modifiers {
            let held = keyboard.modifiers();
            if !held.is_empty() {
                debug!(?held, "releasing modifiers for synthetic backspaces");
                keyboard.set_modifiers(ModifierState::default());
                self.saved_modifiers = Some(held);
            }
        }

        for _ in 0..count {
            self.wait_queue
                .push_back((ExpectedStep::TestDown, DeletionAction::ForwardToHost));
            self.wait_queue
                .push_back((ExpectedStep::TestUp, DeletionAction::ForwardToHost));
        }
        self.wait_queue.extend([
            (ExpectedStep::TestDown, DeletionAction::ConsumeSilently),
            (ExpectedStep::Down, DeletionAction::ApplyPendingNow),
            (ExpectedStep::TestUp, DeletionAction::ConsumeSilently),
            (ExpectedStep::Up, DeletionAction::EndDeletion),
        ]);
        self.armed_len = self.wait_queue.len();
        self.pending = Some(edit);

        if !keyboard.send_input(&synthesize_backspaces(count)) {
            warn!(count, "host refused synthetic backspaces");
            let edit = self.pending.take();
            self.end(keyboard);
            return edit.map_or(Ok(()), Err);
        }
        debug!(count, steps = self.armed_len, "deletion armed");
        Ok(())
    }

    pub fn on_key_event(&mut self, vkey: u8, is_down: bool, is_test_phase: bool) -> DeletionAction {
        let Some(&(step, action)) = self.wait_queue.front() else {
            return DeletionAction::DoDefault;
        };

        // Unrelated keys may still arrive before the first backspace shows up.
        let first = self.wait_queue.len() == self.armed_len;
        let matched = step.matches(vkey, is_down, is_test_phase);
        if first && !matched {
            return DeletionAction::DoDefault;
        }

        self.wait_queue.pop_front();
        if matched {
            action
        } else {
            debug!(?step, vkey, is_down, is_test_phase, "deletion desync");
            DeletionAction::AbortThenDoDefault
        }
    }

    /// Take the deferred edit. Called once, on `ApplyPendingNow`.
    pub fn take_pending_edit(&mut self) -> Option<PendingEdit> {
        self.pending.take()
    }

    /// Clear all deletion state and restore modifiers released by `begin`.
    /// Safe to call when idle.
    pub fn end(&mut self, keyboard: &mut dyn HostKeyboard) {
        self.wait_queue.clear();
        self.armed_len = 0;
        self.pending = None;
        if let Some(saved) = self.saved_modifiers.take() {
            keyboard.set_modifiers(saved);
        }
    }
}
