use tracing::{debug, debug_span, error, warn};

use bridge_core::candidate;
use bridge_core::composition;
use bridge_core::deletion::PendingEdit;
use bridge_core::input_state::InputState;
use bridge_core::message::{MessageKind, NotificationMessage};
use bridge_core::output::{DeletionRange, Output};
use bridge_core::sequencer;

use super::response::{ClientAction, KeyResponse};
use super::InputContext;

impl InputContext {
    /// Apply an engine Output: either start a deletion cycle that defers it, or
    /// materialize it now. Nothing is applied while a deletion is in flight;
    /// its deferred edit has to land first.
    pub fn update_context(&mut self, mut output: Output) -> KeyResponse {
        let _span = debug_span!("update_context", consumed = output.consumed).entered();
        if self.deleter.is_ongoing() {
            warn!("Output dropped while a deletion is in flight");
            return KeyResponse::action_only(ClientAction::DoDefault, output.consumed);
        }
        let target_state = self.input_state.apply_status(output.status.as_ref());

        let Some(range) = output.deletion.take() else {
            return self.apply_output(output, target_state);
        };
        match self.deletion_count(&range) {
            Some(count) => self.begin_deletion(count, output, target_state),
            None => self.apply_output(output, target_state),
        }
    }

    /// Number of backspaces for `range`, or `None` when the range is ignored.
    fn deletion_count(&self, range: &DeletionRange) -> Option<usize> {
        let Some(count) = range.backspace_count() else {
            warn!(offset = range.offset, length = range.length, "unsupported deletion range");
            return None;
        };
        if count > self.config.max_deletion {
            warn!(count, max = self.config.max_deletion, "deletion too long");
            return None;
        }
        Some(count)
    }

    fn begin_deletion(&mut self, count: usize, output: Output, target_state: InputState) -> KeyResponse {
        let consumed = output.consumed;

        // The host must not see stale composition text while it deletes.
        let cleared = if self.composition.is_composing() {
            self.apply_output(Output::default(), self.input_state)
        } else {
            KeyResponse::unchanged()
        };

        let edit = PendingEdit {
            output,
            target_state,
        };
        match self.deleter.begin(count, edit, self.keyboard.as_mut()) {
            Ok(()) => KeyResponse::action_only(ClientAction::DoDefault, consumed).after(cleared),
            Err(edit) => {
                debug!("deletion not started; applying edit now");
                let mut response = self.apply_output(edit.output, edit.target_state).after(cleared);
                response.consumed = consumed;
                response
            }
        }
    }

    pub(crate) fn apply_pending_edit(&mut self) -> KeyResponse {
        let mut response = match self.deleter.take_pending_edit() {
            Some(edit) => self.apply_output(edit.output, edit.target_state),
            None => {
                debug!("apply step reached without a pending edit");
                KeyResponse::unchanged()
            }
        };
        response.action = ClientAction::ApplyPendingNow;
        response.consumed = true;
        response
    }

    /// Materialize `output` and commit the new snapshots and state.
    fn apply_output(&mut self, output: Output, target_state: InputState) -> KeyResponse {
        let consumed = output.consumed;
        let (output, target_state, extras) = self.resolve_follow_ups(output, target_state);

        let update = match composition::build(&self.composition, &output, &self.config.limits) {
            Ok(update) => update,
            Err(e) => {
                error!(error = %e, "composition overflow; keeping previous state");
                return KeyResponse::action_only(ClientAction::DoDefault, consumed);
            }
        };
        let candidates = candidate::build(&output);
        let candidate_messages = candidate::transition(&self.candidates, &candidates);

        let mut messages = sequencer::sort(
            &update.messages,
            &candidate_messages,
            self.input_state.open,
            self.input_state.mode,
            target_state.open,
            target_state.mode,
        );
        let refresh = messages.len().saturating_sub(1);
        messages.splice(refresh..refresh, extras);

        for message in &messages {
            self.visibility.on_message_dispatched(message.kind);
        }

        let composition = (update.snapshot != self.composition).then(|| update.snapshot.clone());
        let candidates_out = (candidates != self.candidates).then(|| candidates.clone());
        self.composition = update.snapshot;
        self.candidates = candidates;
        self.input_state = target_state;

        let response = KeyResponse {
            action: ClientAction::DoDefault,
            consumed,
            messages,
            composition,
            candidates: candidates_out,
        };
        debug!(messages = ?response.message_kinds(), "output applied");
        response
    }

    /// Replace `output` by what the engine answers to its follow-up commands.
    /// Reconversion cannot be resolved here and is surfaced to the host instead.
    fn resolve_follow_ups(
        &mut self,
        mut output: Output,
        mut target_state: InputState,
    ) -> (Output, InputState, Vec<NotificationMessage>) {
        let mut extras = Vec::new();
        let mut remaining = self.config.max_follow_ups;

        while let Some(command) = output.callback.take() {
            if command.is_reconversion() {
                debug!("reconversion requested");
                extras.push(NotificationMessage::new(MessageKind::ReconversionRequested));
                break;
            }
            if remaining == 0 {
                warn!(?command, "follow-up limit reached; dropping command");
                break;
            }
            remaining -= 1;

            match self.engine.resolve(&command) {
                Ok(mut next) => {
                    if next.deletion.take().is_some() {
                        warn!(?command, "deletion in follow-up output ignored");
                    }
                    target_state = target_state.apply_status(next.status.as_ref());
                    next.consumed = output.consumed;
                    output = next;
                }
                Err(e) => {
                    warn!(?command, error = %e, "follow-up command failed");
                    break;
                }
            }
        }
        (output, target_state, extras)
    }
}
