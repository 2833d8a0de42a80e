use bridge_core::candidate::CandidateSnapshot;
use bridge_core::composition::CompositionSnapshot;
use bridge_core::message::{MessageKind, NotificationMessage};

/// How the host should treat the key it just delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientAction {
    DoDefault,
    /// Treat the key as a character key carrying this scalar value.
    DoDefaultWithCodepoint(u32),
    /// Let the application receive the key untouched.
    ForwardToHost,
    ConsumeSilently,
    /// A deletion cycle was abandoned; the key was then handled as usual.
    AbortThenDoDefault,
    /// The deferred edit was applied by this key.
    ApplyPendingNow,
}

/// Answer to a test-phase query. `consumed` tells the host whether to eat the
/// key and follow up with the delivery phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestKeyResponse {
    pub action: ClientAction,
    pub consumed: bool,
}

impl TestKeyResponse {
    pub(crate) fn new(action: ClientAction, consumed: bool) -> Self {
        Self { action, consumed }
    }
}

/// Result of a delivery-phase key or of applying an Output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyResponse {
    pub action: ClientAction,
    pub consumed: bool,
    /// Ordered batch; ends with `UiRefresh` whenever non-empty.
    pub messages: Vec<NotificationMessage>,
    /// Present when the composition buffer was rewritten.
    pub composition: Option<CompositionSnapshot>,
    /// Present when the candidate buffer was rewritten.
    pub candidates: Option<CandidateSnapshot>,
}

impl KeyResponse {
    pub(crate) fn action_only(action: ClientAction, consumed: bool) -> Self {
        Self {
            action,
            consumed,
            messages: Vec::new(),
            composition: None,
            candidates: None,
        }
    }

    pub(crate) fn unchanged() -> Self {
        Self::action_only(ClientAction::DoDefault, false)
    }

    /// Prepend the batch of an earlier update applied within the same call.
    pub(crate) fn after(mut self, earlier: KeyResponse) -> Self {
        let mut messages = earlier.messages;
        messages.append(&mut self.messages);
        self.messages = messages;
        self.composition = self.composition.or(earlier.composition);
        self.candidates = self.candidates.or(earlier.candidates);
        self
    }

    pub fn message_kinds(&self) -> Vec<MessageKind> {
        self.messages.iter().map(|m| m.kind).collect()
    }

    #[cfg(test)]
    pub(crate) fn has_message(&self, kind: MessageKind) -> bool {
        self.messages.iter().any(|m| m.kind == kind)
    }
}
