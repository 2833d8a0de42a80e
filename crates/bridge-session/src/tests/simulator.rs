use bridge_core::key::{vk, KeyEvent, LogicalKey, ModifierState};
use bridge_core::message::{change_bits, MessageKind};
use bridge_core::output::{CandidateCategory, CandidateList, Output, Preedit, Segment, SessionCommand};

use super::{default_settings, RecordingKeyboard};
use crate::engine::{ConversionEngine, EngineContext, EngineError};
use crate::{ClientAction, InputContext, KeyResponse};

pub(super) const VK_SPACE: u8 = 0x20;
pub(super) const VK_RETURN: u8 = 0x0D;
pub(super) const VK_ESCAPE: u8 = 0x1B;
pub(super) const VK_U: u8 = 0x55;

/// Toy engine: letters compose, Space converts to upper case, Return commits,
/// Ctrl+U rewrites the previous commit in upper case.
#[derive(Debug, Clone, Default)]
pub(super) struct CaseEngine {
    composing: String,
    converted: bool,
    last_commit: String,
}

impl CaseEngine {
    fn shown(&self) -> String {
        if self.converted {
            self.composing.to_uppercase()
        } else {
            self.composing.clone()
        }
    }

    fn preedit(&self) -> Output {
        if self.composing.is_empty() {
            return Output::consumed();
        }
        let segment = if self.converted {
            Segment::new(&self.shown(), &self.composing, bridge_core::output::Annotation::Highlight)
        } else {
            Segment::plain(&self.composing)
        };
        Output::consumed().with_preedit(Preedit::from_segments(vec![segment]))
    }

    fn apply(&mut self, key: &LogicalKey) -> Output {
        if !key.is_down {
            return Output::default();
        }
        if key.vkey == VK_U && key.modifiers.control {
            if self.composing.is_empty() && !self.last_commit.is_empty() {
                let n = self.last_commit.chars().count() as i32;
                let upper = self.last_commit.to_uppercase();
                self.last_commit = upper.clone();
                return Output::consumed()
                    .with_deletion(-n, n)
                    .with_result(&upper, &upper);
            }
            return Output::default();
        }
        if let Some(c) = key.codepoint.filter(|c| c.is_ascii_alphabetic()) {
            self.composing.push(c);
            self.converted = false;
            return self.preedit();
        }
        if self.composing.is_empty() {
            return Output::default();
        }
        match key.vkey {
            VK_SPACE => {
                self.converted = true;
                let upper = self.shown();
                let lower = self.composing.clone();
                self.preedit().with_candidates(CandidateList::visible(
                    CandidateCategory::Conversion,
                    &[upper.as_str(), lower.as_str()],
                ))
            }
            VK_RETURN => {
                let committed = self.shown();
                let reading = std::mem::take(&mut self.composing);
                self.converted = false;
                self.last_commit = committed.clone();
                Output::consumed().with_result(&committed, &reading)
            }
            vk::BACK => {
                self.composing.pop();
                self.preedit()
            }
            VK_ESCAPE => {
                self.composing.clear();
                self.converted = false;
                Output::consumed()
            }
            _ => Output::default(),
        }
    }
}

impl ConversionEngine for CaseEngine {
    fn evaluate(&mut self, key: &LogicalKey, context: &EngineContext) -> Result<Output, EngineError> {
        if context.is_test_phase {
            let consumed = self.clone().apply(key).consumed;
            return Ok(Output {
                consumed,
                ..Output::default()
            });
        }
        Ok(self.apply(key))
    }

    fn resolve(&mut self, command: &SessionCommand) -> Result<Output, EngineError> {
        Err(EngineError::Rejected(format!("{command:?}")))
    }
}

/// Headless host: an application text field plus the input-method plumbing
/// around one `InputContext`.
///
/// Keys go through the test phase and, when consumed, the delivery phase.
/// Synthetic keys the context injects are fed back the same way. Committed
/// results are appended to `text`; backspaces that reach the application
/// delete from it.
struct HeadlessHost {
    ctx: InputContext,
    keyboard: RecordingKeyboard,
    text: String,
    forward_to_ui: bool,
}

impl HeadlessHost {
    fn new() -> Self {
        let keyboard = RecordingKeyboard::default();
        let ctx = InputContext::with_settings(
            Box::new(CaseEngine::default()),
            Box::new(keyboard.clone()),
            &default_settings(),
        );
        Self {
            ctx,
            keyboard,
            text: String::new(),
            forward_to_ui: true,
        }
    }

    fn type_str(&mut self, s: &str) {
        for unit in s.encode_utf16() {
            self.deliver(KeyEvent::packet(unit, true));
            self.deliver(KeyEvent::packet(unit, false));
        }
    }

    fn stroke(&mut self, vkey: u8) {
        self.deliver(KeyEvent::new(vkey, true));
        self.deliver(KeyEvent::new(vkey, false));
    }

    fn hold(&mut self, modifiers: ModifierState) {
        self.keyboard.0.lock().unwrap().modifiers = modifiers;
    }

    fn deliver(&mut self, event: KeyEvent) {
        self.process(event);
        loop {
            let injected = std::mem::take(&mut self.keyboard.0.lock().unwrap().sent);
            if injected.is_empty() {
                break;
            }
            for key in injected {
                self.process(KeyEvent::new(key.vkey, key.is_down));
            }
        }
    }

    fn process(&mut self, event: KeyEvent) {
        let test = self.ctx.on_test_key(event);
        if test.consumed {
            let response = self.ctx.on_key(event);
            self.absorb(&response);
        } else if event.is_down {
            self.app_default(event, test.action);
        }
    }

    /// What the application does with a key the input method let through.
    fn app_default(&mut self, event: KeyEvent, action: ClientAction) {
        if event.vkey == vk::BACK {
            self.text.pop();
            return;
        }
        if let ClientAction::DoDefaultWithCodepoint(cp) = action {
            if let Some(c) = char::from_u32(cp) {
                self.text.push(c);
            }
        }
    }

    fn absorb(&mut self, response: &KeyResponse) {
        for message in &response.messages {
            if message.kind == MessageKind::CompositionUpdated
                && message.param_b & change_bits::RESULT != 0
            {
                self.text.push_str(&self.ctx.composition().result);
            }
            if self.forward_to_ui && message.kind != MessageKind::UiRefresh {
                self.ctx.confirm_forwarded(message);
            }
        }
    }

    /// What the user sees: committed text followed by the live composition.
    fn display(&self) -> String {
        format!("{}{}", self.text, self.ctx.composition().text)
    }
}

#[test]
fn test_type_and_commit() {
    let mut host = HeadlessHost::new();
    host.type_str("abc");
    assert_eq!(host.display(), "abc");
    assert!(host.text.is_empty());

    host.stroke(VK_RETURN);
    assert_eq!(host.text, "abc");
    assert!(!host.ctx.is_composing());
}

#[test]
fn test_convert_then_commit() {
    let mut host = HeadlessHost::new();
    host.type_str("kana");
    host.stroke(VK_SPACE);
    assert_eq!(host.display(), "KANA");
    assert_eq!(host.ctx.candidates().count(), 2);

    host.stroke(VK_RETURN);
    assert_eq!(host.text, "KANA");
    assert!(host.ctx.candidates().is_empty());
}

#[test]
fn test_backspace_edits_composition_then_text() {
    let mut host = HeadlessHost::new();
    host.type_str("ab");
    host.stroke(VK_RETURN);
    host.type_str("c");

    host.stroke(vk::BACK);
    assert!(!host.ctx.is_composing());
    assert_eq!(host.text, "ab");

    host.stroke(vk::BACK);
    assert_eq!(host.text, "a");
}

#[test]
fn test_escape_discards_composition() {
    let mut host = HeadlessHost::new();
    host.type_str("xyz");
    host.stroke(VK_ESCAPE);
    assert_eq!(host.display(), "");
}

#[test]
fn test_rewrite_previous_commit() {
    let mut host = HeadlessHost::new();
    host.type_str("hello");
    host.stroke(VK_RETURN);
    host.type_str("wor");
    host.stroke(VK_RETURN);
    assert_eq!(host.text, "hellowor");

    let ctrl = ModifierState {
        control: true,
        ..ModifierState::default()
    };
    host.hold(ctrl);
    host.stroke(VK_U);

    assert_eq!(host.text, "helloWOR");
    assert!(!host.ctx.is_deletion_ongoing());
    assert_eq!(host.keyboard.0.lock().unwrap().modifiers, ctrl);
}

#[test]
fn test_astral_character_reaches_application() {
    let mut host = HeadlessHost::new();
    host.type_str("a😀");
    // The engine only composes ASCII letters; the emoji goes straight through.
    assert_eq!(host.text, "😀");
    assert_eq!(host.display(), "😀a");
}

#[test]
fn test_composition_window_confirmed_by_host() {
    let mut host = HeadlessHost::new();
    host.ctx.on_focus();
    host.type_str("a");
    assert!(host.ctx.visibility().is_composition_window_visible());
    host.stroke(VK_SPACE);
    assert!(host.ctx.visibility().is_candidate_window_visible());
    host.stroke(VK_RETURN);
    assert!(!host.ctx.visibility().is_composition_window_visible());
    assert!(!host.ctx.visibility().is_candidate_window_visible());
}

#[test]
fn test_unforwarded_messages_leave_windows_hidden() {
    let mut host = HeadlessHost::new();
    host.forward_to_ui = false;
    host.ctx.on_focus();
    host.type_str("a");
    assert!(!host.ctx.visibility().is_composition_window_visible());
}
