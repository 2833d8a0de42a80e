use bridge_core::candidate::CandidateSnapshot;
use bridge_core::composition::{CompositionAttribute, CompositionSnapshot};
use bridge_core::input_state::{ConversionMode, InputState};
use bridge_core::key::{KeyEvent, LogicalKey, ModifierState, SyntheticKey};
use bridge_core::message::{MessageKind, NotificationMessage};
use bridge_core::output::{
    Annotation, Candidate, CandidateCategory, CandidateList, DeletionRange, Output, Preedit,
    ResultText, Segment, SessionCommand, Status,
};
use bridge_session::{ClientAction, EngineContext, KeyResponse, TestKeyResponse};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum BridgeError {
    #[error("IO error: {msg}")]
    Io { msg: String },
    #[error("invalid data: {msg}")]
    InvalidData { msg: String },
    #[error("engine error: {msg}")]
    Engine { msg: String },
    #[error("internal error: {msg}")]
    Internal { msg: String },
}

impl From<uniffi::UnexpectedUniFFICallbackError> for BridgeError {
    fn from(e: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::Internal { msg: e.reason }
    }
}

// ---------------------------------------------------------------------------
// Key input
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, uniffi::Record)]
pub struct BridgeKeyEvent {
    pub vkey: u8,
    /// UTF-16 code unit carried by a packet key.
    pub unit: Option<u16>,
    pub is_down: bool,
}

impl From<BridgeKeyEvent> for KeyEvent {
    fn from(e: BridgeKeyEvent) -> Self {
        KeyEvent {
            vkey: e.vkey,
            unit: e.unit,
            is_down: e.is_down,
            is_test_phase: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, uniffi::Record)]
pub struct BridgeModifiers {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
    pub win: bool,
}

impl From<BridgeModifiers> for ModifierState {
    fn from(m: BridgeModifiers) -> Self {
        ModifierState {
            shift: m.shift,
            control: m.control,
            alt: m.alt,
            win: m.win,
        }
    }
}

impl From<ModifierState> for BridgeModifiers {
    fn from(m: ModifierState) -> Self {
        Self {
            shift: m.shift,
            control: m.control,
            alt: m.alt,
            win: m.win,
        }
    }
}

#[derive(Clone, Copy, Debug, uniffi::Record)]
pub struct BridgeSyntheticKey {
    pub vkey: u8,
    pub is_down: bool,
}

impl From<&SyntheticKey> for BridgeSyntheticKey {
    fn from(k: &SyntheticKey) -> Self {
        Self {
            vkey: k.vkey,
            is_down: k.is_down,
        }
    }
}

/// Key as handed to the engine.
#[derive(Clone, Copy, Debug, uniffi::Record)]
pub struct BridgeLogicalKey {
    pub vkey: u8,
    /// Unicode scalar value, when the key carries a character.
    pub codepoint: Option<u32>,
    pub is_down: bool,
    pub modifiers: BridgeModifiers,
}

impl From<&LogicalKey> for BridgeLogicalKey {
    fn from(k: &LogicalKey) -> Self {
        Self {
            vkey: k.vkey,
            codepoint: k.codepoint.map(u32::from),
            is_down: k.is_down,
            modifiers: k.modifiers.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, uniffi::Record)]
pub struct BridgeEngineContext {
    pub is_test_phase: bool,
    pub open: bool,
    pub mode: BridgeConversionMode,
    pub composing: bool,
}

impl From<&EngineContext> for BridgeEngineContext {
    fn from(c: &EngineContext) -> Self {
        Self {
            is_test_phase: c.is_test_phase,
            open: c.state.open,
            mode: c.state.mode.into(),
            composing: c.composing,
        }
    }
}

// ---------------------------------------------------------------------------
// Engine output
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, uniffi::Enum)]
pub enum BridgeConversionMode {
    Hiragana,
    FullKatakana,
    HalfKatakana,
    FullAscii,
    HalfAscii,
}

impl From<BridgeConversionMode> for ConversionMode {
    fn from(m: BridgeConversionMode) -> Self {
        match m {
            BridgeConversionMode::Hiragana => ConversionMode::Hiragana,
            BridgeConversionMode::FullKatakana => ConversionMode::FullKatakana,
            BridgeConversionMode::HalfKatakana => ConversionMode::HalfKatakana,
            BridgeConversionMode::FullAscii => ConversionMode::FullAscii,
            BridgeConversionMode::HalfAscii => ConversionMode::HalfAscii,
        }
    }
}

impl From<ConversionMode> for BridgeConversionMode {
    fn from(m: ConversionMode) -> Self {
        match m {
            ConversionMode::Hiragana => BridgeConversionMode::Hiragana,
            ConversionMode::FullKatakana => BridgeConversionMode::FullKatakana,
            ConversionMode::HalfKatakana => BridgeConversionMode::HalfKatakana,
            ConversionMode::FullAscii => BridgeConversionMode::FullAscii,
            ConversionMode::HalfAscii => BridgeConversionMode::HalfAscii,
        }
    }
}

#[derive(Clone, Copy, Debug, uniffi::Enum)]
pub enum BridgeAnnotation {
    None,
    Underline,
    Highlight,
}

#[derive(Clone, Debug, uniffi::Record)]
pub struct BridgeSegment {
    pub value: String,
    pub key: String,
    pub annotation: BridgeAnnotation,
}

#[derive(Clone, Debug, uniffi::Record)]
pub struct BridgePreedit {
    pub segments: Vec<BridgeSegment>,
    /// In characters.
    pub cursor: u32,
    pub highlighted_position: Option<u32>,
}

#[derive(Clone, Debug, uniffi::Record)]
pub struct BridgeResultText {
    pub value: String,
    pub key: String,
}

#[derive(Clone, Copy, Debug, uniffi::Enum)]
pub enum BridgeCandidateCategory {
    Conversion,
    Prediction,
    Suggestion,
    Transliteration,
}

#[derive(Clone, Debug, uniffi::Record)]
pub struct BridgeCandidate {
    pub id: i32,
    pub value: String,
    pub reading: Option<String>,
}

#[derive(Clone, Debug, uniffi::Record)]
pub struct BridgeCandidateList {
    pub category: BridgeCandidateCategory,
    pub visible: bool,
    pub focused_index: Option<u32>,
    pub candidates: Vec<BridgeCandidate>,
}

#[derive(Clone, Copy, Debug, uniffi::Record)]
pub struct BridgeDeletionRange {
    pub offset: i32,
    pub length: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, uniffi::Enum)]
pub enum BridgeCommand {
    Submit,
    Revert,
    Undo,
    ConvertReverse,
    SelectCandidate { id: i32 },
    HighlightCandidate { id: i32 },
}

#[derive(Clone, Copy, Debug, uniffi::Record)]
pub struct BridgeStatus {
    pub open: bool,
    pub mode: BridgeConversionMode,
}

#[derive(Clone, Debug, uniffi::Record)]
pub struct BridgeOutput {
    pub consumed: bool,
    pub preedit: Option<BridgePreedit>,
    pub result: Option<BridgeResultText>,
    pub candidates: Option<BridgeCandidateList>,
    pub deletion: Option<BridgeDeletionRange>,
    pub callback: Option<BridgeCommand>,
    pub status: Option<BridgeStatus>,
}

impl From<BridgeAnnotation> for Annotation {
    fn from(a: BridgeAnnotation) -> Self {
        match a {
            BridgeAnnotation::None => Annotation::None,
            BridgeAnnotation::Underline => Annotation::Underline,
            BridgeAnnotation::Highlight => Annotation::Highlight,
        }
    }
}

impl From<BridgeCandidateCategory> for CandidateCategory {
    fn from(c: BridgeCandidateCategory) -> Self {
        match c {
            BridgeCandidateCategory::Conversion => CandidateCategory::Conversion,
            BridgeCandidateCategory::Prediction => CandidateCategory::Prediction,
            BridgeCandidateCategory::Suggestion => CandidateCategory::Suggestion,
            BridgeCandidateCategory::Transliteration => CandidateCategory::Transliteration,
        }
    }
}

impl From<BridgeCommand> for SessionCommand {
    fn from(c: BridgeCommand) -> Self {
        match c {
            BridgeCommand::Submit => SessionCommand::Submit,
            BridgeCommand::Revert => SessionCommand::Revert,
            BridgeCommand::Undo => SessionCommand::Undo,
            BridgeCommand::ConvertReverse => SessionCommand::ConvertReverse,
            BridgeCommand::SelectCandidate { id } => SessionCommand::SelectCandidate { id },
            BridgeCommand::HighlightCandidate { id } => SessionCommand::HighlightCandidate { id },
        }
    }
}

impl From<&SessionCommand> for BridgeCommand {
    fn from(c: &SessionCommand) -> Self {
        match *c {
            SessionCommand::Submit => BridgeCommand::Submit,
            SessionCommand::Revert => BridgeCommand::Revert,
            SessionCommand::Undo => BridgeCommand::Undo,
            SessionCommand::ConvertReverse => BridgeCommand::ConvertReverse,
            SessionCommand::SelectCandidate { id } => BridgeCommand::SelectCandidate { id },
            SessionCommand::HighlightCandidate { id } => BridgeCommand::HighlightCandidate { id },
        }
    }
}

impl From<BridgeOutput> for Output {
    fn from(o: BridgeOutput) -> Self {
        Output {
            consumed: o.consumed,
            preedit: o.preedit.map(|p| Preedit {
                segments: p
                    .segments
                    .into_iter()
                    .map(|s| Segment {
                        value: s.value,
                        key: s.key,
                        annotation: s.annotation.into(),
                    })
                    .collect(),
                cursor: p.cursor as usize,
                highlighted_position: p.highlighted_position.map(|h| h as usize),
            }),
            result: o.result.map(|r| ResultText {
                value: r.value,
                key: r.key,
            }),
            candidates: o.candidates.map(|l| CandidateList {
                category: l.category.into(),
                visible: l.visible,
                focused_index: l.focused_index.map(|i| i as usize),
                candidates: l
                    .candidates
                    .into_iter()
                    .map(|c| Candidate {
                        id: c.id,
                        value: c.value,
                        reading: c.reading,
                    })
                    .collect(),
            }),
            deletion: o.deletion.map(|d| DeletionRange {
                offset: d.offset,
                length: d.length,
            }),
            callback: o.callback.map(SessionCommand::from),
            status: o.status.map(|s| Status {
                open: s.open,
                mode: s.mode.into(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Notifications and host-visible state
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, uniffi::Enum)]
pub enum BridgeMessageKind {
    CompositionStarted,
    CompositionUpdated,
    CompositionEnded,
    CandidateOpened,
    CandidateChanged,
    CandidateClosed,
    OpenStatusChanged,
    ConversionModeChanged,
    ReconversionRequested,
    UiRefresh,
}

impl From<MessageKind> for BridgeMessageKind {
    fn from(k: MessageKind) -> Self {
        match k {
            MessageKind::CompositionStarted => Self::CompositionStarted,
            MessageKind::CompositionUpdated => Self::CompositionUpdated,
            MessageKind::CompositionEnded => Self::CompositionEnded,
            MessageKind::CandidateOpened => Self::CandidateOpened,
            MessageKind::CandidateChanged => Self::CandidateChanged,
            MessageKind::CandidateClosed => Self::CandidateClosed,
            MessageKind::OpenStatusChanged => Self::OpenStatusChanged,
            MessageKind::ConversionModeChanged => Self::ConversionModeChanged,
            MessageKind::ReconversionRequested => Self::ReconversionRequested,
            MessageKind::UiRefresh => Self::UiRefresh,
        }
    }
}

impl From<BridgeMessageKind> for MessageKind {
    fn from(k: BridgeMessageKind) -> Self {
        match k {
            BridgeMessageKind::CompositionStarted => Self::CompositionStarted,
            BridgeMessageKind::CompositionUpdated => Self::CompositionUpdated,
            BridgeMessageKind::CompositionEnded => Self::CompositionEnded,
            BridgeMessageKind::CandidateOpened => Self::CandidateOpened,
            BridgeMessageKind::CandidateChanged => Self::CandidateChanged,
            BridgeMessageKind::CandidateClosed => Self::CandidateClosed,
            BridgeMessageKind::OpenStatusChanged => Self::OpenStatusChanged,
            BridgeMessageKind::ConversionModeChanged => Self::ConversionModeChanged,
            BridgeMessageKind::ReconversionRequested => Self::ReconversionRequested,
            BridgeMessageKind::UiRefresh => Self::UiRefresh,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, uniffi::Record)]
pub struct BridgeMessage {
    pub kind: BridgeMessageKind,
    pub param_a: u32,
    pub param_b: u32,
}

impl From<&NotificationMessage> for BridgeMessage {
    fn from(m: &NotificationMessage) -> Self {
        Self {
            kind: m.kind.into(),
            param_a: m.param_a,
            param_b: m.param_b,
        }
    }
}

impl From<BridgeMessage> for NotificationMessage {
    fn from(m: BridgeMessage) -> Self {
        NotificationMessage::with_params(m.kind.into(), m.param_a, m.param_b)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, uniffi::Enum)]
pub enum BridgeCompositionAttribute {
    Input,
    TargetConverted,
    Converted,
}

/// Composition buffer; offsets are UTF-16 units.
#[derive(Clone, Debug, uniffi::Record)]
pub struct BridgeComposition {
    pub text: String,
    pub reading: String,
    pub attributes: Vec<BridgeCompositionAttribute>,
    pub clauses: Vec<u32>,
    pub reading_clauses: Vec<u32>,
    pub result: String,
    pub result_reading: String,
    pub result_clauses: Vec<u32>,
    pub result_reading_clauses: Vec<u32>,
    pub cursor: u32,
    pub focused_index: u32,
}

impl From<&CompositionSnapshot> for BridgeComposition {
    fn from(s: &CompositionSnapshot) -> Self {
        Self {
            text: s.text.clone(),
            reading: s.reading.clone(),
            attributes: s
                .attributes
                .iter()
                .map(|a| match a {
                    CompositionAttribute::Input => BridgeCompositionAttribute::Input,
                    CompositionAttribute::TargetConverted => {
                        BridgeCompositionAttribute::TargetConverted
                    }
                    CompositionAttribute::Converted => BridgeCompositionAttribute::Converted,
                })
                .collect(),
            clauses: s.clauses.clone(),
            reading_clauses: s.reading_clauses.clone(),
            result: s.result.clone(),
            result_reading: s.result_reading.clone(),
            result_clauses: s.result_clauses.clone(),
            result_reading_clauses: s.result_reading_clauses.clone(),
            cursor: s.cursor,
            focused_index: s.focused_index,
        }
    }
}

#[derive(Clone, Debug, uniffi::Record)]
pub struct BridgeCandidates {
    pub count: u32,
    pub selection: u32,
    pub page_start: u32,
    pub page_size: u32,
    pub candidates: Vec<String>,
    /// Serialized host candidate buffer.
    pub buffer: Vec<u8>,
}

impl From<&CandidateSnapshot> for BridgeCandidates {
    fn from(s: &CandidateSnapshot) -> Self {
        Self {
            count: s.count(),
            selection: s.selection,
            page_start: s.page_start,
            page_size: s.page_size(),
            candidates: s.candidates.clone(),
            buffer: s.to_buffer(),
        }
    }
}

#[derive(Clone, Copy, Debug, uniffi::Record)]
pub struct BridgeInputState {
    pub open: bool,
    pub mode: BridgeConversionMode,
    /// Host conversion-mode bitmask for `mode`.
    pub mode_bits: u32,
}

impl From<InputState> for BridgeInputState {
    fn from(s: InputState) -> Self {
        Self {
            open: s.open,
            mode: s.mode.into(),
            mode_bits: s.mode.to_host_bits(),
        }
    }
}

#[derive(Clone, Copy, Debug, uniffi::Record)]
pub struct BridgeVisibility {
    pub composition_window: bool,
    pub candidate_window: bool,
    pub suggest_window: bool,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, uniffi::Enum)]
pub enum BridgeClientAction {
    DoDefault,
    DoDefaultWithCodepoint { codepoint: u32 },
    ForwardToHost,
    ConsumeSilently,
    AbortThenDoDefault,
    ApplyPendingNow,
}

impl From<ClientAction> for BridgeClientAction {
    fn from(a: ClientAction) -> Self {
        match a {
            ClientAction::DoDefault => Self::DoDefault,
            ClientAction::DoDefaultWithCodepoint(codepoint) => {
                Self::DoDefaultWithCodepoint { codepoint }
            }
            ClientAction::ForwardToHost => Self::ForwardToHost,
            ClientAction::ConsumeSilently => Self::ConsumeSilently,
            ClientAction::AbortThenDoDefault => Self::AbortThenDoDefault,
            ClientAction::ApplyPendingNow => Self::ApplyPendingNow,
        }
    }
}

#[derive(Clone, Copy, Debug, uniffi::Record)]
pub struct BridgeTestKeyResponse {
    pub action: BridgeClientAction,
    pub consumed: bool,
}

impl From<TestKeyResponse> for BridgeTestKeyResponse {
    fn from(r: TestKeyResponse) -> Self {
        Self {
            action: r.action.into(),
            consumed: r.consumed,
        }
    }
}

#[derive(Clone, Debug, uniffi::Record)]
pub struct BridgeKeyResponse {
    pub action: BridgeClientAction,
    pub consumed: bool,
    /// In dispatch order.
    pub messages: Vec<BridgeMessage>,
    pub composition: Option<BridgeComposition>,
    pub candidates: Option<BridgeCandidates>,
}

impl From<KeyResponse> for BridgeKeyResponse {
    fn from(r: KeyResponse) -> Self {
        Self {
            action: r.action.into(),
            consumed: r.consumed,
            messages: r.messages.iter().map(BridgeMessage::from).collect(),
            composition: r.composition.as_ref().map(BridgeComposition::from),
            candidates: r.candidates.as_ref().map(BridgeCandidates::from),
        }
    }
}
