//! Notifications handed to the host, in the order it must deliver them.

/// What a `NotificationMessage` tells the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    CompositionStarted,
    /// `param_a`: latest result code unit (0 when none), `param_b`: change bits.
    CompositionUpdated,
    CompositionEnded,
    /// `param_b`: candidate-window bitmask.
    CandidateOpened,
    CandidateChanged,
    CandidateClosed,
    OpenStatusChanged,
    /// `param_a`: host conversion-mode bits.
    ConversionModeChanged,
    /// The engine asked for reconversion; the host must supply the text.
    ReconversionRequested,
    /// Terminal marker of every batch.
    UiRefresh,
}

impl MessageKind {
    pub fn is_composition(self) -> bool {
        matches!(
            self,
            Self::CompositionStarted | Self::CompositionUpdated | Self::CompositionEnded
        )
    }

    pub fn is_candidate(self) -> bool {
        matches!(
            self,
            Self::CandidateOpened | Self::CandidateChanged | Self::CandidateClosed
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationMessage {
    pub kind: MessageKind,
    pub param_a: u32,
    pub param_b: u32,
}

impl NotificationMessage {
    pub fn new(kind: MessageKind) -> Self {
        Self {
            kind,
            param_a: 0,
            param_b: 0,
        }
    }

    pub fn with_params(kind: MessageKind, param_a: u32, param_b: u32) -> Self {
        Self {
            kind,
            param_a,
            param_b,
        }
    }
}

/// Bitmask of the single logical candidate window.
pub const CANDIDATE_WINDOW_MASK: u32 = 0x1;

/// Change bits carried by `CompositionUpdated`.
pub mod change_bits {
    pub const COMP_READ_STR: u32 = 0x0001;
    pub const COMP_READ_ATTR: u32 = 0x0002;
    pub const COMP_READ_CLAUSE: u32 = 0x0004;
    pub const COMP_STR: u32 = 0x0008;
    pub const COMP_ATTR: u32 = 0x0010;
    pub const COMP_CLAUSE: u32 = 0x0020;
    pub const CURSOR_POS: u32 = 0x0080;
    pub const DELTA_START: u32 = 0x0100;
    pub const RESULT_READ_STR: u32 = 0x0200;
    pub const RESULT_READ_CLAUSE: u32 = 0x0400;
    pub const RESULT_STR: u32 = 0x0800;
    pub const RESULT_CLAUSE: u32 = 0x1000;

    /// Raised whenever a preedit is present. Hosts redraw incorrectly when
    /// handed partial combinations, so this set is never narrowed.
    pub const PREEDIT: u32 = COMP_READ_STR
        | COMP_READ_ATTR
        | COMP_READ_CLAUSE
        | COMP_STR
        | COMP_ATTR
        | COMP_CLAUSE
        | CURSOR_POS
        | DELTA_START;

    /// Raised whenever a result is present.
    pub const RESULT: u32 = RESULT_READ_STR | RESULT_READ_CLAUSE | RESULT_STR | RESULT_CLAUSE;
}
