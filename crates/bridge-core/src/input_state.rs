//! Open status and conversion mode, and their host bitmask encoding.

use serde::{Deserialize, Serialize};

use crate::output::Status;

// Host conversion-mode bits
pub mod mode_bits {
    pub const NATIVE: u32 = 0x1;
    pub const KATAKANA: u32 = 0x2;
    pub const FULLSHAPE: u32 = 0x8;
}

/// Character class the engine currently produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionMode {
    #[default]
    Hiragana,
    FullKatakana,
    HalfKatakana,
    FullAscii,
    HalfAscii,
}

impl ConversionMode {
    /// Host bitmask reported with `ConversionModeChanged`.
    pub fn to_host_bits(self) -> u32 {
        use self::mode_bits::*;
        match self {
            Self::Hiragana => NATIVE | FULLSHAPE,
            Self::FullKatakana => NATIVE | KATAKANA | FULLSHAPE,
            Self::HalfKatakana => NATIVE | KATAKANA,
            Self::FullAscii => FULLSHAPE,
            Self::HalfAscii => 0,
        }
    }

    /// Inverse of `to_host_bits`. Unknown bits are ignored; a native mode
    /// without the full-shape bit is still hiragana.
    pub fn from_host_bits(bits: u32) -> Self {
        use self::mode_bits::*;
        let native = bits & NATIVE != 0;
        let katakana = bits & KATAKANA != 0;
        let fullshape = bits & FULLSHAPE != 0;
        match (native, katakana, fullshape) {
            (true, true, true) => Self::FullKatakana,
            (true, true, false) => Self::HalfKatakana,
            (true, false, _) => Self::Hiragana,
            (false, _, true) => Self::FullAscii,
            (false, _, false) => Self::HalfAscii,
        }
    }
}

/// Open status and conversion mode as last reported to the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub open: bool,
    pub mode: ConversionMode,
}

impl InputState {
    /// The state after an Output's status, or `self` when it carries none.
    pub fn apply_status(self, status: Option<&Status>) -> Self {
        match status {
            Some(s) => Self {
                open: s.open,
                mode: s.mode,
            },
            None => self,
        }
    }
}
