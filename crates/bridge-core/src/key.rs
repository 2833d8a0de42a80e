//! Key events as delivered by the host, and the keyboard seam used to inject
//! synthetic input.

// Host virtual key codes
pub mod vk {
    pub const BACK: u8 = 0x08;
    pub const SHIFT: u8 = 0x10;
    pub const CONTROL: u8 = 0x11;
    pub const MENU: u8 = 0x12;
    pub const LWIN: u8 = 0x5B;
    pub const RWIN: u8 = 0x5C;
    /// Synthetic key carrying a UTF-16 code unit instead of a physical key.
    pub const PACKET: u8 = 0xE7;
}

/// One key-down or key-up, in either the test phase or the delivery phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub vkey: u8,
    /// UTF-16 code unit attached to a `vk::PACKET` event.
    pub unit: Option<u16>,
    pub is_down: bool,
    pub is_test_phase: bool,
}

impl KeyEvent {
    pub fn new(vkey: u8, is_down: bool) -> Self {
        Self {
            vkey,
            unit: None,
            is_down,
            is_test_phase: false,
        }
    }

    pub fn packet(unit: u16, is_down: bool) -> Self {
        Self {
            vkey: vk::PACKET,
            unit: Some(unit),
            is_down,
            is_test_phase: false,
        }
    }

    pub fn in_test_phase(self) -> Self {
        Self {
            is_test_phase: true,
            ..self
        }
    }

    pub fn in_delivery_phase(self) -> Self {
        Self {
            is_test_phase: false,
            ..self
        }
    }

    pub fn is_packet(&self) -> bool {
        self.vkey == vk::PACKET
    }
}

/// Pressed state of the modifier keys, left and right collapsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifierState {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
    pub win: bool,
}

impl ModifierState {
    pub fn is_empty(&self) -> bool {
        !(self.shift || self.control || self.alt || self.win)
    }
}

/// A key event injected into the host input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticKey {
    pub vkey: u8,
    pub is_down: bool,
}

/// The key handed to the conversion engine after surrogate reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalKey {
    pub vkey: u8,
    pub codepoint: Option<char>,
    pub is_down: bool,
    pub modifiers: ModifierState,
}

/// Access to the host keyboard: modifier state and synthetic input.
pub trait HostKeyboard {
    fn modifiers(&self) -> ModifierState;

    fn set_modifiers(&mut self, state: ModifierState);

    /// Queue `keys` into the host input stream. Returns false when the host
    /// refused the whole batch.
    fn send_input(&mut self, keys: &[SyntheticKey]) -> bool;
}
