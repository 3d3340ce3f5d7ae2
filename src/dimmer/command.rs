//! Command word packing.
//!
//! A command fits in one byte:
//!
//! ```text
//!   7   6 5   4 3 2 1 0
//! | M | CHAN | LEVEL     |
//! ```
//!
//! `M` is set for velocity commands, `CHAN` is the channel index and
//! `LEVEL` the value quantized to 32 steps.

use super::CHANNEL_COUNT;
use crate::bytes;

mod bits {
    pub const VELOCITY: u8 = 0x80;
    pub const CHAN_SHIFT: u8 = 5;
    pub const CHAN_MASK: u8 = 0x03;
    pub const LEVEL_MASK: u8 = 0x1f;
}

/// Highest quantized level.
pub const LEVEL_MAX: u8 = bits::LEVEL_MASK;

/// Distance between two consecutive quantized levels.
pub const QUANTUM: f32 = 1f32 / LEVEL_MAX as f32;

pub fn level_to_value(level: u8) -> f32 {
    level as f32 / LEVEL_MAX as f32
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Brightness,
    Velocity,
}

/// One write: the command byte, sent twice.
pub type Payload = [u8; 2];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandWord(u8);

impl CommandWord {
    /// Packs `channel`, `value` and `mode` into a command byte.
    ///
    /// # Panics
    ///
    /// If `channel` is not below [`CHANNEL_COUNT`] or `value` is outside `[0, 1]`.
    /// Callers are expected to hand over values they already clamped.
    pub fn encode(channel: usize, value: f32, mode: Mode) -> Self {
        assert!(channel < CHANNEL_COUNT, "channel {channel} out of range");
        assert!(
            (0f32..=1f32).contains(&value),
            "value {value} out of range"
        );

        let level = (LEVEL_MAX as f32 * value) as u8;
        let flag = match mode {
            Mode::Brightness => 0,
            Mode::Velocity => bits::VELOCITY,
        };

        Self(((channel as u8) << bits::CHAN_SHIFT) | level | flag)
    }

    pub fn channel(self) -> usize {
        ((self.0 >> bits::CHAN_SHIFT) & bits::CHAN_MASK) as usize
    }

    pub fn level(self) -> u8 {
        self.0 & bits::LEVEL_MASK
    }

    pub fn value(self) -> f32 {
        level_to_value(self.level())
    }

    pub fn mode(self) -> Mode {
        if self.0 & bits::VELOCITY == 0 {
            Mode::Brightness
        } else {
            Mode::Velocity
        }
    }

    pub fn decode(self) -> (usize, f32, Mode) {
        (self.channel(), self.value(), self.mode())
    }

    pub fn payload(self) -> Payload {
        [self.0, self.0]
    }

    /// Recovers the command from a payload received by a device.
    pub fn from_payload(buf: &[u8]) -> Result<Self, super::Error> {
        match buf {
            [first, second] if first == second => Ok(Self(*first)),
            _ => Err(super::Error::InvalidPayload(
                bytes::Displayable::from(buf).to_owned(),
            )),
        }
    }
}

impl From<CommandWord> for u8 {
    fn from(word: CommandWord) -> u8 {
        word.0
    }
}

impl From<u8> for CommandWord {
    fn from(byte: u8) -> Self {
        Self(byte)
    }
}
