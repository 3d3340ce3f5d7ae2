use crate::dimmer::Mode;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureEvent {
    ValueChanged { channel: usize, value: f32 },
    VelocityChanged { channel: usize, velocity: f32 },
}

impl GestureEvent {
    pub fn none() -> Vec<GestureEvent> {
        Vec::with_capacity(0)
    }

    /// The command this event translates to on the device.
    pub fn to_command(self) -> (usize, f32, Mode) {
        match self {
            Self::ValueChanged { channel, value } => (channel, value, Mode::Brightness),
            Self::VelocityChanged { channel, velocity } => (channel, velocity, Mode::Velocity),
        }
    }
}
