use super::{CommandWord, Error, Mode};
use crate::bytes;

/// Writable channel to the device, obtained from a [`super::Link`].
pub trait Transport: Send {
    fn is_open(&self) -> bool;
    fn write(&mut self, payload: &[u8]) -> Result<(), Error>;
}

#[derive(Default)]
pub struct CommandEncoder {
    transport: Option<Box<dyn Transport>>,
}

impl CommandEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, transport: Box<dyn Transport>) {
        self.transport = Some(transport);
    }

    pub fn detach(&mut self) {
        if self.transport.take().is_some() {
            log::debug!("Transport detached");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.transport.as_ref().map_or(false, |t| t.is_open())
    }

    pub fn set_brightness(&mut self, channel: usize, value: f32) -> Result<(), Error> {
        self.send(channel, value, Mode::Brightness)
    }

    pub fn set_velocity(&mut self, channel: usize, value: f32) -> Result<(), Error> {
        self.send(channel, value, Mode::Velocity)
    }

    /// Encodes and writes one command.
    ///
    /// The outcome is final: nothing is retried nor queued, a later command
    /// for the same channel supersedes a lost one.
    pub fn send(&mut self, channel: usize, value: f32, mode: Mode) -> Result<(), Error> {
        let payload = CommandWord::encode(channel, value, mode).payload();

        let transport = match self.transport {
            Some(ref mut transport) if transport.is_open() => transport,
            _ => {
                log::warn!("Attempt to send a command, but the dimmer is not connected");
                return Err(Error::NotConnected);
            }
        };

        log::debug!(
            "Sending {mode:?} {value:.3} on channel {channel}: {}",
            bytes::Displayable::from(&payload[..])
        );

        transport.write(&payload).map_err(|err| {
            log::error!(
                "Failed to send command {}: {err}",
                bytes::Displayable::from(&payload[..])
            );
            err
        })
    }
}
