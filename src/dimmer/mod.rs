mod error;
pub use error::{Error, Stage};

pub mod command;
pub use command::{CommandWord, Mode, Payload};

pub mod connection;
pub use connection::{Connection, Link, StatusSender};

pub mod encoder;
pub use encoder::{CommandEncoder, Transport};

pub mod loopback;
pub use loopback::LoopbackDimmer;

pub mod report;

/// Number of independently controllable outputs on the device.
pub const CHANNEL_COUNT: usize = 4;

/// Service advertised by the dimmer.
pub const SERVICE_ID: u16 = 0xffe0;

/// Writable characteristic within [`SERVICE_ID`].
pub const CHARACTERISTIC_ID: u16 = 0xffe1;
