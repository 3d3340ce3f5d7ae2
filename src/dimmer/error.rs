use std::{fmt, sync::Arc};

use crate::bytes;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Discovery,
    Session,
    Service,
    Characteristic,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Stage {
    pub fn as_str(&self) -> &str {
        match self {
            Stage::Discovery => "device discovery",
            Stage::Session => "session open",
            Stage::Service => "service lookup",
            Stage::Characteristic => "characteristic lookup",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Dimmer not connected")]
    NotConnected,

    #[error("Couldn't write to dimmer: {}", .0)]
    Write(Arc<str>),

    #[error("No dimmer found")]
    DeviceNotFound,

    #[error("Service {:#06x} not found", .0)]
    ServiceNotFound(u16),

    #[error("Characteristic {:#06x} not found", .0)]
    CharacteristicNotFound(u16),

    #[error("{stage} failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<Error>,
    },

    #[error("Invalid command payload {}", .0)]
    InvalidPayload(bytes::Displayable<'static>),

    #[error("Invalid setpoint report {:?}", .0)]
    InvalidReport(Arc<str>),
}

impl Error {
    pub fn at(self, stage: Stage) -> Self {
        Error::Stage {
            stage,
            source: Box::new(self),
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
