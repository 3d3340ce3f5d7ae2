//! In-process dimmer.
//!
//! Stands in for the radio stack and the lamp controller: it answers the
//! connection workflow, applies the commands it receives and notifies a
//! setpoint report after each of them.

use crossbeam_channel as channel;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{
    report, CommandWord, Connection, Error, Link, Mode, Transport, CHANNEL_COUNT,
    CHARACTERISTIC_ID, SERVICE_ID,
};

#[derive(Debug, Default)]
struct Device {
    levels: [u8; CHANNEL_COUNT],
    velocities: [u8; CHANNEL_COUNT],
    is_open: bool,
    report_tx: Option<channel::Sender<Arc<str>>>,
}

impl Device {
    fn apply(&mut self, word: CommandWord) {
        let chan = word.channel();
        match word.mode() {
            Mode::Brightness => self.levels[chan] = word.level(),
            Mode::Velocity => self.velocities[chan] = word.level(),
        }

        self.notify_levels();
    }

    fn notify_levels(&mut self) {
        if let Some(ref tx) = self.report_tx {
            if tx.send(report::format_levels(&self.levels).into()).is_err() {
                // Nobody listens anymore.
                self.report_tx = None;
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct LoopbackDimmer {
    name: Option<Arc<str>>,
    device: Arc<Mutex<Device>>,
}

impl LoopbackDimmer {
    pub fn new(name: &str) -> Self {
        Self {
            name: Some(name.into()),
            device: Arc::new(Mutex::new(Device::default())),
        }
    }

    /// A dimmer which can't be discovered.
    pub fn unreachable() -> Self {
        Self {
            name: None,
            device: Arc::new(Mutex::new(Device::default())),
        }
    }

    pub fn with_levels(self, levels: [u8; CHANNEL_COUNT]) -> Self {
        self.device().levels = levels;
        self
    }

    pub fn levels(&self) -> [u8; CHANNEL_COUNT] {
        self.device().levels
    }

    pub fn velocities(&self) -> [u8; CHANNEL_COUNT] {
        self.device().velocities
    }

    /// Simulates a lost link: subsequent writes fail.
    pub fn drop_link(&self) {
        let mut device = self.device();
        device.is_open = false;
        device.report_tx = None;
    }

    fn device(&self) -> MutexGuard<'_, Device> {
        self.device.lock().expect("loopback dimmer poisoned")
    }
}

impl Link for LoopbackDimmer {
    fn discover(&mut self, service: u16) -> Result<Arc<str>, Error> {
        match self.name {
            Some(ref name) if service == SERVICE_ID => Ok(name.clone()),
            _ => Err(Error::DeviceNotFound),
        }
    }

    fn open_session(&mut self) -> Result<(), Error> {
        match self.name {
            Some(_) => {
                self.device().is_open = true;
                Ok(())
            }
            None => Err(Error::DeviceNotFound),
        }
    }

    fn lookup_service(&mut self, service: u16) -> Result<(), Error> {
        if service != SERVICE_ID {
            return Err(Error::ServiceNotFound(service));
        }

        Ok(())
    }

    fn lookup_characteristic(
        &mut self,
        service: u16,
        characteristic: u16,
    ) -> Result<Connection, Error> {
        self.lookup_service(service)?;
        if characteristic != CHARACTERISTIC_ID {
            return Err(Error::CharacteristicNotFound(characteristic));
        }

        let (report_tx, report_rx) = channel::unbounded();
        {
            let mut device = self.device();
            device.report_tx = Some(report_tx);
            device.notify_levels();
        }

        Ok(Connection {
            transport: Box::new(LoopbackTransport {
                device: self.device.clone(),
            }),
            reports: Some(report_rx),
        })
    }
}

struct LoopbackTransport {
    device: Arc<Mutex<Device>>,
}

impl Transport for LoopbackTransport {
    fn is_open(&self) -> bool {
        self.device
            .lock()
            .map_or(false, |device| device.is_open)
    }

    fn write(&mut self, payload: &[u8]) -> Result<(), Error> {
        let mut device = self
            .device
            .lock()
            .map_err(|_| Error::Write("device state poisoned".into()))?;

        if !device.is_open {
            return Err(Error::Write("link dropped".into()));
        }

        let word = CommandWord::from_payload(payload)?;
        log::trace!("Loopback dimmer applying {:?}", word.decode());
        device.apply(word);

        Ok(())
    }
}
