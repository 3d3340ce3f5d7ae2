use crossbeam_channel as channel;
use std::sync::Arc;

use super::{Error, Stage, Transport, CHARACTERISTIC_ID, SERVICE_ID};

/// Access to the radio stack.
///
/// Each method is one step of the connection workflow. They are called in
/// declaration order by [`connect`].
pub trait Link: Send {
    /// Locates a device advertising `service` and returns its name.
    fn discover(&mut self, service: u16) -> Result<Arc<str>, Error>;
    fn open_session(&mut self) -> Result<(), Error>;
    fn lookup_service(&mut self, service: u16) -> Result<(), Error>;
    fn lookup_characteristic(
        &mut self,
        service: u16,
        characteristic: u16,
    ) -> Result<Connection, Error>;
}

/// An open characteristic.
pub struct Connection {
    pub transport: Box<dyn Transport>,
    /// Setpoint reports notified by the device, if it supports them.
    pub reports: Option<channel::Receiver<Arc<str>>>,
}

/// Human readable connection milestones.
#[derive(Clone, Default)]
pub struct StatusSender(Option<channel::Sender<Arc<str>>>);

impl StatusSender {
    pub fn new(tx: channel::Sender<Arc<str>>) -> Self {
        Self(Some(tx))
    }

    pub fn none() -> Self {
        Self(None)
    }

    pub fn notify(&self, status: impl Into<Arc<str>>) {
        let status = status.into();
        log::info!("{status}");
        if let Some(ref tx) = self.0 {
            let _ = tx.send(status);
        }
    }

    fn notify_err(&self, err: &Error) {
        log::error!("{err}");
        if let Some(ref tx) = self.0 {
            let _ = tx.send(format!("Error: {err}").into());
        }
    }
}

/// Runs discovery, session open, service lookup and characteristic lookup.
pub fn connect(link: &mut dyn Link, status: &StatusSender) -> Result<Connection, Error> {
    let res = run_stages(link, status);

    if let Err(ref err) = res {
        status.notify_err(err);
    }

    res
}

fn run_stages(link: &mut dyn Link, status: &StatusSender) -> Result<Connection, Error> {
    let name = link
        .discover(SERVICE_ID)
        .map_err(|err| err.at(Stage::Discovery))?;
    status.notify(format!("Got device: {name}"));

    link.open_session().map_err(|err| err.at(Stage::Session))?;
    link.lookup_service(SERVICE_ID)
        .map_err(|err| err.at(Stage::Service))?;
    let conn = link
        .lookup_characteristic(SERVICE_ID, CHARACTERISTIC_ID)
        .map_err(|err| err.at(Stage::Characteristic))?;

    status.notify(format!("Connected to {name}"));

    Ok(conn)
}
