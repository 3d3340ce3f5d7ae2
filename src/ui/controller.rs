use crossbeam_channel as channel;
use eframe::egui;
use std::{ops::ControlFlow, sync::Arc};

use super::app::{self, Error};
use crate::{
    dimmer::{self, report, CommandEncoder, Link, StatusSender, CHANNEL_COUNT},
    gesture::GestureEvent,
};

pub struct Spawner {
    pub req_rx: channel::Receiver<app::Request>,
    pub status_tx: channel::Sender<Arc<str>>,
    pub setpoints_tx: channel::Sender<[f32; CHANNEL_COUNT]>,
    pub err_tx: channel::Sender<Error>,
    pub link: Box<dyn Link>,
    pub egui_ctx: Option<egui::Context>,
}

impl Spawner {
    pub fn spawn(self) -> std::thread::JoinHandle<()> {
        std::thread::spawn(move || {
            Controller {
                link: self.link,
                encoder: CommandEncoder::new(),
                status: StatusSender::new(self.status_tx),
                setpoints_tx: self.setpoints_tx,
                err_tx: self.err_tx,
                reports_rx: channel::never(),
                did_read_initial_values: false,
                egui_ctx: self.egui_ctx,
            }
            .run_loop(self.req_rx);
        })
    }
}

struct Controller {
    link: Box<dyn Link>,
    encoder: CommandEncoder,
    status: StatusSender,
    setpoints_tx: channel::Sender<[f32; CHANNEL_COUNT]>,
    err_tx: channel::Sender<Error>,
    reports_rx: channel::Receiver<Arc<str>>,
    did_read_initial_values: bool,
    egui_ctx: Option<egui::Context>,
}

impl Controller {
    fn handle_request(&mut self, request: app::Request) -> Result<ControlFlow<(), ()>, Error> {
        use app::Request::*;

        match request {
            Connect => self.connect(),
            Gesture(event) => self.send(event)?,
            Shutdown => return Ok(ControlFlow::Break(())),
        }

        Ok(ControlFlow::Continue(()))
    }

    fn connect(&mut self) {
        self.encoder.detach();
        self.reports_rx = channel::never();
        self.did_read_initial_values = false;

        // Failures are reported as status by the connection workflow.
        if let Ok(conn) = dimmer::connection::connect(self.link.as_mut(), &self.status) {
            self.encoder.attach(conn.transport);
            if let Some(reports_rx) = conn.reports {
                self.reports_rx = reports_rx;
            }
        }

        self.request_repaint();
    }

    fn send(&mut self, event: GestureEvent) -> Result<(), Error> {
        let (channel, value, mode) = event.to_command();
        self.encoder.send(channel, value, mode)?;

        Ok(())
    }

    fn handle_report(&mut self, report: &str) {
        if self.did_read_initial_values {
            log::trace!("Dimmer report: {report}");
            return;
        }

        match report::parse_values(report) {
            Ok(values) => {
                log::debug!("Initial dimmer values {values:?}");
                self.did_read_initial_values = true;
                let _ = self.setpoints_tx.send(values);
                self.request_repaint();
            }
            Err(err) => log::warn!("{err}"),
        }
    }

    fn request_repaint(&self) {
        if let Some(ref egui_ctx) = self.egui_ctx {
            egui_ctx.request_repaint();
        }
    }

    fn run_loop(mut self, req_rx: channel::Receiver<app::Request>) {
        loop {
            let reports_rx = self.reports_rx.clone();
            channel::select! {
                recv(req_rx) -> request => {
                    match request {
                        Ok(request) => match self.handle_request(request) {
                            Ok(ControlFlow::Continue(())) => (),
                            Ok(ControlFlow::Break(())) => break,
                            Err(err) => {
                                let _ = self.err_tx.send(err);
                                self.request_repaint();
                            }
                        },
                        Err(err) => {
                            log::error!("Error UI request channel: {err}");
                            break;
                        }
                    }
                }
                recv(reports_rx) -> report => {
                    match report {
                        Ok(report) => self.handle_report(&report),
                        Err(_) => {
                            log::debug!("Dimmer stopped reporting");
                            self.reports_rx = channel::never();
                        }
                    }
                }
            }
        }

        self.encoder.detach();
        log::debug!("Shutting down Dimmer Controller loop");
    }
}
