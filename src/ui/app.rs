use crossbeam_channel as channel;
use eframe::egui;
use std::sync::Arc;

use super::{controller, surface::Overlay, TouchSurface};
use crate::{
    dimmer::{self, CHANNEL_COUNT},
    gesture::GestureEvent,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Dimmer error: {}", .0)]
    Dimmer(#[from] dimmer::Error),
}

#[derive(Debug)]
pub enum Request {
    Connect,
    Gesture(GestureEvent),
    Shutdown,
}

impl From<GestureEvent> for Request {
    fn from(event: GestureEvent) -> Self {
        Self::Gesture(event)
    }
}

pub struct App {
    req_tx: channel::Sender<Request>,
    status_rx: channel::Receiver<Arc<str>>,
    setpoints_rx: channel::Receiver<[f32; CHANNEL_COUNT]>,
    err_rx: channel::Receiver<Error>,
    surface: TouchSurface,
    status: Arc<str>,
    last_err: Option<Error>,
    controller_thread: Option<std::thread::JoinHandle<()>>,
}

impl App {
    pub fn new(cc: &eframe::CreationContext, link: Box<dyn dimmer::Link>) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::light());

        let (req_tx, req_rx) = channel::unbounded();
        let (status_tx, status_rx) = channel::unbounded();
        let (setpoints_tx, setpoints_rx) = channel::unbounded();
        let (err_tx, err_rx) = channel::unbounded();

        let controller_thread = controller::Spawner {
            req_rx,
            status_tx,
            setpoints_tx,
            err_tx,
            link,
            egui_ctx: Some(cc.egui_ctx.clone()),
        }
        .spawn();

        let mut this = Self {
            req_tx,
            status_rx,
            setpoints_rx,
            err_rx,
            surface: TouchSurface::default(),
            status: Arc::from("Connecting..."),
            last_err: None,
            controller_thread: Some(controller_thread),
        };

        this.send_req(Request::Connect);

        this
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.pop_feedback();

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let err_text = self.last_err.as_ref().map(ToString::to_string);
                let overlay = match err_text {
                    Some(ref text) => Overlay::Error(text),
                    None => Overlay::Status(&self.status),
                };

                let was_dragging = self.surface.gesture.is_dragging();
                let events = self.surface.show(ui, overlay);
                if !was_dragging && self.surface.gesture.is_dragging() {
                    self.clear_last_err();
                }

                for event in events {
                    log::trace!("Gesture: {event:?}");
                    self.send_req(event.into());
                }
            });

        if self.surface.needs_frame() {
            ctx.request_repaint();
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        log::info!("Shutting down");
        self.shutdown();
    }
}

impl App {
    pub fn shutdown(&mut self) {
        if let Some(controller_thread) = self.controller_thread.take() {
            if let Err(err) = self.req_tx.send(Request::Shutdown) {
                log::error!("App couldn't request shutdown: {}", err);
            } else {
                let _ = controller_thread.join();
            }
        }
    }

    pub fn send_req(&mut self, req: Request) {
        if let Err(err) = self.req_tx.send(req) {
            log::error!("Dimmer controller is gone: {err}");
        }
    }

    pub fn clear_last_err(&mut self) {
        self.last_err = None;
    }

    fn pop_feedback(&mut self) {
        if let Some(status) = self.status_rx.try_iter().last() {
            self.status = status;
        }

        if let Some(values) = self.setpoints_rx.try_iter().last() {
            self.surface.gesture.seed_values(&values);
        }

        if let Some(err) = self.err_rx.try_iter().last() {
            self.last_err = Some(err);
        }
    }
}
