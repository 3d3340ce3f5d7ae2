use eframe::egui::{self, Align2, Color32, FontId, Rect};
use std::time::Instant;

use crate::{
    dimmer::CHANNEL_COUNT,
    gesture::{GestureController, GestureEvent},
};

const COLORS_LIGHT: [Color32; CHANNEL_COUNT] = [
    Color32::from_rgb(0xf8, 0xbb, 0xd0),
    Color32::from_rgb(0xbb, 0xde, 0xfb),
    Color32::from_rgb(0xdc, 0xed, 0xc8),
    Color32::from_rgb(0xff, 0xec, 0xb3),
];

const COLORS_DARK: [Color32; CHANNEL_COUNT] = [
    Color32::from_rgb(0xe9, 0x1e, 0x63),
    Color32::from_rgb(0x21, 0x96, 0xf3),
    Color32::from_rgb(0x8b, 0xc3, 0x4a),
    Color32::from_rgb(0xff, 0xc1, 0x07),
];

const LABEL_MARGIN: f32 = 20f32;

pub enum Overlay<'a> {
    Status(&'a str),
    Error(&'a str),
}

/// Pointer state for one frame, relative to the surface origin.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pointer {
    pub pos: Option<egui::Vec2>,
    pub drag_started: bool,
    pub dragged: bool,
    pub drag_released: bool,
}

impl Pointer {
    fn from_response(response: &egui::Response) -> Self {
        let rect = response.rect;
        Self {
            pos: response
                .interact_pointer_pos()
                .or_else(|| response.hover_pos())
                .map(|pos| pos - rect.min),
            drag_started: response.drag_started(),
            dragged: response.dragged(),
            drag_released: response.drag_released(),
        }
    }
}

#[derive(Default)]
pub struct TouchSurface {
    pub gesture: GestureController,
}

impl TouchSurface {
    pub fn needs_frame(&self) -> bool {
        self.gesture.needs_frame()
    }

    /// Handles the pointer, runs the frame task and paints the surface.
    #[must_use]
    pub fn show(&mut self, ui: &mut egui::Ui, overlay: Overlay<'_>) -> Vec<GestureEvent> {
        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::drag());
        let rect = response.rect;
        self.gesture.set_surface(rect.width(), rect.height());

        let events = self.handle_pointer(Pointer::from_response(&response), Instant::now());
        self.paint(&painter, rect, overlay);

        events
    }

    /// Feeds the pointer to the gesture and runs the frame task.
    pub fn handle_pointer(&mut self, pointer: Pointer, now: Instant) -> Vec<GestureEvent> {
        let mut events = GestureEvent::none();

        if let Some(pos) = pointer.pos {
            if pointer.drag_started {
                self.gesture.press(pos.x, pos.y, now);
            } else if pointer.dragged || pointer.drag_released {
                // the release frame may still carry movement
                self.gesture.move_to(pos.y);
            }
        }

        if pointer.drag_released {
            events.extend(self.gesture.release(now));
        }

        events.extend(self.gesture.tick());

        events
    }

    fn paint(&self, painter: &egui::Painter, rect: Rect, overlay: Overlay<'_>) {
        let col_width = rect.width() / CHANNEL_COUNT as f32;

        for (idx, value) in self.gesture.values().iter().enumerate() {
            let left = rect.left() + col_width * idx as f32;
            let column = Rect::from_min_max(
                egui::pos2(left, rect.top()),
                egui::pos2(left + col_width, rect.bottom()),
            );
            painter.rect_filled(column, 0f32, COLORS_LIGHT[idx]);

            let level = Rect::from_min_max(
                egui::pos2(left, rect.bottom() - rect.height() * value),
                column.max,
            );
            painter.rect_filled(level, 0f32, COLORS_DARK[idx]);

            painter.text(
                egui::pos2(column.center().x, rect.bottom() - LABEL_MARGIN),
                Align2::CENTER_BOTTOM,
                format!("{}%", (value * 100f32) as u8),
                FontId::proportional(20f32),
                Color32::WHITE,
            );
        }

        let (text, color) = match overlay {
            Overlay::Status(text) => (text, Color32::DARK_GRAY),
            Overlay::Error(text) => (text, Color32::DARK_RED),
        };
        painter.text(
            rect.left_top() + egui::vec2(LABEL_MARGIN, LABEL_MARGIN),
            Align2::LEFT_TOP,
            text,
            FontId::proportional(16f32),
            color,
        );
    }
}
