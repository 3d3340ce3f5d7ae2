//! Touch gesture interpretation.
//!
//! Dragging vertically on a channel's column edits that channel's value.
//! The duration between press and release picks the fade velocity.

use std::time::{Duration, Instant};

use crate::dimmer::CHANNEL_COUNT;

pub mod event;
pub use event::GestureEvent;

mod frame;
pub use frame::FrameTask;

#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Gestures at least this fast map to the highest velocity.
    pub min_duration: Duration,
    /// Gestures at least this slow map to the lowest velocity.
    pub max_duration: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_duration: Duration::from_millis(100),
            max_duration: Duration::from_millis(2000),
        }
    }
}

impl Config {
    /// Maps a gesture duration to a velocity in `[0, 1]`.
    ///
    /// The scale is logarithmic so that differences among fast gestures
    /// aren't flattened by the slow ones.
    pub fn velocity(&self, elapsed: Duration) -> f32 {
        let elapsed = elapsed.clamp(self.min_duration, self.max_duration);

        let min = self.min_duration.as_secs_f64().ln();
        let max = self.max_duration.as_secs_f64().ln();

        (1f64 - (elapsed.as_secs_f64().ln() - min) / (max - min)) as f32
    }
}

#[derive(Debug)]
struct Session {
    channel: usize,
    values_on_press: [f32; CHANNEL_COUNT],
    start_y: f32,
    start_time: Instant,
}

#[derive(Debug)]
pub struct GestureController {
    config: Config,
    values: [f32; CHANNEL_COUNT],
    prev_values: [f32; CHANNEL_COUNT],
    session: Option<Session>,
    frame: FrameTask,
    width: f32,
    height: f32,
}

impl Default for GestureController {
    fn default() -> Self {
        Self::with_config(Config::default())
    }
}

impl GestureController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Config) -> Self {
        assert!(config.min_duration > Duration::ZERO);
        assert!(config.min_duration < config.max_duration);

        Self {
            config,
            values: [0f32; CHANNEL_COUNT],
            prev_values: [0f32; CHANNEL_COUNT],
            session: None,
            frame: FrameTask::default(),
            width: 0f32,
            height: 0f32,
        }
    }

    pub fn set_surface(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    pub fn values(&self) -> &[f32; CHANNEL_COUNT] {
        &self.values
    }

    /// Overrides a channel value without emitting a change.
    ///
    /// Used to mirror levels reported by the device.
    pub fn set_value(&mut self, channel: usize, value: f32) {
        if channel >= CHANNEL_COUNT {
            log::warn!("Ignoring value for unknown channel {channel}");
            return;
        }

        if value.is_nan() {
            log::warn!("Ignoring NaN value for channel {channel}");
            return;
        }

        let value = value.clamp(0f32, 1f32);
        self.values[channel] = value;
        self.prev_values[channel] = value;
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// Channel edited by the current gesture.
    pub fn target_channel(&self) -> Option<usize> {
        self.session.as_ref().map(|session| session.channel)
    }

    /// Whether [`Self::tick`] must be called on the next frame.
    pub fn needs_frame(&self) -> bool {
        self.frame.is_scheduled()
    }

    pub fn channel_at(&self, x: f32) -> usize {
        if self.width <= 0f32 {
            return 0;
        }

        // float to int `as` casts saturate: negative `x` lands in channel 0.
        let channel = (x * CHANNEL_COUNT as f32 / self.width).floor() as usize;
        channel.min(CHANNEL_COUNT - 1)
    }

    pub fn press(&mut self, x: f32, y: f32, at: Instant) {
        if let Some(ref session) = self.session {
            log::warn!(
                "Ignoring press while a gesture on channel {} is in progress",
                session.channel
            );
            return;
        }

        let channel = self.channel_at(x);
        log::trace!("Press on channel {channel} at y {y}");

        self.session = Some(Session {
            channel,
            values_on_press: self.values,
            start_y: y,
            start_time: at,
        });
        self.frame.start();
    }

    /// Updates the target channel value. Changes are emitted by [`Self::tick`].
    pub fn move_to(&mut self, y: f32) {
        let session = match self.session {
            Some(ref session) => session,
            None => return,
        };

        if self.height <= 0f32 {
            return;
        }

        let dy = session.start_y - y;
        let value = session.values_on_press[session.channel] + dy / self.height;
        // `clamp` lets NaN through, e.g. from infinite coordinates.
        if value.is_nan() {
            log::warn!("Ignoring move to y {y} from y {}", session.start_y);
            return;
        }

        self.values[session.channel] = value.clamp(0f32, 1f32);
    }

    /// Mirrors levels reported by the device on every channel but the one
    /// being edited.
    pub fn seed_values(&mut self, values: &[f32; CHANNEL_COUNT]) {
        let target = self.target_channel();
        for (channel, value) in values.iter().enumerate() {
            if Some(channel) == target {
                log::debug!("Keeping edited value on channel {channel}");
                continue;
            }
            self.set_value(channel, *value);
        }
    }

    pub fn release(&mut self, at: Instant) -> Option<GestureEvent> {
        let session = self.session.take()?;
        self.frame.cancel();

        let elapsed = at.saturating_duration_since(session.start_time);
        let velocity = self.config.velocity(elapsed);
        log::trace!(
            "Release on channel {} after {elapsed:?}: velocity {velocity:.3}",
            session.channel
        );

        Some(GestureEvent::VelocityChanged {
            channel: session.channel,
            velocity,
        })
    }

    /// Runs one frame of change detection.
    ///
    /// Emits at most one change per channel however many moves occurred
    /// since the previous frame.
    pub fn tick(&mut self) -> Vec<GestureEvent> {
        if !self.frame.poll() {
            return GestureEvent::none();
        }

        let mut events = Vec::new();
        for (channel, (value, prev)) in self
            .values
            .iter()
            .zip(self.prev_values.iter_mut())
            .enumerate()
        {
            if *prev != *value {
                *prev = *value;
                events.push(GestureEvent::ValueChanged {
                    channel,
                    value: *value,
                });
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDTH: f32 = 400f32;
    const HEIGHT: f32 = 200f32;

    fn controller() -> GestureController {
        let mut ctrl = GestureController::new();
        ctrl.set_surface(WIDTH, HEIGHT);
        ctrl
    }

    #[test]
    fn channel_mapping() {
        let ctrl = controller();

        assert_eq!(ctrl.channel_at(0f32), 0);
        assert_eq!(ctrl.channel_at(99.9), 0);
        assert_eq!(ctrl.channel_at(100f32), 1);
        assert_eq!(ctrl.channel_at(WIDTH - 0.01), CHANNEL_COUNT - 1);
        assert_eq!(ctrl.channel_at(WIDTH), CHANNEL_COUNT - 1);
        assert_eq!(ctrl.channel_at(10f32 * WIDTH), CHANNEL_COUNT - 1);
        assert_eq!(ctrl.channel_at(-5f32), 0);
    }

    #[test]
    fn velocity_bounds() {
        let config = Config::default();

        assert_eq!(config.velocity(Duration::from_millis(100)), 1f32);
        assert_eq!(config.velocity(Duration::from_millis(2000)), 0f32);
        assert_eq!(config.velocity(Duration::ZERO), 1f32);
        assert_eq!(config.velocity(Duration::from_secs(60)), 0f32);
    }

    #[test]
    fn velocity_is_non_increasing() {
        let config = Config::default();

        let mut prev = config.velocity(Duration::from_millis(100));
        for ms in (110..=2000).step_by(10) {
            let velocity = config.velocity(Duration::from_millis(ms));
            assert!(velocity <= prev, "{ms}ms: {velocity} > {prev}");
            assert!((0f32..=1f32).contains(&velocity));
            prev = velocity;
        }
    }

    #[test]
    fn drag_then_release() {
        let mut ctrl = controller();
        let t0 = Instant::now();

        ctrl.press(0f32, HEIGHT, t0);
        assert_eq!(ctrl.target_channel(), Some(0));
        assert!(ctrl.needs_frame());

        ctrl.move_to(HEIGHT / 2f32);
        assert_eq!(ctrl.values()[0], 0.5);

        assert_eq!(
            ctrl.tick(),
            vec![GestureEvent::ValueChanged {
                channel: 0,
                value: 0.5
            }]
        );
        // no change since previous frame
        assert!(ctrl.tick().is_empty());

        let event = ctrl.release(t0 + Duration::from_millis(500)).unwrap();
        let expected = 1f64 - (500f64.ln() - 100f64.ln()) / (2000f64.ln() - 100f64.ln());
        match event {
            GestureEvent::VelocityChanged { channel, velocity } => {
                assert_eq!(channel, 0);
                assert!((velocity as f64 - expected).abs() < 1e-5);
            }
            other => panic!("unexpected {other:?}"),
        }

        assert!(!ctrl.is_dragging());
        assert!(ctrl.release(t0 + Duration::from_secs(1)).is_none());
    }

    #[test]
    fn moves_are_coalesced_per_frame() {
        let mut ctrl = controller();
        ctrl.press(150f32, 100f32, Instant::now());

        ctrl.move_to(90f32);
        ctrl.move_to(80f32);
        ctrl.move_to(50f32);

        assert_eq!(
            ctrl.tick(),
            vec![GestureEvent::ValueChanged {
                channel: 1,
                value: 0.25
            }]
        );
    }

    #[test]
    fn values_stay_in_range() {
        let mut ctrl = controller();
        ctrl.press(300f32, 100f32, Instant::now());

        ctrl.move_to(-10_000f32);
        assert_eq!(ctrl.values()[3], 1f32);

        ctrl.move_to(10_000f32);
        assert_eq!(ctrl.values()[3], 0f32);

        assert!(ctrl.values().iter().all(|v| (0f32..=1f32).contains(v)));
    }

    #[test]
    fn edit_is_relative_to_value_on_press() {
        let mut ctrl = controller();
        ctrl.set_value(2, 0.5);

        let t0 = Instant::now();
        ctrl.press(250f32, 100f32, t0);
        ctrl.move_to(150f32);
        assert_eq!(ctrl.values()[2], 0.25);
        ctrl.release(t0);

        // a new gesture starts from the latest value
        ctrl.press(250f32, 100f32, t0);
        ctrl.move_to(50f32);
        assert_eq!(ctrl.values()[2], 0.5);
    }

    #[test]
    fn target_channel_is_fixed() {
        let mut ctrl = controller();
        ctrl.press(10f32, 100f32, Instant::now());

        // the pointer wanders over channel 3 column, still editing channel 0
        ctrl.move_to(50f32);
        assert_eq!(ctrl.target_channel(), Some(0));
        assert_eq!(ctrl.values(), &[0.25, 0f32, 0f32, 0f32]);
    }

    #[test]
    fn no_session() {
        let mut ctrl = controller();

        ctrl.move_to(0f32);
        assert_eq!(ctrl.values(), &[0f32; CHANNEL_COUNT]);
        assert!(ctrl.release(Instant::now()).is_none());
        assert!(ctrl.tick().is_empty());
        assert!(!ctrl.needs_frame());
    }

    #[test]
    fn second_press_is_ignored() {
        let mut ctrl = controller();
        let t0 = Instant::now();

        ctrl.press(10f32, 100f32, t0);
        ctrl.press(390f32, 0f32, t0 + Duration::from_millis(50));
        assert_eq!(ctrl.target_channel(), Some(0));

        ctrl.move_to(0f32);
        assert_eq!(ctrl.values()[0], 0.5);

        let event = ctrl.release(t0 + Duration::from_millis(100)).unwrap();
        assert_eq!(
            event,
            GestureEvent::VelocityChanged {
                channel: 0,
                velocity: 1f32
            }
        );
    }

    #[test]
    fn pending_frame_runs_after_release() {
        let mut ctrl = controller();
        let t0 = Instant::now();

        ctrl.press(10f32, 100f32, t0);
        assert!(ctrl.tick().is_empty());

        ctrl.move_to(0f32);
        ctrl.release(t0 + Duration::from_secs(3));
        assert!(ctrl.needs_frame());

        assert_eq!(
            ctrl.tick(),
            vec![GestureEvent::ValueChanged {
                channel: 0,
                value: 0.5
            }]
        );
        assert!(!ctrl.needs_frame());
        assert!(ctrl.tick().is_empty());
    }

    #[test]
    fn seeded_values_are_not_emitted() {
        let mut ctrl = controller();
        ctrl.set_value(1, 0.75);
        ctrl.set_value(3, 7f32);
        ctrl.set_value(CHANNEL_COUNT, 0.5);

        ctrl.press(0f32, 0f32, Instant::now());
        assert!(ctrl.tick().is_empty());
        assert_eq!(ctrl.values(), &[0f32, 0.75, 0f32, 1f32]);
    }

    #[test]
    fn non_finite_coordinates() {
        let mut ctrl = controller();
        let t0 = Instant::now();

        ctrl.press(0f32, f32::INFINITY, t0);
        ctrl.move_to(f32::INFINITY);
        assert_eq!(ctrl.values()[0], 0f32);
        ctrl.move_to(f32::NAN);
        assert_eq!(ctrl.values()[0], 0f32);
        assert!(ctrl.tick().is_empty());
        ctrl.release(t0);

        ctrl.press(0f32, 100f32, t0);
        ctrl.move_to(f32::NAN);
        assert_eq!(ctrl.values()[0], 0f32);
        ctrl.move_to(f32::NEG_INFINITY);
        assert_eq!(ctrl.values()[0], 1f32);
        assert_eq!(
            ctrl.tick(),
            vec![GestureEvent::ValueChanged {
                channel: 0,
                value: 1f32
            }]
        );
        assert!(ctrl.tick().is_empty());

        ctrl.set_value(1, f32::NAN);
        assert!(ctrl.values().iter().all(|v| (0f32..=1f32).contains(v)));
    }

    #[test]
    fn seeding_while_dragging_keeps_the_edited_channel() {
        let mut ctrl = controller();
        let t0 = Instant::now();

        ctrl.press(150f32, 100f32, t0);
        ctrl.move_to(50f32);
        ctrl.seed_values(&[1f32, 0.5, 1f32, 0.25]);
        assert_eq!(ctrl.values(), &[1f32, 0.25, 1f32, 0.25]);

        // only the drag is emitted, seeded channels are not echoed back
        assert_eq!(
            ctrl.tick(),
            vec![GestureEvent::ValueChanged {
                channel: 1,
                value: 0.25
            }]
        );
        ctrl.release(t0);

        ctrl.seed_values(&[0f32, 0.75, 0f32, 0f32]);
        assert_eq!(ctrl.values(), &[0f32, 0.75, 0f32, 0f32]);
    }

    #[test]
    fn empty_surface() {
        let mut ctrl = GestureController::new();
        ctrl.press(42f32, 10f32, Instant::now());
        assert_eq!(ctrl.target_channel(), Some(0));

        ctrl.move_to(0f32);
        assert_eq!(ctrl.values()[0], 0f32);
    }
}
