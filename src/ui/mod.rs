pub mod app;
pub use app::App;

pub mod controller;
pub use controller::Spawner;

pub mod surface;
pub use surface::TouchSurface;
