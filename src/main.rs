pub mod bytes;
pub mod dimmer;
pub mod gesture;
mod ui;

fn main() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Debug)
        .parse_default_env()
        .init();

    let link = dimmer::LoopbackDimmer::new("Loopback Dimmer");

    log::info!("Starting");
    eframe::run_native(
        "Lights Dimmer",
        eframe::NativeOptions::default(),
        Box::new(move |cc| Box::new(ui::App::new(cc, Box::new(link)))),
    );
}
