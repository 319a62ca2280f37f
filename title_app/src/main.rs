//! Title screen demo
//!
//! Shows a live extruded title and subtitle. Type commands on stdin to
//! change the text or font of either line.

mod app;
mod commands;
mod config;

use std::io::BufRead;
use std::sync::mpsc;
use std::thread;

use text3d::config::Config;
use text3d::foundation::logging;

use app::{AppError, TitleApp};
use config::TitleAppConfig;

const DEFAULT_CONFIG_PATH: &str = "title_app.toml";

fn main() -> Result<(), AppError> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = TitleAppConfig::load_or_default(&config_path)?;
    logging::init_with_level(&config.log_level);
    log::info!("Starting title app with {}", config_path);

    let mut app = TitleApp::new(&config)?;

    let (sender, receiver) = mpsc::channel();
    thread::Builder::new().name("console".into()).spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if sender.send(line).is_err() {
                break;
            }
        }
    })?;

    app.run(&receiver);
    log::info!("Title app finished");
    Ok(())
}
