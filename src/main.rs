mod ai;
mod app;
mod backend;
mod cli;
mod config;
mod error;
mod events;
mod logger;
mod state;
mod ui;

use anyhow::Result;
use app::App;
use config::Config;
use log::LevelFilter;
use logger::CustomLogger;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli::app().get_matches();
    let (name, sub_matches) = matches.subcommand();
    let config_dir = matches
        .value_of("config")
        .or_else(|| sub_matches.and_then(|m| m.value_of("config")));
    let verbose = matches.is_present("verbose")
        || sub_matches.map_or(false, |m| m.is_present("verbose"));

    let mut config = Config::new();
    config.load(config_dir)?;

    match sub_matches {
        Some(sub_matches) if name != "ui" => {
            let level = if verbose {
                LevelFilter::Debug
            } else {
                LevelFilter::Warn
            };
            CustomLogger::install_stderr(level)?;
            cli::run(&mut config, name, sub_matches).await
        }
        _ => {
            let level = if verbose {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            };
            App::start(config, level).await
        }
    }
}
