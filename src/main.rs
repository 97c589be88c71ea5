#![allow(non_snake_case)]

use dioxus::prelude::*;
use tracing::{error, info, Level};
use zkmarket::app::App;
use zkmarket::config::Config;

fn main() {
    // Load config before the logger so its level applies from the first line
    let loaded = Config::embedded();
    let level = loaded
        .as_ref()
        .map(|c| c.logging.level.as_str())
        .unwrap_or("info")
        .parse::<Level>()
        .unwrap_or(Level::INFO);

    dioxus_logger::init(level).expect("failed to init logger");

    match &loaded {
        Ok(config) => info!(
            program_id = %config.program.program_id,
            network = %config.program.network,
            fee = config.program.fee_microcredits,
            "zkmarket v{} starting",
            env!("CARGO_PKG_VERSION")
        ),
        Err(e) => error!(error = %e, "invalid bundled config, using defaults"),
    }

    launch(App);
}
