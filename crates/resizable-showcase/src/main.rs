//! Showcase entry point.
//!
//! Usage: `resizable-showcase [options.json]`. Set `RUST_LOG=debug` to follow
//! each pointer move.

use resizable_core::ResizeOptionsPatch;
use resizable_showcase::{Showcase, demo_script, load_patch};
use std::path::PathBuf;

fn main() {
    env_logger::init();
    log::info!("Starting resizable showcase");

    if let Err(e) = run() {
        log::error!("Showcase failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let patch = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => {
            log::info!("Loading options from {}", path.display());
            load_patch(&path)?
        }
        None => ResizeOptionsPatch::default(),
    };

    let mut showcase = Showcase::mount(&patch)?;
    log::info!(
        "Mounted with {} handle(s), box is {:?}",
        showcase.controller().handles().len(),
        showcase.size()
    );

    for drag in demo_script() {
        match showcase.replay(&drag) {
            Some(size) => log::info!(
                "Dragged {} handle: box is {}x{}",
                drag.direction,
                size.width,
                size.height
            ),
            None => log::warn!("No {} handle bound, skipping", drag.direction),
        }
    }

    showcase.unmount();
    log::info!("Final size {:?}", showcase.size());
    Ok(())
}
