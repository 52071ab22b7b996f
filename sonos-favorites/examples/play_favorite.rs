//! # Play a favorite
//!
//! Plays a Sonos favorite on one or more speakers. Container favorites such
//! as podcasts are expanded and their newest episode is played.
//!
//! ## Usage
//!
//! ```bash
//! SONOS_FAVORITES_BOOTSTRAP=192.168.1.20 \
//! SONOS_FAVORITES_LOG_MODE=development \
//!     cargo run --example play_favorite -- "FV:2/13" RINCON_A1400 RINCON_B1400
//! ```
//!
//! Without a favorite id the favorites of the first speaker are listed.
//! The bootstrap address can also be set in `config.json` under the user's
//! config directory.

use std::process::ExitCode;

use sonos_favorites::{
    init_logging_from_env, DeviceId, OrchestratorConfig, Playable, PlaybackOrchestrator, PlaybackOutcome,
    PlaybackRequest,
};

fn main() -> ExitCode {
    if let Err(e) = init_logging_from_env() {
        eprintln!("logging: {}", e);
        return ExitCode::FAILURE;
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> sonos_favorites::Result<()> {
    let config = OrchestratorConfig::load_default()?;
    let orchestrator = PlaybackOrchestrator::from_config(config)?;

    let (favorite_id, devices) = match args {
        [] => {
            println!("usage: play_favorite [FAVORITE_ID] DEVICE_ID...");
            return Ok(());
        }
        [device] => {
            list_favorites(&orchestrator, &DeviceId::new(device.as_str()))?;
            return Ok(());
        }
        [favorite_id, devices @ ..] => (favorite_id, devices),
    };

    let request = PlaybackRequest::new(favorite_id.as_str(), devices.iter().map(String::as_str));
    match orchestrator.play_favorite(&request)? {
        PlaybackOutcome::Started { group, target, item, strategy } => {
            println!("Playing {} on {} speaker(s)", target.uri, group.member_ids.len());
            if let Some(item) = item {
                println!("  entry: {} ({})", item.title, item.date().unwrap_or("undated"));
            }
            if let Some(strategy) = strategy {
                println!("  found via {}", strategy);
            }
            for failure in &group.failures {
                println!("  {} did not join: {}", failure.device_id, failure.reason);
            }
        }
        PlaybackOutcome::NothingToPlay { title, message } => {
            println!("{}: {}", title, message);
        }
    }
    Ok(())
}

fn list_favorites(orchestrator: &PlaybackOrchestrator, device: &DeviceId) -> sonos_favorites::Result<()> {
    let count = orchestrator.refresh_favorites(device)?;
    println!("{} favorites on {}", count, device);
    for favorite in orchestrator.favorites().all().iter() {
        let kind = if favorite.is_container { "container" } else { "item" };
        println!("  {:<12} {:<9} {}", favorite.item_id, kind, favorite.title);
    }
    Ok(())
}
