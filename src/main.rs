//! Astro Runner headless entry point
//!
//! Plays one autopilot run at a simulated 60 Hz display and prints the run
//! summary as JSON.

use std::path::PathBuf;

use astro_runner::autopilot::autopilot_intent;
use astro_runner::sim::events::{BossStatus, RunSummary};
use astro_runner::sim::powerup::PowerUpKind;
use astro_runner::{EventSink, Game, RunMode, SimConfig};
use clap::{Parser, ValueEnum};

/// Simulated display refresh interval (ms)
const DISPLAY_FRAME_MS: f64 = 1000.0 / 60.0;

#[derive(Parser, Debug)]
#[command(name = "astro-runner")]
#[command(about = "Headless autopilot run of the Astro Runner simulation")]
struct Cli {
    /// Seed for the gameplay RNG
    #[arg(long, default_value_t = 0x00A5_7E01)]
    seed: u64,
    /// Simulated seconds before the run is cut off
    #[arg(long, default_value_t = 120.0)]
    seconds: f64,
    /// Overrides the mode from the config file
    #[arg(long, value_enum)]
    mode: Option<CliMode>,
    /// JSON config; omitted or invalid values fall back to defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print a HUD snapshot line every simulated second
    #[arg(long)]
    hud: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliMode {
    Standard,
    #[value(alias = "practice")]
    Tutorial,
}

impl From<CliMode> for RunMode {
    fn from(value: CliMode) -> Self {
        match value {
            CliMode::Standard => RunMode::Standard,
            CliMode::Tutorial => RunMode::Tutorial,
        }
    }
}

fn load_config(cli: &Cli) -> SimConfig {
    let mut config = match &cli.config {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(json) => SimConfig::from_json_or_default(&json),
            Err(e) => {
                log::warn!("Could not read {}: {e}; using defaults", path.display());
                SimConfig::default()
            }
        },
        None => SimConfig::default(),
    };
    if let Some(mode) = cli.mode {
        config.mode = mode.into();
    }
    config
}

/// Logs events as they happen
struct LogSink;

impl EventSink for LogSink {
    fn on_power_up(&mut self, kind: PowerUpKind) {
        log::info!("Power-up: {}", kind.as_str());
    }

    fn on_villain_killed(&mut self, name: &str, boss: bool) {
        if boss {
            log::info!("Boss down: {name}");
        } else {
            log::debug!("Destroyed {name}");
        }
    }

    fn on_boss_status(&mut self, status: BossStatus, boss_key: &str) {
        log::info!("Boss {boss_key}: {}", status.as_str());
    }

    fn on_game_over(&mut self, reason: &str, summary: &RunSummary) {
        log::info!("Run over after {:.1}s: {reason}", summary.survival_ms / 1000.0);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(&cli);
    log::info!("Astro Runner (headless) seed {} for {}s", cli.seed, cli.seconds);

    let mut game = Game::new(cli.seed, config).with_sink(Box::new(LogSink));
    game.start();

    let frames = (cli.seconds * 1000.0 / DISPLAY_FRAME_MS).ceil().max(0.0) as u64;
    for frame in 0..=frames {
        let intent = autopilot_intent(game.state());
        game.set_input_intent(intent);
        game.frame(frame as f64 * DISPLAY_FRAME_MS);

        if cli.hud && frame % 60 == 0 {
            match serde_json::to_string(&game.hud()) {
                Ok(line) => println!("{line}"),
                Err(e) => log::warn!("HUD serialization failed: {e}"),
            }
        }
        if game.summary().is_some() {
            break;
        }
    }

    let summary = match game.summary() {
        Some(summary) => summary.clone(),
        None => game.state().run_summary("time limit"),
    };
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Summary serialization failed: {e}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser hosts drive `Game` directly
}
