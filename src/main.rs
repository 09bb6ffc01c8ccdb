//! Voicecraft main entry point
//!
//! Loads configuration, builds the speech service, and serves the HTTP API
//! until Ctrl+C or SIGTERM.

use anyhow::Context;
use log::{error, info};
use std::path::PathBuf;
use std::process;
use voicecraft::server::{self, shutdown_signal};
use voicecraft::service::SpeechService;
use voicecraft::state::config::Config;
use voicecraft::state::AppState;
use voicecraft::voices;

const USAGE: &str = "Usage: voicecraft [--debug] [--config <path>] [--list-voices]";

/// Command line options
struct Args {
    debug: bool,
    list_voices: bool,
    config: Option<PathBuf>,
}

impl Args {
    fn parse() -> anyhow::Result<Self> {
        let mut args = Args {
            debug: false,
            list_voices: false,
            config: None,
        };

        let mut iter = std::env::args().skip(1);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--debug" | "-d" => args.debug = true,
                "--list-voices" => args.list_voices = true,
                "--config" | "-c" => {
                    let path = iter.next().context("--config needs a file path")?;
                    args.config = Some(PathBuf::from(path));
                }
                other => anyhow::bail!("Unknown argument '{}'\n{}", other, USAGE),
            }
        }

        Ok(args)
    }
}

fn main() {
    let args = match Args::parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(2);
        }
    };

    init_logging(args.debug);

    if let Err(e) = run(args) {
        error!("Fatal error: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Initialize logger
///
/// Debug mode appends everything to voicecraft.log; otherwise RUST_LOG
/// applies on top of an info default.
fn init_logging(debug_mode: bool) {
    if debug_mode {
        use std::fs::OpenOptions;
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open("voicecraft.log")
        {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Warning: Failed to open voicecraft.log for debug logging: {}", e);
                eprintln!("Continuing without file logging...");
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Warn)
                    .init();
            }
        }

        info!(
            "Voicecraft version {} starting (debug mode, logging to voicecraft.log)",
            voicecraft::VERSION
        );
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Info)
            .parse_default_env()
            .init();
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;
    info!("Configuration loaded from {:?}", config.path());

    let service = SpeechService::from_config(&config).context("Failed to set up speech service")?;

    if args.list_voices {
        print_voices(&service);
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    info!("Starting Text-to-Speech API Server v{}", voicecraft::VERSION);
    info!("Available endpoints:");
    info!("  GET  /api/voices     - Get available voices");
    info!("  POST /api/synthesize - Synthesize speech from text");
    info!("  GET  /api/health     - Health check");
    info!("  POST /api/cleanup    - Clean up temporary files");

    let state = AppState::new(service);
    runtime
        .block_on(server::serve(&config, state, shutdown_signal()))
        .context("Server error")?;

    Ok(())
}

/// Print personas and engine voices for --list-voices
fn print_voices(service: &SpeechService) {
    println!("Voice personas:");
    for profile in voices::profiles() {
        println!(
            "  {:<18} {:<22} {:>3} wpm  voice #{}",
            profile.id, profile.display_name, profile.base_rate, profile.backend_voice_index
        );
    }

    let listing = service.list_voices();
    if listing.voices.is_empty() {
        println!("Speech engine unavailable, no engine voices listed");
    } else {
        println!("Engine voices:");
        for voice in &listing.voices {
            println!("  {:>2}  {}", voice.index, voice.name);
        }
    }
}
