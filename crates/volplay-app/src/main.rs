//! Volplay - volumetric sequence player
//!
//! Headless driver: plays built-in synthetic sequences through the full
//! playback engine and logs what gets presented.

mod library;
mod session;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use volplay_core::{ActiveRange, FrameRate, OutOfRangeMode, Vec3};
use volplay_media::{SequenceProbe, SourceDescriptor};
use volplay_playback::{Player, PlayerConfig, PlayerConfigFile};

use crate::session::Session;

/// Volplay - volumetric sequence player
#[derive(Parser, Debug)]
#[command(name = "volplay")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Plays mesh+texture sequences headlessly", long_about = None)]
struct Args {
    /// Frames in each built-in sequence
    #[arg(long, default_value_t = 300, global = true)]
    frames: u32,

    /// Frame rate of the built-in sequences
    #[arg(long, default_value_t = 30.0, global = true)]
    fps: f32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a built-in sequence
    Demo {
        /// Built-in sequence to play
        #[arg(default_value = "demo")]
        location: String,

        #[arg(long, value_enum, default_value_t = Mode::Loop)]
        mode: Mode,

        /// First active frame
        #[arg(long, default_value_t = 0)]
        first: u32,

        /// Last active frame; defaults to the end of the sequence
        #[arg(long)]
        last: Option<u32>,

        #[arg(long, default_value_t = 1.0)]
        speed: f32,

        /// Stop on the last active frame instead of looping
        #[arg(long)]
        no_loop: bool,

        /// Look-at target as x,y,z
        #[arg(long, value_parser = parse_vec3)]
        look_at: Option<Vec3>,

        /// Jump to this named event before playing
        #[arg(long)]
        goto_event: Option<String>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Play using a saved player configuration
    Play {
        #[arg(value_name = "CONFIG")]
        config: PathBuf,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Print sequence metadata as JSON
    Probe {
        #[arg(default_value = "demo")]
        location: String,
    },

    /// Write a default player configuration
    InitConfig {
        #[arg(value_name = "CONFIG")]
        output: PathBuf,

        #[arg(long, default_value = "demo")]
        location: String,
    },
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Number of ticks to run
    #[arg(long, default_value_t = 600)]
    ticks: u32,

    /// Host refresh rate driving the ticks
    #[arg(long, default_value_t = 60.0)]
    refresh: f64,

    /// Sleep between ticks
    #[arg(long)]
    realtime: bool,

    /// Collect decoding statistics
    #[arg(long)]
    stats: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Mode {
    Loop,
    Reverse,
    Stop,
    Hide,
}

impl From<Mode> for OutOfRangeMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Loop => Self::Loop,
            Mode::Reverse => Self::Reverse,
            Mode::Stop => Self::Stop,
            Mode::Hide => Self::Hide,
        }
    }
}

fn parse_vec3(value: &str) -> std::result::Result<Vec3, String> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<f32>().map_err(|e| e.to_string()))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(format!("expected x,y,z but got {}", value)),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if args.frames < 2 {
        anyhow::bail!("built-in sequences need at least 2 frames");
    }
    let frame_rate = FrameRate::from_fps_f32(args.fps)?;

    match args.command {
        Commands::Demo {
            location,
            mode,
            first,
            last,
            speed,
            no_loop,
            look_at,
            goto_event,
            run,
        } => {
            let mut config = PlayerConfig::new(SourceDescriptor::local(location));
            config.out_of_range = mode.into();
            config.active_range = ActiveRange::new(first, last)?;
            config.speed_ratio = speed;
            config.looping = !no_loop;
            config.collect_stats = run.stats;

            let player = Player::new(Box::new(library::demo_source(args.frames, frame_rate)), config);
            let mut session = Session::new(player, 1.0 / run.refresh, run.realtime);
            session.player_mut().set_look_at(look_at);
            if let Some(name) = goto_event {
                let player = session.player_mut();
                player.initialize()?;
                player
                    .goto_event(&name)
                    .with_context(|| format!("cannot jump to event {}", name))?;
            }
            report(session.run(run.ticks)?)
        }
        Commands::Play { config, run } => {
            let file = PlayerConfigFile::load_from_file(&config)
                .with_context(|| format!("cannot load {}", config.display()))?;
            let mut player_config = file.config;
            player_config.collect_stats |= run.stats;
            info!("Loaded configuration written by {}", file.app_version);

            let player = Player::new(
                Box::new(library::demo_source(args.frames, frame_rate)),
                player_config,
            );
            let mut session = Session::new(player, 1.0 / run.refresh, run.realtime);
            report(session.run(run.ticks)?)
        }
        Commands::Probe { location } => {
            let mut source = library::demo_source(args.frames, frame_rate);
            let probe = SequenceProbe::probe(&mut source, &SourceDescriptor::local(location))?;
            println!("{}", serde_json::to_string_pretty(&probe)?);
            Ok(())
        }
        Commands::InitConfig { output, location } => {
            let file = PlayerConfigFile::new(PlayerConfig::new(SourceDescriptor::local(location)));
            file.save_to_file(&output)?;
            info!(
                "Wrote {} (built-in locations: {})",
                output.display(),
                library::LOCATIONS.join(", ")
            );
            Ok(())
        }
    }
}

fn report(summary: session::SessionSummary) -> Result<()> {
    info!(
        "{} ticks, {} models published, {} hidden, {} user events, final frame {:?}",
        summary.ticks,
        summary.published,
        summary.hidden_ticks,
        summary.user_events.len(),
        summary.final_frame
    );
    Ok(())
}
