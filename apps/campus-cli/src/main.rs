use std::path::PathBuf;

use anyhow::Context;
use campus_assets::TextureRegistry;
use campus_input::{
    HeldKeys, Key, PlayerController, ScriptedTranscriber, Transcriber, VoiceConfig, VoiceInput,
};
use campus_kernel::{CollisionKind, CreatureKind, World, WorldConfig};
use campus_render::{DebugTextRenderer, Renderer};
use campus_tools::WorldInspector;
use clap::{Parser, Subcommand, ValueEnum};
use glam::Vec2;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "campus-cli", about = "Headless driver for the campus tour")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print the effective world config as JSON
    Config {
        /// Config file to validate and print instead of the defaults
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Run the world loop headless
    Run {
        /// Number of frames to simulate
        #[arg(short, long, default_value = "600")]
        ticks: u64,
        /// Frame time in seconds
        #[arg(long, default_value = "0.016666668")]
        dt: f32,
        /// World config JSON
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Texture manifest JSON (defaults to the built-in campus textures)
        #[arg(long)]
        textures: Option<PathBuf>,
        /// Place the campus buildings
        #[arg(long)]
        campus: bool,
        /// Direction keys held for the whole run
        #[arg(long, value_enum)]
        hold: Vec<Direction>,
        /// Text file with one voice transcript per line
        #[arg(long)]
        voice_script: Option<PathBuf>,
        /// Voice config JSON
        #[arg(long)]
        voice_config: Option<PathBuf>,
        /// Print the final frame as text
        #[arg(long)]
        frame: bool,
    },
    /// Check the player/building collision scenario
    Scenario,
}

#[derive(Clone, Copy, ValueEnum)]
enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn key(self) -> Key {
        match self {
            Self::Up => Key::Up,
            Self::Down => Key::Down,
            Self::Left => Key::Left,
            Self::Right => Key::Right,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match cli.command {
        Commands::Info => {
            println!("campus-cli v{}", env!("CARGO_PKG_VERSION"));
            let world = World::new(WorldConfig::default(), TextureRegistry::campus())?;
            println!("kernel: tick={} nodes={}", world.tick(), world.node_count());
            println!("assets: {}", campus_assets::crate_info());
            println!("input: {}", campus_input::crate_info());
            println!("render: {}", campus_render::crate_info());
            println!("tools: {}", campus_tools::crate_info());
        }
        Commands::Config { config } => {
            let config = load_config(config)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Run {
            ticks,
            dt,
            config,
            textures,
            campus,
            hold,
            voice_script,
            voice_config,
            frame,
        } => {
            let config = load_config(config)?;
            let textures = match textures {
                Some(path) => TextureRegistry::load_manifest(&path)
                    .with_context(|| format!("loading texture manifest {}", path.display()))?,
                None => TextureRegistry::campus(),
            };
            let mut world = World::new(config, textures)?;
            if campus {
                world.add_campus_map_assets();
            }

            let controller = PlayerController::new();
            let mut keys = HeldKeys::new();
            for direction in hold {
                keys.press(direction.key());
            }

            let voice_config = match voice_config {
                Some(path) => VoiceConfig::load(&path)
                    .with_context(|| format!("loading voice config {}", path.display()))?,
                None => VoiceConfig::default(),
            };
            let mut voice = match voice_script {
                Some(path) => {
                    let capture = ScriptedTranscriber::from_file(&path)
                        .map(|t| Box::new(t) as Box<dyn Transcriber>);
                    VoiceInput::from_capture(capture, &voice_config)
                }
                None => VoiceInput::disabled(),
            };

            println!("Running {ticks} ticks at dt={dt}");
            for tick in 0..ticks {
                voice.poll();
                let queue = world.command_queue_mut();
                controller.handle_realtime_input(&keys, queue);
                controller.handle_voice_input(&mut voice, queue);
                world.update(dt);

                if (tick + 1) % 60 == 0 {
                    tracing::debug!("{}", WorldInspector::summary(&world));
                }
            }

            println!("{}", WorldInspector::summary(&world));
            if frame {
                print!("{}", DebugTextRenderer::new().render(&world));
            }
        }
        Commands::Scenario => {
            let config = WorldConfig::default();
            let spawn = config.player_spawn;
            let mut world = World::new(config, TextureRegistry::campus())?;
            world.add_map_asset(CreatureKind::Classroom, spawn);
            world.spawn_pending();
            world.update(1.0 / 60.0);

            let collisions = world.last_collisions();
            let velocity = world.player().map_or(Vec2::ZERO, |p| p.velocity());
            println!("Collisions: {}", collisions.len());
            for c in collisions {
                println!(
                    "  {:?}: {} / {}",
                    c.kind,
                    c.pair.first.short(),
                    c.pair.second.short()
                );
            }
            println!("Player velocity: ({:.1}, {:.1})", velocity.x, velocity.y);

            let ok = collisions.len() == 1
                && collisions[0].kind == CollisionKind::PlayerMapAsset
                && collisions[0].pair.first == world.player_id()
                && velocity != Vec2::ZERO;
            println!("Result: {}", if ok { "OK" } else { "MISMATCH" });
            if !ok {
                anyhow::bail!("collision scenario did not resolve as expected");
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<WorldConfig> {
    match path {
        Some(path) => WorldConfig::load(&path)
            .with_context(|| format!("loading world config {}", path.display())),
        None => Ok(WorldConfig::default()),
    }
}
