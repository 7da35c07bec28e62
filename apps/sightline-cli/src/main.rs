use clap::{Parser, Subcommand};
use glam::Vec3;
use tracing_subscriber::EnvFilter;

use sightline_cull::{
    CullConfig, CullSummary, Culler, Domain, MotionSource, ObjectHandle, RealizeError, RealizeHost,
};

#[derive(Parser)]
#[command(name = "sightline-cli", about = "CLI demos for the sightline culling subsystem")]
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
    /// Fly an observer through a scattered world and report culling stats
    Simulate {
        /// Number of objects to scatter
        #[arg(short, long, default_value = "2000")]
        objects: usize,
        /// Number of frames to simulate
        #[arg(short, long, default_value = "300")]
        frames: usize,
        /// Seed for the deterministic scatter
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Optional JSON culling configuration file
        #[arg(long)]
        config: Option<std::path::PathBuf>,
    },
}

/// Demo host: counts realize/toggle traffic instead of building resources.
#[derive(Default)]
struct DemoHost {
    realized: usize,
    toggles: usize,
}

impl RealizeHost for DemoHost {
    fn realize(&mut self, handle: ObjectHandle) -> Result<(), RealizeError> {
        self.realized += 1;
        tracing::debug!(?handle, "realized");
        Ok(())
    }

    fn set_active(&mut self, handle: ObjectHandle, active: bool) {
        self.toggles += 1;
        tracing::trace!(?handle, active, "toggle");
    }
}

/// Everything in the demo world is at rest.
struct StaticMotion;

impl MotionSource for StaticMotion {
    fn velocity(&self, _handle: ObjectHandle) -> Vec3 {
        Vec3::ZERO
    }
    fn position(&self, _handle: ObjectHandle) -> Vec3 {
        Vec3::ZERO
    }
}

/// Splitmix64 step, used for a reproducible object scatter.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

fn unit(state: &mut u64) -> f32 {
    (splitmix64(state) >> 40) as f32 / (1u64 << 24) as f32
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("sightline-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", sightline_common::crate_info());
            println!("index: {}", sightline_index::crate_info());
            println!("realize: {}", sightline_realize::crate_info());
            println!("manip: {}", sightline_manip::crate_info());
            println!("cull: {}", sightline_cull::crate_info());
        }
        Commands::Simulate {
            objects,
            frames,
            seed,
            config,
        } => {
            let config: CullConfig = match config {
                Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
                None => CullConfig::default(),
            };
            let mut culler = Culler::new(config)?;
            culler.on_world_loaded(ObjectHandle::new());

            // Scatter a mixed population across a 800x800 area.
            let mut rng = seed;
            for _ in 0..objects {
                let position = Vec3::new(
                    (unit(&mut rng) - 0.5) * 800.0,
                    0.0,
                    (unit(&mut rng) - 0.5) * 800.0,
                );
                let handle = ObjectHandle::new();
                match splitmix64(&mut rng) % 5 {
                    0 => {
                        culler.register_static(Domain::Npc, handle, position, 0.6)?;
                    }
                    1 => {
                        culler.register_static(Domain::Sound, handle, position, 0.5)?;
                    }
                    _ => {
                        // Size mix spanning all three tiers.
                        let radius = 0.05 + unit(&mut rng) * 20.0;
                        culler.register_mesh(handle, position, radius)?;
                    }
                }
            }
            println!("Scattered {objects} objects, seed={seed}");

            let mut host = DemoHost::default();
            let motion = StaticMotion;
            let mut total_changes = 0;
            for frame in 0..frames {
                // Fly a straight path across the world.
                let t = frame as f32 / frames.max(1) as f32;
                let observer = Vec3::new(-400.0 + t * 800.0, 1.7, 0.0);
                let stats = culler.update(observer, Some(60.0), &mut host, &motion);
                total_changes += stats.changes;
                if frame % 60 == 0 {
                    println!(
                        "frame {frame}: changes={} realized={} pending={} frame_time={:?}",
                        stats.changes, stats.realized, stats.pending, stats.frame_time
                    );
                }
            }

            println!();
            println!("{}", CullSummary::capture(&culler));
            let timer = culler.frame_timer();
            println!(
                "frames={} changes={} realizes={} toggles={} update avg={:?} max={:?}",
                frames,
                total_changes,
                host.realized,
                host.toggles,
                timer.average(),
                timer.max()
            );
        }
    }

    Ok(())
}
