use anyhow::Context as _;
use clap::{Parser, Subcommand};
use glam::Vec2;
use pvz_common::GameConfig;
use pvz_game::{Game, InputAction};
use pvz_kernel::{
    Clock, FrameScheduler, ManualClock, PacedScheduler, PumpOutcome, SimulatedScheduler,
    SystemClock,
};
use pvz_render::{RecordingCanvas, fit_to_container};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pvz-cli", about = "Police vs Zombies: headless game loop runner")]
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
    /// Print the effective configuration as JSON
    Config {
        /// JSON config file; defaults are used when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Run the game loop on a recording canvas
    Run {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Number of frames to pump
        #[arg(short, long, default_value = "120")]
        frames: u64,
        /// Frame interval in milliseconds
        #[arg(long, default_value = "16.667")]
        frame_ms: f64,
        /// Pace frames with the wall clock instead of a simulated one
        #[arg(long)]
        realtime: bool,
        /// Toggle pause before this frame
        #[arg(long)]
        pause_at: Option<u64>,
        /// Toggle pause again before this frame
        #[arg(long)]
        resume_at: Option<u64>,
        /// Directory used for the storage probe
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Seed for demo object placement
        #[arg(long, default_value = "42")]
        seed: u64,
        /// Container size (WIDTHxHEIGHT) to fit the canvas into
        #[arg(long, value_parser = parse_size)]
        container: Option<Vec2>,
    },
}

fn parse_size(s: &str) -> Result<Vec2, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let w: f32 = w.trim().parse().map_err(|e| format!("width: {e}"))?;
    let h: f32 = h.trim().parse().map_err(|e| format!("height: {e}"))?;
    Ok(Vec2::new(w, h))
}

fn load_config(path: Option<&Path>) -> anyhow::Result<GameConfig> {
    match path {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(GameConfig::default()),
    }
}

/// Check that `dir` is writable by creating and removing a marker file.
fn probe_storage(dir: &Path) -> bool {
    let marker = dir.join(".pvz-probe");
    let result = std::fs::create_dir_all(dir)
        .and_then(|()| std::fs::write(&marker, b"probe"))
        .and_then(|()| std::fs::remove_file(&marker));
    match result {
        Ok(()) => {
            tracing::debug!(dir = %dir.display(), "storage available");
            true
        }
        Err(error) => {
            tracing::warn!(dir = %dir.display(), %error, "storage unavailable, continuing without it");
            false
        }
    }
}

struct RunOptions {
    frames: u64,
    pause_at: Option<u64>,
    resume_at: Option<u64>,
}

#[derive(Debug, Default)]
struct RunReport {
    frames: u64,
    fixed_steps: u64,
    clamped_frames: u64,
    last_frame_commands: usize,
}

/// Pump `game` for up to `opts.frames` frames, toggling pause where asked.
fn drive<C: Clock>(
    game: &mut Game<C, RecordingCanvas>,
    scheduler: &mut dyn FrameScheduler,
    opts: &RunOptions,
) -> RunReport {
    let mut report = RunReport::default();
    game.start();

    for frame in 0..opts.frames {
        if frame > 0 && !scheduler.wait_next_frame() {
            break;
        }
        let paused = game.state().is_paused;
        let toggle = (opts.pause_at == Some(frame) && !paused)
            || (opts.resume_at == Some(frame) && paused);
        if toggle {
            game.handle_action(InputAction::TogglePause);
        }

        match game.pump() {
            PumpOutcome::Stopped => break,
            PumpOutcome::Continue(frame_report) => {
                report.frames += 1;
                report.fixed_steps += u64::from(frame_report.fixed_steps);
                if frame_report.clamped {
                    report.clamped_frames += 1;
                }
            }
        }
        report.last_frame_commands = game
            .scene_mut()
            .renderer_mut()
            .context_mut()
            .take_commands()
            .len();
    }

    game.stop();
    report
}

fn print_report<C: Clock>(
    game: &Game<C, RecordingCanvas>,
    report: &RunReport,
) -> anyhow::Result<()> {
    println!("frames: {}", report.frames);
    println!("fixed steps: {}", report.fixed_steps);
    println!("clamped frames: {}", report.clamped_frames);
    println!("fps: {}", game.engine().fps());
    println!("last delta: {:.2}ms", game.engine().delta_time() * 1000.0);
    println!("draw commands (last frame): {}", report.last_frame_commands);
    println!(
        "entities: demo={} units={} zombies={} projectiles={} effects={}",
        game.scene().demo_objects().len(),
        game.scene().units().len(),
        game.scene().zombies().len(),
        game.scene().projectiles().len(),
        game.scene().effects().len()
    );
    println!("state: {}", serde_json::to_string(game.state())?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = match &cli.command {
        Commands::Info => None,
        Commands::Config { config } | Commands::Run { config, .. } => config.clone(),
    };
    let config = load_config(config_path.as_deref());

    let filter = match (&config, cli.verbose) {
        (_, true) => "debug".to_string(),
        (Ok(config), false) => config.debug.log_level.clone(),
        (Err(_), false) => "info".to_string(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = config.inspect_err(|error| tracing::error!(%error, "invalid configuration"))?;

    match cli.command {
        Commands::Info => {
            println!("pvz-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", pvz_common::crate_info());
            println!("kernel: {}", pvz_kernel::crate_info());
            println!("render: {}", pvz_render::crate_info());
            println!("game: {}", pvz_game::crate_info());
        }
        Commands::Config { .. } => {
            println!("{}", config.to_json_pretty()?);
        }
        Commands::Run {
            frames,
            frame_ms,
            realtime,
            pause_at,
            resume_at,
            data_dir,
            seed,
            container,
            ..
        } => {
            anyhow::ensure!(
                frame_ms.is_finite() && frame_ms > 0.0,
                "--frame-ms must be a positive number"
            );
            if let Some(dir) = &data_dir {
                probe_storage(dir);
            }

            let logical = Vec2::new(config.canvas.width as f32, config.canvas.height as f32);
            if let Some(container) = container {
                let display = fit_to_container(container, logical, config.canvas.scale_mode);
                println!(
                    "display: {}x{} ({:?})",
                    display.width, display.height, config.canvas.scale_mode
                );
            }

            let canvas = RecordingCanvas::new(config.canvas.width, config.canvas.height);
            let interval = Duration::from_secs_f64(frame_ms / 1000.0);
            let opts = RunOptions {
                frames,
                pause_at,
                resume_at,
            };

            if realtime {
                let mut game = new_game(canvas, SystemClock::new(), config, seed)?;
                let mut scheduler = PacedScheduler::new(interval);
                let report = drive(&mut game, &mut scheduler, &opts);
                print_report(&game, &report)?;
            } else {
                let clock = ManualClock::new();
                let mut game = new_game(canvas, clock.clone(), config, seed)?;
                let mut scheduler = SimulatedScheduler::new(clock, interval, frames);
                let report = drive(&mut game, &mut scheduler, &opts);
                print_report(&game, &report)?;
            }
        }
    }

    Ok(())
}

fn new_game<C: Clock>(
    canvas: RecordingCanvas,
    clock: C,
    config: GameConfig,
    seed: u64,
) -> anyhow::Result<Game<C, RecordingCanvas>> {
    Game::with_seed(canvas, clock, config, seed).map_err(|error| {
        tracing::error!(%error, "game failed to load");
        eprintln!("Failed to load the game: {error}");
        error.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sizes() {
        assert_eq!(parse_size("1920x1080"), Ok(Vec2::new(1920.0, 1080.0)));
        assert_eq!(parse_size("800X600"), Ok(Vec2::new(800.0, 600.0)));
        assert!(parse_size("800").is_err());
        assert!(parse_size("ax1").is_err());
    }

    #[test]
    fn storage_probe_leaves_no_marker() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        assert!(probe_storage(&data));
        assert!(data.is_dir());
        assert!(!data.join(".pvz-probe").exists());
    }

    #[test]
    fn storage_probe_fails_softly() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();
        assert!(!probe_storage(&file));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("missing.json"))).is_err());
        assert!(load_config(None).is_ok());
    }

    fn simulated_game() -> (Game<ManualClock, RecordingCanvas>, ManualClock) {
        let clock = ManualClock::new();
        let game = Game::with_seed(
            RecordingCanvas::new(1280, 720),
            clock.clone(),
            GameConfig::default(),
            1,
        )
        .unwrap();
        (game, clock)
    }

    #[test]
    fn drive_runs_requested_frames() {
        let (mut game, clock) = simulated_game();
        let mut scheduler = SimulatedScheduler::new(clock, Duration::from_millis(20), 10);
        let opts = RunOptions {
            frames: 10,
            pause_at: None,
            resume_at: None,
        };
        let report = drive(&mut game, &mut scheduler, &opts);
        assert_eq!(report.frames, 10);
        // 9 waits of 20ms at a 16.67ms step.
        assert_eq!(report.fixed_steps, 10);
        assert!(report.last_frame_commands > 0);
        assert!(!game.state().is_playing);
    }

    #[test]
    fn drive_pauses_between_frames() {
        let (mut game, clock) = simulated_game();
        let mut scheduler = SimulatedScheduler::new(clock, Duration::from_millis(20), 10);
        let opts = RunOptions {
            frames: 10,
            pause_at: Some(2),
            resume_at: Some(8),
        };
        let report = drive(&mut game, &mut scheduler, &opts);
        assert_eq!(report.frames, 10);
        // Only frames 1 and 9 accumulate; resuming re-baselines the clock.
        assert_eq!(report.fixed_steps, 2);
        assert!(!game.state().is_paused);
    }
}
