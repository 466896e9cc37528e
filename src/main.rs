use std::fs::File;
use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use led_arcade::clock::{elapsed_since, Clock, SystemClock};
use led_arcade::config::{
    Settings, Tuning, DEFAULT_LOG_FILE, DEFAULT_RENDER_FPS, DEFAULT_TICK_MS,
};
use led_arcade::display::{FrameBuffer, RenderCommands};
use led_arcade::game::{PacManGame, Phase};
use led_arcade::input::{Command, InputSource};
use led_arcade::smoke::{RainbowSmoke, SmokeState};
use led_arcade::PANEL_SIZE;

mod terminal;

use terminal::{KeyInput, Renderer, TerminalGuard};

/// LED panel games and patterns, played in the terminal
#[derive(Parser)]
#[command(name = "led-arcade", version)]
#[command(about = "LED panel games and patterns, played in the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    pattern: Pattern,

    /// Milliseconds between core steps
    #[arg(long, global = true, env = "ARCADE_TICK_MS", default_value_t = DEFAULT_TICK_MS)]
    tick_ms: u64,

    /// Terminal redraws per second
    #[arg(long, global = true, env = "ARCADE_FPS", default_value_t = DEFAULT_RENDER_FPS)]
    fps: u64,

    /// Seed for the random source; entropy when omitted
    #[arg(long, global = true, env = "ARCADE_SEED")]
    seed: Option<u64>,

    /// Log file (the terminal is busy drawing)
    #[arg(long, global = true, env = "ARCADE_LOG_FILE", default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,
}

#[derive(Subcommand, Clone, Copy, Debug)]
enum Pattern {
    /// Chase around the maze
    Pacman,
    /// Greedy rainbow color placement
    Smoke,
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings {
            tick_ms: self.tick_ms,
            render_fps: self.fps,
            seed: self.seed,
            log_file: self.log_file.clone(),
            tuning: Tuning::default(),
        }
    }
}

fn init_logging(path: &Path) -> Result<()> {
    let log_file =
        File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = cli.settings();
    if settings.log_file.as_os_str().is_empty() {
        anyhow::bail!("log file path is empty");
    }
    init_logging(&settings.log_file)?;

    if let Err(err) = settings.validate() {
        warn!(%err, "rejected configuration");
        return Err(err.into());
    }

    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    info!(pattern = ?cli.pattern, seed = ?settings.seed, tick_ms = settings.tick_ms, "starting");

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        terminal::restore();
        original_hook(panic_info);
    }));

    let _guard = TerminalGuard::enter().context("entering raw terminal mode")?;
    let mut host = Host::new(&settings);
    let result = match cli.pattern {
        Pattern::Pacman => host.run_pacman(&settings, &mut rng),
        Pattern::Smoke => host.run_smoke(&settings, &mut rng),
    };
    info!(ok = result.is_ok(), "leaving");
    result
}

/// The LED panel, its clock and the remote, all in one terminal.
struct Host {
    out: Stdout,
    clock: SystemClock,
    input: KeyInput,
    frame: FrameBuffer,
    renderer: Renderer,
    tick: Duration,
    frame_time: Duration,
    last_render: Option<Instant>,
    dirty: bool,
}

impl Host {
    fn new(settings: &Settings) -> Self {
        Self {
            out: io::stdout(),
            clock: SystemClock::new(),
            input: KeyInput::new(),
            frame: FrameBuffer::new(PANEL_SIZE, PANEL_SIZE),
            renderer: Renderer::new(PANEL_SIZE, PANEL_SIZE),
            tick: Duration::from_millis(settings.tick_ms),
            frame_time: Duration::from_micros(1_000_000 / settings.render_fps.max(1)),
            last_render: None,
            dirty: false,
        }
    }

    /// Replays `commands` onto the frame buffer. Presented frames reach the
    /// terminal at most `fps` times a second; a throttled one is drawn on a
    /// later tick.
    fn show(&mut self, commands: &RenderCommands, status: &str) -> led_arcade::error::Result<()> {
        commands.apply(&mut self.frame);
        self.dirty |= commands.present_count() > 0;
        let due = self
            .last_render
            .map_or(true, |at| at.elapsed() >= self.frame_time);
        if self.dirty && due {
            self.dirty = false;
            self.renderer.render(&mut self.out, &self.frame, status)?;
            self.last_render = Some(Instant::now());
        }
        Ok(())
    }

    fn pace(&self, tick_start: Instant) {
        let spent = tick_start.elapsed();
        if spent < self.tick {
            thread::sleep(self.tick - spent);
        }
    }

    fn run_pacman(&mut self, settings: &Settings, rng: &mut StdRng) -> Result<()> {
        let mut game = PacManGame::standard(settings.tuning.clone());
        let mut last = self.clock.now_ms();
        loop {
            let tick_start = Instant::now();
            let now = self.clock.now_ms();
            let elapsed = elapsed_since(now, last);
            last = now;

            let command = self.input.poll_command();
            let output = game.step(elapsed, command, rng);
            self.show(&output.commands, &pacman_status(&game))?;
            if output.exit {
                info!(levels_cleared = game.levels_cleared(), "game left");
                return Ok(());
            }
            self.pace(tick_start);
        }
    }

    fn run_smoke(&mut self, settings: &Settings, rng: &mut StdRng) -> Result<()> {
        let mut smoke = RainbowSmoke::new(PANEL_SIZE, PANEL_SIZE, &settings.tuning, rng);
        let mut last = self.clock.now_ms();
        loop {
            let tick_start = Instant::now();
            let now = self.clock.now_ms();
            let elapsed = elapsed_since(now, last);
            last = now;

            let input = &mut self.input;
            let mut should_stop = || matches!(input.poll_command(), Some(Command::Home));
            let step = smoke.step(elapsed, rng, &mut should_stop);
            self.show(&step.commands, &smoke_status(&smoke))?;
            if step.stopped {
                info!(placed = smoke.canvas().colored_count(), "smoke stopped");
                return Ok(());
            }
            self.pace(tick_start);
        }
    }
}

fn pacman_status(game: &PacManGame) -> String {
    let state = match game.phase() {
        Phase::Dying { .. } => "caught!",
        Phase::Cleared { .. } => "cleared!",
        Phase::Playing if game.is_paused() => "paused",
        Phase::Playing => "",
    };
    let lives = "♥".repeat(game.player().lives as usize);
    format!(
        "{lives:<3} Lvl {}  Pellets {}  {:?}  {state}",
        game.levels_cleared(),
        game.pellets_left(),
        game.mode(),
    )
}

fn smoke_status(smoke: &RainbowSmoke) -> String {
    let state = match smoke.state() {
        SmokeState::Placing { next } => format!("placing {next}"),
        SmokeState::Resting { .. } => "resting".to_string(),
    };
    let palette = smoke
        .order()
        .map_or_else(|| "custom".to_string(), |order| format!("{order:?}"));
    format!("{palette} / {:?}  {state}", smoke.strategy())
}
