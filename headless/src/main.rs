use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use snake3d_core::Session;
use web_time::{SystemTime, UNIX_EPOCH};

mod autopilot;
mod runner;
mod settings;
mod store;
mod text;

use runner::{RunOptions, Runner};
use settings::{FileSettings, Overrides};
use store::JsonFileStorage;
use text::TextRenderer;

const INSTRUCTIONS: &str = "\
Steer the snake with up/down/left/right (or w/a/s/d), eat the apples and stay off the walls
and your own tail. Each apple is worth one point, fill the board to win.
";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// TOML file with default settings, flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    rows: Option<u8>,

    #[arg(long)]
    cols: Option<u8>,

    /// Initial snake length
    #[arg(short, long)]
    length: Option<u8>,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Milliseconds between steps
    #[arg(short, long)]
    period_ms: Option<u32>,

    /// Stop after this many steps
    #[arg(short, long, default_value_t = 500)]
    ticks: u64,

    /// Restart after a game ends until this many were played
    #[arg(long, default_value_t = 1)]
    games: u32,

    /// Milliseconds between rendered frames
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Run on the wall clock instead of simulated time
    #[arg(long)]
    realtime: bool,

    /// Let the built-in driver steer
    #[arg(short, long)]
    autopilot: bool,

    /// Comma separated directions, one per step
    #[arg(long, value_delimiter = ',')]
    script: Vec<String>,

    /// Print events as JSON lines instead of drawing the board
    #[arg(long)]
    json: bool,

    /// Where best score and first-run flag are kept
    #[arg(long, default_value = "snake3d-store.json")]
    store: PathBuf,
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos() as u64)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.verbose.tracing_level_filter())
        .with_writer(io::stderr)
        .init();

    let file = match &args.config {
        Some(path) => FileSettings::load(path)?,
        None => FileSettings::default(),
    };
    let overrides = Overrides {
        rows: args.rows,
        cols: args.cols,
        initial_length: args.length,
        seed: args.seed,
        period_ms: args.period_ms,
    };
    let config = settings::resolve(&file, &overrides, clock_seed());
    log::debug!("config: {:?}", config);

    let store = JsonFileStorage::open(&args.store)?;
    log::debug!("store: {}", store.path().display());
    let renderer = TextRenderer::new(config.game.size);
    let mut session = Session::new(config, store, renderer);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if session.should_show_instructions() {
        if !args.json {
            writeln!(out, "{}", INSTRUCTIONS)?;
        }
        session.acknowledge_instructions();
    }

    let options = RunOptions {
        max_steps: args.ticks,
        games: args.games,
        frame: Duration::from_millis(args.frame_ms.max(1)),
        realtime: args.realtime,
        autopilot: args.autopilot,
        script: args.script,
        json: args.json,
    };
    let mut runner = Runner::new(session, options, &mut out);
    let summary = runner.run().context("Game loop failed")?;

    if args.json {
        serde_json::to_writer(&mut out, &summary)?;
        writeln!(out)?;
    } else {
        writeln!(
            out,
            "played {} game(s) in {} steps, last score {}, best score {}",
            summary.games, summary.steps, summary.last_score, summary.best_score
        )?;
    }
    Ok(())
}
