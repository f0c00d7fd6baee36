//! # Starfall Headless Simulator
//!
//! Runs the feedback view against a simulated host and reports what it did.
//!
//! ## Usage
//!
//! ```bash
//! starfall_sim --frames 600 --width 1280 --height 720 --seed 7 \
//!              --reveal-at 2000 --snapshot frame.ppm
//! ```
//!
//! Exits non-zero on a configuration error, a failed snapshot, or any host
//! registration left behind after dismissal.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use starfall::{init_tracing, FeedbackView};
use starfall_core::{
    NavigationState, Navigator, RasterSurface, RecordingNavigator, SimulatedHost, StarfallConfig,
    StarfallError, StarfallResult, Surface, Viewport,
};
use starfall_reveal::RevealEvent;

/// Parsed command line.
#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    frames: u64,
    width: Option<u32>,
    height: Option<u32>,
    seed: Option<u64>,
    reveal_at_ms: Option<u64>,
    snapshot: Option<PathBuf>,
    help: bool,
}

fn parse_args(raw: &[String]) -> StarfallResult<Args> {
    fn value<'a>(raw: &'a [String], i: usize, flag: &str) -> StarfallResult<&'a str> {
        raw.get(i + 1)
            .map(String::as_str)
            .ok_or_else(|| StarfallError::InvalidConfig(format!("{flag} needs a value")))
    }
    fn number<T: std::str::FromStr>(text: &str, flag: &str) -> StarfallResult<T> {
        text.parse()
            .map_err(|_| StarfallError::InvalidConfig(format!("{flag}: '{text}' is not a number")))
    }

    let mut args = Args {
        frames: 600,
        ..Args::default()
    };
    let mut i = 1;
    while i < raw.len() {
        let flag = raw[i].as_str();
        match flag {
            "--config" | "-c" => args.config = Some(PathBuf::from(value(raw, i, flag)?)),
            "--frames" | "-f" => args.frames = number(value(raw, i, flag)?, flag)?,
            "--width" | "-w" => args.width = Some(number(value(raw, i, flag)?, flag)?),
            "--height" | "-H" => args.height = Some(number(value(raw, i, flag)?, flag)?),
            "--seed" | "-s" => args.seed = Some(number(value(raw, i, flag)?, flag)?),
            "--reveal-at" | "-r" => args.reveal_at_ms = Some(number(value(raw, i, flag)?, flag)?),
            "--snapshot" | "-o" => args.snapshot = Some(PathBuf::from(value(raw, i, flag)?)),
            "--help" | "-h" => {
                args.help = true;
                i += 1;
                continue;
            }
            other => {
                return Err(StarfallError::InvalidConfig(format!(
                    "unknown argument '{other}'"
                )))
            }
        }
        i += 2;
    }
    Ok(args)
}

fn print_help() {
    println!("Usage: starfall_sim [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config <PATH>        TOML configuration file");
    println!("  -f, --frames <N>           Frames to simulate (default: 600)");
    println!("  -w, --width <PX>           Viewport width (overrides config)");
    println!("  -H, --height <PX>          Viewport height (overrides config)");
    println!("  -s, --seed <SEED>          RNG seed (overrides config)");
    println!("  -r, --reveal-at <MS>       Start the reveal after MS of host time");
    println!("  -o, --snapshot <PATH>      Write the final frame as a PPM image");
    println!("  -h, --help                 Show this help");
}

fn build_config(args: &Args) -> StarfallResult<StarfallConfig> {
    let mut config = match &args.config {
        Some(path) => StarfallConfig::load(path)?,
        None => StarfallConfig::default(),
    };
    if let Some(width) = args.width {
        config.host.viewport.width = width;
    }
    if let Some(height) = args.height {
        config.host.viewport.height = height;
    }
    if args.seed.is_some() {
        config.field.seed = args.seed;
    }
    config.validate()?;
    Ok(config)
}

/// What the run produced.
struct Summary {
    frames: u64,
    recycled: u64,
    highlights: u64,
    revealed: usize,
    navigated_at: Option<Duration>,
    lit_pixels: usize,
}

/// Runs the host for `duration`, returning the navigation time if the
/// reveal finished inside the window.
fn pump<S: Surface, N: Navigator>(
    host: &mut SimulatedHost,
    view: &mut FeedbackView<S, N>,
    duration: Duration,
) -> Option<Duration> {
    let mut navigated_at = None;
    host.run_for(duration, |host, event| {
        if let Some(RevealEvent::Navigated { at }) = view.dispatch(host, &event) {
            navigated_at = Some(at);
        }
    });
    navigated_at
}

fn run(args: &Args, config: &StarfallConfig) -> StarfallResult<Summary> {
    let viewport: Viewport = config.host.viewport;
    let mut host = SimulatedHost::new(viewport, config.host.frame_period());
    let mut view = FeedbackView::new(
        config,
        RasterSurface::new(viewport.width, viewport.height),
        RecordingNavigator::new(),
    )?;

    let total = config.host.frame_period() * u32::try_from(args.frames).unwrap_or(u32::MAX);

    view.mount(&mut host);
    let navigated_at = match args.reveal_at_ms.map(Duration::from_millis) {
        Some(at) if at < total => {
            let early = pump(&mut host, &mut view, at);
            let state = NavigationState::new().with("imageUrl", "/snapshots/result.ppm");
            view.analysis_complete(&mut host, Some(state))?;
            let late = pump(&mut host, &mut view, total - at);
            early.or(late)
        }
        _ => pump(&mut host, &mut view, total),
    };

    if let Some(path) = &args.snapshot {
        view.renderer().surface().write_ppm(path)?;
    }

    let field = view.renderer().field().stats();
    let summary = Summary {
        frames: field.frames,
        recycled: field.recycled,
        highlights: field.highlights_spawned,
        revealed: view.reveal().revealed().len(),
        navigated_at,
        lit_pixels: view.renderer().surface().lit_pixels(),
    };

    view.dismiss(&mut host);
    host.assert_quiescent()?;
    Ok(summary)
}

fn main() -> ExitCode {
    init_tracing("info");

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         STARFALL HEADLESS SIMULATOR                              ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    let raw: Vec<String> = std::env::args().collect();
    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {e}");
            print_help();
            return ExitCode::from(2);
        }
    };
    if args.help {
        print_help();
        return ExitCode::SUCCESS;
    }

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };

    println!("┌─ CONFIGURATION ─────────────────────────────────────────────────┐");
    println!(
        "│ Viewport:           {}x{}",
        config.host.viewport.width, config.host.viewport.height
    );
    println!("│ Frame Period:       {} ms", config.host.frame_period_ms);
    println!("│ Frames:             {}", args.frames);
    println!("│ Streaks:            {}", config.field.population);
    match config.field.seed {
        Some(seed) => println!("│ Seed:               {seed}"),
        None => println!("│ Seed:               entropy"),
    }
    match args.reveal_at_ms {
        Some(ms) => println!("│ Reveal At:          {ms} ms"),
        None => println!("│ Reveal At:          never"),
    }
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();

    let summary = match run(&args, &config) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║                    SIMULATION COMPLETE                           ║");
    println!("╠══════════════════════════════════════════════════════════════════╣");
    println!("║ Frames:             {:>10}", summary.frames);
    println!("║ Streaks Recycled:   {:>10}", summary.recycled);
    println!("║ Highlights:         {:>10}", summary.highlights);
    println!("║ Slots Revealed:     {:>10}", summary.revealed);
    match summary.navigated_at {
        Some(at) => println!("║ Navigated At:       {:>10} ms", at.as_millis()),
        None => println!("║ Navigated At:       {:>10}", "-"),
    }
    println!("║ Lit Pixels:         {:>10}", summary.lit_pixels);
    println!("╚══════════════════════════════════════════════════════════════════╝");

    ExitCode::SUCCESS
}
