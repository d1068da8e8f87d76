use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

use geofence::config::FileConfig;
use geofence::location::load_track;
use geofence::monitor::MonitorSettings;
use geofence::scenario::{Runner, Scenario, TranscriptEntry, offset};
use geofence::view::{OverlayKind, RecordingView};

/// Replay a geofencing session: draw a boundary, monitor a device, and
/// watch the breach countdown
///
/// Examples:
///   # Replay a scripted walk with the default 30s countdown
///   geofence walk.toml
///
///   # Feed recorded GPS fixes and use a shorter countdown
///   geofence walk.toml --track fixes.json --countdown 10
///
///   # Pace the replay in wall-clock time
///   geofence walk.toml --realtime
///
///   # Machine-readable transcript
///   geofence walk.toml --json
#[derive(Parser, Debug)]
#[command(name = "geofence")]
#[command(version, about, long_about = None)]
struct Args {
    /// Scenario file (TOML) with button presses, map clicks and location samples
    scenario: PathBuf,

    /// Path to config file (optional, auto-searches geofence.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON track of recorded fixes merged into the scenario
    #[arg(short = 't', long)]
    track: Option<PathBuf>,

    /// Minimum number of boundary vertices (at least 3)
    #[arg(long)]
    min_vertices: Option<usize>,

    /// Countdown seconds between a breach and the wipe (0 wipes immediately)
    #[arg(short = 'c', long)]
    countdown: Option<u32>,

    /// Sleep between events instead of replaying instantly
    #[arg(long)]
    realtime: bool,

    /// Print the transcript as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let total_start = Instant::now();

    let (config_path, file_config) = match args.config {
        Some(ref config_path) => (
            Some(config_path.clone()),
            FileConfig::from_path(config_path)?,
        ),
        None => match FileConfig::load()? {
            Some((path, config)) => (Some(path), config),
            None => (None, FileConfig::default()),
        },
    };
    let verbose = args.verbose || file_config.verbose;
    init_tracing(verbose);
    match config_path {
        Some(ref path) => tracing::info!("using config file {:?}", path),
        None => tracing::debug!("no config file found, using defaults"),
    }

    let mut settings = file_config.settings().context("Invalid configuration")?;
    if let Some(min_vertices) = args.min_vertices {
        if min_vertices < 3 {
            bail!("--min-vertices must be at least 3");
        }
        settings.min_vertices = min_vertices;
    }
    if let Some(countdown) = args.countdown {
        settings.countdown_secs = countdown;
    }

    let mut scenario = Scenario::load(&args.scenario)?;
    if let Some(ref track_path) = args.track {
        let track = load_track(track_path).context("Failed to load track")?;
        scenario
            .merge_track(&track)
            .context("Failed to merge track into scenario")?;
    }

    if !args.json {
        println!("geofence - Boundary Monitor Replay");
        println!("==================================");
        println!();
        if verbose {
            print_configuration(&args, &settings, &scenario);
        }
    }

    let end = scenario.end_time(settings.countdown_secs);
    let mut runner = Runner::new(&scenario, settings, RecordingView::new());

    let pb = if args.json {
        ProgressBar::hidden()
    } else {
        create_progress(scenario.steps.len() as u64)
    };

    let realtime = args.realtime;
    let mut pace = move |elapsed: Duration| {
        if realtime {
            std::thread::sleep(elapsed);
        }
    };

    let mut printed = 0;
    for step in &scenario.steps {
        pb.set_message(format!("t = {:.1}s", step.at));
        runner.step(step, &mut pace);
        if !args.json {
            printed = print_new_entries(&pb, runner.transcript(), printed);
        }
        pb.inc(1);
    }

    pb.set_message("waiting for timers...");
    let end_offset = offset(end).unwrap_or(Duration::MAX);
    runner.run_until(end_offset, &mut pace);
    if !args.json {
        print_new_entries(&pb, runner.transcript(), printed);
    }
    pb.finish_with_message(format!("replayed {:.1}s of session time", end));

    let transcript = runner.transcript().to_vec();
    let mut app = runner.into_app();
    app.shutdown();

    if args.json {
        let json = serde_json::to_string_pretty(&transcript)
            .context("Failed to serialize transcript")?;
        println!("{}", json);
        return Ok(());
    }

    let alert_count: usize = transcript.iter().map(|e| e.alerts.len()).sum();
    let view = app.view();

    println!();
    println!("Final state: {}", app.mode());
    println!("Status:      {}", app.state().status);
    println!("Coordinates: {}", app.state().coords);
    if let Some(boundary) = &app.state().boundary {
        println!("Boundary:    {} vertices", boundary.len());
    }
    println!(
        "Overlays:    {} polygon, {} vertex markers, {} lines, {} device marker",
        view.count(OverlayKind::Polygon),
        view.count(OverlayKind::VertexMarker),
        view.count(OverlayKind::Polyline),
        view.count(OverlayKind::Position)
    );
    println!("Alerts:      {}", alert_count);
    println!();
    println!(
        "Done! Total time: {:.1}s",
        total_start.elapsed().as_secs_f32()
    );

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_configuration(args: &Args, settings: &MonitorSettings, scenario: &Scenario) {
    println!("Configuration:");
    println!("  Scenario: {}", args.scenario.display());
    if let Some(ref track) = args.track {
        println!("  Track: {}", track.display());
    }
    println!("  Steps: {}", scenario.steps.len());
    println!(
        "  Geolocation: {}",
        if scenario.geolocation {
            "available"
        } else {
            "unsupported"
        }
    );
    println!("  Minimum vertices: {}", settings.min_vertices);
    println!("  Countdown: {}s", settings.countdown_secs);
    println!(
        "  Map center: ({:.4}, {:.4}) zoom {}",
        settings.center.lat, settings.center.lng, settings.zoom
    );
    println!(
        "  Watch cadence: {}ms idle, {}ms monitoring",
        settings.location.idle_interval_ms, settings.location.monitor_interval_ms
    );
    println!(
        "  Pacing: {}",
        if args.realtime { "real time" } else { "instant" }
    );
    println!();
}

fn print_new_entries(pb: &ProgressBar, transcript: &[TranscriptEntry], printed: usize) -> usize {
    for entry in &transcript[printed..] {
        pb.println(format!(
            "[{:>6.1}s] {:<34} {:<22} {}",
            entry.at,
            entry.event,
            entry.state.to_string(),
            entry.status
        ));
        for alert in &entry.alerts {
            pb.println(format!("          ALERT: {}", alert));
        }
        if let Some(ref error) = entry.error {
            pb.println(format!("          error: {}", error));
        }
    }
    transcript.len()
}

fn create_progress(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
