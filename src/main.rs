//! Heart-rate zone monitor CLI
//!
//! Replays recorded heart-rate frames and reports zone occupancy.

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use hr_zone_monitor::{
    config::Config,
    core::{export::export_file_name, FrameFlags, ZoneBoundaries, ZoneOccupancy},
    monitor::ZoneMonitor,
    session::{create_shared_log_with_persistence, log::PersistedCounters},
    source::{parse_hex_frame, ReplaySource, SourceConfig},
    VERSION,
};
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hr-zones")]
#[command(version = VERSION)]
#[command(about = "Heart-rate frame decoder and zone occupancy monitor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay hex-encoded frames and track zone occupancy
    Run {
        /// Input file with one hex frame per line ("-" for stdin)
        #[arg(long, short, default_value = "-")]
        input: String,

        /// Maximum number of samples kept in the history
        #[arg(long)]
        capacity: Option<usize>,

        /// Lower boundary of the low zone (bpm)
        #[arg(long)]
        low: Option<i32>,

        /// Lower boundary of the mid zone (bpm)
        #[arg(long)]
        mid: Option<i32>,

        /// Lower boundary of the high zone (bpm)
        #[arg(long)]
        high: Option<i32>,

        /// Delay between replayed frames in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Skip writing the session export
        #[arg(long)]
        no_export: bool,
    },

    /// Decode a single hex-encoded frame
    Decode {
        /// Frame bytes, e.g. "10 48 00 04"
        frame: String,
    },

    /// Validate and save zone boundaries
    Zones {
        #[arg(long)]
        low: i32,
        #[arg(long)]
        mid: i32,
        #[arg(long)]
        high: i32,
    },

    /// Show cumulative session counters
    Status,

    /// Show configuration
    Config,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            input,
            capacity,
            low,
            mid,
            high,
            interval_ms,
            no_export,
        } => cmd_run(RunArgs {
            input,
            capacity,
            low,
            mid,
            high,
            interval_ms,
            no_export,
        }),
        Commands::Decode { frame } => cmd_decode(&frame),
        Commands::Zones { low, mid, high } => cmd_zones(low, mid, high),
        Commands::Status => cmd_status(),
        Commands::Config => cmd_config(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

struct RunArgs {
    input: String,
    capacity: Option<usize>,
    low: Option<i32>,
    mid: Option<i32>,
    high: Option<i32>,
    interval_ms: Option<u64>,
    no_export: bool,
}

fn load_config() -> Config {
    Config::load().unwrap_or_else(|e| {
        tracing::warn!("Could not load config, using defaults: {}", e);
        Config::default()
    })
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let config = load_config();
    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create directories: {e}");
    }

    let capacity = args.capacity.unwrap_or(config.history_capacity);
    let zones = ZoneBoundaries::new(
        args.low.unwrap_or(config.zones.low),
        args.mid.unwrap_or(config.zones.mid),
        args.high.unwrap_or(config.zones.high),
    );
    let frame_interval = args
        .interval_ms
        .map(Duration::from_millis)
        .unwrap_or(config.frame_interval);

    println!("Heart-Rate Zone Monitor v{VERSION}");
    println!();
    println!("  History capacity: {capacity}");
    match zones.validate() {
        Ok(_) => println!(
            "  Zones: low {} / mid {} / high {} bpm",
            zones.low, zones.mid, zones.high
        ),
        Err(e) => println!("  Zones: invalid ({e}), occupancy disabled"),
    }
    println!();

    let session_log = create_shared_log_with_persistence(config.session_log_path());
    let monitor = ZoneMonitor::new(capacity, zones, Arc::clone(&session_log));

    let reader: Box<dyn BufRead + Send> = if args.input == "-" {
        Box::new(std::io::BufReader::new(std::io::stdin()))
    } else {
        let file = std::fs::File::open(&args.input)
            .with_context(|| format!("Could not open {}", args.input))?;
        Box::new(std::io::BufReader::new(file))
    };

    let mut source = ReplaySource::new(SourceConfig {
        frame_interval,
        ..SourceConfig::default()
    });
    source.start(reader)?;
    tracing::info!(session_id = %session_log.session_id(), "Replay started");

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Error setting Ctrl+C handler")?;

    let receiver = source.receiver().clone();
    let mut decoded: usize = 0;

    while running.load(Ordering::SeqCst) {
        match receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                let Ok(recorded) = monitor.ingest(&event.bytes, event.received_at) else {
                    continue;
                };
                decoded += 1;

                let zone = recorded
                    .zone
                    .map(|z| format!(" [{z}]"))
                    .unwrap_or_default();
                println!(
                    "[{}] {} bpm{} ({} RR)",
                    event.received_at.format("%H:%M:%S%.3f"),
                    recorded.rate,
                    zone,
                    recorded.interval_count
                );

                if config.report_every > 0 && decoded % config.report_every == 0 {
                    print_occupancy(monitor.occupancy());
                }
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
        }
    }

    println!();
    println!("Stopping replay...");
    source.stop();

    if !args.no_export && !monitor.history().is_empty() {
        let export_path = config
            .export_path
            .join(export_file_name(session_log.session_id(), Utc::now()));
        match monitor.export(&export_path, config.export_timezone()) {
            Ok(rows) => println!("Exported {rows} samples to {export_path:?}"),
            Err(e) => eprintln!("Error writing export: {e}"),
        }
    }

    if let Err(e) = session_log.save() {
        eprintln!("Warning: Could not save session counters: {e}");
    }

    let summary = monitor.summary();
    println!();
    println!("Summary:");
    println!("  Samples: {}", summary.sample_count);
    println!("  Duration: {:.1}s", summary.duration_secs);
    if let (Some(min), Some(max), Some(mean)) =
        (summary.min_rate, summary.max_rate, summary.mean_rate)
    {
        println!("  Rate: min {min} / mean {mean:.1} / max {max} bpm");
    }
    if let Some(rmssd) = summary.rmssd_ms {
        println!("  RMSSD: {rmssd:.2} ms over {} RR intervals", summary.interval_count);
    }
    print_occupancy(monitor.occupancy());

    println!();
    println!("{}", session_log.summary());
    Ok(())
}

fn print_occupancy(occupancy: Option<ZoneOccupancy>) {
    match occupancy {
        None => println!("Zones: invalid boundaries, occupancy unavailable"),
        Some(o) if o.is_empty() => println!("Zones: no data yet"),
        Some(o) => println!(
            "Zones: low {:.1}% | mid {:.1}% | high {:.1}% (over {:.0}s)",
            o.low_percent, o.mid_percent, o.high_percent, o.classified_secs
        ),
    }
}

fn cmd_decode(frame: &str) -> anyhow::Result<()> {
    // A line with no digits decodes as an empty frame and reports TooShort
    let bytes = parse_hex_frame(frame)
        .context("Invalid hex frame")?
        .unwrap_or_default();
    let sample = hr_zone_monitor::decode(&bytes)?;
    let flag_byte = *bytes.first().context("Empty frame")?;

    let flags = FrameFlags::from_byte(flag_byte);
    println!("Flags: 0x{flag_byte:02X}");
    println!("  16-bit rate: {}", flags.rate_is_u16);
    println!(
        "  Sensor contact: {}",
        match (flags.contact_supported, flags.contact_detected) {
            (false, _) => "not supported",
            (true, true) => "detected",
            (true, false) => "not detected",
        }
    );
    println!("  RR flag: {}", flags.rr_present);

    println!("Rate: {} bpm", sample.rate);
    if sample.intervals.is_empty() {
        println!("RR intervals: none");
    } else {
        let intervals: Vec<String> = sample
            .intervals
            .iter()
            .map(|ms| format!("{ms:.2}"))
            .collect();
        println!("RR intervals (ms): {}", intervals.join(", "));
    }
    Ok(())
}

fn cmd_zones(low: i32, mid: i32, high: i32) -> anyhow::Result<()> {
    let zones = ZoneBoundaries::new(low, mid, high);
    zones.validate()?;

    let mut config = load_config();
    config.zones = zones;
    config.save()?;
    println!("Zones saved: low {low} / mid {mid} / high {high} bpm");
    Ok(())
}

fn cmd_status() -> anyhow::Result<()> {
    let config = load_config();

    println!("Heart-Rate Zone Monitor Status");
    println!("==============================");
    println!();
    println!("Configuration:");
    println!("  History capacity: {}", config.history_capacity);
    match config.zones.validate() {
        Ok(_) => println!(
            "  Zones: low {} / mid {} / high {} bpm",
            config.zones.low, config.zones.mid, config.zones.high
        ),
        Err(e) => println!("  Zones: invalid ({e})"),
    }
    println!("  Export path: {:?}", config.export_path);
    println!();

    let stats_path = config.session_log_path();
    if stats_path.exists() {
        let content = std::fs::read_to_string(&stats_path)?;
        let counters: PersistedCounters = serde_json::from_str(&content)?;
        println!("Cumulative Statistics:");
        println!("  Frames received: {}", counters.frames_received);
        println!("  Frames decoded: {}", counters.frames_decoded);
        println!("  Frames dropped: {}", counters.frames_dropped);
        println!("  Samples evicted: {}", counters.samples_evicted);
        println!("  Rows exported: {}", counters.rows_exported);
        println!("  Last updated: {}", counters.last_updated.to_rfc3339());
    } else {
        println!("No previous session data found.");
    }
    Ok(())
}

fn cmd_config() -> anyhow::Result<()> {
    let config = load_config();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
