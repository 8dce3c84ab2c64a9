use std::path::PathBuf;

use aidscan::core::{fill_percent, is_inside, is_large_enough, Rect};
use aidscan::replay::replay_config_file;
use clap::{Parser, Subcommand};
use log::{info, warn, LevelFilter};

#[derive(Parser, Debug)]
#[command(name = "aidscan", version, about = "Barcode scan stabilization tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a recorded frame log and write a JSON report.
    Replay {
        /// Replay config (JSON).
        config: PathBuf,
        /// Report path; overrides `output_path` from the config.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Log level (off, error, warn, info, debug, trace); `RUST_LOG` wins when set.
        #[arg(long, default_value = "info")]
        log_level: LevelFilter,
    },
    /// Check a single box against the scanner box.
    CheckBox {
        /// Scanner box as `left,top,right,bottom`.
        #[arg(long, value_parser = parse_rect, allow_hyphen_values = true)]
        region: Rect,
        /// Detected box as `left,top,right,bottom`.
        #[arg(long = "box", value_parser = parse_rect, allow_hyphen_values = true)]
        bbox: Rect,
    },
}

fn parse_rect(s: &str) -> Result<Rect, String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f32>().map_err(|e| format!("{v:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    match values.as_slice() {
        [l, t, r, b] => Ok(Rect::new(*l, *t, *r, *b)),
        _ => Err(format!(
            "expected 4 comma-separated values, got {}",
            values.len()
        )),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Replay {
            config,
            output,
            log_level,
        } => {
            aidscan::logging::init(log_level)?;
            run_replay(config, output)
        }
        Command::CheckBox { region, bbox } => {
            check_box(&region, &bbox);
            Ok(())
        }
    }
}

#[cfg_attr(feature = "tracing", tracing::instrument(level = "info"))]
fn run_replay(
    config: PathBuf,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (cfg, report) = replay_config_file(&config)?;
    if report.scans.is_empty() {
        warn!("no stable scan in {} frames", report.num_frames);
    }
    for scan in &report.scans {
        println!(
            "frame {}: {}",
            scan.frame,
            scan.payload.as_deref().unwrap_or("<unreadable>")
        );
    }

    let out_path = output.unwrap_or_else(|| cfg.output_path());
    report.write_json(&out_path)?;
    info!("wrote report JSON to {}", out_path.display());
    Ok(())
}

fn check_box(region: &Rect, bbox: &Rect) {
    let (width, height) = fill_percent(region, bbox);
    println!("inside: {}", is_inside(region, bbox));
    println!("large_enough: {}", is_large_enough(region, bbox));
    println!("fill: width {width:.3}% height {height:.3}%");
}
