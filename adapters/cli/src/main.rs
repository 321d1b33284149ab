#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives the wealth overlay over a simulated map.

mod config;
mod host;
mod session;
mod sink;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use wealth_overlay_core::{MapSize, Zoom};
use wealth_overlay_map::query;
use wealth_overlay_system_zoom::ZoomAction;

use crate::{config::OverlayConfig, host::HostMap, session::Session, sink::FrameReport};

/// Command-line arguments for the wealth overlay driver.
#[derive(Debug, Parser)]
#[command(
    name = "wealth-overlay",
    about = "Accumulates map wealth into a zoomable grid and reports the overlay geometry."
)]
struct Args {
    /// TOML file with overlay appearance and persisted zoom.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Map width in cells.
    #[arg(long, default_value_t = 250)]
    width: u32,
    /// Map height in cells.
    #[arg(long, default_value_t = 250)]
    height: u32,
    /// Initial zoom, overriding the configuration file.
    #[arg(long, value_parser = parse_zoom)]
    zoom: Option<Zoom>,
    /// Number of frames to draw.
    #[arg(long, default_value_t = 3)]
    frames: u32,
    /// Steps to zoom towards native resolution after the first frame.
    #[arg(long, default_value_t = 0)]
    zoom_in: u32,
    /// Steps to zoom towards coarser buckets after the first frame.
    #[arg(long, default_value_t = 0)]
    zoom_out: u32,
    /// Seed for the simulated map contents.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Number of stored items on the map.
    #[arg(long, default_value_t = 2_000)]
    items: usize,
    /// Number of pawns on the map.
    #[arg(long, default_value_t = 12)]
    pawns: usize,
    /// Writes the final overlay settings to this TOML file.
    #[arg(long, value_name = "PATH")]
    save_settings: Option<PathBuf>,
}

fn parse_zoom(value: &str) -> Result<Zoom, String> {
    let scale: u32 = value
        .parse()
        .map_err(|error| format!("invalid zoom `{value}`: {error}"))?;
    Zoom::new(scale).map_err(|error| error.to_string())
}

/// Entry point for the wealth overlay command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => OverlayConfig::from_path(path)?,
        None => OverlayConfig::default(),
    };
    if let Some(zoom) = args.zoom {
        config.zoom = zoom;
    }

    let size = MapSize::new(args.width, args.height);
    let host = HostMap::generate(size, args.seed, args.items, args.pawns);
    let mut session = Session::new(host, &config)?;

    let zoom_actions: Vec<ZoomAction> = std::iter::repeat(ZoomAction::Finer)
        .take(args.zoom_in as usize)
        .chain(std::iter::repeat(ZoomAction::Coarser).take(args.zoom_out as usize))
        .collect();
    let zoom_frame = if args.frames > 1 { 1 } else { 0 };

    for frame in 0..args.frames {
        let actions: &[ZoomAction] = if frame == zoom_frame {
            zoom_actions.as_slice()
        } else {
            &[]
        };
        let report = session
            .frame(actions)
            .with_context(|| format!("frame {frame} failed"))?;
        print_frame(frame, query::zoom(session.overlay()), &report);
    }

    println!(
        "host wealth {:.1}, overlay wealth {:.1}, {} material(s) created",
        session.host_total(),
        query::total_wealth(session.overlay()),
        session.materials_created()
    );

    if let Some(path) = &args.save_settings {
        config::save_settings(path, query::settings(session.overlay()))?;
    }
    Ok(())
}

fn print_frame(frame: u32, zoom: Zoom, report: &FrameReport) {
    let Some(material) = report.material else {
        println!("frame {frame}: zoom {}, nothing drawn", zoom.get());
        return;
    };
    let color = material.color;
    println!(
        "frame {frame}: zoom {}, {} batch(es), {} quad(s), material #{} rgba({:.3}, {:.3}, {:.3}, {:.3}) vertex colors {}, queue {}, bounds {:?}..{:?}",
        zoom.get(),
        report.batches,
        report.quads,
        material.id,
        color.red,
        color.green,
        color.blue,
        color.alpha,
        if material.vertex_colors { "on" } else { "off" },
        report.render_queue.unwrap_or_default(),
        report.min,
        report.max,
    );
}
