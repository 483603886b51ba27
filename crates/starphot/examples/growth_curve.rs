use std::{env, io::Write, path::PathBuf};

use starphot::batch::run_batch;
use starphot::cutout::load_cutout;
use starphot::format::write_growth_curve;
use starphot::io::{PhotometryConfig, PhotometryReport};

#[cfg(not(feature = "tracing"))]
use log::{info, warn};

#[cfg(feature = "tracing")]
use tracing::{info, warn};

#[cfg(feature = "tracing")]
use starphot::core::init_tracing;
#[cfg(not(feature = "tracing"))]
use starphot::core::init_from_env;
use starphot::core::LOG_ENV;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(not(feature = "tracing"))]
    init_from_env(LOG_ENV)?;

    #[cfg(feature = "tracing")]
    init_tracing(LOG_ENV, false);

    run()
}

#[cfg_attr(feature = "tracing", tracing::instrument(level = "info"))]
fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = parse_config_path().ok_or("usage: growth_curve <config.json>")?;
    let cfg = PhotometryConfig::load_json(&config_path)?;
    let photometer = cfg.build_photometer()?;
    let anchor = cfg.anchor();
    info!(
        "processing {} files around ({}, {}) with box {}",
        cfg.inputs.len(),
        anchor.xpos,
        anchor.ypos,
        cfg.boxsize
    );

    let report = run_batch(&photometer, &cfg.inputs, |file| {
        load_cutout(file, anchor, cfg.boxsize).map(|grid| vec![grid])
    });

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for entry in &report.entries {
        match entry {
            Ok(sc) => {
                writeln!(out, "{} slice {}", sc.file, sc.slice)?;
                write_growth_curve(&mut out, &sc.curve)?;
            }
            Err(err) => warn!("skipped: {err}"),
        }
    }

    let json = PhotometryReport::new(&config_path, photometer.params(), &report);
    let out_path = cfg.output_path();
    json.write_json(&out_path)?;
    info!("wrote report JSON to {}", out_path.display());
    Ok(())
}

fn parse_config_path() -> Option<PathBuf> {
    env::args().nth(1).map(PathBuf::from)
}
