use anyhow::{bail, Result};
use clap::Parser;
use sr6_packet::build_chain;
use std::path::PathBuf;

mod config;
mod transmit;

use config::Config;
use transmit::Transmitter;

/// Crafts a single SRv6 probe frame (optionally carrying an APN6 option
/// header) from a JSON description and transmits it once.
#[derive(Parser, Debug)]
#[command(arg_required_else_help = true)]
struct Args {
    /// path to the JSON probe description
    config: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = Config::load(&args.config)?;
    let spec = config.to_spec()?;
    let frame = build_chain(&spec)?.serialize()?;
    log::info!(
        "assembled {} byte frame ({} segments, APN6 {})",
        frame.len(),
        spec.segments.len(),
        if spec.apn_id.is_some() { "on" } else { "off" },
    );

    if !caps::has_cap(None, caps::CapSet::Effective, caps::Capability::CAP_NET_RAW)? {
        bail!("CAP_NET_RAW is required to transmit on {}", config.device);
    }

    let mut tx = Transmitter::open(&config.device)?;
    tx.send(&frame)?;
    log::info!("probe sent on {}", config.device);
    Ok(())
}
