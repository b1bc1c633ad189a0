//! One-shot transmit handle over libpcap.
//!
//! The capture handle is opened for exactly one write and released by `Drop`
//! on every exit path, so a failure between open and send never leaks it.

use anyhow::{Context as _, Result};
use pcap::{Active, Capture};

const SNAPSHOT_LEN: i32 = 1024;
const TIMEOUT_MS: i32 = 30_000;

pub struct Transmitter {
    capture: Capture<Active>,
}

impl Transmitter {
    /// Opens `device` for injection with the tool's fixed snapshot length,
    /// promiscuous mode off, and a 30 second timeout.
    pub fn open(device: &str) -> Result<Self> {
        let capture = Capture::from_device(device)
            .with_context(|| format!("no such capture device: {device}"))?
            .snaplen(SNAPSHOT_LEN)
            .promisc(false)
            .timeout(TIMEOUT_MS)
            .open()
            .with_context(|| format!("failed to open capture device {device}"))?;
        Ok(Transmitter { capture })
    }

    /// Writes one assembled frame to the device.
    pub fn send(&mut self, frame: &[u8]) -> Result<()> {
        self.capture
            .sendpacket(frame)
            .context("failed to transmit frame")
    }
}
