//! Message slot device daemon.
//!
//! Serves one or more device files, each a Unix socket bound to a minor
//! number, from a single slot registry.
//!
//! # Usage
//!
//! ```bash
//! # Two device files, two independent slots
//! message_slotd --device /tmp/slot0=0 --device /tmp/slot1=1
//!
//! # Same, from the environment, with a smaller channel cap
//! MESSAGE_SLOT_DEVICES=/tmp/slot0=0,/tmp/slot1=1 message_slotd --channel-limit 4096
//!
//! # Enable debug logging
//! RUST_LOG=message_slot=debug message_slotd --device /tmp/slot0=0
//! ```
//!
//! SIGINT/SIGTERM stop the daemon and remove the socket files.

use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use message_slot::Device::{DeviceNode, DeviceServer};
use message_slot::Slot::RegistryBuilder;
use message_slot::MAX_CHANNELS_PER_SLOT;

/// Message slot device daemon
#[derive(Parser, Debug)]
#[command(name = "message_slotd", version, about)]
struct Args {
    /// Device file to serve, as PATH=MINOR (repeatable)
    #[arg(
        long = "device",
        value_name = "PATH=MINOR",
        env = "MESSAGE_SLOT_DEVICES",
        value_delimiter = ',',
        required = true
    )]
    devices: Vec<DeviceNode>,

    /// Maximum number of channels per slot
    #[arg(long, default_value_t = MAX_CHANNELS_PER_SLOT)]
    channel_limit: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("message_slot=info")),
        )
        .init();

    let registry = Arc::new(
        RegistryBuilder::new()
            .with_channel_limit(args.channel_limit)
            .build(),
    );
    info!(
        version = env!("CARGO_PKG_VERSION"),
        pid = process::id(),
        devices = args.devices.len(),
        channel_limit = registry.channel_limit(),
        "message slot daemon starting"
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_for_handler = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        shutdown_for_handler.store(true, Ordering::SeqCst);
    })
    .context("Failed to install signal handler")?;

    let server = DeviceServer::new(registry, args.devices, shutdown);
    server.run().context("Device server failed")?;

    info!("message slot daemon stopped");
    Ok(())
}
