//! Writes one message to a channel of a message slot device.
//!
//! ```bash
//! message_sender /tmp/slot0 7 "hello"
//! ```

use std::ffi::OsString;
use std::os::unix::ffi::OsStrExt;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use message_slot::Device::DeviceClient;

#[derive(Parser, Debug)]
#[command(name = "message_sender", version, about = "Write a message to a message slot channel")]
struct Args {
    /// Path of the device file
    device: std::path::PathBuf,

    /// Channel id (non-zero)
    channel_id: u32,

    /// Message to write, as raw bytes (sent without a trailing NUL)
    message: OsString,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("message_slot=warn")),
        )
        .init();

    let mut device = match DeviceClient::open(&args.device) {
        Ok(device) => device,
        Err(e) => {
            eprintln!("Error opening device file: {}", e.diagnostic());
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = device.select_channel(args.channel_id) {
        eprintln!("Error setting channel id: {}", e.diagnostic());
        return ExitCode::FAILURE;
    }

    if let Err(e) = device.write(args.message.as_bytes()) {
        eprintln!("Error writing message: {}", e.diagnostic());
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
