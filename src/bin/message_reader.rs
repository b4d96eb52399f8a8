//! Reads the current message of a message slot channel to stdout.
//!
//! ```bash
//! message_reader /tmp/slot0 7
//! ```

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use message_slot::Device::DeviceClient;
use message_slot::MAX_MESSAGE_LEN;

#[derive(Parser, Debug)]
#[command(name = "message_reader", version, about = "Print the message stored in a message slot channel")]
struct Args {
    /// Path of the device file
    device: std::path::PathBuf,

    /// Channel id (non-zero)
    channel_id: u32,
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

    let message = match device.read(MAX_MESSAGE_LEN) {
        Ok(message) => message,
        Err(e) => {
            eprintln!("Error reading message: {}", e.diagnostic());
            return ExitCode::FAILURE;
        }
    };
    drop(device);

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = stdout.write_all(&message).and_then(|()| stdout.flush()) {
        eprintln!("Error writing message to stdout: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
