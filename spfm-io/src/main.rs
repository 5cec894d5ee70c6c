//! spfm-io - bring an SPFM light to a known silent state
//!
//! Opens the serial link, runs the check/reset handshake, silences the OPNA
//! module, and restores the port settings on exit.
//!
//! Usage:
//!   spfm-io [--config <path>] [--device <path>]

use spfm_io::config::Config;
use spfm_io::error::{Error, Result};
use spfm_io::{CancelToken, SerialSession, SpfmLight};
use std::env;

/// Command line options
#[derive(Debug, Default)]
struct CliArgs {
    config_path: Option<String>,
    device: Option<String>,
}

/// Parse command line arguments.
///
/// Supports:
/// - `spfm-io --config <path>` / `-c <path>`
/// - `spfm-io --device <path>` / `-d <path>` (overrides `device.path`)
/// - `spfm-io <path>` (positional config path)
fn parse_args() -> Result<CliArgs> {
    let mut parsed = CliArgs::default();
    let mut args = env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => parsed.config_path = args.next(),
            "--device" | "-d" => parsed.device = args.next(),
            other if !other.starts_with('-') && parsed.config_path.is_none() => {
                parsed.config_path = Some(other.to_string());
            }
            other => {
                return Err(Error::InvalidParameter(format!(
                    "unrecognized argument: {}",
                    other
                )));
            }
        }
    }

    Ok(parsed)
}

fn main() -> Result<()> {
    let args = parse_args()?;

    let config = match &args.config_path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    // Initialize logger (RUST_LOG wins over the config level)
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    log::info!("spfm-io v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &args.config_path {
        log::info!("Using config: {}", path);
    }

    let device = args.device.unwrap_or_else(|| config.device.path.clone());

    // Ctrl-C ends any wait on the device instead of killing the process,
    // so the port settings are still restored
    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        handler_token.cancel();
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let session = SerialSession::open(&device)?;
    let mut spfm = SpfmLight::new(session)
        .with_policy(config.timing.wait_policy())
        .with_cancel(cancel);

    let outcome = spfm
        .handshake()
        .and_then(|()| spfm.chip_reset(config.chips.opna_slot));

    // Restore the tty whatever happened above
    let closed = spfm.into_transport().close();

    outcome?;
    closed?;

    log::info!("SPFM light ready");
    Ok(())
}
