use std::fs::{File, OpenOptions};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use linemon::error::{OpenError, WriteError};
use linemon::{Parity, PortConfig, SerialChannel, StopBits};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Parser, Debug, Clone)]
pub(crate) struct MonitorOptions {
    /// Serial port
    #[clap(short, long)]
    serial: String,

    /// Baud rate
    #[clap(short, long)]
    baudrate: Option<u32>,

    /// Append received lines to this file
    #[clap(short, long)]
    log: Option<PathBuf>,

    /// Data bits
    #[clap(long)]
    data_bits: Option<u8>,

    /// Stop bits
    #[clap(long, value_enum)]
    stop_bits: Option<StopBits>,

    /// Parity
    #[clap(long, value_enum)]
    parity: Option<Parity>,

    /// Leave the DTR control line deasserted on open
    #[clap(long, default_value_t = false)]
    no_dtr: bool,

    /// Keep bytes already buffered by the driver instead of purging them
    #[clap(long, default_value_t = false)]
    no_purge: bool,
}

#[derive(Error, Debug)]
pub(crate) enum CliError {
    #[error("Open error: {0}")]
    Open(#[from] OpenError),

    #[error("Write error: {0}")]
    Write(#[from] WriteError),

    #[error("Log file error: {0}")]
    LogFile(String),

    #[error("Stdin error: {0}")]
    Stdin(String),

    #[error("Port listing error: {0}")]
    Listing(String),
}

/// Open the port, echo every received line to the console (and the log
/// file, if given) and forward stdin lines to the device until EOF.
pub(crate) fn handle_monitor(opts: MonitorOptions) -> Result<(), CliError> {
    let mut config = PortConfig::new(opts.serial);
    if let Some(baud) = opts.baudrate {
        config.baud_rate = baud;
    }
    if let Some(data_bits) = opts.data_bits {
        config.data_bits = data_bits;
    }
    if let Some(stop_bits) = opts.stop_bits {
        config.stop_bits = stop_bits;
    }
    if let Some(parity) = opts.parity {
        config.parity = parity;
    }
    config.assert_dtr = !opts.no_dtr;
    config.purge_rx_on_open = !opts.no_purge;

    let mut channel = SerialChannel::new(line_sink(opts.log)?);
    channel.error_observer(|e| error!("Read loop failed: {e}"));

    channel.open(config)?;
    info!("Port is open");

    // Forward stdin to the device, one line at a time
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.map_err(|e| CliError::Stdin(format!("{:?}", e)))?;
        let mut data = line.into_bytes();
        data.push(b'\n');
        channel.send(&data)?;
    }

    channel.close();
    Ok(())
}

pub(crate) fn handle_list() -> Result<(), CliError> {
    let ports = serialport::available_ports().map_err(|e| CliError::Listing(format!("{:?}", e)))?;

    if ports.is_empty() {
        println!("No serial ports found");
        return Ok(());
    }
    for port in ports {
        match port.port_type {
            serialport::SerialPortType::UsbPort(usb) => {
                println!("{} (USB {:04x}:{:04x})", port.port_name, usb.vid, usb.pid)
            }
            other => println!("{} ({:?})", port.port_name, other),
        }
    }

    Ok(())
}

/// Build the line callback: console echo plus optional log-file append.
/// The callback owns the open file, so its lifetime is independent of
/// the channel internals.
fn line_sink(log: Option<PathBuf>) -> Result<impl Fn(String) + Send + Sync + 'static, CliError> {
    let log_file: Option<Mutex<File>> = match log {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|e| CliError::LogFile(format!("{}: {:?}", path.display(), e)))?;
            Some(Mutex::new(file))
        }
        None => None,
    };

    Ok(move |line: String| {
        println!("{line}");
        if let Some(file) = &log_file {
            if let Ok(mut file) = file.lock() {
                if let Err(e) = writeln!(file, "{line}") {
                    warn!("Failed to append to log file: {e}");
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_sink_appends_lines_to_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");

        let sink = line_sink(Some(path.clone())).unwrap();
        sink("first".to_string());
        sink("second".to_string());

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }

    #[test]
    fn line_sink_appends_across_invocations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");

        line_sink(Some(path.clone())).unwrap()("one".to_string());
        line_sink(Some(path.clone())).unwrap()("two".to_string());

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "one\ntwo\n");
    }

    #[test]
    fn line_sink_without_log_file_only_prints() {
        let sink = line_sink(None).unwrap();
        sink("console only".to_string());
    }
}
