use clap::ValueEnum;

use crate::constants::{DEFAULT_BAUD_RATE, DEFAULT_DATA_BITS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StopBits {
    One,

    /// Accepted here but rejected at open time; the serialport backend
    /// has no 1.5-stop-bit mode
    OnePointFive,

    Two,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Parity {
    None,
    Odd,
    Even,
}

/// Line parameters for opening a serial port. Plain data; nothing is
/// validated until the config is handed to `SerialChannel::open`.
#[derive(Debug, Clone)]
pub struct PortConfig {
    /// Device path, e.g. "/dev/ttyUSB0" or "COM12"
    pub path: String,
    pub baud_rate: u32,
    pub data_bits: u8,
    pub stop_bits: StopBits,
    pub parity: Parity,
    /// Assert the DTR control line after opening
    pub assert_dtr: bool,
    /// Discard bytes already buffered by the OS driver before the read
    /// loop starts
    pub purge_rx_on_open: bool,
}

impl PortConfig {
    /// Config for `path` with the classic 9600-8N1 defaults, DTR asserted
    /// and the receive buffer purged on open.
    pub fn new(path: impl Into<String>) -> PortConfig {
        PortConfig {
            path: path.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: DEFAULT_DATA_BITS,
            stop_bits: StopBits::One,
            parity: Parity::None,
            assert_dtr: true,
            purge_rx_on_open: true,
        }
    }
}
