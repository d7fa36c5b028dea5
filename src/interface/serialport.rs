use tracing::info;

use super::SerialDevice;
use crate::config::{Parity, PortConfig, StopBits};
use crate::constants::SERIAL_TIMEOUT_MS;
use crate::error::OpenError;
use std::io::{self, Read, Write};

/// Serial port device layer over the `serialport` crate
pub(crate) struct SerialPortDevice {
    pub serial_port: Box<dyn serialport::SerialPort>,
}

impl SerialPortDevice {
    /// Open and configure the device described by `config`.
    ///
    /// The short hardware read timeout is what keeps the channel's read
    /// loop responsive to its stop flag; it is not visible to callers.
    pub fn open(config: &PortConfig) -> Result<SerialPortDevice, OpenError> {
        if config.baud_rate == 0 {
            return Err(OpenError::InvalidConfig(
                "baud rate must be positive".to_string(),
            ));
        }

        let data_bits = match config.data_bits {
            5 => serialport::DataBits::Five,
            6 => serialport::DataBits::Six,
            7 => serialport::DataBits::Seven,
            8 => serialport::DataBits::Eight,
            other => {
                return Err(OpenError::InvalidConfig(format!(
                    "unsupported data bits: {}",
                    other
                )));
            }
        };

        let stop_bits = match config.stop_bits {
            StopBits::One => serialport::StopBits::One,
            StopBits::Two => serialport::StopBits::Two,
            StopBits::OnePointFive => {
                return Err(OpenError::InvalidConfig(
                    "1.5 stop bits are not supported by the serialport backend".to_string(),
                ));
            }
        };

        let parity = match config.parity {
            Parity::None => serialport::Parity::None,
            Parity::Odd => serialport::Parity::Odd,
            Parity::Even => serialport::Parity::Even,
        };

        let serial_port = serialport::new(&config.path, config.baud_rate)
            .data_bits(data_bits)
            .stop_bits(stop_bits)
            .parity(parity)
            .timeout(std::time::Duration::from_millis(SERIAL_TIMEOUT_MS))
            .open()
            .map_err(|e| map_open_error(&config.path, e))?;

        info!("Opened {} at {} baud", config.path, config.baud_rate);
        Ok(SerialPortDevice { serial_port })
    }
}

fn map_open_error(path: &str, e: serialport::Error) -> OpenError {
    match e.kind() {
        serialport::ErrorKind::NoDevice => OpenError::DeviceNotFound(format!("{}: {}", path, e)),
        serialport::ErrorKind::InvalidInput => OpenError::InvalidConfig(format!("{}: {}", path, e)),
        serialport::ErrorKind::Io(io::ErrorKind::NotFound) => {
            OpenError::DeviceNotFound(format!("{}: {}", path, e))
        }
        serialport::ErrorKind::Io(io::ErrorKind::PermissionDenied) => {
            OpenError::PermissionDenied(format!("{}: {}", path, e))
        }
        _ => OpenError::Io(format!("{}: {}", path, e)),
    }
}

impl SerialDevice for SerialPortDevice {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.serial_port
            .read(buf)
            // Timeout just means no bytes arrived within this tick
            .or_else(|e| {
                if e.kind() == io::ErrorKind::TimedOut {
                    Ok(0)
                } else {
                    Err(e)
                }
            })
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.serial_port.write_all(bytes)?;
        self.serial_port.flush()
    }

    fn set_dtr(&mut self, enable: bool) -> io::Result<()> {
        self.serial_port
            .write_data_terminal_ready(enable)
            .map_err(io::Error::from)
    }

    fn purge_rx(&mut self) -> io::Result<()> {
        self.serial_port
            .clear(serialport::ClearBuffer::Input)
            .map_err(io::Error::from)
    }
}
