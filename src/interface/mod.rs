pub mod serialport;

use std::io;

pub(crate) trait SerialDevice: Send {
    /// Read available bytes into `buf`. A read timeout with no data is
    /// reported as `Ok(0)`, not an error
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write all bytes to the device, blocking until the OS accepts them
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Assert or clear the DTR control line. Platforms without the
    /// capability may no-op
    fn set_dtr(&mut self, enable: bool) -> io::Result<()>;

    /// Discard bytes buffered by the OS driver on the receive side
    fn purge_rx(&mut self) -> io::Result<()>;
}
