use std::io;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tracing::{debug, info, trace, warn};

use crate::config::PortConfig;
use crate::constants::READ_CHUNK_SIZE;
use crate::error::{OpenError, ReadLoopError, WriteError};
use crate::framing::LineFramer;
use crate::interface::SerialDevice;
use crate::interface::serialport::SerialPortDevice;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Closed = 0,
    Open = 1,
    Closing = 2,
}

impl ChannelState {
    fn from_u8(value: u8) -> ChannelState {
        match value {
            1 => ChannelState::Open,
            2 => ChannelState::Closing,
            _ => ChannelState::Closed,
        }
    }
}

type SharedDevice = Arc<Mutex<Box<dyn SerialDevice>>>;
type LineCallback = Arc<dyn Fn(String) + Send + Sync>;
type ErrorObserver = Arc<dyn Fn(ReadLoopError) + Send + Sync>;

/// A serial connection that delivers newline-terminated lines to a callback.
///
/// `open` starts a background reader thread that drains the device, frames
/// bytes into lines and invokes the callback once per line, in arrival
/// order. `send` and `close` may be called from any thread while the loop
/// runs. `close` (and drop) stops the loop and joins the thread, so the
/// callback is never invoked after either returns. The callback must not
/// call `open` or `close` on its own channel.
pub struct SerialChannel {
    state: Arc<AtomicU8>,
    stop_flag: Arc<AtomicBool>,
    device: Option<SharedDevice>,
    reader: Option<JoinHandle<()>>,
    on_line: LineCallback,
    on_error: Option<ErrorObserver>,
    delimiter: u8,
    strip_cr: bool,
}

impl SerialChannel {
    pub fn new(on_line: impl Fn(String) + Send + Sync + 'static) -> SerialChannel {
        SerialChannel {
            state: Arc::new(AtomicU8::new(ChannelState::Closed as u8)),
            stop_flag: Arc::new(AtomicBool::new(false)),
            device: None,
            reader: None,
            on_line: Arc::new(on_line),
            on_error: None,
            delimiter: b'\n',
            strip_cr: true,
        }
    }

    /// Register an observer for errors that terminate the read loop.
    /// Such errors are never returned from a synchronous call; without an
    /// observer they are only logged.
    pub fn error_observer(&mut self, observer: impl Fn(ReadLoopError) + Send + Sync + 'static) {
        self.on_error = Some(Arc::new(observer));
    }

    /// Line delimiter fed to the framer on the next `open` (default `\n`)
    pub fn delimiter(&mut self, byte: u8) {
        self.delimiter = byte;
    }

    /// Whether a `\r` before the delimiter is stripped (default true)
    pub fn strip_carriage_return(&mut self, enable: bool) {
        self.strip_cr = enable;
    }

    pub fn state(&self) -> ChannelState {
        ChannelState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Open the device described by `config`, apply its control-line hooks
    /// and start the read loop. Fails with `AlreadyOpen` unless the channel
    /// is `Closed`; a failed open leaves it `Closed` and safe to retry.
    pub fn open(&mut self, config: PortConfig) -> Result<(), OpenError> {
        if self.state() != ChannelState::Closed {
            return Err(OpenError::AlreadyOpen);
        }
        // Reap a reader left behind by a mid-session loop failure
        self.close();

        let device = SerialPortDevice::open(&config)?;
        self.open_device(Box::new(device), &config)
    }

    pub(crate) fn open_device(
        &mut self,
        mut device: Box<dyn SerialDevice>,
        config: &PortConfig,
    ) -> Result<(), OpenError> {
        if config.assert_dtr {
            device
                .set_dtr(true)
                .map_err(|e| OpenError::Io(format!("Failed to assert DTR: {}", e)))?;
        }
        if config.purge_rx_on_open {
            device
                .purge_rx()
                .map_err(|e| OpenError::Io(format!("Failed to purge receive buffer: {}", e)))?;
        }

        let device = Arc::new(Mutex::new(device));
        let framer = LineFramer::with_delimiter(self.delimiter, self.strip_cr);
        self.stop_flag = Arc::new(AtomicBool::new(false));

        let handle = std::thread::spawn({
            let device = Arc::clone(&device);
            let stop_flag = Arc::clone(&self.stop_flag);
            let state = Arc::clone(&self.state);
            let on_line = Arc::clone(&self.on_line);
            let on_error = self.on_error.clone();
            move || reader_loop(device, framer, stop_flag, state, on_line, on_error)
        });

        self.device = Some(device);
        self.reader = Some(handle);
        self.state
            .store(ChannelState::Open as u8, Ordering::SeqCst);
        debug!("Reader thread started");
        Ok(())
    }

    /// Write bytes to the device. Writes from concurrent callers are
    /// serialized; byte order within one call is preserved.
    pub fn send(&self, bytes: &[u8]) -> Result<(), WriteError> {
        if self.state() != ChannelState::Open {
            return Err(WriteError::NotOpen);
        }
        let device = self.device.as_ref().ok_or(WriteError::NotOpen)?;
        let mut device = device
            .lock()
            .map_err(|_| WriteError::IoFailure("Device lock poisoned".to_string()))?;
        device
            .write_all(bytes)
            .map_err(|e| WriteError::IoFailure(e.to_string()))?;
        trace!("Sent {} bytes", bytes.len());
        Ok(())
    }

    /// Stop the read loop, join the reader thread and release the device.
    /// Idempotent. The in-flight read wakes within one poll tick, so this
    /// returns in bounded time.
    pub fn close(&mut self) {
        if self.reader.is_none() && self.device.is_none() {
            self.state
                .store(ChannelState::Closed as u8, Ordering::SeqCst);
            return;
        }

        if self.state() == ChannelState::Open {
            self.state
                .store(ChannelState::Closing as u8, Ordering::SeqCst);
        }
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(handle) = self.reader.take() {
            if handle.join().is_err() {
                warn!("Reader thread panicked");
            }
        }
        self.device = None;
        self.state
            .store(ChannelState::Closed as u8, Ordering::SeqCst);
        info!("Serial channel closed");
    }
}

impl Drop for SerialChannel {
    fn drop(&mut self) {
        self.close();
    }
}

fn reader_loop(
    device: SharedDevice,
    mut framer: LineFramer,
    stop_flag: Arc<AtomicBool>,
    state: Arc<AtomicU8>,
    on_line: LineCallback,
    on_error: Option<ErrorObserver>,
) {
    let mut chunk = [0u8; READ_CHUNK_SIZE];

    while !stop_flag.load(Ordering::SeqCst) {
        // Hold the device lock only for the read itself; lines are
        // dispatched with the lock released so the callback may send
        let read_result = {
            let mut device = device.lock().expect("Failed to lock device (reader thread)");
            device.read(&mut chunk)
        };

        match read_result {
            // Timeout tick with no data; re-check the stop flag
            Ok(0) => {}
            Ok(n) => {
                trace!("Received {} bytes", n);
                for line in framer.feed(&chunk[..n]) {
                    on_line(line);
                }
            }
            Err(e) => {
                let error = match e.kind() {
                    io::ErrorKind::BrokenPipe
                    | io::ErrorKind::NotConnected
                    | io::ErrorKind::UnexpectedEof => ReadLoopError::Disconnected(e.to_string()),
                    _ => ReadLoopError::Io(e.to_string()),
                };
                warn!("Read loop terminated: {}", error);
                state.store(ChannelState::Closed as u8, Ordering::SeqCst);
                if let Some(observer) = &on_error {
                    observer(error);
                }
                return;
            }
        }
    }

    debug!("Reader thread stopped");
}
