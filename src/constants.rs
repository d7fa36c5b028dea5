pub(crate) const DEFAULT_BAUD_RATE: u32 = 9600;
pub(crate) const DEFAULT_DATA_BITS: u8 = 8;

pub(crate) const SERIAL_TIMEOUT_MS: u64 = 10;
pub(crate) const READ_CHUNK_SIZE: usize = 1024;
