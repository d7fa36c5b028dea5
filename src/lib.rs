pub use channel::{ChannelState, SerialChannel};
pub use config::{Parity, PortConfig, StopBits};
pub use framing::LineFramer;

pub mod channel;
pub mod config;
pub(crate) mod constants;
pub mod error;
pub mod framing;
pub mod interface;
