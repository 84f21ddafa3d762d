pub mod codec;
pub mod config;
pub mod conn;
pub mod error;
pub mod frame;
pub mod protocol;
pub mod ring;

pub use codec::Text;
pub use config::ConnConfig;
pub use conn::{Channel, ConnError, Connection, ReadOutcome, Readiness, Response};
pub use error::WireError;
pub use frame::{FrameDelimiter, FrameSpans};
pub use protocol::{
    Classification, LinkMode, Notification, PinState, ResponseKind, SignalQuality, SmsMessage,
    classify,
};
pub use ring::{Prefix, RingBuffer};
