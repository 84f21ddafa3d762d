//! Response kinds, classification, and typed decode dispatch.
//!
//! - [`ResponseKind`]: every response the decoder recognises
//! - [`classify`]: prefix match of a delimited frame against [`PREFIX_TABLE`]
//! - [`Notification`]: a classified frame with its fields extracted
//!
//! ## Consumption
//!
//! Classification also decides how many buffered bytes the frame owns.
//! Most frames are a line whose CR is part of the frame, so the LF after
//! it is one extra byte. `+CMGR:` frames stop short of their
//! `\n\r\nOK\r\n` trailer, which is consumed with them. The SMS prompt and
//! `+CSSI:` are fixed-length and own exactly their bytes. Adding a response
//! kind is one row in [`PREFIX_TABLE`].

pub mod call;
pub mod network;
pub mod sim;
pub mod sms;

use std::fmt;

use tracing::{debug, error, warn};

use crate::codec::Text;
use crate::error::{Result, WireError};
use crate::frame::{FrameSpans, MULTILINE_TRAILER};

pub use network::{LinkMode, SignalQuality};
pub use sim::PinState;
pub use sms::SmsMessage;

// ---------------------------------------------------------------------------
// ResponseKind
// ---------------------------------------------------------------------------

/// Kind of a delimited response frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResponseKind {
    Ok,
    Error,
    CmsError,
    Ring,
    Cssi,
    Conn,
    Cend,
    Orig,
    Conf,
    SmMemFull,
    Csq,
    Rssi,
    Boot,
    Clip,
    Cmti,
    Cmgr,
    SmsPrompt,
    Cusd,
    Busy,
    NoDialtone,
    NoCarrier,
    Cpin,
    Cnum,
    Cops,
    Srvst,
    Creg,
    Mode,
    Cssu,
    /// Classification was asked about an empty frame.
    ParseError,
    /// Well-framed, but no prefix matched.
    Unknown,
}

impl ResponseKind {
    pub const ALL: [ResponseKind; 30] = [
        Self::Ok,
        Self::Error,
        Self::CmsError,
        Self::Ring,
        Self::Cssi,
        Self::Conn,
        Self::Cend,
        Self::Orig,
        Self::Conf,
        Self::SmMemFull,
        Self::Csq,
        Self::Rssi,
        Self::Boot,
        Self::Clip,
        Self::Cmti,
        Self::Cmgr,
        Self::SmsPrompt,
        Self::Cusd,
        Self::Busy,
        Self::NoDialtone,
        Self::NoCarrier,
        Self::Cpin,
        Self::Cnum,
        Self::Cops,
        Self::Srvst,
        Self::Creg,
        Self::Mode,
        Self::Cssu,
        Self::ParseError,
        Self::Unknown,
    ];

    /// Canonical name, as it appears on the wire where there is one.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Error => "ERROR",
            Self::CmsError => "+CMS ERROR",
            Self::Ring => "RING",
            Self::Cssi => "+CSSI",
            Self::Conn => "^CONN",
            Self::Cend => "^CEND",
            Self::Orig => "^ORIG",
            Self::Conf => "^CONF",
            Self::SmMemFull => "^SMMEMFULL",
            Self::Csq => "+CSQ",
            Self::Rssi => "^RSSI",
            Self::Boot => "^BOOT",
            Self::Clip => "+CLIP",
            Self::Cmti => "+CMTI",
            Self::Cmgr => "+CMGR",
            Self::SmsPrompt => "> ",
            Self::Cusd => "+CUSD",
            Self::Busy => "BUSY",
            Self::NoDialtone => "NO DIALTONE",
            Self::NoCarrier => "NO CARRIER",
            Self::Cpin => "+CPIN",
            Self::Cnum => "+CNUM",
            Self::Cops => "+COPS",
            Self::Srvst => "^SRVST",
            Self::Creg => "+CREG",
            Self::Mode => "^MODE",
            Self::Cssu => "+CSSU",
            Self::ParseError => "PARSE ERROR",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Classification table
// ---------------------------------------------------------------------------

/// How many buffered bytes a classified frame owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consume {
    /// Exactly this many bytes, regardless of frame length.
    Exact(usize),
    /// Frame length plus this many trailing bytes.
    FramePlus(usize),
}

impl Consume {
    pub fn bytes(self, frame_len: usize) -> usize {
        match self {
            Consume::Exact(n) => n,
            Consume::FramePlus(extra) => frame_len + extra,
        }
    }
}

/// One row of the classification table.
#[derive(Debug, Clone, Copy)]
pub struct PrefixRule {
    pub prefix: &'static [u8],
    pub kind: ResponseKind,
    pub consume: Consume,
}

const fn line(prefix: &'static [u8], kind: ResponseKind) -> PrefixRule {
    PrefixRule { prefix, kind, consume: Consume::FramePlus(1) }
}

/// Consumption for frames no row matched.
const UNKNOWN_CONSUME: Consume = Consume::FramePlus(1);

/// Prefix table, first match wins. Rows are ordered by how often devices
/// send them; keep new rows at the end unless a literal is a prefix of an
/// existing one.
pub const PREFIX_TABLE: &[PrefixRule] = &[
    line(b"^BOOT:", ResponseKind::Boot),
    line(b"OK\r", ResponseKind::Ok),
    line(b"^RSSI:", ResponseKind::Rssi),
    line(b"^MODE:", ResponseKind::Mode),
    PrefixRule { prefix: b"+CSSI:", kind: ResponseKind::Cssi, consume: Consume::Exact(8) },
    line(b"^ORIG:", ResponseKind::Orig),
    line(b"^CONF:", ResponseKind::Conf),
    line(b"^CEND:", ResponseKind::Cend),
    line(b"^CONN:", ResponseKind::Conn),
    line(b"+CREG:", ResponseKind::Creg),
    line(b"+COPS:", ResponseKind::Cops),
    line(b"+CSQ:", ResponseKind::Csq),
    line(b"+CPIN:", ResponseKind::Cpin),
    line(b"^SRVST:", ResponseKind::Srvst),
    line(b"ERROR\r", ResponseKind::Error),
    line(b"BUSY\r", ResponseKind::Busy),
    line(b"RING\r", ResponseKind::Ring),
    line(b"NO DIALTONE\r", ResponseKind::NoDialtone),
    line(b"NO CARRIER\r", ResponseKind::NoCarrier),
    line(b"+CSSU:", ResponseKind::Cssu),
    line(b"COMMAND NOT SUPPORT\r", ResponseKind::Error),
    line(b"+CMS ERROR:", ResponseKind::CmsError),
    line(b"^SMMEMFULL:", ResponseKind::SmMemFull),
    line(b"+CLIP:", ResponseKind::Clip),
    line(b"+CMTI:", ResponseKind::Cmti),
    PrefixRule {
        prefix: b"+CMGR:",
        kind: ResponseKind::Cmgr,
        consume: Consume::FramePlus(MULTILINE_TRAILER.len()),
    },
    PrefixRule { prefix: b"> ", kind: ResponseKind::SmsPrompt, consume: Consume::Exact(2) },
    line(b"+CUSD:", ResponseKind::Cusd),
    line(b"+CNUM:", ResponseKind::Cnum),
    line(b"ERROR+CNUM:", ResponseKind::Cnum),
];

/// Result of classifying one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub kind: ResponseKind,
    /// Buffered bytes to consume for this frame.
    pub consumed: usize,
}

/// Classify a delimited frame by its leading bytes.
///
/// An empty frame yields [`ResponseKind::ParseError`] with nothing to
/// consume; a frame no row matches is [`ResponseKind::Unknown`].
pub fn classify(frame: &FrameSpans<'_>) -> Classification {
    if frame.is_empty() {
        return Classification { kind: ResponseKind::ParseError, consumed: 0 };
    }
    let (kind, consume) = PREFIX_TABLE
        .iter()
        .find(|rule| frame.starts_with(rule.prefix))
        .map_or((ResponseKind::Unknown, UNKNOWN_CONSUME), |rule| (rule.kind, rule.consume));
    Classification { kind, consumed: consume.bytes(frame.len()) }
}

// ---------------------------------------------------------------------------
// Notification
// ---------------------------------------------------------------------------

/// Decoded response. Text fields borrow from the frame bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification<'a> {
    /// A response that carries no structured payload (OK, RING, ^CEND, ...).
    Plain(ResponseKind),
    /// `+CLIP`: incoming caller number.
    CallerId(Text<'a>),
    /// `+CNUM`: own subscriber number.
    SubscriberNumber(Text<'a>),
    /// `+COPS`: operator name.
    Operator(Text<'a>),
    /// `+CMTI`: storage index of a newly received SMS.
    NewSms { index: u32 },
    /// `+CMGR`: a stored SMS.
    Sms(SmsMessage<'a>),
    /// `+CUSD`: USSD text.
    Ussd(Text<'a>),
    /// `+CPIN`: SIM lock state.
    Pin(PinState),
    /// `+CSQ`: signal quality report.
    SignalQuality(SignalQuality),
    /// `^RSSI`: unsolicited signal strength.
    Rssi(i32),
    /// `^MODE`: link mode change.
    LinkMode(LinkMode),
}

impl<'a> Notification<'a> {
    /// Extract the fields of a frame already classified as `kind`.
    ///
    /// Failures are logged at a severity matching their consequence: SIM
    /// state failures at error, SMS notification failures at warn, the rest
    /// at debug.
    pub fn decode(kind: ResponseKind, frame: &'a mut [u8]) -> Result<Self> {
        let decoded = match kind {
            ResponseKind::Clip => call::clip(frame).map(Notification::CallerId),
            ResponseKind::Cnum => sim::cnum(frame).map(Notification::SubscriberNumber),
            ResponseKind::Cops => network::cops(frame).map(Notification::Operator),
            ResponseKind::Cmti => sms::cmti(frame).map(|index| Notification::NewSms { index }),
            ResponseKind::Cmgr => sms::cmgr(frame).map(Notification::Sms),
            ResponseKind::Cusd => sms::cusd(frame).map(Notification::Ussd),
            ResponseKind::Cpin => sim::cpin(frame).map(Notification::Pin),
            ResponseKind::Csq => network::csq(frame).map(Notification::SignalQuality),
            ResponseKind::Rssi => network::rssi(frame).map(Notification::Rssi),
            ResponseKind::Mode => network::mode(frame).map(Notification::LinkMode),
            ResponseKind::ParseError => Err(WireError::EmptyFrame),
            other => Ok(Notification::Plain(other)),
        };
        decoded.inspect_err(|e| match kind {
            ResponseKind::Cpin => error!(%kind, error = %e, "cannot determine SIM state"),
            ResponseKind::Cmti | ResponseKind::Cmgr => {
                warn!(%kind, error = %e, "malformed SMS notification")
            }
            _ => debug!(%kind, error = %e, "ignoring malformed response"),
        })
    }

    /// The response kind this notification was decoded from.
    pub fn kind(&self) -> ResponseKind {
        match self {
            Notification::Plain(kind) => *kind,
            Notification::CallerId(_) => ResponseKind::Clip,
            Notification::SubscriberNumber(_) => ResponseKind::Cnum,
            Notification::Operator(_) => ResponseKind::Cops,
            Notification::NewSms { .. } => ResponseKind::Cmti,
            Notification::Sms(_) => ResponseKind::Cmgr,
            Notification::Ussd(_) => ResponseKind::Cusd,
            Notification::Pin(_) => ResponseKind::Cpin,
            Notification::SignalQuality(_) => ResponseKind::Csq,
            Notification::Rssi(_) => ResponseKind::Rssi,
            Notification::LinkMode(_) => ResponseKind::Mode,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
