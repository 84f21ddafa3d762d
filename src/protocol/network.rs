//! Network registration and radio status responses.

use crate::codec::{self, Text};
use crate::error::{Result, WireError};

/// Value reported for a field that is absent or unparsed.
pub const UNKNOWN: i32 = -1;

/// `+CSQ` report. Fields are [`UNKNOWN`] until parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalQuality {
    /// Received signal strength index (0-31, 99 = not detectable).
    pub rssi: i32,
    /// Bit error rate index (0-7, 99 = not detectable).
    pub ber: i32,
}

impl Default for SignalQuality {
    fn default() -> Self {
        Self { rssi: UNKNOWN, ber: UNKNOWN }
    }
}

/// `^MODE` report. Fields are [`UNKNOWN`] until parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkMode {
    /// System mode (e.g. 3 = GSM/GPRS, 5 = WCDMA).
    pub mode: i32,
    /// System sub-mode (radio access technology detail).
    pub submode: i32,
}

impl Default for LinkMode {
    fn default() -> Self {
        Self { mode: UNKNOWN, submode: UNKNOWN }
    }
}

/// Extract the operator name from a `+COPS` response.
///
/// Format: `+COPS: <mode>[,<format>,"<name>"]`. A bare `+COPS: <mode>`
/// (no operator selected) has no name and is reported as missing.
pub fn cops(frame: &mut [u8]) -> Result<Text<'_>> {
    let Some(name) = codec::quoted(frame, 0) else {
        return Err(WireError::missing("+COPS", "operator name").with_raw(frame));
    };
    Ok(codec::terminate(frame, name))
}

/// Parse `+CSQ: <rssi>,<ber>`; each value is at most two characters.
///
/// Succeeds once `rssi` parses; `ber` stays [`UNKNOWN`] if it does not.
pub fn csq(frame: &[u8]) -> Result<SignalQuality> {
    let mut quality = SignalQuality::default();
    let Some(rest) = codec::literal(frame, b"+CSQ:") else {
        return Err(WireError::missing("+CSQ", "prefix").with_raw(frame));
    };
    let Some((rssi, rest)) = codec::scan_int(rest, Some(2)) else {
        return Err(WireError::bad_integer("+CSQ", "rssi").with_raw(frame));
    };
    quality.rssi = rssi;
    if let Some((ber, _)) = codec::literal(rest, b",").and_then(|r| codec::scan_int(r, Some(2))) {
        quality.ber = ber;
    }
    Ok(quality)
}

/// Parse `^RSSI:<value>`.
pub fn rssi(frame: &[u8]) -> Result<i32> {
    codec::literal(frame, b"^RSSI:")
        .and_then(|rest| codec::scan_int(rest, None))
        .map(|(value, _)| value)
        .ok_or_else(|| WireError::bad_integer("^RSSI", "rssi").with_raw(frame))
}

/// Parse `^MODE:<mode>,<submode>`.
///
/// Succeeds once `mode` parses; `submode` stays [`UNKNOWN`] if it does not.
pub fn mode(frame: &[u8]) -> Result<LinkMode> {
    let mut link = LinkMode::default();
    let Some((system_mode, rest)) =
        codec::literal(frame, b"^MODE:").and_then(|rest| codec::scan_int(rest, None))
    else {
        return Err(WireError::bad_integer("^MODE", "mode").with_raw(frame));
    };
    link.mode = system_mode;
    if let Some((submode, _)) = codec::literal(rest, b",").and_then(|r| codec::scan_int(r, None)) {
        link.submode = submode;
    }
    Ok(link)
}
