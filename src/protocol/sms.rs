//! SMS and USSD responses.

use crate::codec::{self, COMMA, NUL, QUOTE, Text};
use crate::error::{Result, WireError};

/// A stored SMS read back with `+CMGR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmsMessage<'a> {
    /// Originating address.
    pub sender: Text<'a>,
    /// Message body; may span several lines.
    pub text: Text<'a>,
}

/// Parse the storage index from `+CMTI: <mem>,<index>`.
pub fn cmti(frame: &[u8]) -> Result<u32> {
    let Some(rest) = codec::literal(frame, b"+CMTI:").map(codec::skip_ws) else {
        return Err(WireError::missing("+CMTI", "prefix").with_raw(frame));
    };
    // The storage name must be non-empty.
    let comma = match memchr::memchr(COMMA, rest) {
        Some(pos) if pos > 0 => pos,
        _ => return Err(WireError::missing("+CMTI", "storage").with_raw(frame)),
    };
    codec::scan_int(&rest[comma + 1..], None)
        .and_then(|(index, _)| u32::try_from(index).ok())
        .ok_or_else(|| WireError::bad_integer("+CMTI", "index").with_raw(frame))
}

/// Extract sender and text from a `+CMGR` frame.
///
/// Format:
/// ```text
/// +CMGR: <status>,"<sender>",[<alpha>],"<timestamp>"\r\n
/// <text>\r
/// ```
/// The sender starts at the first quote after the first comma. The text
/// has no closing delimiter: it runs from the first `\n` after the sender
/// to the end of the frame, less the frame's trailing CR.
pub fn cmgr(frame: &mut [u8]) -> Result<SmsMessage<'_>> {
    let Some(comma) = memchr::memchr(COMMA, frame) else {
        return Err(WireError::missing("+CMGR", "status separator").with_raw(frame));
    };
    let Some(sender) = codec::quoted(frame, comma + 1) else {
        return Err(WireError::missing("+CMGR", "sender").with_raw(frame));
    };
    let Some(newline) = codec::find_from(frame, sender.end + 1, b'\n') else {
        return Err(WireError::missing("+CMGR", "text separator").with_raw(frame));
    };
    let text_start = newline + 1;
    if text_start >= frame.len() {
        return Err(WireError::missing("+CMGR", "text").with_raw(frame));
    }
    let mut text_end = frame.len();
    if frame[text_end - 1] == b'\r' {
        text_end -= 1;
    }

    frame[sender.end] = NUL;
    let frame: &[u8] = frame;
    Ok(SmsMessage {
        sender: Text::new(&frame[sender]),
        text: Text::new(&frame[text_start..text_end]),
    })
}

/// Extract the message text from `+CUSD: <n>,"<text>",<dcs>`.
///
/// The text runs from the first quote in the frame to the last one, so
/// quotes embedded in the message survive. The cost is that a quoted field
/// after the message would be swallowed into it; devices do not send one.
pub fn cusd(frame: &mut [u8]) -> Result<Text<'_>> {
    let Some(open) = memchr::memchr(QUOTE, frame) else {
        return Err(WireError::missing("+CUSD", "opening quote").with_raw(frame));
    };
    let start = open + 1;
    let Some(close) = memchr::memrchr(QUOTE, frame).filter(|&close| close > start) else {
        return Err(WireError::missing("+CUSD", "closing quote").with_raw(frame));
    };
    Ok(codec::terminate(frame, start..close))
}
