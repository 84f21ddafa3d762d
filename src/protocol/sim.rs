//! SIM responses: lock state and own number.

use memchr::memmem;
use tracing::error;

use crate::codec::{self, Text};
use crate::error::{Result, WireError};

/// SIM lock state reported by `+CPIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum PinState {
    /// No PIN needed.
    Ready = 0,
    /// SIM is waiting for its PIN.
    PinRequired = 1,
    /// SIM is blocked and waiting for its PUK.
    PukRequired = 2,
}

impl PinState {
    /// Numeric code: 0 ready, 1 PIN, 2 PUK.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// `true` when the device cannot be used until a code is entered.
    pub fn is_locked(self) -> bool {
        self != PinState::Ready
    }
}

/// Determine the SIM state from a `+CPIN` response.
///
/// This is a substring search rather than a positional parse, so any
/// surrounding text is tolerated. An unrecognised state is an error, which
/// callers must treat as a locked device.
pub fn cpin(frame: &[u8]) -> Result<PinState> {
    if memmem::find(frame, b"READY").is_some() {
        return Ok(PinState::Ready);
    }
    if memmem::find(frame, b"SIM PIN").is_some() {
        error!("SIM needs PIN code");
        return Ok(PinState::PinRequired);
    }
    if memmem::find(frame, b"SIM PUK").is_some() {
        error!("SIM needs PUK code");
        return Ok(PinState::PukRequired);
    }
    Err(WireError::UnknownPinState { raw: String::new() }.with_raw(frame))
}

/// Extract the subscriber number from a `+CNUM` response.
///
/// Format: `+CNUM: "<name>","<number>",<type>`. The name field is skipped;
/// the closing quote of the number is overwritten with NUL.
pub fn cnum(frame: &mut [u8]) -> Result<Text<'_>> {
    let Some(name) = codec::quoted(frame, 0) else {
        return Err(WireError::missing("+CNUM", "name").with_raw(frame));
    };
    let Some(number) = codec::quoted(frame, name.end + 1) else {
        return Err(WireError::missing("+CNUM", "number").with_raw(frame));
    };
    Ok(codec::terminate(frame, number))
}
