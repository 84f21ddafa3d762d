//! Call-related responses.

use crate::codec::{self, Text};
use crate::error::{Result, WireError};

/// Extract the caller number from a `+CLIP` notification.
///
/// Format: `+CLIP: "<number>",<type>,...`. The closing quote of the number
/// is overwritten with NUL.
pub fn clip(frame: &mut [u8]) -> Result<Text<'_>> {
    let Some(number) = codec::quoted(frame, 0) else {
        return Err(WireError::missing("+CLIP", "caller number").with_raw(frame));
    };
    Ok(codec::terminate(frame, number))
}
