//! Field scanners for AT response payloads.
//!
//! The grammar (prefixes, separators, quotes, digits) is ASCII; field
//! contents are in whatever character set `AT+CSCS` selected. Extractors
//! work on the frame bytes in place: a field is closed by overwriting its
//! trailing delimiter with NUL and handing back a [`Text`] borrowed from the
//! frame, so nothing is copied and the frame is no longer usable as a whole
//! afterwards.

use std::borrow::Cow;
use std::fmt;
use std::ops::Range;
use std::str::Utf8Error;

/// Written over a field's closing delimiter once the field is extracted.
pub const NUL: u8 = 0;

/// Field separator in parameter lists.
pub const COMMA: u8 = b',';

/// String field delimiter.
pub const QUOTE: u8 = b'"';

// ---------------------------------------------------------------------------
// Positional scans
// ---------------------------------------------------------------------------

/// Index of the first `byte` at or after `from`.
pub fn find_from(data: &[u8], from: usize, byte: u8) -> Option<usize> {
    let rest = data.get(from..)?;
    memchr::memchr(byte, rest).map(|pos| pos + from)
}

/// Content range of the first quoted field whose opening quote is at or
/// after `from`. `None` if either quote is missing.
pub fn quoted(data: &[u8], from: usize) -> Option<Range<usize>> {
    let open = find_from(data, from, QUOTE)?;
    let close = find_from(data, open + 1, QUOTE)?;
    Some(open + 1..close)
}

/// NUL-terminate `data[range]` in place and borrow it as a field.
///
/// `range.end` must index the delimiter that closes the field.
pub fn terminate(data: &mut [u8], range: Range<usize>) -> Text<'_> {
    data[range.end] = NUL;
    let data: &[u8] = data;
    Text::new(&data[range])
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// A text field borrowed from a frame, in the device's character set.
///
/// Compares equal to `&str` byte-wise. `Display` is lossy.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Text<'a>(&'a [u8]);

impl<'a> Text<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The field as UTF-8 (and so also IRA/ASCII) text.
    pub fn to_str(&self) -> Result<&'a str, Utf8Error> {
        std::str::from_utf8(self.0)
    }

    pub fn to_string_lossy(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.0)
    }
}

impl<'a> From<&'a str> for Text<'a> {
    fn from(s: &'a str) -> Self {
        Self(s.as_bytes())
    }
}

impl<'a> From<&'a [u8]> for Text<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self(bytes)
    }
}

impl PartialEq<str> for Text<'_> {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<&str> for Text<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl fmt::Debug for Text<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0.escape_ascii())
    }
}

impl fmt::Display for Text<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

// ---------------------------------------------------------------------------
// scanf-style scans
// ---------------------------------------------------------------------------

/// Skip leading ASCII whitespace.
pub fn skip_ws(data: &[u8]) -> &[u8] {
    let n = data.iter().take_while(|b| b.is_ascii_whitespace()).count();
    &data[n..]
}

/// Strip a literal, or `None` if `data` does not start with it.
pub fn literal<'a>(data: &'a [u8], lit: &[u8]) -> Option<&'a [u8]> {
    data.strip_prefix(lit)
}

/// Scan a decimal integer the way `%d` / `%Nd` does.
///
/// Leading whitespace is skipped and not counted against `width`; an
/// optional sign is. At least one digit is required. Returns the value and
/// the unscanned remainder.
pub fn scan_int(data: &[u8], width: Option<usize>) -> Option<(i32, &[u8])> {
    let data = skip_ws(data);
    let max = width.unwrap_or(usize::MAX).min(data.len());

    let (negative, mut i) = match data.first() {
        Some(b'-') => (true, 1),
        Some(b'+') => (false, 1),
        _ => (false, 0),
    };
    let digits_start = i;
    let mut value: i64 = 0;
    while i < max && data[i].is_ascii_digit() {
        value = value.checked_mul(10)?.checked_add(i64::from(data[i] - b'0'))?;
        i += 1;
    }
    if i == digits_start {
        return None;
    }
    let value = i32::try_from(if negative { -value } else { value }).ok()?;
    Some((value, &data[i..]))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn quoted_finds_first_field() {
        let data = b"+CNUM: \"Me\",\"+1555\",129";
        assert_eq!(quoted(data, 0), Some(8..10));
        assert_eq!(quoted(data, 11), Some(13..18));
        assert_eq!(quoted(data, 19), None);
    }

    #[test]
    fn quoted_needs_closing_quote() {
        assert_eq!(quoted(b"+CLIP: \"123", 0), None);
        assert_eq!(quoted(b"+CLIP: 123", 0), None);
    }

    #[test]
    fn terminate_writes_nul() {
        let mut data = *b"\"abc\",1";
        let s = terminate(&mut data, 1..4);
        assert_eq!(s, "abc");
        assert_eq!(data[4], NUL);
    }

    #[test]
    fn terminate_keeps_non_utf8_bytes() {
        // "Grüße" in ISO 8859-1.
        let mut data = *b"\"Gr\xfc\xdfe\"";
        let text = terminate(&mut data, 1..6);
        assert_eq!(text.as_bytes(), b"Gr\xfc\xdfe");
        assert!(text.to_str().is_err());
        assert_eq!(text.to_string_lossy(), "Gr\u{FFFD}\u{FFFD}e");
        assert_eq!(format!("{text:?}"), "\"Gr\\xfc\\xdfe\"");
    }

    #[test]
    fn text_compares_with_str() {
        let text = Text::from("+4930123");
        assert_eq!(text, "+4930123");
        assert_eq!(text.to_str(), Ok("+4930123"));
        assert_eq!(text.to_string(), "+4930123");
        assert!(Text::default().is_empty());
    }

    #[rstest]
    #[case(b"15,99", None, 15, b",99")]
    #[case(b"  7", None, 7, b"")]
    #[case(b"-42x", None, -42, b"x")]
    #[case(b"+3", None, 3, b"")]
    #[case(b"123", Some(2), 12, b"3")]
    #[case(b" 99,", Some(2), 99, b",")]
    #[case(b"-9", Some(2), -9, b"")]
    fn scan_int_accepts(
        #[case] input: &[u8],
        #[case] width: Option<usize>,
        #[case] value: i32,
        #[case] rest: &[u8],
    ) {
        assert_eq!(scan_int(input, width), Some((value, rest)));
    }

    #[rstest]
    #[case(b"", None)]
    #[case(b"abc", None)]
    #[case(b"-", None)]
    #[case(b"-5", Some(1))]
    #[case(b"99999999999", None)]
    fn scan_int_rejects(#[case] input: &[u8], #[case] width: Option<usize>) {
        assert_eq!(scan_int(input, width), None);
    }

    #[test]
    fn literal_and_whitespace() {
        assert_eq!(literal(b"+CSQ: 1", b"+CSQ:"), Some(&b" 1"[..]));
        assert_eq!(literal(b"+CSS", b"+CSQ:"), None);
        assert_eq!(skip_ws(b" \t\r\nx"), b"x");
    }
}
