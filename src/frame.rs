//! Frame delimiting for the AT response stream.
//!
//! Wire format: responses are normally wrapped as
//! ```text
//! \r\n <RESPONSE> \r\n
//! ```
//! but a handful of response kinds break that rule: the SMS input prompt
//! has no terminator at all, `+CSSI:` is fixed-length, and `+CMGR:` /
//! `+CNUM:` carry multi-line bodies closed by `\n\r\nOK\r\n`.
//!
//! [`FrameDelimiter`] walks the unconsumed region of a [`RingBuffer`] and
//! reports where the next complete frame ends. It only consumes bytes that
//! sit *between* frames (CRLF openers, bare `\n` continuations, noise); the
//! frame itself is consumed by the classifier, which knows how many
//! trailing bytes belong to each kind.

use tracing::debug;

use crate::ring::{Prefix, RingBuffer};

/// Terminator of multi-line payloads (`+CMGR:`, `+CNUM:`).
pub const MULTILINE_TRAILER: &[u8] = b"\n\r\nOK\r\n";

/// Line opener/terminator.
const CRLF: &[u8] = b"\r\n";

/// How a frame ends once its start has been seen.
#[derive(Debug, Clone, Copy)]
enum Rule {
    /// Exactly this many bytes, including the prefix.
    Fixed(usize),
    /// Everything up to (not including) the terminator.
    Until(&'static [u8]),
    /// Stray bytes ahead of the real frame; drop this many and look again.
    Skip(usize),
}

/// Prefix-specific termination rules, checked in order. Anything not listed
/// is a single line closed by CRLF.
const RULES: &[(&[u8], Rule)] = &[
    (b"> ", Rule::Fixed(2)),
    (b"+CMGR:", Rule::Until(MULTILINE_TRAILER)),
    (b"+CNUM:", Rule::Until(MULTILINE_TRAILER)),
    (b"ERROR+CNUM:", Rule::Until(MULTILINE_TRAILER)),
    (b"+CSSI:", Rule::Fixed(8)),
    (b"\r\n+CSSU:", Rule::Skip(2)),
];

/// A logical run of bytes that may wrap around the end of ring storage.
///
/// `head` followed by `tail` is the frame; `tail` is empty unless the frame
/// straddles the wrap point.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FrameSpans<'a> {
    head: &'a [u8],
    tail: &'a [u8],
}

impl<'a> FrameSpans<'a> {
    pub(crate) fn new(head: &'a [u8], tail: &'a [u8]) -> Self {
        // Normalise so a single-span frame never reports an empty head.
        if head.is_empty() {
            Self { head: tail, tail: &[] }
        } else {
            Self { head, tail }
        }
    }

    pub fn head(&self) -> &'a [u8] {
        self.head
    }

    pub fn tail(&self) -> &'a [u8] {
        self.tail
    }

    /// 0 for an empty frame, otherwise 1 or 2.
    pub fn span_count(&self) -> usize {
        usize::from(!self.head.is_empty()) + usize::from(!self.tail.is_empty())
    }

    pub fn len(&self) -> usize {
        self.head.len() + self.tail.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes in logical order.
    pub fn bytes(&self) -> impl Iterator<Item = u8> + 'a {
        self.head.iter().chain(self.tail.iter()).copied()
    }

    /// Concatenate both spans into an owned buffer.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut v = Vec::with_capacity(self.len());
        v.extend_from_slice(self.head);
        v.extend_from_slice(self.tail);
        v
    }

    pub fn starts_with(&self, literal: &[u8]) -> bool {
        if literal.len() > self.len() {
            return false;
        }
        let n = literal.len().min(self.head.len());
        self.head[..n] == literal[..n] && self.tail[..literal.len() - n] == literal[n..]
    }

    /// Offset of the first occurrence of `needle`, including matches that
    /// straddle the two spans.
    pub fn find(&self, needle: &[u8]) -> Option<usize> {
        if needle.is_empty() {
            return Some(0);
        }
        if let Some(pos) = memchr::memmem::find(self.head, needle) {
            return Some(pos);
        }
        let (head, tail) = (self.head, self.tail);
        let first = head.len().saturating_sub(needle.len() - 1);
        for start in first..head.len() {
            let in_head = head.len() - start;
            let in_tail = needle.len() - in_head;
            if in_tail <= tail.len()
                && head[start..] == needle[..in_head]
                && tail[..in_tail] == needle[in_head..]
            {
                return Some(start);
            }
        }
        memchr::memmem::find(tail, needle).map(|pos| pos + head.len())
    }

    pub fn find_byte(&self, byte: u8) -> Option<usize> {
        memchr::memchr(byte, self.head)
            .or_else(|| memchr::memchr(byte, self.tail).map(|pos| pos + self.head.len()))
    }
}

impl std::fmt::Debug for FrameSpans<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // "[+CLIP: \"123\"\r | 2 spans 5+9B]"
        write!(f, "[")?;
        for b in self.bytes() {
            write!(f, "{}", std::ascii::escape_default(b))?;
        }
        write!(f, " | {} spans {}+{}B]", self.span_count(), self.head.len(), self.tail.len())
    }
}

/// What the started state decided for the bytes at the front of the buffer.
enum Step {
    Frame(usize),
    Wait,
    Retry,
}

/// Incremental frame delimiter.
///
/// Holds one bit of state: whether a line has been opened (CRLF seen) and
/// the delimiter is now looking for its end. The state starts out `false`
/// and is never reset afterwards; it returns to `false` on its own after
/// every completed frame.
#[derive(Debug, Default)]
pub struct FrameDelimiter {
    awaiting_continuation: bool,
}

impl FrameDelimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` while a frame has been opened but not yet closed.
    pub fn awaiting_continuation(&self) -> bool {
        self.awaiting_continuation
    }

    /// Locate the next complete frame, returning its spans.
    ///
    /// Inter-frame bytes are consumed from `ring`; the frame bytes are left
    /// in place for the classifier. `None` means more data is needed.
    pub fn next_frame<'r>(&mut self, ring: &'r mut RingBuffer) -> Option<FrameSpans<'r>> {
        let len = self.delimit(ring)?;
        Some(ring.readable(len))
    }

    /// Like [`next_frame`](Self::next_frame) but returns only the frame length.
    ///
    /// Never returns `Some(0)`.
    pub fn delimit(&mut self, ring: &mut RingBuffer) -> Option<usize> {
        // Every pass either returns or consumes at least one byte, so the
        // loop runs at most `ring.used()` times.
        while !ring.is_empty() {
            if !self.awaiting_continuation {
                match ring.prefix(CRLF) {
                    Prefix::Match => {
                        ring.consume(CRLF.len());
                        self.awaiting_continuation = true;
                    }
                    Prefix::Short => return None,
                    Prefix::Mismatch if ring.starts_with(b"\n") => {
                        debug!("multiline response continuation");
                        ring.consume(1);
                    }
                    Prefix::Mismatch => {
                        let n = ring.find_byte(b'\r').map_or(ring.used(), |pos| pos + 1);
                        debug!(
                            bytes = n,
                            noise = ?ring.readable(n),
                            "discarding bytes outside a response"
                        );
                        ring.consume(n);
                    }
                }
                continue;
            }

            match Self::started(ring) {
                Step::Frame(len) => {
                    self.awaiting_continuation = false;
                    return Some(len);
                }
                Step::Wait => return None,
                Step::Retry => {}
            }
        }
        None
    }

    fn started(ring: &mut RingBuffer) -> Step {
        for &(prefix, rule) in RULES {
            if !ring.starts_with(prefix) {
                continue;
            }
            return match rule {
                Rule::Fixed(n) if ring.used() >= n => Step::Frame(n),
                Rule::Fixed(_) => Step::Wait,
                Rule::Until(terminator) => ring.find(terminator).map_or(Step::Wait, Step::Frame),
                Rule::Skip(n) => {
                    debug!("dropping spurious CRLF ahead of unsolicited result");
                    ring.consume(n);
                    Step::Retry
                }
            };
        }
        // Generic line: the frame keeps the CR so its length covers the
        // content plus one byte.
        ring.find(CRLF).map_or(Step::Wait, |pos| Step::Frame(pos + 1))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
