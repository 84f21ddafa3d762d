//! Fixed-capacity circular byte buffer with scatter/gather views.
//!
//! The buffer never copies on the read path: callers get at most two
//! contiguous slices describing a logical run of bytes that may wrap
//! around the end of storage. Writes go the same way, through at most two
//! free-space slices that a single vectored read can fill.

use std::io::IoSliceMut;

use crate::frame::FrameSpans;

/// Outcome of comparing the start of the buffered region with a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefix {
    /// The buffered region starts with the literal.
    Match,
    /// Enough bytes are buffered and they differ.
    Mismatch,
    /// Fewer bytes are buffered than the literal is long.
    Short,
}

/// Circular FIFO of bytes.
pub struct RingBuffer {
    buf: Box<[u8]>,
    /// Physical index of the first unread byte.
    head: usize,
    /// Number of buffered (unread) bytes.
    len: usize,
}

impl RingBuffer {
    /// Create an empty buffer holding at most `capacity` bytes (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; capacity.max(1)].into_boxed_slice(),
            head: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Number of buffered bytes not yet consumed.
    pub fn used(&self) -> usize {
        self.len
    }

    /// Remaining free capacity.
    pub fn free(&self) -> usize {
        self.buf.len() - self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Physical offset of the first unread byte.
    pub(crate) fn read_pos(&self) -> usize {
        self.head
    }

    fn write_pos(&self) -> usize {
        (self.head + self.len) % self.buf.len()
    }

    /// Free space as up to two slices, in write order.
    ///
    /// The second slice is empty unless the free region wraps. Both are
    /// empty when the buffer is full.
    pub fn writable(&mut self) -> (&mut [u8], &mut [u8]) {
        let cap = self.buf.len();
        if self.len == cap {
            return (Default::default(), Default::default());
        }
        let head = self.head;
        let write = self.write_pos();
        if head + self.len < cap {
            // Buffered data is contiguous, so free space runs to the end
            // of storage and resumes at index 0.
            let (front, back) = self.buf.split_at_mut(write);
            (back, &mut front[..head])
        } else {
            (&mut self.buf[write..head], Default::default())
        }
    }

    /// Free space as vectored-read targets; the returned count says how
    /// many entries of the array are meaningful (0 when full).
    pub fn writable_iov(&mut self) -> ([IoSliceMut<'_>; 2], usize) {
        let (first, second) = self.writable();
        let count = usize::from(!first.is_empty()) + usize::from(!second.is_empty());
        ([IoSliceMut::new(first), IoSliceMut::new(second)], count)
    }

    /// Account for `n` bytes written into the slices from [`writable`](Self::writable).
    pub fn commit_write(&mut self, n: usize) {
        debug_assert!(n <= self.free(), "commit of {n} bytes exceeds free space");
        self.len += n.min(self.free());
    }

    /// Copy as much of `data` as fits and return the number of bytes stored.
    pub fn write(&mut self, data: &[u8]) -> usize {
        let (first, second) = self.writable();
        let a = data.len().min(first.len());
        first[..a].copy_from_slice(&data[..a]);
        let b = (data.len() - a).min(second.len());
        second[..b].copy_from_slice(&data[a..a + b]);
        self.commit_write(a + b);
        a + b
    }

    /// Compare the start of the buffered region with `literal`.
    pub fn prefix(&self, literal: &[u8]) -> Prefix {
        if self.len < literal.len() {
            Prefix::Short
        } else if self.readable(literal.len()).starts_with(literal) {
            Prefix::Match
        } else {
            Prefix::Mismatch
        }
    }

    /// `true` if the buffered region starts with the whole of `literal`.
    pub fn starts_with(&self, literal: &[u8]) -> bool {
        self.prefix(literal) == Prefix::Match
    }

    /// Offset of the first occurrence of `needle` in the buffered region.
    pub fn find(&self, needle: &[u8]) -> Option<usize> {
        self.readable(self.len).find(needle)
    }

    /// Offset of the first occurrence of `byte` in the buffered region.
    pub fn find_byte(&self, byte: u8) -> Option<usize> {
        self.readable(self.len).find_byte(byte)
    }

    /// The first `n` buffered bytes (clamped to [`used`](Self::used)) as 1-2 spans.
    pub fn readable(&self, n: usize) -> FrameSpans<'_> {
        let n = n.min(self.len);
        let first_len = n.min(self.buf.len() - self.head);
        FrameSpans::new(
            &self.buf[self.head..self.head + first_len],
            &self.buf[..n - first_len],
        )
    }

    /// Drop the first `n` buffered bytes (clamped to [`used`](Self::used)).
    pub fn consume(&mut self, n: usize) {
        debug_assert!(n <= self.len, "consume of {n} bytes exceeds {} buffered", self.len);
        let n = n.min(self.len);
        self.head = (self.head + n) % self.buf.len();
        self.len -= n;
    }

    /// Mutable view of `n` bytes starting at physical offset `start`.
    ///
    /// Borrowed straight from storage when contiguous; gathered into
    /// `scratch` when the run straddles the end of storage. The bytes stay
    /// valid after [`consume`](Self::consume) until the next write.
    pub(crate) fn frame_mut<'a>(
        &'a mut self,
        start: usize,
        n: usize,
        scratch: &'a mut Vec<u8>,
    ) -> &'a mut [u8] {
        let cap = self.buf.len();
        let n = n.min(cap);
        if start + n <= cap {
            &mut self.buf[start..start + n]
        } else {
            scratch.clear();
            scratch.extend_from_slice(&self.buf[start..]);
            scratch.extend_from_slice(&self.buf[..n - (cap - start)]);
            scratch.as_mut_slice()
        }
    }
}

impl std::fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.buf.len())
            .field("head", &self.head)
            .field("used", &self.len)
            .finish()
    }
}
