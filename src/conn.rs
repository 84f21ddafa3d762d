//! Receive side of a modem data channel.
//!
//! Handles readiness waits, vectored reads into the ring buffer, frame
//! delimiting and classification. No call or SMS logic; callers dispatch
//! on the returned [`Response`].

use std::fmt;
use std::io::{self, IoSliceMut, Read};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use tracing::{Level, Span, debug, debug_span, error, trace, warn};

use crate::config::ConnConfig;
use crate::error::WireError;
use crate::frame::FrameDelimiter;
use crate::protocol::{self, Notification, ResponseKind};
use crate::ring::RingBuffer;

/// Smallest wait handed to the OS; a zero read timeout is rejected.
const MIN_WAIT: Duration = Duration::from_millis(1);

/// Byte source a [`Connection`] reads from.
pub trait Channel {
    /// Block until the channel is readable, has failed, or `timeout` passes.
    ///
    /// Returns `Ok(false)` on timeout. A failed channel reports `Ok(true)`
    /// (or an error) so the following read surfaces the failure.
    fn wait_readable(&mut self, timeout: Duration) -> io::Result<bool>;

    /// One vectored read.
    fn read_vectored(&mut self, bufs: &mut [IoSliceMut<'_>]) -> io::Result<usize>;
}

impl Channel for TcpStream {
    fn wait_readable(&mut self, timeout: Duration) -> io::Result<bool> {
        self.set_read_timeout(Some(timeout.max(MIN_WAIT)))?;
        let mut byte = [0u8; 1];
        match self.peek(&mut byte) {
            // Zero bytes is end-of-stream, which the read reports.
            Ok(_) => Ok(true),
            Err(e) if is_retryable(&e) => Ok(false),
            Err(_) => Ok(true),
        }
    }

    fn read_vectored(&mut self, bufs: &mut [IoSliceMut<'_>]) -> io::Result<usize> {
        Read::read_vectored(self, bufs)
    }
}

/// Errors that mean "nothing yet, wait again".
fn is_retryable(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
    )
}

/// Outcome of [`Connection::wait`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    Timeout,
}

/// Non-fatal outcome of [`Connection::read`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// This many bytes were appended to the ring buffer.
    Progress(usize),
    /// The read was interrupted or would block; wait again.
    NoProgress,
}

/// Errors from connection operations.
#[derive(Debug)]
pub enum ConnError {
    /// Channel I/O error other than a retryable one.
    Io(io::Error),
    /// Field extraction error.
    Wire(WireError),
    /// `recv_timeout` exceeded without a complete frame.
    Timeout { timeout: Duration },
    /// Channel closed by the device.
    Disconnected,
    /// No free space in the ring buffer when a read was due.
    Overflow { capacity: usize },
}

impl ConnError {
    /// `true` if the connection must be torn down.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ConnError::Io(_) | ConnError::Disconnected | ConnError::Overflow { .. })
    }
}

impl fmt::Display for ConnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnError::Io(e) => write!(f, "I/O error: {e}"),
            ConnError::Wire(e) => write!(f, "wire error: {e}"),
            ConnError::Timeout { timeout } => {
                write!(f, "recv timed out after {timeout:?}")
            }
            ConnError::Disconnected => write!(f, "connection closed by device"),
            ConnError::Overflow { capacity } => {
                write!(f, "receive buffer overflow ({capacity} bytes)")
            }
        }
    }
}

impl std::error::Error for ConnError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConnError::Io(e) => Some(e),
            ConnError::Wire(e) => Some(e),
            ConnError::Timeout { .. } | ConnError::Disconnected | ConnError::Overflow { .. } => {
                None
            }
        }
    }
}

impl From<io::Error> for ConnError {
    fn from(e: io::Error) -> Self {
        ConnError::Io(e)
    }
}

impl From<WireError> for ConnError {
    fn from(e: WireError) -> Self {
        ConnError::Wire(e)
    }
}

/// A classified frame, borrowed from the connection's receive buffer.
///
/// Holding a `Response` keeps the connection borrowed, so the bytes cannot
/// be overwritten by the next read while they are in use.
pub struct Response<'a> {
    kind: ResponseKind,
    consumed: usize,
    bytes: &'a mut [u8],
    /// The connection's span, so decode diagnostics carry its `device`.
    span: Span,
}

impl<'a> Response<'a> {
    pub fn kind(&self) -> ResponseKind {
        self.kind
    }

    /// Buffered bytes this frame accounted for (frame plus owned trailer).
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Frame bytes, starting at the response prefix.
    pub fn bytes(&self) -> &[u8] {
        &*self.bytes
    }

    /// Frame bytes for in-place extraction.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        self.bytes
    }

    /// Extract this frame's fields.
    pub fn decode(self) -> Result<Notification<'a>, WireError> {
        let Response { kind, bytes, span, .. } = self;
        span.in_scope(|| Notification::decode(kind, bytes))
    }
}

impl fmt::Debug for Response<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // "+CLIP [19B/20B | +CLIP: \"123\",129\r]"
        write!(f, "{} [{}B/{}B | ", self.kind, self.bytes.len(), self.consumed)?;
        for &b in self.bytes.iter() {
            write!(f, "{}", std::ascii::escape_default(b))?;
        }
        write!(f, "]")
    }
}

/// One modem data channel: a byte source, its receive buffer, and the
/// frame delimiter state.
///
/// Synchronous, single-threaded. Callers drive timing, either with
/// [`recv_timeout`](Self::recv_timeout) or by interleaving
/// [`wait`](Self::wait), [`read`](Self::read) and
/// [`poll_frame`](Self::poll_frame) with their own duties.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use atwire::{ConnError, Connection, Notification};
///
/// let mut conn = Connection::connect("127.0.0.1:7000")?;
/// loop {
///     match conn.recv_timeout(Duration::from_secs(1)) {
///         Ok(resp) => match resp.decode() {
///             Ok(Notification::CallerId(number)) => println!("call from {number}"),
///             Ok(other) => println!("{:?}", other.kind()),
///             Err(e) => eprintln!("{e}"),
///         },
///         Err(ConnError::Timeout { .. }) => { /* run timers, send commands */ }
///         Err(e) => return Err(e),
///     }
/// }
/// # Ok::<(), ConnError>(())
/// ```
pub struct Connection<C = TcpStream> {
    channel: C,
    ring: RingBuffer,
    delimiter: FrameDelimiter,
    /// Linear copy of frames that wrap around the end of the ring.
    scratch: Vec<u8>,
    name: String,
    span: Span,
}

impl Connection<TcpStream> {
    /// Connect to a modem data port with the system default timeout.
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self, ConnError> {
        let stream = TcpStream::connect(addr)?;
        Ok(Self::from_stream(stream))
    }

    /// Connect with an explicit timeout.
    pub fn connect_timeout(addr: &SocketAddr, timeout: Duration) -> Result<Self, ConnError> {
        let stream = TcpStream::connect_timeout(addr, timeout)?;
        Ok(Self::from_stream(stream))
    }

    fn from_stream(stream: TcpStream) -> Self {
        // Responses are short lines; disable Nagle.
        let _ = stream.set_nodelay(true);
        Self::new(stream)
    }
}

impl<C: Channel> Connection<C> {
    /// Wrap `channel` with default settings.
    pub fn new(channel: C) -> Self {
        Self::with_config(channel, ConnConfig::default())
    }

    pub fn with_config(channel: C, config: ConnConfig) -> Self {
        let span = debug_span!("atwire", device = %config.name);
        Self {
            channel,
            ring: RingBuffer::new(config.buffer_capacity),
            delimiter: FrameDelimiter::new(),
            scratch: Vec::new(),
            name: config.name,
            span,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The receive buffer, for inspection.
    pub fn ring(&self) -> &RingBuffer {
        &self.ring
    }

    /// `true` while a frame has been opened but not yet closed.
    pub fn awaiting_continuation(&self) -> bool {
        self.delimiter.awaiting_continuation()
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// The channel, e.g. for writing commands.
    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    pub fn into_inner(self) -> C {
        self.channel
    }

    /// Wait until the channel is readable or `timeout` runs out.
    ///
    /// `timeout` is reduced by the time spent waiting, so repeated calls
    /// share one budget.
    pub fn wait(&mut self, timeout: &mut Duration) -> Readiness {
        let _enter = self.span.enter();
        let started = Instant::now();
        let ready = match self.channel.wait_readable(*timeout) {
            Ok(ready) => ready,
            Err(e) => {
                debug!(error = %e, "readiness wait failed, deferring to read");
                true
            }
        };
        *timeout = timeout.saturating_sub(started.elapsed());
        if ready { Readiness::Ready } else { Readiness::Timeout }
    }

    /// Perform one read into the free space of the receive buffer.
    ///
    /// A full buffer, end-of-stream and non-retryable read errors are fatal.
    pub fn read(&mut self) -> Result<ReadOutcome, ConnError> {
        let _enter = self.span.enter();
        let capacity = self.ring.capacity();
        let (mut iov, count) = self.ring.writable_iov();
        if count == 0 {
            error!(capacity, "receive buffer overflow");
            return Err(ConnError::Overflow { capacity });
        }

        match self.channel.read_vectored(&mut iov[..count]) {
            Ok(0) => {
                warn!("end of stream");
                Err(ConnError::Disconnected)
            }
            Ok(n) => {
                self.ring.commit_write(n);
                self.trace_buffered(n);
                Ok(ReadOutcome::Progress(n))
            }
            Err(e) if is_retryable(&e) => {
                debug!(error = %e, "read would block");
                Ok(ReadOutcome::NoProgress)
            }
            Err(e) => {
                error!(error = %e, "read failed");
                Err(ConnError::Io(e))
            }
        }
    }

    /// Delimit and classify the next buffered frame, consuming it.
    ///
    /// `None` means no complete frame is buffered yet; wait and read again.
    pub fn poll_frame(&mut self) -> Option<Response<'_>> {
        let len = self.delimit()?;
        Some(self.take_frame(len))
    }

    /// Poll, wait and read until a frame is available or `timeout` passes.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Result<Response<'_>, ConnError> {
        let mut remaining = timeout;
        loop {
            if let Some(len) = self.delimit() {
                return Ok(self.take_frame(len));
            }
            if remaining.is_zero() {
                return Err(ConnError::Timeout { timeout });
            }
            if self.wait(&mut remaining) == Readiness::Ready {
                self.read()?;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn delimit(&mut self) -> Option<usize> {
        let _enter = self.span.enter();
        self.delimiter.delimit(&mut self.ring)
    }

    fn take_frame(&mut self, len: usize) -> Response<'_> {
        let _enter = self.span.enter();
        let classified = protocol::classify(&self.ring.readable(len));
        trace!(
            kind = %classified.kind,
            len,
            consumed = classified.consumed,
            "received response"
        );
        let start = self.ring.read_pos();
        self.ring.consume(classified.consumed);
        Response {
            kind: classified.kind,
            consumed: classified.consumed,
            bytes: self.ring.frame_mut(start, len, &mut self.scratch),
            span: self.span.clone(),
        }
    }

    fn trace_buffered(&self, received: usize) {
        if !tracing::enabled!(Level::TRACE) {
            return;
        }
        let spans = self.ring.readable(self.ring.used());
        trace!(
            received,
            free = self.ring.free(),
            base1 = self.ring.read_pos(),
            len1 = spans.head().len(),
            len2 = spans.tail().len(),
            buffered = ?spans,
            "receive buffer"
        );
    }
}

impl<C> fmt::Debug for Connection<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("name", &self.name)
            .field("ring", &self.ring)
            .field("delimiter", &self.delimiter)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use rstest::rstest;

    use super::*;
    use crate::protocol::{Notification, PinState, SignalQuality};

    /// One scripted result of `read_vectored`.
    enum Step {
        Data(Vec<u8>),
        Fail(io::ErrorKind),
        Eof,
    }

    /// A [`Channel`] that replays a fixed script.
    #[derive(Default)]
    struct Scripted {
        steps: VecDeque<Step>,
        reads: usize,
        /// How long an empty script blocks in `wait_readable`, capped at the
        /// timeout.
        idle: Duration,
    }

    impl Scripted {
        fn data(mut self, bytes: &[u8]) -> Self {
            self.steps.push_back(Step::Data(bytes.to_vec()));
            self
        }

        fn fail(mut self, kind: io::ErrorKind) -> Self {
            self.steps.push_back(Step::Fail(kind));
            self
        }

        fn eof(mut self) -> Self {
            self.steps.push_back(Step::Eof);
            self
        }

        fn idle(mut self, idle: Duration) -> Self {
            self.idle = idle;
            self
        }
    }

    impl Channel for Scripted {
        fn wait_readable(&mut self, timeout: Duration) -> io::Result<bool> {
            if !self.steps.is_empty() {
                return Ok(true);
            }
            std::thread::sleep(self.idle.min(timeout));
            Ok(false)
        }

        fn read_vectored(&mut self, bufs: &mut [IoSliceMut<'_>]) -> io::Result<usize> {
            self.reads += 1;
            match self.steps.pop_front() {
                None => Err(io::ErrorKind::WouldBlock.into()),
                Some(Step::Eof) => Ok(0),
                Some(Step::Fail(kind)) => Err(kind.into()),
                Some(Step::Data(data)) => {
                    let mut written = 0;
                    for buf in bufs.iter_mut() {
                        let n = buf.len().min(data.len() - written);
                        buf[..n].copy_from_slice(&data[written..written + n]);
                        written += n;
                    }
                    if written < data.len() {
                        self.steps.push_front(Step::Data(data[written..].to_vec()));
                    }
                    Ok(written)
                }
            }
        }
    }

    fn conn(script: Scripted, capacity: usize) -> Connection<Scripted> {
        Connection::with_config(script, ConnConfig::default().with_capacity(capacity))
    }

    /// Log sink shared between a test and its subscriber.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` with every record formatted into the returned string.
    fn capture_logs(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let sink = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::TRACE)
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        captured.text()
    }

    #[test]
    fn read_then_poll() {
        let mut c = conn(Scripted::default().data(b"\r\nOK\r\n"), 64);
        assert_eq!(c.read().unwrap(), ReadOutcome::Progress(6));
        let resp = c.poll_frame().unwrap();
        assert_eq!(resp.kind(), ResponseKind::Ok);
        assert_eq!(resp.bytes(), b"OK\r");
        assert_eq!(resp.consumed(), 4);
        assert!(c.poll_frame().is_none());
        assert!(c.ring().is_empty());
    }

    #[test]
    fn frames_split_across_reads() {
        let mut c = conn(Scripted::default().data(b"\r\n+CS").data(b"Q: 21,99\r").data(b"\n"), 64);
        c.read().unwrap();
        assert!(c.poll_frame().is_none());
        c.read().unwrap();
        assert!(c.poll_frame().is_none());
        assert!(c.awaiting_continuation());
        c.read().unwrap();
        let resp = c.poll_frame().unwrap();
        assert_eq!(resp.kind(), ResponseKind::Csq);
        assert_eq!(
            resp.decode().unwrap(),
            Notification::SignalQuality(SignalQuality { rssi: 21, ber: 99 })
        );
    }

    #[test]
    fn several_frames_in_one_read() {
        let mut c = conn(
            Scripted::default().data(b"\r\nRING\r\n\r\n+CLIP: \"5551234\",129,,,,0\r\n\r\n^RSSI:9\r\n"),
            128,
        );
        c.read().unwrap();

        assert_eq!(c.poll_frame().unwrap().kind(), ResponseKind::Ring);
        let resp = c.poll_frame().unwrap();
        assert_eq!(resp.decode().unwrap(), Notification::CallerId("5551234".into()));
        assert_eq!(c.poll_frame().unwrap().decode().unwrap(), Notification::Rssi(9));
        assert!(c.poll_frame().is_none());
    }

    #[test]
    fn sms_prompt_and_stored_message() {
        let mut c = conn(
            Scripted::default()
                .data(b"\r\n> ")
                .data(b"\r\n+CMGR: 0,\"+15551234567\",,\"24/01/01,12:00:00\"\r\nHello\r\n\r\nOK\r\n"),
            256,
        );
        c.read().unwrap();
        let resp = c.poll_frame().unwrap();
        assert_eq!((resp.kind(), resp.consumed()), (ResponseKind::SmsPrompt, 2));

        c.read().unwrap();
        match c.poll_frame().unwrap().decode().unwrap() {
            Notification::Sms(sms) => {
                assert_eq!(sms.sender, "+15551234567");
                assert_eq!(sms.text, "Hello");
            }
            other => panic!("expected Sms, got {other:?}"),
        }
        // Trailer consumed with the message.
        assert!(c.ring().is_empty());
    }

    #[test]
    fn frame_wrapping_ring_end() {
        // 16-byte ring; the second frame straddles the wrap point.
        let mut c = conn(Scripted::default().data(b"\r\nOK\r\n").data(b"\r\n+CLIP: \"42\"\r\n"), 16);
        c.read().unwrap();
        assert_eq!(c.poll_frame().unwrap().kind(), ResponseKind::Ok);
        c.read().unwrap();
        let resp = c.poll_frame().unwrap();
        assert_eq!(resp.bytes(), b"+CLIP: \"42\"\r");
        assert_eq!(resp.decode().unwrap(), Notification::CallerId("42".into()));
    }

    #[test]
    fn overflow_is_fatal() {
        let mut c = conn(Scripted::default().data(b"\r\n+CSQ: 12,99 no terminator"), 8);
        assert_eq!(c.read().unwrap(), ReadOutcome::Progress(8));
        assert!(c.poll_frame().is_none());
        // The opening CRLF was consumed, leaving room for two more bytes.
        assert_eq!(c.read().unwrap(), ReadOutcome::Progress(2));
        assert!(c.poll_frame().is_none());
        assert_eq!(c.ring().free(), 0);
        let err = c.read().unwrap_err();
        assert!(matches!(err, ConnError::Overflow { capacity: 8 }));
        assert!(err.is_fatal());
    }

    #[test]
    fn end_of_stream_is_fatal() {
        let mut c = conn(Scripted::default().eof(), 16);
        let err = c.read().unwrap_err();
        assert!(matches!(err, ConnError::Disconnected));
        assert!(err.is_fatal());
    }

    #[test]
    fn retryable_errors_make_no_progress() {
        let mut c = conn(
            Scripted::default()
                .fail(io::ErrorKind::WouldBlock)
                .fail(io::ErrorKind::Interrupted)
                .data(b"\r\nBUSY\r\n"),
            16,
        );
        assert_eq!(c.read().unwrap(), ReadOutcome::NoProgress);
        assert_eq!(c.read().unwrap(), ReadOutcome::NoProgress);
        assert_eq!(c.read().unwrap(), ReadOutcome::Progress(8));
        assert_eq!(c.poll_frame().unwrap().kind(), ResponseKind::Busy);
    }

    #[test]
    fn other_read_errors_are_fatal() {
        let mut c = conn(Scripted::default().fail(io::ErrorKind::ConnectionReset), 16);
        let err = c.read().unwrap_err();
        assert!(matches!(err, ConnError::Io(ref e) if e.kind() == io::ErrorKind::ConnectionReset));
        assert!(err.is_fatal());
    }

    #[test]
    fn wait_reports_timeout_and_spends_budget() {
        let mut c = conn(Scripted::default().idle(Duration::from_millis(20)), 16);
        let mut budget = Duration::from_millis(200);
        assert_eq!(c.wait(&mut budget), Readiness::Timeout);
        assert!(budget <= Duration::from_millis(180), "{budget:?}");
        assert!(budget >= Duration::from_millis(100), "{budget:?}");

        // A wait never overdraws: the last slice of budget runs out at zero.
        let mut budget = Duration::from_millis(5);
        assert_eq!(c.wait(&mut budget), Readiness::Timeout);
        assert_eq!(budget, Duration::ZERO);

        let mut c = conn(Scripted::default().data(b"x"), 16);
        let mut budget = Duration::from_millis(50);
        assert_eq!(c.wait(&mut budget), Readiness::Ready);
    }

    #[test]
    fn recv_timeout_reads_until_frame() {
        let mut c = conn(Scripted::default().data(b"\r\n^MODE:").data(b"5,4\r\n"), 32);
        let resp = c.recv_timeout(Duration::from_millis(100)).unwrap();
        assert_eq!(resp.kind(), ResponseKind::Mode);
        assert_eq!(c.channel().reads, 2);
    }

    #[test]
    fn recv_timeout_expires() {
        let mut c = conn(Scripted::default(), 32);
        let err = c.recv_timeout(Duration::ZERO).unwrap_err();
        assert!(matches!(err, ConnError::Timeout { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn unknown_response_is_consumed() {
        let mut c = conn(Scripted::default().data(b"\r\n+CGMI: huawei\r\n\r\nOK\r\n"), 64);
        c.read().unwrap();
        let resp = c.poll_frame().unwrap();
        assert_eq!(resp.kind(), ResponseKind::Unknown);
        assert_eq!(resp.decode().unwrap(), Notification::Plain(ResponseKind::Unknown));
        assert_eq!(c.poll_frame().unwrap().kind(), ResponseKind::Ok);
    }

    #[rstest]
    #[case(b"\r\n+CNUM: \"Me\",\"+1555\",129\r\n\r\nOK\r\n")]
    #[case(b"\r\nERROR+CNUM: \"Me\",\"+1555\",129\r\n\r\nOK\r\n")]
    fn subscriber_number_leaves_ok_frame(#[case] wire: &[u8]) {
        let mut c = conn(Scripted::default().data(wire), 64);
        c.read().unwrap();

        let resp = c.poll_frame().unwrap();
        assert_eq!(resp.kind(), ResponseKind::Cnum);
        assert_eq!(resp.consumed(), resp.bytes().len() + 1);
        assert_eq!(resp.decode().unwrap(), Notification::SubscriberNumber("+1555".into()));

        let resp = c.poll_frame().unwrap();
        assert_eq!(resp.kind(), ResponseKind::Ok);
        assert_eq!(resp.bytes(), b"OK\r");
        assert!(c.poll_frame().is_none());
        assert!(c.ring().is_empty());
    }

    #[test]
    fn decode_logs_carry_device() {
        let logs = capture_logs(|| {
            let config = ConnConfig::default().with_name("dongle7").with_capacity(64);
            let script = Scripted::default().data(b"\r\n+CPIN: SIM PIN\r\n\r\n+CMTI: \"SM\"\r\n");
            let mut c = Connection::with_config(script, config);
            c.read().unwrap();
            let pin = c.poll_frame().unwrap().decode().unwrap();
            assert_eq!(pin, Notification::Pin(PinState::PinRequired));
            assert!(c.poll_frame().unwrap().decode().is_err());
        });

        for message in ["SIM needs PIN code", "malformed SMS notification"] {
            let line = logs
                .lines()
                .find(|line| line.contains(message))
                .unwrap_or_else(|| panic!("no {message:?} record in:\n{logs}"));
            assert!(line.contains("device=dongle7"), "{line}");
        }
    }

    #[test]
    fn debug_output() {
        let mut c = conn(Scripted::default().data(b"\r\nOK\r\n"), 16);
        c.read().unwrap();
        let resp = c.poll_frame().unwrap();
        assert_eq!(format!("{resp:?}"), "OK [3B/4B | OK\\r]");
    }
}
