//! Fan-out writer
//!
//! Combines the file and console destinations into one writer for
//! tracing-subscriber. Each record goes to every destination; a failing
//! destination is reported once and never stops delivery to the others.
//!
//! Every destination is drained by its own writer thread through a bounded,
//! lossy queue, so a stalled disk or pipe drops records instead of blocking
//! the threads that log.

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing_appender::non_blocking::{NonBlocking, NonBlockingBuilder, WorkerGuard};
use tracing_subscriber::fmt::MakeWriter;

/// Records queued per destination before new ones are dropped
pub const SINK_BUFFERED_LINES: usize = 16_384;

/// Failure counter of one destination, shared with its writer thread
#[derive(Debug, Clone)]
struct FailureLog {
    name: Arc<str>,
    count: Arc<AtomicUsize>,
}

impl FailureLog {
    fn record(&self, e: &io::Error) {
        // Report the first failure only, later ones are just counted
        if self.count.fetch_add(1, Ordering::Relaxed) == 0 {
            eprintln!(
                "log destination {} failed, further errors suppressed: {}",
                self.name, e
            );
        }
    }
}

/// Runs on the writer thread: records I/O errors and swallows them
struct Recorded<W> {
    inner: W,
    failures: FailureLog,
}

impl<W: Write> Write for Recorded<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Err(e) = self.inner.write_all(buf) {
            self.failures.record(&e);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Err(e) = self.inner.flush() {
            self.failures.record(&e);
        }
        Ok(())
    }
}

/// One named destination of a [`FanoutWriter`]
///
/// Clones share the same writer thread; it is flushed and stopped once the
/// last clone is dropped.
#[derive(Clone)]
pub struct Sink {
    writer: NonBlocking,
    failures: FailureLog,
    _worker: Arc<WorkerGuard>,
}

impl Sink {
    /// Create a sink draining into `writer` on a background thread
    pub fn new(name: &str, writer: impl Write + Send + 'static) -> Self {
        Self::with_capacity(name, writer, SINK_BUFFERED_LINES)
    }

    /// Create a sink that queues at most `lines` records before dropping
    pub fn with_capacity(name: &str, writer: impl Write + Send + 'static, lines: usize) -> Self {
        let failures = FailureLog {
            name: Arc::from(name),
            count: Arc::new(AtomicUsize::new(0)),
        };
        let recorded = Recorded {
            inner: writer,
            failures: failures.clone(),
        };
        let (writer, guard) = NonBlockingBuilder::default()
            .lossy(true)
            .buffered_lines_limit(lines)
            .thread_name(&format!("dnswatch-log-{}", name))
            .finish(recorded);

        Self {
            writer,
            failures,
            _worker: Arc::new(guard),
        }
    }

    /// Console sink writing to stdout
    pub fn stdout() -> Self {
        Self::new("console", io::stdout())
    }

    /// Name shown when this destination fails
    pub fn name(&self) -> &str {
        &self.failures.name
    }

    /// Number of writes that failed on this sink so far
    pub fn failures(&self) -> usize {
        self.failures.count.load(Ordering::Relaxed)
    }

    /// Number of records dropped because the queue was full
    pub fn dropped(&self) -> usize {
        self.writer.error_counter().dropped_lines()
    }

    fn deliver(&self, buf: &[u8]) {
        // Only fails once the writer thread is gone
        let mut writer = self.writer.clone();
        if let Err(e) = writer.write_all(buf) {
            self.failures.record(&e);
        }
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink")
            .field("name", &self.name())
            .field("failures", &self.failures())
            .field("dropped", &self.dropped())
            .finish()
    }
}

/// A single logical writer over a fixed list of sinks
#[derive(Debug, Clone)]
pub struct FanoutWriter {
    sinks: Arc<[Sink]>,
}

impl FanoutWriter {
    /// Deliver every record to `sinks`, in order
    pub fn new(sinks: Vec<Sink>) -> Self {
        Self {
            sinks: sinks.into(),
        }
    }

    /// Sinks in delivery order
    pub fn sinks(&self) -> &[Sink] {
        &self.sinks
    }
}

impl Write for FanoutWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for sink in self.sinks.iter() {
            sink.deliver(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for FanoutWriter {
    type Writer = FanoutWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
