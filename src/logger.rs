//! Records the invocation/response/linearization timestamps a benchmark
//! run produces, in the line format the [`analyzer`](crate::analyzer)
//! expects to parse back: `<type> <value> <start> <lin_time> <end>`.
//!
//! Enabling this turns every `put`/`get` call into an extra atomic
//! fetch-add plus a mutex-guarded push, so it is opt-in (the `--log_operations`
//! CLI flag) rather than always-on.

use std::fmt::Write as _;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

const INSERT: u8 = 0;
const REMOVE: u8 = 1;

/// A single recorded invocation/response pair, ready to be formatted as one
/// log line.
struct Record {
    op_type: u8,
    value: u64,
    start: u64,
    lin_time: u64,
    end: u64,
}

/// Accumulates [`Record`]s from any number of threads and renders them as
/// the analyzer's log format.
pub struct OperationLogger {
    epoch: Instant,
    next_id: AtomicU64,
    records: Mutex<Vec<Record>>,
}

impl OperationLogger {
    pub fn new() -> Self {
        OperationLogger {
            epoch: Instant::now(),
            next_id: AtomicU64::new(0),
            records: Mutex::new(Vec::new()),
        }
    }

    fn now_nanos(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    /// Begins timing one operation invocation; returns a token to pass to
    /// [`Self::finish`] once the call returns.
    pub fn start(&self) -> InFlight {
        InFlight {
            start: self.now_nanos(),
        }
    }

    /// Records the response. `value == 0` on a REMOVE denotes a null-return,
    /// matching the analyzer's log convention.
    pub fn finish_insert(&self, started: InFlight, value: u64) {
        self.finish(started, INSERT, value);
    }

    pub fn finish_remove(&self, started: InFlight, value: Option<u64>) {
        self.finish(started, REMOVE, value.unwrap_or(0));
    }

    /// Records the response with an explicit linearization point, for
    /// callers (e.g. the DDS) that can identify the instant a put/get
    /// actually took effect rather than just when it returned.
    pub fn finish_at(&self, started: InFlight, op_type: OpKind, value: u64, lin_time: u64) {
        let end = self.now_nanos();
        let raw_type = match op_type {
            OpKind::Insert => INSERT,
            OpKind::Remove => REMOVE,
        };
        self.next_id.fetch_add(1, Ordering::Relaxed);
        self.records.lock().unwrap().push(Record {
            op_type: raw_type,
            value,
            start: started.start,
            lin_time,
            end,
        });
    }

    fn finish(&self, started: InFlight, op_type: u8, value: u64) {
        let end = self.now_nanos();
        self.next_id.fetch_add(1, Ordering::Relaxed);
        self.records.lock().unwrap().push(Record {
            op_type,
            value,
            start: started.start,
            lin_time: end,
            end,
        });
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Renders every recorded operation as the analyzer's log format, one
    /// line per operation, in the order they were recorded.
    pub fn render(&self) -> String {
        let records = self.records.lock().unwrap();
        let mut out = String::new();
        for r in records.iter() {
            let _ = writeln!(out, "{} {} {} {} {}", r.op_type, r.value, r.start, r.lin_time, r.end);
        }
        out
    }

    pub fn write_to<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(self.render().as_bytes())
    }
}

impl Default for OperationLogger {
    fn default() -> Self {
        Self::new()
    }
}

/// An in-progress operation's invocation timestamp, returned by
/// [`OperationLogger::start`].
pub struct InFlight {
    start: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Insert,
    Remove,
}
