//! Buffered diagnostics. Debug lines are held in memory and only written
//! out when a command fails (or immediately at -v), keeping stdout clean
//! for machine-readable output.

use std::sync::{Arc, Mutex};

/// A cheaply cloneable debug sink. All clones share one buffer, guarded by
/// a mutex so concurrent callers interleave whole lines.
#[derive(Clone)]
pub struct Diag {
    inner: Option<Arc<Inner>>,
}

struct Inner {
    verbose: u8,
    buf: Mutex<Vec<String>>,
}

impl Diag {
    pub fn new(verbose: u8) -> Self {
        Self {
            inner: Some(Arc::new(Inner {
                verbose,
                buf: Mutex::new(Vec::new()),
            })),
        }
    }

    /// A sink that drops everything.
    pub fn silent() -> Self {
        Self { inner: None }
    }

    /// Record a debug line. Printed to stderr immediately at -v, buffered
    /// otherwise.
    pub fn debug(&self, msg: impl Into<String>) {
        let Some(inner) = &self.inner else { return };
        let msg = msg.into();
        if inner.verbose > 0 {
            eprintln!("[debug] {msg}");
        } else if let Ok(mut buf) = inner.buf.lock() {
            buf.push(msg);
        }
    }

    /// Write out any buffered debug lines. Called before a non-zero exit so
    /// failures carry their context.
    pub fn flush_debug(&self) {
        let Some(inner) = &self.inner else { return };
        if let Ok(buf) = inner.buf.lock() {
            for line in buf.iter() {
                eprintln!("[debug] {line}");
            }
        }
    }
}
