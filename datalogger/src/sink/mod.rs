/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! The single exclusive-access persistent log shared by every logging task.
//!
//! # Locking discipline
//!
//! * The lock is taken inside [`SharedSink::write`] and released when the
//!   guard leaves scope, on every path: success, unavailable sink, partial
//!   write, I/O error.  No caller ever sees the guard, so no task can carry
//!   it across a tick boundary.
//! * One `write` call appends one complete line with a single `write_all`
//!   under the lock, so two writers never interleave characters.
//! * The lock is not reentrant.  Nothing reachable from inside the critical
//!   section calls back into the sink.
//!
//! The runtime is single-threaded today, so the lock never contends; it
//! exists so the sink stays correct if tasks ever run on more than one
//! thread.
//!
//! # Degraded mode
//!
//! | Situation | Behaviour |
//! |---|---|
//! | open failed at boot | sink stays unavailable; every `write` is a no-op returning `Unavailable` |
//! | one append failed | record dropped, `warn!` logged, sink stays open for the next write |

pub mod record;

pub use record::{Record, RecordTag, HEADER};

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::{debug, error, info, warn};

// ── Errors ────────────────────────────────────────────────────────────────────

/// The sink could not be opened at boot.
#[derive(Debug, Error)]
pub enum SinkInitError {
    #[error("cannot open log file '{}'", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write header to log file")]
    Header {
        #[source]
        source: io::Error,
    },
}

/// One append did not reach storage.
#[derive(Debug, Error)]
pub enum SinkWriteError {
    /// The sink was never opened (or failed to open).
    #[error("log sink is unavailable")]
    Unavailable,

    /// The underlying storage rejected the append or the sync.
    #[error("failed to append record to log")]
    Io(#[from] io::Error),
}

// ── SharedSink ────────────────────────────────────────────────────────────────

struct SinkState {
    writer: Option<Box<dyn Write + Send>>,
    last_write_ok: bool,
}

/// Exclusive-access, append-only log target.
///
/// Created once at startup, then borrowed by every task for the duration of
/// one invocation.
pub struct SharedSink {
    state: Mutex<SinkState>,
}

impl SharedSink {
    /// A sink that was never opened: every write is a no-op.
    pub fn unavailable() -> Self {
        Self {
            state: Mutex::new(SinkState {
                writer: None,
                last_write_ok: false,
            }),
        }
    }

    /// Open (or create) `path` for appending.
    ///
    /// The header line is written iff the file is empty at open, so
    /// re-opening an existing log never duplicates it.
    pub fn open(path: &Path) -> Result<Self, SinkInitError> {
        let open_err = |source| SinkInitError::Open {
            path: path.to_path_buf(),
            source,
        };
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(open_err)?;
        let len = file.metadata().map_err(open_err)?.len();

        let sink = Self::from_writer(file, len == 0)?;
        info!(path = %path.display(), existing_bytes = len, "log sink ready");
        Ok(sink)
    }

    /// Like [`open`](Self::open), but downgrades to an
    /// [`unavailable`](Self::unavailable) sink on failure.  The failure is
    /// logged once here and never retried.
    pub fn open_or_unavailable(path: &Path) -> Self {
        match Self::open(path) {
            Ok(sink) => sink,
            Err(e) => {
                error!(
                    path = %path.display(),
                    "log sink unavailable, records will be dropped: {:#}",
                    anyhow::Error::new(e)
                );
                Self::unavailable()
            }
        }
    }

    /// Wrap an arbitrary writer.  `empty` says whether the destination holds
    /// no data yet, in which case the header is written first.
    pub fn from_writer<W>(mut writer: W, empty: bool) -> Result<Self, SinkInitError>
    where
        W: Write + Send + 'static,
    {
        if empty {
            writer
                .write_all(format!("{HEADER}\n").as_bytes())
                .and_then(|()| writer.flush())
                .map_err(|source| SinkInitError::Header { source })?;
            debug!("log header written");
        }

        Ok(Self {
            state: Mutex::new(SinkState {
                writer: Some(Box::new(writer)),
                last_write_ok: true,
            }),
        })
    }

    /// Append one pre-formatted line.
    pub fn write(&self, line: &str) -> Result<(), SinkWriteError> {
        let mut state = self.lock();

        let Some(writer) = state.writer.as_mut() else {
            return Err(SinkWriteError::Unavailable);
        };

        let result = writer
            .write_all(line.as_bytes())
            .and_then(|()| writer.flush());
        state.last_write_ok = result.is_ok();

        match result {
            Ok(()) => {
                debug!(line = line.trim_end(), "record persisted");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to write log record, dropping it");
                Err(SinkWriteError::Io(e))
            }
        }
    }

    /// Format and append one [`Record`].
    pub fn append(&self, record: &Record) -> Result<(), SinkWriteError> {
        // Formatting happens before the lock is taken.
        let line = record.to_line();
        self.write(&line)
    }

    /// `true` if the sink opened successfully.
    pub fn is_available(&self) -> bool {
        self.lock().writer.is_some()
    }

    /// Outcome of the most recent write; diagnostics only.
    pub fn last_write_ok(&self) -> bool {
        self.lock().last_write_ok
    }

    fn lock(&self) -> MutexGuard<'_, SinkState> {
        // A panic inside write_all cannot leave SinkState half-updated.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SharedSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("SharedSink")
            .field("available", &state.writer.is_some())
            .field("last_write_ok", &state.last_write_ok)
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
