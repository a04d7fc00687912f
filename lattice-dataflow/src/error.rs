//! Error Taxonomy
//!
//! The runtime distinguishes between states it is designed around and
//! mistakes in the code that drives it:
//!
//! - *Invalidity* is not an error at all. A signal without a value reads as
//!   `None` and everything derived from it is empty too.
//! - *Not-ready triggers* are expected. Triggering an action whose inputs are
//!   missing does nothing and reports [`NotReady`] to the caller.
//! - *Capability violations* and *address/type mismatches* are programmer
//!   errors. The `try_*` entry points return them as values; every other entry
//!   point halts through [`fatal`].

use std::fmt;

use smallvec::SmallVec;
use thiserror::Error;

use crate::runtime::EventId;
use crate::signal::Capability;
use crate::tree::Address;

/// Misuse of a signal's capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignalError {
    #[error("signal is not readable (capability: {0})")]
    NotReadable(Capability),

    #[error("signal is not writable (capability: {0})")]
    NotWritable(Capability),
}

/// A write refused by a validator.
///
/// Not a programmer error: it is recorded next to the validated state and
/// shown to the user until a valid value replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Structural errors raised while resolving state during a traversal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// The slot at `address` was created with a different type. The UI
    /// function did not produce the same structure for the same inputs.
    #[error("state at {address} holds `{found}`, but `{expected}` was requested")]
    TypeMismatch {
        address: Address,
        expected: &'static str,
        found: &'static str,
    },

    #[error("scope {address} is nested deeper than the configured limit of {limit}")]
    DepthExceeded { address: Address, limit: usize },
}

/// Why an action refused to trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blocker {
    /// A bound argument or operand signal has no value.
    InvalidArgument,
    /// The target signal has no value to update.
    InvalidTarget,
    /// The target signal cannot currently accept writes.
    Unwritable,
}

impl fmt::Display for Blocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Blocker::InvalidArgument => "an argument has no value",
            Blocker::InvalidTarget => "the target has no value",
            Blocker::Unwritable => "the target is not writable",
        };
        f.write_str(text)
    }
}

/// A trigger was refused and nothing was written.
///
/// `path` locates the refusing constituent inside nested sequences, outermost
/// index first. It is empty when the refusing action was not part of a
/// sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("action not ready: {blocker}{}", PathSuffix(.path))]
pub struct NotReady {
    pub blocker: Blocker,
    pub path: SmallVec<[usize; 4]>,
}

impl NotReady {
    pub fn new(blocker: Blocker) -> Self {
        Self {
            blocker,
            path: SmallVec::new(),
        }
    }

    /// Record that this refusal came from constituent `index` of a sequence.
    pub fn within(mut self, index: usize) -> Self {
        self.path.insert(0, index);
        self
    }
}

struct PathSuffix<'a>(&'a SmallVec<[usize; 4]>);

impl fmt::Display for PathSuffix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        f.write_str(" (constituent ")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{index}")?;
        }
        f.write_str(")")
    }
}

/// Errors reported by [`Runtime::dispatch`](crate::runtime::Runtime::dispatch).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("no handler registered for event {0} in the last traversal")]
    UnknownEvent(EventId),

    #[error(transparent)]
    NotReady(#[from] NotReady),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid runtime config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Halt on a programmer error.
///
/// Logged before panicking so hosts that capture `tracing` output keep a
/// record even when the panic message is lost.
#[track_caller]
pub(crate) fn fatal(err: impl std::error::Error) -> ! {
    tracing::error!(error = %err, "fatal runtime misuse");
    panic!("{err}")
}
