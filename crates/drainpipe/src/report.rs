//! What each stage reports when it exits.

use std::fmt;
use std::time::Duration;

/// Which side of the queue a stage sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    /// Produces items and closes the queue.
    Source,
    /// Consumes items, and in the draining variant discards the rest.
    Sink,
}

impl StageKind {
    /// Lowercase name, used for tracing spans.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Sink => "sink",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a stage stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageExit {
    /// Saw the cancellation signal at a loop-top check.
    Cancelled,

    /// The queue reported closed-and-empty while the signal was still live.
    Closed,

    /// Saw cancellation, then discarded items until the queue closed.
    Drained {
        /// Items popped and thrown away during the drain.
        discarded: u64,
    },
}

impl StageExit {
    /// Items discarded on the way out. Zero unless the stage drained.
    #[inline]
    pub fn discarded(&self) -> u64 {
        match self {
            Self::Drained { discarded } => *discarded,
            _ => 0,
        }
    }

    /// Returns `true` if the exit followed the cancellation signal.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Drained { .. })
    }
}

impl fmt::Display for StageExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "cancelled"),
            Self::Closed => write!(f, "queue closed"),
            Self::Drained { discarded } => write!(f, "drained {} item(s)", discarded),
        }
    }
}

/// A finished stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageReport {
    /// Source or sink.
    pub kind: StageKind,
    /// Why it stopped.
    pub exit: StageExit,
    /// Items pushed (source) or processed (sink). Drained items are not
    /// counted here; see [`StageExit::discarded`].
    pub handled: u64,
}

impl StageReport {
    /// Build a report.
    pub fn new(kind: StageKind, exit: StageExit, handled: u64) -> Self {
        Self {
            kind,
            exit,
            handled,
        }
    }
}

/// Every stage report from one coordinated shutdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownReport {
    /// In the order the stages exited.
    pub stages: Vec<StageReport>,
    /// From cancellation to the last stage exit.
    pub elapsed: Duration,
}

impl ShutdownReport {
    /// The first source stage, if one ran.
    pub fn source(&self) -> Option<&StageReport> {
        self.find(StageKind::Source)
    }

    /// The first sink stage, if one ran.
    pub fn sink(&self) -> Option<&StageReport> {
        self.find(StageKind::Sink)
    }

    fn find(&self, kind: StageKind) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.kind == kind)
    }
}
