//! Error types surfaced by host operations.
use std::fmt::Display;
use std::fmt::Formatter;

use crate::LoadingState;

/// Errors returned by [`EmulatorHost`](crate::EmulatorHost) and
/// [`FrameScheduler`](crate::scheduler::FrameScheduler) operations.
///
/// Release failures are deliberately absent: releasing a stale engine
/// instance is best-effort and only ever logged.
#[derive(Debug)]
pub enum HostError {
    /// The engine module failed to load, or its debug hooks failed to
    /// install. The host is in [`LoadingState::Error`] and must be replaced
    /// by a new one.
    Initialization(anyhow::Error),

    /// An operation was called before the host reached the state it
    /// requires. Raised before any side effect; recoverable by correcting
    /// the call order.
    Precondition {
        operation: &'static str,
        required: LoadingState,
        actual: LoadingState,
    },

    /// The engine rejected the ROM image during construction. The host is in
    /// [`LoadingState::Error`].
    Instantiation(anyhow::Error),

    /// A live engine instance faulted while stepping or resetting, or
    /// produced a frame buffer of the wrong size.
    Engine(anyhow::Error),
}

impl Display for HostError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HostError::Initialization(err) => {
                write!(f, "Failed to initialize engine module: {err:#}")
            }
            HostError::Precondition {
                operation,
                required,
                actual,
            } => {
                write!(
                    f,
                    "{operation} requires state {required}, but host is in {actual}"
                )
            }
            HostError::Instantiation(err) => {
                write!(f, "Engine rejected ROM image: {err:#}")
            }
            HostError::Engine(err) => write!(f, "Engine fault: {err:#}"),
        }
    }
}

impl std::error::Error for HostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HostError::Initialization(err)
            | HostError::Instantiation(err)
            | HostError::Engine(err) => Some(err.as_ref()),
            HostError::Precondition { .. } => None,
        }
    }
}
