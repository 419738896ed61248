use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(20);

/// When the solver is considered ready for its single acknowledgement line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// Assume readiness once the delay has passed.
    FixedDelay(Duration),
    /// Wait until `marker` shows up on stdout, but no longer than `max_wait`.
    Prompt { marker: String, max_wait: Duration },
}

impl Default for Readiness {
    fn default() -> Self {
        Self::FixedDelay(DEFAULT_SETTLE_DELAY)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessOutcome {
    PromptObserved,
    DelayElapsed,
    PromptMissing,
    OutputClosed,
}

/// Drains stdout chunks until the readiness condition holds.
///
/// `limit` caps the wait regardless of strategy.
pub(super) fn wait_for_readiness(
    readiness: &Readiness,
    chunks: &Receiver<Vec<u8>>,
    limit: Option<Instant>,
) -> ReadinessOutcome {
    let (wait, marker) = match readiness {
        Readiness::FixedDelay(delay) => (*delay, None),
        Readiness::Prompt { marker, max_wait } => (*max_wait, Some(marker.as_bytes())),
    };
    if marker.is_some_and(<[u8]>::is_empty) {
        return ReadinessOutcome::PromptObserved;
    }

    // Either bound may be unrepresentable; with neither, wait for the prompt or end of output.
    let deadline = match (Instant::now().checked_add(wait), limit) {
        (Some(own), Some(limit)) => Some(own.min(limit)),
        (own, limit) => own.or(limit),
    };
    let elapsed_outcome = if marker.is_some() {
        ReadinessOutcome::PromptMissing
    } else {
        ReadinessOutcome::DelayElapsed
    };

    let mut seen = Vec::new();
    loop {
        let received = match deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return elapsed_outcome;
                }
                chunks.recv_timeout(remaining)
            }
            None => chunks
                .recv()
                .map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(chunk) => {
                if let Some(marker) = marker {
                    seen.extend_from_slice(&chunk);
                    if contains_bytes(&seen, marker) {
                        return ReadinessOutcome::PromptObserved;
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => return elapsed_outcome,
            Err(RecvTimeoutError::Disconnected) => return ReadinessOutcome::OutputClosed,
        }
    }
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle)
}
