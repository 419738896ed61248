use crate::domain::{MoleError, MoleResult};
use std::io::{ErrorKind, Read};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Bytes read from one output stream when draining stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Drained {
    Complete(Vec<u8>),
    /// Another process still holds the write end, e.g. one the solver started in the background.
    StillOpen(Vec<u8>),
}

impl Drained {
    pub(super) fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }

    pub(super) fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Complete(bytes) | Self::StillOpen(bytes) => bytes,
        }
    }
}

/// Reader thread that collects one child output stream.
///
/// Captured bytes stay reachable while the thread is blocked, so a caller
/// can give up on end of file and still report what arrived.
pub(super) struct OutputPump {
    stream: &'static str,
    captured: Arc<Mutex<Vec<u8>>>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl OutputPump {
    pub(super) fn spawn<R>(
        stream: &'static str,
        mut reader: R,
        chunks: Option<Sender<Vec<u8>>>,
    ) -> Self
    where
        R: Read + Send + 'static,
    {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&captured);
        let handle = thread::spawn(move || {
            let mut buffer = [0_u8; 4096];
            loop {
                let read = match reader.read(&mut buffer) {
                    Ok(0) => return Ok(()),
                    Ok(read) => read,
                    Err(error) if error.kind() == ErrorKind::Interrupted => continue,
                    Err(error) => return Err(error),
                };
                sink.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .extend_from_slice(&buffer[..read]);
                if let Some(chunks) = &chunks {
                    // Nobody listens once readiness is resolved.
                    let _ = chunks.send(buffer[..read].to_vec());
                }
            }
        });

        Self {
            stream,
            captured,
            handle,
        }
    }

    /// Waits for end of file until `deadline`; `None` waits as long as it takes.
    ///
    /// A reader still blocked at the deadline is left detached.
    pub(super) fn drain(self, deadline: Option<Instant>) -> MoleResult<Drained> {
        let Self {
            stream,
            captured,
            handle,
        } = self;

        if let Some(deadline) = deadline {
            while !handle.is_finished() {
                if Instant::now() >= deadline {
                    return Ok(Drained::StillOpen(snapshot(&captured)));
                }
                thread::sleep(JOIN_POLL_INTERVAL);
            }
        }

        match handle.join() {
            Ok(Ok(())) => Ok(Drained::Complete(snapshot(&captured))),
            Ok(Err(source)) => Err(MoleError::solver_invocation(
                "RUN.SOLVER_OUTPUT",
                format!("failed to read solver {}: {}", stream, source),
            )),
            Err(_) => Err(MoleError::internal(
                "RUN.SOLVER_OUTPUT",
                format!("solver {} reader panicked", stream),
            )),
        }
    }
}

fn snapshot(captured: &Mutex<Vec<u8>>) -> Vec<u8> {
    captured
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}
