use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use parley_types::api::UserCred;

use crate::console::Console;
use crate::cursor::PollCursor;
use crate::error::ClientError;
use crate::transport::ChatTransport;

/// Poll interval between work cycles.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Running,
    Paused,
    /// Terminal.
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Pause,
    Resume,
    Stop,
}

impl SyncState {
    pub fn on_signal(self, signal: Signal) -> Self {
        match (self, signal) {
            (Self::Stopped, _) | (_, Signal::Stop) => Self::Stopped,
            (_, Signal::Pause) => Self::Paused,
            (_, Signal::Resume) => Self::Running,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub poll_interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// A signal plus the channel the controller acknowledges it on. The sender
/// waits for the ack, so a send completes only once the controller has
/// consumed the signal between work cycles.
struct Control {
    signal: Signal,
    ack: oneshot::Sender<SyncState>,
}

/// Background poller for one joined room.
///
/// Each work cycle asks the server for the log length and, if it grew past
/// the cursor, fetches and displays the new messages for this room before
/// moving the cursor. Cycles run only in `Running` and are paced by
/// `poll_interval`. A pending signal is always consumed before the next
/// cycle starts.
pub struct SyncController {
    transport: Arc<dyn ChatTransport>,
    cred: UserCred,
    room: String,
    cursor: Arc<PollCursor>,
    console: Arc<dyn Console>,
    config: SyncConfig,
    state: SyncState,
    signals: mpsc::Receiver<Control>,
}

impl SyncController {
    /// Start polling `room` on a new task.
    pub fn spawn(
        transport: Arc<dyn ChatTransport>,
        cred: UserCred,
        room: impl Into<String>,
        console: Arc<dyn Console>,
        config: SyncConfig,
    ) -> SyncHandle {
        let (tx, rx) = mpsc::channel(1);
        let cursor = Arc::new(PollCursor::new());

        let controller = Self {
            transport,
            cred,
            room: room.into(),
            cursor: cursor.clone(),
            console,
            config,
            state: SyncState::Running,
            signals: rx,
        };

        SyncHandle {
            signals: tx,
            cursor,
            task: tokio::spawn(controller.run()),
        }
    }

    async fn run(mut self) -> Result<(), ClientError> {
        debug!("Sync started for {}", self.room);

        loop {
            match self.state {
                SyncState::Stopped => break,

                // Nothing to do until told otherwise.
                SyncState::Paused => match self.signals.recv().await {
                    Some(control) => self.apply(control),
                    None => self.state = SyncState::Stopped,
                },

                SyncState::Running => {
                    match self.signals.try_recv() {
                        Ok(control) => {
                            self.apply(control);
                            continue;
                        }
                        Err(TryRecvError::Disconnected) => {
                            self.state = SyncState::Stopped;
                            continue;
                        }
                        Err(TryRecvError::Empty) => {}
                    }

                    if let Err(e) = self.poll_once().await {
                        warn!("Sync for {} failed: {}", self.room, e);
                        return Err(e);
                    }

                    let interrupted = tokio::select! {
                        _ = tokio::time::sleep(self.config.poll_interval) => None,
                        control = self.signals.recv() => Some(control),
                    };
                    match interrupted {
                        None => {}
                        Some(Some(control)) => self.apply(control),
                        Some(None) => self.state = SyncState::Stopped,
                    }
                }
            }
        }

        debug!("Sync stopped for {} at {}", self.room, self.cursor.observed());
        Ok(())
    }

    fn apply(&mut self, control: Control) {
        let next = self.state.on_signal(control.signal);
        debug!("Sync {:?} + {:?} -> {:?}", self.state, control.signal, next);
        self.state = next;
        let _ = control.ack.send(next);
    }

    /// One work cycle.
    async fn poll_once(&mut self) -> Result<(), ClientError> {
        let reply = self.transport.message_count(&self.cred).await?;
        if !reply.is_success {
            return Err(ClientError::Rejected(reply.message));
        }

        let observed = self.cursor.observed();
        if reply.count <= observed {
            return Ok(());
        }

        let messages = self
            .transport
            .fetch_messages(&self.room, &self.cred, observed, reply.count)
            .await?;
        for message in &messages {
            self.console.message(message);
        }
        self.cursor.advance_to(reply.count);

        Ok(())
    }
}

/// Owner's side of a running [`SyncController`].
pub struct SyncHandle {
    signals: mpsc::Sender<Control>,
    cursor: Arc<PollCursor>,
    task: JoinHandle<Result<(), ClientError>>,
}

impl SyncHandle {
    /// Deliver `signal` and wait until the controller has consumed it.
    /// Returns the state the controller moved to.
    pub async fn send(&self, signal: Signal) -> Result<SyncState, ClientError> {
        let (ack, acked) = oneshot::channel();
        self.signals
            .send(Control { signal, ack })
            .await
            .map_err(|_| ClientError::SyncClosed)?;
        acked.await.map_err(|_| ClientError::SyncClosed)
    }

    /// Once this returns, no work cycle is in progress and none will start
    /// until [`resume`](Self::resume).
    pub async fn pause(&self) -> Result<SyncState, ClientError> {
        self.send(Signal::Pause).await
    }

    pub async fn resume(&self) -> Result<SyncState, ClientError> {
        self.send(Signal::Resume).await
    }

    /// Stop the controller and wait for its task to finish.
    pub async fn stop(self) -> Result<(), ClientError> {
        // A controller that already exited reports its own outcome via join.
        let _ = self.send(Signal::Stop).await;
        self.join().await
    }

    /// Wait for the controller task and return how it ended.
    pub async fn join(self) -> Result<(), ClientError> {
        self.task.await?
    }

    /// Resolves when the controller task ends. Only useful while racing
    /// against other work; the handle must not be joined afterwards.
    pub async fn exited(&mut self) -> Result<(), ClientError> {
        (&mut self.task).await?
    }

    pub fn observed(&self) -> u64 {
        self.cursor.observed()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        use Signal::*;
        use SyncState::*;

        assert_eq!(Running.on_signal(Pause), Paused);
        assert_eq!(Paused.on_signal(Pause), Paused);
        assert_eq!(Paused.on_signal(Resume), Running);
        assert_eq!(Running.on_signal(Resume), Running);
        assert_eq!(Running.on_signal(Stop), Stopped);
        assert_eq!(Paused.on_signal(Stop), Stopped);
    }

    #[test]
    fn test_stopped_is_terminal() {
        for signal in [Signal::Pause, Signal::Resume, Signal::Stop] {
            assert_eq!(SyncState::Stopped.on_signal(signal), SyncState::Stopped);
        }
    }
}
