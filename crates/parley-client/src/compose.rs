use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::warn;

use parley_types::LEAVE_COMMAND;
use parley_types::api::UserCred;

use crate::console::{Console, request_input};
use crate::error::ClientError;
use crate::sync::SyncHandle;
use crate::transport::ChatTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeOutcome {
    /// The user posted the leave command and the server accepted it.
    Left,
    /// Input ended.
    InputClosed,
}

/// Foreground activity while in a room.
///
/// Any line (ENTER) opens the composer: the poller is paused before the
/// message prompt appears and resumed once the text is read, then the text
/// is posted. This loop is the only place the poller is stopped.
pub struct ComposeLoop {
    transport: Arc<dyn ChatTransport>,
    cred: UserCred,
    room: String,
    console: Arc<dyn Console>,
}

impl ComposeLoop {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        cred: UserCred,
        room: impl Into<String>,
        console: Arc<dyn Console>,
    ) -> Self {
        Self {
            transport,
            cred,
            room: room.into(),
            console,
        }
    }

    pub async fn run(
        &self,
        input: &mut mpsc::Receiver<String>,
        mut sync: SyncHandle,
    ) -> Result<ComposeOutcome, ClientError> {
        loop {
            // Wait for ENTER; a poller that dies meanwhile ends the loop
            let enter = tokio::select! {
                line = input.recv() => line,
                exited = sync.exited() => {
                    return Err(exited.err().unwrap_or(ClientError::SyncClosed));
                }
            };
            if enter.is_none() {
                sync.stop().await?;
                return Ok(ComposeOutcome::InputClosed);
            }

            if sync.pause().await.is_err() {
                return Err(controller_gone(sync).await);
            }

            self.console.rule();
            let Some(text) = request_input(self.console.as_ref(), input, "Your Message").await else {
                sync.stop().await?;
                return Ok(ComposeOutcome::InputClosed);
            };
            self.console.rule();

            if sync.resume().await.is_err() {
                return Err(controller_gone(sync).await);
            }

            match self.transport.post_message(&self.room, &self.cred, &text).await {
                Ok(reply) if !reply.is_success => self.console.server(&reply.message),
                Ok(_) if text.trim() == LEAVE_COMMAND => {
                    sync.stop().await?;
                    return Ok(ComposeOutcome::Left);
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Failed to post to {}: {}", self.room, e);
                    self.console.server(&e.to_string());
                }
            }
        }
    }
}

/// The controller exited on its own; surface why.
async fn controller_gone(sync: SyncHandle) -> ClientError {
    match sync.join().await {
        Err(e) => e,
        Ok(()) => ClientError::SyncClosed,
    }
}
