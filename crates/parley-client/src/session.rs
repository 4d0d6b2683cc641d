use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use parley_types::api::{Room, UserCred};

use crate::compose::{ComposeLoop, ComposeOutcome};
use crate::console::{Console, request_input};
use crate::error::ClientError;
use crate::sync::{SyncConfig, SyncController};
use crate::transport::ChatTransport;

/// An authenticated user and the rooms the server offered at login.
pub struct ClientSession {
    transport: Arc<dyn ChatTransport>,
    cred: UserCred,
    console: Arc<dyn Console>,
    config: SyncConfig,
    rooms: Vec<Room>,
}

impl ClientSession {
    /// Authenticate once. A rejected login is returned as
    /// [`ClientError::Rejected`].
    pub async fn login(
        transport: Arc<dyn ChatTransport>,
        cred: UserCred,
        console: Arc<dyn Console>,
        config: SyncConfig,
    ) -> Result<Self, ClientError> {
        let reply = transport.login(&cred).await?;
        if !reply.is_success {
            return Err(ClientError::Rejected(reply.message));
        }
        info!("Logged in as {}", cred.username);
        console.server(&reply.message);
        console.rule();

        Ok(Self {
            transport,
            cred,
            console,
            config,
            rooms: Vec::new(),
        })
    }

    pub fn cred(&self) -> &UserCred {
        &self.cred
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Fetch the room list. Done once per session.
    pub async fn load_rooms(&mut self) -> Result<&[Room], ClientError> {
        self.rooms = self.transport.list_rooms(&self.cred).await?;
        Ok(&self.rooms)
    }

    /// Ask for a room name until the server accepts one. `None` once input
    /// is closed.
    pub async fn join_room(
        &self,
        input: &mut mpsc::Receiver<String>,
    ) -> Result<Option<String>, ClientError> {
        loop {
            let Some(room) = request_input(self.console.as_ref(), input, "Select Room").await else {
                return Ok(None);
            };
            self.console.rule();

            let reply = self.transport.join_room(&room, &self.cred).await?;
            self.console.server(&reply.message);
            if reply.is_success {
                self.console.server("Press ENTER to write a message");
                self.console.server("Type /leave in message to leave room");
                self.console.rule();
                return Ok(Some(room));
            }
        }
    }

    /// Poll `room` in the background and compose in the foreground until the
    /// user leaves or input ends.
    pub async fn enter_room(
        &self,
        room: &str,
        input: &mut mpsc::Receiver<String>,
    ) -> Result<ComposeOutcome, ClientError> {
        let sync = SyncController::spawn(
            self.transport.clone(),
            self.cred.clone(),
            room,
            self.console.clone(),
            self.config.clone(),
        );

        let compose = ComposeLoop::new(
            self.transport.clone(),
            self.cred.clone(),
            room,
            self.console.clone(),
        );
        let outcome = compose.run(input, sync).await?;
        info!("Left {} ({:?})", room, outcome);
        Ok(outcome)
    }

    /// List rooms, then join / chat / leave until input ends.
    pub async fn run(mut self, input: &mut mpsc::Receiver<String>) -> Result<(), ClientError> {
        self.load_rooms().await?;

        loop {
            self.console.rooms(&self.rooms);

            let Some(room) = self.join_room(input).await? else {
                return Ok(());
            };

            match self.enter_room(&room, input).await? {
                ComposeOutcome::Left => continue,
                ComposeOutcome::InputClosed => return Ok(()),
            }
        }
    }
}
