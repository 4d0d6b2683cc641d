#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use parley_api::ChatService;
use parley_client::{ChatTransport, ClientError, Console, SyncConfig};
use parley_store::{CredentialStore, RoomRegistry};
use parley_types::api::{ChatMessage, CountReply, Reply, Room, UserCred};
use parley_types::models::User;

pub fn alice() -> UserCred {
    UserCred::from_plaintext("alice", "secret")
}

pub fn bob() -> UserCred {
    UserCred::from_plaintext("bob", "hunter2")
}

pub fn service() -> Arc<ChatService> {
    let users = [alice(), bob()]
        .into_iter()
        .map(|c| User { username: c.username, password: c.password })
        .collect();
    let rooms = ["general", "random"]
        .into_iter()
        .map(|name| Room { name: name.into() })
        .collect();
    Arc::new(ChatService::new(CredentialStore::new(users), RoomRegistry::new(rooms)))
}

pub fn fast() -> SyncConfig {
    SyncConfig { poll_interval: Duration::from_millis(5) }
}

/// Poll `cond` every few milliseconds for up to two seconds.
pub async fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    for _ in 0..400 {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    cond()
}

/// Calls straight into a `ChatService`, counting the polling calls.
pub struct LocalTransport {
    service: Arc<ChatService>,
    counts: AtomicU64,
    fetches: AtomicU64,
}

impl LocalTransport {
    pub fn new(service: Arc<ChatService>) -> Arc<Self> {
        Arc::new(Self {
            service,
            counts: AtomicU64::new(0),
            fetches: AtomicU64::new(0),
        })
    }

    pub fn count_calls(&self) -> u64 {
        self.counts.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatTransport for LocalTransport {
    async fn login(&self, cred: &UserCred) -> Result<Reply, ClientError> {
        Ok(self.service.login(cred))
    }

    async fn list_rooms(&self, cred: &UserCred) -> Result<Vec<Room>, ClientError> {
        self.service
            .list_rooms(cred)
            .map_err(|r| ClientError::Rejected(r.to_string()))
    }

    async fn join_room(&self, room: &str, cred: &UserCred) -> Result<Reply, ClientError> {
        Ok(self.service.join_room(room, cred))
    }

    async fn post_message(
        &self,
        room: &str,
        cred: &UserCred,
        text: &str,
    ) -> Result<Reply, ClientError> {
        Ok(self.service.post_message(room, cred, text))
    }

    async fn message_count(&self, cred: &UserCred) -> Result<CountReply, ClientError> {
        self.counts.fetch_add(1, Ordering::SeqCst);
        Ok(self.service.message_count(cred))
    }

    async fn fetch_messages(
        &self,
        room: &str,
        cred: &UserCred,
        start_index: u64,
        end_index: u64,
    ) -> Result<Vec<ChatMessage>, ClientError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.service
            .fetch_messages(room, cred, start_index, end_index)
            .map_err(|r| ClientError::Rejected(r.to_string()))
    }
}

/// Transport whose connection is gone.
pub struct DeadTransport;

#[async_trait]
impl ChatTransport for DeadTransport {
    async fn login(&self, _: &UserCred) -> Result<Reply, ClientError> {
        Err(lost())
    }

    async fn list_rooms(&self, _: &UserCred) -> Result<Vec<Room>, ClientError> {
        Err(lost())
    }

    async fn join_room(&self, _: &str, _: &UserCred) -> Result<Reply, ClientError> {
        Err(lost())
    }

    async fn post_message(&self, _: &str, _: &UserCred, _: &str) -> Result<Reply, ClientError> {
        Err(lost())
    }

    async fn message_count(&self, _: &UserCred) -> Result<CountReply, ClientError> {
        Err(lost())
    }

    async fn fetch_messages(
        &self,
        _: &str,
        _: &UserCred,
        _: u64,
        _: u64,
    ) -> Result<Vec<ChatMessage>, ClientError> {
        Err(lost())
    }
}

fn lost() -> ClientError {
    ClientError::Io(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection lost"))
}

#[derive(Default)]
pub struct RecordingConsole {
    lines: Mutex<Vec<String>>,
}

impl RecordingConsole {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn contains(&self, line: &str) -> bool {
        self.lines.lock().unwrap().iter().any(|l| l == line)
    }
}

impl Console for RecordingConsole {
    fn line(&self, text: &str) {
        self.lines.lock().unwrap().push(text.to_string());
    }

    fn prompt(&self, title: &str) {
        self.lines.lock().unwrap().push(format!("{} : ", title));
    }
}
