use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use parley_types::api::{
    ChatMessage, CountReply, FetchMessagesRequest, JoinRoomRequest, PostMessageRequest, Reply,
    Room, UserCred,
};

use crate::error::ClientError;

/// The six chat operations as seen from the client. Every call carries the
/// credential pair; there are no sessions on the server side.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn login(&self, cred: &UserCred) -> Result<Reply, ClientError>;

    async fn list_rooms(&self, cred: &UserCred) -> Result<Vec<Room>, ClientError>;

    async fn join_room(&self, room: &str, cred: &UserCred) -> Result<Reply, ClientError>;

    async fn post_message(
        &self,
        room: &str,
        cred: &UserCred,
        text: &str,
    ) -> Result<Reply, ClientError>;

    async fn message_count(&self, cred: &UserCred) -> Result<CountReply, ClientError>;

    async fn fetch_messages(
        &self,
        room: &str,
        cred: &UserCred,
        start_index: u64,
        end_index: u64,
    ) -> Result<Vec<ChatMessage>, ClientError>;
}

/// JSON-over-HTTP transport. Each call has its own deadline and is never retried.
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// `address` is `host:port` or a full `http(s)://` URL.
    pub fn new(address: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = if address.starts_with("http://") || address.starts_with("https://") {
            address.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", address.trim_end_matches('/'))
        };
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call<B, R>(&self, path: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let resp = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json::<R>().await?)
    }

    /// Read a newline-delimited JSON response to the end.
    async fn call_stream<B, T>(&self, path: &str, body: &B) -> Result<Vec<T>, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            let reply: Reply = resp.json().await?;
            return Err(ClientError::Rejected(reply.message));
        }
        let resp = resp.error_for_status()?;

        let mut stream = resp.bytes_stream();
        let mut buf: Vec<u8> = Vec::new();
        let mut items = Vec::new();

        while let Some(chunk) = stream.next().await {
            buf.extend_from_slice(&chunk?);
            while let Some(pos) = buf.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buf.drain(..=pos).collect();
                decode_line(&line, &mut items)?;
            }
        }
        decode_line(&buf, &mut items)?;

        Ok(items)
    }
}

fn decode_line<T: DeserializeOwned>(line: &[u8], items: &mut Vec<T>) -> Result<(), ClientError> {
    if line.iter().all(u8::is_ascii_whitespace) {
        return Ok(());
    }
    items.push(serde_json::from_slice(line)?);
    Ok(())
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn login(&self, cred: &UserCred) -> Result<Reply, ClientError> {
        self.call("/login", cred).await
    }

    async fn list_rooms(&self, cred: &UserCred) -> Result<Vec<Room>, ClientError> {
        self.call_stream("/rooms", cred).await
    }

    async fn join_room(&self, room: &str, cred: &UserCred) -> Result<Reply, ClientError> {
        let req = JoinRoomRequest {
            room: room.to_string(),
            cred: cred.clone(),
        };
        self.call("/rooms/join", &req).await
    }

    async fn post_message(
        &self,
        room: &str,
        cred: &UserCred,
        text: &str,
    ) -> Result<Reply, ClientError> {
        let req = PostMessageRequest {
            room: room.to_string(),
            cred: cred.clone(),
            text: text.to_string(),
        };
        self.call("/messages", &req).await
    }

    async fn message_count(&self, cred: &UserCred) -> Result<CountReply, ClientError> {
        self.call("/messages/count", cred).await
    }

    async fn fetch_messages(
        &self,
        room: &str,
        cred: &UserCred,
        start_index: u64,
        end_index: u64,
    ) -> Result<Vec<ChatMessage>, ClientError> {
        let req = FetchMessagesRequest {
            room: room.to_string(),
            cred: cred.clone(),
            start_index,
            end_index,
        };
        self.call_stream("/messages/fetch", &req).await
    }
}
