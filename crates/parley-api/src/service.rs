use std::sync::Arc;

use tracing::{info, warn};

use parley_store::{Bootstrap, CredentialStore, MessageLog, RoomRegistry};
use parley_types::SYSTEM_SENDER;
use parley_types::api::{ChatMessage, CountReply, Reply, Room, UserCred};

use crate::error::Rejection;

pub type AppState = Arc<ChatService>;

/// The authoritative chat state: roster, rooms and the global message log.
///
/// Lives for the whole process. Every operation checks the caller's
/// credentials first.
pub struct ChatService {
    credentials: CredentialStore,
    rooms: RoomRegistry,
    log: MessageLog,
}

impl ChatService {
    pub fn new(credentials: CredentialStore, rooms: RoomRegistry) -> Self {
        Self {
            credentials,
            rooms,
            log: MessageLog::new(),
        }
    }

    pub fn from_bootstrap(bootstrap: Bootstrap) -> Self {
        let (credentials, rooms) = bootstrap.into_parts();
        Self::new(credentials, rooms)
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    fn authenticate(&self, cred: &UserCred) -> Result<(), Rejection> {
        if self.credentials.validate(&cred.username, &cred.password) {
            Ok(())
        } else {
            warn!("Rejected credentials for {}", cred.username);
            Err(Rejection::InvalidCredentials)
        }
    }

    fn require_room(&self, room: &str) -> Result<(), Rejection> {
        if self.rooms.exists(room) {
            Ok(())
        } else {
            Err(Rejection::NoSuchRoom)
        }
    }

    pub fn login(&self, cred: &UserCred) -> Reply {
        info!("Login attempt: {}", cred.username);
        match self.authenticate(cred) {
            Ok(()) => {
                info!("Logged in: {}", cred.username);
                Reply::success(format!("Hello {}", cred.username))
            }
            Err(rejection) => Reply::failure(rejection.to_string()),
        }
    }

    /// Snapshot of every registered room at call time.
    pub fn list_rooms(&self, cred: &UserCred) -> Result<Vec<Room>, Rejection> {
        self.authenticate(cred)?;
        Ok(self.rooms.rooms().to_vec())
    }

    pub fn join_room(&self, room: &str, cred: &UserCred) -> Reply {
        let joined = self.authenticate(cred).and_then(|()| self.require_room(room));
        match joined {
            Ok(()) => {
                self.log.append(
                    room,
                    SYSTEM_SENDER,
                    &format!("{} has joined the room", cred.username),
                );
                info!("Joined to {}: {}", room, cred.username);
                Reply::success(format!("You are now in {}", room))
            }
            Err(rejection) => Reply::failure(rejection.to_string()),
        }
    }

    pub fn post_message(&self, room: &str, cred: &UserCred, text: &str) -> Reply {
        let accepted = self.authenticate(cred).and_then(|()| self.require_room(room));
        match accepted {
            Ok(()) => {
                let stored = self.log.append(room, &cred.username, text);
                info!("Received message to {}: {} (#{})", room, stored.sender, stored.index);
                Reply::success(format!("Message from {} to {} Received", stored.sender, room))
            }
            Err(rejection) => Reply::failure(rejection.to_string()),
        }
    }

    /// Current log length, used by clients as the upper bound of their next fetch.
    pub fn message_count(&self, cred: &UserCred) -> CountReply {
        match self.authenticate(cred) {
            Ok(()) => {
                let count = self.log.len();
                CountReply {
                    is_success: true,
                    count,
                    message: count.to_string(),
                }
            }
            Err(rejection) => CountReply {
                is_success: false,
                count: 0,
                message: rejection.to_string(),
            },
        }
    }

    /// Messages of `room` with index in `[start_index, end_index)`.
    pub fn fetch_messages(
        &self,
        room: &str,
        cred: &UserCred,
        start_index: u64,
        end_index: u64,
    ) -> Result<Vec<ChatMessage>, Rejection> {
        self.authenticate(cred)?;
        Ok(self.log.scan_range(start_index, end_index, room))
    }
}

#[cfg(test)]
mod tests {
    use parley_types::models::User;

    use super::*;

    fn alice() -> UserCred {
        UserCred::from_plaintext("alice", "secret")
    }

    fn service(rooms: &[&str]) -> ChatService {
        ChatService::new(
            CredentialStore::new(vec![User {
                username: "alice".into(),
                password: alice().password,
            }]),
            RoomRegistry::new(rooms.iter().map(|r| Room { name: r.to_string() }).collect()),
        )
    }

    #[test]
    fn test_login_greets() {
        let svc = service(&["general"]);
        assert_eq!(svc.login(&alice()), Reply::success("Hello alice"));

        let wrong = UserCred::from_plaintext("alice", "nope");
        assert_eq!(svc.login(&wrong), Reply::failure("Wrong Username or Password"));
    }

    #[test]
    fn test_join_unknown_room() {
        let svc = service(&[]);
        assert_eq!(svc.join_room("general", &alice()), Reply::failure("No such room"));
        assert!(svc.log().is_empty());
    }

    #[test]
    fn test_join_appends_notice() {
        let svc = service(&["general"]);
        assert_eq!(svc.join_room("general", &alice()), Reply::success("You are now in general"));

        let messages = svc.fetch_messages("general", &alice(), 0, 1).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sender, SYSTEM_SENDER);
        assert_eq!(messages[0].text, "alice has joined the room");
    }

    #[test]
    fn test_post_count_fetch() {
        let svc = service(&["general"]);
        let reply = svc.post_message("general", &alice(), "hi");
        assert!(reply.is_success);

        assert_eq!(svc.message_count(&alice()).count, 1);
        let messages = svc.fetch_messages("general", &alice(), 0, 1).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sender, "alice");
        assert_eq!(messages[0].text, "hi");
    }

    #[test]
    fn test_post_leave_is_rewritten() {
        let svc = service(&["general"]);
        let reply = svc.post_message("general", &alice(), "/leave");
        assert_eq!(reply, Reply::success("Message from server to general Received"));

        let messages = svc.fetch_messages("general", &alice(), 0, 1).unwrap();
        assert_eq!(messages[0].text, "alice has left the room");
        assert_eq!(messages[0].sender, SYSTEM_SENDER);
    }

    #[test]
    fn test_every_operation_checks_credentials() {
        let svc = service(&["general"]);
        let wrong = UserCred::from_plaintext("mallory", "secret");

        assert!(!svc.join_room("general", &wrong).is_success);
        assert!(!svc.post_message("general", &wrong, "hi").is_success);
        assert!(svc.log().is_empty());

        let count = svc.message_count(&wrong);
        assert!(!count.is_success);
        assert_eq!(count.message, "Wrong Username or Password");

        assert_eq!(svc.list_rooms(&wrong), Err(Rejection::InvalidCredentials));
        assert_eq!(
            svc.fetch_messages("general", &wrong, 0, 1),
            Err(Rejection::InvalidCredentials)
        );
    }

    #[test]
    fn test_post_to_unknown_room() {
        let svc = service(&["general"]);
        assert_eq!(svc.post_message("random", &alice(), "hi"), Reply::failure("No such room"));
        assert_eq!(svc.message_count(&alice()).count, 0);
    }
}
