use parking_lot::RwLock;

use parley_types::api::ChatMessage;
use parley_types::{LEAVE_COMMAND, SYSTEM_SENDER};

/// Single append-only log shared by every room. A message's index is its
/// position in the log, so indices are dense and strictly increasing.
///
/// Appends take the write lock for the whole of index assignment + push;
/// scans share the read lock.
#[derive(Debug, Default)]
pub struct MessageLog {
    entries: RwLock<Vec<ChatMessage>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a message and return it as stored.
    ///
    /// Posting [`LEAVE_COMMAND`] stores a departure notice from
    /// [`SYSTEM_SENDER`] instead of the literal text.
    pub fn append(&self, room: &str, sender: &str, text: &str) -> ChatMessage {
        let (sender, text) = if text == LEAVE_COMMAND {
            (SYSTEM_SENDER.to_string(), format!("{} has left the room", sender))
        } else {
            (sender.to_string(), text.to_string())
        };

        let mut entries = self.entries.write();
        let message = ChatMessage {
            index: entries.len() as u64,
            room: room.to_string(),
            sender,
            text,
        };
        entries.push(message.clone());
        message
    }

    /// Number of stored messages, which is also the next index to be assigned.
    pub fn len(&self) -> u64 {
        self.entries.read().len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Messages with index in `[start, end)` whose room is `room`, in index order.
    ///
    /// Walks every entry in the range regardless of how many match. `end` is
    /// clamped to the current length.
    pub fn scan_range(&self, start: u64, end: u64, room: &str) -> Vec<ChatMessage> {
        let entries = self.entries.read();
        let end = (end as usize).min(entries.len());
        let start = start as usize;
        if start >= end {
            return Vec::new();
        }

        entries[start..end]
            .iter()
            .filter(|m| m.room == room)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn test_append_assigns_dense_indices() {
        let log = MessageLog::new();
        assert!(log.is_empty());
        assert_eq!(log.append("general", "alice", "hi").index, 0);
        assert_eq!(log.append("random", "bob", "yo").index, 1);
        assert_eq!(log.append("general", "bob", "hey").index, 2);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_leave_rewrite() {
        let log = MessageLog::new();
        let stored = log.append("general", "alice", "/leave");
        assert_eq!(stored.sender, SYSTEM_SENDER);
        assert_eq!(stored.text, "alice has left the room");

        let scanned = log.scan_range(0, 1, "general");
        assert_eq!(scanned, vec![stored]);
    }

    #[test]
    fn test_leave_rewrite_is_exact_match_only() {
        let log = MessageLog::new();
        let stored = log.append("general", "alice", " /leave ");
        assert_eq!(stored.sender, "alice");
        assert_eq!(stored.text, " /leave ");
    }

    #[test]
    fn test_scan_filters_by_room_in_order() {
        let log = MessageLog::new();
        log.append("general", "alice", "one");
        log.append("random", "bob", "two");
        log.append("general", "bob", "three");
        log.append("general", "alice", "four");

        let texts: Vec<String> = log
            .scan_range(1, 4, "general")
            .into_iter()
            .map(|m| m.text)
            .collect();
        assert_eq!(texts, vec!["three", "four"]);

        let indices: Vec<u64> = log.scan_range(0, 4, "general").iter().map(|m| m.index).collect();
        assert_eq!(indices, vec![0, 2, 3]);
    }

    #[test]
    fn test_scan_empty_and_out_of_range() {
        let log = MessageLog::new();
        assert!(log.scan_range(0, 0, "general").is_empty());
        assert!(log.scan_range(0, 10, "general").is_empty());

        log.append("general", "alice", "hi");
        assert!(log.scan_range(1, 1, "general").is_empty());
        assert!(log.scan_range(3, 1, "general").is_empty());
        assert!(log.scan_range(5, 9, "general").is_empty());
        // end past the tail is clamped
        assert_eq!(log.scan_range(0, 99, "general").len(), 1);
        assert!(log.scan_range(0, 1, "random").is_empty());
    }

    #[test]
    fn test_concurrent_appends_stay_dense() {
        let log = Arc::new(MessageLog::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let log = log.clone();
                thread::spawn(move || {
                    (0..250)
                        .map(|i| log.append("general", &format!("user{}", t), &format!("{}", i)).index)
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut indices: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        indices.sort_unstable();

        assert_eq!(indices, (0..2000).collect::<Vec<u64>>());
        let stored = log.scan_range(0, log.len(), "general");
        assert!(stored.iter().enumerate().all(|(i, m)| m.index == i as u64));
    }
}
