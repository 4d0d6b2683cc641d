/// Parley shared types
///
/// Wire payloads exchanged between the chat server and its clients, the
/// bootstrap shapes the server seeds itself from, and the protocol constants
/// both sides agree on.

pub mod api;
pub mod auth;
pub mod models;

/// Message text that, when posted, means "I am leaving this room".
pub const LEAVE_COMMAND: &str = "/leave";

/// Sender name used for messages the server writes on a user's behalf.
pub const SYSTEM_SENDER: &str = "server";
