/// Parley terminal client
///
/// A session logs in once, then cycles through rooms. Inside a room two
/// activities run side by side: the [`sync::SyncController`] polls the
/// server for new messages in the background while the
/// [`compose::ComposeLoop`] reads and posts the user's messages in the
/// foreground, pausing the poller while the user is typing.

pub mod compose;
pub mod console;
pub mod cursor;
pub mod error;
pub mod session;
pub mod sync;
pub mod transport;

pub use compose::{ComposeLoop, ComposeOutcome};
pub use console::{Console, StdoutConsole};
pub use cursor::PollCursor;
pub use error::ClientError;
pub use session::ClientSession;
pub use sync::{Signal, SyncConfig, SyncController, SyncHandle, SyncState};
pub use transport::{ChatTransport, HttpTransport};
