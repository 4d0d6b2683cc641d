use std::io::{self, BufRead, BufReader, Write};
use std::thread;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use parley_types::api::{ChatMessage, Room};

const RULE: &str = "#################################################";

/// Where the client writes what the user sees.
pub trait Console: Send + Sync {
    /// Write one line.
    fn line(&self, text: &str);

    /// Write `title : ` without a line break.
    fn prompt(&self, title: &str);

    fn message(&self, message: &ChatMessage) {
        self.line(&format!("({}) : {}", message.sender, message.text));
    }

    fn server(&self, text: &str) {
        self.line(&format!("(server) : {}", text));
    }

    fn rule(&self) {
        self.line(RULE);
    }

    fn rooms(&self, rooms: &[Room]) {
        self.line("Rooms : ");
        for room in rooms {
            self.line(&format!("-> {}", room.name));
        }
        self.rule();
    }
}

pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn line(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{}", text);
    }

    fn prompt(&self, title: &str) {
        let mut out = std::io::stdout().lock();
        let _ = write!(out, "{} : ", title);
        let _ = out.flush();
    }
}

/// Forward stdin lines into a channel until EOF.
///
/// Reads on a plain thread so a blocked read never holds up runtime
/// shutdown; the process can exit while stdin is still open.
pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    spawn_line_reader(BufReader::new(std::io::stdin()))
}

/// Forward the lines of `reader` into a channel from a dedicated thread.
/// The channel closes at EOF, on a read error, or once the receiver is gone.
pub fn spawn_line_reader<R>(reader: R) -> mpsc::Receiver<String>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(16);
    thread::spawn(move || {
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("stdin read failed: {}", e);
                    break;
                }
            }
        }
        debug!("input reader exited");
    });
    rx
}

/// Prompt and read one trimmed line. `None` once input is closed.
pub async fn request_input(
    console: &dyn Console,
    input: &mut mpsc::Receiver<String>,
    title: &str,
) -> Option<String> {
    console.prompt(title);
    input.recv().await.map(|line| line.trim().to_string())
}
