//! Operator console.
//!
//! Reads one command per line and applies it to the session. The session
//! lock is taken per command and never held while waiting for input.

use std::io;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::error::SessionError;
use crate::responses;
use crate::state::SharedSession;

pub const BANNER: &str = "Enter commands as desired. Enter help for command information.";
pub const PROMPT: &str = "> ";
pub const MESSAGE_PROMPT: &str = "Message: ";
pub const INVALID_COMMAND: &str = "Invalid command.";
pub const CHANNEL_ALREADY_ADDED: &str = "Channel already added.";

pub const HELP: &[&str] = &[
    "nick [nick]: Sets or changes the nick to [nick].",
    "server [server]: Sets or changes the server to [server].",
    "join [channel]: Joins [channel].",
    "set-lines [filename]: Add the lines in [file] to the tell command. Do not provide the extension; the file must exist in the same directory as this program.",
    "speak [channel]: Say in [channel] the message specified after this command.",
    "channels: Lists all channels in.",
    "start: Connects to the server.",
    "exit: Stops the program.",
];

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Nick(String),
    Server(String),
    Join(String),
    SetLines(String),
    Speak(String),
    Channels,
    Start,
    Exit,
    Help,
    Invalid,
}

impl ConsoleCommand {
    /// Parse a line. Words are separated by single spaces; the keyword is
    /// case-insensitive. Commands taking an argument need exactly one.
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        let parts: Vec<&str> = line.split(' ').collect();
        let keyword = parts[0].to_lowercase();

        let single = || match parts.as_slice() {
            [_, arg] if !arg.is_empty() => Some(arg.to_string()),
            _ => None,
        };

        let parsed = match keyword.as_str() {
            "nick" => single().map(Self::Nick),
            "server" => single().map(Self::Server),
            "join" => single().map(Self::Join),
            "set-lines" => single().map(Self::SetLines),
            "speak" => single().map(Self::Speak),
            "channels" => Some(Self::Channels),
            "start" => Some(Self::Start),
            "exit" => Some(Self::Exit),
            "help" => Some(Self::Help),
            _ => None,
        };
        parsed.unwrap_or(Self::Invalid)
    }
}

enum Flow {
    Continue,
    Exit,
}

/// The console loop over any line source and sink.
pub struct Console<R, W> {
    input: R,
    output: W,
    session: SharedSession,
    quit_grace: Duration,
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, output: W, session: SharedSession, quit_grace: Duration) -> Self {
        Self {
            input,
            output,
            session,
            quit_grace,
        }
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    /// Run until `exit` or end of input. Either way the session is
    /// disconnected before returning.
    pub async fn run(&mut self) -> io::Result<()> {
        self.println(BANNER).await?;
        loop {
            self.print(PROMPT).await?;
            let Some(line) = self.read_line().await? else {
                debug!("console input closed");
                break;
            };
            let command = ConsoleCommand::parse(&line);
            debug!(command = ?command, "console command");
            if let Flow::Exit = self.execute(command).await? {
                break;
            }
        }
        self.shutdown().await;
        Ok(())
    }

    async fn execute(&mut self, command: ConsoleCommand) -> io::Result<Flow> {
        match command {
            ConsoleCommand::Nick(nick) => self.session.lock().set_nick(&nick),
            ConsoleCommand::Server(server) => {
                let result = self.session.lock().set_server(&server);
                if let Err(e) = result {
                    self.println(&e.to_string()).await?;
                }
            }
            ConsoleCommand::Join(channel) => {
                let added = self.session.lock().join(&channel);
                if !added {
                    self.println(CHANNEL_ALREADY_ADDED).await?;
                }
            }
            ConsoleCommand::SetLines(name) => self.set_lines(&name).await?,
            ConsoleCommand::Speak(channel) => return self.speak(&channel).await,
            ConsoleCommand::Channels => {
                let listing = self.session.lock().channels().as_slice().join(";");
                self.println(&format!("Channels: {listing}")).await?;
            }
            ConsoleCommand::Start => {
                let result = self.session.lock().connect();
                if let Err(e) = result {
                    self.println(&e.to_string()).await?;
                }
            }
            ConsoleCommand::Exit => return Ok(Flow::Exit),
            ConsoleCommand::Help => {
                for line in HELP {
                    self.println(line).await?;
                }
            }
            ConsoleCommand::Invalid => self.println(INVALID_COMMAND).await?,
        }
        Ok(Flow::Continue)
    }

    async fn set_lines(&mut self, name: &str) -> io::Result<()> {
        let dir = self.session.lock().lines_dir().to_path_buf();
        let loaded = match responses::read_source(&dir, name).await {
            Ok(lines) => self.session.lock().set_lines(name, lines),
            Err(e) => Err(e),
        };
        if let Err(e) = loaded {
            self.println(&e.to_string()).await?;
        }
        Ok(())
    }

    /// Check membership, prompt for the message body, then send it.
    async fn speak(&mut self, channel: &str) -> io::Result<Flow> {
        let joined = self.session.lock().is_joined(channel);
        if !joined {
            self.println(&SessionError::NotInChannel.to_string()).await?;
            return Ok(Flow::Continue);
        }

        self.print(MESSAGE_PROMPT).await?;
        let Some(text) = self.read_line().await? else {
            return Ok(Flow::Exit);
        };
        // Membership may have changed while waiting for the body.
        let result = self.session.lock().speak(channel, &text);
        if let Err(e) = result {
            self.println(&e.to_string()).await?;
        }
        Ok(Flow::Continue)
    }

    /// Disconnect and give the QUIT a bounded time to reach the server.
    async fn shutdown(&mut self) {
        let handle = self.session.lock().disconnect();
        if let Some(handle) = handle
            && tokio::time::timeout(self.quit_grace, handle).await.is_err()
        {
            warn!(grace = ?self.quit_grace, "link did not close in time");
        }
    }

    async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    async fn print(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await
    }

    async fn println(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await
    }
}
