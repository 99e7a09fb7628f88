//! Per-connection session loop

use crate::smtp::commands::{CommandLine, SmtpCommandHandler};
use crate::smtp::response::SmtpResponse;

use std::io::{self, BufRead, BufReader, Read, Write};
use tracing::{error, info, info_span};

/// Why a session loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The client sent QUIT and got its farewell
    Quit,
    /// The client closed the stream
    ClientClosed,
    /// Reading failed (including an idle timeout)
    ReadError,
    /// Writing a reply failed
    WriteError,
}

/// One live client connection.
///
/// The session owns its stream for its whole lifetime; reads and writes are
/// strictly sequential. The stream is closed when [`SmtpSession::run`]
/// returns.
#[derive(Debug)]
pub struct SmtpSession<S> {
    id: u64,
    peer: String,
    reader: BufReader<S>,
}

impl<S: Read + Write> SmtpSession<S> {
    /// Create a session for an accepted stream
    pub fn new(id: u64, peer: impl Into<String>, stream: S) -> Self {
        Self {
            id,
            peer: peer.into(),
            reader: BufReader::new(stream),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Greet the client and answer lines until it quits, closes or fails.
    ///
    /// Never returns an error: every outcome is logged and reported through
    /// the returned [`SessionEnd`].
    pub fn run(mut self, hostname: &str, server_name: &str) -> SessionEnd {
        let span = info_span!("session", conn_id = self.id, client_addr = %self.peer);
        let _enter = span.enter();

        info!("Connection start");

        let handler = SmtpCommandHandler::new(hostname);
        let end = self.converse(&handler, server_name);

        drop(self.reader);
        info!(reason = ?end, "Connection closed");
        end
    }

    fn converse(&mut self, handler: &SmtpCommandHandler, server_name: &str) -> SessionEnd {
        let greeting = SmtpResponse::greeting(handler.hostname(), server_name);
        if self.send_response(&greeting).is_err() {
            return SessionEnd::WriteError;
        }

        let mut line_buffer = Vec::new();
        loop {
            line_buffer.clear();

            match self.reader.read_until(b'\n', &mut line_buffer) {
                Ok(0) => {
                    info!("Connection closed by client");
                    return SessionEnd::ClientClosed;
                }
                Ok(_) => {
                    let line = CommandLine::new(std::mem::take(&mut line_buffer));
                    info!(line = %line.raw.escape_ascii(), "client → server");

                    if !line.raw.ends_with(b"\n") {
                        // Trailing fragment before end of stream, nothing left to answer
                        info!("Connection closed by client");
                        return SessionEnd::ClientClosed;
                    }

                    let Some(response) = handler.process_command(&line) else {
                        continue;
                    };

                    if self.send_response(&response).is_err() {
                        return SessionEnd::WriteError;
                    }
                    if response.closes_session() {
                        return SessionEnd::Quit;
                    }
                }
                Err(e) => {
                    error!(error = %e, "Error reading from client");
                    return SessionEnd::ReadError;
                }
            }
        }
    }

    /// Log and write one response
    fn send_response(&mut self, response: &SmtpResponse) -> io::Result<()> {
        let formatted = response.format();
        info!(line = %formatted.as_bytes().escape_ascii(), "server → client");

        let stream = self.reader.get_mut();
        let result = stream
            .write_all(formatted.as_bytes())
            .and_then(|()| stream.flush());
        if let Err(ref e) = result {
            error!(error = %e, "Error writing to client");
        }
        result
    }
}
