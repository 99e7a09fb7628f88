//! Command classification for the debug sink
//!
//! Every received line is matched against the rule table from top to bottom and
//! the first hit decides the reply. Nothing is ever rejected: a non-empty line
//! that matches no rule is answered like a successful command so the client
//! keeps talking.

use crate::smtp::response::SmtpResponse;

use tracing::warn;

/// Commands the sink recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpCommand {
    Ehlo,
    Helo,
    MailFrom,
    RcptTo,
    Data,
    /// A line holding only `.`, ending the DATA body
    EndOfData,
    Quit,
    Rset,
    Noop,
    Help,
    /// Unrecognized command or DATA payload
    Unknown,
}

/// How a rule tests the normalized line
#[derive(Debug, Clone, Copy)]
enum Matcher {
    Prefix(&'static str),
    Exact(&'static str),
}

impl Matcher {
    fn matches(&self, normalized: &str) -> bool {
        match self {
            Matcher::Prefix(prefix) => normalized.starts_with(prefix),
            Matcher::Exact(text) => normalized == *text,
        }
    }
}

/// Classification rules, first match wins.
///
/// `.` must stay ahead of the [`SmtpCommand::Unknown`] fallback so that the
/// end-of-data marker gets its own acknowledgment.
const RULES: &[(Matcher, SmtpCommand)] = &[
    (Matcher::Prefix("EHLO "), SmtpCommand::Ehlo),
    (Matcher::Prefix("HELO "), SmtpCommand::Helo),
    (Matcher::Prefix("MAIL FROM:"), SmtpCommand::MailFrom),
    (Matcher::Prefix("RCPT TO:"), SmtpCommand::RcptTo),
    (Matcher::Prefix("DATA"), SmtpCommand::Data),
    (Matcher::Exact("."), SmtpCommand::EndOfData),
    (Matcher::Exact("QUIT"), SmtpCommand::Quit),
    (Matcher::Exact("RSET"), SmtpCommand::Rset),
    (Matcher::Exact("NOOP"), SmtpCommand::Noop),
    (Matcher::Exact("HELP"), SmtpCommand::Help),
];

/// Classify an already normalized line.
///
/// Returns `None` for an empty line, which gets no reply at all.
pub fn classify(normalized: &str) -> Option<SmtpCommand> {
    if normalized.is_empty() {
        return None;
    }

    let command = RULES
        .iter()
        .find(|(matcher, _)| matcher.matches(normalized))
        .map(|(_, command)| *command)
        .unwrap_or(SmtpCommand::Unknown);

    Some(command)
}

/// One line received from a client
#[derive(Debug, Clone)]
pub struct CommandLine {
    /// Exactly the bytes that arrived on the wire, line ending included
    pub raw: Vec<u8>,
    /// Trimmed and upper-cased, used only for classification.
    /// Invalid UTF-8 becomes replacement characters here.
    pub normalized: String,
}

impl CommandLine {
    pub fn new(raw: impl Into<Vec<u8>>) -> Self {
        let raw = raw.into();
        let normalized = String::from_utf8_lossy(&raw).to_uppercase().trim().to_owned();
        Self { raw, normalized }
    }

    pub fn command(&self) -> Option<SmtpCommand> {
        classify(&self.normalized)
    }
}

/// Maps classified commands to replies
#[derive(Debug)]
pub struct SmtpCommandHandler<'a> {
    hostname: &'a str,
}

impl<'a> SmtpCommandHandler<'a> {
    /// Create a new command handler
    pub fn new(hostname: &'a str) -> Self {
        Self { hostname }
    }

    pub fn hostname(&self) -> &'a str {
        self.hostname
    }

    /// Decide the reply for a received line, if any
    pub fn process_command(&self, line: &CommandLine) -> Option<SmtpResponse> {
        let command = line.command()?;
        if command == SmtpCommand::Unknown {
            warn!("Unrecognized line or DATA content, sending OK");
        }
        Some(self.respond(command))
    }

    /// Reply for a classified command
    pub fn respond(&self, command: SmtpCommand) -> SmtpResponse {
        match command {
            SmtpCommand::Ehlo => SmtpResponse::ehlo(self.hostname),
            SmtpCommand::Helo => SmtpResponse::helo(self.hostname),
            SmtpCommand::Data => SmtpResponse::data_start(),
            SmtpCommand::EndOfData => SmtpResponse::message_accepted(),
            SmtpCommand::Quit => SmtpResponse::quit(),
            SmtpCommand::Help => SmtpResponse::help(),
            SmtpCommand::MailFrom
            | SmtpCommand::RcptTo
            | SmtpCommand::Rset
            | SmtpCommand::Noop
            | SmtpCommand::Unknown => SmtpResponse::ok(),
        }
    }
}
