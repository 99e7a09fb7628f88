//! # rawsmtp
//!
//! rawsmtp is a raw SMTP debug server.
//!
//! It accepts any client, answers just enough of the SMTP handshake to keep
//! the client talking, and logs every line in both directions through
//! [`tracing`]. It never validates, queues or delivers anything.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rawsmtp::SmtpServer;
//! use std::thread;
//!
//! let server = SmtpServer::new("raw-debug.local");
//!
//! thread::spawn(move || {
//!     server.start("127.0.0.1:2525").unwrap();
//! });
//!
//! // Point the application under test at localhost:2525 and read the logs
//! ```
//!
//! ## Replies
//!
//! Lines are trimmed and upper-cased, then matched in this order:
//!
//! - `EHLO <domain>` - `250-<hostname>`, `250-8BITMIME`, `250 ENHANCEDSTATUSCODES`
//! - `HELO <domain>` - `250 <hostname>`
//! - `MAIL FROM:` / `RCPT TO:` - `250 OK`
//! - `DATA` - `354 End data with <CR><LF>.<CR><LF>`
//! - `.` - `250 OK: Message accepted`
//! - `QUIT` - `221 Bye`, then the connection is closed
//! - `RSET` / `NOOP` - `250 OK`
//! - `HELP` - `214 Raw debug server`
//! - anything else - `250 OK`
//!
//! Blank lines get no reply.
//!
//! ## Notes
//!
//! - Command order is not enforced.
//! - Each connection runs on its own thread; there is no connection limit.
//! - SMTP authentication is not supported.
//! - SSL/TLS connection is not supported.

pub mod config;
mod smtp;

pub use config::{Config, ConfigError};
pub use smtp::{
    CommandLine, SessionEnd, SmtpCommand, SmtpCommandHandler, SmtpError, SmtpResponse, SmtpServer,
    SmtpSession,
};
pub use smtp::server::{DEFAULT_HOSTNAME, DEFAULT_SERVER_NAME};
