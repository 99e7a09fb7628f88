//! Connection dispatcher

use crate::smtp::error::SmtpError;
use crate::smtp::session::SmtpSession;

use std::io;
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Hostname advertised in the greeting and HELO/EHLO replies
pub const DEFAULT_HOSTNAME: &str = "raw-debug.local";

/// Product name shown in the greeting
pub const DEFAULT_SERVER_NAME: &str = "Raw Debug Server";

/// Debug SMTP server that accepts everything and logs every line
#[derive(Debug, Clone)]
pub struct SmtpServer {
    /// Server hostname
    hostname: Arc<str>,
    /// Name shown after `ESMTP` in the greeting
    server_name: Arc<str>,
    /// Read timeout applied to each session, `None` waits forever
    idle_timeout: Option<Duration>,
    /// Last assigned connection id
    connection_count: Arc<AtomicU64>,
}

impl Default for SmtpServer {
    fn default() -> Self {
        Self::new(DEFAULT_HOSTNAME)
    }
}

impl SmtpServer {
    /// Create a new server advertising `hostname`
    pub fn new(hostname: &str) -> Self {
        Self {
            hostname: Arc::from(hostname),
            server_name: Arc::from(DEFAULT_SERVER_NAME),
            idle_timeout: None,
            connection_count: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Set the product name used in the greeting
    pub fn with_server_name(mut self, server_name: &str) -> Self {
        self.server_name = Arc::from(server_name);
        self
    }

    /// End sessions whose client stays silent for `timeout`
    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Number of connections accepted so far
    pub fn connection_count(&self) -> u64 {
        self.connection_count.load(Ordering::SeqCst)
    }

    /// Bind to `addr` and serve forever (blocking)
    pub fn start(&self, addr: &str) -> Result<(), SmtpError> {
        let listener = TcpListener::bind(addr).map_err(|source| SmtpError::Bind {
            addr: addr.to_owned(),
            source,
        })?;
        self.start_with_listener(listener)
    }

    /// Serve forever on an existing listener (blocking)
    ///
    /// Only a listener that cannot report its own address makes this return.
    pub fn start_with_listener(&self, listener: TcpListener) -> Result<(), SmtpError> {
        info!(addr = %listener.local_addr()?, "SMTP debug server listening");
        self.serve(listener.incoming());
        Ok(())
    }

    /// Dispatch every accepted stream; accept failures are logged and skipped
    pub fn serve<I>(&self, incoming: I)
    where
        I: IntoIterator<Item = io::Result<TcpStream>>,
    {
        for stream in incoming {
            match stream {
                Ok(stream) => self.dispatch(stream),
                Err(e) => {
                    warn!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    /// Start a detached session thread for an accepted stream
    fn dispatch(&self, stream: TcpStream) {
        let conn_id = self.connection_count.fetch_add(1, Ordering::SeqCst) + 1;
        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_owned());

        if let Err(e) = stream.set_read_timeout(self.idle_timeout) {
            warn!(conn_id, error = %e, "Failed to set idle timeout");
        }

        let hostname = Arc::clone(&self.hostname);
        let server_name = Arc::clone(&self.server_name);
        let spawned = thread::Builder::new()
            .name(format!("smtp-session-{conn_id}"))
            .spawn(move || {
                let end = SmtpSession::new(conn_id, peer, stream).run(&hostname, &server_name);
                debug!(conn_id, reason = ?end, "Session thread finished");
            });

        if let Err(e) = spawned {
            error!(conn_id, error = %e, "Failed to start session thread");
        }
    }
}
