use rawsmtp::{Config, SmtpError, SmtpServer};
use std::net::TcpListener;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    init_logging(&config.log_level)?;

    let addr = config.listen_addr();
    let listener = match TcpListener::bind(&addr) {
        Ok(listener) => listener,
        Err(source) => {
            let e = SmtpError::Bind { addr, source };
            error!(error = %e, "Failed to listen on port {}", config.port);
            std::process::exit(1);
        }
    };

    println!("RAW SMTP Debug Server listening on port {}...", config.port);
    println!("Logging ALL raw SMTP traffic - no parsing, just pure data");
    println!("Press Ctrl+C to stop");
    println!("{}", "=".repeat(70));

    let server = SmtpServer::new(&config.hostname)
        .with_server_name(&config.server_name)
        .with_idle_timeout(config.idle_timeout);
    server.start_with_listener(listener)?;

    Ok(())
}

/// `RUST_LOG` wins over the configured level
fn init_logging(level: &str) -> Result<(), SmtpError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            EnvFilter::try_new(level).map_err(|_| SmtpError::InvalidLogLevel(level.to_owned()))?
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .init();

    Ok(())
}
