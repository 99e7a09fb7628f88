//! SMTP response handling

/// Represents an SMTP response that can be sent to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpResponse {
    /// The SMTP response code (e.g., "250", "354", "221")
    pub code: &'static str,
    /// The human-readable message
    pub message: String,
    /// Continuation lines for EHLO responses
    pub multiline: Option<Vec<String>>,
}

impl SmtpResponse {
    /// Create a new SMTP response
    pub fn new(code: &'static str, message: &str) -> Self {
        Self {
            code,
            message: message.to_owned(),
            multiline: None,
        }
    }

    /// Create a new multiline SMTP response
    pub fn new_multiline(code: &'static str, message: &str, lines: Vec<String>) -> Self {
        Self {
            code,
            message: message.to_owned(),
            multiline: Some(lines),
        }
    }

    /// Create a success response (250 OK)
    pub fn ok() -> Self {
        Self::new("250", "OK")
    }

    /// Create a greeting response (220)
    pub fn greeting(hostname: &str, server_name: &str) -> Self {
        Self::new("220", &format!("{hostname} ESMTP {server_name}"))
    }

    /// Create a HELO response (250)
    pub fn helo(hostname: &str) -> Self {
        Self::new("250", hostname)
    }

    /// Create an EHLO response (250) advertising 8BITMIME and enhanced status codes
    pub fn ehlo(hostname: &str) -> Self {
        let capabilities = vec!["8BITMIME".to_owned(), "ENHANCEDSTATUSCODES".to_owned()];
        Self::new_multiline("250", hostname, capabilities)
    }

    /// Create a DATA intermediate response (354)
    pub fn data_start() -> Self {
        Self::new("354", "End data with <CR><LF>.<CR><LF>")
    }

    /// Create the end-of-data response (250)
    pub fn message_accepted() -> Self {
        Self::new("250", "OK: Message accepted")
    }

    /// Create a QUIT response (221)
    pub fn quit() -> Self {
        Self::new("221", "Bye")
    }

    /// Create a HELP response (214)
    pub fn help() -> Self {
        Self::new("214", "Raw debug server")
    }

    /// Format the response for sending over the wire
    pub fn format(&self) -> String {
        if let Some(ref lines) = self.multiline {
            let mut result = format!("{}-{}\r\n", self.code, self.message);
            for (i, line) in lines.iter().enumerate() {
                if i == lines.len() - 1 {
                    // Last line uses space instead of dash
                    result.push_str(&format!("{} {}\r\n", self.code, line));
                } else {
                    result.push_str(&format!("{}-{}\r\n", self.code, line));
                }
            }
            result
        } else {
            format!("{} {}\r\n", self.code, self.message)
        }
    }

    /// Whether the session must end once this response has been written
    pub fn closes_session(&self) -> bool {
        self.code == "221"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_format() {
        let response = SmtpResponse::greeting("raw-debug.local", "Raw Debug Server");
        assert_eq!(
            response.format(),
            "220 raw-debug.local ESMTP Raw Debug Server\r\n"
        );
    }

    #[test]
    fn test_helo_format() {
        assert_eq!(
            SmtpResponse::helo("raw-debug.local").format(),
            "250 raw-debug.local\r\n"
        );
    }

    #[test]
    fn test_ehlo_format() {
        let formatted = SmtpResponse::ehlo("raw-debug.local").format();
        assert_eq!(
            formatted,
            "250-raw-debug.local\r\n250-8BITMIME\r\n250 ENHANCEDSTATUSCODES\r\n"
        );
    }

    #[test]
    fn test_fixed_replies() {
        assert_eq!(SmtpResponse::ok().format(), "250 OK\r\n");
        assert_eq!(
            SmtpResponse::data_start().format(),
            "354 End data with <CR><LF>.<CR><LF>\r\n"
        );
        assert_eq!(
            SmtpResponse::message_accepted().format(),
            "250 OK: Message accepted\r\n"
        );
        assert_eq!(SmtpResponse::quit().format(), "221 Bye\r\n");
        assert_eq!(SmtpResponse::help().format(), "214 Raw debug server\r\n");
    }

    #[test]
    fn test_multiline_single_continuation() {
        let response = SmtpResponse::new_multiline("250", "Hello", vec!["SIZE 1000".to_owned()]);
        assert_eq!(response.format(), "250-Hello\r\n250 SIZE 1000\r\n");
    }

    #[test]
    fn test_closes_session() {
        assert!(SmtpResponse::quit().closes_session());
        assert!(!SmtpResponse::ok().closes_session());
        assert!(!SmtpResponse::help().closes_session());
    }
}
