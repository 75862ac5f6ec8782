//! Logging hook for completion traffic and turn failures.
//!
//! [`ClientLogger`] lets callers observe every request the [`Gemini`] client
//! sends, every response it parses, and every error a chat turn ends with.
//! [`StderrLogger`] is the implementation the `markchat-chat` binary installs.
//!
//! [`Gemini`]: crate::Gemini

use crate::Error;
use crate::types::{GenerateContentRequest, GenerateContentResponse};

/// A trait for logging completion traffic.
///
/// # Example
///
/// ```rust,ignore
/// use markchat::{ClientLogger, Error, GenerateContentRequest, GenerateContentResponse};
/// use std::sync::Mutex;
///
/// struct FileLogger {
///     file: Mutex<std::fs::File>,
/// }
///
/// impl ClientLogger for FileLogger {
///     fn log_request(&self, request: &GenerateContentRequest) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Request: {}", serde_json::to_string(request).unwrap()).unwrap();
///     }
///
///     fn log_response(&self, response: &GenerateContentResponse) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Response: {}", serde_json::to_string(response).unwrap()).unwrap();
///     }
///
///     fn log_error(&self, error: &Error) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Error: {error}").unwrap();
///     }
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Log a request just before it is sent.
    fn log_request(&self, request: &GenerateContentRequest);

    /// Log a successfully parsed response.
    fn log_response(&self, response: &GenerateContentResponse);

    /// Log the error a chat turn ended with.
    fn log_error(&self, error: &Error);
}

/// Writes to standard error.
///
/// Errors are always written.  Requests and responses are written as JSON
/// only when the logger is verbose.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrLogger {
    verbose: bool,
}

impl StderrLogger {
    /// Creates a logger; `verbose` also enables request/response dumps.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// True when requests and responses are logged.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

impl ClientLogger for StderrLogger {
    fn log_request(&self, request: &GenerateContentRequest) {
        if self.verbose {
            match serde_json::to_string(request) {
                Ok(json) => eprintln!("[request] {json}"),
                Err(err) => eprintln!("[request] <unserializable: {err}>"),
            }
        }
    }

    fn log_response(&self, response: &GenerateContentResponse) {
        if self.verbose {
            match serde_json::to_string(response) {
                Ok(json) => eprintln!("[response] {json}"),
                Err(err) => eprintln!("[response] <unserializable: {err}>"),
            }
        }
    }

    fn log_error(&self, error: &Error) {
        eprintln!("[error] {error}");
    }
}
