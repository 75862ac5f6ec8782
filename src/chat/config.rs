//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::client::DEFAULT_MODEL;
use crate::render::DEFAULT_TYPING_INTERVAL;

/// Placeholder shown in a reply slot while the request is in flight.
pub const DEFAULT_LOADING_TEXT: &str = "Just a sec...";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Command-line arguments for the markchat-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: gemini-2.5-flash)", "MODEL")]
    pub model: Option<String>,

    /// Base URL of the completion endpoint.
    #[arrrg(optional, "Base URL of the endpoint", "URL")]
    pub base_url: Option<String>,

    /// Milliseconds between revealed words.
    #[arrrg(optional, "Typing interval in milliseconds (default: 100)", "MS")]
    pub typing_interval_ms: Option<u64>,

    /// Request timeout in seconds.
    #[arrrg(optional, "Request timeout in seconds (default: 60)", "SECS")]
    pub timeout_secs: Option<u64>,

    /// Render every reply at once.
    #[arrrg(flag, "Disable the typing animation")]
    pub no_typing: bool,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,

    /// Log requests and responses to stderr.
    #[arrrg(flag, "Log requests and responses to stderr")]
    pub verbose: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// The model to use for generating responses.
    pub model: String,

    /// Endpoint override; `None` uses the public Gemini endpoint.
    pub base_url: Option<String>,

    /// Request timeout.
    pub timeout: Duration,

    /// Time between revealed words.
    pub typing_interval: Duration,

    /// Whether replies without block code are typed out.
    pub typing_enabled: bool,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Placeholder shown while a reply is loading.
    pub loading_text: String,

    /// Whether requests and responses are logged.
    pub verbose: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: gemini-2.5-flash
    /// - Timeout: 60 s
    /// - Typing: enabled, 100 ms per word
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            typing_interval: DEFAULT_TYPING_INTERVAL,
            typing_enabled: true,
            use_color: true,
            loading_text: DEFAULT_LOADING_TEXT.to_string(),
            verbose: false,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the endpoint base URL.
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the time between revealed words.
    pub fn with_typing_interval(mut self, interval: Duration) -> Self {
        self.typing_interval = interval;
        self
    }

    /// Enables or disables the typing animation.
    pub fn with_typing(mut self, enabled: bool) -> Self {
        self.typing_enabled = enabled;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Sets the loading placeholder.
    pub fn with_loading_text(mut self, text: impl Into<String>) -> Self {
        self.loading_text = text.into();
        self
    }

    /// Enables request and response logging.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        let defaults = ChatConfig::new();
        ChatConfig {
            model: args.model.unwrap_or(defaults.model),
            base_url: args.base_url,
            timeout: args
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            typing_interval: args
                .typing_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.typing_interval),
            typing_enabled: !args.no_typing,
            use_color: !args.no_color,
            verbose: args.verbose,
            ..defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert!(config.base_url.is_none());
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.typing_interval, Duration::from_millis(100));
        assert!(config.typing_enabled);
        assert!(config.use_color);
        assert_eq!(config.loading_text, "Just a sec...");
        assert!(!config.verbose);
    }

    #[test]
    fn config_from_args_defaults() {
        let config = ChatConfig::from(ChatArgs::default());
        assert_eq!(config, ChatConfig::new());
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            model: Some("gemini-2.5-pro".to_string()),
            base_url: Some("http://localhost:8080/v1beta/".to_string()),
            typing_interval_ms: Some(25),
            timeout_secs: Some(5),
            no_typing: true,
            no_color: true,
            verbose: true,
        };
        let config = ChatConfig::from(args);
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(
            config.base_url.as_deref(),
            Some("http://localhost:8080/v1beta/")
        );
        assert_eq!(config.typing_interval, Duration::from_millis(25));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(!config.typing_enabled);
        assert!(!config.use_color);
        assert!(config.verbose);
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_model("gemini-2.0-flash")
            .with_base_url(Some("https://proxy.example.com/".to_string()))
            .with_timeout(Duration::from_secs(10))
            .with_typing_interval(Duration::from_millis(10))
            .with_typing(false)
            .without_color()
            .with_loading_text("thinking")
            .with_verbose(true);

        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.base_url.as_deref(), Some("https://proxy.example.com/"));
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.typing_interval, Duration::from_millis(10));
        assert!(!config.typing_enabled);
        assert!(!config.use_color);
        assert_eq!(config.loading_text, "thinking");
        assert!(config.verbose);
    }
}
