use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use url::Url;

use crate::client_logger::ClientLogger;
use crate::error::{Error, Result};
use crate::observability::{
    CLIENT_MALFORMED_RESPONSES, CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS,
};
use crate::types::{ErrorResponse, GenerateContentRequest, GenerateContentResponse, Turn};

const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Anything that can turn a conversation into the model's next reply.
///
/// [`ChatSession`](crate::chat::ChatSession) talks to the endpoint only
/// through this trait.
///
/// ```
/// use markchat::{CompletionBackend, Result, Turn};
///
/// struct Canned;
///
/// #[async_trait::async_trait]
/// impl CompletionBackend for Canned {
///     async fn complete(&self, _history: &[Turn]) -> Result<String> {
///         Ok("**hi**".to_string())
///     }
///
///     fn model(&self) -> &str {
///         "canned"
///     }
///
///     fn set_model(&mut self, _model: String) {}
/// }
///
/// # tokio_test::block_on(async {
/// let reply = Canned.complete(&[Turn::user("hello")]).await.unwrap();
/// assert_eq!(reply, "**hi**");
/// # });
/// ```
#[async_trait::async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Sends the full history and returns the raw text of the reply.
    async fn complete(&self, history: &[Turn]) -> Result<String>;

    /// The model replies come from.
    fn model(&self) -> &str;

    /// Switches the model for later requests.
    fn set_model(&mut self, model: String);
}

/// Client for the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct Gemini {
    api_key: HeaderValue,
    client: ReqwestClient,
    base_url: Url,
    model: String,
    timeout: Duration,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl Gemini {
    /// Create a new Gemini client.
    ///
    /// The API key can be provided directly or read from the GEMINI_API_KEY
    /// environment variable.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_options(api_key, None, None, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        api_key: Option<String>,
        base_url: Option<String>,
        model: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = match api_key {
            Some(key) => key,
            None => env::var(API_KEY_ENV).map_err(|_| {
                Error::authentication(
                    "API key not provided and GEMINI_API_KEY environment variable not set",
                )
            })?,
        };
        let mut api_key = HeaderValue::from_str(&api_key)
            .map_err(|_| Error::authentication("API key contains invalid characters"))?;
        api_key.set_sensitive(true);

        let base_url = parse_base_url(base_url.as_deref().unwrap_or(DEFAULT_API_URL))?;
        let model = model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        if model.trim().is_empty() {
            return Err(Error::validation("model name is empty", Some("model".into())));
        }

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            api_key,
            client,
            base_url,
            model,
            timeout,
            logger: None,
        })
    }

    /// Attaches a logger observing every request and response.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The URL of the `generateContent` method for the current model.
    pub fn endpoint(&self) -> Result<Url> {
        Ok(self
            .base_url
            .join(&format!("models/{}:generateContent", self.model))?)
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert("x-goog-api-key", self.api_key.clone());
        headers
    }

    /// Send the conversation and return the text of the first candidate.
    ///
    /// The request carries every turn of `history`, oldest first.
    pub async fn send(&self, history: &[Turn]) -> Result<String> {
        if history.is_empty() {
            return Err(Error::validation(
                "cannot request a reply to an empty conversation",
                Some("contents".to_string()),
            ));
        }
        let request = GenerateContentRequest::from_turns(history);
        if let Some(logger) = &self.logger {
            logger.log_request(&request);
        }

        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let result = self.execute(&request).await;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        match result {
            Ok(response) => {
                if let Some(logger) = &self.logger {
                    logger.log_response(&response);
                }
                reply_text(&response)
            }
            Err(err) => {
                CLIENT_REQUEST_ERRORS.click();
                Err(err)
            }
        }
    }

    async fn execute(&self, request: &GenerateContentRequest) -> Result<GenerateContentResponse> {
        let url = self.endpoint()?;

        let response = self
            .client
            .post(url)
            .headers(self.default_headers())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::timeout(
                        format!("Request timed out: {}", e),
                        Some(self.timeout.as_secs_f64()),
                    )
                } else if e.is_connect() {
                    Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
                } else {
                    Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
                }
            })?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        let body = response.text().await.map_err(|e| {
            Error::http_client(
                format!("Failed to read response body: {}", e),
                Some(Box::new(e)),
            )
        })?;
        parse_success_body(&body)
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();
        match response.text().await {
            Ok(body) => error_from_body(status_code, &body),
            Err(e) => Error::http_client(
                format!("Failed to read error response: {}", e),
                Some(Box::new(e)),
            ),
        }
    }
}

impl fmt::Debug for Gemini {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gemini")
            .field("base_url", &self.base_url.as_str())
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("logger", &self.logger.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl CompletionBackend for Gemini {
    async fn complete(&self, history: &[Turn]) -> Result<String> {
        self.send(history).await
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn set_model(&mut self, model: String) {
        self.model = model;
    }
}

fn parse_base_url(base_url: &str) -> Result<Url> {
    // Url::join drops the last path segment unless it ends in a slash.
    let mut base_url = base_url.to_string();
    if !base_url.ends_with('/') {
        base_url.push('/');
    }
    Ok(Url::parse(&base_url)?)
}

/// Builds the error for a non-success response.
///
/// The server's `error.message` is preferred; a body that is not an error
/// object is used verbatim.
fn error_from_body(status_code: u16, body: &str) -> Error {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    Error::api(status_code, message)
}

fn parse_success_body(body: &str) -> Result<GenerateContentResponse> {
    serde_json::from_str(body).map_err(|e| {
        CLIENT_MALFORMED_RESPONSES.click();
        Error::malformed_response(format!("response is not a generateContent body: {e}"))
    })
}

fn reply_text(response: &GenerateContentResponse) -> Result<String> {
    match response.first_text() {
        Some(text) => Ok(text.to_string()),
        None => {
            CLIENT_MALFORMED_RESPONSES.click();
            Err(Error::malformed_response(
                "response has no candidates[0].content.parts[0].text",
            ))
        }
    }
}
