//! A terminal chat client for the Gemini `generateContent` endpoint.
//!
//! Model replies are converted from markdown to sanitized HTML by
//! [`markdown::transform`] and presented by a [`render::RenderScheduler`],
//! either at once or typed out word by word.  [`chat::ChatSession`] ties the
//! pieces together for one conversation.

// Public modules
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod error;
pub mod history;
pub mod markdown;
pub mod observability;
pub mod render;
pub mod terminal;
pub mod types;

// Re-exports
pub use client::{CompletionBackend, DEFAULT_MODEL, Gemini};
pub use client_logger::{ClientLogger, StderrLogger};
pub use error::{Error, Result};
pub use history::History;
pub use markdown::transform;
pub use observability::register_biometrics;
pub use render::{MessageSlot, RenderMode, RenderOutcome, RenderScheduler, TranscriptView, Viewport};
pub use types::*;
