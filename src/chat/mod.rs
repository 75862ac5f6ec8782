//! Chat application module for interactive conversations with Gemini.
//!
//! This module provides a REPL chat interface built on top of the markchat
//! client library. It supports:
//!
//! - Markdown replies rendered to sanitized HTML
//! - Word-by-word typing of replies, or instant display for code
//! - Slash commands for session control
//! - Configurable model, endpoint, and typing speed
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: Core chat session management and backend interaction
//! - [`commands`]: Slash command parsing and handling

mod commands;
mod config;
mod session;

pub use crate::terminal::{TerminalSlot, TerminalTranscript};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig, DEFAULT_LOADING_TEXT};
pub use session::{ChatSession, SessionStats, TurnOutcome};
