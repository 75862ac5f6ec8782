//! Interactive chat application for conversing with Gemini.
//!
//! This binary provides a REPL interface for chatting with Gemini models via
//! the `generateContent` endpoint.  Replies are rendered from markdown and
//! typed out word by word unless they contain code.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with default settings (reads GEMINI_API_KEY)
//! markchat-chat
//!
//! # Specify a model
//! markchat-chat --model gemini-2.5-pro
//!
//! # Faster typing, or none at all
//! markchat-chat --typing-interval-ms 30
//! markchat-chat --no-typing
//!
//! # Disable colors (useful for piping output)
//! markchat-chat --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/model <name>` - Change the model
//! - `/typing on|off` - Toggle the typing animation
//! - `/history` - Show the conversation so far
//! - `/stats` - Show session statistics
//! - `/quit` - Exit the application

use std::sync::{Arc, Mutex, PoisonError};

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio_util::sync::CancellationToken;

use markchat::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, TerminalTranscript, TurnOutcome, help_text,
    parse_command,
};
use markchat::terminal::html_to_terminal;
use markchat::{Gemini, History, Role, StderrLogger};

/// Main entry point for the markchat-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("markchat-chat [OPTIONS]");
    let config = ChatConfig::from(args);
    let logger = Arc::new(StderrLogger::new(config.verbose));

    let client = Gemini::with_options(
        None,
        config.base_url.clone(),
        Some(config.model.clone()),
        Some(config.timeout),
    )?
    .with_logger(logger.clone());
    let mut transcript = TerminalTranscript::new(config.use_color);
    let mut session = ChatSession::new(client, config).with_logger(logger);
    let mut rl = DefaultEditor::new()?;

    // Token for the turn in flight; replaced before each turn.
    let cancel = Arc::new(Mutex::new(CancellationToken::new()));

    // Set up Ctrl+C handler
    let cancel_clone = Arc::clone(&cancel);
    ctrlc::set_handler(move || {
        cancel_clone
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
    })?;

    println!("Gemini Chat (model: {})", session.model());
    println!("Type /help for commands, /quit to exit\n");

    loop {
        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                // Check for slash commands
                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Model(model_name) => {
                            println!("Model changed to: {}", model_name);
                            session.set_model(model_name);
                        }
                        ChatCommand::Typing(enabled) => {
                            session.set_typing(enabled);
                            if enabled {
                                println!("Typing animation enabled.");
                            } else {
                                println!("Typing animation disabled.");
                            }
                        }
                        ChatCommand::History => {
                            print_history(session.history(), transcript.use_color());
                        }
                        ChatCommand::Stats => {
                            print_stats(&session);
                        }
                        ChatCommand::Invalid(message) => {
                            eprintln!("Error: {message}");
                        }
                    }
                    continue;
                }

                // Regular message - send to the endpoint
                let token = CancellationToken::new();
                *cancel.lock().unwrap_or_else(PoisonError::into_inner) = token.clone();

                println!("Gemini:");
                if let TurnOutcome::Replied(outcome) =
                    session.submit(line, &mut transcript, &token).await
                    && outcome.cancelled
                {
                    println!("[interrupted]");
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                eprintln!("Input error: {}", err);
                break;
            }
        }
    }

    Ok(())
}

fn print_stats(session: &ChatSession) {
    let stats = session.stats();
    println!("    Session Statistics:");
    println!("      Model: {}", stats.model);
    println!(
        "      Turns: {} ({} user / {} model)",
        stats.turn_count, stats.user_turns, stats.model_turns
    );
    println!(
        "      Requests: {} ({} failed)",
        stats.total_requests, stats.failed_requests
    );
    println!(
        "      Renders: {} typed / {} instant",
        stats.typed_renders, stats.instant_renders
    );
    println!(
        "      Typing: {} ({} ms per word)",
        if stats.typing_enabled { "on" } else { "off" },
        stats.typing_interval.as_millis()
    );
}

fn print_history(history: &History, use_color: bool) {
    if history.is_empty() {
        println!("    (no messages yet)");
        return;
    }
    for turn in history {
        // Model turns hold reply HTML.
        let text = match turn.role() {
            Role::Model => html_to_terminal(turn.text(), use_color),
            Role::User => turn.text().to_string(),
        };
        println!("    [{}] {}", turn.role(), text);
    }
}
