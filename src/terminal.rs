//! Terminal rendering of the chat transcript.
//!
//! Replies arrive as the HTML produced by [`transform`](crate::markdown::transform).
//! [`html_to_terminal`] maps that small tag vocabulary onto ANSI styles so
//! the REPL can show it, and [`TerminalSlot`] prints each reply as it is
//! revealed.

use std::io::{self, Stdout, Write};

use crate::render::{MessageSlot, TranscriptView, Viewport};

/// ANSI escape code for bold text (used for strong and headings).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for dim text (used for the loading placeholder and code blocks).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for italic text (used for emphasis).
const ANSI_ITALIC: &str = "\x1b[3m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for inline code).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// Return to column zero and erase the line.
const ERASE_LINE: &str = "\r\x1b[2K";

const RULE_WIDTH: usize = 32;

/// Converts reply HTML into terminal text.
///
/// Formatting tags become ANSI styles when `use_color` is set and vanish
/// otherwise; `<br>` becomes a newline and entities are decoded.  A trailing
/// tag that has not been closed yet is left out, so converting a prefix of a
/// reply yields a prefix of the converted reply.
pub fn html_to_terminal(html: &str, use_color: bool) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(open) = rest.find('<') {
        push_text(&mut out, &rest[..open]);
        let Some(len) = rest[open..].find('>') else {
            return out;
        };
        push_tag(&mut out, &rest[open + 1..open + len], use_color);
        rest = &rest[open + len + 1..];
    }
    push_text(&mut out, rest);
    out
}

fn push_text(out: &mut String, text: &str) {
    let decoded = text
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");
    out.push_str(&decoded);
}

fn push_tag(out: &mut String, tag: &str, use_color: bool) {
    let closing = tag.starts_with('/');
    let tag = tag.trim_start_matches('/');
    let name = tag.split_whitespace().next().unwrap_or_default();
    let style = match (name, closing) {
        ("br", _) => {
            out.push('\n');
            return;
        }
        ("hr", _) => {
            out.push_str(&"─".repeat(RULE_WIDTH));
            return;
        }
        ("span", false) if tag.contains("content") => {
            out.push(' ');
            return;
        }
        ("strong" | "h1" | "h2" | "h3" | "h4", false) => ANSI_BOLD,
        ("em", false) => ANSI_ITALIC,
        ("pre", false) => ANSI_DIM,
        // Inline code only; a block's <code> carries its language class.
        ("code", false) if !tag.contains("class=") => ANSI_CYAN,
        ("strong" | "h1" | "h2" | "h3" | "h4" | "em" | "pre" | "code", true) => ANSI_RESET,
        _ => return,
    };
    if use_color {
        out.push_str(style);
    }
}

/// Prints one reply to a writer as it is revealed.
pub struct TerminalSlot<W: Write + Send = Stdout> {
    out: W,
    use_color: bool,
    html: String,
    printed: usize,
    placeholder: bool,
    loading: bool,
}

impl<W: Write + Send> TerminalSlot<W> {
    /// Creates a slot and prints its loading placeholder.
    pub fn new(out: W, use_color: bool, loading_text: &str) -> Self {
        let mut slot = Self {
            out,
            use_color,
            html: String::new(),
            printed: 0,
            placeholder: !loading_text.is_empty(),
            loading: true,
        };
        if slot.placeholder {
            if slot.use_color {
                slot.write(&format!("{ANSI_DIM}{loading_text}{ANSI_RESET}"));
            } else {
                slot.write(loading_text);
            }
            slot.flush();
        }
        slot
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The HTML the slot currently holds.
    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, text: &str) {
        let _ = self.out.write_all(text.as_bytes());
    }

    fn flush(&mut self) {
        let _ = self.out.flush();
    }

    fn clear_placeholder(&mut self) {
        if self.placeholder {
            if self.use_color {
                self.write(ERASE_LINE);
            } else {
                self.write("\n");
            }
            self.placeholder = false;
        }
    }

    fn print_new_text(&mut self) {
        let rendered = html_to_terminal(&self.html, self.use_color);
        if let Some(new) = rendered.get(self.printed..) {
            self.write(new);
            self.printed = rendered.len();
        }
        self.flush();
    }
}

impl<W: Write + Send> MessageSlot for TerminalSlot<W> {
    fn set_html(&mut self, html: &str) {
        self.clear_placeholder();
        if self.printed > 0 {
            // Printed text cannot be taken back; start the new content below it.
            self.write("\n");
            self.printed = 0;
        }
        self.html = html.to_string();
        self.print_new_text();
    }

    fn append_html(&mut self, html: &str) {
        self.clear_placeholder();
        self.html.push_str(html);
        self.print_new_text();
    }

    fn finish_loading(&mut self) {
        if !self.loading {
            return;
        }
        self.loading = false;
        self.clear_placeholder();
        if self.use_color {
            self.write(ANSI_RESET);
        }
        self.write("\n");
        self.flush();
    }

    fn show_error(&mut self, message: &str) {
        self.clear_placeholder();
        if self.use_color {
            self.write(&format!("{ANSI_RED}Error: {message}{ANSI_RESET}"));
        } else {
            self.write(&format!("Error: {message}"));
        }
        self.finish_loading();
    }
}

/// The REPL's transcript on standard output.
pub struct TerminalTranscript {
    stdout: Stdout,
    use_color: bool,
}

impl TerminalTranscript {
    pub fn new(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
        }
    }

    pub fn use_color(&self) -> bool {
        self.use_color
    }
}

impl Default for TerminalTranscript {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Viewport for TerminalTranscript {
    fn scroll_to_bottom(&mut self) {
        let _ = self.stdout.flush();
    }
}

impl TranscriptView for TerminalTranscript {
    fn append_user(&mut self, _text: &str) {
        // The line editor has already echoed the input.
    }

    fn open_reply(&mut self, loading_text: &str) -> Box<dyn MessageSlot> {
        Box::new(TerminalSlot::new(io::stdout(), self.use_color, loading_text))
    }
}
