//! Presentation of rendered replies.
//!
//! The [`RenderScheduler`] decides how an HTML reply reaches its message
//! slot.  Replies carrying block code are shown at once so the highlighter
//! sees the whole block.  Everything else is revealed a word at a time by a
//! [`Typewriter`] driven from a tokio interval.
//!
//! The traits here are the seam to whatever displays the transcript:
//! [`TranscriptView`] owns the viewport and hands out [`MessageSlot`]s, one
//! per reply.

use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::markdown::{contains_block_code, escape_html};
use crate::observability::{RENDER_CANCELLED, RENDER_INSTANT, RENDER_TICKS, RENDER_TYPED};

/// Time between two revealed words.
pub const DEFAULT_TYPING_INTERVAL: Duration = Duration::from_millis(100);

const MIN_TYPING_INTERVAL: Duration = Duration::from_millis(1);

/// Something that can keep its newest content in view.
pub trait Viewport: Send {
    /// Brings the latest content into view.
    fn scroll_to_bottom(&mut self);
}

/// The display area of one reply.
///
/// A slot starts out loading, showing a placeholder, and stops loading
/// exactly once.
pub trait MessageSlot: Send {
    /// Replaces the slot's content.
    fn set_html(&mut self, html: &str);

    /// Appends to the slot's content.
    fn append_html(&mut self, html: &str);

    /// Marks the slot as no longer loading.
    fn finish_loading(&mut self);

    /// Shows an error in place of a reply and stops loading.
    fn show_error(&mut self, message: &str) {
        self.set_html(&escape_html(message));
        self.finish_loading();
    }
}

/// Post-processes a slot whose block code has been rendered.
pub trait Highlighter: Send + Sync {
    /// Highlights the code blocks in `slot`.
    fn highlight(&self, slot: &mut dyn MessageSlot);
}

/// The chat transcript.
pub trait TranscriptView: Viewport {
    /// Shows a message the user sent.
    fn append_user(&mut self, text: &str);

    /// Opens a loading slot for the next reply.
    fn open_reply(&mut self, loading_text: &str) -> Box<dyn MessageSlot>;
}

/// How a reply is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// All at once.
    Instant,
    /// One word per tick.
    Typing,
}

impl RenderMode {
    /// The natural mode for `html`: instant when it carries block code.
    pub fn for_html(html: &str) -> Self {
        if contains_block_code(html) {
            RenderMode::Instant
        } else {
            RenderMode::Typing
        }
    }
}

/// What happened while rendering one reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOutcome {
    /// The mode the reply was rendered in.
    pub mode: RenderMode,
    /// Timer ticks consumed.  Always zero in instant mode.
    pub ticks: usize,
    /// True when cancellation cut the animation short.
    pub cancelled: bool,
}

impl RenderOutcome {
    fn instant() -> Self {
        Self {
            mode: RenderMode::Instant,
            ticks: 0,
            cancelled: false,
        }
    }
}

/// Progress of a typing animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingState {
    /// Nothing revealed yet.
    Idle,
    /// This many tokens are on screen.
    Revealing(usize),
    /// Every token is on screen and the animation is over.
    Done,
}

/// Reveals HTML one space-separated token at a time.
///
/// Every token but the first is prefixed with a single space, so the
/// concatenation of everything revealed equals the input.
#[derive(Debug, Clone)]
pub struct Typewriter {
    tokens: Vec<String>,
    state: TypingState,
}

impl Typewriter {
    pub fn new(html: &str) -> Self {
        Self {
            tokens: html.split(' ').map(str::to_string).collect(),
            state: TypingState::Idle,
        }
    }

    pub fn state(&self) -> TypingState {
        self.state
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Number of tokens on screen.
    pub fn revealed_count(&self) -> usize {
        match self.state {
            TypingState::Idle => 0,
            TypingState::Revealing(n) => n,
            TypingState::Done => self.tokens.len(),
        }
    }

    /// The text on screen so far.
    pub fn revealed(&self) -> String {
        self.tokens[..self.revealed_count()].join(" ")
    }

    /// Moves the animation one tick forward.
    ///
    /// Returns the chunk to append, or `None` on the tick that ends the
    /// animation and for every tick after it.
    pub fn advance(&mut self) -> Option<String> {
        match self.state {
            TypingState::Done => None,
            TypingState::Revealing(n) if n >= self.tokens.len() => {
                self.state = TypingState::Done;
                None
            }
            _ => {
                let n = self.revealed_count();
                self.state = TypingState::Revealing(n + 1);
                Some(self.chunk(n))
            }
        }
    }

    /// Ends the animation early and returns everything not yet revealed.
    pub fn finish(&mut self) -> String {
        let start = self.revealed_count();
        self.state = TypingState::Done;
        (start..self.tokens.len()).map(|i| self.chunk(i)).collect()
    }

    fn chunk(&self, index: usize) -> String {
        if index == 0 {
            self.tokens[0].clone()
        } else {
            format!(" {}", self.tokens[index])
        }
    }
}

/// Animates `html` into `slot`, one token per `interval`.
///
/// The slot is cleared first.  The first token appears one interval after
/// the call and the viewport is scrolled after every reveal.  The tick after
/// the last reveal marks the slot as no longer loading.  When `cancel` fires
/// the rest of the reply is written at once.
///
/// Each call owns its timer, so distinct slots may be animated concurrently.
pub async fn type_out<V: Viewport + ?Sized>(
    html: &str,
    interval: Duration,
    slot: &mut dyn MessageSlot,
    viewport: &mut V,
    cancel: &CancellationToken,
) -> RenderOutcome {
    let period = interval.max(MIN_TYPING_INTERVAL);
    let mut typewriter = Typewriter::new(html);
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    slot.set_html("");

    let mut ticks = 0;
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                slot.append_html(&typewriter.finish());
                viewport.scroll_to_bottom();
                slot.finish_loading();
                RENDER_CANCELLED.click();
                return RenderOutcome {
                    mode: RenderMode::Typing,
                    ticks,
                    cancelled: true,
                };
            }
            _ = ticker.tick() => {
                ticks += 1;
                RENDER_TICKS.click();
                match typewriter.advance() {
                    Some(chunk) => {
                        slot.append_html(&chunk);
                        viewport.scroll_to_bottom();
                    }
                    None => {
                        slot.finish_loading();
                        return RenderOutcome {
                            mode: RenderMode::Typing,
                            ticks,
                            cancelled: false,
                        };
                    }
                }
            }
        }
    }
}

/// Chooses and runs the presentation of each reply.
pub struct RenderScheduler {
    interval: Duration,
    typing_enabled: bool,
    highlighter: Option<Box<dyn Highlighter>>,
}

impl RenderScheduler {
    pub fn new() -> Self {
        Self {
            interval: DEFAULT_TYPING_INTERVAL,
            typing_enabled: true,
            highlighter: None,
        }
    }

    /// Sets the time between revealed words.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Enables or disables the typing animation.
    pub fn with_typing(mut self, enabled: bool) -> Self {
        self.typing_enabled = enabled;
        self
    }

    /// Installs the highlighter run after instant renders.
    pub fn with_highlighter(mut self, highlighter: Box<dyn Highlighter>) -> Self {
        self.highlighter = Some(highlighter);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn typing_enabled(&self) -> bool {
        self.typing_enabled
    }

    pub fn set_typing(&mut self, enabled: bool) {
        self.typing_enabled = enabled;
    }

    /// The mode `html` will be rendered in.
    pub fn mode_for(&self, html: &str) -> RenderMode {
        if self.typing_enabled {
            RenderMode::for_html(html)
        } else {
            RenderMode::Instant
        }
    }

    /// Renders `html` into `slot`.
    pub async fn render<V: Viewport + ?Sized>(
        &self,
        html: &str,
        slot: &mut dyn MessageSlot,
        viewport: &mut V,
        cancel: &CancellationToken,
    ) -> RenderOutcome {
        match self.mode_for(html) {
            RenderMode::Instant => {
                RENDER_INSTANT.click();
                slot.set_html(html);
                slot.finish_loading();
                viewport.scroll_to_bottom();
                if let Some(highlighter) = &self.highlighter {
                    highlighter.highlight(slot);
                }
                viewport.scroll_to_bottom();
                RenderOutcome::instant()
            }
            RenderMode::Typing => {
                RENDER_TYPED.click();
                type_out(html, self.interval, slot, viewport, cancel).await
            }
        }
    }
}

impl Default for RenderScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RenderScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderScheduler")
            .field("interval", &self.interval)
            .field("typing_enabled", &self.typing_enabled)
            .field("highlighter", &self.highlighter.is_some())
            .finish()
    }
}
