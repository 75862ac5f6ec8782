//! Markdown-to-HTML transformation for model replies.
//!
//! [`transform`] turns raw model text into sanitized HTML through a fixed
//! pipeline of named stages:
//!
//! 1. [`escape_html`]: neutralize `&`, `<` and `>`.
//! 2. [`extract_code_blocks`]: swap fenced code for placeholders.
//! 3. [`substitute_inline`]: emphasis, headings, lists, rules, line breaks.
//! 4. [`inline_code`]: single-backtick spans.
//! 5. [`restore_code_blocks`]: put fenced code back.
//! 6. [`restore_whitelisted_tags`]: re-enable a few harmless tags.
//!
//! Each stage assumes the output shape of the one before it.  Escaping comes
//! first so injected markup is dead on arrival; code extraction comes before
//! markdown substitution so code bodies are never read as markdown.

mod code_block;
mod escape;
mod inline;
mod whitelist;

pub use code_block::{CodeBlockTable, DEFAULT_LANGUAGE, extract_code_blocks, restore_code_blocks};
pub use escape::escape_html;
pub use inline::{
    bold, bullet_items, headings, horizontal_rules, inline_code, italic, line_breaks,
    numbered_items, substitute_inline,
};
pub use whitelist::restore_whitelisted_tags;

/// Converts raw model text into sanitized HTML.
///
/// Pure and deterministic.
///
/// ```
/// use markchat::markdown::transform;
///
/// assert_eq!(
///     transform("**bold** and *italic*"),
///     "<strong>bold</strong> and <em>italic</em>"
/// );
/// assert_eq!(transform("<script>"), "&lt;script&gt;");
/// ```
pub fn transform(raw: &str) -> String {
    let escaped = escape_html(raw);
    let (text, code_blocks) = extract_code_blocks(&escaped);
    let text = substitute_inline(&text);
    let text = inline_code(&text);
    let text = restore_code_blocks(&text, &code_blocks);
    restore_whitelisted_tags(&text)
}

/// True when the HTML carries a fenced code block.
pub fn contains_block_code(html: &str) -> bool {
    html.contains("<pre")
}
