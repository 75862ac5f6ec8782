use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Language used when a fence carries no tag.
pub const DEFAULT_LANGUAGE: &str = "javascript";

// A tag only counts when a line break follows it directly.
static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:([A-Za-z0-9_-]*)\r?\n)?(.*?)```").expect("fence regex is valid")
});

/// Fenced code blocks pulled out of one transform call, by placeholder index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeBlockTable {
    blocks: Vec<String>,
}

impl CodeBlockTable {
    /// The placeholder token standing in for block `index`.
    ///
    /// It starts with a bare `<`, which escaped text never contains, so a
    /// reply cannot spell a placeholder of its own.
    pub fn placeholder(index: usize) -> String {
        format!("<CODE_BLOCK_{index}>")
    }

    /// The rendered HTML of block `index`.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.blocks.get(index).map(String::as_str)
    }

    /// Number of extracted blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True when the text had no fenced blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    fn push(&mut self, html: String) -> String {
        let token = Self::placeholder(self.blocks.len());
        self.blocks.push(html);
        token
    }
}

/// Replaces every closed fence in already-escaped text with a placeholder.
///
/// Each block is stored as `<pre><code class="language-TAG">BODY</code></pre>`.
/// The body is kept exactly as escaped, minus the line break that ends the
/// opening fence and the single line break that precedes the closing fence.
/// A fence without a closing marker is left in place as plain text.
pub fn extract_code_blocks(escaped: &str) -> (String, CodeBlockTable) {
    let mut table = CodeBlockTable::default();
    let text = FENCE.replace_all(escaped, |caps: &Captures| {
        let language = caps
            .get(1)
            .map(|m| m.as_str())
            .filter(|tag| !tag.is_empty())
            .map(str::to_lowercase)
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        let body = caps.get(2).map_or("", |m| m.as_str());
        let body = body
            .strip_suffix("\r\n")
            .or_else(|| body.strip_suffix('\n'))
            .unwrap_or(body);
        table.push(format!(
            "<pre><code class=\"language-{language}\">{body}</code></pre>"
        ))
    });
    (text.into_owned(), table)
}

/// Puts the stored blocks back in place of their placeholders, in index order.
pub fn restore_code_blocks(text: &str, table: &CodeBlockTable) -> String {
    let mut restored = text.to_string();
    for (index, html) in table.blocks.iter().enumerate() {
        restored = restored.replacen(&CodeBlockTable::placeholder(index), html, 1);
    }
    restored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_fence_is_extracted() {
        let (text, table) = extract_code_blocks("before\n```Python\nprint(1)\n```\nafter");
        assert_eq!(text, "before\n<CODE_BLOCK_0>\nafter");
        assert_eq!(
            table.get(0),
            Some("<pre><code class=\"language-python\">print(1)</code></pre>")
        );
    }

    #[test]
    fn untagged_fence_defaults_to_javascript() {
        let (_, table) = extract_code_blocks("```\nlet x = 1;\n```");
        assert_eq!(
            table.get(0),
            Some("<pre><code class=\"language-javascript\">let x = 1;</code></pre>")
        );
    }

    #[test]
    fn tag_without_line_break_is_code() {
        let (_, table) = extract_code_blocks("```rust```");
        assert_eq!(
            table.get(0),
            Some("<pre><code class=\"language-javascript\">rust</code></pre>")
        );
    }

    #[test]
    fn empty_body_renders_empty_code() {
        let (text, table) = extract_code_blocks("``````");
        assert_eq!(text, "<CODE_BLOCK_0>");
        assert_eq!(
            table.get(0),
            Some("<pre><code class=\"language-javascript\"></code></pre>")
        );
    }

    #[test]
    fn unterminated_fence_is_left_alone() {
        let (text, table) = extract_code_blocks("```js\nconsole.log(1)");
        assert_eq!(text, "```js\nconsole.log(1)");
        assert!(table.is_empty());
    }

    #[test]
    fn crlf_after_tag_is_accepted() {
        let (_, table) = extract_code_blocks("```sh\r\nls\r\n```");
        assert_eq!(table.get(0), Some("<pre><code class=\"language-sh\">ls</code></pre>"));
    }

    #[test]
    fn placeholders_are_sequential() {
        let (text, table) = extract_code_blocks("```a\n1\n``` and ```b\n2\n```");
        assert_eq!(text, "<CODE_BLOCK_0> and <CODE_BLOCK_1>");
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1), Some("<pre><code class=\"language-b\">2</code></pre>"));
    }

    #[test]
    fn body_keeps_markdown_and_blank_lines() {
        let (_, table) = extract_code_blocks("```md\n**not bold**\n\n# nor heading\n```");
        assert_eq!(
            table.get(0),
            Some("<pre><code class=\"language-md\">**not bold**\n\n# nor heading</code></pre>")
        );
    }

    #[test]
    fn restore_round_trips_extraction() {
        let source = "x ```c\nint a;\n``` y ```\nz\n```";
        let (text, table) = extract_code_blocks(source);
        let restored = restore_code_blocks(&text, &table);
        assert_eq!(
            restored,
            "x <pre><code class=\"language-c\">int a;</code></pre> y \
             <pre><code class=\"language-javascript\">z</code></pre>"
        );
    }

    #[test]
    fn placeholder_lookalike_in_text_is_untouched() {
        let (text, table) = extract_code_blocks("__CODE_BLOCK_0__ then ```py\nx = 1\n```");
        assert_eq!(
            restore_code_blocks(&text, &table),
            "__CODE_BLOCK_0__ then <pre><code class=\"language-py\">x = 1</code></pre>"
        );
    }

    #[test]
    fn restore_without_blocks_is_identity() {
        let table = CodeBlockTable::default();
        assert_eq!(restore_code_blocks("plain", &table), "plain");
    }
}
