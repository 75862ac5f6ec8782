use std::sync::LazyLock;

use regex::Regex;

static CODE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<pre><code class="language-[A-Za-z0-9_-]*">.*?</code></pre>"#)
        .expect("code block regex is valid")
});
static EMPHASIS_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&lt;(/?)(strong|em)&gt;").expect("emphasis tag regex is valid")
});
static BREAK_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&lt;br\s*/?&gt;").expect("break tag regex is valid"));
static RULE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&lt;hr\s*/?&gt;").expect("rule tag regex is valid"));

/// Re-enables the handful of tags a model may legitimately emit as text.
///
/// Only `<strong>`, `</strong>`, `<em>`, `</em>`, `<br>`, `<br/>`, `<hr>` and
/// `<hr/>` are restored.  Everything else stays escaped.  Fenced code blocks
/// are skipped so their bodies render verbatim.
pub fn restore_whitelisted_tags(html: &str) -> String {
    let mut restored = String::with_capacity(html.len());
    let mut last = 0;
    for block in CODE_BLOCK.find_iter(html) {
        restored.push_str(&unescape_tags(&html[last..block.start()]));
        restored.push_str(block.as_str());
        last = block.end();
    }
    restored.push_str(&unescape_tags(&html[last..]));
    restored
}

fn unescape_tags(text: &str) -> String {
    let text = EMPHASIS_TAG.replace_all(text, "<${1}${2}>");
    let text = BREAK_TAG.replace_all(&text, "<br>");
    RULE_TAG.replace_all(&text, "<hr>").into_owned()
}
