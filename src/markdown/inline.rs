use std::sync::LazyLock;

use regex::Regex;

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("markdown regex is valid")
}

static BOLD: LazyLock<Regex> = LazyLock::new(|| regex(r"\*\*([^*\n]+)\*\*"));
// An opening `*` followed by whitespace is a bullet, not emphasis.
static ITALIC: LazyLock<Regex> = LazyLock::new(|| regex(r"\*([^*\s][^*\n]*)\*"));
static HEADINGS: LazyLock<[(Regex, &'static str); 4]> = LazyLock::new(|| {
    [
        (regex(r"(?m)^#### (.+)$"), "<h4>${1}</h4>"),
        (regex(r"(?m)^### (.+)$"), "<h3>${1}</h3>"),
        (regex(r"(?m)^## (.+)$"), "<h2>${1}</h2>"),
        (regex(r"(?m)^# (.+)$"), "<h1>${1}</h1>"),
    ]
});
static BULLET_ITEM: LazyLock<Regex> = LazyLock::new(|| regex(r"(?m)^[ \t]*[-*][ \t]+(.+)$"));
static NUMBERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| regex(r"(?m)^[ \t]*(\d+)[.)][ \t]+(.+)$"));
static RULE: LazyLock<Regex> = LazyLock::new(|| regex(r"(?m)^[ \t]*-{3,}[ \t]*$"));
static CARRIAGE_RETURN: LazyLock<Regex> = LazyLock::new(|| regex(r"\r\n?"));
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| regex(r"\n{2,}"));
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| regex(r"`([^`]+)`"));

/// `**text**` to `<strong>text</strong>`.
pub fn bold(text: &str) -> String {
    BOLD.replace_all(text, "<strong>${1}</strong>").into_owned()
}

/// `*text*` to `<em>text</em>`.
pub fn italic(text: &str) -> String {
    ITALIC.replace_all(text, "<em>${1}</em>").into_owned()
}

/// `#### ` through `# ` at line start to `<h4>` through `<h1>`.
pub fn headings(text: &str) -> String {
    let mut text = text.to_string();
    for (pattern, replacement) in HEADINGS.iter() {
        text = pattern.replace_all(&text, *replacement).into_owned();
    }
    text
}

/// `- item` and `* item` lines to bullet divs.
pub fn bullet_items(text: &str) -> String {
    BULLET_ITEM
        .replace_all(text, "<div class=\"list-item\">• ${1}</div>")
        .into_owned()
}

/// `1. item` and `1) item` lines to numbered divs.
pub fn numbered_items(text: &str) -> String {
    NUMBERED_ITEM
        .replace_all(
            text,
            "<div class=\"numbered-item\"><span class=\"number\">${1}.</span>\
             <span class=\"content\">${2}</span></div>",
        )
        .into_owned()
}

/// Lines of three or more hyphens to `<hr>`.
pub fn horizontal_rules(text: &str) -> String {
    RULE.replace_all(text, "<hr>").into_owned()
}

/// Newlines of any convention to `<br>`; a run of two or more becomes two.
pub fn line_breaks(text: &str) -> String {
    let text = CARRIAGE_RETURN.replace_all(text, "\n");
    let text = BLANK_LINES.replace_all(&text, "<br><br>");
    text.replace('\n', "<br>")
}

/// Applies the block and emphasis rules in order, then trims the result.
///
/// Line endings are normalized up front so that `$` anchors see bare `\n`.
/// The trim runs after newlines have become `<br>`, so only spaces and tabs
/// at the edges are dropped and a trailing newline survives as a break.
pub fn substitute_inline(text: &str) -> String {
    let text = CARRIAGE_RETURN.replace_all(text, "\n");
    let text = bold(&text);
    let text = italic(&text);
    let text = headings(&text);
    let text = bullet_items(&text);
    let text = numbered_items(&text);
    let text = horizontal_rules(&text);
    let text = line_breaks(&text);
    text.trim().to_string()
}

/// `` `code` `` to `<code>code</code>`.
pub fn inline_code(text: &str) -> String {
    INLINE_CODE.replace_all(text, "<code>${1}</code>").into_owned()
}
