/// Replaces `&`, `<` and `>` with their HTML entities.
///
/// This runs before any markdown detection, so nothing the model writes can
/// survive as live markup unless a later stage puts it back on purpose.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
