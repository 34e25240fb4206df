/// Class of the floating tooltip element
pub const TOOLTIP_CLASS: &str = "ai-translate-tooltip";
/// Class of the tooltip's content box
pub const CONTENT_CLASS: &str = "tooltip-content";
pub const ERROR_CLASS: &str = "error";

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escaped text with newlines turned into line breaks
pub fn render_text(content: &str) -> String {
    escape_html(content).replace('\n', "<br>")
}

/// Like [`render_text`], but the first literal occurrence of `url` becomes a
/// link opening in a new browsing context.
pub fn render_with_link(content: &str, url: &str) -> String {
    let Some((before, after)) = content.split_once(url).filter(|_| !url.is_empty()) else {
        return render_text(content);
    };

    let href = escape_html(url);
    format!(
        "{}<a href=\"{href}\" target=\"_blank\" rel=\"noopener noreferrer\">{href}</a>{}",
        render_text(before),
        render_text(after)
    )
}
