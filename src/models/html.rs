//! Rich-text content is opaque HTML produced by the editor. The only things
//! this crate derives from it are plain text for previews and a blank check.

use std::collections::HashSet;

// Tags whose end separates words visually; ammonia drops them without a gap.
const BLOCK_BREAKS: &[&str] = &[
    "</p>", "</div>", "</li>", "</h1>", "</h2>", "</h3>", "</h4>", "</h5>", "</h6>",
    "</blockquote>", "</pre>", "</td>", "</tr>", "<br>", "<br/>", "<br />",
];

/// Removes every tag, dropping the body of `script` and `style` entirely.
pub fn strip_markup(html: &str) -> String {
    let text = ammonia::Builder::empty()
        .clean_content_tags(HashSet::from(["script", "style"]))
        .clean(html)
        .to_string();
    unescape(&text)
}

/// True when the HTML renders no visible text, e.g. the editor's
/// `<p><br></p>` placeholder.
pub fn is_blank_html(html: &str) -> bool {
    strip_markup(html).trim().is_empty()
}

fn space_blocks(html: &str) -> String {
    BLOCK_BREAKS
        .iter()
        .fold(html.to_string(), |html, tag| html.replace(tag, &format!("{tag} ")))
}

pub fn preview(html: &str, max_chars: usize) -> String {
    let text = strip_markup(&space_blocks(html))
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if text.chars().count() <= max_chars {
        return text;
    }

    let cut: String = text.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}

// ammonia re-serializes text nodes, so the handful of entities its serializer
// emits are turned back into characters.
fn unescape(text: &str) -> String {
    text.replace("&nbsp;", "\u{a0}")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}
