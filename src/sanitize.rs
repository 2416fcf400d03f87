//! Rendering of generated text for display.
//!
//! Generated synopses may contain lightweight markup. They are rendered to HTML
//! and then cleaned so that only a handful of inline formatting tags survive.

use pulldown_cmark::{html, Parser};
use std::collections::HashSet;

/// Tags allowed to reach the browser
pub const ALLOWED_TAGS: [&str; 5] = ["b", "i", "em", "strong", "br"];

/// Render markdown to HTML
pub fn render_markdown(text: &str) -> String {
    let parser = Parser::new(text);
    let mut out = String::with_capacity(text.len() * 2);
    html::push_html(&mut out, parser);
    out
}

/// Strip every tag outside [`ALLOWED_TAGS`], keeping the text inside it
pub fn clean_html(html: &str) -> String {
    let tags: HashSet<&str> = ALLOWED_TAGS.into_iter().collect();
    ammonia::Builder::default()
        .tags(tags)
        .clean(html)
        .to_string()
}

/// Markdown in, safe HTML fragment out. May return an empty string.
pub fn process_and_sanitize(text: &str) -> String {
    clean_html(&render_markdown(text)).trim().to_string()
}
