//! Markdown to markup conversion for the result panes.
//!
//! Content comes from the orchestration backend, which is trusted: raw HTML in
//! the Markdown passes through unescaped. Only the preformatted fallback
//! escapes, because it shows text that failed to render.

use std::panic::{self, AssertUnwindSafe};

use pulldown_cmark::{html, Event, Options, Parser};

use crate::normalize::strip_code_fence;

pub const NO_CONTENT_PLACEHOLDER: &str = "<p class=\"placeholder\">No content available</p>";
/// Inputs above this size are not parsed; they fall back to preformatted text.
pub const MAX_RENDER_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("content too large to render ({actual} bytes, max {max_bytes})")]
    TooLarge { max_bytes: usize, actual: usize },
    #[error("markdown parser panicked")]
    Panicked,
}

pub trait Renderer: Send + Sync {
    fn render(&self, canonical: &str) -> Result<String, RenderError>;
}

/// GitHub-flavoured Markdown with soft line breaks kept as hard breaks.
#[derive(Debug, Clone, Copy)]
pub struct MarkdownRenderer {
    max_bytes: usize,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::with_max_bytes(MAX_RENDER_BYTES)
    }

    pub fn with_max_bytes(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    fn options() -> Options {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_FOOTNOTES);
        options
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for MarkdownRenderer {
    fn render(&self, canonical: &str) -> Result<String, RenderError> {
        if canonical.len() > self.max_bytes {
            return Err(RenderError::TooLarge {
                max_bytes: self.max_bytes,
                actual: canonical.len(),
            });
        }
        panic::catch_unwind(AssertUnwindSafe(|| {
            let parser = Parser::new_ext(canonical, Self::options()).map(|event| match event {
                Event::SoftBreak => Event::HardBreak,
                other => other,
            });
            let mut markup = String::with_capacity(canonical.len() * 3 / 2);
            html::push_html(&mut markup, parser);
            markup
        }))
        .map_err(|_| RenderError::Panicked)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered,
    Placeholder,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRegion {
    pub markup: String,
    pub outcome: RenderOutcome,
}

/// Renders canonical text, never producing an empty region.
pub fn render_canonical(renderer: &dyn Renderer, canonical: &str) -> RenderedRegion {
    let cleaned = strip_code_fence(canonical);
    if cleaned.is_empty() {
        return RenderedRegion {
            markup: NO_CONTENT_PLACEHOLDER.to_string(),
            outcome: RenderOutcome::Placeholder,
        };
    }
    match renderer.render(cleaned) {
        Ok(markup) => RenderedRegion {
            markup,
            outcome: RenderOutcome::Rendered,
        },
        Err(err) => {
            console_logging::console_warn!("Render failed, showing raw text: {}", err);
            RenderedRegion {
                markup: preformatted(cleaned),
                outcome: RenderOutcome::Fallback,
            }
        }
    }
}

pub fn preformatted(text: &str) -> String {
    format!("<pre>{}</pre>", escape_html(text))
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{escape_html, preformatted};

    #[test]
    fn fallback_escapes_markup() {
        assert_eq!(escape_html("<b>&\"</b>"), "&lt;b&gt;&amp;&quot;&lt;/b&gt;");
        assert_eq!(preformatted("a < b"), "<pre>a &lt; b</pre>");
    }
}
