//! Content normalization: heterogeneous payloads to one canonical Markdown string.
//!
//! Output is either empty or trimmed text followed by exactly one blank line,
//! so normalizing an already-normalized string returns it unchanged.

use std::fmt::Write as _;

use serde_json::Value;

use crate::RenderableContent;

const HEADINGS: [&str; 5] = ["#", "##", "###", "####", "#####"];
const FENCE: &str = "```";
/// Scalars longer than this (in chars) go on their own block.
pub const INLINE_VALUE_LIMIT: usize = 100;

pub fn normalize(content: &RenderableContent) -> String {
    let mut out = String::new();
    write_content(&mut out, content, 0);
    finish(&out)
}

/// Normalizes a raw string payload (possibly fenced, possibly JSON).
pub fn normalize_text(text: &str) -> String {
    normalize(&RenderableContent::text(text))
}

/// Strips one enclosing fenced-code wrapper, tolerating surrounding whitespace.
/// The closing marker is only removed together with an opening one.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix(FENCE) else {
        return trimmed;
    };
    let tag_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-')))
        .unwrap_or(rest.len());
    let after_tag = &rest[tag_len..];
    let body = match after_tag.find('\n') {
        Some(idx) if after_tag[..idx].trim().is_empty() => &after_tag[idx + 1..],
        None if after_tag.trim().is_empty() => "",
        _ => rest,
    };
    let body = body.trim_end();
    body.strip_suffix(FENCE).unwrap_or(body).trim()
}

/// `feasibility_score` -> `Feasibility Score`, `valueProps` -> `Value Props`.
pub fn humanize_key(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for ch in key.chars() {
        if ch == '_' || ch.is_whitespace() {
            flush_word(&mut words, &mut current);
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower {
            flush_word(&mut words, &mut current);
        }
        current.push(ch);
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
    }
    flush_word(&mut words, &mut current);
    words
        .iter()
        .map(|word| capitalize(word))
        .collect::<Vec<_>>()
        .join(" ")
}

fn flush_word(words: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        words.push(std::mem::take(current));
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn finish(markdown: &str) -> String {
    let trimmed = markdown.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}\n\n")
    }
}

fn heading(level: usize) -> &'static str {
    HEADINGS[level.min(HEADINGS.len() - 1)]
}

/// A string that parses into a JSON map or array.
fn parse_structured(text: &str) -> Option<RenderableContent> {
    match serde_json::from_str::<Value>(text).ok()? {
        value @ (Value::Object(_) | Value::Array(_)) => RenderableContent::from_json(value),
        _ => None,
    }
}

fn expand(content: &RenderableContent) -> Option<RenderableContent> {
    content.as_text().and_then(|text| parse_structured(strip_code_fence(text)))
}

fn write_content(out: &mut String, content: &RenderableContent, level: usize) {
    match content {
        RenderableContent::Text(text) => {
            let cleaned = strip_code_fence(text);
            match parse_structured(cleaned) {
                Some(parsed) => write_content(out, &parsed, level),
                None if cleaned.is_empty() => {}
                None => {
                    out.push_str(cleaned);
                    out.push_str("\n\n");
                }
            }
        }
        RenderableContent::List(items) => write_list(out, items, level),
        RenderableContent::Structured(entries) => write_entries(out, entries, level),
    }
}

fn write_list(out: &mut String, items: &[RenderableContent], level: usize) {
    for (index, item) in items.iter().enumerate() {
        match item {
            RenderableContent::Text(text) => {
                let _ = writeln!(out, "- {}", strip_code_fence(text));
            }
            nested => {
                let marker = format!("{}. ", index + 1);
                let mut body = String::new();
                write_content(&mut body, nested, level + 1);
                out.push_str(&marker);
                out.push_str(&indent_continuation(body.trim_end(), marker.len()));
                out.push('\n');
            }
        }
    }
    out.push('\n');
}

/// Indents every line after the first so it stays inside the list item.
fn indent_continuation(body: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    let mut lines = body.lines();
    let mut result = lines.next().unwrap_or_default().to_string();
    for line in lines {
        result.push('\n');
        if !line.is_empty() {
            result.push_str(&pad);
            result.push_str(line);
        }
    }
    result
}

fn is_citation_key(key: &str) -> bool {
    key == "citations" || key.ends_with("_citations")
}

fn write_entries(out: &mut String, entries: &[(String, RenderableContent)], level: usize) {
    let mut citations: Vec<RenderableContent> = Vec::new();

    for (key, value) in entries {
        let expanded = expand(value);
        let value = expanded.as_ref().unwrap_or(value);

        if is_citation_key(key) {
            if let RenderableContent::List(items) = value {
                citations.extend(items.iter().cloned());
                continue;
            }
        }

        let title = humanize_key(key);
        match value {
            RenderableContent::List(items) => {
                let _ = write!(out, "{} {title}\n\n", heading(level + 1));
                for item in items {
                    match item {
                        RenderableContent::Text(text) => {
                            let _ = writeln!(out, "- {}", strip_code_fence(text));
                        }
                        nested => write_content(out, nested, level + 2),
                    }
                }
                out.push('\n');
            }
            RenderableContent::Structured(_) => {
                let _ = write!(out, "{} {title}\n\n", heading(level + 1));
                write_content(out, value, level + 1);
            }
            RenderableContent::Text(text) => {
                let cleaned = strip_code_fence(text);
                if cleaned.chars().count() > INLINE_VALUE_LIMIT || cleaned.contains('\n') {
                    let _ = write!(out, "**{title}**:\n\n{cleaned}\n\n");
                } else {
                    let _ = write!(out, "**{title}**: {cleaned}\n\n");
                }
            }
        }
    }

    write_references(out, &citations, level);
}

fn write_references(out: &mut String, citations: &[RenderableContent], level: usize) {
    if citations.is_empty() {
        return;
    }
    let _ = write!(out, "{} References\n\n", heading(level + 1));
    for (index, citation) in citations.iter().enumerate() {
        if let Some(line) = citation_line(citation, index + 1) {
            let _ = writeln!(out, "- {line}");
        }
    }
    out.push('\n');
}

fn citation_line(citation: &RenderableContent, position: usize) -> Option<String> {
    match citation {
        RenderableContent::Text(text) => {
            let text = strip_code_fence(text);
            (!text.is_empty()).then(|| format!("[{position}] {text}"))
        }
        RenderableContent::Structured(_) => {
            let field = |key: &str| citation.get(key).and_then(RenderableContent::as_text);
            let id = field("id").map_or_else(|| position.to_string(), ToOwned::to_owned);
            let mut line = format!("[{id}]");
            if let Some(document) = field("document") {
                let _ = write!(line, " {document}");
            }
            if let Some(section) = field("section") {
                let _ = write!(line, ", {section}");
            }
            if let Some(page) = field("page") {
                let _ = write!(line, " (page {page})");
            }
            if let Some(score) = field("relevance_score") {
                let _ = write!(line, ", relevance {score}");
            }
            Some(line)
        }
        RenderableContent::List(_) => None,
    }
}
