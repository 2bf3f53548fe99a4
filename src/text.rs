//! Text cleanup shared by the extraction and generation stages

use regex::Regex;
use scraper::Html;
use unicode_normalization::UnicodeNormalization;

/// Collapse runs of whitespace into single spaces and trim.
/// Returns `None` when nothing but whitespace remains.
pub fn clean_text(raw: &str) -> Option<String> {
    let cleaned = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Fold full-width digits, letters and punctuation to their ASCII forms
/// (and half-width katakana to full-width) using NFKC.
pub fn normalize_width(text: &str) -> String {
    text.nfkc().collect()
}

/// Text content of an HTML fragment, whitespace-normalized
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_fragment(html);

    let text: String = document.root_element().text().collect::<Vec<_>>().join(" ");

    let mut cleaned = String::new();
    let mut prev_was_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !prev_was_space && !cleaned.is_empty() {
                cleaned.push(' ');
                prev_was_space = true;
            }
        } else {
            cleaned.push(c);
            prev_was_space = false;
        }
    }
    cleaned.trim().to_string()
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Try `patterns` in order and return the first hit: the first non-empty
/// capture group, or the whole match when the pattern has no groups.
pub fn first_match(text: &str, patterns: &[Regex]) -> Option<String> {
    for pattern in patterns {
        let Some(captures) = pattern.captures(text) else {
            continue;
        };
        let hit = captures
            .iter()
            .skip(1)
            .flatten()
            .find(|m| !m.as_str().is_empty())
            .or_else(|| captures.get(0))
            .map(|m| m.as_str());
        if let Some(value) = hit.and_then(clean_text) {
            return Some(value);
        }
    }
    None
}
