//! Wheel spec parsing from listing title and description text.
//!
//! Each [`SpecKey`] has its own ordered list of patterns. Keys are resolved
//! independently, so a miss on one never affects another; a key with no
//! matching pattern keeps the sentinel.

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;
use tracing::debug;

use crate::text::{first_match, html_to_text, normalize_width};
use crate::types::{Field, ListingRecord, SpecKey, SpecRecord};

// Patterns run against NFKC-normalized text, case-insensitively. Full-width
// colons and digits have already been folded to ASCII at that point.
// `\b` is Unicode-aware, so a brand glued to kana or kanji (`ENKEIホイール`,
// `BBS製`) is not recognized.
const BRAND_PATTERNS: &[&str] = &[
    r"(?:メーカー|ブランド|\bbrand)(?:\s*:\s*|\s+)([a-z0-9][a-z0-9\-]*(?: [a-z][a-z0-9\-]*)*)",
    r"\b(ENKEI|BBS|RAYS|WORK|WEDS|SSR|ADVAN|OZ|VOLK)\b",
];

const MODEL_PATTERNS: &[&str] = &[
    r"(?:モデル|型式|\bmodel)(?:\s*:\s*|\s+)([a-z0-9][a-z0-9\-]*(?: [a-z][a-z0-9\-]*)*)",
    r"\b(TE37|CE28|ZE40|G25|LM|RG-?R|VS-?XX)\b",
];

const DIAMETER_PATTERNS: &[&str] = &[
    r#"(?:^|[^\d.])(1[2-9]|2[0-4])\s?(?:インチ|inch|")"#,
    r"\b(1[2-9]|2[0-4])\s?[x×*]\s?\d{1,2}(?:\.\d)?\s?j",
    r"\b\d{3}/\d{2}\s?z?r(1[2-9]|2[0-4])\b",
];

const WIDTH_PATTERNS: &[&str] = &[
    r"(?:^|[^\d.])(\d{1,2}(?:\.\d)?)j",
    r"(?:リム幅|\bwidth)\s*:?\s*(\d{1,2}(?:\.\d)?)",
];

const OFFSET_PATTERNS: &[&str] = &[
    r"(?:\bet|\binset|\boffset|インセット|オフセット)\s*:?\s*([+\-±]?\d{1,3})",
    r"(?:\boffset|\binset|オフセット|インセット)[^\d\n+\-±]{0,8}([+\-±]?\d{1,3})",
    r"(?:^|\s)([+\-]\d{1,3})(?:mm)?(?:\s|$)",
];

const HOLE_COUNT_PATTERNS: &[&str] = &[
    r"穴数\s*:?\s*(\d{1,2})",
    r"(?:^|[^\d.])(\d{1,2})\s?(?:穴|holes?\b|h\b)",
    r"(?:^|[^\d.])([3-8])[-/](?:9\d|1[0-6]\d)(?:\.\d{1,2})?",
];

const PCD_PATTERNS: &[&str] = &[
    r"\bpcd\s*:?\s*(\d{2,3}(?:\.\d{1,2})?)",
    r"(\d{3}\.\d)\s?pcd",
    r"(?:^|[^\d.])[3-8][-/]((?:9\d|1[0-6]\d)(?:\.\d{1,2})?)",
];

const CENTER_BORE_PATTERNS: &[&str] = &[
    r"(?:ハブ径|センターボア|センターハブ|センターホール|\bcb|\bhub(?:\s*bore)?)\s*:?\s*[φΦø]?\s*(\d{2,3}(?:\.\d{1,2})?)",
    r"[φΦø]\s?(\d{2,3}\.\d{1,2})",
];

const RULE_SOURCES: &[(SpecKey, &[&str])] = &[
    (SpecKey::Brand, BRAND_PATTERNS),
    (SpecKey::Model, MODEL_PATTERNS),
    (SpecKey::Diameter, DIAMETER_PATTERNS),
    (SpecKey::Width, WIDTH_PATTERNS),
    (SpecKey::Offset, OFFSET_PATTERNS),
    (SpecKey::HoleCount, HOLE_COUNT_PATTERNS),
    (SpecKey::Pcd, PCD_PATTERNS),
    (SpecKey::CenterBore, CENTER_BORE_PATTERNS),
];

struct Rule {
    key: SpecKey,
    patterns: Vec<Regex>,
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    RULE_SOURCES
        .iter()
        .map(|(key, sources)| Rule {
            key: *key,
            patterns: sources
                .iter()
                .map(|source| {
                    RegexBuilder::new(source)
                        .case_insensitive(true)
                        .build()
                        .unwrap_or_else(|e| panic!("bad {} pattern {source:?}: {e}", key.as_str()))
                })
                .collect(),
        })
        .collect()
});

/// Derive a [`SpecRecord`] from a listing. Never fails: unresolved keys hold
/// the sentinel.
pub fn parse_specs(listing: &ListingRecord) -> SpecRecord {
    let text = source_text(listing);
    let mut specs = SpecRecord::default();

    for rule in RULES.iter() {
        match first_match(&text, &rule.patterns) {
            Some(value) => specs.set(rule.key, Field::Known(finish(rule.key, value))),
            None => debug!(key = rule.key.as_str(), "no pattern matched"),
        }
    }

    specs
}

/// Title and description text, normalized for matching
fn source_text(listing: &ListingRecord) -> String {
    let mut parts = Vec::new();
    if let Some(title) = listing.title.known() {
        parts.push(title.to_string());
    }
    if let Some(html) = listing.description_html.known() {
        parts.push(html_to_text(html));
    }
    normalize_width(&parts.join("\n"))
}

fn finish(key: SpecKey, value: String) -> String {
    match key {
        SpecKey::Offset => value.trim_start_matches(['+', '±']).to_string(),
        SpecKey::Brand | SpecKey::Model => value.trim_end_matches('-').trim().to_string(),
        _ => value,
    }
}
