//! CSS selectors for auction listing pages.
//!
//! Every selector coupled to the auction site's markup lives here. Update this
//! file when the site changes its HTML structure; candidates within a group
//! are tried in order.

use scraper::Selector;
use std::sync::LazyLock;

fn parse_all(sources: &[&str]) -> Vec<Selector> {
    sources
        .iter()
        .map(|source| Selector::parse(source).unwrap_or_else(|e| panic!("bad selector {source:?}: {e}")))
        .collect()
}

pub const TITLE_SOURCES: &[&str] = &["h1", "title"];

pub const PRICE_SOURCES: &[&str] = &[
    "span[itemprop='price']",
    "span[class*='Price']",
    "div[class*='Price']",
];

/// Cell texts that label the shipping cost; the value is the next sibling.
pub const SHIPPING_LABELS: &[&str] = &["送料", "Shipping"];

pub const SHIPPING_SOURCES: &[&str] = &[".ProductDetail__shipping, .Shipping__value"];

pub const DESCRIPTION_SOURCES: &[&str] = &[
    "#ProductExplanation",
    "#ProductDescription",
    ".ProductExplanation",
    "section[itemprop='description']",
    "div[class*='Description']",
];

pub const GALLERY_SOURCES: &[&str] = &[
    "#ProductPhoto",
    "#ProductImage",
    ".ProductImage",
    "div[class*='Image']",
];

/// Image attributes checked in order for a photo URL
pub const IMAGE_ATTRS: &[&str] = &["src", "data-src", "data-lazy"];

/// Photos taken from bare `img` tags when no gallery matches
pub const FALLBACK_PHOTO_LIMIT: usize = 3;

pub static TITLE: LazyLock<Vec<Selector>> = LazyLock::new(|| parse_all(TITLE_SOURCES));

pub static PRICE: LazyLock<Vec<Selector>> = LazyLock::new(|| parse_all(PRICE_SOURCES));

pub static SHIPPING: LazyLock<Vec<Selector>> = LazyLock::new(|| parse_all(SHIPPING_SOURCES));

pub static DESCRIPTION: LazyLock<Vec<Selector>> = LazyLock::new(|| parse_all(DESCRIPTION_SOURCES));

pub static GALLERY: LazyLock<Vec<Selector>> = LazyLock::new(|| parse_all(GALLERY_SOURCES));

pub static IMAGE: LazyLock<Selector> = LazyLock::new(|| parse_all(&["img"]).remove(0));

pub static IMAGE_WITH_SRC: LazyLock<Selector> = LazyLock::new(|| parse_all(&["img[src]"]).remove(0));

pub static BASE_HREF: LazyLock<Selector> = LazyLock::new(|| parse_all(&["base[href]"]).remove(0));

pub static ANY_ELEMENT: LazyLock<Selector> = LazyLock::new(|| parse_all(&["*"]).remove(0));
