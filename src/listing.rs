//! Listing extraction: auction page HTML to [`ListingRecord`]

use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

use crate::error::{ParseError, Result};
use crate::fetch::Fetcher;
use crate::selectors;
use crate::text::{clean_text, normalize_width};
use crate::types::{Field, ListingRecord};

static PRICE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").expect("price pattern"));

/// Fetch `url` and extract its listing.
pub fn extract_listing(fetcher: &Fetcher, url: &str) -> Result<ListingRecord> {
    let html = fetcher.fetch(url)?;
    Ok(parse_listing(&html, url)?)
}

/// Extract a listing from already fetched HTML. `page_url` is used to resolve
/// relative photo URLs.
pub fn parse_listing(html: &str, page_url: &str) -> std::result::Result<ListingRecord, ParseError> {
    if html.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let document = Html::parse_document(html);
    if !has_markup(&document) {
        return Err(ParseError::Unstructured);
    }

    let listing = ListingRecord {
        title: extract_title(&document),
        price: extract_price(&document),
        shipping: extract_shipping(&document),
        description_html: extract_description(&document),
        photo_urls: extract_photos(&document, page_url),
    };

    let found_any = listing.title.is_known()
        || listing.price.is_known()
        || listing.shipping.is_known()
        || listing.description_html.is_known()
        || !listing.photo_urls.is_empty();
    if !found_any {
        return Err(ParseError::NotAListing);
    }

    debug!(
        title = %listing.title,
        price = %listing.price,
        photos = listing.photo_urls.len(),
        "extracted listing"
    );
    Ok(listing)
}

/// Anything beyond the `html`/`head`/`body` skeleton the parser always builds
fn has_markup(document: &Html) -> bool {
    document
        .select(&selectors::ANY_ELEMENT)
        .any(|el| !matches!(el.value().name(), "html" | "head" | "body"))
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

fn first_text(document: &Html, candidates: &[Selector]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|selector| document.select(selector).next())
        .find_map(|el| clean_text(&element_text(el)))
}

fn extract_title(document: &Html) -> Field {
    Field::from_option(first_text(document, &selectors::TITLE))
}

fn extract_price(document: &Html) -> Field {
    let price = selectors::PRICE
        .iter()
        .filter_map(|selector| document.select(selector).next())
        .find_map(|el| parse_price(&element_text(el)));
    Field::from_option(price)
}

/// First number in `text`, without currency symbols or thousands separators
pub fn parse_price(text: &str) -> Option<String> {
    let normalized = normalize_width(text);
    PRICE_NUMBER
        .find(&normalized)
        .map(|m| m.as_str().replace(',', ""))
}

fn is_shipping_label(el: ElementRef<'_>, label: &str) -> bool {
    let text = element_text(el);
    text.trim().trim_end_matches([':', '：']).trim() == label
}

fn sibling_text(el: ElementRef<'_>) -> Option<String> {
    el.next_siblings().find_map(|node| match node.value() {
        Node::Text(text) => clean_text(text),
        Node::Element(_) => ElementRef::wrap(node).and_then(|sibling| clean_text(&element_text(sibling))),
        _ => None,
    })
}

fn extract_shipping(document: &Html) -> Field {
    for label in selectors::SHIPPING_LABELS {
        // Innermost element carrying the label, so a row wrapping a lone
        // label cell doesn't shadow the cell itself.
        let labelled = document.select(&selectors::ANY_ELEMENT).find(|el| {
            is_shipping_label(*el, label)
                && !el
                    .children()
                    .filter_map(ElementRef::wrap)
                    .any(|child| is_shipping_label(child, label))
        });
        if let Some(value) = labelled.and_then(sibling_text) {
            return Field::Known(value);
        }
    }

    let fallback = selectors::SHIPPING
        .iter()
        .flat_map(|selector| document.select(selector))
        .find_map(|el| clean_text(&element_text(el)));
    Field::from_option(fallback)
}

fn extract_description(document: &Html) -> Field {
    let markup = selectors::DESCRIPTION
        .iter()
        .filter_map(|selector| document.select(selector).next())
        .map(|el| el.inner_html())
        .find(|html| !html.trim().is_empty());
    Field::from_option(markup)
}

fn image_source<'a>(img: ElementRef<'a>) -> Option<&'a str> {
    selectors::IMAGE_ATTRS
        .iter()
        .filter_map(|attr| img.value().attr(attr))
        .map(str::trim)
        .find(|src| !src.is_empty())
}

fn extract_photos(document: &Html, page_url: &str) -> Vec<String> {
    let base = resolve_base(document, page_url);

    for (selector, source) in selectors::GALLERY.iter().zip(selectors::GALLERY_SOURCES) {
        let Some(container) = document.select(selector).next() else {
            continue;
        };
        let photos: Vec<String> = container
            .select(&selectors::IMAGE)
            .filter_map(image_source)
            .map(|src| absolutize(src, base.as_ref()))
            .collect();
        if !photos.is_empty() {
            debug!(gallery = source, count = photos.len(), "collected gallery photos");
            return photos;
        }
    }

    let photos: Vec<String> = document
        .select(&selectors::IMAGE_WITH_SRC)
        .filter_map(|img| img.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .take(selectors::FALLBACK_PHOTO_LIMIT)
        .map(|src| absolutize(src, base.as_ref()))
        .collect();
    debug!(count = photos.len(), "no gallery matched, using bare img tags");
    photos
}

/// `<base href>` (resolved against the page) if present, else the page URL
fn resolve_base(document: &Html, page_url: &str) -> Option<Url> {
    let page = Url::parse(page_url).ok();
    let href = document
        .select(&selectors::BASE_HREF)
        .next()
        .and_then(|base| base.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty());

    match href {
        Some(href) => {
            let href = if href.ends_with('/') {
                href.to_string()
            } else {
                format!("{}/", href)
            };
            match &page {
                Some(page) => page.join(&href).ok(),
                None => Url::parse(&href).ok(),
            }
        }
        None => page,
    }
}

fn absolutize(src: &str, base: Option<&Url>) -> String {
    if src.starts_with("http://") || src.starts_with("https://") {
        return src.to_string();
    }
    base.and_then(|base| base.join(src).ok())
        .map(|url| url.to_string())
        .unwrap_or_else(|| src.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SENTINEL;

    const PAGE_URL: &str = "https://auctions.yahoo.co.jp/jp/auction/x1";

    const SMOKE_PAGE: &str = r#"
    <html>
      <head><title>TE37 Sonic Wheels</title></head>
      <body>
        <h1>RAYS TE37 Sonic 15インチ</h1>
        <div class="ProductPrice">120000</div>
        <div id="ProductPhoto">
          <img src="https://example.com/image1.jpg" />
          <img src="https://example.com/image2.jpg" />
        </div>
        <div id="ProductDescription">
          <p>メーカー：RAYS モデル：TE37 リム幅7J PCD100 OFFSET+35</p>
        </div>
        <div class="ProductDetail__shipping">送料込み</div>
      </body>
    </html>
    "#;

    #[test]
    fn test_extracts_every_field() {
        let listing = parse_listing(SMOKE_PAGE, PAGE_URL).unwrap();

        assert_eq!(listing.title.as_str(), "RAYS TE37 Sonic 15インチ");
        assert_eq!(listing.price.as_str(), "120000");
        assert_eq!(listing.shipping.as_str(), "送料込み");
        assert_eq!(
            listing.photo_urls,
            vec![
                "https://example.com/image1.jpg".to_string(),
                "https://example.com/image2.jpg".to_string(),
            ]
        );
        assert!(listing.description_html.as_str().contains("メーカー"));
    }

    #[test]
    fn test_price_strips_currency_and_separators() {
        let html = r#"<h1>x</h1><span itemprop="price">￥12,000</span>"#;
        let listing = parse_listing(html, PAGE_URL).unwrap();
        assert_eq!(listing.price.as_str(), "12000");

        assert_eq!(parse_price("120,000円（税込）").as_deref(), Some("120000"));
        assert_eq!(parse_price("１２，８００円").as_deref(), Some("12800"));
        assert_eq!(parse_price("お問い合わせ"), None);
        assert_eq!(parse_price("5,980.円").as_deref(), Some("5980"));
    }

    #[test]
    fn test_missing_fields_become_sentinel() {
        let html = r#"<html><body><h1>BBS RG-R 16インチ</h1><p>no details</p></body></html>"#;
        let listing = parse_listing(html, PAGE_URL).unwrap();

        assert_eq!(listing.title.as_str(), "BBS RG-R 16インチ");
        assert_eq!(listing.price, Field::Unknown);
        assert_eq!(listing.shipping.as_str(), SENTINEL);
        assert_eq!(listing.description_html, Field::Unknown);
        assert!(listing.photo_urls.is_empty());
    }

    #[test]
    fn test_missing_title_keeps_other_fields() {
        let html = r#"<div class="ProductPrice">5,000円</div><div id="ProductExplanation">7J</div>"#;
        let listing = parse_listing(html, PAGE_URL).unwrap();
        assert_eq!(listing.title, Field::Unknown);
        assert_eq!(listing.price.as_str(), "5000");
        assert_eq!(listing.description_html.as_str(), "7J");
    }

    #[test]
    fn test_title_falls_back_to_document_title() {
        let html = "<html><head><title> WORK  Emotion </title></head><body><p>x</p></body></html>";
        let listing = parse_listing(html, PAGE_URL).unwrap();
        assert_eq!(listing.title.as_str(), "WORK Emotion");
    }

    #[test]
    fn test_shipping_from_labelled_cell() {
        let html = r#"
        <h1>x</h1>
        <table>
          <tr><th>送料</th><td> 着払い 1,200円 </td></tr>
        </table>"#;
        let listing = parse_listing(html, PAGE_URL).unwrap();
        assert_eq!(listing.shipping.as_str(), "着払い 1,200円");

        let html = r#"<h1>x</h1><dl><dt>Shipping:</dt>
            <dd>Free</dd></dl>"#;
        let listing = parse_listing(html, PAGE_URL).unwrap();
        assert_eq!(listing.shipping.as_str(), "Free");
    }

    #[test]
    fn test_photos_resolve_relative_urls() {
        let html = r#"
        <html><head><base href="https://img.example.com/wheels"></head>
        <body><h1>x</h1>
          <div class="ProductImage">
            <img src="" data-src="a.jpg">
            <img data-lazy="./b.jpg">
            <img>
          </div>
        </body></html>"#;
        let listing = parse_listing(html, PAGE_URL).unwrap();
        assert_eq!(
            listing.photo_urls,
            vec![
                "https://img.example.com/wheels/a.jpg".to_string(),
                "https://img.example.com/wheels/b.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn test_photos_fall_back_to_first_three_images() {
        let html = r#"<h1>x</h1>
            <img src="/1.jpg"><img src="/2.jpg"><img src="/3.jpg"><img src="/4.jpg">"#;
        let listing = parse_listing(html, PAGE_URL).unwrap();
        assert_eq!(
            listing.photo_urls,
            vec![
                "https://auctions.yahoo.co.jp/1.jpg".to_string(),
                "https://auctions.yahoo.co.jp/2.jpg".to_string(),
                "https://auctions.yahoo.co.jp/3.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn test_unrecognizable_documents_are_errors() {
        assert_eq!(parse_listing("  \n ", PAGE_URL), Err(ParseError::Empty));
        assert_eq!(parse_listing("just some words", PAGE_URL), Err(ParseError::Unstructured));
        assert_eq!(parse_listing("<p>hello</p>", PAGE_URL), Err(ParseError::NotAListing));
    }
}
