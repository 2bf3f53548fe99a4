//! Stage composition for one listing URL, plus JSON entry points for
//! callers that hand records between stages as payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::description::generate_description;
use crate::error::{Result, SchemaError};
use crate::fetch::Fetcher;
use crate::listing::extract_listing;
use crate::specs::parse_specs;
use crate::text::html_to_text;
use crate::title::generate_title;
use crate::types::{ListingRecord, SpecKey, SpecRecord};

/// Everything the pipeline derives from one listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineOutput {
    pub listing: ListingRecord,
    pub specs: SpecRecord,
    pub title: String,
    pub description_html: String,
}

/// Fetch, extract, parse and generate for a single listing URL.
pub fn run(fetcher: &Fetcher, url: &str) -> Result<PipelineOutput> {
    let config = fetcher.config();
    debug!(
        url,
        timeout_ms = config.timeout.as_millis() as u64,
        max_retries = config.max_retries,
        "running pipeline"
    );
    let listing = extract_listing(fetcher, url)?;
    info!(url, photos = listing.photo_urls.len(), "listing extracted");
    Ok(derive(listing))
}

/// The pure stages: specs, title and description from an extracted listing.
pub fn derive(listing: ListingRecord) -> PipelineOutput {
    let specs = parse_specs(&listing);
    let resolved = specs.entries().filter(|(_, value)| value.is_known()).count();
    info!(resolved, total = SpecKey::ALL.len(), "specs parsed");

    let title = generate_title(&specs);
    let raw_description = listing
        .description_html
        .known()
        .map(html_to_text)
        .unwrap_or_default();
    let description_html = generate_description(&specs, &raw_description);
    info!(%title, "title and description generated");

    PipelineOutput {
        listing,
        specs,
        title,
        description_html,
    }
}

pub fn listing_from_json(value: &Value) -> std::result::Result<ListingRecord, SchemaError> {
    ListingRecord::deserialize(value).map_err(|source| SchemaError {
        record: "listing",
        source,
    })
}

pub fn spec_record_from_json(value: &Value) -> std::result::Result<SpecRecord, SchemaError> {
    SpecRecord::deserialize(value).map_err(|source| SchemaError {
        record: "specs",
        source,
    })
}

/// `parse_specs` over a listing payload
pub fn specs_from_json(listing: &Value) -> std::result::Result<SpecRecord, SchemaError> {
    Ok(parse_specs(&listing_from_json(listing)?))
}

/// `generate_title` over a spec payload; every spec key must be present
pub fn title_from_json(specs: &Value) -> std::result::Result<String, SchemaError> {
    Ok(generate_title(&spec_record_from_json(specs)?))
}

/// `generate_description` over a spec payload; every spec key must be present
pub fn description_from_json(
    specs: &Value,
    raw_description: &str,
) -> std::result::Result<String, SchemaError> {
    Ok(generate_description(&spec_record_from_json(specs)?, raw_description))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, FetchError};
    use crate::fetch::FetchConfig;
    use crate::types::{Field, SENTINEL};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LISTING_PAGE: &str = r#"
    <html><body>
      <h1>BRAND-X 17インチ 7J +35 5H</h1>
      <span itemprop="price">￥12,000</span>
      <div id="ProductImage"><img src="/img/1.jpg"><img src="/img/2.jpg"></div>
      <div id="ProductExplanation"><p>PCD114.3 ハブ径73.1 <b>美品</b></p></div>
    </body></html>
    "#;

    fn config() -> FetchConfig {
        FetchConfig {
            max_retries: 1,
            backoff: Duration::from_millis(5),
            ..FetchConfig::default()
        }
    }

    #[tokio::test]
    async fn test_run_end_to_end() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LISTING_PAGE))
            .mount(&server)
            .await;

        let url = format!("{}/jp/auction/x1", server.uri());
        let base = server.uri();
        let output = tokio::task::spawn_blocking(move || run(&Fetcher::new(config())?, &url))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(output.listing.price.as_str(), "12000");
        assert_eq!(output.listing.shipping, Field::Unknown);
        assert_eq!(
            output.listing.photo_urls,
            vec![format!("{}/img/1.jpg", base), format!("{}/img/2.jpg", base)]
        );
        assert_eq!(output.specs.pcd.as_str(), "114.3");
        assert_eq!(output.specs.center_bore.as_str(), "73.1");
        assert_eq!(output.title, "不明 不明 17インチ 7J 35 5H PCD114.3");
        assert!(output
            .description_html
            .contains(r#"<div class="wheel-raw-description">PCD114.3 ハブ径73.1 美品</div>"#));
    }

    #[tokio::test]
    async fn test_run_propagates_fetch_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&server)
            .await;

        let url = server.uri();
        let err = tokio::task::spawn_blocking(move || run(&Fetcher::new(config())?, &url))
            .await
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, Error::Fetch(FetchError::Failed { attempts: 2, .. })));
    }

    #[test]
    fn test_derive_without_description() {
        let listing = ListingRecord {
            title: Field::Known("SSR 16インチ".into()),
            price: Field::Unknown,
            shipping: Field::Unknown,
            description_html: Field::Unknown,
            photo_urls: Vec::new(),
        };
        let output = derive(listing);
        assert_eq!(output.specs.brand.as_str(), "SSR");
        assert!(output
            .description_html
            .contains(&format!(r#"<div class="wheel-raw-description">{}</div>"#, SENTINEL)));
    }

    #[test]
    fn test_listing_without_title_is_schema_error() {
        let err = specs_from_json(&json!({"price": "1000", "photos": []})).unwrap_err();
        assert_eq!(err.record, "listing");
        assert!(specs_from_json(&json!("not an object")).is_err());
    }

    #[test]
    fn test_specs_from_listing_payload() {
        let specs = specs_from_json(&json!({"title": "BRAND-X 17インチ 7J +35 5H"})).unwrap();
        assert_eq!(specs.diameter.as_str(), "17");
        assert_eq!(specs.center_bore.as_str(), SENTINEL);
    }

    #[test]
    fn test_generators_require_every_key() {
        let partial = json!({"brand": "RAYS", "model": "TE37"});
        assert_eq!(title_from_json(&partial).unwrap_err().record, "specs");
        assert!(description_from_json(&partial, "x").is_err());

        let complete = serde_json::to_value(SpecRecord::default()).unwrap();
        assert_eq!(
            title_from_json(&complete).unwrap(),
            generate_title(&SpecRecord::default())
        );
    }
}
