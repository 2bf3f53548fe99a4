//! Wheel listing extraction for auction pages.
//!
//! Four stages, each a plain function: [`extract_listing`] fetches a page and
//! pulls out its raw fields, [`parse_specs`] derives the wheel dimensions,
//! and [`generate_title`] / [`generate_description`] render them. Values that
//! cannot be determined are carried as [`Field::Unknown`] and written as the
//! [`SENTINEL`] literal.

pub mod description;
pub mod error;
pub mod fetch;
pub mod listing;
pub mod pipeline;
pub mod selectors;
pub mod specs;
pub mod text;
pub mod title;
pub mod types;

pub use description::generate_description;
pub use error::{Error, FetchCause, FetchError, ParseError, Result, SchemaError};
pub use fetch::{FetchConfig, Fetcher, DESKTOP_UA};
pub use listing::{extract_listing, parse_listing};
pub use pipeline::PipelineOutput;
pub use specs::parse_specs;
pub use title::generate_title;
pub use types::{Field, ListingRecord, SpecKey, SpecRecord, SENTINEL};
