//! Listing and wheel spec records, with sentinel-aware serialization

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::text::clean_text;

/// Literal written wherever a value could not be determined.
pub const SENTINEL: &str = "不明";

/// A single scraped or derived value.
///
/// `Unknown` always serializes as [`SENTINEL`]; `Known("")` stays an empty
/// string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Field {
    Known(String),
    #[default]
    Unknown,
}

impl Field {
    /// Collapse whitespace in `raw`; blank input becomes `Unknown`.
    pub fn from_text(raw: &str) -> Self {
        match clean_text(raw) {
            Some(text) if text != SENTINEL => Field::Known(text),
            _ => Field::Unknown,
        }
    }

    pub fn from_option(value: Option<String>) -> Self {
        value.map_or(Field::Unknown, Field::Known)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Field::Known(value) => value,
            Field::Unknown => SENTINEL,
        }
    }

    pub fn known(&self) -> Option<&str> {
        match self {
            Field::Known(value) => Some(value),
            Field::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Field::Known(_))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        if value == SENTINEL {
            Field::Unknown
        } else {
            Field::Known(value.to_string())
        }
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// Deserializes from a plain string so that a missing required key is an error
// rather than a silent `Unknown`.
impl<'de> Deserialize<'de> for Field {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Field::from(value.as_str()))
    }
}

/// Raw attributes of one auction page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub title: Field,
    #[serde(default)]
    pub price: Field,
    #[serde(default)]
    pub shipping: Field,
    #[serde(default)]
    pub description_html: Field,
    /// Photo URLs in document order
    #[serde(default, alias = "photos")]
    pub photo_urls: Vec<String>,
}

/// Keys of [`SpecRecord`], in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecKey {
    Brand,
    Model,
    Diameter,
    Width,
    Offset,
    HoleCount,
    Pcd,
    CenterBore,
}

impl SpecKey {
    pub const ALL: [SpecKey; 8] = [
        SpecKey::Brand,
        SpecKey::Model,
        SpecKey::Diameter,
        SpecKey::Width,
        SpecKey::Offset,
        SpecKey::HoleCount,
        SpecKey::Pcd,
        SpecKey::CenterBore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpecKey::Brand => "brand",
            SpecKey::Model => "model",
            SpecKey::Diameter => "diameter",
            SpecKey::Width => "width",
            SpecKey::Offset => "offset",
            SpecKey::HoleCount => "hole_count",
            SpecKey::Pcd => "pcd",
            SpecKey::CenterBore => "center_bore",
        }
    }

    /// Row heading used in generated descriptions
    pub fn label(&self) -> &'static str {
        match self {
            SpecKey::Brand => "ブランド",
            SpecKey::Model => "モデル",
            SpecKey::Diameter => "リム径",
            SpecKey::Width => "リム幅",
            SpecKey::Offset => "オフセット",
            SpecKey::HoleCount => "穴数",
            SpecKey::Pcd => "PCD",
            SpecKey::CenterBore => "ハブ径",
        }
    }
}

/// Normalized wheel specification. Every key is always present.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpecRecord {
    pub brand: Field,
    pub model: Field,
    /// Rim diameter in inches
    #[serde(alias = "inch")]
    pub diameter: Field,
    /// Rim width in J
    pub width: Field,
    pub offset: Field,
    #[serde(alias = "holes")]
    pub hole_count: Field,
    pub pcd: Field,
    pub center_bore: Field,
}

impl SpecRecord {
    pub fn get(&self, key: SpecKey) -> &Field {
        match key {
            SpecKey::Brand => &self.brand,
            SpecKey::Model => &self.model,
            SpecKey::Diameter => &self.diameter,
            SpecKey::Width => &self.width,
            SpecKey::Offset => &self.offset,
            SpecKey::HoleCount => &self.hole_count,
            SpecKey::Pcd => &self.pcd,
            SpecKey::CenterBore => &self.center_bore,
        }
    }

    pub fn set(&mut self, key: SpecKey, value: Field) {
        let slot = match key {
            SpecKey::Brand => &mut self.brand,
            SpecKey::Model => &mut self.model,
            SpecKey::Diameter => &mut self.diameter,
            SpecKey::Width => &mut self.width,
            SpecKey::Offset => &mut self.offset,
            SpecKey::HoleCount => &mut self.hole_count,
            SpecKey::Pcd => &mut self.pcd,
            SpecKey::CenterBore => &mut self.center_bore,
        };
        *slot = value;
    }

    /// (key, value) pairs in wire order
    pub fn entries(&self) -> impl Iterator<Item = (SpecKey, &Field)> + '_ {
        SpecKey::ALL.into_iter().map(move |key| (key, self.get(key)))
    }
}
