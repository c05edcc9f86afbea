//! FHIR wire types
//!
//! Minimal serde models for the parts of a FHIR search Bundle the ingestion
//! engine reads: the `entry` list (each wrapping one record under `resource`)
//! and the `link` list used for cursor pagination. Records themselves are
//! kept as opaque `serde_json::Value` documents.

use serde::Deserialize;
use serde_json::Value;

/// A FHIR search-set Bundle
#[derive(Debug, Deserialize)]
pub struct Bundle {
    /// Matched records; absent on the wire means an empty result
    #[serde(default)]
    pub entry: Vec<BundleEntry>,

    /// Pagination links
    #[serde(default)]
    pub link: Vec<BundleLink>,
}

/// One entry in a search-set Bundle
#[derive(Debug, Deserialize)]
pub struct BundleEntry {
    /// The wrapped record, if present
    pub resource: Option<Value>,
}

/// A Bundle-level link
#[derive(Debug, Deserialize)]
pub struct BundleLink {
    pub relation: String,
    pub url: String,
}

impl Bundle {
    /// URL of the next page, if the server reported one
    pub fn next_url(&self) -> Option<&str> {
        self.link
            .iter()
            .find(|link| link.relation == "next")
            .map(|link| link.url.as_str())
    }

    /// Consume the bundle, yielding the wrapped records
    pub fn into_resources(self) -> Vec<Value> {
        self.entry
            .into_iter()
            .filter_map(|entry| entry.resource)
            .collect()
    }

    /// True when the bundle matched no records
    pub fn is_empty(&self) -> bool {
        self.entry.is_empty()
    }
}
