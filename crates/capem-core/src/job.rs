//! # Job Declarations
//!
//! The in-memory form of a job file: named sources (catalog entries) and
//! destinations (order entries) that reference those sources by alias.
//! Nothing here is validated beyond its JSON shape; locator parsing,
//! alias resolution and uniqueness checks happen in `capem-order`.
//!
//! ```json
//! {
//!   "catalogs": [
//!     { "alias": "root-ca.crt", "uri": "file://pki/root-ca.crt", "category": "certificate" }
//!   ],
//!   "orders": [
//!     { "aliases": ["root-ca.crt"], "uri": "file://out/root-ca.crt" }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::asset::AssetCategory;

/// A named, typed source declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Name that order entries use to reference this source.
    pub alias: String,
    /// Source locator text (`file://`, `github://` or `s3://`).
    pub uri: String,
    /// What the fetched bytes must look like.
    pub category: AssetCategory,
}

/// A destination declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEntry {
    /// Catalog aliases, concatenated in this order. Repeats are allowed.
    pub aliases: Vec<String>,
    /// Destination locator text (`file://` or `env://`).
    pub uri: String,
}

/// A complete job: every source and every destination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Source declarations.
    #[serde(default)]
    pub catalogs: Vec<CatalogEntry>,
    /// Destination declarations.
    #[serde(default)]
    pub orders: Vec<OrderEntry>,
}

impl JobSpec {
    /// Assemble a job from separately loaded catalog and order lists.
    pub fn new(catalogs: Vec<CatalogEntry>, orders: Vec<OrderEntry>) -> Self {
        Self { catalogs, orders }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_catalog_order_document() {
        let json = r#"{
            "catalogs": [
                {"alias": "root-ca.crt", "uri": "file://testdata/root-ca.crt", "category": "certificate"},
                {"alias": "server.key", "uri": "s3://pki/server.key", "category": "privateKey"}
            ],
            "orders": [
                {"aliases": ["root-ca.crt", "root-ca.crt"], "uri": "env://ROOT_CA"}
            ]
        }"#;

        let job: JobSpec = serde_json::from_str(json).unwrap();
        assert_eq!(job.catalogs.len(), 2);
        assert_eq!(job.catalogs[1].category, AssetCategory::PrivateKey);
        assert_eq!(job.orders[0].aliases, vec!["root-ca.crt", "root-ca.crt"]);
        assert_eq!(job.orders[0].uri, "env://ROOT_CA");
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let job: JobSpec = serde_json::from_str("{}").unwrap();
        assert_eq!(job, JobSpec::default());
    }

    #[test]
    fn unknown_category_is_a_decode_error() {
        let json = r#"{"catalogs": [{"alias": "a", "uri": "file://a", "category": "pem"}]}"#;
        let err = serde_json::from_str::<JobSpec>(json).unwrap_err();
        assert!(err.to_string().contains("pem"));
    }
}
