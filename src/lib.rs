#![cfg_attr(doc, doc = include_str!("../README.md"))]

pub mod client;
pub mod error;
pub mod rate_limit;
pub(crate) mod serde_helpers;
pub mod types;

use serde::Serialize;

pub use crate::client::{Client, Config};
use crate::error::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Default base URL of the RoyaleAPI service.
pub const DEFAULT_HOST: &str = "https://api.royaleapi.com";

/// Trait for converting request types to URL query parameters.
///
/// This trait is automatically implemented for all types that implement [`Serialize`].
/// It uses [`serde_html_form`] to serialize the struct fields into a query string.
/// Arrays are serialized as repeated keys (`key=val1&key=val2`).
pub trait ToQueryParams: Serialize {
    /// Converts the request to a URL query string.
    ///
    /// Returns an empty string if no parameters are set, otherwise returns
    /// a string starting with `?` followed by URL-encoded key-value pairs.
    ///
    /// # Errors
    ///
    /// Returns a [`Kind::Validation`](crate::error::Kind::Validation) error if the value
    /// cannot be represented as a flat query string.
    fn query_params(&self) -> Result<String> {
        let params = serde_html_form::to_string(self).inspect_err(|e| {
            #[cfg(feature = "tracing")]
            tracing::error!("Unable to convert to URL-encoded string {e:?}");
            #[cfg(not(feature = "tracing"))]
            let _: &serde_html_form::ser::Error = e;
        })?;

        if params.is_empty() {
            Ok(String::new())
        } else {
            Ok(format!("?{params}"))
        }
    }
}

impl<T: Serialize + ?Sized> ToQueryParams for T {}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn unit_encodes_to_nothing() {
        assert_eq!(().query_params().expect("encodable"), "");
    }

    #[test]
    fn map_of_lists_repeats_keys() {
        let mut query = BTreeMap::new();
        query.insert("name", vec!["royal", "giant"]);
        query.insert("page", vec!["2"]);

        assert_eq!(
            query.query_params().expect("encodable"),
            "?name=royal&name=giant&page=2"
        );
    }

    #[test]
    fn empty_map_encodes_to_nothing() {
        let query: BTreeMap<String, Vec<String>> = BTreeMap::new();

        assert_eq!(query.query_params().expect("encodable"), "");
    }

    #[test]
    fn nested_values_fail_validation() {
        let mut inner = BTreeMap::new();
        inner.insert("a", 1);
        let mut query = BTreeMap::new();
        query.insert("nested", inner);

        let err = query.query_params().expect_err("not flat");
        assert_eq!(err.kind(), crate::error::Kind::Validation);
    }
}
