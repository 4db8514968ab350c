//! Query parameter types.
//!
//! Every endpoint accepts the service's shared field-filter and pagination convention
//! through [`Params`]. The two search endpoints add their own criteria on top of it.
//! All request types use the [`bon`](https://docs.rs/bon) crate for the builder pattern.

#![allow(
    clippy::module_name_repetitions,
    reason = "Request suffix is intentional for clarity"
)]

use bon::Builder;
use serde::Serialize;
use serde_with::{StringWithSeparator, formats::CommaSeparator, serde_as, skip_serializing_none};

#[expect(
    clippy::trivially_copy_pass_by_ref,
    reason = "serde's skip_serializing_if passes a reference"
)]
fn is_zero(value: &u32) -> bool {
    *value == 0
}

/// Field selection and pagination, shared by every endpoint.
///
/// Empty lists and zero values are left out of the query string, so
/// `Params::default()` adds nothing to the request.
///
/// See <https://docs.royaleapi.com/#/field_filter> and
/// <https://docs.royaleapi.com/#/pagination>.
///
/// # Example
///
/// ```
/// use royale_client_sdk::ToQueryParams as _;
/// use royale_client_sdk::types::request::Params;
///
/// let params = Params::builder()
///     .exclude(vec!["cards".to_owned(), "achievements".to_owned()])
///     .build();
///
/// assert_eq!(params.query_params().unwrap(), "?exclude=cards%2Cachievements");
/// ```
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder, Serialize)]
#[non_exhaustive]
pub struct Params {
    /// Only return these fields.
    #[serde_as(as = "StringWithSeparator::<CommaSeparator, String>")]
    #[builder(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,
    /// Return every field except these.
    #[serde_as(as = "StringWithSeparator::<CommaSeparator, String>")]
    #[builder(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    /// Page size.
    #[builder(default)]
    #[serde(skip_serializing_if = "is_zero")]
    pub max: u32,
    /// Page index.
    #[builder(default)]
    #[serde(skip_serializing_if = "is_zero")]
    pub page: u32,
}

/// Criteria for the `/clan/search` endpoint. At least one criterion is required by the
/// service.
///
/// See <https://docs.royaleapi.com/#/endpoints/clan_search>.
///
/// # Example
///
/// ```
/// use royale_client_sdk::types::request::ClanSearchRequest;
///
/// let request = ClanSearchRequest::builder()
///     .name("royale")
///     .min_members(40)
///     .build();
/// ```
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct ClanSearchRequest {
    /// Clan name, at least three characters.
    #[builder(into)]
    pub name: Option<String>,
    /// Minimum clan score.
    pub score: Option<u32>,
    pub min_members: Option<u32>,
    pub max_members: Option<u32>,
    /// Numeric location identifier, see the `regions` list of
    /// [`Constants`](super::response::Constants).
    pub location_id: Option<u32>,
    #[serde(flatten)]
    #[builder(default)]
    pub params: Params,
}

/// Criteria for the `/tournaments/search` endpoint.
///
/// See <https://docs.royaleapi.com/#/endpoints/tournaments_search>.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder, Serialize)]
#[non_exhaustive]
pub struct TournamentSearchRequest {
    #[builder(into)]
    pub name: Option<String>,
    #[serde(flatten)]
    #[builder(default)]
    pub params: Params,
}
