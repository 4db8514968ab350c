//! Request and response types for the RoyaleAPI endpoints.

use serde::{Deserialize, Serialize};

pub mod request;
pub mod response;

/// A member's role within a clan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
#[non_exhaustive]
pub enum ClanRole {
    Member,
    Elder,
    CoLeader,
    Leader,
    /// Unknown role from the API (captures the raw value for debugging).
    #[serde(untagged)]
    Unknown(String),
}

/// Who may join a clan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
#[non_exhaustive]
pub enum ClanType {
    Open,
    InviteOnly,
    Closed,
    /// Unknown clan type from the API (captures the raw value for debugging).
    #[serde(untagged)]
    Unknown(String),
}

/// Lifecycle stage of a tournament.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
#[non_exhaustive]
pub enum TournamentStatus {
    InPreparation,
    InProgress,
    Ended,
    /// Unknown status from the API (captures the raw value for debugging).
    #[serde(untagged)]
    Unknown(String),
}

/// Normalizes a player, clan or tournament tag for use in a path: the leading `#` is
/// dropped, the tag is upper-cased and the letter `O` is read as the digit `0`, which
/// the game never uses in tags.
#[must_use]
pub fn normalize_tag(tag: &str) -> String {
    tag.trim()
        .trim_start_matches('#')
        .to_uppercase()
        .replace('O', "0")
}
