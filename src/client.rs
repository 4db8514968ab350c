//! The request gateway every endpoint goes through.
//!
//! [`Client::fetch`] is the single place where requests leave the process. It
//! consults the [`RateLimiter`] before sending, attaches the `auth` header, encodes
//! the query, classifies the response and feeds the response headers back into the
//! limiter. Every other method on [`Client`] is a typed wrapper around it.
//!
//! Tags are normalized with [`normalize_tag`] before being placed in the path, so
//! `#2ppcv` and `2PPCV` address the same player. Methods that accept several tags
//! request them in one call, joined with `,`.
//!
//! ## Available Endpoints
//!
//! | Endpoint | Description |
//! |----------|-------------|
//! | `/version` | Version of the service |
//! | `/constants` | Static game data |
//! | `/player/{tags}` | Player profiles |
//! | `/player/{tags}/battles` | Recent battles of players |
//! | `/player/{tags}/chests` | Upcoming chests of players |
//! | `/clan/search` | Search clans by name, score, size or location |
//! | `/clan/{tags}` | Clans with their members |
//! | `/clan/{tag}/battles` | Recent battles of clan members |
//! | `/clan/{tag}/war` | Current clan war |
//! | `/clan/{tag}/warlog` | Finished clan wars |
//! | `/clan/{tag}/history` | Daily snapshots of a tracked clan |
//! | `/clan/{tag}/history/weekly` | Weekly snapshots of a tracked clan |
//! | `/clan/{tag}/tracking` | Whether a clan is tracked |
//! | `/tournaments/{open,known,1k,prep}` | Tournament listings |
//! | `/tournaments/search` | Search tournaments by name |
//! | `/tournaments/{tags}` | Tournament details |
//! | `/top/{clans,players}/{location}` | Leaderboards |
//! | `/popular/{clans,players,tournaments,decks}` | Most requested items |
//! | `/auth/stats` | Usage of the client's token |
//! | `/endpoints` | Every route the service offers |

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use bon::Builder;
use chrono::Utc;
use reqwest::{
    Client as ReqwestClient, Method, StatusCode,
    header::{HeaderMap, HeaderValue},
};
use secrecy::{ExposeSecret as _, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{ApiError, Error};
use crate::rate_limit::{RateLimitHeaders, RateLimitState, RateLimiter};
use crate::types::normalize_tag;
use crate::types::request::{ClanSearchRequest, Params, TournamentSearchRequest};
use crate::types::response::{
    ApiKeyStats, Battle, Clan, ClanHistoryEntry, ClanSearchResult, ClanTracking, ClanWar,
    ClanWarLogEntry, Constants, Player, PlayerChests, PopularClan, PopularDeck, PopularPlayer,
    PopularTournament, TopClan, TopPlayer, Tournament, TournamentDetails, TournamentSearchEntry,
};
use crate::{DEFAULT_HOST, Result, ToQueryParams as _, serde_helpers};

/// Request timeout used when none (or zero) is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const AUTH_HEADER: &str = "auth";

/// Configuration for [`Client`]
#[derive(Clone, Debug, Builder)]
pub struct Config {
    /// Base URL requests are sent to. Defaults to [`DEFAULT_HOST`].
    /// This is primarily useful for testing.
    #[builder(into, default = DEFAULT_HOST.to_owned())]
    host: String,
    /// Per-request timeout of the underlying transport. Zero selects [`DEFAULT_TIMEOUT`].
    #[builder(default = DEFAULT_TIMEOUT)]
    timeout: Duration,
    /// Which response headers carry the rate-limit contract.
    #[builder(default)]
    rate_limit_headers: RateLimitHeaders,
    #[builder(into, default = "royale_client_sdk".to_owned())]
    user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Config::builder().build()
    }
}

/// Authenticated client for the RoyaleAPI service.
///
/// Cloning is cheap and clones share the same rate-limit state, so one window is
/// tracked per token no matter how many tasks issue requests.
///
/// # Example
///
/// ```no_run
/// use royale_client_sdk::Client;
/// use royale_client_sdk::types::request::Params;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::new("my-token", None)?;
///
/// let params = Params::builder().keys(vec!["name".to_owned(), "trophies".to_owned()]).build();
/// let player = client.player("#2PP", &params).await?;
/// println!("{} has {} trophies", player.name, player.trophies);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    /// The [`Url`] against which `client` is making requests.
    host: Url,
    /// Sent verbatim in the `auth` header of every request.
    token: SecretString,
    /// The inner [`ReqwestClient`] used to make requests to `host`.
    client: ReqwestClient,
    /// Per-request timeout the transport was built with.
    timeout: Duration,
    rate_limiter: RateLimiter,
}

impl Client {
    /// Creates a client against the default host.
    ///
    /// A `timeout` of `None` or zero selects [`DEFAULT_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns a [`Kind::Configuration`](crate::error::Kind::Configuration) error if
    /// `token` is empty or the HTTP client cannot be initialized.
    pub fn new(token: &str, timeout: Option<Duration>) -> Result<Client> {
        let config = Config::builder()
            .maybe_timeout(timeout.filter(|t| !t.is_zero()))
            .build();

        Self::with_config(token, config)
    }

    /// Creates a client from a full [`Config`].
    ///
    /// # Errors
    ///
    /// Returns a [`Kind::Configuration`](crate::error::Kind::Configuration) error if
    /// `token` is empty, the host URL is invalid or the HTTP client cannot be initialized.
    pub fn with_config(token: &str, config: Config) -> Result<Client> {
        if token.is_empty() {
            return Err(Error::configuration(
                "client requires a token for authorization with the API",
            ));
        }
        HeaderValue::from_str(token)
            .map_err(|e| Error::configuration(format!("token is not a valid header value: {e}")))?;

        let mut host = Url::parse(&config.host)?;
        if !host.path().ends_with('/') {
            let path = format!("{}/", host.path());
            host.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            "User-Agent",
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| Error::configuration(format!("invalid user agent: {e}")))?,
        );
        headers.insert("Accept", HeaderValue::from_static("application/json"));

        let timeout = effective_timeout(config.timeout);
        let client = ReqwestClient::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                host,
                token: SecretString::from(token),
                client,
                timeout,
                rate_limiter: RateLimiter::new(config.rate_limit_headers),
            }),
        })
    }

    /// Returns the base URL of the API.
    #[must_use]
    pub fn host(&self) -> &Url {
        &self.inner.host
    }

    /// The per-request timeout, after a zero timeout has been replaced by
    /// [`DEFAULT_TIMEOUT`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// The last quota information reported by the service.
    #[must_use]
    pub fn rate_limit(&self) -> RateLimitState {
        self.inner.rate_limiter.snapshot()
    }

    /// Sends an authenticated `GET` for `path` and returns the raw response body.
    ///
    /// `path` is relative to the host, e.g. `/player/2PP`. `query` is encoded with
    /// [`ToQueryParams`](crate::ToQueryParams); empty values produce no query string.
    ///
    /// # Errors
    ///
    /// - [`Kind::RateLimit`](crate::error::Kind::RateLimit) if the last response
    ///   exhausted the window and it has not reset yet. Nothing is sent.
    /// - [`Kind::Validation`](crate::error::Kind::Validation) if `query` cannot be encoded.
    /// - [`Kind::Transport`](crate::error::Kind::Transport) if no response was received
    ///   or the body could not be read.
    /// - [`Kind::Decode`](crate::error::Kind::Decode) if a rate-limit header is malformed.
    /// - [`Kind::Api`](crate::error::Kind::Api) if the service answered with a
    ///   non-successful status.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self, query), fields(status_code))
    )]
    pub async fn fetch<Q: Serialize + ?Sized>(&self, path: &str, query: &Q) -> Result<Vec<u8>> {
        self.inner.rate_limiter.admit(Utc::now())?;

        let query = query.query_params()?;
        let url = format!(
            "{}{}{query}",
            self.inner.host,
            path.trim_start_matches('/')
        );
        let request = self
            .inner
            .client
            .request(Method::GET, url)
            .header(AUTH_HEADER, self.inner.token.expose_secret())
            .build()?;

        let response = self.inner.client.execute(request).await?;
        let status_code = response.status();

        #[cfg(feature = "tracing")]
        tracing::Span::current().record("status_code", status_code.as_u16());

        let updated = self
            .inner
            .rate_limiter
            .update(response.headers(), Utc::now());
        let body = response.bytes().await?;

        if !status_code.is_success() {
            let error = api_error(status_code, path, &body);

            #[cfg(feature = "tracing")]
            if let Err(e) = &updated {
                tracing::warn!(error = %e, "malformed rate limit header on failed request");
            }

            #[cfg(feature = "tracing")]
            tracing::warn!(
                status = %status_code,
                path = %path,
                message = %error.message,
                "API request failed"
            );

            return Err(error.into());
        }

        updated?;

        Ok(body.to_vec())
    }

    /// [`Client::fetch`] followed by decoding the body into `Response`.
    pub(crate) async fn get<Q: Serialize + ?Sized, Response: DeserializeOwned>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<Response> {
        let body = self.fetch(path, query).await?;
        serde_helpers::deserialize_with_warnings(&body)
    }

    /// Returns the version of the service as reported in the raw response body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn api_version(&self) -> Result<String> {
        let body = self.fetch("version", &()).await?;

        Ok(String::from_utf8_lossy(&body).trim().to_owned())
    }

    /// Retrieves static game data such as arenas, cards and regions.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn constants(&self, params: &Params) -> Result<Constants> {
        self.get("constants", params).await
    }

    /// Retrieves a player's profile.
    ///
    /// # Errors
    ///
    /// Returns a [`Kind::Validation`](crate::error::Kind::Validation) error if `tag` is
    /// empty, or an error if the request fails.
    pub async fn player(&self, tag: &str, params: &Params) -> Result<Player> {
        self.get(&format!("player/{}", single_tag(tag)?), params)
            .await
    }

    /// Retrieves several player profiles in one request.
    ///
    /// # Errors
    ///
    /// Returns a [`Kind::Validation`](crate::error::Kind::Validation) error if `tags` is
    /// empty, or an error if the request fails.
    pub async fn players(&self, tags: &[&str], params: &Params) -> Result<Vec<Player>> {
        self.get(&format!("player/{}", join_tags(tags)?), params)
            .await
    }

    /// Retrieves a player's recent battles.
    ///
    /// # Errors
    ///
    /// Returns an error if `tag` is empty or the request fails.
    pub async fn player_battles(&self, tag: &str, params: &Params) -> Result<Vec<Battle>> {
        self.get(&format!("player/{}/battles", single_tag(tag)?), params)
            .await
    }

    /// Retrieves recent battles for several players, one list per player.
    ///
    /// # Errors
    ///
    /// Returns an error if `tags` is empty or the request fails.
    pub async fn players_battles(
        &self,
        tags: &[&str],
        params: &Params,
    ) -> Result<Vec<Vec<Battle>>> {
        self.get(&format!("player/{}/battles", join_tags(tags)?), params)
            .await
    }

    /// Retrieves a player's upcoming chests.
    ///
    /// # Errors
    ///
    /// Returns an error if `tag` is empty or the request fails.
    pub async fn player_chests(&self, tag: &str, params: &Params) -> Result<PlayerChests> {
        self.get(&format!("player/{}/chests", single_tag(tag)?), params)
            .await
    }

    /// Retrieves upcoming chests for several players.
    ///
    /// # Errors
    ///
    /// Returns an error if `tags` is empty or the request fails.
    pub async fn players_chests(
        &self,
        tags: &[&str],
        params: &Params,
    ) -> Result<Vec<PlayerChests>> {
        self.get(&format!("player/{}/chests", join_tags(tags)?), params)
            .await
    }

    /// Searches clans.
    ///
    /// The service answers `400` when no criterion is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn clan_search(&self, request: &ClanSearchRequest) -> Result<Vec<ClanSearchResult>> {
        self.get("clan/search", request).await
    }

    /// Retrieves a clan and its members.
    ///
    /// # Errors
    ///
    /// Returns an error if `tag` is empty or the request fails.
    pub async fn clan(&self, tag: &str, params: &Params) -> Result<Clan> {
        self.get(&format!("clan/{}", single_tag(tag)?), params).await
    }

    /// Retrieves several clans in one request.
    ///
    /// # Errors
    ///
    /// Returns an error if `tags` is empty or the request fails.
    pub async fn clans(&self, tags: &[&str], params: &Params) -> Result<Vec<Clan>> {
        self.get(&format!("clan/{}", join_tags(tags)?), params).await
    }

    /// Retrieves recent battles of a clan's members.
    ///
    /// # Errors
    ///
    /// Returns an error if `tag` is empty or the request fails.
    pub async fn clan_battles(&self, tag: &str, params: &Params) -> Result<Vec<Battle>> {
        self.get(&format!("clan/{}/battles", single_tag(tag)?), params)
            .await
    }

    /// Retrieves the war a clan is currently in.
    ///
    /// # Errors
    ///
    /// Returns an error if `tag` is empty or the request fails.
    pub async fn clan_war(&self, tag: &str, params: &Params) -> Result<ClanWar> {
        self.get(&format!("clan/{}/war", single_tag(tag)?), params)
            .await
    }

    /// Retrieves a clan's finished wars.
    ///
    /// # Errors
    ///
    /// Returns an error if `tag` is empty or the request fails.
    pub async fn clan_war_log(&self, tag: &str, params: &Params) -> Result<Vec<ClanWarLogEntry>> {
        self.get(&format!("clan/{}/warlog", single_tag(tag)?), params)
            .await
    }

    /// Retrieves daily snapshots of a tracked clan, keyed by snapshot time.
    ///
    /// # Errors
    ///
    /// Returns an error if `tag` is empty or the request fails. Untracked clans are
    /// reported by the service as an API error.
    pub async fn clan_history(
        &self,
        tag: &str,
        params: &Params,
    ) -> Result<BTreeMap<String, ClanHistoryEntry>> {
        self.get(&format!("clan/{}/history", single_tag(tag)?), params)
            .await
    }

    /// Retrieves weekly snapshots of a tracked clan, keyed by snapshot time.
    ///
    /// # Errors
    ///
    /// Returns an error if `tag` is empty or the request fails.
    pub async fn clan_weekly_history(
        &self,
        tag: &str,
        params: &Params,
    ) -> Result<BTreeMap<String, ClanHistoryEntry>> {
        self.get(&format!("clan/{}/history/weekly", single_tag(tag)?), params)
            .await
    }

    /// Reports whether the service keeps history for a clan.
    ///
    /// # Errors
    ///
    /// Returns an error if `tag` is empty or the request fails.
    pub async fn clan_tracking(&self, tag: &str, params: &Params) -> Result<ClanTracking> {
        self.get(&format!("clan/{}/tracking", single_tag(tag)?), params)
            .await
    }

    /// Lists tournaments that can still be joined.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn open_tournaments(&self, params: &Params) -> Result<Vec<Tournament>> {
        self.get("tournaments/open", params).await
    }

    /// Lists every tournament the service has seen.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn known_tournaments(&self, params: &Params) -> Result<Vec<Tournament>> {
        self.get("tournaments/known", params).await
    }

    /// Lists open tournaments with a capacity of 1000 players.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn tournaments_1k(&self, params: &Params) -> Result<Vec<Tournament>> {
        self.get("tournaments/1k", params).await
    }

    /// Lists tournaments that are still in preparation.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn prep_tournaments(&self, params: &Params) -> Result<Vec<Tournament>> {
        self.get("tournaments/prep", params).await
    }

    /// Searches tournaments by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn tournament_search(
        &self,
        request: &TournamentSearchRequest,
    ) -> Result<Vec<TournamentSearchEntry>> {
        self.get("tournaments/search", request).await
    }

    /// Retrieves a tournament with its members.
    ///
    /// # Errors
    ///
    /// Returns an error if `tag` is empty or the request fails.
    pub async fn tournament(&self, tag: &str, params: &Params) -> Result<TournamentDetails> {
        self.get(&format!("tournaments/{}", single_tag(tag)?), params)
            .await
    }

    /// Retrieves several tournaments in one request.
    ///
    /// # Errors
    ///
    /// Returns an error if `tags` is empty or the request fails.
    pub async fn tournaments(
        &self,
        tags: &[&str],
        params: &Params,
    ) -> Result<Vec<TournamentDetails>> {
        self.get(&format!("tournaments/{}", join_tags(tags)?), params)
            .await
    }

    /// Retrieves the clan leaderboard for a location key (e.g. `"US"`), or the global
    /// leaderboard when `location` is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn top_clans(&self, location: &str, params: &Params) -> Result<Vec<TopClan>> {
        self.get(&top_path("clans", location)?, params).await
    }

    /// Retrieves the player leaderboard for a location key, or the global leaderboard
    /// when `location` is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn top_players(&self, location: &str, params: &Params) -> Result<Vec<TopPlayer>> {
        self.get(&top_path("players", location)?, params).await
    }

    /// Lists the most requested clans.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn popular_clans(&self, params: &Params) -> Result<Vec<PopularClan>> {
        self.get("popular/clans", params).await
    }

    /// Lists the most requested players.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn popular_players(&self, params: &Params) -> Result<Vec<PopularPlayer>> {
        self.get("popular/players", params).await
    }

    /// Lists the most requested tournaments.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn popular_tournaments(&self, params: &Params) -> Result<Vec<PopularTournament>> {
        self.get("popular/tournaments", params).await
    }

    /// Lists the decks seen most often.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn popular_decks(&self, params: &Params) -> Result<Vec<PopularDeck>> {
        self.get("popular/decks", params).await
    }

    /// Retrieves usage statistics for the client's token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn api_key_stats(&self, params: &Params) -> Result<ApiKeyStats> {
        self.get("auth/stats", params).await
    }

    /// Lists every route the service offers.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn endpoints(&self, params: &Params) -> Result<Vec<String>> {
        self.get("endpoints", params).await
    }
}

fn effective_timeout(timeout: Duration) -> Duration {
    if timeout.is_zero() {
        DEFAULT_TIMEOUT
    } else {
        timeout
    }
}

/// Normalizes `tags` and joins them into one path segment.
fn join_tags(tags: &[&str]) -> Result<String> {
    if tags.is_empty() {
        return Err(Error::validation("at least one tag is required"));
    }

    Ok(tags
        .iter()
        .map(|tag| single_tag(tag))
        .collect::<Result<Vec<_>>>()?
        .join(","))
}

/// Normalizes a single tag. Only ASCII letters and digits may remain, so a tag can
/// never add segments or a query to the path.
fn single_tag(tag: &str) -> Result<String> {
    let tag = normalize_tag(tag);
    if tag.is_empty() {
        return Err(Error::validation("tag must not be empty"));
    }
    if !tag.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::validation(format!(
            "tag {tag:?} may only contain letters and digits"
        )));
    }

    Ok(tag)
}

/// Leaderboard path, global when `location` is empty.
fn top_path(kind: &str, location: &str) -> Result<String> {
    let location = location.trim();
    if location.is_empty() {
        return Ok(format!("top/{kind}"));
    }
    if !location.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::validation(format!(
            "location {location:?} may only contain letters and digits"
        )));
    }

    Ok(format!("top/{kind}/{location}"))
}

/// Decodes the service's error payload. A missing `status` is taken from the HTTP
/// status and a missing `message` (or a body that is not a JSON object) from the
/// raw body.
fn api_error(status_code: StatusCode, path: &str, body: &[u8]) -> ApiError {
    let mut error = serde_json::from_slice::<ApiError>(body).unwrap_or_else(|_| ApiError {
        status: 0,
        message: String::new(),
        path: String::new(),
    });

    if error.status == 0 {
        error.status = status_code.as_u16();
    }
    if error.message.is_empty() {
        error.message = String::from_utf8_lossy(body).into_owned();
    }
    error.path = path.to_owned();
    error
}
