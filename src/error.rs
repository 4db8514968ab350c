use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt;
use std::num::ParseIntError;
use std::time::Duration;

/// HTTP status code type, re-exported for use with error inspection.
pub use reqwest::StatusCode;
use serde::Deserialize;

/// The closed set of failure classes a [`crate::client::Client`] call can produce.
///
/// Callers are expected to `match` on this exhaustively, so it is deliberately not
/// `#[non_exhaustive]`.
#[expect(
    clippy::exhaustive_enums,
    reason = "Callers match on every failure class"
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Invalid construction input, e.g. an empty token or a malformed host
    Configuration,
    /// The local rate-limit window is exhausted; no request was sent
    RateLimit,
    /// Network or IO failure; no response was received
    Transport,
    /// The service answered with a non-successful HTTP status
    Api,
    /// A response body or rate-limit header could not be decoded
    Decode,
    /// Request input that cannot be encoded into a query string
    Validation,
}

#[derive(Debug)]
pub struct Error {
    kind: Kind,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    backtrace: Backtrace,
}

impl Error {
    pub fn with_source<S: StdError + Send + Sync + 'static>(kind: Kind, source: S) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
            backtrace: Backtrace::capture(),
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    pub fn inner(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        let e = self.source.as_deref()?;
        e.downcast_ref::<E>()
    }

    /// The service error payload, when this is a [`Kind::Api`] error.
    #[must_use]
    pub fn api(&self) -> Option<&ApiError> {
        self.downcast_ref::<ApiError>()
    }

    /// How long to wait before the local rate-limit window reopens, when this is a
    /// [`Kind::RateLimit`] error.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        self.downcast_ref::<RateLimited>().map(|r| r.wait)
    }

    pub fn configuration<S: Into<String>>(reason: S) -> Self {
        Configuration {
            reason: reason.into(),
        }
        .into()
    }

    #[must_use]
    pub fn rate_limited(wait: Duration) -> Self {
        RateLimited { wait }.into()
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Validation {
            reason: message.into(),
        }
        .into()
    }

}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(src) => write!(f, "{:?}: {}", self.kind, src),
            None => write!(f, "{:?}", self.kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

/// Error payload returned by the service on a non-successful status.
///
/// See <https://docs.royaleapi.com/#/errors>.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiError {
    /// HTTP status code reported in the body, or the response status when the body
    /// omits it
    #[serde(default)]
    pub status: u16,
    /// Human readable message explaining the error
    #[serde(default)]
    pub message: String,
    /// The route that was requested
    #[serde(skip)]
    pub path: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error({}) requesting {}: {}",
            self.status, self.path, self.message
        )
    }
}

impl StdError for ApiError {}

#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimited {
    pub wait: Duration,
}

impl fmt::Display for RateLimited {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rate limit exhausted, window resets in {:.3}s",
            self.wait.as_secs_f64()
        )
    }
}

impl StdError for RateLimited {}

#[non_exhaustive]
#[derive(Debug)]
pub struct Configuration {
    pub reason: String,
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid configuration: {}", self.reason)
    }
}

impl StdError for Configuration {}

#[non_exhaustive]
#[derive(Debug)]
pub struct Validation {
    pub reason: String,
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid: {}", self.reason)
    }
}

impl StdError for Validation {}

/// A rate-limit header whose value is not an integer.
#[non_exhaustive]
#[derive(Debug)]
pub struct HeaderParse {
    pub header: String,
    pub value: String,
    pub source: Option<ParseIntError>,
}

impl fmt::Display for HeaderParse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "header {} has non-integer value {:?}",
            self.header, self.value
        )
    }
}

impl StdError for HeaderParse {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn StdError + 'static))
    }
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        Error::with_source(Kind::Api, err)
    }
}

impl From<RateLimited> for Error {
    fn from(err: RateLimited) -> Self {
        Error::with_source(Kind::RateLimit, err)
    }
}

impl From<Configuration> for Error {
    fn from(err: Configuration) -> Self {
        Error::with_source(Kind::Configuration, err)
    }
}

impl From<Validation> for Error {
    fn from(err: Validation) -> Self {
        Error::with_source(Kind::Validation, err)
    }
}

impl From<HeaderParse> for Error {
    fn from(err: HeaderParse) -> Self {
        Error::with_source(Kind::Decode, err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            Error::with_source(Kind::Configuration, e)
        } else {
            Error::with_source(Kind::Transport, e)
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::with_source(Kind::Decode, e)
    }
}

impl From<serde_html_form::ser::Error> for Error {
    fn from(e: serde_html_form::ser::Error) -> Self {
        Error::with_source(Kind::Validation, e)
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::with_source(Kind::Configuration, e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_exposes_wait() {
        let error = Error::rate_limited(Duration::from_secs(5));

        assert_eq!(error.kind(), Kind::RateLimit);
        assert_eq!(error.retry_after(), Some(Duration::from_secs(5)));
        assert!(error.api().is_none(), "rate limit is not an api error");
    }

    #[test]
    fn api_error_display_should_succeed() {
        let error: Error = ApiError {
            status: 429,
            message: "slow down".to_owned(),
            path: "/player/ABC".to_owned(),
        }
        .into();

        assert_eq!(error.kind(), Kind::Api);
        assert_eq!(
            error.to_string(),
            "Api: error(429) requesting /player/ABC: slow down"
        );
        let api = error.api().expect("api payload");
        assert_eq!(api.status, 429);
        assert_eq!(api.message, "slow down");
    }

    #[test]
    fn api_error_deserializes_without_status() {
        let api: ApiError = serde_json::from_str(r#"{"message":"x"}"#).expect("valid body");

        assert_eq!(api.status, 0);
        assert_eq!(api.message, "x");
    }

    #[test]
    fn api_error_deserializes_without_message() {
        let api: ApiError = serde_json::from_str(r#"{"status":404}"#).expect("valid body");

        assert_eq!(api.status, 404);
        assert!(api.message.is_empty(), "message defaults to empty");
    }

    #[test]
    fn header_parse_is_decode_error() {
        let error: Error = HeaderParse {
            header: "x-ratelimit-remaining".to_owned(),
            value: "lots".to_owned(),
            source: "lots".parse::<i64>().err(),
        }
        .into();

        assert_eq!(error.kind(), Kind::Decode);
        assert!(error.to_string().contains("lots"), "message names the value");
        assert!(error.retry_after().is_none(), "decode errors carry no wait");
    }

    #[test]
    fn json_error_is_decode_error() {
        let json_err = serde_json::from_str::<u32>("\"nope\"").expect_err("not a number");
        let error: Error = json_err.into();

        assert_eq!(error.kind(), Kind::Decode);
    }
}
