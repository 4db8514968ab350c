//! Local admission control driven by the service's rate-limit headers.
//!
//! The service is authoritative for the quota. After every response the
//! [`RateLimiter`] records the latest `remaining` count and, once the window is
//! exhausted, the moment it resets. Before every request it answers one question:
//! is the window known to be exhausted and not yet due to reset? If so the request
//! fails locally with [`Kind::RateLimit`](crate::error::Kind::RateLimit) instead of
//! spending a round trip.
//!
//! | remaining | reset time | admission |
//! |-----------|------------|-----------|
//! | unknown   | any        | allowed   |
//! | `> 0`     | any        | allowed   |
//! | `<= 0`    | future     | denied    |
//! | `<= 0`    | past/none  | allowed   |

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::header::{HeaderMap, HeaderName};

use crate::Result;
use crate::error::{Error, HeaderParse};

/// Default name of the header carrying the number of requests left in the window.
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Default name of the header carrying the number of seconds until the window resets.
pub const RETRY_AFTER_HEADER: &str = "x-ratelimit-retry-after";

/// Header used by older service revisions, carrying the reset as epoch milliseconds.
pub const RESET_HEADER: &str = "x-ratelimit-reset";

/// How the reset header expresses the end of the window.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResetUnit {
    /// Seconds relative to the moment the response is processed.
    #[default]
    RetryAfterSeconds,
    /// Absolute milliseconds since the Unix epoch.
    EpochMillis,
}

/// The pair of response headers interpreted by the [`RateLimiter`].
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitHeaders {
    pub remaining: HeaderName,
    pub reset: HeaderName,
    pub reset_unit: ResetUnit,
}

impl RateLimitHeaders {
    #[must_use]
    pub fn new(remaining: HeaderName, reset: HeaderName, reset_unit: ResetUnit) -> Self {
        Self {
            remaining,
            reset,
            reset_unit,
        }
    }

    /// `x-ratelimit-remaining` with `x-ratelimit-reset` in epoch milliseconds.
    #[must_use]
    pub fn epoch_millis() -> Self {
        Self::new(
            HeaderName::from_static(REMAINING_HEADER),
            HeaderName::from_static(RESET_HEADER),
            ResetUnit::EpochMillis,
        )
    }
}

impl Default for RateLimitHeaders {
    fn default() -> Self {
        Self::new(
            HeaderName::from_static(REMAINING_HEADER),
            HeaderName::from_static(RETRY_AFTER_HEADER),
            ResetUnit::RetryAfterSeconds,
        )
    }
}

/// Last quota information reported by the service.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitState {
    /// Requests left in the window. `None` until a response has reported it.
    pub remaining: Option<i64>,
    /// When the exhausted window reopens. `None` until the service has reported it.
    pub reset_at: Option<DateTime<Utc>>,
}

impl RateLimitState {
    /// Time left until the window reopens, or `None` if a request may proceed at `now`.
    #[must_use]
    pub fn wait_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        match (self.remaining, self.reset_at) {
            (Some(remaining), Some(reset_at)) if remaining <= 0 && reset_at > now => {
                (reset_at - now).to_std().ok()
            }
            _ => None,
        }
    }
}

/// Shared rate-limit state for one client, guarded by a mutex.
///
/// The lock is only held for the duration of [`RateLimiter::admit`] or
/// [`RateLimiter::update`], never across a request.
#[derive(Debug)]
pub struct RateLimiter {
    headers: RateLimitHeaders,
    state: Mutex<RateLimitState>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(headers: RateLimitHeaders) -> Self {
        Self {
            headers,
            state: Mutex::new(RateLimitState::default()),
        }
    }

    /// A copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> RateLimitState {
        *self.lock()
    }

    /// Decides whether a request may be sent at `now`.
    ///
    /// # Errors
    ///
    /// Returns a [`Kind::RateLimit`](crate::error::Kind::RateLimit) error carrying the
    /// remaining wait when the window is exhausted and has not yet reset.
    pub fn admit(&self, now: DateTime<Utc>) -> Result<()> {
        match self.lock().wait_at(now) {
            Some(wait) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(wait_ms = wait.as_millis(), "rate limit window exhausted");
                Err(Error::rate_limited(wait))
            }
            None => Ok(()),
        }
    }

    /// Records the rate-limit headers of a response received at `now`.
    ///
    /// Missing headers leave the corresponding field untouched. The remaining count is
    /// applied before the reset time, so a malformed remaining header stops the update
    /// without reading the reset header.
    ///
    /// # Errors
    ///
    /// Returns a [`Kind::Decode`](crate::error::Kind::Decode) error if a header value is
    /// not an integer.
    pub fn update(&self, headers: &HeaderMap, now: DateTime<Utc>) -> Result<()> {
        let remaining = parse_header(headers, &self.headers.remaining)?;
        let mut state = self.lock();

        if let Some(remaining) = remaining {
            state.remaining = Some(remaining);
        }

        if let Some(value) = parse_header(headers, &self.headers.reset)? {
            let reset_at = match self.headers.reset_unit {
                ResetUnit::RetryAfterSeconds => {
                    TimeDelta::try_seconds(value).and_then(|delta| now.checked_add_signed(delta))
                }
                ResetUnit::EpochMillis => DateTime::from_timestamp_millis(value),
            };
            state.reset_at = Some(reset_at.ok_or_else(|| HeaderParse {
                header: self.headers.reset.to_string(),
                value: value.to_string(),
                source: None,
            })?);
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(
            remaining = ?state.remaining,
            reset_at = ?state.reset_at,
            "updated rate limit state"
        );

        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, RateLimitState> {
        // The state is two plain fields, so a panic mid-update cannot leave it torn.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitHeaders::default())
    }
}

fn parse_header(headers: &HeaderMap, name: &HeaderName) -> Result<Option<i64>> {
    let Some(value) = headers.get(name) else {
        return Ok(None);
    };

    let raw = String::from_utf8_lossy(value.as_bytes());
    raw.trim().parse::<i64>().map(Some).map_err(|e| {
        HeaderParse {
            header: name.to_string(),
            value: raw.into_owned(),
            source: Some(e),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;

    use super::*;
    use crate::error::Kind;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).expect("valid timestamp")
    }

    #[test]
    fn unknown_state_admits() {
        let limiter = RateLimiter::default();

        limiter.admit(at(0)).expect("fresh limiter admits");
        assert_eq!(limiter.snapshot(), RateLimitState::default());
    }

    #[test]
    fn remaining_quota_admits() {
        let limiter = RateLimiter::default();
        limiter
            .update(&headers(&[(REMAINING_HEADER, "3")]), at(0))
            .expect("valid headers");

        limiter.admit(at(0)).expect("quota left");
    }

    #[test]
    fn exhausted_window_denies_until_reset() {
        let limiter = RateLimiter::default();
        limiter
            .update(
                &headers(&[(REMAINING_HEADER, "0"), (RETRY_AFTER_HEADER, "5")]),
                at(0),
            )
            .expect("valid headers");

        let err = limiter.admit(at(0)).expect_err("window exhausted");
        assert_eq!(err.kind(), Kind::RateLimit);
        assert_eq!(err.retry_after(), Some(Duration::from_secs(5)));

        let err = limiter.admit(at(3)).expect_err("still exhausted");
        assert_eq!(err.retry_after(), Some(Duration::from_secs(2)));

        limiter.admit(at(5)).expect("reset reached");
        limiter.admit(at(60)).expect("reset passed");
    }

    #[test]
    fn exhausted_without_reset_admits() {
        let limiter = RateLimiter::default();
        limiter
            .update(&headers(&[(REMAINING_HEADER, "0")]), at(0))
            .expect("valid headers");

        limiter.admit(at(0)).expect("no known reset time");
    }

    #[test]
    fn remaining_is_last_write_wins() {
        let limiter = RateLimiter::default();

        limiter
            .update(&headers(&[(REMAINING_HEADER, "5")]), at(0))
            .expect("valid headers");
        limiter
            .update(&headers(&[(REMAINING_HEADER, "0")]), at(1))
            .expect("valid headers");
        assert_eq!(limiter.snapshot().remaining, Some(0));

        limiter.update(&HeaderMap::new(), at(2)).expect("no headers");
        assert_eq!(limiter.snapshot().remaining, Some(0));
    }

    #[test]
    fn reset_is_replaced_by_newer_response() {
        let limiter = RateLimiter::default();

        limiter
            .update(
                &headers(&[(REMAINING_HEADER, "0"), (RETRY_AFTER_HEADER, "30")]),
                at(0),
            )
            .expect("valid headers");
        limiter
            .update(&headers(&[(REMAINING_HEADER, "4")]), at(40))
            .expect("valid headers");

        let state = limiter.snapshot();
        assert_eq!(state.remaining, Some(4));
        assert_eq!(state.reset_at, Some(at(30)));

        limiter
            .update(
                &headers(&[(REMAINING_HEADER, "0"), (RETRY_AFTER_HEADER, "10")]),
                at(50),
            )
            .expect("valid headers");
        assert_eq!(limiter.snapshot().reset_at, Some(at(60)));
    }

    #[test]
    fn non_integer_remaining_is_decode_error() {
        let limiter = RateLimiter::default();

        let err = limiter
            .update(
                &headers(&[(REMAINING_HEADER, "plenty"), (RETRY_AFTER_HEADER, "5")]),
                at(0),
            )
            .expect_err("not an integer");

        assert_eq!(err.kind(), Kind::Decode);
        assert_eq!(limiter.snapshot(), RateLimitState::default());
    }

    #[test]
    fn non_integer_retry_after_keeps_remaining() {
        let limiter = RateLimiter::default();

        let err = limiter
            .update(
                &headers(&[(REMAINING_HEADER, "0"), (RETRY_AFTER_HEADER, "soon")]),
                at(0),
            )
            .expect_err("not an integer");

        assert_eq!(err.kind(), Kind::Decode);
        let state = limiter.snapshot();
        assert_eq!(state.remaining, Some(0));
        assert_eq!(state.reset_at, None);
    }

    #[test]
    fn epoch_millis_reset_header() {
        let limiter = RateLimiter::new(RateLimitHeaders::epoch_millis());
        let reset = at(10).timestamp_millis().to_string();
        let mut map = headers(&[(REMAINING_HEADER, "0")]);
        map.insert(
            RESET_HEADER,
            HeaderValue::from_str(&reset).expect("ascii digits"),
        );

        limiter.update(&map, at(0)).expect("valid headers");

        assert_eq!(limiter.snapshot().reset_at, Some(at(10)));
        let err = limiter.admit(at(4)).expect_err("window exhausted");
        assert_eq!(err.retry_after(), Some(Duration::from_secs(6)));
    }

    #[test]
    fn retry_after_header_ignored_under_epoch_convention() {
        let limiter = RateLimiter::new(RateLimitHeaders::epoch_millis());

        limiter
            .update(
                &headers(&[(REMAINING_HEADER, "0"), (RETRY_AFTER_HEADER, "5")]),
                at(0),
            )
            .expect("valid headers");

        assert_eq!(limiter.snapshot().reset_at, None);
        limiter.admit(at(0)).expect("no reset known");
    }
}
