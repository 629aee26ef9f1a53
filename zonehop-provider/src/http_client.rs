//! Request execution shared by the providers
//!
//! Providers build their own `RequestBuilder` (auth, body encoding) and interpret
//! the body themselves. This module sends the request, turns transport failures,
//! rate limits and gateway errors into `ProviderError`s and optionally retries them.

use std::time::Duration;

use reqwest::RequestBuilder;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::de::DeserializeOwned;

use crate::error::ProviderError;
use crate::utils::log_sanitizer::truncate_for_log;

/// Longest wait honoured from a `Retry-After` header
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);
const BACKOFF_BASE: Duration = Duration::from_millis(250);
const BACKOFF_CAP: Duration = Duration::from_secs(8);

pub struct HttpUtils;

fn transport_error(provider: &str, error: &reqwest::Error) -> ProviderError {
    let detail = error.to_string();
    let provider = provider.to_string();
    if error.is_timeout() {
        ProviderError::Timeout { provider, detail }
    } else {
        ProviderError::NetworkError { provider, detail }
    }
}

fn retry_after(headers: &HeaderMap) -> Option<u64> {
    headers.get(RETRY_AFTER)?.to_str().ok()?.trim().parse().ok()
}

impl HttpUtils {
    /// Send once and return `(status, body)`.
    ///
    /// HTTP 429 becomes `RateLimited` and 502/503/504 become `NetworkError`; every
    /// other status is handed back for the provider to map.
    pub async fn execute_request(
        request: RequestBuilder,
        provider: &str,
        method: &str,
        target: &str,
    ) -> Result<(u16, String), ProviderError> {
        log::debug!("[{provider}] {method} {target}");

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(provider, &e))?;
        let status = response.status().as_u16();
        let wait = retry_after(response.headers());
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(provider, &e))?;
        log::debug!("[{provider}] HTTP {status}: {}", truncate_for_log(&body));

        match status {
            429 => {
                log::warn!("[{provider}] Rate limited, retry after {wait:?}s");
                Err(ProviderError::RateLimited {
                    provider: provider.to_string(),
                    retry_after: wait,
                    raw_message: Some(body),
                })
            }
            502..=504 => Err(ProviderError::NetworkError {
                provider: provider.to_string(),
                detail: format!("HTTP {status}: {}", truncate_for_log(&body)),
            }),
            _ => Ok((status, body)),
        }
    }

    /// [`execute_request`](Self::execute_request) with up to `max_retries` retries of
    /// transport failures, rate limits and gateway errors.
    ///
    /// With `max_retries == 0` the request is sent exactly once. A request whose body
    /// cannot be cloned is also sent only once.
    pub async fn execute_request_with_retry(
        request: RequestBuilder,
        provider: &str,
        method: &str,
        target: &str,
        max_retries: u32,
    ) -> Result<(u16, String), ProviderError> {
        let mut attempt = 0;
        loop {
            let retryable = if attempt < max_retries {
                request.try_clone()
            } else {
                None
            };
            let Some(this_try) = retryable else {
                return Self::execute_request(request, provider, method, target).await;
            };

            match Self::execute_request(this_try, provider, method, target).await {
                Err(e) if is_transient(&e) => {
                    let delay = retry_delay(&e, attempt);
                    attempt += 1;
                    log::warn!(
                        "[{provider}] {method} {target} failed ({e}), retry {attempt}/{max_retries} in {}ms",
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                result => return result,
            }
        }
    }

    /// Deserialize a JSON response body.
    pub fn parse_json<T>(body: &str, provider: &str) -> Result<T, ProviderError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(body).map_err(|e| {
            log::error!(
                "[{provider}] Unexpected response ({e}): {}",
                truncate_for_log(body)
            );
            ProviderError::ParseError {
                provider: provider.to_string(),
                detail: e.to_string(),
            }
        })
    }

    /// Serialize a request body as JSON.
    pub fn to_json<T>(body: &T, provider: &str) -> Result<String, ProviderError>
    where
        T: serde::Serialize + ?Sized,
    {
        serde_json::to_string(body).map_err(|e| ProviderError::SerializationError {
            provider: provider.to_string(),
            detail: e.to_string(),
        })
    }
}

fn is_transient(error: &ProviderError) -> bool {
    matches!(
        error,
        ProviderError::NetworkError { .. }
            | ProviderError::Timeout { .. }
            | ProviderError::RateLimited { .. }
    )
}

/// The server's `Retry-After` when given, else 250ms doubling up to 8s.
fn retry_delay(error: &ProviderError, attempt: u32) -> Duration {
    if let ProviderError::RateLimited {
        retry_after: Some(secs),
        ..
    } = error
    {
        return Duration::from_secs(*secs).min(MAX_RETRY_AFTER);
    }
    BACKOFF_BASE
        .saturating_mul(2u32.saturating_pow(attempt.min(16)))
        .min(BACKOFF_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::common::create_http_client;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn rate_limited(retry_after: Option<u64>) -> ProviderError {
        ProviderError::RateLimited {
            provider: "test".into(),
            retry_after,
            raw_message: None,
        }
    }

    #[test]
    fn only_transport_level_errors_are_transient() {
        assert!(is_transient(&rate_limited(None)));
        assert!(is_transient(&ProviderError::Timeout {
            provider: "test".into(),
            detail: "deadline".into(),
        }));
        assert!(!is_transient(&ProviderError::ZoneNotFound {
            provider: "test".into(),
            zone: "example.com".into(),
            raw_message: None,
        }));
        assert!(!is_transient(&ProviderError::InvalidCredentials {
            provider: "test".into(),
            raw_message: None,
        }));
    }

    #[test]
    fn backoff_doubles_up_to_cap() {
        let net = ProviderError::NetworkError {
            provider: "test".into(),
            detail: "reset".into(),
        };
        assert_eq!(retry_delay(&net, 0), Duration::from_millis(250));
        assert_eq!(retry_delay(&net, 2), Duration::from_secs(1));
        assert_eq!(retry_delay(&net, 10), BACKOFF_CAP);
        assert_eq!(retry_delay(&net, u32::MAX), BACKOFF_CAP);
    }

    #[test]
    fn retry_after_wins_but_is_bounded() {
        assert_eq!(retry_delay(&rate_limited(Some(3)), 5), Duration::from_secs(3));
        assert_eq!(retry_delay(&rate_limited(Some(3600)), 0), MAX_RETRY_AFTER);
    }

    #[test]
    fn parse_json_reports_parse_error() {
        let ok: Result<Vec<u32>, _> = HttpUtils::parse_json("[1,2]", "test");
        assert!(matches!(ok.as_deref(), Ok([1, 2])));

        let bad: Result<Vec<u32>, _> = HttpUtils::parse_json("<html>", "test");
        assert!(matches!(bad, Err(ProviderError::ParseError { .. })));
    }

    #[tokio::test]
    async fn status_classification() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow-down"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/gateway"))
            .respond_with(ResponseTemplate::new(504))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("nope"))
            .mount(&server)
            .await;

        let client = create_http_client();
        let get = |p: &'static str| {
            let url = format!("{}{p}", server.uri());
            HttpUtils::execute_request(client.get(&url), "test", "GET", p)
        };

        let limited = get("/slow-down").await;
        assert!(
            matches!(limited, Err(ProviderError::RateLimited { retry_after: Some(7), .. })),
            "{limited:?}"
        );
        assert!(matches!(
            get("/gateway").await,
            Err(ProviderError::NetworkError { .. })
        ));
        // other statuses are left to the provider
        assert!(matches!(get("/missing").await, Ok((404, body)) if body == "nope"));
    }

    #[tokio::test]
    async fn no_retries_by_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/unavailable"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/unavailable", server.uri());
        let result = HttpUtils::execute_request_with_retry(
            create_http_client().get(&url),
            "test",
            "GET",
            &url,
            0,
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn opted_in_retries_recover() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/flaky", server.uri());
        let result = HttpUtils::execute_request_with_retry(
            create_http_client().get(&url),
            "test",
            "GET",
            &url,
            3,
        )
        .await;
        assert!(matches!(&result, Ok((200, body)) if body == "ok"), "{result:?}");
    }
}
