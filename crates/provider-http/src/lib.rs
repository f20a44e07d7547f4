//! Maps HTTP responses onto [`pipeline::ProviderError`].
//!
//! Used by the `github` and `circleci` adapters so both report failures the
//! same way to the retry loops:
//!
//! | Outcome | Error |
//! |---------|-------|
//! | request never completed | [`ProviderError::Transport`] |
//! | non-2xx status | [`ProviderError::Status`], with `Retry-After` when sent |
//! | 2xx body that does not decode | [`ProviderError::MalformedResponse`] |

use pipeline::ProviderError;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Longest response body kept in a [`ProviderError::Status`].
pub const MAX_ERROR_BODY_CHARS: usize = 800;

/// Sends `request` and decodes a JSON body into `T`.
pub async fn send_json<T: DeserializeOwned>(
    operation: &str,
    request: RequestBuilder,
) -> Result<T, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|err| transport(operation, err))?;
    decode(operation, response).await
}

/// Turns a response into `T`, classifying every failure for the retry loops.
pub async fn decode<T: DeserializeOwned>(
    operation: &str,
    response: Response,
) -> Result<T, ProviderError> {
    let status = response.status();
    debug!(operation, status = status.as_u16(), url = %response.url(), "provider response");
    if !status.is_success() {
        let retry_after_secs = retry_after_secs(response.headers());
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Status {
            operation: operation.to_string(),
            status: status.as_u16(),
            body: truncate_body(&body),
            retry_after_secs,
        });
    }

    let text = response
        .text()
        .await
        .map_err(|err| transport(operation, err))?;
    serde_json::from_str(&text).map_err(|err| malformed(operation, err))
}

pub fn malformed(operation: &str, message: impl ToString) -> ProviderError {
    ProviderError::MalformedResponse {
        operation: operation.to_string(),
        message: message.to_string(),
    }
}

fn transport(operation: &str, err: reqwest::Error) -> ProviderError {
    ProviderError::Transport {
        operation: operation.to_string(),
        message: err.to_string(),
    }
}

/// Delay in whole seconds from a `Retry-After` header. HTTP dates are ignored.
fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

fn truncate_body(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;
    use serde::Deserialize;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Named {
        name: String,
    }

    fn headers(retry_after: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static(retry_after));
        headers
    }

    #[test]
    fn retry_after_accepts_seconds_only() {
        assert_eq!(retry_after_secs(&headers(" 17 ")), Some(17));
        assert_eq!(retry_after_secs(&headers("Wed, 21 Oct 2015 07:28:00 GMT")), None);
        assert_eq!(retry_after_secs(&HeaderMap::new()), None);
    }

    #[test]
    fn long_bodies_are_cut_on_char_boundaries() {
        let body = "é".repeat(MAX_ERROR_BODY_CHARS + 10);
        assert_eq!(truncate_body(&body).chars().count(), MAX_ERROR_BODY_CHARS);
        assert_eq!(truncate_body("short"), "short");
    }

    #[tokio::test]
    async fn decodes_success_and_classifies_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"name":"build_doc"}"#))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;
        let http = reqwest::Client::new();

        let named: Named = send_json("get", http.get(server.uri())).await.unwrap();
        assert_eq!(named.name, "build_doc");

        let err = send_json::<Named>("get", http.get(server.uri()))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ProviderError::Status {
                operation: "get".into(),
                status: 502,
                body: "bad gateway".into(),
                retry_after_secs: None,
            }
        );
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let uri = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let err = send_json::<Named>("get", reqwest::Client::new().get(uri))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Transport { .. }));
        assert!(err.retry_policy().is_retryable());
    }
}
