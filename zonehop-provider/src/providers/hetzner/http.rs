//! Hetzner DNS HTTP request methods

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::HetznerProvider;
use super::types::ErrorBody;

impl HetznerProvider {
    /// Turn a non-2xx response into a `ProviderError`; the HTTP status is the error code.
    fn handle_response_error(&self, status: u16, response_text: &str, ctx: ErrorContext) -> Result<()> {
        if (200..300).contains(&status) {
            return Ok(());
        }

        let message = serde_json::from_str::<ErrorBody>(response_text)
            .ok()
            .and_then(|b| b.error.map(|e| e.message).or(b.message))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("HTTP {status}"));
        log::error!("[hetzner] API error {status}: {message}");

        Err(self.map_error(RawApiError::with_code(status.to_string(), message), ctx))
    }

    /// Send a request and return the raw body text of a successful response.
    pub(crate) async fn request_text(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
        ctx: ErrorContext,
    ) -> Result<String> {
        let url = format!("{}{path}", self.base_url);
        let mut request = self
            .client
            .request(method.clone(), &url)
            .header("Auth-API-Token", &self.api_token);
        if let Some(body) = body {
            log::debug!("[hetzner] Request Body: {body}");
            request = request
                .header("Content-Type", "application/json")
                .body(body);
        }

        let (status, response_text) = HttpUtils::execute_request_with_retry(
            request,
            self.provider_name(),
            method.as_str(),
            &url,
            self.max_retries,
        )
        .await?;

        self.handle_response_error(status, &response_text, ctx)?;
        Ok(response_text)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str, ctx: ErrorContext) -> Result<T> {
        let text = self.request_text(Method::GET, path, None, ctx).await?;
        HttpUtils::parse_json(&text, self.provider_name())
    }

    pub(crate) async fn send_json<T, B>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        ctx: ErrorContext,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let payload = HttpUtils::to_json(body, self.provider_name())?;
        let text = self.request_text(method, path, Some(payload), ctx).await?;
        HttpUtils::parse_json(&text, self.provider_name())
    }

    pub(crate) async fn delete(&self, path: &str, ctx: ErrorContext) -> Result<()> {
        self.request_text(Method::DELETE, path, None, ctx)
            .await
            .map(|_| ())
    }
}
