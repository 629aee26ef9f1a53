//! `TransIP` HTTP request methods

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::TransipProvider;
use super::types::ErrorBody;

impl TransipProvider {
    /// Errors come as `{"error": "..."}`; the HTTP status is the error code.
    fn handle_response_error(&self, status: u16, response_text: &str, ctx: ErrorContext) -> Result<()> {
        if (200..300).contains(&status) {
            return Ok(());
        }

        let message = serde_json::from_str::<ErrorBody>(response_text)
            .ok()
            .map(|b| b.error)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("HTTP {status}"));
        log::error!("[transip] API error {status}: {message}");

        Err(self.map_error(RawApiError::with_code(status.to_string(), message), ctx))
    }

    async fn send(
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
            .bearer_auth(&self.access_token);
        if let Some(body) = body {
            log::debug!("[transip] Request Body: {body}");
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
        let text = self.send(Method::GET, path, None, ctx).await?;
        HttpUtils::parse_json(&text, self.provider_name())
    }

    /// PUT a body; `TransIP` answers `204 No Content`.
    pub(crate) async fn put<B: Serialize>(&self, path: &str, body: &B, ctx: ErrorContext) -> Result<()> {
        let payload = HttpUtils::to_json(body, self.provider_name())?;
        self.send(Method::PUT, path, Some(payload), ctx)
            .await
            .map(|_| ())
    }
}
