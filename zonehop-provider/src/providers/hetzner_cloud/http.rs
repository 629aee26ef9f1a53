//! Hetzner Cloud HTTP request methods

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::HetznerCloudProvider;
use super::types::ErrorBody;

impl HetznerCloudProvider {
    /// Map `{"error": {"code": ..., "message": ...}}` onto `ProviderError`.
    fn handle_response_error(&self, status: u16, response_text: &str, ctx: ErrorContext) -> Result<()> {
        if (200..300).contains(&status) {
            return Ok(());
        }

        if let Ok(body) = serde_json::from_str::<ErrorBody>(response_text) {
            log::error!(
                "[hetznercloud] API error {status} {}: {}",
                body.error.code,
                body.error.message
            );
            return Err(self.map_error(
                RawApiError::with_code(body.error.code, body.error.message),
                ctx,
            ));
        }

        Err(self.unknown_error(RawApiError::with_code(
            status.to_string(),
            format!("HTTP {status}: {response_text}"),
        )))
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
            .bearer_auth(&self.api_token);
        if let Some(body) = body {
            log::debug!("[hetznercloud] Request Body: {body}");
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

    pub(crate) async fn post<T, B>(&self, path: &str, body: &B, ctx: ErrorContext) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let payload = HttpUtils::to_json(body, self.provider_name())?;
        let text = self.send(Method::POST, path, Some(payload), ctx).await?;
        HttpUtils::parse_json(&text, self.provider_name())
    }

    /// POST an action; the returned action object is not needed.
    pub(crate) async fn post_action<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        ctx: ErrorContext,
    ) -> Result<()> {
        let payload = HttpUtils::to_json(body, self.provider_name())?;
        self.send(Method::POST, path, Some(payload), ctx)
            .await
            .map(|_| ())
    }

    pub(crate) async fn delete(&self, path: &str, ctx: ErrorContext) -> Result<()> {
        self.send(Method::DELETE, path, None, ctx).await.map(|_| ())
    }
}
