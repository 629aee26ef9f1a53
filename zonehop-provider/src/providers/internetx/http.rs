//! `AutoDNS` HTTP request methods

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::InternetxProvider;
use super::types::Envelope;

impl InternetxProvider {
    /// Unwrap the response envelope.
    ///
    /// A non-2xx status or a status type of `ERROR` becomes a `ProviderError` whose
    /// raw code is the HTTP status; the `AutoDNS` message code is kept in the message.
    fn unwrap_envelope<T: DeserializeOwned>(
        &self,
        status: u16,
        response_text: &str,
        ctx: ErrorContext,
    ) -> Result<Vec<T>> {
        let ok = (200..300).contains(&status);
        let envelope = match serde_json::from_str::<Envelope<T>>(response_text) {
            Ok(envelope) => envelope,
            Err(e) if ok => return Err(self.parse_error(e)),
            Err(_) => {
                return Err(self.map_error(
                    RawApiError::with_code(status.to_string(), format!("HTTP {status}")),
                    ctx,
                ));
            }
        };

        if ok && !envelope.is_error() {
            return Ok(envelope.data.unwrap_or_default());
        }

        let text = envelope.error_text();
        let message = match envelope.error_code() {
            Some(code) => format!("{code}: {text}"),
            None => text,
        };
        log::error!("[internetx] API error {status}: {message}");
        Err(self.map_error(RawApiError::with_code(status.to_string(), message), ctx))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
        ctx: ErrorContext,
    ) -> Result<Vec<T>> {
        let url = format!("{}{path}", self.base_url);
        let mut request = self
            .client
            .request(method.clone(), &url)
            .basic_auth(&self.username, Some(&self.password))
            .header("X-Domainrobot-Context", &self.context);
        if let Some(code) = &self.mfa_code {
            request = request.header("X-Domainrobot-2FA-Token", code);
        }
        if let Some(body) = body {
            log::debug!("[internetx] Request Body: {body}");
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

        self.unwrap_envelope(status, &response_text, ctx)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str, ctx: ErrorContext) -> Result<Vec<T>> {
        self.send(Method::GET, path, None, ctx).await
    }

    pub(crate) async fn post<T, B>(&self, path: &str, body: &B, ctx: ErrorContext) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let payload = HttpUtils::to_json(body, self.provider_name())?;
        self.send(Method::POST, path, Some(payload), ctx).await
    }

    pub(crate) async fn delete(&self, path: &str, ctx: ErrorContext) -> Result<()> {
        self.send::<serde_json::Value>(Method::DELETE, path, None, ctx)
            .await
            .map(|_| ())
    }
}
