//! INWX RPC calls and session handling

use reqwest::header::CONTENT_TYPE;

use crate::error::{ProviderError, Result};
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};
use crate::utils::log_sanitizer::{mask_secret, truncate_for_log};

use super::InwxProvider;
use super::xmlrpc::{Response, Value, decode_response, encode_call};

impl InwxProvider {
    /// Call a domrobot method after making sure the session is logged in.
    ///
    /// Returns `resData` of the response, or [`Value::Nil`] when there is none.
    pub(crate) async fn call(&self, method: &str, params: Value, ctx: ErrorContext) -> Result<Value> {
        self.ensure_session().await?;
        self.call_raw(method, params, ctx).await
    }

    async fn call_raw(&self, method: &str, params: Value, ctx: ErrorContext) -> Result<Value> {
        let body = encode_call(method, &[params]);
        let request = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "text/xml; charset=UTF-8")
            .body(body);

        let (status, response_text) = HttpUtils::execute_request_with_retry(
            request,
            self.provider_name(),
            "POST",
            method,
            self.max_retries,
        )
        .await?;

        if !(200..300).contains(&status) {
            return Err(self.unknown_error(RawApiError::with_code(
                status.to_string(),
                format!("HTTP {status}: {}", truncate_for_log(&response_text)),
            )));
        }

        let response = decode_response(&response_text).map_err(|e| {
            log::error!(
                "[inwx] {method}: undecodable response: {}",
                truncate_for_log(&response_text)
            );
            self.parse_error(e)
        })?;

        let envelope = match response {
            Response::Success(v) => v,
            Response::Fault { code, message } => {
                log::error!("[inwx] {method}: fault {code}: {message}");
                return Err(self.map_error(RawApiError::with_code(code.to_string(), message), ctx));
            }
        };

        let code = envelope
            .get("code")
            .and_then(Value::as_i64)
            .ok_or_else(|| self.parse_error(format!("{method}: response has no result code")))?;

        if (1000..2000).contains(&code) {
            return Ok(envelope.get("resData").cloned().unwrap_or(Value::Nil));
        }

        let msg = envelope
            .get("msg")
            .and_then(Value::to_text)
            .unwrap_or_default();
        let message = match envelope.get("reason").and_then(Value::to_text) {
            Some(reason) => format!("{msg}: {reason}"),
            None => msg,
        };
        log::error!("[inwx] {method}: API error {code}: {message}");
        Err(self.map_error(RawApiError::with_code(code.to_string(), message), ctx))
    }

    /// Log in once per provider; later calls reuse the session cookie.
    pub(crate) async fn ensure_session(&self) -> Result<()> {
        let mut logged_in = self.session.lock().await;
        if *logged_in {
            return Ok(());
        }

        log::debug!(
            "[inwx] Logging in as {} (password {})",
            self.username,
            mask_secret(&self.password)
        );
        let res = self
            .call_raw(
                "account.login",
                Value::structure([
                    ("user", self.username.as_str().into()),
                    ("pass", self.password.as_str().into()),
                    ("lang", "en".into()),
                ]),
                ErrorContext::default(),
            )
            .await?;

        let tfa = res
            .get("tfa")
            .and_then(Value::to_text)
            .unwrap_or_else(|| "0".to_string());
        if tfa != "0" {
            let Some(code) = &self.mfa_code else {
                return Err(ProviderError::InvalidCredentials {
                    provider: self.provider_name().to_string(),
                    raw_message: Some(format!("account requires a second factor ({tfa})")),
                });
            };
            self.call_raw(
                "account.unlock",
                Value::structure([("tan", code.as_str().into())]),
                ErrorContext::default(),
            )
            .await?;
        }

        log::debug!("[inwx] Logged in as {}", self.username);
        *logged_in = true;
        Ok(())
    }

    /// End the session if one was opened.
    pub(crate) async fn logout(&self) -> Result<()> {
        let mut logged_in = self.session.lock().await;
        if !*logged_in {
            return Ok(());
        }
        *logged_in = false;
        self.call_raw(
            "account.logout",
            Value::structure([]),
            ErrorContext::default(),
        )
        .await
        .map(|_| ())
    }
}
