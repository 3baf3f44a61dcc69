//! The HTTPS auditor client.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use auditgate_contracts::{
    config::AuditorSettings,
    error::{GateError, GateResult},
    request::AuditRequest,
};
use auditgate_core::traits::Auditor;

use crate::prompt::{reply_text, request_body};

/// Calls a chat-completions endpoint with a hard deadline.
///
/// The deadline covers connect, send and the full body read. A miss is
/// reported as `GateError::AuditorTimeout`.
#[derive(Debug)]
pub struct HttpAuditor {
    endpoint: String,
    model: String,
    api_key: SecretString,
    timeout_secs: u64,
    client: reqwest::blocking::Client,
}

impl HttpAuditor {
    pub fn new(settings: &AuditorSettings, api_key: SecretString) -> GateResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| GateError::AuditorTransport {
                reason: format!("cannot build HTTP client: {e}"),
            })?;
        Ok(Self {
            endpoint: settings.endpoint.clone(),
            model: settings.model.clone(),
            api_key,
            timeout_secs: settings.timeout_secs,
            client,
        })
    }

    /// Build the client if the credential named in `settings` is present.
    ///
    /// `Ok(None)` means no credential: the caller runs in placeholder mode.
    pub fn from_settings(
        settings: &AuditorSettings,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> GateResult<Option<Self>> {
        match lookup(&settings.api_key_env) {
            Some(key) if !key.trim().is_empty() => {
                debug!(env = %settings.api_key_env, endpoint = %settings.endpoint, "auditor credential found");
                Self::new(settings, SecretString::from(key.trim().to_string())).map(Some)
            }
            _ => {
                info!(env = %settings.api_key_env, "auditor credential not set");
                Ok(None)
            }
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> GateError {
        if e.is_timeout() {
            GateError::AuditorTimeout {
                after_secs: self.timeout_secs,
            }
        } else {
            GateError::AuditorTransport {
                reason: e.to_string(),
            }
        }
    }
}

impl Auditor for HttpAuditor {
    fn model(&self) -> &str {
        &self.model
    }

    fn review(&self, request: &AuditRequest) -> GateResult<String> {
        let body = request_body(&self.model, request);
        debug!(key = %request.run.key, endpoint = %self.endpoint, "calling auditor");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let text = response.text().map_err(|e| self.transport_error(e))?;
        if !status.is_success() {
            let snippet: String = text.chars().take(200).collect();
            return Err(GateError::AuditorTransport {
                reason: format!("auditor answered {status}: {snippet}"),
            });
        }

        debug!(key = %request.run.key, bytes = text.len(), "auditor replied");
        Ok(reply_text(&text))
    }
}
