// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Instance session backed by the WhatsApp Cloud API.
//!
//! One [`CloudApiSession`] holds the credentials of one account and posts
//! outbound messages to `{base}/{version}/{phone_number_id}/messages`.
//! The Cloud API acknowledges with a message id only; the network timestamp
//! is taken from the `Date` header of that acknowledgment.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, DATE, HeaderMap, HeaderValue};
use tracing::{debug, warn};
use wagate_config::model::{InstanceConfig, WhatsAppConfig};
use wagate_core::{InstanceId, InstanceSession, Jid, MessageContent, SendReceipt, WagateError};

use crate::types::{ErrorResponse, OutboundRequest, SendResponse};

/// Connection settings for one Cloud API account.
#[derive(Clone)]
pub struct CloudApiSessionConfig {
    pub instance_id: InstanceId,
    pub own_address: Jid,
    pub phone_number_id: String,
    pub access_token: String,
    pub api_base_url: String,
    pub api_version: String,
}

impl fmt::Debug for CloudApiSessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudApiSessionConfig")
            .field("instance_id", &self.instance_id)
            .field("own_address", &self.own_address)
            .field("phone_number_id", &self.phone_number_id)
            .field("access_token", &"[redacted]")
            .field("api_base_url", &self.api_base_url)
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl CloudApiSessionConfig {
    /// Builds session settings from one `[[instances]]` entry.
    ///
    /// Returns `Ok(None)` when the instance carries no credentials and must
    /// stay pending.
    pub fn from_instance(
        instance: &InstanceConfig,
        whatsapp: &WhatsAppConfig,
    ) -> Result<Option<Self>, WagateError> {
        let (Some(phone_number_id), Some(access_token)) =
            (&instance.phone_number_id, &instance.access_token)
        else {
            return Ok(None);
        };
        let own_address = wagate_core::resolve(&instance.phone).ok_or_else(|| {
            WagateError::Config(format!(
                "instance `{}` has an invalid phone `{}`",
                instance.id, instance.phone
            ))
        })?;
        Ok(Some(Self {
            instance_id: InstanceId::from(instance.id.as_str()),
            own_address,
            phone_number_id: phone_number_id.clone(),
            access_token: access_token.clone(),
            api_base_url: whatsapp.api_base_url.trim_end_matches('/').to_string(),
            api_version: whatsapp.api_version.clone(),
        }))
    }
}

/// An authenticated Cloud API connection for one instance.
pub struct CloudApiSession {
    client: reqwest::Client,
    instance_id: InstanceId,
    own_address: Jid,
    endpoint: String,
}

impl fmt::Debug for CloudApiSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudApiSession")
            .field("instance_id", &self.instance_id)
            .field("own_address", &self.own_address)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl CloudApiSession {
    /// Creates a session. The access token is installed as a default header.
    pub fn new(config: CloudApiSessionConfig) -> Result<Self, WagateError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.access_token))
            .map_err(|e| WagateError::Config(format!("invalid access token header value: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| WagateError::Send {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        let endpoint = format!(
            "{}/{}/{}/messages",
            config.api_base_url, config.api_version, config.phone_number_id
        );

        Ok(Self {
            client,
            instance_id: config.instance_id,
            own_address: config.own_address,
            endpoint,
        })
    }
}

#[async_trait]
impl InstanceSession for CloudApiSession {
    fn instance_id(&self) -> &InstanceId {
        &self.instance_id
    }

    fn own_address(&self) -> &Jid {
        &self.own_address
    }

    async fn send_message(
        &self,
        to: &Jid,
        content: &MessageContent,
    ) -> Result<SendReceipt, WagateError> {
        let request = OutboundRequest::new(to, content);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| WagateError::Send {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(instance_id = %self.instance_id, status = %status, "cloud api response received");

        if !status.is_success() {
            let message = rejection_message(status, response.text().await);
            warn!(instance_id = %self.instance_id, status = %status, "send rejected");
            return Err(WagateError::send(message));
        }

        let timestamp = network_timestamp(response.headers())?;
        let body = response.text().await.map_err(|e| WagateError::Send {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        let parsed: SendResponse = serde_json::from_str(&body).map_err(|e| WagateError::Send {
            message: format!("failed to parse cloud api response: {e}"),
            source: Some(Box::new(e)),
        })?;
        let message_id = parsed
            .messages
            .into_iter()
            .next()
            .map(|m| m.id)
            .ok_or_else(|| WagateError::send("cloud api acknowledgment carried no message id"))?;

        Ok(SendReceipt {
            message_id,
            timestamp,
        })
    }
}

/// Describes a non-2xx reply, preferring the API's own error envelope.
fn rejection_message<E: fmt::Display>(
    status: reqwest::StatusCode,
    body: Result<String, E>,
) -> String {
    let body = match body {
        Ok(body) => body,
        Err(e) => return format!("cloud api returned {status}: body unreadable: {e}"),
    };
    match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(err) => match err.error.code {
            Some(code) => format!("cloud api rejected message ({code}): {}", err.error.message),
            None => format!("cloud api rejected message: {}", err.error.message),
        },
        Err(_) => format!("cloud api returned {status}: {body}"),
    }
}

/// Seconds since the epoch from the acknowledgment's `Date` header.
fn network_timestamp(headers: &HeaderMap) -> Result<i64, WagateError> {
    let raw = headers
        .get(DATE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| WagateError::send("cloud api acknowledgment carried no Date header"))?;
    chrono::DateTime::parse_from_rfc2822(raw)
        .map(|dt| dt.timestamp())
        .map_err(|e| WagateError::Send {
            message: format!("unparseable Date header `{raw}`: {e}"),
            source: Some(Box::new(e)),
        })
}
