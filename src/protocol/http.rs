// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP transport for the receiver's `goform` interface.

use std::time::Duration;

use reqwest::{Client, Response, header};

use crate::command::Command;
use crate::error::ProtocolError;
use crate::protocol::{DeviceResponse, DeviceTransport};

/// Form that answers XML status queries.
const STATUS_FORM: &str = "AppCommand.xml";

/// Content type the receiver expects on status queries.
const STATUS_CONTENT_TYPE: &str = "text/xml; charset=\"utf-8\"";

// ============================================================================
// HttpConfig
// ============================================================================

/// Configuration for the receiver's HTTP interface.
///
/// The connect timeout bounds connection setup and the read timeout bounds
/// each wait for response data. A request is also abandoned once it has
/// taken their sum.
///
/// # Examples
///
/// ```
/// use hifi_bridge::protocol::HttpConfig;
/// use std::time::Duration;
///
/// let config = HttpConfig::new("192.168.1.20")
///     .with_port(8080)
///     .with_connect_timeout(Duration::from_secs(1))
///     .with_read_timeout(Duration::from_secs(3));
///
/// assert_eq!(config.base_url(), "http://192.168.1.20:8080");
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    host: String,
    port: u16,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl HttpConfig {
    /// Default HTTP port.
    pub const DEFAULT_PORT: u16 = 80;
    /// Default connect timeout.
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
    /// Default read timeout.
    pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(6);

    /// Creates a configuration for the specified host.
    ///
    /// The host may carry its own `http://` or `https://` scheme and port, in
    /// which case it is used as the base URL unchanged.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
            read_timeout: Self::DEFAULT_READ_TIMEOUT,
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the read timeout.
    #[must_use]
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the connect timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the read timeout.
    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Builds the base URL from this configuration.
    #[must_use]
    pub fn base_url(&self) -> String {
        if self.host.starts_with("http://") || self.host.starts_with("https://") {
            return self.host.trim_end_matches('/').to_string();
        }
        if self.port == Self::DEFAULT_PORT {
            format!("http://{}", self.host)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }

    /// Creates an `HttpClient` from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the host is empty or the HTTP client cannot be created.
    pub fn into_client(self) -> Result<HttpClient, ProtocolError> {
        if self.host.trim().is_empty() {
            return Err(ProtocolError::InvalidAddress(
                "device host is required".to_string(),
            ));
        }

        let total = self.connect_timeout + self.read_timeout;
        let client = Client::builder()
            .connect_timeout(self.connect_timeout)
            .read_timeout(self.read_timeout)
            .timeout(total)
            .build()
            .map_err(ProtocolError::Http)?;

        // Safe: configured timeouts are seconds, far below u64::MAX milliseconds
        #[allow(clippy::cast_possible_truncation)]
        let timeout_ms = total.as_millis() as u64;

        Ok(HttpClient {
            base_url: self.base_url(),
            client,
            timeout_ms,
        })
    }
}

// ============================================================================
// HttpClient
// ============================================================================

/// HTTP client for the receiver.
///
/// # Examples
///
/// ```no_run
/// use hifi_bridge::command::PendingCommand;
/// use hifi_bridge::protocol::{DeviceTransport, HttpConfig};
/// use hifi_bridge::types::PowerState;
///
/// # async fn example() -> hifi_bridge::Result<()> {
/// let client = HttpConfig::new("192.168.1.20").into_client()?;
/// client.send_command(&PendingCommand::Power(PowerState::On)).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    client: Client,
    timeout_ms: u64,
}

impl HttpClient {
    /// Returns the base URL of the receiver.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the URL of a path below `goform/`.
    fn form_url(&self, path: &str) -> String {
        format!("{}/goform/{path}", self.base_url)
    }

    fn map_error(&self, error: reqwest::Error) -> ProtocolError {
        if error.is_timeout() {
            ProtocolError::Timeout(self.timeout_ms)
        } else {
            ProtocolError::Http(error)
        }
    }

    async fn read_body(&self, response: Response) -> Result<DeviceResponse, ProtocolError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ProtocolError::ConnectionFailed(format!(
                "HTTP {} - {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body = response.text().await.map_err(|e| self.map_error(e))?;

        tracing::trace!(body = %body, "Received HTTP response");

        Ok(DeviceResponse::new(body))
    }
}

impl DeviceTransport for HttpClient {
    async fn query_status(&self, body: &str) -> Result<DeviceResponse, ProtocolError> {
        let url = self.form_url(STATUS_FORM);

        tracing::trace!(url = %url, "Sending status query");

        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, STATUS_CONTENT_TYPE)
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        self.read_body(response).await
    }

    async fn send_command<C: Command + Sync>(
        &self,
        command: &C,
    ) -> Result<DeviceResponse, ProtocolError> {
        let url = self.form_url(&command.to_request_path());

        tracing::debug!(url = %url, "Sending command");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        self.read_body(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::PendingCommand;
    use crate::types::PowerState;

    #[test]
    fn http_config_default_values() {
        let config = HttpConfig::new("192.168.1.20");
        assert_eq!(config.host(), "192.168.1.20");
        assert_eq!(config.port(), 80);
        assert_eq!(config.connect_timeout(), Duration::from_secs(2));
        assert_eq!(config.read_timeout(), Duration::from_secs(6));
    }

    #[test]
    fn http_config_base_url() {
        assert_eq!(
            HttpConfig::new("receiver.local").base_url(),
            "http://receiver.local"
        );
        assert_eq!(
            HttpConfig::new("receiver.local").with_port(8080).base_url(),
            "http://receiver.local:8080"
        );
    }

    #[test]
    fn http_config_keeps_explicit_scheme() {
        let config = HttpConfig::new("http://127.0.0.1:4321/");
        assert_eq!(config.base_url(), "http://127.0.0.1:4321");
    }

    #[test]
    fn http_config_with_timeouts() {
        let config = HttpConfig::new("receiver")
            .with_connect_timeout(Duration::from_millis(500))
            .with_read_timeout(Duration::from_secs(1));
        assert_eq!(config.connect_timeout(), Duration::from_millis(500));
        assert_eq!(config.read_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn into_client_requires_host() {
        let result = HttpConfig::new("  ").into_client();
        assert!(matches!(result, Err(ProtocolError::InvalidAddress(_))));
    }

    #[test]
    fn into_client_reports_overall_bound() {
        let client = HttpConfig::new("receiver").into_client().unwrap();
        assert_eq!(client.timeout_ms, 8000);
    }

    #[test]
    fn form_urls() {
        let client = HttpConfig::new("receiver").into_client().unwrap();
        assert_eq!(
            client.form_url(STATUS_FORM),
            "http://receiver/goform/AppCommand.xml"
        );
        assert_eq!(
            client.form_url(&PendingCommand::Power(PowerState::On).to_request_path()),
            "http://receiver/goform/formiPhoneAppPower.xml?1+PowerOn"
        );
    }
}
