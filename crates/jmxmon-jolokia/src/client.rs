use crate::error::{JolokiaError, Result};
use crate::protocol::{search_names, to_remote, Request, Response};
use async_trait::async_trait;
use jmxmon_collector::error::Result as SampleResult;
use jmxmon_collector::{Connection, Transport};
use jmxmon_common::remote::RemoteValue;
use jmxmon_common::spec::MethodParam;
use jmxmon_common::types::{Credentials, Target};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

fn default_path() -> String {
    "/jolokia".to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

/// Settings of the Jolokia agents, shared by all targets.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JolokiaConfig {
    /// URL path of the agent endpoint.
    #[serde(default = "default_path")]
    pub path: String,
    /// Use `https` instead of `http`.
    #[serde(default)]
    pub tls: bool,
    /// Bound on every request, connect included.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for JolokiaConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            tls: false,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// [`Transport`] over the Jolokia HTTP/JSON bridge.
pub struct JolokiaTransport {
    client: Client,
    config: JolokiaConfig,
}

impl JolokiaTransport {
    pub fn new(config: JolokiaConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let client = Client::builder()
            .use_rustls_tls()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| JolokiaError::InvalidConfig(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Endpoint URL of the agent at `address`.
    ///
    /// # Examples
    ///
    /// ```
    /// use jmxmon_jolokia::{JolokiaConfig, JolokiaTransport};
    ///
    /// let transport = JolokiaTransport::new(JolokiaConfig::default()).unwrap();
    /// assert_eq!(transport.endpoint("app1:8778"), "http://app1:8778/jolokia");
    /// ```
    pub fn endpoint(&self, address: &str) -> String {
        let scheme = if self.config.tls { "https" } else { "http" };
        let path = self.config.path.trim();
        if path.starts_with('/') {
            format!("{scheme}://{address}{path}")
        } else {
            format!("{scheme}://{address}/{path}")
        }
    }
}

#[async_trait]
impl Transport for JolokiaTransport {
    fn name(&self) -> &str {
        "jolokia"
    }

    async fn connect(&self, target: &Target) -> SampleResult<Box<dyn Connection>> {
        let conn = JolokiaConnection {
            client: self.client.clone(),
            url: self.endpoint(&target.address),
            credentials: target.credentials.clone(),
        };
        // Fails fast on unreachable or unauthorised agents.
        let version = conn.request(&Request::Version).await?;
        tracing::trace!(url = %conn.url, agent = %version.get("agent").unwrap_or(&serde_json::Value::Null), "Connected");
        Ok(Box::new(conn))
    }
}

struct JolokiaConnection {
    client: Client,
    url: String,
    credentials: Option<Credentials>,
}

impl JolokiaConnection {
    async fn request(&self, request: &Request<'_>) -> Result<Value> {
        let mut builder = self.client.post(&self.url).json(request);
        if let Some(creds) = &self.credentials {
            builder = builder.basic_auth(&creds.user, Some(&creds.password));
        }
        let response = builder.send().await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(JolokiaError::Unauthorized {
                status: status.as_u16(),
            });
        }
        let body = response.text().await?;
        if !status.is_success() {
            return Err(JolokiaError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: Response = serde_json::from_str(&body)?;
        tracing::trace!(kind = request.kind(), status = envelope.status, "Jolokia response");
        envelope.into_value()
    }
}

#[async_trait]
impl Connection for JolokiaConnection {
    async fn read_attribute(&self, object: &str, attribute: &str) -> SampleResult<RemoteValue> {
        let value = self
            .request(&Request::Read {
                mbean: object,
                attribute,
            })
            .await?;
        Ok(to_remote(&value))
    }

    async fn invoke(
        &self,
        object: &str,
        method: &str,
        params: &[MethodParam],
    ) -> SampleResult<RemoteValue> {
        let value = self.request(&Request::exec(object, method, params)).await?;
        Ok(to_remote(&value))
    }

    async fn query_names(&self, pattern: &str) -> SampleResult<Vec<String>> {
        let value = self.request(&Request::Search { mbean: pattern }).await?;
        Ok(search_names(&value)?)
    }

    async fn close(&self) {
        // Stateless over HTTP; pooled sockets stay with the client.
    }
}
